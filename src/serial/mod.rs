//! Multi-format serialization of document trees.
//!
//! One file per output format, all consuming the tree in the same document
//! order (depth-first, attributes before element children) so cross-writer
//! output is mutually derivable: markup text ([`xml`]), a JSON-like object
//! ([`object`]), an ordered map ([`map`]), and a callback event sequence
//! ([`event`]).
//!
//! Serialization is read-only; it may run against any tree that is no
//! longer being mutated.

pub mod event;
pub mod map;
pub mod object;
pub mod xml;

pub use xml::{serialize, serialize_with_options, WriteOptions};
