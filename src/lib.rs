//! # xmlforge
//!
//! A fluent builder and multi-format serializer for XML document trees.
//! Documents are built either through chainable calls ([`Builder`]) or by
//! converting loosely-typed nested values ([`Value`]); both paths produce
//! the same arena-backed tree, which can then be written out as markup
//! text, a JSON-like object, an ordered map, or a stream of callbacks.
//!
//! ## Quick Start
//!
//! ```
//! use xmlforge::{serial, Builder, Value};
//!
//! let mut builder = Builder::new();
//! builder
//!     .element("inventory")?
//!     .element_from(Value::map([
//!         ("@count", Value::from(2)),
//!         ("item", Value::sequence(["bolt", "nut"])),
//!     ]))?;
//!
//! let xml = serial::serialize(builder.document());
//! assert_eq!(
//!     xml,
//!     "<?xml version=\"1.0\"?>\
//!      <inventory count=\"2\"><item>bolt</item><item>nut</item></inventory>"
//! );
//! # Ok::<(), xmlforge::BuildError>(())
//! ```

pub mod builder;
pub mod error;
pub mod escape;
pub mod namespace;
pub mod notation;
pub mod serial;
pub mod tree;

// Re-export primary types at the crate root for convenience.
pub use builder::Builder;
pub use error::BuildError;
pub use notation::Value;
pub use tree::{Attribute, Document, DocumentConfig, Markers, NodeId, NodeKind};
