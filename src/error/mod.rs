//! Error types for document building.
//!
//! All errors are raised synchronously at the call that detects the
//! violation. A failed call leaves the tree in a well-defined partial state
//! reflecting every mutation that succeeded before it; callers may inspect
//! or discard that partial tree through the builder. Nothing is retried or
//! deferred; these are programmer-error signals.

use std::fmt;

/// The error type for builder, conversion, and namespace operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// An absent-kind value was supplied where a concrete attribute or text
    /// value is required, or a notation literal is shaped ambiguously (e.g.
    /// an attribute key whose value is a map).
    ///
    /// Note that this is distinct from a null value: null is a tolerable,
    /// intentional "no value", while absent signals a probable caller bug
    /// such as an upstream lookup that produced nothing.
    InvalidValue(String),

    /// A cursor operation had no valid target, e.g. ascending past the
    /// document node or setting an attribute while positioned on the
    /// document itself.
    InvalidState(String),

    /// A namespace prefix could not be resolved against the declarations in
    /// scope at the moment the node was finalized into the tree.
    Namespace(String),
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidValue(msg) => write!(f, "invalid value: {msg}"),
            Self::InvalidState(msg) => write!(f, "invalid state: {msg}"),
            Self::Namespace(msg) => write!(f, "namespace error: {msg}"),
        }
    }
}

impl std::error::Error for BuildError {}
