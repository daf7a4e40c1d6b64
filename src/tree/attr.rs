//! The per-element ordered attribute table.
//!
//! Attributes are stored in first-write order inside the element's
//! `NodeKind::Element` payload. Setting an existing qualified name replaces
//! the value in place without moving the entry, so serialization order is
//! stable across updates. Removal of a missing name is a silent no-op.
//!
//! The document-scoped null policy is applied here: a null value is skipped
//! by default, or stored as an empty string under `keep_null_attributes`.
//! An absent-kind value is always an error: null and "no value provided"
//! are distinguished kinds, and only the former is tolerable.

use super::{Attribute, Document, NodeId, NodeKind};
use crate::error::BuildError;
use crate::namespace::{self, QName};
use crate::notation::Value;

impl Document {
    /// Sets an attribute on an element, applying the document's null policy
    /// and resolving the attribute's namespace prefix against the
    /// declarations in scope.
    ///
    /// Setting a namespace declaration attribute (`xmlns` or `xmlns:pfx`)
    /// re-resolves the element itself, since declarations on an element are
    /// visible to its own qualified name.
    ///
    /// # Errors
    ///
    /// Returns `BuildError::InvalidState` if `element` is not an element
    /// node, `BuildError::InvalidValue` if `value` is absent or not a
    /// scalar, and `BuildError::Namespace` if the attribute's prefix has no
    /// declaration in scope.
    pub fn set_attribute(
        &mut self,
        element: NodeId,
        name: &str,
        value: &Value,
    ) -> Result<(), BuildError> {
        if self.set_attribute_deferred(element, name, value)? {
            if namespace::is_declaration(name) {
                namespace::resolve_element(self, element)?;
            } else {
                namespace::resolve_attribute(self, element, name)?;
            }
        }
        Ok(())
    }

    /// Sets an attribute without resolving namespaces, for subtrees that are
    /// not yet finalized into the tree. Returns whether a value was stored
    /// (a skipped null stores nothing).
    ///
    /// # Errors
    ///
    /// Returns `BuildError::InvalidState` for non-element nodes and
    /// `BuildError::InvalidValue` for absent or non-scalar values.
    pub(crate) fn set_attribute_deferred(
        &mut self,
        element: NodeId,
        name: &str,
        value: &Value,
    ) -> Result<bool, BuildError> {
        if !matches!(self.node(element).kind, NodeKind::Element { .. }) {
            return Err(BuildError::InvalidState(format!(
                "attribute '{name}' can only be set on an element"
            )));
        }

        let text = match value {
            Value::Absent => {
                return Err(BuildError::InvalidValue(format!(
                    "attribute '{name}' has no value (absent is not a valid attribute value)"
                )));
            }
            Value::Null => {
                if self.config().keep_null_attributes {
                    Some(String::new())
                } else {
                    None
                }
            }
            other => match other.scalar_string() {
                Some(s) => Some(s),
                None => {
                    return Err(BuildError::InvalidValue(format!(
                        "attribute '{name}' requires a scalar value, got a {}",
                        other.kind_name()
                    )));
                }
            },
        };

        match text {
            Some(text) => {
                self.put_attribute_raw(element, name, text);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Inserts or replaces an attribute entry, preserving first-write order.
    ///
    /// Table semantics only: no policy, no namespace resolution.
    pub(crate) fn put_attribute_raw(&mut self, element: NodeId, qname: &str, value: String) {
        let q = QName::parse(qname);
        if let NodeKind::Element { attributes, .. } = &mut self.node_mut(element).kind {
            if let Some(existing) = attributes
                .iter_mut()
                .find(|a| a.prefix.as_deref() == q.prefix.as_deref() && a.name == q.local)
            {
                existing.value = value;
            } else {
                attributes.push(Attribute {
                    name: q.local,
                    value,
                    prefix: q.prefix,
                    namespace: None,
                });
            }
        }
    }

    /// Removes an attribute by qualified name.
    ///
    /// Removing a name that is not present is a silent no-op.
    pub fn remove_attribute(&mut self, element: NodeId, qname: &str) {
        let q = QName::parse(qname);
        if let NodeKind::Element { attributes, .. } = &mut self.node_mut(element).kind {
            attributes.retain(|a| !(a.prefix.as_deref() == q.prefix.as_deref() && a.name == q.local));
        }
    }

    /// Removes several attributes by qualified name.
    ///
    /// Names that are not present are skipped silently.
    pub fn remove_attributes(&mut self, element: NodeId, qnames: &[&str]) {
        for qname in qnames {
            self.remove_attribute(element, qname);
        }
    }

    /// Returns the value of an attribute by qualified name, if present.
    #[must_use]
    pub fn attribute(&self, element: NodeId, qname: &str) -> Option<&str> {
        let q = QName::parse(qname);
        self.attributes(element)
            .iter()
            .find(|a| a.prefix.as_deref() == q.prefix.as_deref() && a.name == q.local)
            .map(|a| a.value.as_str())
    }

    /// Returns the ordered attribute entries of an element, exactly as
    /// accumulated. Non-element nodes return an empty slice.
    #[must_use]
    pub fn attributes(&self, element: NodeId) -> &[Attribute] {
        match &self.node(element).kind {
            NodeKind::Element { attributes, .. } => attributes,
            _ => &[],
        }
    }
}
