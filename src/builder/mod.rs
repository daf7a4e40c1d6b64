//! The fluent, chainable builder facade.
//!
//! A [`Builder`] owns the [`Document`] under construction plus a single
//! "current node" cursor, stored as an arena index: an explicit owned
//! handle to a tree position, never a reference into the tree. Both the
//! direct API and the notation converter funnel through it, so the two
//! construction paths are equivalent by construction.
//!
//! Chainable methods take `&mut self` and return `&mut Self` (or
//! `Result<&mut Self>`), which means a failed call leaves the partially
//! built tree inside the builder, inspectable through
//! [`document`](Builder::document).
//!
//! # Examples
//!
//! ```
//! use xmlforge::{serial, Builder};
//!
//! let mut builder = Builder::new();
//! builder
//!     .element("root")?
//!     .element("node1")?
//!     .attribute("att1", "val1")?
//!     .attribute("att2", "val2")?
//!     .element("node1-2")?
//!     .up()?
//!     .up()?
//!     .element("node2")?;
//!
//! let xml = serial::serialize(builder.document());
//! assert_eq!(
//!     xml,
//!     "<?xml version=\"1.0\"?>\
//!      <root><node1 att1=\"val1\" att2=\"val2\"><node1-2/></node1><node2/></root>"
//! );
//! # Ok::<(), xmlforge::BuildError>(())
//! ```

use crate::error::BuildError;
use crate::namespace::{self, QName};
use crate::notation::{self, Value};
use crate::tree::{Document, DocumentConfig, NodeId, NodeKind};

/// A build session over a single document.
///
/// The cursor always refers to a live node of the owned tree: the document
/// node right after construction, and afterwards whichever element the last
/// call landed on.
#[derive(Debug)]
pub struct Builder {
    doc: Document,
    cursor: NodeId,
}

impl Builder {
    /// Creates a builder over a new empty document with default
    /// configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(DocumentConfig::default())
    }

    /// Creates a builder over a new empty document with the given
    /// configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use xmlforge::{Builder, DocumentConfig};
    ///
    /// let builder = Builder::with_config(DocumentConfig {
    ///     keep_null_attributes: true,
    ///     ..Default::default()
    /// });
    /// assert!(builder.document().config().keep_null_attributes);
    /// ```
    #[must_use]
    pub fn with_config(config: DocumentConfig) -> Self {
        let doc = Document::with_config(config);
        let cursor = doc.root();
        Self { doc, cursor }
    }

    /// Appends a child element with the given qualified name and moves the
    /// cursor to it.
    ///
    /// The element's namespace is resolved against the declarations in scope
    /// at this moment; later changes to ancestor declarations will not
    /// retroactively affect it.
    ///
    /// # Errors
    ///
    /// Returns `BuildError::InvalidState` if the document already has a
    /// document element and the cursor is still on the document node, and
    /// `BuildError::Namespace` if the name's prefix has no declaration in
    /// scope.
    pub fn element(&mut self, name: &str) -> Result<&mut Self, BuildError> {
        self.check_element_slot()?;
        let q = QName::parse(name);
        let id = self.doc.create_node(NodeKind::Element {
            name: q.local,
            prefix: q.prefix,
            namespace: None,
            attributes: Vec::new(),
        });
        self.doc.append_child(self.cursor, id);
        if let Err(e) = namespace::resolve_subtree(&mut self.doc, id) {
            self.doc.detach(id);
            return Err(e);
        }
        self.cursor = id;
        Ok(self)
    }

    /// Appends a child element with an explicitly given namespace URI and
    /// moves the cursor to it.
    ///
    /// The matching declaration attribute (`xmlns="uri"` or
    /// `xmlns:pfx="uri"`) is recorded on the element, so descendants can
    /// resolve the same prefix by lookup.
    ///
    /// # Errors
    ///
    /// Returns `BuildError::InvalidState` if the document already has a
    /// document element and the cursor is still on the document node, and
    /// `BuildError::Namespace` if `name` uses the reserved `xmlns` prefix.
    pub fn element_ns(&mut self, uri: &str, name: &str) -> Result<&mut Self, BuildError> {
        self.check_element_slot()?;
        let q = QName::parse(name);
        if q.prefix.as_deref() == Some("xmlns") {
            return Err(BuildError::Namespace(
                "'xmlns' cannot be used as an element prefix".to_string(),
            ));
        }
        let decl_name = match &q.prefix {
            Some(p) => format!("xmlns:{p}"),
            None => "xmlns".to_string(),
        };
        let id = self.doc.create_node(NodeKind::Element {
            name: q.local,
            prefix: q.prefix,
            namespace: Some(uri.to_string()),
            attributes: Vec::new(),
        });
        self.doc.append_child(self.cursor, id);
        self.doc.put_attribute_raw(id, &decl_name, uri.to_string());
        namespace::resolve_attribute(&mut self.doc, id, &decl_name)?;
        self.cursor = id;
        Ok(self)
    }

    /// Converts a notation value into nodes under the current node.
    ///
    /// After conversion the cursor is positioned on the last top-level
    /// element the conversion created, so chaining continues naturally; a
    /// conversion that only set attributes leaves the cursor where it was.
    ///
    /// # Examples
    ///
    /// ```
    /// use xmlforge::{serial, Builder, Value};
    ///
    /// let mut builder = Builder::new();
    /// builder.element("root")?.element_from(Value::map([
    ///     ("@id", Value::from("a1")),
    ///     ("name", Value::from("sprocket")),
    /// ]))?;
    ///
    /// let xml = serial::serialize(builder.document());
    /// assert_eq!(
    ///     xml,
    ///     "<?xml version=\"1.0\"?><root id=\"a1\"><name>sprocket</name></root>"
    /// );
    /// # Ok::<(), xmlforge::BuildError>(())
    /// ```
    ///
    /// # Errors
    ///
    /// Returns any error the conversion grammar raises: `InvalidValue` for
    /// absent or ambiguously shaped values, `InvalidState` for attributes
    /// without a current element, `Namespace` for unresolvable prefixes.
    pub fn element_from(&mut self, value: impl Into<Value>) -> Result<&mut Self, BuildError> {
        let value = value.into();
        if let Some(id) = notation::convert_into(&mut self.doc, self.cursor, &value)? {
            self.cursor = id;
        }
        Ok(self)
    }

    /// Sets a single attribute on the current element.
    ///
    /// The document's null policy applies: a null value is skipped by
    /// default, or stored empty under `keep_null_attributes`. Setting an
    /// existing name replaces its value in place without changing its
    /// position.
    ///
    /// # Errors
    ///
    /// Returns `BuildError::InvalidState` if the cursor is not on an
    /// element, `BuildError::InvalidValue` for absent or non-scalar values,
    /// and `BuildError::Namespace` for an unresolvable prefix.
    pub fn attribute(&mut self, name: &str, value: impl Into<Value>) -> Result<&mut Self, BuildError> {
        let value = value.into();
        self.doc.set_attribute(self.cursor, name, &value)?;
        Ok(self)
    }

    /// Sets several attributes from a map value, applying entries in the
    /// map's own order. Equivalent to calling
    /// [`attribute`](Builder::attribute) once per entry.
    ///
    /// # Errors
    ///
    /// Returns `BuildError::InvalidValue` if `map` is not a map value, plus
    /// anything [`attribute`](Builder::attribute) can return.
    pub fn attributes(&mut self, map: impl Into<Value>) -> Result<&mut Self, BuildError> {
        match map.into() {
            Value::Map(entries) => {
                for (name, value) in &entries {
                    self.doc.set_attribute(self.cursor, name, value)?;
                }
                Ok(self)
            }
            other => Err(BuildError::InvalidValue(format!(
                "the map form of attributes requires a map, got a {}",
                other.kind_name()
            ))),
        }
    }

    /// Removes an attribute from the current element.
    ///
    /// Removing a name that was never set is a silent no-op.
    ///
    /// # Errors
    ///
    /// Returns `BuildError::InvalidState` if the cursor is not on an
    /// element.
    pub fn remove_attribute(&mut self, name: &str) -> Result<&mut Self, BuildError> {
        self.require_element("remove an attribute")?;
        self.doc.remove_attribute(self.cursor, name);
        Ok(self)
    }

    /// Removes several attributes from the current element; missing names
    /// are skipped silently.
    ///
    /// # Errors
    ///
    /// Returns `BuildError::InvalidState` if the cursor is not on an
    /// element.
    pub fn remove_attributes(&mut self, names: &[&str]) -> Result<&mut Self, BuildError> {
        self.require_element("remove attributes")?;
        self.doc.remove_attributes(self.cursor, names);
        Ok(self)
    }

    /// Appends a text node to the current element.
    ///
    /// # Errors
    ///
    /// Returns `BuildError::InvalidState` if the cursor is not on an
    /// element (character data cannot live at the document level).
    pub fn text(&mut self, content: &str) -> Result<&mut Self, BuildError> {
        self.require_element("append text")?;
        let id = self.doc.create_node(NodeKind::Text {
            content: content.to_string(),
        });
        self.doc.append_child(self.cursor, id);
        Ok(self)
    }

    /// Appends a CDATA section to the current element.
    ///
    /// # Errors
    ///
    /// Returns `BuildError::InvalidState` if the cursor is not on an
    /// element.
    pub fn cdata(&mut self, content: &str) -> Result<&mut Self, BuildError> {
        self.require_element("append CDATA")?;
        let id = self.doc.create_node(NodeKind::CData {
            content: content.to_string(),
        });
        self.doc.append_child(self.cursor, id);
        Ok(self)
    }

    /// Appends a comment to the current node. Comments may also sit at the
    /// document level, before or after the document element.
    pub fn comment(&mut self, content: &str) -> &mut Self {
        let id = self.doc.create_node(NodeKind::Comment {
            content: content.to_string(),
        });
        self.doc.append_child(self.cursor, id);
        self
    }

    /// Appends a processing instruction to the current node. Like comments,
    /// instructions may sit at the document level.
    pub fn instruction(&mut self, target: &str, data: Option<&str>) -> &mut Self {
        let id = self.doc.create_node(NodeKind::ProcessingInstruction {
            target: target.to_string(),
            data: data.map(ToString::to_string),
        });
        self.doc.append_child(self.cursor, id);
        self
    }

    /// Sets the XML declaration fields emitted by the string writer.
    pub fn declaration(
        &mut self,
        version: Option<&str>,
        encoding: Option<&str>,
        standalone: Option<bool>,
    ) -> &mut Self {
        self.doc.version = version.map(ToString::to_string);
        self.doc.encoding = encoding.map(ToString::to_string);
        self.doc.standalone = standalone;
        self
    }

    /// Moves the cursor to the parent node.
    ///
    /// # Errors
    ///
    /// Returns `BuildError::InvalidState` when the cursor is already on the
    /// document node. Ascending past the root is a usage error, not a
    /// no-op: silently clamping would mask caller bugs.
    pub fn up(&mut self) -> Result<&mut Self, BuildError> {
        match self.doc.parent(self.cursor) {
            Some(parent) => {
                self.cursor = parent;
                Ok(self)
            }
            None => Err(BuildError::InvalidState(
                "cannot ascend past the document node".to_string(),
            )),
        }
    }

    /// Returns the owning document, regardless of cursor depth. O(1): the
    /// builder holds the document directly, no tree walk.
    #[must_use]
    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// Finishes the build session, returning the document.
    #[must_use]
    pub fn into_document(self) -> Document {
        self.doc
    }

    /// Returns the cursor's node id, for use with the tree API.
    #[must_use]
    pub fn node(&self) -> NodeId {
        self.cursor
    }

    fn check_element_slot(&self) -> Result<(), BuildError> {
        if self.cursor == self.doc.root() && self.doc.root_element().is_some() {
            return Err(BuildError::InvalidState(
                "document already has a document element".to_string(),
            ));
        }
        Ok(())
    }

    fn require_element(&self, action: &str) -> Result<(), BuildError> {
        if matches!(self.doc.node(self.cursor).kind, NodeKind::Element { .. }) {
            Ok(())
        } else {
            Err(BuildError::InvalidState(format!(
                "cannot {action} here: the cursor is not on an element"
            )))
        }
    }
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_moves_to_new_element() {
        let mut b = Builder::new();
        b.element("root").unwrap();
        let root = b.node();
        b.element("child").unwrap();
        assert_ne!(b.node(), root);
        assert_eq!(b.document().node_name(b.node()), Some("child"));
    }

    #[test]
    fn test_up_returns_to_parent() {
        let mut b = Builder::new();
        b.element("root").unwrap().element("child").unwrap();
        b.up().unwrap();
        assert_eq!(b.document().node_name(b.node()), Some("root"));
    }

    #[test]
    fn test_up_past_document_node_fails() {
        let mut b = Builder::new();
        b.element("root").unwrap();
        b.up().unwrap(); // to the document node
        let err = b.up().unwrap_err();
        assert!(matches!(err, BuildError::InvalidState(_)));
    }

    #[test]
    fn test_second_document_element_rejected() {
        let mut b = Builder::new();
        b.element("root").unwrap();
        b.up().unwrap();
        let err = b.element("another-root").unwrap_err();
        assert!(matches!(err, BuildError::InvalidState(_)));
    }

    #[test]
    fn test_attribute_on_document_node_fails() {
        let mut b = Builder::new();
        let err = b.attribute("a", "1").unwrap_err();
        assert!(matches!(err, BuildError::InvalidState(_)));
    }

    #[test]
    fn test_text_on_document_node_fails() {
        let mut b = Builder::new();
        let err = b.text("stray").unwrap_err();
        assert!(matches!(err, BuildError::InvalidState(_)));
    }

    #[test]
    fn test_attributes_map_applied_in_order() {
        let mut b = Builder::new();
        b.element("root")
            .unwrap()
            .attributes(Value::map([("z", "1"), ("a", "2")]))
            .unwrap();
        let names: Vec<&str> = b
            .document()
            .attributes(b.node())
            .iter()
            .map(|a| a.name.as_str())
            .collect();
        assert_eq!(names, vec!["z", "a"]);
    }

    #[test]
    fn test_attributes_rejects_non_map() {
        let mut b = Builder::new();
        b.element("root").unwrap();
        let err = b.attributes(Value::from("scalar")).unwrap_err();
        assert!(matches!(err, BuildError::InvalidValue(_)));
    }

    #[test]
    fn test_element_from_moves_cursor_to_last_created() {
        let mut b = Builder::new();
        b.element("root")
            .unwrap()
            .element_from(Value::map([("first", "1"), ("second", "2")]))
            .unwrap();
        assert_eq!(b.document().node_name(b.node()), Some("second"));
    }

    #[test]
    fn test_element_from_attributes_only_keeps_cursor() {
        let mut b = Builder::new();
        b.element("node").unwrap();
        let before = b.node();
        b.element_from(Value::map([("@a", "1")])).unwrap();
        assert_eq!(b.node(), before);
        assert_eq!(b.document().attribute(before, "a"), Some("1"));
    }

    #[test]
    fn test_partial_tree_survives_failed_call() {
        let mut b = Builder::new();
        b.element("root").unwrap().element("ok").unwrap();
        let err = b
            .element_from(Value::map([("@bad", Value::Absent)]))
            .unwrap_err();
        assert!(matches!(err, BuildError::InvalidValue(_)));

        // Everything built before the failing call is still there.
        let doc = b.document();
        let root = doc.root_element().unwrap();
        assert_eq!(doc.node_name(root), Some("root"));
        assert_eq!(doc.children(root).count(), 1);
    }

    #[test]
    fn test_element_ns_records_declaration() {
        let mut b = Builder::new();
        b.element_ns("http://www.w3.org/2000/svg", "svg:svg").unwrap();
        let doc = b.document();
        let el = b.node();
        assert_eq!(doc.node_namespace(el), Some("http://www.w3.org/2000/svg"));
        assert_eq!(
            doc.attribute(el, "xmlns:svg"),
            Some("http://www.w3.org/2000/svg")
        );
    }

    #[test]
    fn test_element_ns_default_namespace() {
        let mut b = Builder::new();
        b.element_ns("http://example.com/ns", "root").unwrap();
        b.element("child").unwrap();
        let doc = b.document();
        // The unprefixed child picks up the default namespace by lookup.
        assert_eq!(doc.node_namespace(b.node()), Some("http://example.com/ns"));
    }

    #[test]
    fn test_unbound_prefix_fails_and_leaves_no_node() {
        let mut b = Builder::new();
        b.element("root").unwrap();
        let err = b.element("nope:child").unwrap_err();
        assert!(matches!(err, BuildError::Namespace(_)));
        assert_eq!(b.document().children(b.node()).count(), 0);
    }

    #[test]
    fn test_declaration_fields() {
        let mut b = Builder::new();
        b.declaration(Some("1.0"), Some("UTF-8"), Some(true));
        assert_eq!(b.document().version.as_deref(), Some("1.0"));
        assert_eq!(b.document().encoding.as_deref(), Some("UTF-8"));
        assert_eq!(b.document().standalone, Some(true));
    }

    #[test]
    fn test_into_document() {
        let mut b = Builder::new();
        b.element("root").unwrap();
        let doc = b.into_document();
        assert!(doc.root_element().is_some());
    }
}
