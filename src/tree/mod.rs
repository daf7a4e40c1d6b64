//! Arena-based document tree.
//!
//! This module implements the core tree representation using arena allocation
//! with typed indices. All nodes live in a contiguous `Vec<NodeData>` owned by
//! the `Document`, and are referenced by `NodeId` — a newtype over
//! `NonZeroU32`.
//!
//! This design provides O(1) node access, cache-friendly layout, no reference
//! counting overhead, and safe bulk deallocation (drop the `Document` and
//! everything is freed).
//!
//! # Architecture
//!
//! Parent back-references are arena indices, never true references, so
//! ownership stays singly rooted: every non-document node has exactly one
//! owner and the tree is acyclic. Detached nodes (e.g. spent conversion
//! fragments) remain allocated in the arena but are unreachable from the
//! root.

mod attr;
mod node;

pub use node::NodeKind;

use std::num::NonZeroU32;

/// A typed index into the document's node arena.
///
/// `NodeId` is a newtype over `NonZeroU32`, meaning it can never be zero
/// and `Option<NodeId>` has the same size as `NodeId` (niche optimization).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct NodeId(NonZeroU32);

impl NodeId {
    /// Creates a `NodeId` from a raw index.
    ///
    /// # Panics
    ///
    /// Panics if `index` is 0.
    #[allow(clippy::expect_used, clippy::cast_possible_truncation)]
    fn from_index(index: usize) -> Self {
        Self(NonZeroU32::new(index as u32).expect("NodeId index must be non-zero"))
    }

    /// Returns the raw index as a `usize` for indexing into the arena.
    fn as_index(self) -> usize {
        self.0.get() as usize
    }
}

/// Storage for a single node in the document arena.
///
/// Each node stores its kind (element, text, comment, etc.) and links to
/// parent, children, and siblings for tree navigation. Access individual
/// nodes via [`Document::node`].
#[derive(Debug, Clone)]
pub struct NodeData {
    /// What kind of node this is (element, text, comment, etc.) and its payload.
    pub kind: NodeKind,
    /// Parent node, if any. The document node has no parent.
    pub parent: Option<NodeId>,
    /// First child node.
    pub first_child: Option<NodeId>,
    /// Last child node (for O(1) append).
    pub last_child: Option<NodeId>,
    /// Next sibling.
    pub next_sibling: Option<NodeId>,
    /// Previous sibling.
    pub prev_sibling: Option<NodeId>,
}

impl NodeData {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            parent: None,
            first_child: None,
            last_child: None,
            next_sibling: None,
            prev_sibling: None,
        }
    }
}

/// An attribute on an element.
///
/// Attribute names are unique within an element's table by qualified name
/// (last write wins), and the insertion order of the first write is preserved
/// across replace-in-place updates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// The attribute's local name (e.g. `"lang"` for `xml:lang`).
    pub name: String,
    /// The attribute value.
    pub value: String,
    /// Namespace prefix, if any (e.g. `"xml"` for `xml:lang`).
    pub prefix: Option<String>,
    /// Namespace URI, resolved when the attribute was set. Unprefixed
    /// attributes have no namespace; they do not inherit the element's.
    pub namespace: Option<String>,
}

/// The reserved key conventions recognized by the notation converter.
///
/// The defaults match the conventional notation grammar: `@` for attributes,
/// `#` for text, `$` for CDATA, `!` for comments, and `?` for processing
/// instructions. Attribute markers take precedence over the text marker,
/// which takes precedence over the structural (element) interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Markers {
    /// Key prefix marking an attribute (`@name`), or on its own the
    /// attribute-group key (`@` mapping to a nested object).
    pub attribute: String,
    /// Key holding the text payload of the current element.
    pub text: String,
    /// Key holding CDATA content.
    pub cdata: String,
    /// Key holding comment content.
    pub comment: String,
    /// Key holding processing-instruction content.
    pub instruction: String,
}

impl Default for Markers {
    fn default() -> Self {
        Self {
            attribute: "@".to_string(),
            text: "#".to_string(),
            cdata: "$".to_string(),
            comment: "!".to_string(),
            instruction: "?".to_string(),
        }
    }
}

/// Document-wide build configuration.
///
/// Held by the [`Document`] for its whole lifetime; the policies are
/// consulted by the attribute table and the notation converter.
#[derive(Debug, Clone, Default)]
pub struct DocumentConfig {
    /// When `true`, a null-valued attribute is stored with an empty string
    /// value instead of being skipped. Defaults to `false` (skip).
    pub keep_null_attributes: bool,
    /// When `true`, a null-valued element key in notation produces an empty
    /// element instead of being skipped. Defaults to `false` (skip).
    pub keep_null_nodes: bool,
    /// The reserved key conventions used by the notation converter.
    pub markers: Markers,
}

/// A document tree under construction or finished.
///
/// The `Document` owns all nodes in an arena and provides methods for tree
/// navigation and mutation. All tree operations go through `&Document`
/// (navigation) or `&mut Document` (mutation). Higher-level construction
/// (cursors, notation conversion, namespace resolution) lives in the
/// [`Builder`](crate::Builder).
///
/// # Examples
///
/// ```
/// use xmlforge::Builder;
///
/// let mut builder = Builder::new();
/// builder.element("root")?;
/// let doc = builder.into_document();
/// let root = doc.root_element().unwrap();
/// assert_eq!(doc.node_name(root), Some("root"));
/// # Ok::<(), xmlforge::BuildError>(())
/// ```
#[derive(Debug)]
pub struct Document {
    /// The node arena. Index 0 is unused (placeholder for `NonZeroU32`).
    nodes: Vec<NodeData>,
    /// The document node id (the container, not the document element).
    root: NodeId,
    /// Document-wide build configuration.
    config: DocumentConfig,
    /// XML version for the declaration (e.g. "1.0").
    pub version: Option<String>,
    /// Encoding for the declaration (e.g. "UTF-8").
    pub encoding: Option<String>,
    /// Standalone flag for the declaration.
    pub standalone: Option<bool>,
}

impl Document {
    /// Creates a new empty document with default configuration.
    ///
    /// The document contains a single document node and no document element.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(DocumentConfig::default())
    }

    /// Creates a new empty document with the given configuration.
    #[must_use]
    pub fn with_config(config: DocumentConfig) -> Self {
        let mut nodes = Vec::with_capacity(16);
        // Index 0: placeholder (NodeId uses NonZeroU32)
        nodes.push(NodeData::new(NodeKind::Document));
        // Index 1: the document node
        nodes.push(NodeData::new(NodeKind::Document));
        let root = NodeId::from_index(1);
        Self {
            nodes,
            root,
            config,
            version: None,
            encoding: None,
            standalone: None,
        }
    }

    /// Returns the document-wide configuration.
    #[must_use]
    pub fn config(&self) -> &DocumentConfig {
        &self.config
    }

    /// Returns the document node id.
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Returns the document element (the single top-level element).
    ///
    /// Returns `None` if no element has been built yet.
    #[must_use]
    pub fn root_element(&self) -> Option<NodeId> {
        self.children(self.root)
            .find(|&id| matches!(self.node(id).kind, NodeKind::Element { .. }))
    }

    /// Returns a reference to the `NodeData` for the given node.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not refer to a valid node.
    #[must_use]
    pub fn node(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.as_index()]
    }

    /// Returns a mutable reference to the `NodeData` for the given node.
    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut NodeData {
        &mut self.nodes[id.as_index()]
    }

    /// Returns the name of a node, if applicable.
    ///
    /// Elements return their local name, processing instructions their
    /// target; text, comments, CDATA, fragments, and the document node
    /// return `None`.
    #[must_use]
    pub fn node_name(&self, id: NodeId) -> Option<&str> {
        match &self.node(id).kind {
            NodeKind::Element { name, .. }
            | NodeKind::ProcessingInstruction { target: name, .. } => Some(name),
            _ => None,
        }
    }

    /// Returns the namespace URI of an element node, if any.
    ///
    /// Non-element nodes always return `None`. Elements with no namespace
    /// declaration in scope at finalization time also return `None`.
    #[must_use]
    pub fn node_namespace(&self, id: NodeId) -> Option<&str> {
        match &self.node(id).kind {
            NodeKind::Element { namespace, .. } => namespace.as_deref(),
            _ => None,
        }
    }

    /// Returns the namespace prefix of an element node, if any.
    #[must_use]
    pub fn node_prefix(&self, id: NodeId) -> Option<&str> {
        match &self.node(id).kind {
            NodeKind::Element { prefix, .. } => prefix.as_deref(),
            _ => None,
        }
    }

    /// Returns the text content of a text, comment, or CDATA node.
    ///
    /// For element nodes, returns `None`; use
    /// [`text_content`](Document::text_content) to get the concatenated text
    /// of all descendant text nodes.
    #[must_use]
    pub fn node_text(&self, id: NodeId) -> Option<&str> {
        match &self.node(id).kind {
            NodeKind::Text { content }
            | NodeKind::Comment { content }
            | NodeKind::CData { content } => Some(content),
            NodeKind::ProcessingInstruction { data, .. } => data.as_deref(),
            _ => None,
        }
    }

    /// Returns the concatenated text content of a node and all its
    /// descendants (text and CDATA nodes, in document order).
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        let mut result = String::new();
        self.collect_text(id, &mut result);
        result
    }

    fn collect_text(&self, id: NodeId, buf: &mut String) {
        match &self.node(id).kind {
            NodeKind::Text { content } | NodeKind::CData { content } => {
                buf.push_str(content);
            }
            _ => {
                for child in self.children(id) {
                    self.collect_text(child, buf);
                }
            }
        }
    }

    // --- Navigation ---

    /// Returns the parent of a node.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    /// Returns the first child of a node.
    #[must_use]
    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).first_child
    }

    /// Returns the last child of a node.
    #[must_use]
    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).last_child
    }

    /// Returns the next sibling of a node.
    #[must_use]
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).next_sibling
    }

    /// Returns the previous sibling of a node.
    #[must_use]
    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).prev_sibling
    }

    /// Returns an iterator over the children of a node.
    pub fn children(&self, id: NodeId) -> Children<'_> {
        Children {
            doc: self,
            next: self.node(id).first_child,
        }
    }

    /// Returns an iterator over a node and its ancestors (walking up to the
    /// document node).
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            doc: self,
            next: Some(id),
        }
    }

    /// Returns an iterator over all descendants of a node (depth-first,
    /// document order, excluding the node itself).
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants {
            doc: self,
            root: id,
            next: self.first_child(id),
        }
    }

    // --- Mutation ---

    /// Allocates a new node in the arena and returns its `NodeId`.
    ///
    /// The node starts detached; use [`append_child`](Document::append_child)
    /// to place it in the tree.
    pub fn create_node(&mut self, kind: NodeKind) -> NodeId {
        let index = self.nodes.len();
        self.nodes.push(NodeData::new(kind));
        NodeId::from_index(index)
    }

    /// Appends a child node to the end of a parent's child list.
    ///
    /// # Panics
    ///
    /// Panics in debug builds if `child` already has a parent. Detach it
    /// first.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        debug_assert!(
            self.node(child).parent.is_none(),
            "child already has a parent; detach it first"
        );

        self.node_mut(child).parent = Some(parent);

        if let Some(last) = self.node(parent).last_child {
            self.node_mut(last).next_sibling = Some(child);
            self.node_mut(child).prev_sibling = Some(last);
            self.node_mut(parent).last_child = Some(child);
        } else {
            self.node_mut(parent).first_child = Some(child);
            self.node_mut(parent).last_child = Some(child);
        }
    }

    /// Detaches a node from its parent (but does not free it from the arena).
    ///
    /// Detaching a node with no parent is a no-op.
    pub fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.node(id).parent else {
            return;
        };

        let prev = self.node(id).prev_sibling;
        let next = self.node(id).next_sibling;

        match prev {
            Some(p) => self.node_mut(p).next_sibling = next,
            None => self.node_mut(parent).first_child = next,
        }

        match next {
            Some(n) => self.node_mut(n).prev_sibling = prev,
            None => self.node_mut(parent).last_child = prev,
        }

        self.node_mut(id).parent = None;
        self.node_mut(id).prev_sibling = None;
        self.node_mut(id).next_sibling = None;
    }

    /// Returns the total number of nodes in the arena (including detached
    /// ones, excluding the placeholder).
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len() - 1
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

// --- Iterators ---

/// Iterator over the children of a node.
pub struct Children<'a> {
    doc: &'a Document,
    next: Option<NodeId>,
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.doc.node(current).next_sibling;
        Some(current)
    }
}

/// Iterator over a node and its ancestors.
pub struct Ancestors<'a> {
    doc: &'a Document,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.doc.node(current).parent;
        Some(current)
    }
}

/// Depth-first iterator over all descendants of a node.
pub struct Descendants<'a> {
    doc: &'a Document,
    root: NodeId,
    next: Option<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;

        // Try to go deeper first
        if let Some(child) = self.doc.first_child(current) {
            self.next = Some(child);
            return Some(current);
        }

        // Try next sibling
        if let Some(sibling) = self.doc.next_sibling(current) {
            self.next = Some(sibling);
            return Some(current);
        }

        // Walk up to find an ancestor with a next sibling
        let mut ancestor = self.doc.parent(current);
        while let Some(anc) = ancestor {
            if anc == self.root {
                self.next = None;
                return Some(current);
            }
            if let Some(sibling) = self.doc.next_sibling(anc) {
                self.next = Some(sibling);
                return Some(current);
            }
            ancestor = self.doc.parent(anc);
        }

        self.next = None;
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(doc: &mut Document, name: &str) -> NodeId {
        doc.create_node(NodeKind::Element {
            name: name.to_string(),
            prefix: None,
            namespace: None,
            attributes: vec![],
        })
    }

    fn text(doc: &mut Document, content: &str) -> NodeId {
        doc.create_node(NodeKind::Text {
            content: content.to_string(),
        })
    }

    #[test]
    fn test_new_document_has_root() {
        let doc = Document::new();
        assert!(matches!(doc.node(doc.root()).kind, NodeKind::Document));
        assert_eq!(doc.node_count(), 1); // just the document node
    }

    #[test]
    fn test_create_and_append_element() {
        let mut doc = Document::new();
        let root = doc.root();
        let elem = element(&mut doc, "item");
        doc.append_child(root, elem);

        assert_eq!(doc.first_child(root), Some(elem));
        assert_eq!(doc.last_child(root), Some(elem));
        assert_eq!(doc.parent(elem), Some(root));
        assert_eq!(doc.node_name(elem), Some("item"));
    }

    #[test]
    fn test_append_multiple_children() {
        let mut doc = Document::new();
        let root = doc.root();

        let a = text(&mut doc, "A");
        let b = text(&mut doc, "B");
        let c = text(&mut doc, "C");

        doc.append_child(root, a);
        doc.append_child(root, b);
        doc.append_child(root, c);

        assert_eq!(doc.first_child(root), Some(a));
        assert_eq!(doc.last_child(root), Some(c));
        assert_eq!(doc.next_sibling(a), Some(b));
        assert_eq!(doc.next_sibling(b), Some(c));
        assert_eq!(doc.next_sibling(c), None);
        assert_eq!(doc.prev_sibling(c), Some(b));
        assert_eq!(doc.prev_sibling(b), Some(a));
        assert_eq!(doc.prev_sibling(a), None);
    }

    #[test]
    fn test_children_iterator() {
        let mut doc = Document::new();
        let root = doc.root();

        let a = text(&mut doc, "A");
        let b = text(&mut doc, "B");
        let c = text(&mut doc, "C");

        doc.append_child(root, a);
        doc.append_child(root, b);
        doc.append_child(root, c);

        let children: Vec<NodeId> = doc.children(root).collect();
        assert_eq!(children, vec![a, b, c]);
    }

    #[test]
    fn test_children_iterator_empty() {
        let doc = Document::new();
        let children: Vec<NodeId> = doc.children(doc.root()).collect();
        assert!(children.is_empty());
    }

    #[test]
    fn test_detach_middle_child() {
        let mut doc = Document::new();
        let root = doc.root();

        let a = text(&mut doc, "A");
        let b = text(&mut doc, "B");
        let c = text(&mut doc, "C");

        doc.append_child(root, a);
        doc.append_child(root, b);
        doc.append_child(root, c);

        doc.detach(b);

        let children: Vec<NodeId> = doc.children(root).collect();
        assert_eq!(children, vec![a, c]);
        assert_eq!(doc.parent(b), None);
        assert_eq!(doc.next_sibling(a), Some(c));
        assert_eq!(doc.prev_sibling(c), Some(a));
    }

    #[test]
    fn test_detach_first_and_last() {
        let mut doc = Document::new();
        let root = doc.root();

        let a = text(&mut doc, "A");
        let b = text(&mut doc, "B");
        doc.append_child(root, a);
        doc.append_child(root, b);

        doc.detach(a);
        assert_eq!(doc.first_child(root), Some(b));
        assert_eq!(doc.prev_sibling(b), None);

        doc.detach(b);
        assert_eq!(doc.first_child(root), None);
        assert_eq!(doc.last_child(root), None);
    }

    #[test]
    fn test_detach_no_parent_is_noop() {
        let mut doc = Document::new();
        let orphan = text(&mut doc, "orphan");

        doc.detach(orphan);

        assert_eq!(doc.parent(orphan), None);
    }

    #[test]
    fn test_reattach_after_detach() {
        // The fragment splice relies on detach-then-append preserving order.
        let mut doc = Document::new();
        let root = doc.root();
        let frag = doc.create_node(NodeKind::Fragment);

        let a = element(&mut doc, "a");
        let b = element(&mut doc, "b");
        doc.append_child(frag, a);
        doc.append_child(frag, b);

        let items: Vec<NodeId> = doc.children(frag).collect();
        for id in items {
            doc.detach(id);
            doc.append_child(root, id);
        }

        let children: Vec<NodeId> = doc.children(root).collect();
        assert_eq!(children, vec![a, b]);
        assert_eq!(doc.children(frag).count(), 0);
        assert_eq!(doc.parent(frag), None);
    }

    #[test]
    fn test_ancestors_iterator() {
        let mut doc = Document::new();
        let root = doc.root();

        let parent = element(&mut doc, "parent");
        let child = element(&mut doc, "child");

        doc.append_child(root, parent);
        doc.append_child(parent, child);

        let ancestors: Vec<NodeId> = doc.ancestors(child).collect();
        assert_eq!(ancestors, vec![child, parent, root]);
    }

    #[test]
    fn test_descendants_iterator() {
        let mut doc = Document::new();
        let root = doc.root();

        let p = element(&mut doc, "p");
        let a = text(&mut doc, "hello ");
        let b = element(&mut doc, "b");
        let b_text = text(&mut doc, "world");

        doc.append_child(root, p);
        doc.append_child(p, a);
        doc.append_child(p, b);
        doc.append_child(b, b_text);

        let desc: Vec<NodeId> = doc.descendants(root).collect();
        assert_eq!(desc, vec![p, a, b, b_text]);
    }

    #[test]
    fn test_text_content() {
        let mut doc = Document::new();
        let root = doc.root();

        let p = element(&mut doc, "p");
        let text1 = text(&mut doc, "hello ");
        let bold = element(&mut doc, "b");
        let text2 = text(&mut doc, "world");

        doc.append_child(root, p);
        doc.append_child(p, text1);
        doc.append_child(p, bold);
        doc.append_child(bold, text2);

        assert_eq!(doc.text_content(p), "hello world");
    }

    #[test]
    fn test_root_element() {
        let mut doc = Document::new();
        let root = doc.root();

        assert_eq!(doc.root_element(), None);

        let comment = doc.create_node(NodeKind::Comment {
            content: "prolog".to_string(),
        });
        doc.append_child(root, comment);
        assert_eq!(doc.root_element(), None);

        let elem = element(&mut doc, "root");
        doc.append_child(root, elem);
        assert_eq!(doc.root_element(), Some(elem));
    }

    #[test]
    fn test_node_text() {
        let mut doc = Document::new();

        let t = text(&mut doc, "hello");
        assert_eq!(doc.node_text(t), Some("hello"));

        let comment = doc.create_node(NodeKind::Comment {
            content: "a comment".to_string(),
        });
        assert_eq!(doc.node_text(comment), Some("a comment"));

        let cdata = doc.create_node(NodeKind::CData {
            content: "cdata content".to_string(),
        });
        assert_eq!(doc.node_text(cdata), Some("cdata content"));

        let pi = doc.create_node(NodeKind::ProcessingInstruction {
            target: "target".to_string(),
            data: Some("data".to_string()),
        });
        assert_eq!(doc.node_text(pi), Some("data"));
        assert_eq!(doc.node_name(pi), Some("target"));

        let elem = element(&mut doc, "div");
        assert_eq!(doc.node_text(elem), None);
    }

    #[test]
    fn test_node_namespace_and_prefix() {
        let mut doc = Document::new();
        let elem = doc.create_node(NodeKind::Element {
            name: "rect".to_string(),
            prefix: Some("svg".to_string()),
            namespace: Some("http://www.w3.org/2000/svg".to_string()),
            attributes: vec![],
        });

        assert_eq!(doc.node_namespace(elem), Some("http://www.w3.org/2000/svg"));
        assert_eq!(doc.node_prefix(elem), Some("svg"));

        let t = text(&mut doc, "hello");
        assert_eq!(doc.node_namespace(t), None);
        assert_eq!(doc.node_prefix(t), None);
    }

    #[test]
    fn test_node_count() {
        let mut doc = Document::new();
        let root = doc.root();
        assert_eq!(doc.node_count(), 1);

        let a = element(&mut doc, "a");
        assert_eq!(doc.node_count(), 2);

        doc.append_child(root, a);
        // Appending does not change the count — nodes already exist in arena
        assert_eq!(doc.node_count(), 2);

        // Detaching does not free the node
        doc.detach(a);
        assert_eq!(doc.node_count(), 2);
    }

    #[test]
    fn test_config_defaults() {
        let doc = Document::new();
        assert!(!doc.config().keep_null_attributes);
        assert!(!doc.config().keep_null_nodes);
        assert_eq!(doc.config().markers.attribute, "@");
        assert_eq!(doc.config().markers.text, "#");
    }
}
