//! Node type definitions.
//!
//! The `NodeKind` enum represents all node types a built document can hold.
//! Each variant carries the node-type-specific payload (e.g. element name and
//! attributes, text content). Navigation links (parent, children, siblings)
//! are stored in `NodeData`, not here.

use super::Attribute;

/// The kind of a node and its associated data.
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// The document node. There is exactly one per `Document`, and it owns
    /// exactly one top-level element (the document element) plus optional
    /// comments and processing instructions around it.
    Document,

    /// An element node, e.g. `<item class="x">`.
    Element {
        /// The element's local name (without the namespace prefix).
        name: String,
        /// Namespace prefix (e.g. `"svg"` in `svg:rect`), if any.
        prefix: Option<String>,
        /// Namespace URI, resolved when the node was finalized into the tree.
        namespace: Option<String>,
        /// The ordered attribute table of this element.
        attributes: Vec<Attribute>,
    },

    /// A text node containing character data.
    Text {
        /// The text content, unescaped.
        content: String,
    },

    /// A CDATA section, e.g. `<![CDATA[...]]>`.
    CData {
        /// The CDATA content (no escaping applied on output).
        content: String,
    },

    /// A comment node, e.g. `<!-- ... -->`.
    Comment {
        /// The comment text (without the `<!--` and `-->` delimiters).
        content: String,
    },

    /// A processing instruction, e.g. `<?target data?>`.
    ProcessingInstruction {
        /// The PI target (e.g. `"xml-stylesheet"`).
        target: String,
        /// The PI data, if any.
        data: Option<String>,
    },

    /// A transient, parent-less sequence of sibling nodes used only as an
    /// intermediate container while converting sequence-valued notation.
    ///
    /// A fragment never appears in a finished tree: its children are spliced
    /// into the real parent and the fragment node is left detached in the
    /// arena.
    Fragment,
}
