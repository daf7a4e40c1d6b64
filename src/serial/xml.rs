//! The string writer.
//!
//! Serializes a `Document` tree into markup text. Escaping of reserved
//! characters is delegated to the [`crate::escape`] collaborators; this
//! module only decides structure, indentation, and newlines.

use crate::escape::{escape_attribute_value, escape_text};
use crate::tree::{Document, NodeId, NodeKind};

/// Options controlling string output.
///
/// # Examples
///
/// ```
/// use xmlforge::{serial, Builder};
/// use xmlforge::serial::WriteOptions;
///
/// let mut builder = Builder::new();
/// builder.element("root")?.element("child")?.text("Hello")?;
///
/// let xml = serial::serialize_with_options(
///     builder.document(),
///     &WriteOptions::default().indent(true),
/// );
/// assert!(xml.contains("  <child>"));
/// # Ok::<(), xmlforge::BuildError>(())
/// ```
#[derive(Debug, Clone)]
pub struct WriteOptions {
    /// Whether to emit the XML declaration (`<?xml version="1.0"?>`).
    /// Defaults to `true`.
    pub decl: bool,
    /// Whether to produce indented (pretty-printed) output.
    /// Defaults to `false`.
    pub indent: bool,
    /// The indentation string used for each level when `indent` is `true`.
    /// Defaults to two spaces.
    pub indent_str: String,
    /// The newline string used between lines when `indent` is `true`.
    /// Defaults to `"\n"`.
    pub newline: String,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            decl: true,
            indent: false,
            indent_str: "  ".to_string(),
            newline: "\n".to_string(),
        }
    }
}

impl WriteOptions {
    /// Enables or disables the XML declaration. Enabled by default.
    #[must_use]
    pub fn decl(mut self, decl: bool) -> Self {
        self.decl = decl;
        self
    }

    /// Enables or disables indented (pretty-printed) output.
    ///
    /// When enabled, child elements are placed on their own lines with
    /// indentation (two spaces per level by default). Mixed-content
    /// elements (those containing both text and element children) are not
    /// indented. Disabled by default.
    #[must_use]
    pub fn indent(mut self, indent: bool) -> Self {
        self.indent = indent;
        self
    }

    /// Sets the indentation string used for each nesting level.
    ///
    /// The default is two spaces (`"  "`). Common alternatives include a
    /// tab (`"\t"`) or four spaces. Only takes effect when
    /// [`indent`](Self::indent) is enabled.
    #[must_use]
    pub fn indent_str(mut self, s: &str) -> Self {
        self.indent_str = s.to_string();
        self
    }

    /// Sets the newline string (e.g. `"\r\n"` for Windows-style output).
    /// Only takes effect when [`indent`](Self::indent) is enabled.
    #[must_use]
    pub fn newline(mut self, s: &str) -> Self {
        self.newline = s.to_string();
        self
    }
}

/// Serializes a document to a markup string with default options.
///
/// # Examples
///
/// ```
/// use xmlforge::{serial, Builder};
///
/// let mut builder = Builder::new();
/// builder.element("root")?.text("Hello")?;
/// assert_eq!(
///     serial::serialize(builder.document()),
///     "<?xml version=\"1.0\"?><root>Hello</root>"
/// );
/// # Ok::<(), xmlforge::BuildError>(())
/// ```
#[must_use]
pub fn serialize(doc: &Document) -> String {
    serialize_with_options(doc, &WriteOptions::default())
}

/// Serializes a document to a markup string with the given options.
#[must_use]
pub fn serialize_with_options(doc: &Document, options: &WriteOptions) -> String {
    let mut out = String::new();

    if options.decl {
        let version = doc.version.as_deref().unwrap_or("1.0");
        out.push_str("<?xml version=\"");
        out.push_str(version);
        out.push('"');
        if let Some(ref encoding) = doc.encoding {
            out.push_str(" encoding=\"");
            out.push_str(encoding);
            out.push('"');
        }
        if let Some(standalone) = doc.standalone {
            out.push_str(" standalone=\"");
            out.push_str(if standalone { "yes" } else { "no" });
            out.push('"');
        }
        out.push_str("?>");
        if options.indent {
            out.push_str(&options.newline);
        }
    }

    let mut first = true;
    for child in doc.children(doc.root()) {
        if options.indent && !first {
            out.push_str(&options.newline);
        }
        serialize_node(doc, child, &mut out, options, 0, false);
        first = false;
    }

    out
}

/// Returns `true` if the element contains only other elements (and optional
/// whitespace text), meaning it's safe to add indentation.
fn is_element_only(doc: &Document, id: NodeId) -> bool {
    let mut has_element_child = false;
    for child in doc.children(id) {
        match &doc.node(child).kind {
            NodeKind::Element { .. } => has_element_child = true,
            NodeKind::Text { content } => {
                if !content.trim().is_empty() {
                    return false;
                }
            }
            NodeKind::CData { .. } => return false,
            _ => {}
        }
    }
    has_element_child
}

fn push_indent(out: &mut String, options: &WriteOptions, depth: usize) {
    for _ in 0..depth {
        out.push_str(&options.indent_str);
    }
}

fn push_qname(out: &mut String, prefix: Option<&str>, name: &str) {
    if let Some(pfx) = prefix {
        out.push_str(pfx);
        out.push(':');
    }
    out.push_str(name);
}

#[allow(clippy::too_many_lines)]
fn serialize_node(
    doc: &Document,
    id: NodeId,
    out: &mut String,
    options: &WriteOptions,
    depth: usize,
    parent_is_element_only: bool,
) {
    let indent = options.indent;
    match &doc.node(id).kind {
        NodeKind::Element {
            name,
            prefix,
            attributes,
            ..
        } => {
            if indent && parent_is_element_only {
                push_indent(out, options, depth);
            }
            out.push('<');
            push_qname(out, prefix.as_deref(), name);

            for attr in attributes {
                out.push(' ');
                push_qname(out, attr.prefix.as_deref(), &attr.name);
                out.push_str("=\"");
                out.push_str(&escape_attribute_value(&attr.value));
                out.push('"');
            }

            if doc.first_child(id).is_none() {
                out.push_str("/>");
                if indent && parent_is_element_only {
                    out.push_str(&options.newline);
                }
            } else {
                out.push('>');
                let element_only = indent && is_element_only(doc, id);
                if element_only {
                    out.push_str(&options.newline);
                }
                for child in doc.children(id) {
                    if element_only {
                        if let NodeKind::Text { content } = &doc.node(child).kind {
                            if content.trim().is_empty() {
                                continue;
                            }
                        }
                    }
                    serialize_node(doc, child, out, options, depth + 1, element_only);
                }
                if element_only {
                    push_indent(out, options, depth);
                }
                out.push_str("</");
                push_qname(out, prefix.as_deref(), name);
                out.push('>');
                if indent && parent_is_element_only {
                    out.push_str(&options.newline);
                }
            }
        }
        NodeKind::Text { content } => {
            out.push_str(&escape_text(content));
        }
        NodeKind::CData { content } => {
            out.push_str("<![CDATA[");
            out.push_str(content);
            out.push_str("]]>");
        }
        NodeKind::Comment { content } => {
            if indent && parent_is_element_only {
                push_indent(out, options, depth);
            }
            out.push_str("<!--");
            out.push_str(content);
            out.push_str("-->");
            if indent && parent_is_element_only {
                out.push_str(&options.newline);
            }
        }
        NodeKind::ProcessingInstruction { target, data } => {
            if indent && parent_is_element_only {
                push_indent(out, options, depth);
            }
            out.push_str("<?");
            out.push_str(target);
            if let Some(d) = data {
                out.push(' ');
                out.push_str(d);
            }
            out.push_str("?>");
            if indent && parent_is_element_only {
                out.push_str(&options.newline);
            }
        }
        // The document node is never a child; fragments never survive
        // conversion.
        NodeKind::Document | NodeKind::Fragment => {}
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::builder::Builder;

    #[test]
    fn test_serialize_empty_element() {
        let mut b = Builder::new();
        b.element("br").unwrap();
        assert_eq!(serialize(b.document()), "<?xml version=\"1.0\"?><br/>");
    }

    #[test]
    fn test_serialize_element_with_text() {
        let mut b = Builder::new();
        b.element("p").unwrap().text("Hello").unwrap();
        assert_eq!(serialize(b.document()), "<?xml version=\"1.0\"?><p>Hello</p>");
    }

    #[test]
    fn test_serialize_element_with_attributes() {
        let mut b = Builder::new();
        b.element("item")
            .unwrap()
            .attribute("id", "main")
            .unwrap()
            .attribute("class", "big")
            .unwrap();
        assert_eq!(
            serialize(b.document()),
            "<?xml version=\"1.0\"?><item id=\"main\" class=\"big\"/>"
        );
    }

    #[test]
    fn test_serialize_text_escaping() {
        let mut b = Builder::new();
        b.element("p").unwrap().text("a < b & c > d").unwrap();
        assert_eq!(
            serialize(b.document()),
            "<?xml version=\"1.0\"?><p>a &lt; b &amp; c &gt; d</p>"
        );
    }

    #[test]
    fn test_serialize_attr_escaping() {
        let mut b = Builder::new();
        b.element("a")
            .unwrap()
            .attribute("title", "He said \"hello\" & <bye>")
            .unwrap();
        assert_eq!(
            serialize(b.document()),
            "<?xml version=\"1.0\"?><a title=\"He said &quot;hello&quot; &amp; &lt;bye&gt;\"/>"
        );
    }

    #[test]
    fn test_serialize_comment_at_document_level() {
        let mut b = Builder::new();
        b.comment(" prolog ").element("root").unwrap();
        assert_eq!(
            serialize(b.document()),
            "<?xml version=\"1.0\"?><!-- prolog --><root/>"
        );
    }

    #[test]
    fn test_serialize_cdata() {
        let mut b = Builder::new();
        b.element("script").unwrap().cdata("x < 1 && y > 2").unwrap();
        assert_eq!(
            serialize(b.document()),
            "<?xml version=\"1.0\"?><script><![CDATA[x < 1 && y > 2]]></script>"
        );
    }

    #[test]
    fn test_serialize_processing_instruction() {
        let mut b = Builder::new();
        b.instruction("xml-stylesheet", Some("type=\"text/css\" href=\"style.css\""))
            .element("root")
            .unwrap();
        assert_eq!(
            serialize(b.document()),
            "<?xml version=\"1.0\"?><?xml-stylesheet type=\"text/css\" href=\"style.css\"?><root/>"
        );
    }

    #[test]
    fn test_serialize_declaration_fields() {
        let mut b = Builder::new();
        b.declaration(Some("1.0"), Some("UTF-8"), Some(true));
        b.element("root").unwrap();
        assert_eq!(
            serialize(b.document()),
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?><root/>"
        );
    }

    #[test]
    fn test_serialize_without_declaration() {
        let mut b = Builder::new();
        b.element("root").unwrap();
        let xml = serialize_with_options(b.document(), &WriteOptions::default().decl(false));
        assert_eq!(xml, "<root/>");
    }

    #[test]
    fn test_serialize_pretty_print() {
        let mut b = Builder::new();
        b.element("root")
            .unwrap()
            .element("child")
            .unwrap()
            .element("inner")
            .unwrap()
            .text("text")
            .unwrap();
        let xml = serialize_with_options(b.document(), &WriteOptions::default().indent(true));
        assert_eq!(
            xml,
            "<?xml version=\"1.0\"?>\n<root>\n  <child>\n    <inner>text</inner>\n  </child>\n</root>"
        );
    }

    #[test]
    fn test_serialize_pretty_print_mixed_content() {
        // Mixed content (element + non-whitespace text) is not indented.
        let mut b = Builder::new();
        b.element("root").unwrap().element("p").unwrap().text("Hello ").unwrap();
        b.element("b").unwrap().text("world").unwrap();
        let xml = serialize_with_options(b.document(), &WriteOptions::default().indent(true));
        assert!(xml.contains("  <p>Hello <b>world</b></p>"));
    }

    #[test]
    fn test_serialize_pretty_print_custom_indent_and_newline() {
        let mut b = Builder::new();
        b.element("root").unwrap().element("child").unwrap();
        let opts = WriteOptions::default()
            .indent(true)
            .indent_str("\t")
            .newline("\r\n");
        let xml = serialize_with_options(b.document(), &opts);
        assert_eq!(
            xml,
            "<?xml version=\"1.0\"?>\r\n<root>\r\n\t<child/>\r\n</root>"
        );
    }

    #[test]
    fn test_serialize_no_indent_matches_default() {
        let mut b = Builder::new();
        b.element("root").unwrap().element("child").unwrap().text("Hello").unwrap();
        let xml1 = serialize(b.document());
        let xml2 = serialize_with_options(b.document(), &WriteOptions::default());
        assert_eq!(xml1, xml2);
    }

    #[test]
    fn test_serialize_prefixed_names() {
        let mut b = Builder::new();
        b.element_ns("http://www.w3.org/2000/svg", "svg:svg")
            .unwrap()
            .element("svg:rect")
            .unwrap()
            .attribute("width", "10")
            .unwrap();
        assert_eq!(
            serialize(b.document()),
            "<?xml version=\"1.0\"?>\
             <svg:svg xmlns:svg=\"http://www.w3.org/2000/svg\"><svg:rect width=\"10\"/></svg:svg>"
        );
    }
}
