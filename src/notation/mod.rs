//! Conversion of loosely-typed notation values into tree mutations.
//!
//! The converter walks an arbitrary nested [`Value`] in a single
//! left-to-right, depth-first pass and emits an equivalent subtree under a
//! given parent. Map iteration order is output order.
//!
//! Every key of a map is first classified into a closed [`KeyKind`] variant
//! (attribute, attribute group, text, CDATA, comment, instruction, element)
//! and then acted on. The reserved-key conventions are decided in one
//! place, by marker precedence: attribute markers, then the text marker,
//! then the structural (element) interpretation. A literal that is genuinely
//! ambiguous under that precedence (an attribute key holding a map, an
//! attribute-group key holding a scalar) is a conversion error, never a
//! silent guess.
//!
//! Sequence values at the top level are built under a transient
//! [`NodeKind::Fragment`] node and spliced into the real parent; the
//! fragment itself is discarded and never appears in a finished tree.

mod value;

pub use value::Value;

use crate::error::BuildError;
use crate::namespace::{self, QName};
use crate::tree::{Document, Markers, NodeId, NodeKind};

/// Classification of one notation map key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyKind<'a> {
    /// `@name`: an attribute on the current element.
    Attribute(&'a str),
    /// The bare attribute marker (`@`), holding a map of attributes.
    AttributeGroup,
    /// The text marker (`#`).
    Text,
    /// The CDATA marker (`$`).
    CData,
    /// The comment marker (`!`).
    Comment,
    /// The processing-instruction marker (`?`).
    Instruction,
    /// Anything else: a child element with this name.
    Element(&'a str),
}

/// Classifies a key by marker precedence: attribute markers first, then the
/// text marker, then the structural interpretation.
fn classify<'a>(key: &'a str, markers: &Markers) -> KeyKind<'a> {
    if !markers.attribute.is_empty() {
        if key == markers.attribute {
            return KeyKind::AttributeGroup;
        }
        if let Some(rest) = key.strip_prefix(markers.attribute.as_str()) {
            if !rest.is_empty() {
                return KeyKind::Attribute(rest);
            }
        }
    }
    if key == markers.text {
        return KeyKind::Text;
    }
    if key == markers.cdata {
        return KeyKind::CData;
    }
    if key == markers.comment {
        return KeyKind::Comment;
    }
    if key == markers.instruction {
        return KeyKind::Instruction;
    }
    KeyKind::Element(key)
}

/// Converts a notation value into nodes under `parent`.
///
/// Returns the last top-level element the conversion created, if any, so the
/// builder can position its cursor there.
pub(crate) fn convert_into(
    doc: &mut Document,
    parent: NodeId,
    value: &Value,
) -> Result<Option<NodeId>, BuildError> {
    match value {
        Value::Map(entries) => apply_entries(doc, parent, entries, true),
        Value::Sequence(items) => convert_sequence(doc, parent, items),
        Value::Absent => Err(BuildError::InvalidValue(
            "an absent value cannot be converted into nodes".to_string(),
        )),
        Value::Null => Err(BuildError::InvalidValue(
            "null cannot be converted into nodes".to_string(),
        )),
        other => {
            // A bare scalar names an element.
            let mut last = None;
            if let Some(name) = other.scalar_string() {
                let id = create_element(doc, &name);
                attach(doc, parent, id, true)?;
                last = Some(id);
            }
            Ok(last)
        }
    }
}

/// Applies one map's entries to `parent` in iteration order.
///
/// `live` is true when `parent` is already finalized into the tree; in that
/// case attributes and attached children resolve their namespaces
/// immediately. Detached subtrees defer resolution to the final
/// [`attach`].
fn apply_entries(
    doc: &mut Document,
    parent: NodeId,
    entries: &indexmap::IndexMap<String, Value>,
    live: bool,
) -> Result<Option<NodeId>, BuildError> {
    let markers = doc.config().markers.clone();
    let mut last = None;
    for (key, value) in entries {
        match classify(key, &markers) {
            KeyKind::Attribute(name) => set_attr(doc, parent, name, value, live)?,
            KeyKind::AttributeGroup => {
                let Value::Map(group) = value else {
                    return Err(BuildError::InvalidValue(format!(
                        "the attribute-group key '{}' requires a map of names to scalar \
                         values, got a {}",
                        markers.attribute,
                        value.kind_name()
                    )));
                };
                for (name, v) in group {
                    set_attr(doc, parent, name, v, live)?;
                }
            }
            KeyKind::Text => append_text(doc, parent, value, &markers)?,
            KeyKind::CData => append_cdata(doc, parent, value, &markers)?,
            KeyKind::Comment => append_comment(doc, parent, value, &markers)?,
            KeyKind::Instruction => append_instruction(doc, parent, value, &markers)?,
            KeyKind::Element(name) => {
                if let Some(id) = convert_element_entry(doc, parent, name, value, live)? {
                    last = Some(id);
                }
            }
        }
    }
    Ok(last)
}

fn set_attr(
    doc: &mut Document,
    parent: NodeId,
    name: &str,
    value: &Value,
    live: bool,
) -> Result<(), BuildError> {
    if live {
        doc.set_attribute(parent, name, value)
    } else {
        doc.set_attribute_deferred(parent, name, value).map(|_| ())
    }
}

/// Converts one element-shaped entry. Sequences fan out into one sibling per
/// item, all sharing the key as name; nested sequences flatten.
fn convert_element_entry(
    doc: &mut Document,
    parent: NodeId,
    name: &str,
    value: &Value,
    live: bool,
) -> Result<Option<NodeId>, BuildError> {
    match value {
        Value::Absent => Err(BuildError::InvalidValue(format!(
            "element '{name}' has no value (absent is not a valid text value)"
        ))),
        Value::Null => {
            if doc.config().keep_null_nodes {
                let id = create_element(doc, name);
                attach(doc, parent, id, live)?;
                Ok(Some(id))
            } else {
                Ok(None)
            }
        }
        Value::Sequence(items) => {
            let mut last = None;
            for item in items {
                if let Some(id) = convert_element_entry(doc, parent, name, item, live)? {
                    last = Some(id);
                }
            }
            Ok(last)
        }
        Value::Map(entries) => {
            let id = create_element(doc, name);
            apply_entries(doc, id, entries, false)?;
            attach(doc, parent, id, live)?;
            Ok(Some(id))
        }
        other => {
            let id = create_element(doc, name);
            if let Some(content) = other.scalar_string() {
                if !content.is_empty() {
                    let text = doc.create_node(NodeKind::Text { content });
                    doc.append_child(id, text);
                }
            }
            attach(doc, parent, id, live)?;
            Ok(Some(id))
        }
    }
}

/// Character data cannot live at the document level; comments and
/// instructions can.
fn require_content_parent(
    doc: &Document,
    parent: NodeId,
    what: &str,
) -> Result<(), BuildError> {
    if matches!(doc.node(parent).kind, NodeKind::Document) {
        return Err(BuildError::InvalidState(format!(
            "{what} cannot be placed at the document level"
        )));
    }
    Ok(())
}

fn append_text(
    doc: &mut Document,
    parent: NodeId,
    value: &Value,
    markers: &Markers,
) -> Result<(), BuildError> {
    require_content_parent(doc, parent, "text")?;
    match value {
        Value::Absent => Err(BuildError::InvalidValue(format!(
            "the text key '{}' has no value",
            markers.text
        ))),
        Value::Null => Ok(()),
        Value::Sequence(items) => {
            for item in items {
                append_text(doc, parent, item, markers)?;
            }
            Ok(())
        }
        Value::Map(_) => Err(BuildError::InvalidValue(format!(
            "the text key '{}' requires a scalar value, got a map",
            markers.text
        ))),
        other => {
            if let Some(content) = other.scalar_string() {
                if !content.is_empty() {
                    let text = doc.create_node(NodeKind::Text { content });
                    doc.append_child(parent, text);
                }
            }
            Ok(())
        }
    }
}

fn append_cdata(
    doc: &mut Document,
    parent: NodeId,
    value: &Value,
    markers: &Markers,
) -> Result<(), BuildError> {
    require_content_parent(doc, parent, "CDATA")?;
    match value {
        Value::Absent => Err(BuildError::InvalidValue(format!(
            "the CDATA key '{}' has no value",
            markers.cdata
        ))),
        Value::Null => Ok(()),
        Value::Sequence(items) => {
            for item in items {
                append_cdata(doc, parent, item, markers)?;
            }
            Ok(())
        }
        Value::Map(_) => Err(BuildError::InvalidValue(format!(
            "the CDATA key '{}' requires a scalar value, got a map",
            markers.cdata
        ))),
        other => {
            if let Some(content) = other.scalar_string() {
                let cdata = doc.create_node(NodeKind::CData { content });
                doc.append_child(parent, cdata);
            }
            Ok(())
        }
    }
}

fn append_comment(
    doc: &mut Document,
    parent: NodeId,
    value: &Value,
    markers: &Markers,
) -> Result<(), BuildError> {
    match value {
        Value::Absent => Err(BuildError::InvalidValue(format!(
            "the comment key '{}' has no value",
            markers.comment
        ))),
        Value::Null => Ok(()),
        Value::Sequence(items) => {
            for item in items {
                append_comment(doc, parent, item, markers)?;
            }
            Ok(())
        }
        Value::Map(_) => Err(BuildError::InvalidValue(format!(
            "the comment key '{}' requires a scalar value, got a map",
            markers.comment
        ))),
        other => {
            if let Some(content) = other.scalar_string() {
                let comment = doc.create_node(NodeKind::Comment { content });
                doc.append_child(parent, comment);
            }
            Ok(())
        }
    }
}

fn append_instruction(
    doc: &mut Document,
    parent: NodeId,
    value: &Value,
    markers: &Markers,
) -> Result<(), BuildError> {
    match value {
        Value::Absent => Err(BuildError::InvalidValue(format!(
            "the instruction key '{}' has no value",
            markers.instruction
        ))),
        Value::Null => Ok(()),
        Value::Sequence(items) => {
            for item in items {
                append_instruction(doc, parent, item, markers)?;
            }
            Ok(())
        }
        // A map gives one instruction per entry: target -> data.
        Value::Map(entries) => {
            for (target, v) in entries {
                let data = match v {
                    Value::Null => None,
                    Value::Absent => {
                        return Err(BuildError::InvalidValue(format!(
                            "instruction '{target}' has no value"
                        )));
                    }
                    other => match other.scalar_string() {
                        Some(s) => Some(s),
                        None => {
                            return Err(BuildError::InvalidValue(format!(
                                "instruction '{target}' requires a scalar value, got a {}",
                                other.kind_name()
                            )));
                        }
                    },
                };
                let pi = doc.create_node(NodeKind::ProcessingInstruction {
                    target: target.clone(),
                    data,
                });
                doc.append_child(parent, pi);
            }
            Ok(())
        }
        // A scalar "target data" splits at the first space.
        other => {
            if let Some(content) = other.scalar_string() {
                let (target, data) = match content.split_once(' ') {
                    Some((t, d)) if !d.trim().is_empty() => {
                        (t.to_string(), Some(d.trim_start().to_string()))
                    }
                    Some((t, _)) => (t.to_string(), None),
                    None => (content, None),
                };
                let pi = doc.create_node(NodeKind::ProcessingInstruction { target, data });
                doc.append_child(parent, pi);
            }
            Ok(())
        }
    }
}

/// Converts a sequence value: each item is converted independently and the
/// results are appended as siblings, via a transient fragment.
fn convert_sequence(
    doc: &mut Document,
    parent: NodeId,
    items: &[Value],
) -> Result<Option<NodeId>, BuildError> {
    let frag = doc.create_node(NodeKind::Fragment);
    fill_fragment(doc, frag, items)?;

    // Splice the fragment's children into the real parent and resolve them
    // there, where the ancestor declarations are visible. The fragment node
    // stays detached in the arena.
    let spliced: Vec<NodeId> = doc.children(frag).collect();
    let mut last = None;
    for id in spliced {
        doc.detach(id);
        attach(doc, parent, id, true)?;
        if matches!(doc.node(id).kind, NodeKind::Element { .. }) {
            last = Some(id);
        }
    }
    Ok(last)
}

fn fill_fragment(doc: &mut Document, frag: NodeId, items: &[Value]) -> Result<(), BuildError> {
    for item in items {
        match item {
            Value::Map(entries) => {
                apply_entries(doc, frag, entries, false)?;
            }
            Value::Sequence(inner) => fill_fragment(doc, frag, inner)?,
            Value::Absent => {
                return Err(BuildError::InvalidValue(
                    "an absent value cannot be converted into nodes".to_string(),
                ));
            }
            Value::Null => {}
            other => {
                if let Some(name) = other.scalar_string() {
                    let id = create_element(doc, &name);
                    doc.append_child(frag, id);
                }
            }
        }
    }
    Ok(())
}

fn create_element(doc: &mut Document, qname: &str) -> NodeId {
    let q = QName::parse(qname);
    doc.create_node(NodeKind::Element {
        name: q.local,
        prefix: q.prefix,
        namespace: None,
        attributes: Vec::new(),
    })
}

/// Appends a finished node (or subtree root) under `parent`, enforcing the
/// single-document-element rule and, for live parents, resolving namespaces.
///
/// On a resolution failure the node is detached again, so the tree reflects
/// only the mutations that succeeded.
fn attach(doc: &mut Document, parent: NodeId, id: NodeId, live: bool) -> Result<(), BuildError> {
    if matches!(doc.node(parent).kind, NodeKind::Document)
        && matches!(doc.node(id).kind, NodeKind::Element { .. })
        && doc.root_element().is_some()
    {
        return Err(BuildError::InvalidState(
            "document already has a document element".to_string(),
        ));
    }
    doc.append_child(parent, id);
    if live {
        if let Err(e) = namespace::resolve_subtree(doc, id) {
            doc.detach(id);
            return Err(e);
        }
    }
    Ok(())
}
