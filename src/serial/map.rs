//! The ordered-map writer.
//!
//! Serializes a `Document` tree into an ordered map (`IndexMap`), following
//! the same shape rules and document-order traversal as the object writer:
//! attributes become marker-prefixed keys, a text-only element collapses to
//! its string, and repeated sibling names group into a sequence at the
//! first occurrence's position.

use crate::tree::{Document, Markers, NodeId, NodeKind};
use indexmap::IndexMap;

/// A node of the ordered-map output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapValue {
    /// A text payload (text content, attribute value, comment, ...).
    String(String),
    /// Repeated siblings sharing one key.
    Seq(Vec<MapValue>),
    /// A container's entries, in document order.
    Map(IndexMap<String, MapValue>),
}

/// Serializes a document to an ordered map.
///
/// # Examples
///
/// ```
/// use xmlforge::{serial, Builder};
/// use xmlforge::serial::map::{to_map, MapValue};
///
/// let mut builder = Builder::new();
/// builder.element("root")?.element("item")?.text("bolt")?;
///
/// let map = to_map(builder.document());
/// let MapValue::Map(root) = &map["root"] else { panic!("expected a map") };
/// assert_eq!(root["item"], MapValue::String("bolt".to_string()));
/// # Ok::<(), xmlforge::BuildError>(())
/// ```
#[must_use]
pub fn to_map(doc: &Document) -> IndexMap<String, MapValue> {
    container_entries(doc, doc.root(), &doc.config().markers)
}

fn container_entries(doc: &Document, id: NodeId, markers: &Markers) -> IndexMap<String, MapValue> {
    let mut out = IndexMap::new();

    for attr in doc.attributes(id) {
        let mut key = markers.attribute.clone();
        if let Some(pfx) = &attr.prefix {
            key.push_str(pfx);
            key.push(':');
        }
        key.push_str(&attr.name);
        push_grouped(&mut out, &key, MapValue::String(attr.value.clone()));
    }

    for child in doc.children(id) {
        match &doc.node(child).kind {
            NodeKind::Element { name, prefix, .. } => {
                let mut key = String::new();
                if let Some(pfx) = prefix {
                    key.push_str(pfx);
                    key.push(':');
                }
                key.push_str(name);
                push_grouped(&mut out, &key, element_to_map(doc, child, markers));
            }
            NodeKind::Text { content } => {
                push_grouped(&mut out, &markers.text, MapValue::String(content.clone()));
            }
            NodeKind::CData { content } => {
                push_grouped(&mut out, &markers.cdata, MapValue::String(content.clone()));
            }
            NodeKind::Comment { content } => {
                push_grouped(&mut out, &markers.comment, MapValue::String(content.clone()));
            }
            NodeKind::ProcessingInstruction { target, data } => {
                let rendered = match data {
                    Some(d) => format!("{target} {d}"),
                    None => target.clone(),
                };
                push_grouped(&mut out, &markers.instruction, MapValue::String(rendered));
            }
            NodeKind::Document | NodeKind::Fragment => {}
        }
    }

    out
}

fn element_to_map(doc: &Document, id: NodeId, markers: &Markers) -> MapValue {
    if doc.attributes(id).is_empty() {
        let mut any = false;
        let text_only = doc.children(id).all(|c| {
            any = true;
            matches!(doc.node(c).kind, NodeKind::Text { .. })
        });
        if any && text_only {
            return MapValue::String(doc.text_content(id));
        }
    }
    MapValue::Map(container_entries(doc, id, markers))
}

/// Inserts a value under `key`, turning repeated keys into a sequence that
/// keeps the first occurrence's position.
fn push_grouped(map: &mut IndexMap<String, MapValue>, key: &str, value: MapValue) {
    match map.get_mut(key) {
        Some(MapValue::Seq(items)) => items.push(value),
        Some(existing) => {
            let first = std::mem::replace(existing, MapValue::Seq(Vec::new()));
            if let MapValue::Seq(items) = existing {
                items.push(first);
                items.push(value);
            }
        }
        None => {
            map.insert(key.to_string(), value);
        }
    }
}
