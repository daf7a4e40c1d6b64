//! The object writer.
//!
//! Serializes a `Document` tree into a JSON-like nested object
//! (`serde_json::Value`, built with `preserve_order` so key order follows
//! document order). The output speaks the same notation grammar the
//! converter accepts: attributes become marker-prefixed keys, text collects
//! under the text marker, and repeated sibling names group into an array at
//! the first occurrence's position. Feeding the output back through the
//! converter reproduces an equivalent tree.

use crate::tree::{Document, Markers, NodeId, NodeKind};
use serde_json::{Map, Value as Json};

/// Serializes a document to a nested object value.
///
/// # Examples
///
/// ```
/// use xmlforge::{serial, Builder};
/// use serde_json::json;
///
/// let mut builder = Builder::new();
/// builder
///     .element("root")?
///     .attribute("id", "a1")?
///     .element("item")?
///     .text("bolt")?
///     .up()?
///     .element("item")?
///     .text("nut")?;
///
/// let value = serial::object::to_value(builder.document());
/// assert_eq!(
///     value,
///     json!({ "root": { "@id": "a1", "item": ["bolt", "nut"] } })
/// );
/// # Ok::<(), xmlforge::BuildError>(())
/// ```
#[must_use]
pub fn to_value(doc: &Document) -> Json {
    Json::Object(container_entries(doc, doc.root(), &doc.config().markers))
}

/// Collects the entries describing a container's attributes and children,
/// in document order, grouping repeated keys into arrays.
fn container_entries(doc: &Document, id: NodeId, markers: &Markers) -> Map<String, Json> {
    let mut out = Map::new();

    for attr in doc.attributes(id) {
        let mut key = markers.attribute.clone();
        if let Some(pfx) = &attr.prefix {
            key.push_str(pfx);
            key.push(':');
        }
        key.push_str(&attr.name);
        push_grouped(&mut out, &key, Json::String(attr.value.clone()));
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
                push_grouped(&mut out, &key, element_to_json(doc, child, markers));
            }
            NodeKind::Text { content } => {
                push_grouped(&mut out, &markers.text, Json::String(content.clone()));
            }
            NodeKind::CData { content } => {
                push_grouped(&mut out, &markers.cdata, Json::String(content.clone()));
            }
            NodeKind::Comment { content } => {
                push_grouped(&mut out, &markers.comment, Json::String(content.clone()));
            }
            NodeKind::ProcessingInstruction { target, data } => {
                let rendered = match data {
                    Some(d) => format!("{target} {d}"),
                    None => target.clone(),
                };
                push_grouped(&mut out, &markers.instruction, Json::String(rendered));
            }
            NodeKind::Document | NodeKind::Fragment => {}
        }
    }

    out
}

fn element_to_json(doc: &Document, id: NodeId, markers: &Markers) -> Json {
    // A text-only element with no attributes collapses to its string.
    if doc.attributes(id).is_empty() {
        let mut any = false;
        let text_only = doc.children(id).all(|c| {
            any = true;
            matches!(doc.node(c).kind, NodeKind::Text { .. })
        });
        if any && text_only {
            return Json::String(doc.text_content(id));
        }
    }
    Json::Object(container_entries(doc, id, markers))
}

/// Inserts a value under `key`, turning repeated keys into an array that
/// keeps the first occurrence's position.
fn push_grouped(map: &mut Map<String, Json>, key: &str, value: Json) {
    match map.get_mut(key) {
        Some(Json::Array(items)) => items.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Json::Array(vec![first, value]);
        }
        None => {
            map.insert(key.to_string(), value);
        }
    }
}
