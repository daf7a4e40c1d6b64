//! Qualified names and namespace resolution.
//!
//! A qualified name is `prefix:localname` or just `localname`. Namespace
//! declarations are ordinary attributes of the reserved form `xmlns="uri"`
//! (default namespace) or `xmlns:pfx="uri"` (prefix binding); resolution
//! walks the element's own declarations and then its ancestors', innermost
//! binding first.
//!
//! Resolution happens when a node is finalized into the tree (element
//! creation, attribute set), not lazily at write time. Later mutations to
//! ancestor declarations do not retroactively change a child's
//! already-resolved namespace, which keeps serialization deterministic and
//! order-independent. An unresolvable prefix is a [`BuildError::Namespace`]
//! at resolution time, never a silent default.
//!
//! See <https://www.w3.org/TR/xml-names/>

use crate::error::BuildError;
use crate::tree::{Document, NodeId, NodeKind};

/// The well-known XML namespace URI, pre-bound to the `xml` prefix.
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// The namespace URI of namespace declaration attributes themselves.
pub const XMLNS_NAMESPACE: &str = "http://www.w3.org/2000/xmlns/";

/// A qualified name split into its prefix and local parts.
///
/// # Examples
///
/// ```
/// use xmlforge::namespace::QName;
///
/// let q = QName::parse("svg:rect");
/// assert_eq!(q.prefix.as_deref(), Some("svg"));
/// assert_eq!(q.local, "rect");
///
/// let q = QName::parse("rect");
/// assert_eq!(q.prefix, None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QName {
    /// The namespace prefix, if the name contained a colon.
    pub prefix: Option<String>,
    /// The local part of the name.
    pub local: String,
}

impl QName {
    /// Splits a qualified name at its first colon.
    #[must_use]
    pub fn parse(qname: &str) -> Self {
        match qname.find(':') {
            Some(pos) => Self {
                prefix: Some(qname[..pos].to_string()),
                local: qname[pos + 1..].to_string(),
            },
            None => Self {
                prefix: None,
                local: qname.to_string(),
            },
        }
    }
}

/// Returns `true` if a qualified attribute name is a namespace declaration
/// (`xmlns` or `xmlns:pfx`).
#[must_use]
pub fn is_declaration(qname: &str) -> bool {
    qname == "xmlns" || qname.starts_with("xmlns:")
}

/// Resolves a prefix (or the default namespace, for `None`) against the
/// declarations visible on `from` and its ancestors.
///
/// The `xml` prefix is pre-bound. An empty declaration value (`xmlns=""`)
/// undeclares the default namespace. Returns `None` when no binding is in
/// scope.
pub(crate) fn lookup(doc: &Document, from: NodeId, prefix: Option<&str>) -> Option<String> {
    if prefix == Some("xml") {
        return Some(XML_NAMESPACE.to_string());
    }

    for node in doc.ancestors(from) {
        if let NodeKind::Element { attributes, .. } = &doc.node(node).kind {
            for attr in attributes {
                let matches = match prefix {
                    None => attr.prefix.is_none() && attr.name == "xmlns",
                    Some(p) => attr.prefix.as_deref() == Some("xmlns") && attr.name == p,
                };
                if matches {
                    if attr.value.is_empty() {
                        // xmlns="" undeclares the default namespace
                        return None;
                    }
                    return Some(attr.value.clone());
                }
            }
        }
    }
    None
}

/// Computes the namespace of a single attribute given its prefix.
///
/// Unprefixed attributes have no namespace; they do not inherit the
/// element's. Declaration attributes live in the `xmlns` namespace.
fn attribute_namespace(
    doc: &Document,
    element: NodeId,
    prefix: Option<&str>,
    name: &str,
) -> Result<Option<String>, BuildError> {
    match prefix {
        None => {
            if name == "xmlns" {
                Ok(Some(XMLNS_NAMESPACE.to_string()))
            } else {
                Ok(None)
            }
        }
        Some("xmlns") => Ok(Some(XMLNS_NAMESPACE.to_string())),
        Some("xml") => Ok(Some(XML_NAMESPACE.to_string())),
        Some(p) => match lookup(doc, element, Some(p)) {
            Some(uri) => Ok(Some(uri)),
            None => Err(BuildError::Namespace(format!(
                "attribute prefix '{p}' is not bound to a namespace in scope"
            ))),
        },
    }
}

/// Resolves an element's namespace and the namespaces of all its attributes
/// against the declarations in scope (its own included).
///
/// # Errors
///
/// Returns `BuildError::Namespace` if the element's prefix or any attribute
/// prefix has no declaration in scope, or if the element uses the reserved
/// `xmlns` prefix.
pub(crate) fn resolve_element(doc: &mut Document, element: NodeId) -> Result<(), BuildError> {
    let (prefix, attr_names) = match &doc.node(element).kind {
        NodeKind::Element {
            prefix, attributes, ..
        } => (
            prefix.clone(),
            attributes
                .iter()
                .map(|a| (a.prefix.clone(), a.name.clone()))
                .collect::<Vec<_>>(),
        ),
        _ => return Ok(()),
    };

    if prefix.as_deref() == Some("xmlns") {
        return Err(BuildError::Namespace(
            "'xmlns' cannot be used as an element prefix".to_string(),
        ));
    }

    let ns = match prefix.as_deref() {
        Some(p) => match lookup(doc, element, Some(p)) {
            Some(uri) => Some(uri),
            None => {
                return Err(BuildError::Namespace(format!(
                    "prefix '{p}' is not bound to a namespace in scope"
                )));
            }
        },
        None => lookup(doc, element, None),
    };

    if let NodeKind::Element { namespace, .. } = &mut doc.node_mut(element).kind {
        *namespace = ns;
    }

    for (apfx, aname) in attr_names {
        let ans = attribute_namespace(doc, element, apfx.as_deref(), &aname)?;
        if let NodeKind::Element { attributes, .. } = &mut doc.node_mut(element).kind {
            if let Some(attr) = attributes
                .iter_mut()
                .find(|a| a.prefix == apfx && a.name == aname)
            {
                attr.namespace = ans;
            }
        }
    }

    Ok(())
}

/// Resolves the namespace of one attribute of an element, identified by
/// qualified name.
///
/// # Errors
///
/// Returns `BuildError::Namespace` if the attribute's prefix has no
/// declaration in scope.
pub(crate) fn resolve_attribute(
    doc: &mut Document,
    element: NodeId,
    qname: &str,
) -> Result<(), BuildError> {
    let q = QName::parse(qname);
    let ns = attribute_namespace(doc, element, q.prefix.as_deref(), &q.local)?;
    if let NodeKind::Element { attributes, .. } = &mut doc.node_mut(element).kind {
        if let Some(attr) = attributes
            .iter_mut()
            .find(|a| a.prefix.as_deref() == q.prefix.as_deref() && a.name == q.local)
        {
            attr.namespace = ns;
        }
    }
    Ok(())
}

/// Resolves every element in a subtree, top-down, starting at `root`.
///
/// Called when a converted subtree is spliced into the tree, so that
/// declarations carried by the subtree itself and by the new ancestors are
/// all visible.
pub(crate) fn resolve_subtree(doc: &mut Document, root: NodeId) -> Result<(), BuildError> {
    let mut ids = vec![root];
    ids.extend(doc.descendants(root));
    for id in ids {
        if matches!(doc.node(id).kind, NodeKind::Element { .. }) {
            resolve_element(doc, id)?;
        }
    }
    Ok(())
}
