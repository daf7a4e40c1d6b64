//! The event writer.
//!
//! Instead of producing an output value, this writer walks the finished
//! tree in document order and fires callbacks on an [`EventHandler`]:
//! element start/end, character data, comments, and so on, in the style of
//! streaming XML APIs. Useful for piping a built document into a consumer
//! without materializing another representation.

use crate::tree::{Document, NodeId, NodeKind};

/// An ordered event callback handler.
///
/// Implement the callbacks you care about; all methods have default no-op
/// implementations so you only need to override what you need.
///
/// # Attribute tuples
///
/// Attributes are passed as `(local_name, value, prefix, namespace_uri)`
/// tuples, in table order.
///
/// # Examples
///
/// ```
/// use xmlforge::{serial, Builder};
/// use xmlforge::serial::event::{write_events, EventHandler};
///
/// struct Counter {
///     elements: usize,
/// }
///
/// impl EventHandler for Counter {
///     fn start_element(
///         &mut self,
///         _local_name: &str,
///         _prefix: Option<&str>,
///         _namespace: Option<&str>,
///         _attributes: &[(String, String, Option<String>, Option<String>)],
///     ) {
///         self.elements += 1;
///     }
/// }
///
/// let mut builder = Builder::new();
/// builder.element("root")?.element("a")?.up()?.element("b")?;
///
/// let mut counter = Counter { elements: 0 };
/// write_events(builder.document(), &mut counter);
/// assert_eq!(counter.elements, 3);
/// # Ok::<(), xmlforge::BuildError>(())
/// ```
#[allow(unused_variables)]
pub trait EventHandler {
    /// Called once before any other event.
    fn start_document(&mut self) {}

    /// Called once after all other events.
    fn end_document(&mut self) {}

    /// Called when an element is entered, before its children.
    ///
    /// `attributes` contains `(local_name, value, prefix, namespace_uri)`
    /// tuples.
    fn start_element(
        &mut self,
        local_name: &str,
        prefix: Option<&str>,
        namespace: Option<&str>,
        attributes: &[(String, String, Option<String>, Option<String>)],
    ) {
    }

    /// Called when an element is left, after its children.
    fn end_element(&mut self, local_name: &str, prefix: Option<&str>, namespace: Option<&str>) {}

    /// Called for character data (text content).
    fn characters(&mut self, content: &str) {}

    /// Called for CDATA sections.
    fn cdata(&mut self, content: &str) {}

    /// Called for comments.
    fn comment(&mut self, content: &str) {}

    /// Called for processing instructions.
    fn processing_instruction(&mut self, target: &str, data: Option<&str>) {}
}

/// A default no-op handler. Useful as a base or for testing.
pub struct DefaultHandler;

impl EventHandler for DefaultHandler {}

/// Walks the document in document order (depth-first, attributes delivered
/// with their element, before its children), firing events on `handler`.
pub fn write_events(doc: &Document, handler: &mut dyn EventHandler) {
    handler.start_document();
    for child in doc.children(doc.root()) {
        emit_node(doc, child, handler);
    }
    handler.end_document();
}

fn emit_node(doc: &Document, id: NodeId, handler: &mut dyn EventHandler) {
    match &doc.node(id).kind {
        NodeKind::Element {
            name,
            prefix,
            namespace,
            attributes,
        } => {
            let attrs: Vec<(String, String, Option<String>, Option<String>)> = attributes
                .iter()
                .map(|a| {
                    (
                        a.name.clone(),
                        a.value.clone(),
                        a.prefix.clone(),
                        a.namespace.clone(),
                    )
                })
                .collect();
            handler.start_element(name, prefix.as_deref(), namespace.as_deref(), &attrs);
            for child in doc.children(id) {
                emit_node(doc, child, handler);
            }
            handler.end_element(name, prefix.as_deref(), namespace.as_deref());
        }
        NodeKind::Text { content } => handler.characters(content),
        NodeKind::CData { content } => handler.cdata(content),
        NodeKind::Comment { content } => handler.comment(content),
        NodeKind::ProcessingInstruction { target, data } => {
            handler.processing_instruction(target, data.as_deref());
        }
        NodeKind::Document | NodeKind::Fragment => {}
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::builder::Builder;

    /// Records every event as a line, for order assertions.
    struct Recorder {
        events: Vec<String>,
    }

    impl EventHandler for Recorder {
        fn start_document(&mut self) {
            self.events.push("start-document".to_string());
        }

        fn end_document(&mut self) {
            self.events.push("end-document".to_string());
        }

        fn start_element(
            &mut self,
            local_name: &str,
            _prefix: Option<&str>,
            _namespace: Option<&str>,
            attributes: &[(String, String, Option<String>, Option<String>)],
        ) {
            let attrs: Vec<String> = attributes
                .iter()
                .map(|(name, value, _, _)| format!("{name}={value}"))
                .collect();
            self.events
                .push(format!("start {local_name} [{}]", attrs.join(",")));
        }

        fn end_element(
            &mut self,
            local_name: &str,
            _prefix: Option<&str>,
            _namespace: Option<&str>,
        ) {
            self.events.push(format!("end {local_name}"));
        }

        fn characters(&mut self, content: &str) {
            self.events.push(format!("chars {content}"));
        }

        fn comment(&mut self, content: &str) {
            self.events.push(format!("comment {content}"));
        }
    }

    #[test]
    fn test_event_order_is_document_order() {
        let mut b = Builder::new();
        b.element("root")
            .unwrap()
            .attribute("a", "1")
            .unwrap()
            .element("child")
            .unwrap()
            .text("hi")
            .unwrap()
            .up()
            .unwrap();
        b.comment("done");

        let mut recorder = Recorder { events: vec![] };
        write_events(b.document(), &mut recorder);

        assert_eq!(
            recorder.events,
            vec![
                "start-document",
                "start root [a=1]",
                "start child []",
                "chars hi",
                "end child",
                "comment done",
                "end root",
                "end-document",
            ]
        );
    }

    #[test]
    fn test_default_handler_ignores_everything() {
        let mut b = Builder::new();
        b.element("root").unwrap().text("x").unwrap();
        write_events(b.document(), &mut DefaultHandler);
    }
}
