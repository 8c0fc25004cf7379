//! Dumper: turns value graphs into an event stream.
//!
//! Each document is dumped in two passes. The prewalk discovers which
//! composites are reachable more than once (shared or cyclic) and converts
//! bare handles into their substitutes. Emission then writes events,
//! anchoring a shared node the first time it is met and aliasing it after.
//! The input graph is never mutated.

mod prewalk;
mod shadow;

use bytes::Bytes;
use tracing::{debug, error, trace};

use self::{
    prewalk::{prewalk, AnchorTable, Claim},
    shadow::{Scope, ShadowTable},
};
use crate::{
    config::DumperConfig,
    error::{DumpError, DumpResult},
    event::{Event, EventSink, ScalarStyle},
    scalar::needs_quotes,
    tag::{bare_tag, tag_for, TagKind},
    value::{Document, HandleId, Node, NodeId, Typed, Value},
};

/// Text emitted for a callable when its source is not dumped.
pub const CODE_PLACEHOLDER: &str = r#"{ "DUMMY" }"#;

/// Key of the single entry of a reference cell.
pub const REFERENCE_KEY: &str = "=";

/// Dumps `documents` with default options.
pub fn dump_stream(documents: &[Document]) -> DumpResult<Vec<Event>> {
    Dumper::default().dump_stream(documents)
}

#[derive(Debug, Clone, Default)]
pub struct Dumper {
    config: DumperConfig,
}

impl Dumper {
    pub fn new(config: DumperConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DumperConfig {
        &self.config
    }

    pub fn dump_stream(
        &self,
        documents: &[Document],
    ) -> DumpResult<Vec<Event>> {
        let mut events = Vec::new();
        self.dump_into(&mut events, documents)?;
        Ok(events)
    }

    /// Writes the whole stream to `sink`. A sink failure aborts the call;
    /// events already accepted by the sink stay there.
    pub fn dump_into<S>(
        &self,
        sink: &mut S,
        documents: &[Document],
    ) -> DumpResult<()>
    where
        S: EventSink + ?Sized,
    {
        emit_to(sink, Event::StreamStart)?;
        for (i, doc) in documents.iter().enumerate() {
            debug!(document = i + 1, nodes = doc.graph.len(), "Dumping document");
            self.dump_document(sink, doc)?;
        }
        emit_to(sink, Event::StreamEnd)?;
        debug!(documents = documents.len(), "Stream dumped");
        Ok(())
    }

    fn dump_document<S>(
        &self,
        sink: &mut S,
        doc: &Document,
    ) -> DumpResult<()>
    where
        S: EventSink + ?Sized,
    {
        let mut shadows = ShadowTable::new(&doc.graph);
        let mut anchors = AnchorTable::new(&self.config.anchor_prefix);
        prewalk(&doc.root, &mut shadows, &mut anchors, &self.config)?;

        let mut emitter = Emitter {
            config: &self.config,
            shadows: &shadows,
            anchors,
            sink,
            depth: 0,
        };
        emitter.emit(Event::DocumentStart)?;
        emitter.value(Scope::ROOT, &doc.root)?;
        emitter.emit(Event::DocumentEnd)
    }
}

fn emit_to<S>(
    sink: &mut S,
    event: Event,
) -> DumpResult<()>
where
    S: EventSink + ?Sized,
{
    sink.emit(event).map_err(|e| {
        error!(error = %e, "Event sink failed");
        DumpError::from(e)
    })
}

fn malformed(reason: impl Into<String>) -> DumpError {
    let err = DumpError::malformed(reason);
    error!(error = %err, "Cannot dump value");
    err
}

fn depth_error(
    current: usize,
    max: usize,
) -> DumpError {
    let err = DumpError::DepthLimit { current, max };
    error!(error = %err, "Nesting too deep");
    err
}

/// Scalar event for a string, quoted when a reader would take it for
/// something else.
fn string_scalar(
    text: Bytes,
    tag: Option<String>,
) -> Event {
    let style = if needs_quotes(&text) {
        ScalarStyle::Quoted
    } else {
        ScalarStyle::Plain
    };
    Event::Scalar {
        value: text,
        style,
        tag,
    }
}

/// Whether a typed wrapper of `kind` may sit on `node`.
fn wrapper_fits(
    kind: TagKind,
    node: &Node,
) -> bool {
    matches!(
        (kind, node),
        (TagKind::Hash, Node::Mapping(_))
            | (TagKind::Array, Node::Sequence(_))
            | (TagKind::Ref | TagKind::Scalar, Node::Reference(_))
    )
}

struct Emitter<'a, S: ?Sized> {
    config: &'a DumperConfig,
    shadows: &'a ShadowTable<'a>,
    anchors: AnchorTable,
    sink: &'a mut S,
    depth: usize,
}

impl<S> Emitter<'_, S>
where
    S: EventSink + ?Sized,
{
    fn emit(
        &mut self,
        event: Event,
    ) -> DumpResult<()> {
        emit_to(self.sink, event)
    }

    fn enter(&mut self) -> DumpResult<()> {
        self.depth += 1;
        if self.depth > self.config.max_depth {
            return Err(depth_error(self.depth, self.config.max_depth));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn value(
        &mut self,
        scope: Scope,
        value: &Value,
    ) -> DumpResult<()> {
        match value {
            Value::Null => self.emit(Event::plain("~")),
            Value::Bool(true) => self.emit(Event::plain("true")),
            Value::Bool(false) => self.emit(Event::plain("false")),
            Value::Str(text) => self.emit(string_scalar(text.clone(), None)),
            Value::Node(id) => self.node(scope, *id, None),
            Value::Typed(typed) => self.typed(scope, typed),
            Value::Handle(handle) => self.handle(scope, *handle),
        }
    }

    fn typed(
        &mut self,
        scope: Scope,
        typed: &Typed,
    ) -> DumpResult<()> {
        let tag = tag_for(typed);
        match (typed.kind(), typed.payload()) {
            (TagKind::Code, Value::Handle(handle)) => {
                let text = self.code_text(scope, *handle)?;
                self.emit(string_scalar(text, Some(tag)))
            }
            (TagKind::Code | TagKind::Regexp | TagKind::Scalar, Value::Str(text)) => {
                self.emit(string_scalar(text.clone(), Some(tag)))
            }
            (
                kind @ (TagKind::Hash | TagKind::Array | TagKind::Ref | TagKind::Scalar),
                Value::Node(id),
            ) => self.node(scope, *id, Some((kind, tag))),
            (kind, payload) => Err(malformed(format!(
                "kind '{kind}' cannot wrap a {} payload",
                payload.kind_name()
            ))),
        }
    }

    /// Emits a composite. `typed` carries the wrapper kind and rendered tag
    /// when the node was reached through a typed wrapper.
    fn node(
        &mut self,
        scope: Scope,
        id: NodeId,
        typed: Option<(TagKind, String)>,
    ) -> DumpResult<()> {
        let shadows = self.shadows;
        let Some(node) = shadows.graph(scope).get(id) else {
            return Err(malformed(format!("{id} is not in the graph")));
        };

        let tag = match typed {
            Some((kind, _)) if !wrapper_fits(kind, node) => {
                return Err(malformed(format!(
                    "kind '{kind}' cannot wrap {id}, a {}",
                    node.kind_name()
                )))
            }
            Some((_, tag)) => Some(tag),
            None => None,
        };

        let anchor = match self.anchors.claim((scope, id)) {
            Claim::Alias(name) => {
                trace!(anchor = %name, "Alias emitted");
                return self.emit(Event::alias(name));
            }
            Claim::Anchor(name) => {
                trace!(anchor = %name, %id, "Anchor assigned");
                Some(name)
            }
            Claim::Plain => None,
        };

        self.enter()?;
        match node {
            Node::Sequence(items) => {
                self.emit(Event::SequenceStart { anchor, tag })?;
                for item in items {
                    self.value(scope, item)?;
                }
                self.emit(Event::SequenceEnd)?;
            }
            Node::Mapping(map) => {
                self.emit(Event::MappingStart { anchor, tag })?;
                let mut entries: Vec<_> = map.iter().collect();
                if self.config.sort_keys {
                    entries.sort_by(|a, b| a.0.cmp(b.0));
                }
                for (key, item) in entries {
                    self.emit(string_scalar(key.clone(), None))?;
                    self.value(scope, item)?;
                }
                self.emit(Event::MappingEnd)?;
            }
            Node::Reference(inner) => {
                let tag = tag.unwrap_or_else(|| bare_tag(TagKind::Ref));
                self.emit(Event::MappingStart {
                    anchor,
                    tag: Some(tag),
                })?;
                self.emit(Event::plain(REFERENCE_KEY))?;
                self.value(scope, inner)?;
                self.emit(Event::MappingEnd)?;
            }
        }
        self.leave();
        Ok(())
    }

    /// A bare handle is emitted as the substitute produced during the
    /// prewalk.
    fn handle(
        &mut self,
        scope: Scope,
        handle: HandleId,
    ) -> DumpResult<()> {
        let shadows = self.shadows;
        let Some(substitute) = shadows
            .get(scope, handle)
            .and_then(|target| shadows.root_of(target).map(|root| (target, root)))
        else {
            return Err(malformed(format!("{handle} has no substitute")));
        };

        self.enter()?;
        self.value(substitute.0, substitute.1)?;
        self.leave();
        Ok(())
    }

    fn code_text(
        &self,
        scope: Scope,
        handle: HandleId,
    ) -> DumpResult<Bytes> {
        let Some(object) = self.shadows.graph(scope).handle(handle) else {
            return Err(malformed(format!("{handle} is not in the graph")));
        };
        let text = match &self.config.code_formatter {
            Some(formatter) if self.config.dump_code => formatter.to_text(object),
            _ => None,
        };
        Ok(Bytes::from(
            text.unwrap_or_else(|| CODE_PLACEHOLDER.to_owned()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use std::{any::Any, sync::Arc};

    use super::*;
    use crate::{collab::CodeFormatter, error::EmitError, value::Graph};

    fn body(events: Vec<Event>) -> Vec<Event> {
        events[2..events.len() - 2].to_vec()
    }

    fn dump_one(doc: Document) -> Vec<Event> {
        body(dump_stream(&[doc]).unwrap())
    }

    #[test]
    fn test_empty_stream() {
        assert_eq!(
            dump_stream(&[]).unwrap(),
            vec![Event::StreamStart, Event::StreamEnd]
        );
    }

    #[test]
    fn test_scalar_quoting() {
        let mut g = Graph::new();
        let root = g.sequence([
            Value::Null,
            Value::Bool(true),
            Value::from("true"),
            Value::from("~"),
            Value::from(""),
            Value::from("null"),
            Value::from("plain"),
        ]);
        let events = dump_one(Document::new(g, root));
        assert_eq!(
            events,
            vec![
                Event::sequence_start(),
                Event::plain("~"),
                Event::plain("true"),
                Event::quoted("true"),
                Event::quoted("~"),
                Event::quoted(""),
                Event::quoted("null"),
                Event::plain("plain"),
                Event::SequenceEnd,
            ]
        );
    }

    /// Тест проверяет, что общий узел выгружается один раз с якорем, а
    /// второе вхождение становится алиасом.
    #[test]
    fn test_shared_mapping_anchor_then_alias() {
        let mut g = Graph::new();
        let shared = g.mapping([("k", Value::from("v"))]);
        let root = g.sequence([shared.clone(), shared]);
        let events = dump_one(Document::new(g, root));
        assert_eq!(
            events,
            vec![
                Event::sequence_start(),
                Event::MappingStart {
                    anchor: Some("1".into()),
                    tag: None
                },
                Event::plain("k"),
                Event::plain("v"),
                Event::MappingEnd,
                Event::alias("1"),
                Event::SequenceEnd,
            ]
        );
    }

    #[test]
    fn test_self_reference_cell() {
        let mut g = Graph::new();
        let id = g.alloc(Node::Reference(Value::Null));
        g.replace(id, Node::Reference(Value::Node(id)));
        let events = dump_one(Document::new(g, Value::Node(id)));
        assert_eq!(
            events,
            vec![
                Event::MappingStart {
                    anchor: Some("1".into()),
                    tag: Some(bare_tag(TagKind::Ref)),
                },
                Event::plain("="),
                Event::alias("1"),
                Event::MappingEnd,
            ]
        );
    }

    #[test]
    fn test_sort_keys() {
        let mut g = Graph::new();
        let root = g.mapping([("b", Value::from("2")), ("a", Value::from("1"))]);
        let doc = Document::new(g, root);
        let dumper = Dumper::new(DumperConfig::default().with_sort_keys(true));
        let events = body(dumper.dump_stream(std::slice::from_ref(&doc)).unwrap());
        assert_eq!(events[1], Event::plain("a"));
        assert_eq!(events[3], Event::plain("b"));
    }

    #[test]
    fn test_code_placeholder_without_formatter() {
        let mut g = Graph::new();
        let handle = g.add_handle(|| 1);
        let code = Typed::new(TagKind::Code, None, handle).unwrap();
        let events = dump_one(Document::new(g, Value::typed(code)));
        assert_eq!(
            events,
            vec![Event::Scalar {
                value: Bytes::from(CODE_PLACEHOLDER),
                style: ScalarStyle::Plain,
                tag: Some(bare_tag(TagKind::Code)),
            }]
        );
    }

    struct NamedFormatter;

    impl CodeFormatter for NamedFormatter {
        fn to_text(
            &self,
            handle: &dyn Any,
        ) -> Option<String> {
            handle.downcast_ref::<&str>().map(|s| format!("sub {{ {s} }}"))
        }
    }

    #[test]
    fn test_code_text_with_formatter() {
        let mut g = Graph::new();
        let handle = g.add_handle("42");
        let code = Typed::new(TagKind::Code, Some("Calc".into()), handle).unwrap();
        let doc = Document::new(g, Value::typed(code));
        let config = DumperConfig::default()
            .with_dump_code(true)
            .with_code_formatter(Arc::new(NamedFormatter));
        let events = body(Dumper::new(config).dump_stream(&[doc]).unwrap());
        assert!(matches!(
            &events[0],
            Event::Scalar { value, .. } if &value[..] == b"sub { 42 }"
        ));
    }

    #[test]
    fn test_missing_node_is_malformed() {
        let doc = Document::new(Graph::new(), Graph::new().sequence([]));
        let err = dump_stream(&[doc]).unwrap_err();
        assert!(matches!(err, DumpError::MalformedValue { .. }));
    }

    #[test]
    fn test_typed_kind_mismatch_is_malformed() {
        let mut g = Graph::new();
        let seq = g.sequence([]);
        let wrong = Typed::new(TagKind::Hash, Some("P".into()), seq).unwrap();
        let err = dump_stream(&[Document::new(g, Value::typed(wrong))]).unwrap_err();
        assert!(err.to_string().contains("cannot wrap"));
    }

    #[test]
    fn test_bare_handle_without_converter_is_malformed() {
        let mut g = Graph::new();
        let handle = g.add_handle(1u8);
        let err = dump_stream(&[Document::new(g, handle)]).unwrap_err();
        assert!(matches!(err, DumpError::MalformedValue { .. }));
    }

    struct RejectingSink {
        accepted: usize,
    }

    impl EventSink for RejectingSink {
        fn emit(
            &mut self,
            event: Event,
        ) -> Result<(), EmitError> {
            if matches!(event, Event::DocumentStart) {
                return Err(EmitError::rejected("no documents"));
            }
            self.accepted += 1;
            Ok(())
        }
    }

    #[test]
    fn test_sink_failure_aborts() {
        let mut sink = RejectingSink { accepted: 0 };
        let err = Dumper::default()
            .dump_into(&mut sink, &[Document::scalar(Value::Null)])
            .unwrap_err();
        assert!(matches!(err, DumpError::Emit(_)));
        assert_eq!(sink.accepted, 1);
    }

    #[test]
    fn test_depth_limit() {
        let mut g = Graph::new();
        let mut v = g.sequence([]);
        for _ in 0..3 {
            v = g.sequence([v]);
        }
        let dumper = Dumper::new(DumperConfig::default().with_max_depth(2));
        let err = dumper.dump_stream(&[Document::new(g, v)]).unwrap_err();
        assert!(matches!(err, DumpError::DepthLimit { max: 2, .. }));
    }
}
