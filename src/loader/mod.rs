//! Loader: turns an event stream into value graphs.
//!
//! One [`Document`] is produced per `DocumentStart … DocumentEnd` block.
//! Each composite gets its arena slot, and its anchor is registered, before
//! its children are read. An alias met while the children load (a cycle)
//! therefore resolves to the node under construction.
//!
//! Any error aborts the whole call; partially built documents are dropped.

use bytes::Bytes;
use rustc_hash::FxHashMap;
use tracing::{debug, error, trace};

use crate::{
    config::LoaderConfig,
    error::{LoadError, LoadResult, PatternError, TagError},
    event::{Event, ScalarStyle},
    scalar::resolve_plain,
    tag::{parse_tag, Tag, TagKind},
    value::{Document, Graph, Mapping, Node, NodeId, Typed, Value},
};

/// Loads every document of `events` with default options.
pub fn load_stream<I>(events: I) -> LoadResult<Vec<Document>>
where
    I: IntoIterator<Item = Event>,
{
    Loader::default().load_stream(events)
}

#[derive(Debug, Clone, Default)]
pub struct Loader {
    config: LoaderConfig,
}

impl Loader {
    pub fn new(config: LoaderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Loads a complete stream: `StreamStart`, zero or more documents,
    /// `StreamEnd`, and nothing after it.
    pub fn load_stream<I>(
        &self,
        events: I,
    ) -> LoadResult<Vec<Document>>
    where
        I: IntoIterator<Item = Event>,
    {
        let mut events = events.into_iter();

        match events.next() {
            Some(Event::StreamStart) => {}
            other => return Err(framing_error(0, "StreamStart", other.as_ref())),
        }

        let mut documents = Vec::new();
        loop {
            let index = documents.len() + 1;
            match events.next() {
                Some(Event::DocumentStart) => {
                    debug!(document = index, "Loading document");
                    let doc = DocumentLoader::new(&self.config, &mut events, index).run()?;
                    documents.push(doc);
                }
                Some(Event::StreamEnd) => break,
                other => {
                    return Err(framing_error(
                        index,
                        "DocumentStart or StreamEnd",
                        other.as_ref(),
                    ))
                }
            }
        }

        if let Some(extra) = events.next() {
            return Err(structural(
                documents.len(),
                format!("unexpected {} after StreamEnd", extra.name()),
            ));
        }

        debug!(documents = documents.len(), "Stream loaded");
        Ok(documents)
    }
}

fn structural(
    document: usize,
    reason: impl Into<String>,
) -> LoadError {
    let err = LoadError::structural(document, reason);
    error!(document, error = %err, "Event stream rejected");
    err
}

fn framing_error(
    document: usize,
    expected: &str,
    found: Option<&Event>,
) -> LoadError {
    let found = found.map_or("end of input", Event::name);
    structural(document, format!("expected {expected}, found {found}"))
}

/// Outcome of reading one position: a node, or the terminator that closes
/// the enclosing container.
enum Step {
    Node(Value),
    End(Event),
}

/// Per-document state. The anchor table does not outlive the document.
struct DocumentLoader<'a, I> {
    config: &'a LoaderConfig,
    events: &'a mut I,
    graph: Graph,
    anchors: FxHashMap<String, Value>,
    document: usize,
    depth: usize,
}

impl<'a, I> DocumentLoader<'a, I>
where
    I: Iterator<Item = Event>,
{
    fn new(
        config: &'a LoaderConfig,
        events: &'a mut I,
        document: usize,
    ) -> Self {
        Self {
            config,
            events,
            graph: Graph::new(),
            anchors: FxHashMap::default(),
            document,
            depth: 0,
        }
    }

    fn run(mut self) -> LoadResult<Document> {
        let root = match self.next_step()? {
            Step::Node(value) => {
                match self.next_event()? {
                    Event::DocumentEnd => {}
                    other => {
                        return Err(self.structural(format!(
                            "expected DocumentEnd after the root node, found {}",
                            other.name()
                        )))
                    }
                }
                value
            }
            Step::End(Event::DocumentEnd) => Value::Null,
            Step::End(other) => {
                return Err(self.structural(format!("unexpected {} at document level", other.name())))
            }
        };

        debug!(
            document = self.document,
            nodes = self.graph.len(),
            anchors = self.anchors.len(),
            "Document loaded"
        );
        Ok(Document::new(self.graph, root))
    }

    fn structural(
        &self,
        reason: impl Into<String>,
    ) -> LoadError {
        structural(self.document, reason)
    }

    fn unknown_tag(
        &self,
        err: TagError,
    ) -> LoadError {
        error!(document = self.document, tag = err.tag(), "Unknown tag");
        LoadError::from(err)
    }

    fn pattern_error(
        &self,
        source: &[u8],
        err: PatternError,
    ) -> LoadError {
        let err = LoadError::Pattern {
            pattern: String::from_utf8_lossy(source).into_owned(),
            reason: err.reason,
        };
        error!(document = self.document, error = %err, "Pattern rejected");
        err
    }

    fn next_event(&mut self) -> LoadResult<Event> {
        match self.events.next() {
            Some(event) => Ok(event),
            None => Err(self.structural("event stream ended unexpectedly")),
        }
    }

    fn next_step(&mut self) -> LoadResult<Step> {
        match self.next_event()? {
            Event::MappingStart { anchor, tag } => self.load_mapping(anchor, tag).map(Step::Node),
            Event::SequenceStart { anchor, tag } => {
                self.load_sequence(anchor, tag).map(Step::Node)
            }
            Event::Scalar { value, style, tag } => {
                self.load_scalar(value, style, tag.as_deref()).map(Step::Node)
            }
            Event::Alias { anchor } => self.resolve_alias(anchor).map(Step::Node),
            end if end.is_terminator() => Ok(Step::End(end)),
            other => Err(self.structural(format!("unexpected {} inside a document", other.name()))),
        }
    }

    fn expect_node(
        &mut self,
        context: &str,
    ) -> LoadResult<Value> {
        match self.next_step()? {
            Step::Node(value) => Ok(value),
            Step::End(end) => Err(self.structural(format!(
                "expected a node {context}, found {}",
                end.name()
            ))),
        }
    }

    fn enter(&mut self) -> LoadResult<()> {
        self.depth += 1;
        if self.depth > self.config.max_depth {
            let err = LoadError::DepthLimit {
                current: self.depth,
                max: self.config.max_depth,
            };
            error!(document = self.document, error = %err, "Nesting too deep");
            return Err(err);
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn register(
        &mut self,
        anchor: Option<String>,
        value: &Value,
    ) {
        if let Some(name) = anchor {
            trace!(document = self.document, anchor = %name, "Anchor registered");
            self.anchors.insert(name, value.clone());
        }
    }

    fn resolve_alias(
        &self,
        anchor: String,
    ) -> LoadResult<Value> {
        match self.anchors.get(&anchor) {
            Some(value) => {
                trace!(document = self.document, anchor = %anchor, "Alias resolved");
                Ok(value.clone())
            }
            None => {
                let err = LoadError::DanglingAlias {
                    document: self.document,
                    anchor,
                };
                error!(document = self.document, error = %err, "Dangling alias");
                Err(err)
            }
        }
    }

    fn parse(
        &self,
        tag: Option<&str>,
    ) -> LoadResult<Option<Tag>> {
        tag.map(|t| parse_tag(t).map_err(|e| self.unknown_tag(e)))
            .transpose()
    }

    /// Wraps `payload` unless typed wrappers are disabled.
    fn wrap(
        &self,
        kind: TagKind,
        class: Option<String>,
        payload: Value,
    ) -> LoadResult<Value> {
        if !self.config.load_blessed {
            return Ok(payload);
        }
        Typed::new(kind, class, payload)
            .map(Value::typed)
            .map_err(|e| self.structural(e.to_string()))
    }

    /// Value a freshly allocated container is known by: the bare node, or
    /// the node wrapped with its class. Computed before the children load so
    /// that aliases inside them see the typed value.
    fn container_value(
        &self,
        kind: TagKind,
        class: Option<String>,
        id: NodeId,
    ) -> LoadResult<Value> {
        match class {
            Some(class) => self.wrap(kind, Some(class), Value::Node(id)),
            None => Ok(Value::Node(id)),
        }
    }

    fn load_mapping(
        &mut self,
        anchor: Option<String>,
        tag: Option<String>,
    ) -> LoadResult<Value> {
        let class = match self.parse(tag.as_deref())? {
            None => None,
            Some(Tag {
                kind: kind @ (TagKind::Ref | TagKind::Scalar),
                class,
            }) => return self.load_reference(anchor, kind, class),
            Some(Tag {
                kind: TagKind::Hash,
                class,
            }) => class,
            Some(Tag { kind, .. }) => {
                return Err(self.structural(format!("tag kind '{kind}' cannot apply to a mapping")))
            }
        };

        self.enter()?;
        let id = self.graph.alloc(Node::Mapping(Mapping::new()));
        let value = self.container_value(TagKind::Hash, class, id)?;
        self.register(anchor, &value);

        let mut entries = Mapping::new();
        loop {
            let key = match self.next_event()? {
                Event::MappingEnd => break,
                Event::Scalar { value, tag, .. } => self.mapping_key(value, tag.as_deref())?,
                other => {
                    return Err(self.structural(format!(
                        "mapping key must be a scalar, found {}",
                        other.name()
                    )))
                }
            };
            let item = self.expect_node("as mapping value")?;
            entries.insert(key, item);
        }

        self.graph.replace(id, Node::Mapping(entries));
        self.leave();
        Ok(value)
    }

    fn mapping_key(
        &self,
        text: Bytes,
        tag: Option<&str>,
    ) -> LoadResult<Bytes> {
        match self.parse(tag)? {
            None
            | Some(Tag {
                kind: TagKind::Str,
                ..
            }) => Ok(text),
            Some(tag) => Err(self.structural(format!(
                "mapping key tagged '{}' is not plain text",
                tag.render()
            ))),
        }
    }

    fn load_sequence(
        &mut self,
        anchor: Option<String>,
        tag: Option<String>,
    ) -> LoadResult<Value> {
        let class = match self.parse(tag.as_deref())? {
            None => None,
            Some(Tag {
                kind: TagKind::Array,
                class,
            }) => class,
            Some(Tag { kind, .. }) => {
                return Err(self.structural(format!("tag kind '{kind}' cannot apply to a sequence")))
            }
        };

        self.enter()?;
        let id = self.graph.alloc(Node::Sequence(Vec::new()));
        let value = self.container_value(TagKind::Array, class, id)?;
        self.register(anchor, &value);

        let mut items = Vec::new();
        loop {
            match self.next_step()? {
                Step::Node(item) => items.push(item),
                Step::End(Event::SequenceEnd) => break,
                Step::End(other) => {
                    return Err(self.structural(format!(
                        "expected SequenceEnd, found {}",
                        other.name()
                    )))
                }
            }
        }

        self.graph.replace(id, Node::Sequence(items));
        self.leave();
        Ok(value)
    }

    /// A reference cell arrives as a single-entry mapping tagged `ref`,
    /// `ref:C` or `scalar:C`. The key is a marker and is ignored.
    fn load_reference(
        &mut self,
        anchor: Option<String>,
        kind: TagKind,
        class: Option<String>,
    ) -> LoadResult<Value> {
        self.enter()?;
        let id = self.graph.alloc(Node::Reference(Value::Null));
        let value = match (kind, class) {
            (TagKind::Ref, None) => Value::Node(id),
            (kind, class) => self.wrap(kind, class, Value::Node(id))?,
        };
        self.register(anchor, &value);

        match self.next_event()? {
            Event::Scalar { .. } => {}
            Event::MappingEnd => return Err(self.structural("reference cell has no entry")),
            other => {
                return Err(self.structural(format!(
                    "reference cell key must be a scalar, found {}",
                    other.name()
                )))
            }
        }
        let inner = self.expect_node("as reference payload")?;
        match self.next_event()? {
            Event::MappingEnd => {}
            other => {
                return Err(self.structural(format!(
                    "reference cell must hold exactly one entry, found {}",
                    other.name()
                )))
            }
        }

        self.graph.replace(id, Node::Reference(inner));
        self.leave();
        Ok(value)
    }

    fn load_scalar(
        &self,
        text: Bytes,
        style: ScalarStyle,
        tag: Option<&str>,
    ) -> LoadResult<Value> {
        let Some(Tag { kind, class }) = self.parse(tag)? else {
            return Ok(match style {
                ScalarStyle::Plain => resolve_plain(text),
                ScalarStyle::Quoted => Value::Str(text),
            });
        };

        match kind {
            TagKind::Str => Ok(Value::Str(text)),
            TagKind::Regexp => {
                let pattern = self
                    .config
                    .pattern_factory
                    .construct(&text)
                    .map_err(|e| self.pattern_error(&text, e))?;
                self.wrap(kind, class, Value::Str(pattern))
            }
            TagKind::Scalar | TagKind::Code => self.wrap(kind, class, Value::Str(text)),
            TagKind::Hash | TagKind::Array | TagKind::Ref => {
                Err(self.structural(format!("tag kind '{kind}' cannot apply to a scalar")))
            }
        }
    }
}
