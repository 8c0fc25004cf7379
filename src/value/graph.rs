//! Per-document arena for identity-bearing nodes.
//!
//! Sequences, mappings and reference cells live in a [`Graph`] and are
//! addressed by [`NodeId`]. Two positions holding the same `NodeId` share one
//! node, which is how shared sub-structures and cycles are expressed without
//! reference counting. Opaque host artifacts (callables, symbolic handles)
//! are kept in a parallel handle table addressed by [`HandleId`].

use std::{any::Any, fmt};

use bytes::Bytes;
use indexmap::IndexMap;

use super::Value;

/// Ordered string-keyed mapping. Keys are unique; re-inserting a key
/// overwrites its value in place and keeps the original position.
pub type Mapping = IndexMap<Bytes, Value>;

/// Identity token of a composite node inside its [`Graph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// Identity token of an opaque host artifact inside its [`Graph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandleId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl HandleId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "node #{}", self.0)
    }
}

impl fmt::Display for HandleId {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "handle #{}", self.0)
    }
}

/// A composite stored in the arena.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Sequence(Vec<Value>),
    Mapping(Mapping),
    /// A reference cell owning exactly one inner value.
    Reference(Value),
}

impl Node {
    /// Short name of the node kind, used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Node::Sequence(_) => "sequence",
            Node::Mapping(_) => "mapping",
            Node::Reference(_) => "reference",
        }
    }
}

type OpaqueHandle = Box<dyn Any + Send + Sync>;

/// Arena owning every composite node and opaque handle of one document.
#[derive(Default)]
pub struct Graph {
    nodes: Vec<Node>,
    handles: Vec<OpaqueHandle>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `node` and returns its identity.
    pub fn alloc(
        &mut self,
        node: Node,
    ) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    /// Stores `node` and returns a [`Value`] pointing at it.
    pub fn insert(
        &mut self,
        node: Node,
    ) -> Value {
        Value::Node(self.alloc(node))
    }

    pub fn sequence(
        &mut self,
        items: impl IntoIterator<Item = Value>,
    ) -> Value {
        self.insert(Node::Sequence(items.into_iter().collect()))
    }

    pub fn mapping<K: Into<Bytes>>(
        &mut self,
        entries: impl IntoIterator<Item = (K, Value)>,
    ) -> Value {
        let map = entries.into_iter().map(|(k, v)| (k.into(), v)).collect();
        self.insert(Node::Mapping(map))
    }

    pub fn reference(
        &mut self,
        inner: Value,
    ) -> Value {
        self.insert(Node::Reference(inner))
    }

    /// Replaces the node stored under `id`, returning the previous one.
    ///
    /// Used to fill a slot that was allocated as an empty placeholder so
    /// that children could refer back to it.
    pub fn replace(
        &mut self,
        id: NodeId,
        node: Node,
    ) -> Option<Node> {
        self.nodes
            .get_mut(id.0)
            .map(|slot| std::mem::replace(slot, node))
    }

    pub fn get(
        &self,
        id: NodeId,
    ) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn get_mut(
        &mut self,
        id: NodeId,
    ) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    /// Registers an opaque host artifact.
    pub fn add_handle<T: Any + Send + Sync>(
        &mut self,
        handle: T,
    ) -> Value {
        let id = HandleId(self.handles.len());
        self.handles.push(Box::new(handle));
        Value::Handle(id)
    }

    pub fn handle(
        &self,
        id: HandleId,
    ) -> Option<&(dyn Any + Send + Sync)> {
        self.handles.get(id.0).map(|h| h.as_ref())
    }

    /// Number of composite nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn handle_count(&self) -> usize {
        self.handles.len()
    }
}

impl fmt::Debug for Graph {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("Graph")
            .field("nodes", &self.nodes)
            .field("handles", &self.handles.len())
            .finish()
    }
}
