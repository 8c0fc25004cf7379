//! Value model shared by the loader and the dumper.
//!
//! Scalars (`Null`, `Bool`, `Str`) are plain data. Sequences, mappings and
//! reference cells carry identity and live in the document's [`Graph`];
//! a [`Value::Node`] is a pointer into that arena.

mod compare;
mod graph;
mod typed;

use bytes::Bytes;

pub use graph::{Graph, HandleId, Mapping, Node, NodeId};
pub use typed::{Typed, TypedError};

/// A dynamically typed value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    /// Binary-safe string.
    Str(Bytes),
    /// Identity-bearing composite stored in the owning [`Graph`].
    Node(NodeId),
    Typed(Box<Typed>),
    /// Opaque host artifact stored in the owning [`Graph`].
    Handle(HandleId),
}

impl Value {
    pub fn str(bytes: impl Into<Bytes>) -> Self {
        Value::Str(bytes.into())
    }

    pub fn typed(typed: Typed) -> Self {
        Value::Typed(Box::new(typed))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Str(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_typed(&self) -> Option<&Typed> {
        match self {
            Value::Typed(t) => Some(t),
            _ => None,
        }
    }

    /// Identity of the arena node this value points at, looking through
    /// typed wrappers.
    pub fn as_node(&self) -> Option<NodeId> {
        match self {
            Value::Node(id) => Some(*id),
            Value::Typed(t) => t.payload().as_node(),
            _ => None,
        }
    }

    /// Short name of the variant, used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Str(_) => "string",
            Value::Node(_) => "node",
            Value::Typed(_) => "typed",
            Value::Handle(_) => "handle",
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(Bytes::copy_from_slice(s.as_bytes()))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(Bytes::from(s))
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::Str(Bytes::from(b))
    }
}

impl From<Bytes> for Value {
    fn from(b: Bytes) -> Self {
        Value::Str(b)
    }
}

impl From<Typed> for Value {
    fn from(t: Typed) -> Self {
        Value::typed(t)
    }
}

/// One document: the arena plus its root value.
#[derive(Debug, Default)]
pub struct Document {
    pub graph: Graph,
    pub root: Value,
}

impl Document {
    pub fn new(
        graph: Graph,
        root: Value,
    ) -> Self {
        Self { graph, root }
    }

    /// A document consisting of a single scalar.
    pub fn scalar(root: Value) -> Self {
        Self::new(Graph::new(), root)
    }

    /// Resolves `value` to the node it points at (through typed wrappers).
    pub fn node(
        &self,
        value: &Value,
    ) -> Option<&Node> {
        value.as_node().and_then(|id| self.graph.get(id))
    }

    /// Structural comparison with another document.
    ///
    /// Nodes are compared by content, not identity; cycles terminate because
    /// a pair of nodes already under comparison is assumed equal. Handles are
    /// equal when they occupy the same slot of their tables.
    pub fn structurally_eq(
        &self,
        other: &Document,
    ) -> bool {
        compare::structurally_eq(&self.graph, &self.root, &other.graph, &other.root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tag::TagKind;

    #[test]
    fn test_as_node_sees_through_typed() {
        let mut g = Graph::new();
        let map = g.mapping([("x", Value::from("1"))]);
        let id = map.as_node().unwrap();
        let typed = Value::typed(Typed::new(TagKind::Hash, Some("P".into()), map).unwrap());
        assert_eq!(typed.as_node(), Some(id));
        assert!(Value::from("s").as_node().is_none());
    }

    #[test]
    fn test_scalar_accessors() {
        assert!(Value::Null.is_null());
        assert_eq!(Value::from(true).as_bool(), Some(true));
        assert_eq!(Value::from("abc").as_bytes(), Some(&b"abc"[..]));
        assert_eq!(Value::from(vec![0xff, 0x00]).as_bytes(), Some(&[0xff, 0x00][..]));
        assert_eq!(Value::default(), Value::Null);
    }

    #[test]
    fn test_document_node_lookup() {
        let mut g = Graph::new();
        let root = g.sequence([Value::from("a")]);
        let doc = Document::new(g, root.clone());
        assert!(matches!(doc.node(&root), Some(Node::Sequence(items)) if items.len() == 1));
        assert!(doc.node(&Value::Null).is_none());
    }
}
