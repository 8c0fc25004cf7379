use rustc_hash::FxHashSet;

use super::{Graph, Node, NodeId, Value};

/// Content comparison of two values living in (possibly different) graphs.
///
/// Uses an explicit work stack so deeply nested graphs do not grow the call
/// stack. Mapping comparison ignores key order.
pub(super) fn structurally_eq(
    left_graph: &Graph,
    left: &Value,
    right_graph: &Graph,
    right: &Value,
) -> bool {
    let mut assumed: FxHashSet<(NodeId, NodeId)> = FxHashSet::default();
    let mut stack: Vec<(&Value, &Value)> = vec![(left, right)];

    while let Some((a, b)) = stack.pop() {
        match (a, b) {
            (Value::Null, Value::Null) => {}
            (Value::Bool(x), Value::Bool(y)) if x == y => {}
            (Value::Str(x), Value::Str(y)) if x == y => {}
            (Value::Handle(x), Value::Handle(y)) if x == y => {}
            (Value::Typed(x), Value::Typed(y)) => {
                if x.kind() != y.kind() || x.class() != y.class() {
                    return false;
                }
                stack.push((x.payload(), y.payload()));
            }
            (Value::Node(x), Value::Node(y)) => {
                if !assumed.insert((*x, *y)) {
                    continue;
                }
                let (Some(nx), Some(ny)) = (left_graph.get(*x), right_graph.get(*y)) else {
                    return false;
                };
                match (nx, ny) {
                    (Node::Sequence(p), Node::Sequence(q)) => {
                        if p.len() != q.len() {
                            return false;
                        }
                        stack.extend(p.iter().zip(q.iter()));
                    }
                    (Node::Mapping(p), Node::Mapping(q)) => {
                        if p.len() != q.len() {
                            return false;
                        }
                        for (key, v) in p {
                            match q.get(key) {
                                Some(w) => stack.push((v, w)),
                                None => return false,
                            }
                        }
                    }
                    (Node::Reference(p), Node::Reference(q)) => stack.push((p, q)),
                    _ => return false,
                }
            }
            _ => return false,
        }
    }

    true
}
