#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use yamlgraph::{dump_stream, load_stream, Document, Graph, Mapping, Node, TagKind, Typed, Value};

/// Recipe for a graph. `Back(n)` points at the n-th container built so far,
/// which produces sharing and cycles.
#[derive(Debug, Arbitrary)]
enum Shape {
    Null,
    Bool(bool),
    Str(Vec<u8>),
    Seq(Vec<Shape>),
    Map(Vec<(Vec<u8>, Shape)>),
    Ref(Box<Shape>),
    Blessed(Vec<(Vec<u8>, Shape)>),
    Back(u8),
}

struct Builder {
    graph: Graph,
    built: Vec<Value>,
    depth: usize,
}

impl Builder {
    fn build(
        &mut self,
        shape: &Shape,
    ) -> Value {
        if self.depth > 64 {
            return Value::Null;
        }
        self.depth += 1;
        let value = match shape {
            Shape::Null => Value::Null,
            Shape::Bool(b) => Value::Bool(*b),
            Shape::Str(s) => Value::from(s.clone()),
            Shape::Back(n) if self.built.is_empty() => Value::from(vec![*n]),
            Shape::Back(n) => self.built[*n as usize % self.built.len()].clone(),
            Shape::Seq(items) => {
                let id = self.graph.alloc(Node::Sequence(Vec::new()));
                self.built.push(Value::Node(id));
                let items = items.iter().map(|s| self.build(s)).collect();
                self.graph.replace(id, Node::Sequence(items));
                Value::Node(id)
            }
            Shape::Map(entries) => self.mapping(entries, None),
            Shape::Blessed(entries) => self.mapping(entries, Some("Fuzz")),
            Shape::Ref(inner) => {
                let id = self.graph.alloc(Node::Reference(Value::Null));
                self.built.push(Value::Node(id));
                let inner = self.build(inner);
                self.graph.replace(id, Node::Reference(inner));
                Value::Node(id)
            }
        };
        self.depth -= 1;
        value
    }

    fn mapping(
        &mut self,
        entries: &[(Vec<u8>, Shape)],
        class: Option<&str>,
    ) -> Value {
        let id = self.graph.alloc(Node::Mapping(Default::default()));
        let value = match class {
            Some(class) => Typed::new(TagKind::Hash, Some(class.into()), Value::Node(id))
                .map(Value::typed)
                .unwrap_or(Value::Node(id)),
            None => Value::Node(id),
        };
        self.built.push(value.clone());
        let map: Mapping = entries
            .iter()
            .map(|(k, s)| (k.clone().into(), self.build(s)))
            .collect();
        self.graph.replace(id, Node::Mapping(map));
        value
    }
}

fuzz_target!(|shape: Shape| {
    let mut builder = Builder {
        graph: Graph::new(),
        built: Vec::new(),
        depth: 0,
    };
    let root = builder.build(&shape);
    let doc = Document::new(builder.graph, root);

    let events = dump_stream(std::slice::from_ref(&doc)).expect("well-formed graph must dump");
    let docs = load_stream(events).expect("dumped stream must load");
    assert!(
        doc.structurally_eq(&docs[0]),
        "roundtrip mismatch\nleft: {doc:?}\nright: {:?}",
        docs[0]
    );
});
