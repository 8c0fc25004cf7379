use std::{hint::black_box, time::Duration};

use bytes::Bytes;
use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput};
use yamlgraph::{dump_stream, load_stream, Document, Graph, Node, TagKind, Typed, Value};

const SIZES: &[usize] = &[100, 1_000, 10_000];

/// Широкое дерево: список из `n` небольших отображений.
fn wide_tree(n: usize) -> Document {
    let mut g = Graph::new();
    let items: Vec<Value> = (0..n)
        .map(|i| {
            let tags = g.sequence([Value::from("a"), Value::from("b")]);
            g.mapping([
                ("id", Value::from(i.to_string())),
                ("flag", Value::Bool(i % 2 == 0)),
                ("tags", tags),
            ])
        })
        .collect();
    let root = g.sequence(items);
    Document::new(g, root)
}

/// Каждый элемент ссылается на один общий узел, так что выгрузка
/// порождает `n - 1` алиасов.
fn shared_graph(n: usize) -> Document {
    let mut g = Graph::new();
    let shared = g.mapping([("name", Value::from("shared"))]);
    let blessed = Typed::new(TagKind::Hash, Some("Shared".into()), shared)
        .map(Value::typed)
        .unwrap_or(Value::Null);
    let root = g.sequence((0..n).map(|_| blessed.clone()));
    Document::new(g, root)
}

/// `n` элементов, каждый из которых ссылкой указывает обратно на корень.
fn back_links(n: usize) -> Document {
    let mut g = Graph::new();
    let root = g.alloc(Node::Sequence(Vec::new()));
    let items: Vec<Value> = (0..n)
        .map(|i| {
            let up = g.reference(Value::Node(root));
            g.mapping([("id", Value::from(i.to_string())), ("up", up)])
        })
        .collect();
    g.replace(root, Node::Sequence(items));
    Document::new(g, Value::Node(root))
}

/// Глубокая вложенность вплоть до лимита по умолчанию.
fn deep(depth: usize) -> Document {
    let mut g = Graph::new();
    let mut value = Value::str(Bytes::from_static(b"leaf"));
    for _ in 0..depth {
        value = g.sequence([value]);
    }
    Document::new(g, value)
}

fn bench_shapes(
    c: &mut Criterion,
    name: &str,
    build: fn(usize) -> Document,
    sizes: &[usize],
) {
    let mut group = c.benchmark_group(name);
    group.warm_up_time(Duration::from_secs(2));
    group.measurement_time(Duration::from_secs(5));
    group.sample_size(50);

    for &n in sizes {
        let doc = build(n);
        let events = dump_stream(std::slice::from_ref(&doc)).unwrap_or_default();
        group.throughput(Throughput::Elements(events.len() as u64));

        group.bench_with_input(BenchmarkId::new("dump", n), &doc, |b, doc| {
            b.iter(|| black_box(dump_stream(std::slice::from_ref(doc))));
        });

        group.bench_with_input(BenchmarkId::new("load", n), &events, |b, events| {
            b.iter_batched(
                || events.clone(),
                |events| black_box(load_stream(events)),
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

fn bench_wide_tree(c: &mut Criterion) {
    bench_shapes(c, "wide_tree", wide_tree, SIZES);
}

fn bench_shared_graph(c: &mut Criterion) {
    bench_shapes(c, "shared_graph", shared_graph, SIZES);
}

fn bench_back_links(c: &mut Criterion) {
    bench_shapes(c, "back_links", back_links, SIZES);
}

fn bench_deep(c: &mut Criterion) {
    bench_shapes(c, "deep_nesting", deep, &[64, 256, 500]);
}

criterion_group!(
    benches,
    bench_wide_tree,
    bench_shared_graph,
    bench_back_links,
    bench_deep
);
criterion_main!(benches);
