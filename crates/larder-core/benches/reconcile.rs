use larder_core::{h, MemoryDocument, Props, Runtime, VNode};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn rows(order: impl Iterator<Item = usize>) -> VNode {
    let items: Vec<VNode> = order
        .map(|i| {
            h(
                "li",
                Props::new().key(i as i64).class("row"),
                format!("item {i}"),
            )
        })
        .collect();
    h("ul", (), items)
}

fn rerender_unchanged_list(c: &mut Criterion) {
    let (document, container) = MemoryDocument::with_container("app");
    let runtime = Runtime::new(document);
    runtime
        .render(rows(0..200), container)
        .expect("initial render");

    c.bench_function("rerender_unchanged_list", |b| {
        b.iter(|| {
            runtime
                .render(black_box(rows(0..200)), container)
                .expect("render");
        });
    });
}

fn reverse_keyed_list(c: &mut Criterion) {
    let (document, container) = MemoryDocument::with_container("app");
    let runtime = Runtime::new(document);
    runtime
        .render(rows(0..200), container)
        .expect("initial render");
    let mut reversed = false;

    c.bench_function("reverse_keyed_list", |b| {
        b.iter(|| {
            reversed = !reversed;
            let description = if reversed {
                rows((0..200).rev())
            } else {
                rows(0..200)
            };
            runtime.render(description, container).expect("render");
        });
    });
}

criterion_group!(benches, rerender_unchanged_list, reverse_keyed_list);
criterion_main!(benches);
