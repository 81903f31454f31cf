//! Benchmarks for document construction and rendering.
//!
//! Run with: cargo bench

use criterion::{Criterion, criterion_group, criterion_main};

use rstree::{NodeId, Tree};

/// Build a document with `sections` sections of mixed content.
fn build_document(sections: usize) -> (Tree, NodeId) {
    let mut tree = Tree::new();
    let doc = tree.document(Some(72));
    let title = tree.title("Benchmark document");
    tree.append(doc, title).unwrap();

    for s in 0..sections {
        let section = tree.section(&format!("Section {s}"));
        tree.create(doc, section, |t| {
            let para = t.paragraph(
                "A reasonably long paragraph of filler text that the renderer \
                 has to wrap against the configured width every time.",
            );
            t.append(doc, para)?;

            let list = t.bullet_list();
            for i in 0..8 {
                let item = t.list_item(&format!("list item number {i} with some words"));
                t.append(list, item)?;
            }
            t.append(doc, list)
        })
        .unwrap();
    }
    (tree, doc)
}

fn bench_build(c: &mut Criterion) {
    c.bench_function("build_50_sections", |b| {
        b.iter(|| build_document(50));
    });
}

fn bench_dump(c: &mut Criterion) {
    let (tree, doc) = build_document(50);
    c.bench_function("dump_50_sections", |b| {
        b.iter(|| tree.dump(doc));
    });
}

fn bench_dump_deep_lists(c: &mut Criterion) {
    let mut tree = Tree::new();
    let doc = tree.document(Some(60));
    let outer = tree.bullet_list();
    let mut host = outer;
    for depth in 0..12 {
        let item = tree.list_item(&format!("level {depth} content that wraps around"));
        let nested = tree.bullet_list();
        tree.append(item, nested).unwrap();
        tree.append(host, item).unwrap();
        host = nested;
    }
    tree.append(doc, outer).unwrap();

    c.bench_function("dump_nested_lists", |b| {
        b.iter(|| tree.dump(doc));
    });
}

criterion_group!(benches, bench_build, bench_dump, bench_dump_deep_lists);
criterion_main!(benches);
