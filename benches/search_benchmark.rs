//! Benchmarks for canvasdoc search and layout performance.
//!
//! Run with: cargo bench
//!
//! These benchmarks run on synthetic documents mixing page text and tables.

use canvasdoc::model::Table;
use canvasdoc::render::RecordingSurface;
use canvasdoc::{group_elements, layout, EditorOptions, Element, MatchRenderer, SearchEngine};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

/// Creates a document with `sections` paragraphs, each followed by a table.
fn create_test_document(sections: usize) -> Vec<Element> {
    let mut elements = Vec::with_capacity(sections * 3);
    for i in 0..sections {
        elements.push(Element::text(format!(
            "Section {} - benchmark text with a needle and some filler words. ",
            i + 1
        )));
        elements.push(Element::checkbox(i % 2 == 0));
        elements.push(Element::table(Table::from_text(
            [
                ["cell", "needle in a cell", "plain"],
                ["more", "text", "needle"],
            ],
            120.0,
        )));
    }
    elements
}

/// Benchmark segment grouping.
fn bench_grouping(c: &mut Criterion) {
    let elements = create_test_document(100);

    c.bench_function("group_elements_100", |b| {
        b.iter(|| group_elements(black_box(&elements)).len());
    });
}

/// Benchmark search at various document sizes.
fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("search");

    for sections in [10, 100, 500].iter() {
        let elements = create_test_document(*sections);

        group.bench_function(format!("{}_sections", sections), |b| {
            let mut engine = SearchEngine::new();
            b.iter(|| {
                engine.compute(black_box(&elements), black_box("needle"));
                engine.group_count()
            });
        });
    }

    group.finish();
}

/// Benchmark layout followed by highlight rendering of the first page.
fn bench_layout_and_render(c: &mut Criterion) {
    let options = EditorOptions::default();
    let renderer = MatchRenderer::new(&options);
    let template = create_test_document(50);

    c.bench_function("layout_50_sections", |b| {
        b.iter(|| {
            let mut elements = template.clone();
            layout(black_box(&mut elements), &options).len()
        });
    });

    let mut elements = template.clone();
    let positions = layout(&mut elements, &options);
    let mut engine = SearchEngine::new();
    engine.compute(&elements, "needle");

    c.bench_function("render_first_page", |b| {
        b.iter(|| {
            let mut surface = RecordingSurface::new();
            renderer.render(
                &mut surface,
                0,
                black_box(engine.matches()),
                None,
                &elements,
                &positions,
            )
        });
    });
}

criterion_group!(benches, bench_grouping, bench_search, bench_layout_and_render);
criterion_main!(benches);
