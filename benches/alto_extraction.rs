//! ALTO text extraction benchmarks.
//!
//! Run with: cargo bench --bench alto_extraction

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ocr_to_metadata::AltoDocument;

/// Build an ALTO document with `pages` pages of 40 lines of 10 words each.
fn synthetic_alto(pages: usize) -> String {
    let mut xml = String::from(r#"<?xml version="1.0" encoding="UTF-8"?><alto xmlns="http://www.loc.gov/standards/alto/ns-v4#"><Layout>"#);
    for p in 0..pages {
        xml.push_str(&format!(r#"<Page ID="P{}"><PrintSpace><TextBlock ID="B{}">"#, p, p));
        for l in 0..40 {
            xml.push_str("<TextLine>");
            for w in 0..10 {
                xml.push_str(&format!(r#"<String CONTENT="word{}_{}"/><SP/>"#, l, w));
            }
            xml.push_str("</TextLine>");
        }
        xml.push_str("</TextBlock></PrintSpace></Page>");
    }
    xml.push_str("</Layout></alto>");
    xml
}

fn bench_alto_text(c: &mut Criterion) {
    let mut group = c.benchmark_group("alto_text");

    for pages in [1usize, 10, 50] {
        let xml = synthetic_alto(pages);
        group.bench_with_input(BenchmarkId::from_parameter(pages), &xml, |b, xml| {
            b.iter(|| {
                let doc = AltoDocument::parse_str(black_box(xml)).unwrap();
                black_box(doc.text())
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_alto_text);
criterion_main!(benches);
