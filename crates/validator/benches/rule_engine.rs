//! Rule engine throughput: flat objects, nested paths, collections and
//! rule-set selection.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use vigil_validator::prelude::*;

#[derive(Debug, Clone)]
struct Line {
    sku: String,
    quantity: u32,
}

#[derive(Debug, Clone)]
struct Invoice {
    number: String,
    email: String,
    total: f64,
    lines: Vec<Line>,
}

fn invoice(lines: usize, valid: bool) -> Invoice {
    Invoice {
        number: if valid { "INV-0001".into() } else { "x".into() },
        email: "billing@example.com".into(),
        total: 120.5,
        lines: (0..lines)
            .map(|i| Line {
                sku: format!("SKU{i:04}"),
                quantity: if valid || i % 2 == 0 { 1 } else { 0 },
            })
            .collect(),
    }
}

fn validator() -> ObjectValidator<Invoice> {
    let mut v = ObjectValidator::<Invoice>::new();
    v.rule_for("Number", |i: &Invoice| &i.number).not_empty().length(4, 16);
    v.rule_for("Email", |i: &Invoice| &i.email).email();
    v.rule_for("Total", |i: &Invoice| &i.total).in_range(0.0, 10_000.0);
    v.rule_for_collection("Lines", |i: &Invoice| &i.lines)
        .child_rules(|l| {
            l.rule_for("Sku", |l: &Line| &l.sku).alphanumeric();
            l.rule_for("Quantity", |l: &Line| &l.quantity).greater_than(0_u32);
        })
        .expect("single element validator");
    v.rule_set("audit", |v| {
        v.rule_for("Number", |i: &Invoice| &i.number).starts_with("INV");
        Ok(())
    })
    .expect("non-empty rule set name");
    v
}

// ============================================================================
// Flat objects
// ============================================================================

fn bench_flat(c: &mut Criterion) {
    let v = validator();
    let good = invoice(0, true);
    let bad = invoice(0, false);

    c.bench_function("object_valid", |b| b.iter(|| black_box(v.is_valid(black_box(&good)))));
    c.bench_function("object_invalid_all", |b| b.iter(|| black_box(v.get_failures(black_box(&bad)))));
    c.bench_function("object_invalid_first", |b| b.iter(|| black_box(v.validate(black_box(&bad)))));
    c.bench_function("object_rule_set_audit", |b| {
        b.iter(|| black_box(v.get_failures_for(black_box(&good), "audit")))
    });
}

// ============================================================================
// Collections
// ============================================================================

fn bench_collections(c: &mut Criterion) {
    let v = validator();
    let mut group = c.benchmark_group("collection_elements");
    for size in [10_usize, 100, 1_000] {
        let sample = invoice(size, false);
        group.bench_with_input(BenchmarkId::from_parameter(size), &sample, |b, sample| {
            b.iter(|| black_box(v.get_failures(sample)));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_flat, bench_collections);
criterion_main!(benches);
