//! Benchmarks for compaction and pixel/grid translation.
//!
//! Run with: cargo bench -p dashgrid-layout

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use dashgrid_layout::{
    DEFAULT_COLUMN_COUNT, GridConfig, GridMetrics, Layout, WidgetPlacement, move_item,
    sanitize_layout,
};
use std::hint::black_box;

/// Deterministic pseudo-random layout with heavy overlap.
fn make_layout(n: usize) -> Layout {
    let mut state: u64 = 0x9E37_79B9_7F4A_7C15;
    let mut next = |modulo: u64| {
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
        ((state >> 33) % modulo) as u16
    };
    (0..n)
        .map(|i| {
            let w = 1 + next(4);
            let x = next(u64::from(DEFAULT_COLUMN_COUNT - w) + 1);
            let y = next(n as u64 / 2 + 1);
            let h = 1 + next(3);
            WidgetPlacement::new(format!("w{i}"), x, y, w, h)
        })
        .collect()
}

fn bench_sanitize(c: &mut Criterion) {
    let mut group = c.benchmark_group("compact/sanitize");
    for n in [8, 32, 128, 256] {
        let layout = make_layout(n);
        group.bench_with_input(BenchmarkId::new("overlapping", n), &layout, |b, layout| {
            b.iter(|| black_box(sanitize_layout(layout)))
        });
        let compacted = sanitize_layout(&layout);
        group.bench_with_input(BenchmarkId::new("compacted", n), &compacted, |b, layout| {
            b.iter(|| black_box(sanitize_layout(layout)))
        });
    }
    group.finish();
}

fn bench_move_item(c: &mut Criterion) {
    let mut group = c.benchmark_group("compact/move_item");
    for n in [32, 128] {
        let layout = sanitize_layout(&make_layout(n));
        group.bench_with_input(BenchmarkId::new("to_top", n), &layout, |b, layout| {
            b.iter(|| black_box(move_item(layout, "w0", 0, 0, DEFAULT_COLUMN_COUNT)))
        });
    }
    group.finish();
}

fn bench_metrics(c: &mut Criterion) {
    let metrics = GridMetrics::new(&GridConfig::default(), 1280.0);
    c.bench_function("geometry/to_grid", |b| {
        b.iter(|| {
            let mut acc = 0i32;
            for px in (0..2000).step_by(7) {
                let px = f64::from(px);
                acc = acc.wrapping_add(metrics.to_grid_x(black_box(px)));
                acc = acc.wrapping_add(metrics.to_grid_y(black_box(px)));
            }
            acc
        })
    });
}

criterion_group!(benches, bench_sanitize, bench_move_item, bench_metrics);
criterion_main!(benches);
