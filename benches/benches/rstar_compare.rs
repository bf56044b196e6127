// Copyright 2025 the Proxima Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

#![cfg(feature = "compare_rstar")]

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use proxima_engine::{Engine, EngineOptions, KdTree, Record, ResultBuffer};

use rstar::RTree;

fn gen_uniform_3d(n: usize, mut seed: u64) -> Vec<[f64; 3]> {
    let mut next = move || {
        seed ^= seed << 13;
        seed ^= seed >> 7;
        seed ^= seed << 17;
        ((seed >> 11) as f64) / ((1u64 << 53) as f64)
    };
    (0..n).map(|_| [next(), next(), next()]).collect()
}

fn to_records(points: &[[f64; 3]]) -> Vec<Record<f64, 3>> {
    points
        .iter()
        .enumerate()
        .map(|(i, &p)| Record::new(i as i64, p))
        .collect()
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("rstar_compare_build_3d");
    for &n in &[10_000usize, 100_000] {
        let points = gen_uniform_3d(n, 0xCAFE_F00D_DEAD_BEEF);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_function(format!("proxima_kdtree_n{n}"), |b| {
            b.iter_batched(
                || to_records(&points),
                |records| black_box(KdTree::init(records, &EngineOptions::default())),
                BatchSize::LargeInput,
            )
        });
        group.bench_function(format!("rstar_bulk_n{n}"), |b| {
            b.iter_batched(
                || points.clone(),
                |points| black_box(RTree::bulk_load(points)),
                BatchSize::LargeInput,
            )
        });
    }
    group.finish();
}

fn bench_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("rstar_compare_queries_3d");
    let points = gen_uniform_3d(100_000, 0xBADC_F00D_1234_5678);
    let queries = gen_uniform_3d(256, 0x1234_5678_9ABC_DEF0);
    let kd = KdTree::init(to_records(&points), &EngineOptions::default());
    let rtree = RTree::bulk_load(points);
    let r = 0.03_f64;
    group.throughput(Throughput::Elements(queries.len() as u64));

    group.bench_function("proxima_sphere", |b| {
        let mut results = ResultBuffer::new();
        b.iter(|| {
            let mut total = 0usize;
            for p in &queries {
                kd.find_sphere(&mut results, p, r);
                total += results.num_points();
            }
            black_box(total)
        })
    });
    group.bench_function("rstar_within_distance", |b| {
        b.iter(|| {
            let total: usize = queries
                .iter()
                .map(|p| rtree.locate_within_distance(*p, r * r).count())
                .sum();
            black_box(total)
        })
    });

    group.bench_function("proxima_nearest", |b| {
        let mut results = ResultBuffer::new();
        b.iter(|| {
            let mut total = 0.0;
            for p in &queries {
                total += kd.find_next_closest_distance(&mut results, p).unwrap_or_default();
            }
            black_box(total)
        })
    });
    group.bench_function("rstar_nearest", |b| {
        b.iter(|| {
            let total: usize = queries
                .iter()
                .filter_map(|p| rtree.nearest_neighbor(p))
                .count();
            black_box(total)
        })
    });
    group.finish();
}

criterion_group!(benches, bench_build, bench_queries);
criterion_main!(benches);
