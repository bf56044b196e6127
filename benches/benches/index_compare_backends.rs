// Copyright 2025 the Proxima Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use proxima_engine::{Engine, EngineOptions, FlatScan, KdTree, Record, ResultBuffer};
use proxima_fof::find_friends_of_friends;
use proxima_index::{BackendKind, IndexConfig, IndexHandle, Output, PointDataset};

#[derive(Clone)]
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
    fn next_f64(&mut self) -> f64 {
        let v = self.next_u64() >> 11;
        (v as f64) / ((1u64 << 53) as f64)
    }
}

fn gen_uniform<const D: usize>(n: usize, seed: u64) -> Vec<[f64; D]> {
    let mut rng = Rng::new(seed);
    (0..n)
        .map(|_| core::array::from_fn(|_| rng.next_f64()))
        .collect()
}

fn gen_uniform_f32<const D: usize>(n: usize, seed: u64) -> Vec<[f32; D]> {
    gen_uniform::<D>(n, seed)
        .into_iter()
        .map(|p| p.map(|c| c as f32))
        .collect()
}

fn gen_clustered_3d(n_clusters: usize, per_cluster: usize, spread: f64) -> Vec<[f64; 3]> {
    let mut rng = Rng::new(0xC1A5_7E55_9999_ABCD);
    let mut out = Vec::with_capacity(n_clusters * per_cluster);
    for _ in 0..n_clusters {
        let c = [rng.next_f64(), rng.next_f64(), rng.next_f64()];
        for _ in 0..per_cluster {
            out.push(c.map(|x| x + (rng.next_f64() - 0.5) * spread));
        }
    }
    out
}

fn to_records<const D: usize>(points: &[[f64; D]]) -> Vec<Record<f64, D>> {
    points
        .iter()
        .enumerate()
        .map(|(i, &p)| Record::new(i as i64, p))
        .collect()
}

fn bench_engine_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine_build_3d");
    for &n in &[1_000usize, 10_000, 100_000] {
        let records = to_records(&gen_uniform::<3>(n, 0xCAFE_F00D_DEAD_BEEF));
        group.throughput(Throughput::Elements(n as u64));
        group.bench_function(format!("kdtree_n{n}"), |b| {
            b.iter_batched(
                || records.clone(),
                |records| black_box(KdTree::init(records, &EngineOptions::default())),
                BatchSize::LargeInput,
            )
        });
    }
    group.finish();
}

fn bench_engine_sphere(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine_sphere_3d");
    let records = to_records(&gen_uniform::<3>(50_000, 0xBADC_F00D_1234_5678));
    let queries = gen_uniform::<3>(256, 7);
    let kd = KdTree::init(records.clone(), &EngineOptions::default());
    let flat = FlatScan::init(records, &EngineOptions::default());
    group.throughput(Throughput::Elements(queries.len() as u64));
    for (name, engine) in [
        ("kdtree", &kd as &dyn Engine<f64, 3>),
        ("flat", &flat as &dyn Engine<f64, 3>),
    ] {
        group.bench_function(format!("{name}_r0.05"), |b| {
            let mut results = ResultBuffer::new();
            b.iter(|| {
                let mut total = 0usize;
                for p in &queries {
                    engine.find_sphere(&mut results, p, 0.05);
                    total += results.num_points();
                }
                black_box(total)
            })
        });
    }
    group.finish();
}

fn bench_index_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("index_queries_3d");
    let points = gen_uniform::<3>(50_000, 0xFACE_FEED_CAFE_BABE);
    let ds = PointDataset::from_points(&points).expect("valid points");
    let queries = gen_uniform::<3>(256, 11);
    group.throughput(Throughput::Elements(queries.len() as u64));
    for (name, config) in [
        ("kdtree16", IndexConfig::default()),
        ("kdtree4", IndexConfig::default().with_leaf_size(4)),
        (
            "flat",
            IndexConfig::default().with_backend(BackendKind::FlatScan),
        ),
    ] {
        group.bench_function(format!("{name}_sphere_ids"), |b| {
            b.iter(|| {
                IndexHandle::scoped_with(&ds, &config, |index| {
                    let mut total = 0;
                    for p in &queries {
                        total += index.sphere(p, 0.05, Output::Ids)?.len();
                    }
                    Ok::<_, proxima_index::Error>(black_box(total))
                })
                .expect("query")
            })
        });
        group.bench_function(format!("{name}_periodic_count"), |b| {
            b.iter(|| {
                IndexHandle::scoped_with(&ds, &config, |index| {
                    index.set_boundaries(0.0, 1.0)?;
                    let mut total = 0;
                    for p in &queries {
                        total += index.sphere_periodic(p, 0.05, Output::Count)?.len();
                    }
                    Ok::<_, proxima_index::Error>(black_box(total))
                })
                .expect("query")
            })
        });
        group.bench_function(format!("{name}_nearest"), |b| {
            b.iter(|| {
                IndexHandle::scoped_with(&ds, &config, |index| {
                    let mut total = 0.0;
                    for p in &queries {
                        total += index.nearest_distance(p)?.unwrap_or_default();
                    }
                    Ok::<_, proxima_index::Error>(black_box(total))
                })
                .expect("query")
            })
        });
    }
    group.finish();
}

fn bench_index_f32(c: &mut Criterion) {
    let mut group = c.benchmark_group("index_queries_2d_f32");
    let points = gen_uniform_f32::<2>(50_000, 0xDEAD_BEEF_0BAD_F00D);
    let ds = PointDataset::from_points(&points).expect("valid points");
    let queries = gen_uniform_f32::<2>(256, 13);
    group.throughput(Throughput::Elements(queries.len() as u64));
    group.bench_function("kdtree_box_inside", |b| {
        b.iter(|| {
            IndexHandle::scoped(&ds, |index| {
                let mut total = 0;
                for p in &queries {
                    let hi = [p[0] + 0.05, p[1] + 0.05];
                    total += index.query_box(p, &hi, true, Output::Count)?.len();
                }
                Ok::<_, proxima_index::Error>(black_box(total))
            })
            .expect("query")
        })
    });
    group.finish();
}

fn bench_fof_clustered(c: &mut Criterion) {
    let mut group = c.benchmark_group("fof_clustered_3d");
    for &per_cluster in &[128usize, 512] {
        let points = gen_clustered_3d(16, per_cluster, 0.02);
        let ds = PointDataset::from_points(&points).expect("valid points");
        group.throughput(Throughput::Elements(points.len() as u64));
        group.bench_function(format!("n{}", points.len()), |b| {
            b.iter(|| black_box(find_friends_of_friends(&ds, 0.005, None).expect("fof")))
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_engine_build,
    bench_engine_sphere,
    bench_index_queries,
    bench_index_f32,
    bench_fof_clustered,
);
criterion_main!(benches);
