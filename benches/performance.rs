//! Performance benchmarks for interface-detector
//!
//! # Running Benchmarks
//!
//! Run all benchmarks:
//! ```bash
//! cargo bench
//! ```
//!
//! Run specific benchmark group:
//! ```bash
//! cargo bench --bench performance broad_phase
//! cargo bench --bench performance catalog
//! cargo bench --bench performance kdtree
//! cargo bench --bench performance pipeline
//! ```
//!
//! # Benchmark Groups
//!
//! - **broad_phase**: uniform grid against the exhaustive pair test
//! - **catalog**: face feature extraction over box grids
//! - **kdtree**: edge-midpoint tree construction and radius queries
//! - **pipeline**: complete detection over touching box grids

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use interface_detector::catalog::FaceCatalog;
use interface_detector::contact::broad_phase::{all_pairs, compute_cell_size, neighbor_pairs};
use interface_detector::contact::{detect_contacts, DetectionCriteria, DiagnosticLog, GroupFilter};
use kiddo::ImmutableKdTree;

mod synthetic_bodies;
use synthetic_bodies::{
    calculate_grid_dimensions, generate_box_grid, generate_scattered_bounds,
    generate_staggered_layers,
};

/// Benchmark body pair search at different scales
fn benchmark_broad_phase(c: &mut Criterion) {
    let mut group = c.benchmark_group("broad_phase");

    let scales = vec![("100", 100), ("1K", 1_000), ("10K", 10_000)];

    for (name, count) in scales {
        let extent = (count as f64).cbrt() * 6.0;
        let bounds = generate_scattered_bounds(count, extent);

        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("grid", name), &bounds, |b, bounds| {
            b.iter(|| {
                let cell_size = compute_cell_size(black_box(bounds));
                black_box(neighbor_pairs(bounds, cell_size));
            });
        });

        // Quadratic, so only the smaller scales
        if count <= 1_000 {
            group.bench_with_input(BenchmarkId::new("exhaustive", name), &bounds, |b, bounds| {
                b.iter(|| black_box(all_pairs(black_box(bounds))));
            });
        }
    }

    group.finish();
}

/// Benchmark face feature extraction
fn benchmark_catalog(c: &mut Criterion) {
    let mut group = c.benchmark_group("catalog");

    for (name, target) in [("100_bodies", 100), ("1K_bodies", 1_000)] {
        let (nx, ny, nz) = calculate_grid_dimensions(target);
        let bodies = generate_box_grid(nx, ny, nz, 10.0);

        group.throughput(Throughput::Elements((bodies.len() * 6) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), &bodies, |b, bodies| {
            b.iter(|| {
                let mut log = DiagnosticLog::new();
                black_box(FaceCatalog::build(black_box(bodies), &mut log));
            });
        });
    }

    group.finish();
}

/// Benchmark k-d tree construction and queries over edge midpoints
fn benchmark_kdtree(c: &mut Criterion) {
    let mut group = c.benchmark_group("kdtree");

    for (name, target) in [("100_bodies", 100), ("1K_bodies", 1_000)] {
        let (nx, ny, nz) = calculate_grid_dimensions(target);
        let bodies = generate_box_grid(nx, ny, nz, 10.0);
        let points: Vec<[f64; 3]> = bodies
            .iter()
            .flat_map(|body| body.edges())
            .map(|(_, edge)| {
                let m = nalgebra::center(&edge.start, &edge.end);
                [m.x, m.y, m.z]
            })
            .collect();

        group.throughput(Throughput::Elements(points.len() as u64));
        group.bench_with_input(BenchmarkId::new("construction", name), &points, |b, points| {
            b.iter(|| {
                let tree: ImmutableKdTree<f64, 3> =
                    ImmutableKdTree::new_from_slice(black_box(points));
                black_box(tree);
            });
        });

        let tree: ImmutableKdTree<f64, 3> = ImmutableKdTree::new_from_slice(&points);
        let query_point = [25.0, 25.0, 5.0];
        let radius = 10.01;

        group.bench_with_input(BenchmarkId::new("radius_query", name), &tree, |b, tree| {
            b.iter(|| {
                let results = tree.within::<kiddo::SquaredEuclidean>(
                    black_box(&query_point),
                    black_box(radius * radius),
                );
                black_box(results);
            });
        });
    }

    group.finish();
}

/// Benchmark the complete detection pipeline
fn benchmark_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");
    // Reduce sample size for the full pipeline benchmarks as they take longer
    group.sample_size(10);

    let criteria = DetectionCriteria::default();

    for (name, n) in [("25_bodies", 5), ("100_bodies", 10), ("400_bodies", 20)] {
        let grid = generate_box_grid(n, n, 1, 10.0);
        group.throughput(Throughput::Elements(grid.len() as u64));
        group.bench_with_input(BenchmarkId::new("grid", name), &grid, |b, bodies| {
            b.iter(|| {
                let report =
                    detect_contacts(black_box(bodies), &criteria, &GroupFilter::All).unwrap();
                black_box(report);
            });
        });

        let layers = generate_staggered_layers(n, 10.0, 0.1);
        group.bench_with_input(BenchmarkId::new("staggered", name), &layers, |b, bodies| {
            b.iter(|| {
                let report =
                    detect_contacts(black_box(bodies), &criteria, &GroupFilter::All).unwrap();
                black_box(report);
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_broad_phase,
    benchmark_catalog,
    benchmark_kdtree,
    benchmark_pipeline,
);

criterion_main!(benches);
