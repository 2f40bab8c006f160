//! Benchmarks for comparison graph operations.
//!
//! Run with: cargo bench --bench graph_benchmark
//!
//! Covers the operations that dominate a comparison run: normalizing
//! analyzer output, breadth-first reachability with call-path
//! backtracking, and absorbing partial graphs into the running one.

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use kerndiff::graph::GraphBuilder;
use kerndiff::model::{Edge, ResultKind, Side, SidePair, SymbolName, Vertex};
use kerndiff::ComparisonGraph;
use std::hint::black_box;
use std::path::PathBuf;

fn make_vertex(name: &str, result: ResultKind) -> Vertex {
    Vertex::new(
        SidePair::new(SymbolName::parse(name), SymbolName::parse(name)),
        result,
    )
    .with_location(Side::Left, Some(PathBuf::from("app/main.c")), Some(1))
    .with_location(Side::Right, Some(PathBuf::from("app/main.c")), Some(1))
}

/// Build a call chain f0 -> f1 -> ... -> f(n-1) in a single source file.
fn build_chain_builder(n: usize) -> GraphBuilder {
    let mut builder = GraphBuilder::new();
    let mut previous = None;
    for i in 0..n {
        let result = if i == n - 1 {
            ResultKind::NotEqual
        } else {
            ResultKind::Equal
        };
        let idx = builder.insert(make_vertex(&format!("f{i}"), result));
        if let Some(parent) = previous {
            for side in Side::BOTH {
                builder.add_edge(
                    parent,
                    side,
                    Edge::new(SymbolName::parse(&format!("f{i}")), "app/main.c", i as u32),
                );
            }
        }
        previous = Some(idx);
    }
    builder
}

fn build_chain_graph(n: usize) -> ComparisonGraph {
    build_chain_builder(n)
        .normalize()
        .expect("chain should normalize")
}

/// Build a two-level fan: one root calling `width` children, each
/// child calling `width` grandchildren.
fn build_fan_graph(width: usize) -> ComparisonGraph {
    let mut builder = GraphBuilder::new();
    let root = builder.insert(make_vertex("root", ResultKind::Equal));
    for i in 0..width {
        let child_name = format!("child{i}");
        let child = builder.insert(make_vertex(&child_name, ResultKind::Equal));
        for side in Side::BOTH {
            builder.add_edge(
                root,
                side,
                Edge::new(SymbolName::parse(&child_name), "app/main.c", i as u32 + 1),
            );
        }
        for j in 0..width {
            let leaf_name = format!("leaf{i}_{j}");
            builder.insert(make_vertex(&leaf_name, ResultKind::Equal));
            for side in Side::BOTH {
                builder.add_edge(
                    child,
                    side,
                    Edge::new(SymbolName::parse(&leaf_name), "app/main.c", j as u32 + 1),
                );
            }
        }
    }
    builder.normalize().expect("fan should normalize")
}

fn bench_normalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize");
    for size in [100, 1_000] {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter_batched(
                || build_chain_builder(size),
                |builder| black_box(builder.normalize().expect("normalize")),
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

fn bench_reachability(c: &mut Criterion) {
    let mut group = c.benchmark_group("reachability");
    for size in [100, 1_000] {
        let graph = build_chain_graph(size);
        group.bench_with_input(BenchmarkId::new("chain", size), &graph, |b, graph| {
            b.iter(|| {
                let reach = graph
                    .reachable_from(Side::Left, "f0")
                    .expect("reachability");
                black_box(reach.len())
            });
        });
    }
    let fan = build_fan_graph(32);
    group.bench_with_input(BenchmarkId::new("fan", 32 * 32 + 33), &fan, |b, graph| {
        b.iter(|| {
            let reach = graph
                .reachable_from(Side::Left, "root")
                .expect("reachability");
            black_box(reach.len())
        });
    });
    group.finish();
}

fn bench_callstack_backtracking(c: &mut Criterion) {
    let graph = build_chain_graph(1_000);
    let deepest = graph
        .idx_of(&SymbolName::parse("f999"))
        .expect("deepest vertex");

    c.bench_function("callstack_depth_1000", |b| {
        let reach = graph
            .reachable_from(Side::Left, "f0")
            .expect("reachability");
        b.iter(|| black_box(reach.callstack_to(black_box(deepest))));
    });
}

fn bench_absorb(c: &mut Criterion) {
    let mut group = c.benchmark_group("absorb");
    for size in [100, 1_000] {
        let incoming = build_chain_graph(size);
        group.bench_with_input(
            BenchmarkId::from_parameter(size),
            &incoming,
            |b, incoming| {
                b.iter_batched(
                    || (build_chain_graph(size), incoming.clone()),
                    |(mut accumulated, fresh)| black_box(accumulated.absorb(fresh)),
                    BatchSize::SmallInput,
                );
            },
        );
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_normalize,
    bench_reachability,
    bench_callstack_backtracking,
    bench_absorb
);
criterion_main!(benches);
