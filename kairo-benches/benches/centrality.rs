//! Edge-betweenness ranking benchmarks.
//!
//! Compares exact Brandes accumulation with sampled sources on street
//! grids of increasing size, and measures the cost of a warm ranking
//! cache lookup.
#![expect(
    missing_docs,
    reason = "Criterion macros generate items without doc comments"
)]
#![expect(
    clippy::shadow_reuse,
    reason = "Criterion bench_with_input closures rebind parameter names"
)]
use std::num::NonZeroUsize;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use kairo_benches::{
    error::BenchSetupError,
    grid::{GridConfig, build_grid},
    params::CentralityBenchParams,
};
use kairo_core::{CentralityMode, EngineBuilder, ExecutionStrategy, edge_betweenness};

const SEED: u64 = 42;

const SIDES: &[usize] = &[8, 16, 24];

const SAMPLED_SOURCES: usize = 32;

fn centrality_ranking_impl(c: &mut Criterion) -> Result<(), BenchSetupError> {
    let mut group = c.benchmark_group("edge_betweenness");
    group.sample_size(10);

    for &side in SIDES {
        let graph = build_grid(&GridConfig {
            side,
            bridge_every: 4,
            seed: SEED,
        })?;

        let sampled = NonZeroUsize::new(SAMPLED_SOURCES)
            .map(|sources| CentralityMode::Approximate { sources, seed: SEED });
        for (mode, sources) in [(Some(CentralityMode::Exact), None), (sampled, Some(SAMPLED_SOURCES))] {
            let Some(mode) = mode else { continue };
            let params = CentralityBenchParams { side, sources };
            group.bench_with_input(BenchmarkId::from_parameter(&params), &mode, |b, &mode| {
                b.iter(|| edge_betweenness(&graph, mode, ExecutionStrategy::Sequential));
            });
        }
    }

    group.finish();
    Ok(())
}

fn cached_ranking_impl(c: &mut Criterion) -> Result<(), BenchSetupError> {
    let graph = build_grid(&GridConfig {
        side: 16,
        bridge_every: 4,
        seed: SEED,
    })?;
    let engine = EngineBuilder::new().with_exact_centrality().build()?;
    let _warm = engine.centrality(&graph);

    c.bench_function("ranking_cache_hit", |b| {
        b.iter(|| engine.centrality(&graph));
    });
    Ok(())
}

fn centrality_ranking(c: &mut Criterion) {
    if let Err(err) = centrality_ranking_impl(c) {
        panic!("centrality ranking benchmark setup failed: {err}");
    }
}

fn cached_ranking(c: &mut Criterion) {
    if let Err(err) = cached_ranking_impl(c) {
        panic!("cached ranking benchmark setup failed: {err}");
    }
}

criterion_group!(benches, centrality_ranking, cached_ranking);
criterion_main!(benches);
