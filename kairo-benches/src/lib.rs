//! Benchmark support crate for kairo.
//!
//! Generates seeded synthetic street grids and groups the parameters used
//! by the Criterion benchmarks for centrality ranking and disruption
//! simulation.

pub mod error;
pub mod grid;
pub mod params;
