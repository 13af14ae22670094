//! Benchmark setup error type.
//!
//! Lets setup functions propagate failures with `?` instead of `.expect()`.

use kairo_core::{GraphError, KairoError};

use crate::grid::GridError;

/// Errors that may occur during benchmark setup.
#[derive(Debug, thiserror::Error)]
pub enum BenchSetupError {
    /// Synthetic grid generation failed.
    #[error("synthetic grid generation failed: {0}")]
    Grid(#[from] GridError),
    /// The generated graph was rejected.
    #[error("graph construction failed: {0}")]
    Graph(#[from] GraphError),
    /// Engine configuration or a simulation failed.
    #[error("engine operation failed: {0}")]
    Engine(#[from] KairoError),
}
