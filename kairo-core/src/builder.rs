//! Builder utilities for configuring the disruption [`Engine`].
//!
//! Exposes the execution strategy selection surface and the validation that
//! runs before an [`Engine`] is constructed.

use std::num::NonZeroUsize;

use crate::{
    CentralityMode, MajorRoadPolicy, PathHeuristic, RemovalFloor, Result,
    centrality::DEFAULT_CENTRALITY_SOURCES,
    engine::{Engine, EngineConfig},
    error::KairoError,
    simulation::{DEFAULT_PENALTY_RATIO, check_penalty},
};

/// Default number of origin–destination pairs per simulation.
pub const DEFAULT_PAIRS: usize = 20;

/// Indicates whether the [`Engine`] may fan work out over the rayon pool.
///
/// Both strategies reduce partial results in a fixed order, so they return
/// bit-identical output.
///
/// # Examples
/// ```
/// use kairo_core::ExecutionStrategy;
///
/// let strategy = ExecutionStrategy::default();
/// assert_eq!(strategy, ExecutionStrategy::Sequential);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionStrategy {
    /// Keep all work on the calling thread.
    #[default]
    Sequential,
    /// Parallelise betweenness sources and sweep settings.
    Parallel,
}

/// Configures and constructs [`Engine`] instances.
///
/// # Examples
/// ```
/// use kairo_core::{EngineBuilder, ExecutionStrategy, RemovalFloor};
///
/// let engine = EngineBuilder::new()
///     .with_pairs(40)
///     .with_removal_floor(RemovalFloor::Exact)
///     .with_execution_strategy(ExecutionStrategy::Parallel)
///     .build()
///     .expect("builder configuration is valid");
/// assert_eq!(engine.pairs().get(), 40);
/// assert_eq!(engine.removal_floor(), RemovalFloor::Exact);
/// ```
#[derive(Debug, Clone)]
pub struct EngineBuilder {
    pairs: usize,
    penalty_ratio: f64,
    exact_centrality: bool,
    centrality_sources: usize,
    centrality_seed: u64,
    major_roads: MajorRoadPolicy,
    removal_floor: RemovalFloor,
    heuristic: PathHeuristic,
    execution_strategy: ExecutionStrategy,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self {
            pairs: DEFAULT_PAIRS,
            penalty_ratio: DEFAULT_PENALTY_RATIO,
            exact_centrality: false,
            centrality_sources: DEFAULT_CENTRALITY_SOURCES.get(),
            centrality_seed: 0,
            major_roads: MajorRoadPolicy::default(),
            removal_floor: RemovalFloor::default(),
            heuristic: PathHeuristic::default(),
            execution_strategy: ExecutionStrategy::default(),
        }
    }
}

impl EngineBuilder {
    /// Creates a builder populated with default parameters.
    ///
    /// # Examples
    /// ```
    /// use kairo_core::{EngineBuilder, ExecutionStrategy};
    ///
    /// let builder = EngineBuilder::new();
    /// assert_eq!(builder.pairs(), 20);
    /// assert_eq!(builder.penalty_ratio(), 5.0);
    /// assert_eq!(builder.execution_strategy(), ExecutionStrategy::Sequential);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the number of origin–destination pairs per simulation.
    #[must_use]
    pub const fn with_pairs(mut self, pairs: usize) -> Self {
        self.pairs = pairs;
        self
    }

    /// Returns the configured pair count.
    #[must_use]
    pub const fn pairs(&self) -> usize {
        self.pairs
    }

    /// Overrides the ratio recorded for disconnected pairs.
    #[must_use]
    pub const fn with_penalty_ratio(mut self, penalty_ratio: f64) -> Self {
        self.penalty_ratio = penalty_ratio;
        self
    }

    /// Returns the configured penalty ratio.
    #[must_use]
    pub const fn penalty_ratio(&self) -> f64 {
        self.penalty_ratio
    }

    /// Ranks links with exact betweenness over every source node.
    #[must_use]
    pub const fn with_exact_centrality(mut self) -> Self {
        self.exact_centrality = true;
        self
    }

    /// Ranks links with betweenness sampled from up to `sources` nodes.
    ///
    /// # Examples
    /// ```
    /// use kairo_core::{EngineBuilder, KairoError};
    ///
    /// let err = EngineBuilder::new()
    ///     .with_approximate_centrality(0, 1)
    ///     .build()
    ///     .expect_err("zero sources are rejected");
    /// assert_eq!(err, KairoError::InvalidCentralitySources { got: 0 });
    /// ```
    #[must_use]
    pub const fn with_approximate_centrality(mut self, sources: usize, seed: u64) -> Self {
        self.exact_centrality = false;
        self.centrality_sources = sources;
        self.centrality_seed = seed;
        self
    }

    /// Applies an already validated centrality mode.
    #[must_use]
    pub const fn with_centrality_mode(self, mode: CentralityMode) -> Self {
        match mode {
            CentralityMode::Exact => self.with_exact_centrality(),
            CentralityMode::Approximate { sources, seed } => {
                self.with_approximate_centrality(sources.get(), seed)
            }
        }
    }

    /// Selects which highway classes the flood fallback treats as major.
    #[must_use]
    pub const fn with_major_roads(mut self, policy: MajorRoadPolicy) -> Self {
        self.major_roads = policy;
        self
    }

    /// Selects the minimum-removal policy.
    #[must_use]
    pub const fn with_removal_floor(mut self, floor: RemovalFloor) -> Self {
        self.removal_floor = floor;
        self
    }

    /// Selects the A* heuristic.
    #[must_use]
    pub const fn with_heuristic(mut self, heuristic: PathHeuristic) -> Self {
        self.heuristic = heuristic;
        self
    }

    /// Sets the execution strategy.
    ///
    /// # Examples
    /// ```
    /// use kairo_core::{EngineBuilder, ExecutionStrategy};
    ///
    /// let builder = EngineBuilder::new().with_execution_strategy(ExecutionStrategy::Parallel);
    /// assert_eq!(builder.execution_strategy(), ExecutionStrategy::Parallel);
    /// ```
    #[must_use]
    pub const fn with_execution_strategy(mut self, strategy: ExecutionStrategy) -> Self {
        self.execution_strategy = strategy;
        self
    }

    /// Returns the currently configured execution strategy.
    #[must_use]
    pub const fn execution_strategy(&self) -> ExecutionStrategy {
        self.execution_strategy
    }

    /// Validates the configuration and constructs an [`Engine`].
    ///
    /// # Errors
    /// Returns [`KairoError::InvalidPairCount`] for zero pairs,
    /// [`KairoError::InvalidPenaltyRatio`] for a penalty that is non-finite or
    /// below `1.0`, and [`KairoError::InvalidCentralitySources`] for an
    /// approximate mode without sources.
    ///
    /// # Examples
    /// ```
    /// use kairo_core::EngineBuilder;
    ///
    /// let engine = EngineBuilder::new().build().expect("defaults are valid");
    /// assert_eq!(engine.pairs().get(), 20);
    /// ```
    pub fn build(self) -> Result<Engine> {
        let pairs = NonZeroUsize::new(self.pairs)
            .ok_or(KairoError::InvalidPairCount { got: self.pairs })?;
        let penalty_ratio = check_penalty(self.penalty_ratio)?;
        let centrality = if self.exact_centrality {
            CentralityMode::Exact
        } else {
            let sources = NonZeroUsize::new(self.centrality_sources).ok_or(
                KairoError::InvalidCentralitySources {
                    got: self.centrality_sources,
                },
            )?;
            CentralityMode::Approximate {
                sources,
                seed: self.centrality_seed,
            }
        };

        Ok(Engine::new(EngineConfig {
            pairs,
            penalty_ratio,
            centrality,
            major_roads: self.major_roads,
            removal_floor: self.removal_floor,
            heuristic: self.heuristic,
            execution_strategy: self.execution_strategy,
        }))
    }
}
