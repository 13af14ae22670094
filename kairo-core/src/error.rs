//! Error types for the kairo core library.
//!
//! Defines error enums exposed by the public API and a convenient result alias.

use std::{fmt, sync::Arc};

use thiserror::Error;

use crate::graph::{EdgeId, NodeId};

macro_rules! define_error_codes {
    (
        $(#[$enum_meta:meta])*
        enum $CodeTy:ident for $ErrTy:ident {
            $(
                $(#[$variant_meta:meta])*
                $CodeVariant:ident => $ErrVariant:ident $( { $($pattern:tt)* } )? => $code:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
        #[non_exhaustive]
        pub enum $CodeTy {
            $(
                $(#[$variant_meta])*
                $CodeVariant,
            )+
        }

        impl $CodeTy {
            /// Return the stable machine-readable representation of this error code.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$CodeVariant => $code,)+
                }
            }
        }

        impl fmt::Display for $CodeTy {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $ErrTy {
            #[doc = concat!(
                "Retrieve the stable [`",
                stringify!($CodeTy),
                "`] for this error."
            )]
            pub const fn code(&self) -> $CodeTy {
                match self {
                    $(Self::$ErrVariant $( { $($pattern)* } )? => $CodeTy::$CodeVariant,)+
                }
            }
        }
    };
}

/// An error produced while assembling a [`crate::RoadGraph`].
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum GraphError {
    /// An edge referenced a node that has not been added to the graph.
    #[error("edge {edge} references unknown node {node}")]
    UnknownNode {
        /// The edge being inserted.
        edge: EdgeId,
        /// The missing endpoint.
        node: NodeId,
    },
    /// An edge with the same `(u, v, key)` triple already exists.
    #[error("edge {edge} already exists")]
    DuplicateEdge {
        /// The conflicting edge identifier.
        edge: EdgeId,
    },
    /// A cost attribute was negative or non-finite.
    #[error("edge {edge} has invalid {attribute} {value}")]
    InvalidCost {
        /// The offending edge.
        edge: EdgeId,
        /// Name of the cost attribute (`length` or `travel_time`).
        attribute: &'static str,
        /// The rejected value.
        value: f64,
    },
}

define_error_codes! {
    /// Stable codes describing [`GraphError`] variants.
    enum GraphErrorCode for GraphError {
        /// An edge referenced a node that has not been added to the graph.
        UnknownNode => UnknownNode { .. } => "GRAPH_UNKNOWN_NODE",
        /// An edge with the same identifier already exists.
        DuplicateEdge => DuplicateEdge { .. } => "GRAPH_DUPLICATE_EDGE",
        /// A cost attribute was negative or non-finite.
        InvalidCost => InvalidCost { .. } => "GRAPH_INVALID_COST",
    }
}

/// Error type produced when configuring or running the [`crate::Engine`].
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum KairoError {
    /// A scenario name outside the recognised vocabulary was supplied.
    #[error("unknown scenario `{name}`")]
    UnknownScenario {
        /// The rejected scenario name.
        name: Arc<str>,
    },
    /// Severity must be a finite fraction in `[0, 1]`.
    #[error("severity must lie in [0, 1] (got {got})")]
    InvalidSeverity {
        /// The rejected severity.
        got: f64,
    },
    /// The disconnection penalty must be finite and at least `1.0`.
    #[error("penalty_ratio must be finite and >= 1 (got {got})")]
    InvalidPenaltyRatio {
        /// The rejected penalty ratio.
        got: f64,
    },
    /// At least one origin–destination pair must be requested.
    #[error("n_pairs must be at least 1 (got {got})")]
    InvalidPairCount {
        /// The rejected pair count.
        got: usize,
    },
    /// Repeated experiments need at least one run.
    #[error("runs must be at least 1 (got {got})")]
    InvalidRunCount {
        /// The rejected run count.
        got: usize,
    },
    /// Approximate centrality needs at least one sampled source.
    #[error("centrality sample size must be at least 1 (got {got})")]
    InvalidCentralitySources {
        /// The rejected sample size.
        got: usize,
    },
    /// A sweep plan must name at least one scenario and one severity.
    #[error("sweep plan must contain at least one scenario and one severity")]
    EmptySweepPlan,
    /// No connected origin–destination pair could be drawn.
    #[error(
        "no connected origin-destination pair found after {attempts} attempts \
         (largest component has {component_size} nodes)"
    )]
    SamplingExhausted {
        /// Number of draws performed before giving up.
        attempts: usize,
        /// Size of the component sampled from.
        component_size: usize,
    },
}

define_error_codes! {
    /// Stable codes describing [`KairoError`] variants.
    enum KairoErrorCode for KairoError {
        /// A scenario name outside the recognised vocabulary was supplied.
        UnknownScenario => UnknownScenario { .. } => "KAIRO_UNKNOWN_SCENARIO",
        /// Severity must be a finite fraction in `[0, 1]`.
        InvalidSeverity => InvalidSeverity { .. } => "KAIRO_INVALID_SEVERITY",
        /// The disconnection penalty must be finite and at least `1.0`.
        InvalidPenaltyRatio => InvalidPenaltyRatio { .. } => "KAIRO_INVALID_PENALTY_RATIO",
        /// At least one origin–destination pair must be requested.
        InvalidPairCount => InvalidPairCount { .. } => "KAIRO_INVALID_PAIR_COUNT",
        /// Repeated experiments need at least one run.
        InvalidRunCount => InvalidRunCount { .. } => "KAIRO_INVALID_RUN_COUNT",
        /// Approximate centrality needs at least one sampled source.
        InvalidCentralitySources => InvalidCentralitySources { .. } => "KAIRO_INVALID_CENTRALITY_SOURCES",
        /// A sweep plan must name at least one scenario and one severity.
        EmptySweepPlan => EmptySweepPlan => "KAIRO_EMPTY_SWEEP_PLAN",
        /// No connected origin–destination pair could be drawn.
        SamplingExhausted => SamplingExhausted { .. } => "KAIRO_SAMPLING_EXHAUSTED",
    }
}

/// Convenient alias for results returned by the core API.
pub type Result<T> = core::result::Result<T, KairoError>;
