use std::{fmt, io, path::PathBuf};

use kairo_core::GraphError;
use thiserror::Error;

/// Failure while loading a JSON graph or hazard document.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum JsonProviderError {
    #[error("failed to read `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed JSON document: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("graph document violates graph invariants: {0}")]
    Graph(#[from] GraphError),
    #[error("polygon {polygon} ring {ring} has {positions} positions but needs at least 3")]
    InvalidPolygon {
        polygon: usize,
        ring: usize,
        positions: usize,
    },
    #[error("polygon {polygon} has no rings")]
    EmptyPolygon { polygon: usize },
}

/// Stable codes describing [`JsonProviderError`] variants.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum JsonProviderErrorCode {
    Io,
    Parse,
    Graph,
    InvalidPolygon,
    EmptyPolygon,
}

impl JsonProviderErrorCode {
    /// Return the stable machine-readable representation of this error code.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Io => "JSON_IO",
            Self::Parse => "JSON_PARSE",
            Self::Graph => "JSON_GRAPH",
            Self::InvalidPolygon => "JSON_INVALID_POLYGON",
            Self::EmptyPolygon => "JSON_EMPTY_POLYGON",
        }
    }
}

impl fmt::Display for JsonProviderErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl JsonProviderError {
    /// Retrieve the stable [`JsonProviderErrorCode`] for this error.
    #[must_use]
    pub const fn code(&self) -> JsonProviderErrorCode {
        match self {
            Self::Io { .. } => JsonProviderErrorCode::Io,
            Self::Parse(_) => JsonProviderErrorCode::Parse,
            Self::Graph(_) => JsonProviderErrorCode::Graph,
            Self::InvalidPolygon { .. } => JsonProviderErrorCode::InvalidPolygon,
            Self::EmptyPolygon { .. } => JsonProviderErrorCode::EmptyPolygon,
        }
    }
}
