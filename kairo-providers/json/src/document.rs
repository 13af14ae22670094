//! Serde mirrors of the on-disk JSON layout.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(crate) struct GraphDocument {
    pub(crate) nodes: Vec<NodeRecord>,
    #[serde(default)]
    pub(crate) edges: Vec<EdgeRecord>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct NodeRecord {
    pub(crate) id: u64,
    pub(crate) x: Option<f64>,
    pub(crate) y: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct EdgeRecord {
    pub(crate) u: u64,
    pub(crate) v: u64,
    pub(crate) key: Option<u64>,
    pub(crate) length: f64,
    pub(crate) travel_time: Option<f64>,
    pub(crate) bridge: Option<Tag>,
    pub(crate) tunnel: Option<Tag>,
    pub(crate) highway: Option<Tag>,
    pub(crate) geometry: Option<Vec<[f64; 2]>>,
}

/// OSM-style tag holding one value or a list of values.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum Tag {
    Single(String),
    List(Vec<String>),
}

impl Tag {
    pub(crate) fn into_vec(self) -> Vec<String> {
        match self {
            Self::Single(value) => vec![value],
            Self::List(values) => values,
        }
    }

    /// Collapses a list into the `;`-joined form OSM uses for multi-valued tags.
    pub(crate) fn joined(self) -> String {
        self.into_vec().join(";")
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct HazardDocument {
    pub(crate) polygons: Vec<Vec<Vec<[f64; 2]>>>,
}
