//! JSON providers for road graphs and hazard zones consumed by `kairo-core`.

mod document;
mod errors;
mod graph;
mod hazard;

pub use errors::{JsonProviderError, JsonProviderErrorCode};
pub use graph::{graph_from_reader, graph_from_str, load_graph};
pub use hazard::{hazard_from_reader, hazard_from_str, load_hazard_zones};
