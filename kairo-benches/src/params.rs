//! Benchmark parameter types, rendered as Criterion benchmark ids.

use std::fmt;

/// Parameters for a centrality benchmark run.
#[derive(Clone, Debug)]
pub struct CentralityBenchParams {
    /// Grid side length; the grid has `side * side` intersections.
    pub side: usize,
    /// Sampled sources, or `None` for exact accumulation.
    pub sources: Option<usize>,
}

impl fmt::Display for CentralityBenchParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.sources {
            Some(sources) => write!(f, "side={},k={sources}", self.side),
            None => write!(f, "side={},exact", self.side),
        }
    }
}

/// Parameters for a simulation benchmark run.
#[derive(Clone, Debug)]
pub struct SimulationBenchParams {
    /// Grid side length.
    pub side: usize,
    /// Origin-destination pairs per simulation.
    pub pairs: usize,
}

impl fmt::Display for SimulationBenchParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "side={},pairs={}", self.side, self.pairs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    #[rstest]
    #[case(Some(16), "side=8,k=16")]
    #[case(None, "side=8,exact")]
    fn centrality_params_render_as_ids(#[case] sources: Option<usize>, #[case] expected: &str) {
        let params = CentralityBenchParams { side: 8, sources };
        assert_eq!(params.to_string(), expected);
    }
}
