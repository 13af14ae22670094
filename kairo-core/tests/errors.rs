use std::sync::Arc;

use kairo_core::{EdgeId, GraphError, GraphErrorCode, KairoError, KairoErrorCode, NodeId};
use rstest::rstest;

fn edge() -> EdgeId {
    EdgeId::new(NodeId::new(1), NodeId::new(2), 0)
}

#[rstest]
#[case(
    GraphError::UnknownNode { edge: edge(), node: NodeId::new(2) },
    GraphErrorCode::UnknownNode,
    "GRAPH_UNKNOWN_NODE",
)]
#[case(GraphError::DuplicateEdge { edge: edge() }, GraphErrorCode::DuplicateEdge, "GRAPH_DUPLICATE_EDGE")]
#[case(
    GraphError::InvalidCost { edge: edge(), attribute: "length", value: -1.0 },
    GraphErrorCode::InvalidCost,
    "GRAPH_INVALID_COST",
)]
fn returns_expected_graph_code(
    #[case] error: GraphError,
    #[case] expected: GraphErrorCode,
    #[case] code: &str,
) {
    assert_eq!(error.code(), expected);
    assert_eq!(error.code().as_str(), code);
    assert_eq!(error.code().to_string(), code);
}

#[rstest]
#[case(
    KairoError::UnknownScenario { name: Arc::from("meteor") },
    KairoErrorCode::UnknownScenario,
    "KAIRO_UNKNOWN_SCENARIO",
)]
#[case(KairoError::InvalidSeverity { got: 1.5 }, KairoErrorCode::InvalidSeverity, "KAIRO_INVALID_SEVERITY")]
#[case(
    KairoError::InvalidPenaltyRatio { got: 0.5 },
    KairoErrorCode::InvalidPenaltyRatio,
    "KAIRO_INVALID_PENALTY_RATIO",
)]
#[case(KairoError::InvalidPairCount { got: 0 }, KairoErrorCode::InvalidPairCount, "KAIRO_INVALID_PAIR_COUNT")]
#[case(KairoError::InvalidRunCount { got: 0 }, KairoErrorCode::InvalidRunCount, "KAIRO_INVALID_RUN_COUNT")]
#[case(
    KairoError::InvalidCentralitySources { got: 0 },
    KairoErrorCode::InvalidCentralitySources,
    "KAIRO_INVALID_CENTRALITY_SOURCES",
)]
#[case(KairoError::EmptySweepPlan, KairoErrorCode::EmptySweepPlan, "KAIRO_EMPTY_SWEEP_PLAN")]
#[case(
    KairoError::SamplingExhausted { attempts: 20, component_size: 1 },
    KairoErrorCode::SamplingExhausted,
    "KAIRO_SAMPLING_EXHAUSTED",
)]
fn returns_expected_kairo_code(
    #[case] error: KairoError,
    #[case] expected: KairoErrorCode,
    #[case] code: &str,
) {
    assert_eq!(error.code(), expected);
    assert_eq!(error.code().as_str(), code);
}

#[test]
fn messages_name_the_offending_value() {
    let err = KairoError::UnknownScenario { name: Arc::from("meteor") };
    assert_eq!(err.to_string(), "unknown scenario `meteor`");
    let err = KairoError::InvalidSeverity { got: 1.5 };
    assert!(err.to_string().contains("1.5"));
}
