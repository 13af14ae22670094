//! Disruption scenarios and the road classes they target.

use std::{fmt, str::FromStr, sync::Arc};

use crate::{HazardZones, error::KairoError};

/// Name-only scenario identifier, parsed from and rendered to the canonical
/// scenario strings.
///
/// # Examples
/// ```
/// use kairo_core::ScenarioKind;
///
/// let kind: ScenarioKind = "Targeted Attack (Top k%)".parse()?;
/// assert_eq!(kind, ScenarioKind::TargetedAttack);
/// assert_eq!(kind.to_string(), "Targeted Attack (Top k%)");
/// assert!("Meteor Strike".parse::<ScenarioKind>().is_err());
/// # Ok::<(), kairo_core::KairoError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ScenarioKind {
    /// Remove edges tagged as bridges.
    BridgeCollapse,
    /// Remove edges tagged as tunnels.
    TunnelClosure,
    /// Remove flooded or major-highway edges.
    HighwayFlood,
    /// Remove the most central links.
    TargetedAttack,
    /// Remove uniformly chosen edges.
    RandomFailure,
}

impl ScenarioKind {
    /// Every scenario, in canonical order.
    pub const ALL: [Self; 5] = [
        Self::BridgeCollapse,
        Self::TunnelClosure,
        Self::HighwayFlood,
        Self::TargetedAttack,
        Self::RandomFailure,
    ];

    /// Returns the canonical scenario string.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::BridgeCollapse => "Bridge Collapse",
            Self::TunnelClosure => "Tunnel Closure",
            Self::HighwayFlood => "Highway Flood",
            Self::TargetedAttack => "Targeted Attack (Top k%)",
            Self::RandomFailure => "Random Failure",
        }
    }
}

impl fmt::Display for ScenarioKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ScenarioKind {
    type Err = KairoError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == name)
            .ok_or_else(|| KairoError::UnknownScenario {
                name: Arc::from(name),
            })
    }
}

/// A disruption scenario, carrying the data its selection rule needs.
///
/// # Examples
/// ```
/// use kairo_core::{Scenario, ScenarioKind};
///
/// let scenario = Scenario::from(ScenarioKind::HighwayFlood);
/// assert_eq!(scenario, Scenario::HighwayFlood { hazard: None });
/// assert_eq!(scenario.kind(), ScenarioKind::HighwayFlood);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Scenario {
    /// Every bridge-tagged edge is a candidate.
    BridgeCollapse,
    /// Every tunnel-tagged edge is a candidate.
    TunnelClosure,
    /// Edges inside the hazard zones are candidates; without zones, edges on
    /// major highway classes are.
    HighwayFlood {
        /// Resolved flood polygons, if any.
        hazard: Option<HazardZones>,
    },
    /// The top fraction of links by edge betweenness.
    TargetedAttack,
    /// Every edge is a candidate.
    RandomFailure,
}

impl Scenario {
    /// Returns the name-only identifier.
    #[must_use]
    pub const fn kind(&self) -> ScenarioKind {
        match self {
            Self::BridgeCollapse => ScenarioKind::BridgeCollapse,
            Self::TunnelClosure => ScenarioKind::TunnelClosure,
            Self::HighwayFlood { .. } => ScenarioKind::HighwayFlood,
            Self::TargetedAttack => ScenarioKind::TargetedAttack,
            Self::RandomFailure => ScenarioKind::RandomFailure,
        }
    }

    /// Builds a flood scenario driven by explicit hazard zones.
    #[must_use]
    pub const fn flood(hazard: HazardZones) -> Self {
        Self::HighwayFlood {
            hazard: Some(hazard),
        }
    }
}

impl From<ScenarioKind> for Scenario {
    fn from(kind: ScenarioKind) -> Self {
        match kind {
            ScenarioKind::BridgeCollapse => Self::BridgeCollapse,
            ScenarioKind::TunnelClosure => Self::TunnelClosure,
            ScenarioKind::HighwayFlood => Self::HighwayFlood { hazard: None },
            ScenarioKind::TargetedAttack => Self::TargetedAttack,
            ScenarioKind::RandomFailure => Self::RandomFailure,
        }
    }
}

impl FromStr for Scenario {
    type Err = KairoError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        name.parse::<ScenarioKind>().map(Self::from)
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.kind(), f)
    }
}

const PRIMARY_CLASSES: &[&str] = &[
    "motorway",
    "motorway_link",
    "trunk",
    "trunk_link",
    "primary",
    "primary_link",
];

const SECONDARY_CLASSES: &[&str] = &["secondary", "secondary_link"];

/// Which `highway` classes count as major roads for the flood fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MajorRoadPolicy {
    /// Motorway, trunk and primary, plus their `_link` ramps.
    #[default]
    Primary,
    /// [`MajorRoadPolicy::Primary`] plus secondary roads and links.
    IncludeSecondary,
}

impl MajorRoadPolicy {
    /// Returns `true` when `class` is a major road under this policy.
    ///
    /// # Examples
    /// ```
    /// use kairo_core::MajorRoadPolicy;
    ///
    /// assert!(MajorRoadPolicy::Primary.is_major("trunk_link"));
    /// assert!(!MajorRoadPolicy::Primary.is_major("secondary"));
    /// assert!(MajorRoadPolicy::IncludeSecondary.is_major("secondary"));
    /// ```
    #[must_use]
    pub fn is_major(self, class: &str) -> bool {
        PRIMARY_CLASSES.contains(&class)
            || (self == Self::IncludeSecondary && SECONDARY_CLASSES.contains(&class))
    }
}
