//! Flood hazard polygons and the edge-placement test against them.

use geo::{Coord, Intersects, Line, Polygon};

use crate::graph::{EdgeAttributes, EdgeId, RoadGraph};

/// Resolved flood extent, in the same projected coordinates as the graph.
///
/// # Examples
/// ```
/// use geo::polygon;
/// use kairo_core::HazardZones;
///
/// let zones = HazardZones::new(vec![polygon![
///     (x: 0.0, y: 0.0),
///     (x: 1.0, y: 0.0),
///     (x: 1.0, y: 1.0),
/// ]]);
/// assert_eq!(zones.len(), 1);
/// assert!(!zones.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HazardZones {
    polygons: Vec<Polygon<f64>>,
}

impl HazardZones {
    /// Wraps a polygon list.
    #[must_use]
    pub const fn new(polygons: Vec<Polygon<f64>>) -> Self {
        Self { polygons }
    }

    /// Returns the polygons.
    #[must_use]
    pub fn polygons(&self) -> &[Polygon<f64>] {
        &self.polygons
    }

    /// Returns the number of polygons.
    #[must_use]
    pub fn len(&self) -> usize {
        self.polygons.len()
    }

    /// Returns `true` when there are no polygons.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }

    /// Returns `true` when the edge's course touches any polygon.
    ///
    /// An edge without explicit geometry is placed on the straight segment
    /// between its endpoints; if either endpoint lacks coordinates the edge
    /// cannot be placed and is never flooded.
    #[must_use]
    pub fn floods(&self, graph: &RoadGraph, edge: EdgeId, attributes: &EdgeAttributes) -> bool {
        if let Some(geometry) = attributes.geometry() {
            return self
                .polygons
                .iter()
                .any(|polygon| geometry.intersects(polygon));
        }
        let endpoint = |id| {
            graph
                .node(id)
                .and_then(|node| node.coordinates())
                .map(|(x, y)| Coord { x, y })
        };
        let (Some(start), Some(end)) = (endpoint(edge.source()), endpoint(edge.target())) else {
            return false;
        };
        let segment = Line::new(start, end);
        self.polygons
            .iter()
            .any(|polygon| segment.intersects(polygon))
    }
}

impl From<Vec<Polygon<f64>>> for HazardZones {
    fn from(polygons: Vec<Polygon<f64>>) -> Self {
        Self::new(polygons)
    }
}
