//! Hazard zone loading.

use std::{fs::File, io::BufReader, io::Read, path::Path};

use geo::{LineString, Polygon};
use kairo_core::HazardZones;
use tracing::debug;

use crate::{document::HazardDocument, errors::JsonProviderError};

const MIN_RING_POSITIONS: usize = 3;

/// Loads hazard zones from a JSON file.
///
/// # Errors
/// Returns [`JsonProviderError::Io`] when the file cannot be opened,
/// [`JsonProviderError::Parse`] for malformed documents and
/// [`JsonProviderError::InvalidPolygon`] or
/// [`JsonProviderError::EmptyPolygon`] for degenerate polygons.
pub fn load_hazard_zones(path: impl AsRef<Path>) -> Result<HazardZones, JsonProviderError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| JsonProviderError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    hazard_from_reader(BufReader::new(file))
}

/// Reads hazard zones from any JSON byte stream.
///
/// # Errors
/// See [`load_hazard_zones`].
pub fn hazard_from_reader(reader: impl Read) -> Result<HazardZones, JsonProviderError> {
    build(serde_json::from_reader(reader)?)
}

/// Parses hazard zones from a JSON string. The first ring of each polygon
/// is its exterior; any further rings are holes.
///
/// # Examples
/// ```
/// use kairo_providers_json::hazard_from_str;
///
/// let zones = hazard_from_str(r#"{"polygons": [[[[0, 0], [2, 0], [2, 2], [0, 2]]]]}"#)?;
/// assert_eq!(zones.len(), 1);
/// # Ok::<(), kairo_providers_json::JsonProviderError>(())
/// ```
///
/// # Errors
/// See [`load_hazard_zones`].
pub fn hazard_from_str(json: &str) -> Result<HazardZones, JsonProviderError> {
    build(serde_json::from_str(json)?)
}

fn build(document: HazardDocument) -> Result<HazardZones, JsonProviderError> {
    let polygons = document
        .polygons
        .into_iter()
        .enumerate()
        .map(|(index, rings)| polygon(index, rings))
        .collect::<Result<Vec<_>, _>>()?;
    debug!(polygons = polygons.len(), "hazard zones loaded");
    Ok(HazardZones::from(polygons))
}

fn polygon(index: usize, rings: Vec<Vec<[f64; 2]>>) -> Result<Polygon<f64>, JsonProviderError> {
    let mut rings = rings.into_iter().enumerate().map(|(ring, positions)| {
        if positions.len() < MIN_RING_POSITIONS {
            return Err(JsonProviderError::InvalidPolygon {
                polygon: index,
                ring,
                positions: positions.len(),
            });
        }
        Ok(LineString::from(positions))
    });
    let exterior = rings
        .next()
        .ok_or(JsonProviderError::EmptyPolygon { polygon: index })??;
    let interiors = rings.collect::<Result<Vec<_>, _>>()?;
    Ok(Polygon::new(exterior, interiors))
}
