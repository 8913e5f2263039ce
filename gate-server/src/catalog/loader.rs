//! Station catalog file loading.

use std::path::Path;

use serde::Deserialize;
use tracing::{info, warn};

use crate::domain::{Coordinate, Station, StationCode};

use super::error::CatalogError;
use super::index::StationIndex;
use super::junctions::JunctionTable;

/// A station's route field: one route name or several.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RouteField {
    One(String),
    Many(Vec<String>),
}

impl RouteField {
    fn into_vec(self) -> Vec<String> {
        match self {
            RouteField::One(r) => vec![r],
            RouteField::Many(rs) => rs,
        }
    }
}

/// One catalog entry as stored on disk.
///
/// The geocoding script writes `station_name`/`station_code`; older files
/// use `name`/`code`. Coordinates may be missing when geocoding failed.
#[derive(Debug, Clone, Deserialize)]
struct StationRecord {
    #[serde(alias = "name")]
    station_name: String,
    #[serde(alias = "code")]
    station_code: String,
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lon: Option<f64>,
    route: RouteField,
}

/// Load the catalog at `path` and build the index.
pub fn load_catalog(
    path: impl AsRef<Path>,
    junctions: JunctionTable,
) -> Result<StationIndex, CatalogError> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let index = parse_catalog(&contents, junctions)?;
    info!(
        path = %path.display(),
        stations = index.len(),
        routes = index.route_count(),
        "loaded station catalog"
    );
    Ok(index)
}

/// Parse catalog JSON (an array of station records) and build the index.
///
/// Records with an invalid station code are skipped with a warning.
pub fn parse_catalog(json: &str, junctions: JunctionTable) -> Result<StationIndex, CatalogError> {
    let records: Vec<StationRecord> =
        serde_json::from_str(json).map_err(|e| CatalogError::Json {
            message: e.to_string(),
        })?;

    let stations: Vec<Station> = records.into_iter().filter_map(to_station).collect();

    if stations.is_empty() {
        return Err(CatalogError::Empty);
    }

    Ok(StationIndex::new(stations, junctions))
}

fn to_station(record: StationRecord) -> Option<Station> {
    let code = match StationCode::parse_normalized(&record.station_code) {
        Ok(code) => code,
        Err(e) => {
            warn!(code = %record.station_code, error = %e, "skipping catalog entry");
            return None;
        }
    };

    let position = match (record.lat, record.lon) {
        (Some(lat), Some(lon)) => Some(Coordinate::new(lat, lon)).filter(Coordinate::is_finite),
        _ => None,
    };

    Some(Station {
        name: record.station_name,
        code,
        position,
        routes: record.route.into_vec(),
    })
}
