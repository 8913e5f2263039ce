//! Data transfer objects for web requests and responses.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::{Coordinate, Gate, GateId, GateStatus, TrainObservation};
use crate::orchestrator::GateOutcome;

/// One gate as sent by the map client.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GateInput {
    /// Gate identifier, echoed back as `gate_id`
    pub gate_number: GateId,

    pub latitude: f64,

    pub longitude: f64,

    /// Centre of the crossing, more precise than the marker position
    #[serde(default)]
    pub crossing_center: Option<Coordinate>,
}

impl GateInput {
    /// Position used for locating the gate: the crossing centre if known.
    pub fn position(&self) -> Coordinate {
        self.crossing_center
            .unwrap_or_else(|| Coordinate::new(self.latitude, self.longitude))
    }

    fn check_bounds(&self) -> Result<(), String> {
        geographic(Coordinate::new(self.latitude, self.longitude), "position")?;
        if let Some(center) = self.crossing_center {
            geographic(center, "crossingCenter")?;
        }
        Ok(())
    }
}

fn geographic(coord: Coordinate, what: &str) -> Result<(), String> {
    if coord.is_geographic() {
        Ok(())
    } else {
        Err(format!(
            "{what} ({}, {}) is not a valid latitude/longitude",
            coord.latitude, coord.longitude
        ))
    }
}

/// Request body of `POST /railway_data`.
#[derive(Debug, Clone)]
pub struct RailwayDataRequest {
    pub gates: Vec<GateInput>,

    /// Shape of the route the user is viewing, in order
    pub route_coordinates: Vec<Coordinate>,

    /// Gate to report first
    pub selected_gate_id: Option<GateId>,
}

/// Why a request body was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    #[error("Invalid JSON: {0}")]
    Json(String),

    #[error("Expected 'gates' and 'routeCoordinates' as arrays")]
    NotArrays,

    #[error("Invalid gate at index {index}: {message}")]
    Gate { index: usize, message: String },

    #[error("Invalid route coordinate at index {index}: {message}")]
    RouteCoordinate { index: usize, message: String },

    #[error("Invalid selectedGateId: {0}")]
    SelectedGate(String),
}

impl RailwayDataRequest {
    /// Parse and validate a request body.
    ///
    /// Missing `gates` or `routeCoordinates` count as empty arrays; present
    /// but non-array values are rejected.
    pub fn from_json(body: &[u8]) -> Result<Self, RequestError> {
        let value: Value =
            serde_json::from_slice(body).map_err(|e| RequestError::Json(e.to_string()))?;
        let Value::Object(obj) = value else {
            return Err(RequestError::Json("expected a JSON object".into()));
        };

        let gates = array_field(&obj, "gates")?
            .iter()
            .enumerate()
            .map(|(index, g)| {
                let gate = GateInput::deserialize(g).map_err(|e| RequestError::Gate {
                    index,
                    message: e.to_string(),
                })?;
                gate.check_bounds()
                    .map_err(|message| RequestError::Gate { index, message })?;
                Ok::<_, RequestError>(gate)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let route_coordinates = array_field(&obj, "routeCoordinates")?
            .iter()
            .enumerate()
            .map(|(index, c)| {
                let coord =
                    Coordinate::deserialize(c).map_err(|e| RequestError::RouteCoordinate {
                        index,
                        message: e.to_string(),
                    })?;
                geographic(coord, "coordinate")
                    .map_err(|message| RequestError::RouteCoordinate { index, message })?;
                Ok::<_, RequestError>(coord)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let selected_gate_id = match obj.get("selectedGateId") {
            None | Some(Value::Null) => None,
            Some(v) => Some(
                GateId::deserialize(v).map_err(|e| RequestError::SelectedGate(e.to_string()))?,
            ),
        };

        Ok(Self {
            gates,
            route_coordinates,
            selected_gate_id,
        })
    }
}

fn array_field<'a>(obj: &'a Map<String, Value>, key: &str) -> Result<&'a [Value], RequestError> {
    match obj.get(key) {
        None => Ok(&[]),
        Some(Value::Array(items)) => Ok(items),
        Some(_) => Err(RequestError::NotArrays),
    }
}

/// A gate in the response: its location details plus the verdict.
#[derive(Debug, Serialize)]
pub struct GateReport {
    #[serde(flatten)]
    pub gate: Gate,

    /// Trains due at the gate, soonest first
    pub live_trains: Vec<TrainObservation>,

    pub gate_status: GateStatus,
}

impl From<GateOutcome> for GateReport {
    fn from(outcome: GateOutcome) -> Self {
        Self {
            gate: outcome.gate,
            live_trains: outcome.result.live_trains,
            gate_status: outcome.result.gate_status,
        }
    }
}

/// Response of `POST /railway_data`.
#[derive(Debug, Serialize)]
pub struct RailwayDataResponse {
    pub gates: Vec<GateReport>,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}
