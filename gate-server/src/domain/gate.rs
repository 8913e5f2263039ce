//! Level-crossing gates and their computed status.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Coordinate, StationCode, TrainObservation};

/// Caller-chosen gate identifier, echoed back unchanged.
///
/// The mobile client numbers gates, but any string is accepted too. Numbers
/// are kept as sent, so negative or fractional ids round-trip unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GateId {
    Number(serde_json::Number),
    Text(String),
}

impl fmt::Display for GateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateId::Number(n) => write!(f, "{n}"),
            GateId::Text(s) => f.write_str(s),
        }
    }
}

impl From<u64> for GateId {
    fn from(n: u64) -> Self {
        GateId::Number(n.into())
    }
}

impl From<&str> for GateId {
    fn from(s: &str) -> Self {
        GateId::Text(s.to_string())
    }
}

/// A station as reported alongside a gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationRef {
    pub name: String,
    pub code: StationCode,
    pub position: Option<Coordinate>,
}

/// The stations immediately before and after a gate's nearest station.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AdjacentStations {
    pub before: Option<StationRef>,
    pub after: Option<StationRef>,
}

/// The two junctions whose boards bound a gate (J1 = before, J2 = after).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GateJunctions {
    pub before: Option<StationRef>,
    pub after: Option<StationRef>,
}

impl GateJunctions {
    /// Codes of both junctions, when both are known.
    pub fn codes(&self) -> Option<(StationCode, StationCode)> {
        Some((self.before.as_ref()?.code, self.after.as_ref()?.code))
    }
}

/// A gate annotated with its route, nearby stations and junctions.
///
/// Built per request by the locator; lives for one batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gate {
    pub gate_id: GateId,
    pub position: Coordinate,
    pub route: Option<String>,
    pub nearest_station: Option<StationRef>,
    pub adjacent_stations: AdjacentStations,
    pub junctions: GateJunctions,
}

/// Estimated state of a gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GateStatus {
    /// At least one train is due within the near-term window.
    Closed,
    /// No train is due within the near-term window.
    Open,
    /// Input data was missing or the live data could not be fetched.
    Unknown,
}

impl fmt::Display for GateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GateStatus::Closed => "Closed",
            GateStatus::Open => "Open",
            GateStatus::Unknown => "Unknown",
        };
        f.write_str(s)
    }
}

/// Correlation output for one gate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GateResult {
    pub gate_id: GateId,
    /// Trains due at the gate, soonest first.
    pub live_trains: Vec<TrainObservation>,
    pub gate_status: GateStatus,
}

impl GateResult {
    /// A result carrying no trains and status `Unknown`.
    pub fn unknown(gate_id: GateId) -> Self {
        Self {
            gate_id,
            live_trains: Vec::new(),
            gate_status: GateStatus::Unknown,
        }
    }

    /// A result whose status follows from whether any train is due.
    pub fn from_trains(gate_id: GateId, live_trains: Vec<TrainObservation>) -> Self {
        let gate_status = if live_trains.is_empty() {
            GateStatus::Open
        } else {
            GateStatus::Closed
        };
        Self {
            gate_id,
            live_trains,
            gate_status,
        }
    }
}
