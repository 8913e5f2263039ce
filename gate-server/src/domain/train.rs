//! Train observations read off a live-station board.
//!
//! A `TrainObservation` is specific to the station it was queried at: the
//! same physical train seen at two junctions produces two independent
//! observations, which the correlation engine later pairs by train number.

use serde::{Deserialize, Serialize};

use super::{ClockTime, ScheduleTime, StationCode, TrainNumber};

/// One train as listed on one station's board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainObservation {
    pub train_number: TrainNumber,
    pub train_name: String,
    pub route: TrainRoute,
    pub schedule: Schedule,
    pub metadata: ObservationMetadata,
    #[serde(default)]
    pub direction: Direction,
}

/// The "ORIGIN-DESTINATION" route printed next to the train name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainRoute {
    pub origin: String,
    pub destination: String,
    pub full_route: String,
}

impl TrainRoute {
    /// Split a route string on its first `-`.
    ///
    /// Returns `None` when either side is empty, since such a row cannot be
    /// trusted to describe a real service.
    ///
    /// ```
    /// use gate_server::domain::TrainRoute;
    ///
    /// let r = TrainRoute::parse("TVC-ERS").unwrap();
    /// assert_eq!((r.origin.as_str(), r.destination.as_str()), ("TVC", "ERS"));
    /// assert!(TrainRoute::parse("TVC").is_none());
    /// ```
    pub fn parse(full_route: &str) -> Option<Self> {
        let full_route = full_route.trim();
        let (origin, rest) = full_route.split_once('-')?;
        // Anything after a second '-' is not part of the destination code
        let destination = rest.split('-').next().unwrap_or_default();
        let (origin, destination) = (origin.trim(), destination.trim());
        if origin.is_empty() || destination.is_empty() {
            return None;
        }
        Some(Self {
            origin: origin.to_string(),
            destination: destination.to_string(),
            full_route: full_route.to_string(),
        })
    }
}

/// Times at the queried station, later enriched with both junctions' times.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Schedule {
    pub arrival: ScheduleTime,
    pub departure: ScheduleTime,

    #[serde(rename = "arrival_at_J1", skip_serializing_if = "Option::is_none", default)]
    pub arrival_at_j1: Option<ScheduleTime>,
    #[serde(rename = "departure_at_J1", skip_serializing_if = "Option::is_none", default)]
    pub departure_at_j1: Option<ClockTime>,
    #[serde(rename = "arrival_at_J2", skip_serializing_if = "Option::is_none", default)]
    pub arrival_at_j2: Option<ScheduleTime>,
    #[serde(rename = "departure_at_J2", skip_serializing_if = "Option::is_none", default)]
    pub departure_at_j2: Option<ClockTime>,

    /// Estimated time the train reaches the gate.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub gate_passage: Option<ClockTime>,
}

/// Where and when an observation was taken.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObservationMetadata {
    pub queried_station: StationCode,
    /// ISO-8601 fetch timestamp
    pub last_updated: String,
}

/// Junction codes the train travels between, once known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Direction {
    pub from: Option<StationCode>,
    pub to: Option<StationCode>,
}
