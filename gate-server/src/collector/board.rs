//! Conversion from scraped live-station rows to train observations.
//!
//! A live-station results table lists one train per row. Only the first few
//! cells matter here:
//!
//! | cell | content |
//! |---|---|
//! | 1 | `"12345 SF Exp \| Night Express (TVC-ERS)"` |
//! | 2 | arrival, e.g. `"10:05 (On time)"`, or `"Source"` |
//! | 3 | departure, e.g. `"10:10"`, or `"Destination"` |
//!
//! Rows that cannot be read, or whose departure is missing or outside the
//! near-term window, are dropped.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{
    Direction, ObservationMetadata, Schedule, ScheduleTime, StationCode, TrainObservation,
    TrainRoute,
};
use crate::extract::{ExtractError, extract_time, extract_train_identifier, extract_train_name};
use crate::window::NearTermWindow;

/// Cells a row must have to be considered.
const MIN_CELLS: usize = 5;

const TRAIN_CELL: usize = 1;
const ARRIVAL_CELL: usize = 2;
const DEPARTURE_CELL: usize = 3;

/// One results-table row, as the text of each cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRow {
    pub cells: Vec<String>,
}

impl RawRow {
    pub fn new<S: Into<String>>(cells: impl IntoIterator<Item = S>) -> Self {
        Self {
            cells: cells.into_iter().map(Into::into).collect(),
        }
    }
}

/// Why a row was not turned into an observation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RowError {
    #[error("row has {0} cells, need at least {MIN_CELLS}")]
    TooFewCells(usize),

    #[error(transparent)]
    Identifier(#[from] ExtractError),

    #[error("no route in {0:?}")]
    MissingRoute(String),

    #[error("departure unknown")]
    DepartureUnknown,
}

/// ISO-8601 fetch timestamp with a trailing `Z`.
pub fn last_updated_stamp(fetched_at: NaiveDateTime) -> String {
    format!("{}Z", fetched_at.format("%Y-%m-%dT%H:%M:%S%.f"))
}

/// Convert a single row.
///
/// The window is not applied here; see [`convert_board`].
pub fn convert_row(
    row: &RawRow,
    station: StationCode,
    last_updated: &str,
) -> Result<TrainObservation, RowError> {
    if row.cells.len() < MIN_CELLS {
        return Err(RowError::TooFewCells(row.cells.len()));
    }

    let train_text = &row.cells[TRAIN_CELL];
    let identifier = extract_train_identifier(train_text)?;
    let route = identifier
        .route
        .as_deref()
        .and_then(TrainRoute::parse)
        .ok_or_else(|| RowError::MissingRoute(train_text.clone()))?;

    let arrival = ScheduleTime::from(extract_time(&row.cells[ARRIVAL_CELL]));
    let departure = ScheduleTime::from(extract_time(&row.cells[DEPARTURE_CELL]));
    if departure.is_unknown() {
        return Err(RowError::DepartureUnknown);
    }

    Ok(TrainObservation {
        train_number: identifier.number,
        train_name: extract_train_name(train_text),
        route,
        schedule: Schedule {
            arrival,
            departure,
            ..Default::default()
        },
        metadata: ObservationMetadata {
            queried_station: station,
            last_updated: last_updated.to_string(),
        },
        direction: Direction::default(),
    })
}

/// Convert a station's rows, keeping trains that depart within `window`.
pub fn convert_board(
    station: StationCode,
    rows: &[RawRow],
    fetched_at: NaiveDateTime,
    window: NearTermWindow,
) -> Vec<TrainObservation> {
    let last_updated = last_updated_stamp(fetched_at);

    rows.iter()
        .filter_map(|row| match convert_row(row, station, &last_updated) {
            Ok(train) => Some(train),
            Err(e) => {
                debug!(station = %station, error = %e, "dropping row");
                None
            }
        })
        .filter(|train| {
            train
                .schedule
                .departure
                .clock()
                .is_some_and(|dep| window.contains(dep, fetched_at))
        })
        .collect()
}
