//! Mock collector for development without the live site.
//!
//! Loads scraped results-table rows from JSON files and serves them as if
//! they had just been read off the live-station page.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use chrono::NaiveDateTime;
use tracing::info;

use crate::domain::{StationCode, TrainObservation};
use crate::window::NearTermWindow;

use super::board::{RawRow, convert_board};
use super::error::CollectorError;
use super::{LiveTrainSession, LiveTrainSource};

/// Mock collector serving rows from `{CODE}.json` files.
///
/// Each file holds an array of rows, each row an array of cell texts:
///
/// ```json
/// [["1", "16302 | Venad Express (TVC-SRR)", "10:05", "10:10", "1"]]
/// ```
#[derive(Debug, Clone)]
pub struct MockCollector {
    boards: Arc<HashMap<StationCode, Vec<RawRow>>>,
    window: NearTermWindow,
}

impl MockCollector {
    /// Load every `{CODE}.json` file in `data_dir`.
    pub fn new(data_dir: impl AsRef<Path>, window: NearTermWindow) -> Result<Self, CollectorError> {
        let data_dir = data_dir.as_ref();
        let mut boards = HashMap::new();

        let entries = std::fs::read_dir(data_dir).map_err(|e| {
            CollectorError::InvalidBoard(format!(
                "failed to read mock data directory {}: {e}",
                data_dir.display()
            ))
        })?;

        for entry in entries {
            let path = entry
                .map_err(|e| CollectorError::InvalidBoard(format!("failed to read entry: {e}")))?
                .path();
            if !path.is_file() || path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }

            // "QLN.json" -> "QLN"
            let stem = path
                .file_stem()
                .and_then(|s| s.to_str())
                .ok_or_else(|| CollectorError::InvalidBoard(format!("invalid filename: {path:?}")))?;
            let code = StationCode::parse(stem).map_err(|e| {
                CollectorError::InvalidBoard(format!("invalid station code in filename {stem}: {e}"))
            })?;

            let json = std::fs::read_to_string(&path).map_err(|e| {
                CollectorError::InvalidBoard(format!("failed to read {}: {e}", path.display()))
            })?;
            let rows: Vec<RawRow> = serde_json::from_str(&json).map_err(|e| {
                CollectorError::InvalidBoard(format!("failed to parse {}: {e}", path.display()))
            })?;

            boards.insert(code, rows);
        }

        if boards.is_empty() {
            return Err(CollectorError::InvalidBoard(format!(
                "no mock board files found in {}",
                data_dir.display()
            )));
        }

        let mock = Self::from_boards(boards, window);
        info!(
            dir = %data_dir.display(),
            stations = ?mock.available_stations(),
            "loaded mock boards"
        );
        Ok(mock)
    }

    /// Build from in-memory rows.
    pub fn from_boards(boards: HashMap<StationCode, Vec<RawRow>>, window: NearTermWindow) -> Self {
        Self {
            boards: Arc::new(boards),
            window,
        }
    }

    /// List available stations in the mock data.
    pub fn available_stations(&self) -> Vec<StationCode> {
        let mut codes: Vec<_> = self.boards.keys().copied().collect();
        codes.sort();
        codes
    }
}

impl LiveTrainSource for MockCollector {
    type Session = MockSession;

    async fn open_session(&self) -> Result<MockSession, CollectorError> {
        Ok(MockSession {
            boards: Arc::clone(&self.boards),
            window: self.window,
        })
    }
}

#[derive(Debug)]
pub struct MockSession {
    boards: Arc<HashMap<StationCode, Vec<RawRow>>>,
    window: NearTermWindow,
}

impl LiveTrainSession for MockSession {
    async fn fetch(
        &self,
        station: StationCode,
        now: NaiveDateTime,
    ) -> Result<Vec<TrainObservation>, CollectorError> {
        let rows = self
            .boards
            .get(&station)
            .ok_or_else(|| CollectorError::NoBoard(station.to_string()))?;
        Ok(convert_board(station, rows, now, self.window))
    }

    async fn close(self) {}
}
