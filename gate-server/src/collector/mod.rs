//! Live train collector.
//!
//! Reads the live-station board of a junction and returns the trains due to
//! depart there within the near-term window.
//!
//! A batch opens one session, fetches each junction through it, and closes
//! it. Sessions exist because the live site ties its form submissions to a
//! cookie-backed browsing session; opening one is the expensive step.
//!
//! Two sources are provided:
//! - [`NtesCollector`] scrapes the mobile NTES site
//! - [`MockCollector`] serves rows from JSON files for local development

mod board;
mod error;
mod mock;
mod ntes;

use std::future::Future;

use chrono::NaiveDateTime;

use crate::domain::{StationCode, TrainObservation};

pub use board::{RawRow, RowError, convert_board, convert_row, last_updated_stamp};
pub use error::CollectorError;
pub use mock::{MockCollector, MockSession};
pub use ntes::{CollectorConfig, DEFAULT_BASE_URL, NtesCollector, NtesSession, parse_results_table};

/// A source of live junction boards.
pub trait LiveTrainSource: Send + Sync {
    type Session: LiveTrainSession;

    /// Establish a session. Failure here degrades a whole batch.
    fn open_session(&self) -> impl Future<Output = Result<Self::Session, CollectorError>> + Send;
}

/// An open collector session.
pub trait LiveTrainSession: Send + Sync {
    /// Trains departing `station` within the window, as of `now`.
    fn fetch(
        &self,
        station: StationCode,
        now: NaiveDateTime,
    ) -> impl Future<Output = Result<Vec<TrainObservation>, CollectorError>> + Send;

    /// Release the session.
    fn close(self) -> impl Future<Output = ()> + Send;
}

/// The collector the server runs with, chosen at startup.
#[derive(Debug, Clone)]
pub enum Collector {
    Ntes(NtesCollector),
    Mock(MockCollector),
}

impl Collector {
    pub fn name(&self) -> &'static str {
        match self {
            Collector::Ntes(_) => "ntes",
            Collector::Mock(_) => "mock",
        }
    }
}

impl From<NtesCollector> for Collector {
    fn from(c: NtesCollector) -> Self {
        Collector::Ntes(c)
    }
}

impl From<MockCollector> for Collector {
    fn from(c: MockCollector) -> Self {
        Collector::Mock(c)
    }
}

/// Session of a [`Collector`].
#[derive(Debug)]
pub enum Session {
    Ntes(NtesSession),
    Mock(MockSession),
}

impl LiveTrainSource for Collector {
    type Session = Session;

    async fn open_session(&self) -> Result<Session, CollectorError> {
        match self {
            Collector::Ntes(c) => c.open_session().await.map(Session::Ntes),
            Collector::Mock(c) => c.open_session().await.map(Session::Mock),
        }
    }
}

impl LiveTrainSession for Session {
    async fn fetch(
        &self,
        station: StationCode,
        now: NaiveDateTime,
    ) -> Result<Vec<TrainObservation>, CollectorError> {
        match self {
            Session::Ntes(s) => s.fetch(station, now).await,
            Session::Mock(s) => s.fetch(station, now).await,
        }
    }

    async fn close(self) {
        match self {
            Session::Ntes(s) => s.close().await,
            Session::Mock(s) => s.close().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::window::NearTermWindow;
    use chrono::NaiveDate;
    use std::collections::HashMap;

    #[tokio::test]
    async fn collector_enum_dispatches_to_mock() {
        let code = StationCode::parse("ERS").unwrap();
        let mut boards = HashMap::new();
        boards.insert(
            code,
            vec![RawRow::new([
                "1",
                "12626 | Kerala Express (NDLS-TVC)",
                "09:50",
                "10:00",
                "3",
            ])],
        );
        let collector: Collector = MockCollector::from_boards(boards, NearTermWindow::default()).into();
        assert_eq!(collector.name(), "mock");

        let now = NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let session = collector.open_session().await.unwrap();
        let trains = session.fetch(code, now).await.unwrap();
        session.close().await;

        assert_eq!(trains.len(), 1);
        assert_eq!(trains[0].train_name, "Kerala Express");
    }
}
