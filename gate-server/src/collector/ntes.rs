//! NTES live-station collector.
//!
//! Drives the mobile NTES site over plain HTTP: one cookie-carrying client
//! per session, one live-station form submission per junction, and a
//! regex scrape of the `w3-table` results table.

use std::sync::LazyLock;
use std::time::Duration;

use chrono::NaiveDateTime;
use regex::Regex;
use tracing::{debug, info, warn};

use crate::domain::{StationCode, TrainObservation};
use crate::window::NearTermWindow;

use super::board::{RawRow, convert_board};
use super::error::CollectorError;
use super::{LiveTrainSession, LiveTrainSource};

/// Default base URL of the mobile NTES site.
pub const DEFAULT_BASE_URL: &str = "https://enquiry.indianrail.gov.in/mntes";

/// Look-ahead requested from the live-station form, in hours.
const LOOKAHEAD_HOURS: &str = "2";

const USER_AGENT: &str = "Mozilla/5.0 (Linux; Android 13) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Mobile Safari/537.36";

static TABLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<table[^>]*class\s*=\s*["'][^"']*\bw3-table\b[^"']*["'][^>]*>(.*?)</table>"#)
        .expect("table pattern is valid")
});

static TBODY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<tbody[^>]*>(.*?)</tbody>").expect("tbody pattern is valid")
});

static ROW_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<tr[^>]*>(.*?)</tr>").expect("row pattern is valid"));

static CELL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<td[^>]*>(.*?)</td>").expect("cell pattern is valid"));

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("tag pattern is valid"));

/// Configuration for the NTES collector.
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// Base URL of the site (overridable for testing)
    pub base_url: String,
    /// Form submissions per lookup before giving up
    pub attempts: u32,
    /// Fixed pause between attempts
    pub backoff: Duration,
    /// Per-request timeout
    pub page_timeout: Duration,
    /// Trains departing outside this window are dropped
    pub window: NearTermWindow,
}

impl CollectorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts;
        self
    }

    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn with_page_timeout(mut self, timeout: Duration) -> Self {
        self.page_timeout = timeout;
        self
    }

    pub fn with_window(mut self, window: NearTermWindow) -> Self {
        self.window = window;
        self
    }
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            attempts: 2,
            backoff: Duration::from_secs(2),
            page_timeout: Duration::from_secs(20),
            window: NearTermWindow::default(),
        }
    }
}

/// Live train source backed by the NTES site.
#[derive(Debug, Clone)]
pub struct NtesCollector {
    config: CollectorConfig,
}

impl NtesCollector {
    pub fn new(config: CollectorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CollectorConfig {
        &self.config
    }
}

impl LiveTrainSource for NtesCollector {
    type Session = NtesSession;

    async fn open_session(&self) -> Result<NtesSession, CollectorError> {
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .user_agent(USER_AGENT)
            .timeout(self.config.page_timeout)
            .build()
            .map_err(|e| CollectorError::Session(e.to_string()))?;

        let landing = format!("{}/", self.config.base_url.trim_end_matches('/'));
        let response = http
            .get(&landing)
            .send()
            .await
            .map_err(|e| CollectorError::Session(e.to_string()))?;

        if !response.status().is_success() {
            return Err(CollectorError::Session(format!(
                "landing page answered {}",
                response.status()
            )));
        }

        info!(url = %landing, "collector session opened");
        Ok(NtesSession {
            http,
            config: self.config.clone(),
        })
    }
}

/// One browsing session on the NTES site.
///
/// Holds the cookie jar the site's forms depend on.
#[derive(Debug)]
pub struct NtesSession {
    http: reqwest::Client,
    config: CollectorConfig,
}

impl NtesSession {
    fn live_station_url(&self) -> String {
        format!("{}/liveStation", self.config.base_url.trim_end_matches('/'))
    }

    /// Submit the live-station form for `station` and return the page body.
    async fn submit_form(&self, station: StationCode) -> Result<String, CollectorError> {
        let response = self
            .http
            .post(self.live_station_url())
            .form(&[
                ("jFromStationInput", station.as_str()),
                ("nHr", LOOKAHEAD_HOURS),
                ("submit", "Get Trains"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CollectorError::Status {
                station: station.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response.text().await?)
    }

    /// Submit the form until the results table appears.
    ///
    /// Returns `Ok(None)` if every attempt loaded a page without the table.
    /// If the last attempt failed at the HTTP level, that error is returned.
    async fn results_table(&self, station: StationCode) -> Result<Option<Vec<RawRow>>, CollectorError> {
        let attempts = self.config.attempts.max(1);
        let mut last_err = None;

        for attempt in 1..=attempts {
            debug!(station = %station, attempt, attempts, "requesting live station board");
            match self.submit_form(station).await {
                Ok(html) => {
                    if let Some(rows) = parse_results_table(&html) {
                        return Ok(Some(rows));
                    }
                    warn!(station = %station, attempt, "results table not found");
                    last_err = None;
                }
                Err(e) => {
                    warn!(station = %station, attempt, error = %e, "live station request failed");
                    last_err = Some(e);
                }
            }

            if attempt < attempts {
                tokio::time::sleep(self.config.backoff).await;
            }
        }

        match last_err {
            Some(e) => Err(e),
            None => Ok(None),
        }
    }
}

impl LiveTrainSession for NtesSession {
    async fn fetch(
        &self,
        station: StationCode,
        now: NaiveDateTime,
    ) -> Result<Vec<TrainObservation>, CollectorError> {
        let rows = match self.results_table(station).await? {
            Some(rows) => rows,
            None => {
                info!(station = %station, "resubmitting live station form");
                tokio::time::sleep(self.config.backoff).await;
                self.results_table(station)
                    .await?
                    .ok_or_else(|| CollectorError::ElementNotFound {
                        station: station.to_string(),
                        element: "results table",
                        attempts: self.config.attempts.max(1) * 2,
                    })?
            }
        };

        info!(station = %station, rows = rows.len(), "live station board loaded");
        let trains = convert_board(station, &rows, now, self.config.window);
        info!(
            station = %station,
            trains = trains.len(),
            window_mins = self.config.window.minutes(),
            "trains departing within window"
        );
        for t in &trains {
            debug!(
                station = %station,
                train = %t.train_number,
                name = %t.train_name,
                arrival = %t.schedule.arrival,
                departure = %t.schedule.departure,
                "train on board"
            );
        }

        Ok(trains)
    }

    async fn close(self) {
        info!("collector session closed");
    }
}

/// Extract the data rows of the `w3-table` results table.
///
/// The first row of the table body is the column header and is skipped.
/// Returns `None` when the page has no results table.
pub fn parse_results_table(html: &str) -> Option<Vec<RawRow>> {
    let table = TABLE_RE.captures(html)?.get(1)?.as_str();
    let body = TBODY_RE
        .captures(table)
        .and_then(|c| c.get(1))
        .map_or(table, |m| m.as_str());

    let rows = ROW_RE
        .captures_iter(body)
        .skip(1)
        .filter_map(|row| row.get(1))
        .map(|row| RawRow {
            cells: CELL_RE
                .captures_iter(row.as_str())
                .filter_map(|c| c.get(1))
                .map(|c| cell_text(c.as_str()))
                .collect(),
        })
        .collect();

    Some(rows)
}

/// Visible text of a cell: tags removed, entities decoded, whitespace
/// collapsed.
fn cell_text(inner_html: &str) -> String {
    let text = TAG_RE.replace_all(inner_html, " ");
    let text = text
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&");
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
