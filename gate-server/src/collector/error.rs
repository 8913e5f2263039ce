//! Live train collector error types.

/// Errors from the live train collector.
#[derive(Debug, thiserror::Error)]
pub enum CollectorError {
    /// The collector session could not be established
    #[error("session unavailable: {0}")]
    Session(String),

    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The site answered with an error status
    #[error("site error {status} for {station}")]
    Status { station: String, status: u16 },

    /// A required page element never appeared, even after retries
    #[error("{element} not found for {station} after {attempts} attempts")]
    ElementNotFound {
        station: String,
        element: &'static str,
        attempts: u32,
    },

    /// No board is available for this station (mock data only)
    #[error("no board for station {0}")]
    NoBoard(String),

    /// Board data could not be read or parsed
    #[error("invalid board data: {0}")]
    InvalidBoard(String),
}
