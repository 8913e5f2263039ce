//! Station catalog error types.

use std::path::PathBuf;

/// Errors that can occur while loading the station catalog.
///
/// Any of these at startup is fatal: the server cannot place gates
/// without the catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// The catalog file could not be read
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The catalog file is not valid catalog JSON
    #[error("catalog JSON parse error: {message}")]
    Json { message: String },

    /// The catalog parsed but held no usable stations
    #[error("catalog contains no usable stations")]
    Empty,
}
