// Error types for racewatch

use snafu::Snafu;
use std::{io, path::PathBuf};

#[derive(Debug, Snafu)]
pub enum RacewatchError {
    // Errors while reading from the session store
    #[snafu(display("Session store unreachable at {url}: {reason}"))]
    StoreUnreachable { url: String, reason: String },
    #[snafu(display("Session store at {url} answered with HTTP status {status}"))]
    StoreStatus { url: String, status: u16 },
    #[snafu(display("Malformed response from session store at {url}"))]
    MalformedResponse {
        url: String,
        source: serde_json::Error,
    },
    #[snafu(display("Could not read session file {path:?}"))]
    StoreFileError { path: PathBuf, source: io::Error },

    // Statistics errors
    #[snafu(display("No telemetry samples available"))]
    EmptySeries,

    // Errors for the telemetry writer
    #[snafu(display("Error writing telemetry file"))]
    WriterError { source: io::Error },
    #[snafu(display("Session {id} not found"))]
    SessionNotFound { id: String },

    // Config management errors
    #[snafu(display("Could not find application data directory to save config file"))]
    NoConfigDir,
    #[snafu(display("Error writing config file"))]
    ConfigIOError { source: io::Error },
    #[snafu(display("Error serializing config file"))]
    ConfigSerializeError { source: serde_json::Error },

    // User input validation errors
    #[snafu(display("Invalid user input: {field} - {reason}"))]
    InvalidUserInput { field: String, reason: String },

    // UI errors
    #[snafu(display("Could not start dashboard: {reason}"))]
    DashboardStartError { reason: String },
}

impl RacewatchError {
    /// Whether the error means the session store could not deliver data. These are shown as a
    /// non-fatal banner while the last good state stays on screen.
    pub fn is_retrieval(&self) -> bool {
        matches!(
            self,
            RacewatchError::StoreUnreachable { .. }
                | RacewatchError::StoreStatus { .. }
                | RacewatchError::MalformedResponse { .. }
                | RacewatchError::StoreFileError { .. }
        )
    }
}
