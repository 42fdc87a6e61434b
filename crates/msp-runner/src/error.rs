//! Error types for the runner.

use std::path::PathBuf;

use msp_telemetry::TelemetryError;
use thiserror::Error;

/// Fatal errors while wiring or finishing a run.
///
/// Errors during the run itself (a failed receive, a failed send) are logged
/// and never reach this type.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// The UDP input socket could not be bound.
    #[error("failed to bind UDP port {port}: {source}")]
    Bind {
        /// Requested port.
        port: u16,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The input file could not be opened.
    #[error("failed to open file {}: {source}", path.display())]
    OpenFile {
        /// Requested path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The forward destination did not resolve to an address.
    #[error("invalid forward destination {host}:{port}")]
    ForwardAddress {
        /// Host as given.
        host: String,
        /// Port as given.
        port: u16,
    },

    /// Executor wiring failed.
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),

    /// The state report could not be written.
    #[error("failed to write state report to {}: {source}", path.display())]
    StateExport {
        /// Output path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The state report could not be serialized.
    #[error("failed to serialize state report: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The Ctrl-C handler could not be installed.
    #[error("failed to install Ctrl-C handler: {0}")]
    Signal(#[from] ctrlc::Error),

    /// The metrics exporter could not be installed.
    #[error("failed to install metrics exporter: {0}")]
    MetricsExporter(String),
}

/// Result type alias for runner operations.
pub type RunnerResult<T> = Result<T, RunnerError>;
