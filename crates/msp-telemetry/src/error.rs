//! Error types for the telemetry core.

use std::net::SocketAddr;
use thiserror::Error;

/// Errors that can occur while wiring executors.
///
/// Executors themselves never fail: short payloads are ignored and send
/// failures are logged.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The link-stats forwarding socket could not be created.
    #[error("failed to create forwarding socket for {destination}: {source}")]
    ForwardSocket {
        /// Where datagrams would have been sent.
        destination: SocketAddr,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
