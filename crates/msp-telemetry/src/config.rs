//! Telemetry configuration.

/// Options threaded through the handler, state and executors at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// Report state changes at `info` level instead of `debug`.
    pub verbose: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        TelemetryConfig { verbose: true }
    }
}

impl TelemetryConfig {
    /// A configuration that keeps per-message reporting at `debug` level.
    pub fn quiet() -> Self {
        TelemetryConfig { verbose: false }
    }
}
