//! Metrics infrastructure for the MSP telemetry bridge.
//!
//! This crate declares every metric the bridge records as a structured [`Metric`]
//! constant, so names are never spelled twice. It re-exports the `metrics` crate
//! for convenience.
//!
//! # Example
//!
//! ```rust,ignore
//! use msp_metrics::{metric_defs, describe_metrics};
//!
//! // Register descriptions once at startup
//! describe_metrics();
//!
//! metrics::counter!(metric_defs::DISPATCH_UNHANDLED.name, "command" => "200").increment(1);
//! ```
//!
//! Without an installed recorder all recording calls are no-ops. With the
//! `prometheus` feature, [`install_prometheus_exporter`] serves the values over HTTP.

pub use metrics;

use metrics::{describe_counter, describe_gauge, describe_histogram, Unit};

/// The kind of metric (counter, gauge, or histogram).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    /// A monotonically increasing counter.
    Counter,
    /// A gauge that can go up and down.
    Gauge,
    /// A histogram for recording distributions.
    Histogram,
}

impl MetricKind {
    /// Returns the kind as a lowercase string.
    pub const fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Counter => "counter",
            MetricKind::Gauge => "gauge",
            MetricKind::Histogram => "histogram",
        }
    }
}

impl std::fmt::Display for MetricKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A metric declaration with its metadata.
///
/// ```rust
/// use msp_metrics::{Metric, MetricKind};
/// use metrics::Unit;
///
/// const FRAMES: Metric = Metric::counter("msp.example.frames")
///     .with_description("Frames seen")
///     .with_unit(Unit::Count);
///
/// assert_eq!(FRAMES.name, "msp.example.frames");
/// assert_eq!(FRAMES.kind, MetricKind::Counter);
/// ```
#[derive(Debug, Clone)]
pub struct Metric {
    /// The metric name (e.g., "msp.parser.frames_accepted").
    pub name: &'static str,
    /// The kind of metric.
    pub kind: MetricKind,
    /// Human-readable description of the metric.
    pub description: &'static str,
    /// The unit of measurement (optional).
    pub unit: Option<Unit>,
    /// Expected label keys for this metric.
    pub labels: &'static [&'static str],
}

impl Metric {
    /// Creates a new counter metric with the given name.
    pub const fn counter(name: &'static str) -> Self {
        Self {
            name,
            kind: MetricKind::Counter,
            description: "",
            unit: None,
            labels: &[],
        }
    }

    /// Creates a new gauge metric with the given name.
    pub const fn gauge(name: &'static str) -> Self {
        Self {
            name,
            kind: MetricKind::Gauge,
            description: "",
            unit: None,
            labels: &[],
        }
    }

    /// Creates a new histogram metric with the given name.
    pub const fn histogram(name: &'static str) -> Self {
        Self {
            name,
            kind: MetricKind::Histogram,
            description: "",
            unit: None,
            labels: &[],
        }
    }

    /// Sets the description for the metric.
    pub const fn with_description(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    /// Sets the unit for the metric.
    pub const fn with_unit(mut self, unit: Unit) -> Self {
        self.unit = Some(unit);
        self
    }

    /// Sets the expected label keys for the metric.
    pub const fn with_labels(mut self, labels: &'static [&'static str]) -> Self {
        self.labels = labels;
        self
    }

    /// Registers this metric's description with the metrics recorder.
    ///
    /// This should be called once at startup for each metric.
    pub fn describe(&self) {
        match (self.kind, self.unit) {
            (MetricKind::Counter, Some(unit)) => {
                describe_counter!(self.name, unit, self.description);
            }
            (MetricKind::Counter, None) => {
                describe_counter!(self.name, self.description);
            }
            (MetricKind::Gauge, Some(unit)) => {
                describe_gauge!(self.name, unit, self.description);
            }
            (MetricKind::Gauge, None) => {
                describe_gauge!(self.name, self.description);
            }
            (MetricKind::Histogram, Some(unit)) => {
                describe_histogram!(self.name, unit, self.description);
            }
            (MetricKind::Histogram, None) => {
                describe_histogram!(self.name, self.description);
            }
        }
    }
}

/// All metric definitions for the bridge.
pub mod metric_defs {
    use super::{Metric, Unit};

    // ========================================================================
    // Parser
    // ========================================================================

    /// Bytes consumed by the parser.
    pub const PARSER_BYTES: Metric = Metric::counter("msp.parser.bytes")
        .with_description("Bytes consumed by the MSP parser")
        .with_unit(Unit::Bytes);

    /// Frames that passed checksum validation.
    pub const PARSER_FRAMES_ACCEPTED: Metric = Metric::counter("msp.parser.frames_accepted")
        .with_description("Frames that passed checksum validation")
        .with_unit(Unit::Count);

    /// Complete frames dropped on checksum mismatch.
    pub const PARSER_CHECKSUM_FAILURES: Metric = Metric::counter("msp.parser.checksum_failures")
        .with_description("Frames dropped because the checksum did not match")
        .with_unit(Unit::Count);

    /// Partial frames abandoned on a bad version or direction byte.
    pub const PARSER_SYNC_FAILURES: Metric = Metric::counter("msp.parser.sync_failures")
        .with_description("Frames abandoned on an unexpected version or direction byte")
        .with_unit(Unit::Count);

    // ========================================================================
    // Dispatch / Executors
    // ========================================================================

    /// Validated messages with no registered executor.
    ///
    /// Labels: command
    pub const DISPATCH_UNHANDLED: Metric = Metric::counter("msp.dispatch.unhandled")
        .with_description("Validated messages with no registered executor")
        .with_unit(Unit::Count)
        .with_labels(&["command"]);

    /// Link-stats datagrams sent downstream.
    pub const FORWARD_SENT: Metric = Metric::counter("msp.forward.sent")
        .with_description("Link statistics datagrams sent downstream")
        .with_unit(Unit::Count);

    /// Failed link-stats sends.
    pub const FORWARD_SEND_ERRORS: Metric = Metric::counter("msp.forward.send_errors")
        .with_description("Link statistics datagrams that failed to send")
        .with_unit(Unit::Count);

    /// Frame buffer flushes.
    pub const FRAME_BUFFER_FLUSHES: Metric = Metric::counter("msp.frame_buffer.flushes")
        .with_description("Times the staged frame buffer was flushed")
        .with_unit(Unit::Count);

    /// Bytes per frame buffer flush.
    pub const FRAME_BUFFER_FLUSH_SIZE: Metric = Metric::histogram("msp.frame_buffer.flush_size_bytes")
        .with_description("Bytes handed to the frame sink per flush")
        .with_unit(Unit::Bytes);

    /// All metrics, for bulk description.
    pub const ALL: &[&Metric] = &[
        &PARSER_BYTES,
        &PARSER_FRAMES_ACCEPTED,
        &PARSER_CHECKSUM_FAILURES,
        &PARSER_SYNC_FAILURES,
        &DISPATCH_UNHANDLED,
        &FORWARD_SENT,
        &FORWARD_SEND_ERRORS,
        &FRAME_BUFFER_FLUSHES,
        &FRAME_BUFFER_FLUSH_SIZE,
    ];
}

/// Describes all metrics with the installed recorder.
pub fn describe_metrics() {
    for metric in metric_defs::ALL {
        metric.describe();
    }
}

/// Installs a Prometheus recorder serving `/metrics` on `addr`.
#[cfg(feature = "prometheus")]
pub fn install_prometheus_exporter(
    addr: std::net::SocketAddr,
) -> Result<(), metrics_exporter_prometheus::BuildError> {
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;
    describe_metrics();
    Ok(())
}
