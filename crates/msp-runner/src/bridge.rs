//! The bridge: a byte source feeding a parser that owns the telemetry handler.
//!
//! Everything runs on the calling thread. Shutdown is cooperative: the loop
//! checks a flag between reads, and UDP reads time out often enough for that to
//! be prompt.

use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use msp_metrics::metric_defs;
use msp_protocol::{Command, MspParser, ParserStats};
use msp_telemetry::{FlightSnapshot, FlightState, RcConsoleExecutor, RcForwardExecutor, TelemetryHandler};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::BridgeConfig;
use crate::error::{RunnerError, RunnerResult};
use crate::source::{ByteSource, ReadOutcome};

/// Bytes requested from the source per read.
pub const READ_BUFFER_SIZE: usize = 1024;

/// A parser wired to a telemetry handler.
#[derive(Debug)]
pub struct Bridge {
    parser: MspParser<TelemetryHandler>,
}

impl Bridge {
    /// Build a bridge with the default executors plus the RC console executor,
    /// and the RC forward executor when a destination is configured.
    pub fn new(config: &BridgeConfig) -> RunnerResult<Self> {
        let mut handler = TelemetryHandler::new(config.telemetry);
        handler.register_executor(Command::Rc, Box::new(RcConsoleExecutor));
        if let Some(destination) = config.forward {
            handler.register_executor(Command::Rc, Box::new(RcForwardExecutor::new(destination)?));
            info!("Forwarding RC link stats to {}", destination);
        }
        Ok(Self::from_handler(handler))
    }

    /// Wrap an already configured handler.
    pub fn from_handler(handler: TelemetryHandler) -> Self {
        Bridge {
            parser: MspParser::new(handler),
        }
    }

    /// Push raw bytes through the decoder.
    pub fn feed(&mut self, bytes: &[u8]) {
        self.parser.feed(bytes);
    }

    /// Read from `source` until it ends or `shutdown` is set.
    ///
    /// Read errors are logged and counted; they never end the run on their own.
    pub fn run(&mut self, source: &mut dyn ByteSource, shutdown: &AtomicBool) -> RunSummary {
        let mut buf = [0u8; READ_BUFFER_SIZE];
        let mut summary = RunSummary::default();
        let handled_before = self.parser.handler().handled();
        info!("Reading MSP stream from {}", source.describe());

        while !shutdown.load(Ordering::Relaxed) {
            match source.read_chunk(&mut buf) {
                Ok(ReadOutcome::Data(n)) => {
                    summary.bytes_read += n as u64;
                    self.parser.feed(&buf[..n]);
                    self.publish_metrics();
                }
                Ok(ReadOutcome::Idle) => {}
                Ok(ReadOutcome::EndOfStream) => {
                    debug!("End of stream: {}", source.describe());
                    break;
                }
                Err(e) => {
                    summary.read_errors += 1;
                    warn!("Read error on {}: {}", source.describe(), e);
                }
            }
        }

        summary.messages_handled = self.parser.handler().handled() - handled_before;
        summary.parser = self.parser.stats();
        summary
    }

    /// Current flight state.
    pub fn state(&self) -> &FlightState {
        self.parser.handler().state()
    }

    /// Parser counters since the bridge was created.
    pub fn stats(&self) -> ParserStats {
        self.parser.stats()
    }

    /// Serializable view of the state and parser counters.
    pub fn report(&self) -> StateReport {
        StateReport {
            state: self.state().snapshot(),
            parser: ParserReport::from(self.stats()),
        }
    }

    /// Write [`Bridge::report`] as pretty JSON.
    pub fn write_report(&self, path: &Path) -> RunnerResult<()> {
        let json = serde_json::to_string_pretty(&self.report())?;
        fs::write(path, json).map_err(|source| RunnerError::StateExport {
            path: path.to_path_buf(),
            source,
        })?;
        info!("State report written to {}", path.display());
        Ok(())
    }

    fn publish_metrics(&self) {
        let stats = self.parser.stats();
        metrics::counter!(metric_defs::PARSER_BYTES.name).absolute(stats.bytes);
        metrics::counter!(metric_defs::PARSER_FRAMES_ACCEPTED.name).absolute(stats.frames_accepted);
        metrics::counter!(metric_defs::PARSER_CHECKSUM_FAILURES.name).absolute(stats.checksum_failures);
        metrics::counter!(metric_defs::PARSER_SYNC_FAILURES.name)
            .absolute(stats.sync_failures + stats.oversize_frames);
    }
}

/// What a single [`Bridge::run`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub bytes_read: u64,
    pub read_errors: u64,
    pub messages_handled: u64,
    /// Cumulative parser counters at the end of the run.
    pub parser: ParserStats,
}

impl std::fmt::Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} bytes read, {} messages handled, {} frames rejected, {} read errors",
            self.bytes_read,
            self.messages_handled,
            self.parser.rejected(),
            self.read_errors
        )
    }
}

/// Parser counters in exportable form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ParserReport {
    pub bytes: u64,
    pub frames_accepted: u64,
    pub checksum_failures: u64,
    pub sync_failures: u64,
    pub oversize_frames: u64,
}

impl From<ParserStats> for ParserReport {
    fn from(stats: ParserStats) -> Self {
        ParserReport {
            bytes: stats.bytes,
            frames_accepted: stats.frames_accepted,
            checksum_failures: stats.checksum_failures,
            sync_failures: stats.sync_failures,
            oversize_frames: stats.oversize_frames,
        }
    }
}

/// JSON document written by `--dump-state`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StateReport {
    pub state: FlightSnapshot,
    pub parser: ParserReport,
}
