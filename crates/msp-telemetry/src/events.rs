//! Externally observable effects produced by executors.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::{debug, info};

use crate::executors::LinkStats;
use crate::state::{FcIdentifier, CHANNEL_COUNT};

/// Something an executor wants the outside world to see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TelemetryEvent {
    /// STATUS updated the armed flag.
    ArmedUpdated { armed: bool },
    /// ATTITUDE updated the orientation.
    AttitudeUpdated { roll: i16, pitch: i16, heading: i16 },
    /// FC_VARIANT reported a different identifier than the stored one.
    IdentifierChanged(FcIdentifier),
    /// RC channels after an update, all slots.
    ChannelSnapshot([u16; CHANNEL_COUNT]),
    /// A link-stats line was sent downstream.
    LinkStatsSent { stats: LinkStats, line: String },
}

/// Receives executor effects.
pub trait TelemetryEventSink {
    /// Called synchronously from within an executor.
    fn emit(&mut self, event: TelemetryEvent);
}

/// Default sink: writes each event to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogEventSink {
    verbose: bool,
}

impl LogEventSink {
    /// Create a log sink; `verbose` selects `info` over `debug`.
    pub fn new(verbose: bool) -> Self {
        LogEventSink { verbose }
    }
}

impl TelemetryEventSink for LogEventSink {
    fn emit(&mut self, event: TelemetryEvent) {
        let line = match &event {
            TelemetryEvent::ArmedUpdated { armed } => format!("Armed = {}", armed),
            TelemetryEvent::AttitudeUpdated { roll, pitch, heading } => {
                format!("pitch:{} roll:{} heading:{}", pitch, roll, heading)
            }
            TelemetryEvent::IdentifierChanged(id) => format!("Flight Controller: {}", id),
            TelemetryEvent::ChannelSnapshot(channels) => {
                let values: Vec<String> = channels.iter().map(|c| c.to_string()).collect();
                format!("Channels: {}", values.join(" "))
            }
            TelemetryEvent::LinkStatsSent { line, .. } => format!("Link stats sent: {}", line.trim_end()),
        };
        if self.verbose {
            info!("{}", line);
        } else {
            debug!("{}", line);
        }
    }
}

/// In-memory sink; clones share the same event list.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    events: Rc<RefCell<Vec<TelemetryEvent>>>,
}

impl RecordingSink {
    /// Create an empty recording sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything recorded so far.
    pub fn events(&self) -> Vec<TelemetryEvent> {
        self.events.borrow().clone()
    }

    /// Drain the recorded events.
    pub fn take(&self) -> Vec<TelemetryEvent> {
        std::mem::take(&mut *self.events.borrow_mut())
    }

    /// Number of recorded events.
    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }
}

impl TelemetryEventSink for RecordingSink {
    fn emit(&mut self, event: TelemetryEvent) {
        self.events.borrow_mut().push(event);
    }
}
