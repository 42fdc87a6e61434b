//! Shared flight state.
//!
//! One [`FlightState`] lives for the whole run. Executors are the only code that
//! writes its flight fields; the message handler only stages raw frames into the
//! bounded [`FrameBuffer`].

use bytes::BytesMut;
use msp_metrics::metric_defs;
use msp_protocol::Message;
use serde::{Serialize, Serializer};
use tracing::{debug, info};

use crate::config::TelemetryConfig;

/// Number of RC channel slots tracked.
pub const CHANNEL_COUNT: usize = 18;

/// Capacity of the staged frame buffer in bytes.
pub const FRAME_BUFFER_SIZE: usize = 1024;

// ============================================================================
// Flight Controller Identifier
// ============================================================================

/// Four-character flight controller identifier, e.g. `BTFL` or `INAV`.
///
/// All-zero until the first FC_VARIANT message arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FcIdentifier([u8; 5]);

impl FcIdentifier {
    /// Build an identifier from four raw bytes.
    pub fn new(bytes: [u8; 4]) -> Self {
        let mut id = [0u8; 5];
        id[..4].copy_from_slice(&bytes);
        FcIdentifier(id)
    }

    /// The four identifier bytes (terminator excluded).
    pub fn as_bytes(&self) -> &[u8] {
        &self.0[..4]
    }

    /// Whether an identifier has been received yet.
    pub fn is_set(&self) -> bool {
        self.0[..4].iter().any(|&b| b != 0)
    }
}

impl std::fmt::Display for FcIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let end = self.0.iter().position(|&b| b == 0).unwrap_or(4);
        write!(f, "{}", String::from_utf8_lossy(&self.0[..end]))
    }
}

impl Serialize for FcIdentifier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

// ============================================================================
// Frame Buffer
// ============================================================================

/// Destination for staged frames when the frame buffer flushes.
pub trait FrameSink {
    /// Receive the staged bytes. The buffer is cleared afterwards.
    fn flush(&mut self, frames: &[u8]);
}

impl<F> FrameSink for F
where
    F: FnMut(&[u8]),
{
    fn flush(&mut self, frames: &[u8]) {
        self(frames)
    }
}

/// Default sink: reports the flush and drops the bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogFrameSink {
    verbose: bool,
}

impl LogFrameSink {
    /// Create a log-only sink.
    pub fn new(verbose: bool) -> Self {
        LogFrameSink { verbose }
    }
}

impl FrameSink for LogFrameSink {
    fn flush(&mut self, frames: &[u8]) {
        if self.verbose {
            info!("Flushing frame buffer of size {}", frames.len());
        } else {
            debug!("Flushing frame buffer of size {}", frames.len());
        }
    }
}

/// Bounded buffer batching validated frames before they are flushed.
///
/// A frame is never split: if appending it would exceed [`FRAME_BUFFER_SIZE`],
/// the buffer is flushed first.
pub struct FrameBuffer {
    buf: BytesMut,
    sink: Box<dyn FrameSink>,
    flushes: u64,
}

impl FrameBuffer {
    /// Create an empty buffer flushing into `sink`.
    pub fn new(sink: Box<dyn FrameSink>) -> Self {
        FrameBuffer {
            buf: BytesMut::with_capacity(FRAME_BUFFER_SIZE),
            sink,
            flushes: 0,
        }
    }

    /// Append the wire encoding of `msg`, flushing first if it would not fit.
    pub fn stage(&mut self, msg: &Message) {
        if self.buf.len() + msg.frame_len() > FRAME_BUFFER_SIZE {
            self.flush();
        }
        msg.write_frame(&mut self.buf);
    }

    /// Hand the staged bytes to the sink and reset the cursor.
    pub fn flush(&mut self) {
        metrics::counter!(metric_defs::FRAME_BUFFER_FLUSHES.name).increment(1);
        metrics::histogram!(metric_defs::FRAME_BUFFER_FLUSH_SIZE.name).record(self.buf.len() as f64);
        self.sink.flush(&self.buf);
        self.buf.clear();
        self.flushes += 1;
    }

    /// Bytes currently staged.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether nothing is staged.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Staged bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Number of flushes so far.
    pub fn flush_count(&self) -> u64 {
        self.flushes
    }
}

impl std::fmt::Debug for FrameBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameBuffer")
            .field("len", &self.buf.len())
            .field("flushes", &self.flushes)
            .finish()
    }
}

// ============================================================================
// Flight State
// ============================================================================

/// Decoded flight data plus the staged frame buffer.
#[derive(Debug)]
pub struct FlightState {
    /// Motors enabled.
    pub armed: bool,
    /// Pitch in raw sensor units.
    pub pitch: i16,
    /// Roll in raw sensor units.
    pub roll: i16,
    /// Heading in raw sensor units.
    pub heading: i16,
    /// Latest RC channel readings.
    pub channels: [u16; CHANNEL_COUNT],
    /// Flight controller variant.
    pub fc_identifier: FcIdentifier,
    frames: FrameBuffer,
}

impl Default for FlightState {
    fn default() -> Self {
        Self::new(&TelemetryConfig::default())
    }
}

impl FlightState {
    /// Create a zeroed state whose frame buffer flushes to the log.
    pub fn new(config: &TelemetryConfig) -> Self {
        Self::with_frame_sink(Box::new(LogFrameSink::new(config.verbose)))
    }

    /// Create a zeroed state whose frame buffer flushes into `sink`.
    pub fn with_frame_sink(sink: Box<dyn FrameSink>) -> Self {
        FlightState {
            armed: false,
            pitch: 0,
            roll: 0,
            heading: 0,
            channels: [0; CHANNEL_COUNT],
            fc_identifier: FcIdentifier::default(),
            frames: FrameBuffer::new(sink),
        }
    }

    /// Stage a validated message for forwarding.
    pub fn stage_frame(&mut self, msg: &Message) {
        self.frames.stage(msg);
    }

    /// The staged frame buffer.
    pub fn frame_buffer(&self) -> &FrameBuffer {
        &self.frames
    }

    /// Copy of the flight fields, suitable for export.
    pub fn snapshot(&self) -> FlightSnapshot {
        FlightSnapshot {
            armed: self.armed,
            pitch: self.pitch,
            roll: self.roll,
            heading: self.heading,
            channels: self.channels,
            fc_identifier: self.fc_identifier,
        }
    }
}

/// Serializable view of [`FlightState`] without the frame buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FlightSnapshot {
    pub armed: bool,
    pub pitch: i16,
    pub roll: i16,
    pub heading: i16,
    pub channels: [u16; CHANNEL_COUNT],
    pub fc_identifier: FcIdentifier,
}
