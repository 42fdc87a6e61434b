//! # msp-telemetry
//!
//! The decoding core of the MSP telemetry bridge: the shared [`FlightState`], the
//! [`CommandDispatcher`] with its pluggable [`CommandExecutor`]s, and the
//! [`TelemetryHandler`] that connects an [`msp_protocol::MspParser`] to them.
//!
//! ```text
//! bytes -> MspParser -> TelemetryHandler -> CommandDispatcher -> executors -> FlightState / events
//! ```
//!
//! Everything runs synchronously on the caller's thread; the state is passed by
//! exclusive reference to one executor at a time.
//!
//! ## Example
//!
//! ```rust
//! use msp_protocol::{encode_frame, Command, Direction, MspParser, CMD_RC};
//! use msp_telemetry::{RcConsoleExecutor, TelemetryConfig, TelemetryHandler};
//!
//! let mut handler = TelemetryHandler::new(TelemetryConfig::quiet());
//! handler.register_executor(Command::Rc, Box::new(RcConsoleExecutor));
//!
//! let mut parser = MspParser::new(handler);
//! let payload: Vec<u8> = [1500u16; 16].iter().flat_map(|c| c.to_le_bytes()).collect();
//! parser.feed(&encode_frame(Direction::Inbound, CMD_RC, &payload)?);
//!
//! assert_eq!(parser.handler().state().channels[0], 1500);
//! # Ok::<(), msp_protocol::ProtocolError>(())
//! ```

mod config;
mod dispatcher;
mod error;
mod events;
mod executors;
mod handler;
mod state;

pub use config::TelemetryConfig;
pub use dispatcher::{CommandDispatcher, CommandExecutor};
pub use error::{TelemetryError, TelemetryResult};
pub use events::{LogEventSink, RecordingSink, TelemetryEvent, TelemetryEventSink};
pub use executors::*;
pub use handler::TelemetryHandler;
pub use state::{
    FcIdentifier, FlightSnapshot, FlightState, FrameBuffer, FrameSink, LogFrameSink, CHANNEL_COUNT,
    FRAME_BUFFER_SIZE,
};
