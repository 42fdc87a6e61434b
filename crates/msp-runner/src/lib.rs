//! # msp-runner
//!
//! Process wiring for the MSP telemetry bridge: byte sources (UDP or file), the
//! read loop feeding the parser, and state export. The `msp-bridge` binary is a
//! thin clap front end over this library.

pub mod bridge;
pub mod config;
pub mod error;
pub mod source;

pub use bridge::{Bridge, ParserReport, RunSummary, StateReport, READ_BUFFER_SIZE};
pub use config::{BridgeConfig, InputSpec, DEFAULT_FORWARD_HOST};
pub use error::{RunnerError, RunnerResult};
pub use source::{open_source, ByteSource, FileSource, ReadOutcome, ReaderSource, UdpSource};
