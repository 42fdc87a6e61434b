//! MultiWii Serial Protocol (MSP v1)
//!
//! This crate provides the wire layer for the MSP telemetry bridge: message types,
//! a byte-at-a-time streaming parser, and a frame encoder. It performs no I/O.
//!
//! # Protocol Overview
//!
//! Every frame has the same shape:
//!
//! ```text
//! +-----+-----+-----+-----+-----+-------------------+----------+
//! | '$' | 'M' | dir | len | cmd | payload[0..len]   | checksum |
//! +-----+-----+-----+-----+-----+-------------------+----------+
//! ```
//!
//! - `dir` is `'<'` (outbound, to the flight controller) or `'>'` (inbound, from it)
//! - `checksum` is the XOR of `len`, `cmd` and every payload byte
//!
//! # Example
//!
//! ```rust
//! use msp_protocol::{encode_frame, Direction, Message, MspParser, CMD_ATTITUDE};
//!
//! let frame = encode_frame(Direction::Inbound, CMD_ATTITUDE, &[0x10, 0x00, 0xF0, 0xFF, 0x2C, 0x01])?;
//!
//! let mut received = Vec::new();
//! let mut parser = MspParser::new(|msg: &Message| received.push(msg.clone()));
//! parser.feed(&frame);
//! drop(parser);
//!
//! assert_eq!(received.len(), 1);
//! assert_eq!(received[0].payload(), &[0x10, 0x00, 0xF0, 0xFF, 0x2C, 0x01]);
//! # Ok::<(), msp_protocol::ProtocolError>(())
//! ```

mod constants;
mod error;
mod frame;
mod message;
mod parser;

pub use constants::*;
pub use error::*;
pub use frame::*;
pub use message::*;
pub use parser::*;
