//! Frame encoding utilities.
//!
//! The decoder lives in [`crate::parser`]; this module produces the exact bytes
//! the decoder expects:
//!
//! ```text
//! '$' 'M' dir len cmd payload[0..len] checksum
//! ```

use bytes::BufMut;

use crate::constants::*;
use crate::error::ProtocolError;
use crate::message::{Direction, Message};

/// XOR checksum over the length byte, command byte and payload.
pub fn checksum(size: u8, command_code: u8, payload: &[u8]) -> u8 {
    payload.iter().fold(size ^ command_code, |acc, b| acc ^ b)
}

/// Encode a complete frame for the given command code and payload.
pub fn encode_frame(direction: Direction, command_code: u8, payload: &[u8]) -> Result<Vec<u8>, ProtocolError> {
    if payload.len() > u8::MAX as usize {
        return Err(ProtocolError::PayloadTooLong {
            max: u8::MAX as usize,
            actual: payload.len(),
        });
    }
    let size = payload.len() as u8;
    let mut buf = Vec::with_capacity(FRAME_OVERHEAD + payload.len());
    buf.put_u8(MSP_PREAMBLE);
    buf.put_u8(MSP_VERSION_V1);
    buf.put_u8(direction.as_byte());
    buf.put_u8(size);
    buf.put_u8(command_code);
    buf.put_slice(payload);
    buf.put_u8(checksum(size, command_code, payload));
    Ok(buf)
}

impl Message {
    /// Write this message as a wire frame into `buf`.
    ///
    /// The stored checksum is written as-is, so a parsed message reproduces its
    /// original bytes exactly.
    pub fn write_frame<B: BufMut>(&self, buf: &mut B) {
        buf.put_u8(MSP_PREAMBLE);
        buf.put_u8(MSP_VERSION_V1);
        buf.put_u8(self.direction.as_byte());
        buf.put_u8(self.size);
        buf.put_u8(self.command.code());
        buf.put_slice(self.payload());
        buf.put_u8(self.checksum);
    }

    /// Encode this message as a wire frame.
    pub fn to_frame(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.frame_len());
        self.write_frame(&mut buf);
        buf
    }
}
