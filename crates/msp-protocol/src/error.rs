//! Protocol error types.

use thiserror::Error;

/// Errors that can occur when building MSP frames.
///
/// Parsing never fails: malformed input is dropped and the parser resynchronizes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Payload does not fit in the one-byte length field.
    #[error("payload too long: maximum {max} bytes, got {actual}")]
    PayloadTooLong {
        /// Maximum encodable length.
        max: usize,
        /// Actual payload length.
        actual: usize,
    },

    /// Byte is not a valid direction marker.
    #[error("invalid direction byte: 0x{0:02X}")]
    InvalidDirection(u8),
}
