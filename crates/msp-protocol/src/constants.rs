//! Protocol constants.

// ============================================================================
// Framing
// ============================================================================

/// First preamble byte of every frame.
pub const MSP_PREAMBLE: u8 = b'$';

/// Second preamble byte for MSP v1 frames.
pub const MSP_VERSION_V1: u8 = b'M';

/// Direction byte for frames sent to the flight controller.
pub const DIRECTION_OUTBOUND: u8 = b'<';

/// Direction byte for frames sent by the flight controller.
pub const DIRECTION_INBOUND: u8 = b'>';

/// Maximum payload length accepted by the parser.
pub const MAX_PAYLOAD_SIZE: usize = 256;

/// Bytes of framing around the payload: preamble (2), direction, length, command, checksum.
pub const FRAME_OVERHEAD: usize = 6;

// ============================================================================
// Command Codes
// ============================================================================

/// Flight controller status (armed flags live in byte 6).
pub const CMD_STATUS: u8 = 101;

/// Flight controller variant identifier (4 ASCII bytes).
pub const CMD_FC_VARIANT: u8 = 102;

/// RC channel values (little-endian u16 per channel).
pub const CMD_RC: u8 = 105;

/// Attitude: roll, pitch, heading as little-endian i16.
pub const CMD_ATTITUDE: u8 = 108;
