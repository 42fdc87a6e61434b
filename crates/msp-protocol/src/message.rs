//! Parsed MSP messages.

use crate::constants::*;
use crate::error::ProtocolError;

/// Which party sent a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    /// Host to flight controller (`'<'`).
    #[default]
    Outbound,
    /// Flight controller to host (`'>'`).
    Inbound,
}

impl Direction {
    /// The wire byte for this direction.
    pub const fn as_byte(self) -> u8 {
        match self {
            Direction::Outbound => DIRECTION_OUTBOUND,
            Direction::Inbound => DIRECTION_INBOUND,
        }
    }
}

impl TryFrom<u8> for Direction {
    type Error = ProtocolError;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        match byte {
            DIRECTION_OUTBOUND => Ok(Direction::Outbound),
            DIRECTION_INBOUND => Ok(Direction::Inbound),
            other => Err(ProtocolError::InvalidDirection(other)),
        }
    }
}

/// Commands understood by the bridge.
///
/// Any other code is carried as [`Command::Unknown`] so it can still be framed,
/// logged and (optionally) dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Command {
    /// `MSP_STATUS` (101).
    Status,
    /// `MSP_FC_VARIANT` (102).
    FcVariant,
    /// `MSP_RC` (105).
    Rc,
    /// `MSP_ATTITUDE` (108).
    Attitude,
    /// Any unrecognized command code.
    ///
    /// `Unknown` holding a known code (e.g. `Unknown(101)`) aliases the named
    /// variant; [`Command::canonical`] folds it back, and [`Message::new`] and
    /// the parser only ever store the canonical form.
    Unknown(u8),
}

impl Command {
    /// The numeric command code.
    pub const fn code(self) -> u8 {
        match self {
            Command::Status => CMD_STATUS,
            Command::FcVariant => CMD_FC_VARIANT,
            Command::Rc => CMD_RC,
            Command::Attitude => CMD_ATTITUDE,
            Command::Unknown(code) => code,
        }
    }

    /// Returns true for codes outside the known set.
    pub const fn is_unknown(self) -> bool {
        matches!(self.canonical(), Command::Unknown(_))
    }

    /// The variant the parser produces for this command's code.
    pub const fn canonical(self) -> Self {
        match self {
            Command::Unknown(code) => Command::from_code(code),
            known => known,
        }
    }

    const fn from_code(code: u8) -> Self {
        match code {
            CMD_STATUS => Command::Status,
            CMD_FC_VARIANT => Command::FcVariant,
            CMD_RC => Command::Rc,
            CMD_ATTITUDE => Command::Attitude,
            other => Command::Unknown(other),
        }
    }
}

impl From<u8> for Command {
    fn from(code: u8) -> Self {
        Command::from_code(code)
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Command::Status => write!(f, "STATUS"),
            Command::FcVariant => write!(f, "FC_VARIANT"),
            Command::Rc => write!(f, "RC"),
            Command::Attitude => write!(f, "ATTITUDE"),
            Command::Unknown(code) => write!(f, "UNKNOWN({})", code),
        }
    }
}

/// One MSP frame, as reconstructed by the parser.
///
/// The payload is a fixed-capacity array; only the first `size` bytes are meaningful.
#[derive(Clone, PartialEq, Eq)]
pub struct Message {
    /// Which party sent the frame.
    pub direction: Direction,
    /// Resolved command.
    pub command: Command,
    /// Payload length as declared on the wire.
    pub size: u8,
    /// Running XOR checksum.
    pub checksum: u8,
    payload: [u8; MAX_PAYLOAD_SIZE],
}

impl Default for Message {
    fn default() -> Self {
        Message {
            direction: Direction::Outbound,
            command: Command::Unknown(0),
            size: 0,
            checksum: 0,
            payload: [0; MAX_PAYLOAD_SIZE],
        }
    }
}

impl Message {
    /// Build a message from parts, computing the checksum.
    ///
    /// `command` is stored in canonical form, matching what the parser yields.
    pub fn new(direction: Direction, command: Command, payload: &[u8]) -> Result<Self, ProtocolError> {
        if payload.len() > u8::MAX as usize {
            return Err(ProtocolError::PayloadTooLong {
                max: u8::MAX as usize,
                actual: payload.len(),
            });
        }
        let size = payload.len() as u8;
        let command = command.canonical();
        let mut msg = Message {
            direction,
            command,
            size,
            checksum: crate::frame::checksum(size, command.code(), payload),
            ..Message::default()
        };
        msg.payload[..payload.len()].copy_from_slice(payload);
        Ok(msg)
    }

    /// The valid part of the payload.
    pub fn payload(&self) -> &[u8] {
        &self.payload[..self.size as usize]
    }

    /// Declared payload length.
    pub fn len(&self) -> usize {
        self.size as usize
    }

    /// Whether the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Little-endian `u16` at `offset`, if the declared payload covers it.
    pub fn read_u16_le(&self, offset: usize) -> Option<u16> {
        let bytes = self.payload().get(offset..offset + 2)?;
        Some(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    /// Little-endian `i16` at `offset`, if the declared payload covers it.
    pub fn read_i16_le(&self, offset: usize) -> Option<i16> {
        self.read_u16_le(offset).map(|v| v as i16)
    }

    /// Total size of this message once framed.
    pub fn frame_len(&self) -> usize {
        FRAME_OVERHEAD + self.len()
    }

    pub(crate) fn payload_mut(&mut self) -> &mut [u8; MAX_PAYLOAD_SIZE] {
        &mut self.payload
    }
}

impl std::fmt::Debug for Message {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Message")
            .field("direction", &self.direction)
            .field("command", &self.command)
            .field("size", &self.size)
            .field("checksum", &format_args!("0x{:02X}", self.checksum))
            .field("payload", &self.payload())
            .finish()
    }
}
