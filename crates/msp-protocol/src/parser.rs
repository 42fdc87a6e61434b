//! Streaming MSP parser.
//!
//! The parser consumes one byte at a time and keeps all framing state between
//! calls, so the caller may split the byte stream at any point. Malformed
//! frames are dropped silently and the parser resynchronizes on the next `'$'`.

use crate::constants::*;
use crate::message::{Command, Direction, Message};

/// Receives every frame that passes checksum validation.
pub trait MessageHandler {
    /// Called synchronously, once per validated frame.
    fn on_message(&mut self, msg: &Message);
}

impl<F> MessageHandler for F
where
    F: FnMut(&Message),
{
    fn on_message(&mut self, msg: &Message) {
        self(msg)
    }
}

/// Position in the framing state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParserState {
    /// Waiting for `'$'`.
    #[default]
    Idle,
    /// Waiting for `'M'`.
    Sync,
    /// Waiting for `'<'` or `'>'`.
    Direction,
    /// Waiting for the payload length.
    Size,
    /// Waiting for the command code.
    Command,
    /// Collecting payload bytes.
    Payload,
    /// Waiting for the trailing checksum.
    Checksum,
}

/// Counters describing what the parser has seen.
///
/// Rejections never affect parsing; they are only counted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParserStats {
    /// Bytes consumed.
    pub bytes: u64,
    /// Frames that passed checksum validation.
    pub frames_accepted: u64,
    /// Complete frames dropped because the checksum did not match.
    pub checksum_failures: u64,
    /// Frames abandoned on a bad version or direction byte.
    pub sync_failures: u64,
    /// Frames abandoned because the declared length exceeded the payload capacity.
    pub oversize_frames: u64,
}

impl ParserStats {
    /// Total frames dropped for any reason.
    pub fn rejected(&self) -> u64 {
        self.checksum_failures + self.sync_failures + self.oversize_frames
    }
}

/// Byte-at-a-time MSP v1 parser that notifies a [`MessageHandler`].
#[derive(Debug)]
pub struct MspParser<H> {
    handler: H,
    state: ParserState,
    msg: Message,
    cursor: usize,
    stats: ParserStats,
}

impl<H: MessageHandler> MspParser<H> {
    /// Create a parser that reports validated frames to `handler`.
    pub fn new(handler: H) -> Self {
        MspParser {
            handler,
            state: ParserState::Idle,
            msg: Message::default(),
            cursor: 0,
            stats: ParserStats::default(),
        }
    }

    /// Feed a chunk of bytes, in stream order.
    pub fn feed(&mut self, data: &[u8]) {
        for &byte in data {
            self.process_byte(byte);
        }
    }

    /// Process a single byte from the input stream.
    pub fn process_byte(&mut self, byte: u8) {
        self.stats.bytes += 1;

        match self.state {
            ParserState::Idle => {
                if byte == MSP_PREAMBLE {
                    self.state = ParserState::Sync;
                }
            }

            ParserState::Sync => {
                if byte == MSP_VERSION_V1 {
                    self.state = ParserState::Direction;
                } else {
                    log::trace!("MSP: bad version byte 0x{:02X}, resyncing", byte);
                    self.stats.sync_failures += 1;
                    self.reset();
                }
            }

            ParserState::Direction => match Direction::try_from(byte) {
                Ok(direction) => {
                    self.msg.direction = direction;
                    self.state = ParserState::Size;
                }
                Err(_) => {
                    log::trace!("MSP: bad direction byte 0x{:02X}, resyncing", byte);
                    self.stats.sync_failures += 1;
                    self.reset();
                }
            },

            ParserState::Size => {
                self.msg.size = byte;
                self.msg.checksum = byte;
                self.cursor = 0;
                if usize::from(byte) > MAX_PAYLOAD_SIZE {
                    log::trace!("MSP: declared length {} exceeds capacity", byte);
                    self.stats.oversize_frames += 1;
                    self.reset();
                } else {
                    self.state = ParserState::Command;
                }
            }

            ParserState::Command => {
                self.msg.checksum ^= byte;
                self.msg.command = Command::from(byte);
                self.cursor = 0;
                self.state = if self.msg.size == 0 {
                    ParserState::Checksum
                } else {
                    ParserState::Payload
                };
            }

            ParserState::Payload => {
                self.msg.payload_mut()[self.cursor] = byte;
                self.msg.checksum ^= byte;
                self.cursor += 1;
                if self.cursor == self.msg.len() {
                    self.state = ParserState::Checksum;
                }
            }

            ParserState::Checksum => {
                if self.msg.checksum == byte {
                    self.stats.frames_accepted += 1;
                    self.handler.on_message(&self.msg);
                } else {
                    log::trace!(
                        "MSP: checksum mismatch for {} (computed 0x{:02X}, wire 0x{:02X})",
                        self.msg.command,
                        self.msg.checksum,
                        byte
                    );
                    self.stats.checksum_failures += 1;
                }
                self.reset();
            }
        }
    }

    /// Current framing state.
    pub fn state(&self) -> ParserState {
        self.state
    }

    /// Counters accumulated since construction.
    pub fn stats(&self) -> ParserStats {
        self.stats
    }

    /// Shared access to the handler.
    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// Exclusive access to the handler.
    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    /// Consume the parser, returning the handler.
    pub fn into_handler(self) -> H {
        self.handler
    }

    fn reset(&mut self) {
        self.state = ParserState::Idle;
        self.msg = Message::default();
        self.cursor = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::encode_frame;

    #[derive(Default)]
    struct Collector(Vec<Message>);

    impl MessageHandler for Collector {
        fn on_message(&mut self, msg: &Message) {
            self.0.push(msg.clone());
        }
    }

    fn collect(data: &[u8]) -> (Vec<Message>, ParserStats) {
        let mut parser = MspParser::new(Collector::default());
        parser.feed(data);
        let stats = parser.stats();
        (parser.into_handler().0, stats)
    }

    #[test]
    fn test_parse_single_frame() {
        let frame = encode_frame(Direction::Inbound, CMD_ATTITUDE, &[1, 2, 3, 4, 5, 6]).unwrap();
        let (msgs, stats) = collect(&frame);

        assert_eq!(msgs.len(), 1);
        assert_eq!(msgs[0].direction, Direction::Inbound);
        assert_eq!(msgs[0].command, Command::Attitude);
        assert_eq!(msgs[0].payload(), &[1, 2, 3, 4, 5, 6]);
        assert_eq!(stats.frames_accepted, 1);
        assert_eq!(stats.bytes, frame.len() as u64);
    }

    #[test]
    fn test_parse_zero_length_frame() {
        let frame = encode_frame(Direction::Outbound, CMD_STATUS, &[]).unwrap();
        let (msgs, _) = collect(&frame);

        assert_eq!(msgs.len(), 1);
        assert_eq!(msgs[0].direction, Direction::Outbound);
        assert!(msgs[0].is_empty());
    }

    #[test]
    fn test_checksum_mismatch_dropped() {
        let mut frame = encode_frame(Direction::Inbound, CMD_STATUS, &[0; 11]).unwrap();
        let last = frame.len() - 1;
        frame[last] ^= 0x01;
        let (msgs, stats) = collect(&frame);

        assert!(msgs.is_empty());
        assert_eq!(stats.checksum_failures, 1);
        assert_eq!(stats.frames_accepted, 0);
    }

    #[test]
    fn test_bad_version_and_direction_resync() {
        let good = encode_frame(Direction::Inbound, CMD_RC, &[9; 4]).unwrap();
        let mut data = vec![b'$', b'X', b'$', b'M', b'!'];
        data.extend_from_slice(&good);
        let (msgs, stats) = collect(&data);

        assert_eq!(msgs.len(), 1);
        assert_eq!(msgs[0].command, Command::Rc);
        assert_eq!(stats.sync_failures, 2);
    }

    #[test]
    fn test_preamble_inside_payload_is_data() {
        let payload = [b'$', b'M', b'>', 0, 0];
        let frame = encode_frame(Direction::Inbound, 200, &payload).unwrap();
        let (msgs, _) = collect(&frame);

        assert_eq!(msgs.len(), 1);
        assert_eq!(msgs[0].command, Command::Unknown(200));
        assert_eq!(msgs[0].payload(), &payload);
    }

    #[test]
    fn test_state_persists_between_calls() {
        let frame = encode_frame(Direction::Inbound, CMD_FC_VARIANT, b"INAV").unwrap();
        let mut parser = MspParser::new(Collector::default());

        parser.feed(&frame[..3]);
        assert_eq!(parser.state(), ParserState::Size);
        parser.feed(&frame[3..7]);
        assert_eq!(parser.state(), ParserState::Payload);
        parser.feed(&frame[7..]);
        assert_eq!(parser.state(), ParserState::Idle);
        assert_eq!(parser.handler().0.len(), 1);
    }

    #[test]
    fn test_closure_handler() {
        let frame = encode_frame(Direction::Inbound, CMD_STATUS, &[0; 7]).unwrap();
        let mut count = 0;
        let mut parser = MspParser::new(|_: &Message| count += 1);
        parser.feed(&frame);
        parser.feed(&frame);
        drop(parser);
        assert_eq!(count, 2);
    }

    #[test]
    fn test_round_trip_all_lengths() {
        for len in 0..=255usize {
            let payload: Vec<u8> = (0..len).map(|i| (i * 31 + len) as u8).collect();
            let frame = encode_frame(Direction::Inbound, 77, &payload).unwrap();
            let (msgs, _) = collect(&frame);

            assert_eq!(msgs.len(), 1, "length {}", len);
            assert_eq!(msgs[0].command.code(), 77);
            assert_eq!(msgs[0].len(), len);
            assert_eq!(msgs[0].payload(), payload.as_slice());
            assert_eq!(msgs[0].to_frame(), frame);
        }
    }
}
