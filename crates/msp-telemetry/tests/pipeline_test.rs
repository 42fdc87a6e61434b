//! End-to-end tests for the parser -> handler -> dispatcher -> executor chain.
//!
//! These feed raw byte streams and check the resulting flight state and events,
//! independent of how the stream is chunked.

use msp_protocol::{encode_frame, Command, Direction, MspParser, CMD_ATTITUDE, CMD_FC_VARIANT, CMD_RC, CMD_STATUS};
use msp_telemetry::{
    FcIdentifier, FlightSnapshot, RcConsoleExecutor, RcForwardExecutor, RecordingSink, TelemetryConfig,
    TelemetryEvent, TelemetryHandler,
};
use std::net::UdpSocket;
use std::time::Duration;

// ============================================================================
// Helpers
// ============================================================================

fn new_parser() -> (MspParser<TelemetryHandler>, RecordingSink) {
    let events = RecordingSink::new();
    let mut handler =
        TelemetryHandler::new(TelemetryConfig::quiet()).with_event_sink(Box::new(events.clone()));
    handler.register_executor(Command::Rc, Box::new(RcConsoleExecutor));
    (MspParser::new(handler), events)
}

fn rc_payload(channels: &[u16]) -> Vec<u8> {
    channels.iter().flat_map(|c| c.to_le_bytes()).collect()
}

/// A stream touching every executor.
fn sample_stream() -> Vec<u8> {
    let channels: Vec<u16> = (0..16).map(|i| 1000 + i * 10).collect();
    let mut stream = Vec::new();
    stream.extend(encode_frame(Direction::Inbound, CMD_FC_VARIANT, b"BTFL").unwrap());
    stream.extend(encode_frame(Direction::Inbound, CMD_STATUS, &[0, 0, 0, 0, 0, 0, 1, 0, 0, 0, 0]).unwrap());
    stream.extend(encode_frame(Direction::Inbound, CMD_ATTITUDE, &[0x10, 0x00, 0xF0, 0xFF, 0x2C, 0x01]).unwrap());
    stream.extend(encode_frame(Direction::Inbound, CMD_RC, &rc_payload(&channels)).unwrap());
    stream.extend(encode_frame(Direction::Outbound, 200, &[]).unwrap());
    stream
}

fn run_chunked(stream: &[u8], chunk_sizes: &[usize]) -> (FlightSnapshot, Vec<TelemetryEvent>, u64) {
    let (mut parser, events) = new_parser();
    let mut rest = stream;
    let mut sizes = chunk_sizes.iter().cycle();
    while !rest.is_empty() {
        let n = (*sizes.next().unwrap()).clamp(1, rest.len());
        parser.feed(&rest[..n]);
        rest = &rest[n..];
    }
    let accepted = parser.stats().frames_accepted;
    (parser.handler().state().snapshot(), events.events(), accepted)
}

// ============================================================================
// Chunk Boundaries
// ============================================================================

#[test]
fn test_whole_stream_decodes() {
    let (snapshot, events, accepted) = run_chunked(&sample_stream(), &[usize::MAX]);

    assert_eq!(accepted, 5);
    assert!(snapshot.armed);
    assert_eq!((snapshot.roll, snapshot.pitch, snapshot.heading), (16, -16, 300));
    assert_eq!(snapshot.fc_identifier, FcIdentifier::new(*b"BTFL"));
    assert_eq!(snapshot.channels[0], 1000);
    assert_eq!(snapshot.channels[15], 1150);
    assert_eq!(events.len(), 4);
}

#[test]
fn test_chunk_boundary_invariance() {
    let stream = sample_stream();
    let reference = run_chunked(&stream, &[usize::MAX]);

    let cases: [&[usize]; 7] = [&[1], &[2], &[3], &[7], &[1, 5, 2], &[13, 1], &[64]];
    for sizes in cases {
        assert_eq!(run_chunked(&stream, sizes), reference, "chunk sizes {:?}", sizes);
    }
}

#[test]
fn test_every_single_split_point() {
    let stream = sample_stream();
    let reference = run_chunked(&stream, &[usize::MAX]);

    for split in 1..stream.len() {
        let (mut parser, events) = new_parser();
        parser.feed(&stream[..split]);
        parser.feed(&stream[split..]);
        let result = (
            parser.handler().state().snapshot(),
            events.events(),
            parser.stats().frames_accepted,
        );
        assert_eq!(result, reference, "split at {}", split);
    }
}

// ============================================================================
// Resynchronization / Integrity
// ============================================================================

#[test]
fn test_resync_after_garbage() {
    let frame = encode_frame(Direction::Inbound, CMD_ATTITUDE, &[0x10, 0x00, 0xF0, 0xFF, 0x2C, 0x01]).unwrap();
    let garbage_sets: [&[u8]; 5] = [
        b"",
        b"hello world",
        b"$$$$",
        b"$M$M>",
        &[0x24, 0x4D, 0x3E, 0x04, 0x00, 0x00],
    ];

    for garbage in garbage_sets {
        let (mut parser, _) = new_parser();
        parser.feed(garbage);
        parser.feed(&frame);
        // A partial frame opened by the garbage may swallow the real one; a
        // second copy is always recovered.
        parser.feed(&frame);
        let state = parser.handler().state();
        assert_eq!((state.roll, state.pitch, state.heading), (16, -16, 300), "garbage {:?}", garbage);
    }
}

#[test]
fn test_resync_after_non_preamble_garbage() {
    let frame = encode_frame(Direction::Inbound, CMD_STATUS, &[0, 0, 0, 0, 0, 0, 1]).unwrap();
    for len in 0..64u8 {
        let garbage: Vec<u8> = (0..len).map(|i| i.wrapping_mul(7) | 0x80).collect();
        let (mut parser, _) = new_parser();
        parser.feed(&garbage);
        parser.feed(&frame);
        assert!(parser.handler().state().armed, "garbage length {}", len);
        assert_eq!(parser.stats().frames_accepted, 1);
    }
}

#[test]
fn test_bit_flip_rejected_without_mutation() {
    let frame = encode_frame(Direction::Inbound, CMD_STATUS, &[0, 0, 0, 0, 0, 0, 1]).unwrap();
    let checksum_index = frame.len() - 1;

    // Flip bits in the length, command and payload bytes; the trailing checksum
    // stays. A longer declared length leaves the parser waiting for payload, so
    // only "never handled" holds for every flip.
    for index in 3..checksum_index {
        for bit in 0..8 {
            let mut corrupted = frame.clone();
            corrupted[index] ^= 1 << bit;
            let (mut parser, events) = new_parser();
            parser.feed(&corrupted);

            let state = parser.handler().state();
            assert!(!state.armed, "byte {} bit {}", index, bit);
            assert!(state.frame_buffer().is_empty());
            assert!(events.is_empty());
            assert_eq!(parser.handler().handled(), 0);
        }
    }
}

#[test]
fn test_length_bit_flip_rejected() {
    let frame = encode_frame(Direction::Inbound, CMD_STATUS, &[0, 0, 0, 0, 0, 0, 1]).unwrap();
    // Shrinking the declared length to 6 moves the checksum position onto payload byte 6.
    let mut corrupted = frame.clone();
    corrupted[3] = 6;
    let (mut parser, events) = new_parser();
    parser.feed(&corrupted);

    assert_eq!(parser.handler().handled(), 0);
    assert!(!parser.handler().state().armed);
    assert!(events.is_empty());
    assert_eq!(parser.stats().checksum_failures, 1);
}

// ============================================================================
// Executor Behavior Through The Chain
// ============================================================================

#[test]
fn test_fc_variant_reported_once() {
    let (mut parser, events) = new_parser();
    let frame = encode_frame(Direction::Inbound, CMD_FC_VARIANT, b"INAV").unwrap();
    parser.feed(&frame);
    parser.feed(&frame);

    let changes: Vec<_> = events
        .events()
        .into_iter()
        .filter(|e| matches!(e, TelemetryEvent::IdentifierChanged(_)))
        .collect();
    assert_eq!(changes, vec![TelemetryEvent::IdentifierChanged(FcIdentifier::new(*b"INAV"))]);
}

#[test]
fn test_unregistered_command_leaves_state() {
    let events = RecordingSink::new();
    let handler = TelemetryHandler::new(TelemetryConfig::quiet()).with_event_sink(Box::new(events.clone()));
    let mut parser = MspParser::new(handler);

    // No RC executors registered.
    parser.feed(&encode_frame(Direction::Inbound, CMD_RC, &rc_payload(&[1500; 16])).unwrap());

    assert_eq!(parser.handler().handled(), 1);
    assert_eq!(parser.handler().state().channels, [0; 18]);
    assert!(events.is_empty());
}

#[test]
fn test_rc_console_and_forward_chain() {
    let receiver = UdpSocket::bind("127.0.0.1:0").unwrap();
    receiver.set_read_timeout(Some(Duration::from_secs(2))).unwrap();

    let (mut parser, events) = new_parser();
    parser
        .handler_mut()
        .register_executor(Command::Rc, Box::new(RcForwardExecutor::new(receiver.local_addr().unwrap()).unwrap()));
    assert_eq!(
        parser.handler_mut().dispatcher_mut().executor_names(Command::Rc),
        vec!["rc_console", "rc_forward"]
    );

    let mut channels = [1500u16; 16];
    channels[8] = 100;
    channels[10] = 4;
    channels[11] = 9 << 5;
    parser.feed(&encode_frame(Direction::Inbound, CMD_RC, &rc_payload(&channels)).unwrap());

    let recorded = events.events();
    assert_eq!(recorded.len(), 2);
    assert!(matches!(recorded[0], TelemetryEvent::ChannelSnapshot(_)));
    assert!(matches!(recorded[1], TelemetryEvent::LinkStatsSent { .. }));

    let mut buf = [0u8; 128];
    let n = receiver.recv(&mut buf).unwrap();
    let line = std::str::from_utf8(&buf[..n]).unwrap();
    assert!(line.ends_with(":100:100:9:4:20:20:20:20\n"), "line {:?}", line);
}
