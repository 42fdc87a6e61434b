use msp_protocol::Message;

use crate::dispatcher::CommandExecutor;
use crate::events::{TelemetryEvent, TelemetryEventSink};
use crate::state::{FcIdentifier, FlightState};

/// MSP_FC_VARIANT: stores the 4-byte identifier and reports it when it changes.
#[derive(Debug, Clone, Copy, Default)]
pub struct FcVariantExecutor;

impl CommandExecutor for FcVariantExecutor {
    fn name(&self) -> &'static str {
        "fc_variant"
    }

    fn execute(&mut self, msg: &Message, state: &mut FlightState, events: &mut dyn TelemetryEventSink) {
        let Some(bytes) = msg.payload().get(..4) else {
            return;
        };
        if state.fc_identifier.as_bytes() == bytes {
            return;
        }
        state.fc_identifier = FcIdentifier::new([bytes[0], bytes[1], bytes[2], bytes[3]]);
        events.emit(TelemetryEvent::IdentifierChanged(state.fc_identifier));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::RecordingSink;
    use msp_protocol::{Command, Direction};

    fn variant(payload: &[u8]) -> Message {
        Message::new(Direction::Inbound, Command::FcVariant, payload).unwrap()
    }

    #[test]
    fn test_identifier_change_reported_once() {
        let mut state = FlightState::default();
        let mut events = RecordingSink::new();
        let mut executor = FcVariantExecutor;

        executor.execute(&variant(b"BTFL"), &mut state, &mut events);
        executor.execute(&variant(b"BTFL"), &mut state, &mut events);

        assert_eq!(state.fc_identifier.to_string(), "BTFL");
        assert_eq!(
            events.events(),
            vec![TelemetryEvent::IdentifierChanged(FcIdentifier::new(*b"BTFL"))]
        );

        executor.execute(&variant(b"INAV"), &mut state, &mut events);
        assert_eq!(state.fc_identifier.to_string(), "INAV");
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn test_extra_bytes_ignored() {
        let mut state = FlightState::default();
        let mut events = RecordingSink::new();
        FcVariantExecutor.execute(&variant(b"ARDUxyz"), &mut state, &mut events);
        assert_eq!(state.fc_identifier.as_bytes(), b"ARDU");
    }

    #[test]
    fn test_short_payload_ignored() {
        let mut state = FlightState::default();
        let mut events = RecordingSink::new();
        FcVariantExecutor.execute(&variant(b"BTF"), &mut state, &mut events);
        assert!(!state.fc_identifier.is_set());
        assert!(events.is_empty());
    }
}
