use msp_protocol::Message;

use crate::dispatcher::CommandExecutor;
use crate::events::{TelemetryEvent, TelemetryEventSink};
use crate::state::FlightState;

/// Offset of the flag byte whose bit 0 reports the armed state.
const ARMED_FLAGS_OFFSET: usize = 6;

/// MSP_STATUS: updates `armed`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatusExecutor;

impl CommandExecutor for StatusExecutor {
    fn name(&self) -> &'static str {
        "status"
    }

    fn execute(&mut self, msg: &Message, state: &mut FlightState, events: &mut dyn TelemetryEventSink) {
        if msg.len() <= ARMED_FLAGS_OFFSET {
            return;
        }
        state.armed = msg.payload()[ARMED_FLAGS_OFFSET] & 0x01 != 0;
        events.emit(TelemetryEvent::ArmedUpdated { armed: state.armed });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::RecordingSink;
    use msp_protocol::{Command, Direction};

    fn run(payload: &[u8], state: &mut FlightState) -> RecordingSink {
        let msg = Message::new(Direction::Inbound, Command::Status, payload).unwrap();
        let mut events = RecordingSink::new();
        StatusExecutor.execute(&msg, state, &mut events);
        events
    }

    #[test]
    fn test_armed_bit() {
        let mut state = FlightState::default();
        run(&[0, 0, 0, 0, 0, 0, 0x01], &mut state);
        assert!(state.armed);

        let events = run(&[0, 0, 0, 0, 0, 0, 0x00], &mut state);
        assert!(!state.armed);
        assert_eq!(events.events(), vec![TelemetryEvent::ArmedUpdated { armed: false }]);
    }

    #[test]
    fn test_only_bit_zero_counts() {
        let mut state = FlightState::default();
        run(&[0, 0, 0, 0, 0, 0, 0xFE, 0xFF], &mut state);
        assert!(!state.armed);
    }

    #[test]
    fn test_short_payload_ignored() {
        let mut state = FlightState::default();
        state.armed = true;
        let events = run(&[0xFF; 6], &mut state);
        assert!(state.armed);
        assert!(events.is_empty());
    }
}
