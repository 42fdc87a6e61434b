use msp_protocol::Message;

use crate::dispatcher::CommandExecutor;
use crate::events::{TelemetryEvent, TelemetryEventSink};
use crate::state::FlightState;

/// MSP_ATTITUDE: roll, pitch and heading as little-endian `i16` at offsets 0, 2, 4.
#[derive(Debug, Clone, Copy, Default)]
pub struct AttitudeExecutor;

impl CommandExecutor for AttitudeExecutor {
    fn name(&self) -> &'static str {
        "attitude"
    }

    fn execute(&mut self, msg: &Message, state: &mut FlightState, events: &mut dyn TelemetryEventSink) {
        let (Some(roll), Some(pitch), Some(heading)) =
            (msg.read_i16_le(0), msg.read_i16_le(2), msg.read_i16_le(4))
        else {
            return;
        };
        state.roll = roll;
        state.pitch = pitch;
        state.heading = heading;
        events.emit(TelemetryEvent::AttitudeUpdated { roll, pitch, heading });
    }
}
