//! The message handler glue between the parser and the dispatcher.

use msp_protocol::{Command, Message, MessageHandler};
use tracing::debug;

use crate::config::TelemetryConfig;
use crate::dispatcher::{CommandDispatcher, CommandExecutor};
use crate::events::{LogEventSink, TelemetryEventSink};
use crate::state::{FlightState, FrameSink};

/// Stages every validated message into the frame buffer and dispatches it.
///
/// Owns the flight state, the dispatcher and the event sink for the lifetime of
/// the decoder.
pub struct TelemetryHandler {
    state: FlightState,
    dispatcher: CommandDispatcher,
    events: Box<dyn TelemetryEventSink>,
    handled: u64,
}

impl TelemetryHandler {
    /// Create a handler with the default executors, logging effects to `tracing`.
    pub fn new(config: TelemetryConfig) -> Self {
        TelemetryHandler {
            state: FlightState::new(&config),
            dispatcher: CommandDispatcher::with_default_executors(),
            events: Box::new(LogEventSink::new(config.verbose)),
            handled: 0,
        }
    }

    /// Replace the dispatcher.
    pub fn with_dispatcher(mut self, dispatcher: CommandDispatcher) -> Self {
        self.dispatcher = dispatcher;
        self
    }

    /// Replace the event sink.
    pub fn with_event_sink(mut self, events: Box<dyn TelemetryEventSink>) -> Self {
        self.events = events;
        self
    }

    /// Replace the flight state with a fresh one flushing into `sink`.
    pub fn with_frame_sink(mut self, sink: Box<dyn FrameSink>) -> Self {
        self.state = FlightState::with_frame_sink(sink);
        self
    }

    /// Register an additional executor for `command`.
    pub fn register_executor(&mut self, command: Command, executor: Box<dyn CommandExecutor>) {
        self.dispatcher.register_executor(command, executor);
    }

    /// The dispatcher, for inspection or registration.
    pub fn dispatcher_mut(&mut self) -> &mut CommandDispatcher {
        &mut self.dispatcher
    }

    /// Current flight state.
    pub fn state(&self) -> &FlightState {
        &self.state
    }

    /// Messages handled so far.
    pub fn handled(&self) -> u64 {
        self.handled
    }
}

impl MessageHandler for TelemetryHandler {
    fn on_message(&mut self, msg: &Message) {
        debug!(
            "Received MSP msg: cmd={}, size={}, dir={:?}",
            msg.command.code(),
            msg.size,
            msg.direction
        );
        self.handled += 1;
        self.state.stage_frame(msg);
        self.dispatcher.dispatch(msg, &mut self.state, self.events.as_mut());
    }
}

impl std::fmt::Debug for TelemetryHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelemetryHandler")
            .field("state", &self.state)
            .field("dispatcher", &self.dispatcher)
            .field("handled", &self.handled)
            .finish()
    }
}
