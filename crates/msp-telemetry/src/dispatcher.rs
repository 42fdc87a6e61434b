//! Command dispatch.
//!
//! The dispatcher maps each [`Command`] to an ordered list of executors. Adding
//! behavior for a command means registering another executor; neither the parser
//! nor the handler changes.

use std::collections::BTreeMap;

use msp_metrics::metric_defs;
use msp_protocol::{Command, Message};
use tracing::debug;

use crate::events::TelemetryEventSink;
use crate::executors::{AttitudeExecutor, FcVariantExecutor, StatusExecutor};
use crate::state::FlightState;

/// Interprets one command's payload.
///
/// Executors must not fail on malformed input; a payload that is too short is
/// simply ignored.
pub trait CommandExecutor {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Apply `msg` to `state`, reporting any observable effect to `events`.
    fn execute(&mut self, msg: &Message, state: &mut FlightState, events: &mut dyn TelemetryEventSink);
}

/// Ordered executor registry keyed by command.
#[derive(Default)]
pub struct CommandDispatcher {
    executors: BTreeMap<Command, Vec<Box<dyn CommandExecutor>>>,
}

impl CommandDispatcher {
    /// Create a dispatcher with no executors.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a dispatcher with the STATUS, ATTITUDE and FC_VARIANT executors registered.
    ///
    /// RC executors depend on process wiring and are registered by the caller.
    pub fn with_default_executors() -> Self {
        let mut dispatcher = Self::new();
        dispatcher.register_executor(Command::Status, Box::new(StatusExecutor));
        dispatcher.register_executor(Command::Attitude, Box::new(AttitudeExecutor));
        dispatcher.register_executor(Command::FcVariant, Box::new(FcVariantExecutor));
        dispatcher
    }

    /// Append an executor to `command`'s list.
    ///
    /// An `Unknown` alias of a known code registers under the named command.
    pub fn register_executor(&mut self, command: Command, executor: Box<dyn CommandExecutor>) {
        let command = command.canonical();
        debug!("Registering {} executor for {}", executor.name(), command);
        self.executors.entry(command).or_default().push(executor);
    }

    /// Number of executors registered for `command`.
    pub fn executor_count(&self, command: Command) -> usize {
        self.executors.get(&command.canonical()).map_or(0, Vec::len)
    }

    /// Names of the executors for `command`, in run order.
    pub fn executor_names(&self, command: Command) -> Vec<&'static str> {
        self.executors
            .get(&command.canonical())
            .map(|list| list.iter().map(|e| e.name()).collect())
            .unwrap_or_default()
    }

    /// Run every executor registered for `msg.command`, in registration order.
    ///
    /// Returns how many executors ran.
    pub fn dispatch(&mut self, msg: &Message, state: &mut FlightState, events: &mut dyn TelemetryEventSink) -> usize {
        match self.executors.get_mut(&msg.command) {
            Some(list) => {
                for executor in list.iter_mut() {
                    executor.execute(msg, state, events);
                }
                list.len()
            }
            None => {
                debug!("Unhandled command: {}", msg.command);
                metrics::counter!(
                    metric_defs::DISPATCH_UNHANDLED.name,
                    "command" => msg.command.code().to_string()
                )
                .increment(1);
                0
            }
        }
    }
}

impl std::fmt::Debug for CommandDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for (command, list) in &self.executors {
            let names: Vec<_> = list.iter().map(|e| e.name()).collect();
            map.entry(command, &names);
        }
        map.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::RecordingSink;
    use msp_protocol::Direction;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Tagger {
        tag: &'static str,
        log: Rc<RefCell<Vec<&'static str>>>,
    }

    impl CommandExecutor for Tagger {
        fn name(&self) -> &'static str {
            self.tag
        }

        fn execute(&mut self, _msg: &Message, _state: &mut FlightState, _events: &mut dyn TelemetryEventSink) {
            self.log.borrow_mut().push(self.tag);
        }
    }

    fn rc_message() -> Message {
        Message::new(Direction::Inbound, Command::Rc, &[0u8; 32]).unwrap()
    }

    #[test]
    fn test_executors_run_in_registration_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut dispatcher = CommandDispatcher::new();
        dispatcher.register_executor(Command::Rc, Box::new(Tagger { tag: "first", log: log.clone() }));
        dispatcher.register_executor(Command::Rc, Box::new(Tagger { tag: "second", log: log.clone() }));

        let mut state = FlightState::default();
        let mut events = RecordingSink::new();
        let msg = rc_message();

        assert_eq!(dispatcher.dispatch(&msg, &mut state, &mut events), 2);
        assert_eq!(dispatcher.dispatch(&msg, &mut state, &mut events), 2);
        assert_eq!(*log.borrow(), vec!["first", "second", "first", "second"]);
        assert_eq!(dispatcher.executor_names(Command::Rc), vec!["first", "second"]);
    }

    #[test]
    fn test_unregistered_command_is_noop() {
        let mut dispatcher = CommandDispatcher::new();
        let mut state = FlightState::default();
        let mut events = RecordingSink::new();
        let msg = Message::new(Direction::Inbound, Command::Status, &[0xFF; 11]).unwrap();

        assert_eq!(dispatcher.dispatch(&msg, &mut state, &mut events), 0);
        assert!(!state.armed);
        assert!(events.is_empty());
    }

    #[test]
    fn test_unknown_alias_registers_under_known_command() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut dispatcher = CommandDispatcher::new();
        dispatcher.register_executor(Command::Unknown(105), Box::new(Tagger { tag: "alias", log: log.clone() }));

        let mut state = FlightState::default();
        let mut events = RecordingSink::new();
        assert_eq!(dispatcher.dispatch(&rc_message(), &mut state, &mut events), 1);
        assert_eq!(*log.borrow(), vec!["alias"]);
        assert_eq!(dispatcher.executor_count(Command::Rc), 1);
        assert_eq!(dispatcher.executor_names(Command::Unknown(105)), vec!["alias"]);
    }

    #[test]
    fn test_default_executors() {
        let dispatcher = CommandDispatcher::with_default_executors();
        assert_eq!(dispatcher.executor_count(Command::Status), 1);
        assert_eq!(dispatcher.executor_count(Command::Attitude), 1);
        assert_eq!(dispatcher.executor_count(Command::FcVariant), 1);
        assert_eq!(dispatcher.executor_count(Command::Rc), 0);
        assert_eq!(dispatcher.executor_count(Command::Unknown(7)), 0);
    }
}
