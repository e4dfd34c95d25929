//! Commands accepted by the timer controller and events it emits

use tokio::sync::oneshot;

use super::{ConfigUpdate, Phase, TimerState};
use crate::error::TimerError;

/// User action sent to the controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerCommand {
    Start,
    Pause,
    /// Start/pause button
    Toggle,
    Reset,
    Configure(ConfigUpdate),
    /// Stop the controller and disconnect from the relay
    Shutdown,
}

impl TimerCommand {
    pub fn name(&self) -> &'static str {
        match self {
            TimerCommand::Start => "start",
            TimerCommand::Pause => "pause",
            TimerCommand::Toggle => "toggle",
            TimerCommand::Reset => "reset",
            TimerCommand::Configure(_) => "configure",
            TimerCommand::Shutdown => "shutdown",
        }
    }
}

/// A command plus the channel its result goes back on
#[derive(Debug)]
pub struct TimerRequest {
    pub command: TimerCommand,
    pub reply: oneshot::Sender<Result<TimerState, TimerError>>,
}

/// Notifications broadcast by the controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerEvent {
    /// The countdown hit zero and a new phase began
    PhaseChanged { phase: Phase, cycle: u32 },
    /// Every cycle is done and the timer stopped
    Completed { cycles: u32 },
    /// A peer's snapshot replaced the local state
    RemoteUpdate { seq: Option<u64> },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_command_has_an_action_label() {
        let commands = [
            TimerCommand::Start,
            TimerCommand::Pause,
            TimerCommand::Toggle,
            TimerCommand::Reset,
            TimerCommand::Configure(ConfigUpdate::default()),
            TimerCommand::Shutdown,
        ];
        let names: Vec<_> = commands.iter().map(TimerCommand::name).collect();
        assert_eq!(names, ["start", "pause", "toggle", "reset", "configure", "shutdown"]);
    }
}
