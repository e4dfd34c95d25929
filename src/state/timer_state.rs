//! Pomodoro timer state and its phase machine

use serde::{Deserialize, Serialize};

use crate::{error::TimerError, sync::TimerSnapshot};

/// Default work phase length in seconds (25 minutes)
pub const DEFAULT_WORK_SECONDS: u32 = 25 * 60;
/// Default break phase length in seconds (5 minutes)
pub const DEFAULT_BREAK_SECONDS: u32 = 5 * 60;
/// Default number of cycles before completion
pub const DEFAULT_CYCLES: u32 = 4;

/// Clamp a minutes value entered by the user and convert it to seconds
pub fn clamp_minutes(minutes: i64) -> u32 {
    let minutes = u32::try_from(minutes.max(1)).unwrap_or(u32::MAX);
    minutes.saturating_mul(60)
}

/// Clamp a cycle count entered by the user
pub fn clamp_cycles(cycles: i64) -> u32 {
    u32::try_from(cycles.max(1)).unwrap_or(u32::MAX)
}

/// Sub-interval of a cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Work,
    Break,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Work => "Work",
            Phase::Break => "Break",
        }
    }
}

/// Externally visible state of the machine, derived from [`TimerState`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerStatus {
    Idle,
    RunningWork,
    RunningBreak,
    Completed,
}

impl TimerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimerStatus::Idle => "idle",
            TimerStatus::RunningWork => "running-work",
            TimerStatus::RunningBreak => "running-break",
            TimerStatus::Completed => "completed",
        }
    }
}

/// Result of a single one-second tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The timer was not running
    Ignored,
    /// One second was counted down, phase unchanged
    Counted,
    /// The countdown hit zero and the timer moved into a new phase
    PhaseChanged(Phase),
    /// The last work phase finished and the timer stopped
    Completed,
}

/// Raw configuration input, before clamping
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigUpdate {
    pub work_minutes: Option<i64>,
    pub break_minutes: Option<i64>,
    pub cycles: Option<i64>,
}

/// Full timer state, shared with peers as a snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerState {
    /// Seconds remaining in the current phase
    pub time: u32,
    pub is_running: bool,
    pub is_break: bool,
    /// 1-indexed cycle counter
    pub current_cycle: u32,
    /// Work phase length in seconds
    pub work_time: u32,
    /// Break phase length in seconds
    pub break_time: u32,
    /// Cycles to run before completion
    pub cycles: u32,
}

impl TimerState {
    /// Create an idle timer with the default 25/5 minute, 4 cycle setup
    pub fn new() -> Self {
        Self::with_durations(DEFAULT_WORK_SECONDS, DEFAULT_BREAK_SECONDS, DEFAULT_CYCLES)
    }

    /// Create an idle timer at the start of the first work phase
    pub fn with_durations(work_time: u32, break_time: u32, cycles: u32) -> Self {
        let work_time = work_time.max(1);
        Self {
            time: work_time,
            is_running: false,
            is_break: false,
            current_cycle: 1,
            work_time,
            break_time: break_time.max(1),
            cycles: cycles.max(1),
        }
    }

    pub fn phase(&self) -> Phase {
        if self.is_break {
            Phase::Break
        } else {
            Phase::Work
        }
    }

    pub fn status(&self) -> TimerStatus {
        match (self.is_running, self.phase()) {
            (true, Phase::Work) => TimerStatus::RunningWork,
            (true, Phase::Break) => TimerStatus::RunningBreak,
            (false, Phase::Work) if self.time == 0 && self.current_cycle >= self.cycles => {
                TimerStatus::Completed
            }
            (false, _) => TimerStatus::Idle,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status() == TimerStatus::Completed
    }

    /// Start counting down the current phase. Returns false if already running.
    pub fn start(&mut self) -> bool {
        if self.is_running {
            return false;
        }
        self.is_running = true;
        true
    }

    /// Stop counting down, keeping the remaining time. Returns false if idle.
    pub fn pause(&mut self) -> bool {
        if !self.is_running {
            return false;
        }
        self.is_running = false;
        true
    }

    /// Start/pause button
    pub fn toggle(&mut self) {
        if self.is_running {
            self.pause();
        } else {
            self.start();
        }
    }

    /// Advance the countdown by one second.
    ///
    /// When the remaining time reaches zero the phase completes within the
    /// same tick, so a 2 second phase takes exactly two ticks.
    pub fn tick(&mut self) -> TickOutcome {
        if !self.is_running {
            return TickOutcome::Ignored;
        }
        self.time = self.time.saturating_sub(1);
        if self.time > 0 {
            return TickOutcome::Counted;
        }
        self.complete_phase()
    }

    fn complete_phase(&mut self) -> TickOutcome {
        if self.is_break {
            self.current_cycle = self.current_cycle.saturating_add(1);
            self.is_break = false;
            self.time = self.work_time;
            TickOutcome::PhaseChanged(Phase::Work)
        } else if self.current_cycle < self.cycles {
            self.is_break = true;
            self.time = self.break_time;
            TickOutcome::PhaseChanged(Phase::Break)
        } else {
            self.is_running = false;
            TickOutcome::Completed
        }
    }

    /// Return to an idle first work phase, keeping the configuration
    pub fn reset(&mut self) {
        self.is_running = false;
        self.is_break = false;
        self.current_cycle = 1;
        self.time = self.work_time;
    }

    fn ensure_configurable(&self) -> Result<(), TimerError> {
        if self.is_running {
            Err(TimerError::ConfigLocked)
        } else {
            Ok(())
        }
    }

    /// Set the work phase length. The remaining time is left alone until reset.
    pub fn set_work_minutes(&mut self, minutes: i64) -> Result<(), TimerError> {
        self.ensure_configurable()?;
        self.work_time = clamp_minutes(minutes);
        Ok(())
    }

    /// Set the break phase length. The remaining time is left alone until reset.
    pub fn set_break_minutes(&mut self, minutes: i64) -> Result<(), TimerError> {
        self.ensure_configurable()?;
        self.break_time = clamp_minutes(minutes);
        Ok(())
    }

    pub fn set_cycles(&mut self, cycles: i64) -> Result<(), TimerError> {
        self.ensure_configurable()?;
        self.cycles = clamp_cycles(cycles);
        Ok(())
    }

    /// Apply every field present in `update`, or none of them while running
    pub fn apply(&mut self, update: &ConfigUpdate) -> Result<(), TimerError> {
        self.ensure_configurable()?;
        if let Some(minutes) = update.work_minutes {
            self.set_work_minutes(minutes)?;
        }
        if let Some(minutes) = update.break_minutes {
            self.set_break_minutes(minutes)?;
        }
        if let Some(cycles) = update.cycles {
            self.set_cycles(cycles)?;
        }
        Ok(())
    }

    /// Overwrite the whole state with a snapshot received from a peer
    pub fn apply_snapshot(&mut self, snapshot: TimerSnapshot) {
        *self = snapshot.into_state(self.cycles);
    }

    /// Render the heading and clock, e.g. `Work - Cycle 1 of 4 - 25:00`
    pub fn display(&self) -> String {
        format!(
            "{} - Cycle {} of {} - {}:{:02}",
            self.phase().as_str(),
            self.current_cycle,
            self.cycles,
            self.time / 60,
            self.time % 60
        )
    }
}

impl Default for TimerState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_ticks(state: &mut TimerState, ticks: usize) -> Vec<TickOutcome> {
        (0..ticks).map(|_| state.tick()).collect()
    }

    #[test]
    fn defaults_match_a_classic_pomodoro() {
        let state = TimerState::new();
        assert_eq!(state.work_time, 1500);
        assert_eq!(state.break_time, 300);
        assert_eq!(state.cycles, 4);
        assert_eq!(state.time, 1500);
        assert_eq!(state.current_cycle, 1);
        assert!(!state.is_running);
        assert!(!state.is_break);
        assert_eq!(state.status(), TimerStatus::Idle);
    }

    #[test]
    fn short_session_runs_through_every_phase() {
        let mut state = TimerState::with_durations(2, 1, 2);
        assert!(state.start());

        run_ticks(&mut state, 2);
        assert!(state.is_break);
        assert_eq!(state.time, 1);
        assert_eq!(state.status(), TimerStatus::RunningBreak);

        assert_eq!(state.tick(), TickOutcome::PhaseChanged(Phase::Work));
        assert!(!state.is_break);
        assert_eq!(state.current_cycle, 2);
        assert_eq!(state.time, 2);

        assert_eq!(run_ticks(&mut state, 2), vec![TickOutcome::Counted, TickOutcome::Completed]);
        assert!(!state.is_running);
        assert!(!state.is_break);
        assert_eq!(state.current_cycle, 2);
        assert_eq!(state.status(), TimerStatus::Completed);
    }

    #[test]
    fn work_phase_moves_to_break_while_cycles_remain() {
        for (work, brk, cycles) in [(60, 60, 2), (1500, 300, 4), (3, 7, 10)] {
            let mut state = TimerState::with_durations(work, brk, cycles);
            state.start();
            let outcomes = run_ticks(&mut state, work as usize);
            assert_eq!(outcomes.last(), Some(&TickOutcome::PhaseChanged(Phase::Break)));
            assert!(state.is_break);
            assert!(state.is_running);
            assert_eq!(state.time, brk);
        }
    }

    #[test]
    fn finishing_a_break_advances_exactly_one_cycle() {
        for (work, brk, cycles) in [(60, 60, 2), (5, 2, 3), (10, 1, 8)] {
            let mut state = TimerState::with_durations(work, brk, cycles);
            state.start();
            run_ticks(&mut state, work as usize);
            let before = state.current_cycle;
            run_ticks(&mut state, brk as usize);
            assert_eq!(state.current_cycle, before + 1);
            assert!(!state.is_break);
            assert_eq!(state.time, work);
        }
    }

    #[test]
    fn last_work_phase_completes_without_a_break() {
        let mut state = TimerState::with_durations(3, 2, 1);
        state.start();
        let outcomes = run_ticks(&mut state, 3);
        assert_eq!(outcomes.last(), Some(&TickOutcome::Completed));
        assert!(!state.is_running);
        assert!(!state.is_break);
        assert_eq!(state.current_cycle, 1);
        assert_eq!(state.time, 0);
        assert!(state.is_completed());

        // A stopped timer ignores further ticks
        assert_eq!(state.tick(), TickOutcome::Ignored);
        assert_eq!(state.time, 0);
    }

    #[test]
    fn reset_returns_to_first_work_phase_from_anywhere() {
        let mut state = TimerState::with_durations(4, 2, 3);
        state.start();
        run_ticks(&mut state, 5);
        assert!(state.is_break);

        state.reset();
        assert_eq!(
            state,
            TimerState {
                time: 4,
                is_running: false,
                is_break: false,
                current_cycle: 1,
                work_time: 4,
                break_time: 2,
                cycles: 3,
            }
        );

        let mut completed = TimerState::with_durations(1, 1, 1);
        completed.start();
        completed.tick();
        assert!(completed.is_completed());
        completed.reset();
        assert_eq!(completed.status(), TimerStatus::Idle);
        assert_eq!(completed.time, 1);
    }

    #[test]
    fn pause_keeps_remaining_time_and_start_is_idempotent() {
        let mut state = TimerState::with_durations(10, 5, 2);
        assert!(state.start());
        assert!(!state.start());
        run_ticks(&mut state, 3);
        assert!(state.pause());
        assert!(!state.pause());
        assert_eq!(state.time, 7);
        assert_eq!(state.tick(), TickOutcome::Ignored);
        assert_eq!(state.time, 7);

        state.toggle();
        assert!(state.is_running);
        state.toggle();
        assert!(!state.is_running);
    }

    #[test]
    fn zero_and_negative_inputs_clamp_to_one() {
        assert_eq!(clamp_minutes(0), 60);
        assert_eq!(clamp_minutes(-15), 60);
        assert_eq!(clamp_minutes(30), 1800);
        assert_eq!(clamp_cycles(0), 1);
        assert_eq!(clamp_cycles(-3), 1);
        assert_eq!(clamp_cycles(6), 6);
        assert_eq!(clamp_minutes(i64::MAX), u32::MAX);

        let mut state = TimerState::new();
        state.set_work_minutes(0).unwrap();
        state.set_break_minutes(-2).unwrap();
        state.set_cycles(0).unwrap();
        assert_eq!((state.work_time, state.break_time, state.cycles), (60, 60, 1));
    }

    #[test]
    fn configuration_is_locked_while_running() {
        let mut state = TimerState::new();
        state.start();
        assert_eq!(state.set_work_minutes(10), Err(TimerError::ConfigLocked));
        assert_eq!(state.set_break_minutes(10), Err(TimerError::ConfigLocked));
        assert_eq!(state.set_cycles(10), Err(TimerError::ConfigLocked));

        let update = ConfigUpdate {
            work_minutes: Some(50),
            break_minutes: None,
            cycles: Some(2),
        };
        assert_eq!(state.apply(&update), Err(TimerError::ConfigLocked));
        assert_eq!(state.work_time, DEFAULT_WORK_SECONDS);
        assert_eq!(state.cycles, DEFAULT_CYCLES);
    }

    #[test]
    fn new_work_length_waits_for_reset() {
        let mut state = TimerState::new();
        state.apply(&ConfigUpdate {
            work_minutes: Some(50),
            break_minutes: Some(10),
            cycles: None,
        })
        .unwrap();
        assert_eq!(state.work_time, 3000);
        assert_eq!(state.break_time, 600);
        assert_eq!(state.time, DEFAULT_WORK_SECONDS);

        state.reset();
        assert_eq!(state.time, 3000);
    }

    #[test]
    fn status_labels_follow_the_machine() {
        let mut state = TimerState::with_durations(1, 1, 2);
        assert_eq!(state.status().as_str(), "idle");
        state.start();
        assert_eq!(state.status().as_str(), "running-work");
        state.tick();
        assert_eq!(state.status().as_str(), "running-break");
        assert_eq!(state.phase().as_str(), "Break");
        state.tick();
        state.tick();
        assert_eq!(state.status().as_str(), "completed");
    }

    #[test]
    fn display_renders_heading_and_clock() {
        let mut state = TimerState::new();
        assert_eq!(state.display(), "Work - Cycle 1 of 4 - 25:00");
        state.time = 65;
        state.is_break = true;
        assert_eq!(state.display(), "Break - Cycle 1 of 4 - 1:05");
    }

    #[test]
    fn serializes_with_camel_case_field_names() {
        let value = serde_json::to_value(TimerState::with_durations(120, 60, 3)).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "time": 120,
                "isRunning": false,
                "isBreak": false,
                "currentCycle": 1,
                "workTime": 120,
                "breakTime": 60,
                "cycles": 3,
            })
        );
    }
}
