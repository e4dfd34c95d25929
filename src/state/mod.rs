//! State management module
//!
//! This module contains the timer state machine, the messages exchanged with
//! its controller, and the state shared with the HTTP handlers.

pub mod app_state;
pub mod events;
pub mod timer_state;

// Re-export main types
pub use app_state::AppState;
pub use events::{TimerCommand, TimerEvent, TimerRequest};
pub use timer_state::{
    clamp_cycles, clamp_minutes, ConfigUpdate, Phase, TickOutcome, TimerState, TimerStatus,
};
