//! Pomodoro Sync - A Pomodoro timer kept in sync across clients
//!
//! This library provides the work/break timer state machine, the controller
//! that ticks it once per second, and the client side of the relay protocol
//! that shares its state with other viewers.

pub mod api;
pub mod config;
pub mod error;
pub mod state;
pub mod sync;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use api::create_router;
pub use config::Config;
pub use error::{SyncError, TimerError};
pub use state::{AppState, TimerState};
pub use sync::SyncLink;
pub use tasks::{TimerController, TimerHandle};
pub use utils::signals::shutdown_signal;
