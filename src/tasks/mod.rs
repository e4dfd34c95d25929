//! Background tasks module
//!
//! This module contains the timer controller and the notification task that
//! run alongside the HTTP server.

pub mod notifier;
pub mod timer_loop;

// Re-export main functions
pub use notifier::notification_task;
pub use timer_loop::{ControllerOptions, TimerController, TimerHandle};
