//! User-facing notifications for timer events

use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{info, warn};

use crate::state::{Phase, TimerEvent};

/// Text shown to the user for an event, if it warrants a notification
pub fn notification_text(event: &TimerEvent) -> Option<String> {
    match event {
        TimerEvent::PhaseChanged { phase: Phase::Break, cycle } => {
            Some(format!("Cycle {} work done, take a break", cycle))
        }
        TimerEvent::PhaseChanged { phase: Phase::Work, cycle } => {
            Some(format!("Break over, starting cycle {}", cycle))
        }
        TimerEvent::Completed { .. } => Some("Pomodoro complete 🎉".to_string()),
        TimerEvent::RemoteUpdate { .. } => None,
    }
}

/// Background task that reports phase changes and completion
pub async fn notification_task(mut events: broadcast::Receiver<TimerEvent>) {
    info!("Starting notification task");

    loop {
        match events.recv().await {
            Ok(event) => {
                if let Some(text) = notification_text(&event) {
                    info!("{}", text);
                }
            }
            Err(RecvError::Lagged(skipped)) => {
                warn!("Notification task lagged, skipped {} events", skipped);
            }
            Err(RecvError::Closed) => break,
        }
    }
}
