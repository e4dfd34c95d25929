//! State shared with the HTTP handlers

use std::{sync::Mutex, time::Instant};
use chrono::{DateTime, Utc};
use tracing::info;

use super::{ConfigUpdate, TimerCommand, TimerState};
use crate::{error::TimerError, tasks::TimerHandle};

/// Application state handed to every request handler
#[derive(Debug)]
pub struct AppState {
    /// Command channel into the timer controller
    pub timer: TimerHandle,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Relay the timer syncs with, if any
    pub relay: Option<String>,
    /// Last action tracking
    pub last_action: Mutex<Option<String>>,
    pub last_action_time: Mutex<Option<DateTime<Utc>>>,
}

impl AppState {
    pub fn new(timer: TimerHandle, port: u16, host: String, relay: Option<String>) -> Self {
        Self {
            timer,
            start_time: Instant::now(),
            port,
            host,
            relay,
            last_action: Mutex::new(None),
            last_action_time: Mutex::new(None),
        }
    }

    /// Forward a user action to the controller and record it
    pub async fn dispatch(&self, command: TimerCommand) -> Result<TimerState, TimerError> {
        let action = command.name();
        let state = self.timer.send(command).await?;
        info!("{} -> {}", action, state.display());

        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
        Ok(state)
    }

    pub async fn start(&self) -> Result<TimerState, TimerError> {
        self.dispatch(TimerCommand::Start).await
    }

    pub async fn pause(&self) -> Result<TimerState, TimerError> {
        self.dispatch(TimerCommand::Pause).await
    }

    pub async fn toggle(&self) -> Result<TimerState, TimerError> {
        self.dispatch(TimerCommand::Toggle).await
    }

    pub async fn reset(&self) -> Result<TimerState, TimerError> {
        self.dispatch(TimerCommand::Reset).await
    }

    pub async fn configure(&self, update: ConfigUpdate) -> Result<TimerState, TimerError> {
        self.dispatch(TimerCommand::Configure(update)).await
    }

    /// Latest timer state, without going through the event loop
    pub fn get_timer_state(&self) -> TimerState {
        self.timer.current()
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }
}
