//! Configuration and CLI argument handling

use clap::Parser;

use crate::{
    state::{clamp_cycles, clamp_minutes, TimerState},
    sync::SyncMode,
    tasks::ControllerOptions,
};

/// CLI argument parsing structure
#[derive(Parser, Debug)]
#[command(name = "pomodoro-sync")]
#[command(about = "A Pomodoro timer kept in sync across clients through a relay")]
#[command(version)]
pub struct Config {
    /// Port for the control API
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind the control API to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// WebSocket URL of the sync relay; runs offline when omitted
    #[arg(short, long, value_name = "URL")]
    pub relay: Option<String>,

    /// Work phase length in minutes
    #[arg(long = "work", value_name = "MIN", default_value = "25", allow_negative_numbers = true)]
    pub work_minutes: i64,

    /// Break phase length in minutes
    #[arg(long = "break", value_name = "MIN", default_value = "5", allow_negative_numbers = true)]
    pub break_minutes: i64,

    /// Number of work/break cycles
    #[arg(short, long, default_value = "4", allow_negative_numbers = true)]
    pub cycles: i64,

    /// Stamp snapshots with sequence numbers and drop stale ones
    #[arg(long)]
    pub ordered: bool,

    /// Publish a snapshot when the timer is paused or stopped
    #[arg(long)]
    pub propagate_pause: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    /// Initial timer built from the configured durations, clamped like user input
    pub fn initial_timer(&self) -> TimerState {
        TimerState::with_durations(
            clamp_minutes(self.work_minutes),
            clamp_minutes(self.break_minutes),
            clamp_cycles(self.cycles),
        )
    }

    pub fn controller_options(&self) -> ControllerOptions {
        ControllerOptions {
            mode: if self.ordered { SyncMode::Ordered } else { SyncMode::LastWriterWins },
            propagate_pause: self.propagate_pause,
        }
    }
}
