//! Timer controller: the single event loop that owns the timer

use std::time::Duration;
use tokio::{
    sync::{broadcast, mpsc, oneshot, watch},
    time::{interval_at, Instant, Interval},
};
use tracing::{debug, info, warn};

use crate::{
    error::TimerError,
    state::{
        ConfigUpdate, TickOutcome, TimerCommand, TimerEvent, TimerRequest, TimerState,
    },
    sync::{SnapshotClock, SyncLink, SyncMessage, SyncMode, Topic},
};

const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Sync behaviour of a controller
#[derive(Debug, Clone, Copy, Default)]
pub struct ControllerOptions {
    pub mode: SyncMode,
    /// Also publish when the timer stops running, so peers see pauses
    pub propagate_pause: bool,
}

/// Cloneable handle for sending commands to a running controller
#[derive(Debug, Clone)]
pub struct TimerHandle {
    requests: mpsc::Sender<TimerRequest>,
    state_rx: watch::Receiver<TimerState>,
    event_tx: broadcast::Sender<TimerEvent>,
}

impl TimerHandle {
    /// Send a command and wait for the resulting state
    pub async fn send(&self, command: TimerCommand) -> Result<TimerState, TimerError> {
        let (reply, response) = oneshot::channel();
        self.requests
            .send(TimerRequest { command, reply })
            .await
            .map_err(|_| TimerError::ControllerUnavailable)?;
        response.await.map_err(|_| TimerError::ControllerUnavailable)?
    }

    pub async fn start(&self) -> Result<TimerState, TimerError> {
        self.send(TimerCommand::Start).await
    }

    pub async fn pause(&self) -> Result<TimerState, TimerError> {
        self.send(TimerCommand::Pause).await
    }

    pub async fn toggle(&self) -> Result<TimerState, TimerError> {
        self.send(TimerCommand::Toggle).await
    }

    pub async fn reset(&self) -> Result<TimerState, TimerError> {
        self.send(TimerCommand::Reset).await
    }

    pub async fn configure(&self, update: ConfigUpdate) -> Result<TimerState, TimerError> {
        self.send(TimerCommand::Configure(update)).await
    }

    pub async fn shutdown(&self) -> Result<TimerState, TimerError> {
        self.send(TimerCommand::Shutdown).await
    }

    /// Latest state published by the controller
    pub fn current(&self) -> TimerState {
        self.state_rx.borrow().clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TimerEvent> {
        self.event_tx.subscribe()
    }
}

enum LoopEvent {
    Tick,
    Request(Option<TimerRequest>),
    Remote(SyncMessage),
}

/// Owns the timer state, its tick handle and the sync link.
///
/// Ticks, user commands and relay messages are all handled on this one
/// task, so the state needs no locking.
pub struct TimerController {
    timer: TimerState,
    ticker: Option<Interval>,
    link: SyncLink,
    clock: SnapshotClock,
    options: ControllerOptions,
    requests: mpsc::Receiver<TimerRequest>,
    state_tx: watch::Sender<TimerState>,
    event_tx: broadcast::Sender<TimerEvent>,
}

impl TimerController {
    pub fn new(
        initial: TimerState,
        link: SyncLink,
        options: ControllerOptions,
    ) -> (Self, TimerHandle) {
        let (request_tx, requests) = mpsc::channel(32);
        let (state_tx, state_rx) = watch::channel(initial.clone());
        let (event_tx, _) = broadcast::channel(64);

        let handle = TimerHandle {
            requests: request_tx,
            state_rx,
            event_tx: event_tx.clone(),
        };
        let controller = Self {
            timer: initial,
            ticker: None,
            link,
            clock: SnapshotClock::new(options.mode),
            options,
            requests,
            state_tx,
            event_tx,
        };
        (controller, handle)
    }

    /// Run until shutdown or until every handle is dropped, then disconnect
    pub async fn run(mut self) {
        info!(
            "Starting timer controller ({}, sync via {})",
            self.timer.display(),
            self.link.label()
        );
        self.sync_ticker();

        loop {
            let event = tokio::select! {
                _ = next_tick(&mut self.ticker) => LoopEvent::Tick,
                request = self.requests.recv() => LoopEvent::Request(request),
                message = self.link.next_message() => LoopEvent::Remote(message),
            };

            match event {
                LoopEvent::Tick => self.on_tick(),
                LoopEvent::Request(Some(request)) => {
                    if request.command == TimerCommand::Shutdown {
                        let _ = request.reply.send(Ok(self.timer.clone()));
                        info!("Timer controller shutting down");
                        break;
                    }
                    let result = self.on_command(request.command);
                    let _ = request.reply.send(result);
                }
                LoopEvent::Request(None) => {
                    debug!("All timer handles dropped");
                    break;
                }
                LoopEvent::Remote(message) => self.on_remote(message),
            }
        }

        self.ticker = None;
        self.link.disconnect().await;
    }

    fn on_tick(&mut self) {
        let before = self.timer.clone();
        match self.timer.tick() {
            TickOutcome::Ignored => {}
            TickOutcome::Counted => debug!("{}", self.timer.display()),
            TickOutcome::PhaseChanged(phase) => {
                debug!("Phase finished, now {}", self.timer.display());
                self.emit(TimerEvent::PhaseChanged {
                    phase,
                    cycle: self.timer.current_cycle,
                });
            }
            TickOutcome::Completed => {
                debug!("Last work phase finished after {} cycles", self.timer.cycles);
                self.emit(TimerEvent::Completed {
                    cycles: self.timer.cycles,
                });
            }
        }
        self.commit(&before, true);
    }

    fn on_command(&mut self, command: TimerCommand) -> Result<TimerState, TimerError> {
        let before = self.timer.clone();
        debug!("Handling {} command", command.name());
        match command {
            TimerCommand::Start => {
                self.timer.start();
            }
            TimerCommand::Pause => {
                self.timer.pause();
            }
            TimerCommand::Toggle => self.timer.toggle(),
            TimerCommand::Reset => self.timer.reset(),
            TimerCommand::Configure(update) => self.timer.apply(&update)?,
            TimerCommand::Shutdown => {}
        }
        self.commit(&before, true);
        Ok(self.timer.clone())
    }

    /// Overwrite local state with a peer's snapshot. The applied snapshot is
    /// not published again, even while running; peers already have it.
    fn on_remote(&mut self, message: SyncMessage) {
        if message.event != Topic::UpdateTimer {
            debug!("Ignoring {} message from relay", message.event.as_str());
            return;
        }
        if !self.clock.accept(message.seq) {
            warn!(
                "Dropping stale snapshot (seq {:?}, last seen {})",
                message.seq,
                self.clock.last_seq()
            );
            return;
        }

        let before = self.timer.clone();
        self.timer.apply_snapshot(message.data);
        debug!("Applied remote snapshot: {}", self.timer.display());
        self.commit(&before, false);
        self.emit(TimerEvent::RemoteUpdate { seq: message.seq });
    }

    /// Publish the new state and bring the tick handle in line with it
    fn commit(&mut self, before: &TimerState, local: bool) {
        if self.timer == *before {
            return;
        }
        self.sync_ticker();
        if local {
            self.publish(before);
        }
        self.state_tx.send_replace(self.timer.clone());
    }

    fn sync_ticker(&mut self) {
        match (self.timer.is_running, self.ticker.is_some()) {
            (true, false) => {
                debug!("Starting tick handle");
                self.ticker = Some(interval_at(Instant::now() + TICK_PERIOD, TICK_PERIOD));
            }
            (false, true) => {
                debug!("Cancelling tick handle");
                self.ticker = None;
            }
            _ => {}
        }
    }

    fn publish(&mut self, before: &TimerState) {
        let stopped = before.is_running && !self.timer.is_running;
        if !self.timer.is_running && !(self.options.propagate_pause && stopped) {
            return;
        }
        let message = SyncMessage::sync_timer(&self.timer, self.clock.stamp());
        if let Err(e) = self.link.publish(message) {
            debug!("Snapshot not sent: {}", e);
        }
    }

    fn emit(&self, event: TimerEvent) {
        // No subscribers is fine
        let _ = self.event_tx.send(event);
    }
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}
