//! Owned connection between the timer controller and a relay

use std::time::Duration;
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, info, warn};

use super::SyncMessage;
use crate::error::SyncError;

/// How long `disconnect` waits for the transport to say goodbye
const DISCONNECT_GRACE: Duration = Duration::from_secs(2);

/// A subscription to the relay.
///
/// Outbound messages are queued without waiting. Inbound messages are
/// pulled with [`SyncLink::next_message`]. Dropping the link aborts its
/// transport task; [`SyncLink::disconnect`] closes it gracefully.
#[derive(Debug)]
pub struct SyncLink {
    label: String,
    outbound: Option<mpsc::UnboundedSender<SyncMessage>>,
    inbound: mpsc::UnboundedReceiver<SyncMessage>,
    inbound_open: bool,
    io_task: Option<JoinHandle<()>>,
}

impl SyncLink {
    pub(crate) fn new(
        label: impl Into<String>,
        outbound: mpsc::UnboundedSender<SyncMessage>,
        inbound: mpsc::UnboundedReceiver<SyncMessage>,
        io_task: Option<JoinHandle<()>>,
    ) -> Self {
        Self {
            label: label.into(),
            outbound: Some(outbound),
            inbound,
            inbound_open: true,
            io_task,
        }
    }

    /// A link that publishes nowhere and never receives anything
    pub fn offline() -> Self {
        let (_, inbound) = mpsc::unbounded_channel();
        Self {
            label: "offline".to_string(),
            outbound: None,
            inbound,
            inbound_open: false,
            io_task: None,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_offline(&self) -> bool {
        self.outbound.is_none()
    }

    /// Queue a message for the relay. Delivery is fire-and-forget.
    pub fn publish(&self, message: SyncMessage) -> Result<(), SyncError> {
        match &self.outbound {
            Some(tx) => tx.send(message).map_err(|_| SyncError::Closed),
            None => Ok(()),
        }
    }

    /// Wait for the next message from the relay.
    ///
    /// Once the relay side has gone away this never resolves, so it can sit
    /// in a `select!` without spinning.
    pub async fn next_message(&mut self) -> SyncMessage {
        if self.inbound_open {
            if let Some(message) = self.inbound.recv().await {
                return message;
            }
            self.inbound_open = false;
            info!("Sync link {} closed, synchronization stopped", self.label);
        }
        std::future::pending().await
    }

    /// Close the outbound side and wait briefly for the transport to finish
    pub async fn disconnect(mut self) {
        debug!("Disconnecting sync link {}", self.label);
        self.outbound.take();
        if let Some(mut task) = self.io_task.take() {
            if tokio::time::timeout(DISCONNECT_GRACE, &mut task).await.is_err() {
                warn!("Sync link {} did not close in time, aborting", self.label);
                task.abort();
            }
        }
        info!("Sync link {} disconnected", self.label);
    }
}

impl Drop for SyncLink {
    fn drop(&mut self) {
        if let Some(task) = self.io_task.take() {
            task.abort();
        }
    }
}
