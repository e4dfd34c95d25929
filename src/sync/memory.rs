//! In-process relay, used to wire several timers together without a network

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};
use tokio::sync::mpsc;
use tracing::debug;

use super::{SyncLink, SyncMessage, Topic};

type Clients = Arc<Mutex<Vec<(usize, mpsc::UnboundedSender<SyncMessage>)>>>;

/// Rebroadcasts every `sync-timer` message as `update-timer` to all other clients
#[derive(Debug, Clone, Default)]
pub struct MemoryRelay {
    clients: Clients,
    next_id: Arc<AtomicUsize>,
}

impl MemoryRelay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a new client. Must be called inside a tokio runtime.
    pub fn connect(&self) -> SyncLink {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (out_tx, mut out_rx) = mpsc::unbounded_channel::<SyncMessage>();
        let (in_tx, in_rx) = mpsc::unbounded_channel::<SyncMessage>();

        if let Ok(mut clients) = self.clients.lock() {
            clients.push((id, in_tx));
        }

        let clients = Arc::clone(&self.clients);
        let io_task = tokio::spawn(async move {
            while let Some(message) = out_rx.recv().await {
                if message.event != Topic::SyncTimer {
                    debug!("Relay ignoring {} from client {}", message.event.as_str(), id);
                    continue;
                }
                let update = SyncMessage {
                    event: Topic::UpdateTimer,
                    ..message
                };
                fan_out(&clients, Some(id), &update);
            }
            if let Ok(mut clients) = clients.lock() {
                clients.retain(|(client_id, _)| *client_id != id);
            }
            debug!("Relay client {} detached", id);
        });

        SyncLink::new(format!("memory#{}", id), out_tx, in_rx, Some(io_task))
    }

    /// Deliver a message to every attached client, as if another peer sent it
    pub fn inject(&self, message: SyncMessage) {
        fan_out(&self.clients, None, &message);
    }

    pub fn client_count(&self) -> usize {
        self.clients.lock().map(|clients| clients.len()).unwrap_or(0)
    }
}

fn fan_out(clients: &Clients, skip: Option<usize>, message: &SyncMessage) {
    if let Ok(clients) = clients.lock() {
        for (client_id, tx) in clients.iter() {
            if Some(*client_id) != skip {
                let _ = tx.send(message.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::TimerState;

    #[tokio::test]
    async fn relays_to_other_clients_only() {
        let relay = MemoryRelay::new();
        let sender = relay.connect();
        let mut receiver = relay.connect();
        assert_eq!(relay.client_count(), 2);

        let mut state = TimerState::with_durations(90, 30, 2);
        state.start();
        sender.publish(SyncMessage::sync_timer(&state, Some(7))).unwrap();

        let received = receiver.next_message().await;
        assert_eq!(received.event, Topic::UpdateTimer);
        assert_eq!(received.seq, Some(7));
        assert_eq!(received.data.into_state(0), state);
    }

    #[tokio::test]
    async fn disconnect_detaches_client() {
        let relay = MemoryRelay::new();
        let link = relay.connect();
        assert_eq!(relay.client_count(), 1);

        link.disconnect().await;
        assert_eq!(relay.client_count(), 0);
    }
}
