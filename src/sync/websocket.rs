//! WebSocket transport to a relay server

use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, error, info, warn};

use super::{SyncLink, SyncMessage};
use crate::error::SyncError;

/// Connect to the relay at `url` and start the transport task
pub async fn connect(url: &str) -> Result<SyncLink, SyncError> {
    let (ws_stream, _) = connect_async(url).await.map_err(|source| SyncError::Connect {
        url: url.to_string(),
        source,
    })?;
    let (mut ws_tx, mut ws_rx) = ws_stream.split();

    info!(url, "Connected to sync relay");

    let (out_tx, mut out_rx) = mpsc::unbounded_channel::<SyncMessage>();
    let (in_tx, in_rx) = mpsc::unbounded_channel::<SyncMessage>();
    let relay_url = url.to_string();

    let io_task = tokio::spawn(async move {
        loop {
            tokio::select! {
                // Forward local snapshots to the relay
                outbound = out_rx.recv() => {
                    let Some(message) = outbound else {
                        debug!("Outbound queue closed, sending close frame");
                        let _ = ws_tx.send(Message::Close(None)).await;
                        break;
                    };
                    let text = match message.encode() {
                        Ok(text) => text,
                        Err(e) => {
                            warn!("Dropping outbound snapshot: {}", e);
                            continue;
                        }
                    };
                    if let Err(e) = ws_tx.send(Message::Text(text)).await {
                        error!(error = %e, "Failed to send to sync relay");
                        break;
                    }
                }

                // Receive snapshots from the relay
                frame = ws_rx.next() => {
                    match frame {
                        Some(Ok(Message::Text(text))) => match SyncMessage::decode(&text) {
                            Ok(message) => {
                                if in_tx.send(message).is_err() {
                                    break;
                                }
                            }
                            Err(e) => warn!("Ignoring malformed relay frame: {}", e),
                        },
                        Some(Ok(Message::Close(_))) | None => {
                            info!(url = %relay_url, "Sync relay closed the connection");
                            break;
                        }
                        Some(Err(e)) => {
                            error!(error = %e, "Sync WebSocket error");
                            break;
                        }
                        _ => {}
                    }
                }
            }
        }
    });

    Ok(SyncLink::new(url, out_tx, in_rx, Some(io_task)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{future::Future, time::Duration};
    use tokio::{
        net::{TcpListener, TcpStream},
        sync::oneshot,
        time::{sleep, timeout},
    };
    use tokio_tungstenite::{
        accept_async,
        tungstenite::{error::UrlError, Error as WsError},
        WebSocketStream,
    };

    use crate::{state::TimerState, sync::Topic};

    /// Accept one client on a local port and hand its socket to `relay`
    async fn local_relay<F, Fut>(relay: F) -> String
    where
        F: FnOnce(WebSocketStream<TcpStream>) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let ws = accept_async(stream).await.unwrap();
            relay(ws).await;
        });
        format!("ws://{}/", addr)
    }

    fn running_timer() -> TimerState {
        let mut state = TimerState::new();
        state.start();
        state
    }

    #[tokio::test]
    async fn relayed_snapshot_comes_back_as_update() {
        let url = local_relay(|mut ws| async move {
            while let Some(Ok(Message::Text(text))) = ws.next().await {
                let mut message = SyncMessage::decode(&text).unwrap();
                message.event = Topic::UpdateTimer;
                ws.send(Message::Text(message.encode().unwrap())).await.unwrap();
            }
        })
        .await;

        let mut link = connect(&url).await.unwrap();
        let state = running_timer();
        link.publish(SyncMessage::sync_timer(&state, None)).unwrap();

        let received = timeout(Duration::from_secs(5), link.next_message()).await.unwrap();
        assert_eq!(received.event, Topic::UpdateTimer);
        assert_eq!(received.data.into_state(0), state);
    }

    #[tokio::test]
    async fn malformed_frames_are_skipped() {
        let url = local_relay(|mut ws| async move {
            ws.send(Message::Text("not a snapshot".to_string())).await.unwrap();
            ws.send(Message::Text(r#"{"event":"update-timer"}"#.to_string()))
                .await
                .unwrap();
            let valid = SyncMessage::update_timer(&TimerState::with_durations(90, 30, 3), None);
            ws.send(Message::Text(valid.encode().unwrap())).await.unwrap();
            // Keep the socket open until the client leaves
            while let Some(Ok(_)) = ws.next().await {}
        })
        .await;

        let mut link = connect(&url).await.unwrap();
        let received = timeout(Duration::from_secs(5), link.next_message()).await.unwrap();
        assert_eq!(received.data.work_time, 90);
        assert_eq!(received.data.cycles, Some(3));
    }

    #[tokio::test]
    async fn relay_close_stops_sync_silently() {
        let url = local_relay(|mut ws| async move {
            let _ = ws.close(None).await;
        })
        .await;

        let mut link = connect(&url).await.unwrap();

        // Once the transport has seen the close, publishing reports a closed link
        let mut closed = false;
        for _ in 0..50 {
            if link.publish(SyncMessage::sync_timer(&running_timer(), None)).is_err() {
                closed = true;
                break;
            }
            sleep(Duration::from_millis(20)).await;
        }
        assert!(closed, "link never noticed the relay closing");

        let waited = timeout(Duration::from_millis(300), link.next_message()).await;
        assert!(waited.is_err());
    }

    #[tokio::test]
    async fn disconnect_sends_close_frame() {
        let (seen_tx, seen_rx) = oneshot::channel();
        let url = local_relay(|mut ws| async move {
            let mut saw_close = false;
            while let Some(Ok(frame)) = ws.next().await {
                if let Message::Close(_) = frame {
                    saw_close = true;
                    break;
                }
            }
            let _ = seen_tx.send(saw_close);
        })
        .await;

        let link = connect(&url).await.unwrap();
        link.disconnect().await;

        let saw_close = timeout(Duration::from_secs(5), seen_rx).await.unwrap().unwrap();
        assert!(saw_close);
    }

    #[tokio::test]
    async fn secure_urls_reach_the_tls_handshake() {
        // A plain TCP listener that hangs up: the handshake must be attempted and fail
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            if let Ok((stream, _)) = listener.accept().await {
                drop(stream);
            }
        });

        match connect(&format!("wss://{}/", addr)).await {
            Err(SyncError::Connect { source, .. }) => assert!(
                !matches!(source, WsError::Url(UrlError::TlsFeatureNotEnabled)),
                "built without TLS support"
            ),
            Err(e) => panic!("unexpected error: {}", e),
            Ok(_) => panic!("handshake with a silent listener succeeded"),
        }
    }
}
