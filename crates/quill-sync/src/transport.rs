//! # Transport Session
//!
//! One logical WebSocket connection to the remote store.
//!
//! ## Session Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      Session Lifecycle                              │
//! │                                                                     │
//! │  spawn(url) ──► connect ──┬─ success ──► Opened                     │
//! │                           │               │                         │
//! │                           │               ▼                         │
//! │                           │        Received(text) ...               │
//! │                           │               │                         │
//! │                           │     close / error / drop                │
//! │                           │               │                         │
//! │                           └─ failure ─────┴──► Closed { reason }    │
//! │                                                                     │
//! │  The session NEVER reconnects itself. The owner observes Closed     │
//! │  and decides whether and when to spawn a new session - reconnect    │
//! │  cadence lives in the agent, not here.                              │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Error and close are the same observable event: on a socket error the
//! session closes itself and the owner sees one `Closed`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tracing::{debug, info, warn};

use crate::error::SyncError;

// =============================================================================
// Session Events
// =============================================================================

/// Events a session presents to its owner.
#[derive(Debug)]
pub enum SessionEvent {
    /// The WebSocket handshake completed; the channel is open.
    Opened,

    /// One text frame arrived. Decoding is the owner's concern.
    Received(String),

    /// The connection ended - failed to open, closed by the peer, or
    /// errored. The session is finished; this is always the last event.
    Closed { reason: SyncError },
}

// =============================================================================
// Session Handle
// =============================================================================

/// Sender half of a session, held by the owner.
#[derive(Clone)]
pub struct SessionHandle {
    outgoing_tx: mpsc::UnboundedSender<String>,
    open: Arc<AtomicBool>,
}

impl SessionHandle {
    /// Sends one text frame over the socket.
    ///
    /// Fails silently when the session is not open: the frame is dropped
    /// and logged at debug. Callers get no delivery guarantee beyond "sent
    /// over an open channel".
    pub fn send(&self, text: String) {
        if !self.open.load(Ordering::Acquire) {
            debug!("Dropping outgoing frame, session not open");
            return;
        }
        if self.outgoing_tx.send(text).is_err() {
            debug!("Dropping outgoing frame, session task gone");
        }
    }

    /// Returns true while the socket is open.
    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }
}

// =============================================================================
// Session
// =============================================================================

/// A single connection attempt and, if it succeeds, its full lifetime.
pub struct Session;

impl Session {
    /// Spawns the session task for one connection attempt.
    ///
    /// Returns the sender handle and the event receiver. The task emits
    /// `Opened` on success, `Received` per text frame, and exactly one
    /// terminal `Closed`.
    pub fn spawn(url: String) -> (SessionHandle, mpsc::Receiver<SessionEvent>) {
        let (outgoing_tx, outgoing_rx) = mpsc::unbounded_channel();
        let (events_tx, events_rx) = mpsc::channel(64);
        let open = Arc::new(AtomicBool::new(false));

        let handle = SessionHandle {
            outgoing_tx,
            open: open.clone(),
        };

        tokio::spawn(run(url, outgoing_rx, events_tx, open));

        (handle, events_rx)
    }
}

/// Session task: one connect attempt, then the frame loop until the end.
async fn run(
    url: String,
    mut outgoing_rx: mpsc::UnboundedReceiver<String>,
    events_tx: mpsc::Sender<SessionEvent>,
    open: Arc<AtomicBool>,
) {
    debug!(%url, "Session connecting");

    let reason = match connect_async(&url).await {
        Ok((ws_stream, response)) => {
            debug!(status = ?response.status(), "WebSocket handshake complete");
            open.store(true, Ordering::Release);

            if events_tx.send(SessionEvent::Opened).await.is_err() {
                open.store(false, Ordering::Release);
                return; // owner gone
            }

            let (mut write, mut read) = ws_stream.split();

            let reason = loop {
                tokio::select! {
                    // Outgoing frames from the owner
                    maybe_text = outgoing_rx.recv() => {
                        match maybe_text {
                            Some(text) => {
                                if let Err(e) = write.send(WsMessage::Text(text.into())).await {
                                    break e.into();
                                }
                            }
                            // Owner dropped the handle; close gracefully.
                            None => {
                                let _ = write.send(WsMessage::Close(None)).await;
                                break SyncError::ChannelClosed("session handle dropped".into());
                            }
                        }
                    }

                    // Incoming frames from the socket
                    maybe_frame = read.next() => {
                        match maybe_frame {
                            Some(Ok(WsMessage::Text(text))) => {
                                if events_tx
                                    .send(SessionEvent::Received(text.to_string()))
                                    .await
                                    .is_err()
                                {
                                    break SyncError::ChannelClosed("event receiver dropped".into());
                                }
                            }
                            Some(Ok(WsMessage::Ping(data))) => {
                                if let Err(e) = write.send(WsMessage::Pong(data)).await {
                                    break e.into();
                                }
                            }
                            Some(Ok(WsMessage::Pong(_))) => {
                                debug!("Received pong");
                            }
                            Some(Ok(WsMessage::Close(frame))) => {
                                info!(?frame, "Received close frame");
                                break SyncError::Disconnected;
                            }
                            Some(Ok(WsMessage::Binary(_))) => {
                                warn!("Received unexpected binary frame");
                            }
                            Some(Ok(WsMessage::Frame(_))) => {
                                // Raw frame, ignore
                            }
                            Some(Err(e)) => {
                                break e.into();
                            }
                            None => {
                                break SyncError::Disconnected;
                            }
                        }
                    }
                }
            };

            open.store(false, Ordering::Release);
            reason
        }
        Err(e) => e.into(),
    };

    debug!(%reason, "Session finished");
    let _ = events_tx.send(SessionEvent::Closed { reason }).await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_is_silent_when_not_open() {
        let (outgoing_tx, mut outgoing_rx) = mpsc::unbounded_channel();
        let handle = SessionHandle {
            outgoing_tx,
            open: Arc::new(AtomicBool::new(false)),
        };

        handle.send("dropped".into());
        assert!(outgoing_rx.try_recv().is_err());
        assert!(!handle.is_open());
    }

    #[test]
    fn test_send_forwards_when_open() {
        let (outgoing_tx, mut outgoing_rx) = mpsc::unbounded_channel();
        let handle = SessionHandle {
            outgoing_tx,
            open: Arc::new(AtomicBool::new(true)),
        };

        handle.send("frame".into());
        assert_eq!(outgoing_rx.try_recv().unwrap(), "frame");
    }

    #[tokio::test]
    async fn test_failed_connect_yields_retryable_closed() {
        // Nothing listens on port 1; the attempt must end in a single
        // Closed event carrying a retryable reason, never a panic or a hang.
        let (_handle, mut events) = Session::spawn("ws://127.0.0.1:1".into());
        match events.recv().await {
            Some(SessionEvent::Closed { reason }) => assert!(reason.is_retryable()),
            other => panic!("expected Closed, got {:?}", other),
        }
    }
}
