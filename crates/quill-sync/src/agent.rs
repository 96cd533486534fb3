//! # Sync Agent
//!
//! Orchestrator for the sync client. Owns the reconnect loop and wires the
//! transport session, the codec, and the state machine together.
//!
//! ## Agent Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                       SyncAgent Architecture                        │
//! │                                                                     │
//! │   SyncAgentHandle                                                   │
//! │   submit/edit/delete/search ──┐                                     │
//! │                               ▼                                     │
//! │  ┌───────────────────────────────────────────────────────────────┐  │
//! │  │                       SyncAgent loop                          │  │
//! │  │                                                               │  │
//! │  │   Session events ──► codec::decode ──► SyncClient             │  │
//! │  │   User intents ────────────────────►   SyncClient             │  │
//! │  │   SyncClient envelopes ──► codec::encode ──► Session.send     │  │
//! │  │                                                               │  │
//! │  │   On Closed: wait the fixed reconnect delay, spawn a new      │  │
//! │  │   session, forever. No backoff, no retry cap.                 │  │
//! │  └───────────────────────────────────────────────────────────────┘  │
//! │                                                                     │
//! │   Connection state published via a watch channel.                   │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::client::{ClientState, SyncClient, UserIntent};
use crate::codec::{self, Decoded};
use crate::config::ClientConfig;
use crate::error::SyncResult;
use crate::notify::Notifier;
use crate::protocol::Envelope;
use crate::transport::{Session, SessionEvent, SessionHandle};
use crate::view::NoteView;

use quill_core::NoteId;

// =============================================================================
// Agent Handle
// =============================================================================

/// Handle for driving a running [`SyncAgent`] from the rendering layer.
#[derive(Clone)]
pub struct SyncAgentHandle {
    intent_tx: mpsc::UnboundedSender<UserIntent>,
    shutdown_tx: mpsc::Sender<()>,
    state_rx: watch::Receiver<ClientState>,
}

impl SyncAgentHandle {
    /// Forwards a note submission.
    pub fn submit(
        &self,
        title: impl Into<String>,
        content: impl Into<String>,
        tags_text: impl Into<String>,
    ) {
        self.forward(UserIntent::Submit {
            title: title.into(),
            content: content.into(),
            tags_text: tags_text.into(),
        });
    }

    /// Forwards a confirmed edit.
    pub fn edit_confirm(
        &self,
        id: NoteId,
        title: impl Into<String>,
        content: impl Into<String>,
        tags_text: impl Into<String>,
    ) {
        self.forward(UserIntent::EditConfirm {
            id,
            title: title.into(),
            content: content.into(),
            tags_text: tags_text.into(),
        });
    }

    /// Forwards a deletion.
    pub fn delete(&self, id: NoteId) {
        self.forward(UserIntent::Delete { id });
    }

    /// Forwards a search.
    pub fn search(&self, text: impl Into<String>) {
        self.forward(UserIntent::Search { text: text.into() });
    }

    /// Current connection state.
    pub fn state(&self) -> ClientState {
        *self.state_rx.borrow()
    }

    /// Signals the agent to shut down gracefully.
    pub async fn shutdown(&self) {
        let _ = self.shutdown_tx.send(()).await;
    }

    fn forward(&self, intent: UserIntent) {
        if self.intent_tx.send(intent).is_err() {
            debug!("Agent gone, dropping intent");
        }
    }
}

// =============================================================================
// Sync Agent
// =============================================================================

/// Owns the state machine and the reconnect-forever loop.
pub struct SyncAgent<V: NoteView> {
    config: ClientConfig,
    client: SyncClient<V>,
    intent_rx: mpsc::UnboundedReceiver<UserIntent>,
    shutdown_rx: mpsc::Receiver<()>,
    state_tx: watch::Sender<ClientState>,
}

impl<V: NoteView> SyncAgent<V> {
    /// Creates an agent over the given view.
    ///
    /// Validates the configuration; the connection is not attempted until
    /// [`run`](Self::run).
    pub fn new(config: ClientConfig, view: Arc<V>) -> SyncResult<(Self, SyncAgentHandle)> {
        config.validate()?;

        let notifier = Notifier::new(
            view.clone(),
            config.notification_display(),
            config.notification.idle_label.clone(),
            config.notification.idle_color.clone(),
        );
        let client = SyncClient::new(view, notifier);

        let (intent_tx, intent_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
        let (state_tx, state_rx) = watch::channel(ClientState::Disconnected);

        let agent = SyncAgent {
            config,
            client,
            intent_rx,
            shutdown_rx,
            state_tx,
        };
        let handle = SyncAgentHandle {
            intent_tx,
            shutdown_tx,
            state_rx,
        };

        Ok((agent, handle))
    }

    /// Creates the agent and spawns its loop as a background task.
    pub fn spawn(config: ClientConfig, view: Arc<V>) -> SyncResult<SyncAgentHandle> {
        let (agent, handle) = Self::new(config, view)?;
        tokio::spawn(agent.run());
        Ok(handle)
    }

    /// Main loop: connect, route, and on close reconnect after the fixed
    /// delay - forever, until shutdown.
    pub async fn run(mut self) {
        info!(url = %self.config.endpoint.url, "Sync agent starting");

        loop {
            self.client.handle_connecting();
            self.publish_state();

            let (session, mut events) = Session::spawn(self.config.endpoint.url.clone());

            // Route events and intents until this session ends.
            let mut session_open = true;
            while session_open {
                tokio::select! {
                    maybe_event = events.recv() => {
                        match maybe_event {
                            Some(event) => {
                                session_open = self.handle_session_event(&session, event);
                            }
                            None => {
                                self.client.handle_closed();
                                self.publish_state();
                                session_open = false;
                            }
                        }
                    }

                    maybe_intent = self.intent_rx.recv() => {
                        match maybe_intent {
                            Some(intent) => {
                                if let Some(envelope) = self.client.handle_intent(intent) {
                                    self.send(&session, envelope);
                                }
                            }
                            // Every handle dropped: nobody can drive us.
                            None => {
                                info!("All agent handles dropped, stopping");
                                return;
                            }
                        }
                    }

                    _ = self.shutdown_rx.recv() => {
                        info!("Sync agent shutting down");
                        return;
                    }
                }
            }

            // Fixed-delay reconnect. Scheduled on every close; fires unless
            // shutdown arrives first. Intents keep flowing into the state
            // machine meanwhile: optimistic view mutations must not wait for
            // the next connection, and the produced envelope has nowhere to
            // go - same outcome as a send on a closed session.
            debug!(delay_ms = self.config.reconnect.delay_ms, "Scheduling reconnect");
            let delay = tokio::time::sleep(self.config.reconnect_delay());
            tokio::pin!(delay);
            loop {
                tokio::select! {
                    _ = &mut delay => break,

                    maybe_intent = self.intent_rx.recv() => {
                        match maybe_intent {
                            Some(intent) => {
                                if let Some(envelope) = self.client.handle_intent(intent) {
                                    debug!(
                                        method = envelope.method_name(),
                                        "Dropping envelope, not connected"
                                    );
                                }
                            }
                            None => {
                                info!("All agent handles dropped, stopping");
                                return;
                            }
                        }
                    }

                    _ = self.shutdown_rx.recv() => {
                        info!("Sync agent shutting down");
                        return;
                    }
                }
            }
        }
    }

    /// Routes one session event. Returns false when the session is over.
    fn handle_session_event(&mut self, session: &SessionHandle, event: SessionEvent) -> bool {
        match event {
            SessionEvent::Opened => {
                if let Some(envelope) = self.client.handle_opened() {
                    self.send(session, envelope);
                }
                self.publish_state();
                true
            }

            SessionEvent::Received(text) => {
                match codec::decode(&text) {
                    Decoded::Envelope(envelope) => self.client.handle_envelope(envelope),
                    // Not versioned, not validated: drop and move on.
                    Decoded::Unrecognized => {}
                }
                true
            }

            SessionEvent::Closed { reason } => {
                debug!(%reason, retryable = reason.is_retryable(), "Session closed");
                self.client.handle_closed();
                self.publish_state();
                false
            }
        }
    }

    fn send(&self, session: &SessionHandle, envelope: Envelope) {
        match codec::encode(&envelope) {
            Ok(text) => {
                debug!(method = envelope.method_name(), token = envelope.token(), "Sending");
                session.send(text);
            }
            Err(e) => warn!(%e, "Failed to encode envelope"),
        }
    }

    fn publish_state(&self) {
        self.state_tx.send_replace(self.client.state());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::{SinkExt, StreamExt};
    use quill_core::{Note, NoteId};
    use serde_json::json;
    use std::time::Duration;
    use tokio::net::TcpListener;
    use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
    use tokio_tungstenite::tungstenite::Message as WsMessage;

    /// View that forwards every call as a line the test can await.
    struct ChannelView {
        tx: UnboundedSender<String>,
    }

    impl NoteView for ChannelView {
        fn render_note(&self, note: &Note, prepend: bool) {
            let _ = self.tx.send(format!(
                "render:{}:{}:{}",
                note.id.unwrap_or(-1),
                note.title,
                prepend
            ));
        }
        fn update_note(&self, note: &Note) {
            let _ = self.tx.send(format!("update:{}", note.id.unwrap_or(-1)));
        }
        fn remove_note(&self, id: NoteId) {
            let _ = self.tx.send(format!("remove:{}", id));
        }
        fn clear_all_notes(&self) {
            let _ = self.tx.send("clear".to_string());
        }
        fn show_notification(&self, text: &str, _color: &str) {
            let _ = self.tx.send(format!("notify:{}", text));
        }
    }

    fn test_config(url: String) -> ClientConfig {
        let mut config = ClientConfig::default();
        config.endpoint.url = url;
        config.reconnect.delay_ms = 50; // keep reconnect tests fast
        config
    }

    async fn next_view_call(rx: &mut UnboundedReceiver<String>) -> String {
        tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("timed out waiting for view call")
            .expect("view channel closed")
    }

    /// Replies to one protocol request on an accepted server socket.
    async fn reply(
        ws: &mut tokio_tungstenite::WebSocketStream<tokio::net::TcpStream>,
        request: serde_json::Value,
    ) {
        let response = match request["method"].as_str().unwrap() {
            "GET" => json!({
                "method": "GET_BACK",
                "token": request["token"],
                "note_list": [
                    {"id": 1, "title": "seeded", "content": "c", "tags": [], "created": 1, "changed": 1}
                ]
            }),
            "POST" => json!({
                "method": "POST_BACK",
                "token": request["token"],
                "id": 42,
                "title": request["title"],
                "content": request["content"],
                "tags": request["tags"],
                "created": request["created"],
                "changed": request["changed"],
            }),
            "SEARCH" => json!({
                "method": "SEARCH_BACK",
                "token": request["token"],
                "note_list": []
            }),
            other => panic!("unexpected request method: {}", other),
        };
        ws.send(WsMessage::Text(response.to_string().into()))
            .await
            .unwrap();
    }

    async fn next_request(
        ws: &mut tokio_tungstenite::WebSocketStream<tokio::net::TcpStream>,
    ) -> serde_json::Value {
        loop {
            let msg = tokio::time::timeout(Duration::from_secs(5), ws.next())
                .await
                .expect("timed out waiting for request")
                .expect("socket ended")
                .unwrap();
            if let WsMessage::Text(text) = msg {
                return serde_json::from_str(&text).unwrap();
            }
        }
    }

    #[tokio::test]
    async fn test_fetch_and_submit_round_trip() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();

            let get = next_request(&mut ws).await;
            assert_eq!(get["method"], "GET");
            reply(&mut ws, get).await;

            let post = next_request(&mut ws).await;
            assert_eq!(post["method"], "POST");
            assert_eq!(post["tags"], json!(["a", "b"]));
            reply(&mut ws, post).await;
        });

        let (view_tx, mut view_rx) = unbounded_channel();
        let handle = SyncAgent::spawn(
            test_config(format!("ws://{}", addr)),
            Arc::new(ChannelView { tx: view_tx }),
        )
        .unwrap();

        // Initial fetch renders the seeded note, appended.
        assert_eq!(next_view_call(&mut view_rx).await, "render:1:seeded:false");

        // Pessimistic create: rendered only on POST_BACK, prepended, with
        // the remote-assigned id.
        handle.submit("hello", "world", "a, ,b,");
        assert_eq!(next_view_call(&mut view_rx).await, "render:42:hello:true");
        assert_eq!(next_view_call(&mut view_rx).await, "notify:SUBMITTED");

        server.await.unwrap();
        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_optimistic_delete_applies_while_disconnected() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            // Serve the initial fetch, then drop the socket and go away.
            let (stream, _) = listener.accept().await.unwrap();
            let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
            let get = next_request(&mut ws).await;
            assert_eq!(get["method"], "GET");
            reply(&mut ws, get).await;
        });

        let (view_tx, mut view_rx) = unbounded_channel();
        let mut config = test_config(format!("ws://{}", addr));
        // Long enough that the agent spends the whole test inside the
        // reconnect delay once the server is gone.
        config.reconnect.delay_ms = 10_000;
        let (agent, handle) = SyncAgent::new(config, Arc::new(ChannelView { tx: view_tx })).unwrap();
        let mut state_rx = handle.state_rx.clone();
        tokio::spawn(agent.run());

        assert_eq!(next_view_call(&mut view_rx).await, "render:1:seeded:false");
        server.await.unwrap();

        tokio::time::timeout(
            Duration::from_secs(5),
            state_rx.wait_for(|s| *s == ClientState::Disconnected),
        )
        .await
        .expect("disconnect timed out")
        .unwrap();

        // The note must leave the view now, not after the next connection.
        handle.delete(1);
        assert_eq!(next_view_call(&mut view_rx).await, "remove:1");

        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_reconnect_resumes_without_refetch() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            // First connection: serve the fetch, then drop the socket.
            let (stream, _) = listener.accept().await.unwrap();
            let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
            let get = next_request(&mut ws).await;
            assert_eq!(get["method"], "GET");
            reply(&mut ws, get).await;
            drop(ws);

            // Second connection: the first request must NOT be a GET.
            let (stream, _) = listener.accept().await.unwrap();
            let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
            let search = next_request(&mut ws).await;
            assert_eq!(search["method"], "SEARCH");
            reply(&mut ws, search).await;
        });

        let (view_tx, mut view_rx) = unbounded_channel();
        let (agent, handle) = SyncAgent::new(
            test_config(format!("ws://{}", addr)),
            Arc::new(ChannelView { tx: view_tx }),
        )
        .unwrap();
        let mut state_rx = handle.state_rx.clone();
        tokio::spawn(agent.run());

        assert_eq!(next_view_call(&mut view_rx).await, "render:1:seeded:false");

        // Wait out the disconnect and the automatic reconnection.
        let watch = async {
            state_rx
                .wait_for(|s| *s == ClientState::Disconnected)
                .await
                .unwrap();
            state_rx
                .wait_for(|s| *s == ClientState::Connected)
                .await
                .unwrap();
        };
        tokio::time::timeout(Duration::from_secs(5), watch)
            .await
            .expect("reconnect timed out");

        handle.search("anything");
        // SEARCH_BACK with no matches clears the view.
        assert_eq!(next_view_call(&mut view_rx).await, "clear");

        server.await.unwrap();
        handle.shutdown().await;
    }
}
