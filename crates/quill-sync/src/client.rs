//! # Sync Client State Machine
//!
//! The connection-lifecycle state machine and the reconciliation policy:
//! which user intents become envelopes, and what each reply does to the
//! view.
//!
//! ## States
//! ```text
//!   DISCONNECTED ──connect──► CONNECTING ──opened──► CONNECTED
//!        ▲                        │                      │
//!        └────────── closed ──────┴──────── closed ──────┘
//! ```
//!
//! Reconnect scheduling is the agent's job; this type only records the
//! transitions and decides what to send.
//!
//! ## Update Policy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  POST    pessimistic  nothing rendered until POST_BACK; then the    │
//! │                       acknowledged note is prepended                │
//! │  EDIT    optimistic   note re-rendered in place before send;        │
//! │                       EDIT_BACK is a confirmation only              │
//! │  DELETE  optimistic   note removed before send; DELETE_BACK is a    │
//! │                       confirmation only - no rollback path exists   │
//! │  SEARCH  replacement  SEARCH_BACK clears the view and renders the   │
//! │                       returned list in order                        │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The asymmetry (pessimistic create, optimistic edit/delete without
//! rollback) is intentional and preserved: the protocol cannot express a
//! remote-side EDIT/DELETE failure, so there is nothing to roll back to.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

use quill_core::{now_ms, tags, Note, NoteId};

use crate::notify::{Notifier, COLOR_SUCCESS};
use crate::protocol::Envelope;
use crate::view::NoteView;

// =============================================================================
// Client State
// =============================================================================

/// Connection lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientState {
    /// Not connected (initial, and after every close).
    Disconnected,
    /// Attempting to connect.
    Connecting,
    /// Connected and exchanging envelopes.
    Connected,
}

impl std::fmt::Display for ClientState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClientState::Disconnected => write!(f, "disconnected"),
            ClientState::Connecting => write!(f, "connecting"),
            ClientState::Connected => write!(f, "connected"),
        }
    }
}

// =============================================================================
// User Intents
// =============================================================================

/// User intents surfaced by the rendering layer.
#[derive(Debug, Clone)]
pub enum UserIntent {
    /// Submit a new note. `tags_text` is the raw comma-separated field.
    Submit {
        title: String,
        content: String,
        tags_text: String,
    },

    /// Confirm an edit of a displayed note.
    EditConfirm {
        id: NoteId,
        title: String,
        content: String,
        tags_text: String,
    },

    /// Delete a displayed note.
    Delete { id: NoteId },

    /// Search; the reply replaces the whole view.
    Search { text: String },
}

/// What an outstanding token was issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PendingKind {
    Fetch,
    Create,
    Edit,
    Delete,
    Search,
}

// =============================================================================
// Sync Client
// =============================================================================

/// The synchronization state machine.
///
/// Owns a local mirror of the rendered notes (needed for the unchanged-edit
/// check and the optimistic paths) and the pending-request table keyed by
/// correlation token.
pub struct SyncClient<V: NoteView> {
    view: Arc<V>,
    notifier: Notifier<V>,

    state: ClientState,

    /// Set on the first transition to CONNECTED; never reset. Reconnects
    /// therefore resume silently without refetching - deliberate, see the
    /// design notes.
    has_fetched_once: bool,

    /// Local mirror of the rendered note list, in view order.
    notes: Vec<Note>,

    /// Outstanding requests by correlation token.
    pending: HashMap<u64, PendingKind>,

    /// Next correlation token (1-based; 0 means "absent" on the wire).
    next_token: u64,
}

impl<V: NoteView> SyncClient<V> {
    /// Creates a disconnected client over the given view.
    pub fn new(view: Arc<V>, notifier: Notifier<V>) -> Self {
        SyncClient {
            view,
            notifier,
            state: ClientState::Disconnected,
            has_fetched_once: false,
            notes: Vec::new(),
            pending: HashMap::new(),
            next_token: 1,
        }
    }

    /// Current connection state.
    pub fn state(&self) -> ClientState {
        self.state
    }

    /// Number of notes in the local mirror.
    pub fn note_count(&self) -> usize {
        self.notes.len()
    }

    // =========================================================================
    // Connection Events
    // =========================================================================

    /// A connection attempt has started.
    pub fn handle_connecting(&mut self) {
        self.state = ClientState::Connecting;
    }

    /// The socket opened. Returns the initial fetch envelope the first time
    /// only; every later reconnection resumes without refetching.
    pub fn handle_opened(&mut self) -> Option<Envelope> {
        self.state = ClientState::Connected;
        info!("Connected to remote store");

        if self.has_fetched_once {
            debug!("Reconnected, skipping initial fetch");
            return None;
        }
        self.has_fetched_once = true;

        let token = self.issue_token(PendingKind::Fetch);
        Some(Envelope::Get { token })
    }

    /// The socket closed (or errored, or failed to open).
    pub fn handle_closed(&mut self) {
        if self.state != ClientState::Disconnected {
            info!("Disconnected from remote store");
        }
        self.state = ClientState::Disconnected;
        // Replies for these will never arrive.
        self.pending.clear();
    }

    // =========================================================================
    // User Intents → Envelopes
    // =========================================================================

    /// Applies a user intent and returns the envelope to send, if any.
    ///
    /// Optimistic view mutations happen here, before the envelope is ever
    /// sent - and regardless of whether the transport can deliver it.
    pub fn handle_intent(&mut self, intent: UserIntent) -> Option<Envelope> {
        match intent {
            UserIntent::Submit {
                title,
                content,
                tags_text,
            } => {
                // Pessimistic: render nothing until POST_BACK.
                let token = self.issue_token(PendingKind::Create);
                Some(Envelope::post(
                    token,
                    title,
                    content,
                    tags::from_text(&tags_text),
                ))
            }

            UserIntent::EditConfirm {
                id,
                title,
                content,
                tags_text,
            } => self.handle_edit_confirm(id, title, content, tags_text),

            UserIntent::Delete { id } => {
                // Optimistic: remove locally first. No rollback path.
                self.notes.retain(|n| n.id != Some(id));
                self.view.remove_note(id);

                let token = self.issue_token(PendingKind::Delete);
                Some(Envelope::Delete { token, id })
            }

            UserIntent::Search { text } => {
                let token = self.issue_token(PendingKind::Search);
                Some(Envelope::Search { token, text })
            }
        }
    }

    /// Optimistic edit with the unchanged-submission check.
    fn handle_edit_confirm(
        &mut self,
        id: NoteId,
        title: String,
        content: String,
        tags_text: String,
    ) -> Option<Envelope> {
        let new_tags = tags::from_text(&tags_text);

        let Some(index) = self.notes.iter().position(|n| n.id == Some(id)) else {
            warn!(id, "Edit confirmed for a note not in the view");
            return None;
        };

        // Identical submission (after trimming): skip the remote call and
        // the `changed` timestamp churn entirely.
        {
            let note = &self.notes[index];
            if note.title.trim() == title.trim()
                && note.content.trim() == content.trim()
                && note.tags == new_tags
            {
                debug!(id, "Edit unchanged, nothing to send");
                return None;
            }
        }

        let token = self.issue_token(PendingKind::Edit);
        let note = &mut self.notes[index];
        note.title = title;
        note.content = content;
        note.tags = new_tags;
        note.changed = now_ms();
        self.view.update_note(note);

        Some(Envelope::Edit {
            token,
            id,
            changed: note.changed,
            title: note.title.clone(),
            content: note.content.clone(),
            tags: note.tags.clone(),
        })
    }

    // =========================================================================
    // Incoming Envelopes → Reconciliation
    // =========================================================================

    /// Applies one incoming envelope's effect onto the view state.
    pub fn handle_envelope(&mut self, envelope: Envelope) {
        if !envelope.is_reply() {
            warn!(method = envelope.method_name(), "Request method from remote, ignoring");
            return;
        }
        self.resolve_token(&envelope);

        match envelope {
            Envelope::GetBack { note_list, .. } => {
                debug!(count = note_list.len(), "Initial note list");
                for note in note_list {
                    self.view.render_note(&note, false);
                    self.notes.push(note);
                }
            }

            Envelope::PostBack { note, .. } => {
                debug!(id = ?note.id, "Creation acknowledged");
                self.view.render_note(&note, true);
                self.notes.insert(0, note);
                self.notifier.show("SUBMITTED", COLOR_SUCCESS);
            }

            Envelope::EditBack { .. } => {
                // The optimistic mutation already happened.
                self.notifier.show("EDITED", COLOR_SUCCESS);
            }

            Envelope::DeleteBack { .. } => {
                self.notifier.show("DELETED", COLOR_SUCCESS);
            }

            Envelope::SearchBack { note_list, .. } => {
                debug!(count = note_list.len(), "Search results replace view");
                self.view.clear_all_notes();
                self.notes.clear();
                for note in note_list {
                    self.view.render_note(&note, false);
                    self.notes.push(note);
                }
            }

            _ => unreachable!("is_reply() filtered requests"),
        }
    }

    /// Resolves a reply against the pending table.
    ///
    /// Unknown or absent tokens are tolerated: the reply is still applied by
    /// method, which keeps the client compatible with a token-less server.
    fn resolve_token(&mut self, envelope: &Envelope) {
        let token = envelope.token();
        if token == 0 {
            debug!(method = envelope.method_name(), "Reply without token");
            return;
        }
        match self.pending.remove(&token) {
            Some(kind) => debug!(token, ?kind, "Request acknowledged"),
            None => debug!(token, method = envelope.method_name(), "Reply for unknown token"),
        }
    }

    fn issue_token(&mut self, kind: PendingKind) -> u64 {
        let token = self.next_token;
        self.next_token += 1;
        self.pending.insert(token, kind);
        token
    }
}
