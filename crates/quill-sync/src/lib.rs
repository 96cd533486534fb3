//! # quill-sync: Synchronization Client for Quill Notes
//!
//! Keeps a rendered note list in step with the remote store over one
//! persistent WebSocket connection.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      Sync Client Architecture                       │
//! │                                                                     │
//! │  ┌───────────────────────────────────────────────────────────────┐  │
//! │  │                 SyncAgent (Main Orchestrator)                 │  │
//! │  │                                                               │  │
//! │  │  Owns the reconnect-forever loop (fixed 1 s delay, no         │  │
//! │  │  backoff, no cap) and routes everything below                 │  │
//! │  └───────────────┬───────────────────┬───────────────────────────┘  │
//! │                  ▼                   ▼                              │
//! │  ┌────────────────────┐  ┌──────────────────────────────────────┐   │
//! │  │      Session       │  │            SyncClient                │   │
//! │  │   (one WebSocket)  │  │  DISCONNECTED→CONNECTING→CONNECTED   │   │
//! │  │                    │  │  fetch-once flag, pending tokens,    │   │
//! │  │ opened / received  │  │  optimistic edit+delete,             │   │
//! │  │ / closed events;   │  │  pessimistic create,                 │   │
//! │  │ silent send when   │  │  search = full view replacement      │   │
//! │  │ not open           │  │                                      │   │
//! │  └────────────────────┘  └──────────────┬───────────────────────┘   │
//! │                                         ▼                           │
//! │  ┌────────────────────┐  ┌──────────────────────────────────────┐   │
//! │  │   protocol/codec   │  │        NoteView (trait)              │   │
//! │  │  JSON envelopes    │  │  render/update/remove/clear +        │   │
//! │  │  tagged on method  │  │  Notifier-guarded notifications      │   │
//! │  └────────────────────┘  └──────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`agent`] - Main `SyncAgent` orchestrator and its handle
//! - [`client`] - Connection state machine and reconciliation policy
//! - [`codec`] - Envelope ↔ JSON text conversion
//! - [`config`] - Client configuration (endpoint, cadences)
//! - [`error`] - Sync error types
//! - [`notify`] - Single shared notification slot
//! - [`protocol`] - Wire envelopes
//! - [`transport`] - One-shot WebSocket session
//! - [`view`] - The rendering-layer collaborator trait
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use quill_sync::{ClientConfig, SyncAgent};
//!
//! let config = ClientConfig::load_or_default(None);
//! let handle = SyncAgent::spawn(config, Arc::new(MyView::new()))?;
//!
//! // Rendering layer forwards user intents:
//! handle.submit("Title", "Content", "tag1, tag2");
//! handle.search("tag1");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod agent;
pub mod client;
pub mod codec;
pub mod config;
pub mod error;
pub mod notify;
pub mod protocol;
pub mod transport;
pub mod view;

// =============================================================================
// Re-exports
// =============================================================================

pub use agent::{SyncAgent, SyncAgentHandle};
pub use client::{ClientState, SyncClient, UserIntent};
pub use codec::Decoded;
pub use config::ClientConfig;
pub use error::{SyncError, SyncResult};
pub use notify::Notifier;
pub use protocol::Envelope;
pub use transport::{Session, SessionEvent, SessionHandle};
pub use view::{NoteView, NullView};
