//! # Sync Smoke Check
//!
//! Headless end-to-end check against a running note store.
//!
//! ## Usage
//! ```bash
//! # Connect to the default endpoint (ws://127.0.0.1:8000/ws)
//! cargo run -p quill-sync --bin smoke
//!
//! # Custom endpoint
//! QUILL_SYNC_URL=ws://192.168.1.20:8000/ws cargo run -p quill-sync --bin smoke
//! ```
//!
//! Connects, performs the initial fetch, and logs every view call the sync
//! client makes until Ctrl-C. Useful for watching the reconnect loop: stop
//! and restart the server while this runs.

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use quill_core::{Note, NoteId};
use quill_sync::{ClientConfig, NoteView, SyncAgent};

/// View that renders to the log instead of a screen.
struct TraceView;

impl NoteView for TraceView {
    fn render_note(&self, note: &Note, prepend: bool) {
        info!(id = ?note.id, title = %note.title, prepend, "render note");
    }
    fn update_note(&self, note: &Note) {
        info!(id = ?note.id, title = %note.title, "update note");
    }
    fn remove_note(&self, id: NoteId) {
        info!(id, "remove note");
    }
    fn clear_all_notes(&self) {
        info!("clear all notes");
    }
    fn show_notification(&self, text: &str, color: &str) {
        info!(%text, %color, "notification");
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,quill_sync=debug"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> quill_sync::SyncResult<()> {
    init_tracing();

    let config = ClientConfig::load_or_default(None);
    info!(url = %config.endpoint.url, "Starting sync smoke check");

    let handle = SyncAgent::spawn(config, Arc::new(TraceView))?;

    tokio::signal::ctrl_c().await?;
    info!("Ctrl-C received, shutting down");
    handle.shutdown().await;

    Ok(())
}
