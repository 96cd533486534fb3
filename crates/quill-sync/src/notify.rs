//! # Notification Slot
//!
//! A single shared status slot that visually confirms server acknowledgments
//! ("SUBMITTED", "EDITED", "DELETED").
//!
//! Tiny state machine, independent of the connection state machine:
//!
//! ```text
//!            show(text, color)
//!   IDLE ──────────────────────► SHOWING
//!    ▲                              │
//!    │      revert timer fires      │   show() while SHOWING:
//!    └──────────────────────────────┘   dropped, not queued
//! ```
//!
//! The revert timer always fires; there is no cancellation. After the
//! display interval the slot reverts to its idle label/color and accepts
//! the next message.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::view::NoteView;

/// Color tag for acknowledgment confirmations.
pub const COLOR_SUCCESS: &str = "green";

struct Inner<V> {
    view: Arc<V>,
    /// True while a message is displayed (the SHOWING state).
    showing: AtomicBool,
    display: Duration,
    idle_label: String,
    idle_color: String,
}

/// Shared notification slot with its own revert timer.
pub struct Notifier<V: NoteView> {
    inner: Arc<Inner<V>>,
}

impl<V: NoteView> Clone for Notifier<V> {
    fn clone(&self) -> Self {
        Notifier {
            inner: self.inner.clone(),
        }
    }
}

impl<V: NoteView> Notifier<V> {
    /// Creates an idle slot over the given view.
    pub fn new(view: Arc<V>, display: Duration, idle_label: String, idle_color: String) -> Self {
        Notifier {
            inner: Arc::new(Inner {
                view,
                showing: AtomicBool::new(false),
                display,
                idle_label,
                idle_color,
            }),
        }
    }

    /// Shows a transient message, then reverts to the idle label.
    ///
    /// A call arriving while another message is displayed is a no-op.
    pub fn show(&self, text: &str, color: &str) {
        if self.inner.showing.swap(true, Ordering::AcqRel) {
            debug!(%text, "Notification slot busy, dropping");
            return;
        }

        self.inner.view.show_notification(text, color);

        let inner = self.inner.clone();
        tokio::spawn(async move {
            tokio::time::sleep(inner.display).await;
            inner
                .view
                .show_notification(&inner.idle_label, &inner.idle_color);
            inner.showing.store(false, Ordering::Release);
        });
    }

    /// Returns true while a message is displayed.
    pub fn is_showing(&self) -> bool {
        self.inner.showing.load(Ordering::Acquire)
    }
}
