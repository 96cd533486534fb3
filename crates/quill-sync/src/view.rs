//! # Note View Collaborator
//!
//! The rendering layer is not part of this crate; it implements [`NoteView`]
//! and receives every visible effect of synchronization through it. The sync
//! client never touches markup, styling, or widgets.
//!
//! Calls arrive already ordered by the reconciliation policy: pessimistic
//! creates render only on acknowledgment, optimistic edits/deletes render
//! before their acknowledgment arrives.

use quill_core::{Note, NoteId};

/// View-facing collaborator owning on-screen rendering.
pub trait NoteView: Send + Sync + 'static {
    /// Inserts a note into the view, at the front (`prepend`) or the back.
    fn render_note(&self, note: &Note, prepend: bool);

    /// Re-renders an already displayed note in place (optimistic edit).
    fn update_note(&self, note: &Note);

    /// Removes one note from the view (optimistic delete).
    fn remove_note(&self, id: NoteId);

    /// Removes every rendered note (search replacement).
    fn clear_all_notes(&self);

    /// Displays a transient status message. The idle-slot policy (drop
    /// while another message is showing) is enforced by the caller, not
    /// here - implementations just display what they are given.
    fn show_notification(&self, text: &str, color: &str);
}

/// No-op view for tests and headless use.
pub struct NullView;

impl NoteView for NullView {
    fn render_note(&self, _note: &Note, _prepend: bool) {}
    fn update_note(&self, _note: &Note) {}
    fn remove_note(&self, _id: NoteId) {}
    fn clear_all_notes(&self) {}
    fn show_notification(&self, _text: &str, _color: &str) {}
}
