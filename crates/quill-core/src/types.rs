//! # Domain Types
//!
//! The note record as the remote store understands it.
//!
//! ## Identity
//! Ids are assigned by the remote store (`INTEGER PRIMARY KEY` semantics),
//! so a locally created note has `id: None` until the server acknowledges
//! the creation and echoes the assigned id back.

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Identifier assigned by the remote store.
pub type NoteId = i64;

/// Current time in milliseconds since the Unix epoch.
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

// =============================================================================
// Note
// =============================================================================

/// A single unit of user content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Remote-assigned id; `None` until the creation is acknowledged.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<NoteId>,

    /// Free-form title.
    pub title: String,

    /// Free-form body text.
    pub content: String,

    /// Ordered tags. Duplicates are permitted; empty or whitespace-only
    /// entries are not (enforced at the text↔list boundary, see [`crate::tags`]).
    #[serde(default)]
    pub tags: Vec<String>,

    /// Creation timestamp (ms since epoch), set once.
    pub created: i64,

    /// Last-edit timestamp (ms since epoch), updated on every edit.
    pub changed: i64,
}

impl Note {
    /// Creates a not-yet-persisted note with both timestamps set to now.
    pub fn new(title: impl Into<String>, content: impl Into<String>, tags: Vec<String>) -> Self {
        let now = now_ms();
        Note {
            id: None,
            title: title.into(),
            content: content.into(),
            tags,
            created: now,
            changed: now,
        }
    }

    /// Marks the note as edited now.
    pub fn touch(&mut self) {
        self.changed = now_ms();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_note_has_no_id() {
        let note = Note::new("Title", "Content", vec!["a".into()]);
        assert!(note.id.is_none());
        assert_eq!(note.created, note.changed);
    }

    #[test]
    fn test_touch_advances_changed_only() {
        let mut note = Note::new("Title", "Content", vec![]);
        let created = note.created;
        note.changed -= 10; // pretend some time passed
        note.touch();
        assert_eq!(note.created, created);
        assert!(note.changed >= created);
    }

    #[test]
    fn test_missing_optional_fields_deserialize() {
        // A server that predates tags sends neither `id: null` nor `tags`.
        let json = r#"{"title":"t","content":"c","created":1,"changed":2}"#;
        let note: Note = serde_json::from_str(json).unwrap();
        assert_eq!(note.id, None);
        assert!(note.tags.is_empty());
    }

    #[test]
    fn test_unpersisted_note_serializes_without_id() {
        let note = Note::new("t", "c", vec![]);
        let json = serde_json::to_string(&note).unwrap();
        assert!(!json.contains("\"id\""));
    }
}
