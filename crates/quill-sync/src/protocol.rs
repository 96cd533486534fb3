//! # Wire Protocol Envelopes
//!
//! Message types exchanged with the remote note store.
//!
//! ## Protocol Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      Note Sync Protocol                             │
//! │                                                                     │
//! │  INITIAL FETCH (once per client lifetime)                           │
//! │  ────────────────────────────────────────                           │
//! │  CLIENT ───► GET    {token}                                         │
//! │  REMOTE ◄─── GET_BACK {token, note_list}                            │
//! │                                                                     │
//! │  CREATE (pessimistic: rendered only on reply)                       │
//! │  ────────────────────────────────────────────                       │
//! │  CLIENT ───► POST      {token, title, content, tags, created,       │
//! │                         changed}                                    │
//! │  REMOTE ◄─── POST_BACK {token, id, title, content, tags, ...}       │
//! │                                                                     │
//! │  EDIT / DELETE (optimistic: applied before send, ack only)          │
//! │  ─────────────────────────────────────────────────────────          │
//! │  CLIENT ───► EDIT        {token, id, changed, title, content, tags} │
//! │  REMOTE ◄─── EDIT_BACK   {token}                                    │
//! │  CLIENT ───► DELETE      {token, id}                                │
//! │  REMOTE ◄─── DELETE_BACK {token}                                    │
//! │                                                                     │
//! │  SEARCH (full view replacement)                                     │
//! │  ──────────────────────────────                                     │
//! │  CLIENT ───► SEARCH      {token, text}                              │
//! │  REMOTE ◄─── SEARCH_BACK {token, note_list}                         │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Wire Format (JSON)
//! Envelopes are internally tagged on the `method` string:
//! ```json
//! { "method": "POST", "token": 3, "title": "...", ... }
//! ```
//!
//! Every request carries a client-assigned correlation `token`; replies echo
//! it. A token-less peer is tolerated: `token` defaults to 0 on decode and
//! replies are then attributed by method alone.

use serde::{Deserialize, Serialize};

use quill_core::{now_ms, Note, NoteId};

// =============================================================================
// Envelope (Tagged Union)
// =============================================================================

/// One discrete protocol message, tagged by method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method")]
pub enum Envelope {
    // =========================================================================
    // Client → Remote
    // =========================================================================

    /// Initial bulk fetch of the note list.
    #[serde(rename = "GET")]
    Get {
        #[serde(default)]
        token: u64,
    },

    /// Create a note. The id is assigned remotely and returned in PostBack.
    #[serde(rename = "POST")]
    Post {
        #[serde(default)]
        token: u64,
        title: String,
        content: String,
        tags: Vec<String>,
        created: i64,
        changed: i64,
    },

    /// Update an existing note.
    #[serde(rename = "EDIT")]
    Edit {
        #[serde(default)]
        token: u64,
        id: NoteId,
        changed: i64,
        title: String,
        content: String,
        tags: Vec<String>,
    },

    /// Delete a note by id.
    #[serde(rename = "DELETE")]
    Delete {
        #[serde(default)]
        token: u64,
        id: NoteId,
    },

    /// Full-text search; the reply replaces the whole view.
    #[serde(rename = "SEARCH")]
    Search {
        #[serde(default)]
        token: u64,
        text: String,
    },

    // =========================================================================
    // Remote → Client
    // =========================================================================

    /// Reply to Get: the current note list, in render order.
    #[serde(rename = "GET_BACK")]
    GetBack {
        #[serde(default)]
        token: u64,
        note_list: Vec<Note>,
    },

    /// Reply to Post: the created note including its assigned id.
    #[serde(rename = "POST_BACK")]
    PostBack {
        #[serde(default)]
        token: u64,
        #[serde(flatten)]
        note: Note,
    },

    /// Reply to Edit: success notice only, no note body.
    #[serde(rename = "EDIT_BACK")]
    EditBack {
        #[serde(default)]
        token: u64,
    },

    /// Reply to Delete: success notice only.
    #[serde(rename = "DELETE_BACK")]
    DeleteBack {
        #[serde(default)]
        token: u64,
    },

    /// Reply to Search: the matching notes, in render order.
    #[serde(rename = "SEARCH_BACK")]
    SearchBack {
        #[serde(default)]
        token: u64,
        note_list: Vec<Note>,
    },
}

// =============================================================================
// Helper Functions
// =============================================================================

impl Envelope {
    /// Returns the wire method name (for logging).
    pub fn method_name(&self) -> &'static str {
        match self {
            Envelope::Get { .. } => "GET",
            Envelope::Post { .. } => "POST",
            Envelope::Edit { .. } => "EDIT",
            Envelope::Delete { .. } => "DELETE",
            Envelope::Search { .. } => "SEARCH",
            Envelope::GetBack { .. } => "GET_BACK",
            Envelope::PostBack { .. } => "POST_BACK",
            Envelope::EditBack { .. } => "EDIT_BACK",
            Envelope::DeleteBack { .. } => "DELETE_BACK",
            Envelope::SearchBack { .. } => "SEARCH_BACK",
        }
    }

    /// Returns the correlation token carried by this envelope.
    pub fn token(&self) -> u64 {
        match *self {
            Envelope::Get { token }
            | Envelope::Post { token, .. }
            | Envelope::Edit { token, .. }
            | Envelope::Delete { token, .. }
            | Envelope::Search { token, .. }
            | Envelope::GetBack { token, .. }
            | Envelope::PostBack { token, .. }
            | Envelope::EditBack { token }
            | Envelope::DeleteBack { token }
            | Envelope::SearchBack { token, .. } => token,
        }
    }

    /// Returns true for remote→client reply methods.
    pub fn is_reply(&self) -> bool {
        matches!(
            self,
            Envelope::GetBack { .. }
                | Envelope::PostBack { .. }
                | Envelope::EditBack { .. }
                | Envelope::DeleteBack { .. }
                | Envelope::SearchBack { .. }
        )
    }

    /// Creates a POST envelope for a new note, timestamped now.
    pub fn post(token: u64, title: String, content: String, tags: Vec<String>) -> Self {
        let now = now_ms();
        Envelope::Post {
            token,
            title,
            content,
            tags,
            created: now,
            changed: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_wire_shape() {
        let json = serde_json::to_string(&Envelope::Get { token: 1 }).unwrap();
        assert!(json.contains("\"method\":\"GET\""));
        assert!(json.contains("\"token\":1"));
    }

    #[test]
    fn test_post_round_trip() {
        let post = Envelope::post(7, "Title".into(), "Body".into(), vec!["a".into()]);
        let json = serde_json::to_string(&post).unwrap();
        assert!(json.contains("\"method\":\"POST\""));

        let parsed: Envelope = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, post);
        assert_eq!(parsed.token(), 7);
    }

    #[test]
    fn test_post_back_flattens_note() {
        let json = r#"{
            "method": "POST_BACK",
            "token": 3,
            "id": 42,
            "title": "t",
            "content": "c",
            "tags": ["x"],
            "created": 100,
            "changed": 100
        }"#;
        let parsed: Envelope = serde_json::from_str(json).unwrap();
        match parsed {
            Envelope::PostBack { token, note } => {
                assert_eq!(token, 3);
                assert_eq!(note.id, Some(42));
                assert_eq!(note.tags, vec!["x"]);
            }
            other => panic!("expected PostBack, got {}", other.method_name()),
        }
    }

    #[test]
    fn test_token_defaults_to_zero() {
        // A token-less server still produces decodable replies.
        let parsed: Envelope = serde_json::from_str(r#"{"method":"EDIT_BACK"}"#).unwrap();
        assert_eq!(parsed, Envelope::EditBack { token: 0 });
    }

    #[test]
    fn test_note_list_replies() {
        let json = r#"{"method":"SEARCH_BACK","token":9,"note_list":[
            {"id":1,"title":"a","content":"b","tags":[],"created":1,"changed":1}
        ]}"#;
        let parsed: Envelope = serde_json::from_str(json).unwrap();
        match parsed {
            Envelope::SearchBack { note_list, .. } => {
                assert_eq!(note_list.len(), 1);
                assert_eq!(note_list[0].id, Some(1));
            }
            other => panic!("expected SearchBack, got {}", other.method_name()),
        }
        assert!(Envelope::SearchBack { token: 0, note_list: vec![] }.is_reply());
        assert!(!Envelope::Get { token: 0 }.is_reply());
    }
}
