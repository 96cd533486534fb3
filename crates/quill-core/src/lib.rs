//! # quill-core: Pure Domain Types for Quill Notes
//!
//! The data model shared by the sync client and any rendering layer.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     Quill Architecture                          │
//! │                                                                 │
//! │  ┌───────────────────────────────────────────────────────────┐  │
//! │  │                 Rendering layer (external)                │  │
//! │  │        implements quill_sync::NoteView, raises intents    │  │
//! │  └─────────────────────────────┬─────────────────────────────┘  │
//! │                                │                                │
//! │  ┌─────────────────────────────▼─────────────────────────────┐  │
//! │  │                  quill-sync (WebSocket client)            │  │
//! │  └─────────────────────────────┬─────────────────────────────┘  │
//! │                                │                                │
//! │  ┌─────────────────────────────▼─────────────────────────────┐  │
//! │  │              ★ quill-core (THIS CRATE) ★                  │  │
//! │  │                                                           │  │
//! │  │      ┌───────────┐              ┌───────────┐             │  │
//! │  │      │   types   │              │   tags    │             │  │
//! │  │      │   Note    │              │ from_text │             │  │
//! │  │      │  NoteId   │              │  to_text  │             │  │
//! │  │      └───────────┘              └───────────┘             │  │
//! │  │                                                           │  │
//! │  │      NO I/O • NO NETWORK • PURE FUNCTIONS                 │  │
//! │  └───────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - The [`Note`](types::Note) record and timestamp helper
//! - [`tags`] - Tag text↔list conversion with the non-empty invariant

// =============================================================================
// Module Declarations
// =============================================================================

pub mod tags;
pub mod types;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use types::{now_ms, Note, NoteId};
