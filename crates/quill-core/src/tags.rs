//! # Tag Conversion
//!
//! Conversion between the comma-separated tag field the user types into and
//! the ordered tag list stored on a note.
//!
//! Invariant enforced here: the list never contains an empty or
//! whitespace-only entry. Order is preserved as entered and duplicates are
//! kept - tags are free-form labels, not a set.

/// Parses a comma-separated tag field into a tag list.
///
/// Splits on `,`, trims each piece, and discards pieces that trim to
/// nothing.
///
/// ```
/// assert_eq!(quill_core::tags::from_text("a, ,b,"), vec!["a", "b"]);
/// ```
pub fn from_text(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .map(str::to_string)
        .collect()
}

/// Joins a tag list back into an editable text field.
///
/// Only used to round-trip tags into an edit widget, never for display.
pub fn to_text(tags: &[String]) -> String {
    tags.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_text_trims_and_drops_empty() {
        assert_eq!(from_text("a, ,b,"), vec!["a", "b"]);
        assert_eq!(from_text("  rust ,  notes  "), vec!["rust", "notes"]);
    }

    #[test]
    fn test_from_text_empty_input() {
        assert!(from_text("").is_empty());
        assert!(from_text("  ,  , ").is_empty());
    }

    #[test]
    fn test_from_text_preserves_order_and_duplicates() {
        assert_eq!(from_text("b,a,b"), vec!["b", "a", "b"]);
    }

    #[test]
    fn test_round_trip() {
        let tags: Vec<String> = vec!["home".into(), "todo".into(), "todo".into()];
        assert_eq!(from_text(&to_text(&tags)), tags);
    }
}
