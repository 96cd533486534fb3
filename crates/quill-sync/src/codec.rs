//! # Message Codec
//!
//! Pure, stateless conversion between [`Envelope`] values and their JSON
//! text representation.
//!
//! The protocol is not versioned and not validated beyond the presence of a
//! recognizable `method` tag: anything that fails to decode is reported as
//! [`Decoded::Unrecognized`] and the caller drops it. A malformed frame is
//! never fatal.

use tracing::debug;

use crate::error::SyncResult;
use crate::protocol::Envelope;

/// Outcome of decoding one incoming text frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    /// A well-formed envelope.
    Envelope(Envelope),

    /// Malformed JSON or an unknown method tag; to be silently ignored.
    Unrecognized,
}

/// Serializes an envelope to its wire representation.
pub fn encode(envelope: &Envelope) -> SyncResult<String> {
    Ok(serde_json::to_string(envelope)?)
}

/// Deserializes one text frame.
pub fn decode(text: &str) -> Decoded {
    match serde_json::from_str::<Envelope>(text) {
        Ok(envelope) => Decoded::Envelope(envelope),
        Err(e) => {
            debug!(%e, "Unrecognized frame");
            Decoded::Unrecognized
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_decode_round_trip() {
        let env = Envelope::Search {
            token: 5,
            text: "rust".into(),
        };
        let wire = encode(&env).unwrap();
        assert_eq!(decode(&wire), Decoded::Envelope(env));
    }

    #[test]
    fn test_unknown_method_is_unrecognized() {
        assert_eq!(decode(r#"{"method":"PATCH","id":1}"#), Decoded::Unrecognized);
    }

    #[test]
    fn test_malformed_json_is_unrecognized() {
        assert_eq!(decode("not json at all"), Decoded::Unrecognized);
        assert_eq!(decode(r#"{"no_method":true}"#), Decoded::Unrecognized);
    }
}
