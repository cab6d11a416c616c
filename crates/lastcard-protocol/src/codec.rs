//! Codec trait and implementations for serializing/deserializing messages.
//!
//! A "codec" (coder/decoder) converts between Rust types and raw bytes.
//! The lobby doesn't care HOW intents and views are serialized; it only
//! needs something that implements [`Codec`]. Today that is
//! [`JsonCodec`], which browsers read natively.

use serde::{de::DeserializeOwned, Serialize};

use crate::ProtocolError;

/// A codec that can encode Rust types to bytes and decode bytes back.
///
/// `Send + Sync + 'static` because one codec instance is shared by every
/// connection task.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed,
    /// incomplete, or don't match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// Behind the `json` feature flag (enabled by default).
///
/// ## Example
///
/// ```rust
/// use lastcard_protocol::{Codec, Intent, JsonCodec, RoomCode};
///
/// let codec = JsonCodec;
/// let intent = Intent::DrawCard { code: RoomCode::new("K7QX2") };
///
/// let bytes = codec.encode(&intent).unwrap();
/// let decoded: Intent = codec.decode(&bytes).unwrap();
/// assert_eq!(intent, decoded);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use super::*;
    use crate::{Intent, ServerMessage};

    #[test]
    fn test_json_codec_decodes_client_intent() {
        let intent: Intent = JsonCodec.decode(br#"{"type":"create-room"}"#).unwrap();
        assert_eq!(intent, Intent::CreateRoom);
    }

    #[test]
    fn test_json_codec_rejects_unknown_intent() {
        let result: Result<Intent, _> = JsonCodec.decode(br#"{"type":"shuffle-deck"}"#);
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_json_codec_rejects_truncated_input() {
        let result: Result<Intent, _> = JsonCodec.decode(br#"{"type":"draw-c"#);
        let err = result.unwrap_err();
        assert!(err.to_string().starts_with("decode failed"));
    }

    #[test]
    fn test_json_codec_encodes_server_message() {
        let bytes = JsonCodec
            .encode(&ServerMessage::Error {
                message: "room is full".into(),
            })
            .unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains(r#""type":"error""#));
    }
}
