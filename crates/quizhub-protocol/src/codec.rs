//! Codec seam between event types and websocket text frames.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// Turns event types into text frames and back.
///
/// The gateway does not care how events are spelled on the wire; it only
/// needs something that implements this trait. Swapping the format (e.g.
/// a compact binary codec over binary frames) is a codec change, not a
/// gateway change.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into one text frame.
    fn encode<T: Serialize>(&self, value: &T) -> Result<String, ProtocolError>;

    /// Deserializes one text frame back into a value.
    fn decode<T: DeserializeOwned>(&self, text: &str) -> Result<T, ProtocolError>;
}

/// JSON codec — the format the browser client speaks.
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<String, ProtocolError> {
        serde_json::to_string(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, text: &str) -> Result<T, ProtocolError> {
        serde_json::from_str(text).map_err(ProtocolError::Decode)
    }
}
