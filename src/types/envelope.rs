use serde::{Deserialize, Serialize};

use super::constants::event_types;
use super::error::ProtocolError;

/// The unit of wire exchange: one JSON envelope per text frame.
///
/// `data` is an opaque payload whose shape depends on `kind`; the core never
/// interprets it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Envelope {
    #[serde(rename = "type")]
    pub kind: String,
    pub timestamp: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

impl Envelope {
    /// Creates an envelope stamped with the current time.
    pub fn new(kind: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            kind: kind.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            data,
        }
    }

    /// Creates a keepalive envelope.
    pub fn heartbeat() -> Self {
        Self::new(event_types::HEARTBEAT, serde_json::json!({}))
    }

    /// Whether this envelope is a keepalive frame.
    pub fn is_heartbeat(&self) -> bool {
        self.kind == event_types::HEARTBEAT
    }

    /// Decodes a raw text frame into an envelope.
    ///
    /// An empty `type` field is rejected: every envelope must carry a
    /// non-empty event type.
    pub fn decode(text: &str) -> std::result::Result<Self, ProtocolError> {
        let envelope: Envelope = serde_json::from_str(text)?;
        if envelope.kind.is_empty() {
            return Err(ProtocolError::EmptyType);
        }
        Ok(envelope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_valid_frame() {
        let envelope = Envelope::decode(
            r#"{"type":"price_update","timestamp":"2025-01-02T09:30:00+00:00","data":{"symbol":"005930","price":71200.0}}"#,
        )
        .unwrap();
        assert_eq!(envelope.kind, "price_update");
        assert_eq!(envelope.data["symbol"], "005930");
    }

    #[test]
    fn decode_rejects_non_json() {
        assert!(matches!(
            Envelope::decode("not json at all"),
            Err(ProtocolError::Malformed(_))
        ));
    }

    #[test]
    fn decode_rejects_empty_type() {
        assert!(matches!(
            Envelope::decode(r#"{"type":"","timestamp":"2025-01-02T09:30:00+00:00","data":{}}"#),
            Err(ProtocolError::EmptyType)
        ));
    }

    #[test]
    fn decode_defaults_missing_data() {
        let envelope = Envelope::decode(
            r#"{"type":"session_status","timestamp":"2025-01-02T09:30:00+00:00"}"#,
        )
        .unwrap();
        assert_eq!(envelope.data, serde_json::Value::Null);
    }

    #[test]
    fn heartbeat_round_trip() {
        let heartbeat = Envelope::heartbeat();
        assert!(heartbeat.is_heartbeat());

        let json = serde_json::to_string(&heartbeat).unwrap();
        let decoded = Envelope::decode(&json).unwrap();
        assert!(decoded.is_heartbeat());
    }

    #[test]
    fn serializes_kind_as_type() {
        let envelope = Envelope::new("buy_signal", serde_json::json!({"symbol": "000660"}));
        let json = serde_json::to_string(&envelope).unwrap();
        assert!(json.contains(r#""type":"buy_signal""#));
    }
}
