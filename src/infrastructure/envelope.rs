use serde::{Deserialize, Serialize};
use std::fmt;

/// Wire id used when an envelope carries no peer address
pub const UNADDRESSED: i64 = -1;

/// Message types carried over the signaling connections.
///
/// Both connections (media signaling and chat) share the envelope shape
/// but use disjoint kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnvelopeKind {
    /// Identity announcement on the media-signaling connection
    #[serde(rename = "webrtcSignal")]
    WebrtcSignal,
    /// Identity announcement on the chat connection
    #[serde(rename = "chatSignal")]
    ChatSignal,
    /// Negotiation payload addressed to a peer slot
    #[serde(rename = "webrtc")]
    Webrtc,
    /// Roster growth: `Id` is the number of joining viewers
    #[serde(rename = "newPeer")]
    NewPeer,
    /// Roster shrink: `Id` is the number of leaving viewers
    #[serde(rename = "deletePeer")]
    DeletePeer,
    /// Relay-bound request to take over the presenter role
    #[serde(rename = "beTeacher")]
    BeTeacher,
    /// Relay-to-client demotion to viewer
    #[serde(rename = "beStudent")]
    BeStudent,
    /// Chat text with attribution
    #[serde(rename = "chatMessage")]
    ChatMessage,
}

impl EnvelopeKind {
    pub fn wire_name(&self) -> &'static str {
        match self {
            EnvelopeKind::WebrtcSignal => "webrtcSignal",
            EnvelopeKind::ChatSignal => "chatSignal",
            EnvelopeKind::Webrtc => "webrtc",
            EnvelopeKind::NewPeer => "newPeer",
            EnvelopeKind::DeletePeer => "deletePeer",
            EnvelopeKind::BeTeacher => "beTeacher",
            EnvelopeKind::BeStudent => "beStudent",
            EnvelopeKind::ChatMessage => "chatMessage",
        }
    }
}

impl fmt::Display for EnvelopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.wire_name())
    }
}

/// JSON message unit exchanged with the relay.
///
/// `Id` meaning depends on the kind: target/source slot index for
/// `webrtc`, a count for `newPeer`/`deletePeer`, otherwise unused. The
/// relay encodes a missing `Id` as zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(rename = "Type")]
    pub kind: EnvelopeKind,

    #[serde(rename = "Id", default)]
    pub id: i64,

    #[serde(rename = "Data", default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl Envelope {
    /// Negotiation payload addressed to `id`
    pub fn webrtc(id: i64, payload: serde_json::Value) -> Self {
        Self {
            kind: EnvelopeKind::Webrtc,
            id,
            data: Some(payload),
        }
    }

    /// Relay-bound presenter takeover request
    pub fn be_teacher() -> Self {
        Self {
            kind: EnvelopeKind::BeTeacher,
            id: UNADDRESSED,
            data: None,
        }
    }

    /// Identity announcement (`webrtcSignal` or `chatSignal`)
    pub fn identity(kind: EnvelopeKind, who: &str) -> Self {
        Self {
            kind,
            id: UNADDRESSED,
            data: Some(serde_json::json!({ "who": who })),
        }
    }

    /// Chat text with attribution
    pub fn chat_message(username: &str, message: &str) -> Self {
        Self {
            kind: EnvelopeKind::ChatMessage,
            id: UNADDRESSED,
            data: Some(serde_json::json!({
                "username": username,
                "message": message,
            })),
        }
    }
}

/// Identity announcement payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    pub who: String,
}

/// Chat payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub username: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_field_names() {
        let envelope = Envelope::webrtc(3, serde_json::json!({"type": "offer"}));
        let json = serde_json::to_string(&envelope).unwrap();

        assert!(json.contains(r#""Type":"webrtc""#));
        assert!(json.contains(r#""Id":3"#));
        assert!(json.contains(r#""Data""#));
    }

    #[test]
    fn missing_id_defaults_to_zero() {
        // The relay omits Id on some envelopes; Go's zero value is 0
        let envelope: Envelope = serde_json::from_str(r#"{"Type":"beStudent"}"#).unwrap();
        assert_eq!(envelope.kind, EnvelopeKind::BeStudent);
        assert_eq!(envelope.id, 0);
        assert!(envelope.data.is_none());
    }

    #[test]
    fn data_is_omitted_when_absent() {
        let json = serde_json::to_string(&Envelope::be_teacher()).unwrap();
        assert!(!json.contains("Data"));
        assert!(json.contains(r#""Id":-1"#));
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let result = serde_json::from_str::<Envelope>(r#"{"Type":"bogus","Id":0}"#);
        assert!(result.is_err());
    }

    #[test]
    fn identity_payload_round_trip() {
        let envelope = Envelope::identity(EnvelopeKind::WebrtcSignal, "teacher");
        let identity: Identity = serde_json::from_value(envelope.data.unwrap()).unwrap();
        assert_eq!(identity.who, "teacher");
    }

    #[test]
    fn chat_payload_round_trip() {
        let envelope = Envelope::chat_message("lion", "hello");
        let data = envelope.data.unwrap();
        let message: ChatMessage = serde_json::from_value(data).unwrap();
        assert_eq!(message.username, "lion");
        assert_eq!(message.message, "hello");
    }
}
