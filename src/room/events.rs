//! Wire message and room event types

use serde::{Deserialize, Serialize};

use crate::error::RelayResult;

/// Text frame exchanged with clients: `{"message": "<text>"}`
///
/// Unknown extra fields on inbound frames are ignored; a missing or
/// non-string `message` is a parse failure.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub message: String,
}

impl ChatMessage {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Parse an inbound text frame
    pub fn parse(text: &str) -> RelayResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Serialize for an outbound text frame
    pub fn to_frame(&self) -> RelayResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Events delivered to every member of a room
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RoomEvent {
    /// A member posted a chat message
    ChatMessage { message: String },
}

impl From<ChatMessage> for RoomEvent {
    fn from(msg: ChatMessage) -> Self {
        RoomEvent::ChatMessage {
            message: msg.message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RelayError;

    #[test]
    fn test_parse_message() {
        let msg = ChatMessage::parse(r#"{"message":"hi"}"#).unwrap();
        assert_eq!(msg.message, "hi");
    }

    #[test]
    fn test_parse_ignores_extra_fields() {
        let msg = ChatMessage::parse(r#"{"message":"hi","user":"bob"}"#).unwrap();
        assert_eq!(msg, ChatMessage::new("hi"));
    }

    #[test]
    fn test_parse_failures() {
        for text in ["not json", "{}", r#"{"msg":"hi"}"#, r#"{"message":42}"#, "[]"] {
            assert!(
                matches!(ChatMessage::parse(text), Err(RelayError::MalformedFrame(_))),
                "{text:?} should fail"
            );
        }
    }

    #[test]
    fn test_outbound_frame_shape() {
        let json = ChatMessage::new("hello?").to_frame().unwrap();
        assert_eq!(json, r#"{"message":"hello?"}"#);
    }

    #[test]
    fn test_room_event_tag() {
        let event: RoomEvent = ChatMessage::new("hi").into();
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""type":"chat_message""#));
    }
}
