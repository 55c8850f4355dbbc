//! Transcript entries and the metadata rendered beside them.

use std::fmt;

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use shared::protocol::ChatResponse;

pub const FALLBACK_REPLY: &str =
    "Sorry, I encountered an error while processing your request. Please try again.";

/// Bookkeeping keys the chat service adds to `extractedInfo`.
const RESERVED_EXTRACTED_KEYS: &[&str] = &["timestamp", "messageLength"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageSender {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub sender: MessageSender,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub response: Option<ChatResponse>,
    pub is_error: bool,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            sender: MessageSender::User,
            content: content.into(),
            created_at,
            response: None,
            is_error: false,
        }
    }

    pub fn reply(response: ChatResponse, created_at: DateTime<Utc>) -> Self {
        Self {
            sender: MessageSender::Assistant,
            content: response.message.clone(),
            created_at,
            response: Some(response),
            is_error: false,
        }
    }

    pub fn fallback(created_at: DateTime<Utc>) -> Self {
        Self {
            sender: MessageSender::Assistant,
            content: FALLBACK_REPLY.to_string(),
            created_at,
            response: None,
            is_error: true,
        }
    }

    pub fn info(&self) -> MessageInfo {
        MessageInfo {
            sender: self.sender,
            time: self
                .created_at
                .with_timezone(&Local)
                .format("%H:%M:%S")
                .to_string(),
            extracted: self
                .response
                .as_ref()
                .map(extracted_keys)
                .unwrap_or_default(),
        }
    }
}

/// Keys of `extractedInfo` worth surfacing, in the order the service sent them.
pub fn extracted_keys(response: &ChatResponse) -> Vec<String> {
    let Some(extracted) = &response.extracted_info else {
        return Vec::new();
    };

    extracted
        .iter()
        .filter(|(key, value)| {
            !value.is_null() && !RESERVED_EXTRACTED_KEYS.contains(&key.as_str())
        })
        .map(|(key, _)| key.clone())
        .collect()
}

/// The line printed under a message bubble.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageInfo {
    pub sender: MessageSender,
    pub time: String,
    pub extracted: Vec<String>,
}

impl fmt::Display for MessageInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.sender {
            MessageSender::User => write!(f, "You • {}", self.time),
            MessageSender::Assistant => {
                write!(f, "AI Assistant • {}", self.time)?;
                if !self.extracted.is_empty() {
                    write!(f, " • Extracted: {}", self.extracted.join(", "))?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::*;

    fn response_with(extracted: Value) -> ChatResponse {
        serde_json::from_value(json!({
            "message": "hello",
            "extractedInfo": extracted,
        }))
        .expect("decode")
    }

    #[test]
    fn drops_reserved_and_null_keys() {
        let response = response_with(json!({
            "mood": "happy",
            "timestamp": 123,
            "messageLength": 2,
            "budget": null,
        }));
        assert_eq!(extracted_keys(&response), vec!["mood".to_string()]);
    }

    #[test]
    fn keeps_falsy_but_present_values() {
        let response = response_with(json!({
            "urgent": false,
            "rooms": 0,
            "notes": "",
        }));
        assert_eq!(extracted_keys(&response), vec!["urgent", "rooms", "notes"]);
    }

    #[test]
    fn missing_extracted_info_yields_nothing() {
        let response = ChatResponse {
            message: "hi".into(),
            ..ChatResponse::default()
        };
        assert!(extracted_keys(&response).is_empty());
    }

    #[test]
    fn assistant_info_line_lists_extracted_keys() {
        let info = MessageInfo {
            sender: MessageSender::Assistant,
            time: "10:15:00".into(),
            extracted: vec!["mood".into(), "zip".into()],
        };
        assert_eq!(
            info.to_string(),
            "AI Assistant • 10:15:00 • Extracted: mood, zip"
        );
    }

    #[test]
    fn fallback_info_line_has_no_annotation() {
        let info = ChatMessage::fallback(Utc::now()).info();
        assert!(info.extracted.is_empty());
        assert!(info.to_string().starts_with("AI Assistant • "));
        assert!(!info.to_string().contains("Extracted"));
    }

    #[test]
    fn user_info_line() {
        let info = ChatMessage::user("hi", Utc::now()).info();
        assert!(info.to_string().starts_with("You • "));
    }
}
