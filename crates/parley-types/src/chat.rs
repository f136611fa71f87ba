//! Conversation and message types for Parley.
//!
//! A [`Conversation`] is a named, owned sequence of chat turns plus its
//! provider configuration (model, system prompt). Messages are append-only;
//! whole-conversation deletion is the only destructive operation.

use std::collections::BTreeMap;

use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::llm::{ChatTurn, TokenUsage};

// Re-export MessageRole from the llm module (used in both chat and llm contexts).
pub use crate::llm::MessageRole;

/// Serde support for second-precision `YYYY-MM-DDTHH:MM:SSZ` timestamps.
///
/// Stored documents carry this exact format; RFC 3339 strings are accepted
/// on read for compatibility with hand-edited files.
pub mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

    pub fn serialize<S>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&dt.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&s, FORMAT)
            .map(|naive| naive.and_utc())
            .or_else(|_| DateTime::parse_from_rfc3339(&s).map(|dt| dt.with_timezone(&Utc)))
            .map_err(serde::de::Error::custom)
    }
}

/// Title given to conversations nobody has named yet.
pub const DEFAULT_TITLE: &str = "New Conversation";

/// Current UTC time truncated to second precision.
pub fn utc_now() -> DateTime<Utc> {
    let now = Utc::now();
    now.with_nanosecond(0).unwrap_or(now)
}

/// Keep only the characters a conversation id may contain
/// (alphanumerics plus `-`, `_`, `.`).
pub fn sanitize_id(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        .collect()
}

/// Whether `id` is non-empty and contains only permitted characters.
pub fn is_valid_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

/// Display metadata for one participant role key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub name: String,
}

/// The default `{user, assistant}` participant mapping.
pub fn default_participants() -> BTreeMap<String, Participant> {
    BTreeMap::from([
        (
            "user".to_string(),
            Participant {
                name: "user".to_string(),
            },
        ),
        (
            "assistant".to_string(),
            Participant {
                name: "assistant".to_string(),
            },
        ),
    ])
}

/// A single message within a conversation.
///
/// Immutable once appended; a message never exists independently of its
/// parent conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
    #[serde(with = "timestamp")]
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, Value>,
    /// Token usage captured on assistant replies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
}

/// A persisted conversation: configuration plus an ordered message log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub conversation_id: String,
    pub title: String,
    pub model: String,
    pub system_prompt: String,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
    /// Absent for anonymous/shared conversations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(default = "default_participants")]
    pub participants: BTreeMap<String, Participant>,
}

impl Conversation {
    /// Construct an empty conversation stamped with the current time.
    pub fn new(
        conversation_id: impl Into<String>,
        title: impl Into<String>,
        model: impl Into<String>,
        system_prompt: impl Into<String>,
        owner: Option<String>,
    ) -> Self {
        let now = utc_now();
        Self {
            conversation_id: conversation_id.into(),
            title: title.into(),
            model: model.into(),
            system_prompt: system_prompt.into(),
            created_at: now,
            updated_at: now,
            owner,
            messages: Vec::new(),
            participants: default_participants(),
        }
    }

    /// Append a message stamped with the current time and refresh `updated_at`.
    pub fn append(
        &mut self,
        role: MessageRole,
        content: impl Into<String>,
        usage: Option<TokenUsage>,
        metadata: Option<BTreeMap<String, Value>>,
    ) {
        self.messages.push(Message {
            role,
            content: content.into(),
            timestamp: utc_now(),
            metadata: metadata.unwrap_or_default(),
            usage,
        });
        self.updated_at = utc_now();
    }

    /// Build the provider message list: the system prompt (when non-empty)
    /// followed by every stored message as a plain role/content pair.
    pub fn prompt_messages(&self) -> Vec<ChatTurn> {
        let mut turns = Vec::with_capacity(self.messages.len() + 1);
        if !self.system_prompt.is_empty() {
            turns.push(ChatTurn {
                role: MessageRole::System,
                content: self.system_prompt.clone(),
            });
        }
        for message in &self.messages {
            turns.push(ChatTurn {
                role: message.role,
                content: message.content.clone(),
            });
        }
        turns
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utc_now_second_precision() {
        let now = utc_now();
        assert_eq!(now.timestamp_subsec_nanos(), 0);
    }

    #[test]
    fn test_timestamp_format_roundtrip() {
        let conv = Conversation::new("trip-1", "trip-1", "gpt-4o-mini", "", None);
        let json = serde_json::to_string(&conv).unwrap();
        let stamp = conv.created_at.format(timestamp::FORMAT).to_string();
        assert!(json.contains(&stamp));
        let parsed: Conversation = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.created_at, conv.created_at);
    }

    #[test]
    fn test_sanitize_id() {
        assert_eq!(sanitize_id("alice/../etc"), "alice..etc");
        assert_eq!(sanitize_id("trip_2024.v1-a"), "trip_2024.v1-a");
        assert_eq!(sanitize_id("!!!"), "");
    }

    #[test]
    fn test_is_valid_id() {
        assert!(is_valid_id("alice_travel-1.0"));
        assert!(!is_valid_id(""));
        assert!(!is_valid_id("has space"));
        assert!(!is_valid_id("slash/char"));
    }

    #[test]
    fn test_append_refreshes_updated_at() {
        let mut conv = Conversation::new("c1", "c1", "gpt-4o-mini", "", None);
        let before = conv.updated_at;
        conv.append(MessageRole::User, "hello", None, None);
        assert_eq!(conv.messages.len(), 1);
        assert!(conv.updated_at >= before);
        assert!(conv.messages[0].metadata.is_empty());
    }

    #[test]
    fn test_prompt_messages_prepends_system() {
        let mut conv = Conversation::new("c1", "c1", "gpt-4o-mini", "Be terse.", None);
        conv.append(MessageRole::User, "hi", None, None);
        conv.append(MessageRole::Assistant, "hello", None, None);

        let turns = conv.prompt_messages();
        assert_eq!(turns.len(), 3);
        assert_eq!(turns[0].role, MessageRole::System);
        assert_eq!(turns[0].content, "Be terse.");
        assert_eq!(turns[1].role, MessageRole::User);
        assert_eq!(turns[2].role, MessageRole::Assistant);
    }

    #[test]
    fn test_prompt_messages_empty_system_prompt_omitted() {
        let mut conv = Conversation::new("c1", "c1", "gpt-4o-mini", "", None);
        conv.append(MessageRole::User, "hi", None, None);
        let turns = conv.prompt_messages();
        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].role, MessageRole::User);
    }

    #[test]
    fn test_default_participants_present_after_deserialize() {
        let json = r#"{
            "conversation_id": "c1",
            "title": "c1",
            "model": "gpt-4o-mini",
            "system_prompt": "",
            "created_at": "2026-01-01T00:00:00Z",
            "updated_at": "2026-01-01T00:00:00Z"
        }"#;
        let conv: Conversation = serde_json::from_str(json).unwrap();
        assert!(conv.participants.contains_key("user"));
        assert!(conv.participants.contains_key("assistant"));
        assert!(conv.owner.is_none());
        assert!(conv.messages.is_empty());
    }
}
