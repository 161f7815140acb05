//! Platform entity models.
//!
//! These structs mirror the JSON shapes the chat platform emits. The
//! framework treats them as opaque data - it reads identifiers and text
//! content, and never re-derives platform semantics from them.

use serde::{Deserialize, Serialize};

/// The author of a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    /// The author's user identifier.
    #[serde(rename = "uid")]
    pub user_id: String,

    /// The author's display name, if the platform included one.
    #[serde(default, rename = "nickname")]
    pub username: Option<String>,
}

/// A derived member view of a message author.
///
/// Handlers that only care about "who" receive this instead of the full
/// triggering message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    /// The member's user identifier.
    pub user_id: String,
    /// The member's display name, if known.
    pub username: Option<String>,
}

impl From<&Author> for Member {
    fn from(author: &Author) -> Self {
        Self {
            user_id: author.user_id.clone(),
            username: author.username.clone(),
        }
    }
}

/// A chat message as received from the platform.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Unique message identifier.
    pub message_id: String,

    /// The chat thread this message belongs to.
    pub chat_id: String,

    /// The community the chat belongs to. `0` means the global scope.
    #[serde(default)]
    pub com_id: u64,

    /// Text content; absent for media-only messages.
    #[serde(default)]
    pub content: Option<String>,

    /// The author; absent for system-generated messages.
    #[serde(default)]
    pub author: Option<Author>,

    /// User ids mentioned in this message.
    #[serde(default)]
    pub mentioned_user_ids: Vec<String>,
}

/// A moderation or role notification (host transfer, cohost changes).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    /// The chat the notification refers to.
    pub chat_id: String,

    /// The community the chat belongs to.
    #[serde(default)]
    pub com_id: u64,
}

/// An online-presence snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct OnlineMembers {
    /// Number of users currently online.
    #[serde(default)]
    pub users_online: u64,

    /// The community the snapshot refers to.
    #[serde(default)]
    pub com_id: u64,
}

/// The parsed response of a successful message send.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SentMessage {
    /// Identifier assigned to the sent message.
    #[serde(default)]
    pub message_id: String,

    /// The chat the message was sent to.
    #[serde(default)]
    pub chat_id: String,
}

/// A generic platform API response envelope.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse {
    /// Platform status code; `0` means success.
    #[serde(default, rename = "api:statuscode")]
    pub status_code: i64,

    /// Status message, if any.
    #[serde(default, rename = "api:message")]
    pub message: Option<String>,

    /// Uploaded media reference returned by upload endpoints.
    #[serde(default)]
    pub media_value: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_deserializes_with_missing_optionals() {
        let raw = r#"{"messageId":"m1","chatId":"c1"}"#;
        let msg: Message = serde_json::from_str(raw).unwrap();
        assert_eq!(msg.message_id, "m1");
        assert_eq!(msg.com_id, 0);
        assert!(msg.content.is_none());
        assert!(msg.author.is_none());
    }

    #[test]
    fn member_view_derives_from_author() {
        let author = Author {
            user_id: "u1".into(),
            username: Some("Ada".into()),
        };
        let member = Member::from(&author);
        assert_eq!(member.user_id, "u1");
        assert_eq!(member.username.as_deref(), Some("Ada"));
    }
}
