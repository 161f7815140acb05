//! Normalized event catalog.
//!
//! The transport layer turns raw platform payloads into an [`EventKind`]
//! plus an [`EventPayload`] before handing them to the dispatcher. The
//! catalog is fixed: every inbound event maps to exactly one kind, and
//! each kind carries one of three payload shapes (message-like,
//! notification-like, or presence-like). [`EventKind::Ready`] and
//! [`EventKind::Error`] are internal signaling kinds emitted by the
//! framework itself.

use std::str::FromStr;

use serde_json::Value;

use crate::entities::{Message, Notification, OnlineMembers};

/// The fixed catalog of normalized event names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A plain text chat message.
    TextMessage,
    /// A text message originating from the local console.
    ConsoleTextMessage,
    /// An image message.
    ImageMessage,
    /// A sticker message.
    StickerMessage,
    /// A voice note.
    VoiceMessage,
    /// A shared YouTube link.
    YoutubeMessage,
    /// A message was deleted by its author.
    DeleteMessage,
    /// A message was removed by a moderator.
    ModDeletedMessage,
    /// A user joined the chat.
    MemberJoin,
    /// A user left the chat.
    MemberLeave,
    /// An invite was posted into the chat.
    ChatInvite,
    /// A tip was sent in the chat.
    ChatTip,
    /// A voice chat started.
    VoiceChatStart,
    /// A voice chat ended.
    VoiceChatEnd,
    /// A voice chat invitation went unanswered.
    VoiceChatNotAnswered,
    /// A screening room started.
    ScreenRoomStart,
    /// A screening room ended.
    ScreenRoomEnd,
    /// Online-presence snapshot for a community.
    UserOnline,
    /// The bot was made host of a chat.
    SetYouHost,
    /// The bot was made cohost of a chat.
    SetYouCohost,
    /// The bot's cohost role was removed.
    RemoveYouCohost,
    /// Internal: the bot finished starting up.
    Ready,
    /// Internal: an error escaped a handler.
    Error,
}

impl EventKind {
    /// The event's name on the wire and in logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TextMessage => "text_message",
            Self::ConsoleTextMessage => "console_text_message",
            Self::ImageMessage => "image_message",
            Self::StickerMessage => "sticker_message",
            Self::VoiceMessage => "voice_message",
            Self::YoutubeMessage => "youtube_message",
            Self::DeleteMessage => "delete_message",
            Self::ModDeletedMessage => "mod_deleted_message",
            Self::MemberJoin => "member_join",
            Self::MemberLeave => "member_leave",
            Self::ChatInvite => "chat_invite",
            Self::ChatTip => "chat_tip",
            Self::VoiceChatStart => "voice_chat_start",
            Self::VoiceChatEnd => "voice_chat_end",
            Self::VoiceChatNotAnswered => "voice_chat_not_answered",
            Self::ScreenRoomStart => "screen_room_start",
            Self::ScreenRoomEnd => "screen_room_end",
            Self::UserOnline => "user_online",
            Self::SetYouHost => "set_you_host",
            Self::SetYouCohost => "set_you_cohost",
            Self::RemoveYouCohost => "remove_you_cohost",
            Self::Ready => "ready",
            Self::Error => "error",
        }
    }

    /// Whether this kind's payload is not message-shaped and is handed to
    /// its handler verbatim, without building a dispatch context.
    pub fn is_raw_payload(self) -> bool {
        matches!(
            self,
            Self::UserOnline
                | Self::SetYouHost
                | Self::SetYouCohost
                | Self::RemoveYouCohost
                | Self::Ready
                | Self::Error
        )
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "text_message" => Self::TextMessage,
            "console_text_message" => Self::ConsoleTextMessage,
            "image_message" => Self::ImageMessage,
            "sticker_message" => Self::StickerMessage,
            "voice_message" => Self::VoiceMessage,
            "youtube_message" => Self::YoutubeMessage,
            "delete_message" => Self::DeleteMessage,
            "mod_deleted_message" => Self::ModDeletedMessage,
            "member_join" => Self::MemberJoin,
            "member_leave" => Self::MemberLeave,
            "chat_invite" => Self::ChatInvite,
            "chat_tip" => Self::ChatTip,
            "voice_chat_start" => Self::VoiceChatStart,
            "voice_chat_end" => Self::VoiceChatEnd,
            "voice_chat_not_answered" => Self::VoiceChatNotAnswered,
            "screen_room_start" => Self::ScreenRoomStart,
            "screen_room_end" => Self::ScreenRoomEnd,
            "user_online" => Self::UserOnline,
            "set_you_host" => Self::SetYouHost,
            "set_you_cohost" => Self::SetYouCohost,
            "remove_you_cohost" => Self::RemoveYouCohost,
            "ready" => Self::Ready,
            "error" => Self::Error,
            _ => return Err(()),
        })
    }
}

/// The payload attached to a normalized event.
#[derive(Debug, Clone)]
pub enum EventPayload {
    /// A message-shaped payload.
    Message(Message),
    /// A notification-shaped payload (host/cohost transfers).
    Notification(Notification),
    /// A presence-shaped payload.
    Presence(OnlineMembers),
    /// Free-form data used by internal signaling (`ready`, `error`).
    Signal(Value),
}

impl EventPayload {
    /// Returns the contained message, if this payload is message-shaped.
    pub fn as_message(&self) -> Option<&Message> {
        match self {
            Self::Message(msg) => Some(msg),
            _ => None,
        }
    }

    /// Consumes the payload, returning the message if message-shaped.
    pub fn into_message(self) -> Option<Message> {
        match self {
            Self::Message(msg) => Some(msg),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_round_trips_through_names() {
        for kind in [
            EventKind::TextMessage,
            EventKind::MemberJoin,
            EventKind::VoiceChatNotAnswered,
            EventKind::SetYouCohost,
            EventKind::Error,
        ] {
            assert_eq!(kind.as_str().parse::<EventKind>(), Ok(kind));
        }
    }

    #[test]
    fn unknown_name_is_rejected() {
        assert!("definitely_not_an_event".parse::<EventKind>().is_err());
    }

    #[test]
    fn raw_payload_kinds_skip_the_context_path() {
        assert!(EventKind::UserOnline.is_raw_payload());
        assert!(EventKind::SetYouHost.is_raw_payload());
        assert!(!EventKind::TextMessage.is_raw_payload());
        assert!(!EventKind::MemberJoin.is_raw_payload());
    }
}
