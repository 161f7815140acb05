//! Outbound message request construction.
//!
//! [`MessageRequest`] builds the JSON body for a chat-message send. Fields
//! left unset are omitted from the serialized body entirely, matching the
//! platform's expectation that absent keys are simply not sent.

use serde::Serialize;
use serde_json::Value;

use crate::error::{ApiError, ApiResult};

/// Message type code for an audio message.
pub const TYPE_AUDIO: i64 = 2;
/// Message type code for a sticker message.
pub const TYPE_STICKER: i64 = 3;
/// Media type code for image/gif content.
pub const MEDIA_TYPE_IMAGE: i64 = 100;
/// Media type code for audio content.
pub const MEDIA_TYPE_AUDIO: i64 = 110;

/// Builder for the JSON body of an outbound chat message.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    kind: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    media_type: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    media_value: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    media_upload_value: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    media_upload_value_content_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    sticker_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    reply_message_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    attached_object: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    extensions: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    uid: Option<String>,
}

impl MessageRequest {
    /// Creates an empty request body.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the text content.
    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Sets the message type code.
    pub fn kind(mut self, kind: i64) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Sets the media type code.
    pub fn media_type(mut self, media_type: i64) -> Self {
        self.media_type = Some(media_type);
        self
    }

    /// Sets a media reference value (e.g. a sticker URI).
    pub fn media_value(mut self, value: impl Into<String>) -> Self {
        self.media_value = Some(value.into());
        self
    }

    /// Sets the inline media upload value (base64 payload).
    pub fn media_upload_value(mut self, value: impl Into<String>) -> Self {
        self.media_upload_value = Some(value.into());
        self
    }

    /// Sets the content type of the inline media upload.
    pub fn media_upload_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.media_upload_value_content_type = Some(content_type.into());
        self
    }

    /// Sets the sticker id.
    pub fn sticker_id(mut self, id: impl Into<String>) -> Self {
        self.sticker_id = Some(id.into());
        self
    }

    /// Marks this message as a reply to an existing message.
    pub fn reply_to(mut self, message_id: impl Into<String>) -> Self {
        self.reply_message_id = Some(message_id.into());
        self
    }

    /// Attaches a rich embed object.
    pub fn attached_object(mut self, object: Value) -> Self {
        self.attached_object = Some(object);
        self
    }

    /// Sets the sender uid.
    pub fn uid(mut self, uid: impl Into<String>) -> Self {
        self.uid = Some(uid.into());
        self
    }

    /// Sets the mention extension from a list of user ids.
    ///
    /// An empty list leaves the extensions field unset.
    pub fn mentioned(mut self, user_ids: &[String]) -> Self {
        if user_ids.is_empty() {
            return self;
        }
        let array: Vec<Value> = user_ids
            .iter()
            .map(|uid| serde_json::json!({ "uid": uid }))
            .collect();
        self.extensions = Some(serde_json::json!({ "mentionedArray": array }));
        self
    }

    /// Sets the link-snippet extension.
    pub fn link_snippet(mut self, snippet: Value) -> Self {
        let mut ext = self
            .extensions
            .take()
            .unwrap_or_else(|| serde_json::json!({}));
        if let Some(map) = ext.as_object_mut() {
            map.insert("linkSnippetList".to_string(), Value::Array(vec![snippet]));
        }
        self.extensions = Some(ext);
        self
    }

    /// Serializes the body, omitting unset fields.
    pub fn into_body(self) -> ApiResult<Value> {
        serde_json::to_value(self).map_err(ApiError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_fields_are_omitted() {
        let body = MessageRequest::new()
            .content("hello")
            .uid("bot")
            .into_body()
            .unwrap();
        let map = body.as_object().unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map["content"], "hello");
        assert_eq!(map["uid"], "bot");
    }

    #[test]
    fn mentions_build_the_extension_array() {
        let body = MessageRequest::new()
            .content("hi")
            .mentioned(&["u1".to_string(), "u2".to_string()])
            .into_body()
            .unwrap();
        let array = &body["extensions"]["mentionedArray"];
        assert_eq!(array[0]["uid"], "u1");
        assert_eq!(array[1]["uid"], "u2");
    }

    #[test]
    fn empty_mention_list_leaves_extensions_unset() {
        let body = MessageRequest::new().content("hi").into_body().unwrap();
        assert!(body.get("extensions").is_none());
    }

    #[test]
    fn sticker_request_uses_type_code() {
        let body = MessageRequest::new()
            .kind(TYPE_STICKER)
            .sticker_id("s1")
            .media_value("ndcsticker://s1")
            .into_body()
            .unwrap();
        assert_eq!(body["type"], TYPE_STICKER);
        assert_eq!(body["stickerId"], "s1");
    }
}
