//! Per-event context handed to handlers.
//!
//! A [`Context`] wraps the triggering [`Message`] together with the shared
//! transport client and the reply-wait cache. Every outbound operation a
//! handler performs during an event goes through here.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{Value, json};
use tracing::{debug, warn};

use trellis_core::entities::{Author, Message, SentMessage};
use trellis_core::payload::{
    MEDIA_TYPE_AUDIO, MEDIA_TYPE_IMAGE, MessageRequest, TYPE_AUDIO, TYPE_STICKER,
};
use trellis_core::{ApiError, ApiResult, Client, Method, MediaSource, community_scope, media};

use crate::error::{FrameworkError, FrameworkResult};
use crate::reply_wait::ReplyWaitCache;

const STICKER_URI_PREFIX: &str = "ndcsticker://";

/// Optional knobs for [`Context::send_with`] and [`Context::reply_with`].
#[derive(Debug, Clone, Default)]
pub struct SendOptions {
    /// Seconds after which the sent message is deleted again.
    pub delete_after: Option<u64>,
    /// User ids to mention.
    pub mentioned: Vec<String>,
}

/// Per-event façade over the message, the client and the reply-wait cache.
pub struct Context {
    message: Message,
    client: Arc<dyn Client>,
    intents: bool,
    reply_wait: Arc<ReplyWaitCache>,
    /// Set by the command router to the text after the command name.
    command_text: parking_lot::Mutex<Option<String>>,
}

impl Context {
    /// Builds a context for one event.
    pub fn new(
        message: Message,
        client: Arc<dyn Client>,
        intents: bool,
        reply_wait: Arc<ReplyWaitCache>,
    ) -> Self {
        Self {
            message,
            client,
            intents,
            reply_wait,
            command_text: parking_lot::Mutex::new(None),
        }
    }

    /// The triggering message.
    pub fn message(&self) -> &Message {
        &self.message
    }

    /// The message author, when the event carries one.
    pub fn author(&self) -> Option<&Author> {
        self.message.author.as_ref()
    }

    /// The chat the event happened in.
    pub fn chat_id(&self) -> &str {
        &self.message.chat_id
    }

    /// The community id. Zero means the global scope.
    pub fn com_id(&self) -> u64 {
        self.message.com_id
    }

    /// The path scope for this event's community.
    pub fn community_scope(&self) -> String {
        community_scope(self.message.com_id)
    }

    /// The shared transport client.
    pub fn client(&self) -> &Arc<dyn Client> {
        &self.client
    }

    /// Overrides the text handlers see, used by the command router to pass
    /// the remainder after the command name.
    pub fn set_command_text(&self, text: String) {
        *self.command_text.lock() = Some(text);
    }

    /// The text a handler should see: the command remainder when the router
    /// set one, otherwise the full message content.
    pub fn handler_text(&self) -> Option<String> {
        self.command_text
            .lock()
            .clone()
            .or_else(|| self.message.content.clone())
    }

    fn message_endpoint(&self) -> ApiResult<String> {
        if self.message.chat_id.is_empty() {
            return Err(ApiError::NotInContext);
        }
        Ok(format!(
            "/{}/s/chat/thread/{}/message",
            self.community_scope(),
            self.message.chat_id
        ))
    }

    async fn post_message(&self, request: MessageRequest) -> FrameworkResult<SentMessage> {
        let endpoint = self.message_endpoint()?;
        let body = request.uid(self.client.user_id()).into_body()?;
        let response = self.client.request(Method::Post, &endpoint, Some(body)).await?;

        let sent = response
            .get("message")
            .cloned()
            .map(serde_json::from_value)
            .transpose()
            .map_err(ApiError::from)?
            .unwrap_or_default();
        Ok(sent)
    }

    fn spawn_delayed_delete(&self, sent: &SentMessage, delete_after: u64) {
        let client = Arc::clone(&self.client);
        let endpoint = format!(
            "/{}/s/chat/thread/{}/message/{}",
            self.community_scope(),
            self.message.chat_id,
            sent.message_id
        );
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(delete_after)).await;
            if let Err(err) = client.request(Method::Delete, &endpoint, None).await {
                warn!(%endpoint, %err, "delayed delete failed");
            }
        });
    }

    /// Sends a plain text message to the event's chat.
    pub async fn send(&self, content: &str) -> FrameworkResult<SentMessage> {
        self.send_with(content, SendOptions::default()).await
    }

    /// Sends a text message with mentions or a delayed delete.
    pub async fn send_with(
        &self,
        content: &str,
        options: SendOptions,
    ) -> FrameworkResult<SentMessage> {
        let request = MessageRequest::new()
            .content(content)
            .mentioned(&options.mentioned);
        let sent = self.post_message(request).await?;
        if let Some(delete_after) = options.delete_after {
            self.spawn_delayed_delete(&sent, delete_after);
        }
        Ok(sent)
    }

    /// Replies to the triggering message.
    pub async fn reply(&self, content: &str) -> FrameworkResult<SentMessage> {
        self.reply_with(content, SendOptions::default()).await
    }

    /// Replies to the triggering message with mentions or a delayed delete.
    pub async fn reply_with(
        &self,
        content: &str,
        options: SendOptions,
    ) -> FrameworkResult<SentMessage> {
        let request = MessageRequest::new()
            .content(content)
            .reply_to(&self.message.message_id)
            .mentioned(&options.mentioned);
        let sent = self.post_message(request).await?;
        if let Some(delete_after) = options.delete_after {
            self.spawn_delayed_delete(&sent, delete_after);
        }
        Ok(sent)
    }

    /// Deletes a message in the event's chat.
    pub async fn delete(&self, message_id: &str) -> FrameworkResult<()> {
        let endpoint = format!("{}/{message_id}", self.message_endpoint()?);
        self.client.request(Method::Delete, &endpoint, None).await?;
        Ok(())
    }

    /// Joins a chat as the bot. Defaults to the event's chat.
    pub async fn join_chat(&self, chat_id: Option<&str>) -> FrameworkResult<()> {
        self.membership(Method::Post, chat_id).await
    }

    /// Leaves a chat as the bot. Defaults to the event's chat.
    pub async fn leave_chat(&self, chat_id: Option<&str>) -> FrameworkResult<()> {
        self.membership(Method::Delete, chat_id).await
    }

    async fn membership(&self, method: Method, chat_id: Option<&str>) -> FrameworkResult<()> {
        let chat_id = match chat_id {
            Some(id) => id,
            None if !self.message.chat_id.is_empty() => &self.message.chat_id,
            None => return Err(ApiError::NotInContext.into()),
        };
        let endpoint = format!(
            "/{}/s/chat/thread/{chat_id}/member/{}",
            self.community_scope(),
            self.client.user_id()
        );
        self.client.request(method, &endpoint, None).await?;
        Ok(())
    }

    /// Sends an image message.
    pub async fn send_image(&self, image: MediaSource) -> FrameworkResult<SentMessage> {
        let bytes = image.read(self.client.as_ref()).await?;
        self.post_message(
            MessageRequest::new()
                .media_type(MEDIA_TYPE_IMAGE)
                .media_upload_value(media::encode(&bytes)),
        )
        .await
    }

    /// Sends an animated image message.
    pub async fn send_gif(&self, gif: MediaSource) -> FrameworkResult<SentMessage> {
        let bytes = gif.read(self.client.as_ref()).await?;
        self.post_message(
            MessageRequest::new()
                .media_type(MEDIA_TYPE_IMAGE)
                .media_upload_content_type("image/gif")
                .media_upload_value(media::encode(&bytes)),
        )
        .await
    }

    /// Sends an audio message.
    pub async fn send_audio(&self, audio: MediaSource) -> FrameworkResult<SentMessage> {
        let bytes = audio.read(self.client.as_ref()).await?;
        self.post_message(
            MessageRequest::new()
                .kind(TYPE_AUDIO)
                .media_type(MEDIA_TYPE_AUDIO)
                .media_upload_value(media::encode(&bytes)),
        )
        .await
    }

    /// Sends a sticker message. Accepts a bare sticker id or the full
    /// `ndcsticker://` form.
    pub async fn send_sticker(&self, sticker_id: &str) -> FrameworkResult<SentMessage> {
        let sticker_id = sticker_id.strip_prefix(STICKER_URI_PREFIX).unwrap_or(sticker_id);
        self.post_message(
            MessageRequest::new()
                .kind(TYPE_STICKER)
                .sticker_id(sticker_id)
                .media_value(format!("{STICKER_URI_PREFIX}{sticker_id}")),
        )
        .await
    }

    /// Sends a link-snippet message: a preview card built from an image and
    /// a target link.
    pub async fn send_link_snippet(
        &self,
        image: MediaSource,
        message: &str,
        link: &str,
        mentioned: &[String],
    ) -> FrameworkResult<SentMessage> {
        let bytes = image.read(self.client.as_ref()).await?;
        let request = MessageRequest::new()
            .content(message)
            .mentioned(mentioned)
            .link_snippet(json!({
                "mediaType": MEDIA_TYPE_IMAGE,
                "mediaUploadValue": media::encode(&bytes),
                "mediaUploadValueContentType": "image/png",
                "link": link,
            }));
        self.post_message(request).await
    }

    /// Sends an embed message. The image is uploaded first and referenced
    /// by its hosted value.
    pub async fn send_embed(
        &self,
        message: &str,
        title: &str,
        content: &str,
        image: MediaSource,
        link: &str,
        mentioned: &[String],
    ) -> FrameworkResult<SentMessage> {
        let media_value = self.upload_media(image, "image/jpg").await?;
        let request = MessageRequest::new()
            .content(message)
            .mentioned(mentioned)
            .attached_object(json!({
                "title": title,
                "content": content,
                "mediaList": [[MEDIA_TYPE_IMAGE, media_value, Value::Null]],
                "link": link,
            }));
        self.post_message(request).await
    }

    /// Uploads media to the global media store and returns its hosted value.
    pub async fn upload_media(
        &self,
        source: MediaSource,
        content_type: &str,
    ) -> FrameworkResult<String> {
        let bytes = source.read(self.client.as_ref()).await?;
        let response = self
            .client
            .upload("/g/s/media/upload", content_type, bytes)
            .await?;
        response
            .get("mediaValue")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| {
                ApiError::InvalidMedia("upload response carried no media value".into()).into()
            })
    }

    /// Wraps usernames in the directional marks the platform uses to render
    /// mention text, in the order the caller supplies them.
    pub fn prepare_mentions(&self, usernames: &[String]) -> Vec<String> {
        usernames
            .iter()
            .map(|username| format!("\u{200e}\u{200f}@{username}\u{202c}\u{202d}"))
            .collect()
    }

    /// Blocks until the event's author sends `expected` in this chat, or
    /// until `timeout` elapses.
    ///
    /// Returns the triggering message on a match and `None` on mismatch or
    /// timeout. Fails with [`FrameworkError::IntentsDisabled`] when intents
    /// are off, and [`ApiError::NotInContext`] when the event carries no
    /// author to wait on.
    pub async fn wait_for_message(
        &self,
        expected: &str,
        timeout: Duration,
    ) -> FrameworkResult<Option<Message>> {
        if !self.intents {
            return Err(FrameworkError::IntentsDisabled);
        }
        let author = self.author().ok_or(ApiError::NotInContext)?;
        if self.message.chat_id.is_empty() {
            return Err(ApiError::NotInContext.into());
        }

        debug!(chat = %self.message.chat_id, user = %author.user_id, %expected, "waiting for reply");
        let matched = self
            .reply_wait
            .await_reply(&self.message.chat_id, &author.user_id, expected, timeout)
            .await;
        Ok(matched.then(|| self.message.clone()))
    }
}
