//! Handler parameter extraction.
//!
//! Each handler parameter type implements [`FromContext`], which pulls the
//! value out of the per-event [`Context`]. The vocabulary is fixed: the
//! context itself, the message author as a [`Member`], the message text,
//! the author's username and id, and `Option<T>` over any of them for
//! handlers that tolerate absence.

use std::sync::Arc;

use trellis_core::entities::Member;

use crate::context::Context;
use crate::error::{FrameworkError, FrameworkResult};

/// Types that can be produced from a [`Context`] for handler injection.
pub trait FromContext: Sized {
    /// Extracts the value, failing when the context cannot supply it.
    fn from_context(ctx: &Arc<Context>) -> FrameworkResult<Self>;
}

impl FromContext for Arc<Context> {
    fn from_context(ctx: &Arc<Context>) -> FrameworkResult<Self> {
        Ok(Arc::clone(ctx))
    }
}

impl FromContext for Member {
    fn from_context(ctx: &Arc<Context>) -> FrameworkResult<Self> {
        ctx.message()
            .author
            .as_ref()
            .map(Member::from)
            .ok_or_else(|| FrameworkError::Extract("message carries no author".into()))
    }
}

/// The text a handler should see for the triggering message.
///
/// For commands this is the remainder after the command name; for plain
/// events it is the full message content. `None` when the message carries
/// no text at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageText(pub Option<String>);

impl FromContext for MessageText {
    fn from_context(ctx: &Arc<Context>) -> FrameworkResult<Self> {
        Ok(Self(ctx.handler_text()))
    }
}

/// The author's display name, when the event carries one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Username(pub Option<String>);

impl FromContext for Username {
    fn from_context(ctx: &Arc<Context>) -> FrameworkResult<Self> {
        Ok(Self(
            ctx.message()
                .author
                .as_ref()
                .and_then(|author| author.username.clone()),
        ))
    }
}

/// The author's user id, when the event carries one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserId(pub Option<String>);

impl FromContext for UserId {
    fn from_context(ctx: &Arc<Context>) -> FrameworkResult<Self> {
        Ok(Self(
            ctx.message()
                .author
                .as_ref()
                .map(|author| author.user_id.clone()),
        ))
    }
}

// A missing value becomes None instead of a dispatch failure.
impl<T: FromContext> FromContext for Option<T> {
    fn from_context(ctx: &Arc<Context>) -> FrameworkResult<Self> {
        Ok(T::from_context(ctx).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reply_wait::ReplyWaitCache;
    use trellis_core::entities::Message;
    use trellis_core::{ApiResult, Client, Method};

    struct NullClient;

    #[async_trait::async_trait]
    impl Client for NullClient {
        fn user_id(&self) -> &str {
            "bot"
        }

        async fn request(
            &self,
            _method: Method,
            _path: &str,
            _body: Option<serde_json::Value>,
        ) -> ApiResult<serde_json::Value> {
            Ok(serde_json::json!({}))
        }

        async fn upload(
            &self,
            _path: &str,
            _content_type: &str,
            _data: Vec<u8>,
        ) -> ApiResult<serde_json::Value> {
            Ok(serde_json::json!({}))
        }

        async fn download(&self, _url: &str) -> ApiResult<Vec<u8>> {
            Ok(Vec::new())
        }
    }

    fn authorless_context() -> Arc<Context> {
        let message = Message {
            message_id: "m1".into(),
            chat_id: "c1".into(),
            com_id: 0,
            content: None,
            author: None,
            mentioned_user_ids: Vec::new(),
        };
        Arc::new(Context::new(
            message,
            Arc::new(NullClient),
            false,
            Arc::new(ReplyWaitCache::new()),
        ))
    }

    #[test]
    fn member_extraction_fails_without_an_author() {
        let ctx = authorless_context();
        assert!(matches!(
            Member::from_context(&ctx),
            Err(FrameworkError::Extract(_))
        ));
    }

    #[test]
    fn optional_member_becomes_none_without_an_author() {
        let ctx = authorless_context();
        assert_eq!(Option::<Member>::from_context(&ctx).unwrap(), None);
    }

    #[test]
    fn username_and_id_are_none_without_an_author() {
        let ctx = authorless_context();
        assert_eq!(Username::from_context(&ctx).unwrap().0, None);
        assert_eq!(UserId::from_context(&ctx).unwrap().0, None);
    }
}
