//! Handler trait and type-erasure machinery.
//!
//! Handlers are plain async functions. A blanket implementation covers
//! every arity from zero up to the full five-parameter command signature,
//! with each parameter supplied through [`FromContext`]. The return value
//! goes through [`IntoHandlerOutcome`], so a handler may return `()` or a
//! `Result` - errors from the latter reach the dispatcher's error hook
//! instead of vanishing.
//!
//! ```rust,ignore
//! // All of these are valid handlers:
//! async fn zero_arg() {}
//! async fn ctx_only(ctx: Arc<Context>) {}
//! async fn full(
//!     ctx: Arc<Context>,
//!     member: Option<Member>,
//!     text: MessageText,
//!     name: Username,
//!     id: UserId,
//! ) -> FrameworkResult<()> { Ok(()) }
//! ```

use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

pub use futures::future::BoxFuture;

use crate::context::Context;
use crate::error::FrameworkError;
use crate::extractor::FromContext;

/// Converts a handler's return value into the dispatch outcome.
pub trait IntoHandlerOutcome {
    /// Performs the conversion.
    fn into_outcome(self) -> Result<(), FrameworkError>;
}

impl IntoHandlerOutcome for () {
    fn into_outcome(self) -> Result<(), FrameworkError> {
        Ok(())
    }
}

impl IntoHandlerOutcome for Result<(), FrameworkError> {
    fn into_outcome(self) -> Result<(), FrameworkError> {
        self
    }
}

/// The core trait for event and command handlers.
///
/// Implemented automatically for async functions whose parameters all
/// implement [`FromContext`]. The type parameter `T` is a marker encoding
/// the parameter tuple and return type, which keeps the blanket
/// implementations from overlapping.
pub trait Handler<T>: Clone + Send + Sync + 'static {
    /// The future returned by calling this handler.
    type Future: Future<Output = Result<(), FrameworkError>> + Send + 'static;

    /// Calls the handler against the given context.
    fn call(self, ctx: Arc<Context>) -> Self::Future;
}

// ============================================================================
// Type erasure
// ============================================================================

/// Wrapper that carries a handler function together with its marker type.
pub struct HandlerFn<F, T> {
    f: F,
    _marker: PhantomData<fn() -> T>,
}

impl<F, T> HandlerFn<F, T> {
    /// Wraps a handler function.
    pub fn new(f: F) -> Self {
        Self {
            f,
            _marker: PhantomData,
        }
    }
}

impl<F: Clone, T> Clone for HandlerFn<F, T> {
    fn clone(&self) -> Self {
        Self {
            f: self.f.clone(),
            _marker: PhantomData,
        }
    }
}

/// Object-safe handler trait used for storage in registries.
pub trait ErasedHandler: Send + Sync {
    /// Executes the handler with the given context.
    fn call(&self, ctx: Arc<Context>) -> BoxFuture<'static, Result<(), FrameworkError>>;
}

/// A type-erased, shareable handler.
pub type BoxedHandler = Arc<dyn ErasedHandler>;

impl<F, T> ErasedHandler for HandlerFn<F, T>
where
    F: Handler<T>,
    T: 'static,
{
    fn call(&self, ctx: Arc<Context>) -> BoxFuture<'static, Result<(), FrameworkError>> {
        let f = self.f.clone();
        Box::pin(async move { f.call(ctx).await })
    }
}

/// Erases a handler function into a [`BoxedHandler`].
pub fn into_handler<F, T>(f: F) -> BoxedHandler
where
    F: Handler<T>,
    T: 'static,
{
    Arc::new(HandlerFn::new(f))
}

// ============================================================================
// Blanket implementations
// ============================================================================

impl<F, Fut, R> Handler<((), R)> for F
where
    F: FnOnce() -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoHandlerOutcome + 'static,
{
    type Future = BoxFuture<'static, Result<(), FrameworkError>>;

    fn call(self, _ctx: Arc<Context>) -> Self::Future {
        Box::pin(async move { (self)().await.into_outcome() })
    }
}

macro_rules! impl_handler {
    ($($ty:ident),+) => {
        #[allow(non_snake_case)]
        impl<F, Fut, R, $($ty,)+> Handler<($($ty,)+ R)> for F
        where
            F: FnOnce($($ty,)+) -> Fut + Clone + Send + Sync + 'static,
            Fut: Future<Output = R> + Send + 'static,
            R: IntoHandlerOutcome + 'static,
            $( $ty: FromContext + Send + 'static, )+
        {
            type Future = BoxFuture<'static, Result<(), FrameworkError>>;

            fn call(self, ctx: Arc<Context>) -> Self::Future {
                Box::pin(async move {
                    $( let $ty = $ty::from_context(&ctx)?; )+
                    (self)($($ty,)+).await.into_outcome()
                })
            }
        }
    };
}

// The fixed parameter vocabulary caps handler arity at five.
impl_handler!(T1);
impl_handler!(T1, T2);
impl_handler!(T1, T2, T3);
impl_handler!(T1, T2, T3, T4);
impl_handler!(T1, T2, T3, T4, T5);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;
    use crate::extractor::{MessageText, UserId, Username};
    use crate::reply_wait::ReplyWaitCache;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use trellis_core::entities::{Author, Member, Message};
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

    fn test_context() -> Arc<Context> {
        let message = Message {
            message_id: "m1".into(),
            chat_id: "c1".into(),
            com_id: 7,
            content: Some("!ping extra".into()),
            author: Some(Author {
                user_id: "u1".into(),
                username: Some("Ada".into()),
            }),
            mentioned_user_ids: Vec::new(),
        };
        Arc::new(Context::new(
            message,
            Arc::new(NullClient),
            false,
            Arc::new(ReplyWaitCache::new()),
        ))
    }

    #[tokio::test]
    async fn zero_arg_handler_runs() {
        static CALLS: AtomicUsize = AtomicUsize::new(0);
        async fn h() {
            CALLS.fetch_add(1, Ordering::SeqCst);
        }

        into_handler(h).call(test_context()).await.unwrap();
        assert_eq!(CALLS.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn full_arity_handler_receives_every_parameter() {
        async fn h(
            _ctx: Arc<Context>,
            member: Member,
            text: MessageText,
            name: Username,
            id: UserId,
        ) {
            assert_eq!(member.user_id, "u1");
            assert_eq!(text.0.as_deref(), Some("!ping extra"));
            assert_eq!(name.0.as_deref(), Some("Ada"));
            assert_eq!(id.0.as_deref(), Some("u1"));
        }

        into_handler(h).call(test_context()).await.unwrap();
    }

    #[tokio::test]
    async fn fallible_handler_surfaces_its_error() {
        async fn h(_ctx: Arc<Context>) -> Result<(), FrameworkError> {
            Err(FrameworkError::Handler("boom".into()))
        }

        let outcome = into_handler(h).call(test_context()).await;
        assert!(matches!(outcome, Err(FrameworkError::Handler(_))));
    }

    #[tokio::test]
    async fn optional_parameter_never_fails_extraction() {
        async fn h(member: Option<Member>) {
            assert!(member.is_some());
        }

        into_handler(h).call(test_context()).await.unwrap();
    }
}
