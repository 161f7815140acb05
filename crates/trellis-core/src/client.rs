//! Transport contract.
//!
//! The framework never talks HTTP directly. Every outbound operation is
//! expressed as one call on the injected [`Client`] handle, which the
//! embedding application implements on top of its session layer
//! (authentication, retries, and request signing live there).

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ApiResult;

/// HTTP method of an outbound platform request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Delete,
}

impl Method {
    /// The method's wire spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Delete => "DELETE",
        }
    }
}

/// The injected request/transport handle.
///
/// One `Client` call corresponds to exactly one HTTP-shaped request. The
/// framework builds paths and bodies; the implementation owns everything
/// from there down.
#[async_trait]
pub trait Client: Send + Sync {
    /// The bot account's own user identifier.
    fn user_id(&self) -> &str;

    /// Issues a platform API request and returns the parsed JSON response.
    async fn request(&self, method: Method, path: &str, body: Option<Value>) -> ApiResult<Value>;

    /// Uploads raw media bytes to the given path, returning the response.
    async fn upload(&self, path: &str, content_type: &str, data: Vec<u8>) -> ApiResult<Value>;

    /// Fetches raw bytes from an external URL (media sources).
    async fn download(&self, url: &str) -> ApiResult<Vec<u8>>;
}

/// Builds the community scope segment of an API path.
///
/// Community `0` is the global scope and maps to `"g"`; any other
/// community maps to `"x{com_id}"`.
pub fn community_scope(com_id: u64) -> String {
    if com_id == 0 {
        "g".to_string()
    } else {
        format!("x{com_id}")
    }
}
