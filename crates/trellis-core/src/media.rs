//! Media source resolution for outbound media messages.

use std::path::PathBuf;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;

use crate::client::Client;
use crate::error::{ApiError, ApiResult};

/// Where the bytes of an outbound media message come from.
#[derive(Debug, Clone)]
pub enum MediaSource {
    /// Fetch from an external URL through the transport collaborator.
    Url(String),
    /// Read from a local file.
    Path(PathBuf),
    /// Use the bytes directly.
    Bytes(Vec<u8>),
}

impl MediaSource {
    /// Builds a source from a string, treating `http(s)://` values as URLs
    /// and everything else as a local path.
    pub fn from_str_like(value: &str) -> Self {
        if value.starts_with("http://") || value.starts_with("https://") {
            Self::Url(value.to_string())
        } else {
            Self::Path(PathBuf::from(value))
        }
    }

    /// Resolves the source into raw bytes.
    ///
    /// Fails with [`ApiError::InvalidMedia`] when the file cannot be read
    /// or the download fails.
    pub async fn read(self, client: &dyn Client) -> ApiResult<Vec<u8>> {
        match self {
            Self::Bytes(bytes) => Ok(bytes),
            Self::Url(url) => client
                .download(&url)
                .await
                .map_err(|err| ApiError::InvalidMedia(format!("{url}: {err}"))),
            Self::Path(path) => tokio::fs::read(&path)
                .await
                .map_err(|err| ApiError::InvalidMedia(format!("{}: {err}", path.display()))),
        }
    }
}

/// Encodes media bytes for inline upload values.
pub fn encode(bytes: &[u8]) -> String {
    BASE64.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_strings_become_url_sources() {
        assert!(matches!(
            MediaSource::from_str_like("https://example.com/a.png"),
            MediaSource::Url(_)
        ));
        assert!(matches!(
            MediaSource::from_str_like("./local/a.png"),
            MediaSource::Path(_)
        ));
    }

    #[test]
    fn encoding_is_standard_base64() {
        assert_eq!(encode(b"trellis"), "dHJlbGxpcw==");
    }
}
