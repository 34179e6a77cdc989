use crate::error::{Error, ErrorKind, Result};
use async_trait::async_trait;
use std::sync::Arc;
use surf::{Client, StatusCode};
use utils::surf_logging::SurfLogging;

/// Opaque upstream response body, shared between every caller it is handed to
pub type Payload = Arc<serde_json::Value>;

const MAX_ERROR_BODY: usize = 256;

/// Something that can resolve an endpoint key into a payload.
///
/// A throttling answer must be reported as [`ErrorKind::Throttled`], which is
/// the only failure the request worker retries.
#[async_trait]
pub trait Upstream: Send + Sync {
    async fn get(&self, key: &str) -> Result<Payload>;
}

/// HTTP upstream that resolves `key` relative to a base URL
#[derive(Clone)]
pub struct SurfUpstream {
    base_url: String,
    http: Client,
}

impl SurfUpstream {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
            http: Client::new().with(SurfLogging),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url_for(&self, key: &str) -> String {
        if key.starts_with('/') {
            format!("{}{}", self.base_url, key)
        } else {
            format!("{}/{}", self.base_url, key)
        }
    }
}

#[async_trait]
impl Upstream for SurfUpstream {
    async fn get(&self, key: &str) -> Result<Payload> {
        let mut response = self
            .http
            .get(self.url_for(key))
            .await
            .map_err(|err| Error::new(ErrorKind::Transport, key, err.to_string()))?;

        let status = response.status();
        if status == StatusCode::TooManyRequests {
            return Err(Error::throttled(key));
        }
        if !status.is_success() {
            let body = response.body_string().await.unwrap_or_default();
            let message = if body.is_empty() {
                status.canonical_reason().to_owned()
            } else {
                body.chars().take(MAX_ERROR_BODY).collect()
            };
            return Err(Error::status_code(key, status as u16, message));
        }

        let body = response
            .body_bytes()
            .await
            .map_err(|err| Error::new(ErrorKind::Transport, key, err.to_string()))?;
        let value: serde_json::Value = serde_json::from_slice(&body)
            .map_err(|err| Error::new(ErrorKind::Decode, key, err.to_string()))?;

        Ok(Arc::new(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joining() {
        let upstream = SurfUpstream::new("https://api.jikan.moe/v4/");
        assert_eq!(upstream.base_url(), "https://api.jikan.moe/v4");
        assert_eq!(
            upstream.url_for("/seasons/now?limit=24"),
            "https://api.jikan.moe/v4/seasons/now?limit=24"
        );
        assert_eq!(
            upstream.url_for("anime/5114/full"),
            "https://api.jikan.moe/v4/anime/5114/full"
        );
    }
}
