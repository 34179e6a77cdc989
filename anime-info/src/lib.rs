mod endpoint;
mod error;

pub use anime_proxy::{
    CacheStats, Error as ProxyError, ErrorKind, Payload, ProxyClient, ProxyConfig, Upstream,
};
pub use endpoint::Endpoint;
pub use error::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Default base URL of the anime metadata API
pub const JIKAN_BASE_URL: &str = "https://api.jikan.moe/v4";

/// Metadata lookups backed by a shared [`ProxyClient`]
#[derive(Clone)]
pub struct AnimeInfoClient {
    proxy: ProxyClient,
}

impl AnimeInfoClient {
    pub fn new(proxy: ProxyClient) -> Self {
        Self { proxy }
    }

    pub fn proxy(&self) -> &ProxyClient {
        &self.proxy
    }

    /// Currently airing titles ordered by rank
    pub async fn top_airing(&self) -> Result<Payload> {
        self.get(Endpoint::TopAiring).await
    }

    /// Titles of the running season
    pub async fn season_now(&self) -> Result<Payload> {
        self.get(Endpoint::SeasonNow).await
    }

    pub async fn search(&self, query: &str) -> Result<Payload> {
        let query = query.trim();
        if query.is_empty() {
            return Err(Error::EmptyQuery);
        }
        self.get(Endpoint::Search(query.to_owned())).await
    }

    /// Full record of a single title
    pub async fn anime(&self, id: u64) -> Result<Payload> {
        self.get(Endpoint::Full(id)).await
    }

    async fn get(&self, endpoint: Endpoint) -> Result<Payload> {
        log::debug!("Requesting {}", endpoint);
        Ok(self.proxy.fetch(&endpoint.key()).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anime_proxy::Upstream;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct RecordingUpstream {
        keys: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Upstream for RecordingUpstream {
        async fn get(&self, key: &str) -> anime_proxy::Result<Payload> {
            self.keys.lock().unwrap().push(key.to_owned());
            if key == "/anime/404/full" {
                return Err(anime_proxy::Error::status_code(key, 404, "Not Found"));
            }
            Ok(Arc::new(json!({ "key": key })))
        }
    }

    fn client() -> (AnimeInfoClient, Arc<RecordingUpstream>) {
        let upstream = Arc::new(RecordingUpstream::default());
        let proxy = ProxyClient::with_upstream(upstream.clone(), ProxyConfig::default());
        (AnimeInfoClient::new(proxy), upstream)
    }

    #[tokio::test(start_paused = true)]
    async fn test_requests_expected_keys() {
        let (client, upstream) = client();

        client.top_airing().await.unwrap();
        client.season_now().await.unwrap();
        client.search("  Sousou no Frieren ").await.unwrap();
        client.anime(52991).await.unwrap();

        assert_eq!(
            *upstream.keys.lock().unwrap(),
            vec![
                "/top/anime?filter=airing&limit=24",
                "/seasons/now?limit=24",
                "/anime?q=Sousou%20no%20Frieren&limit=24",
                "/anime/52991/full",
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_search_is_rejected_locally() {
        let (client, upstream) = client();

        let error = client.search("   ").await.unwrap_err();
        assert!(matches!(error, Error::EmptyQuery));
        assert_eq!(error.status(), 400);
        assert!(upstream.keys.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_upstream_status_is_kept() {
        let (client, _) = client();

        let error = client.anime(404).await.unwrap_err();
        assert_eq!(error.status(), 404);
        assert_eq!(error.label(), "status");
    }
}
