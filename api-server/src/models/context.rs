use super::config::Config;
use anime_info::{AnimeInfoClient, ProxyClient};
use getset::Getters;
use log::info;
use std::sync::Arc;

#[derive(Getters)]
#[get = "pub"]
pub struct Context {
    anime_client: AnimeInfoClient,
    config: Config,
}

impl Context {
    pub fn new(config: Config) -> Result<Self, figment::Error> {
        let proxy = ProxyClient::new(config.upstream.base_url.clone(), config.proxy_config()?);
        info!(
            "Proxying {} (TTL: {}s, spacing: {}ms)",
            config.upstream.base_url, config.cache.ttl_secs, config.upstream.spacing_ms
        );
        Ok(Self::with_proxy(proxy, config))
    }

    pub fn with_proxy(proxy: ProxyClient, config: Config) -> Self {
        Self {
            anime_client: AnimeInfoClient::new(proxy),
            config,
        }
    }
}

pub type ContextPointer = Arc<Context>;
