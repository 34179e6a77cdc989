use anime_info::{ProxyConfig, JIKAN_BASE_URL};
use figment::providers::{Format, Serialized, Yaml};
use figment::Figment;
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use serde_inline_default::serde_inline_default;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_SPACING_MS: u64 = 1000;
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_TTL_SECS: i64 = 300;
const DEFAULT_PORT: u16 = 8000;

#[serde_inline_default]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpstreamConfig {
    #[serde_inline_default(JIKAN_BASE_URL.to_string())]
    pub base_url: String,
    #[serde_inline_default(DEFAULT_SPACING_MS)]
    pub spacing_ms: u64,
    #[serde_inline_default(DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: JIKAN_BASE_URL.to_string(),
            spacing_ms: DEFAULT_SPACING_MS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

#[serde_inline_default]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde_inline_default(DEFAULT_TTL_SECS)]
    pub ttl_secs: i64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: DEFAULT_TTL_SECS,
        }
    }
}

#[serde_inline_default]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde_inline_default(DEFAULT_PORT)]
    pub port: u16,
    #[serde_inline_default(String::from("info"))]
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            upstream: UpstreamConfig::default(),
            cache: CacheConfig::default(),
            port: DEFAULT_PORT,
            log_level: String::from("info"),
        }
    }
}

impl Config {
    /// Defaults overlaid with the YAML file at `path`, if it exists.
    /// Values the proxy cannot represent are rejected here.
    pub fn load(path: &Path) -> Result<Self, figment::Error> {
        let config: Config = Figment::from(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path))
            .extract()?;
        config.proxy_config()?;
        Ok(config)
    }

    pub fn log_level(&self) -> LevelFilter {
        LevelFilter::from_str(&self.log_level).unwrap_or(LevelFilter::Info)
    }

    pub fn proxy_config(&self) -> Result<ProxyConfig, figment::Error> {
        let ttl = chrono::Duration::try_seconds(self.cache.ttl_secs).ok_or_else(|| {
            figment::Error::from(format!(
                "cache.ttl_secs out of range: {}",
                self.cache.ttl_secs
            ))
        })?;
        Ok(ProxyConfig {
            ttl,
            spacing: Duration::from_millis(self.upstream.spacing_ms),
            request_timeout: Duration::from_secs(self.upstream.timeout_secs),
        })
    }
}
