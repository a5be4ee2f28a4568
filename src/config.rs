use crate::error::ConfigError;
use crate::fetcher::{FetchConfig, MAX_BATCH_SIZE};
use dotenv::dotenv;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use std::env;
use std::time::Duration;
use tracing::Level;

pub const DEFAULT_BASE_URL: &str = "https://api.scryfall.com";
pub const DEFAULT_USER_AGENT: &str = "printing_resolver/0.1";

#[derive(Clone, Debug)]
pub struct Config {
    pub base_url: String,
    pub user_agent: String,
    pub timeout: Duration,
    pub max_pages: usize,
    pub batch_size: usize,
    pub batch_delay: Duration,
    /// Set always accepted alongside the target set.
    pub evergreen_set: Option<String>,
    pub log_level: Level,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(30),
            max_pages: 5,
            batch_size: MAX_BATCH_SIZE,
            batch_delay: Duration::from_millis(100),
            evergreen_set: None,
            log_level: Level::INFO,
        }
    }
}

impl Config {
    /// Reads `.env` and the process environment; unset keys keep defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(base_url) = lookup("CATALOG_BASE_URL") {
            url::Url::parse(&base_url).map_err(|source| ConfigError::InvalidUrl {
                key: "CATALOG_BASE_URL",
                source,
            })?;
            config.base_url = base_url;
        }
        if let Some(user_agent) = lookup("CATALOG_USER_AGENT") {
            config.user_agent = user_agent;
        }
        if let Some(secs) = number(&lookup, "CATALOG_TIMEOUT_SECS")? {
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(pages) = number(&lookup, "CATALOG_MAX_PAGES")? {
            config.max_pages = (pages as usize).max(1);
        }
        if let Some(size) = number(&lookup, "FETCH_BATCH_SIZE")? {
            config.batch_size = (size as usize).clamp(1, MAX_BATCH_SIZE);
        }
        if let Some(ms) = number(&lookup, "FETCH_BATCH_DELAY_MS")? {
            config.batch_delay = Duration::from_millis(ms);
        }
        config.evergreen_set = lookup("RESOLVER_EVERGREEN_SET")
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty());
        if let Some(level) = lookup("LOG_LEVEL") {
            config.log_level = level.parse().unwrap_or(Level::INFO);
        }

        Ok(config)
    }

    pub fn fetch_config(&self) -> FetchConfig {
        FetchConfig {
            batch_size: self.batch_size,
            batch_delay: self.batch_delay,
        }
    }

    pub fn default_headers(&self) -> Result<HeaderMap, ConfigError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&self.user_agent)
                .map_err(|_| ConfigError::InvalidHeader("CATALOG_USER_AGENT"))?,
        );
        Ok(headers)
    }
}

fn number<F>(lookup: &F, key: &'static str) -> Result<Option<u64>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidNumber { key, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.batch_size, 20);
        assert_eq!(config.batch_delay, Duration::from_millis(100));
        assert_eq!(config.evergreen_set, None);
    }

    #[test]
    fn batch_size_is_clamped_to_safe_limit() {
        let config = Config::from_lookup(lookup(&[("FETCH_BATCH_SIZE", "75")])).unwrap();
        assert_eq!(config.batch_size, 20);
        let config = Config::from_lookup(lookup(&[("FETCH_BATCH_SIZE", "0")])).unwrap();
        assert_eq!(config.batch_size, 1);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            Config::from_lookup(lookup(&[("CATALOG_BASE_URL", "not a url")])),
            Err(ConfigError::InvalidUrl { .. })
        ));
        assert!(matches!(
            Config::from_lookup(lookup(&[("FETCH_BATCH_DELAY_MS", "soon")])),
            Err(ConfigError::InvalidNumber { key: "FETCH_BATCH_DELAY_MS", .. })
        ));
    }

    #[test]
    fn reads_evergreen_set_and_log_level() {
        let config = Config::from_lookup(lookup(&[
            ("RESOLVER_EVERGREEN_SET", " M21 "),
            ("LOG_LEVEL", "debug"),
        ]))
        .unwrap();
        assert_eq!(config.evergreen_set.as_deref(), Some("m21"));
        assert_eq!(config.log_level, Level::DEBUG);
    }

    #[test]
    fn headers_carry_user_agent() {
        let headers = Config::default().default_headers().unwrap();
        assert_eq!(headers.get(USER_AGENT).unwrap(), DEFAULT_USER_AGENT);
        assert_eq!(headers.get(ACCEPT).unwrap(), "application/json");
    }
}
