use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Result, bail};

use crate::retry::RetryPolicy;

const DEFAULT_TABLE: &str = "matches";
const DEFAULT_PAGE_SIZE: usize = 20;
const DEFAULT_RETRY_ATTEMPTS: u32 = 3;
const DEFAULT_RETRY_DELAY_MS: u64 = 1000;
const DEFAULT_DEBOUNCE_MS: u64 = 300;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct RemoteConfig {
    pub base_url: String,
    pub api_key: String,
    pub table: String,
    pub timeout: Duration,
}

impl RemoteConfig {
    pub fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url.trim_end_matches('/'), self.table)
    }
}

#[derive(Debug, Clone)]
pub enum StoreSource {
    Remote(RemoteConfig),
    Fixture(PathBuf),
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub source: StoreSource,
    pub page_size: usize,
    pub retry: RetryPolicy,
    pub debounce: Duration,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let page_size = env_parse("PAGE_SIZE", DEFAULT_PAGE_SIZE).clamp(5, 200);
        let retry = RetryPolicy {
            max_attempts: env_parse("RETRY_MAX_ATTEMPTS", DEFAULT_RETRY_ATTEMPTS).clamp(1, 10),
            delay: Duration::from_millis(env_parse("RETRY_DELAY_MS", DEFAULT_RETRY_DELAY_MS)),
        };
        let debounce = Duration::from_millis(env_parse("DEBOUNCE_MS", DEFAULT_DEBOUNCE_MS));

        let source = match env_string("ODDS_FIXTURE_FILE") {
            Some(path) => StoreSource::Fixture(PathBuf::from(path)),
            None => StoreSource::Remote(remote_from_env()?),
        };

        Ok(Self {
            source,
            page_size,
            retry,
            debounce,
        })
    }
}

fn remote_from_env() -> Result<RemoteConfig> {
    let Some(base_url) = env_string("SUPABASE_URL") else {
        bail!("SUPABASE_URL is not set (or set ODDS_FIXTURE_FILE for offline mode)");
    };
    let Some(api_key) = env_string("SUPABASE_KEY") else {
        bail!("SUPABASE_KEY is not set");
    };
    let table = env_string("ODDS_TABLE").unwrap_or_else(|| DEFAULT_TABLE.to_string());
    let timeout_secs = env_parse("HTTP_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT_SECS).clamp(1, 120);
    Ok(RemoteConfig {
        base_url,
        api_key,
        table,
        timeout: Duration::from_secs(timeout_secs),
    })
}

fn env_string(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_url_strips_trailing_slash() {
        let cfg = RemoteConfig {
            base_url: "https://abc.supabase.co/".to_string(),
            api_key: "k".to_string(),
            table: "matches".to_string(),
            timeout: Duration::from_secs(1),
        };
        assert_eq!(cfg.table_url(), "https://abc.supabase.co/rest/v1/matches");
    }
}
