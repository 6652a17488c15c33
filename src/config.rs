//! API configuration parsed from environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:3000";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// The base URL is not an absolute http(s) URL.
    #[error("invalid API base URL: {0:?}")]
    InvalidBaseUrl(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Base URL without a trailing slash.
    pub base_url: String,
    /// Bearer token sent with every request, if set.
    pub token: Option<String>,
    pub timeouts: Timeouts,
}

impl ApiConfig {
    /// Build API config from environment variables.
    ///
    /// - `PAWBOOK_API_URL`: default `http://127.0.0.1:3000`
    /// - `PAWBOOK_API_TOKEN`: optional bearer token
    /// - `PAWBOOK_REQUEST_TIMEOUT_SECS`: default 30
    /// - `PAWBOOK_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] if the base URL is not http(s).
    pub fn from_env() -> Result<Self, ConfigError> {
        let raw_url = std::env::var("PAWBOOK_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let token = std::env::var("PAWBOOK_API_TOKEN").ok();
        let timeouts = Timeouts {
            request_secs: env_parse("PAWBOOK_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: env_parse("PAWBOOK_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
        };
        Ok(Self { base_url: normalize_base_url(&raw_url)?, token: non_empty(token), timeouts })
    }

    /// Apply command-line overrides on top of the environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] if the override URL is not http(s).
    pub fn with_overrides(mut self, base_url: Option<&str>, token: Option<String>) -> Result<Self, ConfigError> {
        if let Some(url) = base_url {
            self.base_url = normalize_base_url(url)?;
        }
        if let Some(token) = non_empty(token) {
            self.token = Some(token);
        }
        Ok(self)
    }
}

pub(crate) fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let has_host = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
        .is_some_and(|rest| !rest.is_empty());
    if has_host { Ok(trimmed.to_string()) } else { Err(ConfigError::InvalidBaseUrl(raw.to_string())) }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}
