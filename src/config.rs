//! Client configuration: backend base URL and session defaults.
//!
//! SYSTEM CONTEXT
//! ==============
//! The browser build has no process environment, so the base URL is baked in
//! at compile time through `ADMIN_API_BASE_URL`. Native builds and tests can
//! override every field from the environment with [`ClientConfig::from_env`].

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";
pub const DEFAULT_TOKEN_KEY: &str = "jwt_token";

/// Errors raised while building a [`ClientConfig`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// The base URL is neither empty (same-origin) nor an absolute http(s) URL.
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),

    /// The storage key for the session token is blank.
    #[error("token storage key must not be empty")]
    EmptyTokenKey,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Backend origin prepended to every request path. Empty means same-origin.
    pub base_url: String,
    /// Tier used by `login` when the caller does not pass a remember flag.
    pub remember_by_default: bool,
    /// Whether the platform's ambient credentials (cookies) ride along.
    pub include_credentials: bool,
    /// Key under which the bearer token is stored in both tiers.
    pub token_key: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: normalize_base_url(option_env!("ADMIN_API_BASE_URL").unwrap_or(DEFAULT_BASE_URL)),
            remember_by_default: false,
            include_credentials: true,
            token_key: DEFAULT_TOKEN_KEY.to_owned(),
        }
    }
}

impl ClientConfig {
    /// Build a config for `base_url` with every other field defaulted.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] when the URL is not usable.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        let config = Self { base_url: normalize_base_url(base_url), ..Self::default() };
        config.validate()?;
        Ok(config)
    }

    /// Build typed client config from environment variables.
    ///
    /// Optional:
    /// - `ADMIN_API_BASE_URL`: compile-time value or `http://localhost:5000`
    /// - `ADMIN_REMEMBER_DEFAULT`: default `false`
    /// - `ADMIN_INCLUDE_CREDENTIALS`: default `true`
    /// - `ADMIN_TOKEN_KEY`: default `jwt_token`
    ///
    /// # Errors
    ///
    /// Returns an error if the resulting config fails validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ClientConfig::from_env`] but reads values through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns an error if the resulting config fails validation.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let base_url = lookup("ADMIN_API_BASE_URL").map_or(defaults.base_url, |raw| normalize_base_url(&raw));
        let remember_by_default = parse_bool(lookup("ADMIN_REMEMBER_DEFAULT").as_deref(), defaults.remember_by_default);
        let include_credentials =
            parse_bool(lookup("ADMIN_INCLUDE_CREDENTIALS").as_deref(), defaults.include_credentials);
        let token_key = lookup("ADMIN_TOKEN_KEY").unwrap_or(defaults.token_key);

        let config = Self { base_url, remember_by_default, include_credentials, token_key };
        config.validate()?;
        Ok(config)
    }

    /// Check that the base URL and token key are usable.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.base_url.as_str();
        if !url.is_empty() && !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ConfigError::InvalidBaseUrl(url.to_owned()));
        }
        if self.token_key.trim().is_empty() {
            return Err(ConfigError::EmptyTokenKey);
        }
        Ok(())
    }
}

fn normalize_base_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_owned()
}

fn parse_bool(raw: Option<&str>, default: bool) -> bool {
    match raw.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
        Some("1" | "true" | "yes") => true,
        Some("0" | "false" | "no") => false,
        _ => default,
    }
}
