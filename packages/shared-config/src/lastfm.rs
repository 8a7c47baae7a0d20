//! Last.fm web-service configuration types

use std::fmt;
use std::time::Duration;

use crate::{get_env_or_default, get_required_env, parse_env, ConfigError, ConfigResult};

/// Default Last.fm API endpoint
pub const DEFAULT_API_URL: &str = "https://ws.audioscrobbler.com/2.0/";

/// Default page where users authorize a desktop application
pub const DEFAULT_AUTH_URL: &str = "https://www.last.fm/api/auth/";

/// Default minimum interval between two outbound requests (milliseconds)
pub const DEFAULT_MIN_INTERVAL_MS: u64 = 200;

/// Default request timeout (seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Last.fm application credentials and endpoint settings
#[derive(Clone, PartialEq, Eq)]
pub struct LastfmConfig {
    /// Application API key
    pub api_key: String,

    /// Application shared secret, used for request signatures
    pub api_secret: String,

    /// Previously obtained session key, if any
    pub session_key: Option<String>,

    /// API endpoint URL
    pub api_url: String,

    /// User authorization page URL
    pub auth_url: String,

    /// Minimum time between two requests in milliseconds
    pub min_interval_ms: u64,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl LastfmConfig {
    /// Load Last.fm configuration from environment variables
    ///
    /// `LASTFM_API_KEY` and `LASTFM_API_SECRET` are required and must not be
    /// blank. An empty `LASTFM_SESSION_KEY` is treated as unset.
    pub fn from_env() -> ConfigResult<Self> {
        let api_key = get_required_env("LASTFM_API_KEY")?;
        let api_secret = get_required_env("LASTFM_API_SECRET")?;

        if api_key.trim().is_empty() {
            return Err(ConfigError::InvalidValue(
                "LASTFM_API_KEY".to_string(),
                "API key cannot be empty".to_string(),
            ));
        }

        if api_secret.trim().is_empty() {
            return Err(ConfigError::InvalidValue(
                "LASTFM_API_SECRET".to_string(),
                "API secret cannot be empty".to_string(),
            ));
        }

        let session_key = std::env::var("LASTFM_SESSION_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty());

        let config = Self {
            api_key,
            api_secret,
            session_key,
            api_url: get_env_or_default("LASTFM_API_URL", DEFAULT_API_URL),
            auth_url: get_env_or_default("LASTFM_AUTH_URL", DEFAULT_AUTH_URL),
            min_interval_ms: parse_env("LASTFM_MIN_INTERVAL_MS", DEFAULT_MIN_INTERVAL_MS)?,
            timeout_secs: parse_env("LASTFM_TIMEOUT", DEFAULT_TIMEOUT_SECS)?,
        };
        config.validate()?;

        Ok(config)
    }

    /// Create a configuration with the default endpoints (useful for testing)
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: api_secret.into(),
            session_key: None,
            api_url: DEFAULT_API_URL.to_string(),
            auth_url: DEFAULT_AUTH_URL.to_string(),
            min_interval_ms: DEFAULT_MIN_INTERVAL_MS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Point both the API and the authorization page at `base_url`
    ///
    /// The API lives at `<base_url>/2.0/` and the authorization page at
    /// `<base_url>/api/auth/`, mirroring the real service layout.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        self.api_url = format!("{}/2.0/", base);
        self.auth_url = format!("{}/api/auth/", base);
        self
    }

    /// Set the stored session key
    pub fn with_session_key(mut self, session_key: impl Into<String>) -> Self {
        self.session_key = Some(session_key.into());
        self
    }

    /// Set the minimum interval between requests
    pub fn with_min_interval_ms(mut self, min_interval_ms: u64) -> Self {
        self.min_interval_ms = min_interval_ms;
        self
    }

    /// Minimum interval between requests
    pub fn min_interval(&self) -> Duration {
        Duration::from_millis(self.min_interval_ms)
    }

    /// Request timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Check the endpoint URLs and timeout
    pub fn validate(&self) -> ConfigResult<()> {
        for (name, value) in [
            ("LASTFM_API_URL", &self.api_url),
            ("LASTFM_AUTH_URL", &self.auth_url),
        ] {
            if !(value.starts_with("http://") || value.starts_with("https://")) {
                return Err(ConfigError::InvalidUrl(
                    name.to_string(),
                    format!("{} (expected http:// or https://)", value),
                ));
            }
        }

        if self.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "LASTFM_TIMEOUT must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

impl fmt::Debug for LastfmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LastfmConfig")
            .field("api_key", &"[REDACTED]")
            .field("api_secret", &"[REDACTED]")
            .field(
                "session_key",
                &self.session_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("api_url", &self.api_url)
            .field("auth_url", &self.auth_url)
            .field("min_interval_ms", &self.min_interval_ms)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}
