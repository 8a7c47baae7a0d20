//! Shared HTTP primitive: throttle, merge credentials, POST, classify failures

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use reqwest::blocking::Client;
use reqwest::StatusCode;
use tracing::{debug, warn};
use tunefm_shared_config::LastfmConfig;

use crate::error::{LastfmError, LastfmResult};
use crate::models::ErrorResponse;
use crate::signature::sign_params;
use crate::throttle::Throttle;

/// Request parameters, kept sorted by name for signing
pub type Params = BTreeMap<String, String>;

/// Maximum error body size kept in `LastfmError::Status`
const MAX_ERROR_BODY_SIZE: usize = 1000;

/// Default connection timeout in seconds
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

/// Parameters whose values never reach the logs
const REDACTED_PARAMS: [&str; 4] = ["api_key", "api_sig", "sk", "token"];

/// Blocking HTTP transport shared by the client and the authenticator
///
/// Cloning is cheap and clones share one throttle, so interleaved auth and
/// API calls are spaced out together.
#[derive(Clone)]
pub(crate) struct Transport {
    http_client: Client,
    api_url: String,
    api_key: String,
    api_secret: String,
    throttle: Arc<Throttle>,
}

impl fmt::Debug for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transport")
            .field("api_url", &self.api_url)
            .field("api_key", &"[REDACTED]")
            .field("api_secret", &"[REDACTED]")
            .field("min_interval", &self.throttle.min_interval())
            .finish()
    }
}

impl Transport {
    /// Build a transport from configuration
    ///
    /// # Errors
    /// - `LastfmError::MissingApiKey` / `MissingApiSecret` for blank credentials
    /// - `LastfmError::Http` if the HTTP client cannot be built
    pub fn new(config: &LastfmConfig) -> LastfmResult<Self> {
        if config.api_key.trim().is_empty() {
            return Err(LastfmError::MissingApiKey);
        }
        if config.api_secret.trim().is_empty() {
            return Err(LastfmError::MissingApiSecret);
        }

        let http_client = Client::builder()
            .timeout(config.timeout())
            .connect_timeout(std::time::Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS))
            .user_agent(concat!("tunefm/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http_client,
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
            throttle: Arc::new(Throttle::new(config.min_interval())),
        })
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Send an unsigned request and return the response body
    pub fn send(&self, mut params: Params) -> LastfmResult<String> {
        self.merge_defaults(&mut params);
        self.post(&params)
    }

    /// Send a request carrying an `api_sig` over all other parameters
    pub fn send_signed(&self, mut params: Params) -> LastfmResult<String> {
        self.merge_defaults(&mut params);
        params.remove("api_sig");
        let api_sig = sign_params(&params, &self.api_secret);
        params.insert("api_sig".to_string(), api_sig);
        self.post(&params)
    }

    /// `api_key` and `format` always win over caller-supplied values
    fn merge_defaults(&self, params: &mut Params) {
        params.insert("api_key".to_string(), self.api_key.clone());
        params.insert("format".to_string(), "json".to_string());
    }

    fn post(&self, params: &Params) -> LastfmResult<String> {
        self.throttle.wait();

        let method = params.get("method").map(String::as_str).unwrap_or("?");
        debug!(
            method,
            params = %RedactedParams(params),
            "Sending Last.fm request"
        );

        let response = self
            .http_client
            .post(&self.api_url)
            .form(params)
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    LastfmError::Timeout
                } else {
                    LastfmError::Http(e)
                }
            })?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            warn!(method, "Last.fm API rate limited");
            return Err(LastfmError::RateLimited);
        }

        let text = response.text().map_err(|e| {
            if e.is_timeout() {
                LastfmError::Timeout
            } else {
                LastfmError::Http(e)
            }
        })?;

        if let Some(error) = parse_api_error(&text) {
            debug!(method, error = %error, "Last.fm returned an error payload");
            return Err(error);
        }

        if !status.is_success() {
            warn!(method, status = status.as_u16(), "Last.fm request failed");
            return Err(LastfmError::Status {
                status: status.as_u16(),
                body: truncate_error_body(text),
            });
        }

        Ok(text)
    }
}

/// Parse response text as a Last.fm error payload
///
/// The service reports failures with this payload on both 200 and 4xx
/// responses.
pub(crate) fn parse_api_error(text: &str) -> Option<LastfmError> {
    serde_json::from_str::<ErrorResponse>(text)
        .ok()
        .map(|error| LastfmError::Api {
            code: error.error,
            message: error.message,
        })
}

/// Truncate error body to prevent memory exhaustion
/// Safely handles UTF-8 boundaries to avoid panics on multi-byte characters
fn truncate_error_body(body: String) -> String {
    if body.len() <= MAX_ERROR_BODY_SIZE {
        return body;
    }

    let truncate_at = body
        .char_indices()
        .map(|(i, _)| i)
        .take_while(|i| *i <= MAX_ERROR_BODY_SIZE)
        .last()
        .unwrap_or(0);

    format!("{}... (truncated)", &body[..truncate_at])
}

/// Log-friendly rendering of request parameters
struct RedactedParams<'a>(&'a Params);

impl fmt::Display for RedactedParams<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (name, value) in self.0 {
            if !first {
                f.write_str("&")?;
            }
            first = false;
            if REDACTED_PARAMS.contains(&name.as_str()) {
                write!(f, "{}=[REDACTED]", name)?;
            } else {
                write!(f, "{}={}", name, value)?;
            }
        }
        Ok(())
    }
}
