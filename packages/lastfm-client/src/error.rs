//! Last.fm API error types

use thiserror::Error;
use tunefm_shared_config::ConfigError;

/// Last.fm API client errors
#[derive(Error, Debug)]
pub enum LastfmError {
    /// API key is missing or empty
    #[error("API key is required for Last.fm API access")]
    MissingApiKey,

    /// API secret is missing or empty
    #[error("API secret is required to sign Last.fm requests")]
    MissingApiSecret,

    /// An auth step that needs a token ran before `auth.getToken`
    #[error("no auth token; call get_token() first")]
    MissingToken,

    /// Invalid input provided to API method
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration could not be loaded
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A configured URL could not be parsed
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed
    #[error("Failed to parse Last.fm response: {0}")]
    Parse(#[from] serde_json::Error),

    /// Last.fm API returned an error
    #[error("Last.fm API error {code}: {message}")]
    Api { code: i32, message: String },

    /// Non-success HTTP status without a Last.fm error payload
    #[error("HTTP error {status}: {body}")]
    Status { status: u16, body: String },

    /// Rate limited by Last.fm
    #[error("Rate limited by Last.fm API")]
    RateLimited,

    /// Request timeout
    #[error("Request to Last.fm timed out")]
    Timeout,
}

/// Documented Last.fm error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// 2: this service does not exist
    InvalidService,
    /// 3: no method with that name in this package
    InvalidMethod,
    /// 4: authentication failed
    AuthenticationFailed,
    /// 6: invalid parameters, including unknown artist
    InvalidParameters,
    /// 8: something else went wrong on the service side
    OperationFailed,
    /// 9: session key is invalid, re-authenticate
    InvalidSessionKey,
    /// 10: API key is invalid
    InvalidApiKey,
    /// 11: service temporarily offline
    ServiceOffline,
    /// 13: method signature is invalid
    InvalidSignature,
    /// 14: token has not been authorized by the user
    UnauthorizedToken,
    /// 15: token has expired
    TokenExpired,
    /// 16: temporary error processing the request
    Temporary,
    /// 26: API key suspended
    SuspendedApiKey,
    /// 29: rate limit exceeded
    RateLimitExceeded,
    /// Anything not listed above
    Other(i32),
}

impl From<i32> for ApiErrorKind {
    fn from(code: i32) -> Self {
        match code {
            2 => Self::InvalidService,
            3 => Self::InvalidMethod,
            4 => Self::AuthenticationFailed,
            6 => Self::InvalidParameters,
            8 => Self::OperationFailed,
            9 => Self::InvalidSessionKey,
            10 => Self::InvalidApiKey,
            11 => Self::ServiceOffline,
            13 => Self::InvalidSignature,
            14 => Self::UnauthorizedToken,
            15 => Self::TokenExpired,
            16 => Self::Temporary,
            26 => Self::SuspendedApiKey,
            29 => Self::RateLimitExceeded,
            other => Self::Other(other),
        }
    }
}

impl LastfmError {
    /// Classify an `Api` error by its Last.fm error code
    ///
    /// Returns `None` for errors that did not come from the service.
    pub fn api_error_kind(&self) -> Option<ApiErrorKind> {
        match self {
            LastfmError::Api { code, .. } => Some(ApiErrorKind::from(*code)),
            _ => None,
        }
    }

    /// Check if this error came from the transport rather than the caller
    ///
    /// Nothing in this crate retries; callers can use this to decide
    /// whether trying again later makes sense.
    pub fn is_transient(&self) -> bool {
        match self {
            LastfmError::Timeout | LastfmError::RateLimited => true,
            LastfmError::Http(e) => {
                if e.is_timeout() || e.is_connect() {
                    return true;
                }
                matches!(e.status(), Some(status) if status.is_server_error())
            }
            LastfmError::Status { status, .. } => *status >= 500,
            LastfmError::Api { code, .. } => matches!(
                ApiErrorKind::from(*code),
                ApiErrorKind::ServiceOffline
                    | ApiErrorKind::Temporary
                    | ApiErrorKind::RateLimitExceeded
            ),
            _ => false,
        }
    }
}

/// Result type for Last.fm operations
pub type LastfmResult<T> = Result<T, LastfmError>;
