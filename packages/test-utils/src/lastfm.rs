//! Mock Last.fm server for testing the client and the auth handshake
//!
//! Provides a [`MockLastfmServer`] that answers the `/2.0/` endpoint the way
//! the real service does, including its error payloads.

use std::collections::BTreeMap;

use serde_json::json;
use tunefm_shared_config::LastfmConfig;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

/// API path the client posts to
pub const API_PATH: &str = "/2.0/";

/// Mock Last.fm server
///
/// This struct wraps a [`wiremock::MockServer`] and provides convenience methods
/// for the responses the client understands.
///
/// # Example
///
/// ```rust,ignore
/// use tunefm_test_utils::MockLastfmServer;
///
/// #[tokio::test]
/// async fn test_handshake() {
///     let server = MockLastfmServer::start().await;
///     server.mock_token_success("tok").await;
///
///     // Build the client from server.config()
/// }
/// ```
pub struct MockLastfmServer {
    server: MockServer,
    api_key: String,
    api_secret: String,
}

impl MockLastfmServer {
    /// Start a new mock server with default credentials
    pub async fn start() -> Self {
        Self::start_with_credentials("test-api-key", "test-api-secret").await
    }

    /// Start a new mock server with custom credentials
    pub async fn start_with_credentials(api_key: &str, api_secret: &str) -> Self {
        let server = MockServer::start().await;
        Self {
            server,
            api_key: api_key.to_string(),
            api_secret: api_secret.to_string(),
        }
    }

    /// Get the server URL
    pub fn url(&self) -> String {
        self.server.uri()
    }

    /// Underlying wiremock server, for mounting custom mocks
    pub fn server(&self) -> &MockServer {
        &self.server
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn api_secret(&self) -> &str {
        &self.api_secret
    }

    /// Client configuration pointing at this server, without throttling
    pub fn config(&self) -> LastfmConfig {
        LastfmConfig::new(self.api_key.as_str(), self.api_secret.as_str())
            .with_base_url(&self.url())
            .with_min_interval_ms(0)
    }

    fn api_call(api_method: &str) -> wiremock::MockBuilder {
        Mock::given(method("POST"))
            .and(path(API_PATH))
            .and(body_string_contains(format!("method={}", api_method)))
    }

    /// Mount a mock for `auth.getToken`
    pub async fn mock_token_success(&self, token: &str) {
        Self::api_call("auth.getToken")
            .respond_with(ResponseTemplate::new(200).set_body_json(token_json(token)))
            .mount(&self.server)
            .await;
    }

    /// Mount a mock for `auth.getSession`
    pub async fn mock_session_success(&self, name: &str, key: &str) {
        Self::api_call("auth.getSession")
            .respond_with(ResponseTemplate::new(200).set_body_json(session_json(name, key)))
            .mount(&self.server)
            .await;
    }

    /// Mount a mock for `artist.getTags`
    pub async fn mock_artist_tags(&self, artist: &str, tags: &[&str]) {
        Self::api_call("artist.getTags")
            .respond_with(ResponseTemplate::new(200).set_body_json(artist_tags_json(artist, tags)))
            .mount(&self.server)
            .await;
    }

    /// Mount a mock for a Last.fm error payload on any method
    ///
    /// Last.fm sends these with 200 for some methods and 4xx for others, so
    /// the status is explicit.
    pub async fn mock_api_error(&self, api_method: &str, status: u16, code: i32, message: &str) {
        Self::api_call(api_method)
            .respond_with(ResponseTemplate::new(status).set_body_json(error_json(code, message)))
            .mount(&self.server)
            .await;
    }

    /// Mount a mock for a non-JSON server error on any request
    pub async fn mock_server_error(&self, status: u16, body: &str) {
        Mock::given(method("POST"))
            .and(path(API_PATH))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&self.server)
            .await;
    }

    /// Mount a mock for rate limiting
    pub async fn mock_rate_limit(&self) {
        Mock::given(method("POST"))
            .and(path(API_PATH))
            .respond_with(
                ResponseTemplate::new(429)
                    .insert_header("Retry-After", "60")
                    .set_body_json(error_json(29, "Rate Limit Exceded")),
            )
            .mount(&self.server)
            .await;
    }

    /// Requests received so far
    pub async fn received_requests(&self) -> Vec<Request> {
        self.server.received_requests().await.unwrap_or_default()
    }

    /// Form bodies of the requests received so far, decoded
    pub async fn received_forms(&self) -> Vec<BTreeMap<String, String>> {
        self.received_requests()
            .await
            .iter()
            .map(|request| decode_form(&request.body))
            .collect()
    }
}

/// Decode an `application/x-www-form-urlencoded` body
pub fn decode_form(body: &[u8]) -> BTreeMap<String, String> {
    url::form_urlencoded::parse(body).into_owned().collect()
}

/// `auth.getToken` response body
pub fn token_json(token: &str) -> serde_json::Value {
    json!({ "token": token })
}

/// `auth.getSession` response body
pub fn session_json(name: &str, key: &str) -> serde_json::Value {
    json!({
        "session": {
            "name": name,
            "key": key,
            "subscriber": 0
        }
    })
}

/// `artist.getTags` response body
///
/// With no tags this mirrors the service's empty shape, which drops the
/// `tag` field entirely.
pub fn artist_tags_json(artist: &str, tags: &[&str]) -> serde_json::Value {
    if tags.is_empty() {
        return json!({
            "tags": {
                "#text": "\n",
                "@attr": { "artist": artist }
            }
        });
    }

    let tags: Vec<serde_json::Value> = tags
        .iter()
        .map(|name| {
            json!({
                "name": name,
                "url": format!("https://www.last.fm/tag/{}", name.replace(' ', "+"))
            })
        })
        .collect();

    json!({
        "tags": {
            "tag": tags,
            "@attr": { "artist": artist }
        }
    })
}

/// Last.fm error body
pub fn error_json(code: i32, message: &str) -> serde_json::Value {
    json!({ "error": code, "message": message })
}
