//! Integration tests for the Last.fm client
//!
//! The client is blocking, so every call runs on tokio's blocking pool while
//! the wiremock server keeps serving on the test runtime.

use std::time::{Duration, Instant};

use assert_matches::assert_matches;
use rstest::rstest;
use serde_json::json;
use tunefm_lastfm_client::{
    api_signature, sign_params, ApiErrorKind, ArtistTagsQuery, LastfmClient, LastfmError, Params,
};
use tunefm_test_utils::{MockLastfmServer, API_PATH};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, ResponseTemplate};

async fn blocking<T, F>(f: F) -> T
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .expect("blocking task panicked")
}

// ============================================================================
// Auth handshake
// ============================================================================

#[tokio::test]
async fn test_full_handshake() {
    let server = MockLastfmServer::start().await;
    server.mock_token_success("tok-42").await;
    server.mock_session_success("rj", "session-key-1").await;

    let config = server.config();
    let auth_base = config.auth_url.clone();
    let api_key = server.api_key().to_string();

    let (token, url, session) = blocking(move || {
        let client = LastfmClient::from_config(&config).unwrap();
        let mut auth = client.authenticator();
        let token = auth.get_token().unwrap();
        let url = auth.user_auth_url().unwrap();
        let session = auth.get_session().unwrap();
        (token, url, session)
    })
    .await;

    assert_eq!(token, "tok-42");
    assert_eq!(
        url,
        format!("{}?api_key={}&token=tok-42", auth_base, api_key)
    );
    assert_eq!(session.name, "rj");
    assert_eq!(session.key, "session-key-1");
    assert!(!session.subscriber);

    let forms = server.received_forms().await;
    assert_eq!(forms.len(), 2);

    for form in &forms {
        assert_eq!(form["api_key"], api_key);
        assert_eq!(form["format"], "json");
    }

    assert_eq!(forms[0]["method"], "auth.getToken");
    assert!(!forms[0].contains_key("api_sig"));

    let session_form = &forms[1];
    assert_eq!(session_form["method"], "auth.getSession");
    assert_eq!(session_form["token"], "tok-42");
    let expected_sig = api_signature(&[
        "api_key",
        api_key.as_str(),
        "method",
        "auth.getSession",
        "token",
        "tok-42",
        server.api_secret(),
    ]);
    assert_eq!(session_form["api_sig"], expected_sig);
}

#[tokio::test]
async fn test_session_requires_token_before_any_request() {
    let server = MockLastfmServer::start().await;
    server.mock_session_success("rj", "key").await;
    let config = server.config();

    let result = blocking(move || {
        let client = LastfmClient::from_config(&config).unwrap();
        client.authenticator().get_session()
    })
    .await;

    assert_matches!(result, Err(LastfmError::MissingToken));
    assert!(server.received_requests().await.is_empty());
}

#[tokio::test]
async fn test_session_with_unauthorized_token() {
    let server = MockLastfmServer::start().await;
    server.mock_token_success("tok").await;
    server
        .mock_api_error("auth.getSession", 403, 14, "Unauthorized Token - This token has not been issued")
        .await;
    let config = server.config();

    let result = blocking(move || -> Result<_, LastfmError> {
        let client = LastfmClient::from_config(&config).unwrap();
        let mut auth = client.authenticator();
        auth.get_token()?;
        auth.get_session()
    })
    .await;

    let err = result.unwrap_err();
    assert_eq!(err.api_error_kind(), Some(ApiErrorKind::UnauthorizedToken));
    assert!(!err.is_transient());
}

#[tokio::test]
async fn test_session_raw_returns_json() {
    let server = MockLastfmServer::start().await;
    server.mock_session_success("rj", "raw-key").await;
    let config = server.config();

    let value = blocking(move || {
        let client = LastfmClient::from_config(&config).unwrap();
        let mut auth = client.authenticator();
        auth.set_token("callback-token");
        auth.get_session_raw()
    })
    .await
    .unwrap();

    assert_eq!(value["session"]["key"], "raw-key");
    let forms = server.received_forms().await;
    assert_eq!(forms[0]["token"], "callback-token");
}

// ============================================================================
// artist.getTags
// ============================================================================

#[tokio::test]
async fn test_artist_tags_for_user() {
    let server = MockLastfmServer::start().await;
    server
        .mock_artist_tags("Radiohead", &["alternative", "seen live"])
        .await;
    let config = server.config();

    let tags = blocking(move || {
        let client = LastfmClient::from_config(&config).unwrap();
        client.artist_get_tags(&ArtistTagsQuery::artist("Radiohead").user("rj"))
    })
    .await
    .unwrap();

    assert_eq!(tags.artist.as_deref(), Some("Radiohead"));
    assert_eq!(tags.names(), vec!["alternative", "seen live"]);
    assert_eq!(
        tags.tags[1].url.as_deref(),
        Some("https://www.last.fm/tag/seen+live")
    );

    let forms = server.received_forms().await;
    assert_eq!(forms.len(), 1);
    let form = &forms[0];
    assert_eq!(form["method"], "artist.getTags");
    assert_eq!(form["artist"], "Radiohead");
    assert_eq!(form["user"], "rj");
    assert_eq!(form["autocorrect"], "1");
    assert!(!form.contains_key("api_sig"));
    assert!(!form.contains_key("sk"));
}

#[tokio::test]
async fn test_artist_tags_authenticated_request_is_signed() {
    let server = MockLastfmServer::start().await;
    server.mock_artist_tags("Portishead", &["trip-hop"]).await;
    let config = server.config().with_session_key("sk-abc");
    let secret = server.api_secret().to_string();

    let tags = blocking(move || {
        let client = LastfmClient::from_config(&config).unwrap();
        assert!(client.is_authenticated());
        client.artist_get_tags(&ArtistTagsQuery::artist("Portishead"))
    })
    .await
    .unwrap();
    assert_eq!(tags.names(), vec!["trip-hop"]);

    let mut form = server.received_forms().await.remove(0);
    assert_eq!(form["sk"], "sk-abc");
    assert!(!form.contains_key("user"));

    let sent_sig = form.remove("api_sig").unwrap();
    assert_eq!(sent_sig, sign_params(&form, &secret));
}

#[tokio::test]
async fn test_artist_tags_authenticated_with_user_is_unsigned() {
    let server = MockLastfmServer::start().await;
    server.mock_artist_tags("Portishead", &["trip-hop"]).await;
    let config = server.config().with_session_key("sk-abc");

    blocking(move || {
        let client = LastfmClient::from_config(&config).unwrap();
        client.artist_get_tags(&ArtistTagsQuery::artist("Portishead").user("rj"))
    })
    .await
    .unwrap();

    let form = server.received_forms().await.remove(0);
    assert_eq!(form["user"], "rj");
    assert_eq!(form["api_key"], server.api_key());
    assert!(!form.contains_key("sk"));
    assert!(!form.contains_key("api_sig"));
}

#[tokio::test]
async fn test_artist_tags_long_non_ascii_name_is_sent() {
    let server = MockLastfmServer::start().await;
    let name = "日".repeat(90);
    server.mock_artist_tags(&name, &["j-pop"]).await;
    let config = server.config();

    let sent = name.clone();
    let tags = blocking(move || {
        let client = LastfmClient::from_config(&config).unwrap();
        client.artist_get_tags(&ArtistTagsQuery::artist(sent).user("rj"))
    })
    .await
    .unwrap();
    assert_eq!(tags.names(), vec!["j-pop"]);

    let form = server.received_forms().await.remove(0);
    assert_eq!(form["artist"], name);
}

#[tokio::test]
async fn test_artist_tags_by_mbid_without_autocorrect() {
    let server = MockLastfmServer::start().await;
    server.mock_artist_tags("Cher", &["pop"]).await;
    let config = server.config();

    blocking(move || {
        let client = LastfmClient::from_config(&config).unwrap();
        let query = ArtistTagsQuery::mbid("bfcc6d75-a6a5-4bc6-8282-47aec8531818")
            .user("rj")
            .autocorrect(false);
        client.artist_get_tags(&query)
    })
    .await
    .unwrap();

    let form = server.received_forms().await.remove(0);
    assert_eq!(form["mbid"], "bfcc6d75-a6a5-4bc6-8282-47aec8531818");
    assert_eq!(form["autocorrect"], "0");
    assert!(!form.contains_key("artist"));
}

#[tokio::test]
async fn test_artist_tags_empty() {
    let server = MockLastfmServer::start().await;
    server.mock_artist_tags("Obscure Band", &[]).await;
    let config = server.config();

    let tags = blocking(move || {
        let client = LastfmClient::from_config(&config).unwrap();
        client.artist_get_tags(&ArtistTagsQuery::artist("Obscure Band").user("rj"))
    })
    .await
    .unwrap();

    assert!(tags.is_empty());
    assert_eq!(tags.artist.as_deref(), Some("Obscure Band"));
}

#[tokio::test]
async fn test_artist_tags_raw() {
    let server = MockLastfmServer::start().await;
    server.mock_artist_tags("Björk", &["electronic"]).await;
    let config = server.config();

    let value = blocking(move || {
        let client = LastfmClient::from_config(&config).unwrap();
        client.artist_get_tags_raw(&ArtistTagsQuery::artist("Björk").user("rj"))
    })
    .await
    .unwrap();

    assert_eq!(value["tags"]["tag"][0]["name"], "electronic");
    assert_eq!(value["tags"]["@attr"]["artist"], "Björk");

    let form = server.received_forms().await.remove(0);
    assert_eq!(form["artist"], "Björk");
}

#[rstest]
#[case::missing_identifiers(ArtistTagsQuery::default().user("rj"))]
#[case::blank_artist(ArtistTagsQuery::artist("  ").user("rj"))]
#[case::missing_user(ArtistTagsQuery::artist("Radiohead"))]
#[case::mbid_missing_user(ArtistTagsQuery::mbid("abc"))]
#[tokio::test]
async fn test_artist_tags_validation_sends_nothing(#[case] query: ArtistTagsQuery) {
    let server = MockLastfmServer::start().await;
    server.mock_artist_tags("Radiohead", &["rock"]).await;
    let config = server.config();

    let result = blocking(move || {
        let client = LastfmClient::from_config(&config).unwrap();
        client.artist_get_tags(&query)
    })
    .await;

    assert_matches!(result, Err(LastfmError::InvalidInput(_)));
    assert!(server.received_requests().await.is_empty());
}

// ============================================================================
// Error mapping
// ============================================================================

#[rstest]
#[case::not_found_on_200(200, 6, ApiErrorKind::InvalidParameters)]
#[case::bad_key_on_403(403, 10, ApiErrorKind::InvalidApiKey)]
#[case::offline_on_503(503, 11, ApiErrorKind::ServiceOffline)]
#[tokio::test]
async fn test_api_error_payload(
    #[case] status: u16,
    #[case] code: i32,
    #[case] kind: ApiErrorKind,
) {
    let server = MockLastfmServer::start().await;
    server
        .mock_api_error("artist.getTags", status, code, "nope")
        .await;
    let config = server.config();

    let result = blocking(move || {
        let client = LastfmClient::from_config(&config).unwrap();
        client.artist_get_tags(&ArtistTagsQuery::artist("Nobody").user("rj"))
    })
    .await;

    let err = result.unwrap_err();
    assert_matches!(err, LastfmError::Api { code: c, ref message } if c == code && message == "nope");
    assert_eq!(err.api_error_kind(), Some(kind));
}

#[tokio::test]
async fn test_server_error_without_payload() {
    let server = MockLastfmServer::start().await;
    server.mock_server_error(502, "Bad Gateway").await;
    let config = server.config();

    let result = blocking(move || {
        let client = LastfmClient::from_config(&config).unwrap();
        client.authenticator().get_token()
    })
    .await;

    let err = result.unwrap_err();
    assert_matches!(err, LastfmError::Status { status: 502, ref body } if body == "Bad Gateway");
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_rate_limited() {
    let server = MockLastfmServer::start().await;
    server.mock_rate_limit().await;
    let config = server.config();

    let result = blocking(move || {
        let client = LastfmClient::from_config(&config).unwrap();
        client.artist_get_tags(&ArtistTagsQuery::artist("Radiohead").user("rj"))
    })
    .await;

    assert_matches!(result, Err(LastfmError::RateLimited));
    // No retry
    assert_eq!(server.received_requests().await.len(), 1);
}

#[tokio::test]
async fn test_malformed_success_body() {
    let server = MockLastfmServer::start().await;
    Mock::given(method("POST"))
        .and(path(API_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<lfm status=\"ok\"/>"))
        .mount(server.server())
        .await;
    let config = server.config();

    let result = blocking(move || {
        let client = LastfmClient::from_config(&config).unwrap();
        client.authenticator().get_token()
    })
    .await;

    assert_matches!(result, Err(LastfmError::Parse(_)));
}

#[tokio::test]
async fn test_connection_refused() {
    let config = tunefm_lastfm_client::LastfmConfig::new("key", "secret")
        .with_base_url("http://127.0.0.1:1")
        .with_min_interval_ms(0);

    let result = blocking(move || {
        let client = LastfmClient::from_config(&config).unwrap();
        client.authenticator().get_token()
    })
    .await;

    let err = result.unwrap_err();
    assert_matches!(err, LastfmError::Http(_));
    assert!(err.is_transient());
}

// ============================================================================
// Raw requests and throttling
// ============================================================================

#[tokio::test]
async fn test_send_request_any_method() {
    let server = MockLastfmServer::start().await;
    Mock::given(method("POST"))
        .and(path(API_PATH))
        .and(body_string_contains("method=tag.getInfo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "tag": {"name": "disco", "total": 12345}
        })))
        .expect(1)
        .mount(server.server())
        .await;
    let config = server.config();

    let value = blocking(move || {
        let client = LastfmClient::from_config(&config).unwrap();
        let mut params = Params::new();
        params.insert("tag".to_string(), "disco".to_string());
        params.insert("format".to_string(), "xml".to_string());
        client.send_request("tag.getInfo", params)
    })
    .await
    .unwrap();

    assert_eq!(value["tag"]["name"], "disco");
    let form = server.received_forms().await.remove(0);
    assert_eq!(form["format"], "json");
    assert_eq!(form["tag"], "disco");
    assert!(!form.contains_key("api_sig"));
}

#[tokio::test]
async fn test_send_signed_request_adds_session_key() {
    let server = MockLastfmServer::start().await;
    Mock::given(method("POST"))
        .and(path(API_PATH))
        .and(body_string_contains("method=user.getInfo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "user": {"name": "rj"}
        })))
        .mount(server.server())
        .await;
    let config = server.config().with_session_key("sk-9");
    let secret = server.api_secret().to_string();

    let value = blocking(move || {
        let client = LastfmClient::from_config(&config).unwrap();
        client.send_signed_request("user.getInfo", Params::new())
    })
    .await
    .unwrap();
    assert_eq!(value["user"]["name"], "rj");

    let mut form = server.received_forms().await.remove(0);
    assert_eq!(form["sk"], "sk-9");
    let sent_sig = form.remove("api_sig").unwrap();
    assert_eq!(sent_sig, sign_params(&form, &secret));
}

#[tokio::test]
async fn test_throttle_spaces_requests() {
    let server = MockLastfmServer::start().await;
    server.mock_token_success("tok").await;
    let interval = Duration::from_millis(100);
    let config = server.config().with_min_interval_ms(100);

    let elapsed = blocking(move || {
        let client = LastfmClient::from_config(&config).unwrap();
        let mut auth = client.authenticator();
        let started = Instant::now();
        for _ in 0..3 {
            auth.get_token().unwrap();
        }
        started.elapsed()
    })
    .await;

    assert!(elapsed >= interval * 2, "elapsed {:?}", elapsed);
    assert_eq!(server.received_requests().await.len(), 3);
}

#[tokio::test]
async fn test_client_and_authenticator_share_throttle() {
    let server = MockLastfmServer::start().await;
    server.mock_token_success("tok").await;
    server.mock_artist_tags("Radiohead", &["rock"]).await;
    let interval = Duration::from_millis(80);
    let config = server.config().with_min_interval_ms(80);

    let elapsed = blocking(move || {
        let client = LastfmClient::from_config(&config).unwrap();
        let mut auth = client.authenticator();
        auth.get_token().unwrap();
        let started = Instant::now();
        client
            .artist_get_tags(&ArtistTagsQuery::artist("Radiohead").user("rj"))
            .unwrap();
        started.elapsed()
    })
    .await;

    assert!(
        elapsed >= interval - Duration::from_millis(5),
        "elapsed {:?}",
        elapsed
    );
}
