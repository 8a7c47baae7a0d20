//! Last.fm API client implementation

use std::fmt;

use serde_json::Value;
use tracing::{debug, instrument};
use tunefm_shared_config::LastfmConfig;

use crate::auth::Authenticator;
use crate::error::{LastfmError, LastfmResult};
use crate::models::{ArtistTags, ArtistTagsResponse};
use crate::transport::{Params, Transport};

/// Last.fm API client
#[derive(Clone)]
pub struct LastfmClient {
    transport: Transport,
    auth_url: String,
    session_key: Option<String>,
}

impl fmt::Debug for LastfmClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LastfmClient")
            .field("transport", &self.transport)
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}

/// Parameters for `artist.getTags`
///
/// Build with [`ArtistTagsQuery::artist`] or [`ArtistTagsQuery::mbid`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtistTagsQuery {
    artist: Option<String>,
    mbid: Option<String>,
    user: Option<String>,
    autocorrect: bool,
}

impl Default for ArtistTagsQuery {
    fn default() -> Self {
        Self {
            artist: None,
            mbid: None,
            user: None,
            autocorrect: true,
        }
    }
}

impl ArtistTagsQuery {
    /// Look up by artist name
    pub fn artist(name: impl Into<String>) -> Self {
        Self {
            artist: Some(name.into()),
            ..Self::default()
        }
    }

    /// Look up by MusicBrainz artist ID
    pub fn mbid(mbid: impl Into<String>) -> Self {
        Self {
            mbid: Some(mbid.into()),
            ..Self::default()
        }
    }

    /// Also set the MusicBrainz ID; ignored when an artist name is present
    pub fn with_mbid(mut self, mbid: impl Into<String>) -> Self {
        self.mbid = Some(mbid.into());
        self
    }

    /// Whose tags to fetch; required unless the client is authenticated
    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    /// Let Last.fm correct misspelled artist names (on by default)
    pub fn autocorrect(mut self, autocorrect: bool) -> Self {
        self.autocorrect = autocorrect;
        self
    }
}

/// Trim a value and drop it if nothing is left
fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

impl LastfmClient {
    /// Create a new Last.fm client with the given credentials
    ///
    /// # Errors
    /// - `LastfmError::MissingApiKey` if the API key is empty
    /// - `LastfmError::MissingApiSecret` if the API secret is empty
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> LastfmResult<Self> {
        Self::from_config(&LastfmConfig::new(api_key, api_secret))
    }

    /// Create a client from configuration
    ///
    /// A session key present in the configuration marks the client as
    /// authenticated.
    pub fn from_config(config: &LastfmConfig) -> LastfmResult<Self> {
        let client = Self {
            transport: Transport::new(config)?,
            auth_url: config.auth_url.clone(),
            session_key: None,
        };

        Ok(match config.session_key.as_deref() {
            Some(sk) => client.with_session_key(sk),
            None => client,
        })
    }

    /// Create a client from environment variables
    ///
    /// See [`LastfmConfig::from_env`] for the variables read.
    pub fn from_env() -> LastfmResult<Self> {
        Self::from_config(&LastfmConfig::from_env()?)
    }

    /// Attach a session key obtained from [`Authenticator::get_session`]
    ///
    /// A blank key leaves the client unauthenticated.
    pub fn with_session_key(mut self, session_key: impl Into<String>) -> Self {
        let session_key = session_key.into();
        self.session_key = (!session_key.trim().is_empty()).then_some(session_key);
        self
    }

    /// Whether a session key is attached
    pub fn is_authenticated(&self) -> bool {
        self.session_key.is_some()
    }

    /// An authenticator sharing this client's credentials and throttle
    pub fn authenticator(&self) -> Authenticator {
        Authenticator::with_transport(self.transport.clone(), self.auth_url.clone())
    }

    /// Call any API method and return the raw JSON response
    ///
    /// `api_key` and `format=json` are added automatically.
    #[instrument(skip(self, params))]
    pub fn send_request(&self, method: &str, params: Params) -> LastfmResult<Value> {
        let params = Self::with_method(method, params)?;
        let text = self.transport.send(params)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Call any API method with a signature, adding `sk` when authenticated
    #[instrument(skip(self, params))]
    pub fn send_signed_request(&self, method: &str, params: Params) -> LastfmResult<Value> {
        let mut params = Self::with_method(method, params)?;
        if let Some(sk) = &self.session_key {
            params.insert("sk".to_string(), sk.clone());
        }
        let text = self.transport.send_signed(params)?;
        Ok(serde_json::from_str(&text)?)
    }

    fn with_method(method: &str, mut params: Params) -> LastfmResult<Params> {
        let method = method.trim();
        if method.is_empty() {
            return Err(LastfmError::InvalidInput(
                "method cannot be empty".to_string(),
            ));
        }
        params.insert("method".to_string(), method.to_string());
        Ok(params)
    }

    /// Check the query and turn it into request parameters
    ///
    /// Runs before any network traffic. Returns the parameters and whether
    /// the request must be signed.
    fn artist_tags_params(&self, query: &ArtistTagsQuery) -> LastfmResult<(Params, bool)> {
        let artist = non_blank(query.artist.as_deref());
        let mbid = non_blank(query.mbid.as_deref());
        let user = non_blank(query.user.as_deref());

        if artist.is_none() && mbid.is_none() {
            return Err(LastfmError::InvalidInput(
                "must provide artist or mbid".to_string(),
            ));
        }

        let mut params = Params::new();
        params.insert("method".to_string(), "artist.getTags".to_string());
        params.insert(
            "autocorrect".to_string(),
            if query.autocorrect { "1" } else { "0" }.to_string(),
        );

        if let Some(artist) = artist {
            params.insert("artist".to_string(), artist.to_string());
        } else if let Some(mbid) = mbid {
            params.insert("mbid".to_string(), mbid.to_string());
        }

        let signed = if let Some(user) = user {
            params.insert("user".to_string(), user.to_string());
            false
        } else if let Some(sk) = &self.session_key {
            params.insert("sk".to_string(), sk.clone());
            true
        } else {
            return Err(LastfmError::InvalidInput(
                "user is required when not authenticated".to_string(),
            ));
        };

        Ok((params, signed))
    }

    fn fetch_artist_tags(&self, query: &ArtistTagsQuery) -> LastfmResult<String> {
        let (params, signed) = self.artist_tags_params(query)?;
        if signed {
            self.transport.send_signed(params)
        } else {
            self.transport.send(params)
        }
    }

    /// Get the tags a user applied to an artist (`artist.getTags`)
    ///
    /// Without a `user` in the query the client must be authenticated; the
    /// request is then signed and returns the session user's tags.
    ///
    /// # Errors
    /// - `LastfmError::InvalidInput` - neither artist nor mbid given, no user
    ///   while unauthenticated
    /// - `LastfmError::Api` - If Last.fm returns an error (code 6 for an
    ///   unknown artist)
    /// - `LastfmError::Http` - If the HTTP request fails
    #[instrument(skip(self))]
    pub fn artist_get_tags(&self, query: &ArtistTagsQuery) -> LastfmResult<ArtistTags> {
        let text = self.fetch_artist_tags(query)?;
        let response: ArtistTagsResponse = serde_json::from_str(&text)?;
        let tags: ArtistTags = response.into();

        debug!(
            artist = ?tags.artist,
            tag_count = tags.tags.len(),
            "Found artist tags"
        );

        Ok(tags)
    }

    /// Same request as [`artist_get_tags`](Self::artist_get_tags), raw JSON response
    #[instrument(skip(self))]
    pub fn artist_get_tags_raw(&self, query: &ArtistTagsQuery) -> LastfmResult<Value> {
        let text = self.fetch_artist_tags(query)?;
        Ok(serde_json::from_str(&text)?)
    }
}
