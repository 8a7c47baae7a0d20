//! Last.fm API response models

use serde::{Deserialize, Deserializer, Serialize};

/// An authenticated Last.fm session
///
/// The `key` does not expire on its own; store it somewhere safe and hand it
/// back to [`LastfmClient::with_session_key`](crate::LastfmClient::with_session_key).
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Last.fm username that authorized the application
    pub name: String,
    /// Session key
    pub key: String,
    /// Whether the user is a paying subscriber
    #[serde(default, deserialize_with = "flag")]
    pub subscriber: bool,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("name", &self.name)
            .field("key", &"[REDACTED]")
            .field("subscriber", &self.subscriber)
            .finish()
    }
}

/// A user-applied tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// Tag name (e.g., "rock", "seen live")
    pub name: String,
    /// URL to Last.fm tag page
    #[serde(default)]
    pub url: Option<String>,
}

/// Tags a user applied to an artist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistTags {
    /// Artist name as echoed by Last.fm, when present
    pub artist: Option<String>,
    /// Tags, in the order returned
    pub tags: Vec<Tag>,
}

impl ArtistTags {
    /// Tag names only
    pub fn names(&self) -> Vec<&str> {
        self.tags.iter().map(|t| t.name.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

// Internal response types for deserialization

#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SessionResponse {
    pub session: Session,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ArtistTagsResponse {
    pub tags: ArtistTagsWrapper,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ArtistTagsWrapper {
    #[serde(default)]
    pub tag: OneOrMany<Tag>,
    #[serde(rename = "@attr")]
    pub attr: Option<ArtistTagsAttr>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ArtistTagsAttr {
    pub artist: Option<String>,
}

impl From<ArtistTagsResponse> for ArtistTags {
    fn from(raw: ArtistTagsResponse) -> Self {
        Self {
            artist: raw.tags.attr.and_then(|a| a.artist),
            tags: raw.tags.tag.into_vec(),
        }
    }
}

/// Last.fm collapses single-element lists into a bare object
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> Default for OneOrMany<T> {
    fn default() -> Self {
        Self::Many(Vec::new())
    }
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::Many(items) => items,
            Self::One(item) => vec![item],
        }
    }
}

/// Last.fm API error response
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorResponse {
    pub error: i32,
    pub message: String,
}

/// Booleans arrive as `0`/`1`, either as numbers or strings
fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
        Str(String),
    }

    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => b,
        Flag::Int(n) => n != 0,
        Flag::Str(s) => matches!(s.trim(), "1" | "true"),
    })
}
