//! Last.fm web-service client for tunefm
//!
//! This crate provides a blocking client for the Last.fm API, covering:
//! - The desktop authentication handshake (token, user authorization URL,
//!   session key)
//! - MD5 request signatures
//! - Artist tag retrieval, as raw JSON or a reduced shape
//! - Raw access to any other API method
//!
//! Outbound requests are spaced at least 200 ms apart by default.
//!
//! # Example
//!
//! ```rust,no_run
//! use tunefm_lastfm_client::{ArtistTagsQuery, LastfmClient};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = LastfmClient::new("your_api_key", "your_api_secret")?;
//!
//! // One-time handshake; store session.key for later runs
//! let mut auth = client.authenticator();
//! auth.get_token()?;
//! println!("Authorize at {}", auth.user_auth_url()?);
//! let session = auth.get_session()?;
//!
//! let client = client.with_session_key(session.key);
//! let tags = client.artist_get_tags(&ArtistTagsQuery::artist("Radiohead"))?;
//! for tag in tags.tags {
//!     println!("{}", tag.name);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Environment Variables
//!
//! - `LASTFM_API_KEY`: API key for Last.fm (required)
//! - `LASTFM_API_SECRET`: shared secret for signatures (required)
//! - `LASTFM_SESSION_KEY`: stored session key (optional)

mod auth;
mod client;
mod error;
mod models;
mod signature;
mod throttle;
mod transport;

pub use auth::Authenticator;
pub use client::{ArtistTagsQuery, LastfmClient};
pub use error::{ApiErrorKind, LastfmError, LastfmResult};
pub use models::{ArtistTags, Session, Tag};
pub use signature::{api_signature, sign_params};
pub use throttle::Throttle;
pub use transport::Params;
pub use tunefm_shared_config::LastfmConfig;
