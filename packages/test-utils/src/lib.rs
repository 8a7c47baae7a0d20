//! Shared test utilities for the tunefm workspace
//!
//! This crate provides a mock Last.fm service for testing without network
//! access.
//!
//! # Mock Services
//!
//! - [`MockLastfmServer`] - Mock Last.fm `/2.0/` endpoint for auth and API tests
//!
//! # Example
//!
//! ```rust,ignore
//! use tunefm_test_utils::MockLastfmServer;
//!
//! #[tokio::test]
//! async fn test_with_mocks() {
//!     let lastfm = MockLastfmServer::start().await;
//!     lastfm.mock_token_success("tok").await;
//!
//!     // Use lastfm.config() to build your client
//! }
//! ```

mod lastfm;

pub use lastfm::{
    artist_tags_json, decode_form, error_json, session_json, token_json, MockLastfmServer,
    API_PATH,
};
