//! Desktop authentication handshake
//!
//! 1. [`Authenticator::get_token`] fetches an unauthorized request token.
//! 2. [`Authenticator::user_auth_url`] builds the page where the user grants
//!    access to that token.
//! 3. [`Authenticator::get_session`] exchanges the authorized token for a
//!    session key. Keep the key somewhere safe; it does not expire.

use std::fmt;

use serde_json::Value;
use tracing::{debug, info, instrument};
use tunefm_shared_config::LastfmConfig;
use url::Url;

use crate::error::{LastfmError, LastfmResult};
use crate::models::{Session, SessionResponse, TokenResponse};
use crate::transport::{Params, Transport};

/// Runs the token → authorization → session handshake
pub struct Authenticator {
    transport: Transport,
    auth_url: String,
    token: Option<String>,
}

impl fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Authenticator")
            .field("transport", &self.transport)
            .field("auth_url", &self.auth_url)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl Authenticator {
    /// Create an authenticator against the public Last.fm endpoints
    ///
    /// # Errors
    /// - `LastfmError::MissingApiKey` if the API key is empty
    /// - `LastfmError::MissingApiSecret` if the API secret is empty
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> LastfmResult<Self> {
        Self::from_config(&LastfmConfig::new(api_key, api_secret))
    }

    /// Create an authenticator from configuration
    pub fn from_config(config: &LastfmConfig) -> LastfmResult<Self> {
        Ok(Self::with_transport(
            Transport::new(config)?,
            config.auth_url.clone(),
        ))
    }

    pub(crate) fn with_transport(transport: Transport, auth_url: String) -> Self {
        Self {
            transport,
            auth_url,
            token: None,
        }
    }

    /// Token obtained by the last successful `get_token`, if any
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Use a token obtained elsewhere, e.g. from a web-auth callback
    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = Some(token.into());
    }

    fn require_token(&self) -> LastfmResult<&str> {
        self.token.as_deref().ok_or(LastfmError::MissingToken)
    }

    /// Fetch an unauthorized request token (`auth.getToken`)
    ///
    /// The token is stored on the authenticator and also returned.
    ///
    /// # Errors
    /// - `LastfmError::Api` if Last.fm rejects the API key
    /// - `LastfmError::Http` / `Timeout` / `Status` on transport failure
    #[instrument(skip(self))]
    pub fn get_token(&mut self) -> LastfmResult<String> {
        let mut params = Params::new();
        params.insert("method".to_string(), "auth.getToken".to_string());

        let text = self.transport.send(params)?;
        let response: TokenResponse = serde_json::from_str(&text)?;

        debug!("Obtained Last.fm auth token");
        self.token = Some(response.token.clone());
        Ok(response.token)
    }

    /// URL where the user authorizes this application's token
    ///
    /// # Errors
    /// - `LastfmError::MissingToken` if `get_token` has not run
    /// - `LastfmError::InvalidUrl` if the configured auth URL is malformed
    pub fn user_auth_url(&self) -> LastfmResult<String> {
        let token = self.require_token()?;
        let url = Url::parse_with_params(
            &self.auth_url,
            &[("api_key", self.transport.api_key()), ("token", token)],
        )?;
        Ok(url.into())
    }

    fn session_params(&self) -> LastfmResult<Params> {
        let token = self.require_token()?;
        let mut params = Params::new();
        params.insert("method".to_string(), "auth.getSession".to_string());
        params.insert("token".to_string(), token.to_string());
        Ok(params)
    }

    /// Exchange the authorized token for a session (`auth.getSession`)
    ///
    /// # Errors
    /// - `LastfmError::MissingToken` if `get_token` has not run
    /// - `LastfmError::Api` with code 14 while the user has not yet
    ///   authorized the token, 15 once it has expired
    #[instrument(skip(self))]
    pub fn get_session(&self) -> LastfmResult<Session> {
        let params = self.session_params()?;
        let text = self.transport.send_signed(params)?;
        let response: SessionResponse = serde_json::from_str(&text)?;

        info!(user = %response.session.name, "Obtained Last.fm session");
        Ok(response.session)
    }

    /// Same request as [`get_session`](Self::get_session), raw JSON response
    #[instrument(skip(self))]
    pub fn get_session_raw(&self) -> LastfmResult<Value> {
        let params = self.session_params()?;
        let text = self.transport.send_signed(params)?;
        Ok(serde_json::from_str(&text)?)
    }
}
