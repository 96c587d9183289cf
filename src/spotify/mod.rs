//! # Spotify Integration Module
//!
//! Outbound HTTP calls from the relay to Spotify. Two surfaces are used:
//!
//! ```text
//! Relay handlers (api)
//!          ↓
//! Spotify Integration Layer
//!     ├── Accounts (token endpoint: code exchange, refresh)
//!     └── Player (currently-playing, next, pause, play, transfer)
//!          ↓
//! HTTP Layer (reqwest, form + JSON)
//!          ↓
//! accounts.spotify.com / api.spotify.com
//! ```
//!
//! ## Accounts
//!
//! [`auth`] posts form-encoded grants to the token endpoint. Responses are
//! read as text first so a failed exchange can be reported with the upstream
//! status and body untouched, and so an unparsable success body can be told
//! apart from a transport failure.
//!
//! ## Player
//!
//! [`player`] forwards the caller's access token as a bearer credential and
//! hands back the upstream status and raw body. Nothing is retried: a failed
//! call is reported to the web client, which decides whether to try again.
//!
//! ## Client Lifecycle
//!
//! A single [`SpotifyClient`] is built at startup and cloned into every
//! request. It wraps a pooled `reqwest::Client` with the configured upstream
//! timeout plus the immutable [`Settings`].

use std::sync::Arc;

use reqwest::Client;

use crate::{config::Settings, error::RelayError};

pub mod auth;
pub mod player;

pub use player::PlayerAction;

/// Shared handle for all calls to Spotify.
#[derive(Debug, Clone)]
pub struct SpotifyClient {
    http: Client,
    settings: Arc<Settings>,
}

impl SpotifyClient {
    /// Builds the pooled HTTP client for the given settings.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Config`] if the TLS backend cannot be
    /// initialized.
    pub fn new(settings: Settings) -> Result<Self, RelayError> {
        let http = Client::builder()
            .timeout(settings.upstream_timeout)
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()
            .map_err(|e| RelayError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            settings: Arc::new(settings),
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub(crate) fn http(&self) -> &Client {
        &self.http
    }
}
