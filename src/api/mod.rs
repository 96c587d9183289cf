//! # API Module
//!
//! HTTP endpoints of the relay. Everything under `/api/spotify` reads and
//! writes the session cookies; nothing is kept on the server between
//! requests.
//!
//! ## Endpoints
//!
//! ### Authentication
//!
//! - [`login`] - Starts the PKCE flow: sets the verifier cookie and answers
//!   302 to Spotify's authorization page.
//! - [`callback`] - Exchanges the authorization code, stores the token
//!   cookies and answers 302 to the success landing page.
//! - [`token`] - Returns the current access token as JSON, refreshing it
//!   from the refresh cookie when needed.
//!
//! ### Player
//!
//! - [`current`], [`next`], [`pause`] - Forwarded verbatim.
//! - [`play`], [`transfer`] - Forwarded and wrapped as `{status, body}`.
//! - [`play_status`] - Which token cookies are present.
//!
//! ### Monitoring
//!
//! - [`health`] - Application status and version.
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use spotrelay::{server, spotify::SpotifyClient};
//!
//! let state = server::AppState::new(SpotifyClient::new(settings)?);
//! let app = server::router(state);
//! ```

use axum::{
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

mod callback;
mod health;
mod login;
mod player;
mod token;

pub use callback::callback;
pub use health::health;
pub use login::login;
pub use player::{current, next, pause, play, play_status, transfer};
pub use token::token;

/// 302 Found to `location`.
pub(crate) fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}
