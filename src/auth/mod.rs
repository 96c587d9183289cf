//! PKCE handshake between the browser, the relay and Spotify.
//!
//! - [`initiator`] builds the authorization redirect and the verifier cookie.
//! - [`exchanger`] completes the callback and keeps an access token available
//!   through the refresh path.
//! - [`cookies`] owns the cookie names, lifetimes and attributes.
//!
//! All session state lives in the client's cookie jar and is threaded through
//! each call as an [`axum_extra::extract::cookie::CookieJar`].

pub mod cookies;
pub mod exchanger;
pub mod initiator;

pub use exchanger::{CallbackOutcome, complete_authorization, ensure_access_token, settle_callback};
pub use initiator::{AuthorizationRedirect, begin_authorization};
