use axum_extra::extract::cookie::Cookie;
use reqwest::Url;

use crate::{
    auth::cookies, config::Settings, error::RelayError, types::PkcePair, utils,
};

/// Everything the login endpoint needs to answer: where to send the user
/// agent and the cookie that carries the verifier until the callback.
#[derive(Debug, Clone)]
pub struct AuthorizationRedirect {
    pub location: String,
    pub verifier_cookie: Cookie<'static>,
}

/// Starts the PKCE authorization flow.
///
/// Generates a fresh verifier, derives its `S256` challenge, and builds the
/// Spotify authorization URL. The verifier itself never leaves the relay
/// except inside the HTTP-only verifier cookie.
///
/// # Arguments
///
/// * `settings` - Client id, redirect URI, scope and endpoint configuration
///
/// # Errors
///
/// Returns [`RelayError::Config`] if the configured authorization URL is not
/// a valid absolute URL.
///
/// # Example
///
/// ```
/// let redirect = begin_authorization(&settings)?;
/// let jar = jar.add(redirect.verifier_cookie);
/// // respond 302 to redirect.location
/// ```
pub fn begin_authorization(settings: &Settings) -> Result<AuthorizationRedirect, RelayError> {
    let pkce = utils::generate_pkce_pair();
    let location = build_authorization_url(settings, &pkce)?;

    Ok(AuthorizationRedirect {
        location,
        verifier_cookie: cookies::verifier_cookie(pkce.code_verifier, settings.production),
    })
}

pub fn build_authorization_url(settings: &Settings, pkce: &PkcePair) -> Result<String, RelayError> {
    let url = Url::parse_with_params(
        &settings.auth_url,
        &[
            ("client_id", settings.client_id.as_str()),
            ("response_type", "code"),
            ("redirect_uri", settings.redirect_uri.as_str()),
            ("code_challenge_method", "S256"),
            ("code_challenge", pkce.code_challenge.as_str()),
            ("scope", settings.scope.as_str()),
        ],
    )
    .map_err(|e| RelayError::Config(format!("invalid authorization URL: {e}")))?;

    Ok(url.into())
}
