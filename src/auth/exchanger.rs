use axum_extra::extract::cookie::CookieJar;
use serde_json::Value;

use crate::{
    auth::cookies,
    error::{MalformedReason, RelayError},
    spotify::SpotifyClient,
    types::{CallbackParams, TokenGrant},
};

/// Terminal states of the authorization callback.
///
/// The handshake is linear: the first check that fails decides the outcome,
/// and only `ExchangeFailed`, `Malformed`, `UpstreamFailed` and `Success`
/// are reached after a call to the token endpoint.
#[derive(Debug, Clone, PartialEq)]
pub enum CallbackOutcome {
    AuthorizationDenied(String),
    MissingCode,
    MissingVerifier,
    ExchangeFailed { status: u16, body: String },
    Malformed { reason: MalformedReason, body: Value },
    UpstreamFailed(String),
    Success(TokenGrant),
}

impl CallbackOutcome {
    pub fn into_result(self) -> Result<TokenGrant, RelayError> {
        match self {
            CallbackOutcome::AuthorizationDenied(e) => Err(RelayError::AuthorizationDenied(e)),
            CallbackOutcome::MissingCode => Err(RelayError::MissingCode),
            CallbackOutcome::MissingVerifier => Err(RelayError::MissingVerifier),
            CallbackOutcome::ExchangeFailed { status, body } => {
                Err(RelayError::TokenExchangeFailed { status, body })
            }
            CallbackOutcome::Malformed { reason, body } => {
                Err(RelayError::MalformedTokenResponse { reason, body })
            }
            CallbackOutcome::UpstreamFailed(message) => {
                Err(RelayError::UpstreamCallFailed(message))
            }
            CallbackOutcome::Success(grant) => Ok(grant),
        }
    }
}

impl From<RelayError> for CallbackOutcome {
    fn from(err: RelayError) -> Self {
        match err {
            RelayError::TokenExchangeFailed { status, body } => {
                CallbackOutcome::ExchangeFailed { status, body }
            }
            RelayError::MalformedTokenResponse { reason, body } => {
                CallbackOutcome::Malformed { reason, body }
            }
            other => CallbackOutcome::UpstreamFailed(other.to_string()),
        }
    }
}

/// Runs the callback half of the handshake.
///
/// The provider's `error` parameter, a missing `code` and a missing verifier
/// all short-circuit before any network call.
///
/// # Arguments
///
/// * `spotify` - Client used for the code exchange
/// * `params` - Query parameters Spotify redirected back with
/// * `verifier` - Value of the verifier cookie, if the request carried one
pub async fn complete_authorization(
    spotify: &SpotifyClient,
    params: &CallbackParams,
    verifier: Option<&str>,
) -> CallbackOutcome {
    if let Some(error) = params.error.as_deref().filter(|e| !e.is_empty()) {
        return CallbackOutcome::AuthorizationDenied(error.to_string());
    }
    let Some(code) = params.code.as_deref().filter(|c| !c.is_empty()) else {
        return CallbackOutcome::MissingCode;
    };
    let Some(verifier) = verifier else {
        return CallbackOutcome::MissingVerifier;
    };

    match spotify.exchange_code_pkce(code, verifier).await {
        Ok(grant) => CallbackOutcome::Success(grant),
        Err(e) => e.into(),
    }
}

/// Applies an outcome to the response cookies.
///
/// The verifier is single use: any verifier the request carried is cleared
/// whatever the outcome. Token cookies are only written on success.
pub fn settle_callback(
    jar: CookieJar,
    outcome: CallbackOutcome,
    secure: bool,
) -> (CookieJar, Result<TokenGrant, RelayError>) {
    let jar = cookies::clear_verifier(jar);
    match outcome.into_result() {
        Ok(grant) => {
            let jar = cookies::store_grant(jar, &grant, secure);
            (jar, Ok(grant))
        }
        Err(e) => (jar, Err(e)),
    }
}

/// Returns a usable access token, refreshing it if needed.
///
/// An access cookie is trusted as long as the browser still sends it; its
/// max-age already mirrors the provider's lifetime. Without one, the refresh
/// cookie is exchanged for a new access token and the new cookies are added
/// to the returned jar.
///
/// # Errors
///
/// - [`RelayError::Unauthenticated`] with `"No tokens"` when neither cookie
///   is present. No network call is made.
/// - [`RelayError::Unauthenticated`] with `"Failed to refresh"` when the
///   refresh grant fails for any reason.
pub async fn ensure_access_token(
    spotify: &SpotifyClient,
    jar: CookieJar,
) -> Result<(CookieJar, String), RelayError> {
    if let Some(access) = cookies::value(&jar, cookies::ACCESS_COOKIE) {
        let access = access.to_string();
        return Ok((jar, access));
    }

    let Some(refresh) = cookies::value(&jar, cookies::REFRESH_COOKIE).map(str::to_string) else {
        return Err(RelayError::Unauthenticated("No tokens"));
    };

    match spotify.refresh_token(&refresh).await {
        Ok(grant) => {
            tracing::info!(
                rotated = grant.refresh_token.is_some(),
                expires_in = grant.expires_in,
                "refreshed access token"
            );
            let jar = cookies::store_grant(jar, &grant, spotify.settings().production);
            Ok((jar, grant.access_token))
        }
        Err(e) => {
            tracing::warn!(error = %e, "token refresh failed");
            Err(RelayError::Unauthenticated("Failed to refresh"))
        }
    }
}
