use axum::{extract::State, response::Response};
use axum_extra::extract::cookie::CookieJar;

use crate::{api::found, auth, error::RelayError, server::AppState};

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, Response), RelayError> {
    let redirect = auth::begin_authorization(state.spotify.settings())?;
    tracing::debug!("redirecting to Spotify authorization");
    Ok((jar.add(redirect.verifier_cookie), found(&redirect.location)))
}
