use axum::{Json, extract::State};
use axum_extra::extract::cookie::CookieJar;

use crate::{auth, error::RelayError, server::AppState, types::AccessTokenBody};

/// Hands the browser an access token for the Web Playback SDK, refreshing it
/// from the refresh cookie when the access cookie has expired.
pub async fn token(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<AccessTokenBody>), RelayError> {
    let (jar, access_token) = auth::ensure_access_token(&state.spotify, jar).await?;
    Ok((jar, Json(AccessTokenBody { access_token })))
}
