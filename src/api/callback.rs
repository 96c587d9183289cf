use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;

use crate::{
    api::found,
    auth::{self, cookies},
    server::AppState,
    types::CallbackParams,
};

pub async fn callback(
    State(state): State<AppState>,
    Query(params): Query<CallbackParams>,
    jar: CookieJar,
) -> Response {
    let verifier = cookies::value(&jar, cookies::VERIFIER_COOKIE).map(str::to_string);
    let outcome = auth::complete_authorization(&state.spotify, &params, verifier.as_deref()).await;

    let settings = state.spotify.settings();
    let (jar, result) = auth::settle_callback(jar, outcome, settings.production);

    match result {
        Ok(grant) => {
            tracing::info!(
                expires_in = grant.expires_in,
                has_refresh = grant.refresh_token.is_some(),
                "authorization completed"
            );
            (jar, found(&settings.success_redirect)).into_response()
        }
        Err(e) => {
            tracing::warn!(error = %e, "authorization callback failed");
            (jar, e).into_response()
        }
    }
}
