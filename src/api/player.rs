use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use serde_json::{Value, json};

use crate::{
    auth::cookies,
    error::RelayError,
    server::AppState,
    spotify::PlayerAction,
    types::{ForwardedBody, TokenPresence, TransferRequest, UpstreamResponse},
};

pub async fn current(State(state): State<AppState>, jar: CookieJar) -> Response {
    forward_verbatim(&state, &jar, PlayerAction::CurrentlyPlaying).await
}

pub async fn next(State(state): State<AppState>, jar: CookieJar) -> Response {
    forward_verbatim(&state, &jar, PlayerAction::Next).await
}

pub async fn pause(State(state): State<AppState>, jar: CookieJar) -> Response {
    forward_verbatim(&state, &jar, PlayerAction::Pause).await
}

/// Reports which token cookies the browser holds, without revealing them.
pub async fn play_status(jar: CookieJar) -> Json<TokenPresence> {
    Json(TokenPresence {
        access_exists: cookies::value(&jar, cookies::ACCESS_COOKIE).is_some(),
        refresh_exists: cookies::value(&jar, cookies::REFRESH_COOKIE).is_some(),
    })
}

pub async fn play(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<Value>,
) -> Response {
    let Some(token) = cookies::value(&jar, cookies::ACCESS_COOKIE) else {
        return no_access_token();
    };
    enveloped(state.spotify.play(token, &body).await)
}

pub async fn transfer(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<TransferRequest>,
) -> Response {
    let Some(token) = cookies::value(&jar, cookies::ACCESS_COOKIE) else {
        return no_access_token();
    };
    enveloped(state.spotify.transfer_playback(token, &req.device_id).await)
}

/// Upstream status and body, passed through as-is.
async fn forward_verbatim(state: &AppState, jar: &CookieJar, action: PlayerAction) -> Response {
    let Some(token) = cookies::value(jar, cookies::ACCESS_COOKIE) else {
        return (StatusCode::UNAUTHORIZED, "Unauthorized").into_response();
    };

    match state.spotify.player_action(token, action).await {
        Ok(upstream) => (upstream_status(&upstream), upstream.body).into_response(),
        Err(e) => {
            tracing::warn!(error = %e, path = action.path(), "player call failed");
            (StatusCode::BAD_GATEWAY, e.to_string()).into_response()
        }
    }
}

/// Status and body wrapped in JSON; 200 whenever Spotify succeeded.
fn enveloped(result: Result<UpstreamResponse, RelayError>) -> Response {
    match result {
        Ok(upstream) => {
            let status = if upstream.is_success() {
                StatusCode::OK
            } else {
                upstream_status(&upstream)
            };
            let body = ForwardedBody {
                status: upstream.status,
                body: upstream.body,
            };
            (status, Json(body)).into_response()
        }
        Err(e) => {
            tracing::warn!(error = %e, "player call failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "server_error", "message": e.to_string() })),
            )
                .into_response()
        }
    }
}

fn no_access_token() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": "No access token" })),
    )
        .into_response()
}

fn upstream_status(upstream: &UpstreamResponse) -> StatusCode {
    StatusCode::from_u16(upstream.status).unwrap_or(StatusCode::BAD_GATEWAY)
}
