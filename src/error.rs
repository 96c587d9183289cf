//! Error taxonomy for the relay and its mapping onto HTTP responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};

/// Errors surfaced to the caller. None are retried; each request fails on its
/// own.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// The provider redirected back with an `error` parameter.
    #[error("authorization denied: {0}")]
    AuthorizationDenied(String),

    #[error("missing code in callback URL")]
    MissingCode,

    /// The verifier cookie expired or was already consumed.
    #[error("missing code verifier cookie")]
    MissingVerifier,

    #[error("token exchange failed with status {status}")]
    TokenExchangeFailed { status: u16, body: String },

    #[error("malformed token response: {reason}")]
    MalformedTokenResponse { reason: MalformedReason, body: Value },

    /// Neither token cookie is usable. Rendered as plain text.
    #[error("{0}")]
    Unauthenticated(&'static str),

    /// Network failure or unreadable body while talking to Spotify.
    #[error("upstream call failed: {0}")]
    UpstreamCallFailed(String),

    #[error("config error: {0}")]
    Config(String),
}

/// Why a token endpoint body could not be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MalformedReason {
    InvalidJson,
    MissingAccessToken,
}

impl std::fmt::Display for MalformedReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            MalformedReason::InvalidJson => "Invalid JSON from token endpoint",
            MalformedReason::MissingAccessToken => "No access_token in response",
        })
    }
}

impl From<reqwest::Error> for RelayError {
    fn from(e: reqwest::Error) -> Self {
        RelayError::UpstreamCallFailed(e.to_string())
    }
}

impl RelayError {
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::AuthorizationDenied(_)
            | RelayError::MissingCode
            | RelayError::MissingVerifier => StatusCode::BAD_REQUEST,
            RelayError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            RelayError::TokenExchangeFailed { .. }
            | RelayError::MalformedTokenResponse { .. }
            | RelayError::UpstreamCallFailed(_)
            | RelayError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> Value {
        match self {
            RelayError::AuthorizationDenied(reason) => json!({ "error": reason }),
            RelayError::MissingCode => json!({ "error": "Missing code in callback URL" }),
            RelayError::MissingVerifier => json!({ "error": "Missing code verifier cookie" }),
            RelayError::TokenExchangeFailed { status, body } => json!({
                "error": "Token exchange failed",
                "status": status,
                "body": body,
            }),
            RelayError::MalformedTokenResponse { reason, body } => json!({
                "error": reason.to_string(),
                "body": body,
            }),
            RelayError::Unauthenticated(reason) => json!({ "error": reason }),
            RelayError::UpstreamCallFailed(message) => json!({
                "error": "Server error",
                "message": message,
            }),
            RelayError::Config(message) => json!({
                "error": "Server error",
                "message": message,
            }),
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status();
        if let RelayError::Unauthenticated(reason) = self {
            return (status, reason).into_response();
        }
        (status, Json(self.body())).into_response()
    }
}
