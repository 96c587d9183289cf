use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body returned by the Spotify token endpoint.
///
/// Every field is optional on the wire; [`TokenResponse::grant`] decides
/// whether the payload is usable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
    /// Kept as raw JSON: a non-numeric value falls back to the default
    /// lifetime instead of failing the whole exchange.
    #[serde(default)]
    pub expires_in: Option<Value>,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

impl TokenResponse {
    pub const DEFAULT_EXPIRES_IN: i64 = 3600;

    /// Converts the payload into a [`TokenGrant`] when it carries a
    /// non-empty access token.
    pub fn grant(self) -> Option<TokenGrant> {
        let access_token = self.access_token.filter(|t| !t.is_empty())?;
        let expires_in = self
            .expires_in
            .as_ref()
            .and_then(Value::as_i64)
            .unwrap_or(Self::DEFAULT_EXPIRES_IN);

        Some(TokenGrant {
            access_token,
            expires_in,
            refresh_token: self.refresh_token.filter(|t| !t.is_empty()),
        })
    }
}

/// A usable result of a code exchange or refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenGrant {
    pub access_token: String,
    /// Seconds, used verbatim as the access cookie's max-age.
    pub expires_in: i64,
    /// Present when the provider issued or rotated a refresh token.
    pub refresh_token: Option<String>,
}

/// PKCE verifier and the challenge derived from it.
#[derive(Debug, Clone)]
pub struct PkcePair {
    pub code_verifier: String,
    pub code_challenge: String,
}

/// Query string Spotify sends back to the callback.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub error: Option<String>,
    pub state: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenBody {
    pub access_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPresence {
    pub access_exists: bool,
    pub refresh_exists: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferRequest {
    pub device_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferPlaybackRequest {
    pub device_ids: Vec<String>,
    pub play: bool,
}

/// Status and raw body of a forwarded Spotify call.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: u16,
    pub body: String,
}

impl UpstreamResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Envelope used by the play and transfer endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForwardedBody {
    pub status: u16,
    pub body: String,
}
