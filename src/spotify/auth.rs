use serde_json::Value;

use crate::{
    error::{MalformedReason, RelayError},
    types::{TokenGrant, TokenResponse},
};

use super::SpotifyClient;

impl SpotifyClient {
    /// Exchanges an authorization code for an access token using PKCE.
    ///
    /// Completes the OAuth 2.0 PKCE flow by posting the authorization code
    /// together with the verifier that was generated at the start of the
    /// flow. Spotify checks the verifier against the challenge sent in the
    /// authorization request, so no client secret is involved.
    ///
    /// # Arguments
    ///
    /// * `code` - Authorization code received on the callback
    /// * `verifier` - PKCE code verifier read from the verifier cookie
    ///
    /// # Returns
    ///
    /// - `Ok(TokenGrant)` - Access token, its lifetime, and an optional refresh token
    /// - `Err(RelayError::TokenExchangeFailed)` - Spotify answered with a non-2xx status
    /// - `Err(RelayError::MalformedTokenResponse)` - Body is not JSON or has no access token
    /// - `Err(RelayError::UpstreamCallFailed)` - Network or body read failure
    ///
    /// # Example
    ///
    /// ```
    /// let grant = spotify.exchange_code_pkce("AQA...auth_code", "dBjftJeZ...verifier").await?;
    /// println!("expires in {}s", grant.expires_in);
    /// ```
    pub async fn exchange_code_pkce(
        &self,
        code: &str,
        verifier: &str,
    ) -> Result<TokenGrant, RelayError> {
        let settings = self.settings();
        self.request_token(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", settings.redirect_uri.as_str()),
            ("client_id", settings.client_id.as_str()),
            ("code_verifier", verifier),
        ])
        .await
    }

    /// Exchanges a refresh token for a new access token.
    ///
    /// Spotify may rotate the refresh token; when it does, the returned
    /// grant carries the new one and the caller should replace its copy.
    ///
    /// # Errors
    ///
    /// Same failure kinds as [`SpotifyClient::exchange_code_pkce`]. The
    /// refresh path collapses all of them into an unauthenticated response.
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<TokenGrant, RelayError> {
        self.request_token(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", self.settings().client_id.as_str()),
        ])
        .await
    }

    async fn request_token(&self, form: &[(&str, &str)]) -> Result<TokenGrant, RelayError> {
        let res = self
            .http()
            .post(&self.settings().token_url)
            .form(form)
            .send()
            .await?;

        let status = res.status();
        let text = res.text().await?;

        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "token endpoint rejected grant");
            return Err(RelayError::TokenExchangeFailed {
                status: status.as_u16(),
                body: text,
            });
        }

        parse_token_body(&text)
    }
}

/// Interprets a 2xx token endpoint body.
pub(crate) fn parse_token_body(text: &str) -> Result<TokenGrant, RelayError> {
    let json: Value = serde_json::from_str(text).map_err(|_| RelayError::MalformedTokenResponse {
        reason: MalformedReason::InvalidJson,
        body: Value::String(text.to_string()),
    })?;

    serde_json::from_value::<TokenResponse>(json.clone())
        .ok()
        .and_then(TokenResponse::grant)
        .ok_or(RelayError::MalformedTokenResponse {
            reason: MalformedReason::MissingAccessToken,
            body: json,
        })
}
