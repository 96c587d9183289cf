use reqwest::{Method, RequestBuilder, header::CONTENT_LENGTH};
use serde_json::Value;

use crate::{
    error::RelayError,
    types::{TransferPlaybackRequest, UpstreamResponse},
};

use super::SpotifyClient;

/// Player calls that take no request body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerAction {
    CurrentlyPlaying,
    Next,
    Pause,
}

impl PlayerAction {
    pub fn method(self) -> Method {
        match self {
            PlayerAction::CurrentlyPlaying => Method::GET,
            PlayerAction::Next => Method::POST,
            PlayerAction::Pause => Method::PUT,
        }
    }

    /// Path below the Web API base URL.
    pub fn path(self) -> &'static str {
        match self {
            PlayerAction::CurrentlyPlaying => "/me/player/currently-playing",
            PlayerAction::Next => "/me/player/next",
            PlayerAction::Pause => "/me/player/pause",
        }
    }
}

impl SpotifyClient {
    /// Forwards a body-less player action with the caller's access token.
    ///
    /// # Returns
    ///
    /// The upstream status and raw body, whatever the status. Only transport
    /// failures are errors.
    pub async fn player_action(
        &self,
        token: &str,
        action: PlayerAction,
    ) -> Result<UpstreamResponse, RelayError> {
        let mut req = self.player_request(action.method(), action.path(), token);
        if action.method() != Method::GET {
            // Spotify answers 411 to a body-less PUT/POST without a length.
            req = req.header(CONTENT_LENGTH, 0);
        }
        send(req).await
    }

    /// Starts or resumes playback. `body` is forwarded untouched, so the web
    /// client controls `uris`, `context_uri`, `offset` and `position_ms`.
    pub async fn play(&self, token: &str, body: &Value) -> Result<UpstreamResponse, RelayError> {
        let req = self
            .player_request(Method::PUT, "/me/player/play", token)
            .json(body);
        send(req).await
    }

    /// Moves playback to `device_id` without starting it.
    pub async fn transfer_playback(
        &self,
        token: &str,
        device_id: &str,
    ) -> Result<UpstreamResponse, RelayError> {
        let body = TransferPlaybackRequest {
            device_ids: vec![device_id.to_string()],
            play: false,
        };
        let req = self
            .player_request(Method::PUT, "/me/player", token)
            .json(&body);
        send(req).await
    }

    fn player_request(&self, method: Method, path: &str, token: &str) -> RequestBuilder {
        let url = format!("{base}{path}", base = self.settings().api_url);
        self.http().request(method, url).bearer_auth(token)
    }
}

async fn send(req: RequestBuilder) -> Result<UpstreamResponse, RelayError> {
    let res = req.send().await?;
    let status = res.status().as_u16();
    let body = res.text().await?;
    Ok(UpstreamResponse { status, body })
}
