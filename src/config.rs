//! Configuration management for the Spotify relay.
//!
//! This module handles loading configuration values from environment variables
//! and `.env` files and freezing them into an immutable [`Settings`] value
//! that is handed to the server at startup.
//!
//! The configuration system follows a hierarchical approach:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. Application defaults (where applicable)

use std::{env, net::SocketAddr, path::PathBuf, str::FromStr, time::Duration};

use crate::error::RelayError;

pub const DEFAULT_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
pub const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:5173";
pub const DEFAULT_SUCCESS_REDIRECT: &str = "/?spotify_auth=success";
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 10;

/// Scopes needed by the Web Playback SDK and the player endpoints.
pub const DEFAULT_SCOPE: &str = "streaming user-read-email user-read-private user-read-playback-state user-modify-playback-state";

/// Loads environment variables from a `.env` file in the local data directory.
///
/// Looks for the file under `spotrelay/.env` in the platform-specific local
/// data directory and creates the directory if needed. A missing `.env` file
/// is not an error: the relay is then configured purely from the process
/// environment, which is the usual case in containers.
///
/// # Directory Structure
///
/// - Linux: `~/.local/share/spotrelay/.env`
/// - macOS: `~/Library/Application Support/spotrelay/.env`
/// - Windows: `%LOCALAPPDATA%/spotrelay/.env`
///
/// # Errors
///
/// Returns an error if the parent directory cannot be created or if the
/// `.env` file exists but cannot be parsed.
pub async fn load_env() -> Result<(), String> {
    let path = env_file_path();
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }

    if !path.is_file() {
        tracing::debug!(path = %path.display(), "no .env file found, using process environment");
        return Ok(());
    }

    dotenv::from_path(&path).map_err(|e| e.to_string())
}

fn env_file_path() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("spotrelay/.env");
    path
}

/// Runtime settings for the relay, read once at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    pub server_addr: SocketAddr,
    pub client_id: String,
    pub redirect_uri: String,
    pub scope: String,
    pub auth_url: String,
    pub token_url: String,
    pub api_url: String,
    /// Where the user agent lands after a successful callback.
    pub success_redirect: String,
    /// Enables the `Secure` attribute on every cookie.
    pub production: bool,
    pub upstream_timeout: Duration,
}

impl Settings {
    /// Builds settings from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Config`] when `SPOTIFY_API_AUTH_CLIENT_ID` or
    /// `SPOTIFY_API_REDIRECT_URI` is missing, or when `SERVER_ADDRESS` or
    /// `SPOTRELAY_UPSTREAM_TIMEOUT_SECS` cannot be parsed.
    ///
    /// # Example
    ///
    /// ```
    /// let settings = Settings::from_env()?;
    /// println!("listening on {}", settings.server_addr);
    /// ```
    pub fn from_env() -> Result<Self, RelayError> {
        let timeout_secs: u64 = parse_var(
            "SPOTRELAY_UPSTREAM_TIMEOUT_SECS",
            DEFAULT_UPSTREAM_TIMEOUT_SECS,
        )?;
        let server_addr = SocketAddr::from_str(&var_or("SERVER_ADDRESS", DEFAULT_SERVER_ADDRESS))
            .map_err(|e| RelayError::Config(format!("invalid SERVER_ADDRESS: {e}")))?;

        Ok(Self {
            server_addr,
            client_id: required_var("SPOTIFY_API_AUTH_CLIENT_ID")?,
            redirect_uri: required_var("SPOTIFY_API_REDIRECT_URI")?,
            scope: var_or("SPOTIFY_API_AUTH_SCOPE", DEFAULT_SCOPE),
            auth_url: var_or("SPOTIFY_API_AUTH_URL", DEFAULT_AUTH_URL),
            token_url: var_or("SPOTIFY_API_TOKEN_URL", DEFAULT_TOKEN_URL),
            api_url: trim_base(var_or("SPOTIFY_API_URL", DEFAULT_API_URL)),
            success_redirect: var_or("SPOTRELAY_SUCCESS_REDIRECT", DEFAULT_SUCCESS_REDIRECT),
            production: is_production(env::var("SPOTRELAY_ENV").ok().as_deref()),
            upstream_timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// Settings with Spotify's public endpoints and the given client
    /// credentials. Everything else takes its default.
    pub fn new(client_id: impl Into<String>, redirect_uri: impl Into<String>) -> Self {
        Self {
            server_addr: SocketAddr::from(([127, 0, 0, 1], 5173)),
            client_id: client_id.into(),
            redirect_uri: redirect_uri.into(),
            scope: DEFAULT_SCOPE.to_string(),
            auth_url: DEFAULT_AUTH_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            success_redirect: DEFAULT_SUCCESS_REDIRECT.to_string(),
            production: false,
            upstream_timeout: Duration::from_secs(DEFAULT_UPSTREAM_TIMEOUT_SECS),
        }
    }

    pub fn with_token_url(mut self, token_url: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = trim_base(api_url.into());
        self
    }

    pub fn with_production(mut self, production: bool) -> Self {
        self.production = production;
        self
    }
}

fn required_var(key: &str) -> Result<String, RelayError> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(RelayError::Config(format!("{key} must be set"))),
    }
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_var<T: FromStr>(key: &str, default: T) -> Result<T, RelayError>
where
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|e| RelayError::Config(format!("invalid {key}: {e}"))),
        _ => Ok(default),
    }
}

fn is_production(value: Option<&str>) -> bool {
    value.is_some_and(|v| v.trim().eq_ignore_ascii_case("production"))
}

fn trim_base(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn production_flag_is_case_insensitive() {
        assert!(is_production(Some("production")));
        assert!(is_production(Some(" PRODUCTION ")));
        assert!(!is_production(Some("development")));
        assert!(!is_production(None));
    }

    #[test]
    fn api_url_loses_trailing_slash() {
        let settings = Settings::new("id", "http://localhost/cb").with_api_url("http://x/v1/");
        assert_eq!(settings.api_url, "http://x/v1");
    }

    #[test]
    fn defaults_point_at_spotify() {
        let settings = Settings::new("id", "http://localhost/cb");
        assert_eq!(settings.auth_url, DEFAULT_AUTH_URL);
        assert_eq!(settings.token_url, DEFAULT_TOKEN_URL);
        assert_eq!(settings.success_redirect, "/?spotify_auth=success");
        assert!(!settings.production);
    }
}
