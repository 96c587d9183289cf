//! Spotify OAuth Relay Library
//!
//! This library implements a thin server-side relay between a web client and
//! the Spotify Web API. It runs the OAuth 2.0 Authorization Code flow with
//! PKCE, keeps the resulting tokens in HTTP-only cookies, and forwards a small
//! set of player-control requests to Spotify.
//!
//! # Modules
//!
//! - `api` - HTTP handlers for the relay endpoints
//! - `auth` - PKCE handshake: authorization initiator and token exchanger
//! - `config` - Configuration management and environment variables
//! - `error` - Error taxonomy and its HTTP mapping
//! - `server` - Router construction and the HTTP server loop
//! - `spotify` - Outbound calls to the Spotify accounts and player APIs
//! - `types` - Data structures and type definitions
//! - `utils` - PKCE verifier and challenge helpers
//!
//! # Example
//!
//! ```
//! use spotrelay::{config, server};
//!
//! #[tokio::main]
//! async fn main() -> spotrelay::Res<()> {
//!     config::load_env().await?;
//!     let settings = config::Settings::from_env()?;
//!     server::start_api_server(settings).await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod server;
pub mod spotify;
pub mod types;
pub mod utils;

/// A convenient Result type alias for operations that may fail.
///
/// Used by startup and CLI code where any error simply ends the process with
/// a message. Request handling uses [`error::RelayError`] instead so every
/// failure maps onto an HTTP status.
///
/// # Example
///
/// ```
/// use spotrelay::Res;
///
/// async fn fetch_data() -> Res<String> {
///     Ok("data".to_string())
/// }
/// ```
pub type Res<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Prints an informational message with a blue bullet point.
///
/// # Example
///
/// ```
/// info!("Listening on {}", addr);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// Only used for fatal startup errors where recovery is not possible. Request
/// handlers never call this.
///
/// # Example
///
/// ```
/// error!("Missing required environment variable: {}", var_name);
/// // Program exits here - code after this will not execute
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    eprintln!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
