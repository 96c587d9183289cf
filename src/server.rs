use axum::{
    Router,
    routing::{get, post, put},
};
use tower_http::trace::TraceLayer;

use crate::{Res, api, config::Settings, info, spotify::SpotifyClient, success};

/// Router state. The only value shared between requests; never mutated.
#[derive(Debug, Clone)]
pub struct AppState {
    pub spotify: SpotifyClient,
}

impl AppState {
    pub fn new(spotify: SpotifyClient) -> Self {
        Self { spotify }
    }
}

pub fn router(state: AppState) -> Router {
    let spotify_routes = Router::new()
        .route("/login", get(api::login))
        .route("/callback", get(api::callback))
        .route("/token", get(api::token))
        .route("/current", get(api::current))
        .route("/next", post(api::next))
        .route("/pause", put(api::pause))
        .route("/play", get(api::play_status).put(api::play))
        .route("/transfer", post(api::transfer));

    Router::new()
        .route("/health", get(api::health))
        .nest("/api/spotify", spotify_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Binds the configured address and serves until Ctrl-C.
pub async fn start_api_server(settings: Settings) -> Res<()> {
    let addr = settings.server_addr;
    let state = AppState::new(SpotifyClient::new(settings)?);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    success!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
