//! End-to-end tests for the relay router.
//!
//! Requests go through `tower::ServiceExt::oneshot`; Spotify's token and
//! player endpoints are played by a `wiremock` server. Mocks mounted with
//! `.expect(0)` assert that a path never reaches the network.

use std::collections::HashMap;

use axum::{
    Router,
    body::Body,
    http::{Request, Response, StatusCode, header},
};
use serde_json::{Value, json};
use tower::ServiceExt;
use wiremock::matchers::{body_json, body_string_contains, header as header_eq, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use spotrelay::{
    config::Settings,
    server::{AppState, router},
    spotify::SpotifyClient,
    utils::generate_code_challenge,
};

const REDIRECT_URI: &str = "http://127.0.0.1:5173/api/spotify/callback";

fn app_for(server: &MockServer) -> Router {
    let settings = Settings::new("client-123", REDIRECT_URI)
        .with_token_url(format!("{}/api/token", server.uri()))
        .with_api_url(format!("{}/v1", server.uri()));
    router(AppState::new(SpotifyClient::new(settings).unwrap()))
}

fn request(method: &str, uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

fn json_request(method: &str, uri: &str, cookie: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn set_cookies(res: &Response<Body>) -> Vec<String> {
    res.headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect()
}

fn find_cookie(cookies: &[String], name: &str) -> Option<String> {
    let prefix = format!("{name}=");
    cookies.iter().find(|c| c.starts_with(&prefix)).cloned()
}

fn location(res: &Response<Body>) -> String {
    res.headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string()
}

async fn body_string(res: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn body_json_value(res: Response<Body>) -> Value {
    serde_json::from_str(&body_string(res).await).unwrap()
}

async fn forbid_token_calls(server: &MockServer) {
    Mock::given(path("/api/token"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(server)
        .await;
}

// ---------------------------------------------------------------------------
// login
// ---------------------------------------------------------------------------

#[tokio::test]
async fn login_redirects_to_spotify_and_stores_verifier() {
    let server = MockServer::start().await;
    let res = app_for(&server)
        .oneshot(request("GET", "/api/spotify/login", None))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::FOUND);

    let cookies = set_cookies(&res);
    let verifier_cookie = find_cookie(&cookies, "spotify_code_verifier").unwrap();
    assert!(verifier_cookie.contains("HttpOnly"));
    assert!(verifier_cookie.contains("SameSite=Lax"));
    assert!(verifier_cookie.contains("Path=/"));
    assert!(verifier_cookie.contains("Max-Age=300"));
    assert!(!verifier_cookie.contains("Secure"));

    let verifier = verifier_cookie
        .trim_start_matches("spotify_code_verifier=")
        .split(';')
        .next()
        .unwrap()
        .to_string();
    assert!(verifier.len() >= 43);

    let location = location(&res);
    assert!(location.starts_with("https://accounts.spotify.com/authorize?"));
    let url = reqwest::Url::parse(&location).unwrap();
    let query: HashMap<String, String> = url.query_pairs().into_owned().collect();
    assert_eq!(query["client_id"], "client-123");
    assert_eq!(query["response_type"], "code");
    assert_eq!(query["redirect_uri"], REDIRECT_URI);
    assert_eq!(query["code_challenge_method"], "S256");
    assert_eq!(query["code_challenge"], generate_code_challenge(&verifier));
    assert!(query["scope"].contains("streaming"));
}

// ---------------------------------------------------------------------------
// callback
// ---------------------------------------------------------------------------

#[tokio::test]
async fn callback_with_provider_error_is_400_without_network() {
    let server = MockServer::start().await;
    forbid_token_calls(&server).await;

    let res = app_for(&server)
        .oneshot(request(
            "GET",
            "/api/spotify/callback?error=access_denied",
            Some("spotify_code_verifier=v"),
        ))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json_value(res).await, json!({ "error": "access_denied" }));
}

#[tokio::test]
async fn callback_without_code_is_400() {
    let server = MockServer::start().await;
    forbid_token_calls(&server).await;

    let res = app_for(&server)
        .oneshot(request(
            "GET",
            "/api/spotify/callback",
            Some("spotify_code_verifier=v"),
        ))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json_value(res).await["error"],
        "Missing code in callback URL"
    );
}

#[tokio::test]
async fn callback_without_verifier_is_400_without_network() {
    let server = MockServer::start().await;
    forbid_token_calls(&server).await;

    let res = app_for(&server)
        .oneshot(request("GET", "/api/spotify/callback?code=XYZ", None))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json_value(res).await["error"],
        "Missing code verifier cookie"
    );
}

#[tokio::test]
async fn callback_success_sets_access_cookie_and_clears_verifier() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/token"))
        .and(body_string_contains("grant_type=authorization_code"))
        .and(body_string_contains("code=XYZ"))
        .and(body_string_contains("code_verifier=the-verifier"))
        .and(body_string_contains("client_id=client-123"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "access_token": "T", "expires_in": 3600 })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let res = app_for(&server)
        .oneshot(request(
            "GET",
            "/api/spotify/callback?code=XYZ",
            Some("spotify_code_verifier=the-verifier"),
        ))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), "/?spotify_auth=success");

    let cookies = set_cookies(&res);
    let access = find_cookie(&cookies, "spotify_access_token").unwrap();
    assert!(access.starts_with("spotify_access_token=T;"));
    assert!(access.contains("Max-Age=3600"));
    assert!(access.contains("HttpOnly"));

    let verifier = find_cookie(&cookies, "spotify_code_verifier").unwrap();
    assert!(verifier.starts_with("spotify_code_verifier=;"));
    assert!(verifier.contains("Max-Age=0"));

    assert!(find_cookie(&cookies, "spotify_refresh_token").is_none());
}

#[tokio::test]
async fn callback_defaults_expiry_and_stores_refresh_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/token"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "access_token": "T", "refresh_token": "R" })),
        )
        .mount(&server)
        .await;

    let res = app_for(&server)
        .oneshot(request(
            "GET",
            "/api/spotify/callback?code=XYZ",
            Some("spotify_code_verifier=v"),
        ))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::FOUND);
    let cookies = set_cookies(&res);
    let access = find_cookie(&cookies, "spotify_access_token").unwrap();
    assert!(access.contains("Max-Age=3600"));
    let refresh = find_cookie(&cookies, "spotify_refresh_token").unwrap();
    assert!(refresh.starts_with("spotify_refresh_token=R;"));
    assert!(refresh.contains("Max-Age=2592000"));
}

#[tokio::test]
async fn callback_reports_rejected_exchange_and_clears_verifier() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/token"))
        .respond_with(
            ResponseTemplate::new(400).set_body_string(r#"{"error":"invalid_grant"}"#),
        )
        .mount(&server)
        .await;

    let res = app_for(&server)
        .oneshot(request(
            "GET",
            "/api/spotify/callback?code=XYZ",
            Some("spotify_code_verifier=v"),
        ))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let cookies = set_cookies(&res);
    assert!(
        find_cookie(&cookies, "spotify_code_verifier")
            .unwrap()
            .contains("Max-Age=0")
    );
    assert!(find_cookie(&cookies, "spotify_access_token").is_none());

    let body = body_json_value(res).await;
    assert_eq!(body["error"], "Token exchange failed");
    assert_eq!(body["status"], 400);
    assert_eq!(body["body"], r#"{"error":"invalid_grant"}"#);
}

#[tokio::test]
async fn callback_rejects_non_json_token_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/token"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let res = app_for(&server)
        .oneshot(request(
            "GET",
            "/api/spotify/callback?code=XYZ",
            Some("spotify_code_verifier=v"),
        ))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json_value(res).await;
    assert_eq!(body["error"], "Invalid JSON from token endpoint");
    assert_eq!(body["body"], "not json");
}

#[tokio::test]
async fn callback_rejects_token_body_without_access_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token_type": "Bearer" })))
        .mount(&server)
        .await;

    let res = app_for(&server)
        .oneshot(request(
            "GET",
            "/api/spotify/callback?code=XYZ",
            Some("spotify_code_verifier=v"),
        ))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json_value(res).await;
    assert_eq!(body["error"], "No access_token in response");
    assert_eq!(body["body"]["token_type"], "Bearer");
}

// ---------------------------------------------------------------------------
// token
// ---------------------------------------------------------------------------

#[tokio::test]
async fn token_returns_access_cookie_without_network() {
    let server = MockServer::start().await;
    forbid_token_calls(&server).await;

    let res = app_for(&server)
        .oneshot(request(
            "GET",
            "/api/spotify/token",
            Some("spotify_access_token=A; spotify_refresh_token=R"),
        ))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert!(set_cookies(&res).is_empty());
    assert_eq!(body_json_value(res).await, json!({ "access_token": "A" }));
}

#[tokio::test]
async fn token_refreshes_from_refresh_cookie() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=R"))
        .and(body_string_contains("client_id=client-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "N",
            "expires_in": 1800,
            "refresh_token": "R2"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let res = app_for(&server)
        .oneshot(request(
            "GET",
            "/api/spotify/token",
            Some("spotify_refresh_token=R"),
        ))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let cookies = set_cookies(&res);
    let access = find_cookie(&cookies, "spotify_access_token").unwrap();
    assert!(access.starts_with("spotify_access_token=N;"));
    assert!(access.contains("Max-Age=1800"));
    let refresh = find_cookie(&cookies, "spotify_refresh_token").unwrap();
    assert!(refresh.starts_with("spotify_refresh_token=R2;"));

    assert_eq!(body_json_value(res).await, json!({ "access_token": "N" }));
}

#[tokio::test]
async fn token_without_cookies_is_401_without_network() {
    let server = MockServer::start().await;
    forbid_token_calls(&server).await;

    let res = app_for(&server)
        .oneshot(request("GET", "/api/spotify/token", None))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_string(res).await, "No tokens");
}

#[tokio::test]
async fn token_refresh_failure_is_401() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/token"))
        .respond_with(ResponseTemplate::new(400).set_body_string("invalid_grant"))
        .mount(&server)
        .await;

    let res = app_for(&server)
        .oneshot(request(
            "GET",
            "/api/spotify/token",
            Some("spotify_refresh_token=stale"),
        ))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert!(set_cookies(&res).is_empty());
    assert_eq!(body_string(res).await, "Failed to refresh");
}

// ---------------------------------------------------------------------------
// player
// ---------------------------------------------------------------------------

#[tokio::test]
async fn current_forwards_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/me/player/currently-playing"))
        .and(header_eq("authorization", "Bearer A"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"is_playing":true}"#))
        .mount(&server)
        .await;

    let res = app_for(&server)
        .oneshot(request(
            "GET",
            "/api/spotify/current",
            Some("spotify_access_token=A"),
        ))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_string(res).await, r#"{"is_playing":true}"#);
}

#[tokio::test]
async fn next_without_access_cookie_is_401() {
    let server = MockServer::start().await;
    Mock::given(path("/v1/me/player/next"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let res = app_for(&server)
        .oneshot(request(
            "POST",
            "/api/spotify/next",
            Some("spotify_refresh_token=R"),
        ))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_string(res).await, "Unauthorized");
}

#[tokio::test]
async fn next_relays_no_content() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/me/player/next"))
        .and(header_eq("authorization", "Bearer A"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let res = app_for(&server)
        .oneshot(request("POST", "/api/spotify/next", Some("spotify_access_token=A")))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn pause_relays_upstream_error() {
    let server = MockServer::start().await;
    let upstream = r#"{"error":{"status":403,"message":"Player command failed: Restriction violated"}}"#;
    Mock::given(method("PUT"))
        .and(path("/v1/me/player/pause"))
        .respond_with(ResponseTemplate::new(403).set_body_string(upstream))
        .mount(&server)
        .await;

    let res = app_for(&server)
        .oneshot(request("PUT", "/api/spotify/pause", Some("spotify_access_token=A")))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_string(res).await, upstream);
}

#[tokio::test]
async fn play_forwards_body_and_wraps_response() {
    let server = MockServer::start().await;
    let play_body = json!({ "uris": ["spotify:track:4uLU6hMCjMI75M1A2tKUQC"] });
    Mock::given(method("PUT"))
        .and(path("/v1/me/player/play"))
        .and(header_eq("authorization", "Bearer A"))
        .and(body_json(play_body.clone()))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let res = app_for(&server)
        .oneshot(json_request(
            "PUT",
            "/api/spotify/play",
            Some("spotify_access_token=A"),
            play_body,
        ))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_json_value(res).await, json!({ "status": 204, "body": "" }));
}

#[tokio::test]
async fn play_without_access_cookie_is_json_401() {
    let server = MockServer::start().await;

    let res = app_for(&server)
        .oneshot(json_request("PUT", "/api/spotify/play", None, json!({})))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json_value(res).await, json!({ "error": "No access token" }));
}

#[tokio::test]
async fn play_status_reports_cookie_presence() {
    let server = MockServer::start().await;

    let res = app_for(&server)
        .oneshot(request(
            "GET",
            "/api/spotify/play",
            Some("spotify_refresh_token=R"),
        ))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        body_json_value(res).await,
        json!({ "access_exists": false, "refresh_exists": true })
    );
}

#[tokio::test]
async fn transfer_targets_device_without_starting_playback() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/v1/me/player"))
        .and(body_json(json!({ "device_ids": ["dev-1"], "play": false })))
        .respond_with(ResponseTemplate::new(404).set_body_string("Device not found"))
        .expect(1)
        .mount(&server)
        .await;

    let res = app_for(&server)
        .oneshot(json_request(
            "POST",
            "/api/spotify/transfer",
            Some("spotify_access_token=A"),
            json!({ "device_id": "dev-1" }),
        ))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        body_json_value(res).await,
        json!({ "status": 404, "body": "Device not found" })
    );
}

// ---------------------------------------------------------------------------
// health
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_reports_version() {
    let server = MockServer::start().await;

    let res = app_for(&server)
        .oneshot(request("GET", "/health", None))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body = body_json_value(res).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}
