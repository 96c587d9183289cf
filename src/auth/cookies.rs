//! Cookie names, lifetimes and builders for the session values.
//!
//! All three cookies share the same attributes: HTTP-only, path `/`,
//! same-site lax, and `Secure` only in production.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;

use crate::types::TokenGrant;

pub const VERIFIER_COOKIE: &str = "spotify_code_verifier";
pub const ACCESS_COOKIE: &str = "spotify_access_token";
pub const REFRESH_COOKIE: &str = "spotify_refresh_token";

pub const VERIFIER_MAX_AGE_SECS: i64 = 300;
pub const REFRESH_MAX_AGE_SECS: i64 = 60 * 60 * 24 * 30;

fn session_cookie(name: &'static str, value: String, max_age: i64, secure: bool) -> Cookie<'static> {
    Cookie::build((name, value))
        .http_only(true)
        .path("/")
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(Duration::seconds(max_age))
        .build()
}

pub fn verifier_cookie(verifier: String, secure: bool) -> Cookie<'static> {
    session_cookie(VERIFIER_COOKIE, verifier, VERIFIER_MAX_AGE_SECS, secure)
}

pub fn access_cookie(token: String, max_age: i64, secure: bool) -> Cookie<'static> {
    session_cookie(ACCESS_COOKIE, token, max_age, secure)
}

pub fn refresh_cookie(token: String, secure: bool) -> Cookie<'static> {
    session_cookie(REFRESH_COOKIE, token, REFRESH_MAX_AGE_SECS, secure)
}

/// Non-empty value of `name` in the request jar.
pub fn value<'a>(jar: &'a CookieJar, name: &str) -> Option<&'a str> {
    jar.get(name).map(|c| c.value()).filter(|v| !v.is_empty())
}

/// Writes the access cookie and, when the grant carries one, the refresh
/// cookie.
pub fn store_grant(jar: CookieJar, grant: &TokenGrant, secure: bool) -> CookieJar {
    let jar = jar.add(access_cookie(
        grant.access_token.clone(),
        grant.expires_in,
        secure,
    ));
    match &grant.refresh_token {
        Some(refresh) => jar.add(refresh_cookie(refresh.clone(), secure)),
        None => jar,
    }
}

/// Emits a removal for the verifier cookie if the request carried one.
pub fn clear_verifier(jar: CookieJar) -> CookieJar {
    if jar.get(VERIFIER_COOKIE).is_none() {
        return jar;
    }
    jar.remove(Cookie::build(VERIFIER_COOKIE).path("/"))
}
