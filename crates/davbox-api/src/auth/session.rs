//! Operator sessions
//!
//! Login checks a single configured credential pair in constant time and
//! issues an HS256 JWT carried in a session cookie. There is no user table;
//! the session only unlocks the privileged deletion path.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{Duration, Utc};
use cookie::time::Duration as CookieDuration;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;

use davbox_core::{AppError, Config};

use crate::constants::SESSION_COOKIE;

#[derive(Debug, Serialize, Deserialize)]
struct SessionClaims {
    sub: String,
    iat: i64,
    exp: i64,
}

fn secure_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Check submitted credentials against the configured operator account.
/// Both halves are always evaluated.
pub fn credentials_match(config: &Config, username: &str, password: &str) -> bool {
    let username_ok = secure_compare(username, &config.admin_username);
    let password_ok = secure_compare(password, &config.admin_password);
    username_ok & password_ok
}

/// Sign a session token for a logged-in operator.
pub fn issue_session(config: &Config) -> Result<String, AppError> {
    let now = Utc::now();
    let claims = SessionClaims {
        sub: config.admin_username.clone(),
        iat: now.timestamp(),
        exp: (now + Duration::hours(config.jwt_expiry_hours)).timestamp(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Failed to sign session token: {}", e)))
}

/// Whether the request carries a session cookie whose token verifies.
/// An invalid or expired token is the same as no session.
pub fn has_valid_session(jar: &CookieJar, config: &Config) -> bool {
    let Some(cookie) = jar.get(SESSION_COOKIE) else {
        return false;
    };
    decode::<SessionClaims>(
        cookie.value(),
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .is_ok()
}

/// Cookie establishing a session; lifetime matches the token expiry.
pub fn session_cookie(token: String, config: &Config) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Strict)
        .max_age(CookieDuration::hours(config.jwt_expiry_hours))
        .build()
}

/// Expired cookie that removes the session.
pub fn clear_session_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Strict)
        .max_age(CookieDuration::ZERO)
        .build()
}
