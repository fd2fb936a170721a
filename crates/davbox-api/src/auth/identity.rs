//! Anonymous uploader identity
//!
//! First upload mints an opaque token and sets it as a long-lived cookie;
//! later requests reuse whatever token the client presents. The token ties
//! records to the browser that uploaded them and is never interpreted
//! beyond equality.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use cookie::time::Duration as CookieDuration;
use uuid::Uuid;

use crate::constants::{IDENTITY_COOKIE, IDENTITY_COOKIE_DAYS};

/// Identity token presented by the client, if any.
pub fn identity_token(jar: &CookieJar) -> Option<String> {
    jar.get(IDENTITY_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|token| !token.is_empty())
}

/// Return the client's identity token, minting one when absent.
///
/// The returned jar carries the (re)issued cookie; handlers return it so
/// the lifetime window slides forward on every upload.
pub fn ensure_identity(jar: CookieJar) -> (CookieJar, String) {
    let token = match identity_token(&jar) {
        Some(existing) => existing,
        None => {
            let minted = Uuid::new_v4().simple().to_string();
            tracing::debug!("Minted new uploader identity");
            minted
        }
    };

    let cookie = Cookie::build((IDENTITY_COOKIE, token.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(CookieDuration::days(IDENTITY_COOKIE_DAYS))
        .build();

    (jar.add(cookie), token)
}
