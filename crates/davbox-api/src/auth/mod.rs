//! Request identity
//!
//! Two independent identities ride on cookies: the anonymous uploader token
//! (`identity`) and the operator session JWT (`session`). Every request is
//! resolved to a `Caller` from whichever of the two it carries.

pub mod identity;
pub mod session;

use axum_extra::extract::cookie::CookieJar;
use davbox_core::{Caller, Config};

/// Resolve the caller for a request from its cookies.
///
/// A valid operator session makes the caller privileged; the uploader token
/// is carried along either way so `owned` flags stay correct for operators
/// who also upload.
pub fn resolve_caller(jar: &CookieJar, config: &Config) -> Caller {
    let token = identity::identity_token(jar);
    if session::has_valid_session(jar, config) {
        Caller::operator(token)
    } else {
        Caller::anonymous(token)
    }
}
