//! API constants
//!
//! Route paths in handler annotations and `setup::routes` both build on
//! these prefixes so they cannot drift apart.

/// API base path prefix (version-independent)
pub const API_BASE: &str = "/api";

/// Versioned API prefix all routes mount under
pub const API_PREFIX: &str = "/api/v0";

/// Cookie carrying the anonymous uploader identity token
pub const IDENTITY_COOKIE: &str = "file_upload_cookie";

/// Cookie carrying the operator session JWT
pub const SESSION_COOKIE: &str = "davbox_session";

/// Lifetime of the uploader identity cookie in days
pub const IDENTITY_COOKIE_DAYS: i64 = 30;

/// Cap on concurrently processed requests across all routes
pub const HTTP_CONCURRENCY_LIMIT: usize = 100;
