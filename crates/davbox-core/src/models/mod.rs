//! Data models
//!
//! The persisted domain is a single entity: the file record tying a remote
//! object, its optional local thumbnail, and the uploader identity
//! together.

mod file;

pub use file::*;
