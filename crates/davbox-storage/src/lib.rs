//! Davbox Storage Library
//!
//! Remote store abstraction and implementations. The `RemoteStore` trait
//! covers exactly what the ingest and deletion flows need: directory
//! provisioning, upload, existence checks, deletion, and resolving a
//! stored object to a public URL.
//!
//! Remote paths are relative, `/`-separated, and must not contain `..` or
//! a leading `/`. Validation is centralized in the `paths` module so both
//! backends stay consistent.

pub mod factory;
pub mod local;
pub(crate) mod paths;
pub mod traits;
pub mod webdav;

// Re-export commonly used types
pub use davbox_core::StoreBackend;
pub use factory::create_store;
pub use local::LocalStore;
pub use traits::{RemoteStore, StoreError, StoreResult};
pub use webdav::{WebdavSettings, WebdavStore};
