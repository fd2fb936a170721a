//! Davbox Core Library
//!
//! This crate provides the domain models, error types, configuration and
//! upload rules (filename sanitizing, category classification, deletion
//! permissions) shared across all davbox components.

pub mod category;
pub mod config;
pub mod error;
pub mod filename;
pub mod models;
pub mod ownership;
pub mod store_types;

// Re-export commonly used types
pub use category::{classify_filename, CategoryRules, FileCategory};
pub use config::Config;
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use filename::sanitize_filename;
pub use ownership::{can_delete, Caller, DeleteDecision};
pub use store_types::StoreBackend;
