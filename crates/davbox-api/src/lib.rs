//! Davbox API Library
//!
//! This crate provides the HTTP API handlers, application state, and setup.

// Module declarations
mod api_doc;
pub mod constants;
mod handlers;
mod services;
pub mod setup;
mod telemetry;

// Public modules
pub mod auth;
pub mod error;
pub mod state;

#[cfg(test)]
mod test_util;

// Re-exports
pub use error::ErrorResponse;
