//! Database layer
//!
//! PostgreSQL repositories over sqlx. Connection pool setup and migrations
//! live in the API crate's setup module; this crate only issues queries.

pub mod db;

pub use db::FileRepository;
