//! Media processing: derivation steps and the ingest pipeline.
//!
//! Everything here works on scratch files and the `RemoteStore` trait.
//! Metadata persistence goes through [`MetadataSink`] so this crate never
//! touches the database directly.

pub mod cover;
pub mod ingest;
pub mod thumbnail;

pub use cover::derive_cover;
pub use ingest::pipeline::{IngestPipeline, IngestSettings};
pub use ingest::types::{
    BatchReport, Derivation, FileSubmission, MetadataSink, UploadOutcome,
};
pub use thumbnail::{generate_thumbnail, StoredThumbnail};
