pub mod pipeline;
pub mod types;

pub use pipeline::{IngestPipeline, IngestSettings};
pub use types::{BatchReport, Derivation, FileSubmission, MetadataSink, UploadOutcome};
