//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use crate::services;
use crate::setup;
use davbox_core::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Davbox API",
        version = "0.1.0",
        description = "Anonymous media upload gateway over a WebDAV object store. Uploads land in a date-partitioned remote tree with locally cached thumbnails; uploaders keep a cookie-bound right to delete their own files. All endpoints are versioned under /api/v0/."
    ),
    paths(
        handlers::upload::upload_files,
        handlers::list::list_files,
        handlers::delete::delete_files,
        handlers::delete::delete_file,
        handlers::link::file_link,
        handlers::session::login,
        handlers::session::logout,
        setup::routes::health_check,
    ),
    components(schemas(
        error::ErrorResponse,
        models::FileSummary,
        davbox_core::FileCategory,
        handlers::session::LoginRequest,
        handlers::list::FilePage,
        handlers::delete::DeleteBatchRequest,
        handlers::delete::DeleteBatchResponse,
        services::ingest::UploadReport,
        services::ingest::UploadEntry,
        services::lifecycle::DeleteResult,
        services::lifecycle::DeleteStatus,
        setup::routes::HealthCheckResponse,
    )),
    tags(
        (name = "files", description = "Upload, list, delete and resolve files"),
        (name = "session", description = "Operator session management"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;
