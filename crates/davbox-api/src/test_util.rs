//! Shared test fixtures.

use davbox_core::{Config, StoreBackend};

/// Config literal for unit tests. Local store backend so tests never reach
/// for the network; credentials are `admin` / `secret`.
pub(crate) fn test_config() -> Config {
    Config {
        server_port: 5678,
        cors_origins: vec!["*".to_string()],
        environment: "development".to_string(),
        database_url: "postgresql://localhost/davbox".to_string(),
        db_max_connections: 20,
        db_timeout_seconds: 30,
        jwt_secret: "0123456789abcdef0123456789abcdef".to_string(),
        jwt_expiry_hours: 24,
        admin_username: "admin".to_string(),
        admin_password: "secret".to_string(),
        store_backend: StoreBackend::Local,
        webdav_host: None,
        webdav_username: None,
        webdav_password: None,
        webdav_accept_invalid_certs: false,
        local_store_path: Some("/tmp/davbox-store".to_string()),
        local_store_base_url: Some("http://localhost:5678/store".to_string()),
        remote_timeout_seconds: 30,
        link_timeout_seconds: 15,
        max_file_size_bytes: 512 * 1024 * 1024,
        allowed_extensions: vec![
            "png".to_string(),
            "jpg".to_string(),
            "mp4".to_string(),
            "zip".to_string(),
        ],
        image_extensions: vec!["png".to_string(), "jpg".to_string()],
        video_extensions: vec!["mp4".to_string()],
        archive_extensions: vec!["zip".to_string()],
        ffmpeg_path: "ffmpeg".to_string(),
        thumbnail_max_px: 200,
        public_root: "static".to_string(),
    }
}
