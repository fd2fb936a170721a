//! Configuration module
//!
//! Application configuration is read from the environment once at startup
//! and injected into the components that need it.

use std::env;

use crate::store_types::StoreBackend;

// Common constants
const MAX_CONNECTIONS: u32 = 20;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const JWT_EXPIRY_HOURS: i64 = 24;
const REMOTE_TIMEOUT_SECS: u64 = 30;
const LINK_TIMEOUT_SECS: u64 = 15;
const MAX_FILE_SIZE_MB: usize = 512;
const THUMBNAIL_MAX_PX: u32 = 200;

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub jwt_secret: String,
    pub jwt_expiry_hours: i64,
    // Operator account
    pub admin_username: String,
    pub admin_password: String,
    // Remote store configuration
    pub store_backend: StoreBackend,
    pub webdav_host: Option<String>,
    pub webdav_username: Option<String>,
    pub webdav_password: Option<String>,
    pub webdav_accept_invalid_certs: bool,
    pub local_store_path: Option<String>,
    pub local_store_base_url: Option<String>,
    pub remote_timeout_seconds: u64,
    pub link_timeout_seconds: u64,
    // Upload rules
    pub max_file_size_bytes: usize,
    /// Full upload allow-list. Defaults to the union of the three category
    /// lists; extensions listed here but in no category classify as `other`.
    pub allowed_extensions: Vec<String>,
    pub image_extensions: Vec<String>,
    pub video_extensions: Vec<String>,
    pub archive_extensions: Vec<String>,
    // Derived media settings
    pub ffmpeg_path: String,
    pub thumbnail_max_px: u32,
    /// Public static root served by the reverse proxy. Thumbnail paths in
    /// API responses are relative to this directory.
    pub public_root: String,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        let is_production =
            environment.to_lowercase() == "production" || environment.to_lowercase() == "prod";
        if is_production && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .collect();

        let store_backend = env::var("STORE_BACKEND")
            .unwrap_or_else(|_| "webdav".to_string())
            .parse::<StoreBackend>()?;

        let max_file_size_mb = env::var("MAX_FILE_SIZE_MB")
            .unwrap_or_else(|_| MAX_FILE_SIZE_MB.to_string())
            .parse::<usize>()
            .unwrap_or(MAX_FILE_SIZE_MB);

        let split_lowercase = |s: String| -> Vec<String> {
            s.split(',').map(|s| s.trim().to_lowercase()).collect()
        };

        let image_extensions = split_lowercase(
            env::var("IMAGE_EXTENSIONS").unwrap_or_else(|_| "png,jpg,jpeg,gif".to_string()),
        );
        let video_extensions = split_lowercase(
            env::var("VIDEO_EXTENSIONS").unwrap_or_else(|_| "mp4,mov,avi".to_string()),
        );
        let archive_extensions = split_lowercase(
            env::var("ARCHIVE_EXTENSIONS").unwrap_or_else(|_| "zip,7z,rar,tar,gz".to_string()),
        );
        let allowed_extensions = match env::var("ALLOWED_EXTENSIONS") {
            Ok(list) => split_lowercase(list),
            Err(_) => image_extensions
                .iter()
                .chain(video_extensions.iter())
                .chain(archive_extensions.iter())
                .cloned()
                .collect(),
        };

        let config = Config {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| "5678".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            cors_origins,
            environment,
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?,
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| MAX_CONNECTIONS.to_string())
                .parse()
                .unwrap_or(MAX_CONNECTIONS),
            db_timeout_seconds: env::var("DB_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| CONNECTION_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
            jwt_secret: env::var("JWT_SECRET")
                .map_err(|_| anyhow::anyhow!("JWT_SECRET must be set for authentication"))?,
            jwt_expiry_hours: env::var("JWT_EXPIRY_HOURS")
                .unwrap_or_else(|_| JWT_EXPIRY_HOURS.to_string())
                .parse()
                .unwrap_or(JWT_EXPIRY_HOURS),
            admin_username: env::var("ADMIN_USERNAME")
                .map_err(|_| anyhow::anyhow!("ADMIN_USERNAME must be set"))?,
            admin_password: env::var("ADMIN_PASSWORD")
                .map_err(|_| anyhow::anyhow!("ADMIN_PASSWORD must be set"))?,
            store_backend,
            webdav_host: env::var("WEBDAV_HOST").ok(),
            webdav_username: env::var("WEBDAV_USERNAME").ok(),
            webdav_password: env::var("WEBDAV_PASSWORD").ok(),
            webdav_accept_invalid_certs: env::var("WEBDAV_ACCEPT_INVALID_CERTS")
                .unwrap_or_else(|_| "false".to_string())
                .to_lowercase()
                .parse()
                .unwrap_or(false),
            local_store_path: env::var("LOCAL_STORE_PATH").ok(),
            local_store_base_url: env::var("LOCAL_STORE_BASE_URL").ok(),
            remote_timeout_seconds: env::var("REMOTE_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| REMOTE_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(REMOTE_TIMEOUT_SECS),
            link_timeout_seconds: env::var("LINK_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| LINK_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(LINK_TIMEOUT_SECS),
            max_file_size_bytes: max_file_size_mb * 1024 * 1024,
            allowed_extensions,
            image_extensions,
            video_extensions,
            archive_extensions,
            ffmpeg_path: env::var("FFMPEG_PATH").unwrap_or_else(|_| "ffmpeg".to_string()),
            thumbnail_max_px: env::var("THUMBNAIL_MAX_PX")
                .unwrap_or_else(|_| THUMBNAIL_MAX_PX.to_string())
                .parse()
                .unwrap_or(THUMBNAIL_MAX_PX),
            public_root: env::var("PUBLIC_ROOT").unwrap_or_else(|_| "static".to_string()),
        };

        config.validate()?;
        Ok(config)
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    /// Thumbnails live under the public root and are served as static files.
    pub fn thumbnail_dir(&self) -> std::path::PathBuf {
        std::path::Path::new(&self.public_root).join("thumbnails")
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.jwt_secret.len() < 32 {
            return Err(anyhow::anyhow!(
                "JWT_SECRET must be at least 32 characters long"
            ));
        }

        if !self.database_url.starts_with("postgresql://")
            && !self.database_url.starts_with("postgres://")
        {
            return Err(anyhow::anyhow!(
                "DATABASE_URL must be a valid PostgreSQL connection string"
            ));
        }

        if self.admin_username.trim().is_empty() || self.admin_password.trim().is_empty() {
            return Err(anyhow::anyhow!(
                "ADMIN_USERNAME and ADMIN_PASSWORD must not be empty"
            ));
        }

        match self.store_backend {
            StoreBackend::Webdav => {
                if self.webdav_host.is_none() {
                    return Err(anyhow::anyhow!(
                        "WEBDAV_HOST must be set when using the webdav store backend"
                    ));
                }
                if self.webdav_username.is_none() || self.webdav_password.is_none() {
                    return Err(anyhow::anyhow!(
                        "WEBDAV_USERNAME and WEBDAV_PASSWORD must be set when using the webdav store backend"
                    ));
                }
            }
            StoreBackend::Local => {
                if self.local_store_path.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORE_PATH must be set when using the local store backend"
                    ));
                }
                if self.local_store_base_url.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORE_BASE_URL must be set when using the local store backend"
                    ));
                }
            }
        }

        if self.allowed_extensions.is_empty() {
            return Err(anyhow::anyhow!(
                "ALLOWED_EXTENSIONS must not be empty; no upload could ever be accepted"
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
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
            store_backend: StoreBackend::Webdav,
            webdav_host: Some("http://127.0.0.1:5244/dav/".to_string()),
            webdav_username: Some("dav".to_string()),
            webdav_password: Some("dav".to_string()),
            webdav_accept_invalid_certs: false,
            local_store_path: None,
            local_store_base_url: None,
            remote_timeout_seconds: 30,
            link_timeout_seconds: 15,
            max_file_size_bytes: 512 * 1024 * 1024,
            allowed_extensions: [
                "png", "jpg", "jpeg", "gif", "mp4", "mov", "avi", "zip", "7z", "rar", "tar",
                "gz",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            image_extensions: vec![
                "png".to_string(),
                "jpg".to_string(),
                "jpeg".to_string(),
                "gif".to_string(),
            ],
            video_extensions: vec!["mp4".to_string(), "mov".to_string(), "avi".to_string()],
            archive_extensions: vec![
                "zip".to_string(),
                "7z".to_string(),
                "rar".to_string(),
                "tar".to_string(),
                "gz".to_string(),
            ],
            ffmpeg_path: "ffmpeg".to_string(),
            thumbnail_max_px: 200,
            public_root: "static".to_string(),
        }
    }

    #[test]
    fn valid_config_passes_validation() {
        assert!(test_config().validate().is_ok());
    }

    #[test]
    fn short_jwt_secret_is_rejected() {
        let mut config = test_config();
        config.jwt_secret = "too-short".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn webdav_backend_requires_host_and_credentials() {
        let mut config = test_config();
        config.webdav_host = None;
        assert!(config.validate().is_err());

        let mut config = test_config();
        config.webdav_password = None;
        assert!(config.validate().is_err());
    }

    #[test]
    fn local_backend_requires_path_and_base_url() {
        let mut config = test_config();
        config.store_backend = StoreBackend::Local;
        config.local_store_path = None;
        assert!(config.validate().is_err());

        config.local_store_path = Some("/tmp/davbox".to_string());
        assert!(config.validate().is_err());

        config.local_store_base_url = Some("http://localhost:5678/store".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_allow_list_is_rejected() {
        let mut config = test_config();
        config.allowed_extensions.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn non_postgres_database_url_is_rejected() {
        let mut config = test_config();
        config.database_url = "sqlite:///file.db".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn thumbnail_dir_is_below_public_root() {
        let config = test_config();
        assert_eq!(
            config.thumbnail_dir(),
            std::path::Path::new("static").join("thumbnails")
        );
    }
}
