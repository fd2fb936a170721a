//! Remote path validation shared by all backends.

use crate::traits::{StoreError, StoreResult};

/// Remote paths are produced from sanitized filenames and date directories,
/// but every backend validates at its own boundary anyway.
pub(crate) fn validate_remote_path(path: &str) -> StoreResult<()> {
    if path.is_empty() {
        return Err(StoreError::InvalidPath("empty path".to_string()));
    }
    if path.starts_with('/') {
        return Err(StoreError::InvalidPath(format!(
            "absolute path not allowed: {}",
            path
        )));
    }
    if path.split('/').any(|segment| segment == "..") {
        return Err(StoreError::InvalidPath(format!(
            "path traversal not allowed: {}",
            path
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_relative_date_paths() {
        assert!(validate_remote_path("2025/09/23/photo.png").is_ok());
        assert!(validate_remote_path("2025/09/23").is_ok());
        assert!(validate_remote_path("单个文件.zip").is_ok());
    }

    #[test]
    fn rejects_traversal_and_absolute_paths() {
        assert!(validate_remote_path("").is_err());
        assert!(validate_remote_path("/etc/passwd").is_err());
        assert!(validate_remote_path("2025/../secret").is_err());
        assert!(validate_remote_path("..").is_err());
    }

    #[test]
    fn dotted_filenames_are_not_traversal() {
        assert!(validate_remote_path("2025/09/23/..hidden.png").is_ok());
        assert!(validate_remote_path("2025/09/23/a..b.mp4").is_ok());
    }
}
