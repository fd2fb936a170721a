use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Remote store backend types
///
/// Defined in core because the selection is part of configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Webdav,
    Local,
}

impl FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "webdav" => Ok(StoreBackend::Webdav),
            "local" => Ok(StoreBackend::Local),
            _ => Err(anyhow::anyhow!("Invalid store backend: {}", s)),
        }
    }
}

impl Display for StoreBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            StoreBackend::Webdav => write!(f, "webdav"),
            StoreBackend::Local => write!(f, "local"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!(
            "WebDAV".parse::<StoreBackend>().unwrap(),
            StoreBackend::Webdav
        );
        assert_eq!(
            "local".parse::<StoreBackend>().unwrap(),
            StoreBackend::Local
        );
        assert!("s3".parse::<StoreBackend>().is_err());
    }

    #[test]
    fn display_round_trips() {
        for backend in [StoreBackend::Webdav, StoreBackend::Local] {
            assert_eq!(backend.to_string().parse::<StoreBackend>().unwrap(), backend);
        }
    }
}
