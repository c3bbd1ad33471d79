use std::fmt;
use std::path::PathBuf;

use roiview_core::dataset::DatasetSource;

/// Default candidate locations for the encrypted dataset, tried in order.
pub const DEFAULT_DATASET_PATHS: &str =
    "data/annotation/boundaries.enc,public/annotation/boundaries.enc";

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Candidate paths for the encrypted annotation dataset.
    pub dataset_paths: Vec<PathBuf>,
    /// Secret the dataset key is derived from. `None` selects the
    /// development key.
    pub dataset_key: Option<String>,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                    | Default                                |
    /// |----------------------------|----------------------------------------|
    /// | `HOST`                     | `0.0.0.0`                              |
    /// | `PORT`                     | `3000`                                 |
    /// | `CORS_ORIGINS`             | `http://localhost:3000`                |
    /// | `REQUEST_TIMEOUT_SECS`     | `30`                                   |
    /// | `ANNOTATION_DATASET_PATHS` | [`DEFAULT_DATASET_PATHS`]              |
    /// | `ANNOTATION_DATASET_KEY`   | unset (insecure development key)       |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins = split_list(
            &std::env::var("CORS_ORIGINS").unwrap_or_else(|_| "http://localhost:3000".into()),
        );

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let dataset_paths = split_list(
            &std::env::var("ANNOTATION_DATASET_PATHS")
                .unwrap_or_else(|_| DEFAULT_DATASET_PATHS.into()),
        )
        .into_iter()
        .map(PathBuf::from)
        .collect();

        let dataset_key = std::env::var("ANNOTATION_DATASET_KEY")
            .ok()
            .filter(|s| !s.is_empty());

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            dataset_paths,
            dataset_key,
        }
    }

    /// Dataset location and key secret as consumed by the core loader.
    pub fn dataset_source(&self) -> DatasetSource {
        DatasetSource::new(self.dataset_paths.clone(), self.dataset_key.clone())
    }
}

impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("cors_origins", &self.cors_origins)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("dataset_paths", &self.dataset_paths)
            .field("dataset_key", &self.dataset_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Split a comma-separated env value, trimming and dropping empty entries.
fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_list_trims_and_drops_empty() {
        assert_eq!(
            split_list(" a.enc , ,b.enc,"),
            vec!["a.enc".to_string(), "b.enc".to_string()]
        );
    }

    #[test]
    fn default_dataset_paths_has_two_candidates() {
        assert_eq!(split_list(DEFAULT_DATASET_PATHS).len(), 2);
    }

    #[test]
    fn debug_redacts_dataset_key() {
        let config = ServerConfig {
            host: "127.0.0.1".into(),
            port: 0,
            cors_origins: vec![],
            request_timeout_secs: 30,
            dataset_paths: vec![],
            dataset_key: Some("hunter2-hunter2-hunter2-hunter2!".into()),
        };
        assert!(!format!("{config:?}").contains("hunter2"));
    }
}
