//! Client configuration.
//!
//! Loaded from an optional JSON file; every field may be omitted:
//!
//! ```json
//! {
//!   "apiBase": "http://127.0.0.1:8000",
//!   "debounceMs": 300,
//!   "requestTimeoutMs": 60000,
//!   "videoTimeoutMs": 180000,
//!   "connectTimeoutMs": 10000,
//!   "outputDir": "."
//! }
//! ```
//!
//! `IMAGIFY_API_BASE` overrides `apiBase` after the file is read.

use std::path::{Path, PathBuf};
use std::time::Duration;
use serde::{Deserialize, Serialize};
use tracing::debug;
use crate::coordinator::CoordinatorConfig;
use crate::core::OperationKind;
use crate::utils::{ImagifyError, ImagifyResult};

pub const API_BASE_ENV: &str = "IMAGIFY_API_BASE";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppConfig {
    /// Base URL of the backend, without a trailing slash
    pub api_base: String,
    /// Quiet period before slider changes are sent
    pub debounce_ms: u64,
    /// Hard timeout for enhance and smile calls; 0 disables it
    pub request_timeout_ms: u64,
    /// Hard timeout for video generation, which takes ~40s on the backend; 0 disables it
    pub video_timeout_ms: u64,
    pub connect_timeout_ms: u64,
    /// Where downloads are written
    pub output_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base: "http://127.0.0.1:8000".to_string(),
            debounce_ms: 300,
            request_timeout_ms: 60_000,
            video_timeout_ms: 180_000,
            connect_timeout_ms: 10_000,
            output_dir: PathBuf::from("."),
        }
    }
}

impl AppConfig {
    /// Reads `path` if given, falls back to defaults otherwise, then applies
    /// the environment override and validates.
    pub async fn load(path: Option<&Path>) -> ImagifyResult<Self> {
        let mut config = match path {
            Some(path) => {
                let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
                    ImagifyError::config(format!("Failed to read {}: {}", path.display(), e))
                })?;
                Self::from_json(&raw)?
            }
            None => Self::default(),
        };

        if let Ok(api_base) = std::env::var(API_BASE_ENV) {
            debug!("Using {} from environment: {}", API_BASE_ENV, api_base);
            config.api_base = api_base;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn from_json(raw: &str) -> ImagifyResult<Self> {
        serde_json::from_str(raw).map_err(|e| ImagifyError::config(format!("Invalid config: {}", e)))
    }

    pub fn validate(&self) -> ImagifyResult<()> {
        let base = self.api_base.trim();
        if base.is_empty() {
            return Err(ImagifyError::config("apiBase cannot be empty"));
        }
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(ImagifyError::config(format!("apiBase must be an http(s) URL: {}", base)));
        }
        Ok(())
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Coordinator settings for `operation`; video gets its own, longer timeout.
    pub fn coordinator_config(&self, operation: OperationKind) -> CoordinatorConfig {
        let timeout_ms = match operation {
            OperationKind::Video => self.video_timeout_ms,
            OperationKind::Enhance | OperationKind::Smile => self.request_timeout_ms,
        };

        CoordinatorConfig {
            debounce: Duration::from_millis(self.debounce_ms),
            request_timeout: (timeout_ms > 0).then(|| Duration::from_millis(timeout_ms)),
            evaluate_on_select: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_fields_take_defaults() {
        let config = AppConfig::from_json(r#"{"debounceMs": 400}"#).unwrap();
        assert_eq!(config.debounce_ms, 400);
        assert_eq!(config.api_base, "http://127.0.0.1:8000");
        assert_eq!(config.video_timeout_ms, 180_000);
    }

    #[test]
    fn zero_timeout_disables_deadline() {
        let config = AppConfig { request_timeout_ms: 0, ..AppConfig::default() };
        assert_eq!(config.coordinator_config(OperationKind::Enhance).request_timeout, None);
        assert_eq!(
            config.coordinator_config(OperationKind::Video).request_timeout,
            Some(Duration::from_secs(180))
        );
    }

    #[test]
    fn non_http_base_is_rejected() {
        let config = AppConfig { api_base: "ftp://example.com".to_string(), ..AppConfig::default() };
        assert!(matches!(config.validate(), Err(ImagifyError::Config(_))));
    }

    #[tokio::test]
    async fn load_reads_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"apiBase": "https://imagify.example", "outputDir": "/tmp/out"}}"#).unwrap();

        let config = AppConfig::load(Some(file.path())).await.unwrap();
        if std::env::var(API_BASE_ENV).is_err() {
            assert_eq!(config.api_base, "https://imagify.example");
        }
        assert_eq!(config.output_dir, PathBuf::from("/tmp/out"));
        assert!(AppConfig::load(Some(Path::new("/nonexistent/imagify.json"))).await.is_err());
    }

    #[test]
    fn unknown_json_is_a_config_error() {
        assert!(matches!(AppConfig::from_json("not json"), Err(ImagifyError::Config(_))));
    }
}
