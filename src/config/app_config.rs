use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use url::Url;

use super::{BaseHttpClientConfig, HttpRetryConfig, LogTailConfig, deserialize_url};

/// Address of a backend running locally with its default port.
const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";

/// Provides the default value for backend_url.
fn default_backend_url() -> Url {
    Url::parse(DEFAULT_BACKEND_URL).expect("default backend URL is valid")
}

/// Application configuration for Thorax.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// Base address of the monitoring backend.
    #[serde(default = "default_backend_url", deserialize_with = "deserialize_url")]
    pub backend_url: Url,

    /// Retry policy for request/response calls.
    #[serde(default)]
    pub http_retry_config: HttpRetryConfig,

    /// Configuration for the base HTTP client.
    #[serde(default)]
    pub http_base_config: BaseHttpClientConfig,

    /// Live log tail settings.
    #[serde(default)]
    pub log_tail: LogTailConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend_url: default_backend_url(),
            http_retry_config: HttpRetryConfig::default(),
            http_base_config: BaseHttpClientConfig::default(),
            log_tail: LogTailConfig::default(),
        }
    }
}

impl AppConfig {
    /// Creates a new `AppConfig` from `<config_dir>/app.yaml` (optional)
    /// layered under `THORAX__*` environment variables.
    pub fn new(config_dir: Option<&str>) -> Result<Self, ConfigError> {
        let config_dir_str = config_dir.unwrap_or("configs");
        let s = Config::builder()
            .add_source(File::with_name(&format!("{config_dir_str}/app.yaml")).required(false))
            .add_source(Environment::with_prefix("THORAX").separator("__").try_parsing(true))
            .build()?;
        s.try_deserialize()
    }

    /// Replaces the backend address, e.g. from a command-line flag.
    pub fn with_backend_url(mut self, backend_url: Url) -> Self {
        self.backend_url = backend_url;
        self
    }
}
