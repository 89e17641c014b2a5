use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub model: ModelConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address for the HTTP server
    #[serde(default = "default_host")]
    pub host: String,
    /// Listen port (default: 8000)
    #[serde(default = "default_port")]
    pub port: u16,
    /// Path prefix for the forecast API (health stays at the root)
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,
    /// Allowed CORS origins; empty or ["*"] means any origin
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_api_prefix() -> String {
    "/api".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    /// Filesystem path to the serialized prediction artifact
    #[serde(default = "default_model_path")]
    pub path: PathBuf,
    /// Serve the deterministic heuristic when the artifact is unavailable.
    /// When false, forecasts are rejected with 503 until the artifact loads.
    #[serde(default)]
    pub allow_fallback: bool,
}

fn default_model_path() -> PathBuf {
    PathBuf::from("models/multi_output_model.json")
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Enable JSON formatted logs
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl AppConfig {
    /// Load configuration from files and environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();

        let builder = Config::builder()
            // Start with default values
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8000)?
            .set_default("server.api_prefix", "/api")?
            .set_default("server.cors_origins", Vec::<String>::new())?
            .set_default("model.path", "models/multi_output_model.json")?
            .set_default("model.allow_fallback", false)?
            .set_default("logging.level", "info")?
            .set_default("logging.json", false)?
            // Load default config file
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Load environment-specific config (e.g., config/production.toml)
            .add_source(
                File::from(config_dir.join(
                    std::env::var("GRIDCAST_ENV").unwrap_or_else(|_| "development".to_string()),
                ))
                .required(false),
            )
            // Override with environment variables (GRIDCAST_MODEL__PATH, etc.)
            .add_source(
                Environment::with_prefix("GRIDCAST")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.server.port == 0 {
            errors.push("server.port must be non-zero".to_string());
        }

        if !self.server.api_prefix.starts_with('/') {
            errors.push("server.api_prefix must start with '/'".to_string());
        }

        if self.model.path.as_os_str().is_empty() {
            errors.push("model.path must not be empty".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
