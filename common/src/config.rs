// Configuration management with layered configuration (file, env)

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main settings structure containing all configuration options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub server: ServerConfig,
    pub backend: BackendConfig,
    pub uploads: UploadConfig,
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Where the repositories keep their records
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    pub mode: BackendMode,
    /// JSON seed loaded into the in-memory collections at startup
    #[serde(default)]
    pub seed_file: Option<PathBuf>,
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub remote: Option<RemoteConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendMode {
    Memory,
    Remote,
}

/// Named latency profiles that replace the per-operation delays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LatencyPreset {
    /// Hosted record store: reads 200-300ms, writes 250-400ms
    Interactive,
}

/// Simulated latency and fault injection for the in-memory repositories
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// When set, the `*_ms` delays below are ignored
    #[serde(default)]
    pub latency_preset: Option<LatencyPreset>,
    #[serde(default)]
    pub list_ms: u64,
    #[serde(default)]
    pub get_ms: u64,
    #[serde(default)]
    pub create_ms: u64,
    #[serde(default)]
    pub update_ms: u64,
    #[serde(default)]
    pub delete_ms: u64,
    /// Fail every n-th operation. The counter is shared by all four repositories.
    #[serde(default)]
    pub fail_every_nth: Option<u64>,
    /// Fail operations at random with this probability (0.0 - 1.0)
    #[serde(default)]
    pub failure_rate: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    pub base_url: String,
    #[serde(default = "default_remote_timeout")]
    pub timeout_seconds: u64,
    #[serde(default)]
    pub api_key: Option<String>,
}

fn default_remote_timeout() -> u64 {
    30
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    pub max_bytes: u64,
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    pub log_level: String,
    #[serde(default)]
    pub metrics_enabled: bool,
    pub metrics_port: u16,
    pub tracing_endpoint: Option<String>,
}

impl Settings {
    /// Load configuration with layered precedence: defaults → file → env
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path("config")
    }

    /// Load configuration from a specific path
    pub fn load_from_path<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();

        let builder = Config::builder()
            // Built-in defaults so an empty config directory still yields a working mock setup
            .add_source(Config::try_from(&Settings::default())?)
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Add local configuration (not committed to git)
            .add_source(File::from(config_dir.join("local.toml")).required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), String> {
        if self.server.port == 0 {
            return Err("Server port must be greater than 0".to_string());
        }

        match self.backend.mode {
            BackendMode::Remote => match &self.backend.remote {
                None => {
                    return Err(
                        "Remote configuration required when backend mode is 'remote'".to_string(),
                    )
                }
                Some(remote) if remote.base_url.is_empty() => {
                    return Err("Remote base_url cannot be empty".to_string());
                }
                Some(remote) if remote.timeout_seconds == 0 => {
                    return Err("Remote timeout_seconds must be greater than 0".to_string());
                }
                Some(_) => {}
            },
            BackendMode::Memory => {}
        }

        if self.backend.simulation.fail_every_nth == Some(0) {
            return Err("Simulation fail_every_nth must be greater than 0".to_string());
        }
        if let Some(rate) = self.backend.simulation.failure_rate {
            if !(0.0..=1.0).contains(&rate) {
                return Err("Simulation failure_rate must be between 0.0 and 1.0".to_string());
            }
        }

        if self.uploads.max_bytes == 0 {
            return Err("Upload max_bytes must be greater than 0".to_string());
        }
        if self.uploads.base_url.is_empty() {
            return Err("Upload base_url cannot be empty".to_string());
        }

        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
            },
            backend: BackendConfig {
                mode: BackendMode::Memory,
                seed_file: None,
                simulation: SimulationConfig::default(),
                remote: None,
            },
            uploads: UploadConfig {
                max_bytes: 5 * 1024 * 1024,
                base_url: "https://example.com/documents".to_string(),
            },
            observability: ObservabilityConfig {
                log_level: "info".to_string(),
                metrics_enabled: false,
                metrics_port: 9090,
                tracing_endpoint: None,
            },
        }
    }
}
