//! Configuration management
//!
//! Loads and saves configuration from XDG-compliant paths.
//! Config location: ~/.config/ask-the-universe/config.toml
//!
//! API keys may also come from the environment (`RANDOM_ORG_API_KEY`,
//! `ANU_API_KEY`), which takes precedence over the file.

pub mod defaults;

use crate::constants::api::{ANU_KEY_ENV, RANDOM_ORG_KEY_ENV, RANDOM_ORG_URL};
use crate::error::{Error, Result};
use defaults::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Default values for the CLI
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// API keys for the remote services
    #[serde(default)]
    pub api_keys: ApiKeysConfig,

    /// Endpoint overrides
    #[serde(default)]
    pub endpoints: EndpointsConfig,

    /// HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Local quantum simulator settings
    #[serde(default)]
    pub simulator: SimulatorConfig,
}

/// Default values for the CLI
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Default backend
    #[serde(default = "default_backend")]
    pub backend: String,

    /// Default output format
    #[serde(default = "default_format")]
    pub format: String,
}

/// API keys for external services
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ApiKeysConfig {
    /// Random.org API key
    #[serde(default)]
    pub random_org: String,

    /// ANU QRNG paid-tier API key
    #[serde(default)]
    pub anu: String,
}

/// Endpoint overrides
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointsConfig {
    /// Random.org JSON-RPC endpoint
    #[serde(default = "default_random_org_endpoint")]
    pub random_org: String,

    /// ANU endpoint; empty selects the tier's default
    #[serde(default)]
    pub anu: String,
}

/// HTTP client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Request timeout in seconds
    #[serde(default = "default_http_timeout")]
    pub timeout_secs: u64,
}

/// Local quantum simulator settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulatorConfig {
    /// Interpreter to launch
    #[serde(default = "default_simulator_program")]
    pub program: String,

    /// Script path; empty runs the bundled circuit
    #[serde(default)]
    pub script: String,

    /// Qiskit backend name
    #[serde(default = "default_simulator_backend")]
    pub backend: String,

    /// Seconds before the simulator process is killed
    #[serde(default = "default_simulator_timeout")]
    pub timeout_secs: u64,
}

// Default value functions for serde
fn default_backend() -> String {
    DEFAULT_BACKEND.to_string()
}
fn default_format() -> String {
    DEFAULT_FORMAT.to_string()
}
fn default_random_org_endpoint() -> String {
    RANDOM_ORG_URL.to_string()
}
fn default_http_timeout() -> u64 {
    DEFAULT_HTTP_TIMEOUT_SECS
}
fn default_simulator_program() -> String {
    DEFAULT_SIMULATOR_PROGRAM.to_string()
}
fn default_simulator_backend() -> String {
    DEFAULT_SIMULATOR_BACKEND.to_string()
}
fn default_simulator_timeout() -> u64 {
    DEFAULT_SIMULATOR_TIMEOUT_SECS
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            format: default_format(),
        }
    }
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            random_org: default_random_org_endpoint(),
            anu: String::new(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_http_timeout(),
        }
    }
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            program: default_simulator_program(),
            script: String::new(),
            backend: default_simulator_backend(),
            timeout_secs: default_simulator_timeout(),
        }
    }
}

/// Environment value if set and non-empty, else the configured value if non-empty
fn key_from(env_var: &str, configured: &str) -> Option<String> {
    std::env::var(env_var)
        .ok()
        .filter(|key| !key.is_empty())
        .or_else(|| Some(configured.to_string()).filter(|key| !key.is_empty()))
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join(APP_DIR_NAME))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Load configuration from the default path
    ///
    /// Creates default config if file doesn't exist
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if path.exists() {
            let content = fs::read_to_string(&path).map_err(|e| {
                Error::Config(format!("Failed to read config file: {}", e))
            })?;

            toml::from_str(&content).map_err(|e| {
                Error::Config(format!("Failed to parse config file: {}", e))
            })
        } else {
            let config = Config::default();
            config.save()?;
            Ok(config)
        }
    }

    /// Save configuration to the default path
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                Error::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| {
            Error::Config(format!("Failed to serialize config: {}", e))
        })?;

        fs::write(&path, content).map_err(|e| {
            Error::Config(format!("Failed to write config file: {}", e))
        })?;

        Ok(())
    }

    /// Random.org API key from `RANDOM_ORG_API_KEY` or the config file
    pub fn random_org_api_key(&self) -> Option<String> {
        key_from(RANDOM_ORG_KEY_ENV, &self.api_keys.random_org)
    }

    /// ANU paid-tier API key from `ANU_API_KEY` or the config file
    pub fn anu_api_key(&self) -> Option<String> {
        key_from(ANU_KEY_ENV, &self.api_keys.anu)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http.timeout_secs)
    }

    /// Get a configuration value by key path
    ///
    /// Key format: "section.key"
    /// Returns the value as a string, or None if not found
    pub fn get(&self, key: &str) -> Option<String> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["defaults", "backend"] => Some(self.defaults.backend.clone()),
            ["defaults", "format"] => Some(self.defaults.format.clone()),

            ["api_keys", "random_org"] => Some(self.api_keys.random_org.clone()),
            ["api_keys", "anu"] => Some(self.api_keys.anu.clone()),

            ["endpoints", "random_org"] => Some(self.endpoints.random_org.clone()),
            ["endpoints", "anu"] => Some(self.endpoints.anu.clone()),

            ["http", "timeout_secs"] => Some(self.http.timeout_secs.to_string()),

            ["simulator", "program"] => Some(self.simulator.program.clone()),
            ["simulator", "script"] => Some(self.simulator.script.clone()),
            ["simulator", "backend"] => Some(self.simulator.backend.clone()),
            ["simulator", "timeout_secs"] => Some(self.simulator.timeout_secs.to_string()),

            _ => None,
        }
    }

    /// Set a configuration value by key path
    ///
    /// Key format: "section.key"
    /// Returns error if key is invalid or value type is wrong
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["defaults", "backend"] => {
                value.parse::<crate::provider::BackendName>()?;
                self.defaults.backend = value.to_string();
            }
            ["defaults", "format"] => {
                if crate::format::get_formatter(value).is_none() {
                    return Err(Error::Config(format!("Unknown format: {}", value)));
                }
                self.defaults.format = value.to_string();
            }

            ["api_keys", "random_org"] => {
                self.api_keys.random_org = value.to_string();
            }
            ["api_keys", "anu"] => {
                self.api_keys.anu = value.to_string();
            }

            ["endpoints", "random_org"] => {
                self.endpoints.random_org = value.to_string();
            }
            ["endpoints", "anu"] => {
                self.endpoints.anu = value.to_string();
            }

            ["http", "timeout_secs"] => {
                self.http.timeout_secs = value.parse().map_err(|_| {
                    Error::Config(format!("Invalid timeout value: {}", value))
                })?;
            }

            ["simulator", "program"] => {
                self.simulator.program = value.to_string();
            }
            ["simulator", "script"] => {
                self.simulator.script = value.to_string();
            }
            ["simulator", "backend"] => {
                self.simulator.backend = value.to_string();
            }
            ["simulator", "timeout_secs"] => {
                self.simulator.timeout_secs = value.parse().map_err(|_| {
                    Error::Config(format!("Invalid timeout value: {}", value))
                })?;
            }

            _ => {
                return Err(Error::Config(format!("Unknown config key: {}", key)));
            }
        }

        Ok(())
    }

    /// List all available config keys
    pub fn available_keys() -> Vec<&'static str> {
        vec![
            "defaults.backend",
            "defaults.format",
            "api_keys.random_org",
            "api_keys.anu",
            "endpoints.random_org",
            "endpoints.anu",
            "http.timeout_secs",
            "simulator.program",
            "simulator.script",
            "simulator.backend",
            "simulator.timeout_secs",
        ]
    }
}
