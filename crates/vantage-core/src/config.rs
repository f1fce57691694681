//! Layered configuration
//!
//! ## Resolution order (later wins)
//!
//! 1. Embedded defaults (`config/vantage.toml`, compiled into the binary)
//! 2. Override file: explicit `--config` path, else
//!    `~/.local/share/vantage/config.toml` when it exists
//! 3. Environment variables (`PORT`, `VANTAGE_*`)
//! 4. CLI flags, applied by the caller

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::store::DataSourceKind;

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/vantage.toml");

pub const ENV_PORT: &str = "PORT";
pub const ENV_HOST: &str = "VANTAGE_HOST";
pub const ENV_DATA: &str = "VANTAGE_DATA";
pub const ENV_DB: &str = "VANTAGE_DB";
pub const ENV_SOURCE: &str = "VANTAGE_SOURCE";
pub const ENV_RELOAD: &str = "VANTAGE_RELOAD";
pub const ENV_ALLOWED_ORIGINS: &str = "VANTAGE_ALLOWED_ORIGINS";
pub const ENV_ENVIRONMENT: &str = "VANTAGE_ENV";

/// HTTP server settings
#[derive(Debug, Clone, PartialEq)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Reported by the health endpoint (development, production, ...)
    pub environment: String,
    /// CORS origins allowed to call the API (empty = same-origin only)
    pub allowed_origins: Vec<String>,
    /// Built dashboard frontend to serve as a fallback
    pub static_dir: Option<PathBuf>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            environment: "development".to_string(),
            allowed_origins: vec![],
            static_dir: None,
        }
    }
}

/// Data source selection
#[derive(Debug, Clone, PartialEq)]
pub struct DataSourceConfig {
    pub source: DataSourceKind,
    /// Dataset file for the JSON store (and input for `vantage import`)
    pub json_path: PathBuf,
    /// SQLite database for the SQLite store
    pub db_path: PathBuf,
    /// Re-read the JSON file on every request
    pub reload: bool,
}

impl Default for DataSourceConfig {
    fn default() -> Self {
        Self {
            source: DataSourceKind::Json,
            json_path: PathBuf::from("data/jsondata.json"),
            db_path: PathBuf::from("vantage.db"),
            reload: false,
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppConfig {
    pub server: ServerSettings,
    pub data: DataSourceConfig,
}

impl AppConfig {
    /// Load defaults, the override file and the process environment
    pub fn load(override_path: Option<&Path>) -> Result<Self> {
        let mut config = parse_config(DEFAULT_CONFIG)?;

        match override_path {
            Some(path) => {
                // An explicitly requested file must exist
                let content = fs::read_to_string(path).map_err(|e| {
                    Error::Config(format!("Failed to read config {}: {}", path.display(), e))
                })?;
                config.apply_toml(&content)?;
            }
            None => {
                if let Some(path) = default_config_path().filter(|p| p.exists()) {
                    debug!(path = %path.display(), "Using config override");
                    let content = fs::read_to_string(&path).map_err(|e| {
                        Error::Config(format!("Failed to read config {}: {}", path.display(), e))
                    })?;
                    config.apply_toml(&content)?;
                }
            }
        }

        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Overlay values present in a TOML document
    pub fn apply_toml(&mut self, content: &str) -> Result<()> {
        let raw: RawConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

        if let Some(server) = raw.server {
            if let Some(host) = server.host {
                self.server.host = host;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
            if let Some(environment) = server.environment {
                self.server.environment = environment;
            }
            if let Some(origins) = server.allowed_origins {
                self.server.allowed_origins = origins;
            }
            if let Some(dir) = server.static_dir {
                self.server.static_dir = Some(dir);
            }
        }

        if let Some(data) = raw.data {
            if let Some(source) = data.source {
                self.data.source = source.parse().map_err(Error::Config)?;
            }
            if let Some(path) = data.json_path {
                self.data.json_path = path;
            }
            if let Some(path) = data.db_path {
                self.data.db_path = path;
            }
            if let Some(reload) = data.reload {
                self.data.reload = reload;
            }
        }

        Ok(())
    }

    /// Overlay environment variables, read through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(port) = get(ENV_PORT) {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|_| Error::Config(format!("{} must be a port number, got '{}'", ENV_PORT, port)))?;
        }
        if let Some(host) = get(ENV_HOST) {
            self.server.host = host;
        }
        if let Some(environment) = get(ENV_ENVIRONMENT) {
            self.server.environment = environment;
        }
        if let Some(origins) = get(ENV_ALLOWED_ORIGINS) {
            self.server.allowed_origins = parse_list(&origins);
        }
        if let Some(path) = get(ENV_DATA) {
            self.data.json_path = PathBuf::from(path);
        }
        if let Some(path) = get(ENV_DB) {
            self.data.db_path = PathBuf::from(path);
        }
        if let Some(source) = get(ENV_SOURCE) {
            self.data.source = source.parse().map_err(Error::Config)?;
        }
        if let Some(reload) = get(ENV_RELOAD) {
            self.data.reload = match reload.trim().to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                other => {
                    warn!(value = other, "Ignoring unrecognized {}", ENV_RELOAD);
                    self.data.reload
                }
            };
        }

        Ok(())
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("vantage").join("config.toml"))
}

/// Split a comma-separated list, dropping blanks
pub fn parse_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    server: Option<RawServer>,
    data: Option<RawData>,
}

#[derive(Debug, Deserialize)]
struct RawServer {
    host: Option<String>,
    port: Option<u16>,
    environment: Option<String>,
    allowed_origins: Option<Vec<String>>,
    static_dir: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct RawData {
    source: Option<String>,
    json_path: Option<PathBuf>,
    db_path: Option<PathBuf>,
    reload: Option<bool>,
}

/// Parse config from TOML content on top of built-in defaults
fn parse_config(content: &str) -> Result<AppConfig> {
    let mut config = AppConfig::default();
    config.apply_toml(content)?;
    Ok(config)
}
