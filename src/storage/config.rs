//! Configuration handling for pipo
//!
//! Configuration is read from `~/.config/pipo/config.toml` (global) and then
//! `./pipo.toml` (local). Keys in the local file override the global ones.

use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Name of the per-directory config file
pub const LOCAL_CONFIG_FILE: &str = "pipo.toml";

/// Snapshot file for the graph plotter
pub const POINTS_FILE: &str = "graph_plotter_state.json";

/// Snapshot file for the story driver
pub const PROJECTS_FILE: &str = "story_driver_state.json";

const FALLBACK_STATE_DIR: &str = ".pipo";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the server listens on
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8189".to_string(),
        }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.bind
            .parse()
            .map_err(|e| ConfigError::Invalid(format!("server.bind '{}': {}", self.bind, e)))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Directory for saved data, logs and images
    pub output_dir: PathBuf,

    /// Directory for snapshot files (platform data dir when unset)
    pub state_dir: Option<PathBuf>,

    pub server: ServerConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output"),
            state_dir: None,
            server: ServerConfig::default(),
        }
    }
}

fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(existing)), toml::Value::Table(inner)) => {
                merge_tables(existing, inner)
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

fn read_table(path: &Path) -> Result<Option<toml::Table>> {
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;

    content
        .parse::<toml::Table>()
        .map(Some)
        .map_err(|e| ConfigError::Parse(e.to_string()))
        .with_context(|| format!("Failed to parse config: {}", path.display()))
}

impl Config {
    /// Loads configuration from the default locations
    pub fn load() -> Result<Self> {
        let global = Self::global_config_dir().map(|dir| dir.join("config.toml"));
        Self::load_from(global.as_deref(), Path::new(LOCAL_CONFIG_FILE))
    }

    /// Loads `global` then `local`; either file may be missing
    pub fn load_from(global: Option<&Path>, local: &Path) -> Result<Self> {
        let mut table = match global {
            Some(path) => read_table(path)?.unwrap_or_default(),
            None => toml::Table::new(),
        };
        if let Some(overlay) = read_table(local)? {
            merge_tables(&mut table, overlay);
        }

        let config: Config = toml::Value::Table(table)
            .try_into()
            .map_err(|e: toml::de::Error| ConfigError::Parse(e.to_string()))
            .context("Failed to parse configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Returns the global config directory
    pub fn global_config_dir() -> Option<PathBuf> {
        ProjectDirs::from("dev", "pipo", "pipo").map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Applies command-line and environment overrides
    pub fn with_overrides(mut self, output_dir: Option<PathBuf>, state_dir: Option<PathBuf>) -> Self {
        if let Some(dir) = output_dir {
            self.output_dir = dir;
        }
        if let Some(dir) = state_dir {
            self.state_dir = Some(dir);
        }
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.output_dir.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("output_dir must not be empty".to_string()));
        }
        self.server.socket_addr()?;
        Ok(())
    }

    /// Resolved snapshot directory
    pub fn state_dir(&self) -> PathBuf {
        if let Some(dir) = &self.state_dir {
            return dir.clone();
        }
        ProjectDirs::from("dev", "pipo", "pipo")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from(FALLBACK_STATE_DIR))
    }

    pub fn points_path(&self) -> PathBuf {
        self.state_dir().join(POINTS_FILE)
    }

    pub fn projects_path(&self) -> PathBuf {
        self.state_dir().join(PROJECTS_FILE)
    }
}
