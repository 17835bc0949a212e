//! core::config
//!
//! Configuration schema and loading.
//!
//! # Locations
//!
//! The config file is resolved in this order (first hit wins):
//! 1. Explicit path (`--config` flag)
//! 2. `$COMMENTARIUM_CONFIG` if set
//! 3. `./config.toml`
//! 4. `<platform config dir>/commentarium/config.toml`
//!
//! An explicit or `$COMMENTARIUM_CONFIG` path is authoritative: if the file
//! is missing, loading fails rather than falling through to the next
//! location.
//!
//! # Token Override
//!
//! `$COMMENTARIUM_FORGE_TOKEN`, when set and non-empty, replaces
//! `forge.auth_token` from the file. This lets deployments keep the
//! credential out of the config file entirely.
//!
//! # Example
//!
//! ```no_run
//! use commentarium::core::config::Settings;
//!
//! let loaded = Settings::load(None).unwrap();
//! println!("content dir: {}", loaded.settings.content_dir);
//! println!("loaded from: {}", loaded.path.display());
//! ```

pub mod schema;

pub use schema::{ForgeConfig, Settings};

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable naming an alternative config file path.
pub const CONFIG_ENV: &str = "COMMENTARIUM_CONFIG";

/// Environment variable overriding `forge.auth_token`.
pub const TOKEN_ENV: &str = "COMMENTARIUM_FORGE_TOKEN";

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid config value: {0}")]
    InvalidValue(String),

    #[error("no config file found (looked for './config.toml'); pass --config or set ${CONFIG_ENV}")]
    NotFound,
}

/// Result of loading configuration.
#[derive(Debug)]
pub struct ConfigLoadResult {
    /// The loaded, validated settings.
    pub settings: Settings,
    /// The file they were loaded from.
    pub path: PathBuf,
}

impl Settings {
    /// Load settings from the first config location that applies.
    ///
    /// Applies the token environment override, normalizes the forge base
    /// URL, and validates the result.
    ///
    /// # Errors
    ///
    /// Returns an error if no config file can be found, if the file cannot
    /// be read or parsed, or if any value fails validation.
    pub fn load(explicit: Option<&Path>) -> Result<ConfigLoadResult, ConfigError> {
        let path = Self::locate(explicit)?;
        let mut settings = Self::read_file(&path)?;

        if let Ok(token) = std::env::var(TOKEN_ENV) {
            if !token.is_empty() {
                settings.forge.auth_token = token;
            }
        }
        settings.forge.base_url = settings.forge.base_url.trim_end_matches('/').to_string();

        settings.validate()?;
        Ok(ConfigLoadResult { settings, path })
    }

    /// Resolve the config file path without reading it.
    fn locate(explicit: Option<&Path>) -> Result<PathBuf, ConfigError> {
        if let Some(path) = explicit {
            return Ok(path.to_path_buf());
        }

        if let Ok(env_path) = std::env::var(CONFIG_ENV) {
            if !env_path.is_empty() {
                return Ok(PathBuf::from(env_path));
            }
        }

        let local = PathBuf::from("config.toml");
        if local.exists() {
            return Ok(local);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let platform = config_dir.join("commentarium/config.toml");
            if platform.exists() {
                return Ok(platform);
            }
        }

        Err(ConfigError::NotFound)
    }

    /// Read and parse a config file.
    fn read_file(path: &Path) -> Result<Settings, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}
