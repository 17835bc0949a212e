//! core::config::schema
//!
//! Configuration schema types.
//!
//! # Validation
//!
//! Config values are validated after parsing. Defaults are applied per
//! field, so a minimal config only needs `content_dir` and a `[forge]`
//! table.

use std::fmt;
use std::net::SocketAddr;

use serde::Deserialize;

use super::{ConfigError, TOKEN_ENV};

/// Server settings.
///
/// # Example
///
/// ```toml
/// content_dir = "content"
/// comments_dir = "comments"
/// git_push = false
/// target_branch = "main"
/// log_level = "info"
/// bind_addr = "0.0.0.0:8000"
///
/// [forge]
/// type = "gitlab"
/// auth_token = "glpat-example"
/// project_id = 278964
/// base_url = "https://gitlab.com"
/// ```
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Content root of the site repository.
    pub content_dir: String,

    /// Per-page subdirectory holding comment files.
    #[serde(default = "default_comments_dir")]
    pub comments_dir: String,

    /// Push straight to the default branch instead of opening a review.
    #[serde(default = "default_git_push")]
    pub git_push: bool,

    /// Branch that review requests target.
    #[serde(default = "default_target_branch")]
    pub target_branch: String,

    /// Log level when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Address the HTTP server binds to.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Forge backend connection.
    pub forge: ForgeConfig,
}

fn default_comments_dir() -> String {
    "comments".to_string()
}

fn default_git_push() -> bool {
    true
}

fn default_target_branch() -> String {
    "main".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_bind_addr() -> String {
    "0.0.0.0:8000".to_string()
}

fn default_forge_kind() -> String {
    "gitlab".to_string()
}

impl Settings {
    /// Accepted `log_level` values.
    pub const VALID_LOG_LEVELS: &'static [&'static str] =
        &["trace", "debug", "info", "warn", "error"];

    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.content_dir.trim().is_empty() {
            return Err(ConfigError::InvalidValue(
                "content_dir cannot be empty".to_string(),
            ));
        }

        if self.comments_dir.trim().is_empty() {
            return Err(ConfigError::InvalidValue(
                "comments_dir cannot be empty".to_string(),
            ));
        }

        if self.target_branch.trim().is_empty() {
            return Err(ConfigError::InvalidValue(
                "target_branch cannot be empty".to_string(),
            ));
        }

        let level = self.log_level.to_ascii_lowercase();
        if !Self::VALID_LOG_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::InvalidValue(format!(
                "invalid log_level '{}', must be one of: {}",
                self.log_level,
                Self::VALID_LOG_LEVELS.join(", ")
            )));
        }

        if self.bind_addr.parse::<SocketAddr>().is_err() {
            return Err(ConfigError::InvalidValue(format!(
                "invalid bind_addr '{}', expected an address like 0.0.0.0:8000",
                self.bind_addr
            )));
        }

        self.forge.validate()
    }
}

/// Forge backend connection settings.
///
/// # Security
///
/// `auth_token` is a credential. This struct implements custom Debug to
/// redact it.
#[derive(Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ForgeConfig {
    /// Backend selector (currently "gitlab").
    #[serde(rename = "type", default = "default_forge_kind")]
    pub kind: String,

    /// API token used to authenticate against the forge. May be left empty
    /// in the file and supplied through the token environment variable.
    #[serde(default)]
    pub auth_token: String,

    /// Numeric project identifier on the forge.
    pub project_id: u64,

    /// Base URL of the forge instance.
    pub base_url: String,
}

impl ForgeConfig {
    /// Validate the forge connection values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let valid_forges = crate::forge::valid_forge_names();
        if !valid_forges.contains(&self.kind.as_str()) {
            return Err(ConfigError::InvalidValue(format!(
                "invalid forge type '{}', must be one of: {}",
                self.kind,
                valid_forges.join(", ")
            )));
        }

        if self.auth_token.is_empty() {
            return Err(ConfigError::InvalidValue(format!(
                "forge.auth_token must be set (in the config file or via ${TOKEN_ENV})"
            )));
        }

        if self.project_id == 0 {
            return Err(ConfigError::InvalidValue(
                "forge.project_id must be a positive integer".to_string(),
            ));
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ConfigError::InvalidValue(format!(
                "invalid forge.base_url '{}', must start with http:// or https://",
                self.base_url
            )));
        }

        Ok(())
    }
}

// Custom Debug to avoid exposing auth_token
impl fmt::Debug for ForgeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ForgeConfig")
            .field("kind", &self.kind)
            .field("auth_token", &"[REDACTED]")
            .field("project_id", &self.project_id)
            .field("base_url", &self.base_url)
            .finish()
    }
}
