//! forge::factory
//!
//! Forge selection and creation.
//!
//! # Design
//!
//! This module provides a central location for forge selection logic. The
//! server builds its forge through `create_forge()` instead of importing a
//! specific implementation, so adding a backend means adding a variant
//! here without touching the call sites.
//!
//! The provider is chosen by the `type` field of the `[forge]` config
//! table, not detected from a URL: the server talks to exactly one
//! configured instance.

use crate::core::config::{ConfigError, Settings};

use super::gitlab::GitLabForge;
use super::traits::Forge;

/// Supported forge providers.
///
/// Use `ForgeProvider::all()` to enumerate the available backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForgeProvider {
    /// GitLab (REST API v4)
    GitLab,
}

impl ForgeProvider {
    /// Get all available providers.
    pub fn all() -> &'static [ForgeProvider] {
        &[ForgeProvider::GitLab]
    }

    /// Get the provider name as a string.
    ///
    /// This matches the `type` value used in configuration files.
    pub fn name(&self) -> &'static str {
        match self {
            ForgeProvider::GitLab => "gitlab",
        }
    }

    /// Parse a provider from a string.
    ///
    /// # Example
    ///
    /// ```
    /// use commentarium::forge::ForgeProvider;
    ///
    /// assert_eq!(ForgeProvider::parse("gitlab"), Some(ForgeProvider::GitLab));
    /// assert_eq!(ForgeProvider::parse("unknown"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "gitlab" => Some(ForgeProvider::GitLab),
            _ => None,
        }
    }
}

impl std::fmt::Display for ForgeProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Create a forge from validated settings.
///
/// This is the entry point for building the forge backend at startup.
///
/// # Errors
///
/// Returns `ConfigError::InvalidValue` if the configured forge type is
/// unknown. Settings that went through `Settings::load()` have already
/// been checked, so this only fires for hand-built settings.
pub fn create_forge(settings: &Settings) -> Result<Box<dyn Forge>, ConfigError> {
    let forge = &settings.forge;
    let provider = ForgeProvider::parse(&forge.kind).ok_or_else(|| {
        ConfigError::InvalidValue(format!(
            "invalid forge type '{}', must be one of: {}",
            forge.kind,
            valid_forge_names().join(", ")
        ))
    })?;

    match provider {
        ForgeProvider::GitLab => Ok(Box::new(GitLabForge::new(
            forge.auth_token.clone(),
            forge.project_id,
            forge.base_url.clone(),
            settings.target_branch.clone(),
        ))),
    }
}

/// Get list of valid forge names for configuration validation.
///
/// This is used by the config schema to validate the `[forge]` table.
pub fn valid_forge_names() -> &'static [&'static str] {
    &["gitlab"]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(kind: &str) -> Settings {
        toml::from_str::<Settings>(&format!(
            r#"
            content_dir = "content"

            [forge]
            type = "{kind}"
            auth_token = "glpat-test"
            project_id = 42
            base_url = "https://gitlab.example.com"
            "#
        ))
        .unwrap()
    }

    mod forge_provider {
        use super::*;

        #[test]
        fn all_includes_gitlab() {
            assert!(ForgeProvider::all().contains(&ForgeProvider::GitLab));
        }

        #[test]
        fn name_returns_lowercase() {
            assert_eq!(ForgeProvider::GitLab.name(), "gitlab");
        }

        #[test]
        fn parse_is_case_insensitive() {
            assert_eq!(ForgeProvider::parse("gitlab"), Some(ForgeProvider::GitLab));
            assert_eq!(ForgeProvider::parse("GitLab"), Some(ForgeProvider::GitLab));
            assert_eq!(ForgeProvider::parse("GITLAB"), Some(ForgeProvider::GitLab));
        }

        #[test]
        fn parse_unknown() {
            assert_eq!(ForgeProvider::parse("unknown"), None);
            assert_eq!(ForgeProvider::parse(""), None);
        }

        #[test]
        fn display() {
            assert_eq!(format!("{}", ForgeProvider::GitLab), "gitlab");
        }
    }

    mod create_forge {
        use super::*;

        #[test]
        fn gitlab_from_settings() {
            let forge = create_forge(&settings("gitlab")).unwrap();
            assert_eq!(forge.name(), "gitlab");
            assert_eq!(forge.get_target_branch(), "main");
        }

        #[test]
        fn unknown_type_returns_error() {
            let result = create_forge(&settings("sourcehut"));
            assert!(matches!(result, Err(ConfigError::InvalidValue(_))));
        }

        #[test]
        fn error_lists_valid_names() {
            let err = create_forge(&settings("sourcehut")).err().unwrap();
            assert!(err.to_string().contains("gitlab"));
        }
    }

    mod valid_forge_names {
        use super::*;

        #[test]
        fn includes_gitlab() {
            assert!(valid_forge_names().contains(&"gitlab"));
        }

        #[test]
        fn matches_providers() {
            for provider in ForgeProvider::all() {
                assert!(valid_forge_names().contains(&provider.name()));
            }
        }
    }
}
