//! # cbind-config
//!
//! Layered configuration loading for cbind using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`CBIND_*` prefix, `__` as separator)
//! 2. A file passed explicitly (`--config`)
//! 3. Project-level `cbind.toml`
//! 4. User-level `~/.config/cbind/config.toml`
//! 5. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `CBIND_TRANSLATE__MAX_DEPTH` -> `translate.max_depth`,
//! `CBIND_GENERAL__FAIL_ON_PARSE_ERRORS` -> `general.fail_on_parse_errors`,
//! etc. `CBIND_LOG` is the log filter and is not read as configuration.
//!
//! # Usage
//!
//! ```no_run
//! use cbind_config::CbindConfig;
//!
//! let config = CbindConfig::load().expect("config");
//! println!("FFI types from {}", config.translate.ffi_prefix);
//! ```

mod error;
mod general;

pub use error::ConfigError;
pub use general::GeneralConfig;

use std::path::{Path, PathBuf};

use cbind_ast::ParseOptions;
use cbind_translate::TranslateOptions;
use cbind_translate::naming::is_identifier;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

/// Name of the project-level config file.
pub const LOCAL_CONFIG_FILE: &str = "cbind.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct CbindConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub translate: TranslateOptions,
}

impl CbindConfig {
    /// Load configuration from the default files and the environment.
    ///
    /// # Errors
    /// Returns [`ConfigError`] when a source cannot be read or a value is
    /// invalid.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration with `path` layered above the default files.
    ///
    /// # Errors
    /// Returns [`ConfigError::MissingFile`] when `path` does not exist, and
    /// any error of [`CbindConfig::extract`].
    pub fn load_from(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = path
            && !path.exists()
        {
            return Err(ConfigError::MissingFile {
                path: path.to_path_buf(),
            });
        }
        Self::extract(&Self::figment(path))
    }

    /// Extract and validate a configuration from `figment`.
    ///
    /// # Errors
    /// Returns [`ConfigError::Figment`] when extraction fails and
    /// [`ConfigError::InvalidValue`] when validation does.
    pub fn extract(figment: &Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Build the figment provider chain.
    ///
    /// This is public so tests can inspect the figment directly or add
    /// additional providers on top.
    #[must_use]
    pub fn figment(explicit: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Layer 1: User-global config
        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            figment = figment.merge(Toml::file(global_path));
        }

        // Layer 2: Project-local config
        let local_path = PathBuf::from(LOCAL_CONFIG_FILE);
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        // Layer 3: Explicit config file
        if let Some(path) = explicit {
            figment = figment.merge(Toml::file(path));
        }

        // Layer 4: Environment variables (highest priority)
        figment.merge(Env::prefixed("CBIND_").ignore(&["log"]).split("__"))
    }

    /// Path to the user-global config file.
    #[must_use]
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("cbind").join("config.toml"))
    }

    /// Parser options derived from the configuration.
    #[must_use]
    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            defines: self.general.defines.clone(),
        }
    }

    /// Reject values the translator cannot work with.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidValue`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let translate = &self.translate;
        if translate.max_depth == 0 {
            return Err(ConfigError::invalid(
                "translate.max_depth",
                "must be at least 1",
            ));
        }
        if !(1..=16).contains(&translate.indent_width) {
            return Err(ConfigError::invalid(
                "translate.indent_width",
                format!("{} is outside 1..=16", translate.indent_width),
            ));
        }
        if !is_identifier(&translate.anonymous_prefix) {
            return Err(ConfigError::invalid(
                "translate.anonymous_prefix",
                format!("'{}' is not an identifier", translate.anonymous_prefix),
            ));
        }
        if !is_path(&translate.ffi_prefix) {
            return Err(ConfigError::invalid(
                "translate.ffi_prefix",
                format!("'{}' is not a Rust path", translate.ffi_prefix),
            ));
        }
        for (field, derives) in [
            ("translate.struct_derives", &translate.struct_derives),
            ("translate.enum_derives", &translate.enum_derives),
        ] {
            if let Some(bad) = derives.iter().find(|derive| !is_path(derive)) {
                return Err(ConfigError::invalid(
                    field,
                    format!("'{bad}' is not a derive path"),
                ));
            }
        }
        if let Some(bad) = self
            .general
            .defines
            .iter()
            .find(|define| !is_identifier(GeneralConfig::define_name(define)))
        {
            return Err(ConfigError::invalid(
                "general.defines",
                format!("'{bad}' does not start with a macro name"),
            ));
        }
        Ok(())
    }
}

/// `a::b::c`, optionally with a leading `::`.
fn is_path(text: &str) -> bool {
    let text = text.strip_prefix("::").unwrap_or(text);
    text.split("::").all(is_identifier)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = CbindConfig::default();
        config.validate().expect("defaults should validate");
        assert!(!config.general.fail_on_parse_errors);
        assert_eq!(config.translate.max_depth, 256);
    }

    #[test]
    fn parse_options_carry_defines() {
        let mut config = CbindConfig::default();
        config.general.defines = vec!["FEATURE".to_string(), "LEVEL=3".to_string()];
        assert_eq!(config.parse_options().defines, config.general.defines);
    }

    #[test]
    fn paths_are_checked_segment_by_segment() {
        assert!(is_path("::core::ffi"));
        assert!(is_path("libc"));
        assert!(is_path("serde::Serialize"));
        assert!(!is_path("core::"));
        assert!(!is_path("std ffi"));
        assert!(!is_path(""));
    }

    #[test]
    fn zero_depth_is_rejected() {
        let mut config = CbindConfig::default();
        config.translate.max_depth = 0;
        let err = config.validate().expect_err("should fail");
        assert!(
            matches!(
                err,
                ConfigError::InvalidValue { ref field, .. } if field == "translate.max_depth"
            )
        );
    }

    #[test]
    fn bad_define_is_rejected() {
        let mut config = CbindConfig::default();
        config.general.defines = vec!["=3".to_string()];
        let err = config.validate().expect_err("should fail");
        assert!(err.to_string().contains("general.defines"));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = CbindConfig::load_from(Some(&dir.path().join("absent.toml")))
            .expect_err("should fail");
        assert!(matches!(err, ConfigError::MissingFile { .. }));
    }
}
