//! Configuration management for roadrecord.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::storage::DEFAULT_STORE_FILE;
use crate::validation::{ADDRESS_DELIMITER, DEFAULT_JURISDICTION};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default configuration directory name.
const CONFIG_DIR_NAME: &str = "roadrecord";

/// Prefix for environment variable overrides.
const ENV_PREFIX: &str = "ROADRECORD_";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `ROADRECORD_`, sections split on `__`)
/// 2. TOML config file at `~/.config/roadrecord/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Store configuration.
    pub store: StoreConfig,
    /// Validation configuration.
    pub validation: ValidationConfig,
}

/// Store-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Path to the record store file.
    /// Defaults to `person.txt` in the working directory.
    pub path: Option<PathBuf>,
}

/// Validation-related configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// State every address must name.
    pub jurisdiction: String,
    /// Largest year accepted in dates.
    /// When unset, the current year at validation time is used.
    pub max_year: Option<i32>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            jurisdiction: DEFAULT_JURISDICTION.to_string(),
            max_year: None,
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        let jurisdiction = &self.validation.jurisdiction;
        if jurisdiction.trim().is_empty() {
            return Err(Error::ConfigValidation {
                message: "jurisdiction must not be empty".to_string(),
            });
        }

        if jurisdiction.contains(ADDRESS_DELIMITER.trim()) {
            return Err(Error::ConfigValidation {
                message: format!(
                    "jurisdiction ({jurisdiction}) cannot contain the address delimiter"
                ),
            });
        }

        if let Some(max_year) = self.validation.max_year {
            if max_year < 1 {
                return Err(Error::ConfigValidation {
                    message: format!("max_year ({max_year}) must be at least 1"),
                });
            }
        }

        Ok(())
    }

    /// Get the store path, resolving the default if not set.
    #[must_use]
    pub fn store_path(&self) -> PathBuf {
        self.store
            .path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_FILE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert!(config.store.path.is_none());
        assert_eq!(config.validation.jurisdiction, "Victoria");
        assert!(config.validation.max_year.is_none());
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_empty_jurisdiction() {
        let mut config = Config::default();
        config.validation.jurisdiction = "  ".to_string();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("jurisdiction"));
    }

    #[test]
    fn test_validate_jurisdiction_with_delimiter() {
        let mut config = Config::default();
        config.validation.jurisdiction = "Vic | toria".to_string();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("delimiter"));
    }

    #[test]
    fn test_validate_max_year() {
        let mut config = Config::default();
        config.validation.max_year = Some(0);

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("max_year"));

        config.validation.max_year = Some(2025);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_store_path_default() {
        let config = Config::default();
        assert_eq!(config.store_path(), PathBuf::from("person.txt"));
    }

    #[test]
    fn test_store_path_custom() {
        let mut config = Config::default();
        config.store.path = Some(PathBuf::from("/custom/registry.txt"));

        assert_eq!(config.store_path(), PathBuf::from("/custom/registry.txt"));
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path();
        assert!(path.to_string_lossy().contains("roadrecord"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_load_nonexistent_config() {
        Jail::expect_with(|_jail| {
            let config =
                Config::load_from(Some(PathBuf::from("/nonexistent/config.toml"))).unwrap();
            assert_eq!(config, Config::default());
            Ok(())
        });
    }

    #[test]
    fn test_load_from_toml() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                [store]
                path = "records/person.txt"

                [validation]
                jurisdiction = "Tasmania"
                max_year = 2025
                "#,
            )?;

            let config = Config::load_from(Some(PathBuf::from("config.toml"))).unwrap();
            assert_eq!(config.store_path(), PathBuf::from("records/person.txt"));
            assert_eq!(config.validation.jurisdiction, "Tasmania");
            assert_eq!(config.validation.max_year, Some(2025));
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                [validation]
                jurisdiction = "Tasmania"
                "#,
            )?;
            jail.set_env("ROADRECORD_VALIDATION__JURISDICTION", "Queensland");
            jail.set_env("ROADRECORD_VALIDATION__MAX_YEAR", "2030");

            let config = Config::load_from(Some(PathBuf::from("config.toml"))).unwrap();
            assert_eq!(config.validation.jurisdiction, "Queensland");
            assert_eq!(config.validation.max_year, Some(2030));
            Ok(())
        });
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                [validation]
                max_year = -3
                "#,
            )?;

            let result = Config::load_from(Some(PathBuf::from("config.toml")));
            assert!(matches!(result, Err(Error::ConfigValidation { .. })));
            Ok(())
        });
    }

    #[test]
    fn test_config_serialize() {
        let json = serde_json::to_string(&Config::default()).unwrap();
        assert!(json.contains("jurisdiction"));
        assert!(json.contains("max_year"));
    }

    #[test]
    fn test_validation_config_deserialize() {
        let json = r#"{"max_year": 2024}"#;
        let validation: ValidationConfig = serde_json::from_str(json).unwrap();
        assert_eq!(validation.max_year, Some(2024));
        assert_eq!(validation.jurisdiction, "Victoria");
    }
}
