use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the config file picked up from the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "db-embed.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    pub version: String,
    pub paths: PathConfig,
    pub artifact: ArtifactNames,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathConfig {
    pub source: String,
    pub output: String,
}

/// Identifiers the loader template is rendered with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactNames {
    /// Global variable that holds the base64 payload.
    pub global_name: String,
    /// Loader function registered on `window`.
    pub loader_name: String,
    /// Human readable name used in comments and console messages.
    pub asset_label: String,
}

impl Default for ArtifactNames {
    fn default() -> Self {
        Self {
            global_name: "CHINOOK_DATABASE".to_string(),
            loader_name: "loadEmbeddedChinookDirect".to_string(),
            asset_label: "Chinook".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            paths: PathConfig {
                source: "data/Chinook_Sqlite.sqlite".to_string(),
                output: "chinook_embedded.js".to_string(),
            },
            artifact: ArtifactNames::default(),
        }
    }
}

impl Config {
    pub fn default_config_path() -> PathBuf {
        PathBuf::from(DEFAULT_CONFIG_FILE)
    }

    /// Load the config from `path`, or from the default location if present.
    ///
    /// An explicitly requested file must exist. Without one, built-in
    /// defaults are used and nothing is written to disk.
    pub fn load(path: Option<&PathBuf>) -> Result<Self> {
        let config_path = match path {
            Some(p) => {
                if !p.exists() {
                    anyhow::bail!("Config file not found at specified path: {}", p.display());
                }
                p.clone()
            }
            None => {
                let default_path = Self::default_config_path();
                if !default_path.exists() {
                    tracing::debug!("no config file found, using built-in defaults");
                    return Ok(Self::default());
                }
                default_path
            }
        };

        let contents = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let config: Self = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?;

        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", config_path.display()))?;

        tracing::debug!(path = %config_path.display(), "loaded config");
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let contents = serde_json::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.version.is_empty() {
            anyhow::bail!("Config version cannot be empty");
        }

        if self.paths.source.is_empty() {
            anyhow::bail!("paths.source cannot be empty");
        }
        if self.paths.output.is_empty() {
            anyhow::bail!("paths.output cannot be empty");
        }

        let identifier = Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$")?;
        if !identifier.is_match(&self.artifact.global_name) {
            anyhow::bail!(
                "artifact.globalName must be a JavaScript identifier, got: {:?}",
                self.artifact.global_name
            );
        }
        if !identifier.is_match(&self.artifact.loader_name) {
            anyhow::bail!(
                "artifact.loaderName must be a JavaScript identifier, got: {:?}",
                self.artifact.loader_name
            );
        }
        if self.artifact.global_name == self.artifact.loader_name {
            anyhow::bail!("artifact.globalName and artifact.loaderName must differ");
        }

        // The label lands inside single-quoted JS strings and line comments.
        let label = Regex::new(r"^[A-Za-z0-9 _-]+$")?;
        if !label.is_match(&self.artifact.asset_label) {
            anyhow::bail!(
                "artifact.assetLabel may only contain letters, digits, spaces, '_' and '-', got: {:?}",
                self.artifact.asset_label
            );
        }

        Ok(())
    }

    pub fn source_path(&self) -> PathBuf {
        Self::expand_tilde(&self.paths.source)
    }

    pub fn output_path(&self) -> PathBuf {
        Self::expand_tilde(&self.paths.output)
    }

    pub fn expand_tilde(path: &str) -> PathBuf {
        match (path.strip_prefix("~/"), dirs::home_dir()) {
            (Some(stripped), Some(home)) => home.join(stripped),
            _ => PathBuf::from(path),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.source_path(), PathBuf::from("data/Chinook_Sqlite.sqlite"));
        assert_eq!(config.output_path(), PathBuf::from("chinook_embedded.js"));
    }

    #[test]
    fn test_save_and_load_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nested").join("db-embed.json");

        let mut config = Config::default();
        config.artifact.global_name = "NORTHWIND_DB".to_string();
        config.save(&config_path).unwrap();

        let loaded = Config::load(Some(&config_path)).unwrap();
        assert_eq!(loaded.version, config.version);
        assert_eq!(loaded.paths.source, config.paths.source);
        assert_eq!(loaded.artifact, config.artifact);
    }

    #[test]
    fn test_serialized_keys_are_camel_case() {
        let json = serde_json::to_value(Config::default()).unwrap();
        assert_eq!(json["artifact"]["globalName"], "CHINOOK_DATABASE");
        assert_eq!(json["artifact"]["loaderName"], "loadEmbeddedChinookDirect");
        assert_eq!(json["artifact"]["assetLabel"], "Chinook");
    }

    #[test]
    fn test_load_missing_explicit_path_fails() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("missing.json");
        let err = Config::load(Some(&config_path)).unwrap_err();
        assert!(err.to_string().contains("Config file not found"));
    }

    #[test]
    fn test_expand_tilde() {
        let home = dirs::home_dir().unwrap();
        let expanded = Config::expand_tilde("~/test");
        assert_eq!(expanded, home.join("test"));

        let no_tilde = Config::expand_tilde("/absolute/path");
        assert_eq!(no_tilde, PathBuf::from("/absolute/path"));
    }

    #[test]
    fn test_invalid_config_validation() {
        let mut config = Config::default();
        config.paths.source = String::new();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.artifact.global_name = "1BAD".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.artifact.loader_name = "load-db".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.artifact.loader_name = config.artifact.global_name.clone();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.artifact.asset_label = "Bad'Label".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_dollar_identifiers_are_valid() {
        let mut config = Config::default();
        config.artifact.global_name = "$db_payload".to_string();
        assert!(config.validate().is_ok());
    }
}
