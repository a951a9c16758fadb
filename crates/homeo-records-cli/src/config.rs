use anyhow::{Context, Result};
use homeo_records_core::{AccessGate, PATIENTS_COLLECTION};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub schema_version: u32,
    /// Record database file; defaults to `records.db` next to the config
    pub database_path: Option<PathBuf>,
    pub collection: String,

    // Front-door password. The digest form wins when both are set.
    pub app_password: Option<String>,
    pub app_password_sha256: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schema_version: 1,
            database_path: None,
            collection: PATIENTS_COLLECTION.to_string(),
            app_password: None,
            app_password_sha256: None,
        }
    }
}

impl Config {
    /// Load config from file, or create default
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .context("Failed to read config file")?;
            serde_json::from_str(&content)
                .context("Failed to parse config file")
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to file
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .context("Failed to create config directory")?;
        }
        let content = serde_json::to_string_pretty(self)
            .context("Failed to serialize config")?;
        std::fs::write(path, content)
            .context("Failed to write config file")
    }

    /// Get the default config directory
    pub fn default_config_dir() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .context("Failed to get home directory")?;
        Ok(home.join(".homeo-records"))
    }

    /// Get the default config file path
    pub fn default_config_path() -> Result<PathBuf> {
        Ok(Self::default_config_dir()?.join("config.json"))
    }

    /// Get the database file path
    pub fn get_database_path(&self) -> Result<PathBuf> {
        if let Some(ref path) = self.database_path {
            Ok(path.clone())
        } else {
            Ok(Self::default_config_dir()?.join("records.db"))
        }
    }

    /// Build the password gate
    pub fn access_gate(&self) -> Result<AccessGate> {
        if let Some(ref digest) = self.app_password_sha256 {
            return AccessGate::from_hex_digest(digest)
                .context("Invalid app_password_sha256 in config");
        }
        Ok(AccessGate::new(self.app_password.as_deref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use homeo_records_core::access::password_digest_hex;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.collection, "patients");
        assert!(config.access_gate().unwrap().is_open());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = Config {
            database_path: Some(dir.path().join("clinic.db")),
            app_password: Some("pw".into()),
            ..Config::default()
        };
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.get_database_path().unwrap(), dir.path().join("clinic.db"));
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"app_password": "pw"}"#).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.schema_version, 1);
        assert_eq!(config.collection, "patients");
        assert!(config.access_gate().unwrap().verify("pw").is_ok());
    }

    #[test]
    fn test_digest_takes_precedence() {
        let config = Config {
            app_password: Some("old".into()),
            app_password_sha256: Some(password_digest_hex("new")),
            ..Config::default()
        };
        let gate = config.access_gate().unwrap();
        assert!(gate.verify("new").is_ok());
        assert!(gate.verify("old").is_err());
    }

    #[test]
    fn test_bad_digest_is_an_error() {
        let config = Config {
            app_password_sha256: Some("not-hex".into()),
            ..Config::default()
        };
        assert!(config.access_gate().is_err());
    }
}
