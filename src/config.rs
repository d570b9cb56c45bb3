//! Application Configuration Module
//! Optional JSON settings read from the working directory.

use log::warn;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Config file looked up in the working directory.
pub const CONFIG_FILE: &str = "fisiodash.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// User-adjustable settings. Every field has a default so a partial file
/// is accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// CSV loaded automatically on startup when set.
    pub csv_path: Option<PathBuf>,
    /// Suggested file name in the export dialog.
    pub export_file_name: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            csv_path: None,
            export_file_name: "dados_filtrados.xlsx".to_string(),
        }
    }
}

impl AppConfig {
    /// Load from the default location. A missing file is normal; an invalid
    /// one is logged and replaced by defaults.
    pub fn load() -> Self {
        match Self::load_from(Path::new(CONFIG_FILE)) {
            Ok(config) => config,
            Err(ConfigError::IoError(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                Self::default()
            }
            Err(e) => {
                warn!("Ignoring invalid {}: {}", CONFIG_FILE, e);
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("fisiodash_{}_{}.json", name, std::process::id()))
    }

    #[test]
    fn default_export_name_matches_download() {
        let config = AppConfig::default();
        assert_eq!(config.export_file_name, "dados_filtrados.xlsx");
        assert!(config.csv_path.is_none());
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let path = temp_path("partial");
        fs::write(&path, r#"{"csv_path": "/dados/indicadores.csv"}"#).unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.csv_path, Some(PathBuf::from("/dados/indicadores.csv")));
        assert_eq!(config.export_file_name, "dados_filtrados.xlsx");

        fs::remove_file(path).ok();
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let path = temp_path("malformed");
        fs::write(&path, "{not json").unwrap();

        assert!(matches!(
            AppConfig::load_from(&path),
            Err(ConfigError::ParseError(_))
        ));

        fs::remove_file(path).ok();
    }

    #[test]
    fn missing_file_is_an_io_error() {
        assert!(matches!(
            AppConfig::load_from(Path::new("/nonexistent/fisiodash.json")),
            Err(ConfigError::IoError(_))
        ));
    }
}
