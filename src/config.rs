//! `config.json` loading.
//!
//! Resolution order:
//! 1. Explicit `--config <path>`
//! 2. `./config.json` (project root)
//! 3. `~/.capacity-model/config.json`

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::CapacityError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub spreadsheet_id: String,
    #[serde(default = "default_credentials_path")]
    pub credentials_path: PathBuf,
    #[serde(default = "default_token_path")]
    pub token_path: PathBuf,
    #[serde(default)]
    pub sheets: SheetNames,
    /// Fallback for `trigger --webhook-url`.
    #[serde(default)]
    pub webhook_url: Option<String>,
}

/// Tab names inside the capacity spreadsheet.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetNames {
    pub capacity: String,
    pub matrix: String,
    pub sales: String,
    pub summary: String,
}

impl Default for SheetNames {
    fn default() -> Self {
        Self {
            capacity: "Capacity Rep Projection".to_string(),
            matrix: "Matrix".to_string(),
            sales: "Sheet1".to_string(),
            summary: "Capacity Summary".to_string(),
        }
    }
}

fn default_credentials_path() -> PathBuf {
    PathBuf::from("credentials.json")
}

fn default_token_path() -> PathBuf {
    PathBuf::from("token.json")
}

/// Per-user fallback location.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".capacity-model").join("config.json"))
}

/// Locate and load the config file.
pub fn load_config(explicit: Option<&Path>) -> Result<Config, CapacityError> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let local = PathBuf::from("config.json");
            match user_config_path() {
                Some(user) if !local.exists() && user.exists() => user,
                _ => local,
            }
        }
    };
    load_config_from(&path)
}

pub fn load_config_from(path: &Path) -> Result<Config, CapacityError> {
    if !path.exists() {
        return Err(CapacityError::Config(format!(
            "{} not found. Create it with: {{ \"spreadsheet_id\": \"<id>\" }}",
            path.display()
        )));
    }

    let content = std::fs::read_to_string(path)?;
    let config: Config = serde_json::from_str(&content)
        .map_err(|e| CapacityError::Config(format!("Failed to parse {}: {}", path.display(), e)))?;

    if config.spreadsheet_id.trim().is_empty() {
        return Err(CapacityError::Config(
            "spreadsheet_id must not be empty".to_string(),
        ));
    }

    log::debug!("Loaded config from {}", path.display());
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_gets_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "spreadsheet_id": "abc123" }"#).unwrap();

        let config = load_config_from(&path).unwrap();
        assert_eq!(config.spreadsheet_id, "abc123");
        assert_eq!(config.credentials_path, PathBuf::from("credentials.json"));
        assert_eq!(config.token_path, PathBuf::from("token.json"));
        assert_eq!(config.sheets.capacity, "Capacity Rep Projection");
        assert_eq!(config.sheets.matrix, "Matrix");
        assert!(config.webhook_url.is_none());
    }

    #[test]
    fn test_partial_sheet_names_override() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{
                "spreadsheet_id": "abc123",
                "sheets": { "matrix": "Criteria" },
                "webhook_url": "https://script.google.com/macros/s/xyz/exec"
            }"#,
        )
        .unwrap();

        let config = load_config_from(&path).unwrap();
        assert_eq!(config.sheets.matrix, "Criteria");
        assert_eq!(config.sheets.sales, "Sheet1");
        assert_eq!(
            config.webhook_url.as_deref(),
            Some("https://script.google.com/macros/s/xyz/exec")
        );
    }

    #[test]
    fn test_missing_config_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = load_config_from(&dir.path().join("config.json")).unwrap_err();
        assert!(matches!(err, CapacityError::Config(_)));
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_empty_spreadsheet_id_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "spreadsheet_id": "  " }"#).unwrap();
        assert!(matches!(
            load_config_from(&path).unwrap_err(),
            CapacityError::Config(_)
        ));
    }

    #[test]
    fn test_malformed_config() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ spreadsheet_id: }").unwrap();
        assert!(matches!(
            load_config_from(&path).unwrap_err(),
            CapacityError::Config(_)
        ));
    }
}
