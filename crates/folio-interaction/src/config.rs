//! Configuration file management for folio.
//!
//! Secrets live in `~/.config/folio/secret.json`; optional session tuning
//! lives next to it in `~/.config/folio/config.toml`.

use folio_core::config::{PollPolicy, SessionConfig};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Root configuration structure for secret.json
#[derive(Debug, Clone, Deserialize)]
pub struct SecretConfig {
    #[serde(default)]
    pub gemini: Option<GeminiConfig>,
}

/// Gemini API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct GeminiConfig {
    pub api_key: String,
    #[serde(default)]
    pub model_name: Option<String>,
}

/// Session tuning overrides from config.toml. Everything is optional;
/// missing values keep the core defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TuningConfig {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub max_file_size_bytes: Option<u64>,
    #[serde(default)]
    pub poll_interval_ms: Option<u64>,
    #[serde(default)]
    pub poll_max_attempts: Option<u32>,
    #[serde(default)]
    pub system_instruction: Option<String>,
}

impl TuningConfig {
    /// Applies the overrides onto a session configuration.
    pub fn apply(&self, mut config: SessionConfig) -> SessionConfig {
        if let Some(model) = &self.model {
            config.model = model.clone();
        }
        if let Some(limit) = self.max_file_size_bytes {
            config.max_file_size_bytes = limit;
        }
        if let Some(instruction) = &self.system_instruction {
            config.system_instruction = instruction.clone();
        }
        let poll = PollPolicy {
            interval: self
                .poll_interval_ms
                .map(Duration::from_millis)
                .unwrap_or(config.poll.interval),
            max_attempts: self.poll_max_attempts.unwrap_or(config.poll.max_attempts),
        };
        config.poll = poll;
        config
    }
}

/// Resolves Gemini credentials.
///
/// Priority:
/// 1. `~/.config/folio/secret.json`
/// 2. The `GEMINI_API_KEY` environment variable
///
/// Returns the API key and the optional model name from secret.json.
pub fn gemini_credentials() -> Result<(String, Option<String>), String> {
    if let Ok(secret_config) = load_secret_config() {
        if let Some(gemini_config) = secret_config.gemini {
            return Ok((gemini_config.api_key, gemini_config.model_name));
        }
    }

    let api_key = env::var("GEMINI_API_KEY").map_err(|_| {
        "Gemini API key not found in ~/.config/folio/secret.json or GEMINI_API_KEY".to_string()
    })?;
    Ok((api_key, None))
}

/// Loads the secret configuration file from ~/.config/folio/secret.json
pub fn load_secret_config() -> Result<SecretConfig, String> {
    load_secret_config_from(&secret_path()?)
}

/// Loads a secret configuration file from an explicit path.
pub fn load_secret_config_from(path: &Path) -> Result<SecretConfig, String> {
    if !path.exists() {
        return Err(format!(
            "Configuration file not found at: {}",
            path.display()
        ));
    }

    let content = fs::read_to_string(path).map_err(|e| {
        format!(
            "Failed to read configuration file at {}: {}",
            path.display(),
            e
        )
    })?;

    serde_json::from_str(&content).map_err(|e| {
        format!(
            "Failed to parse configuration file at {}: {}",
            path.display(),
            e
        )
    })
}

/// Loads the optional tuning file from ~/.config/folio/config.toml.
///
/// A missing file is not an error; it just means no overrides.
pub fn load_tuning_config() -> Result<Option<TuningConfig>, String> {
    load_tuning_config_from(&tuning_path()?)
}

/// Loads a tuning file from an explicit path.
pub fn load_tuning_config_from(path: &Path) -> Result<Option<TuningConfig>, String> {
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path).map_err(|e| {
        format!("Failed to read tuning file at {}: {}", path.display(), e)
    })?;

    toml::from_str(&content)
        .map(Some)
        .map_err(|e| format!("Failed to parse tuning file at {}: {}", path.display(), e))
}

/// Returns the path to the secret file: ~/.config/folio/secret.json
fn secret_path() -> Result<PathBuf, String> {
    Ok(config_dir()?.join("secret.json"))
}

/// Returns the path to the tuning file: ~/.config/folio/config.toml
fn tuning_path() -> Result<PathBuf, String> {
    Ok(config_dir()?.join("config.toml"))
}

fn config_dir() -> Result<PathBuf, String> {
    let home = dirs::home_dir().ok_or_else(|| "Could not determine home directory".to_string())?;
    Ok(home.join(".config").join("folio"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_parsing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("secret.json");
        fs::write(
            &path,
            r#"{"gemini": {"api_key": "k-123", "model_name": "gemini-2.5-flash"}}"#,
        )
        .unwrap();

        let config = load_secret_config_from(&path).unwrap();
        let gemini = config.gemini.unwrap();
        assert_eq!(gemini.api_key, "k-123");
        assert_eq!(gemini.model_name.as_deref(), Some("gemini-2.5-flash"));
    }

    #[test]
    fn test_missing_secret_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_secret_config_from(&dir.path().join("secret.json")).unwrap_err();
        assert!(err.contains("not found"));
    }

    #[test]
    fn test_tuning_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "model = \"gemini-2.5-flash\"\npoll_interval_ms = 2000\npoll_max_attempts = 10\n",
        )
        .unwrap();

        let tuning = load_tuning_config_from(&path).unwrap().unwrap();
        let config = tuning.apply(SessionConfig::default());
        assert_eq!(config.model, "gemini-2.5-flash");
        assert_eq!(config.poll.interval, Duration::from_millis(2000));
        assert_eq!(config.poll.max_attempts, 10);
        // Untouched fields keep their defaults.
        assert_eq!(
            config.max_file_size_bytes,
            folio_core::config::DEFAULT_MAX_FILE_SIZE_BYTES
        );
    }

    #[test]
    fn test_missing_tuning_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(
            load_tuning_config_from(&dir.path().join("config.toml"))
                .unwrap()
                .is_none()
        );
    }
}
