use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Result, anyhow};

/// Settings for reaching the Langflow flow. Each value can come from
/// `~/.config/flowchat/config.json` or from the environment; the
/// environment wins. A `.env` file in the working directory is loaded
/// before resolution.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Config {
    pub base_api_url: Option<String>,
    pub langflow_id: Option<String>,
    pub flow_id: Option<String>,
    pub application_token: Option<String>,
}

/// Fully-resolved settings. Constructing one is the startup gate: a
/// missing token (or any other missing value) aborts before the UI runs.
#[derive(Debug, Clone)]
pub struct Settings {
    pub base_api_url: String,
    pub langflow_id: String,
    pub flow_id: String,
    pub application_token: String,
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_dir()?.join("config.json");

        if !config_path.exists() {
            return Ok(Self::default());
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let config_content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("flowchat"))
    }
}

impl Settings {
    /// Resolve settings from `.env`, the process environment, and the
    /// config file.
    pub fn resolve() -> Result<Self> {
        // Missing .env is fine; env vars may be set directly
        let _ = dotenvy::dotenv();

        let config = Config::load().unwrap_or_default();
        Self::from_sources(&config, |key| std::env::var(key).ok())
    }

    /// Env var first, config file second; every value is required. The
    /// token is checked first so the common failure mode gets the most
    /// specific message.
    pub fn from_sources(
        config: &Config,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let get = |key: &str, fallback: &Option<String>| {
            env(key)
                .filter(|v| !v.is_empty())
                .or_else(|| fallback.clone())
        };

        let application_token = get("APPLICATION_TOKEN", &config.application_token)
            .ok_or_else(|| {
                anyhow!("APPLICATION_TOKEN is not set. Add it to your .env file or environment.")
            })?;
        let base_api_url = get("BASE_API_URL", &config.base_api_url)
            .ok_or_else(|| anyhow!("BASE_API_URL is not set"))?;
        let langflow_id = get("LANGFLOW_ID", &config.langflow_id)
            .ok_or_else(|| anyhow!("LANGFLOW_ID is not set"))?;
        let flow_id = get("FLOW_ID", &config.flow_id)
            .ok_or_else(|| anyhow!("FLOW_ID is not set"))?;

        Ok(Self {
            base_api_url,
            langflow_id,
            flow_id,
            application_token,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn full_config() -> Config {
        Config {
            base_api_url: Some("https://api.example.com".to_string()),
            langflow_id: Some("lf-123".to_string()),
            flow_id: Some("flow-456".to_string()),
            application_token: Some("file-token".to_string()),
        }
    }

    #[test]
    fn test_settings_from_config_file_only() {
        let settings = Settings::from_sources(&full_config(), |_| None).unwrap();
        assert_eq!(settings.base_api_url, "https://api.example.com");
        assert_eq!(settings.application_token, "file-token");
    }

    #[test]
    fn test_env_overrides_config_file() {
        let mut env = HashMap::new();
        env.insert("APPLICATION_TOKEN".to_string(), "env-token".to_string());

        let settings =
            Settings::from_sources(&full_config(), |key| env.get(key).cloned()).unwrap();
        assert_eq!(settings.application_token, "env-token");
        // Untouched values still come from the file
        assert_eq!(settings.flow_id, "flow-456");
    }

    #[test]
    fn test_missing_token_is_fatal_with_specific_message() {
        let mut config = full_config();
        config.application_token = None;

        let err = Settings::from_sources(&config, |_| None).unwrap_err();
        assert!(err.to_string().contains("APPLICATION_TOKEN"));
    }

    #[test]
    fn test_empty_env_value_falls_back_to_file() {
        let settings = Settings::from_sources(&full_config(), |key| {
            (key == "FLOW_ID").then(String::new)
        })
        .unwrap();
        assert_eq!(settings.flow_id, "flow-456");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"base_api_url": "https://api.example.com", "langflow_id": null, "flow_id": null, "application_token": "t"}"#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.base_api_url.as_deref(), Some("https://api.example.com"));
        assert_eq!(config.application_token.as_deref(), Some("t"));
        assert!(config.langflow_id.is_none());
    }
}
