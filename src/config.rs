use anyhow::{anyhow, Context, Result};
use directories::ProjectDirs;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;

/// Name of the environment variable carrying the Ark API key. A `.env` file
/// loaded through dotenvy may supply it in development.
pub const API_KEY_VAR: &str = "VOLC_KEY";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub event: EventConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the OpenAI-compatible completion endpoint.
    pub base_url: String,
    /// Inference endpoint identifier, passed as the model name.
    pub model: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://ark.cn-beijing.volces.com/api/v3".to_string(),
            model: "ep-20260114192542-x5zx6".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EventConfig {
    /// IANA name of the zone the notice text speaks in. Extracted wall-clock
    /// times are resolved here before conversion.
    pub timezone: String,
    /// Title used when the extraction comes back without one.
    pub default_title: String,
    /// Annotation appended to every event description.
    pub provenance: String,
}

impl Default for EventConfig {
    fn default() -> Self {
        Self {
            timezone: "Asia/Shanghai".to_string(),
            default_title: "New Event".to_string(),
            provenance: "(Generated by SmartCal)".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the API server binds to.
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind: "127.0.0.1:3000".to_string() }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = get_config_path()?;

        // If config doesn't exist, create default
        if !config_path.exists() {
            let default_config = Config::default();
            default_config.save()?;
            return Ok(default_config);
        }

        let content = fs::read_to_string(&config_path).context("Failed to read config file")?;
        toml::from_str(&content).context("Failed to parse config file")
    }

    pub fn save(&self) -> Result<()> {
        let config_path = get_config_path()?;

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(&config_path, content).context("Failed to write config file")?;

        Ok(())
    }
}

fn get_config_path() -> Result<PathBuf> {
    let proj_dirs = ProjectDirs::from("com", "smartcal", "smartcal")
        .context("Failed to determine config directory")?;

    Ok(proj_dirs.config_dir().join("config.toml"))
}

/// The deployment-provided API credential. Loaded once at startup; a missing
/// or empty key halts the process before any interaction is possible.
pub struct Credentials {
    api_key: SecretString,
}

impl Credentials {
    pub fn from_env() -> Result<Self> {
        let key = env::var(API_KEY_VAR).map_err(|_| {
            anyhow!("{} is not set. Export it or add it to a .env file", API_KEY_VAR)
        })?;

        if key.trim().is_empty() {
            return Err(anyhow!("{} is set but empty", API_KEY_VAR));
        }

        Ok(Self { api_key: SecretString::from(key) })
    }

    pub fn api_key(&self) -> &SecretString {
        &self.api_key
    }
}
