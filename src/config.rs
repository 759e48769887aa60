use crate::error::{AgentError, Result};
use serde::Deserialize;
use std::fs;
use std::time::Duration;

const CONFIG_PATH: &str = "config.toml";

/// Runtime configuration. API keys stay in the environment; this file only
/// carries tunables. A missing `config.toml` means defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub http: HttpConfig,
    pub llm: LlmConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_seconds: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { timeout_seconds: 15 }
    }
}

impl HttpConfig {
    /// Shared client settings for every outbound API call. The timeout keeps
    /// one slow source from stalling the aggregation join indefinitely.
    pub fn build_client(&self) -> Result<reqwest::Client> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(self.timeout_seconds))
            .build()?;
        Ok(client)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub model: String,
    /// Custom base URL for OpenAI-compatible local model servers.
    pub base_url: Option<String>,
    /// Upper bound on tool-call round trips per user message.
    pub max_iterations: usize,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            base_url: None,
            max_iterations: 3,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        match fs::read_to_string(CONFIG_PATH) {
            Ok(content) => {
                let config: Config = toml::from_str(&content)?;
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Config::default()),
            Err(e) => Err(AgentError::Config(format!(
                "Failed to read config file '{}': {}",
                CONFIG_PATH, e
            ))),
        }
    }
}
