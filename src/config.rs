use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub llm: LlmConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LlmConfig {
    #[serde(default = "default_provider")]
    pub provider: String, // "openai", "gemini", "ollama" or "none"
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    /// Overrides the provider model for chapter generation.
    pub chapter_model: Option<String>,
    /// Overrides the provider model for title generation.
    pub title_model: Option<String>,
    pub gemini: Option<GeminiConfig>,
    pub ollama: Option<OllamaConfig>,
    pub openai: Option<OpenAIConfig>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            timeout_seconds: default_timeout(),
            chapter_model: None,
            title_model: None,
            gemini: None,
            ollama: None,
            openai: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OpenAIConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_openai_model")]
    pub model: String,
    /// Titles are text-only, so they go to a plain chat model by default.
    #[serde(default = "default_openai_title_model")]
    pub title_model: Option<String>,
    pub base_url: Option<String>,
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_openai_model(),
            title_model: default_openai_title_model(),
            base_url: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GeminiConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_gemini_model")]
    pub model: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_gemini_model(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OllamaConfig {
    #[serde(default = "default_ollama_base_url")]
    pub base_url: String,
    pub model: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    5847
}
fn default_provider() -> String {
    "openai".to_string()
}
fn default_timeout() -> u64 {
    60
}
fn default_openai_title_model() -> Option<String> {
    Some("gpt-4".to_string())
}
fn default_openai_model() -> String {
    "gpt-4-vision-preview".to_string()
}
fn default_gemini_model() -> String {
    "gemini-1.5-flash".to_string()
}
fn default_ollama_base_url() -> String {
    "http://127.0.0.1:11434".to_string()
}

/// Per-purpose model ids handed to the gateway. `None` means the provider's
/// configured model.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelSelection {
    pub chapter: Option<String>,
    pub title: Option<String>,
}

impl LlmConfig {
    pub fn model_selection(&self) -> ModelSelection {
        let provider_title = match self.provider.as_str() {
            "openai" => self
                .openai
                .as_ref()
                .map_or_else(default_openai_title_model, |c| c.title_model.clone()),
            _ => None,
        };
        ModelSelection {
            chapter: self.chapter_model.clone(),
            title: self.title_model.clone().or(provider_title),
        }
    }
}

impl Config {
    /// Loads `config.yml` from the working directory. A missing file is not
    /// an error: the server then runs on defaults plus environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(Path::new("config.yml"))?;
        config.apply_env_overrides(|key| env::var(key).ok());
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::warn!("{} not found, using default configuration", path.display());
            return Ok(Config::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Config = serde_yaml_ng::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(config)
    }

    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("OPENAI_API_KEY").filter(|k| !k.is_empty()) {
            self.llm.openai.get_or_insert_with(OpenAIConfig::default).api_key = key;
        }
        if let Some(key) = lookup("GEMINI_API_KEY").filter(|k| !k.is_empty()) {
            self.llm.gemini.get_or_insert_with(GeminiConfig::default).api_key = key;
        }
        if let Some(port) = lookup("STORY_SERVER_PORT") {
            match port.parse() {
                Ok(p) => self.server.port = p,
                Err(_) => log::warn!("Ignoring invalid STORY_SERVER_PORT: {}", port),
            }
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
