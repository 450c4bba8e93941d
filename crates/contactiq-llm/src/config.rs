//! Provider configuration persistence and selection.
//!
//! Loaded once at process start; the resolved provider handle is injected
//! into the extraction client rather than looked up ambiently.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::types::Provider;

pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-3-5-haiku-20241022";
pub const DEFAULT_GROQ_MODEL: &str = "llama-3.3-70b-versatile";

/// Stored provider configuration (persisted to llm-config.json).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default = "default_preferred")]
    pub preferred_provider: String,
    #[serde(default)]
    pub openai_api_key: Option<String>,
    #[serde(default)]
    pub anthropic_api_key: Option<String>,
    #[serde(default)]
    pub groq_api_key: Option<String>,
    #[serde(default = "default_openai_model")]
    pub openai_model: String,
    #[serde(default = "default_anthropic_model")]
    pub anthropic_model: String,
    #[serde(default = "default_groq_model")]
    pub groq_model: String,
    /// Path to config file for saving.
    #[serde(skip)]
    pub config_path: PathBuf,
}

fn default_preferred() -> String {
    "auto".into()
}
fn default_openai_model() -> String {
    DEFAULT_OPENAI_MODEL.into()
}
fn default_anthropic_model() -> String {
    DEFAULT_ANTHROPIC_MODEL.into()
}
fn default_groq_model() -> String {
    DEFAULT_GROQ_MODEL.into()
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            preferred_provider: "auto".into(),
            openai_api_key: None,
            anthropic_api_key: None,
            groq_api_key: None,
            openai_model: DEFAULT_OPENAI_MODEL.into(),
            anthropic_model: DEFAULT_ANTHROPIC_MODEL.into(),
            groq_model: DEFAULT_GROQ_MODEL.into(),
            config_path: PathBuf::new(),
        }
    }
}

impl ProviderConfig {
    /// Load config from file, falling back to env vars and defaults.
    pub fn load(config_path: &Path) -> Self {
        let mut config: ProviderConfig = std::fs::read_to_string(config_path)
            .ok()
            .and_then(|s| serde_json::from_str(&s).ok())
            .unwrap_or_default();

        config.config_path = config_path.to_path_buf();

        // Env vars as fallback for API keys
        if config.openai_api_key.is_none() {
            config.openai_api_key = std::env::var("OPENAI_API_KEY").ok();
        }
        if config.anthropic_api_key.is_none() {
            config.anthropic_api_key = std::env::var("ANTHROPIC_API_KEY").ok();
        }
        if config.groq_api_key.is_none() {
            config.groq_api_key = std::env::var("GROQ_API_KEY").ok();
        }

        config
    }

    /// Save config to disk.
    pub fn save(&self) -> contactiq_core::Result<()> {
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&self.config_path, json)?;
        info!("Saved provider config to {}", self.config_path.display());
        Ok(())
    }

    /// Resolve which provider, model, and key to use.
    ///
    /// Selection order is fixed at startup: an explicit preference wins when
    /// its credential exists; otherwise the first provider with a credential
    /// (OpenAI, then Groq, then Anthropic) becomes the default.
    pub fn resolve_provider(&self) -> Option<(Provider, String, String)> {
        if self.preferred_provider != "auto" {
            return match self.preferred_provider.as_str() {
                "openai" => self
                    .openai_api_key
                    .as_ref()
                    .map(|k| (Provider::OpenAI, self.openai_model.clone(), k.clone())),
                "anthropic" => self
                    .anthropic_api_key
                    .as_ref()
                    .map(|k| (Provider::Anthropic, self.anthropic_model.clone(), k.clone())),
                "groq" => self
                    .groq_api_key
                    .as_ref()
                    .map(|k| (Provider::Groq, self.groq_model.clone(), k.clone())),
                _ => None,
            };
        }

        if let Some(k) = &self.openai_api_key {
            return Some((Provider::OpenAI, self.openai_model.clone(), k.clone()));
        }
        if let Some(k) = &self.groq_api_key {
            return Some((Provider::Groq, self.groq_model.clone(), k.clone()));
        }
        if let Some(k) = &self.anthropic_api_key {
            return Some((Provider::Anthropic, self.anthropic_model.clone(), k.clone()));
        }

        None
    }

    /// Names of every provider with a credential.
    pub fn configured_providers(&self) -> Vec<&'static str> {
        let mut out = Vec::new();
        if self.openai_api_key.is_some() {
            out.push("openai");
        }
        if self.groq_api_key.is_some() {
            out.push("groq");
        }
        if self.anthropic_api_key.is_some() {
            out.push("anthropic");
        }
        out
    }

    /// Build the public config view — keys masked, never serialized out.
    pub fn to_response(&self) -> serde_json::Value {
        let active = self.resolve_provider().map(|(p, _, _)| p.to_string());
        serde_json::json!({
            "preferredProvider": self.preferred_provider,
            "openaiConfigured": self.openai_api_key.is_some(),
            "anthropicConfigured": self.anthropic_api_key.is_some(),
            "groqConfigured": self.groq_api_key.is_some(),
            "openaiModel": self.openai_model,
            "anthropicModel": self.anthropic_model,
            "groqModel": self.groq_model,
            "activeProvider": active,
        })
    }
}

/// Config update request (from the HTTP surface).
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfigUpdate {
    #[serde(rename = "preferredProvider")]
    pub preferred_provider: Option<String>,
    #[serde(rename = "openaiApiKey")]
    pub openai_api_key: Option<String>,
    #[serde(rename = "anthropicApiKey")]
    pub anthropic_api_key: Option<String>,
    #[serde(rename = "groqApiKey")]
    pub groq_api_key: Option<String>,
    #[serde(rename = "openaiModel")]
    pub openai_model: Option<String>,
    #[serde(rename = "anthropicModel")]
    pub anthropic_model: Option<String>,
    #[serde(rename = "groqModel")]
    pub groq_model: Option<String>,
}

impl ProviderConfig {
    /// Apply an update, merging with existing config.
    pub fn apply_update(&mut self, update: &ProviderConfigUpdate) {
        if let Some(p) = &update.preferred_provider {
            self.preferred_provider = p.clone();
        }
        if let Some(k) = &update.openai_api_key {
            self.openai_api_key = Some(k.clone());
        }
        if let Some(k) = &update.anthropic_api_key {
            self.anthropic_api_key = Some(k.clone());
        }
        if let Some(k) = &update.groq_api_key {
            self.groq_api_key = Some(k.clone());
        }
        if let Some(m) = &update.openai_model {
            self.openai_model = m.clone();
        }
        if let Some(m) = &update.anthropic_model {
            self.anthropic_model = m.clone();
        }
        if let Some(m) = &update.groq_model {
            self.groq_model = m.clone();
        }
    }
}
