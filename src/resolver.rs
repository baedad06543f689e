//! Credential and endpoint resolution per provider name
//!
//! Lookup order for a provider `p`:
//! - base URL: `{P}_BASE_URL`, then the provider table, then `OPENAI_BASE_URL`
//! - API key: the table entry's key variable, then `{P}_API_KEY`, then `OPENAI_API_KEY`
//!
//! The provider table can be extended from a TOML file:
//! ```toml
//! [providers.together]
//! name = "Together"
//! base_url = "https://api.together.xyz/v1"
//! env_key = "TOGETHER_API_KEY"
//! ```

use anyhow::Context;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Source of per-provider credentials and endpoints
pub trait ConfigResolver: Send + Sync {
    /// API key for a provider, if one is configured
    fn api_key(&self, provider: &str) -> Option<String>;

    /// Base URL for a provider, if one is configured
    fn base_url(&self, provider: &str) -> Option<String>;
}

/// One entry of the provider table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderInfo {
    /// Display name
    pub name: String,

    /// API base URL
    pub base_url: String,

    /// Environment variable holding the API key
    pub env_key: String,
}

impl ProviderInfo {
    fn new(name: &str, base_url: &str, env_key: &str) -> Self {
        Self {
            name: name.to_string(),
            base_url: base_url.to_string(),
            env_key: env_key.to_string(),
        }
    }
}

/// Known providers keyed by lowercase id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderTable {
    #[serde(default)]
    providers: IndexMap<String, ProviderInfo>,
}

impl Default for ProviderTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ProviderTable {
    /// The providers known out of the box
    pub fn builtin() -> Self {
        let providers = [
            ("openai", ProviderInfo::new("OpenAI", "https://api.openai.com/v1", "OPENAI_API_KEY")),
            ("openrouter", ProviderInfo::new("OpenRouter", "https://openrouter.ai/api/v1", "OPENROUTER_API_KEY")),
            ("azure", ProviderInfo::new("AzureOpenAI", "https://YOUR_PROJECT_NAME.openai.azure.com/openai", "AZURE_OPENAI_API_KEY")),
            ("gemini", ProviderInfo::new("Gemini", "https://generativelanguage.googleapis.com/v1beta/openai", "GEMINI_API_KEY")),
            ("ollama", ProviderInfo::new("Ollama", "http://localhost:11434/v1", "OLLAMA_API_KEY")),
            ("mistral", ProviderInfo::new("Mistral", "https://api.mistral.ai/v1", "MISTRAL_API_KEY")),
            ("deepseek", ProviderInfo::new("DeepSeek", "https://api.deepseek.com", "DEEPSEEK_API_KEY")),
            ("xai", ProviderInfo::new("xAI", "https://api.x.ai/v1", "XAI_API_KEY")),
            ("groq", ProviderInfo::new("Groq", "https://api.groq.com/openai/v1", "GROQ_API_KEY")),
            ("arceeai", ProviderInfo::new("ArceeAI", "https://conductor.arcee.ai/v1", "ARCEEAI_API_KEY")),
        ];

        Self {
            providers: providers
                .into_iter()
                .map(|(id, info)| (id.to_string(), info))
                .collect(),
        }
    }

    /// Look up a provider, case-insensitively
    pub fn get(&self, provider: &str) -> Option<&ProviderInfo> {
        self.providers.get(&provider.to_lowercase())
    }

    /// Add or replace a provider entry
    pub fn insert(&mut self, id: impl Into<String>, info: ProviderInfo) {
        self.providers.insert(id.into().to_lowercase(), info);
    }

    /// Iterate over `(id, info)` pairs in table order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ProviderInfo)> {
        self.providers.iter().map(|(id, info)| (id.as_str(), info))
    }

    /// Built-in table overlaid with the `[providers.*]` entries of a TOML document
    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let user: ProviderTable = toml::from_str(content).context("invalid provider table")?;
        let mut table = Self::builtin();
        for (id, info) in user.providers {
            table.insert(id, info);
        }
        Ok(table)
    }

    /// Load a provider table from a TOML file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| format!("failed to parse {}", path.display()))
    }

    /// Load from the default config file, falling back to the built-in table
    /// when the file does not exist
    pub fn load_with_default() -> anyhow::Result<Self> {
        match Self::default_path() {
            Some(path) if path.exists() => {
                tracing::debug!("Loading provider table from {}", path.display());
                Self::load(path)
            }
            _ => Ok(Self::builtin()),
        }
    }

    /// `<config_dir>/llm-factory/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("llm-factory").join("config.toml"))
    }
}

/// Resolves credentials from a provider table and an environment snapshot
#[derive(Debug, Clone, Default)]
pub struct EnvResolver {
    table: ProviderTable,
    vars: HashMap<String, String>,
}

impl EnvResolver {
    /// Snapshot the process environment
    pub fn from_env(table: ProviderTable) -> Self {
        Self {
            table,
            vars: std::env::vars().collect(),
        }
    }

    /// Resolve against an explicit variable map
    pub fn with_vars(table: ProviderTable, vars: HashMap<String, String>) -> Self {
        Self { table, vars }
    }

    /// The provider table in use
    pub fn table(&self) -> &ProviderTable {
        &self.table
    }

    fn var(&self, key: &str) -> Option<String> {
        self.vars.get(key).filter(|v| !v.is_empty()).cloned()
    }
}

impl ConfigResolver for EnvResolver {
    fn api_key(&self, provider: &str) -> Option<String> {
        if let Some(info) = self.table.get(provider) {
            let key = self.var(&info.env_key);
            // Local Ollama servers ignore the key, but clients still send one
            if key.is_none() && info.name.eq_ignore_ascii_case("ollama") {
                return Some("dummy".to_string());
            }
            return key;
        }

        self.var(&format!("{}_API_KEY", provider.to_uppercase()))
            .or_else(|| self.var("OPENAI_API_KEY"))
    }

    fn base_url(&self, provider: &str) -> Option<String> {
        self.var(&format!("{}_BASE_URL", provider.to_uppercase()))
            .or_else(|| self.table.get(provider).map(|info| info.base_url.clone()))
            .or_else(|| self.var("OPENAI_BASE_URL"))
    }
}
