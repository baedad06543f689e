//! Client configuration
//!
//! Two inputs drive client construction:
//! 1. [`ClientConfig`] - which provider to target, resolved once into a [`ProviderKind`]
//! 2. [`ClientEnvironment`] - process-level settings shared by every client
//!    (organization, project, timeout, Azure API version)
//!
//! Environment variables:
//! - `OPENAI_ORGANIZATION` - Organization id sent with every request
//! - `OPENAI_PROJECT` - Project id sent with every request
//! - `OPENAI_TIMEOUT_MS` - Request timeout in milliseconds
//! - `AZURE_OPENAI_API_VERSION` - API version for Azure deployments

use serde::{Deserialize, Deserializer};
use std::collections::HashMap;
use std::time::Duration;

/// API version used for Azure deployments when none is configured
pub const DEFAULT_AZURE_API_VERSION: &str = "2025-03-01-preview";

/// Which construction path a provider takes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ProviderKind {
    /// OpenAI and every OpenAI-compatible endpoint
    #[default]
    Standard,
    /// Azure OpenAI Service
    Azure,
}

impl ProviderKind {
    /// Resolve a provider name.
    ///
    /// Only a case-insensitive match on `"azure"` selects [`ProviderKind::Azure`].
    /// Anything else, including an absent or unrecognized name, is
    /// [`ProviderKind::Standard`].
    pub fn from_provider(provider: Option<&str>) -> Self {
        match provider {
            Some(name) if name.eq_ignore_ascii_case("azure") => ProviderKind::Azure,
            _ => ProviderKind::Standard,
        }
    }

    /// Get the default API base URL for this provider kind
    pub fn default_base_url(&self) -> Option<&'static str> {
        match self {
            ProviderKind::Standard => Some("https://api.openai.com/v1"),
            // Azure endpoints are per-resource
            ProviderKind::Azure => None,
        }
    }
}

/// Which provider a client should target
///
/// The provider name and its [`ProviderKind`] are only changed together.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClientConfig {
    provider: Option<String>,
    kind: ProviderKind,
}

impl ClientConfig {
    /// Create a config for the given provider name
    pub fn new(provider: Option<impl Into<String>>) -> Self {
        let provider: Option<String> = provider.map(Into::into);
        let kind = ProviderKind::from_provider(provider.as_deref());
        Self { provider, kind }
    }

    /// Create a config for a named provider
    pub fn for_provider(provider: impl Into<String>) -> Self {
        Self::new(Some(provider))
    }

    /// Provider name as the caller spelled it
    pub fn provider(&self) -> Option<&str> {
        self.provider.as_deref()
    }

    /// Replace the provider name, re-resolving the construction path
    pub fn set_provider(&mut self, provider: Option<impl Into<String>>) {
        *self = Self::new(provider);
    }

    /// The resolved construction path
    pub fn kind(&self) -> ProviderKind {
        self.kind
    }

    /// Provider name used for credential lookup.
    ///
    /// An absent provider is looked up as `"openai"`.
    pub fn lookup_name(&self) -> &str {
        self.provider.as_deref().unwrap_or("openai")
    }
}

impl<'de> Deserialize<'de> for ClientConfig {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            #[serde(default)]
            provider: Option<String>,
        }

        let raw = Raw::deserialize(deserializer)?;
        Ok(ClientConfig::new(raw.provider))
    }
}

/// Process-level settings applied to every client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientEnvironment {
    /// Organization id (sent as `OpenAI-Organization`)
    pub organization: Option<String>,

    /// Project id (sent as `OpenAI-Project`)
    pub project: Option<String>,

    /// Request timeout; `None` leaves the client default in place
    pub timeout: Option<Duration>,

    /// API version for Azure deployments
    pub azure_api_version: String,
}

fn default_api_version() -> String {
    DEFAULT_AZURE_API_VERSION.to_string()
}

impl Default for ClientEnvironment {
    fn default() -> Self {
        Self {
            organization: None,
            project: None,
            timeout: None,
            azure_api_version: default_api_version(),
        }
    }
}

impl ClientEnvironment {
    /// Load settings from the process environment
    pub fn from_env() -> Self {
        let vars: HashMap<String, String> = std::env::vars().collect();
        Self::from_vars(&vars)
    }

    /// Load settings from an explicit variable map
    pub fn from_vars(vars: &HashMap<String, String>) -> Self {
        // Organization and project are passed through as given
        let raw = |key: &str| vars.get(key).filter(|v| !v.is_empty()).cloned();
        let get = |key: &str| {
            vars.get(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let timeout = get("OPENAI_TIMEOUT_MS").and_then(|raw| match raw.parse::<u64>() {
            Ok(ms) => Some(Duration::from_millis(ms)),
            Err(e) => {
                tracing::warn!("Ignoring invalid OPENAI_TIMEOUT_MS={:?}: {}", raw, e);
                None
            }
        });

        Self {
            organization: raw("OPENAI_ORGANIZATION"),
            project: raw("OPENAI_PROJECT"),
            timeout,
            azure_api_version: get("AZURE_OPENAI_API_VERSION").unwrap_or_else(default_api_version),
        }
    }

    /// Set the organization id
    pub fn with_organization(mut self, organization: impl Into<String>) -> Self {
        self.organization = Some(organization.into());
        self
    }

    /// Set the project id
    pub fn with_project(mut self, project: impl Into<String>) -> Self {
        self.project = Some(project.into());
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the Azure API version
    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.azure_api_version = version.into();
        self
    }
}
