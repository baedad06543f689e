//! Provider-aware client factory for the OpenAI and Azure OpenAI APIs
mod client;
mod config;
mod message;
mod provider;
mod resolver;

#[cfg(test)]
mod mock_server;

use thiserror::Error;

/// Result type for llm-factory operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for llm-factory operations
///
/// None of these are raised by [`create_client`]; they surface from the
/// returned handle when it is used.
#[derive(Debug, Error)]
pub enum Error {
    /// API error
    #[error("API error: {0}")]
    Api(String),

    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// No API key could be resolved for the provider
    #[error("no API key configured for provider '{provider}'")]
    MissingApiKey { provider: String },

    /// No endpoint could be resolved for the provider
    #[error("no base URL configured for provider '{provider}'")]
    MissingBaseUrl { provider: String },
}

pub use client::{AzureOpenAIClient, Client, ClientHandle, HeaderSet, OpenAIClient, DEFAULT_TIMEOUT};
pub use config::{ClientConfig, ClientEnvironment, ProviderKind, DEFAULT_AZURE_API_VERSION};
pub use message::{Message, MessageRole, Usage};
pub use provider::{build_headers, create_client, redact_api_key};
pub use resolver::{ConfigResolver, EnvResolver, ProviderInfo, ProviderTable};
