//! Client handles for the standard and Azure OpenAI endpoints

use super::{config::ProviderKind, message::Message, Error, Result, Usage};
use indexmap::IndexMap;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client as HttpClient, RequestBuilder};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Request timeout used when none is configured
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(600);

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default headers attached to every request, in insertion order
pub type HeaderSet = IndexMap<String, String>;

/// A constructed client, standard or Azure
pub type ClientHandle = Box<dyn Client>;

/// Build an HTTP client with the given timeout and default headers
fn build_http_client(timeout: Duration, headers: &HeaderSet) -> Result<HttpClient> {
    let mut default_headers = HeaderMap::new();
    for (name, value) in headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| Error::Config(format!("invalid header name {:?}: {}", name, e)))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| Error::Config(format!("invalid value for header {}: {}", name, e)))?;
        default_headers.insert(name, value);
    }

    Ok(HttpClient::builder()
        .timeout(timeout)
        .connect_timeout(CONNECT_TIMEOUT)
        .default_headers(default_headers)
        .build()?)
}

/// Trait for LLM client handles
///
/// Both variants expose the same surface; only [`AzureOpenAIClient`] has an
/// API version.
#[async_trait::async_trait]
pub trait Client: Send + Sync {
    /// Which construction path produced this client
    fn kind(&self) -> ProviderKind;

    /// Resolved API key
    fn api_key(&self) -> Option<&str>;

    /// Resolved API base URL
    fn base_url(&self) -> Option<&str>;

    /// API version sent with every request, Azure only
    fn api_version(&self) -> Option<&str> {
        None
    }

    /// Request timeout
    fn timeout(&self) -> Duration;

    /// Headers attached to every request
    fn default_headers(&self) -> &HeaderSet;

    /// Send a chat completion request and return the raw HTTP response.
    async fn chat_raw(&self, messages: &[Message], model: &str) -> Result<reqwest::Response>;

    /// Send a streaming chat completion request and return the raw HTTP
    /// response. The server-sent event body is left to the caller.
    async fn chat_stream_raw(&self, messages: &[Message], model: &str) -> Result<reqwest::Response>;

    /// Send a chat completion request (non-streaming)
    async fn chat(&self, messages: &[Message], model: &str) -> Result<(String, Usage)> {
        let response = self.chat_raw(messages, model).await?;
        let body = response.text().await?;

        let response: ChatResponse = serde_json::from_str(&body)
            .map_err(|e| Error::Api(format!("Failed to parse chat response: {}. Body: {}", e, body)))?;
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| Error::Api("No choices in chat response".to_string()))?;

        let usage = response
            .usage
            .map(|u| Usage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            })
            .unwrap_or_default();

        Ok((choice.message.content.unwrap_or_default(), usage))
    }
}

/// State shared by both client variants.
///
/// Nothing here is validated at construction; problems are reported when a
/// request is attempted.
struct Transport {
    provider: String,
    api_key: Option<String>,
    base_url: Option<String>,
    timeout: Duration,
    headers: HeaderSet,
    http_client: std::result::Result<HttpClient, String>,
}

impl Transport {
    fn new(
        provider: &str,
        api_key: Option<String>,
        base_url: Option<String>,
        timeout: Option<Duration>,
        headers: HeaderSet,
    ) -> Self {
        let timeout = timeout.unwrap_or(DEFAULT_TIMEOUT);
        let http_client = build_http_client(timeout, &headers).map_err(|e| e.to_string());
        if let Err(e) = &http_client {
            tracing::warn!("HTTP client for provider '{}' unavailable: {}", provider, e);
        }

        Transport {
            provider: provider.to_string(),
            api_key,
            base_url,
            timeout,
            headers,
            http_client,
        }
    }

    fn http_client(&self) -> Result<&HttpClient> {
        self.http_client
            .as_ref()
            .map_err(|e| Error::Config(format!("HTTP client unavailable: {}", e)))
    }

    fn require_api_key(&self) -> Result<&str> {
        self.api_key.as_deref().ok_or_else(|| Error::MissingApiKey {
            provider: self.provider.clone(),
        })
    }

    fn require_base_url(&self) -> Result<&str> {
        self.base_url
            .as_deref()
            .map(|url| url.trim_end_matches('/'))
            .ok_or_else(|| Error::MissingBaseUrl {
                provider: self.provider.clone(),
            })
    }

    async fn send(&self, label: &str, request: RequestBuilder) -> Result<reqwest::Response> {
        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Api(format!("{} API error ({}): {}", label, status, body)));
        }

        Ok(response)
    }
}

/// Client for the standard OpenAI API and OpenAI-compatible endpoints
pub struct OpenAIClient {
    transport: Transport,
}

impl OpenAIClient {
    /// Create a new OpenAI client. A missing base URL falls back to the
    /// public OpenAI endpoint.
    pub fn new(
        provider: &str,
        api_key: Option<String>,
        base_url: Option<String>,
        timeout: Option<Duration>,
        headers: HeaderSet,
    ) -> Self {
        let base_url = base_url.or_else(|| {
            ProviderKind::Standard
                .default_base_url()
                .map(str::to_string)
        });
        OpenAIClient {
            transport: Transport::new(provider, api_key, base_url, timeout, headers),
        }
    }

    fn request(&self, messages: &[Message], model: &str, stream: bool) -> Result<RequestBuilder> {
        let t = &self.transport;
        let url = format!("{}/chat/completions", t.require_base_url()?);
        let api_key = t.require_api_key()?;

        Ok(t.http_client()?
            .post(&url)
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&ChatRequest {
                model: model.to_string(),
                messages: messages.to_vec(),
                stream,
            }))
    }
}

#[async_trait::async_trait]
impl Client for OpenAIClient {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Standard
    }

    fn api_key(&self) -> Option<&str> {
        self.transport.api_key.as_deref()
    }

    fn base_url(&self) -> Option<&str> {
        self.transport.base_url.as_deref()
    }

    fn timeout(&self) -> Duration {
        self.transport.timeout
    }

    fn default_headers(&self) -> &HeaderSet {
        &self.transport.headers
    }

    async fn chat_raw(&self, messages: &[Message], model: &str) -> Result<reqwest::Response> {
        let request = self.request(messages, model, false)?;
        self.transport.send("OpenAI", request).await
    }

    async fn chat_stream_raw(&self, messages: &[Message], model: &str) -> Result<reqwest::Response> {
        let request = self.request(messages, model, true)?;
        self.transport.send("OpenAI", request).await
    }
}

/// Client for Azure OpenAI Service deployments.
///
/// The model name of each request selects the deployment:
/// `{base_url}/deployments/{model}/chat/completions?api-version={api_version}`.
pub struct AzureOpenAIClient {
    transport: Transport,
    api_version: String,
}

impl AzureOpenAIClient {
    /// Create a new Azure OpenAI client
    pub fn new(
        provider: &str,
        api_key: Option<String>,
        base_url: Option<String>,
        api_version: impl Into<String>,
        timeout: Option<Duration>,
        headers: HeaderSet,
    ) -> Self {
        AzureOpenAIClient {
            transport: Transport::new(provider, api_key, base_url, timeout, headers),
            api_version: api_version.into(),
        }
    }

    fn request(&self, messages: &[Message], model: &str, stream: bool) -> Result<RequestBuilder> {
        let t = &self.transport;
        let url = format!(
            "{}/deployments/{}/chat/completions",
            t.require_base_url()?,
            deployment_segment(model)?
        );
        let api_key = t.require_api_key()?;

        Ok(t.http_client()?
            .post(&url)
            .query(&[("api-version", self.api_version.as_str())])
            .header("api-key", api_key)
            .json(&ChatRequest {
                model: model.to_string(),
                messages: messages.to_vec(),
                stream,
            }))
    }
}

#[async_trait::async_trait]
impl Client for AzureOpenAIClient {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Azure
    }

    fn api_key(&self) -> Option<&str> {
        self.transport.api_key.as_deref()
    }

    fn base_url(&self) -> Option<&str> {
        self.transport.base_url.as_deref()
    }

    fn api_version(&self) -> Option<&str> {
        Some(&self.api_version)
    }

    fn timeout(&self) -> Duration {
        self.transport.timeout
    }

    fn default_headers(&self) -> &HeaderSet {
        &self.transport.headers
    }

    async fn chat_raw(&self, messages: &[Message], model: &str) -> Result<reqwest::Response> {
        let request = self.request(messages, model, false)?;
        self.transport.send("Azure OpenAI", request).await
    }

    async fn chat_stream_raw(&self, messages: &[Message], model: &str) -> Result<reqwest::Response> {
        let request = self.request(messages, model, true)?;
        self.transport.send("Azure OpenAI", request).await
    }
}

/// Check that a deployment name is a single plain path segment
fn deployment_segment(model: &str) -> Result<&str> {
    let valid = !model.is_empty()
        && model != "."
        && model != ".."
        && model
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if valid {
        Ok(model)
    } else {
        Err(Error::Config(format!("invalid Azure deployment name {:?}", model)))
    }
}

// Wire types

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}
