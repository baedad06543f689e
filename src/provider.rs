//! Client creation

use super::client::{AzureOpenAIClient, ClientHandle, HeaderSet, OpenAIClient, DEFAULT_TIMEOUT};
use super::config::{ClientConfig, ClientEnvironment, ProviderKind};
use super::resolver::ConfigResolver;

/// Build the default headers from the client environment.
///
/// `OpenAI-Organization` and `OpenAI-Project` are each added only when the
/// corresponding value is set and non-empty.
pub fn build_headers(env: &ClientEnvironment) -> HeaderSet {
    let mut headers = HeaderSet::new();
    let present = |value: &Option<String>| value.as_ref().filter(|v| !v.is_empty()).cloned();

    if let Some(organization) = present(&env.organization) {
        headers.insert("OpenAI-Organization".to_string(), organization);
    }
    if let Some(project) = present(&env.project) {
        headers.insert("OpenAI-Project".to_string(), project);
    }
    headers
}

/// Create a client for the configured provider.
///
/// The variant is chosen by [`ClientConfig::kind`] alone; unrecognized
/// provider names get the standard client. Credentials are looked up by the
/// provider name as given. This never fails: a missing key or endpoint is
/// reported by the returned client when it is first used.
pub fn create_client(
    config: &ClientConfig,
    env: &ClientEnvironment,
    resolver: &dyn ConfigResolver,
) -> ClientHandle {
    let headers = build_headers(env);
    let provider = config.lookup_name();
    let api_key = resolver.api_key(provider);
    let base_url = resolver.base_url(provider);
    let timeout = env.timeout.unwrap_or(DEFAULT_TIMEOUT);

    match config.kind() {
        ProviderKind::Azure => {
            tracing::debug!(
                provider,
                api_key = %redact_api_key(api_key.as_deref()),
                base_url = ?base_url,
                api_version = %env.azure_api_version,
                timeout = ?timeout,
                headers = ?headers,
                "Creating Azure OpenAI client"
            );
            Box::new(AzureOpenAIClient::new(
                provider,
                api_key,
                base_url,
                env.azure_api_version.clone(),
                Some(timeout),
                headers,
            ))
        }
        ProviderKind::Standard => {
            tracing::debug!(
                provider,
                api_key = %redact_api_key(api_key.as_deref()),
                base_url = ?base_url,
                timeout = ?timeout,
                headers = ?headers,
                "Creating OpenAI client"
            );
            Box::new(OpenAIClient::new(provider, api_key, base_url, Some(timeout), headers))
        }
    }
}

/// Render an API key for logs: the first few characters, then `***`
pub fn redact_api_key(key: Option<&str>) -> String {
    match key {
        None => "<unset>".to_string(),
        Some(key) => {
            let prefix: String = key.chars().take(8.min(key.chars().count() / 2)).collect();
            format!("{}***", prefix)
        }
    }
}
