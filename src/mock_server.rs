//! Mock HTTP servers for testing client handles offline
//!
//! wiremock-based stand-ins for the OpenAI and Azure OpenAI chat endpoints.
//! Each mock only answers requests that follow that provider's URL and
//! authentication conventions.

use wiremock::{
    matchers::{header, method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

fn chat_completion_body(content: &str, total_tokens: u32) -> serde_json::Value {
    serde_json::json!({
        "id": "chatcmpl-mock",
        "object": "chat.completion",
        "created": 1234567890,
        "model": "gpt-4o-mini",
        "choices": [{
            "index": 0,
            "message": {
                "role": "assistant",
                "content": content
            },
            "finish_reason": "stop"
        }],
        "usage": {
            "prompt_tokens": 10,
            "completion_tokens": total_tokens - 10,
            "total_tokens": total_tokens
        }
    })
}

/// OpenAI mock server for testing
pub struct OpenAIMockServer {
    server: MockServer,
}

impl OpenAIMockServer {
    /// Create a new OpenAI mock server
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        Self { server }
    }

    /// Get the base URL of this mock server
    pub fn base_url(&self) -> String {
        self.server.uri()
    }

    /// Answer chat completions sent with `Authorization: Bearer {api_key}`
    pub async fn mock_chat_completion(&self, api_key: &str, content: &str, total_tokens: u32) {
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("Authorization", format!("Bearer {}", api_key).as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat_completion_body(content, total_tokens)))
            .mount(&self.server)
            .await;
    }

    /// Answer with an error status
    pub async fn mock_error(&self, status: u16, body: &str) {
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&self.server)
            .await;
    }

    /// Requests received so far
    pub async fn received(&self) -> Vec<wiremock::Request> {
        self.server.received_requests().await.unwrap_or_default()
    }
}

/// Azure OpenAI mock server for testing
pub struct AzureMockServer {
    server: MockServer,
}

impl AzureMockServer {
    /// Create a new Azure OpenAI mock server
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        Self { server }
    }

    /// Base URL in the `.../openai` form Azure resources use
    pub fn base_url(&self) -> String {
        format!("{}/openai", self.server.uri())
    }

    /// Answer chat completions for one deployment at one API version
    pub async fn mock_deployment(
        &self,
        deployment: &str,
        api_version: &str,
        api_key: &str,
        content: &str,
        total_tokens: u32,
    ) {
        Mock::given(method("POST"))
            .and(path(format!("/openai/deployments/{}/chat/completions", deployment)))
            .and(query_param("api-version", api_version))
            .and(header("api-key", api_key))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat_completion_body(content, total_tokens)))
            .mount(&self.server)
            .await;
    }

    /// Requests received so far
    pub async fn received(&self) -> Vec<wiremock::Request> {
        self.server.received_requests().await.unwrap_or_default()
    }

    /// Answer streaming requests with a fixed SSE body
    pub async fn mock_deployment_stream(&self, deployment: &str, sse_body: &str) {
        Mock::given(method("POST"))
            .and(path(format!("/openai/deployments/{}/chat/completions", deployment)))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/event-stream")
                    .set_body_string(sse_body),
            )
            .mount(&self.server)
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{create_client, ClientConfig, ClientEnvironment, EnvResolver, Error, Message, ProviderKind, ProviderTable};
    use std::collections::HashMap;

    fn resolver(pairs: &[(&str, String)]) -> EnvResolver {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        EnvResolver::with_vars(ProviderTable::builtin(), vars)
    }

    #[tokio::test]
    async fn test_openai_mock_non_streaming() {
        let mock = OpenAIMockServer::start().await;
        mock.mock_chat_completion("sk-test", "Hello, world!", 50).await;

        let r = resolver(&[
            ("OPENAI_API_KEY", "sk-test".to_string()),
            ("OPENAI_BASE_URL", mock.base_url()),
        ]);
        let env = ClientEnvironment::default()
            .with_organization("org-1")
            .with_project("proj-1");
        let client = create_client(&ClientConfig::for_provider("openai"), &env, &r);

        let messages = vec![Message::user("Say hello")];
        let (response, usage) = client.chat(&messages, "gpt-4o-mini").await.unwrap();

        assert_eq!(response, "Hello, world!");
        assert_eq!(usage.total_tokens, 50);

        let received = mock.received().await;
        assert_eq!(received.len(), 1);
        let request = &received[0];
        assert_eq!(request.headers.get("OpenAI-Organization").unwrap(), "org-1");
        assert_eq!(request.headers.get("OpenAI-Project").unwrap(), "proj-1");
        assert!(request.url.query().is_none());

        let body: serde_json::Value = serde_json::from_slice(&request.body).unwrap();
        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["stream"], false);
    }

    #[tokio::test]
    async fn test_openai_mock_without_default_headers() {
        let mock = OpenAIMockServer::start().await;
        mock.mock_chat_completion("sk-test", "ok", 20).await;

        let r = resolver(&[
            ("OPENAI_API_KEY", "sk-test".to_string()),
            ("OPENAI_BASE_URL", mock.base_url()),
        ]);
        let client = create_client(&ClientConfig::for_provider("openai"), &ClientEnvironment::default(), &r);
        client.chat(&[Message::user("hi")], "gpt-4o-mini").await.unwrap();

        let received = mock.received().await;
        assert!(received[0].headers.get("OpenAI-Organization").is_none());
        assert!(received[0].headers.get("OpenAI-Project").is_none());
    }

    #[tokio::test]
    async fn test_openai_mock_api_error() {
        let mock = OpenAIMockServer::start().await;
        mock.mock_error(401, "invalid api key").await;

        let r = resolver(&[
            ("OPENAI_API_KEY", "sk-wrong".to_string()),
            ("OPENAI_BASE_URL", mock.base_url()),
        ]);
        let client = create_client(&ClientConfig::default(), &ClientEnvironment::default(), &r);
        let err = client.chat(&[Message::user("hi")], "gpt-4o-mini").await.unwrap_err();

        match err {
            Error::Api(msg) => {
                assert!(msg.contains("401"), "{msg}");
                assert!(msg.contains("invalid api key"), "{msg}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_unknown_provider_uses_standard_conventions() {
        let mock = OpenAIMockServer::start().await;
        mock.mock_chat_completion("foo-key", "from foo", 30).await;

        let r = resolver(&[
            ("FOO_API_KEY", "foo-key".to_string()),
            ("FOO_BASE_URL", mock.base_url()),
        ]);
        let client = create_client(&ClientConfig::for_provider("foo"), &ClientEnvironment::default(), &r);
        assert_eq!(client.kind(), ProviderKind::Standard);

        let (response, _) = client.chat(&[Message::user("hi")], "foo-model").await.unwrap();
        assert_eq!(response, "from foo");
    }

    #[tokio::test]
    async fn test_azure_mock_non_streaming() {
        let mock = AzureMockServer::start().await;
        mock.mock_deployment("gpt-4o", "2024-10-21", "az-key", "Hello from Azure!", 40)
            .await;

        let r = resolver(&[
            ("AZURE_OPENAI_API_KEY", "az-key".to_string()),
            ("AZURE_BASE_URL", mock.base_url()),
        ]);
        let env = ClientEnvironment::default()
            .with_api_version("2024-10-21")
            .with_organization("org-1")
            .with_project("proj-1");
        let client = create_client(&ClientConfig::for_provider("Azure"), &env, &r);

        let (response, usage) = client.chat(&[Message::user("Say hello")], "gpt-4o").await.unwrap();
        assert_eq!(response, "Hello from Azure!");
        assert_eq!(usage.prompt_tokens, 10);
        assert_eq!(usage.completion_tokens, 30);

        let received = mock.received().await;
        assert_eq!(received.len(), 1);
        let request = &received[0];
        assert_eq!(request.headers.get("api-key").unwrap(), "az-key");
        assert!(request.headers.get("Authorization").is_none());
        assert_eq!(request.headers.get("OpenAI-Organization").unwrap(), "org-1");
        assert_eq!(request.headers.get("OpenAI-Project").unwrap(), "proj-1");
    }

    #[tokio::test]
    async fn test_azure_mock_wrong_api_version_is_not_matched() {
        let mock = AzureMockServer::start().await;
        mock.mock_deployment("gpt-4o", "2024-10-21", "az-key", "unused", 20)
            .await;

        let r = resolver(&[
            ("AZURE_OPENAI_API_KEY", "az-key".to_string()),
            ("AZURE_BASE_URL", mock.base_url()),
        ]);
        let env = ClientEnvironment::default().with_api_version("2023-05-15");
        let client = create_client(&ClientConfig::for_provider("azure"), &env, &r);

        let err = client.chat(&[Message::user("hi")], "gpt-4o").await.unwrap_err();
        assert!(matches!(err, Error::Api(ref msg) if msg.contains("404")), "{err}");
    }

    #[tokio::test]
    async fn test_azure_mock_stream_raw() {
        let mock = AzureMockServer::start().await;
        let sse = "data: {\"choices\":[{\"delta\":{\"content\":\"Hi\"}}]}\n\ndata: [DONE]\n\n";
        mock.mock_deployment_stream("gpt-4o", sse).await;

        let r = resolver(&[
            ("AZURE_OPENAI_API_KEY", "az-key".to_string()),
            ("AZURE_BASE_URL", mock.base_url()),
        ]);
        let client = create_client(&ClientConfig::for_provider("azure"), &ClientEnvironment::default(), &r);

        let response = client.chat_stream_raw(&[Message::user("hi")], "gpt-4o").await.unwrap();
        assert_eq!(response.text().await.unwrap(), sse);
    }
}
