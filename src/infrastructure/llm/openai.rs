use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::http_client::HttpClientTrait;
use crate::domain::llm::{FinishReason, Usage};
use crate::domain::{DomainError, LlmProvider, LlmRequest, LlmResponse, Message, MessageRole};
use crate::infrastructure::observability::{LlmRequestMetricParams, record_llm_request};

pub const DEFAULT_SEA_LION_BASE_URL: &str = "https://api.sea-lion.ai/v1";

/// Provider for any endpoint speaking the OpenAI chat-completions protocol
pub struct OpenAiCompatibleProvider<C: HttpClientTrait> {
    client: C,
    api_key: String,
    base_url: String,
}

impl<C: HttpClientTrait> std::fmt::Debug for OpenAiCompatibleProvider<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiCompatibleProvider")
            .field("client", &self.client)
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl<C: HttpClientTrait> OpenAiCompatibleProvider<C> {
    pub fn new(client: C, api_key: impl Into<String>) -> Self {
        Self::with_base_url(client, api_key, DEFAULT_SEA_LION_BASE_URL)
    }

    /// `base_url` includes the API version segment, e.g. `https://host/v1`
    pub fn with_base_url(
        client: C,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Self {
            client,
            api_key: api_key.into(),
            base_url,
        }
    }

    fn chat_completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn build_request(&self, model: &str, request: &LlmRequest) -> serde_json::Value {
        let messages: Vec<WireMessage<'_>> =
            request.messages.iter().map(WireMessage::from_domain).collect();

        let mut body = serde_json::json!({
            "model": model,
            "messages": messages,
        });

        if let Some(temp) = request.temperature {
            body["temperature"] = serde_json::json!(temp);
        }

        if let Some(max_tokens) = request.max_tokens {
            body["max_tokens"] = serde_json::json!(max_tokens);
        }

        body
    }

    fn bearer(&self) -> Option<&str> {
        Some(self.api_key.as_str()).filter(|key| !key.is_empty())
    }

    fn parse_response(&self, json: serde_json::Value) -> Result<LlmResponse, DomainError> {
        let response: ChatCompletion = serde_json::from_value(json).map_err(|e| {
            DomainError::provider(self.provider_name(), format!("Failed to parse response: {}", e))
        })?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| DomainError::provider(self.provider_name(), "No choices in response"))?;

        let message = Message::assistant(choice.message.content.unwrap_or_default());
        let mut llm_response = LlmResponse::new(response.id, response.model, message);

        if let Some(reason) = choice.finish_reason {
            llm_response = llm_response.with_finish_reason(FinishReason::from_wire(&reason));
        }

        if let Some(usage) = response.usage {
            llm_response =
                llm_response.with_usage(Usage::new(usage.prompt_tokens, usage.completion_tokens));
        }

        Ok(llm_response)
    }
}

#[async_trait]
impl<C: HttpClientTrait> LlmProvider for OpenAiCompatibleProvider<C> {
    #[tracing::instrument(skip(self, request), fields(provider = self.provider_name()))]
    async fn chat(&self, model: &str, request: LlmRequest) -> Result<LlmResponse, DomainError> {
        let started = Instant::now();
        let body = self.build_request(model, &request);

        let result = match self
            .client
            .post_json(&self.chat_completions_url(), self.bearer(), &body)
            .await
        {
            Ok(json) => self.parse_response(json),
            Err(e) => Err(e.into_domain(self.provider_name())),
        };

        let usage = result.as_ref().ok().and_then(|r| r.usage);
        record_llm_request(LlmRequestMetricParams {
            provider: self.provider_name(),
            model,
            duration: started.elapsed(),
            success: result.is_ok(),
            input_tokens: usage.map(|u| u64::from(u.prompt_tokens)),
            output_tokens: usage.map(|u| u64::from(u.completion_tokens)),
        });

        if let Err(ref e) = result {
            tracing::warn!(model = %model, error = %e, "Chat completion failed");
        }

        result
    }

    fn provider_name(&self) -> &'static str {
        "sea-lion"
    }
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

impl<'a> WireMessage<'a> {
    fn from_domain(message: &'a Message) -> Self {
        let role = match message.role {
            MessageRole::System => "system",
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        };

        Self {
            role,
            content: &message.content,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    id: String,
    #[serde(default)]
    model: String,
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::llm::http_client::mock::MockHttpClient;
    use crate::infrastructure::llm::http_client::TransportError;
    use crate::infrastructure::llm::HttpClient;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const URL: &str = "https://api.sea-lion.ai/v1/chat/completions";

    fn completion(content: &str) -> serde_json::Value {
        serde_json::json!({
            "id": "chatcmpl-123",
            "model": "aisingapore/Gemma-SEA-LION-v4-27B-IT",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": content},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 12, "completion_tokens": 8, "total_tokens": 20}
        })
    }

    fn request() -> LlmRequest {
        LlmRequest::builder()
            .system("Classify scams")
            .user("Win a prize now")
            .temperature(0.3)
            .build()
    }

    #[tokio::test]
    async fn test_chat_parses_completion() {
        let client = MockHttpClient::new().with_response(URL, completion("{\"risk_level\":\"high\"}"));
        let provider = OpenAiCompatibleProvider::new(client, "sk-test");

        let response = provider
            .chat("aisingapore/Gemma-SEA-LION-v4-27B-IT", request())
            .await
            .unwrap();

        assert_eq!(response.content(), "{\"risk_level\":\"high\"}");
        assert_eq!(response.finish_reason, Some(FinishReason::Stop));
        assert_eq!(response.usage.unwrap().total_tokens, 20);
    }

    #[tokio::test]
    async fn test_request_body() {
        let client = MockHttpClient::new().with_response(URL, completion("ok"));
        let provider = OpenAiCompatibleProvider::new(client, "sk-test");

        provider.chat("model-a", request()).await.unwrap();

        let bodies = provider.client.bodies();
        assert_eq!(bodies.len(), 1);
        assert_eq!(bodies[0]["model"], "model-a");
        assert_eq!(bodies[0]["messages"][0]["role"], "system");
        assert_eq!(bodies[0]["messages"][1]["content"], "Win a prize now");
        assert!(bodies[0].get("max_tokens").is_none());
        assert_eq!(provider.client.bearers(), vec![Some("sk-test".to_string())]);
    }

    #[tokio::test]
    async fn test_error_is_attributed_to_provider() {
        let client = MockHttpClient::new().with_error(
            URL,
            TransportError::Status {
                status: 500,
                body: "boom".to_string(),
            },
        );
        let provider = OpenAiCompatibleProvider::new(client, "sk-test");

        let err = provider.chat("model-a", request()).await.unwrap_err();
        assert!(matches!(
            err,
            DomainError::Provider { ref provider, .. } if provider == "sea-lion"
        ));
    }

    #[tokio::test]
    async fn test_timeout_is_distinct() {
        let client = MockHttpClient::new().with_error(URL, TransportError::Timeout);
        let provider = OpenAiCompatibleProvider::new(client, "sk-test");

        let err = provider.chat("model-a", request()).await.unwrap_err();
        assert!(matches!(err, DomainError::UpstreamTimeout { .. }));
    }

    #[tokio::test]
    async fn test_empty_choices() {
        let client = MockHttpClient::new()
            .with_response(URL, serde_json::json!({"id": "x", "model": "m", "choices": []}));
        let provider = OpenAiCompatibleProvider::new(client, "sk-test");

        let err = provider.chat("m", request()).await.unwrap_err();
        assert!(err.to_string().contains("No choices"));
    }

    #[tokio::test]
    async fn test_against_http_server() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-live"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion("hello")))
            .expect(1)
            .mount(&server)
            .await;

        let provider = OpenAiCompatibleProvider::with_base_url(
            HttpClient::new(),
            "sk-live",
            format!("{}/v1/", server.uri()),
        );

        let response = provider.chat("model-a", request()).await.unwrap();
        assert_eq!(response.content(), "hello");
    }

    #[tokio::test]
    async fn test_http_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
            .mount(&server)
            .await;

        let provider = OpenAiCompatibleProvider::with_base_url(
            HttpClient::new(),
            "sk-live",
            format!("{}/v1", server.uri()),
        );

        let err = provider.chat("model-a", request()).await.unwrap_err();
        let message = err.to_string();
        assert!(message.contains("429"));
        assert!(message.contains("slow down"));
    }
}
