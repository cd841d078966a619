use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::hooks::PromptTemplate;
use super::ContentGenerator;
use crate::config::AppConfig;
use crate::error::ClientError;

const TEMPERATURE: f64 = 0.7;
const MAX_TOKENS: u32 = 1000;

const ASSISTANT_PROMPT: &str = "You are a helpful assistant for Instagram content creators. \
    Answer clearly and concisely. Respond in Persian (Farsi) unless the user writes in another language.";

#[derive(Debug, Clone, Serialize)]
struct CompletionMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<CompletionMessage>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
    usage: Option<CompletionUsage>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessageContent,
}

#[derive(Debug, Deserialize)]
struct CompletionMessageContent {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CompletionUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

pub struct LlmClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

/// A simple (role, content) pair for building the messages array.
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

pub struct LlmResponse {
    pub text: String,
    pub usage: Option<CompletionUsage>,
}

impl LlmClient {
    pub fn new(config: &AppConfig) -> anyhow::Result<Self> {
        let mut builder = Client::builder().timeout(config.llm_timeout);
        if let Some(proxy) = &config.proxy_url {
            builder = builder.proxy(reqwest::Proxy::all(proxy)?);
        }

        Ok(Self {
            client: builder.build()?,
            api_key: config.openai_api_key.clone(),
            model: config.openai_model.clone(),
            base_url: config.openai_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Send a conversation and get the assistant's reply. No retries.
    pub async fn chat(&self, messages: &[ChatMessage]) -> Result<LlmResponse, ClientError> {
        let body = CompletionRequest {
            model: &self.model,
            messages: messages
                .iter()
                .map(|m| CompletionMessage {
                    role: m.role.clone(),
                    content: m.content.clone(),
                })
                .collect(),
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        let resp = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(status, "Completion API error: {}", body);
            return Err(ClientError::Status { status, body });
        }

        let completion: CompletionResponse = resp.json().await?;

        if let Some(usage) = &completion.usage {
            tracing::debug!(
                prompt = usage.prompt_tokens,
                completion = usage.completion_tokens,
                total = usage.total_tokens,
                "Completion usage"
            );
        }

        let text = completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or(ClientError::EmptyCompletion)?;

        Ok(LlmResponse {
            text,
            usage: completion.usage,
        })
    }
}

#[async_trait]
impl ContentGenerator for LlmClient {
    async fn generate(&self, topic: &str, style: &PromptTemplate) -> Result<String, ClientError> {
        let messages = [
            ChatMessage::system(style.render(topic)),
            ChatMessage::user(format!("Topic: {}", topic)),
        ];
        Ok(self.chat(&messages).await?.text)
    }

    async fn answer(&self, question: &str) -> Result<String, ClientError> {
        let messages = [
            ChatMessage::system(ASSISTANT_PROMPT),
            ChatMessage::user(question),
        ];
        Ok(self.chat(&messages).await?.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::hooks;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> LlmClient {
        let config = AppConfig {
            openai_api_key: "sk-test".to_string(),
            openai_model: "gpt-test".to_string(),
            openai_base_url: server.uri(),
            ..AppConfig::default()
        };
        LlmClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn generate_sends_templated_prompt() {
        let server = MockServer::start().await;
        let style = &hooks::catalog()[0];

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(serde_json::json!({
                "model": "gpt-test",
                "temperature": 0.7,
                "max_tokens": 1000,
                "messages": [
                    {"role": "system", "content": style.render("coffee")},
                    {"role": "user", "content": "Topic: coffee"}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"role": "assistant", "content": "  Hook one  "}}],
                "usage": {"prompt_tokens": 10, "completion_tokens": 3, "total_tokens": 13}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let text = client_for(&server).generate("coffee", style).await.unwrap();
        assert_eq!(text, "Hook one");
    }

    #[tokio::test]
    async fn rate_limit_is_a_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
            .expect(1)
            .mount(&server)
            .await;

        let err = client_for(&server).answer("hi").await.unwrap_err();
        assert!(matches!(err, ClientError::Status { status: 429, .. }));
    }

    #[tokio::test]
    async fn empty_choices_are_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"choices": []})))
            .mount(&server)
            .await;

        let err = client_for(&server).answer("hi").await.unwrap_err();
        assert!(matches!(err, ClientError::EmptyCompletion));
    }

    #[tokio::test]
    async fn malformed_body_is_a_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = client_for(&server).answer("hi").await.unwrap_err();
        assert!(matches!(err, ClientError::Parse(_)));
    }
}
