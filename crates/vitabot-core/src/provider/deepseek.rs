//! DeepSeek provider: OpenAI-compatible `/chat/completions`.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{ModelProvider, ProviderError, ReplySource};
use crate::session::Turn;

const DEFAULT_MODEL: &str = "deepseek-chat";

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Deserialize)]
struct ChatMessageResponse {
    content: String,
}

pub struct DeepSeekProvider {
    api_key: String,
    base_url: String,
    model: String,
    client: reqwest::Client,
}

impl DeepSeekProvider {
    pub fn new(api_key: String, base_url: String, model: Option<String>) -> Self {
        Self {
            api_key: api_key.trim().to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            client: reqwest::Client::new(),
        }
    }

    async fn call(&self, messages: &[Turn]) -> Result<String, ProviderError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = ChatRequest {
            model: &self.model,
            messages: messages
                .iter()
                .map(|m| ChatMessage { role: m.role.as_str(), content: &m.content })
                .collect(),
            temperature: 0.7,
        };

        tracing::debug!(target: "vitabot::provider", model = %self.model, "calling deepseek");
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(
                target: "vitabot::provider",
                status = status.as_u16(),
                "deepseek returned an error status"
            );
            return Err(ProviderError::Http { status: status.as_u16(), body });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;

        match parsed.choices.first() {
            Some(choice) if !choice.message.content.trim().is_empty() => {
                Ok(choice.message.content.trim().to_string())
            }
            _ => Err(ProviderError::MalformedResponse(
                "choices[0].message.content is absent or empty".to_string(),
            )),
        }
    }
}

#[async_trait::async_trait]
impl ModelProvider for DeepSeekProvider {
    fn source(&self) -> ReplySource {
        ReplySource::DeepSeek
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(
        &self,
        messages: &[Turn],
        timeout: Duration,
    ) -> Result<String, ProviderError> {
        match tokio::time::timeout(timeout, self.call(messages)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(target: "vitabot::provider", ?timeout, "deepseek call timed out");
                Err(ProviderError::Timeout(timeout))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_normalized() {
        let provider =
            DeepSeekProvider::new("sk-test".into(), "https://api.deepseek.com/".into(), None);
        assert_eq!(provider.base_url, "https://api.deepseek.com");
        assert_eq!(provider.model(), DEFAULT_MODEL);
    }

    #[test]
    fn test_model_override() {
        let provider = DeepSeekProvider::new(
            "sk-test".into(),
            "https://api.deepseek.com".into(),
            Some("deepseek-reasoner".into()),
        );
        assert_eq!(provider.model(), "deepseek-reasoner");
    }
}
