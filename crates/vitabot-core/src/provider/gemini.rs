//! Google Gemini provider: `generateContent` over the REST API.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{ModelProvider, ProviderError, ReplySource};
use crate::session::{Role, Turn};

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-2.0-flash";

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
    top_p: f32,
    stop_sequences: Vec<String>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_output_tokens: 2000,
            top_p: 0.9,
            stop_sequences: vec!["Пользователь:".to_string(), "User:".to_string()],
        }
    }
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

pub struct GeminiProvider {
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl GeminiProvider {
    pub fn new(api_key: String, model: Option<String>) -> Self {
        Self {
            api_key: api_key.trim().to_string(),
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            client: reqwest::Client::new(),
        }
    }

    /// Gemini names the assistant role "model"; other roles pass through.
    fn to_contents(messages: &[Turn]) -> Vec<Content> {
        messages
            .iter()
            .map(|m| Content {
                role: match m.role {
                    Role::Assistant => "model".to_string(),
                    other => other.as_str().to_string(),
                },
                parts: vec![Part { text: m.content.clone() }],
            })
            .collect()
    }

    async fn call(&self, messages: &[Turn]) -> Result<String, ProviderError> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            API_BASE, self.model, self.api_key
        );
        let body = GenerateRequest {
            contents: Self::to_contents(messages),
            generation_config: GenerationConfig::default(),
        };

        tracing::debug!(target: "vitabot::provider", model = %self.model, "calling gemini");
        let response = self.client.post(&url).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(
                target: "vitabot::provider",
                status = status.as_u16(),
                "gemini returned an error status"
            );
            return Err(ProviderError::Http { status: status.as_u16(), body });
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;

        let text = parsed
            .candidates
            .first()
            .map(|c| {
                c.content
                    .parts
                    .iter()
                    .map(|p| p.text.as_str())
                    .collect::<String>()
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(ProviderError::MalformedResponse(
                "candidates[0].content.parts[].text is absent or empty".to_string(),
            ));
        }
        Ok(text.trim().to_string())
    }
}

#[async_trait::async_trait]
impl ModelProvider for GeminiProvider {
    fn source(&self) -> ReplySource {
        ReplySource::Gemini
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
                tracing::warn!(target: "vitabot::provider", ?timeout, "gemini call timed out");
                Err(ProviderError::Timeout(timeout))
            }
        }
    }
}
