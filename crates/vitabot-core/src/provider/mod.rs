//! Model Gateway: the boundary wrapping all calls to the external
//! text-generation provider.
//!
//! One attempt per user turn, a hard timeout, response-shape validation, and a
//! typed failure taxonomy. The caller decides fallback policy; the gateway
//! never retries and never panics on a malformed success body.

mod deepseek;
mod gemini;

pub use deepseek::DeepSeekProvider;
pub use gemini::GeminiProvider;

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::config::{BotConfig, ProviderKind};
use crate::session::Turn;

/// Where a reply came from. A first-class observable: UIs may display it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplySource {
    Gemini,
    DeepSeek,
    Local,
    Demo,
}

impl ReplySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReplySource::Gemini => "gemini",
            ReplySource::DeepSeek => "deepseek",
            ReplySource::Local => "local",
            ReplySource::Demo => "demo",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("model call timed out after {0:?}")]
    Timeout(Duration),
    #[error("model API error ({status}): {body}")]
    Http { status: u16, body: String },
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    /// The provider returned 2xx but the expected field path was absent.
    #[error("malformed model response: {0}")]
    MalformedResponse(String),
}

/// Capability interface for remote text generation. Implementations are
/// selected by configuration, never by code substitution.
#[async_trait::async_trait]
pub trait ModelProvider: Send + Sync {
    /// Tag reported in replies and `/api/health`.
    fn source(&self) -> ReplySource;

    /// Model identifier, for health reporting.
    fn model(&self) -> &str;

    /// Single bounded generation attempt over role-tagged messages.
    async fn generate(
        &self,
        messages: &[Turn],
        timeout: Duration,
    ) -> Result<String, ProviderError>;
}

/// Builds the configured provider, or `None` in demo mode. Which provider
/// runs is a configuration-time choice, not a per-request one.
pub fn provider_from_config(config: &BotConfig) -> Option<Arc<dyn ModelProvider>> {
    match config.provider_kind() {
        ProviderKind::Gemini => config.gemini_api_key.clone().map(|key| {
            Arc::new(GeminiProvider::new(key, config.model_name.clone())) as Arc<dyn ModelProvider>
        }),
        ProviderKind::DeepSeek => config.deepseek_api_key.clone().map(|key| {
            Arc::new(DeepSeekProvider::new(
                key,
                config.deepseek_base_url.clone(),
                config.model_name.clone(),
            )) as Arc<dyn ModelProvider>
        }),
        ProviderKind::Demo => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reply_source_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&ReplySource::Gemini).unwrap(), "\"gemini\"");
        assert_eq!(serde_json::to_string(&ReplySource::DeepSeek).unwrap(), "\"deepseek\"");
        assert_eq!(ReplySource::Local.as_str(), "local");
        assert_eq!(ReplySource::Demo.as_str(), "demo");
    }

    #[test]
    fn test_error_display_carries_detail() {
        let err = ProviderError::Http { status: 503, body: "overloaded".into() };
        assert!(err.to_string().contains("503"));
        assert!(err.to_string().contains("overloaded"));

        let err = ProviderError::Timeout(Duration::from_secs(10));
        assert!(err.to_string().contains("timed out"));
    }
}
