//! Runtime configuration loaded from `.env` / environment.
//!
//! | Env | Default | Description |
//! |-----|---------|-------------|
//! | PORT | 8080 | HTTP listen port. |
//! | GEMINI_API_KEY | — | Google Gemini key; presence selects the Gemini provider. |
//! | DEEPSEEK_API_KEY | — | DeepSeek key; selected when no Gemini key is set. |
//! | DEEPSEEK_BASE_URL | https://api.deepseek.com | OpenAI-compatible API base. |
//! | MODEL_NAME | provider default | Model override for the active provider. |
//! | BOT_PROVIDER | inferred | "gemini" \| "deepseek" \| "demo" — explicit provider choice. |
//! | BOT_TIMEOUT_MS | 10000 | Hard bound on one outbound model call. |
//! | BOT_MAX_HISTORY_TURNS | 10 | History window included in prompts. |
//! | BOT_STREAM_FALLBACK | false | Streaming path degrades to canned text instead of an error event. |
//! | BOT_SESSION_TTL_MINUTES | 0 (off) | Idle session eviction; 0 reproduces the original unbounded growth. |
//! | ALLOWED_ORIGINS | empty (allow all) | Comma-separated CORS allow-list. |
//! | CLIENT_TOKEN | unset (open) | Shared secret expected in `X-Client-Token`. |
//! | LEADS_EMAIL_TO / SMTP_HOST / SMTP_USER / SMTP_PASS | unset | Lead email delivery; all-or-nothing. |

use std::time::Duration;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_MAX_HISTORY_TURNS: usize = 10;
const DEFAULT_DEEPSEEK_BASE_URL: &str = "https://api.deepseek.com";

/// Which remote provider serves chat turns; `Demo` means no remote calls at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Gemini,
    DeepSeek,
    Demo,
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub user: String,
    pub pass: String,
}

#[derive(Debug, Clone)]
pub struct BotConfig {
    pub port: u16,
    pub gemini_api_key: Option<String>,
    pub deepseek_api_key: Option<String>,
    pub deepseek_base_url: String,
    pub model_name: Option<String>,
    pub provider_override: Option<ProviderKind>,
    /// Hard bound on a single outbound model call.
    pub timeout: Duration,
    pub max_history_turns: usize,
    /// Streaming failure policy: degrade to canned text (true) or surface a
    /// terminal error event (false, observed behavior).
    pub stream_fallback: bool,
    /// Idle eviction TTL; `None` disables the sweep.
    pub session_ttl: Option<Duration>,
    pub allowed_origins: Vec<String>,
    pub client_token: Option<String>,
    pub leads_email_to: Option<String>,
    pub smtp: Option<SmtpConfig>,
}

impl BotConfig {
    /// Load from environment. Unset or invalid values fall back to defaults
    /// (see module table).
    pub fn from_env() -> Self {
        let smtp = match (env_opt_string("SMTP_HOST"), env_opt_string("SMTP_USER")) {
            (Some(host), Some(user)) => Some(SmtpConfig {
                host,
                user,
                pass: env_opt_string("SMTP_PASS").unwrap_or_default(),
            }),
            _ => None,
        };
        Self {
            port: env_u64("PORT", DEFAULT_PORT as u64) as u16,
            gemini_api_key: env_opt_string("GEMINI_API_KEY"),
            deepseek_api_key: env_opt_string("DEEPSEEK_API_KEY"),
            deepseek_base_url: env_opt_string("DEEPSEEK_BASE_URL")
                .unwrap_or_else(|| DEFAULT_DEEPSEEK_BASE_URL.to_string()),
            model_name: env_opt_string("MODEL_NAME"),
            provider_override: env_opt_string("BOT_PROVIDER").and_then(|s| parse_provider(&s)),
            timeout: Duration::from_millis(env_u64("BOT_TIMEOUT_MS", DEFAULT_TIMEOUT_MS)),
            max_history_turns: env_u64("BOT_MAX_HISTORY_TURNS", DEFAULT_MAX_HISTORY_TURNS as u64)
                as usize,
            stream_fallback: env_bool("BOT_STREAM_FALLBACK", false),
            session_ttl: match env_u64("BOT_SESSION_TTL_MINUTES", 0) {
                0 => None,
                minutes => Some(Duration::from_secs(minutes * 60)),
            },
            allowed_origins: parse_origins(&std::env::var("ALLOWED_ORIGINS").unwrap_or_default()),
            client_token: env_opt_string("CLIENT_TOKEN"),
            leads_email_to: env_opt_string("LEADS_EMAIL_TO"),
            smtp,
        }
    }

    /// Effective provider: explicit `BOT_PROVIDER` wins, otherwise inferred
    /// from which API key is present (Gemini first, then DeepSeek).
    pub fn provider_kind(&self) -> ProviderKind {
        if let Some(kind) = self.provider_override {
            return kind;
        }
        if self.gemini_api_key.is_some() {
            ProviderKind::Gemini
        } else if self.deepseek_api_key.is_some() {
            ProviderKind::DeepSeek
        } else {
            ProviderKind::Demo
        }
    }
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            gemini_api_key: None,
            deepseek_api_key: None,
            deepseek_base_url: DEFAULT_DEEPSEEK_BASE_URL.to_string(),
            model_name: None,
            provider_override: None,
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            max_history_turns: DEFAULT_MAX_HISTORY_TURNS,
            stream_fallback: false,
            session_ttl: None,
            allowed_origins: Vec::new(),
            client_token: None,
            leads_email_to: None,
            smtp: None,
        }
    }
}

fn parse_provider(value: &str) -> Option<ProviderKind> {
    match value.trim().to_lowercase().as_str() {
        "gemini" => Some(ProviderKind::Gemini),
        "deepseek" => Some(ProviderKind::DeepSeek),
        "demo" => Some(ProviderKind::Demo),
        _ => None,
    }
}

/// Comma-separated origin list; empty entries are dropped. An empty result
/// means "allow all origins".
pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn env_bool(name: &str, default: bool) -> bool {
    match std::env::var(name) {
        Ok(v) => v.trim().eq_ignore_ascii_case("true") || (v.trim().is_empty() && default),
        Err(_) => default,
    }
}

fn env_u64(name: &str, default: u64) -> u64 {
    match std::env::var(name) {
        Ok(v) => v.trim().parse().unwrap_or(default),
        Err(_) => default,
    }
}

fn env_opt_string(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_origins_trims_and_drops_empty() {
        assert_eq!(
            parse_origins("https://a.example, https://b.example ,,"),
            vec!["https://a.example".to_string(), "https://b.example".to_string()]
        );
        assert!(parse_origins("").is_empty());
        assert!(parse_origins("  ").is_empty());
    }

    #[test]
    fn test_parse_provider_values() {
        assert_eq!(parse_provider("gemini"), Some(ProviderKind::Gemini));
        assert_eq!(parse_provider(" DeepSeek "), Some(ProviderKind::DeepSeek));
        assert_eq!(parse_provider("demo"), Some(ProviderKind::Demo));
        assert_eq!(parse_provider("openai"), None);
    }

    #[test]
    fn test_provider_kind_inference() {
        let mut config = BotConfig::default();
        assert_eq!(config.provider_kind(), ProviderKind::Demo);

        config.deepseek_api_key = Some("sk-test".into());
        assert_eq!(config.provider_kind(), ProviderKind::DeepSeek);

        config.gemini_api_key = Some("key".into());
        assert_eq!(config.provider_kind(), ProviderKind::Gemini);

        config.provider_override = Some(ProviderKind::Demo);
        assert_eq!(config.provider_kind(), ProviderKind::Demo);
    }
}
