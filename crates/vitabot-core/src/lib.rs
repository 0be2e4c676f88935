//! vitabot-core: support-chatbot core library.
//!
//! Session store, canned-response fallback engine, prompt builder, and the model
//! provider gateway (Gemini / DeepSeek behind one trait). The gateway add-on keeps
//! a consistent public API through these re-exports.

mod canned;
mod chunk;
mod config;
mod lead;
mod prompt;
mod session;
pub mod provider;

pub use canned::{canned_reply, follow_up_suggestions, SUGGESTED_QUESTIONS};
pub use chunk::split_chunks;
pub use config::{BotConfig, ProviderKind, SmtpConfig};
pub use lead::{Lead, LeadMailer};
pub use prompt::{system_prompt_for, PromptBuilder};
pub use provider::{provider_from_config, ModelProvider, ProviderError, ReplySource};
pub use session::{new_session_id, Role, SessionStore, StoreStats, Turn};
