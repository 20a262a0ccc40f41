//! OpenAI-compatible chat client with caching, rate limiting, and answer assembly.

pub mod assistant;
pub mod cache;
pub mod error;
#[cfg(feature = "mock")]
pub mod mock;
pub mod openai;
pub mod provider;
pub mod rate;

pub use assistant::{Assistant, UsageEvent, UsageRecorder};
pub use cache::ResponseCache;
pub use error::LlmError;
pub use openai::OpenAiProvider;
pub use provider::{ChatOutcome, ChatProvider, Message, Role};
pub use rate::RateGate;
