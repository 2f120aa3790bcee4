//! genelinker-llm — chat-completion backends, the research assistant built
//! on them, and the canned fallbacks used whenever a provider call fails.

pub mod backend;
pub mod prompts;
pub mod assistant;
pub mod fallback;
pub mod audit;
#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

pub use assistant::ResearchAssistant;
pub use backend::{LlmBackend, LlmError, LlmRequest, LlmResponse, Message, OpenAiCompatibleBackend};
