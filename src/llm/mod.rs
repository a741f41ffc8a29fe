pub mod provider;
pub mod anthropic;
pub mod openai;
pub mod gemini;
pub mod router;
pub mod summarizer;
pub mod types;

pub use provider::LLMProvider;
pub use router::{create_provider, provider_from_config};
pub use summarizer::Summarizer;
pub use types::LLMResponse;
