//! Agent Blueprint LLM
//!
//! Backend access for the requirements conversation:
//! - The `LlmProvider` trait and an OpenAI-compatible implementation
//! - Provider configuration and per-request overrides
//! - Tolerant decoding of structured (JSON) replies
//!
//! Also includes the HTTP client factory.

pub mod http_client;
pub mod openai;
pub mod provider;
pub mod structured;
pub mod types;

// Re-export main types
pub use http_client::build_http_client;
pub use openai::OpenAIProvider;
pub use provider::LlmProvider;
pub use structured::{
    chat, chat_transcript, generate_structured, generate_text, sanitize_response,
    strip_code_fences, SanitizedResponse, RAW_OUTPUT_KEY,
};
pub use types::*;
