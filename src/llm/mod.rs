//! LLM module for soapnote
//!
//! Provider abstraction over OpenAI-compatible chat APIs (Groq, OpenAI) and Gemini,
//! plus the prompt used to turn a consultation into a structured note.

mod client;
mod gemini;
mod openai;
mod prompts;

pub use client::{build_provider, ChatMessage, ChatRole, CompletionRequest, LlmProvider};
pub use gemini::GeminiClient;
pub use openai::OpenAiCompatibleClient;
pub use prompts::{build_analysis_prompt, build_analysis_request, EXAMPLE_RECORD_JSON, SYSTEM_PROMPT};
