//! Gemini `generateContent` REST client.
//!
//! Provides typed wire messages, a [`reqwest`]-based HTTP client, and the
//! [`TextGenerator`](generator::TextGenerator) trait that the prompt
//! gateway depends on so tests can swap the remote service out.

pub mod api;
pub mod generator;
pub mod messages;

pub use api::{GeminiApi, GeminiApiError, DEFAULT_BASE_URL, DEFAULT_MODEL};
pub use generator::{GenerationRequest, GenerationResponse, SafetySetting, TextGenerator};
