//! Service-neutral request/response contract for structured text generation.

use async_trait::async_trait;
use glassybites_core::types::Credential;
use serde::{Deserialize, Serialize};

use crate::api::GeminiApiError;

/// Harm categories relaxed by [`SafetySetting::permissive`].
const PERMISSIVE_CATEGORIES: &[&str] = &[
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
];

/// One content-safety threshold override.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetySetting {
    pub category: String,
    pub threshold: String,
}

impl SafetySetting {
    /// `BLOCK_NONE` for every adjustable category.
    ///
    /// Shattering-glass food themes trip the dangerous-content filter at
    /// the default thresholds.
    pub fn permissive() -> Vec<Self> {
        PERMISSIVE_CATEGORIES
            .iter()
            .map(|category| Self {
                category: (*category).to_string(),
                threshold: "BLOCK_NONE".to_string(),
            })
            .collect()
    }
}

/// Everything the remote model needs for one constrained-JSON generation.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub model: String,
    pub system_instruction: String,
    pub user_content: String,
    /// Schema the JSON response must conform to.
    pub response_schema: serde_json::Value,
    pub safety_settings: Vec<SafetySetting>,
}

/// Raw generation output. `text` is `None` when the service returned no body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationResponse {
    pub text: Option<String>,
}

/// A remote service that turns a [`GenerationRequest`] into text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(
        &self,
        credential: &Credential,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse, GeminiApiError>;
}
