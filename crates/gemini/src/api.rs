//! REST API client for the Gemini `generateContent` endpoint.
//!
//! Wraps the HTTP call using [`reqwest`] and implements
//! [`TextGenerator`] on top of it.

use async_trait::async_trait;
use glassybites_core::types::Credential;

use crate::generator::{GenerationRequest, GenerationResponse, TextGenerator};
use crate::messages::{GenerateContentRequest, GenerateContentResponse};

/// Public Gemini API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Header carrying the API key.
const API_KEY_HEADER: &str = "x-goog-api-key";

/// HTTP client for the Gemini API.
#[derive(Clone)]
pub struct GeminiApi {
    client: reqwest::Client,
    base_url: String,
}

/// Errors from the Gemini REST API layer.
#[derive(Debug, thiserror::Error)]
pub enum GeminiApiError {
    /// Connection, TLS or body decoding failure.
    #[error("Gemini request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Gemini returned a non-2xx status code.
    #[error("Gemini API error ({status}): {body}")]
    ApiError {
        status: u16,
        /// Error payload as returned, usually JSON with a `message`.
        body: String,
    },

    /// The prompt was rejected by the provider's content filter.
    #[error("Prompt blocked by provider: {reason}")]
    Blocked { reason: String },
}

impl GeminiApi {
    /// Create a new API client.
    ///
    /// * `base_url` - e.g. [`DEFAULT_BASE_URL`]; a trailing slash is ignored.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Create an API client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Call `POST /v1beta/models/{model}:generateContent`.
    pub async fn generate_content(
        &self,
        credential: &Credential,
        model: &str,
        body: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, GeminiApiError> {
        let response = self
            .client
            .post(format!(
                "{}/v1beta/models/{model}:generateContent",
                self.base_url
            ))
            .header(API_KEY_HEADER, credential.expose())
            .json(body)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Map a non-2xx response to [`GeminiApiError::ApiError`].
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, GeminiApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(GeminiApiError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Check the status, then decode the JSON body.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, GeminiApiError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl TextGenerator for GeminiApi {
    async fn generate(
        &self,
        credential: &Credential,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse, GeminiApiError> {
        let body = GenerateContentRequest::from(request);
        let response = self
            .generate_content(credential, &request.model, &body)
            .await?;

        if let Some(text) = response.text() {
            tracing::debug!(model = %request.model, bytes = text.len(), "Gemini returned text");
            return Ok(GenerationResponse { text: Some(text) });
        }
        if let Some(reason) = response.block_reason() {
            return Err(GeminiApiError::Blocked {
                reason: reason.to_string(),
            });
        }

        tracing::warn!(
            model = %request.model,
            finish_reason = ?response.candidates.first().and_then(|c| c.finish_reason.as_deref()),
            "Gemini returned no text",
        );
        Ok(GenerationResponse { text: None })
    }
}
