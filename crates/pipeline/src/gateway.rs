//! Prompt generation gateway.
//!
//! Turns `(food name, bite count, credential)` into a validated scene
//! list by rendering the storyboard template, calling the remote
//! [`TextGenerator`] once, and parsing the structured response.

use std::sync::Arc;

use glassybites_core::error::CoreError;
use glassybites_core::food_list::{validate_bite_count, validate_food_name};
use glassybites_core::project::Scene;
use glassybites_core::storyboard::{parse_storyboard, StoryboardParseError, StoryboardTemplate};
use glassybites_core::types::Credential;
use glassybites_gemini::{GeminiApiError, GenerationRequest, SafetySetting, TextGenerator};

/// Errors from a single generation attempt.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// No credential was available; nothing was sent.
    #[error("No API key configured")]
    MissingCredential,

    /// The food name or bite count was rejected before sending.
    #[error(transparent)]
    InvalidInput(#[from] CoreError),

    /// The service answered but produced no text.
    #[error("Remote service returned an empty response")]
    EmptyResponse,

    /// The text was not a storyboard of the expected shape.
    #[error("Malformed storyboard response: {0}")]
    Malformed(#[from] StoryboardParseError),

    /// The remote call itself failed.
    #[error("Remote call failed: {0}")]
    Transport(#[from] GeminiApiError),
}

/// Builds generation requests from a [`StoryboardTemplate`] and parses
/// the results. Holds no mutable state; share it behind an `Arc`.
pub struct PromptGateway {
    generator: Arc<dyn TextGenerator>,
    template: StoryboardTemplate,
    model: String,
    safety_settings: Vec<SafetySetting>,
}

impl PromptGateway {
    /// Create a gateway using the permissive safety configuration.
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        template: StoryboardTemplate,
        model: impl Into<String>,
    ) -> Self {
        Self {
            generator,
            template,
            model: model.into(),
            safety_settings: SafetySetting::permissive(),
        }
    }

    /// Render the request for one food without sending it.
    pub fn build_request(&self, food_name: &str, bite_count: u32) -> GenerationRequest {
        GenerationRequest {
            model: self.model.clone(),
            system_instruction: self.template.system_instruction(food_name, bite_count),
            user_content: self.template.user_content(food_name, bite_count),
            response_schema: self.template.response_schema(bite_count),
            safety_settings: self.safety_settings.clone(),
        }
    }

    /// Generate the storyboard for one food.
    ///
    /// The credential is checked before anything else; no network call is
    /// made without one. Errors are returned as-is, never retried.
    pub async fn generate(
        &self,
        food_name: &str,
        bite_count: u32,
        credential: Option<&Credential>,
    ) -> Result<Vec<Scene>, GatewayError> {
        let credential = credential.ok_or(GatewayError::MissingCredential)?;
        validate_food_name(food_name)?;
        validate_bite_count(bite_count)?;

        let request = self.build_request(food_name, bite_count);
        tracing::debug!(food_name, bite_count, model = %self.model, "Requesting storyboard");

        let response = self.generator.generate(credential, &request).await?;
        let text = response
            .text
            .filter(|t| !t.trim().is_empty())
            .ok_or(GatewayError::EmptyResponse)?;

        let scenes = parse_storyboard(&self.template, &text)?;
        tracing::debug!(food_name, scene_count = scenes.len(), "Storyboard parsed");
        Ok(scenes)
    }
}
