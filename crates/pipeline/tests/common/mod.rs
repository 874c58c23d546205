//! Shared fixtures for pipeline integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use glassybites_core::storyboard::StoryboardTemplate;
use glassybites_core::types::Credential;
use glassybites_events::EventBus;
use glassybites_gemini::{GeminiApiError, GenerationRequest, GenerationResponse, TextGenerator};
use glassybites_pipeline::{BatchOrchestrator, PromptGateway};
use serde_json::json;
use tokio::sync::Semaphore;

/// How the scripted service answers for one food.
#[derive(Clone)]
pub enum Reply {
    /// A valid storyboard after the given delay.
    Storyboard { delay: Duration },
    /// The storyboard wrapped in a Markdown code fence.
    FencedStoryboard,
    /// A transport-level failure.
    Transport,
    /// A response with no text.
    Empty,
    /// Text that is not JSON.
    Garbage,
    /// The task panics mid-call.
    Panic,
}

/// A [`TextGenerator`] that answers per food name from a script.
///
/// Foods not in the script get a storyboard immediately. When a gate is
/// set, every call waits for one permit before answering.
pub struct ScriptedGenerator {
    replies: HashMap<String, Reply>,
    gate: Option<Arc<Semaphore>>,
    calls: AtomicUsize,
}

impl ScriptedGenerator {
    pub fn new() -> Self {
        Self {
            replies: HashMap::new(),
            gate: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn reply(mut self, food_name: &str, reply: Reply) -> Self {
        self.replies.insert(food_name.to_string(), reply);
        self
    }

    pub fn gated(mut self, gate: Arc<Semaphore>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn reply_for(&self, request: &GenerationRequest) -> Reply {
        self.replies
            .iter()
            .find(|(name, _)| request.user_content.contains(&format!("\"{name}\"")))
            .map(|(_, reply)| reply.clone())
            .unwrap_or(Reply::Storyboard {
                delay: Duration::ZERO,
            })
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(
        &self,
        _credential: &Credential,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse, GeminiApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            let _permit = gate.acquire().await.expect("gate closed");
        }

        let bite_count = request.response_schema["properties"]["bites"]["maxItems"]
            .as_u64()
            .expect("schema declares bite count") as usize;

        match self.reply_for(request) {
            Reply::Storyboard { delay } => {
                tokio::time::sleep(delay).await;
                Ok(text(storyboard_json(bite_count)))
            }
            Reply::FencedStoryboard => Ok(text(format!(
                "```json\n{}\n```",
                storyboard_json(bite_count)
            ))),
            Reply::Transport => Err(GeminiApiError::ApiError {
                status: 503,
                body: "service unavailable".to_string(),
            }),
            Reply::Empty => Ok(GenerationResponse { text: None }),
            Reply::Garbage => Ok(text("I cannot help with that.".to_string())),
            Reply::Panic => panic!("scripted generator panic"),
        }
    }
}

fn text(body: String) -> GenerationResponse {
    GenerationResponse { text: Some(body) }
}

/// A storyboard for the default template with `bites` bite scenes.
pub fn storyboard_json(bites: usize) -> String {
    let scene = |title: &str| {
        json!({
            "title": title,
            "imagePrompt": "A hyper-realistic photo of a jumbo glass treat",
            "videoPrompt": "Cinematic video of the glass shattering",
        })
    };
    let bites: Vec<_> = (0..bites).map(|_| scene("")).collect();
    json!({
        "hook": scene("First Crack"),
        "outfit": scene("Matching Couture"),
        "pool": scene("Glass Pool Dive"),
        "bites": bites,
    })
    .to_string()
}

pub fn credential() -> Credential {
    Credential::new("test-api-key").expect("valid credential")
}

pub fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

/// Build an orchestrator around the given generator and a fresh bus.
pub fn orchestrator(generator: Arc<ScriptedGenerator>) -> BatchOrchestrator {
    let gateway = PromptGateway::new(generator, StoryboardTemplate::default(), "gemini-2.5-flash");
    BatchOrchestrator::new(Arc::new(gateway), Arc::new(EventBus::default()))
}
