//! Command implementations shared by the binary and its tests.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use glassybites_core::food_list::parse_food_list;
use glassybites_core::storyboard::StoryboardTemplate;
use glassybites_core::types::Credential;
use glassybites_events::EventBus;
use glassybites_gemini::TextGenerator;
use glassybites_pipeline::{
    BatchOrchestrator, BatchSummary, PipelineError, ProjectStore, PromptGateway,
};

use crate::config::ConfigError;
use crate::credentials::{
    resolve_credential, CredentialError, CredentialSource, CredentialStore,
    FileCredentialStore, MemoryCredentialStore,
};
use crate::progress::report_progress;

/// Shown instead of running a batch when no key is configured.
pub const MISSING_KEY_MESSAGE: &str = "\
An API key is required before generating storyboards.
Save one with:    glassybites key set <KEY>
or export GEMINI_API_KEY in your environment.";

/// Everything a finished `generate` run produced.
#[derive(Debug)]
pub struct GenerateReport {
    pub store: ProjectStore,
    pub summary: BatchSummary,
}

/// Wires a generator, template and model into a ready orchestrator.
pub fn build_orchestrator(
    generator: Arc<dyn TextGenerator>,
    template: StoryboardTemplate,
    model: &str,
) -> BatchOrchestrator {
    let gateway = PromptGateway::new(generator, template, model);
    BatchOrchestrator::new(Arc::new(gateway), Arc::new(EventBus::default()))
}

/// Parse `input` as a food list and run it as one batch.
///
/// Progress lines go to `progress` while the batch runs.
pub async fn generate<W>(
    orchestrator: &BatchOrchestrator,
    input: &str,
    bite_count: u32,
    credential: Option<Credential>,
    progress: W,
) -> Result<GenerateReport, PipelineError>
where
    W: Write + Send + 'static,
{
    let food_names = parse_food_list(input);
    let mut store = ProjectStore::new();

    let reporter = tokio::spawn(report_progress(
        orchestrator.event_bus().subscribe(),
        food_names.clone(),
        progress,
    ));

    let result = orchestrator
        .run_batch(&mut store, food_names, bite_count, credential)
        .await;

    match result {
        Ok(summary) => {
            if let Err(e) = reporter.await {
                tracing::warn!(error = %e, "Progress reporter stopped early");
            }
            Ok(GenerateReport { store, summary })
        }
        Err(e) => {
            // No BatchSettled will arrive.
            reporter.abort();
            Err(e)
        }
    }
}

/// Open the saved-key store for reading.
///
/// A path that cannot be resolved means nothing has been saved, so an
/// environment key still works. Only `key set` needs a real path.
pub fn open_credential_store(path: Result<PathBuf, ConfigError>) -> Box<dyn CredentialStore> {
    match path {
        Ok(path) => Box::new(FileCredentialStore::new(path)),
        Err(e) => {
            tracing::warn!(error = %e, "No saved-key location; using environment only");
            Box::new(MemoryCredentialStore::new())
        }
    }
}

/// Save a key entered by the user.
pub fn set_key(store: &dyn CredentialStore, key: &str) -> Result<(), CredentialError> {
    let credential = Credential::new(key)?;
    store.set(&credential)
}

/// Describe which key would be used, without revealing it.
pub fn key_status(
    store: &dyn CredentialStore,
    env_key: Option<&str>,
) -> Result<String, CredentialError> {
    let status = match resolve_credential(store, env_key)? {
        Some(resolved) => match resolved.source {
            CredentialSource::Saved => {
                format!("API key configured (saved in {})", store.describe())
            }
            CredentialSource::Environment => "API key configured (from environment)".to_string(),
        },
        None => "No API key configured".to_string(),
    };
    Ok(status)
}
