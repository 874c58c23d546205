//! Batch orchestration: fan out one generation task per project and
//! apply their outcomes to the store as they arrive.
//!
//! Tasks never touch the [`ProjectStore`]. Each posts a [`Completion`]
//! keyed by project id over an `mpsc` channel, and the orchestrator,
//! holding the only `&mut` to the store, applies them one at a time.

use std::collections::HashSet;
use std::sync::Arc;

use glassybites_core::error::CoreError;
use glassybites_core::food_list::{validate_bite_count, validate_food_name};
use glassybites_core::project::Scene;
use glassybites_core::types::{BatchId, Credential, ProjectId};
use glassybites_events::{EventBus, StudioEventKind};
use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::gateway::{GatewayError, PromptGateway};
use crate::store::ProjectStore;

/// Errors that stop a batch before any project is created.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// No credential is configured; the user must supply one first.
    #[error("No API key configured")]
    MissingCredential,

    /// The submission contained no food names.
    #[error("No food names submitted")]
    EmptyBatch,

    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Outcome of a fully settled batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    pub batch_id: BatchId,
    /// Projects created for this batch, in submission order.
    pub project_ids: Vec<ProjectId>,
    pub succeeded: usize,
    pub failed: usize,
}

/// Message a generation task posts when it resolves.
struct Completion {
    project_id: ProjectId,
    outcome: Result<Vec<Scene>, GatewayError>,
}

/// Runs submissions against a shared [`PromptGateway`].
pub struct BatchOrchestrator {
    gateway: Arc<PromptGateway>,
    event_bus: Arc<EventBus>,
}

impl BatchOrchestrator {
    pub fn new(gateway: Arc<PromptGateway>, event_bus: Arc<EventBus>) -> Self {
        Self { gateway, event_bus }
    }

    pub fn event_bus(&self) -> &Arc<EventBus> {
        &self.event_bus
    }

    /// Submit a batch and wait until every project in it has resolved.
    ///
    /// Without a credential nothing is created and
    /// [`PipelineError::MissingCredential`] is returned. Otherwise the
    /// pending projects are in the store (and announced on the bus)
    /// before any task starts. A failed project ends with the single
    /// failure scene; it never affects the others.
    pub async fn run_batch(
        &self,
        store: &mut ProjectStore,
        food_names: Vec<String>,
        bite_count: u32,
        credential: Option<Credential>,
    ) -> Result<BatchSummary, PipelineError> {
        let Some(credential) = credential else {
            tracing::warn!("Batch rejected: no API key configured");
            return Err(PipelineError::MissingCredential);
        };
        if food_names.is_empty() {
            return Err(PipelineError::EmptyBatch);
        }
        validate_bite_count(bite_count)?;
        for name in &food_names {
            validate_food_name(name)?;
        }

        let batch_id = BatchId::new();
        let created = store.create_pending(&food_names);
        let project_ids: Vec<ProjectId> = created.iter().map(|p| p.id).collect();

        tracing::info!(
            %batch_id,
            project_count = project_ids.len(),
            bite_count,
            "Batch submitted",
        );
        self.event_bus.publish(StudioEventKind::BatchSubmitted {
            batch_id,
            project_ids: project_ids.clone(),
            bite_count,
        });

        let (tx, mut rx) = mpsc::channel::<Completion>(created.len());
        let mut tasks = JoinSet::new();

        for project in created {
            let gateway = Arc::clone(&self.gateway);
            let credential = credential.clone();
            let tx = tx.clone();
            tasks.spawn(async move {
                let outcome = gateway
                    .generate(&project.food_name, bite_count, Some(&credential))
                    .await;
                // The receiver lives until every sender is gone.
                let _ = tx
                    .send(Completion {
                        project_id: project.id,
                        outcome,
                    })
                    .await;
            });
        }
        drop(tx);

        let mut unresolved: HashSet<ProjectId> = project_ids.iter().copied().collect();
        let mut succeeded = 0;
        let mut failed = 0;

        while let Some(completion) = rx.recv().await {
            unresolved.remove(&completion.project_id);
            match completion.outcome {
                Ok(scenes) => {
                    self.apply_success(store, completion.project_id, scenes);
                    succeeded += 1;
                }
                Err(err) => {
                    self.apply_failure(store, completion.project_id, &err.to_string());
                    failed += 1;
                }
            }
        }

        // Every sender is dropped, so all tasks have finished or died.
        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                tracing::error!(%batch_id, error = %e, "Generation task did not complete");
            }
        }
        for project_id in unresolved {
            self.apply_failure(store, project_id, "generation task aborted");
            failed += 1;
        }

        tracing::info!(%batch_id, succeeded, failed, "Batch settled");
        self.event_bus.publish(StudioEventKind::BatchSettled {
            batch_id,
            succeeded,
            failed,
        });

        Ok(BatchSummary {
            batch_id,
            project_ids,
            succeeded,
            failed,
        })
    }

    fn apply_success(&self, store: &mut ProjectStore, project_id: ProjectId, scenes: Vec<Scene>) {
        let scene_count = scenes.len();
        store.apply_success(project_id, scenes);
        tracing::info!(%project_id, scene_count, "Storyboard generated");
        self.event_bus.publish(StudioEventKind::ProjectCompleted {
            project_id,
            scene_count,
        });
    }

    fn apply_failure(&self, store: &mut ProjectStore, project_id: ProjectId, error: &str) {
        store.apply_failure(project_id, Scene::generation_failed());
        tracing::warn!(%project_id, error, "Storyboard generation failed");
        self.event_bus.publish(StudioEventKind::ProjectFailed {
            project_id,
            error: error.to_string(),
        });
    }
}
