//! Project store, prompt gateway and batch orchestration.
//!
//! A submission flows through three pieces:
//!
//! 1. [`ProjectStore::create_pending`] adds one pending project per food name.
//! 2. [`BatchOrchestrator`] spawns one task per project, each calling the
//!    [`PromptGateway`].
//! 3. Tasks post their outcome back over a channel; the orchestrator, as the
//!    store's only owner, applies each one to its project.

pub mod gateway;
pub mod orchestrator;
pub mod store;

pub use gateway::{GatewayError, PromptGateway};
pub use orchestrator::{BatchOrchestrator, BatchSummary, PipelineError};
pub use store::ProjectStore;
