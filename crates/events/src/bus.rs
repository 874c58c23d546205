//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is the publish/subscribe hub for [`StudioEvent`]s. It is
//! shared via `Arc<EventBus>` between the orchestrator and whatever is
//! rendering the project list.

use chrono::{DateTime, Utc};
use glassybites_core::types::{BatchId, ProjectId};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// StudioEvent
// ---------------------------------------------------------------------------

/// What happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StudioEventKind {
    /// Pending projects were added to the store for a new submission.
    BatchSubmitted {
        batch_id: BatchId,
        project_ids: Vec<ProjectId>,
        bite_count: u32,
    },

    /// A project received its storyboard.
    ProjectCompleted {
        project_id: ProjectId,
        scene_count: usize,
    },

    /// A project's generation attempt failed. `error` carries the full
    /// detail that the card itself never shows.
    ProjectFailed { project_id: ProjectId, error: String },

    /// Every attempt in the batch has resolved.
    BatchSettled {
        batch_id: BatchId,
        succeeded: usize,
        failed: usize,
    },
}

/// A studio event with the time it was published.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudioEvent {
    #[serde(flatten)]
    pub kind: StudioEventKind,

    /// Publication time.
    pub timestamp: DateTime<Utc>,
}

impl StudioEvent {
    pub fn new(kind: StudioEventKind) -> Self {
        Self {
            kind,
            timestamp: Utc::now(),
        }
    }

    /// Dot-separated event name, e.g. `"project.completed"`.
    pub fn event_type(&self) -> &'static str {
        match self.kind {
            StudioEventKind::BatchSubmitted { .. } => "batch.submitted",
            StudioEventKind::ProjectCompleted { .. } => "project.completed",
            StudioEventKind::ProjectFailed { .. } => "project.failed",
            StudioEventKind::BatchSettled { .. } => "batch.settled",
        }
    }
}

impl From<StudioEventKind> for StudioEvent {
    fn from(kind: StudioEventKind) -> Self {
        Self::new(kind)
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Events buffered per receiver by [`EventBus::default`].
const DEFAULT_CAPACITY: usize = 256;

/// Broadcasts [`StudioEvent`]s to any number of observers.
///
/// # Usage
///
/// ```rust
/// use glassybites_events::{EventBus, StudioEventKind};
/// use glassybites_core::types::ProjectId;
///
/// let bus = EventBus::default();
/// let _rx = bus.subscribe();
///
/// bus.publish(StudioEventKind::ProjectCompleted {
///     project_id: ProjectId::new(),
///     scene_count: 6,
/// });
/// ```
pub struct EventBus {
    sender: broadcast::Sender<StudioEvent>,
}

impl EventBus {
    /// Bus holding up to `capacity` undelivered events per receiver.
    ///
    /// A receiver that falls further behind gets `RecvError::Lagged` and
    /// skips ahead.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Send `event` to every live receiver. Dropped when nobody listens.
    pub fn publish(&self, event: impl Into<StudioEvent>) {
        // A SendError only means there are zero receivers.
        let _ = self.sender.send(event.into());
    }

    /// Receive every event published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<StudioEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
