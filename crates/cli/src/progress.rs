//! Live batch progress on stderr, driven by the studio event bus.

use std::collections::HashMap;
use std::io::Write;

use glassybites_core::types::ProjectId;
use glassybites_events::{StudioEvent, StudioEventKind};
use tokio::sync::broadcast::{self, error::RecvError};

/// Print one line per resolved project until the batch settles.
///
/// `food_names` is the submitted list; ids from `BatchSubmitted` arrive
/// in the same order.
pub async fn report_progress(
    mut events: broadcast::Receiver<StudioEvent>,
    food_names: Vec<String>,
    mut out: impl Write,
) {
    let mut names: HashMap<ProjectId, String> = HashMap::new();
    let mut total = food_names.len();
    let mut done = 0;

    loop {
        let event = match events.recv().await {
            Ok(event) => event,
            Err(RecvError::Lagged(skipped)) => {
                tracing::debug!(skipped, "Progress reporter lagged");
                continue;
            }
            Err(RecvError::Closed) => return,
        };

        tracing::debug!(event = event.event_type(), "Studio event");
        let line = match event.kind {
            StudioEventKind::BatchSubmitted { project_ids, .. } => {
                total = project_ids.len();
                names.extend(project_ids.into_iter().zip(food_names.iter().cloned()));
                format!("Generating {total} storyboard(s)...")
            }
            StudioEventKind::ProjectCompleted {
                project_id,
                scene_count,
            } => {
                done += 1;
                format!(
                    "[{done}/{total}] {} ready ({scene_count} scenes)",
                    display_name(&names, project_id)
                )
            }
            StudioEventKind::ProjectFailed { project_id, .. } => {
                done += 1;
                format!(
                    "[{done}/{total}] {} failed",
                    display_name(&names, project_id)
                )
            }
            StudioEventKind::BatchSettled { .. } => return,
        };
        let _ = writeln!(out, "{line}");
    }
}

fn display_name(names: &HashMap<ProjectId, String>, id: ProjectId) -> String {
    names.get(&id).cloned().unwrap_or_else(|| id.to_string())
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use glassybites_core::types::BatchId;
    use glassybites_events::EventBus;

    use super::*;

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().write(buf)
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn reports_each_project_and_stops_on_settle() {
        let bus = EventBus::default();
        let buf = SharedBuf::default();
        let reporter = tokio::spawn(report_progress(
            bus.subscribe(),
            vec!["Glass Pear".into(), "Glass Plum".into()],
            buf.clone(),
        ));

        let (pear, plum) = (ProjectId::new(), ProjectId::new());
        let batch_id = BatchId::new();
        bus.publish(StudioEventKind::BatchSubmitted {
            batch_id,
            project_ids: vec![pear, plum],
            bite_count: 2,
        });
        bus.publish(StudioEventKind::ProjectFailed {
            project_id: plum,
            error: "boom".into(),
        });
        bus.publish(StudioEventKind::ProjectCompleted {
            project_id: pear,
            scene_count: 5,
        });
        bus.publish(StudioEventKind::BatchSettled {
            batch_id,
            succeeded: 1,
            failed: 1,
        });

        reporter.await.unwrap();
        let text = String::from_utf8(buf.0.lock().unwrap().clone()).unwrap();
        assert_eq!(
            text,
            "Generating 2 storyboard(s)...\n\
             [1/2] Glass Plum failed\n\
             [2/2] Glass Pear ready (5 scenes)\n"
        );
    }
}
