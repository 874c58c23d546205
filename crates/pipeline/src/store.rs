//! In-memory, ordered collection of food projects.

use glassybites_core::project::{FoodProject, Scene};
use glassybites_core::types::ProjectId;
use tokio::sync::watch;

/// Authoritative list of projects, most recent submission first.
///
/// Every mutation is keyed by a single project id and touches only that
/// project, so completions for different projects commute. Each mutation
/// publishes the full list to receivers from [`subscribe`](Self::subscribe).
#[derive(Debug)]
pub struct ProjectStore {
    projects: Vec<FoodProject>,
    snapshots: watch::Sender<Vec<FoodProject>>,
}

impl ProjectStore {
    pub fn new() -> Self {
        let (snapshots, _) = watch::channel(Vec::new());
        Self {
            projects: Vec::new(),
            snapshots,
        }
    }

    /// Watch the project list. The receiver always holds the latest state.
    pub fn subscribe(&self) -> watch::Receiver<Vec<FoodProject>> {
        self.snapshots.subscribe()
    }

    /// Allocate one pending project per name and put them in front of the
    /// existing ones. Input order is kept among the new projects.
    pub fn create_pending(&mut self, food_names: &[String]) -> Vec<FoodProject> {
        let created: Vec<FoodProject> = food_names.iter().map(FoodProject::pending).collect();
        self.projects.splice(0..0, created.iter().cloned());
        self.publish();
        created
    }

    /// Replace the project's scenes with a generated storyboard.
    ///
    /// Returns `false` (and changes nothing) when the id is unknown.
    pub fn apply_success(&mut self, id: ProjectId, scenes: Vec<Scene>) -> bool {
        self.resolve(id, scenes)
    }

    /// Replace the project's scenes with the single failure placeholder.
    ///
    /// Returns `false` (and changes nothing) when the id is unknown.
    pub fn apply_failure(&mut self, id: ProjectId, placeholder: Scene) -> bool {
        self.resolve(id, vec![placeholder])
    }

    pub fn projects(&self) -> &[FoodProject] {
        &self.projects
    }

    pub fn get(&self, id: ProjectId) -> Option<&FoodProject> {
        self.projects.iter().find(|p| p.id == id)
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    /// Whether any project is still waiting for its generation attempt.
    pub fn is_generating(&self) -> bool {
        self.projects.iter().any(|p| p.is_generating_text)
    }

    fn resolve(&mut self, id: ProjectId, scenes: Vec<Scene>) -> bool {
        match self.projects.iter_mut().find(|p| p.id == id) {
            Some(project) => {
                project.scenes = scenes;
                project.is_generating_text = false;
                self.publish();
                true
            }
            None => {
                tracing::warn!(project_id = %id, "Ignoring update for unknown project");
                false
            }
        }
    }

    fn publish(&self) {
        self.snapshots.send_replace(self.projects.clone());
    }
}

impl Default for ProjectStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Clones the projects; the copy gets its own snapshot channel.
impl Clone for ProjectStore {
    fn clone(&self) -> Self {
        let mut store = Self::new();
        store.projects = self.projects.clone();
        store.publish();
        store
    }
}

#[cfg(test)]
mod tests {
    use glassybites_core::project::SceneType;

    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn scene(title: &str) -> Scene {
        Scene {
            scene_type: SceneType::Outfit,
            title: title.to_string(),
            image_prompt: "image".to_string(),
            video_prompt: "video".to_string(),
        }
    }

    #[test]
    fn create_pending_returns_one_project_per_name_in_order() {
        let mut store = ProjectStore::new();
        let created = store.create_pending(&names(&["Glass Strawberry", "Crystal Burger"]));

        assert_eq!(created.len(), 2);
        assert_eq!(created[0].food_name, "Glass Strawberry");
        assert_eq!(created[1].food_name, "Crystal Burger");
        assert!(created.iter().all(|p| p.is_generating_text && p.scenes.is_empty()));
        assert_eq!(store.projects(), created.as_slice());
        assert!(store.is_generating());
    }

    #[test]
    fn duplicate_names_get_distinct_ids() {
        let mut store = ProjectStore::new();
        let created = store.create_pending(&names(&["Glass Pear", "Glass Pear"]));
        assert_ne!(created[0].id, created[1].id);
    }

    #[test]
    fn newer_batches_are_prepended() {
        let mut store = ProjectStore::new();
        store.create_pending(&names(&["Old A", "Old B"]));
        store.create_pending(&names(&["New A", "New B"]));

        let order: Vec<_> = store.projects().iter().map(|p| p.food_name.as_str()).collect();
        assert_eq!(order, vec!["New A", "New B", "Old A", "Old B"]);
    }

    #[test]
    fn apply_success_touches_only_target_project() {
        let mut store = ProjectStore::new();
        let created = store.create_pending(&names(&["A", "B"]));

        assert!(store.apply_success(created[0].id, vec![scene("one"), scene("two")]));

        let a = store.get(created[0].id).unwrap();
        assert_eq!(a.scenes.len(), 2);
        assert!(!a.is_generating_text);
        let b = store.get(created[1].id).unwrap();
        assert!(b.scenes.is_empty());
        assert!(b.is_generating_text);
    }

    #[test]
    fn failure_after_success_wins() {
        let mut store = ProjectStore::new();
        let id = store.create_pending(&names(&["A"]))[0].id;

        store.apply_success(id, vec![scene("one")]);
        store.apply_failure(id, Scene::generation_failed());

        let project = store.get(id).unwrap();
        assert_eq!(project.scenes, vec![Scene::generation_failed()]);
        assert!(project.is_failed());
    }

    #[test]
    fn completions_for_different_projects_commute() {
        let mut first = ProjectStore::new();
        let created = first.create_pending(&names(&["A", "B"]));
        let mut second = first.clone();

        first.apply_success(created[0].id, vec![scene("a")]);
        first.apply_failure(created[1].id, Scene::generation_failed());

        second.apply_failure(created[1].id, Scene::generation_failed());
        second.apply_success(created[0].id, vec![scene("a")]);

        assert_eq!(first.projects(), second.projects());
        assert!(!first.is_generating());
    }

    #[test]
    fn subscribers_see_every_mutation() {
        let mut store = ProjectStore::new();
        let rx = store.subscribe();
        assert!(rx.borrow().is_empty());

        let id = store.create_pending(&names(&["A"]))[0].id;
        assert!(rx.borrow()[0].is_generating_text);

        store.apply_success(id, vec![scene("a")]);
        assert!(!rx.borrow()[0].is_generating_text);
        assert_eq!(rx.borrow()[0].scenes.len(), 1);
    }

    #[test]
    fn unknown_id_is_a_no_op() {
        let mut store = ProjectStore::new();
        store.create_pending(&names(&["A"]));
        let before = store.projects().to_vec();

        assert!(!store.apply_success(ProjectId::new(), vec![scene("x")]));
        assert!(!store.apply_failure(ProjectId::new(), Scene::generation_failed()));
        assert_eq!(store.projects(), before.as_slice());
    }
}
