//! Food projects and the storyboard scenes they own.

use serde::{Deserialize, Serialize};

use crate::types::ProjectId;

/// Title of the sentinel scene attached to a project whose generation failed.
pub const GENERATION_FAILED_TITLE: &str = "Generation Failed";

/// Text shown in place of the image prompt on a failed project.
pub const GENERATION_FAILED_IMAGE_TEXT: &str = "Error generating prompts.";

/// Text shown in place of the video prompt on a failed project.
pub const GENERATION_FAILED_VIDEO_TEXT: &str = "Please try again.";

/// Storyboard beat kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SceneType {
    Hook,
    Outfit,
    Pool,
    Pickup,
    Bite,
}

impl SceneType {
    /// Upper-case tag as shown on cards and in exported JSON.
    pub fn as_str(self) -> &'static str {
        match self {
            SceneType::Hook => "HOOK",
            SceneType::Outfit => "OUTFIT",
            SceneType::Pool => "POOL",
            SceneType::Pickup => "PICKUP",
            SceneType::Bite => "BITE",
        }
    }
}

impl std::fmt::Display for SceneType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One storyboard beat with its paired image and video prompts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    #[serde(rename = "type")]
    pub scene_type: SceneType,
    pub title: String,
    pub image_prompt: String,
    pub video_prompt: String,
}

impl Scene {
    /// The placeholder scene a project receives when its generation attempt fails.
    pub fn generation_failed() -> Self {
        Self {
            scene_type: SceneType::Pool,
            title: GENERATION_FAILED_TITLE.to_string(),
            image_prompt: GENERATION_FAILED_IMAGE_TEXT.to_string(),
            video_prompt: GENERATION_FAILED_VIDEO_TEXT.to_string(),
        }
    }
}

/// One submitted food name and its generation status/result.
///
/// `scenes` stays empty while `is_generating_text` is true; once the
/// attempt resolves the whole sequence is replaced in one step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodProject {
    pub id: ProjectId,
    pub food_name: String,
    pub scenes: Vec<Scene>,
    pub is_generating_text: bool,
}

impl FoodProject {
    /// A fresh project awaiting its generation attempt.
    pub fn pending(food_name: impl Into<String>) -> Self {
        Self {
            id: ProjectId::new(),
            food_name: food_name.into(),
            scenes: Vec::new(),
            is_generating_text: true,
        }
    }

    /// Whether the project resolved to the failure sentinel.
    pub fn is_failed(&self) -> bool {
        !self.is_generating_text
            && self.scenes.len() == 1
            && self.scenes[0] == Scene::generation_failed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_project_has_no_scenes() {
        let project = FoodProject::pending("Glass Strawberry");
        assert_eq!(project.food_name, "Glass Strawberry");
        assert!(project.scenes.is_empty());
        assert!(project.is_generating_text);
        assert!(!project.is_failed());
    }

    #[test]
    fn failure_sentinel_is_pool_scene() {
        let scene = Scene::generation_failed();
        assert_eq!(scene.scene_type, SceneType::Pool);
        assert_eq!(scene.title, GENERATION_FAILED_TITLE);
    }

    #[test]
    fn scene_serializes_with_camel_case_and_type_tag() {
        let scene = Scene {
            scene_type: SceneType::Bite,
            title: "Bite Angle 1".into(),
            image_prompt: "A hyper-realistic photo of...".into(),
            video_prompt: "Cinematic video of...".into(),
        };
        let json = serde_json::to_value(&scene).unwrap();
        assert_eq!(json["type"], "BITE");
        assert_eq!(json["imagePrompt"], "A hyper-realistic photo of...");
        assert_eq!(json["videoPrompt"], "Cinematic video of...");
    }

    #[test]
    fn scene_type_display_matches_serde_tag() {
        for ty in [
            SceneType::Hook,
            SceneType::Outfit,
            SceneType::Pool,
            SceneType::Pickup,
            SceneType::Bite,
        ] {
            let json = serde_json::to_value(ty).unwrap();
            assert_eq!(json, ty.to_string());
        }
    }
}
