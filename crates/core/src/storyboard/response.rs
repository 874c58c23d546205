use serde::Deserialize;
use serde_json::Value;

use super::template::StoryboardTemplate;
use crate::project::{Scene, SceneType};

/// Code fence delimiter the model sometimes wraps JSON in.
const FENCE: &str = "```";

/// Ways a response body can fail to become a storyboard.
#[derive(Debug, thiserror::Error)]
pub enum StoryboardParseError {
    #[error("response is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("response must be a JSON object")]
    NotAnObject,

    #[error("missing required slot '{0}'")]
    MissingSlot(String),

    #[error("slot '{slot}' is malformed: {reason}")]
    InvalidSlot { slot: String, reason: String },
}

/// One scene object as the model returns it.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawScene {
    #[serde(default)]
    title: Option<String>,
    image_prompt: String,
    video_prompt: String,
}

/// Remove a surrounding Markdown code fence, if any.
///
/// Handles an optional language tag (```` ```json ````) and a missing
/// closing fence. Unfenced input is returned trimmed.
pub fn strip_code_fence(body: &str) -> &str {
    let trimmed = body.trim();
    let Some(rest) = trimmed.strip_prefix(FENCE) else {
        return trimmed;
    };
    let rest = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric()),
    };
    let rest = rest.trim_end();
    rest.strip_suffix(FENCE).unwrap_or(rest).trim()
}

/// Turn a response body into the ordered scene list.
///
/// Fixed slots come first in template order, then each bite in the
/// order returned. A missing or blank title is replaced by the slot's
/// fallback. The bite array is taken as returned even when its length
/// differs from the requested count.
pub fn parse_storyboard(
    template: &StoryboardTemplate,
    body: &str,
) -> Result<Vec<Scene>, StoryboardParseError> {
    let value: Value = serde_json::from_str(strip_code_fence(body))?;
    let Value::Object(mut slots) = value else {
        return Err(StoryboardParseError::NotAnObject);
    };

    let mut scenes = Vec::with_capacity(template.fixed_slots.len());

    for slot in &template.fixed_slots {
        let raw = slots
            .remove(&slot.key)
            .ok_or_else(|| StoryboardParseError::MissingSlot(slot.key.clone()))?;
        let raw = decode_scene(&slot.key, raw)?;
        scenes.push(into_scene(raw, slot.scene_type, || slot.fallback_title.clone()));
    }

    let bite_key = &template.bite_slot.key;
    let bites = match slots.remove(bite_key) {
        Some(Value::Array(items)) => items,
        Some(other) => {
            return Err(StoryboardParseError::InvalidSlot {
                slot: bite_key.clone(),
                reason: format!("expected an array, got {}", json_kind(&other)),
            })
        }
        None => return Err(StoryboardParseError::MissingSlot(bite_key.clone())),
    };

    scenes.reserve(bites.len());
    for (index, item) in bites.into_iter().enumerate() {
        let raw = decode_scene(&format!("{bite_key}[{index}]"), item)?;
        scenes.push(into_scene(raw, SceneType::Bite, || {
            template.bite_slot.fallback_title(index)
        }));
    }

    // A resolved project always has at least one scene.
    if scenes.is_empty() {
        return Err(StoryboardParseError::InvalidSlot {
            slot: bite_key.clone(),
            reason: "storyboard contains no scenes".to_string(),
        });
    }

    Ok(scenes)
}

fn decode_scene(slot: &str, value: Value) -> Result<RawScene, StoryboardParseError> {
    if !value.is_object() {
        return Err(StoryboardParseError::InvalidSlot {
            slot: slot.to_string(),
            reason: format!("expected an object, got {}", json_kind(&value)),
        });
    }
    serde_json::from_value(value).map_err(|e| StoryboardParseError::InvalidSlot {
        slot: slot.to_string(),
        reason: e.to_string(),
    })
}

fn into_scene(raw: RawScene, scene_type: SceneType, fallback: impl FnOnce() -> String) -> Scene {
    let title = raw
        .title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(fallback);
    Scene {
        scene_type,
        title,
        image_prompt: raw.image_prompt,
        video_prompt: raw.video_prompt,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
