use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::CoreError;
use crate::project::SceneType;

/// Regex matching `{placeholder}` tokens in brief text.
static PLACEHOLDER_RE: LazyLock<regex::Regex> =
    LazyLock::new(|| regex::Regex::new(r"\{(\w+)\}").expect("valid regex"));

/// Placeholders understood by [`StoryboardTemplate`] text fields.
pub const KNOWN_PLACEHOLDERS: &[&str] = &["brand", "food_name", "bite_count"];

// ---------------------------------------------------------------------------
// Slot specs
// ---------------------------------------------------------------------------

/// A fixed, single-scene position in the structured response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotSpec {
    /// JSON property name the model must fill, e.g. `"outfit"`.
    pub key: String,
    /// Tag given to the resulting scene.
    pub scene_type: SceneType,
    /// Section heading in the system instruction.
    pub heading: String,
    /// Creative direction for this scene. May use placeholders.
    pub direction: String,
    /// Title used when the model leaves `title` empty.
    pub fallback_title: String,
}

/// The array slot whose length is driven by the bite count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BiteSlotSpec {
    pub key: String,
    pub heading: String,
    pub direction: String,
    /// Bite `n` without a title becomes `"<fallback_label> n"` (1-indexed).
    pub fallback_label: String,
}

impl BiteSlotSpec {
    pub fn fallback_title(&self, index: usize) -> String {
        format!("{} {}", self.fallback_label, index + 1)
    }
}

// ---------------------------------------------------------------------------
// Template
// ---------------------------------------------------------------------------

/// The creative brief and slot layout sent with every generation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryboardTemplate {
    pub brand: String,
    /// Opening of the system instruction (persona, core concept).
    pub brief: String,
    /// Short restatement of the task sent as the user turn.
    pub user_content: String,
    pub fixed_slots: Vec<SlotSpec>,
    pub bite_slot: BiteSlotSpec,
    pub image_guidelines: String,
    pub video_guidelines: String,
}

impl StoryboardTemplate {
    /// Parse a template from JSON and check its slot layout.
    pub fn from_json(text: &str) -> Result<Self, CoreError> {
        let template: Self = serde_json::from_str(text)
            .map_err(|e| CoreError::Validation(format!("invalid storyboard template: {e}")))?;
        template.validate()?;
        Ok(template)
    }

    /// At least one fixed slot is required. Slot keys must be non-empty
    /// and unique, the bite key included.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.fixed_slots.is_empty() {
            return Err(CoreError::Validation(
                "storyboard template needs at least one fixed slot".to_string(),
            ));
        }
        let mut seen = HashSet::new();
        let keys = self
            .fixed_slots
            .iter()
            .map(|s| s.key.as_str())
            .chain(std::iter::once(self.bite_slot.key.as_str()));
        for key in keys {
            if key.trim().is_empty() {
                return Err(CoreError::Validation(
                    "storyboard slot key must not be empty".to_string(),
                ));
            }
            if !seen.insert(key) {
                return Err(CoreError::Validation(format!(
                    "duplicate storyboard slot key '{key}'"
                )));
            }
        }
        if self.bite_slot.fallback_label.trim().is_empty() {
            return Err(CoreError::Validation(
                "bite slot fallback label must not be empty".to_string(),
            ));
        }
        if let Some(unknown) = self.unknown_placeholders().first() {
            return Err(CoreError::Validation(format!(
                "unknown placeholder '{{{unknown}}}' in storyboard template"
            )));
        }
        Ok(())
    }

    /// Placeholders used in any text field that rendering cannot fill.
    pub fn unknown_placeholders(&self) -> Vec<String> {
        let texts = [
            self.brief.as_str(),
            self.user_content.as_str(),
            self.bite_slot.direction.as_str(),
            self.image_guidelines.as_str(),
            self.video_guidelines.as_str(),
        ]
        .into_iter()
        .chain(self.fixed_slots.iter().map(|s| s.direction.as_str()));

        texts
            .flat_map(|text| PLACEHOLDER_RE.captures_iter(text))
            .map(|cap| cap[1].to_string())
            .filter(|p| !KNOWN_PLACEHOLDERS.contains(&p.as_str()))
            .collect()
    }

    /// Number of single-scene slots that precede the bites.
    pub fn fixed_slot_count(&self) -> usize {
        self.fixed_slots.len()
    }

    /// Render the full system instruction for one food.
    pub fn system_instruction(&self, food_name: &str, bite_count: u32) -> String {
        let vars = self.placeholder_values(food_name, bite_count);
        let mut out = resolve(&self.brief, &vars);
        out.push_str(&format!(
            "\n\nTask: Generate a storyboard for: \"{food_name}\".\n\nRequired Scenes:\n"
        ));

        for (i, slot) in self.fixed_slots.iter().enumerate() {
            out.push_str(&format!(
                "\n{}. {} (JSON field \"{}\")\n{}\n",
                i + 1,
                slot.heading,
                slot.key,
                resolve(&slot.direction, &vars)
            ));
        }
        out.push_str(&format!(
            "\n{}. {} (JSON array \"{}\", exactly {bite_count} items)\n{}\n",
            self.fixed_slots.len() + 1,
            self.bite_slot.heading,
            self.bite_slot.key,
            resolve(&self.bite_slot.direction, &vars)
        ));

        out.push_str("\nPrompt Guidelines:\n\nA) IMAGE PROMPT:\n");
        out.push_str(&resolve(&self.image_guidelines, &vars));
        out.push_str("\n\nB) VIDEO PROMPT:\n");
        out.push_str(&resolve(&self.video_guidelines, &vars));
        out.push('\n');
        out
    }

    /// Render the user turn.
    pub fn user_content(&self, food_name: &str, bite_count: u32) -> String {
        resolve(&self.user_content, &self.placeholder_values(food_name, bite_count))
    }

    /// Build the structured-output schema the response must conform to.
    ///
    /// Uses the OpenAPI subset accepted by Gemini (`OBJECT`, `STRING`,
    /// `ARRAY`). Every slot is required, the bite array included.
    pub fn response_schema(&self, bite_count: u32) -> Value {
        let scene = scene_schema();
        let mut properties = serde_json::Map::new();
        let mut required = Vec::with_capacity(self.fixed_slots.len() + 1);

        for slot in &self.fixed_slots {
            properties.insert(slot.key.clone(), scene.clone());
            required.push(Value::String(slot.key.clone()));
        }
        properties.insert(
            self.bite_slot.key.clone(),
            json!({
                "type": "ARRAY",
                "items": scene,
                "minItems": bite_count,
                "maxItems": bite_count,
                "description": "List of distinct bite/shatter angles",
            }),
        );
        required.push(Value::String(self.bite_slot.key.clone()));

        json!({
            "type": "OBJECT",
            "properties": properties,
            "propertyOrdering": required.clone(),
            "required": required,
        })
    }

    fn placeholder_values(&self, food_name: &str, bite_count: u32) -> HashMap<&'static str, String> {
        HashMap::from([
            ("brand", self.brand.clone()),
            ("food_name", food_name.to_string()),
            ("bite_count", bite_count.to_string()),
        ])
    }

    // ---- built-in templates ----

    /// The current GlassyBites layout: hook, outfit, pool, then bites.
    pub fn glassy_bites() -> Self {
        Self {
            fixed_slots: vec![hook_slot(), outfit_slot(), pool_slot()],
            ..Self::glassy_bites_base()
        }
    }

    /// The earlier GlassyBites layout: outfit, pool, pickup, then bites.
    pub fn glassy_bites_classic() -> Self {
        Self {
            fixed_slots: vec![outfit_slot(), pool_slot(), pickup_slot()],
            ..Self::glassy_bites_base()
        }
    }

    fn glassy_bites_base() -> Self {
        Self {
            brand: "GlassyBites".to_string(),
            brief: GLASSY_BITES_BRIEF.to_string(),
            user_content: "Generate the {brand} storyboard for: \"{food_name}\" (JUMBO SIZE) \
                           with {bite_count} bite variations."
                .to_string(),
            fixed_slots: Vec::new(),
            bite_slot: BiteSlotSpec {
                key: "bites".to_string(),
                heading: "BITE ANGLES (The Climax)".to_string(),
                direction: "- Generate {bite_count} DISTINCT bite scenes.\n\
                            - Concept: The Model takes a bite of the JUMBO glass item.\n\
                            - Action: It does NOT squish. It SHATTERS/EXPLODES into shards upon impact with teeth.\n\
                            - Consistency: Ensure it's still the huge item."
                    .to_string(),
                fallback_label: "Bite Angle".to_string(),
            },
            image_guidelines: "- Start with \"A hyper-realistic photo of...\"\n\
                               - Keywords: \"Jumbo size {food_name}\", \"Surreal scale\", \
                               \"Translucent glass texture\", \"Fashion editorial\", \"8k resolution\"."
                .to_string(),
            video_guidelines: "- Start with \"Cinematic video of...\"\n\
                               - Keywords: \"Shattering\", \"Heavy impact\", \"Crystal sound visuals\", \
                               \"Slow motion\", \"Fashion lighting\"."
                .to_string(),
        }
    }
}

impl Default for StoryboardTemplate {
    fn default() -> Self {
        Self::glassy_bites()
    }
}

const GLASSY_BITES_BRIEF: &str = "You are the Creative Director for \"{brand}\", a famous high-fashion ASMR channel.

CORE CONCEPT:
1. JUMBO SURREAL SIZE: ALL food is OVERSIZED (Jumbo). A strawberry the size of a human head, a macaron the size of a cake.
2. MATERIAL: All food is made of edible, hyper-realistic COLORED GLASS. Hard, glossy, crystalline.
3. CONSISTENCY: The \"Jumbo Glass Object\" must look EXACTLY the same in every scene.
4. FASHION MATCH: The model's outfit must strictly COORDINATE with the food (colors, textures, vibe).";

fn hook_slot() -> SlotSpec {
    SlotSpec {
        key: "hook".to_string(),
        scene_type: SceneType::Hook,
        heading: "HOOK (1-SEC)".to_string(),
        direction: "- Concept: A one-second scroll stopper. Extreme close-up of teeth meeting the JUMBO Glass {food_name}, first crack visible.\n\
                    - Focus: Instant tension, glossy reflections, shards about to fly."
            .to_string(),
        fallback_title: "The Hook".to_string(),
    }
}

fn outfit_slot() -> SlotSpec {
    SlotSpec {
        key: "outfit".to_string(),
        scene_type: SceneType::Outfit,
        heading: "OUTFIT & CHARACTER (The Look)".to_string(),
        direction: "- Concept: Design the model's outfit to match the \"{food_name}\". Cute, High-Fashion, Avant-Garde.\n\
                    - Prompt Focus: Full body or 3/4 shot showing the Model wearing the outfit, posing with the JUMBO Glass {food_name}."
            .to_string(),
        fallback_title: "Fashion Match".to_string(),
    }
}

fn pool_slot() -> SlotSpec {
    SlotSpec {
        key: "pool".to_string(),
        scene_type: SceneType::Pool,
        heading: "THE POOL JUMP (The Intro)".to_string(),
        direction: "- Concept: The Model jumps into a pool filled with JUMBO Glass versions of the {food_name} instead of water.\n\
                    - Action: Upon impact, the giant glass items splash and scatter heavily.\n\
                    - Vibe: Surreal fashion commercial."
            .to_string(),
        fallback_title: "The Pool Jump".to_string(),
    }
}

fn pickup_slot() -> SlotSpec {
    SlotSpec {
        key: "pickup".to_string(),
        scene_type: SceneType::Pickup,
        heading: "PICKUP (The Scale Reveal)".to_string(),
        direction: "- Concept: The Model uses TWO HANDS to lift the single JUMBO Glass {food_name}.\n\
                    - Focus: Emphasize the weight and size. It looks heavy and smooth."
            .to_string(),
        fallback_title: "The Pickup".to_string(),
    }
}

fn scene_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "title": {
                "type": "STRING",
                "description": "Descriptive title (e.g. 'Strawberry Ruffle Dress' or 'Two-Handed Lift')",
            },
            "imagePrompt": {
                "type": "STRING",
                "description": "Prompt for generating the static image",
            },
            "videoPrompt": {
                "type": "STRING",
                "description": "Prompt for generating the video from the image",
            },
        },
        "required": ["title", "imagePrompt", "videoPrompt"],
    })
}

/// Substitute `{placeholder}` tokens. Unknown placeholders stay verbatim.
fn resolve(template: &str, vars: &HashMap<&'static str, String>) -> String {
    PLACEHOLDER_RE
        .replace_all(template, |caps: &regex::Captures| match vars.get(&caps[1]) {
            Some(value) => value.clone(),
            None => caps[0].to_string(),
        })
        .to_string()
}
