//! Terminal rendering of project cards.

use std::io::{self, Write};

use glassybites_core::project::{FoodProject, Scene, SceneType};

/// Write one card per project, in store order (most recent first).
pub fn render_cards(projects: &[FoodProject], out: &mut dyn Write) -> io::Result<()> {
    for (i, project) in projects.iter().enumerate() {
        if i > 0 {
            writeln!(out)?;
        }
        render_card(project, out)?;
    }
    Ok(())
}

fn render_card(project: &FoodProject, out: &mut dyn Write) -> io::Result<()> {
    writeln!(out, "=== {} ({})", project.food_name, project.id)?;

    if project.is_generating_text {
        return writeln!(out, "  generating...");
    }
    if project.is_failed() {
        let scene = &project.scenes[0];
        return writeln!(
            out,
            "  {}: {} {}",
            scene.title, scene.image_prompt, scene.video_prompt
        );
    }

    let mut bite = 0;
    for scene in &project.scenes {
        let label = match scene.scene_type {
            SceneType::Bite => {
                bite += 1;
                format!("BITE {bite}")
            }
            other => other.as_str().to_string(),
        };
        render_scene(&label, scene, out)?;
    }
    Ok(())
}

fn render_scene(label: &str, scene: &Scene, out: &mut dyn Write) -> io::Result<()> {
    writeln!(out, "  [{label}] {}", scene.title)?;
    writeln!(out, "    Image: {}", scene.image_prompt)?;
    writeln!(out, "    Video: {}", scene.video_prompt)
}

/// Dump the projects as pretty JSON.
pub fn render_json(projects: &[FoodProject], out: &mut dyn Write) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, projects)?;
    writeln!(out)
}
