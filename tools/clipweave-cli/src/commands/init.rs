//! Create a new, empty Clipweave project.

use std::path::PathBuf;

use anyhow::Context;
use clipweave_common::config::AppConfig;
use clipweave_engine::{pack_document, settings_from_defaults};
use clipweave_project_model::ProjectDocument;

pub fn run(
    config: &AppConfig,
    name: String,
    output: Option<PathBuf>,
    width: Option<u32>,
    height: Option<u32>,
    fps: Option<u32>,
    max_time: Option<f64>,
) -> anyhow::Result<()> {
    let mut settings = settings_from_defaults(&config.editor);
    if let Some(width) = width {
        settings.canvas_width = width;
    }
    if let Some(height) = height {
        settings.canvas_height = height;
    }
    if let Some(fps) = fps {
        settings.fps = fps;
    }
    if let Some(max_time) = max_time {
        settings.max_time_ms = max_time;
    }

    let dir = output.unwrap_or_else(|| config.projects_dir.clone());
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;
    let path = dir.join(format!("{name}.project"));

    let doc = ProjectDocument::new(&name, settings);
    let bytes = pack_document(&doc)?;
    std::fs::write(&path, &bytes).with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), bytes = bytes.len(), "Created project");

    println!("Project '{}' created:", name);
    println!("  File: {}", path.display());
    println!("  ID: {}", doc.id);
    println!(
        "  Canvas: {}x{} @ {}fps",
        doc.settings.canvas_width, doc.settings.canvas_height, doc.settings.fps
    );
    println!("  Length: {:.1}s", doc.settings.max_time_ms / 1000.0);
    println!("  Export: {}", doc.settings.export_format.extension());

    Ok(())
}
