//! Show project information.

use std::path::PathBuf;

use clipweave_project_model::{ElementKind, MediaKind};

pub fn run(path: PathBuf) -> anyhow::Result<()> {
    let doc = super::load_document(&path)?;
    let s = &doc.settings;

    println!("Project: {}", doc.name);
    println!("  ID: {}", doc.id);
    println!("  Version: {}", doc.version);
    println!("  Created: {}", doc.created_at);
    println!("  Modified: {}", doc.modified_at);
    println!();

    println!("Settings:");
    println!("  Canvas: {}x{} @ {}fps", s.canvas_width, s.canvas_height, s.fps);
    println!("  Length: {:.1}s", s.max_time_ms / 1000.0);
    println!("  Background: {}", s.background_color);
    println!("  Export: {}", s.export_format.extension());
    println!();

    println!("Elements ({}):", doc.elements.len());
    for element in &doc.elements {
        let kind = match element.kind() {
            ElementKind::Video => "video",
            ElementKind::Image => "image",
            ElementKind::Audio => "audio",
            ElementKind::Text => "text",
            ElementKind::MathPlot => "math plot",
        };
        let selected = if doc.ui.selected_element.as_ref() == Some(&element.id) {
            " *"
        } else {
            ""
        };
        println!(
            "  {} [{}] {:.0}..{:.0}ms{}",
            element.name, kind, element.time_frame.start, element.time_frame.end, selected
        );
    }
    println!();

    println!("Animations ({}):", doc.animations.len());
    for animation in &doc.animations {
        println!(
            "  {} -> {} ({:.0}ms)",
            animation.kind_name(),
            animation.target_id,
            animation.duration_ms
        );
    }
    println!();

    println!("Resources:");
    for (label, kind) in [
        ("Videos", MediaKind::Video),
        ("Images", MediaKind::Image),
        ("Audios", MediaKind::Audio),
    ] {
        println!("  {label}: {}", doc.resources.list(kind).len());
    }
    println!("  Embedded payloads: {}", doc.embedded_media.len());

    Ok(())
}
