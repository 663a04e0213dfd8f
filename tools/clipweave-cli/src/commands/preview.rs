//! Load a project into a headless engine and sample it.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clipweave_engine::{Engine, EngineServices, ProjectInfo};
use clipweave_render_engine::{ExportProgress, ManifestEncoder, ProgressCallback};

/// `tick` is the playback re-tick interval; `None` skips playback.
pub async fn run(
    path: PathBuf,
    at: f64,
    export: Option<PathBuf>,
    fps: u32,
    tick: Option<Duration>,
) -> anyhow::Result<()> {
    let bytes = std::fs::read(&path).with_context(|| format!("Failed to read {}", path.display()))?;
    let doc = clipweave_engine::unpack_document(&bytes)
        .with_context(|| format!("Failed to load project {}", path.display()))?;

    let services = EngineServices::headless(doc.settings.canvas_width, doc.settings.canvas_height);
    let mut engine = Engine::new(ProjectInfo::new(&doc.name), doc.settings.clone(), services);
    let report = engine.deserialize(&bytes).await?;
    if report.dropped > 0 {
        println!("  {} element(s) dropped: session media was never saved", report.dropped);
    }

    engine.handle_seek(at);
    let frame = engine.frame();
    println!(
        "Frame at {:.0}ms (key frame {}):",
        engine.time_ms(),
        engine.current_key_frame()
    );
    for element in engine.elements() {
        let Some(state) = frame.element(&element.id).map(|f| f.state) else {
            continue;
        };
        if !state.visible {
            continue;
        }
        println!(
            "  {} opacity={:.2} pos=({:.1}, {:.1}) scale=({:.2}, {:.2})",
            element.name,
            state.opacity,
            state.position.x,
            state.position.y,
            state.scale_x,
            state.scale_y
        );
    }
    if frame.visible_ids().is_empty() {
        println!("  (nothing visible)");
    }

    if let Some(interval) = tick {
        engine.set_playing(true);
        engine.run_playback(interval).await;
        println!(
            "Played to the end ({}), playhead now at {:.0}ms",
            engine.info().name,
            engine.time_ms()
        );
    }

    if let Some(output) = export {
        let progress: ProgressCallback = Box::new(|p: ExportProgress| {
            print!(
                "\r  Progress: {:.1}% ({}/{} frames)  ",
                p.progress * 100.0,
                p.frames_rendered,
                p.total_frames
            );
        });
        let manifest = engine.export(&ManifestEncoder, fps, Some(&progress)).await?;
        std::fs::write(&output, &manifest)
            .with_context(|| format!("Failed to write {}", output.display()))?;
        println!("\nExport manifest written: {}", output.display());
    }

    Ok(())
}
