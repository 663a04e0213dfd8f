//! Export configuration and job management.

use std::time::Instant;

use serde::Serialize;

use clipweave_animation::AnimationTimeline;
use clipweave_common::clock::{frame_count, frame_to_ms};
use clipweave_common::error::{ClipweaveError, ClipweaveResult};
use clipweave_project_model::{Element, ElementId, ElementProperties, ExportFormat, MediaRef};

use crate::compositor::compose_frame;
use crate::surface::{CapturedFrame, RenderSurface};
use crate::synchronizer::RenderSynchronizer;

/// An export request.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportJob {
    pub format: ExportFormat,

    /// Output frame rate; independent of the timeline fps.
    pub fps: u32,

    /// Length to render, normally the project's max time.
    pub duration_ms: f64,
}

/// Progress callback for export rendering.
pub type ProgressCallback = Box<dyn Fn(ExportProgress) + Send + Sync>;

/// Export progress report.
#[derive(Debug, Clone)]
pub struct ExportProgress {
    /// Current progress [0.0, 1.0].
    pub progress: f64,

    /// Frames rendered so far.
    pub frames_rendered: u64,

    /// Total frames to render.
    pub total_frames: u64,

    /// Estimated time remaining in seconds.
    pub eta_secs: f64,

    /// Current stage.
    pub stage: ExportStage,
}

/// Stages of the export process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportStage {
    Preparing,
    Rendering,
    Encoding,
    Complete,
    Failed,
}

/// An audio element the encoder has to mix in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AudioCue {
    pub element_id: ElementId,
    pub media: MediaRef,
    pub start_ms: f64,
    pub end_ms: f64,
    pub volume: f64,
    pub muted: bool,
}

/// Everything handed to the encoder in one call.
#[derive(Debug, Clone)]
pub struct ExportInput {
    pub job: ExportJob,
    pub frames: Vec<CapturedFrame>,
    pub audio: Vec<AudioCue>,
}

/// Turns captured frames and audio cues into an encoded container.
#[async_trait::async_trait]
pub trait ExportEncoder: Send + Sync {
    /// Encoder name, for logs.
    fn name(&self) -> &str;

    async fn encode(&self, input: ExportInput) -> ClipweaveResult<Vec<u8>>;
}

/// Collect audio cues for every playable audio element.
pub fn audio_cues(elements: &[Element]) -> Vec<AudioCue> {
    elements
        .iter()
        .filter(|element| !element.time_frame.is_degenerate())
        .filter_map(|element| match &element.properties {
            ElementProperties::Audio(audio) => Some(AudioCue {
                element_id: element.id.clone(),
                media: audio.src.clone(),
                start_ms: element.time_frame.start,
                end_ms: element.time_frame.end,
                volume: audio.volume,
                muted: audio.muted,
            }),
            _ => None,
        })
        .collect()
}

fn report(progress: Option<&ProgressCallback>, update: ExportProgress) {
    if let Some(cb) = progress {
        cb(update);
    }
}

/// Render every frame of `job` through the surface, then encode.
///
/// The surface is left showing the last exported frame; callers restore
/// their own playhead afterwards.
pub async fn render_export(
    job: &ExportJob,
    elements: &[Element],
    timeline: &AnimationTimeline,
    synchronizer: &RenderSynchronizer,
    surface: &mut dyn RenderSurface,
    encoder: &dyn ExportEncoder,
    progress: Option<&ProgressCallback>,
) -> ClipweaveResult<Vec<u8>> {
    tracing::info!(
        format = ?job.format,
        fps = job.fps,
        duration_ms = job.duration_ms,
        encoder = encoder.name(),
        "Starting export"
    );

    if job.fps == 0 {
        return Err(ClipweaveError::export("Export frame rate must be positive"));
    }
    let total_frames = frame_count(job.duration_ms, job.fps);
    if total_frames == 0 {
        return Err(ClipweaveError::export("Nothing to export: project is empty"));
    }

    report(
        progress,
        ExportProgress {
            progress: 0.0,
            frames_rendered: 0,
            total_frames,
            eta_secs: 0.0,
            stage: ExportStage::Preparing,
        },
    );

    let started = Instant::now();
    let mut frames = Vec::with_capacity(total_frames as usize);
    for index in 0..total_frames {
        let time_ms = frame_to_ms(index, job.fps);
        synchronizer.apply_frame(surface, &compose_frame(elements, timeline, time_ms, true));
        let frame = match surface.capture_frame(time_ms) {
            Ok(frame) => frame,
            Err(e) => {
                report(
                    progress,
                    ExportProgress {
                        progress: index as f64 / total_frames as f64,
                        frames_rendered: index,
                        total_frames,
                        eta_secs: 0.0,
                        stage: ExportStage::Failed,
                    },
                );
                return Err(ClipweaveError::export(format!(
                    "Failed to capture frame {index}: {e}"
                )));
            }
        };
        frames.push(frame);

        let rendered = index + 1;
        let elapsed = started.elapsed().as_secs_f64();
        let eta_secs = elapsed / rendered as f64 * (total_frames - rendered) as f64;
        report(
            progress,
            ExportProgress {
                progress: rendered as f64 / total_frames as f64,
                frames_rendered: rendered,
                total_frames,
                eta_secs,
                stage: ExportStage::Rendering,
            },
        );
    }

    report(
        progress,
        ExportProgress {
            progress: 1.0,
            frames_rendered: total_frames,
            total_frames,
            eta_secs: 0.0,
            stage: ExportStage::Encoding,
        },
    );

    let input = ExportInput {
        job: job.clone(),
        frames,
        audio: audio_cues(elements),
    };
    let encoded = match encoder.encode(input).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::error!(encoder = encoder.name(), error = %e, "Encoder failed");
            report(
                progress,
                ExportProgress {
                    progress: 1.0,
                    frames_rendered: total_frames,
                    total_frames,
                    eta_secs: 0.0,
                    stage: ExportStage::Failed,
                },
            );
            return Err(e);
        }
    };

    report(
        progress,
        ExportProgress {
            progress: 1.0,
            frames_rendered: total_frames,
            total_frames,
            eta_secs: 0.0,
            stage: ExportStage::Complete,
        },
    );
    tracing::info!(
        frames = total_frames,
        bytes = encoded.len(),
        elapsed_secs = started.elapsed().as_secs_f64(),
        "Export complete"
    );

    Ok(encoded)
}
