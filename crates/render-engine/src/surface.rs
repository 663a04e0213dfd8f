//! Interfaces to the host's drawing surface and media decoder.
//!
//! The engine never draws. It describes visuals to a [`RenderSurface`]
//! and pushes per-frame state to them; the host decides what a visual
//! looks like on screen.

use clipweave_common::error::ClipweaveResult;
use clipweave_project_model::{ClipRect, Effect, ElementId, MediaKind, MediaRef, Placement, Point2D};
use serde::Serialize;

/// Opaque handle of a visual living on the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct VisualHandle(pub u64);

impl std::fmt::Display for VisualHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "visual#{}", self.0)
    }
}

/// What a visual draws.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum VisualContent {
    /// Decoded picture: image, math plot, or a video's current frame.
    Raster {
        media: MediaRef,
        effect: Effect,
        natural_width: f64,
        natural_height: f64,
    },
    Text {
        text: String,
        font_size: f64,
        font_weight: u32,
        fill: String,
    },
    /// One glyph split from a text element.
    Glyph {
        grapheme: String,
        font_size: f64,
        font_weight: u32,
        fill: String,
    },
    /// Playback-only media with nothing to paint (audio).
    Media { media: MediaRef },
}

/// Everything needed to create a visual.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisualSpec {
    pub element_id: ElementId,
    /// Set for glyph visuals.
    pub glyph_index: Option<usize>,
    pub placement: Placement,
    pub content: VisualContent,
}

impl VisualSpec {
    /// Whether the visual paints pixels (and can be selected).
    pub fn is_painted(&self) -> bool {
        !matches!(self.content, VisualContent::Media { .. })
    }
}

/// Per-frame state of one visual.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VisualState {
    pub visible: bool,
    pub opacity: f64,
    pub position: Point2D,
    pub scale_x: f64,
    pub scale_y: f64,
    pub clip: Option<ClipRect>,
}

/// Where a time-based visual should be in its media, and whether it runs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MediaCue {
    /// Offset into the media in milliseconds.
    pub position_ms: f64,
    pub playing: bool,
    pub volume: f64,
    pub muted: bool,
}

/// New transform reported by the host after the user dragged, resized or
/// rotated a visual.
#[derive(Debug, Clone, PartialEq)]
pub struct VisualTransform {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub rotation: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    /// Edited text, for text visuals edited in place.
    pub text: Option<String>,
}

impl VisualTransform {
    pub fn from_placement(placement: &Placement) -> Self {
        Self {
            x: placement.x,
            y: placement.y,
            width: placement.width,
            height: placement.height,
            rotation: placement.rotation,
            scale_x: placement.scale_x,
            scale_y: placement.scale_y,
            text: None,
        }
    }
}

/// A captured picture of the surface at one instant.
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedFrame {
    pub time_ms: f64,
    pub width: u32,
    pub height: u32,
    /// Host-defined encoding of the frame.
    pub data: Vec<u8>,
}

/// The host's drawing surface.
///
/// Surfaces also own unmanaged visuals such as the canvas background
/// guide; the engine never removes a handle it did not create.
pub trait RenderSurface: Send {
    fn add_visual(&mut self, spec: VisualSpec) -> ClipweaveResult<VisualHandle>;

    fn remove_visual(&mut self, handle: VisualHandle);

    fn set_active_visual(&mut self, handle: VisualHandle);

    fn clear_selection(&mut self);

    fn apply_state(&mut self, handle: VisualHandle, state: &VisualState);

    fn sync_media(&mut self, handle: VisualHandle, cue: &MediaCue);

    /// Capture the current picture, used by export.
    fn capture_frame(&mut self, time_ms: f64) -> ClipweaveResult<CapturedFrame>;
}

/// Facts a decoder reports about a media resource.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecodedMedia {
    pub width: f64,
    pub height: f64,
    /// Present for time-based media.
    pub duration_ms: Option<f64>,
}

impl DecodedMedia {
    pub fn aspect_ratio(&self) -> f64 {
        if self.height > 0.0 {
            self.width / self.height
        } else {
            1.0
        }
    }
}

/// Off-thread media probing (natural size, duration).
#[async_trait::async_trait]
pub trait MediaDecoder: Send + Sync {
    async fn probe(&self, media: &MediaRef, kind: MediaKind) -> ClipweaveResult<DecodedMedia>;
}
