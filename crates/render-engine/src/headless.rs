//! In-memory surface, decoder and encoder.
//!
//! Used by the CLI to preview projects without a display, and by tests
//! to observe exactly what the engine pushed to the surface.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use clipweave_common::error::{ClipweaveError, ClipweaveResult};
use clipweave_project_model::{MediaKind, MediaRef};

use crate::export::{ExportEncoder, ExportInput};
use crate::surface::{
    CapturedFrame, DecodedMedia, MediaCue, MediaDecoder, RenderSurface, VisualHandle, VisualSpec,
    VisualState,
};

/// Handle of the canvas background guide every headless surface starts with.
pub const BACKGROUND_GUIDE: VisualHandle = VisualHandle(0);

/// A visual as the headless surface currently holds it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeadlessVisual {
    pub spec: VisualSpec,
    pub state: Option<VisualState>,
    pub cue: Option<MediaCue>,
}

/// Surface that keeps visuals in memory and captures frames as JSON.
#[derive(Debug)]
pub struct HeadlessSurface {
    width: u32,
    height: u32,
    next_handle: u64,
    visuals: BTreeMap<VisualHandle, HeadlessVisual>,
    active: Option<VisualHandle>,
    guide_removed: bool,
    /// Number of `add_visual` calls.
    pub add_calls: usize,
}

impl HeadlessSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            next_handle: BACKGROUND_GUIDE.0 + 1,
            visuals: BTreeMap::new(),
            active: None,
            guide_removed: false,
            add_calls: 0,
        }
    }

    pub fn visuals(&self) -> impl Iterator<Item = (&VisualHandle, &HeadlessVisual)> {
        self.visuals.iter()
    }

    pub fn visual(&self, handle: VisualHandle) -> Option<&HeadlessVisual> {
        self.visuals.get(&handle)
    }

    pub fn len(&self) -> usize {
        self.visuals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visuals.is_empty()
    }

    pub fn active(&self) -> Option<VisualHandle> {
        self.active
    }

    /// False once anything asked to remove the background guide.
    pub fn has_background_guide(&self) -> bool {
        !self.guide_removed
    }

    /// Visible, painted visuals in paint order.
    pub fn visible(&self) -> Vec<&HeadlessVisual> {
        self.visuals
            .values()
            .filter(|v| v.spec.is_painted())
            .filter(|v| v.state.map(|s| s.visible && s.opacity > 0.0).unwrap_or(false))
            .collect()
    }
}

#[derive(Serialize)]
struct FrameSnapshot<'a> {
    time_ms: f64,
    width: u32,
    height: u32,
    visuals: Vec<&'a HeadlessVisual>,
}

impl RenderSurface for HeadlessSurface {
    fn add_visual(&mut self, spec: VisualSpec) -> ClipweaveResult<VisualHandle> {
        self.add_calls += 1;
        let handle = VisualHandle(self.next_handle);
        self.next_handle += 1;
        self.visuals.insert(
            handle,
            HeadlessVisual {
                spec,
                state: None,
                cue: None,
            },
        );
        Ok(handle)
    }

    fn remove_visual(&mut self, handle: VisualHandle) {
        if handle == BACKGROUND_GUIDE {
            self.guide_removed = true;
            return;
        }
        self.visuals.remove(&handle);
        if self.active == Some(handle) {
            self.active = None;
        }
    }

    fn set_active_visual(&mut self, handle: VisualHandle) {
        if self.visuals.contains_key(&handle) {
            self.active = Some(handle);
        }
    }

    fn clear_selection(&mut self) {
        self.active = None;
    }

    fn apply_state(&mut self, handle: VisualHandle, state: &VisualState) {
        if let Some(visual) = self.visuals.get_mut(&handle) {
            visual.state = Some(*state);
        }
    }

    fn sync_media(&mut self, handle: VisualHandle, cue: &MediaCue) {
        if let Some(visual) = self.visuals.get_mut(&handle) {
            visual.cue = Some(*cue);
        }
    }

    fn capture_frame(&mut self, time_ms: f64) -> ClipweaveResult<CapturedFrame> {
        let snapshot = FrameSnapshot {
            time_ms,
            width: self.width,
            height: self.height,
            visuals: self.visible(),
        };
        Ok(CapturedFrame {
            time_ms,
            width: self.width,
            height: self.height,
            data: serde_json::to_vec(&snapshot)?,
        })
    }
}

/// Decoder that answers from fixed defaults without touching any bytes.
///
/// Session handles listed as broken fail to decode, which lets callers
/// exercise the skip paths.
#[derive(Debug, Clone)]
pub struct HeadlessDecoder {
    pub default_size: (f64, f64),
    pub default_duration_ms: f64,
    overrides: HashMap<MediaRef, DecodedMedia>,
    broken: Vec<MediaRef>,
}

impl Default for HeadlessDecoder {
    fn default() -> Self {
        Self {
            default_size: (1920.0, 1080.0),
            default_duration_ms: 5000.0,
            overrides: HashMap::new(),
            broken: Vec::new(),
        }
    }
}

impl HeadlessDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_media(mut self, media: MediaRef, decoded: DecodedMedia) -> Self {
        self.overrides.insert(media, decoded);
        self
    }

    pub fn with_broken(mut self, media: MediaRef) -> Self {
        self.broken.push(media);
        self
    }
}

#[async_trait::async_trait]
impl MediaDecoder for HeadlessDecoder {
    async fn probe(&self, media: &MediaRef, kind: MediaKind) -> ClipweaveResult<DecodedMedia> {
        if self.broken.contains(media) {
            return Err(ClipweaveError::decode(format!(
                "{} is not ready",
                media.describe()
            )));
        }
        if let Some(decoded) = self.overrides.get(media) {
            return Ok(*decoded);
        }
        let (width, height) = match kind {
            MediaKind::Audio => (0.0, 0.0),
            MediaKind::Video | MediaKind::Image => self.default_size,
        };
        let duration_ms = match kind {
            MediaKind::Image => None,
            MediaKind::Video | MediaKind::Audio => Some(self.default_duration_ms),
        };
        Ok(DecodedMedia {
            width,
            height,
            duration_ms,
        })
    }
}

/// Encoder that writes a JSON manifest of the export instead of video.
#[derive(Debug, Clone, Default)]
pub struct ManifestEncoder;

#[derive(Serialize)]
struct Manifest<'a> {
    format: &'a str,
    fps: u32,
    duration_ms: f64,
    frames: usize,
    frame_bytes: usize,
    audio: &'a [crate::export::AudioCue],
}

#[async_trait::async_trait]
impl ExportEncoder for ManifestEncoder {
    fn name(&self) -> &str {
        "manifest"
    }

    async fn encode(&self, input: ExportInput) -> ClipweaveResult<Vec<u8>> {
        let manifest = Manifest {
            format: input.job.format.extension(),
            fps: input.job.fps,
            duration_ms: input.job.duration_ms,
            frames: input.frames.len(),
            frame_bytes: input.frames.iter().map(|f| f.data.len()).sum(),
            audio: &input.audio,
        };
        Ok(serde_json::to_vec_pretty(&manifest)?)
    }
}
