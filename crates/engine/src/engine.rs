//! The engine facade: one explicit instance per open project.
//!
//! Every scene or animation mutation runs to completion before the next
//! tick: the element list changes, the timeline is recompiled, and the
//! surface is refreshed. Playback ticks only resample the timeline.

use std::sync::Arc;
use std::time::Duration;

use clipweave_animation::{AnimationScheduler, AnimationTimeline, CompileContext, GlyphLayout, MonospaceLayout};
use clipweave_common::clock::{SystemClock, WallClock};
use clipweave_common::config::EditorDefaults;
use clipweave_common::error::ClipweaveResult;
use clipweave_project_model::{
    Animation, AnimationId, AnimationKind, AudioProperties, Effect, Element, ElementId,
    ElementPatch, ElementProperties, ExportFormat, ImageProperties, MathPlotProperties, MediaKind,
    MediaRef, MediaRegistry, Placement, ProjectDocument, ProjectSettings, TimeFrame, UiContext,
    VideoProperties, DOCUMENT_VERSION,
};
use clipweave_render_engine::{
    compose_frame, patch_from_transform, render_export, ExportEncoder, ExportJob,
    FrameComposition, HeadlessDecoder, HeadlessSurface, MediaDecoder, ProgressCallback,
    RenderSurface, RenderSynchronizer, SceneView, VisualHandle, VisualTransform,
};

use crate::codec::{
    embed_session_media, pack_document, restore_media, unpack_document, MediaResolver,
    MemoryResolver, RestoreReport,
};
use crate::playback::{PlaybackClock, PlaybackState, TickOutcome};
use crate::scene::SceneModel;

/// Height given to imported visual media; width follows the aspect ratio.
const IMPORT_HEIGHT: f64 = 100.0;

/// Host collaborators the engine talks to.
pub struct EngineServices {
    pub surface: Box<dyn RenderSurface>,
    pub decoder: Arc<dyn MediaDecoder>,
    pub resolver: Arc<dyn MediaResolver>,
    pub wall_clock: Arc<dyn WallClock>,
    pub layout: Arc<dyn GlyphLayout>,
}

impl EngineServices {
    /// In-memory collaborators for previews and scripting.
    pub fn headless(canvas_width: u32, canvas_height: u32) -> Self {
        Self {
            surface: Box::new(HeadlessSurface::new(canvas_width, canvas_height)),
            decoder: Arc::new(HeadlessDecoder::new()),
            resolver: Arc::new(MemoryResolver::new()),
            wall_clock: Arc::new(SystemClock::new()),
            layout: Arc::new(MonospaceLayout::default()),
        }
    }
}

/// Identity of the open project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectInfo {
    pub name: String,
    pub id: String,
    pub created_at: String,
}

impl ProjectInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: uuid::Uuid::new_v4().to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Partial update of an animation declaration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnimationPatch {
    pub duration_ms: Option<f64>,
    pub kind: Option<AnimationKind>,
}

/// Project settings for a new project from editor defaults.
pub fn settings_from_defaults(defaults: &EditorDefaults) -> ProjectSettings {
    let export_format = defaults.export_format.parse::<ExportFormat>().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Falling back to mp4 export");
        ExportFormat::Mp4
    });
    ProjectSettings {
        background_color: defaults.background_color.clone(),
        max_time_ms: defaults.max_time_ms,
        fps: defaults.fps,
        canvas_width: defaults.canvas_width,
        canvas_height: defaults.canvas_height,
        export_format,
    }
}

pub struct Engine {
    info: ProjectInfo,
    settings: ProjectSettings,
    menu_option: String,
    scene: SceneModel,
    animations: Vec<Animation>,
    resources: MediaRegistry,
    scheduler: AnimationScheduler,
    synchronizer: RenderSynchronizer,
    clock: PlaybackClock,
    surface: Box<dyn RenderSurface>,
    decoder: Arc<dyn MediaDecoder>,
    resolver: Arc<dyn MediaResolver>,
}

impl Engine {
    pub fn new(info: ProjectInfo, settings: ProjectSettings, services: EngineServices) -> Self {
        let clock = PlaybackClock::new(services.wall_clock, settings.fps, settings.max_time_ms);
        Self {
            info,
            menu_option: UiContext::default().selected_menu_option,
            scene: SceneModel::new(),
            animations: Vec::new(),
            resources: MediaRegistry::new(),
            scheduler: AnimationScheduler::new(services.layout),
            synchronizer: RenderSynchronizer::new(),
            clock,
            surface: services.surface,
            decoder: services.decoder,
            resolver: services.resolver,
            settings,
        }
    }

    // ---- Read access ----

    pub fn info(&self) -> &ProjectInfo {
        &self.info
    }

    pub fn settings(&self) -> &ProjectSettings {
        &self.settings
    }

    pub fn scene(&self) -> &SceneModel {
        &self.scene
    }

    pub fn elements(&self) -> &[Element] {
        self.scene.list()
    }

    pub fn animations(&self) -> &[Animation] {
        &self.animations
    }

    pub fn resources(&self) -> &MediaRegistry {
        &self.resources
    }

    pub fn timeline(&self) -> &AnimationTimeline {
        self.scheduler.timeline()
    }

    pub fn synchronizer(&self) -> &RenderSynchronizer {
        &self.synchronizer
    }

    pub fn playback_state(&self) -> PlaybackState {
        self.clock.state()
    }

    pub fn is_playing(&self) -> bool {
        self.clock.is_playing()
    }

    /// Exact playhead in milliseconds.
    pub fn time_ms(&self) -> f64 {
        self.clock.time_ms()
    }

    /// Playhead snapped to its key frame.
    pub fn current_time_ms(&self) -> f64 {
        self.clock.current_time_ms()
    }

    pub fn current_key_frame(&self) -> u64 {
        self.clock.current_key_frame()
    }

    pub fn menu_option(&self) -> &str {
        &self.menu_option
    }

    pub fn set_menu_option(&mut self, option: impl Into<String>) {
        self.menu_option = option.into();
    }

    /// Composition of the frame at the playhead.
    pub fn frame(&self) -> FrameComposition {
        compose_frame(
            self.scene.list(),
            self.scheduler.timeline(),
            self.clock.time_ms(),
            self.clock.is_playing(),
        )
    }

    /// Ids of elements visible at the playhead, in paint order.
    pub fn visible_ids(&self) -> Vec<ElementId> {
        self.frame().visible_ids().into_iter().cloned().collect()
    }

    // ---- Scene ----

    /// Add an element, select it, and resync.
    pub async fn add(&mut self, element: Element) -> ElementId {
        tracing::debug!(element = %element.id, kind = ?element.kind(), "Adding element");
        let id = self.scene.add(element);
        self.sync_scene().await;
        id
    }

    /// Remove an element. Unknown ids are ignored.
    pub async fn remove(&mut self, id: &ElementId) -> bool {
        if self.scene.remove(id).is_none() {
            return false;
        }
        tracing::debug!(element = %id, "Removed element");
        self.sync_scene().await;
        true
    }

    /// Apply a patch. Unknown ids are ignored.
    ///
    /// A new time frame is clamped into the project, and audio with a
    /// locked start keeps its start. The whole patch is rejected if the
    /// resulting frame has no positive length.
    pub async fn update(&mut self, id: &ElementId, mut patch: ElementPatch) -> bool {
        let Some(element) = self.scene.get(id) else {
            return false;
        };
        if let Some(frame) = patch.time_frame {
            match self.admit_time_frame(element, frame) {
                Some(frame) => patch.time_frame = Some(frame),
                None => {
                    tracing::debug!(element = %id, ?frame, "Rejecting empty time frame");
                    return false;
                }
            }
        }
        if !self.scene.update(id, patch) {
            return false;
        }
        self.sync_scene().await;
        true
    }

    /// Move or trim an element on the timeline.
    pub async fn update_time_frame(&mut self, id: &ElementId, frame: TimeFrame) -> bool {
        self.update(id, ElementPatch::time_frame(frame)).await
    }

    /// Select an element, or clear the selection with `None`.
    pub fn select(&mut self, id: Option<&ElementId>) -> bool {
        if !self.scene.select(id) {
            return false;
        }
        self.synchronizer
            .select(self.surface.as_mut(), self.scene.selected_id());
        true
    }

    pub async fn add_text(&mut self, text: impl Into<String>, font_size: f64, font_weight: u32) -> ElementId {
        let name = format!("Text {}", self.count_kind(|p| matches!(p, ElementProperties::Text(_))) + 1);
        let element = Element::text(name, text, font_size, font_weight, self.full_span());
        self.add(element).await
    }

    pub async fn add_math_plot(&mut self, formula: impl Into<String>, src: MediaRef) -> ElementId {
        let name = format!(
            "Plot {}",
            self.count_kind(|p| matches!(p, ElementProperties::MathPlot(_))) + 1
        );
        let element = Element::new(
            name,
            Placement::new(0.0, 0.0, 400.0, 300.0),
            self.full_span(),
            ElementProperties::MathPlot(MathPlotProperties {
                src,
                formula: formula.into(),
                effect: Effect::None,
            }),
        );
        self.add(element).await
    }

    // ---- Raw resources ----

    /// Register an imported resource and return its index.
    pub fn add_resource(&mut self, kind: MediaKind, media: MediaRef) -> usize {
        self.resources.push(kind, media)
    }

    pub fn remove_resource(&mut self, kind: MediaKind, index: usize) -> Option<MediaRef> {
        self.resources.remove(kind, index)
    }

    /// Add a video element spanning the clip's natural length.
    pub async fn import_video(&mut self, index: usize) -> ClipweaveResult<Option<ElementId>> {
        let Some(media) = self.resources.get(MediaKind::Video, index).cloned() else {
            return Ok(None);
        };
        let decoded = self.decoder.probe(&media, MediaKind::Video).await?;
        let duration = self.natural_duration(decoded.duration_ms);
        let name = format!("Video {}", self.count_kind(|p| matches!(p, ElementProperties::Video(_))) + 1);
        let element = Element::new(
            name,
            Placement::new(0.0, 0.0, IMPORT_HEIGHT * decoded.aspect_ratio(), IMPORT_HEIGHT),
            TimeFrame::new(0.0, duration),
            ElementProperties::Video(VideoProperties {
                src: media,
                effect: Effect::None,
                media_offset_ms: 0.0,
            }),
        );
        Ok(Some(self.add(element).await))
    }

    /// Add an image element spanning the whole project.
    pub async fn import_image(&mut self, index: usize) -> ClipweaveResult<Option<ElementId>> {
        let Some(media) = self.resources.get(MediaKind::Image, index).cloned() else {
            return Ok(None);
        };
        let decoded = self.decoder.probe(&media, MediaKind::Image).await?;
        let name = format!("Image {}", self.count_kind(|p| matches!(p, ElementProperties::Image(_))) + 1);
        let element = Element::new(
            name,
            Placement::new(0.0, 0.0, IMPORT_HEIGHT * decoded.aspect_ratio(), IMPORT_HEIGHT),
            self.full_span(),
            ElementProperties::Image(ImageProperties {
                src: media,
                effect: Effect::None,
            }),
        );
        Ok(Some(self.add(element).await))
    }

    /// Add an audio element spanning the track's natural length.
    pub async fn import_audio(&mut self, index: usize) -> ClipweaveResult<Option<ElementId>> {
        let Some(media) = self.resources.get(MediaKind::Audio, index).cloned() else {
            return Ok(None);
        };
        let decoded = self.decoder.probe(&media, MediaKind::Audio).await?;
        let duration = self.natural_duration(decoded.duration_ms);
        let name = format!("Audio {}", self.count_kind(|p| matches!(p, ElementProperties::Audio(_))) + 1);
        let element = Element::new(
            name,
            Placement::default(),
            TimeFrame::new(0.0, duration),
            ElementProperties::Audio(AudioProperties {
                src: media,
                volume: 1.0,
                muted: false,
                start_locked: true,
            }),
        );
        Ok(Some(self.add(element).await))
    }

    // ---- Animations ----

    pub async fn add_animation(&mut self, animation: Animation) -> AnimationId {
        tracing::debug!(
            animation = %animation.id,
            kind = animation.kind_name(),
            target = %animation.target_id,
            "Adding animation"
        );
        let id = animation.id.clone();
        self.animations.push(animation);
        self.sync_scene().await;
        id
    }

    pub async fn update_animation(&mut self, id: &AnimationId, patch: AnimationPatch) -> bool {
        let Some(animation) = self.animations.iter_mut().find(|a| &a.id == id) else {
            return false;
        };
        if let Some(duration_ms) = patch.duration_ms {
            animation.duration_ms = duration_ms;
        }
        if let Some(kind) = patch.kind {
            animation.kind = kind;
        }
        self.sync_scene().await;
        true
    }

    pub async fn remove_animation(&mut self, id: &AnimationId) -> bool {
        let before = self.animations.len();
        self.animations.retain(|a| &a.id != id);
        if self.animations.len() == before {
            return false;
        }
        self.sync_scene().await;
        true
    }

    // ---- Playback ----

    pub fn set_playing(&mut self, playing: bool) {
        if playing {
            self.clock.play();
        } else {
            self.clock.pause();
        }
        self.apply_time();
    }

    /// Move the playhead. Stops playback first.
    pub fn handle_seek(&mut self, time_ms: f64) {
        self.clock.seek(time_ms);
        self.apply_time();
    }

    /// One animation-frame tick. Returns whether playback continues.
    pub fn tick(&mut self) -> bool {
        match self.clock.tick() {
            TickOutcome::Idle => false,
            TickOutcome::Advanced(_) => {
                self.apply_time();
                true
            }
            TickOutcome::Finished => {
                tracing::info!("Playback finished");
                self.apply_time();
                false
            }
        }
    }

    /// Drive playback until it stops, re-ticking every `interval`.
    pub async fn run_playback(&mut self, interval: Duration) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        while self.clock.is_playing() {
            ticker.tick().await;
            if !self.tick() {
                break;
            }
        }
    }

    // ---- Settings ----

    pub async fn set_canvas_size(&mut self, width: u32, height: u32) {
        self.settings.canvas_width = width;
        self.settings.canvas_height = height;
        self.sync_scene().await;
    }

    pub fn set_max_time(&mut self, max_time_ms: f64) {
        self.settings.max_time_ms = max_time_ms;
        self.clock.set_max_time(max_time_ms);
        self.apply_time();
    }

    pub fn set_fps(&mut self, fps: u32) {
        self.settings.fps = fps;
        self.clock.set_fps(fps);
    }

    pub fn set_background_color(&mut self, color: impl Into<String>) {
        self.settings.background_color = color.into();
    }

    pub fn set_export_format(&mut self, format: ExportFormat) {
        self.settings.export_format = format;
    }

    // ---- Surface events ----

    /// The user transformed a visual on the surface.
    pub async fn handle_visual_modified(&mut self, handle: VisualHandle, transform: VisualTransform) -> bool {
        let Some(id) = self.synchronizer.element_for(handle).cloned() else {
            tracing::debug!(%handle, "Ignoring modification of unmanaged visual");
            return false;
        };
        let Some(element) = self.scene.get(&id) else {
            return false;
        };
        let patch = patch_from_transform(element, &transform);
        if patch == ElementPatch::default() {
            return false;
        }
        self.update(&id, patch).await
    }

    // ---- Persistence ----

    /// Snapshot of the current state, without resolving session media.
    pub fn to_document(&self) -> ProjectDocument {
        ProjectDocument {
            version: DOCUMENT_VERSION.to_string(),
            name: self.info.name.clone(),
            id: self.info.id.clone(),
            created_at: self.info.created_at.clone(),
            modified_at: chrono::Utc::now().to_rfc3339(),
            settings: self.settings.clone(),
            ui: UiContext {
                selected_menu_option: self.menu_option.clone(),
                selected_element: self.scene.selected_id().cloned(),
            },
            resources: self.resources.clone(),
            elements: self.scene.list().to_vec(),
            animations: self.animations.clone(),
            embedded_media: Vec::new(),
        }
    }

    /// Encode the project as `.project` bytes.
    pub async fn serialize(&self) -> ClipweaveResult<Vec<u8>> {
        let mut doc = self.to_document();
        let report = embed_session_media(&mut doc, self.resolver.as_ref()).await;
        let bytes = pack_document(&doc)?;
        tracing::info!(
            elements = doc.elements.len(),
            animations = doc.animations.len(),
            embedded = report.embedded,
            failed = report.failed,
            bytes = bytes.len(),
            "Serialized project"
        );
        Ok(bytes)
    }

    /// Replace the whole state from `.project` bytes.
    ///
    /// Nothing changes if the bytes are not a project.
    pub async fn deserialize(&mut self, bytes: &[u8]) -> ClipweaveResult<RestoreReport> {
        let mut doc = unpack_document(bytes)?;
        let report = restore_media(&mut doc);
        tracing::info!(
            name = %doc.name,
            elements = doc.elements.len(),
            restored = report.restored,
            dropped = report.dropped,
            "Loaded project"
        );
        self.load_document(doc).await;
        Ok(report)
    }

    /// Replace the whole state from a parsed document and rebuild.
    pub async fn load_document(&mut self, doc: ProjectDocument) {
        self.info = ProjectInfo {
            name: doc.name,
            id: doc.id,
            created_at: doc.created_at,
        };
        self.clock.reset(doc.settings.fps, doc.settings.max_time_ms);
        self.settings = doc.settings;
        self.menu_option = doc.ui.selected_menu_option;
        self.resources = doc.resources;
        self.animations = doc.animations;
        self.scene.replace_all(doc.elements, doc.ui.selected_element);
        self.sync_scene().await;
    }

    // ---- Export ----

    /// Render the whole project through the surface and encode it.
    ///
    /// Playback is stopped first; the playhead is restored afterwards
    /// whether or not the export succeeded.
    pub async fn export(
        &mut self,
        encoder: &dyn ExportEncoder,
        fps: u32,
        progress: Option<&ProgressCallback>,
    ) -> ClipweaveResult<Vec<u8>> {
        self.clock.pause();
        let job = ExportJob {
            format: self.settings.export_format,
            fps,
            duration_ms: self.settings.max_time_ms,
        };
        let result = render_export(
            &job,
            self.scene.list(),
            self.scheduler.timeline(),
            &self.synchronizer,
            self.surface.as_mut(),
            encoder,
            progress,
        )
        .await;
        self.apply_time();
        result
    }

    // ---- Internals ----

    fn compile_context(&self) -> CompileContext {
        CompileContext::new(
            self.settings.canvas_width as f64,
            self.settings.canvas_height as f64,
        )
    }

    /// Recompile the timeline and rebuild every visual.
    async fn sync_scene(&mut self) {
        let ctx = self.compile_context();
        self.scheduler
            .recompile(self.scene.list(), &self.animations, &ctx);
        self.synchronizer
            .refresh(
                self.surface.as_mut(),
                self.decoder.as_ref(),
                SceneView {
                    elements: self.scene.list(),
                    timeline: self.scheduler.timeline(),
                    selected: self.scene.selected_id(),
                    time_ms: self.clock.time_ms(),
                    playing: self.clock.is_playing(),
                },
            )
            .await;
    }

    /// Push the playhead's frame to the surface.
    fn apply_time(&mut self) {
        let frame = self.frame();
        self.synchronizer.apply_frame(self.surface.as_mut(), &frame);
    }

    /// The frame `element` may take, or `None` if nothing of it survives.
    fn admit_time_frame(&self, element: &Element, frame: TimeFrame) -> Option<TimeFrame> {
        let mut frame = frame.clamped(self.settings.max_time_ms);
        if let ElementProperties::Audio(AudioProperties {
            start_locked: true, ..
        }) = &element.properties
        {
            frame.start = element.time_frame.start;
        }
        (!frame.is_degenerate()).then_some(frame)
    }

    fn full_span(&self) -> TimeFrame {
        TimeFrame::new(0.0, self.settings.max_time_ms)
    }

    fn natural_duration(&self, duration_ms: Option<f64>) -> f64 {
        let max = self.settings.max_time_ms;
        duration_ms.filter(|d| *d > 0.0).map_or(max, |d| d.min(max))
    }

    fn count_kind(&self, pred: impl Fn(&ElementProperties) -> bool) -> usize {
        self.scene.list().iter().filter(|e| pred(&e.properties)).count()
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("info", &self.info)
            .field("elements", &self.scene.len())
            .field("animations", &self.animations.len())
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}
