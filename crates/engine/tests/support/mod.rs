#![allow(dead_code)]

use std::sync::{Arc, Mutex, MutexGuard};

use clipweave_animation::MonospaceLayout;
use clipweave_common::clock::ManualClock;
use clipweave_common::error::ClipweaveResult;
use clipweave_engine::{Engine, EngineServices, MemoryResolver, ProjectInfo};
use clipweave_project_model::ProjectSettings;
use clipweave_render_engine::{
    CapturedFrame, HeadlessDecoder, HeadlessSurface, MediaCue, RenderSurface, VisualHandle,
    VisualSpec, VisualState,
};

/// Headless surface the test keeps a handle to after the engine takes it.
#[derive(Clone)]
pub struct SharedSurface(pub Arc<Mutex<HeadlessSurface>>);

impl RenderSurface for SharedSurface {
    fn add_visual(&mut self, spec: VisualSpec) -> ClipweaveResult<VisualHandle> {
        self.lock().add_visual(spec)
    }

    fn remove_visual(&mut self, handle: VisualHandle) {
        self.lock().remove_visual(handle)
    }

    fn set_active_visual(&mut self, handle: VisualHandle) {
        self.lock().set_active_visual(handle)
    }

    fn clear_selection(&mut self) {
        self.lock().clear_selection()
    }

    fn apply_state(&mut self, handle: VisualHandle, state: &VisualState) {
        self.lock().apply_state(handle, state)
    }

    fn sync_media(&mut self, handle: VisualHandle, cue: &MediaCue) {
        self.lock().sync_media(handle, cue)
    }

    fn capture_frame(&mut self, time_ms: f64) -> ClipweaveResult<CapturedFrame> {
        self.lock().capture_frame(time_ms)
    }
}

impl SharedSurface {
    pub fn lock(&self) -> MutexGuard<'_, HeadlessSurface> {
        self.0.lock().unwrap()
    }
}

pub struct Harness {
    pub engine: Engine,
    pub surface: SharedSurface,
    pub wall: ManualClock,
}

pub fn harness() -> Harness {
    harness_with(HeadlessDecoder::new(), MemoryResolver::new())
}

pub fn harness_with(decoder: HeadlessDecoder, resolver: MemoryResolver) -> Harness {
    let surface = SharedSurface(Arc::new(Mutex::new(HeadlessSurface::new(800, 500))));
    let wall = ManualClock::new(10_000.0);
    let services = EngineServices {
        surface: Box::new(surface.clone()),
        decoder: Arc::new(decoder),
        resolver: Arc::new(resolver),
        wall_clock: Arc::new(wall.clone()),
        layout: Arc::new(MonospaceLayout::default()),
    };
    let engine = Engine::new(ProjectInfo::new("Test"), ProjectSettings::default(), services);
    Harness {
        engine,
        surface,
        wall,
    }
}
