//! Clipweave Render Engine
//!
//! Reconciles the scene onto a host-provided drawing surface and drives
//! offline export through the same path.
//!
//! # Pipeline Architecture
//!
//! ```text
//! elements ──┐
//!            ├── compose_frame(t) ── visibility, opacity, position,
//! timeline ──┘         │              scale, clip, media cues
//!                      ▼
//!             RenderSynchronizer ── element id -> visual handle
//!                      │
//!                      ▼
//!               RenderSurface (host)
//!                      │  capture_frame, once per export frame
//!                      ▼
//!               ExportEncoder (host) ── mp4 / webm bytes
//! ```

pub mod compositor;
pub mod export;
pub mod headless;
pub mod surface;
pub mod synchronizer;

pub use compositor::{compose_frame, ElementFrame, FrameComposition, GlyphFrame};
pub use export::*;
pub use headless::{HeadlessDecoder, HeadlessSurface, ManifestEncoder, BACKGROUND_GUIDE};
pub use surface::*;
pub use synchronizer::{patch_from_transform, RefreshReport, RenderSynchronizer, SceneView, VisualOwner};
