//! Clipweave Engine
//!
//! Owns one open project and keeps the scene, the compiled timeline and
//! the host's rendering surface in step.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────┐
//! │                      Engine                       │
//! │  ┌────────────┐  ┌─────────────┐  ┌────────────┐  │
//! │  │ SceneModel │  │ Animation   │  │ Playback   │  │
//! │  │ + registry │─▶│ Scheduler   │◀─│ Clock      │  │
//! │  └─────┬──────┘  └──────┬──────┘  └────────────┘  │
//! │        │                │                         │
//! │        ▼                ▼                         │
//! │  ┌─────────────────────────────────────────────┐  │
//! │  │           RenderSynchronizer                │  │
//! │  └──────────────────────┬──────────────────────┘  │
//! └─────────────────────────┼─────────────────────────┘
//!                           ▼
//!                  RenderSurface (host)
//! ```
//!
//! Persistence goes through [`codec`]: session media is resolved and
//! embedded, then the document is JSON-encoded and zlib-compressed.

pub mod codec;
pub mod engine;
pub mod playback;
pub mod scene;

pub use codec::{
    embed_session_media, pack_document, restore_media, unpack_document, EmbedReport,
    MediaResolver, MemoryResolver, ResolvedMedia, RestoreReport,
};
pub use engine::{settings_from_defaults, AnimationPatch, Engine, EngineServices, ProjectInfo};
pub use playback::{PlaybackClock, PlaybackState, TickOutcome};
pub use scene::SceneModel;
