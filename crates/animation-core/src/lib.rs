//! Clipweave Animation Scheduler
//!
//! Turns per-element animation declarations into one global, seekable
//! timeline:
//! - **Compile:** Resolve each declaration against its target's time frame
//!   and placement into absolute-time tracks (fade, slide, per-glyph slide,
//!   breathe pulses)
//! - **Seek:** Sample every track at an arbitrary time without replaying
//!   intermediate frames
//! - **Glyphs:** Split text into ordered glyph layers for character slides
//!
//! This crate is pure computation: no I/O, no rendering surface. The whole
//! timeline is rebuilt from scratch whenever the scene or the animation set
//! changes.

pub mod compile;
pub mod glyph;
pub mod timeline;
pub mod track;

pub use compile::{compile_timeline, AnimationScheduler, CompileContext};
pub use glyph::{GlyphLayer, GlyphLayout, GlyphPlacement, MonospaceLayout};
pub use timeline::{AnimationTimeline, TimelineSample, VisualOverride};
pub use track::{Channel, ChannelValue, Track, TrackTarget};
