//! Clipweave Project Model
//!
//! Defines the core data contracts for Clipweave projects:
//! - **Elements:** Timed, placed units of content (video, image, audio, text, math plot)
//! - **Animations:** Declarative fade/slide/breathe effects targeting elements
//! - **Media:** Durable and session-only media references, plus the raw-resource registry
//! - **Project:** The persisted document tying settings, elements, animations and media together
//!
//! Geometry is expressed in scene units (canvas pixels); time is expressed
//! in milliseconds from the start of the project.

pub mod animation;
pub mod element;
pub mod geometry;
pub mod ids;
pub mod media;
pub mod project;

pub use animation::*;
pub use element::*;
pub use geometry::*;
pub use ids::*;
pub use media::*;
pub use project::*;
