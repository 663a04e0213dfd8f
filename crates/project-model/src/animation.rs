//! Declarative animations attached to elements.
//!
//! Declarations only say *what* should happen; the scheduler turns them
//! into absolute-time tracks. A declaration whose target no longer exists
//! is kept but ignored.

use serde::{Deserialize, Serialize};

use crate::ids::{AnimationId, ElementId};

/// One animation declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Animation {
    pub id: AnimationId,

    /// Element this animation drives.
    pub target_id: ElementId,

    /// Length of the effect in milliseconds.
    pub duration_ms: f64,

    pub kind: AnimationKind,
}

/// Supported animation kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnimationKind {
    FadeIn,
    FadeOut,
    SlideIn(SlideProperties),
    SlideOut(SlideProperties),
    /// Heartbeat-like scale pulse between the slides of the same target.
    Breathe,
}

/// Options shared by slide-in and slide-out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideProperties {
    /// Canvas edge the element enters from (or leaves towards).
    pub direction: SlideDirection,

    /// Clip the element to a mask around its placed rectangle while sliding.
    #[serde(default)]
    pub use_clip_path: bool,

    /// How text elements are split for the slide.
    #[serde(default)]
    pub text_split: TextSplit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlideDirection {
    Left,
    Right,
    Top,
    Bottom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextSplit {
    /// Slide the text box as one object.
    #[default]
    None,
    /// Slide each glyph separately with a stagger.
    Character,
}

impl SlideProperties {
    pub fn new(direction: SlideDirection) -> Self {
        Self {
            direction,
            use_clip_path: false,
            text_split: TextSplit::None,
        }
    }

    pub fn with_clip_path(mut self) -> Self {
        self.use_clip_path = true;
        self
    }

    pub fn by_character(mut self) -> Self {
        self.text_split = TextSplit::Character;
        self
    }
}

impl Animation {
    /// Create a declaration with a fresh id.
    pub fn new(target_id: ElementId, duration_ms: f64, kind: AnimationKind) -> Self {
        Self {
            id: AnimationId::generate(),
            target_id,
            duration_ms,
            kind,
        }
    }

    pub fn fade_in(target_id: ElementId, duration_ms: f64) -> Self {
        Self::new(target_id, duration_ms, AnimationKind::FadeIn)
    }

    pub fn fade_out(target_id: ElementId, duration_ms: f64) -> Self {
        Self::new(target_id, duration_ms, AnimationKind::FadeOut)
    }

    pub fn slide_in(target_id: ElementId, duration_ms: f64, props: SlideProperties) -> Self {
        Self::new(target_id, duration_ms, AnimationKind::SlideIn(props))
    }

    pub fn slide_out(target_id: ElementId, duration_ms: f64, props: SlideProperties) -> Self {
        Self::new(target_id, duration_ms, AnimationKind::SlideOut(props))
    }

    pub fn breathe(target_id: ElementId) -> Self {
        Self::new(target_id, 0.0, AnimationKind::Breathe)
    }

    /// Stable, lowercase name of the kind (for logs and listings).
    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            AnimationKind::FadeIn => "fade_in",
            AnimationKind::FadeOut => "fade_out",
            AnimationKind::SlideIn(_) => "slide_in",
            AnimationKind::SlideOut(_) => "slide_out",
            AnimationKind::Breathe => "breathe",
        }
    }
}
