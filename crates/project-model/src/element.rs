//! Scene elements: timed, placed units of content.

use serde::{Deserialize, Serialize};

use crate::geometry::{Placement, TimeFrame};
use crate::ids::ElementId;
use crate::media::{MediaKind, MediaRef};

/// One timed, positioned unit of content in the scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    /// Unique, immutable identifier.
    pub id: ElementId,

    /// Display label.
    pub name: String,

    pub placement: Placement,

    pub time_frame: TimeFrame,

    /// Variant-specific payload.
    pub properties: ElementProperties,
}

/// Discriminant of [`ElementProperties`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Video,
    Image,
    Audio,
    Text,
    MathPlot,
}

/// Variant payload of an element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ElementProperties {
    Video(VideoProperties),
    Image(ImageProperties),
    Audio(AudioProperties),
    Text(TextProperties),
    MathPlot(MathPlotProperties),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoProperties {
    pub src: MediaRef,
    #[serde(default)]
    pub effect: Effect,
    /// Position inside the source media that lines up with `time_frame.start`.
    #[serde(default)]
    pub media_offset_ms: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageProperties {
    pub src: MediaRef,
    #[serde(default)]
    pub effect: Effect,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioProperties {
    pub src: MediaRef,
    #[serde(default = "full_volume")]
    pub volume: f64,
    #[serde(default)]
    pub muted: bool,
    /// While set, time-frame edits may move the end but not the start.
    #[serde(default = "locked")]
    pub start_locked: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextProperties {
    pub text: String,
    pub font_size: f64,
    #[serde(default = "regular_weight")]
    pub font_weight: u32,
    #[serde(default = "white")]
    pub fill: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MathPlotProperties {
    /// Pre-rendered plot raster.
    pub src: MediaRef,
    #[serde(default)]
    pub formula: String,
    #[serde(default)]
    pub effect: Effect,
}

fn full_volume() -> f64 {
    1.0
}

fn locked() -> bool {
    true
}

fn regular_weight() -> u32 {
    400
}

fn white() -> String {
    "#ffffff".to_string()
}

/// Colour filter applied to visual elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Effect {
    #[default]
    None,
    BlackAndWhite,
    Sepia,
    Invert,
    Saturate,
}

impl Element {
    /// Create an element with a fresh id.
    pub fn new(
        name: impl Into<String>,
        placement: Placement,
        time_frame: TimeFrame,
        properties: ElementProperties,
    ) -> Self {
        Self {
            id: ElementId::generate(),
            name: name.into(),
            placement,
            time_frame,
            properties,
        }
    }

    /// A 400x100 white text box at the canvas origin.
    pub fn text(
        name: impl Into<String>,
        text: impl Into<String>,
        font_size: f64,
        font_weight: u32,
        time_frame: TimeFrame,
    ) -> Self {
        Self::new(
            name,
            Placement::new(0.0, 0.0, 400.0, 100.0),
            time_frame,
            ElementProperties::Text(TextProperties {
                text: text.into(),
                font_size,
                font_weight,
                fill: white(),
            }),
        )
    }

    /// An image element sized `width x height`.
    pub fn image(
        name: impl Into<String>,
        src: MediaRef,
        width: f64,
        height: f64,
        time_frame: TimeFrame,
    ) -> Self {
        Self::new(
            name,
            Placement::new(0.0, 0.0, width, height),
            time_frame,
            ElementProperties::Image(ImageProperties {
                src,
                effect: Effect::None,
            }),
        )
    }

    pub fn kind(&self) -> ElementKind {
        match self.properties {
            ElementProperties::Video(_) => ElementKind::Video,
            ElementProperties::Image(_) => ElementKind::Image,
            ElementProperties::Audio(_) => ElementKind::Audio,
            ElementProperties::Text(_) => ElementKind::Text,
            ElementProperties::MathPlot(_) => ElementKind::MathPlot,
        }
    }

    /// The media this element draws from, if any.
    pub fn media_src(&self) -> Option<&MediaRef> {
        match &self.properties {
            ElementProperties::Video(p) => Some(&p.src),
            ElementProperties::Image(p) => Some(&p.src),
            ElementProperties::Audio(p) => Some(&p.src),
            ElementProperties::MathPlot(p) => Some(&p.src),
            ElementProperties::Text(_) => None,
        }
    }

    pub fn media_src_mut(&mut self) -> Option<&mut MediaRef> {
        match &mut self.properties {
            ElementProperties::Video(p) => Some(&mut p.src),
            ElementProperties::Image(p) => Some(&mut p.src),
            ElementProperties::Audio(p) => Some(&mut p.src),
            ElementProperties::MathPlot(p) => Some(&mut p.src),
            ElementProperties::Text(_) => None,
        }
    }

    /// Raw-resource category of this element's media. Math plots are
    /// rasters and are filed with images.
    pub fn media_kind(&self) -> Option<MediaKind> {
        match self.kind() {
            ElementKind::Video => Some(MediaKind::Video),
            ElementKind::Image | ElementKind::MathPlot => Some(MediaKind::Image),
            ElementKind::Audio => Some(MediaKind::Audio),
            ElementKind::Text => None,
        }
    }

    pub fn effect(&self) -> Effect {
        match &self.properties {
            ElementProperties::Video(p) => p.effect,
            ElementProperties::Image(p) => p.effect,
            ElementProperties::MathPlot(p) => p.effect,
            ElementProperties::Audio(_) | ElementProperties::Text(_) => Effect::None,
        }
    }

    /// Apply a patch, returning whether anything was set.
    pub fn apply(&mut self, patch: ElementPatch) -> bool {
        let mut changed = false;
        if let Some(name) = patch.name {
            self.name = name;
            changed = true;
        }
        if let Some(placement) = patch.placement {
            self.placement = placement;
            changed = true;
        }
        if let Some(time_frame) = patch.time_frame {
            self.time_frame = time_frame;
            changed = true;
        }
        if let Some(properties) = patch.properties {
            self.properties = properties;
            changed = true;
        }
        if let Some(effect) = patch.effect {
            match &mut self.properties {
                ElementProperties::Video(p) => p.effect = effect,
                ElementProperties::Image(p) => p.effect = effect,
                ElementProperties::MathPlot(p) => p.effect = effect,
                ElementProperties::Audio(_) | ElementProperties::Text(_) => {}
            }
            changed = true;
        }
        changed
    }
}

/// Partial update of an element. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementPatch {
    pub name: Option<String>,
    pub placement: Option<Placement>,
    pub time_frame: Option<TimeFrame>,
    pub properties: Option<ElementProperties>,
    /// Shortcut for changing only the effect tag of a visual element.
    pub effect: Option<Effect>,
}

impl ElementPatch {
    pub fn placement(placement: Placement) -> Self {
        Self {
            placement: Some(placement),
            ..Self::default()
        }
    }

    pub fn time_frame(time_frame: TimeFrame) -> Self {
        Self {
            time_frame: Some(time_frame),
            ..Self::default()
        }
    }

    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn effect(effect: Effect) -> Self {
        Self {
            effect: Some(effect),
            ..Self::default()
        }
    }

    pub fn properties(properties: ElementProperties) -> Self {
        Self {
            properties: Some(properties),
            ..Self::default()
        }
    }
}
