//! Frame compositor: resolves what every element looks like at one time.
//!
//! Composition is pure. It combines the scene's placed state with the
//! timeline sample for `time_ms`; the synchronizer pushes the result to
//! the surface, and export does the same once per output frame.

use clipweave_animation::{AnimationTimeline, VisualOverride};
use clipweave_project_model::{ClipRect, Element, ElementId, ElementProperties, Point2D};

use crate::surface::{MediaCue, VisualState};

/// One element's state for a single frame.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementFrame {
    pub element_id: ElementId,
    pub state: VisualState,
    /// Present for video and audio elements.
    pub cue: Option<MediaCue>,
}

/// One glyph visual's state for a single frame.
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphFrame {
    pub element_id: ElementId,
    pub index: usize,
    pub state: VisualState,
}

/// A single frame's composition instructions.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameComposition {
    pub time_ms: f64,
    pub elements: Vec<ElementFrame>,
    pub glyphs: Vec<GlyphFrame>,
}

impl FrameComposition {
    /// Ids of visible elements, in paint order.
    pub fn visible_ids(&self) -> Vec<&ElementId> {
        self.elements
            .iter()
            .filter(|frame| frame.state.visible)
            .map(|frame| &frame.element_id)
            .collect()
    }

    pub fn element(&self, id: &ElementId) -> Option<&ElementFrame> {
        self.elements.iter().find(|frame| &frame.element_id == id)
    }

    pub fn glyph(&self, id: &ElementId, index: usize) -> Option<&GlyphFrame> {
        self.glyphs
            .iter()
            .find(|frame| &frame.element_id == id && frame.index == index)
    }
}

/// Compose the frame at `time_ms`.
pub fn compose_frame(
    elements: &[Element],
    timeline: &AnimationTimeline,
    time_ms: f64,
    playing: bool,
) -> FrameComposition {
    let sample = timeline.seek(time_ms);
    let mut frames = Vec::with_capacity(elements.len());
    let mut glyphs = Vec::new();

    for element in elements {
        let visible = element.time_frame.contains(time_ms);
        let animated = sample.element(&element.id).copied().unwrap_or_default();
        let placement = &element.placement;
        let (scale_x, scale_y) = animated
            .scale
            .unwrap_or((placement.scale_x, placement.scale_y));

        let state = VisualState {
            visible,
            opacity: animated.opacity.unwrap_or(1.0),
            position: animated.position.unwrap_or_else(|| placement.origin()),
            scale_x,
            scale_y,
            clip: timeline.clip_for(&element.id).copied(),
        };

        for layer in timeline.glyph_layers_for(&element.id) {
            let glyph = sample
                .glyph(&element.id, layer.index)
                .copied()
                .unwrap_or_default();
            glyphs.push(GlyphFrame {
                element_id: element.id.clone(),
                index: layer.index,
                state: glyph_state(&glyph, placement.origin(), layer.offset, visible, state.clip),
            });
        }

        frames.push(ElementFrame {
            element_id: element.id.clone(),
            state,
            cue: media_cue(element, time_ms, playing),
        });
    }

    FrameComposition {
        time_ms,
        elements: frames,
        glyphs,
    }
}

/// Glyphs stay hidden unless a track drives their opacity.
fn glyph_state(
    animated: &VisualOverride,
    origin: Point2D,
    offset: Point2D,
    parent_visible: bool,
    clip: Option<ClipRect>,
) -> VisualState {
    let (scale_x, scale_y) = animated.scale.unwrap_or((1.0, 1.0));
    VisualState {
        visible: parent_visible,
        opacity: animated.opacity.unwrap_or(0.0),
        position: animated
            .position
            .unwrap_or_else(|| origin.offset(offset.x, offset.y)),
        scale_x,
        scale_y,
        clip,
    }
}

fn media_cue(element: &Element, time_ms: f64, playing: bool) -> Option<MediaCue> {
    let into_element = time_ms - element.time_frame.start;
    match &element.properties {
        ElementProperties::Video(video) => Some(MediaCue {
            position_ms: into_element + video.media_offset_ms,
            playing,
            volume: 1.0,
            muted: false,
        }),
        ElementProperties::Audio(audio) => Some(MediaCue {
            position_ms: into_element,
            playing,
            volume: audio.volume,
            muted: audio.muted,
        }),
        ElementProperties::Image(_)
        | ElementProperties::Text(_)
        | ElementProperties::MathPlot(_) => None,
    }
}
