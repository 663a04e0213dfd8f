//! Compiling animation declarations into the global timeline.
//!
//! Compilation is total: every scene edit rebuilds the timeline from the
//! element list and the declarations. Declarations that cannot produce a
//! positive-length track (missing target, degenerate element frame,
//! non-positive duration, no room for a breathe pulse) are skipped.

use std::collections::HashMap;
use std::sync::Arc;

use clipweave_project_model::{
    Animation, AnimationKind, Element, ElementId, ElementProperties, Placement, Point2D,
    SlideDirection, SlideProperties, TextProperties, TextSplit,
};

use crate::glyph::{GlyphLayer, GlyphLayout, MonospaceLayout};
use crate::timeline::{AnimationTimeline, TimelineSample};
use crate::track::{Track, TrackTarget};

/// Margin added around the placed rectangle for slide reveal masks.
pub const CLIP_MARGIN: f64 = 50.0;

/// Length of the parent/glyph opacity swap around a character slide.
pub const GLYPH_SWAP_MS: f64 = 1.0;

/// Beats per minute of the breathe pulse.
const BREATHE_BPM: f64 = 72.0;

/// Peak scale factor of a breathe pulse.
pub const BREATHE_SCALE: f64 = 1.05;

/// One breathe cycle (scale up and back) in milliseconds.
pub fn breathe_period_ms() -> f64 {
    1000.0 * 60.0 / BREATHE_BPM * 4.0
}

/// Scene facts the compiler needs beyond elements and declarations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompileContext {
    pub canvas_width: f64,
    pub canvas_height: f64,
}

impl CompileContext {
    pub fn new(canvas_width: f64, canvas_height: f64) -> Self {
        Self {
            canvas_width,
            canvas_height,
        }
    }
}

/// Build a timeline from scratch.
pub fn compile_timeline(
    elements: &[Element],
    animations: &[Animation],
    ctx: &CompileContext,
    layout: &dyn GlyphLayout,
) -> AnimationTimeline {
    let by_id: HashMap<&ElementId, &Element> = elements.iter().map(|e| (&e.id, e)).collect();
    let mut timeline = AnimationTimeline::new();

    for animation in animations {
        let Some(element) = by_id.get(&animation.target_id).copied() else {
            tracing::debug!(
                animation = %animation.id,
                target = %animation.target_id,
                "Skipping animation with missing target"
            );
            continue;
        };
        if element.time_frame.is_degenerate() {
            tracing::debug!(
                animation = %animation.id,
                element = %element.id,
                "Skipping animation on degenerate time frame"
            );
            continue;
        }
        if animation.kind != AnimationKind::Breathe && !has_length(animation.duration_ms) {
            tracing::debug!(
                animation = %animation.id,
                duration_ms = animation.duration_ms,
                "Skipping animation with non-positive duration"
            );
            continue;
        }

        match &animation.kind {
            AnimationKind::FadeIn => timeline.push(Track::opacity(
                animation.id.clone(),
                TrackTarget::element(element.id.clone()),
                element.time_frame.start,
                animation.duration_ms,
                0.0,
                1.0,
            )),
            AnimationKind::FadeOut => timeline.push(Track::opacity(
                animation.id.clone(),
                TrackTarget::element(element.id.clone()),
                element.time_frame.end - animation.duration_ms,
                animation.duration_ms,
                1.0,
                0.0,
            )),
            AnimationKind::SlideIn(props) => compile_slide(
                &mut timeline,
                animation,
                element,
                props,
                SlidePhase::In,
                ctx,
                layout,
            ),
            AnimationKind::SlideOut(props) => compile_slide(
                &mut timeline,
                animation,
                element,
                props,
                SlidePhase::Out,
                ctx,
                layout,
            ),
            AnimationKind::Breathe => compile_breathe(&mut timeline, animation, element, animations),
        }
    }

    tracing::debug!(
        tracks = timeline.track_count(),
        glyphs = timeline.glyph_layers().len(),
        "Compiled animation timeline"
    );
    timeline
}

fn has_length(duration_ms: f64) -> bool {
    duration_ms.is_finite() && duration_ms > 0.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SlidePhase {
    In,
    Out,
}

/// Where a slide starts (in) or ends (out).
fn off_canvas_point(placement: &Placement, direction: SlideDirection, ctx: &CompileContext) -> Point2D {
    match direction {
        SlideDirection::Left => Point2D::new(-placement.width, placement.y),
        SlideDirection::Right => Point2D::new(ctx.canvas_width, placement.y),
        SlideDirection::Top => Point2D::new(placement.x, -placement.height),
        SlideDirection::Bottom => Point2D::new(placement.x, ctx.canvas_height),
    }
}

fn compile_slide(
    timeline: &mut AnimationTimeline,
    animation: &Animation,
    element: &Element,
    props: &SlideProperties,
    phase: SlidePhase,
    ctx: &CompileContext,
    layout: &dyn GlyphLayout,
) {
    let duration = animation.duration_ms;
    let anchor = match phase {
        SlidePhase::In => element.time_frame.start,
        SlidePhase::Out => element.time_frame.end - duration,
    };
    let placed = element.placement.origin();
    let off = off_canvas_point(&element.placement, props.direction, ctx);

    if props.use_clip_path {
        timeline.set_clip(element.id.clone(), element.placement.inflate(CLIP_MARGIN));
    }

    if props.text_split == TextSplit::Character {
        if let ElementProperties::Text(text) = &element.properties {
            let glyphs = split_glyphs(element, text, layout);
            if !glyphs.is_empty() {
                compile_glyph_slide(timeline, animation, element, &glyphs, anchor, placed, off, phase);
                timeline.add_glyphs(&element.id, glyphs);
                return;
            }
        }
    }

    let (from, to) = match phase {
        SlidePhase::In => (off, placed),
        SlidePhase::Out => (placed, off),
    };
    timeline.push(Track::position(
        animation.id.clone(),
        TrackTarget::element(element.id.clone()),
        anchor,
        duration,
        from,
        to,
    ));
}

/// Lay out a text element into glyph layers with scaled offsets.
fn split_glyphs(element: &Element, text: &TextProperties, layout: &dyn GlyphLayout) -> Vec<GlyphLayer> {
    let placement = &element.placement;
    let line_height = layout.line_height(text.font_size);
    layout
        .layout(&text.text, text.font_size, placement.width)
        .into_iter()
        .enumerate()
        .map(|(index, glyph)| GlyphLayer {
            element_id: element.id.clone(),
            index,
            grapheme: glyph.grapheme,
            offset: Point2D::new(
                glyph.left * placement.scale_x,
                glyph.line as f64 * line_height * placement.scale_y,
            ),
            font_size: text.font_size,
            font_weight: text.font_weight,
            fill: text.fill.clone(),
            scale_x: placement.scale_x,
            scale_y: placement.scale_y,
        })
        .collect()
}

#[allow(clippy::too_many_arguments)]
fn compile_glyph_slide(
    timeline: &mut AnimationTimeline,
    animation: &Animation,
    element: &Element,
    glyphs: &[GlyphLayer],
    anchor: f64,
    placed: Point2D,
    off: Point2D,
    phase: SlidePhase,
) {
    let duration = animation.duration_ms;
    let glyph_duration = duration / 2.0;
    let stagger = glyph_duration / glyphs.len() as f64;
    let parent = TrackTarget::element(element.id.clone());

    // Parent hides while its glyphs are on screen.
    timeline.push(Track::opacity(
        animation.id.clone(),
        parent.clone(),
        anchor,
        GLYPH_SWAP_MS,
        1.0,
        0.0,
    ));
    timeline.push(Track::opacity(
        animation.id.clone(),
        parent,
        anchor + duration,
        GLYPH_SWAP_MS,
        0.0,
        1.0,
    ));

    for glyph in glyphs {
        let target = TrackTarget::glyph(element.id.clone(), glyph.index);
        let home = placed.offset(glyph.offset.x, glyph.offset.y);
        let away = off.offset(glyph.offset.x, glyph.offset.y);
        let (from, to) = match phase {
            SlidePhase::In => (away, home),
            SlidePhase::Out => (home, away),
        };

        timeline.push(Track::opacity(
            animation.id.clone(),
            target.clone(),
            anchor,
            GLYPH_SWAP_MS,
            0.0,
            1.0,
        ));
        timeline.push(Track::opacity(
            animation.id.clone(),
            target.clone(),
            anchor + duration,
            GLYPH_SWAP_MS,
            1.0,
            0.0,
        ));
        timeline.push(Track::position(
            animation.id.clone(),
            target,
            anchor + glyph.index as f64 * stagger,
            glyph_duration,
            from,
            to,
        ));
    }
}

fn compile_breathe(
    timeline: &mut AnimationTimeline,
    animation: &Animation,
    element: &Element,
    animations: &[Animation],
) {
    let siblings = || {
        animations
            .iter()
            .filter(|a| a.target_id == element.id && has_length(a.duration_ms))
    };
    let slide_in = siblings()
        .find(|a| matches!(a.kind, AnimationKind::SlideIn(_)))
        .map(|a| a.duration_ms)
        .unwrap_or(0.0);
    let slide_out = siblings()
        .find(|a| matches!(a.kind, AnimationKind::SlideOut(_)))
        .map(|a| a.duration_ms)
        .unwrap_or(0.0);

    let begin = element.time_frame.start + slide_in;
    let end = element.time_frame.end - slide_out;
    if begin > end {
        tracing::debug!(animation = %animation.id, "No room between slides for breathe");
        return;
    }

    let available = end - begin;
    let period = breathe_period_ms();
    let pulses = (available / period).floor();
    if pulses < 1.0 {
        tracing::debug!(
            animation = %animation.id,
            available_ms = available,
            "Breathe interval shorter than one pulse"
        );
        return;
    }
    let adjusted = period + (available - pulses * period) / pulses;
    let half = adjusted / 2.0;

    let base = (element.placement.scale_x, element.placement.scale_y);
    let peak = (base.0 * BREATHE_SCALE, base.1 * BREATHE_SCALE);
    let target = TrackTarget::element(element.id.clone());

    for i in 0..pulses as usize {
        let start = begin + i as f64 * adjusted;
        timeline.push(Track::scale(animation.id.clone(), target.clone(), start, half, base, peak));
        timeline.push(Track::scale(
            animation.id.clone(),
            target.clone(),
            start + half,
            half,
            peak,
            base,
        ));
    }
}

/// Owns the compiled timeline and recompiles it on demand.
pub struct AnimationScheduler {
    layout: Arc<dyn GlyphLayout>,
    timeline: AnimationTimeline,
}

impl Default for AnimationScheduler {
    fn default() -> Self {
        Self::new(Arc::new(MonospaceLayout::default()))
    }
}

impl AnimationScheduler {
    pub fn new(layout: Arc<dyn GlyphLayout>) -> Self {
        Self {
            layout,
            timeline: AnimationTimeline::new(),
        }
    }

    /// Discard the current timeline and compile a new one.
    pub fn recompile(&mut self, elements: &[Element], animations: &[Animation], ctx: &CompileContext) {
        self.timeline = compile_timeline(elements, animations, ctx, self.layout.as_ref());
    }

    pub fn seek(&self, time_ms: f64) -> TimelineSample {
        self.timeline.seek(time_ms)
    }

    pub fn timeline(&self) -> &AnimationTimeline {
        &self.timeline
    }

    pub fn clear(&mut self) {
        self.timeline = AnimationTimeline::new();
    }
}

impl std::fmt::Debug for AnimationScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnimationScheduler")
            .field("tracks", &self.timeline.track_count())
            .finish_non_exhaustive()
    }
}
