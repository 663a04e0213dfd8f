//! The compiled, seekable animation timeline.
//!
//! Tracks are grouped into lanes, one lane per (target, channel). Within a
//! lane tracks are ordered by start time, ties kept in compile order.
//! Sampling a lane at `t` takes the last track that has started by `t`;
//! before any track has started the earliest one holds its `from` value.
//! Each lane is resolved with a binary search, so a seek costs the same
//! whether it lands at the start of the project or an hour in.

use std::collections::BTreeMap;

use clipweave_project_model::{ClipRect, ElementId, Point2D};
use serde::Serialize;

use crate::glyph::GlyphLayer;
use crate::track::{Channel, ChannelValue, Track, TrackTarget};

/// All compiled tracks, clip masks and glyph layers of a project.
#[derive(Debug, Clone, Default)]
pub struct AnimationTimeline {
    lanes: BTreeMap<(TrackTarget, Channel), Vec<Track>>,
    clips: BTreeMap<ElementId, ClipRect>,
    glyphs: Vec<GlyphLayer>,
}

/// Animated values of one target at one instant. `None` means no track
/// drives that channel; the placed value applies.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct VisualOverride {
    pub opacity: Option<f64>,
    pub position: Option<Point2D>,
    pub scale: Option<(f64, f64)>,
}

impl VisualOverride {
    fn set(&mut self, value: ChannelValue) {
        match value {
            ChannelValue::Opacity(v) => self.opacity = Some(v),
            ChannelValue::Position(p) => self.position = Some(p),
            ChannelValue::Scale { x, y } => self.scale = Some((x, y)),
        }
    }
}

/// Result of seeking the timeline.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct TimelineSample {
    pub time_ms: f64,
    pub targets: BTreeMap<TrackTarget, VisualOverride>,
}

impl TimelineSample {
    pub fn get(&self, target: &TrackTarget) -> Option<&VisualOverride> {
        self.targets.get(target)
    }

    pub fn element(&self, id: &ElementId) -> Option<&VisualOverride> {
        self.targets.get(&TrackTarget::element(id.clone()))
    }

    pub fn glyph(&self, id: &ElementId, index: usize) -> Option<&VisualOverride> {
        self.targets.get(&TrackTarget::glyph(id.clone(), index))
    }
}

impl AnimationTimeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a track after every track of its lane starting at or before it.
    pub fn push(&mut self, track: Track) {
        let lane = self
            .lanes
            .entry((track.target.clone(), track.channel()))
            .or_default();
        let at = lane.partition_point(|t| t.start_ms <= track.start_ms);
        lane.insert(at, track);
    }

    pub fn set_clip(&mut self, id: ElementId, clip: ClipRect) {
        self.clips.insert(id, clip);
    }

    /// Register glyph layers for an element unless it already has some.
    pub fn add_glyphs(&mut self, id: &ElementId, layers: Vec<GlyphLayer>) {
        if self.glyphs.iter().any(|g| &g.element_id == id) {
            return;
        }
        self.glyphs.extend(layers);
    }

    /// Sample every lane at `time_ms`. Pure: the timeline is not modified.
    pub fn seek(&self, time_ms: f64) -> TimelineSample {
        let mut targets: BTreeMap<TrackTarget, VisualOverride> = BTreeMap::new();
        for ((target, _), lane) in &self.lanes {
            let Some(value) = sample_lane(lane, time_ms) else {
                continue;
            };
            targets.entry(target.clone()).or_default().set(value);
        }
        TimelineSample { time_ms, targets }
    }

    pub fn tracks(&self) -> impl Iterator<Item = &Track> {
        self.lanes.values().flatten()
    }

    /// Tracks driving `target`, all channels, each lane in start order.
    pub fn tracks_for<'a>(&'a self, target: &'a TrackTarget) -> impl Iterator<Item = &'a Track> {
        self.lanes
            .iter()
            .filter(move |((t, _), _)| t == target)
            .flat_map(|(_, lane)| lane.iter())
    }

    pub fn lane(&self, target: &TrackTarget, channel: Channel) -> &[Track] {
        self.lanes
            .get(&(target.clone(), channel))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn track_count(&self) -> usize {
        self.lanes.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lanes.is_empty()
    }

    pub fn clip_for(&self, id: &ElementId) -> Option<&ClipRect> {
        self.clips.get(id)
    }

    pub fn glyph_layers(&self) -> &[GlyphLayer] {
        &self.glyphs
    }

    pub fn glyph_layers_for<'a>(&'a self, id: &'a ElementId) -> impl Iterator<Item = &'a GlyphLayer> {
        self.glyphs.iter().filter(move |g| &g.element_id == id)
    }
}

fn sample_lane(lane: &[Track], time_ms: f64) -> Option<ChannelValue> {
    let started = lane.partition_point(|t| t.start_ms <= time_ms);
    if started == 0 {
        return lane.first().map(|t| t.from);
    }
    Some(lane[started - 1].value_at(time_ms))
}
