//! Compiled animation tracks.
//!
//! A track is one linear interpolation of one channel of one target over
//! an absolute time window.

use clipweave_project_model::{AnimationId, ElementId, Point2D};
use serde::Serialize;

/// What a track drives: a whole element, or one glyph split from a text
/// element.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(tag = "target", rename_all = "snake_case")]
pub enum TrackTarget {
    Element { id: ElementId },
    Glyph { id: ElementId, index: usize },
}

impl TrackTarget {
    pub fn element(id: ElementId) -> Self {
        Self::Element { id }
    }

    pub fn glyph(id: ElementId, index: usize) -> Self {
        Self::Glyph { id, index }
    }

    /// Element the target belongs to.
    pub fn element_id(&self) -> &ElementId {
        match self {
            Self::Element { id } | Self::Glyph { id, .. } => id,
        }
    }
}

/// Animatable property of a visual.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Opacity,
    Position,
    Scale,
}

/// A value on one channel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelValue {
    Opacity(f64),
    Position(Point2D),
    Scale { x: f64, y: f64 },
}

impl ChannelValue {
    pub fn channel(&self) -> Channel {
        match self {
            Self::Opacity(_) => Channel::Opacity,
            Self::Position(_) => Channel::Position,
            Self::Scale { .. } => Channel::Scale,
        }
    }

    /// Interpolate towards `to`. Mismatched channels snap to `to`.
    fn lerp(&self, to: &ChannelValue, t: f64) -> ChannelValue {
        let t = t.clamp(0.0, 1.0);
        match (self, to) {
            (Self::Opacity(a), Self::Opacity(b)) => Self::Opacity(a + (b - a) * t),
            (Self::Position(a), Self::Position(b)) => Self::Position(Point2D::lerp(a, b, t)),
            (Self::Scale { x: ax, y: ay }, Self::Scale { x: bx, y: by }) => Self::Scale {
                x: ax + (bx - ax) * t,
                y: ay + (by - ay) * t,
            },
            _ => *to,
        }
    }
}

/// One linear tween placed on the global timeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Track {
    /// Declaration this track was compiled from.
    pub animation_id: AnimationId,
    pub target: TrackTarget,
    /// Absolute start on the project timeline (ms).
    pub start_ms: f64,
    pub duration_ms: f64,
    pub from: ChannelValue,
    pub to: ChannelValue,
}

impl Track {
    fn new(
        animation_id: AnimationId,
        target: TrackTarget,
        start_ms: f64,
        duration_ms: f64,
        from: ChannelValue,
        to: ChannelValue,
    ) -> Self {
        Self {
            animation_id,
            target,
            start_ms,
            duration_ms,
            from,
            to,
        }
    }

    pub fn opacity(
        animation_id: AnimationId,
        target: TrackTarget,
        start_ms: f64,
        duration_ms: f64,
        from: f64,
        to: f64,
    ) -> Self {
        Self::new(
            animation_id,
            target,
            start_ms,
            duration_ms,
            ChannelValue::Opacity(from),
            ChannelValue::Opacity(to),
        )
    }

    pub fn position(
        animation_id: AnimationId,
        target: TrackTarget,
        start_ms: f64,
        duration_ms: f64,
        from: Point2D,
        to: Point2D,
    ) -> Self {
        Self::new(
            animation_id,
            target,
            start_ms,
            duration_ms,
            ChannelValue::Position(from),
            ChannelValue::Position(to),
        )
    }

    pub fn scale(
        animation_id: AnimationId,
        target: TrackTarget,
        start_ms: f64,
        duration_ms: f64,
        from: (f64, f64),
        to: (f64, f64),
    ) -> Self {
        Self::new(
            animation_id,
            target,
            start_ms,
            duration_ms,
            ChannelValue::Scale {
                x: from.0,
                y: from.1,
            },
            ChannelValue::Scale { x: to.0, y: to.1 },
        )
    }

    pub fn channel(&self) -> Channel {
        self.from.channel()
    }

    pub fn end_ms(&self) -> f64 {
        self.start_ms + self.duration_ms
    }

    /// Interpolated value at `time_ms`, clamped to the track's window.
    pub fn value_at(&self, time_ms: f64) -> ChannelValue {
        if self.duration_ms <= 0.0 {
            return self.to;
        }
        let progress = (time_ms - self.start_ms) / self.duration_ms;
        self.from.lerp(&self.to, progress)
    }
}
