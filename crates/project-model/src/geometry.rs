//! Placement, time-frame and point types.
//!
//! Positions and sizes are in scene units (canvas pixels); times are
//! milliseconds from project start.

use serde::{Deserialize, Serialize};

/// A 2D point in scene units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Component-wise offset.
    pub fn offset(&self, dx: f64, dy: f64) -> Point2D {
        Point2D::new(self.x + dx, self.y + dy)
    }

    /// Linear interpolation between two points.
    pub fn lerp(a: &Point2D, b: &Point2D, t: f64) -> Point2D {
        let t = t.clamp(0.0, 1.0);
        Point2D {
            x: a.x + (b.x - a.x) * t,
            y: a.y + (b.y - a.y) * t,
        }
    }
}

/// Geometric transform of an element.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Unscaled width.
    pub width: f64,
    /// Unscaled height.
    pub height: f64,
    /// Rotation in degrees.
    #[serde(default)]
    pub rotation: f64,
    #[serde(default = "unit_scale")]
    pub scale_x: f64,
    #[serde(default = "unit_scale")]
    pub scale_y: f64,
}

fn unit_scale() -> f64 {
    1.0
}

impl Placement {
    /// Unrotated, unscaled placement.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            rotation: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
        }
    }

    /// Top-left corner.
    pub fn origin(&self) -> Point2D {
        Point2D::new(self.x, self.y)
    }

    /// Rectangle grown by `margin` on every side.
    pub fn inflate(&self, margin: f64) -> ClipRect {
        ClipRect {
            x: self.x - margin,
            y: self.y - margin,
            width: self.width + margin * 2.0,
            height: self.height + margin * 2.0,
        }
    }
}

impl Default for Placement {
    fn default() -> Self {
        Self::new(0.0, 0.0, 100.0, 100.0)
    }
}

/// Absolutely positioned clipping rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClipRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Interval during which an element is active, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeFrame {
    pub start: f64,
    pub end: f64,
}

impl TimeFrame {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// A frame with no positive length. Such elements are never shown and
    /// carry no animation.
    pub fn is_degenerate(&self) -> bool {
        self.start.is_nan() || self.end.is_nan() || self.end <= self.start
    }

    /// Whether `time_ms` falls inside the frame, both ends inclusive.
    pub fn contains(&self, time_ms: f64) -> bool {
        !self.is_degenerate() && self.start <= time_ms && time_ms <= self.end
    }

    /// Clamp both ends into `[0, max_time]`.
    pub fn clamped(&self, max_time: f64) -> TimeFrame {
        let max_time = max_time.max(0.0);
        TimeFrame {
            start: self.start.clamp(0.0, max_time),
            end: self.end.clamp(0.0, max_time),
        }
    }

    /// Whether the frame satisfies `0 <= start < end <= max_time`.
    pub fn is_valid_within(&self, max_time: f64) -> bool {
        self.start >= 0.0 && self.start < self.end && self.end <= max_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_frame_contains_is_inclusive() {
        let frame = TimeFrame::new(0.0, 5000.0);
        assert!(frame.contains(0.0));
        assert!(frame.contains(2000.0));
        assert!(frame.contains(5000.0));
        assert!(!frame.contains(6000.0));
        assert!(!frame.contains(-1.0));
    }

    #[test]
    fn test_degenerate_frame_never_contains() {
        let frame = TimeFrame::new(1200.0, 1200.0);
        assert!(frame.is_degenerate());
        assert!(!frame.contains(1200.0));
        assert!(TimeFrame::new(10.0, 5.0).is_degenerate());
    }

    #[test]
    fn test_clamped_frame() {
        let frame = TimeFrame::new(-100.0, 40_000.0).clamped(30_000.0);
        assert_eq!(frame, TimeFrame::new(0.0, 30_000.0));
        assert!(frame.is_valid_within(30_000.0));
        assert!(!TimeFrame::new(0.0, 30_001.0).is_valid_within(30_000.0));
    }

    #[test]
    fn test_inflate_placement() {
        let clip = Placement::new(10.0, 20.0, 100.0, 50.0).inflate(50.0);
        assert_eq!(clip.x, -40.0);
        assert_eq!(clip.y, -30.0);
        assert_eq!(clip.width, 200.0);
        assert_eq!(clip.height, 150.0);
    }

    #[test]
    fn test_point_lerp_clamps() {
        let a = Point2D::new(0.0, 0.0);
        let b = Point2D::new(10.0, -10.0);
        assert_eq!(Point2D::lerp(&a, &b, 0.5), Point2D::new(5.0, -5.0));
        assert_eq!(Point2D::lerp(&a, &b, 2.0), b);
    }

    #[test]
    fn test_placement_scale_defaults_for_legacy_json() {
        let parsed: Placement =
            serde_json::from_str(r#"{"x":1,"y":2,"width":3,"height":4}"#).unwrap();
        assert_eq!(parsed.scale_x, 1.0);
        assert_eq!(parsed.scale_y, 1.0);
        assert_eq!(parsed.rotation, 0.0);
    }

    proptest::proptest! {
        #[test]
        fn prop_clamped_frame_stays_in_project(
            start in -1.0e6f64..1.0e6,
            end in -1.0e6f64..1.0e6,
            max in 0.0f64..1.0e6,
        ) {
            let frame = TimeFrame::new(start, end).clamped(max);
            proptest::prop_assert!(frame.start >= 0.0 && frame.start <= max);
            proptest::prop_assert!(frame.end >= 0.0 && frame.end <= max);
        }

        #[test]
        fn prop_degenerate_frames_contain_nothing(
            start in 0.0f64..1.0e5,
            shrink in 0.0f64..1.0e5,
            t in -1.0e5f64..2.0e5,
        ) {
            let frame = TimeFrame::new(start, start - shrink);
            proptest::prop_assert!(!frame.contains(t));
        }
    }
}
