//! Wall clocks and frame/time conversions for the playback loop.
//!
//! The playback clock never reads the system time directly. It asks a
//! [`WallClock`] for "now" in milliseconds, which lets the interactive
//! editor use a monotonic clock while tests and offline export drive time
//! by hand.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Source of wall-clock milliseconds.
pub trait WallClock: Send + Sync {
    /// Milliseconds since an arbitrary, fixed origin.
    fn now_ms(&self) -> f64;
}

/// Monotonic clock anchored at construction time.
#[derive(Debug, Clone)]
pub struct SystemClock {
    epoch: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl WallClock for SystemClock {
    fn now_ms(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64() * 1000.0
    }
}

/// A clock that only moves when told to.
///
/// Clones share the same underlying time, so a test can keep one handle
/// and give another to the engine.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now_bits: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new(start_ms: f64) -> Self {
        Self {
            now_bits: Arc::new(AtomicU64::new(start_ms.to_bits())),
        }
    }

    pub fn set_ms(&self, ms: f64) {
        self.now_bits.store(ms.to_bits(), Ordering::SeqCst);
    }

    pub fn advance_ms(&self, delta_ms: f64) {
        self.set_ms(self.now_ms() + delta_ms);
    }
}

impl WallClock for ManualClock {
    fn now_ms(&self) -> f64 {
        f64::from_bits(self.now_bits.load(Ordering::SeqCst))
    }
}

/// Frame index containing `ms` at the given rate (floored).
pub fn ms_to_frame(ms: f64, fps: u32) -> u64 {
    if ms <= 0.0 || fps == 0 {
        return 0;
    }
    (ms / 1000.0 * fps as f64).floor() as u64
}

/// Start time of `frame` in milliseconds.
pub fn frame_to_ms(frame: u64, fps: u32) -> f64 {
    if fps == 0 {
        return 0.0;
    }
    frame as f64 * 1000.0 / fps as f64
}

/// Number of frames needed to cover `duration_ms`.
pub fn frame_count(duration_ms: f64, fps: u32) -> u64 {
    if duration_ms <= 0.0 || fps == 0 {
        return 0;
    }
    (duration_ms / 1000.0 * fps as f64).ceil() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_is_monotonic() {
        let clock = SystemClock::new();
        let a = clock.now_ms();
        let b = clock.now_ms();
        assert!(b >= a);
        assert!(a < 1000.0);
    }

    #[test]
    fn test_manual_clock_shares_time_between_clones() {
        let clock = ManualClock::new(100.0);
        let other = clock.clone();
        clock.advance_ms(250.0);
        assert_eq!(other.now_ms(), 350.0);
        other.set_ms(0.0);
        assert_eq!(clock.now_ms(), 0.0);
    }

    #[test]
    fn test_frame_conversions() {
        assert_eq!(ms_to_frame(500.0, 60), 30);
        assert_eq!(ms_to_frame(16.0, 60), 0);
        assert_eq!(ms_to_frame(-5.0, 60), 0);
        assert!((frame_to_ms(30, 60) - 500.0).abs() < 1e-9);
        assert_eq!(frame_count(1000.0, 30), 30);
        assert_eq!(frame_count(1001.0, 30), 31);
        assert_eq!(frame_count(0.0, 30), 0);
    }
}
