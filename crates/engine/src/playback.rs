//! The playback clock.
//!
//! While playing, logical time is `anchor_logical + (now - anchor_wall)`.
//! Every start of playback takes a fresh anchor, so seeks never
//! accumulate drift.

use std::sync::Arc;

use clipweave_common::clock::{frame_to_ms, ms_to_frame, WallClock};

/// State of the playback clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Stopped,
    Playing,
}

/// Result of one playback tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// Not playing; nothing happened.
    Idle,
    /// Time moved to the contained value.
    Advanced(f64),
    /// Time ran past the end; the clock stopped and rewound.
    Finished,
}

pub struct PlaybackClock {
    wall: Arc<dyn WallClock>,
    state: PlaybackState,
    anchor_wall_ms: f64,
    anchor_logical_ms: f64,
    time_ms: f64,
    key_frame: u64,
    fps: u32,
    max_time_ms: f64,
}

impl PlaybackClock {
    pub fn new(wall: Arc<dyn WallClock>, fps: u32, max_time_ms: f64) -> Self {
        Self {
            wall,
            state: PlaybackState::Stopped,
            anchor_wall_ms: 0.0,
            anchor_logical_ms: 0.0,
            time_ms: 0.0,
            key_frame: 0,
            fps,
            max_time_ms,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    /// Exact playhead, used for sampling visuals.
    pub fn time_ms(&self) -> f64 {
        self.time_ms
    }

    /// Playhead snapped to the start of its key frame.
    pub fn current_time_ms(&self) -> f64 {
        frame_to_ms(self.key_frame, self.fps)
    }

    pub fn current_key_frame(&self) -> u64 {
        self.key_frame
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    pub fn max_time_ms(&self) -> f64 {
        self.max_time_ms
    }

    /// Start playing from the current playhead. No-op when already playing.
    pub fn play(&mut self) {
        if self.is_playing() {
            return;
        }
        self.anchor_wall_ms = self.wall.now_ms();
        self.anchor_logical_ms = self.time_ms;
        self.state = PlaybackState::Playing;
        tracing::debug!(from_ms = self.time_ms, "Playback started");
    }

    pub fn pause(&mut self) {
        if self.is_playing() {
            self.state = PlaybackState::Stopped;
            tracing::debug!(at_ms = self.time_ms, "Playback paused");
        }
    }

    /// Advance from the wall clock.
    pub fn tick(&mut self) -> TickOutcome {
        if !self.is_playing() {
            return TickOutcome::Idle;
        }
        let elapsed = self.wall.now_ms() - self.anchor_wall_ms;
        let next = self.anchor_logical_ms + elapsed;
        if next > self.max_time_ms {
            self.state = PlaybackState::Stopped;
            self.set_time(0.0);
            tracing::debug!(max_time_ms = self.max_time_ms, "Playback reached the end");
            return TickOutcome::Finished;
        }
        self.set_time(next);
        TickOutcome::Advanced(next)
    }

    /// Move the playhead, stopping playback first.
    pub fn seek(&mut self, time_ms: f64) {
        self.pause();
        let upper = self.max_time_ms.max(0.0);
        let time_ms = if time_ms.is_nan() { 0.0 } else { time_ms.clamp(0.0, upper) };
        self.set_time(time_ms);
    }

    pub fn set_fps(&mut self, fps: u32) {
        self.fps = fps;
        self.key_frame = ms_to_frame(self.time_ms, fps);
    }

    /// Change the project length, pulling the playhead back inside it.
    pub fn set_max_time(&mut self, max_time_ms: f64) {
        self.max_time_ms = max_time_ms;
        if self.time_ms > max_time_ms {
            self.seek(max_time_ms);
        }
    }

    /// Stop and rewind to zero with new project timing.
    pub fn reset(&mut self, fps: u32, max_time_ms: f64) {
        self.state = PlaybackState::Stopped;
        self.fps = fps;
        self.max_time_ms = max_time_ms;
        self.set_time(0.0);
    }

    fn set_time(&mut self, time_ms: f64) {
        self.time_ms = time_ms;
        self.key_frame = ms_to_frame(time_ms, self.fps);
    }
}

impl std::fmt::Debug for PlaybackClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackClock")
            .field("state", &self.state)
            .field("time_ms", &self.time_ms)
            .field("key_frame", &self.key_frame)
            .field("fps", &self.fps)
            .field("max_time_ms", &self.max_time_ms)
            .finish()
    }
}
