//! Quadratic flight curves played back against the wall clock
//!
//! A curve is stamped with the host time it started at. Sampling compares
//! against the current host time, so a paused host does not stretch the
//! curve: on resume the entity jumps to where the curve says it should be.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Three control points plus a wall-clock start and duration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Curve {
    pub p0: Vec2,
    pub p1: Vec2,
    pub p2: Vec2,
    pub start_ms: f64,
    pub duration_ms: f64,
}

impl Curve {
    pub fn new(p0: Vec2, p1: Vec2, p2: Vec2, start_ms: f64, duration_ms: f64) -> Self {
        Self {
            p0,
            p1,
            p2,
            start_ms,
            duration_ms,
        }
    }

    /// Normalized playback position in [0, 1]
    pub fn progress(&self, now_ms: f64) -> f32 {
        if self.duration_ms <= 0.0 {
            return 1.0;
        }
        ((now_ms - self.start_ms) / self.duration_ms).clamp(0.0, 1.0) as f32
    }

    /// Point on the curve at parameter `t`
    #[inline]
    pub fn point_at(&self, t: f32) -> Vec2 {
        let u = 1.0 - t;
        self.p0 * (u * u) + self.p1 * (2.0 * u * t) + self.p2 * (t * t)
    }

    #[inline]
    pub fn sample(&self, now_ms: f64) -> Vec2 {
        self.point_at(self.progress(now_ms))
    }

    #[inline]
    pub fn is_complete(&self, now_ms: f64) -> bool {
        self.progress(now_ms) >= 1.0
    }

    /// Final point of the curve
    #[inline]
    pub fn end(&self) -> Vec2 {
        self.p2
    }
}

/// Cubic ease-out: fast start, gentle settle
#[inline]
pub fn ease_out_cubic(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(3)
}
