//! Swarm Siege - combat simulation core for a formation-and-dive arcade shooter
//!
//! Core modules:
//! - `sim`: Tick-driven simulation (hostiles, bosses, waves, pools, collisions)
//! - `balance`: Data-driven difficulty knobs and presets
//! - `presentation`: Narrow show/hide hooks the host renderer implements

pub mod balance;
pub mod presentation;
pub mod sim;

pub use balance::{Balance, BalanceError, DifficultyPreset};
pub use presentation::{NullPresentation, Presentation, Visual};

use glam::Vec2;

/// Game configuration constants
///
/// Time is measured two ways: `delta` in nominal frames (1.0 = one 60 Hz
/// frame) for tick-accumulated timers, and host wall-clock milliseconds for
/// curve playback and telegraphs.
pub mod consts {
    /// Playfield dimensions (y grows downward)
    pub const WORLD_WIDTH: f32 = 800.0;
    pub const WORLD_HEIGHT: f32 = 600.0;
    /// Items further than this outside the playfield are expired
    pub const OFFSCREEN_MARGIN: f32 = 48.0;

    /// Milliseconds in one nominal frame
    pub const FRAME_MS: f64 = 1000.0 / 60.0;

    /// Hostiles only fire while inside this vertical band
    pub const FIRE_BAND_TOP: f32 = 0.0;
    pub const FIRE_BAND_BOTTOM: f32 = WORLD_HEIGHT * 0.8;

    /// Collision radii
    pub const PLAYER_RADIUS: f32 = 14.0;
    pub const PROJECTILE_RADIUS: f32 = 4.0;
    pub const PICKUP_RADIUS: f32 = 12.0;
    pub const BOSS_RADIUS: f32 = 56.0;

    /// Formation grid (anchors for basic hostiles)
    pub const FORMATION_COLS: u32 = 8;
    pub const FORMATION_ROWS: u32 = 4;
    pub const FORMATION_LEFT: f32 = 120.0;
    pub const FORMATION_TOP: f32 = 80.0;
    pub const FORMATION_SPACING_X: f32 = 80.0;
    pub const FORMATION_SPACING_Y: f32 = 52.0;
    /// Grid slots; also the most basic hostiles alive at once
    pub const FORMATION_SLOTS: usize = (FORMATION_COLS * FORMATION_ROWS) as usize;

    /// Boss lane (where the entry ease-in settles)
    pub const BOSS_LANE_Y: f32 = 140.0;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Angle of the vector pointing from `from` toward `to`
#[inline]
pub fn aim_angle(from: Vec2, to: Vec2) -> f32 {
    let d = to - from;
    d.y.atan2(d.x)
}

/// Replace a non-finite scalar with `default`, then clamp to `[min, max]`
#[inline]
pub fn sanitize_scalar(value: f32, default: f32, min: f32, max: f32) -> f32 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        default
    }
}

/// True when `pos` lies within the playfield grown by `margin` on every side
#[inline]
pub fn within_world(pos: Vec2, margin: f32) -> bool {
    pos.x >= -margin
        && pos.x <= consts::WORLD_WIDTH + margin
        && pos.y >= -margin
        && pos.y <= consts::WORLD_HEIGHT + margin
}
