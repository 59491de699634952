//! Basic hostile: formation-and-dive state machine
//!
//! ```text
//!   Entry ──curve done──▶ Formation ──dive roll──▶ Dive ──curve done──▶ Return
//!                            ▲                                             │
//!                            └──────────────────curve done─────────────────┘
//! ```
//!
//! Curve playback (Entry/Dive/Return) is wall-clock stamped. The fire cooldown
//! is tick-accumulated so it follows any slow-motion applied to `dt`.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::curve::Curve;
use super::pool::{EntityId, Pooled};
use super::projectile::{ProjectileStyle, Shot};
use super::tick::EntityContext;
use crate::consts::{FIRE_BAND_BOTTOM, FIRE_BAND_TOP, WORLD_WIDTH};
use crate::presentation::Visual;
use crate::{polar_to_cartesian, sanitize_scalar};

/// Entry flight time from spawn point to anchor
pub const ENTRY_DURATION_MS: f64 = 1600.0;
const ENTRY_SIDE_OFFSET: f32 = 220.0;
const ENTRY_DROP: f32 = 160.0;

/// Return flight time from dive end back to anchor
pub const RETURN_DURATION_MS: f64 = 2200.0;
/// How far outside the playfield the return control point sits
const RETURN_SIDE_OFFSET: f32 = 180.0;

/// Formation sway amplitude around the anchor
const FORMATION_SWAY_X: f32 = 12.0;
const FORMATION_SWAY_Y: f32 = 6.0;

/// Cooldown drains this much faster while diving
const DIVE_COOLDOWN_RATE: f32 = 2.0;
/// Max per-component jitter added to aimed shot velocity (pixels/frame)
const AIM_JITTER: f32 = 0.35;

/// Hostile archetypes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HostileKind {
    Scout,
    Striker,
    Brute,
    Weaver,
}

/// Per-archetype stats
#[derive(Debug, Clone, Copy)]
pub struct HostileProfile {
    pub health: f32,
    pub radius: f32,
    /// Pixels per frame before the balance scalar
    pub projectile_speed: f32,
    /// Frames between shots
    pub fire_cooldown: f32,
    pub score: u32,
    /// Shots per volley (spread by `volley_spread` radians)
    pub volley: u32,
    pub volley_spread: f32,
}

impl HostileKind {
    pub const ALL: [HostileKind; 4] = [
        HostileKind::Scout,
        HostileKind::Striker,
        HostileKind::Brute,
        HostileKind::Weaver,
    ];

    pub fn profile(&self) -> HostileProfile {
        match self {
            HostileKind::Scout => HostileProfile {
                health: 1.0,
                radius: 14.0,
                projectile_speed: 3.5,
                fire_cooldown: 150.0,
                score: 100,
                volley: 1,
                volley_spread: 0.0,
            },
            HostileKind::Striker => HostileProfile {
                health: 2.0,
                radius: 15.0,
                projectile_speed: 4.5,
                fire_cooldown: 120.0,
                score: 150,
                volley: 1,
                volley_spread: 0.0,
            },
            HostileKind::Brute => HostileProfile {
                health: 5.0,
                radius: 20.0,
                projectile_speed: 3.0,
                fire_cooldown: 180.0,
                score: 300,
                volley: 3,
                volley_spread: 0.25,
            },
            HostileKind::Weaver => HostileProfile {
                health: 3.0,
                radius: 16.0,
                projectile_speed: 4.0,
                fire_cooldown: 140.0,
                score: 250,
                volley: 2,
                volley_spread: 0.15,
            },
        }
    }
}

/// Dive flight archetypes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DivePattern {
    Straight,
    Spiral,
    Flank,
    Kamikaze,
}

impl DivePattern {
    pub const ALL: [DivePattern; 4] = [
        DivePattern::Straight,
        DivePattern::Spiral,
        DivePattern::Flank,
        DivePattern::Kamikaze,
    ];

    pub fn weight(&self) -> u32 {
        match self {
            DivePattern::Straight => 40,
            DivePattern::Spiral => 20,
            DivePattern::Flank => 25,
            DivePattern::Kamikaze => 15,
        }
    }

    pub fn duration_ms(&self) -> f64 {
        match self {
            DivePattern::Straight => 1800.0,
            DivePattern::Spiral => 2600.0,
            DivePattern::Flank => 2100.0,
            DivePattern::Kamikaze => 1000.0,
        }
    }

    pub fn roll(rng: &mut impl Rng) -> Self {
        let total: u32 = Self::ALL.iter().map(|p| p.weight()).sum();
        let mut roll = rng.random_range(0..total);
        for pattern in Self::ALL {
            if roll < pattern.weight() {
                return pattern;
            }
            roll -= pattern.weight();
        }
        DivePattern::Straight
    }

    /// Flight curve from `from` toward `target` (the player at dive start)
    pub fn curve(&self, from: Vec2, target: Vec2, now_ms: f64, rng: &mut impl Rng) -> Curve {
        let mid = from.lerp(target, 0.5);
        let (p1, p2) = match self {
            DivePattern::Straight => (mid, target + Vec2::new(0.0, 60.0)),
            DivePattern::Spiral => {
                let side = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
                (
                    Vec2::new(from.x + side * 320.0, mid.y + 80.0),
                    target,
                )
            }
            DivePattern::Flank => {
                let edge = if target.x < WORLD_WIDTH / 2.0 {
                    WORLD_WIDTH - 40.0
                } else {
                    40.0
                };
                (
                    Vec2::new(edge, target.y - 120.0),
                    Vec2::new(target.x, target.y + 40.0),
                )
            }
            DivePattern::Kamikaze => (mid, from + (target - from) * 1.4),
        };
        Curve::new(from, p1, p2, now_ms, self.duration_ms())
    }
}

/// Movement state; the curve lives inside the states that fly one
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Movement {
    Entry(Curve),
    Formation,
    Dive { curve: Curve, pattern: DivePattern },
    Return(Curve),
}

impl Movement {
    pub fn curve(&self) -> Option<&Curve> {
        match self {
            Movement::Entry(curve) | Movement::Return(curve) => Some(curve),
            Movement::Dive { curve, .. } => Some(curve),
            Movement::Formation => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Movement::Entry(_) => "entry",
            Movement::Formation => "formation",
            Movement::Dive { .. } => "dive",
            Movement::Return(_) => "return",
        }
    }
}

/// Per-tick dive chance normalized to elapsed frames
///
/// Equals `chance` at `dt == 1.0`, so behaviour at the nominal frame rate is
/// unchanged while other rates dive equally often per second.
#[inline]
pub fn dive_probability(chance: f32, dt: f32) -> f32 {
    if dt <= 0.0 || chance <= 0.0 {
        return 0.0;
    }
    1.0 - (1.0 - chance.min(1.0)).powf(dt)
}

/// Formation sway around an anchor at `now_ms`
fn sway_offset(now_ms: f64, phase: f32) -> Vec2 {
    let tx = ((now_ms * 0.0015) % std::f64::consts::TAU) as f32 + phase;
    let ty = ((now_ms * 0.0011) % std::f64::consts::TAU) as f32 + phase;
    Vec2::new(tx.sin() * FORMATION_SWAY_X, ty.cos() * FORMATION_SWAY_Y)
}

/// A basic hostile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hostile {
    pub id: EntityId,
    pub kind: HostileKind,
    pub pos: Vec2,
    /// Derived from the last tick's displacement (pixels/frame)
    pub vel: Vec2,
    pub health: f32,
    pub max_health: f32,
    pub movement: Movement,
    pub anchor: Vec2,
    /// Desynchronizes formation sway between hostiles
    pub sway_phase: f32,
    /// Tick-accumulated (frames)
    pub fire_cooldown: f32,
    pub score_value: u32,
    pub radius: f32,
    pub active: bool,
}

impl Hostile {
    /// New hostile flying its entry curve from `spawn_pos` into formation
    ///
    /// The curve ends where the swaying formation slot will be when the
    /// entry completes, so the hand-off does not jump.
    pub fn spawn(
        id: EntityId,
        kind: HostileKind,
        spawn_pos: Vec2,
        anchor: Vec2,
        now_ms: f64,
        health_multiplier: f32,
        rng: &mut impl Rng,
    ) -> Self {
        let profile = kind.profile();
        let side = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
        let sway_phase = rng.random_range(0.0..std::f32::consts::TAU);
        let end = anchor + sway_offset(now_ms + ENTRY_DURATION_MS, sway_phase);
        let control = Vec2::new(
            spawn_pos.x + side * ENTRY_SIDE_OFFSET,
            (spawn_pos.y + anchor.y) / 2.0 + ENTRY_DROP,
        );
        let health = (profile.health * health_multiplier).max(1.0);

        Self {
            id,
            kind,
            pos: spawn_pos,
            vel: Vec2::ZERO,
            health,
            max_health: health,
            movement: Movement::Entry(Curve::new(
                spawn_pos,
                control,
                end,
                now_ms,
                ENTRY_DURATION_MS,
            )),
            anchor,
            sway_phase,
            fire_cooldown: profile.fire_cooldown * rng.random_range(0.5..1.0),
            score_value: profile.score,
            radius: profile.radius,
            active: true,
        }
    }

    /// Advance movement and cooldowns; aimed shots are appended to `shots`
    pub fn update(&mut self, ctx: &EntityContext, rng: &mut impl Rng, shots: &mut Vec<Shot>) {
        if !self.active {
            return;
        }
        let prev = self.pos;
        self.advance_movement(ctx, rng);
        if ctx.dt > 0.0 {
            self.vel = (self.pos - prev) / ctx.dt;
        }
        shots.extend(self.try_fire(ctx, rng));
    }

    fn advance_movement(&mut self, ctx: &EntityContext, rng: &mut impl Rng) {
        let now = ctx.now_ms;
        match self.movement {
            Movement::Entry(curve) => {
                self.pos = curve.sample(now);
                if curve.is_complete(now) {
                    self.join_formation(now);
                }
            }
            Movement::Formation => {
                self.pos = self.formation_position(now);
                if rng.random::<f32>() < dive_probability(ctx.dive_chance, ctx.dt) {
                    self.start_dive(ctx.player_pos, now, rng);
                }
            }
            Movement::Dive { curve, .. } => {
                self.pos = curve.sample(now);
                if curve.is_complete(now) {
                    self.start_return(now);
                }
            }
            Movement::Return(curve) => {
                self.pos = curve.sample(now);
                if curve.is_complete(now) {
                    self.join_formation(now);
                }
            }
        }
    }

    /// A late tick lands past the curve's end; pick up the sway where it is now
    fn join_formation(&mut self, now_ms: f64) {
        self.movement = Movement::Formation;
        self.pos = self.formation_position(now_ms);
    }

    /// Anchor plus a phase-offset sway
    pub fn formation_position(&self, now_ms: f64) -> Vec2 {
        self.anchor + sway_offset(now_ms, self.sway_phase)
    }

    /// Leave formation toward `target`; the curve is fixed for the whole dive
    pub fn start_dive(&mut self, target: Vec2, now_ms: f64, rng: &mut impl Rng) {
        let pattern = DivePattern::roll(rng);
        let curve = pattern.curve(self.pos, target, now_ms, rng);
        log::debug!("hostile {} dives ({:?})", self.id, pattern);
        self.movement = Movement::Dive { curve, pattern };
    }

    /// Fly back to the swaying slot through a control point off the nearer side
    fn start_return(&mut self, now_ms: f64) {
        let end = self.formation_position(now_ms + RETURN_DURATION_MS);
        let side_x = if self.pos.x < WORLD_WIDTH / 2.0 {
            -RETURN_SIDE_OFFSET
        } else {
            WORLD_WIDTH + RETURN_SIDE_OFFSET
        };
        let control = Vec2::new(side_x, (self.pos.y + self.anchor.y) / 2.0);
        self.movement = Movement::Return(Curve::new(
            self.pos,
            control,
            end,
            now_ms,
            RETURN_DURATION_MS,
        ));
    }

    /// Tick the cooldown and fire an aimed volley when it elapses
    fn try_fire(&mut self, ctx: &EntityContext, rng: &mut impl Rng) -> Vec<Shot> {
        let rate = if self.is_diving() { DIVE_COOLDOWN_RATE } else { 1.0 };
        self.fire_cooldown = (self.fire_cooldown - ctx.dt * rate).max(0.0);
        if self.fire_cooldown > 0.0 || !self.in_fire_band() {
            return Vec::new();
        }

        let profile = self.kind.profile();
        let speed = profile.projectile_speed * ctx.projectile_speed_scale;
        let base = crate::aim_angle(self.pos, ctx.player_pos);
        let half = (profile.volley as f32 - 1.0) / 2.0;

        let shots = (0..profile.volley)
            .map(|i| {
                let angle = base + (i as f32 - half) * profile.volley_spread;
                let jitter = Vec2::new(
                    rng.random_range(-AIM_JITTER..=AIM_JITTER),
                    rng.random_range(-AIM_JITTER..=AIM_JITTER),
                );
                let dir = polar_to_cartesian(1.0, angle);
                Shot::new(
                    self.pos + dir * self.radius,
                    dir * speed + jitter,
                    ProjectileStyle::Pellet,
                )
            })
            .collect();

        self.fire_cooldown = profile.fire_cooldown * rng.random_range(0.8..1.2);
        shots
    }

    /// On screen horizontally and inside the vertical fire band
    pub fn in_fire_band(&self) -> bool {
        (0.0..=WORLD_WIDTH).contains(&self.pos.x)
            && (FIRE_BAND_TOP..=FIRE_BAND_BOTTOM).contains(&self.pos.y)
    }

    /// Apply damage; returns true if this hit killed the hostile
    pub fn take_damage(&mut self, amount: f32) -> bool {
        if !self.active {
            return false;
        }
        self.health -= sanitize_scalar(amount, 0.0, 0.0, f32::MAX);
        if self.health <= 0.0 {
            self.active = false;
            return true;
        }
        false
    }

    #[inline]
    pub fn is_diving(&self) -> bool {
        matches!(self.movement, Movement::Dive { .. })
    }

    #[inline]
    pub fn curve(&self) -> Option<&Curve> {
        self.movement.curve()
    }
}

impl Pooled for Hostile {
    fn id(&self) -> EntityId {
        self.id
    }

    fn visual(&self) -> Visual {
        Visual::Hostile(self.kind)
    }

    fn is_active(&self) -> bool {
        self.active
    }
}
