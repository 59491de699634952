//! Boss: phase ladder plus telegraphed signature moves
//!
//! Two orthogonal machines run on one boss:
//! - Phase 1 → 2 → 3, driven by health fraction and evaluated on the update
//!   tick (never inside `take_damage`). Each step starts a telegraph.
//! - Telegraph → Execute: while a telegraph is pending regular fire is held;
//!   when it elapses the tagged signature move fires once and clears.
//!
//! Entry, movement profiles and telegraphs are wall-clock stamped. The fire
//! cooldown and the post-spawn invulnerability window are tick-accumulated.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::curve::ease_out_cubic;
use super::pool::EntityId;
use super::projectile::{ProjectileStyle, Shot};
use super::tick::EntityContext;
use crate::balance::Balance;
use crate::consts::{BOSS_LANE_Y, BOSS_RADIUS, WORLD_WIDTH};
use crate::{aim_angle, polar_to_cartesian, sanitize_scalar};

/// Ease-in from above the screen to the lane
pub const BOSS_ENTRY_MS: f64 = 2000.0;
/// Post-spawn damage immunity (frames)
pub const BOSS_INVULNERABLE_FRAMES: f32 = 90.0;
/// Wind-up before a signature move
pub const TELEGRAPH_MS: f64 = 800.0;
/// Health fractions at which phases 2 and 3 begin
pub const PHASE_TWO_AT: f32 = 0.75;
pub const PHASE_THREE_AT: f32 = 0.40;
/// Hostiles the ring burst calls in
pub const RING_REINFORCEMENTS: u32 = 2;

const BOSS_BASE_HEALTH: f32 = 500.0;
const BOSS_SHOT_SPEED: f32 = 4.0;
const SPREAD_STEP: f32 = 0.18;
const CONE_SHOTS: u32 = 11;
const CONE_HALF_WIDTH: f32 = 0.7;
const VOLLEY_ROTATION: f32 = 0.3;

/// Boss catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BossKind {
    Dreadnought,
    Warden,
    Viper,
    Ravager,
}

/// How a boss moves once its entry finishes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MovementProfile {
    /// Wide horizontal sweep with a slight bob
    Sway,
    /// Slow loop below the lane
    Orbit,
    /// Linear back-and-forth
    Zigzag,
    /// Gentle drift with periodic lunges toward the player
    ChargeTease,
}

impl BossKind {
    pub const ALL: [BossKind; 4] = [
        BossKind::Dreadnought,
        BossKind::Warden,
        BossKind::Viper,
        BossKind::Ravager,
    ];

    pub fn movement_profile(&self) -> MovementProfile {
        match self {
            BossKind::Dreadnought => MovementProfile::Sway,
            BossKind::Warden => MovementProfile::Orbit,
            BossKind::Viper => MovementProfile::Zigzag,
            BossKind::Ravager => MovementProfile::ChargeTease,
        }
    }

    /// Which boss guards `level` (cycles through the catalog)
    pub fn for_level(level: u32, boss_interval: u32) -> Self {
        let index = (level / boss_interval.max(1)).saturating_sub(1) as usize;
        Self::ALL[index % Self::ALL.len()]
    }
}

/// Health-driven phase; never decreases
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Phase {
    One,
    Two,
    Three,
}

impl Phase {
    pub fn as_u8(&self) -> u8 {
        match self {
            Phase::One => 1,
            Phase::Two => 2,
            Phase::Three => 3,
        }
    }

    pub fn next(&self) -> Option<Phase> {
        match self {
            Phase::One => Some(Phase::Two),
            Phase::Two => Some(Phase::Three),
            Phase::Three => None,
        }
    }

    /// Health fraction at or below which this phase begins
    pub fn threshold(&self) -> f32 {
        match self {
            Phase::One => 1.0,
            Phase::Two => PHASE_TWO_AT,
            Phase::Three => PHASE_THREE_AT,
        }
    }

    /// Frames between regular volleys
    pub fn fire_cooldown(&self) -> f32 {
        match self {
            Phase::One => 90.0,
            Phase::Two => 65.0,
            Phase::Three => 45.0,
        }
    }

    /// Signature move unlocked by entering this phase
    pub fn signature(&self) -> Option<SignatureAttack> {
        match self {
            Phase::One => None,
            Phase::Two => Some(SignatureAttack::Cone),
            Phase::Three => Some(SignatureAttack::Ring),
        }
    }
}

/// Signature move tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignatureAttack {
    /// Wide aimed fan
    Cone,
    /// Dense full-circle burst plus reinforcements
    Ring,
}

/// Pending wind-up (wall-clock stamped)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Telegraph {
    pub attack: SignatureAttack,
    pub started_ms: f64,
    pub duration_ms: f64,
}

impl Telegraph {
    #[inline]
    pub fn is_elapsed(&self, now_ms: f64) -> bool {
        now_ms - self.started_ms >= self.duration_ms
    }
}

/// Everything one boss tick produced
#[derive(Debug, Default, Clone)]
pub struct BossUpdate {
    pub shots: Vec<Shot>,
    pub reinforcements: u32,
    pub phase_changed: Option<Phase>,
    pub telegraph_started: Option<SignatureAttack>,
    pub signature: Option<SignatureAttack>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Boss {
    pub id: EntityId,
    pub kind: BossKind,
    /// Resolved once from `kind`
    pub profile: MovementProfile,
    pub pos: Vec2,
    pub spawn_pos: Vec2,
    pub lane: Vec2,
    pub health: f32,
    pub max_health: f32,
    pub phase: Phase,
    pub telegraph: Option<Telegraph>,
    /// Wall-clock stamp the entry and movement profile are measured from
    pub spawned_ms: f64,
    /// Tick-accumulated (frames)
    pub invulnerable_for: f32,
    /// Tick-accumulated (frames)
    pub fire_cooldown: f32,
    /// Rotation of the phase 3 volley
    pub volley_angle: f32,
    pub radius: f32,
    pub active: bool,
    /// Set once the presentation-not-ready skip has been logged
    pub skip_logged: bool,
}

impl Boss {
    pub fn new(id: EntityId, kind: BossKind, max_health: f32, now_ms: f64) -> Self {
        let lane = Vec2::new(WORLD_WIDTH / 2.0, BOSS_LANE_Y);
        let spawn_pos = Vec2::new(lane.x, -BOSS_RADIUS * 2.0);
        let max_health = sanitize_scalar(max_health, BOSS_BASE_HEALTH, 1.0, f32::MAX);
        Self {
            id,
            kind,
            profile: kind.movement_profile(),
            pos: spawn_pos,
            spawn_pos,
            lane,
            health: max_health,
            max_health,
            phase: Phase::One,
            telegraph: None,
            spawned_ms: now_ms,
            invulnerable_for: BOSS_INVULNERABLE_FRAMES,
            fire_cooldown: Phase::One.fire_cooldown(),
            volley_angle: 0.0,
            radius: BOSS_RADIUS,
            active: true,
            skip_logged: false,
        }
    }

    /// Boss for a boss level: kind cycles, health grows 50% per boss index
    pub fn for_level(id: EntityId, level: u32, balance: &Balance, now_ms: f64) -> Self {
        let kind = BossKind::for_level(level, balance.boss_interval);
        let index = (level / balance.boss_interval.max(1)).saturating_sub(1);
        let health = BOSS_BASE_HEALTH * (1.0 + 0.5 * index as f32) * balance.health_multiplier;
        Self::new(id, kind, health, now_ms)
    }

    pub fn update(&mut self, ctx: &EntityContext) -> BossUpdate {
        let mut out = BossUpdate::default();
        if !self.active {
            return out;
        }
        let now = ctx.now_ms;

        self.invulnerable_for = (self.invulnerable_for - ctx.dt).max(0.0);
        self.pos = self.position_at(now);

        // Phases step only once the entry has finished, and a pending
        // telegraph holds the next step until it executes
        if self.telegraph.is_none() && !self.is_entering(now) {
            self.evaluate_phase(now, &mut out);
        }

        if let Some(telegraph) = self.telegraph {
            if telegraph.is_elapsed(now) {
                self.telegraph = None;
                out.shots = self.signature_move(telegraph.attack, ctx);
                out.signature = Some(telegraph.attack);
                if telegraph.attack == SignatureAttack::Ring {
                    out.reinforcements = RING_REINFORCEMENTS;
                }
                log::debug!("boss {} executes {:?}", self.id, telegraph.attack);
            }
            return out;
        }

        if self.is_entering(now) {
            return out;
        }

        self.fire_cooldown -= ctx.dt;
        if self.fire_cooldown <= 0.0 {
            out.shots = self.regular_volley(ctx);
            self.fire_cooldown = self.phase.fire_cooldown();
        }
        out
    }

    fn evaluate_phase(&mut self, now_ms: f64, out: &mut BossUpdate) {
        let Some(next) = self.phase.next() else {
            return;
        };
        if self.health_fraction() > next.threshold() {
            return;
        }
        self.phase = next;
        self.fire_cooldown = next.fire_cooldown();
        out.phase_changed = Some(next);
        log::info!("boss {} enters phase {}", self.id, next.as_u8());

        if let Some(attack) = next.signature() {
            self.telegraph = Some(Telegraph {
                attack,
                started_ms: now_ms,
                duration_ms: TELEGRAPH_MS,
            });
            out.telegraph_started = Some(attack);
        }
    }

    /// Entry ease-in, then the kind's movement profile
    pub fn position_at(&self, now_ms: f64) -> Vec2 {
        let since = (now_ms - self.spawned_ms).max(0.0);
        if since < BOSS_ENTRY_MS {
            let t = ease_out_cubic((since / BOSS_ENTRY_MS) as f32);
            return self.spawn_pos.lerp(self.lane, t);
        }
        self.lane + self.profile_offset(since - BOSS_ENTRY_MS)
    }

    /// Offset from the lane `t_ms` after entry; zero at `t_ms == 0`
    fn profile_offset(&self, t_ms: f64) -> Vec2 {
        let wave = |rate: f64| ((t_ms * rate) % std::f64::consts::TAU) as f32;
        match self.profile {
            MovementProfile::Sway => Vec2::new(wave(0.0012).sin() * 220.0, wave(0.0024).sin() * 18.0),
            MovementProfile::Orbit => Vec2::new(
                wave(0.001).sin() * 160.0,
                (1.0 - wave(0.001).cos()) * 60.0,
            ),
            MovementProfile::Zigzag => {
                // Triangle wave through zero
                let tri = std::f32::consts::FRAC_2_PI * wave(0.002).sin().asin();
                Vec2::new(tri * 240.0, wave(0.004).sin() * 14.0)
            }
            MovementProfile::ChargeTease => {
                const CYCLE_MS: f64 = 4000.0;
                const LUNGE_MS: f64 = 700.0;
                let in_cycle = t_ms % CYCLE_MS;
                let lunge = if in_cycle > CYCLE_MS - LUNGE_MS {
                    let k = ((in_cycle - (CYCLE_MS - LUNGE_MS)) / LUNGE_MS) as f32;
                    (k * std::f32::consts::PI).sin() * 170.0
                } else {
                    0.0
                };
                Vec2::new(wave(0.0007).sin() * 140.0, lunge)
            }
        }
    }

    fn shot_speed(&self, ctx: &EntityContext) -> f32 {
        BOSS_SHOT_SPEED * ctx.projectile_speed_scale * ctx.pressure
    }

    fn shot_at(&self, angle: f32, speed: f32, style: ProjectileStyle) -> Shot {
        let dir = polar_to_cartesian(1.0, angle);
        Shot::new(self.pos + dir * self.radius * 0.8, dir * speed, style)
    }

    /// Phase-dependent regular fire
    fn regular_volley(&mut self, ctx: &EntityContext) -> Vec<Shot> {
        let speed = self.shot_speed(ctx);
        let aim = aim_angle(self.pos, ctx.player_pos);
        match self.phase {
            Phase::One => vec![self.shot_at(aim, speed, ProjectileStyle::Needle)],
            Phase::Two => (-2..=2)
                .map(|i| self.shot_at(aim + i as f32 * SPREAD_STEP, speed, ProjectileStyle::Needle))
                .collect(),
            Phase::Three => {
                let count = (12.0 * ctx.pressure).round().clamp(6.0, 48.0) as u32;
                let step = std::f32::consts::TAU / count as f32;
                let base = self.volley_angle;
                self.volley_angle = crate::normalize_angle(self.volley_angle + VOLLEY_ROTATION);
                (0..count)
                    .map(|i| self.shot_at(base + i as f32 * step, speed * 0.85, ProjectileStyle::Orb))
                    .collect()
            }
        }
    }

    fn signature_move(&self, attack: SignatureAttack, ctx: &EntityContext) -> Vec<Shot> {
        let speed = self.shot_speed(ctx);
        match attack {
            SignatureAttack::Cone => {
                let aim = aim_angle(self.pos, ctx.player_pos);
                let step = 2.0 * CONE_HALF_WIDTH / (CONE_SHOTS - 1) as f32;
                (0..CONE_SHOTS)
                    .map(|i| {
                        let angle = aim - CONE_HALF_WIDTH + i as f32 * step;
                        self.shot_at(angle, speed * 1.1, ProjectileStyle::ConeShard)
                    })
                    .collect()
            }
            SignatureAttack::Ring => {
                let count = (32.0 * ctx.pressure).round().clamp(16.0, 96.0) as u32;
                let step = std::f32::consts::TAU / count as f32;
                (0..count)
                    .map(|i| self.shot_at(i as f32 * step, speed * 0.9, ProjectileStyle::RingOrb))
                    .collect()
            }
        }
    }

    /// No-op returning false while invulnerable; true if this hit killed the boss
    pub fn take_damage(&mut self, amount: f32) -> bool {
        if !self.active || self.is_invulnerable() {
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
    pub fn is_invulnerable(&self) -> bool {
        self.invulnerable_for > 0.0
    }

    #[inline]
    pub fn is_entering(&self, now_ms: f64) -> bool {
        now_ms - self.spawned_ms < BOSS_ENTRY_MS
    }

    #[inline]
    pub fn health_fraction(&self) -> f32 {
        (self.health / self.max_health).max(0.0)
    }
}
