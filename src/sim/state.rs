//! Combat state and its public surface
//!
//! Everything the core owns lives here: the capped pools, the boss slot, the
//! spawn schedule, the seeded RNG and the id counter. Collaborators
//! (player, presentation, feedback) are passed in on every call.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::Serialize;

use super::boss::{Boss, BossKind};
use super::events::{Feedback, GameEvent};
use super::hostile::{Hostile, HostileKind};
use super::particle::{Particle, ParticleStyle};
use super::pickup::{Pickup, RewardKind};
use super::player::PlayerLink;
use super::pool::{AddOutcome, EntityId, Pool, PoolKind};
use super::projectile::{Owner, Projectile, Shot};
use super::wave::{self, WaveOrchestrator};
use crate::balance::Balance;
use crate::presentation::{Presentation, Visual};
use crate::sanitize_scalar;

/// Complete combat state for one run
#[derive(Debug, Clone)]
pub struct CombatState {
    pub balance: Balance,
    pub wave: WaveOrchestrator,
    pub hostiles: Pool<Hostile>,
    /// At most one, only on boss levels
    pub boss: Option<Boss>,
    pub friendly_projectiles: Pool<Projectile>,
    pub hostile_projectiles: Pool<Projectile>,
    pub particles: Pool<Particle>,
    pub pickups: Pool<Pickup>,
    pub score: u64,
    pub kills: u32,
    /// Boss bullet density/speed scalar
    pub pressure: f32,
    /// Host wall clock at the last update
    pub now_ms: f64,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub(crate) rng: Pcg32,
    next_id: EntityId,
}

/// Live count, cap and drop total for one pool
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PoolStat {
    pub pool: PoolKind,
    pub live: usize,
    pub cap: usize,
    pub rejected: u64,
    /// Capacity warning already raised this level
    pub warned: bool,
}

impl PoolStat {
    fn of<T: super::pool::Pooled>(pool: &Pool<T>) -> Self {
        Self {
            pool: pool.kind(),
            live: pool.len(),
            cap: pool.cap(),
            rejected: pool.rejected_total(),
            warned: pool.warned_this_level(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BossStat {
    pub kind: BossKind,
    pub phase: u8,
    pub health: f32,
    pub max_health: f32,
    pub telegraphing: bool,
}

/// Read-only snapshot for HUDs, logs and telemetry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostics {
    pub level: u32,
    pub boss_level: bool,
    pub spawning: bool,
    pub quota_remaining: u32,
    pub boss: Option<BossStat>,
    pub pools: Vec<PoolStat>,
    pub score: u64,
    pub kills: u32,
    pub pressure: f32,
    pub level_complete: bool,
    pub time_ticks: u64,
}

/// Raise the capacity event on the first rejection of a level
pub(crate) fn report(outcome: AddOutcome, pool: PoolKind, feedback: &mut dyn Feedback) -> bool {
    if outcome.raised_warning() {
        feedback.notify(GameEvent::CapacityWarning { pool });
    }
    outcome.is_added()
}

impl CombatState {
    /// Create a combat state; `balance` is sanitized first
    pub fn new(balance: Balance, seed: u64) -> Self {
        let balance = balance.sanitized();
        Self {
            wave: WaveOrchestrator::new(),
            hostiles: Pool::new(PoolKind::Hostiles, balance.hostile_cap),
            boss: None,
            friendly_projectiles: Pool::new(
                PoolKind::FriendlyProjectiles,
                balance.friendly_projectile_cap,
            ),
            hostile_projectiles: Pool::new(
                PoolKind::HostileProjectiles,
                balance.hostile_projectile_cap,
            ),
            particles: Pool::new(PoolKind::Particles, balance.particle_cap),
            pickups: Pool::new(PoolKind::Pickups, balance.pickup_cap),
            score: 0,
            kills: 0,
            pressure: balance.pressure,
            now_ms: 0.0,
            time_ticks: 0,
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
            balance,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> EntityId {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1).max(1);
        id
    }

    /// Clear the field and schedule `level`
    ///
    /// Live hostiles and any boss are torn down, every pool's capacity
    /// warning re-arms, and on a boss level the single boss is spawned now.
    pub fn start_level(
        &mut self,
        level: u32,
        now_ms: f64,
        presentation: &mut dyn Presentation,
        feedback: &mut dyn Feedback,
    ) {
        self.now_ms = now_ms;
        self.hostiles.clear(presentation);
        self.hostile_projectiles.clear(presentation);
        if let Some(boss) = self.boss.take() {
            presentation.hide(boss.id);
        }

        self.hostiles.reset_warning();
        self.friendly_projectiles.reset_warning();
        self.hostile_projectiles.reset_warning();
        self.particles.reset_warning();
        self.pickups.reset_warning();

        let boss_level = self.wave.start_level(level, &self.balance);
        log::info!(
            "level {} started ({})",
            level,
            if boss_level {
                "boss".to_string()
            } else {
                format!("{} hostiles", self.wave.quota_remaining)
            }
        );
        feedback.notify(GameEvent::LevelStarted { level, boss_level });

        if boss_level {
            self.spawn_boss(now_ms, presentation, feedback);
        }
    }

    fn spawn_boss(&mut self, now_ms: f64, presentation: &mut dyn Presentation, feedback: &mut dyn Feedback) {
        let id = self.next_entity_id();
        let boss = Boss::for_level(id, self.wave.level, &self.balance, now_ms);
        log::info!(
            "boss {:?} spawned with {} health",
            boss.kind,
            boss.max_health
        );
        presentation.show(id, Visual::Boss(boss.kind));
        feedback.notify(GameEvent::BossSpawned { id, kind: boss.kind });
        self.boss = Some(boss);
    }

    /// Build a hostile and offer it to the capped pool
    ///
    /// Used for scheduled spawns and boss reinforcements alike. Returns false
    /// when the pool is full and the spawn was dropped.
    pub fn spawn_hostile(
        &mut self,
        kind: HostileKind,
        now_ms: f64,
        presentation: &mut dyn Presentation,
        feedback: &mut dyn Feedback,
    ) -> bool {
        if self.hostiles.is_full() {
            return report(self.hostiles.note_rejection(), PoolKind::Hostiles, feedback);
        }
        let taken: Vec<Vec2> = self
            .hostiles
            .iter()
            .filter(|h| h.active)
            .map(|h| h.anchor)
            .collect();
        let anchor = self.wave.free_anchor(&taken);
        let id = self.next_entity_id();
        let spawn_pos = wave::spawn_point(&mut self.rng);
        let hostile = Hostile::spawn(
            id,
            kind,
            spawn_pos,
            anchor,
            now_ms,
            self.balance.health_multiplier,
            &mut self.rng,
        );
        let added = report(
            self.hostiles.add(hostile, presentation),
            PoolKind::Hostiles,
            feedback,
        );
        if added {
            feedback.notify(GameEvent::HostileSpawned { id, kind });
        }
        added
    }

    /// Spawn a level-appropriate hostile
    pub(crate) fn spawn_scheduled(
        &mut self,
        now_ms: f64,
        presentation: &mut dyn Presentation,
        feedback: &mut dyn Feedback,
    ) -> bool {
        let kind = wave::pick_kind(self.wave.level, &mut self.rng);
        self.spawn_hostile(kind, now_ms, presentation, feedback)
    }

    /// The player's fire action
    pub fn fire_friendly(
        &mut self,
        shot: Shot,
        presentation: &mut dyn Presentation,
        feedback: &mut dyn Feedback,
    ) -> AddOutcome {
        if self.friendly_projectiles.is_full() {
            let outcome = self.friendly_projectiles.note_rejection();
            report(outcome, PoolKind::FriendlyProjectiles, feedback);
            return outcome;
        }
        let id = self.next_entity_id();
        let outcome = self
            .friendly_projectiles
            .add(Projectile::from_shot(id, Owner::Friendly, shot), presentation);
        report(outcome, PoolKind::FriendlyProjectiles, feedback);
        outcome
    }

    /// Route hostile shots into their pool; stops at the cap
    pub(crate) fn enqueue_hostile_shots(
        &mut self,
        shots: Vec<Shot>,
        presentation: &mut dyn Presentation,
        feedback: &mut dyn Feedback,
    ) -> usize {
        let mut added = 0;
        for shot in shots {
            if self.hostile_projectiles.is_full() {
                report(
                    self.hostile_projectiles.note_rejection(),
                    PoolKind::HostileProjectiles,
                    feedback,
                );
                break;
            }
            let id = self.next_entity_id();
            let outcome = self
                .hostile_projectiles
                .add(Projectile::from_shot(id, Owner::Hostile, shot), presentation);
            if outcome.is_added() {
                added += 1;
            }
        }
        added
    }

    /// Cosmetic particle burst; truncated at the particle cap
    pub fn emit_burst(
        &mut self,
        center: Vec2,
        style: ParticleStyle,
        presentation: &mut dyn Presentation,
        feedback: &mut dyn Feedback,
    ) {
        for _ in 0..style.burst().count {
            if self.particles.is_full() {
                report(self.particles.note_rejection(), PoolKind::Particles, feedback);
                return;
            }
            let id = self.next_entity_id();
            let particle = Particle::scattered(id, center, style, &mut self.rng);
            self.particles.add(particle, presentation);
        }
    }

    /// Low-probability reward drop at `pos`
    pub(crate) fn roll_reward(
        &mut self,
        pos: Vec2,
        presentation: &mut dyn Presentation,
        feedback: &mut dyn Feedback,
    ) -> Option<RewardKind> {
        if self.rng.random::<f32>() >= self.balance.reward_chance {
            return None;
        }
        if self.pickups.is_full() {
            report(self.pickups.note_rejection(), PoolKind::Pickups, feedback);
            return None;
        }
        let kind = RewardKind::roll(&mut self.rng);
        let id = self.next_entity_id();
        self.pickups.add(Pickup::new(id, kind, pos), presentation);
        feedback.notify(GameEvent::RewardSpawned { kind, pos });
        Some(kind)
    }

    /// Add to the score; returns the new total
    pub(crate) fn award(&mut self, points: u32, feedback: &mut dyn Feedback) -> u64 {
        self.score = self.score.saturating_add(points as u64);
        feedback.notify(GameEvent::Score {
            points,
            total: self.score,
        });
        self.score
    }

    /// Update the pressure scalar; non-finite input keeps the current value
    pub fn set_pressure(&mut self, pressure: f32) {
        self.pressure = sanitize_scalar(pressure, self.pressure, 0.25, 4.0);
    }

    /// Advance one tick; returns whether the level is complete afterwards
    pub fn update(
        &mut self,
        dt: f32,
        now_ms: f64,
        player: &mut dyn PlayerLink,
        presentation: &mut dyn Presentation,
        feedback: &mut dyn Feedback,
    ) -> bool {
        super::tick::tick(self, dt, now_ms, player, presentation, feedback)
    }

    /// True iff no hostile or boss is live and nothing more will spawn
    pub fn is_level_complete(&self) -> bool {
        self.wave.is_level_complete(self.live_hostiles())
    }

    /// Live hostiles, boss included
    pub fn live_hostiles(&self) -> usize {
        self.hostiles.len() + usize::from(self.boss.is_some())
    }

    pub fn live_projectiles(&self) -> usize {
        self.friendly_projectiles.len() + self.hostile_projectiles.len()
    }

    pub fn live_particles(&self) -> usize {
        self.particles.len()
    }

    pub fn live_pickups(&self) -> usize {
        self.pickups.len()
    }

    #[inline]
    pub fn level(&self) -> u32 {
        self.wave.level
    }

    pub fn diagnostics(&self) -> Diagnostics {
        Diagnostics {
            level: self.wave.level,
            boss_level: self.wave.boss_level,
            spawning: self.wave.spawning,
            quota_remaining: self.wave.quota_remaining,
            boss: self.boss.as_ref().map(|b| BossStat {
                kind: b.kind,
                phase: b.phase.as_u8(),
                health: b.health,
                max_health: b.max_health,
                telegraphing: b.telegraph.is_some(),
            }),
            pools: vec![
                PoolStat::of(&self.hostiles),
                PoolStat::of(&self.friendly_projectiles),
                PoolStat::of(&self.hostile_projectiles),
                PoolStat::of(&self.particles),
                PoolStat::of(&self.pickups),
            ],
            score: self.score,
            kills: self.kills,
            pressure: self.pressure,
            level_complete: self.is_level_complete(),
            time_ticks: self.time_ticks,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presentation::testing::RecordingPresentation;
    use crate::sim::events::NullFeedback;
    use crate::sim::projectile::ProjectileStyle;

    fn state() -> CombatState {
        CombatState::new(Balance::default(), 42)
    }

    #[test]
    fn test_ids_are_unique_and_nonzero() {
        let mut s = state();
        let a = s.next_entity_id();
        let b = s.next_entity_id();
        assert_ne!(a, 0);
        assert_ne!(a, b);
    }

    #[test]
    fn test_start_level_not_complete_while_spawning() {
        let mut s = state();
        let mut pres = RecordingPresentation::default();
        let mut events: Vec<GameEvent> = Vec::new();
        s.start_level(1, 0.0, &mut pres, &mut events);
        assert!(!s.is_level_complete());
        assert_eq!(
            events.first(),
            Some(&GameEvent::LevelStarted {
                level: 1,
                boss_level: false
            })
        );
    }

    #[test]
    fn test_boss_level_spawns_single_boss() {
        let mut s = state();
        let mut pres = RecordingPresentation::default();
        let mut events: Vec<GameEvent> = Vec::new();
        s.start_level(5, 0.0, &mut pres, &mut events);
        let boss = s.boss.as_ref().map(|b| (b.id, b.kind));
        assert_eq!(boss.map(|b| b.1), Some(BossKind::Dreadnought));
        assert!(s.hostiles.is_empty());
        assert!(!s.wave.spawning);
        // The boss counts as live
        assert!(!s.is_level_complete());
        assert!(pres.live.contains(&boss.map(|b| b.0).unwrap_or(0)));
        assert!(events.iter().any(|e| e.name() == "boss_spawned"));
    }

    #[test]
    fn test_start_level_clears_previous_field() {
        let mut s = state();
        let mut pres = RecordingPresentation::default();
        s.start_level(5, 0.0, &mut pres, &mut NullFeedback);
        s.spawn_hostile(HostileKind::Scout, 0.0, &mut pres, &mut NullFeedback);
        s.start_level(6, 100.0, &mut pres, &mut NullFeedback);
        assert!(s.boss.is_none());
        assert!(s.hostiles.is_empty());
        assert!(pres.live.is_empty());
    }

    #[test]
    fn test_spawn_guard_drops_at_cap() {
        let balance = Balance {
            hostile_cap: 2,
            ..Balance::default()
        };
        let mut s = CombatState::new(balance, 1);
        let mut pres = RecordingPresentation::default();
        let mut events: Vec<GameEvent> = Vec::new();
        for _ in 0..4 {
            s.spawn_hostile(HostileKind::Scout, 0.0, &mut pres, &mut events);
        }
        assert_eq!(s.hostiles.len(), 2);
        let warnings = events
            .iter()
            .filter(|e| matches!(e, GameEvent::CapacityWarning { pool: PoolKind::Hostiles }))
            .count();
        assert_eq!(warnings, 1);
        assert_eq!(s.hostiles.rejected_total(), 2);
    }

    fn hostile_warnings(events: &[GameEvent]) -> usize {
        events
            .iter()
            .filter(|e| matches!(e, GameEvent::CapacityWarning { pool: PoolKind::Hostiles }))
            .count()
    }

    #[test]
    fn test_capacity_warning_rearms_each_level() {
        let balance = Balance {
            hostile_cap: 2,
            ..Balance::default()
        };
        let mut s = CombatState::new(balance, 1);
        let mut pres = RecordingPresentation::default();
        let mut events: Vec<GameEvent> = Vec::new();

        s.start_level(1, 0.0, &mut pres, &mut events);
        for _ in 0..4 {
            s.spawn_hostile(HostileKind::Scout, 0.0, &mut pres, &mut events);
        }
        assert_eq!(hostile_warnings(&events), 1);
        assert!(s.diagnostics().pools[0].warned);

        s.start_level(2, 1000.0, &mut pres, &mut events);
        assert!(!s.diagnostics().pools[0].warned);
        for _ in 0..4 {
            s.spawn_hostile(HostileKind::Scout, 1000.0, &mut pres, &mut events);
        }
        assert_eq!(hostile_warnings(&events), 2);
        assert_eq!(s.hostiles.rejected_total(), 4);
    }

    #[test]
    fn test_live_hostiles_never_share_a_slot() {
        let mut s = state();
        let mut pres = RecordingPresentation::default();
        s.start_level(14, 0.0, &mut pres, &mut NullFeedback);
        for _ in 0..40 {
            s.spawn_hostile(HostileKind::Scout, 0.0, &mut pres, &mut NullFeedback);
        }
        let anchors: Vec<Vec2> = s.hostiles.iter().map(|h| h.anchor).collect();
        assert_eq!(anchors.len(), s.balance.hostile_cap);
        for (i, a) in anchors.iter().enumerate() {
            assert!(!anchors[i + 1..].contains(a), "slot {a:?} held twice");
        }

        // A kill frees its slot for the next spawn
        let freed = anchors[5];
        if let Some(h) = s.hostiles.iter_mut().nth(5) {
            h.active = false;
        }
        s.hostiles.sweep(&mut pres);
        s.spawn_hostile(HostileKind::Scout, 0.0, &mut pres, &mut NullFeedback);
        assert_eq!(s.hostiles.iter().filter(|h| h.anchor == freed).count(), 1);
    }

    #[test]
    fn test_oversized_quota_config_starts_level() {
        let balance = Balance::from_json(r#"{ "quota_base": 4000000000, "quota_per_level": 4000000000 }"#)
            .expect("valid json");
        let mut s = CombatState::new(balance, 3);
        let mut pres = RecordingPresentation::default();
        s.start_level(2, 0.0, &mut pres, &mut NullFeedback);
        assert_eq!(s.wave.quota_remaining, s.balance.quota_for_level(2));
        assert!(s.wave.spawning);
    }

    #[test]
    fn test_fire_friendly_respects_cap() {
        let balance = Balance {
            friendly_projectile_cap: 3,
            ..Balance::default()
        };
        let mut s = CombatState::new(balance, 1);
        let mut pres = RecordingPresentation::default();
        let shot = Shot::new(Vec2::new(400.0, 500.0), Vec2::new(0.0, -8.0), ProjectileStyle::Laser);
        let outcomes: Vec<AddOutcome> = (0..5)
            .map(|_| s.fire_friendly(shot, &mut pres, &mut NullFeedback))
            .collect();
        assert_eq!(s.friendly_projectiles.len(), 3);
        assert_eq!(outcomes[3], AddOutcome::RejectedFirst);
        assert_eq!(outcomes[4], AddOutcome::Rejected);
    }

    #[test]
    fn test_emit_burst_truncates_at_particle_cap() {
        let balance = Balance {
            particle_cap: 200,
            ..Balance::default()
        };
        let mut s = CombatState::new(balance, 9);
        let mut pres = RecordingPresentation::default();
        let mut events: Vec<GameEvent> = Vec::new();
        for _ in 0..4 {
            s.emit_burst(Vec2::new(100.0, 100.0), ParticleStyle::BossExplosion, &mut pres, &mut events);
        }
        assert_eq!(s.particles.len(), 200);
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_set_pressure_sanitizes() {
        let mut s = state();
        s.set_pressure(2.0);
        assert_eq!(s.pressure, 2.0);
        s.set_pressure(f32::NAN);
        assert_eq!(s.pressure, 2.0);
        s.set_pressure(100.0);
        assert_eq!(s.pressure, 4.0);
    }

    #[test]
    fn test_diagnostics_serialize() {
        let mut s = state();
        s.start_level(1, 0.0, &mut RecordingPresentation::default(), &mut NullFeedback);
        let d = s.diagnostics();
        assert_eq!(d.level, 1);
        assert_eq!(d.pools.len(), 5);
        assert!(!d.level_complete);
        let json = serde_json::to_string(&d).unwrap_or_default();
        assert!(json.contains("\"quota_remaining\":7"));
        assert!(json.contains("\"time_ticks\":0"));
    }
}
