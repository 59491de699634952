//! Per-frame simulation tick
//!
//! Fixed ordering, so an entity that dies this tick cannot also fire:
//! 1. Spawn processing
//! 2. Entity motion and fire, drifting pools advance
//! 3. Collision and resolution, dead items swept
//! 4. Level completion re-evaluated

use glam::Vec2;

use super::collision;
use super::events::{Feedback, GameEvent};
use super::particle::ParticleStyle;
use super::player::PlayerLink;
use super::projectile::Shot;
use super::state::CombatState;
use crate::presentation::Presentation;
use crate::sanitize_scalar;

/// Longest frame hitch applied in one tick (frames)
pub const MAX_TICK_FRAMES: f32 = 10.0;

/// Camera shake requested when a signature move fires
const SIGNATURE_SHAKE: f32 = 0.35;

/// What every entity update reads; replaces any reach into shared state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntityContext {
    /// Host wall clock (curves, telegraphs, boss choreography)
    pub now_ms: f64,
    /// Elapsed nominal frames (cooldowns, invulnerability)
    pub dt: f32,
    pub player_pos: Vec2,
    pub projectile_speed_scale: f32,
    pub pressure: f32,
    pub dive_chance: f32,
}

/// Advance the combat state by one tick; returns whether the level is complete
pub fn tick(
    state: &mut CombatState,
    dt: f32,
    now_ms: f64,
    player: &mut dyn PlayerLink,
    presentation: &mut dyn Presentation,
    feedback: &mut dyn Feedback,
) -> bool {
    let dt = sanitize_scalar(dt, 0.0, 0.0, MAX_TICK_FRAMES);
    let now_ms = if now_ms.is_finite() { now_ms } else { state.now_ms };
    state.now_ms = now_ms;
    state.time_ticks += 1;

    // 1. Spawns
    let due = state.wave.update(dt);
    for _ in 0..due {
        state.spawn_scheduled(now_ms, presentation, feedback);
    }

    // 2. Motion and fire
    let ctx = EntityContext {
        now_ms,
        dt,
        player_pos: player.position(),
        projectile_speed_scale: state.balance.projectile_speed_scale,
        pressure: state.pressure,
        dive_chance: state.balance.dive_chance,
    };
    let mut shots = Vec::new();
    for hostile in state.hostiles.iter_mut() {
        hostile.update(&ctx, &mut state.rng, &mut shots);
    }
    let reinforcements = update_boss(state, &ctx, presentation, feedback, &mut shots);
    state.enqueue_hostile_shots(shots, presentation, feedback);
    for _ in 0..reinforcements {
        state.spawn_scheduled(now_ms, presentation, feedback);
    }

    state.friendly_projectiles.update(dt, presentation);
    state.hostile_projectiles.update(dt, presentation);
    state.pickups.update(dt, presentation);
    state.particles.update(dt, presentation);

    // 3. Collision
    collision::resolve(state, player, presentation, feedback);
    state.hostiles.sweep(presentation);
    state.friendly_projectiles.sweep(presentation);
    state.hostile_projectiles.sweep(presentation);
    state.pickups.sweep(presentation);
    if state.boss.as_ref().is_some_and(|b| !b.active) {
        if let Some(boss) = state.boss.take() {
            presentation.hide(boss.id);
        }
    }

    // 4. Completion
    state.is_level_complete()
}

/// Tick the boss unless its representation is still building
///
/// Returns the number of reinforcements its signature move called in.
fn update_boss(
    state: &mut CombatState,
    ctx: &EntityContext,
    presentation: &mut dyn Presentation,
    feedback: &mut dyn Feedback,
    shots: &mut Vec<Shot>,
) -> u32 {
    let Some(boss) = state.boss.as_mut() else {
        return 0;
    };
    if !presentation.is_ready(boss.id) {
        if !boss.skip_logged {
            log::warn!("boss {} presentation not ready, skipping its tick", boss.id);
            boss.skip_logged = true;
        }
        return 0;
    }

    let id = boss.id;
    let out = boss.update(ctx);
    let pos = boss.pos;
    shots.extend(out.shots);

    if let Some(phase) = out.phase_changed {
        feedback.notify(GameEvent::BossPhaseChanged {
            id,
            phase: phase.as_u8(),
        });
    }
    if let Some(attack) = out.telegraph_started {
        feedback.notify(GameEvent::TelegraphStarted { id, attack });
        state.emit_burst(pos, ParticleStyle::Telegraph, presentation, feedback);
    }
    if let Some(attack) = out.signature {
        feedback.notify(GameEvent::SignatureMove { id, attack });
        feedback.notify(GameEvent::CameraShake {
            intensity: SIGNATURE_SHAKE,
        });
    }
    out.reinforcements
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::balance::Balance;
    use crate::consts::FRAME_MS;
    use crate::presentation::testing::RecordingPresentation;
    use crate::sim::boss::{BOSS_ENTRY_MS, Phase, RING_REINFORCEMENTS, SignatureAttack, TELEGRAPH_MS};
    use crate::sim::events::NullFeedback;
    use crate::sim::player::PlayerShip;
    use crate::sim::pool::PoolKind;

    struct Harness {
        state: CombatState,
        player: PlayerShip,
        pres: RecordingPresentation,
        events: Vec<GameEvent>,
        frame: u64,
    }

    impl Harness {
        fn new(balance: Balance) -> Self {
            Self {
                state: CombatState::new(balance, 2024),
                player: PlayerShip::default(),
                pres: RecordingPresentation::default(),
                events: Vec::new(),
                frame: 0,
            }
        }

        fn start(&mut self, level: u32) {
            let now = self.now();
            self.state.start_level(level, now, &mut self.pres, &mut self.events);
        }

        fn now(&self) -> f64 {
            self.frame as f64 * FRAME_MS
        }

        fn step(&mut self) -> bool {
            self.frame += 1;
            self.step_at(self.now())
        }

        fn step_at(&mut self, now_ms: f64) -> bool {
            tick(
                &mut self.state,
                1.0,
                now_ms,
                &mut self.player,
                &mut self.pres,
                &mut self.events,
            )
        }

        fn count(&self, name: &str) -> usize {
            self.events.iter().filter(|e| e.name() == name).count()
        }
    }

    #[test]
    fn test_level_one_spawns_exactly_quota() {
        let mut h = Harness::new(Balance::default());
        h.start(1);
        assert_eq!(h.state.wave.quota_remaining, 7);
        assert_eq!(h.state.wave.spawn_delay, 58.0);

        for _ in 0..7 * 58 {
            h.step();
        }
        assert_eq!(h.count("hostile_spawned"), 7);
        assert!(!h.state.wave.spawning);
    }

    #[test]
    fn test_not_complete_right_after_start() {
        let mut h = Harness::new(Balance::default());
        h.start(1);
        assert!(!h.state.is_level_complete());
        assert!(!h.step());
    }

    #[test]
    fn test_level_completes_when_field_is_clear() {
        let mut h = Harness::new(Balance::default());
        h.start(1);
        while h.state.wave.spawning {
            h.step();
        }
        assert!(!h.state.is_level_complete());
        for hostile in h.state.hostiles.iter_mut() {
            hostile.active = false;
        }
        assert!(h.step());
        assert!(h.state.hostiles.is_empty());
    }

    #[test]
    fn test_dropped_spawns_still_terminate() {
        let balance = Balance {
            hostile_cap: 2,
            ..Balance::default()
        };
        let mut h = Harness::new(balance);
        h.start(1);
        for _ in 0..7 * 58 {
            h.step();
        }
        assert!(!h.state.wave.spawning);
        assert!(h.state.hostiles.len() <= 2);
        let warnings = h
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::CapacityWarning { pool: PoolKind::Hostiles }))
            .count();
        assert_eq!(warnings, 1);
    }

    #[test]
    fn test_boss_phase_change_emits_telegraph_feedback() {
        let mut h = Harness::new(Balance::default());
        h.start(5);
        if let Some(boss) = h.state.boss.as_mut() {
            boss.invulnerable_for = 0.0;
            boss.health = boss.max_health * 0.74;
        }
        h.step_at(BOSS_ENTRY_MS + 50.0);
        assert_eq!(h.count("boss_phase_changed"), 1);
        assert!(h.events.iter().any(|e| matches!(
            e,
            GameEvent::TelegraphStarted {
                attack: SignatureAttack::Cone,
                ..
            }
        )));
        assert!(h.state.particles.iter().any(|p| p.style == ParticleStyle::Telegraph));

        h.step_at(BOSS_ENTRY_MS + 50.0 + TELEGRAPH_MS);
        assert_eq!(h.count("signature_move"), 1);
        assert!(h.state.hostile_projectiles.len() >= 11);
    }

    #[test]
    fn test_ring_burst_reinforcements_bypass_quota() {
        let mut h = Harness::new(Balance::default());
        h.start(5);
        if let Some(boss) = h.state.boss.as_mut() {
            boss.invulnerable_for = 0.0;
            boss.phase = Phase::Two;
            boss.health = boss.max_health * 0.3;
        }
        let t0 = BOSS_ENTRY_MS + 50.0;
        h.step_at(t0);
        assert_eq!(h.state.boss.as_ref().map(|b| b.phase), Some(Phase::Three));
        h.step_at(t0 + TELEGRAPH_MS);
        assert_eq!(h.state.hostiles.len(), RING_REINFORCEMENTS as usize);
        assert_eq!(h.state.wave.quota_remaining, 0);
        assert!(!h.state.wave.spawning);
        assert!(!h.state.is_level_complete());
    }

    #[test]
    fn test_ring_burst_clamped_by_projectile_cap() {
        let balance = Balance {
            hostile_projectile_cap: 40,
            ..Balance::default()
        };
        let mut h = Harness::new(balance);
        h.start(5);
        h.state.set_pressure(4.0);
        if let Some(boss) = h.state.boss.as_mut() {
            boss.invulnerable_for = 0.0;
            boss.phase = Phase::Two;
            boss.health = boss.max_health * 0.3;
        }
        let t0 = BOSS_ENTRY_MS + 50.0;
        h.step_at(t0);
        h.step_at(t0 + TELEGRAPH_MS);
        assert_eq!(h.state.hostile_projectiles.len(), 40);
        let warnings = h
            .events
            .iter()
            .filter(|e| {
                matches!(
                    e,
                    GameEvent::CapacityWarning {
                        pool: PoolKind::HostileProjectiles
                    }
                )
            })
            .count();
        assert_eq!(warnings, 1);
    }

    #[test]
    fn test_boss_skipped_while_presentation_not_ready() {
        let mut h = Harness::new(Balance::default());
        h.start(5);
        let Some(id) = h.state.boss.as_ref().map(|b| b.id) else {
            panic!("boss level without a boss");
        };
        let spawn_pos = h.state.boss.as_ref().map(|b| b.pos);
        h.pres.pending.insert(id);

        for _ in 0..120 {
            h.step();
        }
        let boss = h.state.boss.as_ref();
        assert_eq!(boss.map(|b| b.pos), spawn_pos);
        assert!(boss.is_some_and(|b| b.skip_logged));
        assert!(h.state.hostile_projectiles.is_empty());

        h.pres.pending.clear();
        h.step();
        assert_ne!(h.state.boss.as_ref().map(|b| b.pos), spawn_pos);
    }

    #[test]
    fn test_boss_defeat_completes_level() {
        let mut h = Harness::new(Balance::default());
        h.start(5);
        if let Some(boss) = h.state.boss.as_mut() {
            boss.invulnerable_for = 0.0;
            boss.take_damage(f32::MAX);
        }
        assert!(h.step());
        assert!(h.state.boss.is_none());
    }

    #[test]
    fn test_friendly_fire_kills_through_tick() {
        let mut h = Harness::new(Balance::default());
        h.start(1);
        while h.state.hostiles.is_empty() {
            h.step();
        }
        let Some(target) = h.state.hostiles.as_slice().first().map(|t| t.pos) else {
            panic!("no hostile");
        };
        // A shot sitting on the hostile's next position
        let shot = Shot {
            damage: 10.0,
            ..Shot::new(target, Vec2::ZERO, crate::sim::ProjectileStyle::Laser)
        };
        h.state.fire_friendly(shot, &mut h.pres, &mut NullFeedback);
        h.step();
        // Entry curves move a few pixels per frame, well inside the overlap radius
        assert_eq!(h.state.kills, 1);
        assert!(h.state.score > 0);
    }

    #[test]
    fn test_non_finite_inputs_are_absorbed() {
        let mut h = Harness::new(Balance::default());
        h.start(1);
        tick(
            &mut h.state,
            f32::NAN,
            f64::NAN,
            &mut h.player,
            &mut h.pres,
            &mut h.events,
        );
        assert!(h.state.wave.spawn_timer.is_finite());
        assert!(h.state.now_ms.is_finite());
        tick(
            &mut h.state,
            f32::INFINITY,
            0.0,
            &mut h.player,
            &mut h.pres,
            &mut h.events,
        );
        assert!(h.state.wave.spawn_timer.is_finite());
    }

    #[test]
    fn test_same_seed_same_outcome() {
        let mut a = Harness::new(Balance::default());
        let mut b = Harness::new(Balance::default());
        a.start(3);
        b.start(3);
        for _ in 0..600 {
            a.step();
            b.step();
        }
        assert_eq!(a.state.diagnostics(), b.state.diagnostics());
        assert_eq!(a.events, b.events);
    }
}
