//! Collision detection and resolution
//!
//! Circle-distance overlap only. No spatial partitioning: the pool caps
//! bound both sides of every O(n·m) loop.
//!
//! Resolution runs in three passes:
//! 1. Friendly projectiles × hostiles and boss
//! 2. Hostile projectiles and bodies × player
//! 3. Pickups × player
//!
//! Each pass records its side effects first and applies them after the
//! pools are released, so score, particles and reward drops never alias a
//! pool that is still being iterated.

use glam::Vec2;

use super::boss::BossKind;
use super::events::{Feedback, GameEvent};
use super::hostile::HostileKind;
use super::particle::ParticleStyle;
use super::pickup::RewardKind;
use super::player::PlayerLink;
use super::pool::EntityId;
use super::state::CombatState;
use crate::presentation::Presentation;

/// Score for a boss kill before the boss index bonus
pub const BOSS_SCORE: u32 = 5000;

/// Camera shake requested when the player is hit
const PLAYER_HIT_SHAKE: f32 = 0.6;
/// Camera shake requested on a boss kill
const BOSS_KILL_SHAKE: f32 = 1.0;

/// True iff two circles overlap: `distance(a, b) < ra + rb`
#[inline]
pub fn circles_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    let reach = ra + rb;
    a.distance_squared(b) < reach * reach
}

/// Counts from one resolution pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollisionReport {
    pub hostile_kills: u32,
    pub boss_killed: bool,
    pub player_hits: u32,
    pub pickups_collected: u32,
}

enum Hit {
    Kill { id: EntityId, kind: HostileKind, pos: Vec2, score: u32 },
    BossKill { id: EntityId, kind: BossKind, pos: Vec2 },
    Spark(Vec2),
}

/// Run all three passes against the live pools
pub fn resolve(
    state: &mut CombatState,
    player: &mut dyn PlayerLink,
    presentation: &mut dyn Presentation,
    feedback: &mut dyn Feedback,
) -> CollisionReport {
    let mut report = CollisionReport::default();
    resolve_friendly_fire(state, presentation, feedback, &mut report);
    resolve_player_hits(state, player, presentation, feedback, &mut report);
    resolve_pickups(state, player, presentation, feedback, &mut report);
    report
}

/// Pass 1
fn resolve_friendly_fire(
    state: &mut CombatState,
    presentation: &mut dyn Presentation,
    feedback: &mut dyn Feedback,
    report: &mut CollisionReport,
) {
    let mut hits = Vec::new();

    for proj in state.friendly_projectiles.iter_mut() {
        if !proj.active {
            continue;
        }
        // A piercing shot damages any single target once over its lifetime
        for hostile in state.hostiles.iter_mut() {
            if !hostile.active
                || proj.has_struck(hostile.id)
                || !circles_overlap(proj.pos, proj.radius, hostile.pos, hostile.radius)
            {
                continue;
            }
            if hostile.take_damage(proj.damage) {
                hits.push(Hit::Kill {
                    id: hostile.id,
                    kind: hostile.kind,
                    pos: hostile.pos,
                    score: hostile.score_value,
                });
            } else {
                hits.push(Hit::Spark(proj.pos));
            }
            proj.strike(hostile.id);
            if !proj.active {
                break;
            }
        }

        if !proj.active {
            continue;
        }
        if let Some(boss) = state.boss.as_mut() {
            if boss.active
                && !proj.has_struck(boss.id)
                && circles_overlap(proj.pos, proj.radius, boss.pos, boss.radius)
            {
                // An invulnerable boss still absorbs the shot
                let vulnerable = !boss.is_invulnerable();
                if boss.take_damage(proj.damage) {
                    hits.push(Hit::BossKill {
                        id: boss.id,
                        kind: boss.kind,
                        pos: boss.pos,
                    });
                } else if vulnerable {
                    hits.push(Hit::Spark(proj.pos));
                }
                proj.strike(boss.id);
            }
        }
    }

    for hit in hits {
        match hit {
            Hit::Kill { id, kind, pos, score } => {
                report.hostile_kills += 1;
                state.kills += 1;
                feedback.notify(GameEvent::HostileKilled { id, kind, pos });
                state.award(score, feedback);
                feedback.notify(GameEvent::Explosion { pos, large: false });
                state.emit_burst(pos, ParticleStyle::Explosion, presentation, feedback);
                state.roll_reward(pos, presentation, feedback);
            }
            Hit::BossKill { id, kind, pos } => {
                report.boss_killed = true;
                state.kills += 1;
                log::info!("boss {:?} defeated", kind);
                feedback.notify(GameEvent::BossDefeated { id, kind, pos });
                let bonus = BOSS_SCORE.saturating_mul(state.level() / state.balance.boss_interval.max(1));
                state.award(bonus.max(BOSS_SCORE), feedback);
                feedback.notify(GameEvent::Explosion { pos, large: true });
                feedback.notify(GameEvent::CameraShake {
                    intensity: BOSS_KILL_SHAKE,
                });
                state.emit_burst(pos, ParticleStyle::BossExplosion, presentation, feedback);
                state.roll_reward(pos, presentation, feedback);
            }
            Hit::Spark(pos) => {
                feedback.notify(GameEvent::HitSpark { pos });
                state.emit_burst(pos, ParticleStyle::Spark, presentation, feedback);
            }
        }
    }
}

/// Pass 2: nothing lands while the player is invulnerable
fn resolve_player_hits(
    state: &mut CombatState,
    player: &mut dyn PlayerLink,
    presentation: &mut dyn Presentation,
    feedback: &mut dyn Feedback,
    report: &mut CollisionReport,
) {
    let player_radius = player.radius();
    let mut impacts = Vec::new();

    for proj in state.hostile_projectiles.iter_mut() {
        if player.is_invulnerable() {
            break;
        }
        if proj.active && circles_overlap(proj.pos, proj.radius, player.position(), player_radius) {
            proj.deactivate();
            player.take_hit();
            impacts.push(player.position());
        }
    }

    for hostile in state.hostiles.iter_mut() {
        if player.is_invulnerable() {
            break;
        }
        if hostile.active && circles_overlap(hostile.pos, hostile.radius, player.position(), player_radius) {
            // Rammed: the hostile is destroyed without scoring
            hostile.active = false;
            player.take_hit();
            impacts.push(player.position());
        }
    }

    if let Some(boss) = state.boss.as_ref() {
        if boss.active
            && !player.is_invulnerable()
            && circles_overlap(boss.pos, boss.radius, player.position(), player_radius)
        {
            player.take_hit();
            impacts.push(player.position());
        }
    }

    for pos in impacts {
        report.player_hits += 1;
        feedback.notify(GameEvent::PlayerHit { pos });
        feedback.notify(GameEvent::Explosion { pos, large: false });
        feedback.notify(GameEvent::CameraShake {
            intensity: PLAYER_HIT_SHAKE,
        });
        state.emit_burst(pos, ParticleStyle::Explosion, presentation, feedback);
    }
}

/// Pass 3
fn resolve_pickups(
    state: &mut CombatState,
    player: &mut dyn PlayerLink,
    presentation: &mut dyn Presentation,
    feedback: &mut dyn Feedback,
    report: &mut CollisionReport,
) {
    let player_radius = player.radius();
    let mut collected: Vec<(RewardKind, Vec2)> = Vec::new();

    for pickup in state.pickups.iter_mut() {
        if pickup.active && circles_overlap(pickup.pos, pickup.radius, player.position(), player_radius) {
            pickup.active = false;
            player.collect(pickup.kind);
            collected.push((pickup.kind, pickup.pos));
        }
    }

    for (kind, pos) in collected {
        report.pickups_collected += 1;
        feedback.notify(GameEvent::RewardCollected { kind });
        state.emit_burst(pos, ParticleStyle::Pickup, presentation, feedback);
    }
}
