//! Fire-and-forget feedback events
//!
//! Audio, camera shake, score popups and toasts all hang off these. The core
//! never waits on a listener.

use glam::Vec2;
use serde::Serialize;

use super::boss::{BossKind, SignatureAttack};
use super::hostile::HostileKind;
use super::pickup::RewardKind;
use super::pool::{EntityId, PoolKind};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum GameEvent {
    LevelStarted { level: u32, boss_level: bool },
    HostileSpawned { id: EntityId, kind: HostileKind },
    HostileKilled { id: EntityId, kind: HostileKind, pos: Vec2 },
    BossSpawned { id: EntityId, kind: BossKind },
    BossPhaseChanged { id: EntityId, phase: u8 },
    TelegraphStarted { id: EntityId, attack: SignatureAttack },
    SignatureMove { id: EntityId, attack: SignatureAttack },
    BossDefeated { id: EntityId, kind: BossKind, pos: Vec2 },
    Explosion { pos: Vec2, large: bool },
    HitSpark { pos: Vec2 },
    CameraShake { intensity: f32 },
    PlayerHit { pos: Vec2 },
    RewardSpawned { kind: RewardKind, pos: Vec2 },
    RewardCollected { kind: RewardKind },
    Score { points: u32, total: u64 },
    CapacityWarning { pool: PoolKind },
}

impl GameEvent {
    /// Stable key listeners dispatch on
    pub fn name(&self) -> &'static str {
        match self {
            GameEvent::LevelStarted { .. } => "level_started",
            GameEvent::HostileSpawned { .. } => "hostile_spawned",
            GameEvent::HostileKilled { .. } => "hostile_killed",
            GameEvent::BossSpawned { .. } => "boss_spawned",
            GameEvent::BossPhaseChanged { .. } => "boss_phase_changed",
            GameEvent::TelegraphStarted { .. } => "telegraph_started",
            GameEvent::SignatureMove { .. } => "signature_move",
            GameEvent::BossDefeated { .. } => "boss_defeated",
            GameEvent::Explosion { .. } => "explosion",
            GameEvent::HitSpark { .. } => "hit_spark",
            GameEvent::CameraShake { .. } => "camera_shake",
            GameEvent::PlayerHit { .. } => "player_hit",
            GameEvent::RewardSpawned { .. } => "reward_spawned",
            GameEvent::RewardCollected { .. } => "reward_collected",
            GameEvent::Score { .. } => "score",
            GameEvent::CapacityWarning { .. } => "capacity_warning",
        }
    }
}

/// Implemented by the host's audio/shake/score/toast layer
pub trait Feedback {
    fn notify(&mut self, event: GameEvent);
}

/// Collects events (tests, demo binary, deferred dispatch)
impl Feedback for Vec<GameEvent> {
    fn notify(&mut self, event: GameEvent) {
        self.push(event);
    }
}

/// Drops every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NullFeedback;

impl Feedback for NullFeedback {
    fn notify(&mut self, _event: GameEvent) {}
}
