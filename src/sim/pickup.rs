//! Reward pickups dropped by kills

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::pool::{Drifting, EntityId, Pooled};
use crate::consts::{OFFSCREEN_MARGIN, PICKUP_RADIUS};
use crate::presentation::Visual;
use crate::within_world;

/// Pickup fall speed (pixels per frame)
pub const PICKUP_FALL_SPEED: f32 = 1.2;

/// What a pickup grants; the player applies the effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RewardKind {
    SpreadShot,
    RapidFire,
    Shield,
    ExtraLife,
}

impl RewardKind {
    /// Weighted roll: extra lives are rare
    pub fn roll(rng: &mut impl Rng) -> Self {
        match rng.random_range(0..100u32) {
            0..35 => RewardKind::SpreadShot,
            35..70 => RewardKind::RapidFire,
            70..92 => RewardKind::Shield,
            _ => RewardKind::ExtraLife,
        }
    }
}

/// A collectible drifting toward the bottom of the screen
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pickup {
    pub id: EntityId,
    pub kind: RewardKind,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub active: bool,
}

impl Pickup {
    pub fn new(id: EntityId, kind: RewardKind, pos: Vec2) -> Self {
        Self {
            id,
            kind,
            pos,
            vel: Vec2::new(0.0, PICKUP_FALL_SPEED),
            radius: PICKUP_RADIUS,
            active: true,
        }
    }
}

impl Pooled for Pickup {
    fn id(&self) -> EntityId {
        self.id
    }

    fn visual(&self) -> Visual {
        Visual::Pickup(self.kind)
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

impl Drifting for Pickup {
    fn advance(&mut self, dt: f32) {
        self.pos += self.vel * dt;
        if !within_world(self.pos, OFFSCREEN_MARGIN) {
            self.active = false;
        }
    }
}
