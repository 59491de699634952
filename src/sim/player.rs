//! Player collaborator
//!
//! The core only needs to know where the player is, whether it can be hurt,
//! and how to hand it hits and rewards. `PlayerShip` is a minimal reference
//! implementation used by the demo binary and tests.

use glam::Vec2;

use super::pickup::RewardKind;
use crate::consts::{PLAYER_RADIUS, WORLD_HEIGHT, WORLD_WIDTH};

/// What the combat core needs from the player
pub trait PlayerLink {
    fn position(&self) -> Vec2;

    fn radius(&self) -> f32 {
        PLAYER_RADIUS
    }

    fn is_invulnerable(&self) -> bool;

    /// Apply one hit
    fn take_hit(&mut self);

    /// Apply a collected reward
    fn collect(&mut self, reward: RewardKind);
}

/// Frames of invulnerability after a hit
pub const HIT_INVULNERABILITY_FRAMES: f32 = 120.0;
pub const MAX_LIVES: u8 = 9;

#[derive(Debug, Clone)]
pub struct PlayerShip {
    pub pos: Vec2,
    pub lives: u8,
    /// Tick-accumulated (frames)
    pub invulnerable_for: f32,
    pub shield: bool,
    /// Weapon rewards waiting for the host's weapon system
    pub pending_rewards: Vec<RewardKind>,
    pub hits_taken: u32,
}

impl Default for PlayerShip {
    fn default() -> Self {
        Self::new(Vec2::new(WORLD_WIDTH / 2.0, WORLD_HEIGHT - 50.0))
    }
}

impl PlayerShip {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            lives: 3,
            invulnerable_for: 0.0,
            shield: false,
            pending_rewards: Vec::new(),
            hits_taken: 0,
        }
    }

    /// Count down invulnerability
    pub fn tick(&mut self, dt: f32) {
        self.invulnerable_for = (self.invulnerable_for - dt).max(0.0);
    }

    pub fn is_alive(&self) -> bool {
        self.lives > 0
    }
}

impl PlayerLink for PlayerShip {
    fn position(&self) -> Vec2 {
        self.pos
    }

    fn is_invulnerable(&self) -> bool {
        self.invulnerable_for > 0.0
    }

    fn take_hit(&mut self) {
        self.hits_taken += 1;
        if self.shield {
            self.shield = false;
        } else {
            self.lives = self.lives.saturating_sub(1);
        }
        self.invulnerable_for = HIT_INVULNERABILITY_FRAMES;
    }

    fn collect(&mut self, reward: RewardKind) {
        match reward {
            RewardKind::ExtraLife => self.lives = (self.lives + 1).min(MAX_LIVES),
            RewardKind::Shield => self.shield = true,
            RewardKind::SpreadShot | RewardKind::RapidFire => self.pending_rewards.push(reward),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_grants_invulnerability() {
        let mut p = PlayerShip::default();
        p.take_hit();
        assert_eq!(p.lives, 2);
        assert!(p.is_invulnerable());
        p.tick(HIT_INVULNERABILITY_FRAMES);
        assert!(!p.is_invulnerable());
    }

    #[test]
    fn test_shield_absorbs_a_hit() {
        let mut p = PlayerShip::default();
        p.collect(RewardKind::Shield);
        p.take_hit();
        assert_eq!(p.lives, 3);
        assert!(!p.shield);
    }

    #[test]
    fn test_extra_life_capped() {
        let mut p = PlayerShip::default();
        for _ in 0..20 {
            p.collect(RewardKind::ExtraLife);
        }
        assert_eq!(p.lives, MAX_LIVES);
    }
}
