//! Projectiles and the shots that spawn them

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::pool::{Drifting, EntityId, Pooled};
use crate::consts::{OFFSCREEN_MARGIN, PROJECTILE_RADIUS};
use crate::presentation::Visual;
use crate::within_world;

/// Which side fired a projectile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Owner {
    Friendly,
    Hostile,
}

/// Opaque visual tag for projectiles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ProjectileStyle {
    #[default]
    Laser,
    PiercingLaser,
    /// Basic hostile shot
    Pellet,
    /// Boss phase 1/2 aimed shots
    Needle,
    /// Boss phase 3 rotating volley
    Orb,
    /// Cone signature move
    ConeShard,
    /// Ring signature move
    RingOrb,
}

/// A fire action's output before it is assigned an id and owner pool
///
/// Every fire action produces a (possibly empty) sequence of these.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shot {
    pub pos: Vec2,
    pub vel: Vec2,
    pub damage: f32,
    pub pierce: bool,
    pub style: ProjectileStyle,
}

impl Shot {
    pub fn new(pos: Vec2, vel: Vec2, style: ProjectileStyle) -> Self {
        Self {
            pos,
            vel,
            damage: 1.0,
            pierce: false,
            style,
        }
    }
}

/// A live projectile owned by exactly one pool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub id: EntityId,
    pub pos: Vec2,
    /// Pixels per frame
    pub vel: Vec2,
    pub damage: f32,
    pub owner: Owner,
    pub active: bool,
    /// Survives hits and may damage several targets
    pub pierce: bool,
    pub style: ProjectileStyle,
    pub radius: f32,
    /// Targets this piercing projectile has already damaged
    #[serde(default)]
    pub struck: Vec<EntityId>,
}

impl Projectile {
    pub fn from_shot(id: EntityId, owner: Owner, shot: Shot) -> Self {
        Self {
            id,
            pos: shot.pos,
            vel: shot.vel,
            damage: shot.damage,
            owner,
            active: true,
            pierce: shot.pierce,
            style: shot.style,
            radius: PROJECTILE_RADIUS,
            struck: Vec::new(),
        }
    }

    pub fn friendly(id: EntityId, pos: Vec2, vel: Vec2, damage: f32) -> Self {
        let shot = Shot {
            damage,
            ..Shot::new(pos, vel, ProjectileStyle::Laser)
        };
        Self::from_shot(id, Owner::Friendly, shot)
    }

    pub fn hostile(id: EntityId, pos: Vec2, vel: Vec2) -> Self {
        Self::from_shot(id, Owner::Hostile, Shot::new(pos, vel, ProjectileStyle::Pellet))
    }

    #[inline]
    pub fn deactivate(&mut self) {
        self.active = false;
    }

    /// Record a hit on `target`; piercing projectiles skip it from now on
    pub fn strike(&mut self, target: EntityId) {
        if self.pierce {
            self.struck.push(target);
        } else {
            self.deactivate();
        }
    }

    #[inline]
    pub fn has_struck(&self, target: EntityId) -> bool {
        self.struck.contains(&target)
    }
}

impl Pooled for Projectile {
    fn id(&self) -> EntityId {
        self.id
    }

    fn visual(&self) -> Visual {
        Visual::Projectile(self.style)
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

impl Drifting for Projectile {
    fn advance(&mut self, dt: f32) {
        if !self.active {
            return;
        }
        self.pos += self.vel * dt;
        if !within_world(self.pos, OFFSCREEN_MARGIN) {
            self.active = false;
        }
    }
}
