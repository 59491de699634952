//! Presentation hooks
//!
//! The core never reads presentation state. It announces when a
//! representation should appear or go away, and may ask whether one has
//! finished building so it can skip that entity's tick instead of touching a
//! half-built visual.

use serde::{Deserialize, Serialize};

use crate::sim::{BossKind, EntityId, HostileKind, ParticleStyle, ProjectileStyle, RewardKind};

/// What a representation should look like
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Visual {
    Projectile(ProjectileStyle),
    Particle(ParticleStyle),
    Hostile(HostileKind),
    Boss(BossKind),
    Pickup(RewardKind),
}

/// Implemented by the host renderer
pub trait Presentation {
    /// Create the on-screen representation for `id`
    fn show(&mut self, id: EntityId, visual: Visual);

    /// Tear down the representation for `id`
    fn hide(&mut self, id: EntityId);

    /// Whether the representation for `id` has finished building
    fn is_ready(&self, _id: EntityId) -> bool {
        true
    }
}

/// Headless presentation (tests, demo binary, dedicated servers)
#[derive(Debug, Default, Clone, Copy)]
pub struct NullPresentation;

impl Presentation for NullPresentation {
    fn show(&mut self, _id: EntityId, _visual: Visual) {}
    fn hide(&mut self, _id: EntityId) {}
}
