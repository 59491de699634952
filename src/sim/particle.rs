//! Cosmetic particles
//!
//! Particles never collide and never feed back into gameplay. Removing every
//! particle from a run must not change its outcome.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::pool::{Drifting, EntityId, Pooled};
use crate::polar_to_cartesian;
use crate::presentation::Visual;

/// Particle look, also selects the burst shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParticleStyle {
    Explosion,
    BossExplosion,
    Spark,
    Pickup,
    Telegraph,
}

/// How a feedback request turns into particles
#[derive(Debug, Clone, Copy)]
pub struct BurstSpec {
    pub count: usize,
    pub speed: (f32, f32),
    pub lifetime: (f32, f32),
    pub size: (f32, f32),
}

impl ParticleStyle {
    pub fn burst(&self) -> BurstSpec {
        match self {
            ParticleStyle::Explosion => BurstSpec {
                count: 16,
                speed: (1.5, 4.5),
                lifetime: (20.0, 40.0),
                size: (3.0, 6.0),
            },
            ParticleStyle::BossExplosion => BurstSpec {
                count: 64,
                speed: (2.0, 8.0),
                lifetime: (40.0, 90.0),
                size: (4.0, 10.0),
            },
            ParticleStyle::Spark => BurstSpec {
                count: 4,
                speed: (2.0, 5.0),
                lifetime: (6.0, 12.0),
                size: (1.5, 3.0),
            },
            ParticleStyle::Pickup => BurstSpec {
                count: 8,
                speed: (1.0, 2.5),
                lifetime: (18.0, 30.0),
                size: (2.0, 4.0),
            },
            ParticleStyle::Telegraph => BurstSpec {
                count: 12,
                speed: (0.5, 1.5),
                lifetime: (24.0, 36.0),
                size: (3.0, 5.0),
            },
        }
    }
}

/// A cosmetic moving point with a finite lifetime (frames)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub id: EntityId,
    pub pos: Vec2,
    pub vel: Vec2,
    pub style: ParticleStyle,
    pub size: f32,
    pub age: f32,
    pub lifetime: f32,
}

impl Particle {
    pub fn new(id: EntityId, pos: Vec2, vel: Vec2, style: ParticleStyle, size: f32, lifetime: f32) -> Self {
        Self {
            id,
            pos,
            vel,
            style,
            size,
            age: 0.0,
            lifetime,
        }
    }

    /// One randomized particle of a burst centred on `center`
    pub fn scattered(id: EntityId, center: Vec2, style: ParticleStyle, rng: &mut impl Rng) -> Self {
        let burst = style.burst();
        let angle = rng.random_range(0.0..std::f32::consts::TAU);
        let speed = rng.random_range(burst.speed.0..=burst.speed.1);
        let lifetime = rng.random_range(burst.lifetime.0..=burst.lifetime.1);
        let size = rng.random_range(burst.size.0..=burst.size.1);
        Self::new(id, center, polar_to_cartesian(speed, angle), style, size, lifetime)
    }

    /// Remaining life in [0, 1]
    pub fn life(&self) -> f32 {
        if self.lifetime <= 0.0 {
            0.0
        } else {
            (1.0 - self.age / self.lifetime).clamp(0.0, 1.0)
        }
    }
}

impl Pooled for Particle {
    fn id(&self) -> EntityId {
        self.id
    }

    fn visual(&self) -> Visual {
        Visual::Particle(self.style)
    }

    fn is_active(&self) -> bool {
        self.age < self.lifetime
    }
}

impl Drifting for Particle {
    fn advance(&mut self, dt: f32) {
        self.pos += self.vel * dt;
        self.vel *= 0.97f32.powf(dt);
        self.size *= 0.99f32.powf(dt);
        self.age += dt;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_expires_at_lifetime() {
        let mut p = Particle::new(1, Vec2::ZERO, Vec2::X, ParticleStyle::Spark, 2.0, 3.0);
        p.advance(1.0);
        p.advance(1.0);
        assert!(p.is_active());
        p.advance(1.0);
        assert!(!p.is_active());
        assert_eq!(p.life(), 0.0);
    }

    #[test]
    fn test_scattered_within_burst_ranges() {
        let mut rng = Pcg32::seed_from_u64(3);
        for id in 0..50 {
            let p = Particle::scattered(id, Vec2::new(5.0, 5.0), ParticleStyle::Explosion, &mut rng);
            let burst = ParticleStyle::Explosion.burst();
            let speed = p.vel.length();
            assert!(speed >= burst.speed.0 - 1e-3 && speed <= burst.speed.1 + 1e-3);
            assert!(p.lifetime >= burst.lifetime.0 && p.lifetime <= burst.lifetime.1);
            assert_eq!(p.pos, Vec2::new(5.0, 5.0));
        }
    }

    #[test]
    fn test_drag_slows_particles() {
        let mut p = Particle::new(1, Vec2::ZERO, Vec2::new(10.0, 0.0), ParticleStyle::Explosion, 4.0, 100.0);
        p.advance(1.0);
        assert!(p.vel.x < 10.0);
        assert!(p.size < 4.0);
    }
}
