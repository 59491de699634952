//! Combat simulation module
//!
//! All gameplay logic lives here. The module stays headless:
//! - Seeded RNG only
//! - Collaborators (player, presentation, feedback) passed in explicitly
//! - No rendering, audio or platform dependencies
//! - No blocking, threads or I/O inside a tick

pub mod boss;
pub mod collision;
pub mod curve;
pub mod events;
pub mod hostile;
pub mod particle;
pub mod pickup;
pub mod player;
pub mod pool;
pub mod projectile;
pub mod state;
pub mod tick;
pub mod wave;

pub use boss::{Boss, BossKind, BossUpdate, MovementProfile, Phase, SignatureAttack, Telegraph};
pub use collision::{CollisionReport, circles_overlap};
pub use curve::Curve;
pub use events::{Feedback, GameEvent, NullFeedback};
pub use hostile::{DivePattern, Hostile, HostileKind, Movement};
pub use particle::{Particle, ParticleStyle};
pub use pickup::{Pickup, RewardKind};
pub use player::{PlayerLink, PlayerShip};
pub use pool::{AddOutcome, EntityId, Pool, PoolKind, Pooled};
pub use projectile::{Owner, Projectile, ProjectileStyle, Shot};
pub use state::{CombatState, Diagnostics};
pub use tick::{EntityContext, tick};
pub use wave::WaveOrchestrator;
