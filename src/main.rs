//! Swarm Siege headless demo
//!
//! Drives a scripted player through several levels against the combat core
//! and logs what happened. Usage:
//!
//! ```text
//! swarm-siege [casual|standard|brutal] [levels]
//! ```

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use std::collections::BTreeMap;

    use glam::Vec2;
    use swarm_siege::consts::{FRAME_MS, WORLD_WIDTH};
    use swarm_siege::sim::{
        CombatState, Feedback, GameEvent, PlayerLink, PlayerShip, ProjectileStyle, RewardKind, Shot,
    };
    use swarm_siege::{Balance, DifficultyPreset, NullPresentation};

    /// Frames to wait after a level clears before starting the next one
    const GRACE_FRAMES: u32 = 60;
    /// Give up on a level after this many frames
    const LEVEL_FRAME_LIMIT: u32 = 60 * 120;
    const PLAYER_SPEED: f32 = 6.0;
    const LASER_SPEED: f32 = 10.0;

    /// Counts events by name
    #[derive(Default)]
    struct EventTally {
        counts: BTreeMap<&'static str, u32>,
    }

    impl Feedback for EventTally {
        fn notify(&mut self, event: GameEvent) {
            if let GameEvent::CapacityWarning { pool } = event {
                log::debug!("capacity warning: {}", pool.as_str());
            }
            *self.counts.entry(event.name()).or_insert(0) += 1;
        }
    }

    /// Autopilot: chase the nearest target's x and keep firing
    struct Pilot {
        fire_interval: u32,
        spread: bool,
        cooldown: u32,
    }

    impl Pilot {
        fn new() -> Self {
            Self {
                fire_interval: 8,
                spread: false,
                cooldown: 0,
            }
        }

        fn apply_rewards(&mut self, ship: &mut PlayerShip) {
            for reward in ship.pending_rewards.drain(..) {
                match reward {
                    RewardKind::SpreadShot => self.spread = true,
                    RewardKind::RapidFire => self.fire_interval = (self.fire_interval - 1).max(4),
                    RewardKind::Shield | RewardKind::ExtraLife => {}
                }
            }
        }

        fn steer(&self, state: &CombatState, ship: &mut PlayerShip) {
            let target = state
                .boss
                .as_ref()
                .map(|b| b.pos)
                .or_else(|| {
                    state
                        .hostiles
                        .iter()
                        .filter(|h| h.pos.y > 0.0)
                        .min_by(|a, b| {
                            (a.pos.x - ship.pos.x)
                                .abs()
                                .total_cmp(&(b.pos.x - ship.pos.x).abs())
                        })
                        .map(|h| h.pos)
                });
            if let Some(target) = target {
                let dx = (target.x - ship.pos.x).clamp(-PLAYER_SPEED, PLAYER_SPEED);
                ship.pos.x = (ship.pos.x + dx).clamp(20.0, WORLD_WIDTH - 20.0);
            }
        }

        fn volley(&mut self, ship: &PlayerShip) -> Vec<Shot> {
            if self.cooldown > 0 {
                self.cooldown -= 1;
                return Vec::new();
            }
            self.cooldown = self.fire_interval;
            let origin = ship.position() - Vec2::new(0.0, 16.0);
            let angles: &[f32] = if self.spread { &[-0.12, 0.0, 0.12] } else { &[0.0] };
            angles
                .iter()
                .map(|a| {
                    let vel = Vec2::new(a.sin(), -a.cos()) * LASER_SPEED;
                    Shot::new(origin, vel, ProjectileStyle::Laser)
                })
                .collect()
        }
    }

    pub fn run() {
        let mut args = std::env::args().skip(1);
        let preset = args
            .next()
            .and_then(|s| DifficultyPreset::from_str(&s))
            .unwrap_or_default();
        let levels: u32 = args.next().and_then(|s| s.parse().ok()).unwrap_or(5);

        let balance = Balance::from_preset(preset);
        log::info!("preset {}, {} levels", preset.as_str(), levels);
        match balance.to_json() {
            Ok(json) => log::debug!("balance: {json}"),
            Err(e) => log::warn!("balance not serializable: {e}"),
        }

        let mut state = CombatState::new(balance, 0x5eed);
        let mut ship = PlayerShip::default();
        let mut pilot = Pilot::new();
        let mut presentation = NullPresentation;
        let mut tally = EventTally::default();
        let mut frame: u64 = 0;

        for level in 1..=levels {
            state.start_level(level, frame as f64 * FRAME_MS, &mut presentation, &mut tally);
            let mut cleared_for = 0;

            for _ in 0..LEVEL_FRAME_LIMIT {
                frame += 1;
                let now = frame as f64 * FRAME_MS;

                ship.tick(1.0);
                pilot.apply_rewards(&mut ship);
                pilot.steer(&state, &mut ship);
                for shot in pilot.volley(&ship) {
                    state.fire_friendly(shot, &mut presentation, &mut tally);
                }

                let complete = state.update(1.0, now, &mut ship, &mut presentation, &mut tally);
                if !ship.is_alive() {
                    log::warn!("player out of lives on level {}, refilling", level);
                    ship.lives = 3;
                }

                if complete {
                    cleared_for += 1;
                    if cleared_for >= GRACE_FRAMES {
                        break;
                    }
                } else {
                    cleared_for = 0;
                }
            }

            if !state.is_level_complete() {
                log::warn!("level {} not cleared within the frame limit", level);
            }
            match serde_json::to_string(&state.diagnostics()) {
                Ok(json) => println!("{json}"),
                Err(e) => log::error!("diagnostics not serializable: {e}"),
            }
        }

        println!(
            "score {} | kills {} | hits taken {} | frames {}",
            state.score, state.kills, ship.hits_taken, frame
        );
        for (name, count) in &tally.counts {
            println!("  {name}: {count}");
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Swarm Siege (headless demo) starting...");
    demo::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The browser host drives the library directly
}
