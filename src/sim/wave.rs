//! Level and spawn scheduling
//!
//! The orchestrator only decides *when* and *what* to spawn. Building the
//! entities and pushing them through the capped hostile pool is done by the
//! combat state, so a dropped spawn still consumes quota and spawning always
//! terminates.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::hostile::HostileKind;
use crate::balance::Balance;
use crate::consts::{
    FORMATION_COLS, FORMATION_LEFT, FORMATION_ROWS, FORMATION_SPACING_X, FORMATION_SPACING_Y,
    FORMATION_TOP, WORLD_WIDTH,
};

/// Spawn height above the top edge
const SPAWN_Y: f32 = -30.0;
/// Horizontal inset for random spawn points
const SPAWN_INSET: f32 = 40.0;

/// Archetype weights (Scout, Striker, Brute, Weaver) for a level
///
/// Early levels lean on the easy archetypes; from level 10 the draw is uniform.
pub fn kind_weights(level: u32) -> [u32; 4] {
    match level {
        0..=2 => [70, 30, 0, 0],
        3..=5 => [45, 35, 10, 10],
        6..=9 => [30, 30, 20, 20],
        _ => [25, 25, 25, 25],
    }
}

/// Weighted archetype draw for `level`
pub fn pick_kind(level: u32, rng: &mut impl Rng) -> HostileKind {
    let weights = kind_weights(level);
    let total: u32 = weights.iter().sum();
    let mut roll = rng.random_range(0..total);
    for (kind, weight) in HostileKind::ALL.iter().zip(weights) {
        if roll < weight {
            return *kind;
        }
        roll -= weight;
    }
    HostileKind::Scout
}

/// Random point along the top edge, just off screen
pub fn spawn_point(rng: &mut impl Rng) -> Vec2 {
    Vec2::new(
        rng.random_range(SPAWN_INSET..=WORLD_WIDTH - SPAWN_INSET),
        SPAWN_Y,
    )
}

/// Formation anchor for grid slot `slot` (wraps after the last row)
pub fn formation_anchor(slot: u32) -> Vec2 {
    let slot = slot % (FORMATION_COLS * FORMATION_ROWS);
    let col = slot % FORMATION_COLS;
    let row = slot / FORMATION_COLS;
    Vec2::new(
        FORMATION_LEFT + col as f32 * FORMATION_SPACING_X,
        FORMATION_TOP + row as f32 * FORMATION_SPACING_Y,
    )
}

/// Per-level spawn schedule
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WaveOrchestrator {
    pub level: u32,
    pub boss_level: bool,
    pub spawning: bool,
    /// Hostiles still to be spawned this level
    pub quota_remaining: u32,
    /// Frames between spawns
    pub spawn_delay: f32,
    /// Tick-accumulated countdown to the next spawn (frames)
    pub spawn_timer: f32,
}

impl WaveOrchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset the schedule for `level`; returns true if this is a boss level
    ///
    /// A boss level schedules no basic hostiles: the caller spawns the single
    /// boss.
    pub fn start_level(&mut self, level: u32, balance: &Balance) -> bool {
        self.level = level;
        self.boss_level = balance.is_boss_level(level);

        if self.boss_level {
            self.spawning = false;
            self.quota_remaining = 0;
            self.spawn_delay = 0.0;
            self.spawn_timer = 0.0;
        } else {
            self.quota_remaining = balance.quota_for_level(level);
            self.spawning = self.quota_remaining > 0;
            self.spawn_delay = balance.spawn_delay_for_level(level).max(1.0);
            self.spawn_timer = self.spawn_delay;
        }
        self.boss_level
    }

    /// Advance the spawn timer; returns how many spawns fell due this tick
    ///
    /// Each returned spawn has already been taken off the quota.
    pub fn update(&mut self, dt: f32) -> u32 {
        if !self.spawning {
            return 0;
        }
        self.spawn_timer -= dt.max(0.0);

        let mut due = 0;
        while self.spawn_timer <= 0.0 && self.quota_remaining > 0 {
            due += 1;
            self.quota_remaining -= 1;
            self.spawn_timer += self.spawn_delay;
        }
        if self.quota_remaining == 0 {
            self.spawning = false;
        }
        due
    }

    /// First formation slot whose anchor is not in `taken`
    ///
    /// Slots freed by kills are reused. With every slot held the grid wraps
    /// onto slot `taken.len()`, which the hostile cap keeps from happening.
    pub fn free_anchor(&self, taken: &[Vec2]) -> Vec2 {
        (0..FORMATION_COLS * FORMATION_ROWS)
            .map(formation_anchor)
            .find(|anchor| !taken.contains(anchor))
            .unwrap_or_else(|| formation_anchor(taken.len() as u32))
    }

    /// True iff nothing is live and nothing more will spawn
    #[inline]
    pub fn is_level_complete(&self, live_hostiles: usize) -> bool {
        live_hostiles == 0 && !self.spawning
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::WORLD_HEIGHT;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_level_one_schedule() {
        let balance = Balance::default();
        let mut wave = WaveOrchestrator::new();
        assert!(!wave.start_level(1, &balance));
        assert_eq!(wave.quota_remaining, 7);
        assert_eq!(wave.spawn_delay, 58.0);
        assert!(wave.spawning);
        assert!(!wave.is_level_complete(0));

        let mut spawned = 0;
        for _ in 0..7 * 58 {
            spawned += wave.update(1.0);
        }
        assert_eq!(spawned, 7);
        assert!(!wave.spawning);
        assert!(wave.is_level_complete(0));
        assert!(!wave.is_level_complete(3));
    }

    #[test]
    fn test_first_spawn_waits_one_delay() {
        let balance = Balance::default();
        let mut wave = WaveOrchestrator::new();
        wave.start_level(1, &balance);
        for _ in 0..57 {
            assert_eq!(wave.update(1.0), 0);
        }
        assert_eq!(wave.update(1.0), 1);
    }

    #[test]
    fn test_large_delta_releases_several() {
        let balance = Balance::default();
        let mut wave = WaveOrchestrator::new();
        wave.start_level(1, &balance);
        assert_eq!(wave.update(58.0 * 3.0), 3);
        assert_eq!(wave.quota_remaining, 4);
        // Never more than the quota
        assert_eq!(wave.update(10_000.0), 4);
        assert!(!wave.spawning);
        assert_eq!(wave.update(10_000.0), 0);
    }

    #[test]
    fn test_boss_level_schedules_nothing() {
        let balance = Balance::default();
        let mut wave = WaveOrchestrator::new();
        assert!(wave.start_level(5, &balance));
        assert!(!wave.spawning);
        assert_eq!(wave.update(100.0), 0);
    }

    #[test]
    fn test_restart_mid_level_resets() {
        let balance = Balance::default();
        let mut wave = WaveOrchestrator::new();
        wave.start_level(3, &balance);
        wave.update(200.0);
        wave.start_level(4, &balance);
        assert_eq!(wave.quota_remaining, balance.quota_for_level(4));
        assert!(wave.spawning);
    }

    #[test]
    fn test_free_anchor_fills_holes_first() {
        let wave = WaveOrchestrator::new();
        assert_eq!(wave.free_anchor(&[]), formation_anchor(0));

        let taken = [formation_anchor(0), formation_anchor(2), formation_anchor(1)];
        assert_eq!(wave.free_anchor(&taken), formation_anchor(3));

        // Slot 1 freed by a kill
        let taken = [formation_anchor(0), formation_anchor(2)];
        assert_eq!(wave.free_anchor(&taken), formation_anchor(1));
    }

    #[test]
    fn test_early_levels_only_easy_kinds() {
        let mut rng = Pcg32::seed_from_u64(3);
        for _ in 0..300 {
            let kind = pick_kind(1, &mut rng);
            assert!(matches!(kind, HostileKind::Scout | HostileKind::Striker));
        }
    }

    #[test]
    fn test_late_levels_draw_every_kind() {
        let mut rng = Pcg32::seed_from_u64(4);
        let mut seen = [false; 4];
        for _ in 0..400 {
            let kind = pick_kind(12, &mut rng);
            if let Some(idx) = HostileKind::ALL.iter().position(|k| *k == kind) {
                seen[idx] = true;
            }
        }
        assert!(seen.iter().all(|s| *s));
    }

    #[test]
    fn test_formation_grid_on_screen_and_wraps() {
        for slot in 0..FORMATION_COLS * FORMATION_ROWS {
            let a = formation_anchor(slot);
            assert!(a.x > 0.0 && a.x < WORLD_WIDTH);
            assert!(a.y > 0.0 && a.y < WORLD_HEIGHT / 2.0);
        }
        assert_eq!(formation_anchor(FORMATION_COLS * FORMATION_ROWS), formation_anchor(0));
    }

    #[test]
    fn test_spawn_point_above_screen() {
        let mut rng = Pcg32::seed_from_u64(5);
        for _ in 0..50 {
            let p = spawn_point(&mut rng);
            assert!(p.y < 0.0);
            assert!((SPAWN_INSET..=WORLD_WIDTH - SPAWN_INSET).contains(&p.x));
        }
    }
}
