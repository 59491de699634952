//! Difficulty and balance knobs
//!
//! Read by the simulation, owned by the host. Loaded from JSON when the host
//! ships a tuning file, otherwise built from a preset.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::FORMATION_SLOTS;
use crate::sanitize_scalar;

/// Difficulty preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DifficultyPreset {
    Casual,
    #[default]
    Standard,
    Brutal,
}

impl DifficultyPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            DifficultyPreset::Casual => "Casual",
            DifficultyPreset::Standard => "Standard",
            DifficultyPreset::Brutal => "Brutal",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "casual" | "easy" => Some(DifficultyPreset::Casual),
            "standard" | "normal" => Some(DifficultyPreset::Standard),
            "brutal" | "hard" => Some(DifficultyPreset::Brutal),
            _ => None,
        }
    }

    /// Hostile and boss health multiplier for this preset
    pub fn health_multiplier(&self) -> f32 {
        match self {
            DifficultyPreset::Casual => 0.75,
            DifficultyPreset::Standard => 1.0,
            DifficultyPreset::Brutal => 1.4,
        }
    }

    /// Hostile projectile speed scalar
    pub fn projectile_speed_scale(&self) -> f32 {
        match self {
            DifficultyPreset::Casual => 0.8,
            DifficultyPreset::Standard => 1.0,
            DifficultyPreset::Brutal => 1.25,
        }
    }

    /// Starting pressure (boss bullet density/speed)
    pub fn pressure(&self) -> f32 {
        match self {
            DifficultyPreset::Casual => 0.8,
            DifficultyPreset::Standard => 1.0,
            DifficultyPreset::Brutal => 1.3,
        }
    }
}

/// Errors from loading a balance file
#[derive(Debug, Error)]
pub enum BalanceError {
    #[error("balance JSON is malformed: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Tuning knobs for one run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Balance {
    pub preset: DifficultyPreset,

    // === Pool caps ===
    pub friendly_projectile_cap: usize,
    pub hostile_projectile_cap: usize,
    pub particle_cap: usize,
    /// Live basic hostiles (boss excluded)
    pub hostile_cap: usize,
    pub pickup_cap: usize,

    // === Waves ===
    /// Every level that is a multiple of this is a boss level
    pub boss_interval: u32,
    pub quota_base: u32,
    pub quota_per_level: u32,
    /// Inter-spawn delay in frames: `max(start - step * level, floor)`
    pub spawn_delay_start: f32,
    pub spawn_delay_step: f32,
    pub spawn_delay_floor: f32,

    // === Combat ===
    pub health_multiplier: f32,
    pub projectile_speed_scale: f32,
    /// Boss bullet count/speed scalar
    pub pressure: f32,
    /// Per-frame chance that a hostile in formation starts a dive
    pub dive_chance: f32,
    /// Chance that a kill drops a reward pickup
    pub reward_chance: f32,
}

impl Default for Balance {
    fn default() -> Self {
        Self {
            preset: DifficultyPreset::Standard,

            friendly_projectile_cap: 96,
            hostile_projectile_cap: 256,
            particle_cap: 200,
            hostile_cap: 32,
            pickup_cap: 16,

            boss_interval: 5,
            quota_base: 5,
            quota_per_level: 2,
            spawn_delay_start: 60.0,
            spawn_delay_step: 2.0,
            spawn_delay_floor: 20.0,

            health_multiplier: 1.0,
            projectile_speed_scale: 1.0,
            pressure: 1.0,
            dive_chance: 0.002,
            reward_chance: 0.08,
        }
    }
}

impl Balance {
    /// Create balance from a difficulty preset (applies preset defaults)
    pub fn from_preset(preset: DifficultyPreset) -> Self {
        let mut balance = Self::default();
        balance.apply_preset(preset);
        balance
    }

    /// Apply a difficulty preset (updates preset-dependent knobs)
    pub fn apply_preset(&mut self, preset: DifficultyPreset) {
        self.preset = preset;
        self.health_multiplier = preset.health_multiplier();
        self.projectile_speed_scale = preset.projectile_speed_scale();
        self.pressure = preset.pressure();

        if preset == DifficultyPreset::Brutal {
            self.spawn_delay_floor = 14.0;
            self.dive_chance = 0.004;
        }
    }

    /// Parse a JSON balance file; missing fields take defaults, bad values are clamped
    pub fn from_json(json: &str) -> Result<Self, BalanceError> {
        let balance: Balance = serde_json::from_str(json)?;
        Ok(balance.sanitized())
    }

    pub fn to_json(&self) -> Result<String, BalanceError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Clamp every knob into a playable range, replacing non-finite values with defaults
    pub fn sanitized(mut self) -> Self {
        let d = Self::default();

        self.friendly_projectile_cap = self.friendly_projectile_cap.clamp(1, 4096);
        self.hostile_projectile_cap = self.hostile_projectile_cap.clamp(1, 4096);
        self.particle_cap = self.particle_cap.min(8192);
        // One formation slot per live hostile
        self.hostile_cap = self.hostile_cap.clamp(1, FORMATION_SLOTS);
        self.pickup_cap = self.pickup_cap.min(256);

        self.boss_interval = self.boss_interval.max(1);
        self.quota_base = self.quota_base.min(1000);
        self.quota_per_level = self.quota_per_level.min(100);

        self.spawn_delay_start =
            sanitize_scalar(self.spawn_delay_start, d.spawn_delay_start, 1.0, 600.0);
        self.spawn_delay_step = sanitize_scalar(self.spawn_delay_step, d.spawn_delay_step, 0.0, 60.0);
        self.spawn_delay_floor =
            sanitize_scalar(self.spawn_delay_floor, d.spawn_delay_floor, 1.0, 600.0);

        self.health_multiplier =
            sanitize_scalar(self.health_multiplier, d.health_multiplier, 0.1, 10.0);
        self.projectile_speed_scale =
            sanitize_scalar(self.projectile_speed_scale, d.projectile_speed_scale, 0.1, 5.0);
        self.pressure = sanitize_scalar(self.pressure, d.pressure, 0.25, 4.0);
        self.dive_chance = sanitize_scalar(self.dive_chance, d.dive_chance, 0.0, 1.0);
        self.reward_chance = sanitize_scalar(self.reward_chance, d.reward_chance, 0.0, 1.0);
        self
    }

    #[inline]
    pub fn is_boss_level(&self, level: u32) -> bool {
        level > 0 && level.is_multiple_of(self.boss_interval)
    }

    /// Number of basic hostiles a non-boss level spawns
    pub fn quota_for_level(&self, level: u32) -> u32 {
        self.quota_base
            .saturating_add(self.quota_per_level.saturating_mul(level))
    }

    /// Frames between spawns; shrinks with level, never below the floor
    pub fn spawn_delay_for_level(&self, level: u32) -> f32 {
        (self.spawn_delay_start - self.spawn_delay_step * level as f32).max(self.spawn_delay_floor)
    }
}
