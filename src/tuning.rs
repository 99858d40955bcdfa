//! Data-driven game balance
//!
//! Every gameplay constant lives in [`Tuning`] so designers can override
//! values from JSON without touching the simulation. Partial documents are
//! fine: missing fields fall back to the defaults.

use std::fmt;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::platform::storage;

/// Gameplay constants for one session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Track geometry ===
    /// Lateral distance between lane centers
    pub lane_width: f32,
    /// Forward position of the player's tracking plane (camera-relative, fixed)
    pub player_z: f32,
    /// Where new entities appear (negative = ahead of the player)
    pub spawn_z: f32,
    /// Entities past this forward position are retired to their pool
    pub retire_z: f32,
    /// Half-depth of the band around `player_z` in which collisions are tested
    pub collision_window: f32,
    /// Band behind the spawn point in which a same-lane entity blocks a spawn
    pub too_close_band: f32,

    // === Bounding regions ===
    pub player_half_extents: Vec3,
    pub player_center_y: f32,
    pub wall_half_extents: Vec3,
    pub crystal_half_extents: Vec3,
    pub entity_center_y: f32,

    // === Player motion ===
    /// Lateral units per second while sliding toward the target lane
    pub lateral_rate: f32,
    /// Seconds between accepted lane changes
    pub move_cooldown: f32,
    pub initial_speed: f32,
    pub max_speed: f32,
    /// Speed gained per unit of distance traveled
    pub speed_ramp: f32,

    // === Pools ===
    pub obstacle_pool: usize,
    pub crystal_pool: usize,

    // === Spawn pacing (seconds of game time) ===
    pub obstacle_initial_delay: f32,
    pub crystal_initial_delay: f32,
    pub obstacle_interval_min: f32,
    pub obstacle_interval_max: f32,
    /// Seconds removed from both interval bounds per unit of distance
    pub interval_shrink: f32,
    pub interval_floor_min: f32,
    pub interval_floor_max: f32,
    /// Crystal patterns are spaced further apart than single obstacles
    pub crystal_interval_multiplier: f32,
    /// Forward gap between consecutive crystals of one pattern
    pub crystal_pattern_spacing: f32,
    /// Max extra distance beyond `spawn_z` for a pattern's base point
    pub crystal_base_jitter: f32,

    // === Difficulty ===
    /// Distance before which only single walls spawn
    pub double_wall_threshold: f32,
    /// Double-wall probability gained per unit past the threshold
    pub double_wall_ramp: f32,
    pub double_wall_max_chance: f32,

    // === Scoring ===
    pub avoid_bonus: u64,
    pub crystal_value: u64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            lane_width: 2.5,
            player_z: 0.0,
            spawn_z: -100.0,
            retire_z: 6.0,
            collision_window: 3.0,
            too_close_band: 14.0,

            player_half_extents: Vec3::new(0.6, 0.4, 0.6),
            player_center_y: 0.6,
            wall_half_extents: Vec3::new(1.0, 1.0, 0.5),
            crystal_half_extents: Vec3::splat(0.45),
            entity_center_y: 1.0,

            lateral_rate: 14.0,
            move_cooldown: 0.2,
            initial_speed: 16.0,
            max_speed: 42.0,
            speed_ramp: 0.008,

            obstacle_pool: 12,
            crystal_pool: 8,

            obstacle_initial_delay: 1.5,
            crystal_initial_delay: 2.5,
            obstacle_interval_min: 0.9,
            obstacle_interval_max: 1.8,
            interval_shrink: 0.0002,
            interval_floor_min: 0.4,
            interval_floor_max: 0.7,
            crystal_interval_multiplier: 2.5,
            crystal_pattern_spacing: 4.0,
            crystal_base_jitter: 10.0,

            double_wall_threshold: 500.0,
            double_wall_ramp: 0.0004,
            double_wall_max_chance: 0.4,

            avoid_bonus: 10,
            crystal_value: 50,
        }
    }
}

/// Inconsistent tuning values
#[derive(Debug, Clone, PartialEq)]
pub enum TuningError {
    EmptyPool(&'static str),
    NonPositive(&'static str),
    SpawnInsideCollisionWindow,
    RetireBeforePlayer,
    InvertedInterval,
    InvertedSpeed,
}

impl fmt::Display for TuningError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TuningError::EmptyPool(which) => write!(f, "{which} pool capacity must be at least 1"),
            TuningError::NonPositive(field) => write!(f, "{field} must be greater than zero"),
            TuningError::SpawnInsideCollisionWindow => {
                write!(f, "spawn point lies inside the collision window")
            }
            TuningError::RetireBeforePlayer => {
                write!(f, "retire plane must lie behind the collision window")
            }
            TuningError::InvertedInterval => {
                write!(f, "spawn interval minimum exceeds its maximum")
            }
            TuningError::InvertedSpeed => write!(f, "max_speed is below initial_speed"),
        }
    }
}

impl std::error::Error for TuningError {}

impl Tuning {
    /// LocalStorage key for designer overrides
    const STORAGE_KEY: &'static str = "neon_runner_tuning";

    /// Stored overrides if present and valid, otherwise the defaults
    pub fn load() -> Self {
        match storage::load_json::<Tuning>(Self::STORAGE_KEY) {
            Some(tuning) => tuning.validated_or_default(),
            None => Self::default(),
        }
    }

    fn validated_or_default(self) -> Self {
        match self.validate() {
            Ok(()) => {
                log::info!("Using tuning overrides");
                self
            }
            Err(e) => {
                log::warn!("Ignoring tuning overrides: {e}");
                Self::default()
            }
        }
    }

    /// Parse tuning overrides from JSON
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Check that the values describe a playable track
    pub fn validate(&self) -> Result<(), TuningError> {
        if self.obstacle_pool == 0 {
            return Err(TuningError::EmptyPool("obstacle"));
        }
        if self.crystal_pool == 0 {
            return Err(TuningError::EmptyPool("crystal"));
        }
        for (name, value) in [
            ("lane_width", self.lane_width),
            ("lateral_rate", self.lateral_rate),
            ("initial_speed", self.initial_speed),
            ("interval_floor_min", self.interval_floor_min),
            ("collision_window", self.collision_window),
            ("crystal_interval_multiplier", self.crystal_interval_multiplier),
        ] {
            if value <= 0.0 {
                return Err(TuningError::NonPositive(name));
            }
        }
        if self.max_speed < self.initial_speed {
            return Err(TuningError::InvertedSpeed);
        }
        let far_edge = self.spawn_z + self.wall_half_extents.z;
        if far_edge >= self.player_z - self.collision_window {
            return Err(TuningError::SpawnInsideCollisionWindow);
        }
        if self.retire_z <= self.player_z + self.collision_window {
            return Err(TuningError::RetireBeforePlayer);
        }
        if self.obstacle_interval_min > self.obstacle_interval_max
            || self.interval_floor_min > self.interval_floor_max
        {
            return Err(TuningError::InvertedInterval);
        }
        Ok(())
    }

    /// Forward speed for the given distance: linear ramp saturating at `max_speed`
    pub fn speed_for_distance(&self, distance: f32) -> f32 {
        (self.initial_speed + distance.max(0.0) * self.speed_ramp).min(self.max_speed)
    }
}
