//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must stay pure and deterministic:
//! - Seeded RNG only
//! - Behavior depends only on the sequence of deltas and commands it receives
//! - Stable iteration order (by pool slot)
//! - No rendering, audio or platform dependencies

pub mod autopilot;
pub mod collision;
pub mod entity;
pub mod lane;
pub mod player;
pub mod pool;
pub mod spawn;
pub mod state;
pub mod tick;

pub use autopilot::autopilot_command;
pub use collision::{Contact, final_score, in_collision_window};
pub use entity::{Aabb, EntityKind, MovingEntity, ObstacleKind};
pub use lane::{LANE_COUNT, Lane, lane_offset};
pub use player::Player;
pub use pool::EntityPool;
pub use spawn::{CrystalPattern, SpawnDirector, SpawnStats};
pub use state::{
    Command, GameEvent, GamePhase, GameSession, RenderKind, Renderable, SessionSnapshot,
};
pub use tick::{apply_command, tick};
