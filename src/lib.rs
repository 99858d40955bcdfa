//! Neon Runner - a three-lane hoverboard endless runner
//!
//! Core modules:
//! - `sim`: Deterministic simulation (lanes, spawning, collisions, game state)
//! - `game`: Simulation wired to audio and high score collaborators
//! - `platform`: Browser/native input and storage abstraction
//! - `tuning`: Data-driven game balance
//! - `settings`: Player preferences

pub mod audio;
pub mod game;
pub mod highscores;
pub mod platform;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use game::Game;
pub use highscores::{HighScoreStore, LocalHighScore, MemoryHighScore};
pub use settings::Settings;
pub use tuning::Tuning;

/// Host loop constants
pub mod consts {
    /// Fixed simulation timestep used by the host (120 Hz)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest frame delta the host will feed in (tab switches, debugger pauses)
    pub const MAX_FRAME_DT: f32 = 0.1;
}
