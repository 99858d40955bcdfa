//! Session state and the idle → playing → game over lifecycle
//!
//! `GameSession` is the single source of truth for a run. Hosts mutate it
//! only through commands and `tick`; every command is a complete transition
//! so input arriving between two ticks never leaves partial state.

use glam::Vec3;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::{Contact, final_score};
use super::entity::{EntityKind, ObstacleKind};
use super::player::Player;
use super::pool::EntityPool;
use super::spawn::SpawnDirector;
use crate::tuning::Tuning;

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GamePhase {
    /// Menu, no simulation
    #[default]
    Idle,
    /// Full tick loop active
    Playing,
    /// Run ended, simulation frozen until restart
    GameOver,
}

/// Discrete player commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    MoveLeft,
    MoveRight,
    Start,
    Restart,
}

/// Things that happened during a tick or command, for audio/particles
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    Started,
    CrystalCollected { position: Vec3 },
    ObstacleAvoided,
    ObstacleHit { position: Vec3 },
    GameOver { score: u64, distance: u64 },
}

/// What a renderer draws for one sub-position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RenderKind {
    Player,
    Wall,
    /// One half of a double wall
    DoubleWall,
    Crystal,
}

/// Read-only position/visibility pair handed to the renderer each frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Renderable {
    pub kind: RenderKind,
    /// Pool slot (0 for the player)
    pub slot: u32,
    pub position: Vec3,
    pub visible: bool,
}

/// Observable fields for the UI layer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub phase: GamePhase,
    pub distance: u64,
    pub score: u64,
    pub crystals: u32,
    pub obstacles_avoided: u32,
    pub high_score: u64,
    pub speed: f32,
    pub lane: u8,
}

/// Complete state of one game session
#[derive(Debug, Clone)]
pub struct GameSession {
    /// Base seed; each run derives its own stream from it
    pub seed: u64,
    /// Runs started so far
    pub runs: u32,
    pub tuning: Tuning,
    pub phase: GamePhase,
    /// Seconds of game time since the run began
    pub game_time: f32,
    pub player: Player,
    pub obstacles: EntityPool,
    pub crystals: EntityPool,
    pub spawner: SpawnDirector,
    pub crystals_collected: u32,
    pub obstacles_avoided: u32,
    /// Best score known to the session (mirrors the external store)
    pub high_score: u64,
    pub(crate) rng: Pcg32,
    events: Vec<GameEvent>,
}

impl GameSession {
    /// Create an idle session; pools are allocated here and reused for life
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        Self {
            seed,
            runs: 0,
            phase: GamePhase::Idle,
            game_time: 0.0,
            player: Player::default(),
            obstacles: EntityPool::new(EntityKind::Obstacle, tuning.obstacle_pool),
            crystals: EntityPool::new(EntityKind::Crystal, tuning.crystal_pool),
            spawner: SpawnDirector::default(),
            crystals_collected: 0,
            obstacles_avoided: 0,
            high_score: 0,
            rng: Pcg32::seed_from_u64(seed),
            events: Vec::new(),
            tuning,
        }
    }

    /// idle → playing. No-op in any other phase.
    pub fn start(&mut self) -> bool {
        if self.phase != GamePhase::Idle {
            return false;
        }
        self.begin_run();
        true
    }

    /// game over → playing. No-op in any other phase.
    pub fn restart(&mut self) -> bool {
        if self.phase != GamePhase::GameOver {
            return false;
        }
        self.begin_run();
        true
    }

    fn begin_run(&mut self) {
        self.runs += 1;
        let run_seed = self.seed ^ (self.runs as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
        self.rng = Pcg32::seed_from_u64(run_seed);

        self.game_time = 0.0;
        self.crystals_collected = 0;
        self.obstacles_avoided = 0;
        self.obstacles.clear();
        self.crystals.clear();
        self.spawner.arm(&self.tuning);
        self.player.start_moving(&self.tuning);
        self.phase = GamePhase::Playing;

        log::info!("Run {} started (seed {:#x})", self.runs, run_seed);
        self.events.push(GameEvent::Started);
    }

    /// playing → game over after an obstacle hit. Idempotent.
    pub(crate) fn end_run(&mut self, hit: Contact) {
        if self.phase != GamePhase::Playing {
            return;
        }
        self.phase = GamePhase::GameOver;
        self.spawner.halt();
        self.player.stop_moving();

        let score = self.score();
        let distance = self.distance();
        log::info!("Game over: score {} at distance {}", score, distance);
        self.events.push(GameEvent::ObstacleHit {
            position: hit.position,
        });
        self.events.push(GameEvent::GameOver { score, distance });
    }

    /// Shift one lane left while playing
    pub fn move_left(&mut self) -> bool {
        self.phase == GamePhase::Playing && self.player.move_left(&self.tuning)
    }

    /// Shift one lane right while playing
    pub fn move_right(&mut self) -> bool {
        self.phase == GamePhase::Playing && self.player.move_right(&self.tuning)
    }

    /// Floored forward distance
    pub fn distance(&self) -> u64 {
        self.player.distance().max(0.0).floor() as u64
    }

    /// Live score, same formula as the final one
    pub fn score(&self) -> u64 {
        final_score(
            self.player.distance(),
            self.obstacles_avoided,
            self.crystals_collected,
            &self.tuning,
        )
    }

    pub fn pool(&self, kind: EntityKind) -> &EntityPool {
        match kind {
            EntityKind::Obstacle => &self.obstacles,
            EntityKind::Crystal => &self.crystals,
        }
    }

    pub(crate) fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take all events recorded since the last drain
    pub fn drain_events(&mut self) -> std::vec::Drain<'_, GameEvent> {
        self.events.drain(..)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            phase: self.phase,
            distance: self.distance(),
            score: self.score(),
            crystals: self.crystals_collected,
            obstacles_avoided: self.obstacles_avoided,
            high_score: self.high_score,
            speed: self.player.speed,
            lane: self.player.lane.index(),
        }
    }

    /// Player plus every pool sub-position in stable slot order
    pub fn renderables(&self) -> Vec<Renderable> {
        let tuning = &self.tuning;
        let mut out =
            Vec::with_capacity(1 + self.obstacles.capacity() * 2 + self.crystals.capacity());
        out.push(Renderable {
            kind: RenderKind::Player,
            slot: 0,
            position: self.player.world_position(tuning),
            visible: self.phase != GamePhase::Idle,
        });
        for e in self.obstacles.iter() {
            let kind = match e.obstacle {
                ObstacleKind::Wall => RenderKind::Wall,
                ObstacleKind::DoubleWall => RenderKind::DoubleWall,
            };
            for bounds in e.bounds(tuning) {
                out.push(Renderable {
                    kind,
                    slot: e.slot,
                    position: bounds.center(),
                    visible: e.active,
                });
            }
        }
        for e in self.crystals.iter() {
            out.push(Renderable {
                kind: RenderKind::Crystal,
                slot: e.slot,
                position: e.world_position(tuning),
                visible: e.active,
            });
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::lane::Lane;

    #[test]
    fn test_new_session_is_idle() {
        let session = GameSession::new(1, Tuning::default());
        assert_eq!(session.phase, GamePhase::Idle);
        assert_eq!(session.obstacles.capacity(), Tuning::default().obstacle_pool);
        assert_eq!(session.crystals.capacity(), Tuning::default().crystal_pool);
        assert_eq!(session.score(), 0);
    }

    #[test]
    fn test_start_only_from_idle() {
        let mut session = GameSession::new(1, Tuning::default());
        assert!(!session.restart());
        assert!(session.start());
        assert_eq!(session.phase, GamePhase::Playing);
        assert!(!session.start());
        assert_eq!(session.player.lane, Lane::Center);
        assert_eq!(session.drain_events().collect::<Vec<_>>(), vec![GameEvent::Started]);
    }

    #[test]
    fn test_moves_ignored_while_idle() {
        let mut session = GameSession::new(1, Tuning::default());
        assert!(!session.move_left());
        assert!(!session.move_right());
        assert_eq!(session.player.lane, Lane::Center);
    }

    #[test]
    fn test_end_run_is_idempotent() {
        let mut session = GameSession::new(1, Tuning::default());
        session.start();
        session.drain_events().for_each(drop);
        let hit = Contact {
            slot: 0,
            position: Vec3::ZERO,
        };
        session.end_run(hit);
        session.end_run(hit);
        assert_eq!(session.phase, GamePhase::GameOver);
        let events: Vec<_> = session.drain_events().collect();
        assert_eq!(events.len(), 2);
        assert!(!session.spawner.is_active());
        assert!(!session.player.is_moving());
    }

    #[test]
    fn test_renderables_cover_every_slot() {
        let tuning = Tuning::default();
        let session = GameSession::new(1, tuning.clone());
        let items = session.renderables();
        assert_eq!(items.len(), 1 + tuning.obstacle_pool + tuning.crystal_pool);
        assert!(items.iter().all(|r| !r.visible));
    }
}
