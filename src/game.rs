//! Game facade: the simulation plus its collaborators
//!
//! Hosts talk to [`Game`] instead of the raw session. It forwards commands
//! and ticks, then drains the session's events to the effect sink and the
//! high score store. Collaborator failures are logged and dropped; they can
//! never change session state.

use glam::Vec3;

use crate::audio::{EffectSink, SoundEffect};
use crate::consts::SIM_DT;
use crate::highscores::HighScoreStore;
use crate::sim::{
    Command, GameEvent, GamePhase, GameSession, Renderable, SessionSnapshot, apply_command, tick,
};
use crate::tuning::Tuning;

pub struct Game<A, H> {
    session: GameSession,
    audio: A,
    scores: H,
}

impl<A: EffectSink, H: HighScoreStore> Game<A, H> {
    pub fn new(seed: u64, tuning: Tuning, audio: A, scores: H) -> Self {
        let mut session = GameSession::new(seed, tuning);
        session.high_score = scores.high_score();
        Self {
            session,
            audio,
            scores,
        }
    }

    /// Apply a command; returns whether it changed anything
    pub fn command(&mut self, command: Command) -> bool {
        if command == Command::Restart && self.session.phase == GamePhase::GameOver {
            // Settle the finished run before its counters are wiped
            self.record_high_score(self.session.score());
        }
        let applied = apply_command(&mut self.session, command);
        self.dispatch_events();
        applied
    }

    pub fn start(&mut self) -> bool {
        self.command(Command::Start)
    }

    pub fn restart(&mut self) -> bool {
        self.command(Command::Restart)
    }

    pub fn move_left(&mut self) -> bool {
        self.command(Command::MoveLeft)
    }

    pub fn move_right(&mut self) -> bool {
        self.command(Command::MoveRight)
    }

    /// Advance the simulation by one frame's delta, in steps of at most
    /// `SIM_DT` so fast entities cannot skip over the collision window
    pub fn update(&mut self, dt: f32) {
        let mut remaining = dt.max(0.0);
        while remaining > 0.0 && self.session.phase == GamePhase::Playing {
            let step = remaining.min(SIM_DT);
            tick(&mut self.session, step);
            remaining -= step;
        }
        self.dispatch_events();
    }

    pub fn phase(&self) -> GamePhase {
        self.session.phase
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.session.snapshot()
    }

    pub fn renderables(&self) -> Vec<Renderable> {
        self.session.renderables()
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut GameSession {
        &mut self.session
    }

    pub fn audio_mut(&mut self) -> &mut A {
        &mut self.audio
    }

    pub fn scores(&self) -> &H {
        &self.scores
    }

    fn dispatch_events(&mut self) {
        let events: Vec<GameEvent> = self.session.drain_events().collect();
        for event in events {
            match event {
                GameEvent::Started => self.play(SoundEffect::Launch, None),
                GameEvent::CrystalCollected { position } => {
                    self.play(SoundEffect::CrystalPickup, Some(position))
                }
                GameEvent::ObstacleAvoided => {}
                GameEvent::ObstacleHit { position } => {
                    self.play(SoundEffect::Explosion, Some(position))
                }
                GameEvent::GameOver { score, .. } => {
                    if self.record_high_score(score) {
                        self.play(SoundEffect::HighScore, None);
                    }
                }
            }
        }
    }

    /// Offer a finished run's score to the store; true on a new best
    fn record_high_score(&mut self, score: u64) -> bool {
        let updated = match self.scores.set_high_score_if_higher(score) {
            Ok(updated) => updated,
            Err(e) => {
                log::debug!("High score not persisted: {e}");
                false
            }
        };
        if updated {
            log::info!("New high score: {}", score);
        }
        self.session.high_score = self.session.high_score.max(self.scores.high_score());
        updated
    }

    fn play(&mut self, effect: SoundEffect, at: Option<Vec3>) {
        if let Err(e) = self.audio.play_effect(effect, at) {
            log::debug!("Effect {:?} dropped: {e}", effect);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::EffectError;
    use crate::highscores::MemoryHighScore;
    use crate::platform::StorageError;
    use crate::sim::{Lane, ObstacleKind};

    #[derive(Default)]
    struct RecordingSink {
        played: Vec<SoundEffect>,
        fail: bool,
    }

    impl EffectSink for RecordingSink {
        fn play_effect(
            &mut self,
            effect: SoundEffect,
            _at: Option<Vec3>,
        ) -> Result<(), EffectError> {
            self.played.push(effect);
            if self.fail {
                Err(EffectError::Rejected("autoplay".into()))
            } else {
                Ok(())
            }
        }
    }

    struct BrokenStore;

    impl HighScoreStore for BrokenStore {
        fn high_score(&self) -> u64 {
            0
        }

        fn set_high_score_if_higher(&mut self, _score: u64) -> Result<bool, StorageError> {
            Err(StorageError::Unavailable)
        }
    }

    fn crash<A: EffectSink, H: HighScoreStore>(game: &mut Game<A, H>) {
        let session = game.session_mut();
        session.spawner.halt();
        session
            .obstacles
            .acquire()
            .unwrap()
            .reset(Lane::Center, 0.0, ObstacleKind::Wall);
        game.update(1.0 / 120.0);
        assert_eq!(game.phase(), GamePhase::GameOver);
    }

    #[test]
    fn test_effects_follow_events() {
        let mut game = Game::new(
            1,
            Tuning::default(),
            RecordingSink::default(),
            MemoryHighScore::default(),
        );
        game.start();
        crash(&mut game);
        let played = &game.audio_mut().played;
        assert_eq!(played.first(), Some(&SoundEffect::Launch));
        assert!(played.contains(&SoundEffect::Explosion));
    }

    #[test]
    fn test_failing_audio_does_not_change_state() {
        let sink = RecordingSink {
            fail: true,
            ..Default::default()
        };
        let mut game = Game::new(1, Tuning::default(), sink, MemoryHighScore::default());
        assert!(game.start());
        game.update(0.5);
        assert_eq!(game.phase(), GamePhase::Playing);
        crash(&mut game);
        assert!(game.restart());
        assert_eq!(game.phase(), GamePhase::Playing);
    }

    #[test]
    fn test_high_score_strictly_greater() {
        let mut game = Game::new(
            1,
            Tuning::default(),
            RecordingSink::default(),
            MemoryHighScore::new(0),
        );
        game.start();
        game.update(1.0);
        crash(&mut game);
        let first = game.snapshot().score;
        assert!(first > 0);
        assert_eq!(game.scores().high_score(), first);
        assert_eq!(game.snapshot().high_score, first);
        assert!(game.audio_mut().played.contains(&SoundEffect::HighScore));

        // Same score again is not a new best
        let mut game = Game::new(
            1,
            Tuning::default(),
            RecordingSink::default(),
            MemoryHighScore::new(first),
        );
        game.start();
        game.update(1.0);
        crash(&mut game);
        assert_eq!(game.snapshot().score, first);
        assert!(!game.audio_mut().played.contains(&SoundEffect::HighScore));
        assert_eq!(game.scores().high_score(), first);
    }

    #[test]
    fn test_broken_store_is_ignored() {
        let mut game = Game::new(1, Tuning::default(), RecordingSink::default(), BrokenStore);
        game.start();
        crash(&mut game);
        assert!(game.restart());
        assert_eq!(game.snapshot().score, 0);
    }

    #[test]
    fn test_large_delta_still_collides() {
        let mut game = Game::new(
            3,
            Tuning::default(),
            RecordingSink::default(),
            MemoryHighScore::default(),
        );
        game.start();
        let session = game.session_mut();
        session.spawner.halt();
        session
            .obstacles
            .acquire()
            .unwrap()
            .reset(Lane::Center, -2.5, ObstacleKind::Wall);

        // One raw tick this long carries the wall clean past the player
        let mut raw = game.session().clone();
        tick(&mut raw, 0.4);
        assert_eq!(raw.phase, GamePhase::Playing);

        game.update(0.4);
        assert_eq!(game.phase(), GamePhase::GameOver);
        assert!(game.audio_mut().played.contains(&SoundEffect::Explosion));
    }

    #[test]
    fn test_restart_resets_counters() {
        let mut game = Game::new(
            5,
            Tuning::default(),
            RecordingSink::default(),
            MemoryHighScore::default(),
        );
        assert!(!game.restart());
        game.start();
        for _ in 0..240 {
            game.update(1.0 / 120.0);
        }
        crash(&mut game);
        assert!(game.snapshot().distance > 0);
        assert!(game.restart());
        let snap = game.snapshot();
        assert_eq!(snap.distance, 0);
        assert_eq!(snap.score, 0);
        assert_eq!(snap.crystals, 0);
        assert_eq!(game.session().obstacles.active_count(), 0);
        assert_eq!(game.session().crystals.active_count(), 0);
    }
}
