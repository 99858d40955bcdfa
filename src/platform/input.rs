//! Raw input to game commands
//!
//! Keyboard keys and touch swipes become [`Command`]s. Outside of play the
//! first action input starts (or restarts) the run and is consumed there, so
//! the same keypress never doubles as a lane change.

use crate::sim::{Command, GamePhase};

/// Minimum horizontal travel (CSS pixels) for a touch to count as a swipe
pub const SWIPE_THRESHOLD: f32 = 30.0;

/// Map a `KeyboardEvent.key` value to a command for the current phase
pub fn command_for_key(key: &str, phase: GamePhase) -> Option<Command> {
    let lane_key = match key {
        "ArrowLeft" | "a" | "A" => Some(Command::MoveLeft),
        "ArrowRight" | "d" | "D" => Some(Command::MoveRight),
        _ => None,
    };
    let action_key = matches!(key, " " | "Enter" | "Spacebar");

    match phase {
        GamePhase::Playing => lane_key,
        GamePhase::Idle if lane_key.is_some() || action_key => Some(Command::Start),
        GamePhase::GameOver if action_key || matches!(key, "r" | "R") => Some(Command::Restart),
        _ => None,
    }
}

/// Tracks one touch from start to end
#[derive(Debug, Clone, Copy, Default)]
pub struct SwipeTracker {
    start: Option<(f32, f32)>,
}

impl SwipeTracker {
    pub fn begin(&mut self, x: f32, y: f32) {
        self.start = Some((x, y));
    }

    /// Finish the touch. Mostly-horizontal swipes move lanes while playing;
    /// any touch outside of play starts or restarts the run.
    pub fn end(&mut self, x: f32, y: f32, phase: GamePhase) -> Option<Command> {
        let (sx, sy) = self.start.take()?;
        match phase {
            GamePhase::Idle => Some(Command::Start),
            GamePhase::GameOver => Some(Command::Restart),
            GamePhase::Playing => {
                let dx = x - sx;
                let dy = y - sy;
                if dx.abs() < SWIPE_THRESHOLD || dx.abs() < dy.abs() {
                    return None;
                }
                Some(if dx < 0.0 {
                    Command::MoveLeft
                } else {
                    Command::MoveRight
                })
            }
        }
    }

    pub fn cancel(&mut self) {
        self.start = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_key_is_not_a_move() {
        assert_eq!(command_for_key("ArrowLeft", GamePhase::Idle), Some(Command::Start));
        assert_eq!(command_for_key(" ", GamePhase::Idle), Some(Command::Start));
        assert_eq!(command_for_key("ArrowLeft", GamePhase::Playing), Some(Command::MoveLeft));
        assert_eq!(command_for_key("d", GamePhase::Playing), Some(Command::MoveRight));
    }

    #[test]
    fn test_game_over_keys() {
        assert_eq!(command_for_key("Enter", GamePhase::GameOver), Some(Command::Restart));
        assert_eq!(command_for_key("r", GamePhase::GameOver), Some(Command::Restart));
        // Lane keys right after a crash must not restart by accident
        assert_eq!(command_for_key("ArrowRight", GamePhase::GameOver), None);
        assert_eq!(command_for_key(" ", GamePhase::Playing), None);
    }

    #[test]
    fn test_swipes() {
        let mut swipe = SwipeTracker::default();
        swipe.begin(200.0, 300.0);
        assert_eq!(swipe.end(120.0, 310.0, GamePhase::Playing), Some(Command::MoveLeft));

        swipe.begin(200.0, 300.0);
        assert_eq!(swipe.end(210.0, 300.0, GamePhase::Playing), None);

        swipe.begin(200.0, 300.0);
        // Mostly vertical
        assert_eq!(swipe.end(240.0, 400.0, GamePhase::Playing), None);

        swipe.begin(10.0, 10.0);
        assert_eq!(swipe.end(10.0, 10.0, GamePhase::Idle), Some(Command::Start));

        // No matching begin
        assert_eq!(swipe.end(0.0, 0.0, GamePhase::Idle), None);

        swipe.begin(200.0, 300.0);
        swipe.cancel();
        assert_eq!(swipe.end(100.0, 300.0, GamePhase::Playing), None);
    }
}
