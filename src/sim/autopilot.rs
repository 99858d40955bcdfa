//! Demo-mode driver
//!
//! Looks a short way down the track and steers out of lanes with a wall
//! coming, otherwise drifts toward the nearest crystal. Used by the native
//! demo and by soak tests; it only ever issues ordinary commands.

use super::lane::Lane;
use super::state::{Command, GamePhase, GameSession};

/// Seconds of travel the autopilot looks ahead
const LOOKAHEAD_SECS: f32 = 0.9;

/// Pick the next command for the current session, if any
pub fn autopilot_command(session: &GameSession) -> Option<Command> {
    match session.phase {
        GamePhase::Idle => return Some(Command::Start),
        GamePhase::GameOver => return None,
        GamePhase::Playing => {}
    }

    let player = &session.player;
    if player.cooldown > 0.0 {
        return None;
    }
    let tuning = &session.tuning;
    let horizon = tuning.player_z - player.speed.max(tuning.initial_speed) * LOOKAHEAD_SECS;
    let near_edge = tuning.player_z + tuning.collision_window;

    let danger = |lane: Lane| -> Option<f32> {
        session
            .obstacles
            .iter_active()
            .filter(|e| e.z >= horizon && e.z <= near_edge && e.occupies(lane))
            .map(|e| e.z)
            .max_by(f32::total_cmp)
    };

    let current = player.lane;
    let step_toward = |target: Lane| {
        if target.index() < current.index() {
            Command::MoveLeft
        } else {
            Command::MoveRight
        }
    };

    if danger(current).is_some() {
        // Prefer a clear neighbour, else the one whose threat is furthest away
        let neighbours = [current.left(), current.right()];
        let escape = neighbours
            .iter()
            .flatten()
            .copied()
            .min_by(|a, b| {
                let da = danger(*a).unwrap_or(f32::NEG_INFINITY);
                let db = danger(*b).unwrap_or(f32::NEG_INFINITY);
                da.total_cmp(&db)
            })?;
        return Some(step_toward(escape));
    }

    // Nothing threatening: chase the closest crystal ahead in a safe lane
    let target = session
        .crystals
        .iter_active()
        .filter(|e| e.z >= horizon && e.z < tuning.player_z)
        .max_by(|a, b| a.z.total_cmp(&b.z))?
        .lane;
    if target == current {
        return None;
    }
    let next = if target.index() < current.index() {
        current.left()?
    } else {
        current.right()?
    };
    danger(next).is_none().then(|| step_toward(next))
}
