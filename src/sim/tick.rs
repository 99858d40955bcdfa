//! Per-frame simulation tick
//!
//! Order within a tick is fixed: player advance, spawn check, entity
//! advance, collision check, retirement. The pools are only touched here and
//! in commands, so the ordering alone keeps acquire/release consistent.

use super::collision::{crystals_touched, first_obstacle_hit, retire_passed};
use super::spawn::SpawnContext;
use super::state::{Command, GameEvent, GamePhase, GameSession};

/// Apply a single player command. Commands in the wrong phase are ignored.
pub fn apply_command(session: &mut GameSession, command: Command) -> bool {
    match command {
        Command::MoveLeft => session.move_left(),
        Command::MoveRight => session.move_right(),
        Command::Start => session.start(),
        Command::Restart => session.restart(),
    }
}

/// Advance the session by `dt` seconds of wall-clock time
///
/// Entities move `speed * dt` in one jump, so deltas much larger than
/// `SIM_DT` can carry an obstacle across the collision window unseen.
/// Hosts should step through `Game::update`, which splits long frames.
pub fn tick(session: &mut GameSession, dt: f32) {
    if session.phase != GamePhase::Playing {
        return;
    }
    debug_assert!(dt >= 0.0, "negative tick delta {dt}");
    let dt = dt.max(0.0);

    session.game_time += dt;

    // Player
    let speed = session.tuning.speed_for_distance(session.player.distance());
    session.player.set_speed(speed);
    session.player.update(dt, &session.tuning);

    // Spawn
    {
        let GameSession {
            spawner,
            obstacles,
            crystals,
            rng,
            tuning,
            player,
            game_time,
            ..
        } = session;
        spawner.update(&mut SpawnContext {
            game_time: *game_time,
            distance: player.distance(),
            obstacles,
            crystals,
            rng,
            tuning,
        });
    }

    // Entities scroll toward the player at the board's speed
    let speed = session.player.speed;
    for entity in session.obstacles.iter_active_mut() {
        entity.advance(speed, dt);
    }
    for entity in session.crystals.iter_active_mut() {
        entity.advance(speed, dt);
    }

    // Collision
    let player_bounds = session.player.bounds(&session.tuning);
    if let Some(hit) = first_obstacle_hit(&player_bounds, &session.obstacles, &session.tuning) {
        session.end_run(hit);
        return;
    }
    for contact in crystals_touched(&player_bounds, &session.crystals, &session.tuning) {
        session.crystals.release(contact.slot);
        session.crystals_collected += 1;
        session.push_event(GameEvent::CrystalCollected {
            position: contact.position,
        });
    }

    // Retirement
    let avoided = retire_passed(&mut session.obstacles, &session.tuning);
    for _ in 0..avoided {
        session.push_event(GameEvent::ObstacleAvoided);
    }
    session.obstacles_avoided += avoided;
    retire_passed(&mut session.crystals, &session.tuning);

    debug_assert!(session.obstacles.active_count() <= session.obstacles.capacity());
    debug_assert!(session.crystals.active_count() <= session.crystals.capacity());
}
