//! Broad-phase collision, retirement and scoring
//!
//! Only entities inside the collision window around the player's tracking
//! plane are tested. Anything outside the band is ignored even when its box
//! would overlap the player's; the band is part of the rules, not just an
//! optimization.

use glam::Vec3;

use super::entity::Aabb;
use super::pool::EntityPool;
use crate::tuning::Tuning;

/// An entity that touched the player this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub slot: u32,
    pub position: Vec3,
}

/// Whether a forward position lies inside the collision window
#[inline]
pub fn in_collision_window(z: f32, tuning: &Tuning) -> bool {
    (z - tuning.player_z).abs() <= tuning.collision_window
}

/// First active obstacle in the window whose bounds intersect the player's.
/// Checking stops at the first hit.
pub fn first_obstacle_hit(
    player: &Aabb,
    obstacles: &EntityPool,
    tuning: &Tuning,
) -> Option<Contact> {
    obstacles
        .iter_active()
        .filter(|e| in_collision_window(e.z, tuning))
        .find(|e| e.bounds(tuning).any(|b| b.intersects(player)))
        .map(|e| Contact {
            slot: e.slot,
            position: e.world_position(tuning),
        })
}

/// Every active crystal in the window touching the player
pub fn crystals_touched(player: &Aabb, crystals: &EntityPool, tuning: &Tuning) -> Vec<Contact> {
    crystals
        .iter_active()
        .filter(|e| in_collision_window(e.z, tuning))
        .filter(|e| e.bounds(tuning).any(|b| b.intersects(player)))
        .map(|e| Contact {
            slot: e.slot,
            position: e.world_position(tuning),
        })
        .collect()
}

/// Return entities that scrolled past the retire plane to their pool.
/// Returns how many were retired.
pub fn retire_passed(pool: &mut EntityPool, tuning: &Tuning) -> u32 {
    let mut retired = 0;
    for entity in pool.iter_active_mut() {
        if entity.z > tuning.retire_z {
            entity.retire();
            retired += 1;
        }
    }
    retired
}

/// Score formula shared by the HUD and the high score comparison:
/// `floor(distance) + avoided * avoid_bonus + crystals * crystal_value`
pub fn final_score(distance: f32, obstacles_avoided: u32, crystals: u32, tuning: &Tuning) -> u64 {
    let distance = distance.max(0.0).floor() as u64;
    distance
        + obstacles_avoided as u64 * tuning.avoid_bonus
        + crystals as u64 * tuning.crystal_value
}
