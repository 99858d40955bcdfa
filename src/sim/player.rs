//! The hoverboard: lane changes, lateral slide and forward progress

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::entity::Aabb;
use super::lane::Lane;
use crate::tuning::Tuning;

/// Player controller state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Logical lane. Updated as soon as a move is accepted; `x` catches up.
    pub lane: Lane,
    /// Current lateral position, converges on the lane offset
    pub x: f32,
    /// Forward speed (units/s)
    pub speed: f32,
    /// Accumulated forward distance
    pub distance: f32,
    /// Seconds until another lane change is accepted
    pub cooldown: f32,
    moving: bool,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            lane: Lane::Center,
            x: 0.0,
            speed: 0.0,
            distance: 0.0,
            cooldown: 0.0,
            moving: false,
        }
    }
}

impl Player {
    /// Begin a run from the center lane
    pub fn start_moving(&mut self, tuning: &Tuning) {
        self.lane = Lane::Center;
        self.x = Lane::Center.offset(tuning.lane_width);
        self.distance = 0.0;
        self.speed = tuning.initial_speed;
        self.cooldown = 0.0;
        self.moving = true;
    }

    /// Halt forward motion (game over)
    pub fn stop_moving(&mut self) {
        self.speed = 0.0;
        self.moving = false;
    }

    pub fn is_moving(&self) -> bool {
        self.moving
    }

    /// Lane the lateral slide is heading for
    #[inline]
    pub fn target_lane(&self) -> Lane {
        self.lane
    }

    /// Shift one lane left; returns whether the move was accepted
    pub fn move_left(&mut self, tuning: &Tuning) -> bool {
        let target = self.lane.left();
        self.try_move(target, tuning)
    }

    /// Shift one lane right; returns whether the move was accepted
    pub fn move_right(&mut self, tuning: &Tuning) -> bool {
        let target = self.lane.right();
        self.try_move(target, tuning)
    }

    fn try_move(&mut self, target: Option<Lane>, tuning: &Tuning) -> bool {
        if !self.moving || self.cooldown > 0.0 {
            return false;
        }
        let Some(lane) = target else {
            return false;
        };
        self.lane = lane;
        self.cooldown = tuning.move_cooldown;
        true
    }

    pub fn set_speed(&mut self, speed: f32) {
        if self.moving {
            self.speed = speed.max(0.0);
        }
    }

    /// Advance distance, slide toward the lane and tick the cooldown
    pub fn update(&mut self, dt: f32, tuning: &Tuning) {
        if self.moving {
            self.distance += self.speed * dt;
        }
        debug_assert!(self.distance >= 0.0, "negative distance {}", self.distance);

        let target_x = self.lane.offset(tuning.lane_width);
        let max_step = tuning.lateral_rate * dt;
        let delta = target_x - self.x;
        if delta.abs() <= max_step {
            self.x = target_x;
        } else {
            self.x += max_step * delta.signum();
        }

        self.cooldown = (self.cooldown - dt).max(0.0);
    }

    /// Authoritative progress metric
    #[inline]
    pub fn distance(&self) -> f32 {
        self.distance
    }

    pub fn world_position(&self, tuning: &Tuning) -> Vec3 {
        Vec3::new(self.x, tuning.player_center_y, tuning.player_z)
    }

    /// World-space bounding region
    pub fn bounds(&self, tuning: &Tuning) -> Aabb {
        Aabb::from_center(self.world_position(tuning), tuning.player_half_extents)
    }
}
