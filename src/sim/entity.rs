//! Pooled moving entities: obstacles and crystals
//!
//! An entity is created once when its pool is allocated and then recycled:
//! `reset` spawns it far down the track, `retire` hides it again once it has
//! scrolled past the player.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::lane::Lane;
use crate::tuning::Tuning;

/// Pool category of an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Obstacle,
    Crystal,
}

/// Obstacle subtype, chosen per spawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ObstacleKind {
    /// Blocks a single lane
    #[default]
    Wall,
    /// Blocks its lane and one neighbour from a single pool slot
    DoubleWall,
}

/// Second lane covered by a double wall anchored at `lane`
pub fn double_wall_partner(lane: Lane) -> Lane {
    lane.right().unwrap_or(Lane::Center)
}

/// Axis-aligned bounding box in world space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn from_center(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    /// Overlap test; boxes that only touch do not intersect
    #[inline]
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
            && self.min.z < other.max.z
            && self.max.z > other.min.z
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }
}

/// An obstacle or crystal owned by one pool slot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovingEntity {
    /// Stable slot index within its pool
    pub slot: u32,
    pub kind: EntityKind,
    /// Only meaningful for `EntityKind::Obstacle`
    pub obstacle: ObstacleKind,
    pub lane: Lane,
    /// Forward position along the track (negative = ahead of the player)
    pub z: f32,
    pub active: bool,
}

impl MovingEntity {
    pub fn new(slot: u32, kind: EntityKind) -> Self {
        Self {
            slot,
            kind,
            obstacle: ObstacleKind::Wall,
            lane: Lane::Center,
            z: 0.0,
            active: false,
        }
    }

    /// Spawn this slot at a lane and forward position
    pub fn reset(&mut self, lane: Lane, z: f32, obstacle: ObstacleKind) {
        self.lane = lane;
        self.z = z;
        self.obstacle = obstacle;
        self.active = true;
    }

    /// Hide and return to the pool
    pub fn retire(&mut self) {
        self.active = false;
    }

    /// Scroll toward (and past) the player
    pub fn advance(&mut self, speed: f32, dt: f32) {
        if self.active {
            self.z += speed * dt;
        }
    }

    #[inline]
    pub fn is_double_wall(&self) -> bool {
        self.kind == EntityKind::Obstacle && self.obstacle == ObstacleKind::DoubleWall
    }

    /// Second lane blocked by a double wall: the right neighbour, or the
    /// left one when already on the right edge
    pub fn paired_lane(&self) -> Option<Lane> {
        if self.is_double_wall() {
            Some(double_wall_partner(self.lane))
        } else {
            None
        }
    }

    /// Every lane this entity occupies
    pub fn lanes(&self) -> impl Iterator<Item = Lane> + use<> {
        std::iter::once(self.lane).chain(self.paired_lane())
    }

    pub fn occupies(&self, lane: Lane) -> bool {
        self.lanes().any(|l| l == lane)
    }

    /// Render position of the primary sub-position
    pub fn world_position(&self, tuning: &Tuning) -> Vec3 {
        Vec3::new(self.lane.offset(tuning.lane_width), tuning.entity_center_y, self.z)
    }

    fn half_extents(&self, tuning: &Tuning) -> Vec3 {
        match self.kind {
            EntityKind::Obstacle => tuning.wall_half_extents,
            EntityKind::Crystal => tuning.crystal_half_extents,
        }
    }

    /// Bounding regions, one per occupied lane
    pub fn bounds<'a>(&self, tuning: &'a Tuning) -> impl Iterator<Item = Aabb> + use<'a> {
        let half = self.half_extents(tuning);
        let z = self.z;
        self.lanes().map(move |lane| {
            let center = Vec3::new(lane.offset(tuning.lane_width), tuning.entity_center_y, z);
            Aabb::from_center(center, half)
        })
    }
}
