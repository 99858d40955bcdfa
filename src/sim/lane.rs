//! The three lateral rails of the track

use serde::{Deserialize, Serialize};

/// Number of lanes on the track
pub const LANE_COUNT: u8 = 3;

/// One of the three discrete lateral positions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Lane {
    Left = 0,
    #[default]
    Center = 1,
    Right = 2,
}

impl Lane {
    pub const ALL: [Lane; 3] = [Lane::Left, Lane::Center, Lane::Right];

    /// Lane for an index, `None` outside 0..=2 (no wraparound)
    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Lane::Left),
            1 => Some(Lane::Center),
            2 => Some(Lane::Right),
            _ => None,
        }
    }

    /// Lane for an index taken modulo the lane count
    pub fn wrapping(index: i32) -> Self {
        match index.rem_euclid(LANE_COUNT as i32) {
            0 => Lane::Left,
            1 => Lane::Center,
            _ => Lane::Right,
        }
    }

    #[inline]
    pub fn index(self) -> u8 {
        self as u8
    }

    /// Neighbour one step to the left, `None` at the edge
    pub fn left(self) -> Option<Self> {
        self.index().checked_sub(1).and_then(Self::from_index)
    }

    /// Neighbour one step to the right, `None` at the edge
    pub fn right(self) -> Option<Self> {
        Self::from_index(self.index() + 1)
    }

    /// Next lane cyclically (Right wraps to Left)
    pub fn cycle(self) -> Self {
        Self::wrapping(self.index() as i32 + 1)
    }

    /// Fixed lateral offset of this lane's center
    #[inline]
    pub fn offset(self, lane_width: f32) -> f32 {
        lane_offset(self, lane_width)
    }
}

/// Lateral offset for a lane: -w, 0, +w
#[inline]
pub fn lane_offset(lane: Lane, lane_width: f32) -> f32 {
    (lane.index() as f32 - 1.0) * lane_width
}
