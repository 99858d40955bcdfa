//! Spawn director: when and where obstacles and crystals appear
//!
//! Each entity kind keeps its own `next_*_time` in game seconds. A tick
//! attempts at most one spawn per kind, and every attempt reschedules the
//! next one whether or not it placed anything. Intervals narrow as the
//! distance traveled grows, down to fixed floors.
//!
//! Spacing rules are deliberately asymmetric: obstacles only check against
//! other obstacles, while a crystal pattern's base point checks against both
//! kinds. Points after the base are never re-checked, so a pattern can run
//! alongside (or into) a wall.

use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::entity::{ObstacleKind, double_wall_partner};
use super::lane::{LANE_COUNT, Lane};
use super::pool::EntityPool;
use crate::tuning::Tuning;

/// Named crystal formations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CrystalPattern {
    /// Four crystals down one lane
    Line,
    /// Five crystals alternating between two lanes
    Zigzag,
    /// Three crystals sweeping across all lanes
    Diagonal,
}

impl CrystalPattern {
    pub const ALL: [CrystalPattern; 3] = [
        CrystalPattern::Line,
        CrystalPattern::Zigzag,
        CrystalPattern::Diagonal,
    ];

    /// (lane offset, forward step) pairs relative to the base point.
    /// Lane offsets wrap modulo 3; forward steps are scaled by
    /// `crystal_pattern_spacing`.
    pub fn points(self) -> &'static [(i32, f32)] {
        match self {
            CrystalPattern::Line => &[(0, 0.0), (0, 1.0), (0, 2.0), (0, 3.0)],
            CrystalPattern::Zigzag => &[(0, 0.0), (1, 1.0), (0, 2.0), (1, 3.0), (0, 4.0)],
            CrystalPattern::Diagonal => &[(0, 0.0), (1, 1.0), (2, 2.0)],
        }
    }
}

/// Counters for what the director has done this session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnStats {
    pub obstacles: u32,
    pub double_walls: u32,
    pub patterns: u32,
    pub crystals: u32,
    /// Attempts abandoned because every candidate lane was too crowded
    pub blocked: u32,
    /// Attempts (or pattern points) dropped because the pool was exhausted
    pub exhausted: u32,
}

/// Everything a spawn pass touches, borrowed from the session
pub struct SpawnContext<'a> {
    pub game_time: f32,
    pub distance: f32,
    pub obstacles: &'a mut EntityPool,
    pub crystals: &'a mut EntityPool,
    pub rng: &'a mut Pcg32,
    pub tuning: &'a Tuning,
}

/// Per-kind spawn timers
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpawnDirector {
    pub next_obstacle_time: f32,
    pub next_crystal_time: f32,
    active: bool,
    pub stats: SpawnStats,
}

impl SpawnDirector {
    /// Re-arm both timers with their initial grace delays
    pub fn arm(&mut self, tuning: &Tuning) {
        self.next_obstacle_time = tuning.obstacle_initial_delay;
        self.next_crystal_time = tuning.crystal_initial_delay;
        self.stats = SpawnStats::default();
        self.active = true;
    }

    /// Stop all further spawning
    pub fn halt(&mut self) {
        self.active = false;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Run one spawn check for each kind
    pub fn update(&mut self, ctx: &mut SpawnContext<'_>) {
        if !self.active {
            return;
        }
        if ctx.game_time >= self.next_obstacle_time {
            self.spawn_obstacle(ctx);
            let interval = next_interval(ctx.tuning, ctx.distance, ctx.rng);
            self.next_obstacle_time = ctx.game_time + interval;
        }
        if ctx.game_time >= self.next_crystal_time {
            self.spawn_crystal_pattern(ctx);
            let interval = next_interval(ctx.tuning, ctx.distance, ctx.rng);
            self.next_crystal_time =
                ctx.game_time + interval * ctx.tuning.crystal_interval_multiplier;
        }
    }

    fn spawn_obstacle(&mut self, ctx: &mut SpawnContext<'_>) {
        let tuning = ctx.tuning;
        let picked = random_lane(ctx.rng);
        let Some(lane) = pick_clear_lane(picked, |lane| {
            lane_is_clear(lane, &[&*ctx.obstacles], tuning)
        }) else {
            log::debug!("obstacle spawn blocked (picked {:?})", picked);
            self.stats.blocked += 1;
            return;
        };

        let mut kind = ObstacleKind::Wall;
        let chance = double_wall_chance(tuning, ctx.distance);
        if chance > 0.0 && ctx.rng.random_bool(chance as f64) {
            // The partner lane has to respect spacing too
            if lane_is_clear(double_wall_partner(lane), &[&*ctx.obstacles], tuning) {
                kind = ObstacleKind::DoubleWall;
            }
        }

        let Some(slot) = ctx.obstacles.acquire() else {
            self.stats.exhausted += 1;
            return;
        };
        slot.reset(lane, tuning.spawn_z, kind);
        log::debug!(
            "spawned {:?} in {:?} at distance {:.0}",
            kind,
            lane,
            ctx.distance
        );

        self.stats.obstacles += 1;
        if kind == ObstacleKind::DoubleWall {
            self.stats.double_walls += 1;
        }
    }

    fn spawn_crystal_pattern(&mut self, ctx: &mut SpawnContext<'_>) {
        let tuning = ctx.tuning;
        let pattern = CrystalPattern::ALL[ctx.rng.random_range(0..CrystalPattern::ALL.len())];
        let picked = random_lane(ctx.rng);
        let Some(base_lane) = pick_clear_lane(picked, |lane| {
            lane_is_clear(lane, &[&*ctx.obstacles, &*ctx.crystals], tuning)
        }) else {
            log::debug!("{:?} pattern blocked (picked {:?})", pattern, picked);
            self.stats.blocked += 1;
            return;
        };

        let jitter = tuning.crystal_base_jitter.max(0.0);
        let base_z = tuning.spawn_z - ctx.rng.random_range(0.0..=jitter);

        let mut placed = 0;
        for &(lane_offset, step) in pattern.points() {
            let Some(slot) = ctx.crystals.acquire() else {
                self.stats.exhausted += 1;
                continue;
            };
            let lane = Lane::wrapping(base_lane.index() as i32 + lane_offset);
            let z = base_z - step * tuning.crystal_pattern_spacing;
            slot.reset(lane, z, ObstacleKind::Wall);
            placed += 1;
        }
        log::debug!("spawned {:?} pattern ({} crystals) from {:?}", pattern, placed, base_lane);

        self.stats.patterns += 1;
        self.stats.crystals += placed;
    }
}

fn random_lane(rng: &mut Pcg32) -> Lane {
    Lane::wrapping(rng.random_range(0..LANE_COUNT as i32))
}

/// The picked lane if clear, else one cyclic retry, else `None`
fn pick_clear_lane(picked: Lane, is_clear: impl Fn(Lane) -> bool) -> Option<Lane> {
    if is_clear(picked) {
        return Some(picked);
    }
    let shifted = picked.cycle();
    is_clear(shifted).then_some(shifted)
}

/// True when no active entity from `pools` occupies `lane` inside the
/// too-close band behind the spawn point
pub fn lane_is_clear(lane: Lane, pools: &[&EntityPool], tuning: &Tuning) -> bool {
    let band_end = tuning.spawn_z + tuning.too_close_band;
    !pools
        .iter()
        .flat_map(|pool| pool.iter_active())
        .any(|e| e.z <= band_end && e.occupies(lane))
}

/// Probability of a double wall at this distance
pub fn double_wall_chance(tuning: &Tuning, distance: f32) -> f32 {
    if distance < tuning.double_wall_threshold {
        return 0.0;
    }
    let past = distance - tuning.double_wall_threshold;
    (past * tuning.double_wall_ramp)
        .min(tuning.double_wall_max_chance)
        .clamp(0.0, 1.0)
}

/// (min, max) obstacle spawn interval at this distance
pub fn spawn_interval_bounds(tuning: &Tuning, distance: f32) -> (f32, f32) {
    let shrink = distance.max(0.0) * tuning.interval_shrink;
    let min = (tuning.obstacle_interval_min - shrink).max(tuning.interval_floor_min);
    let max = (tuning.obstacle_interval_max - shrink)
        .max(tuning.interval_floor_max)
        .max(min);
    (min, max)
}

fn next_interval(tuning: &Tuning, distance: f32, rng: &mut Pcg32) -> f32 {
    let (min, max) = spawn_interval_bounds(tuning, distance);
    rng.random_range(min..=max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::EntityKind;
    use rand::SeedableRng;

    struct Fixture {
        obstacles: EntityPool,
        crystals: EntityPool,
        rng: Pcg32,
        tuning: Tuning,
    }

    impl Fixture {
        fn new(seed: u64) -> Self {
            let tuning = Tuning::default();
            Self {
                obstacles: EntityPool::new(EntityKind::Obstacle, tuning.obstacle_pool),
                crystals: EntityPool::new(EntityKind::Crystal, tuning.crystal_pool),
                rng: Pcg32::seed_from_u64(seed),
                tuning,
            }
        }

        fn ctx(&mut self, game_time: f32, distance: f32) -> SpawnContext<'_> {
            SpawnContext {
                game_time,
                distance,
                obstacles: &mut self.obstacles,
                crystals: &mut self.crystals,
                rng: &mut self.rng,
                tuning: &self.tuning,
            }
        }
    }

    #[test]
    fn test_interval_narrows_with_distance() {
        let tuning = Tuning::default();
        let (min0, max0) = spawn_interval_bounds(&tuning, 0.0);
        let (min1, max1) = spawn_interval_bounds(&tuning, 2000.0);
        assert!(min1 < min0 && max1 < max0);

        let (min_far, max_far) = spawn_interval_bounds(&tuning, 1.0e6);
        assert_eq!(min_far, tuning.interval_floor_min);
        assert_eq!(max_far, tuning.interval_floor_max);
    }

    #[test]
    fn test_double_wall_chance_curve() {
        let tuning = Tuning::default();
        assert_eq!(double_wall_chance(&tuning, 0.0), 0.0);
        assert_eq!(double_wall_chance(&tuning, 499.0), 0.0);
        assert!(double_wall_chance(&tuning, 600.0) > 0.0);
        assert!(double_wall_chance(&tuning, 800.0) > double_wall_chance(&tuning, 600.0));
        assert_eq!(double_wall_chance(&tuning, 1.0e6), tuning.double_wall_max_chance);
    }

    #[test]
    fn test_pattern_sizes() {
        for pattern in CrystalPattern::ALL {
            let n = pattern.points().len();
            assert!((3..=5).contains(&n), "{:?} has {} points", pattern, n);
        }
    }

    #[test]
    fn test_no_spawn_before_initial_delay() {
        let mut fx = Fixture::new(1);
        let mut director = SpawnDirector::default();
        director.arm(&fx.tuning);
        let early = fx.tuning.obstacle_initial_delay * 0.5;
        director.update(&mut fx.ctx(early, 0.0));
        assert_eq!(fx.obstacles.active_count(), 0);
        assert_eq!(fx.crystals.active_count(), 0);
    }

    #[test]
    fn test_obstacle_spawns_at_far_position() {
        let mut fx = Fixture::new(2);
        let mut director = SpawnDirector::default();
        director.arm(&fx.tuning);
        let t = fx.tuning.obstacle_initial_delay;
        director.update(&mut fx.ctx(t, 0.0));

        let spawned: Vec<_> = fx.obstacles.iter_active().collect();
        assert_eq!(spawned.len(), 1);
        assert_eq!(spawned[0].z, fx.tuning.spawn_z);
        assert_eq!(spawned[0].obstacle, ObstacleKind::Wall);
        assert!(director.next_obstacle_time > t);
    }

    #[test]
    fn test_halted_director_does_nothing() {
        let mut fx = Fixture::new(3);
        let mut director = SpawnDirector::default();
        director.arm(&fx.tuning);
        director.halt();
        director.update(&mut fx.ctx(100.0, 0.0));
        assert_eq!(fx.obstacles.active_count(), 0);
    }

    #[test]
    fn test_blocked_lanes_abort_obstacle_spawn() {
        let mut fx = Fixture::new(4);
        let spawn_z = fx.tuning.spawn_z;
        for lane in Lane::ALL {
            fx.obstacles.acquire().unwrap().reset(lane, spawn_z, ObstacleKind::Wall);
        }
        let mut director = SpawnDirector::default();
        director.arm(&fx.tuning);
        director.next_crystal_time = f32::MAX;
        director.update(&mut fx.ctx(fx.tuning.obstacle_initial_delay, 0.0));
        assert_eq!(fx.obstacles.active_count(), 3);
        assert_eq!(director.stats.blocked, 1);
    }

    #[test]
    fn test_exhausted_pool_still_reschedules() {
        let mut fx = Fixture::new(5);
        while let Some(slot) = fx.obstacles.acquire() {
            // Park them past the band so lanes stay clear
            slot.reset(Lane::Left, 0.0, ObstacleKind::Wall);
        }
        let mut director = SpawnDirector::default();
        director.arm(&fx.tuning);
        let t = fx.tuning.obstacle_initial_delay;
        director.update(&mut fx.ctx(t, 0.0));
        assert_eq!(director.stats.exhausted, 1);
        let (min, _) = spawn_interval_bounds(&fx.tuning, 0.0);
        assert!(director.next_obstacle_time >= t + min);
    }

    #[test]
    fn test_crystal_pattern_places_several() {
        let mut fx = Fixture::new(6);
        let mut director = SpawnDirector::default();
        director.arm(&fx.tuning);
        director.next_obstacle_time = f32::MAX;
        director.update(&mut fx.ctx(fx.tuning.crystal_initial_delay, 0.0));

        let count = fx.crystals.active_count();
        assert!((3..=5).contains(&count));
        for crystal in fx.crystals.iter_active() {
            assert!(crystal.z <= fx.tuning.spawn_z);
        }
        assert!(director.next_crystal_time > fx.tuning.crystal_initial_delay);
    }

    /// One obstacle attempt at `distance`; crystal spawning is parked
    fn spawn_one_obstacle(fx: &mut Fixture, distance: f32) -> SpawnDirector {
        let mut director = SpawnDirector::default();
        director.arm(&fx.tuning);
        director.next_crystal_time = f32::MAX;
        let t = fx.tuning.obstacle_initial_delay;
        director.update(&mut fx.ctx(t, distance));
        director
    }

    #[test]
    fn test_crystals_do_not_block_obstacles() {
        for seed in 0..16 {
            let mut fx = Fixture::new(seed);
            let spawn_z = fx.tuning.spawn_z;
            for lane in Lane::ALL {
                fx.crystals.acquire().unwrap().reset(lane, spawn_z, ObstacleKind::Wall);
            }
            let director = spawn_one_obstacle(&mut fx, 0.0);
            assert_eq!(director.stats.blocked, 0, "seed {seed}");
            assert_eq!(fx.obstacles.active_count(), 1, "seed {seed}");
        }
    }

    #[test]
    fn test_double_walls_appear_far_down_the_track() {
        let mut doubles = 0;
        for seed in 0..64 {
            let mut fx = Fixture::new(seed);
            let director = spawn_one_obstacle(&mut fx, 1.0e5);
            assert_eq!(director.stats.obstacles, 1);
            let wall = fx.obstacles.iter_active().next().unwrap();
            if wall.obstacle == ObstacleKind::DoubleWall {
                assert_eq!(wall.paired_lane(), Some(double_wall_partner(wall.lane)));
                doubles += 1;
            }
            assert_eq!(director.stats.double_walls, wall.is_double_wall() as u32);
        }
        assert!(doubles > 0);
        assert!(doubles < 64);
    }

    #[test]
    fn test_busy_partner_lane_falls_back_to_wall() {
        // Center is every lane's partner or retry target, so no double wall fits
        for seed in 0..64 {
            let mut fx = Fixture::new(seed);
            let spawn_z = fx.tuning.spawn_z;
            fx.obstacles
                .acquire()
                .unwrap()
                .reset(Lane::Center, spawn_z, ObstacleKind::Wall);
            let director = spawn_one_obstacle(&mut fx, 1.0e5);

            assert_eq!(director.stats.obstacles, 1, "seed {seed}");
            assert_eq!(director.stats.double_walls, 0, "seed {seed}");
            let spawned = fx.obstacles.iter_active().find(|e| e.slot != 0).unwrap();
            assert_ne!(spawned.lane, Lane::Center);
            assert_eq!(spawned.obstacle, ObstacleKind::Wall);
        }
    }

    #[test]
    fn test_crystal_base_respects_obstacles() {
        // Walls in Left and Center: picks of Center or Right land in Right,
        // a pick of Left retries into Center and is blocked
        let mut placed = 0;
        for seed in 0..16 {
            let mut fx = Fixture::new(seed);
            let spawn_z = fx.tuning.spawn_z;
            fx.obstacles.acquire().unwrap().reset(Lane::Left, spawn_z, ObstacleKind::Wall);
            fx.obstacles.acquire().unwrap().reset(Lane::Center, spawn_z, ObstacleKind::Wall);

            let mut director = SpawnDirector::default();
            director.arm(&fx.tuning);
            director.next_obstacle_time = f32::MAX;
            director.update(&mut fx.ctx(fx.tuning.crystal_initial_delay, 0.0));

            if director.stats.blocked == 1 {
                assert_eq!(fx.crystals.active_count(), 0);
                continue;
            }
            // The base point (largest z) must be in the free lane
            let base = fx
                .crystals
                .iter_active()
                .max_by(|a, b| a.z.total_cmp(&b.z))
                .unwrap();
            assert_eq!(base.lane, Lane::Right, "seed {seed}");
            placed += 1;
        }
        assert!(placed > 0);
    }
}
