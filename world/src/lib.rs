#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for the Warpfield starfield.
//!
//! The world owns the fixed-size star arena together with the camera and
//! speed accumulators. All mutations flow through [`apply`]; read-only access
//! is provided by the [`query`] module.

use std::f32::consts::TAU;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use warpfield_core::{
    Command, Event, ProjectionTuning, SpawnPolicy, Star, StarId, WarpMode,
    CAMERA_ADVANCE_FACTOR, INITIAL_DEPTH_RANGE, MAX_RADIAL_DISTANCE, MIN_RADIAL_DISTANCE,
    RESPAWN_DEPTH_JITTER, RESPAWN_DEPTH_OFFSET, SPEED_EASING_DIVISOR,
};

const DEFAULT_SEED: u64 = 0x5f3a_9c21_7be4_0d18;

/// Configuration parameters required to construct the world.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    star_count: usize,
    base_speed: f32,
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration for the provided star count, base speed and seed.
    #[must_use]
    pub const fn new(star_count: usize, base_speed: f32, rng_seed: u64) -> Self {
        Self {
            star_count,
            base_speed,
            rng_seed,
        }
    }

    /// Number of stars the world simulates.
    #[must_use]
    pub const fn star_count(&self) -> usize {
        self.star_count
    }

    /// Speed added to the eased speed on every tick.
    #[must_use]
    pub const fn base_speed(&self) -> f32 {
        self.base_speed
    }

    /// Seed used for every star placement.
    #[must_use]
    pub const fn rng_seed(&self) -> u64 {
        self.rng_seed
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(
            warpfield_core::DEFAULT_STAR_COUNT,
            ProjectionTuning::default().base_speed,
            DEFAULT_SEED,
        )
    }
}

/// Represents the authoritative starfield state.
#[derive(Debug)]
pub struct World {
    stars: Vec<Star>,
    camera_depth: f64,
    speed: f32,
    warp: WarpMode,
    base_speed: f32,
    rng: ChaCha8Rng,
    tick_index: u64,
}

impl World {
    /// Creates a new world whose stars are spread across the initial depth range.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(config.rng_seed);
        let stars = (0..config.star_count)
            .map(|_| spawn_star(&mut rng, SpawnPolicy::Initial, 0.0))
            .collect();

        Self::assemble(stars, config.base_speed, rng)
    }

    /// Creates a world from explicitly placed stars.
    ///
    /// The seed drives every later respawn. Stars sitting on or behind the
    /// camera are recycled by the first tick.
    #[must_use]
    pub fn from_stars(stars: Vec<Star>, base_speed: f32, rng_seed: u64) -> Self {
        Self::assemble(stars, base_speed, ChaCha8Rng::seed_from_u64(rng_seed))
    }

    fn assemble(stars: Vec<Star>, base_speed: f32, rng: ChaCha8Rng) -> Self {
        Self {
            stars,
            camera_depth: 0.0,
            speed: 0.0,
            warp: WarpMode::Cruise,
            base_speed,
            rng,
            tick_index: 0,
        }
    }

    fn advance(&mut self, delta: f32, out_events: &mut Vec<Event>) {
        // Also rejects NaN.
        let delta = if delta > 0.0 { delta } else { 0.0 };

        self.tick_index = self.tick_index.saturating_add(1);
        if delta > 0.0 {
            self.speed += (self.warp.target_speed() - self.speed) / SPEED_EASING_DIVISOR;
        }
        self.camera_depth +=
            f64::from(delta * CAMERA_ADVANCE_FACTOR * (self.speed + self.base_speed));
        out_events.push(Event::TimeAdvanced {
            delta,
            camera_depth: self.camera_depth,
            speed: self.speed,
        });

        self.recycle_passed_stars(out_events);
    }

    fn recycle_passed_stars(&mut self, out_events: &mut Vec<Event>) {
        let camera_depth = self.camera_depth;
        for (index, star) in self.stars.iter_mut().enumerate() {
            if star.depth() > camera_depth {
                continue;
            }

            *star = spawn_star(&mut self.rng, SpawnPolicy::Subsequent, camera_depth);
            debug_assert!(star.depth() > camera_depth);
            out_events.push(Event::StarRespawned {
                star: StarId::new(index as u32),
                depth: star.depth(),
            });
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { delta } => world.advance(delta, out_events),
        Command::SetWarp { mode } => {
            if world.warp != mode {
                world.warp = mode;
                out_events.push(Event::WarpChanged { mode });
            }
        }
    }
}

/// Places a star according to the provided policy.
///
/// The radial offset is drawn as an angle and a distance so that no star can
/// sit on the view axis.
pub fn spawn_star(rng: &mut impl Rng, policy: SpawnPolicy, camera_depth: f64) -> Star {
    let depth = match policy {
        // Sampled as (0, range] so no star starts on the camera plane.
        SpawnPolicy::Initial => INITIAL_DEPTH_RANGE - rng.gen_range(0.0..INITIAL_DEPTH_RANGE),
        SpawnPolicy::Subsequent => {
            camera_depth + rng.gen_range(0.0..RESPAWN_DEPTH_JITTER) + RESPAWN_DEPTH_OFFSET
        }
    };
    let angle = rng.gen_range(0.0..TAU);
    let distance = rng.gen_range(MIN_RADIAL_DISTANCE..MAX_RADIAL_DISTANCE);

    Star::new(depth, angle.cos() * distance, angle.sin() * distance)
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::World;
    use warpfield_core::{Star, StarId, WarpMode};

    /// Provides read-only access to the star arena in index order.
    #[must_use]
    pub fn stars(world: &World) -> &[Star] {
        &world.stars
    }

    /// Looks up a single star by identifier.
    #[must_use]
    pub fn star(world: &World, star: StarId) -> Option<&Star> {
        world.stars.get(star.index())
    }

    /// Number of stars in the arena.
    #[must_use]
    pub fn star_count(world: &World) -> usize {
        world.stars.len()
    }

    /// Total distance the camera has travelled.
    #[must_use]
    pub fn camera_depth(world: &World) -> f64 {
        world.camera_depth
    }

    /// Current eased speed.
    #[must_use]
    pub fn speed(world: &World) -> f32 {
        world.speed
    }

    /// Speed added to the eased speed on every tick.
    #[must_use]
    pub fn base_speed(world: &World) -> f32 {
        world.base_speed
    }

    /// Warp mode the speed currently eases toward.
    #[must_use]
    pub fn warp_mode(world: &World) -> WarpMode {
        world.warp
    }

    /// Number of ticks processed since construction.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }
}
