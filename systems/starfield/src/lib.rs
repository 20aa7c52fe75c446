#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Starfield simulator tying the world, projection and warp timer together.
//!
//! The simulator owns the world and one drawable per star. Drawables are kept
//! in an arena parallel to the world's star arena, so star `i` is always drawn
//! by `drawables[i]`. The rendering collaborator itself is borrowed per call.

use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info, trace};
use warpfield_core::{
    Command, DrawableSurface, Event, ProjectionTuning, Star, StarTransform, SurfaceError,
    TextureHandle, Viewport, WarpMode, DEFAULT_STAR_COUNT, REFERENCE_FRAME_RATE,
};
use warpfield_system_projection::Projection;
use warpfield_system_warp_timer::{self as warp_timer, WarpTimer};
use warpfield_world::{self as world, query, World};

const DEFAULT_SEED: u64 = 0x2005_0000_ca55_0005;

/// Parameters accepted by [`StarfieldSimulator::initialize`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StarfieldConfig {
    /// Number of stars to simulate.
    pub star_count: usize,
    /// Projection and motion constants.
    pub tuning: ProjectionTuning,
    /// Seed for every random star placement.
    pub seed: u64,
    /// Interval between automatic cruise/warp toggles.
    pub warp_period: Duration,
}

impl Default for StarfieldConfig {
    fn default() -> Self {
        Self {
            star_count: DEFAULT_STAR_COUNT,
            tuning: ProjectionTuning::default(),
            seed: DEFAULT_SEED,
            warp_period: warp_timer::DEFAULT_PERIOD,
        }
    }
}

impl StarfieldConfig {
    fn validate(&self) -> Result<(), StarfieldError> {
        if self.star_count == 0 {
            return Err(StarfieldError::InvalidConfig {
                field: "star_count",
                reason: "must be positive",
            });
        }
        if u32::try_from(self.star_count).is_err() {
            return Err(StarfieldError::InvalidConfig {
                field: "star_count",
                reason: "exceeds the addressable star range",
            });
        }
        if let Some(field) = self.tuning.first_invalid() {
            return Err(StarfieldError::InvalidConfig {
                field,
                reason: "must be positive and finite",
            });
        }
        Ok(())
    }
}

/// Errors raised while setting up the starfield.
#[derive(Debug, Error)]
pub enum StarfieldError {
    /// A configuration value violated its precondition.
    #[error("invalid starfield configuration: {field} {reason}")]
    InvalidConfig {
        /// Name of the offending field.
        field: &'static str,
        /// Constraint the value failed.
        reason: &'static str,
    },
    /// The rendering collaborator could not provide a drawable.
    #[error("rendering surface rejected drawable creation")]
    Surface(#[from] SurfaceError),
}

/// Fixed-size starfield whose stars fly toward the camera.
#[derive(Debug)]
pub struct StarfieldSimulator<D> {
    world: World,
    tuning: ProjectionTuning,
    drawables: Vec<D>,
    warp_timer: WarpTimer,
    projection: Projection,
    transforms: Vec<StarTransform>,
    events: Vec<Event>,
    commands: Vec<Command>,
}

impl<D: Copy> StarfieldSimulator<D> {
    /// Spawns `config.star_count` stars and requests one drawable per star.
    ///
    /// Drawable creation failures abort initialization.
    pub fn initialize<S>(
        config: StarfieldConfig,
        surface: &mut S,
        texture: TextureHandle,
    ) -> Result<Self, StarfieldError>
    where
        S: DrawableSurface<Drawable = D>,
    {
        config.validate()?;
        let world = World::new(world::Config::new(
            config.star_count,
            config.tuning.base_speed,
            config.seed,
        ));
        let simulator = Self::from_world(world, config, surface, texture)?;
        info!(
            stars = simulator.star_count(),
            seed = config.seed,
            "starfield initialised"
        );
        Ok(simulator)
    }

    /// Wraps an existing world, requesting one drawable per star.
    ///
    /// `config.star_count`, `config.seed` and `config.tuning.base_speed` are
    /// ignored in favour of the world's own arena, random stream and camera
    /// motion; [`Self::tuning`] reports the world's base speed.
    pub fn from_world<S>(
        world: World,
        config: StarfieldConfig,
        surface: &mut S,
        texture: TextureHandle,
    ) -> Result<Self, StarfieldError>
    where
        S: DrawableSurface<Drawable = D>,
    {
        let tuning = ProjectionTuning {
            base_speed: query::base_speed(&world),
            ..config.tuning
        };
        if let Some(field) = tuning.first_invalid() {
            return Err(StarfieldError::InvalidConfig {
                field,
                reason: "must be positive and finite",
            });
        }

        let star_count = query::star_count(&world);
        let mut drawables = Vec::with_capacity(star_count);
        for _ in 0..star_count {
            let drawable = surface.create_drawable(texture)?;
            surface.attach_to_scene(drawable);
            drawables.push(drawable);
        }

        Ok(Self {
            world,
            tuning,
            drawables,
            warp_timer: WarpTimer::new(warp_timer::Config::new(config.warp_period)),
            projection: Projection,
            transforms: Vec::with_capacity(star_count),
            events: Vec::new(),
            commands: Vec::new(),
        })
    }

    /// Selects warp (`true`) or cruise (`false`) as the speed target.
    pub fn set_warp(&mut self, on: bool) {
        self.apply(Command::SetWarp {
            mode: WarpMode::from_enabled(on),
        });
    }

    /// Advances the simulation by `delta` reference frames and repositions
    /// every drawable.
    ///
    /// Returns the number of stars recycled during the tick.
    pub fn tick<S>(&mut self, delta: f32, viewport: Viewport, surface: &mut S) -> usize
    where
        S: DrawableSurface<Drawable = D>,
    {
        self.events.clear();
        world::apply(&mut self.world, Command::Tick { delta }, &mut self.events);
        let respawned = self
            .events
            .iter()
            .filter(|event| matches!(event, Event::StarRespawned { .. }))
            .count();
        if respawned > 0 {
            trace!(respawned, "stars recycled");
        }

        self.projection.handle(
            query::stars(&self.world),
            query::camera_depth(&self.world),
            query::speed(&self.world),
            viewport,
            &self.tuning,
            &mut self.transforms,
        );

        for (drawable, transform) in self.drawables.iter().zip(&self.transforms) {
            surface.set_position(*drawable, transform.x, transform.y);
            surface.set_scale(*drawable, transform.scale_x, transform.scale_y);
            surface.set_rotation(*drawable, transform.rotation);
        }

        respawned
    }

    /// Advances the simulation by wall-clock time, toggling warp on schedule.
    ///
    /// Returns the number of stars recycled during the tick.
    pub fn advance<S>(&mut self, dt: Duration, viewport: Viewport, surface: &mut S) -> usize
    where
        S: DrawableSurface<Drawable = D>,
    {
        self.commands.clear();
        self.warp_timer
            .handle(dt, query::warp_mode(&self.world), &mut self.commands);
        let commands = std::mem::take(&mut self.commands);
        for command in &commands {
            self.apply(*command);
        }
        self.commands = commands;

        self.tick(dt.as_secs_f32() * REFERENCE_FRAME_RATE, viewport, surface)
    }

    fn apply(&mut self, command: Command) {
        self.events.clear();
        world::apply(&mut self.world, command, &mut self.events);
        for event in &self.events {
            if let Event::WarpChanged { mode } = event {
                debug!(?mode, "warp target changed");
            }
        }
    }

    /// Read-only access to the underlying world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Stars in arena order.
    #[must_use]
    pub fn stars(&self) -> &[Star] {
        query::stars(&self.world)
    }

    /// Number of simulated stars.
    #[must_use]
    pub fn star_count(&self) -> usize {
        query::star_count(&self.world)
    }

    /// Drawables in arena order; `drawables()[i]` renders `stars()[i]`.
    #[must_use]
    pub fn drawables(&self) -> &[D] {
        &self.drawables
    }

    /// Transforms written during the most recent tick, in arena order.
    #[must_use]
    pub fn transforms(&self) -> &[StarTransform] {
        &self.transforms
    }

    /// Total distance the camera has travelled.
    #[must_use]
    pub fn camera_depth(&self) -> f64 {
        query::camera_depth(&self.world)
    }

    /// Current eased speed.
    #[must_use]
    pub fn speed(&self) -> f32 {
        query::speed(&self.world)
    }

    /// Warp mode the speed currently eases toward.
    #[must_use]
    pub fn warp_mode(&self) -> WarpMode {
        query::warp_mode(&self.world)
    }

    /// Projection and motion constants in use.
    #[must_use]
    pub fn tuning(&self) -> &ProjectionTuning {
        &self.tuning
    }
}
