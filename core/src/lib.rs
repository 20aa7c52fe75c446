#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Warpfield starfield.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters and systems submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! describing what changed. Rendering collaborators are reached exclusively
//! through the [`DrawableSurface`] trait so the simulation never depends on a
//! concrete graphics stack.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of stars simulated when no explicit count is configured.
pub const DEFAULT_STAR_COUNT: usize = 2000;

/// Depth range covered by stars spawned during initialization.
pub const INITIAL_DEPTH_RANGE: f64 = 2000.0;

/// Minimum distance ahead of the camera at which respawned stars reappear.
pub const RESPAWN_DEPTH_OFFSET: f64 = 2000.0;

/// Random jitter added on top of [`RESPAWN_DEPTH_OFFSET`] for respawned stars.
pub const RESPAWN_DEPTH_JITTER: f64 = 1000.0;

/// Smallest radial offset a star may have from the view axis.
pub const MIN_RADIAL_DISTANCE: f32 = 1.0;

/// Exclusive upper bound of the radial offset a star may have from the view axis.
pub const MAX_RADIAL_DISTANCE: f32 = 51.0;

/// Depth beyond which stars shrink to a zero scale.
pub const VISIBLE_DEPTH: f32 = 2000.0;

/// Divisor applied to the speed error on every tick.
pub const SPEED_EASING_DIVISOR: f32 = 20.0;

/// Distance the camera travels per reference frame at unit speed.
pub const CAMERA_ADVANCE_FACTOR: f32 = 10.0;

/// Frame rate a tick delta of `1.0` corresponds to.
pub const REFERENCE_FRAME_RATE: f32 = 60.0;

/// Target velocity selected by the warp control signal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WarpMode {
    /// Normal flight; the eased speed converges toward zero.
    #[default]
    Cruise,
    /// Warp flight; the eased speed converges toward one.
    Warp,
}

impl WarpMode {
    /// Maps a boolean warp switch onto the corresponding mode.
    #[must_use]
    pub const fn from_enabled(enabled: bool) -> Self {
        if enabled {
            Self::Warp
        } else {
            Self::Cruise
        }
    }

    /// Speed the simulation eases toward while this mode is active.
    #[must_use]
    pub const fn target_speed(self) -> f32 {
        match self {
            Self::Cruise => 0.0,
            Self::Warp => 1.0,
        }
    }

    /// Returns the opposite mode.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Cruise => Self::Warp,
            Self::Warp => Self::Cruise,
        }
    }
}

/// Placement rules applied when a star is (re)spawned.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpawnPolicy {
    /// Uniform depth over the whole visible range so the field starts populated.
    Initial,
    /// Far-plane placement ahead of the camera for stars that passed it.
    Subsequent,
}

/// Index-based identifier of a star within the fixed-size star arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StarId(u32);

impl StarId {
    /// Creates a new star identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Position of the star inside the arena.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }
}

/// Simulated particle described by its depth and radial offset.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Star {
    depth: f64,
    x: f32,
    y: f32,
}

impl Star {
    /// Creates a new star at the provided depth and radial offset.
    #[must_use]
    pub const fn new(depth: f64, x: f32, y: f32) -> Self {
        Self { depth, x, y }
    }

    /// Distance from the origin along the view axis.
    ///
    /// Depths grow without bound while the camera flies, so they are kept in
    /// double precision; only camera-relative distances are narrowed.
    #[must_use]
    pub const fn depth(&self) -> f64 {
        self.depth
    }

    /// Horizontal offset from the view axis.
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    /// Vertical offset from the view axis.
    #[must_use]
    pub const fn y(&self) -> f32 {
        self.y
    }

    /// Euclidean distance between the star and the view axis.
    #[must_use]
    pub fn radial_distance(&self) -> f32 {
        self.x.hypot(self.y)
    }
}

/// Dimensions of the drawing area the starfield projects onto.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Width of the drawing area in screen pixels.
    pub width: f32,
    /// Height of the drawing area in screen pixels.
    pub height: f32,
}

impl Viewport {
    /// Creates a new viewport descriptor.
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Horizontal coordinate of the vanishing point.
    #[must_use]
    pub fn center_x(&self) -> f32 {
        self.width / 2.0
    }

    /// Vertical coordinate of the vanishing point.
    #[must_use]
    pub fn center_y(&self) -> f32 {
        self.height / 2.0
    }

    /// Reports whether both dimensions are positive and finite.
    #[must_use]
    pub fn has_area(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// Constants controlling how stars are moved and projected.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProjectionTuning {
    /// Focal-length-like constant of the pinhole projection.
    pub field_of_view: f32,
    /// Speed added to the eased speed so the camera always moves forward.
    pub base_speed: f32,
    /// Strength of the radial motion streak at full warp.
    pub stretch_factor: f32,
    /// Sprite scale of a star sitting on the camera plane.
    pub base_size: f32,
}

impl ProjectionTuning {
    /// Reports the name of the first constant that is not positive and finite.
    #[must_use]
    pub fn first_invalid(&self) -> Option<&'static str> {
        [
            ("field_of_view", self.field_of_view),
            ("base_speed", self.base_speed),
            ("stretch_factor", self.stretch_factor),
            ("base_size", self.base_size),
        ]
        .into_iter()
        .find(|(_, value)| !(value.is_finite() && *value > 0.0))
        .map(|(name, _)| name)
    }
}

impl Default for ProjectionTuning {
    fn default() -> Self {
        Self {
            field_of_view: 20.0,
            base_speed: 0.025,
            stretch_factor: 5.0,
            base_size: 0.05,
        }
    }
}

/// Screen-space transform computed for a single star.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StarTransform {
    /// Horizontal screen position of the sprite anchor.
    pub x: f32,
    /// Vertical screen position of the sprite anchor.
    pub y: f32,
    /// Horizontal sprite scale.
    pub scale_x: f32,
    /// Vertical sprite scale, including the motion streak.
    pub scale_y: f32,
    /// Rotation in radians that points the long axis away from the vanishing point.
    pub rotation: f32,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation by the provided number of reference frames.
    Tick {
        /// Elapsed time since the previous tick, measured in reference frames.
        delta: f32,
    },
    /// Selects the speed the simulation eases toward.
    SetWarp {
        /// Mode the world should activate.
        mode: WarpMode,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock and camera advanced.
    TimeAdvanced {
        /// Reference frames that elapsed in the tick.
        delta: f32,
        /// Camera depth after the tick.
        camera_depth: f64,
        /// Eased speed after the tick.
        speed: f32,
    },
    /// Announces that the warp control signal changed.
    WarpChanged {
        /// Mode that became active.
        mode: WarpMode,
    },
    /// Confirms that a star passed the camera and was placed ahead of it again.
    StarRespawned {
        /// Identifier of the recycled star.
        star: StarId,
        /// Depth assigned to the star.
        depth: f64,
    },
}

/// Opaque handle referring to a texture known to the rendering collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureHandle(u32);

impl TextureHandle {
    /// Creates a new texture handle with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the handle.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Rendering collaborator that owns the drawables the simulation positions.
pub trait DrawableSurface {
    /// Opaque reference to a drawable created by the surface.
    type Drawable: Copy;

    /// Creates a drawable that renders the provided texture.
    fn create_drawable(&mut self, texture: TextureHandle) -> Result<Self::Drawable, SurfaceError>;

    /// Moves the drawable's anchor to the provided screen position.
    fn set_position(&mut self, drawable: Self::Drawable, x: f32, y: f32);

    /// Updates the drawable's horizontal and vertical scale.
    fn set_scale(&mut self, drawable: Self::Drawable, scale_x: f32, scale_y: f32);

    /// Updates the drawable's rotation in radians.
    fn set_rotation(&mut self, drawable: Self::Drawable, rotation: f32);

    /// Makes the drawable part of the presented scene.
    fn attach_to_scene(&mut self, drawable: Self::Drawable);
}

/// Failures reported by a [`DrawableSurface`].
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SurfaceError {
    /// The texture handle was never issued by the surface's registry.
    #[error("texture handle {} is not registered", handle.get())]
    UnknownTexture {
        /// Handle that failed to resolve.
        handle: TextureHandle,
    },
}

/// Raised when a texture cannot be retrieved or decoded.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("failed to load texture '{identifier}': {reason}")]
pub struct AssetLoadError {
    /// Identifier the texture was requested with.
    pub identifier: String,
    /// Human readable cause reported by the loader.
    pub reason: String,
}

impl AssetLoadError {
    /// Creates a new asset load error.
    #[must_use]
    pub fn new(identifier: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            reason: reason.into(),
        }
    }
}
