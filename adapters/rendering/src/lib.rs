#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Warpfield adapters.
//!
//! The [`Scene`] is the rendering collaborator the simulation writes into: it
//! implements [`DrawableSurface`] by storing one [`SpriteInstance`] per
//! drawable. Backends implementing [`RenderingBackend`] present the scene once
//! per frame and resolve texture handles through the scene's
//! [`TextureRegistry`].

use anyhow::Result as AnyResult;
use glam::Vec2;
use std::{f32::consts::PI, time::Duration};
use thiserror::Error;
use warpfield_core::{DrawableSurface, SurfaceError, TextureHandle, Viewport};

/// Normalised anchor of star sprites; slightly below centre so the streak
/// trails away from the vanishing point.
pub const STAR_ANCHOR: Vec2 = Vec2::new(0.5, 0.7);

/// Number of equally sized rows the title card divides the viewport into.
pub const TITLE_CARD_ROWS: u32 = 10;

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Opaque black.
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0, 1.0);

    /// Opaque white.
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);

    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Creates an opaque color from a packed `0xRRGGBB` value.
    #[must_use]
    pub const fn from_hex(rgb: u32) -> Self {
        Self::from_rgb_u8((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
    }

    /// Linearly interpolates toward `other`; `amount` is clamped to 0.0..=1.0.
    #[must_use]
    pub fn lerp(self, other: Self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);

        Self {
            red: lerp_channel(self.red, other.red, amount),
            green: lerp_channel(self.green, other.green, amount),
            blue: lerp_channel(self.blue, other.blue, amount),
            alpha: lerp_channel(self.alpha, other.alpha, amount),
        }
    }
}

fn lerp_channel(from: f32, to: f32, amount: f32) -> f32 {
    from + (to - from) * amount
}

/// Assigns opaque handles to texture identifiers.
///
/// Identifiers are resolved by the backend (file paths for the macroquad
/// adapter). Registering the same identifier twice yields the same handle.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TextureRegistry {
    identifiers: Vec<String>,
}

impl TextureRegistry {
    /// Returns the handle for `identifier`, registering it if necessary.
    pub fn register(&mut self, identifier: impl Into<String>) -> TextureHandle {
        let identifier = identifier.into();
        if let Some(index) = self.identifiers.iter().position(|known| *known == identifier) {
            return TextureHandle::new(index as u32);
        }
        self.identifiers.push(identifier);
        TextureHandle::new((self.identifiers.len() - 1) as u32)
    }

    /// Identifier a handle was registered with.
    #[must_use]
    pub fn identifier(&self, handle: TextureHandle) -> Option<&str> {
        self.identifiers
            .get(handle.get() as usize)
            .map(String::as_str)
    }

    /// Reports whether the handle was issued by this registry.
    #[must_use]
    pub fn contains(&self, handle: TextureHandle) -> bool {
        (handle.get() as usize) < self.identifiers.len()
    }

    /// Iterates over every registered handle with its identifier.
    pub fn iter(&self) -> impl Iterator<Item = (TextureHandle, &str)> {
        self.identifiers
            .iter()
            .enumerate()
            .map(|(index, identifier)| (TextureHandle::new(index as u32), identifier.as_str()))
    }

    /// Number of registered textures.
    #[must_use]
    pub fn len(&self) -> usize {
        self.identifiers.len()
    }

    /// Reports whether no texture has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.identifiers.is_empty()
    }
}

/// Identifier of a sprite stored in a [`Scene`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpriteId(u32);

impl SpriteId {
    /// Creates a new sprite identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Textured quad positioned in screen space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpriteInstance {
    /// Texture drawn by the sprite.
    pub texture: TextureHandle,
    /// Normalised point of the texture placed at `position` and rotated around.
    pub anchor: Vec2,
    /// Screen position of the anchor in pixels.
    pub position: Vec2,
    /// Multiplier applied to the texture's pixel dimensions.
    pub scale: Vec2,
    /// Rotation around the anchor in radians.
    pub rotation: f32,
    /// Whether the sprite has been attached to the scene and should be drawn.
    pub attached: bool,
}

impl SpriteInstance {
    /// Creates a detached sprite at the origin with unit scale.
    #[must_use]
    pub const fn new(texture: TextureHandle, anchor: Vec2) -> Self {
        Self {
            texture,
            anchor,
            position: Vec2::ZERO,
            scale: Vec2::ONE,
            rotation: 0.0,
            attached: false,
        }
    }

    /// Reports whether drawing the sprite would produce visible pixels.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.attached && self.scale.x > 0.0 && self.scale.y > 0.0
    }
}

/// Vertical two-stop gradient used to fill glyphs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FillGradient {
    /// Color at the top of the glyphs.
    pub top: Color,
    /// Color at the bottom of the glyphs.
    pub bottom: Color,
}

/// Shadow drawn beneath a label.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DropShadow {
    /// Shadow color.
    pub color: Color,
    /// Blur radius in pixels.
    pub blur: f32,
    /// Direction of the shadow offset in radians, clockwise from the x axis.
    pub angle: f32,
    /// Length of the shadow offset in pixels.
    pub distance: f32,
}

impl DropShadow {
    /// Screen-space offset of the shadow relative to the label.
    #[must_use]
    pub fn offset(&self) -> Vec2 {
        Vec2::new(self.angle.cos(), self.angle.sin()) * self.distance
    }
}

/// Typographic style of a title label.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextStyle {
    /// Font size in pixels.
    pub font_size: u16,
    /// Whether glyphs are slanted.
    pub italic: bool,
    /// Whether glyphs use the bold weight.
    pub bold: bool,
    /// Glyph fill.
    pub fill: FillGradient,
    /// Outline color.
    pub stroke: Color,
    /// Outline thickness in pixels; zero disables the outline.
    pub stroke_thickness: f32,
    /// Optional shadow beneath the glyphs.
    pub drop_shadow: Option<DropShadow>,
}

impl TextStyle {
    const FILL: FillGradient = FillGradient {
        top: Color::WHITE,
        bottom: Color::from_hex(0x00ff99),
    };
    const STROKE: Color = Color::from_hex(0x4a1850);
    const SHADOW: DropShadow = DropShadow {
        color: Color::BLACK,
        blur: 4.0,
        angle: PI / 6.0,
        distance: 6.0,
    };

    const fn card(font_size: u16, stroke_thickness: f32) -> Self {
        Self {
            font_size,
            italic: true,
            bold: true,
            fill: Self::FILL,
            stroke: Self::STROKE,
            stroke_thickness,
            drop_shadow: Some(Self::SHADOW),
        }
    }

    /// Style of the spaced-out lines above and below the title.
    #[must_use]
    pub const fn heading() -> Self {
        Self::card(55, 5.0)
    }

    /// Style of the main title line.
    #[must_use]
    pub const fn title() -> Self {
        Self::card(90, 7.0)
    }

    /// Style of the copyright line.
    #[must_use]
    pub const fn footer() -> Self {
        Self::card(25, 7.0)
    }
}

/// Centered line of text pinned to one of the title card's rows.
#[derive(Clone, Debug, PartialEq)]
pub struct TitleLabel {
    /// Text rendered by the label.
    pub text: String,
    /// Typographic style of the label.
    pub style: TextStyle,
    /// Row the label is centred on, counted from the top in tenths of the viewport.
    pub slot: u32,
}

impl TitleLabel {
    /// Creates a new label description.
    #[must_use]
    pub fn new(text: impl Into<String>, style: TextStyle, slot: u32) -> Self {
        Self {
            text: text.into(),
            style,
            slot,
        }
    }
}

/// Label with a resolved screen position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlacedLabel<'a> {
    /// Label being placed.
    pub label: &'a TitleLabel,
    /// Screen position of the label's centre.
    pub center: Vec2,
}

/// Static title text drawn on top of the starfield.
#[derive(Clone, Debug, PartialEq)]
pub struct TitleCard {
    labels: Vec<TitleLabel>,
}

impl TitleCard {
    /// Creates a title card, rejecting labels outside the card's rows.
    pub fn new(labels: Vec<TitleLabel>) -> Result<Self, RenderingError> {
        if let Some(label) = labels
            .iter()
            .find(|label| label.slot == 0 || label.slot > TITLE_CARD_ROWS)
        {
            return Err(RenderingError::InvalidLabelSlot { slot: label.slot });
        }
        Ok(Self { labels })
    }

    /// The demo's opening credits.
    #[must_use]
    pub fn opening_credits() -> Self {
        Self {
            labels: vec![
                TitleLabel::new("T h e    H u n t    F o r", TextStyle::heading(), 1),
                TitleLabel::new("Roy Carnassus", TextStyle::title(), 2),
                TitleLabel::new("P a r t :    I I", TextStyle::heading(), 3),
                TitleLabel::new("©️ 2005 Jack Games", TextStyle::footer(), 9),
            ],
        }
    }

    /// Labels in draw order.
    #[must_use]
    pub fn labels(&self) -> &[TitleLabel] {
        &self.labels
    }

    /// Resolves every label's centre for the provided viewport.
    #[must_use]
    pub fn layout(&self, viewport: Viewport) -> Vec<PlacedLabel<'_>> {
        let row_height = viewport.height / TITLE_CARD_ROWS as f32;
        self.labels
            .iter()
            .map(|label| PlacedLabel {
                label,
                center: Vec2::new(viewport.center_x(), row_height * label.slot as f32),
            })
            .collect()
    }
}

/// Scene description combining star sprites and the title card.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Size of the drawing area; refreshed by the backend before every update.
    pub viewport: Viewport,
    /// Textures referenced by the scene's sprites.
    pub textures: TextureRegistry,
    /// Sprites in draw order.
    pub sprites: Vec<SpriteInstance>,
    /// Optional text drawn above the sprites.
    pub title_card: Option<TitleCard>,
}

impl Scene {
    /// Creates an empty scene for the provided viewport.
    #[must_use]
    pub fn new(viewport: Viewport, title_card: Option<TitleCard>) -> Self {
        Self {
            viewport,
            textures: TextureRegistry::default(),
            sprites: Vec::new(),
            title_card,
        }
    }

    /// Looks up a sprite by identifier.
    #[must_use]
    pub fn sprite(&self, id: SpriteId) -> Option<&SpriteInstance> {
        self.sprites.get(id.get() as usize)
    }

    fn sprite_mut(&mut self, id: SpriteId) -> Option<&mut SpriteInstance> {
        self.sprites.get_mut(id.get() as usize)
    }
}

impl DrawableSurface for Scene {
    type Drawable = SpriteId;

    fn create_drawable(&mut self, texture: TextureHandle) -> Result<SpriteId, SurfaceError> {
        if !self.textures.contains(texture) {
            return Err(SurfaceError::UnknownTexture { handle: texture });
        }
        self.sprites.push(SpriteInstance::new(texture, STAR_ANCHOR));
        Ok(SpriteId::new((self.sprites.len() - 1) as u32))
    }

    fn set_position(&mut self, drawable: SpriteId, x: f32, y: f32) {
        if let Some(sprite) = self.sprite_mut(drawable) {
            sprite.position = Vec2::new(x, y);
        }
    }

    fn set_scale(&mut self, drawable: SpriteId, scale_x: f32, scale_y: f32) {
        if let Some(sprite) = self.sprite_mut(drawable) {
            sprite.scale = Vec2::new(scale_x, scale_y);
        }
    }

    fn set_rotation(&mut self, drawable: SpriteId, rotation: f32) {
        if let Some(sprite) = self.sprite_mut(drawable) {
            sprite.rotation = rotation;
        }
    }

    fn attach_to_scene(&mut self, drawable: SpriteId) {
        if let Some(sprite) = self.sprite_mut(drawable) {
            sprite.attached = true;
        }
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            scene,
        }
    }
}

/// Rendering backend capable of presenting Warpfield scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives the frame delta and may
    /// mutate the scene before it is rendered. The scene's viewport is
    /// refreshed from the window size before every call.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, &mut Scene) + 'static;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, PartialEq, Eq, Error)]
pub enum RenderingError {
    /// Title labels must sit on one of the card's rows.
    #[error("label slot must lie within 1..=10 (received {slot})")]
    InvalidLabelSlot {
        /// Provided slot that failed validation.
        slot: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_reuses_handles_for_known_identifiers() {
        let mut registry = TextureRegistry::default();
        let star = registry.register("assets/star.png");
        let other = registry.register("assets/other.png");

        assert_eq!(registry.register("assets/star.png"), star);
        assert_ne!(star, other);
        assert_eq!(registry.identifier(other), Some("assets/other.png"));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn scene_rejects_unregistered_textures() {
        let mut scene = Scene::new(Viewport::new(800.0, 600.0), None);

        let error = scene
            .create_drawable(TextureHandle::new(0))
            .expect_err("empty registry has no textures");

        assert_eq!(
            error,
            SurfaceError::UnknownTexture {
                handle: TextureHandle::new(0)
            }
        );
        assert!(scene.sprites.is_empty());
    }

    #[test]
    fn scene_sprites_are_visible_only_once_attached() {
        let mut scene = Scene::new(Viewport::new(800.0, 600.0), None);
        let texture = scene.textures.register("star.png");
        let sprite = scene.create_drawable(texture).expect("registered texture");

        assert!(!scene.sprite(sprite).expect("sprite exists").is_visible());
        scene.attach_to_scene(sprite);
        scene.set_position(sprite, 10.0, 20.0);
        scene.set_scale(sprite, 0.05, 0.2);
        scene.set_rotation(sprite, 1.0);

        let instance = scene.sprite(sprite).expect("sprite exists");
        assert!(instance.is_visible());
        assert_eq!(instance.anchor, STAR_ANCHOR);
        assert_eq!(instance.position, Vec2::new(10.0, 20.0));
        assert_eq!(instance.scale, Vec2::new(0.05, 0.2));
        assert_eq!(instance.rotation, 1.0);

        scene.set_scale(sprite, 0.0, 0.0);
        assert!(!scene.sprite(sprite).expect("sprite exists").is_visible());
    }

    #[test]
    fn title_card_rows_follow_viewport_height() {
        let card = TitleCard::opening_credits();
        let placed = card.layout(Viewport::new(1280.0, 720.0));

        let centers: Vec<Vec2> = placed.iter().map(|label| label.center).collect();
        assert_eq!(
            centers,
            vec![
                Vec2::new(640.0, 72.0),
                Vec2::new(640.0, 144.0),
                Vec2::new(640.0, 216.0),
                Vec2::new(640.0, 648.0),
            ]
        );
        assert_eq!(placed[1].label.text, "Roy Carnassus");
        assert_eq!(placed[1].label.style.font_size, 90);
    }

    #[test]
    fn title_card_rejects_slots_outside_rows() {
        let error = TitleCard::new(vec![TitleLabel::new("late", TextStyle::footer(), 11)])
            .expect_err("slot 11 is off the card");

        assert_eq!(error, RenderingError::InvalidLabelSlot { slot: 11 });
        assert!(TitleCard::new(vec![TitleLabel::new("top", TextStyle::heading(), 1)]).is_ok());
    }

    #[test]
    fn drop_shadow_offset_points_down_and_right() {
        let shadow = TextStyle::heading().drop_shadow.expect("card styles cast shadows");
        let offset = shadow.offset();

        assert!(offset.x > 0.0 && offset.y > 0.0);
        assert!((offset.length() - 6.0).abs() < 1e-5);
    }

    #[test]
    fn color_from_hex_unpacks_channels() {
        assert_eq!(Color::from_hex(0x4a1850), Color::from_rgb_u8(0x4a, 0x18, 0x50));
        assert_eq!(Color::BLACK.lerp(Color::WHITE, 2.0), Color::WHITE);
    }
}
