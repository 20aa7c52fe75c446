use std::{collections::HashMap, fs, path::Path};

use glam::Vec2;
use macroquad::{
    math::Vec2 as MacroquadVec2,
    texture::{self, DrawTextureParams, Texture2D},
};
use warpfield_core::{AssetLoadError, TextureHandle};
use warpfield_rendering::{SpriteInstance, TextureRegistry};

/// Screen-space placement of a sprite, resolved against its texture size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct SpritePlacement {
    /// Top-left corner of the destination rectangle.
    pub(crate) top_left: Vec2,
    /// Size of the destination rectangle in pixels.
    pub(crate) size: Vec2,
    /// Absolute screen point the sprite rotates around.
    pub(crate) pivot: Vec2,
    /// Rotation in radians.
    pub(crate) rotation: f32,
}

/// Resolves where a sprite lands on screen.
///
/// Returns `None` for sprites that would cover no pixels.
pub(crate) fn sprite_placement(
    instance: &SpriteInstance,
    texture_size: Vec2,
) -> Option<SpritePlacement> {
    if !instance.is_visible() {
        return None;
    }

    let size = texture_size * instance.scale;
    if size.x <= f32::EPSILON || size.y <= f32::EPSILON || !size.is_finite() {
        return None;
    }

    Some(SpritePlacement {
        top_left: instance.position - instance.anchor * size,
        size,
        pivot: instance.position,
        rotation: instance.rotation,
    })
}

/// Textures loaded for every handle of a scene's registry.
#[derive(Debug)]
pub(crate) struct TextureCache {
    textures: HashMap<TextureHandle, Texture2D>,
}

impl TextureCache {
    /// Loads every registered texture from disk.
    pub(crate) fn load(registry: &TextureRegistry) -> Result<Self, AssetLoadError> {
        Self::load_with(registry, default_loader)
    }

    fn load_with(
        registry: &TextureRegistry,
        mut loader: impl FnMut(&str) -> Result<Texture2D, AssetLoadError>,
    ) -> Result<Self, AssetLoadError> {
        let mut textures = HashMap::with_capacity(registry.len());
        for (handle, identifier) in registry.iter() {
            let texture = loader(identifier)?;
            let _ = textures.insert(handle, texture);
        }
        Ok(Self { textures })
    }

    /// Draws a sprite with its registered texture; unknown handles are skipped.
    pub(crate) fn draw(&self, instance: &SpriteInstance) {
        let Some(texture) = self.textures.get(&instance.texture).copied() else {
            return;
        };
        let texture_size = Vec2::new(texture.width(), texture.height());
        let Some(placement) = sprite_placement(instance, texture_size) else {
            return;
        };

        let params = DrawTextureParams {
            dest_size: Some(MacroquadVec2::new(placement.size.x, placement.size.y)),
            rotation: placement.rotation,
            pivot: Some(MacroquadVec2::new(placement.pivot.x, placement.pivot.y)),
            ..DrawTextureParams::default()
        };

        texture::draw_texture_ex(
            texture,
            placement.top_left.x,
            placement.top_left.y,
            macroquad::color::WHITE,
            params,
        );
    }

    /// Returns the number of loaded textures.
    pub(crate) fn len(&self) -> usize {
        self.textures.len()
    }
}

/// RGBA pixels decoded from an image file.
#[derive(Debug)]
pub(crate) struct DecodedTexture {
    pub(crate) width: u16,
    pub(crate) height: u16,
    pub(crate) pixels: Vec<u8>,
}

/// Decodes image bytes without touching the GPU.
pub(crate) fn decode_texture(
    identifier: &str,
    bytes: &[u8],
) -> Result<DecodedTexture, AssetLoadError> {
    if bytes.is_empty() {
        return Err(AssetLoadError::new(identifier, "file is empty"));
    }
    let image = image::load_from_memory(bytes)
        .map_err(|error| AssetLoadError::new(identifier, error.to_string()))?
        .to_rgba8();
    let (Ok(width), Ok(height)) = (u16::try_from(image.width()), u16::try_from(image.height()))
    else {
        return Err(AssetLoadError::new(
            identifier,
            format!(
                "{}x{} exceeds the 65535 pixel texture limit",
                image.width(),
                image.height()
            ),
        ));
    };

    Ok(DecodedTexture {
        width,
        height,
        pixels: image.into_raw(),
    })
}

fn default_loader(identifier: &str) -> Result<Texture2D, AssetLoadError> {
    let bytes = fs::read(Path::new(identifier))
        .map_err(|error| AssetLoadError::new(identifier, error.to_string()))?;
    let decoded = decode_texture(identifier, &bytes)?;
    Ok(Texture2D::from_rgba8(decoded.width, decoded.height, &decoded.pixels))
}
