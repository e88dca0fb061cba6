//! Edit configuration shared by every tool operation.

use serde::{Deserialize, Serialize};
use tracing::error;
use voxsculpt_voxel::ChannelId;

/// How new values combine with existing voxels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    /// Union with existing matter.
    #[default]
    Add,
    /// Carve the shape out of existing matter.
    Remove,
    /// Replace existing values.
    Set,
    /// Blend a texture into the packed indices/weights channels.
    TexturePaint,
}

/// Number of distinct texture indices a voxel can reference.
pub const TEXTURE_COUNT: u32 = 16;

/// Texture painting parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TextureParams {
    index: u8,
    opacity: f32,
    sharpness: f32,
}

impl Default for TextureParams {
    fn default() -> Self {
        Self {
            index: 0,
            opacity: 1.0,
            sharpness: 2.0,
        }
    }
}

impl TextureParams {
    pub const fn index(&self) -> u8 {
        self.index
    }

    pub const fn opacity(&self) -> f32 {
        self.opacity
    }

    pub const fn sharpness(&self) -> f32 {
        self.sharpness
    }

    /// Weight a texture reaches at a normalized depth inside a shape.
    ///
    /// `depth` is 0 on the surface and 1 at the core.
    #[inline]
    pub fn target_weight(&self, depth: f32) -> f32 {
        self.opacity * (self.sharpness * depth).clamp(0.0, 1.0)
    }
}

/// Edit configuration.
///
/// Fields are only changed through setters, which clamp or reject out of
/// range input. Deserialized configurations go through the same setters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawEditConfig")]
pub struct EditConfig {
    value: u64,
    eraser_value: u64,
    channel: ChannelId,
    mode: Mode,
    sdf_scale: f32,
    sdf_strength: f32,
    texture: TextureParams,
    allow_out_of_bounds: bool,
    raycast_normal_enabled: bool,
}

impl Default for EditConfig {
    fn default() -> Self {
        Self {
            value: 0,
            eraser_value: 0,
            channel: ChannelId::Type,
            mode: Mode::Add,
            sdf_scale: 1.0,
            sdf_strength: 1.0,
            texture: TextureParams::default(),
            allow_out_of_bounds: false,
            raycast_normal_enabled: false,
        }
    }
}

impl EditConfig {
    /// Value written by non-SDF edits.
    pub const fn value(&self) -> u64 {
        self.value
    }

    pub fn set_value(&mut self, value: u64) {
        self.value = value;
    }

    /// Value written by non-SDF edits in [`Mode::Remove`].
    pub const fn eraser_value(&self) -> u64 {
        self.eraser_value
    }

    pub fn set_eraser_value(&mut self, value: u64) {
        self.eraser_value = value;
    }

    pub const fn channel(&self) -> ChannelId {
        self.channel
    }

    pub fn set_channel(&mut self, channel: ChannelId) {
        self.channel = channel;
    }

    pub const fn mode(&self) -> Mode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    /// Multiplier applied to distances written by shapes.
    pub const fn sdf_scale(&self) -> f32 {
        self.sdf_scale
    }

    pub fn set_sdf_scale(&mut self, scale: f32) {
        self.sdf_scale = scale.max(0.00001);
    }

    /// How much of a blend is applied, 0 leaves voxels unchanged.
    pub const fn sdf_strength(&self) -> f32 {
        self.sdf_strength
    }

    pub fn set_sdf_strength(&mut self, strength: f32) {
        self.sdf_strength = strength.clamp(0.0, 1.0);
    }

    pub const fn texture_params(&self) -> &TextureParams {
        &self.texture
    }

    pub const fn texture_index(&self) -> u8 {
        self.texture.index
    }

    /// Indices outside `0..16` are rejected and leave the current one.
    pub fn set_texture_index(&mut self, index: u32) {
        if index >= TEXTURE_COUNT {
            error!(index, "Texture index out of range 0..{TEXTURE_COUNT}");
            return;
        }
        self.texture.index = index as u8;
    }

    pub const fn texture_opacity(&self) -> f32 {
        self.texture.opacity
    }

    pub fn set_texture_opacity(&mut self, opacity: f32) {
        self.texture.opacity = opacity.clamp(0.0, 1.0);
    }

    pub fn texture_falloff(&self) -> f32 {
        1.0 / self.texture.sharpness
    }

    /// Falloff is clamped to `0.001..=1` and stored as its inverse.
    pub fn set_texture_falloff(&mut self, falloff: f32) {
        self.texture.sharpness = 1.0 / falloff.clamp(0.001, 1.0);
    }

    /// Skip editability checks on shape edits. Writes to unloaded areas are dropped.
    pub const fn allow_out_of_bounds(&self) -> bool {
        self.allow_out_of_bounds
    }

    pub fn set_allow_out_of_bounds(&mut self, allow: bool) {
        self.allow_out_of_bounds = allow;
    }

    /// Stored for raycasting front-ends, which live outside this crate.
    pub const fn raycast_normal_enabled(&self) -> bool {
        self.raycast_normal_enabled
    }

    pub fn set_raycast_normal_enabled(&mut self, enabled: bool) {
        self.raycast_normal_enabled = enabled;
    }

    /// Value written by non-SDF edits for the current mode.
    #[inline]
    pub const fn paint_value(&self) -> u64 {
        match self.mode {
            Mode::Remove => self.eraser_value,
            _ => self.value,
        }
    }
}

#[derive(Deserialize)]
#[serde(default)]
struct RawEditConfig {
    value: u64,
    eraser_value: u64,
    channel: ChannelId,
    mode: Mode,
    sdf_scale: f32,
    sdf_strength: f32,
    texture: TextureParams,
    allow_out_of_bounds: bool,
    raycast_normal_enabled: bool,
}

impl Default for RawEditConfig {
    fn default() -> Self {
        let c = EditConfig::default();
        Self {
            value: c.value,
            eraser_value: c.eraser_value,
            channel: c.channel,
            mode: c.mode,
            sdf_scale: c.sdf_scale,
            sdf_strength: c.sdf_strength,
            texture: c.texture,
            allow_out_of_bounds: c.allow_out_of_bounds,
            raycast_normal_enabled: c.raycast_normal_enabled,
        }
    }
}

impl From<RawEditConfig> for EditConfig {
    fn from(raw: RawEditConfig) -> Self {
        let mut config = Self::default();
        config.set_value(raw.value);
        config.set_eraser_value(raw.eraser_value);
        config.set_channel(raw.channel);
        config.set_mode(raw.mode);
        config.set_sdf_scale(raw.sdf_scale);
        config.set_sdf_strength(raw.sdf_strength);
        config.set_texture_index(u32::from(raw.texture.index));
        config.set_texture_opacity(raw.texture.opacity);
        if raw.texture.sharpness > 0.0 {
            config.set_texture_falloff(1.0 / raw.texture.sharpness);
        }
        config.set_allow_out_of_bounds(raw.allow_out_of_bounds);
        config.set_raycast_normal_enabled(raw.raycast_normal_enabled);
        config
    }
}
