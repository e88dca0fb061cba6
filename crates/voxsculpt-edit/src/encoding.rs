//! Helpers to pack colors and texture data into voxel values.

use glam::Vec4;
use voxsculpt_voxel::mixel4;

/// Quantize a float RGBA color to 8 bits per component.
#[inline]
fn to_rgba8(color: Vec4) -> [u8; 4] {
    let c = color.clamp(Vec4::ZERO, Vec4::ONE) * 255.0;
    [c.x as u8, c.y as u8, c.z as u8, c.w as u8]
}

/// Pack a color as RGBA4444.
pub fn color_to_u16(color: Vec4) -> u16 {
    let [r, g, b, a] = to_rgba8(color).map(|c| u16::from(c >> 4));
    (r << 12) | (g << 8) | (b << 4) | a
}

/// Pack a color as RGBA8888.
pub fn color_to_u32(color: Vec4) -> u32 {
    let [r, g, b, a] = to_rgba8(color).map(u32::from);
    (r << 24) | (g << 16) | (b << 8) | a
}

/// Pack four texture indices for the `Indices` channel.
pub fn indices_to_u16(indices: [u8; 4]) -> u16 {
    mixel4::encode_indices_to_packed_u16(indices[0], indices[1], indices[2], indices[3])
}

pub fn u16_to_indices(packed: u16) -> [u8; 4] {
    mixel4::decode_indices_from_packed_u16(packed)
}

/// Pack four weights given as color components for the `Weights` channel.
pub fn color_to_u16_weights(weights: Vec4) -> u16 {
    let [a, b, c, d] = to_rgba8(weights);
    mixel4::encode_weights_to_packed_u16_lossy(a, b, c, d)
}

pub fn u16_weights_to_color(packed: u16) -> Vec4 {
    let w = mixel4::decode_weights_from_packed_u16(packed);
    Vec4::new(
        f32::from(w[0]),
        f32::from(w[1]),
        f32::from(w[2]),
        f32::from(w[3]),
    ) / 255.0
}

/// Scale components so they sum to 1. A null color stays null.
pub fn normalize_color(color: Vec4) -> Vec4 {
    Vec4::from_array(mixel4::normalize_weights(color.to_array()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn color_packing() {
        assert_eq!(color_to_u32(Vec4::new(1.0, 0.0, 0.0, 1.0)), 0xFF00_00FF);
        assert_eq!(color_to_u16(Vec4::new(1.0, 0.0, 1.0, 0.0)), 0xF0F0);
        assert_eq!(color_to_u16(Vec4::splat(2.0)), 0xFFFF);
    }

    #[test]
    fn weights_roundtrip_at_full_precision() {
        let packed = color_to_u16_weights(Vec4::new(1.0, 0.0, 0.0, 0.0));
        assert_eq!(u16_weights_to_color(packed), Vec4::new(1.0, 0.0, 0.0, 0.0));
    }

    #[test]
    fn indices_roundtrip() {
        assert_eq!(u16_to_indices(indices_to_u16([3, 1, 4, 15])), [3, 1, 4, 15]);
    }

    #[test]
    fn normalize() {
        let n = normalize_color(Vec4::new(2.0, 2.0, 0.0, 0.0));
        assert_relative_eq!(n.x, 0.5);
        assert_relative_eq!(n.y, 0.5);
        assert_eq!(normalize_color(Vec4::ZERO), Vec4::ZERO);
    }
}
