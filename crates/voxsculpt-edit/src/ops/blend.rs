//! Signed distance and texture blending.

use glam::IVec3;
use voxsculpt_core::math::lerp;
use voxsculpt_voxel::{mixel4, ChannelId};

use super::access::BlockAccessMut;
use crate::config::{Mode, TextureParams};

/// Combine a new signed distance with the existing one.
///
/// Negative distances are inside matter.
#[inline]
pub fn sdf_blend(new: f32, old: f32, mode: Mode) -> f32 {
    match mode {
        Mode::Add => old.min(new),
        Mode::Remove => old.max(-new),
        Mode::Set => new,
        // Painting never changes the shape.
        Mode::TexturePaint => old,
    }
}

/// [`sdf_blend`] attenuated by `strength`. A strength of 0 returns `old` exactly.
#[inline]
pub fn sdf_blend_with_strength(new: f32, old: f32, mode: Mode, strength: f32) -> f32 {
    lerp(old, sdf_blend(new, old, mode), strength)
}

/// Paint a texture into the packed `Indices`/`Weights` channels of one voxel.
///
/// `depth` is 0 on the shape surface and 1 at its core.
pub fn paint_texture<A: BlockAccessMut + ?Sized>(
    access: &mut A,
    pos: IVec3,
    params: &TextureParams,
    depth: f32,
) {
    let target = params.target_weight(depth);
    if target <= 0.0 {
        return;
    }
    let mut indices = access.get_voxel(pos, ChannelId::Indices) as u16;
    let mut weights = access.get_voxel(pos, ChannelId::Weights) as u16;
    mixel4::blend_texture_packed_u16(params.index(), target, &mut indices, &mut weights);
    access.set_voxel(pos, u64::from(indices), ChannelId::Indices);
    access.set_voxel(pos, u64::from(weights), ChannelId::Weights);
}

#[cfg(test)]
mod tests {
    use super::*;
    use voxsculpt_voxel::VoxelBuffer;

    #[test]
    fn blend_modes() {
        assert_eq!(sdf_blend(-2.0, 3.0, Mode::Add), -2.0);
        assert_eq!(sdf_blend(5.0, 3.0, Mode::Add), 3.0);
        assert_eq!(sdf_blend(-2.0, -5.0, Mode::Remove), 2.0);
        assert_eq!(sdf_blend(4.0, -1.0, Mode::Remove), -1.0);
        assert_eq!(sdf_blend(7.0, -1.0, Mode::Set), 7.0);
        assert_eq!(sdf_blend(7.0, -1.0, Mode::TexturePaint), -1.0);
    }

    #[test]
    fn strength_interpolates() {
        assert_eq!(sdf_blend_with_strength(-4.0, 4.0, Mode::Set, 0.0), 4.0);
        assert_eq!(sdf_blend_with_strength(-4.0, 4.0, Mode::Set, 1.0), -4.0);
        assert_eq!(sdf_blend_with_strength(-4.0, 4.0, Mode::Set, 0.5), 0.0);
    }

    #[test]
    fn paint_on_empty_voxel() {
        let mut buffer = VoxelBuffer::new(IVec3::ONE);
        let params = TextureParams::default();
        paint_texture(&mut buffer, IVec3::ZERO, &params, 1.0);

        let indices = mixel4::decode_indices_from_packed_u16(
            buffer.get_voxel(IVec3::ZERO, ChannelId::Indices) as u16,
        );
        let weights = mixel4::decode_weights_from_packed_u16(
            buffer.get_voxel(IVec3::ZERO, ChannelId::Weights) as u16,
        );
        let slot = indices.iter().position(|i| *i == 0).unwrap();
        assert_eq!(weights[slot], 255);
    }

    #[test]
    fn paint_outside_shape_does_nothing() {
        let mut buffer = VoxelBuffer::new(IVec3::ONE);
        let params = TextureParams::default();
        paint_texture(&mut buffer, IVec3::ZERO, &params, 0.0);
        paint_texture(&mut buffer, IVec3::ZERO, &params, -3.0);
        assert_eq!(buffer.get_voxel(IVec3::ZERO, ChannelId::Weights), 0);
    }
}
