//! Uniform growth of signed distances.

use voxsculpt_voxel::{ChannelId, VoxelBuffer};

/// Offset every SDF voxel of `buffer` so matter grows by `offset`.
///
/// A negative offset shrinks matter. There is no falloff: the whole buffer
/// moves by the same amount.
pub fn grow_sphere(buffer: &mut VoxelBuffer, offset: f32) {
    let channel = ChannelId::Sdf;
    if let Some(raw) = buffer.uniform_value(channel) {
        let depth = buffer.channel_depth(channel);
        let value = voxsculpt_voxel::decode_sdf(raw, depth);
        buffer.fill_f(value - offset, channel);
        return;
    }
    buffer.local_box().for_each_cell(|pos| {
        let value = buffer.get_voxel_f(pos, channel);
        buffer.set_voxel_f(pos, value - offset, channel);
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use glam::IVec3;

    #[test]
    fn positive_offset_grows_matter() {
        let mut buffer = VoxelBuffer::new(IVec3::splat(3));
        buffer.local_box().for_each_cell(|pos| {
            buffer.set_voxel_f(pos, pos.x as f32 - 1.0, ChannelId::Sdf);
        });
        grow_sphere(&mut buffer, 0.5);
        assert_relative_eq!(buffer.get_voxel_f(IVec3::new(1, 0, 0), ChannelId::Sdf), -0.5);
        assert_relative_eq!(buffer.get_voxel_f(IVec3::new(2, 2, 2), ChannelId::Sdf), 0.5);
    }

    #[test]
    fn negative_offset_shrinks_uniform_buffer() {
        let mut buffer = VoxelBuffer::new(IVec3::splat(2));
        buffer.fill_f(-1.0, ChannelId::Sdf);
        grow_sphere(&mut buffer, -2.0);
        assert_relative_eq!(buffer.get_voxel_f(IVec3::ONE, ChannelId::Sdf), 1.0);
    }
}
