//! Spherical box blur of signed distances.

use glam::{IVec3, Vec3};
use tracing::trace_span;
use voxsculpt_core::math::lerp;
use voxsculpt_core::Box3i;
use voxsculpt_voxel::{ChannelId, VoxelBuffer};

/// Blur the SDF channel of `src` into `dst`.
///
/// `src` is padded by `radius` on every side and `dst` is resized to the
/// unpadded size. Each cell averages the cube of side `2 * radius + 1` around
/// it (only the part inside `src`), then blends toward that average with a
/// weight going from 1 at `sphere_center` to 0 at `sphere_radius`.
/// `sphere_center` is relative to the unpadded box. Cells with a null weight
/// keep their exact original value.
pub fn box_blur(
    src: &VoxelBuffer,
    dst: &mut VoxelBuffer,
    radius: i32,
    sphere_center: Vec3,
    sphere_radius: f32,
) {
    let _span = trace_span!("box_blur", radius).entered();
    let channel = ChannelId::Sdf;

    dst.copy_format(src);
    dst.create((src.size() - IVec3::splat(2 * radius)).max(IVec3::ZERO));

    let src_box = src.local_box();
    let pad = IVec3::splat(radius);

    dst.local_box().for_each_cell(|pos| {
        let src_pos = pos + pad;
        let distance = pos.as_vec3().distance(sphere_center);
        let weight = (1.0 - distance / sphere_radius).clamp(0.0, 1.0);
        if weight <= 0.0 {
            dst.set_voxel(pos, src.get_voxel(src_pos, channel), channel);
            return;
        }

        let area = Box3i::from_min_max(src_pos - pad, src_pos + pad + IVec3::ONE).clipped(&src_box);
        let mut sum = 0.0;
        area.for_each_cell(|p| sum += src.get_voxel_f(p, channel));
        let average = sum / area.volume() as f32;

        let original = src.get_voxel_f(src_pos, channel);
        dst.set_voxel_f(pos, lerp(original, average, weight), channel);
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn output_has_unpadded_size() {
        let src = VoxelBuffer::new(IVec3::splat(10));
        let mut dst = VoxelBuffer::default();
        box_blur(&src, &mut dst, 2, Vec3::splat(3.0), 3.0);
        assert_eq!(dst.size(), IVec3::splat(6));
    }

    #[test]
    fn uniform_field_is_unchanged() {
        let mut src = VoxelBuffer::new(IVec3::splat(8));
        src.fill_f(1.5, ChannelId::Sdf);
        let mut dst = VoxelBuffer::default();
        box_blur(&src, &mut dst, 1, Vec3::splat(3.0), 3.0);
        dst.local_box().for_each_cell(|pos| {
            assert_relative_eq!(dst.get_voxel_f(pos, ChannelId::Sdf), 1.5);
        });
    }

    #[test]
    fn center_takes_full_average() {
        let mut src = VoxelBuffer::new(IVec3::splat(5));
        src.fill_f(0.0, ChannelId::Sdf);
        src.set_voxel_f(IVec3::splat(2), 27.0, ChannelId::Sdf);
        let mut dst = VoxelBuffer::default();
        // Unpadded size 3, sphere centered on its middle cell.
        box_blur(&src, &mut dst, 1, Vec3::splat(1.0), 2.0);
        assert_relative_eq!(dst.get_voxel_f(IVec3::ONE, ChannelId::Sdf), 1.0);
    }

    #[test]
    fn cells_outside_sphere_keep_raw_value() {
        let mut src = VoxelBuffer::new(IVec3::splat(6));
        src.local_box().for_each_cell(|pos| {
            src.set_voxel_f(pos, pos.x as f32 * 0.1, ChannelId::Sdf);
        });
        let mut dst = VoxelBuffer::default();
        box_blur(&src, &mut dst, 1, Vec3::ZERO, 0.5);
        assert_eq!(
            dst.get_voxel(IVec3::new(3, 3, 3), ChannelId::Sdf),
            src.get_voxel(IVec3::new(4, 4, 4), ChannelId::Sdf)
        );
    }
}
