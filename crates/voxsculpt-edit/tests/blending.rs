use approx::assert_relative_eq;
use glam::{IVec3, Vec3};
use voxsculpt_voxel::{mixel4, ChannelId, VoxelBuffer};
use voxsculpt_edit::ops::{sdf_blend, sdf_blend_with_strength};
use voxsculpt_edit::{BufferBackend, Mode, VoxelTool};

fn gradient_buffer(size: i32) -> VoxelBuffer {
    let mut buffer = VoxelBuffer::new(IVec3::splat(size));
    buffer.local_box().for_each_cell(|p| {
        let sd = (p.x - 5) as f32 * 0.5 + (p.y - p.z) as f32 * 0.25;
        buffer.set_voxel_f(p, sd, ChannelId::Sdf);
    });
    buffer
}

fn sdf_tool(buffer: VoxelBuffer) -> VoxelTool<BufferBackend> {
    let mut tool = VoxelTool::new(BufferBackend::new(buffer));
    tool.config_mut().set_channel(ChannelId::Sdf);
    tool
}

#[test]
fn blend_identities() {
    for (new, old) in [(-3.0, 2.0), (1.5, -0.5), (0.0, 4.0), (7.0, 7.0)] {
        assert_eq!(sdf_blend(new, old, Mode::Add), f32::min(old, new));
        assert_eq!(sdf_blend(new, old, Mode::Remove), f32::max(old, -new));
        assert_eq!(sdf_blend(new, old, Mode::Set), new);
        assert_eq!(sdf_blend(new, old, Mode::TexturePaint), old);

        for mode in [Mode::Add, Mode::Remove, Mode::Set] {
            assert_eq!(sdf_blend_with_strength(new, old, mode, 0.0), old);
            assert_eq!(sdf_blend_with_strength(new, old, mode, 1.0), sdf_blend(new, old, mode));
        }
    }
}

#[test]
fn zero_strength_leaves_buffer_unchanged() {
    let original = gradient_buffer(12);

    for mode in [Mode::Add, Mode::Remove, Mode::Set] {
        let mut tool = sdf_tool(original.clone());
        tool.config_mut().set_mode(mode);
        tool.config_mut().set_sdf_strength(0.0);

        tool.do_sphere(Vec3::splat(6.0), 4.0).unwrap();
        tool.do_box(IVec3::new(1, 1, 1), IVec3::new(4, 9, 3)).unwrap();

        assert_eq!(tool.backend().buffer(), &original, "mode {mode:?}");
    }
}

#[test]
fn box_corners_in_any_order() {
    let a = IVec3::new(2, 7, 3);
    let b = IVec3::new(6, 1, 5);

    let mut first = sdf_tool(gradient_buffer(10));
    let mut second = sdf_tool(gradient_buffer(10));
    first.do_box(a, b).unwrap();
    second.do_box(b, a).unwrap();

    assert_eq!(first.backend().buffer(), second.backend().buffer());
    let area = first.backend_mut().take_modified().unwrap();
    assert_eq!(area, second.backend_mut().take_modified().unwrap());
    assert_eq!(area.min_pos(), IVec3::new(2, 1, 3));
    assert_eq!(area.max_pos(), IVec3::new(7, 8, 6));
}

#[test]
fn interpolation_matches_voxels_on_grid() {
    let tool = sdf_tool(gradient_buffer(8));

    for p in [IVec3::ZERO, IVec3::new(3, 4, 5), IVec3::new(6, 6, 6), IVec3::new(1, 7, 2)] {
        assert_eq!(tool.get_voxel_f_interpolated(p.as_vec3()), tool.get_voxel_f(p));
    }

    let a = tool.get_voxel_f(IVec3::new(2, 2, 2));
    let b = tool.get_voxel_f(IVec3::new(3, 2, 2));
    assert_relative_eq!(
        tool.get_voxel_f_interpolated(Vec3::new(2.5, 2.0, 2.0)),
        (a + b) * 0.5
    );
}

#[test]
fn texture_index_out_of_range_is_rejected() {
    let mut tool = sdf_tool(VoxelBuffer::new(IVec3::splat(4)));
    tool.config_mut().set_texture_index(5);
    tool.config_mut().set_texture_index(20);
    assert_eq!(tool.config().texture_index(), 5);
    tool.config_mut().set_texture_index(15);
    assert_eq!(tool.config().texture_index(), 15);
}

#[test]
fn texture_paint_marks_sphere_center() {
    let original = gradient_buffer(12);
    let mut tool = sdf_tool(original.clone());
    tool.config_mut().set_mode(Mode::TexturePaint);
    tool.config_mut().set_texture_index(7);

    tool.do_sphere(Vec3::splat(6.0), 4.0).unwrap();

    let center = IVec3::splat(6);
    let indices = mixel4::decode_indices_from_packed_u16(
        tool.backend().buffer().get_voxel(center, ChannelId::Indices) as u16,
    );
    let weights = mixel4::decode_weights_from_packed_u16(
        tool.backend().buffer().get_voxel(center, ChannelId::Weights) as u16,
    );
    let slot = indices.iter().position(|i| *i == 7).unwrap();
    assert_eq!(weights[slot], 255);

    // Shape is untouched.
    let buffer = tool.backend().buffer();
    original.local_box().for_each_cell(|p| {
        assert_eq!(buffer.get_voxel_f(p, ChannelId::Sdf), original.get_voxel_f(p, ChannelId::Sdf));
    });
    // Outside the sphere nothing is painted.
    assert_eq!(buffer.get_voxel(IVec3::ZERO, ChannelId::Weights), 0);
}
