use std::sync::Arc;

use glam::IVec3;
use voxsculpt_core::Box3i;
use voxsculpt_voxel::{ChannelId, ChannelMask, VoxelBuffer, VoxelMetadata};
use voxsculpt_world::{VoxelData, VoxelDataConfig};
use voxsculpt_edit::{BufferBackend, EditBackend, TerrainBackend, VoxelTool};

fn channels() -> ChannelMask {
    ChannelId::Type.mask() | ChannelId::Sdf.mask()
}

/// A sphere of matter, a few typed voxels and some metadata, all around `center`.
fn sculpt<B: EditBackend>(tool: &mut VoxelTool<B>, center: IVec3) {
    tool.config_mut().set_channel(ChannelId::Sdf);
    tool.do_sphere(center.as_vec3(), 5.0).unwrap();

    tool.config_mut().set_channel(ChannelId::Type);
    tool.config_mut().set_value(3);
    tool.do_box(center - IVec3::splat(2), center + IVec3::ONE).unwrap();

    tool.set_voxel_metadata(center, Some(VoxelMetadata::Int(42)))
        .unwrap();
    tool.set_voxel_metadata(center + IVec3::new(4, -1, 2), Some(VoxelMetadata::from(true)))
        .unwrap();
}

fn snapshot<B: EditBackend>(tool: &VoxelTool<B>, area: Box3i) -> VoxelBuffer {
    let mut buffer = VoxelBuffer::new(area.size);
    tool.copy(area.position, &mut buffer, channels()).unwrap();
    buffer
}

fn assert_same(before: &VoxelBuffer, after: &VoxelBuffer) {
    before.local_box().for_each_cell(|p| {
        for channel in [ChannelId::Type, ChannelId::Sdf] {
            assert_eq!(
                after.get_voxel(p, channel),
                before.get_voxel(p, channel),
                "{channel:?} at {p}"
            );
        }
        assert_eq!(after.get_voxel_metadata(p), before.get_voxel_metadata(p), "metadata at {p}");
    });
}

fn round_trip<B: EditBackend>(tool: &mut VoxelTool<B>, region: Box3i, watched: Box3i) {
    let before = snapshot(tool, watched);
    assert!(before.metadata().count() >= 2);

    let copied = snapshot(tool, region);
    tool.paste(region.position, &copied, channels()).unwrap();

    assert_same(&before, &snapshot(tool, watched));
}

#[test]
fn buffer_copy_then_paste_in_place_changes_nothing() {
    let mut tool = VoxelTool::new(BufferBackend::new(VoxelBuffer::new(IVec3::splat(24))));
    sculpt(&mut tool, IVec3::splat(12));

    let region = Box3i::new(IVec3::splat(5), IVec3::new(14, 12, 15));
    round_trip(&mut tool, region, Box3i::new(IVec3::ZERO, IVec3::splat(24)));
}

#[test]
fn terrain_copy_then_paste_in_place_changes_nothing() {
    let data = VoxelData::new(VoxelDataConfig::default());
    data.pre_generate_box(Box3i::new(IVec3::ZERO, IVec3::splat(32)));
    let mut tool = VoxelTool::new(TerrainBackend::new(Arc::new(data)));
    sculpt(&mut tool, IVec3::splat(16));

    // Straddles the block corner at 16.
    let region = Box3i::new(IVec3::splat(9), IVec3::new(14, 12, 15));
    round_trip(&mut tool, region, Box3i::new(IVec3::ZERO, IVec3::splat(32)));
}

#[test]
fn sdf_only_paste_keeps_destination_metadata() {
    let mut tool = VoxelTool::new(BufferBackend::new(VoxelBuffer::new(IVec3::splat(8))));
    tool.set_voxel_metadata(IVec3::splat(3), Some(VoxelMetadata::Int(5)))
        .unwrap();

    let mut stamp = VoxelBuffer::new(IVec3::splat(4));
    stamp.fill_f(-1.0, ChannelId::Sdf);
    tool.paste(IVec3::splat(2), &stamp, ChannelId::Sdf.mask())
        .unwrap();

    tool.config_mut().set_channel(ChannelId::Sdf);
    assert_eq!(tool.get_voxel_f(IVec3::splat(3)), -1.0);
    assert_eq!(tool.get_voxel_metadata(IVec3::splat(3)), Some(VoxelMetadata::Int(5)));
}
