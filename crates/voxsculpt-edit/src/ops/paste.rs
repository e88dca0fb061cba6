//! Box copies between a buffer and any voxel accessor.

use glam::IVec3;
use voxsculpt_voxel::{ChannelId, ChannelMask, VoxelBuffer};

use super::access::{BlockAccess, BlockAccessMut};

/// Source voxels holding `value` in `channel` are not pasted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PasteMask {
    pub channel: ChannelId,
    pub value: u64,
}

impl PasteMask {
    pub const fn new(channel: ChannelId, value: u64) -> Self {
        Self { channel, value }
    }
}

/// Restricts which voxels a paste writes.
#[derive(Clone, Copy, Debug, Default)]
pub struct PasteFilter<'a> {
    pub src_mask: Option<PasteMask>,
    /// Only destination voxels whose value in the channel is listed get written.
    pub dst_writable: Option<(ChannelId, &'a [u64])>,
}

#[inline]
fn copy_voxel<S, D>(src: &S, src_pos: IVec3, dst: &mut D, dst_pos: IVec3, channel: ChannelId)
where
    S: BlockAccess + ?Sized,
    D: BlockAccessMut + ?Sized,
{
    if channel == ChannelId::Sdf && src.channel_depth(channel) != dst.channel_depth(channel) {
        dst.set_voxel_f(dst_pos, src.get_voxel_f(src_pos, channel), channel);
    } else {
        dst.set_voxel(dst_pos, src.get_voxel(src_pos, channel), channel);
    }
}

/// Copy the channels in `mask` from the box starting at `min` into `dst`.
///
/// The box has the size of `dst`. Metadata follows.
pub fn copy_to_buffer<A: BlockAccess + ?Sized>(
    access: &A,
    min: IVec3,
    dst: &mut VoxelBuffer,
    mask: ChannelMask,
) {
    dst.local_box().for_each_cell(|local| {
        let pos = min + local;
        for channel in mask.channels() {
            copy_voxel(access, pos, &mut *dst, local, channel);
        }
        dst.set_voxel_metadata(local, access.get_voxel_metadata(pos).cloned());
    });
}

/// Write the channels in `mask` of `src` into the box starting at `min`.
pub fn paste_from_buffer<A: BlockAccessMut + ?Sized>(
    access: &mut A,
    min: IVec3,
    src: &VoxelBuffer,
    mask: ChannelMask,
    filter: PasteFilter<'_>,
) {
    let with_metadata = src.metadata().next().is_some();

    src.local_box().for_each_cell(|local| {
        if let Some(m) = filter.src_mask {
            if src.get_voxel(local, m.channel) == m.value {
                return;
            }
        }
        let pos = min + local;
        if let Some((channel, writable)) = filter.dst_writable {
            if !writable.contains(&access.get_voxel(pos, channel)) {
                return;
            }
        }
        for channel in mask.channels() {
            copy_voxel(src, local, &mut *access, pos, channel);
        }
        if with_metadata {
            access.set_voxel_metadata(pos, src.get_voxel_metadata(local).cloned());
        }
    });
}
