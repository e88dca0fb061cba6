//! Voxel access shared by buffers and locked grids.

use glam::IVec3;
use voxsculpt_voxel::{ChannelId, Depth, VoxelBuffer, VoxelMetadata};
use voxsculpt_world::{GridReadGuard, GridWriteGuard};

/// Read access to voxels by position.
pub trait BlockAccess {
    fn get_voxel(&self, pos: IVec3, channel: ChannelId) -> u64;
    fn get_voxel_f(&self, pos: IVec3, channel: ChannelId) -> f32;
    fn channel_depth(&self, channel: ChannelId) -> Depth;

    fn get_voxel_metadata(&self, _pos: IVec3) -> Option<&VoxelMetadata> {
        None
    }
}

/// Write access to voxels by position. Writes outside the accessible area are dropped.
pub trait BlockAccessMut: BlockAccess {
    fn set_voxel(&mut self, pos: IVec3, value: u64, channel: ChannelId);
    fn set_voxel_f(&mut self, pos: IVec3, value: f32, channel: ChannelId);

    fn set_voxel_metadata(&mut self, _pos: IVec3, _meta: Option<VoxelMetadata>) {}
}

impl BlockAccess for VoxelBuffer {
    #[inline]
    fn get_voxel(&self, pos: IVec3, channel: ChannelId) -> u64 {
        Self::get_voxel(self, pos, channel)
    }

    #[inline]
    fn get_voxel_f(&self, pos: IVec3, channel: ChannelId) -> f32 {
        Self::get_voxel_f(self, pos, channel)
    }

    fn channel_depth(&self, channel: ChannelId) -> Depth {
        Self::channel_depth(self, channel)
    }

    fn get_voxel_metadata(&self, pos: IVec3) -> Option<&VoxelMetadata> {
        Self::get_voxel_metadata(self, pos)
    }
}

impl BlockAccessMut for VoxelBuffer {
    #[inline]
    fn set_voxel(&mut self, pos: IVec3, value: u64, channel: ChannelId) {
        Self::set_voxel(self, pos, value, channel);
    }

    #[inline]
    fn set_voxel_f(&mut self, pos: IVec3, value: f32, channel: ChannelId) {
        Self::set_voxel_f(self, pos, value, channel);
    }

    fn set_voxel_metadata(&mut self, pos: IVec3, meta: Option<VoxelMetadata>) {
        Self::set_voxel_metadata(self, pos, meta);
    }
}

impl BlockAccess for GridWriteGuard<'_> {
    #[inline]
    fn get_voxel(&self, pos: IVec3, channel: ChannelId) -> u64 {
        Self::get_voxel(self, pos, channel)
    }

    #[inline]
    fn get_voxel_f(&self, pos: IVec3, channel: ChannelId) -> f32 {
        Self::get_voxel_f(self, pos, channel)
    }

    fn channel_depth(&self, channel: ChannelId) -> Depth {
        self.format().depth(channel)
    }

    fn get_voxel_metadata(&self, pos: IVec3) -> Option<&VoxelMetadata> {
        Self::get_voxel_metadata(self, pos)
    }
}

impl BlockAccessMut for GridWriteGuard<'_> {
    #[inline]
    fn set_voxel(&mut self, pos: IVec3, value: u64, channel: ChannelId) {
        Self::set_voxel(self, pos, value, channel);
    }

    #[inline]
    fn set_voxel_f(&mut self, pos: IVec3, value: f32, channel: ChannelId) {
        Self::set_voxel_f(self, pos, value, channel);
    }

    fn set_voxel_metadata(&mut self, pos: IVec3, meta: Option<VoxelMetadata>) {
        Self::set_voxel_metadata(self, pos, meta);
    }
}

impl BlockAccess for GridReadGuard<'_> {
    #[inline]
    fn get_voxel(&self, pos: IVec3, channel: ChannelId) -> u64 {
        Self::get_voxel(self, pos, channel)
    }

    #[inline]
    fn get_voxel_f(&self, pos: IVec3, channel: ChannelId) -> f32 {
        Self::get_voxel_f(self, pos, channel)
    }

    fn channel_depth(&self, channel: ChannelId) -> Depth {
        self.format().depth(channel)
    }

    fn get_voxel_metadata(&self, pos: IVec3) -> Option<&VoxelMetadata> {
        Self::get_voxel_metadata(self, pos)
    }
}
