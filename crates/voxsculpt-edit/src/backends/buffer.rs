use glam::{IVec3, Vec3};
use voxsculpt_core::Box3i;
use voxsculpt_voxel::{ChannelId, ChannelMask, VoxelBuffer, VoxelFormat, VoxelMetadata};

use crate::backend::{Capabilities, EditBackend};
use crate::config::EditConfig;
use crate::error::Result;
use crate::ops::{paste_from_buffer, DoShapeChunked, PasteFilter, PasteMask, SphereShape};

/// Edits one in-memory buffer. Every voxel inside it is editable.
///
/// Edited areas accumulate until taken with [`take_modified`](Self::take_modified).
#[derive(Clone, Debug, Default)]
pub struct BufferBackend {
    buffer: VoxelBuffer,
    modified: Option<Box3i>,
}

impl BufferBackend {
    pub fn new(buffer: VoxelBuffer) -> Self {
        Self {
            buffer,
            modified: None,
        }
    }

    pub const fn buffer(&self) -> &VoxelBuffer {
        &self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut VoxelBuffer {
        &mut self.buffer
    }

    pub fn into_buffer(self) -> VoxelBuffer {
        self.buffer
    }

    /// Union of the areas edited since the last call.
    pub fn take_modified(&mut self) -> Option<Box3i> {
        self.modified.take()
    }

    fn paste_filtered(
        &mut self,
        min: IVec3,
        src: &VoxelBuffer,
        channels: ChannelMask,
        filter: PasteFilter<'_>,
    ) {
        paste_from_buffer(&mut self.buffer, min, src, channels, filter);
    }
}

impl EditBackend for BufferBackend {
    fn get_voxel(&self, pos: IVec3, channel: ChannelId) -> u64 {
        self.buffer.get_voxel(pos, channel)
    }

    fn get_voxel_f(&self, pos: IVec3, channel: ChannelId) -> f32 {
        self.buffer.get_voxel_f(pos, channel)
    }

    fn set_voxel(&mut self, pos: IVec3, value: u64, channel: ChannelId) {
        self.buffer.set_voxel(pos, value, channel);
    }

    fn set_voxel_f(&mut self, pos: IVec3, value: f32, channel: ChannelId) {
        self.buffer.set_voxel_f(pos, value, channel);
    }

    fn is_area_editable(&self, area: Box3i) -> bool {
        self.buffer.local_box().contains(&area)
    }

    fn post_edit(&mut self, area: Box3i) {
        self.modified = Some(match self.modified {
            Some(prev) => prev.merged(&area),
            None => area,
        });
    }

    fn format(&self) -> VoxelFormat {
        self.buffer.format()
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::COPY | Capabilities::PASTE | Capabilities::PASTE_MASKED | Capabilities::METADATA
    }

    fn get_voxel_metadata(&self, pos: IVec3) -> Option<VoxelMetadata> {
        self.buffer.get_voxel_metadata(pos).cloned()
    }

    fn set_voxel_metadata(&mut self, pos: IVec3, meta: Option<VoxelMetadata>) -> Result<()> {
        self.buffer.set_voxel_metadata(pos, meta);
        Ok(())
    }

    fn do_sphere(&mut self, config: &EditConfig, area: Box3i, center: Vec3, radius: f32) {
        let shape = SphereShape {
            center,
            radius,
            sdf_scale: config.sdf_scale(),
        };
        DoShapeChunked::from_config(shape, area, config).run(&mut self.buffer);
    }

    fn copy(&self, min: IVec3, dst: &mut VoxelBuffer, channels: ChannelMask) -> Result<()> {
        dst.clear_voxel_metadata_in_area(dst.local_box());
        dst.copy_channels_from(&self.buffer, Box3i::new(min, dst.size()), IVec3::ZERO, channels);
        Ok(())
    }

    fn paste(&mut self, min: IVec3, src: &VoxelBuffer, channels: ChannelMask) -> Result<()> {
        self.buffer
            .copy_channels_from(src, src.local_box(), min, channels);
        Ok(())
    }

    fn paste_masked(
        &mut self,
        min: IVec3,
        src: &VoxelBuffer,
        channels: ChannelMask,
        mask: PasteMask,
    ) -> Result<()> {
        let filter = PasteFilter {
            src_mask: Some(mask),
            dst_writable: None,
        };
        self.paste_filtered(min, src, channels, filter);
        Ok(())
    }

    fn paste_masked_writable_list(
        &mut self,
        min: IVec3,
        src: &VoxelBuffer,
        channels: ChannelMask,
        mask: PasteMask,
        dst_channel: ChannelId,
        writable: &[u64],
    ) -> Result<()> {
        let filter = PasteFilter {
            src_mask: Some(mask),
            dst_writable: Some((dst_channel, writable)),
        };
        self.paste_filtered(min, src, channels, filter);
        Ok(())
    }
}
