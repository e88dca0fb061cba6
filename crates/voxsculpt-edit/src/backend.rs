//! Storage seam of the voxel tool.

use bitflags::bitflags;
use glam::{Affine3A, IVec3, Vec3};
use tracing::error;
use voxsculpt_core::Box3i;
use voxsculpt_voxel::{ChannelId, ChannelMask, VoxelBuffer, VoxelFormat, VoxelMetadata};

use crate::config::EditConfig;
use crate::error::{EditError, Result};
use crate::mesh_sdf::MeshSdf;
use crate::ops::PasteMask;
use crate::reference;

bitflags! {
    /// Optional operations a backend implements.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Capabilities: u8 {
        const PATH = 1 << 0;
        const MESH = 1 << 1;
        const COPY = 1 << 2;
        const PASTE = 1 << 3;
        const PASTE_MASKED = 1 << 4;
        const METADATA = 1 << 5;
    }
}

pub(crate) fn unsupported<T>(op: &'static str) -> Result<T> {
    error!(op, "Operation not supported by this backend");
    Err(EditError::Unsupported(op))
}

/// Voxel storage edited by a [`VoxelTool`](crate::VoxelTool).
///
/// The tool checks editability and calls [`post_edit`](Self::post_edit)
/// around single-voxel writes and shape edits. `do_path` and `do_mesh` check
/// editability themselves and return the modified area, which the tool then
/// reports through `post_edit`.
pub trait EditBackend {
    fn get_voxel(&self, pos: IVec3, channel: ChannelId) -> u64;
    fn get_voxel_f(&self, pos: IVec3, channel: ChannelId) -> f32;
    fn set_voxel(&mut self, pos: IVec3, value: u64, channel: ChannelId);
    fn set_voxel_f(&mut self, pos: IVec3, value: f32, channel: ChannelId);

    /// Whether every voxel of `area` can be read and written right now.
    fn is_area_editable(&self, area: Box3i) -> bool;

    /// Called once after each edit with the box that may have changed.
    fn post_edit(&mut self, area: Box3i);

    /// Format of the edited voxels, used for scratch buffers.
    fn format(&self) -> VoxelFormat;

    fn capabilities(&self) -> Capabilities {
        Capabilities::empty()
    }

    fn get_voxel_metadata(&self, _pos: IVec3) -> Option<VoxelMetadata> {
        error!("Voxel metadata not supported by this backend");
        None
    }

    fn set_voxel_metadata(&mut self, _pos: IVec3, _meta: Option<VoxelMetadata>) -> Result<()> {
        unsupported("set_voxel_metadata")
    }

    /// Sphere edit over `area`, already checked editable.
    fn do_sphere(&mut self, config: &EditConfig, area: Box3i, center: Vec3, radius: f32) {
        reference::do_sphere(self, config, area, center, radius);
    }

    /// Box edit over `area`, already checked editable.
    fn do_box(&mut self, config: &EditConfig, area: Box3i) {
        reference::do_box(self, config, area);
    }

    /// Chain of capsules through `positions` with matching `radii`.
    fn do_path(&mut self, _config: &EditConfig, _positions: &[Vec3], _radii: &[f32]) -> Result<Box3i> {
        unsupported("do_path")
    }

    /// Stamp a baked mesh SDF placed by `transform`.
    fn do_mesh(
        &mut self,
        _config: &EditConfig,
        _mesh: &MeshSdf,
        _transform: &Affine3A,
        _isolevel: f32,
    ) -> Result<Box3i> {
        unsupported("do_mesh")
    }

    /// Copy the box starting at `min` with the size of `dst` into `dst`.
    fn copy(&self, _min: IVec3, _dst: &mut VoxelBuffer, _channels: ChannelMask) -> Result<()> {
        unsupported("copy")
    }

    fn paste(&mut self, _min: IVec3, _src: &VoxelBuffer, _channels: ChannelMask) -> Result<()> {
        unsupported("paste")
    }

    fn paste_masked(
        &mut self,
        _min: IVec3,
        _src: &VoxelBuffer,
        _channels: ChannelMask,
        _mask: PasteMask,
    ) -> Result<()> {
        unsupported("paste_masked")
    }

    /// Like `paste_masked`, but only over destination voxels whose value in
    /// `dst_channel` is listed in `writable`.
    fn paste_masked_writable_list(
        &mut self,
        _min: IVec3,
        _src: &VoxelBuffer,
        _channels: ChannelMask,
        _mask: PasteMask,
        _dst_channel: ChannelId,
        _writable: &[u64],
    ) -> Result<()> {
        unsupported("paste_masked_writable_list")
    }
}
