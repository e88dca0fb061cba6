//! Shape edits expressed through the backend's single-voxel methods.
//!
//! Backends without a faster path fall back to these.

use glam::{IVec3, Vec3};
use voxsculpt_core::constants::SDF_FAR_INSIDE;
use voxsculpt_core::Box3i;
use voxsculpt_voxel::{ChannelId, Depth, VoxelFormat};

use crate::backend::EditBackend;
use crate::config::EditConfig;
use crate::ops::{BlockAccess, BlockAccessMut, BoxFill, DoShapeChunked, SphereShape};

/// Voxel accessor over any backend.
pub struct BackendAccess<'a, B: EditBackend + ?Sized> {
    backend: &'a mut B,
    format: VoxelFormat,
}

impl<'a, B: EditBackend + ?Sized> BackendAccess<'a, B> {
    pub fn new(backend: &'a mut B) -> Self {
        let format = backend.format();
        Self { backend, format }
    }
}

impl<B: EditBackend + ?Sized> BlockAccess for BackendAccess<'_, B> {
    fn get_voxel(&self, pos: IVec3, channel: ChannelId) -> u64 {
        self.backend.get_voxel(pos, channel)
    }

    fn get_voxel_f(&self, pos: IVec3, channel: ChannelId) -> f32 {
        self.backend.get_voxel_f(pos, channel)
    }

    fn channel_depth(&self, channel: ChannelId) -> Depth {
        self.format.depth(channel)
    }
}

impl<B: EditBackend + ?Sized> BlockAccessMut for BackendAccess<'_, B> {
    fn set_voxel(&mut self, pos: IVec3, value: u64, channel: ChannelId) {
        self.backend.set_voxel(pos, value, channel);
    }

    fn set_voxel_f(&mut self, pos: IVec3, value: f32, channel: ChannelId) {
        self.backend.set_voxel_f(pos, value, channel);
    }
}

pub fn do_sphere<B: EditBackend + ?Sized>(
    backend: &mut B,
    config: &EditConfig,
    area: Box3i,
    center: Vec3,
    radius: f32,
) {
    let shape = SphereShape {
        center,
        radius,
        sdf_scale: config.sdf_scale(),
    };
    DoShapeChunked::from_config(shape, area, config).run(&mut BackendAccess::new(backend));
}

/// Fills `area` with a far-inside distance, or the paint value on other channels.
pub fn do_box<B: EditBackend + ?Sized>(backend: &mut B, config: &EditConfig, area: Box3i) {
    let shape = BoxFill {
        value: SDF_FAR_INSIDE,
    };
    DoShapeChunked::from_config(shape, area, config).run(&mut BackendAccess::new(backend));
}
