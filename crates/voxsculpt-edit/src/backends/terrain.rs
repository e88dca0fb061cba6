use std::sync::Arc;

use glam::{Affine3A, IVec3, Vec3};
use tracing::{trace_span, warn};
use voxsculpt_core::constants::SDF_FAR_INSIDE;
use voxsculpt_core::Box3i;
use voxsculpt_voxel::{ChannelId, ChannelMask, VoxelBuffer, VoxelFormat, VoxelMetadata};
use voxsculpt_world::VoxelData;

use crate::backend::{Capabilities, EditBackend};
use crate::config::EditConfig;
use crate::error::{EditError, Result};
use crate::mesh_sdf::MeshSdf;
use crate::ops::{
    copy_to_buffer, paste_from_buffer, BoxFill, DoShapeChunked, PasteFilter, PasteMask,
    RoundConeShape, SphereShape,
};

/// Edits a chunked terrain at LOD 0.
///
/// Multi-voxel edits lock every touched block once, in grid order, for the
/// whole edit. Several backends may share the same [`VoxelData`] across threads.
#[derive(Clone)]
pub struct TerrainBackend {
    data: Arc<VoxelData>,
}

impl TerrainBackend {
    pub const fn new(data: Arc<VoxelData>) -> Self {
        Self { data }
    }

    pub const fn data(&self) -> &Arc<VoxelData> {
        &self.data
    }

    fn paste_filtered(
        &self,
        min: IVec3,
        src: &VoxelBuffer,
        channels: ChannelMask,
        filter: PasteFilter<'_>,
    ) {
        let grid = self.data.get_blocks_grid(Box3i::new(min, src.size()), 0);
        let mut guard = grid.lock_write();
        paste_from_buffer(&mut guard, min, src, channels, filter);
    }
}

impl std::fmt::Debug for TerrainBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TerrainBackend")
            .field("bounds", &self.data.bounds())
            .field("blocks", &self.data.block_count(0))
            .finish()
    }
}

impl EditBackend for TerrainBackend {
    fn get_voxel(&self, pos: IVec3, channel: ChannelId) -> u64 {
        self.data.get_voxel(pos, channel)
    }

    fn get_voxel_f(&self, pos: IVec3, channel: ChannelId) -> f32 {
        self.data.get_voxel_f(pos, channel)
    }

    fn set_voxel(&mut self, pos: IVec3, value: u64, channel: ChannelId) {
        self.data.set_voxel(pos, value, channel);
    }

    fn set_voxel_f(&mut self, pos: IVec3, value: f32, channel: ChannelId) {
        self.data.set_voxel_f(pos, value, channel);
    }

    fn is_area_editable(&self, area: Box3i) -> bool {
        self.data.is_area_editable(area)
    }

    fn post_edit(&mut self, area: Box3i) {
        self.data.mark_area_modified(area, 0);
    }

    fn format(&self) -> VoxelFormat {
        self.data.format()
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::all()
    }

    fn get_voxel_metadata(&self, pos: IVec3) -> Option<VoxelMetadata> {
        self.data.get_voxel_metadata(pos)
    }

    fn set_voxel_metadata(&mut self, pos: IVec3, meta: Option<VoxelMetadata>) -> Result<()> {
        self.data.set_voxel_metadata(pos, meta);
        Ok(())
    }

    fn do_sphere(&mut self, config: &EditConfig, area: Box3i, center: Vec3, radius: f32) {
        let shape = SphereShape {
            center,
            radius,
            sdf_scale: config.sdf_scale(),
        };
        DoShapeChunked::from_config(shape, area, config).run_on_data(&self.data);
    }

    fn do_box(&mut self, config: &EditConfig, area: Box3i) {
        let shape = BoxFill {
            value: SDF_FAR_INSIDE,
        };
        DoShapeChunked::from_config(shape, area, config).run_on_data(&self.data);
    }

    fn do_path(&mut self, config: &EditConfig, positions: &[Vec3], radii: &[f32]) -> Result<Box3i> {
        if positions.len() != radii.len() {
            return Err(EditError::InvalidArgument(format!(
                "{} path positions for {} radii",
                positions.len(),
                radii.len()
            )));
        }
        if positions.len() < 2 {
            return Err(EditError::InvalidArgument(
                "path needs at least two points".to_owned(),
            ));
        }

        let segments: Vec<RoundConeShape> = positions
            .windows(2)
            .zip(radii.windows(2))
            .map(|(p, r)| RoundConeShape {
                a: p[0],
                b: p[1],
                radius_a: r[0],
                radius_b: r[1],
                sdf_scale: config.sdf_scale(),
            })
            .collect();

        let total = segments
            .iter()
            .map(|s| s.bounding_box().padded(1))
            .fold(Box3i::default(), |acc, b| acc.merged(&b))
            .clipped(&self.data.bounds());

        if !config.allow_out_of_bounds() && !self.data.is_area_editable(total) {
            warn!(area = ?total, "Area not editable");
            return Err(EditError::NotEditable(total));
        }

        let _span = trace_span!("do_path", segments = segments.len()).entered();
        let grid = self.data.get_blocks_grid(total, 0);
        let mut guard = grid.lock_write();
        for segment in segments {
            let area = segment.bounding_box().padded(1).clipped(&total);
            DoShapeChunked::from_config(segment, area, config).run(&mut guard);
        }
        Ok(total)
    }

    fn do_mesh(
        &mut self,
        config: &EditConfig,
        mesh: &MeshSdf,
        transform: &Affine3A,
        isolevel: f32,
    ) -> Result<Box3i> {
        let shape = mesh.shape(transform, isolevel, config.sdf_scale())?;
        let area = mesh.world_box(transform).clipped(&self.data.bounds());

        if !config.allow_out_of_bounds() && !self.data.is_area_editable(area) {
            warn!(?area, "Area not editable");
            return Err(EditError::NotEditable(area));
        }

        DoShapeChunked::from_config(shape, area, config).run_on_data(&self.data);
        Ok(area)
    }

    fn copy(&self, min: IVec3, dst: &mut VoxelBuffer, channels: ChannelMask) -> Result<()> {
        let grid = self.data.get_blocks_grid(Box3i::new(min, dst.size()), 0);
        let guard = grid.lock_read();
        copy_to_buffer(&guard, min, dst, channels);
        Ok(())
    }

    fn paste(&mut self, min: IVec3, src: &VoxelBuffer, channels: ChannelMask) -> Result<()> {
        self.paste_filtered(min, src, channels, PasteFilter::default());
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
