//! Applies a shape to every cell of a box through one voxel accessor.

use tracing::trace_span;
use voxsculpt_core::Box3i;
use voxsculpt_voxel::ChannelId;
use voxsculpt_world::VoxelData;

use super::access::BlockAccessMut;
use super::blend::{paint_texture, sdf_blend_with_strength};
use super::shapes::Shape;
use crate::config::{EditConfig, Mode, TextureParams};

/// Shape edit ready to run.
///
/// The caller holds whatever lock the accessor needs for the whole run, so
/// readers see the box either before or after the edit.
#[derive(Clone, Debug)]
pub struct DoShapeChunked<S> {
    pub shape: S,
    pub area: Box3i,
    pub mode: Mode,
    pub channel: ChannelId,
    /// Written by discrete channel edits where the shape is inside.
    pub value: u64,
    pub strength: f32,
    pub texture: TextureParams,
}

impl<S: Shape> DoShapeChunked<S> {
    /// Take every edit parameter from the tool configuration.
    pub fn from_config(shape: S, area: Box3i, config: &EditConfig) -> Self {
        Self {
            shape,
            area,
            mode: config.mode(),
            channel: config.channel(),
            value: config.paint_value(),
            strength: config.sdf_strength(),
            texture: *config.texture_params(),
        }
    }

    /// Visit the box in canonical order and write the shape.
    pub fn run<A: BlockAccessMut + ?Sized>(&self, access: &mut A) {
        let _span = trace_span!("do_shape_chunked", cells = self.area.volume()).entered();

        if self.mode == Mode::TexturePaint {
            self.area.for_each_cell(|pos| {
                let depth = self.shape.paint_depth(pos.as_vec3());
                paint_texture(&mut *access, pos, &self.texture, depth);
            });
        } else if self.channel == ChannelId::Sdf {
            self.area.for_each_cell(|pos| {
                let old = access.get_voxel_f(pos, ChannelId::Sdf);
                let new = self.shape.sdf(pos.as_vec3());
                let blended = sdf_blend_with_strength(new, old, self.mode, self.strength);
                access.set_voxel_f(pos, blended, ChannelId::Sdf);
            });
        } else {
            self.area.for_each_cell(|pos| {
                if self.shape.is_inside(pos.as_vec3()) {
                    access.set_voxel(pos, self.value, self.channel);
                }
            });
        }
    }

    /// Run on LOD 0 blocks of `data`, holding one write lock over all of them.
    pub fn run_on_data(&self, data: &VoxelData) {
        let grid = data.get_blocks_grid(self.area, 0);
        let mut guard = grid.lock_write();
        self.run(&mut guard);
    }
}
