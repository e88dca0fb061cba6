//! Box of blocks captured for one multi-block edit.

use glam::IVec3;
use parking_lot::{RwLockReadGuard, RwLockWriteGuard};
use tracing::trace_span;
use voxsculpt_core::constants::{BLOCK_SIZE, BLOCK_SIZE_PO2};
use voxsculpt_core::Box3i;
use voxsculpt_voxel::{decode_sdf, default_value, ChannelId, VoxelFormat, VoxelMetadata};

use crate::chunk::Chunk;
use crate::data::ChunkHandle;

/// Block handles covering a box at one LOD.
///
/// Blocks are stored, and locked, in canonical box order (z, x, y). Every
/// multi-block lock in the crate goes through a grid, so two edits can never
/// wait on each other in opposite orders.
pub struct VoxelDataGrid {
    block_box: Box3i,
    lod: u32,
    format: VoxelFormat,
    blocks: Vec<Option<ChunkHandle>>,
}

impl VoxelDataGrid {
    pub(crate) fn new(
        block_box: Box3i,
        lod: u32,
        format: VoxelFormat,
        blocks: Vec<Option<ChunkHandle>>,
    ) -> Self {
        debug_assert_eq!(blocks.len(), block_box.volume());
        Self {
            block_box,
            lod,
            format,
            blocks,
        }
    }

    /// Covered blocks, in block coordinates.
    pub const fn block_box(&self) -> Box3i {
        self.block_box
    }

    /// Covered voxels, in voxels of the grid LOD.
    pub fn voxel_box(&self) -> Box3i {
        Box3i::new(
            self.block_box.position * BLOCK_SIZE,
            self.block_box.size * BLOCK_SIZE,
        )
    }

    pub const fn lod(&self) -> u32 {
        self.lod
    }

    pub const fn format(&self) -> VoxelFormat {
        self.format
    }

    /// Returns true when no captured block is missing.
    pub fn is_fully_loaded(&self) -> bool {
        self.blocks.iter().all(Option::is_some)
    }

    /// Lock every block for writing until the guard is dropped.
    pub fn lock_write(&self) -> GridWriteGuard<'_> {
        let _span = trace_span!("grid_lock_write", blocks = self.blocks.len()).entered();
        GridWriteGuard {
            grid: self,
            chunks: self
                .blocks
                .iter()
                .map(|b| b.as_ref().map(|handle| handle.write()))
                .collect(),
        }
    }

    /// Lock every block for reading until the guard is dropped.
    pub fn lock_read(&self) -> GridReadGuard<'_> {
        GridReadGuard {
            grid: self,
            chunks: self
                .blocks
                .iter()
                .map(|b| b.as_ref().map(|handle| handle.read()))
                .collect(),
        }
    }

    /// Index of the block holding `pos` and the position inside it.
    fn locate(&self, pos: IVec3) -> Option<(usize, IVec3)> {
        let block = pos >> IVec3::splat(BLOCK_SIZE_PO2 as i32);
        if !self.block_box.contains_point(block) {
            return None;
        }
        let rel = block - self.block_box.position;
        let size = self.block_box.size;
        let index = rel.y + size.y * (rel.x + size.x * rel.z);
        Some((index as usize, pos & IVec3::splat(BLOCK_SIZE - 1)))
    }

    fn default_voxel(&self, channel: ChannelId) -> u64 {
        default_value(channel, self.format.depth(channel))
    }

    fn default_voxel_f(&self, channel: ChannelId) -> f32 {
        decode_sdf(self.default_voxel(channel), self.format.depth(channel))
    }
}

/// Exclusive access to every block of a grid.
///
/// Positions are in voxels of the grid LOD. Missing blocks read the channel
/// default and ignore writes.
pub struct GridWriteGuard<'a> {
    grid: &'a VoxelDataGrid,
    chunks: Vec<Option<RwLockWriteGuard<'a, Chunk>>>,
}

impl GridWriteGuard<'_> {
    fn chunk(&self, pos: IVec3) -> Option<(&Chunk, IVec3)> {
        let (index, local) = self.grid.locate(pos)?;
        self.chunks[index].as_deref().map(|c| (c, local))
    }

    fn chunk_mut(&mut self, pos: IVec3) -> Option<(&mut Chunk, IVec3)> {
        let (index, local) = self.grid.locate(pos)?;
        self.chunks[index].as_deref_mut().map(|c| (c, local))
    }

    pub fn voxel_box(&self) -> Box3i {
        self.grid.voxel_box()
    }

    pub const fn format(&self) -> VoxelFormat {
        self.grid.format
    }

    pub fn get_voxel(&self, pos: IVec3, channel: ChannelId) -> u64 {
        self.chunk(pos).map_or_else(
            || self.grid.default_voxel(channel),
            |(c, local)| c.voxels.get_voxel(local, channel),
        )
    }

    pub fn get_voxel_f(&self, pos: IVec3, channel: ChannelId) -> f32 {
        self.chunk(pos).map_or_else(
            || self.grid.default_voxel_f(channel),
            |(c, local)| c.voxels.get_voxel_f(local, channel),
        )
    }

    /// Returns `false` when the block is missing.
    pub fn set_voxel(&mut self, pos: IVec3, value: u64, channel: ChannelId) -> bool {
        self.chunk_mut(pos)
            .is_some_and(|(c, local)| c.voxels.set_voxel(local, value, channel))
    }

    /// Returns `false` when the block is missing.
    pub fn set_voxel_f(&mut self, pos: IVec3, value: f32, channel: ChannelId) -> bool {
        self.chunk_mut(pos)
            .is_some_and(|(c, local)| c.voxels.set_voxel_f(local, value, channel))
    }

    pub fn get_voxel_metadata(&self, pos: IVec3) -> Option<&VoxelMetadata> {
        let (c, local) = self.chunk(pos)?;
        c.voxels.get_voxel_metadata(local)
    }

    pub fn set_voxel_metadata(&mut self, pos: IVec3, meta: Option<VoxelMetadata>) -> bool {
        self.chunk_mut(pos)
            .is_some_and(|(c, local)| c.voxels.set_voxel_metadata(local, meta))
    }
}

/// Shared access to every block of a grid.
pub struct GridReadGuard<'a> {
    grid: &'a VoxelDataGrid,
    chunks: Vec<Option<RwLockReadGuard<'a, Chunk>>>,
}

impl GridReadGuard<'_> {
    fn chunk(&self, pos: IVec3) -> Option<(&Chunk, IVec3)> {
        let (index, local) = self.grid.locate(pos)?;
        self.chunks[index].as_deref().map(|c| (c, local))
    }

    pub fn voxel_box(&self) -> Box3i {
        self.grid.voxel_box()
    }

    pub const fn format(&self) -> VoxelFormat {
        self.grid.format
    }

    pub fn get_voxel(&self, pos: IVec3, channel: ChannelId) -> u64 {
        self.chunk(pos).map_or_else(
            || self.grid.default_voxel(channel),
            |(c, local)| c.voxels.get_voxel(local, channel),
        )
    }

    pub fn get_voxel_f(&self, pos: IVec3, channel: ChannelId) -> f32 {
        self.chunk(pos).map_or_else(
            || self.grid.default_voxel_f(channel),
            |(c, local)| c.voxels.get_voxel_f(local, channel),
        )
    }

    pub fn get_voxel_metadata(&self, pos: IVec3) -> Option<&VoxelMetadata> {
        let (c, local) = self.chunk(pos)?;
        c.voxels.get_voxel_metadata(local)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use voxsculpt_core::constants::SDF_FAR_OUTSIDE;
    use voxsculpt_core::BlockPos;
    use voxsculpt_voxel::VoxelBuffer;

    use super::*;
    use crate::data::{VoxelData, VoxelDataConfig};

    fn data_with_blocks(blocks: &[BlockPos]) -> VoxelData {
        let data = VoxelData::new(VoxelDataConfig::default());
        for pos in blocks {
            data.insert_block(*pos, 0, VoxelBuffer::new(IVec3::splat(BLOCK_SIZE)))
                .unwrap();
        }
        data
    }

    #[test]
    fn write_across_block_boundary() {
        let data = data_with_blocks(&[BlockPos::new(0, 0, 0), BlockPos::new(1, 0, 0)]);
        let area = Box3i::new(IVec3::new(14, 0, 0), IVec3::new(4, 1, 1));
        let grid = data.get_blocks_grid(area, 0);
        {
            let mut guard = grid.lock_write();
            area.for_each_cell(|pos| {
                assert!(guard.set_voxel_f(pos, -(pos.x as f32), ChannelId::Sdf));
            });
            assert_eq!(guard.get_voxel_f(IVec3::new(16, 0, 0), ChannelId::Sdf), -16.0);
        }

        assert_eq!(data.get_voxel_f(IVec3::new(15, 0, 0), ChannelId::Sdf), -15.0);
        assert_eq!(data.get_voxel_f(IVec3::new(17, 0, 0), ChannelId::Sdf), -17.0);
    }

    #[test]
    fn missing_blocks_read_defaults_and_ignore_writes() {
        let data = data_with_blocks(&[BlockPos::new(0, 0, 0)]);
        let grid = data.get_blocks_grid(Box3i::new(IVec3::ZERO, IVec3::new(32, 16, 16)), 0);
        let mut guard = grid.lock_write();

        assert!(!guard.set_voxel(IVec3::new(20, 0, 0), 5, ChannelId::Type));
        assert_eq!(guard.get_voxel(IVec3::new(20, 0, 0), ChannelId::Type), 0);
        assert_eq!(guard.get_voxel_f(IVec3::new(20, 0, 0), ChannelId::Sdf), SDF_FAR_OUTSIDE);
        // Outside the grid entirely.
        assert!(!guard.set_voxel(IVec3::new(-1, 0, 0), 5, ChannelId::Type));
    }

    #[test]
    fn write_lock_blocks_editability() {
        let data = data_with_blocks(&[BlockPos::new(0, 0, 0)]);
        let area = Box3i::new(IVec3::ZERO, IVec3::splat(4));
        let grid = data.get_blocks_grid(area, 0);

        let guard = grid.lock_write();
        assert!(!data.is_area_editable(area));
        drop(guard);
        assert!(data.is_area_editable(area));
    }

    #[test]
    fn metadata_through_guard() {
        let data = data_with_blocks(&[BlockPos::new(0, 0, 0)]);
        let grid = data.get_blocks_grid(Box3i::unit(IVec3::ONE), 0);
        {
            let mut guard = grid.lock_write();
            assert!(guard.set_voxel_metadata(IVec3::ONE, Some(VoxelMetadata::Int(3))));
        }
        assert_eq!(
            grid.lock_read().get_voxel_metadata(IVec3::ONE),
            Some(&VoxelMetadata::Int(3))
        );
    }

    #[test]
    fn concurrent_readers_see_complete_edits() {
        let data = Arc::new(data_with_blocks(&[
            BlockPos::new(0, 0, 0),
            BlockPos::new(1, 0, 0),
        ]));
        let area = Box3i::new(IVec3::ZERO, IVec3::new(32, 1, 1));

        thread::scope(|s| {
            let writer = {
                let data = Arc::clone(&data);
                s.spawn(move || {
                    for round in 1..=50 {
                        let grid = data.get_blocks_grid(area, 0);
                        let mut guard = grid.lock_write();
                        area.for_each_cell(|pos| {
                            guard.set_voxel(pos, round, ChannelId::Type);
                        });
                    }
                })
            };
            for _ in 0..4 {
                let data = Arc::clone(&data);
                s.spawn(move || {
                    for _ in 0..50 {
                        let grid = data.get_blocks_grid(area, 0);
                        let guard = grid.lock_read();
                        let first = guard.get_voxel(IVec3::ZERO, ChannelId::Type);
                        let last = guard.get_voxel(IVec3::new(31, 0, 0), ChannelId::Type);
                        assert_eq!(first, last, "Observed a partially applied edit");
                    }
                });
            }
            writer.join().unwrap();
        });

        assert_eq!(data.get_voxel(IVec3::new(31, 0, 0), ChannelId::Type), 50);
    }
}
