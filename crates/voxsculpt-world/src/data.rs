//! Sparse chunked voxel volume with per-block locking.

use std::sync::Arc;

use crossbeam::channel::{unbounded, Receiver, Sender};
use glam::IVec3;
use hashbrown::HashMap;
use parking_lot::{Mutex, RwLock};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace_span};
use voxsculpt_core::constants::{BLOCK_SIZE, BLOCK_SIZE_PO2, MAX_LOD};
use voxsculpt_core::coords::split_voxel;
use voxsculpt_core::{BlockPos, Box3i, Error, Result};
use voxsculpt_voxel::{default_value, ChannelId, VoxelBuffer, VoxelFormat, VoxelMetadata};

use crate::chunk::{Chunk, ChunkState};
use crate::generation::VoxelGenerator;
use crate::grid::VoxelDataGrid;

/// Shared handle to a block. Each block has its own lock.
pub type ChunkHandle = Arc<RwLock<Chunk>>;

/// Static parameters of a volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoxelDataConfig {
    /// Editable universe, in LOD 0 voxels.
    pub bounds: Box3i,
    /// Number of levels of detail.
    pub lod_count: u32,
    /// Channel depths of every block.
    pub format: VoxelFormat,
}

impl Default for VoxelDataConfig {
    fn default() -> Self {
        Self {
            bounds: Box3i::from_center_extents(IVec3::ZERO, IVec3::splat(1 << 24)),
            lod_count: 1,
            format: VoxelFormat::default(),
        }
    }
}

/// Sent once per logical edit, after locks are released.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditNotification {
    /// Edited area in voxels of `lod`.
    pub area: Box3i,
    pub lod: u32,
}

/// Sparse map of blocks for every level of detail.
pub struct VoxelData {
    config: VoxelDataConfig,
    lods: Vec<RwLock<HashMap<BlockPos, ChunkHandle>>>,
    generator: Option<Arc<dyn VoxelGenerator>>,
    subscribers: Mutex<Vec<Sender<EditNotification>>>,
}

impl VoxelData {
    /// Create an empty volume.
    pub fn new(config: VoxelDataConfig) -> Self {
        let lod_count = config.lod_count.clamp(1, MAX_LOD as u32);
        Self {
            config: VoxelDataConfig { lod_count, ..config },
            lods: (0..lod_count).map(|_| RwLock::new(HashMap::new())).collect(),
            generator: None,
            subscribers: Mutex::new(Vec::new()),
        }
    }

    /// Use a generator to fill missing blocks.
    #[must_use]
    pub fn with_generator(mut self, generator: Arc<dyn VoxelGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    pub const fn config(&self) -> &VoxelDataConfig {
        &self.config
    }

    /// Editable universe, in LOD 0 voxels.
    pub const fn bounds(&self) -> Box3i {
        self.config.bounds
    }

    pub const fn lod_count(&self) -> u32 {
        self.config.lod_count
    }

    pub const fn format(&self) -> VoxelFormat {
        self.config.format
    }

    fn lod_map(&self, lod: u32) -> Option<&RwLock<HashMap<BlockPos, ChunkHandle>>> {
        self.lods.get(lod as usize)
    }

    /// Bounds expressed in voxels of `lod`.
    pub fn bounds_at_lod(&self, lod: u32) -> Box3i {
        let bounds = self.config.bounds;
        let min = bounds.min_pos() >> IVec3::splat(lod as i32);
        let max = bounds.max_pos() >> IVec3::splat(lod as i32);
        Box3i::from_min_max(min, max)
    }

    /// Number of blocks stored at a LOD.
    pub fn block_count(&self, lod: u32) -> usize {
        self.lod_map(lod).map_or(0, |map| map.read().len())
    }

    /// Check if a block exists at the given position.
    pub fn has_block(&self, pos: BlockPos, lod: u32) -> bool {
        self.lod_map(lod)
            .is_some_and(|map| map.read().contains_key(&pos))
    }

    /// Get a handle to a block.
    pub fn get_block(&self, pos: BlockPos, lod: u32) -> Option<ChunkHandle> {
        self.lod_map(lod)?.read().get(&pos).cloned()
    }

    /// Get all stored block positions of a LOD.
    pub fn block_positions(&self, lod: u32) -> Vec<BlockPos> {
        self.lod_map(lod)
            .map_or_else(Vec::new, |map| map.read().keys().copied().collect())
    }

    /// Insert or replace a ready block.
    ///
    /// The buffer must be `BLOCK_SIZE`³ voxels.
    pub fn insert_block(&self, pos: BlockPos, lod: u32, voxels: VoxelBuffer) -> Result<()> {
        if voxels.size() != IVec3::splat(BLOCK_SIZE) {
            return Err(Error::InvalidArgument(format!(
                "block buffer must be {BLOCK_SIZE}³ voxels, got {}",
                voxels.size()
            )));
        }
        let map = self
            .lod_map(lod)
            .ok_or_else(|| Error::OutOfBounds(format!("LOD {lod} >= {}", self.lod_count())))?;
        let chunk = Chunk::with_voxels(pos, lod, voxels);
        map.write().insert(pos, Arc::new(RwLock::new(chunk)));
        Ok(())
    }

    /// Remove a block.
    pub fn remove_block(&self, pos: BlockPos, lod: u32) -> Option<ChunkHandle> {
        self.lod_map(lod)?.write().remove(&pos)
    }

    /// Execute a function with read access to a block.
    ///
    /// Returns `None` if the block doesn't exist.
    pub fn with_chunk<F, R>(&self, pos: BlockPos, lod: u32, f: F) -> Option<R>
    where
        F: FnOnce(&Chunk) -> R,
    {
        let handle = self.get_block(pos, lod)?;
        let chunk = handle.read();
        Some(f(&chunk))
    }

    /// Execute a function with write access to a block.
    ///
    /// Returns `None` if the block doesn't exist.
    pub fn with_chunk_mut<F, R>(&self, pos: BlockPos, lod: u32, f: F) -> Option<R>
    where
        F: FnOnce(&mut Chunk) -> R,
    {
        let handle = self.get_block(pos, lod)?;
        let mut chunk = handle.write();
        Some(f(&mut chunk))
    }

    /// Get blocks modified since they were last marked clean.
    pub fn dirty_blocks(&self, lod: u32) -> Vec<BlockPos> {
        let Some(map) = self.lod_map(lod) else {
            return Vec::new();
        };
        map.read()
            .iter()
            .filter(|(_, chunk)| chunk.read().dirty)
            .map(|(pos, _)| *pos)
            .collect()
    }

    /// Get total memory usage of all blocks.
    pub fn memory_usage(&self) -> usize {
        self.lods
            .iter()
            .map(|map| map.read().values().map(|c| c.read().memory_usage()).sum::<usize>())
            .sum()
    }

    /// Returns true when every LOD 0 block touched by `area` exists and is ready.
    ///
    /// Parts of `area` outside the bounds are ignored.
    pub fn is_area_loaded(&self, area: Box3i) -> bool {
        self.check_area(area, false)
    }

    /// Returns true when `area` can be edited right now.
    ///
    /// The area must intersect the bounds and every block it touches must be
    /// loaded, ready and not locked for writing by another edit.
    pub fn is_area_editable(&self, area: Box3i) -> bool {
        self.check_area(area, true)
    }

    fn check_area(&self, area: Box3i, check_locks: bool) -> bool {
        let area = area.clipped(&self.config.bounds);
        if area.is_empty() {
            return false;
        }
        let map = self.lods[0].read();
        area.downscaled(BLOCK_SIZE_PO2).cells().all(|bpos| {
            let Some(handle) = map.get(&BlockPos::from(bpos)) else {
                return false;
            };
            if check_locks {
                handle.try_read().is_some_and(|chunk| chunk.is_ready())
            } else {
                handle.read().is_ready()
            }
        })
    }

    /// Create every missing LOD 0 block intersecting `area`.
    ///
    /// Blocks are filled by the generator in parallel, or left at default
    /// values when no generator is set. Returns how many blocks were created.
    pub fn pre_generate_box(&self, area: Box3i) -> usize {
        let _span = trace_span!("pre_generate_box").entered();

        let area = area.clipped(&self.config.bounds);
        if area.is_empty() {
            return 0;
        }
        let missing: Vec<BlockPos> = {
            let map = self.lods[0].read();
            area.downscaled(BLOCK_SIZE_PO2)
                .cells()
                .map(BlockPos::from)
                .filter(|pos| !map.contains_key(pos))
                .collect()
        };
        if missing.is_empty() {
            return 0;
        }

        let format = self.config.format;
        let generator = self.generator.as_deref();
        let chunks: Vec<Chunk> = missing
            .par_iter()
            .map(|&pos| {
                let mut chunk = Chunk::new(pos, 0, format);
                chunk.state = ChunkState::Generating;
                if let Some(generator) = generator {
                    generator.generate_block(pos.origin(), 0, &mut chunk.voxels);
                }
                chunk.state = ChunkState::Ready;
                chunk
            })
            .collect();

        let mut map = self.lods[0].write();
        let mut created = 0;
        for chunk in chunks {
            // Another caller may have filled the block in the meantime.
            map.entry(chunk.pos).or_insert_with(|| {
                created += 1;
                Arc::new(RwLock::new(chunk))
            });
        }
        debug!(created, "Pre-generated blocks");
        created
    }

    /// Capture the blocks intersecting `area` (in voxels of `lod`).
    ///
    /// Blocks that do not exist are recorded as missing.
    pub fn get_blocks_grid(&self, area: Box3i, lod: u32) -> VoxelDataGrid {
        let block_box = area.downscaled(BLOCK_SIZE_PO2);
        let blocks = self.lod_map(lod).map_or_else(
            || vec![None; block_box.volume()],
            |map| {
                let map = map.read();
                block_box
                    .cells()
                    .map(|bpos| map.get(&BlockPos::from(bpos)).cloned())
                    .collect()
            },
        );
        VoxelDataGrid::new(block_box, lod, self.config.format, blocks)
    }

    /// Read a LOD 0 voxel. Missing blocks read the channel default.
    pub fn get_voxel(&self, pos: IVec3, channel: ChannelId) -> u64 {
        let (bpos, local) = split_voxel(pos);
        self.with_chunk(bpos, 0, |chunk| chunk.voxels.get_voxel(local.to_ivec3(), channel))
            .unwrap_or_else(|| default_value(channel, self.config.format.depth(channel)))
    }

    /// Read a LOD 0 voxel as a signed distance.
    pub fn get_voxel_f(&self, pos: IVec3, channel: ChannelId) -> f32 {
        let (bpos, local) = split_voxel(pos);
        self.with_chunk(bpos, 0, |chunk| chunk.voxels.get_voxel_f(local.to_ivec3(), channel))
            .unwrap_or_else(|| {
                let depth = self.config.format.depth(channel);
                voxsculpt_voxel::decode_sdf(default_value(channel, depth), depth)
            })
    }

    /// Write a LOD 0 voxel. Returns `false` when its block is not loaded.
    pub fn set_voxel(&self, pos: IVec3, value: u64, channel: ChannelId) -> bool {
        let (bpos, local) = split_voxel(pos);
        self.with_chunk_mut(bpos, 0, |chunk| {
            chunk.voxels.set_voxel(local.to_ivec3(), value, channel)
        })
        .unwrap_or(false)
    }

    /// Write a LOD 0 voxel as a signed distance.
    pub fn set_voxel_f(&self, pos: IVec3, value: f32, channel: ChannelId) -> bool {
        let (bpos, local) = split_voxel(pos);
        self.with_chunk_mut(bpos, 0, |chunk| {
            chunk.voxels.set_voxel_f(local.to_ivec3(), value, channel)
        })
        .unwrap_or(false)
    }

    /// Metadata attached to a LOD 0 voxel.
    pub fn get_voxel_metadata(&self, pos: IVec3) -> Option<VoxelMetadata> {
        let (bpos, local) = split_voxel(pos);
        self.with_chunk(bpos, 0, |chunk| {
            chunk.voxels.get_voxel_metadata(local.to_ivec3()).cloned()
        })
        .flatten()
    }

    /// Attach or remove metadata. Returns `false` when the block is not loaded.
    pub fn set_voxel_metadata(&self, pos: IVec3, meta: Option<VoxelMetadata>) -> bool {
        let (bpos, local) = split_voxel(pos);
        self.with_chunk_mut(bpos, 0, |chunk| {
            chunk.voxels.set_voxel_metadata(local.to_ivec3(), meta)
        })
        .unwrap_or(false)
    }

    /// Mark the blocks touched by `area` as modified and notify subscribers once.
    ///
    /// Must be called after every lock taken for the edit was released.
    pub fn mark_area_modified(&self, area: Box3i, lod: u32) {
        let Some(map) = self.lod_map(lod) else {
            return;
        };
        let handles: Vec<ChunkHandle> = {
            let map = map.read();
            area.downscaled(BLOCK_SIZE_PO2)
                .cells()
                .filter_map(|bpos| map.get(&BlockPos::from(bpos)).cloned())
                .collect()
        };
        for handle in handles {
            handle.write().mark_modified();
        }
        self.notify(EditNotification { area, lod });
    }

    /// Receive a notification after every edit.
    pub fn subscribe(&self) -> Receiver<EditNotification> {
        let (tx, rx) = unbounded();
        self.subscribers.lock().push(tx);
        rx
    }

    fn notify(&self, notification: EditNotification) {
        self.subscribers
            .lock()
            .retain(|tx| tx.send(notification).is_ok());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::{TerrainConfig, TerrainGenerator};

    fn empty_block() -> VoxelBuffer {
        VoxelBuffer::new(IVec3::splat(BLOCK_SIZE))
    }

    #[test]
    fn insert_and_get() {
        let data = VoxelData::new(VoxelDataConfig::default());
        let pos = BlockPos::new(1, -2, 3);
        data.insert_block(pos, 0, empty_block()).unwrap();

        assert!(data.has_block(pos, 0));
        assert_eq!(data.block_count(0), 1);
        assert!(data.with_chunk(pos, 0, Chunk::is_ready).unwrap());
    }

    #[test]
    fn insert_rejects_wrong_size() {
        let data = VoxelData::new(VoxelDataConfig::default());
        let err = data
            .insert_block(BlockPos::new(0, 0, 0), 0, VoxelBuffer::new(IVec3::splat(8)))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        assert!(data
            .insert_block(BlockPos::new(0, 0, 0), 3, empty_block())
            .is_err());
    }

    #[test]
    fn voxel_access_across_blocks() {
        let data = VoxelData::new(VoxelDataConfig::default());
        data.insert_block(BlockPos::new(-1, 0, 0), 0, empty_block()).unwrap();

        assert!(data.set_voxel_f(IVec3::new(-1, 5, 5), -3.0, ChannelId::Sdf));
        assert_eq!(data.get_voxel_f(IVec3::new(-1, 5, 5), ChannelId::Sdf), -3.0);
        assert_eq!(
            data.with_chunk(BlockPos::new(-1, 0, 0), 0, |c| {
                c.voxels.get_voxel_f(IVec3::new(15, 5, 5), ChannelId::Sdf)
            }),
            Some(-3.0)
        );

        // Block (0, 0, 0) is missing.
        assert!(!data.set_voxel(IVec3::new(1, 5, 5), 7, ChannelId::Type));
        assert_eq!(data.get_voxel(IVec3::new(1, 5, 5), ChannelId::Type), 0);
    }

    #[test]
    fn editability_requires_loaded_ready_unlocked_blocks() {
        let data = VoxelData::new(VoxelDataConfig::default());
        let area = Box3i::from_min_max(IVec3::new(4, 4, 4), IVec3::new(20, 8, 8));
        assert!(!data.is_area_editable(area));

        data.insert_block(BlockPos::new(0, 0, 0), 0, empty_block()).unwrap();
        assert!(!data.is_area_editable(area));

        data.insert_block(BlockPos::new(1, 0, 0), 0, empty_block()).unwrap();
        assert!(data.is_area_editable(area));

        data.with_chunk_mut(BlockPos::new(1, 0, 0), 0, |c| c.state = ChunkState::Generating);
        assert!(!data.is_area_editable(area));
        assert!(!data.is_area_loaded(area));
        data.with_chunk_mut(BlockPos::new(1, 0, 0), 0, |c| c.state = ChunkState::Ready);

        let handle = data.get_block(BlockPos::new(1, 0, 0), 0).unwrap();
        let guard = handle.write();
        assert!(!data.is_area_editable(area));
        assert!(data.is_area_loaded(Box3i::unit(IVec3::ZERO)));
        drop(guard);
        assert!(data.is_area_editable(area));
    }

    #[test]
    fn editability_outside_bounds() {
        let data = VoxelData::new(VoxelDataConfig {
            bounds: Box3i::new(IVec3::ZERO, IVec3::splat(16)),
            ..Default::default()
        });
        data.insert_block(BlockPos::new(0, 0, 0), 0, empty_block()).unwrap();

        assert!(!data.is_area_editable(Box3i::new(IVec3::splat(100), IVec3::ONE)));
        // The part outside the bounds is ignored.
        assert!(data.is_area_editable(Box3i::new(IVec3::splat(8), IVec3::splat(20))));
    }

    #[test]
    fn pre_generate_fills_missing_blocks_once() {
        let data = VoxelData::new(VoxelDataConfig::default())
            .with_generator(Arc::new(TerrainGenerator::new(TerrainConfig::flat(0.0))));
        let area = Box3i::from_min_max(IVec3::splat(-8), IVec3::splat(8));

        assert_eq!(data.pre_generate_box(area), 8);
        assert_eq!(data.pre_generate_box(area), 0);
        assert!(data.is_area_editable(area));
        assert_eq!(data.get_voxel_f(IVec3::new(0, -3, 0), ChannelId::Sdf), -3.0);
    }

    #[test]
    fn pre_generate_without_generator_uses_defaults() {
        let data = VoxelData::new(VoxelDataConfig::default());
        assert_eq!(data.pre_generate_box(Box3i::unit(IVec3::ZERO)), 1);
        assert_eq!(
            data.get_voxel_f(IVec3::ZERO, ChannelId::Sdf),
            voxsculpt_core::constants::SDF_FAR_OUTSIDE
        );
    }

    #[test]
    fn grid_captures_blocks_in_order() {
        let data = VoxelData::new(VoxelDataConfig::default());
        data.insert_block(BlockPos::new(0, 0, 0), 0, empty_block()).unwrap();
        data.insert_block(BlockPos::new(0, 0, 1), 0, empty_block()).unwrap();

        let grid = data.get_blocks_grid(Box3i::new(IVec3::ZERO, IVec3::new(16, 16, 32)), 0);
        assert_eq!(grid.block_box(), Box3i::new(IVec3::ZERO, IVec3::new(1, 1, 2)));
        assert!(grid.is_fully_loaded());

        let grid = data.get_blocks_grid(Box3i::new(IVec3::ZERO, IVec3::new(32, 16, 16)), 0);
        assert!(!grid.is_fully_loaded());
    }

    #[test]
    fn notifications_and_dirty_blocks() {
        let data = VoxelData::new(VoxelDataConfig::default());
        data.insert_block(BlockPos::new(0, 0, 0), 0, empty_block()).unwrap();
        data.insert_block(BlockPos::new(1, 0, 0), 0, empty_block()).unwrap();
        let rx = data.subscribe();

        let area = Box3i::new(IVec3::new(2, 2, 2), IVec3::new(4, 4, 4));
        data.mark_area_modified(area, 0);

        assert_eq!(rx.try_recv(), Ok(EditNotification { area, lod: 0 }));
        assert!(rx.try_recv().is_err());
        assert_eq!(data.dirty_blocks(0), vec![BlockPos::new(0, 0, 0)]);
        assert_eq!(data.with_chunk(BlockPos::new(0, 0, 0), 0, |c| c.revision), Some(1));
    }

    #[test]
    fn dropped_subscribers_are_forgotten() {
        let data = VoxelData::new(VoxelDataConfig::default());
        drop(data.subscribe());
        let rx = data.subscribe();
        data.mark_area_modified(Box3i::unit(IVec3::ZERO), 0);
        assert!(rx.try_recv().is_ok());
        assert_eq!(data.subscribers.lock().len(), 1);
    }
}
