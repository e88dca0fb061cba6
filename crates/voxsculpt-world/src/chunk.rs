//! Block of voxels stored in the chunked volume.

use glam::IVec3;
use voxsculpt_core::constants::BLOCK_SIZE;
use voxsculpt_core::BlockPos;
use voxsculpt_voxel::{ChannelId, Compression, VoxelBuffer, VoxelFormat};

/// State of a chunk in the loading pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ChunkState {
    /// Chunk is known but holds no data yet.
    #[default]
    Pending,
    /// Chunk is currently being generated.
    Generating,
    /// Chunk holds voxel data and can be edited.
    Ready,
    /// Chunk is marked for unload.
    Unloading,
}

/// A single block of voxel data (16x16x16 voxels).
#[derive(Debug, Clone)]
pub struct Chunk {
    /// Position in block coordinates.
    pub pos: BlockPos,
    /// Level of detail the block belongs to.
    pub lod: u32,
    /// Current state in the loading pipeline.
    pub state: ChunkState,
    /// Voxel data.
    pub voxels: VoxelBuffer,
    /// Whether the block changed since consumers last looked at it.
    pub dirty: bool,
    /// Incremented on every edit.
    pub revision: u64,
}

impl Chunk {
    /// Create an empty pending chunk.
    pub fn new(pos: BlockPos, lod: u32, format: VoxelFormat) -> Self {
        Self {
            pos,
            lod,
            state: ChunkState::Pending,
            voxels: VoxelBuffer::with_format(IVec3::splat(BLOCK_SIZE), format),
            dirty: false,
            revision: 0,
        }
    }

    /// Create a ready chunk holding existing voxels.
    pub fn with_voxels(pos: BlockPos, lod: u32, voxels: VoxelBuffer) -> Self {
        Self {
            pos,
            lod,
            state: ChunkState::Ready,
            voxels,
            dirty: false,
            revision: 0,
        }
    }

    /// Returns true when the chunk can be read and edited.
    #[inline]
    pub fn is_ready(&self) -> bool {
        self.state == ChunkState::Ready
    }

    /// Record an edit.
    pub fn mark_modified(&mut self) {
        self.dirty = true;
        self.revision += 1;
    }

    /// Clear the dirty flag once consumers caught up.
    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// Approximate memory usage in bytes.
    pub fn memory_usage(&self) -> usize {
        let base = std::mem::size_of::<Self>();
        let channels: usize = ChannelId::ALL
            .iter()
            .filter(|c| self.voxels.channel_compression(**c) == Compression::Raw)
            .map(|c| self.voxels.channel_depth(*c).byte_count() * self.voxels.volume())
            .sum();
        base + channels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_chunk_is_pending() {
        let chunk = Chunk::new(BlockPos::new(0, 0, 0), 0, VoxelFormat::default());
        assert_eq!(chunk.state, ChunkState::Pending);
        assert!(!chunk.is_ready());
        assert!(!chunk.dirty);
        assert_eq!(chunk.voxels.size(), IVec3::splat(BLOCK_SIZE));
    }

    #[test]
    fn chunk_with_voxels_is_ready() {
        let voxels = VoxelBuffer::new(IVec3::splat(BLOCK_SIZE));
        let chunk = Chunk::with_voxels(BlockPos::new(1, 2, 3), 0, voxels);
        assert!(chunk.is_ready());
    }

    #[test]
    fn modification_bumps_revision() {
        let mut chunk = Chunk::new(BlockPos::new(0, 0, 0), 0, VoxelFormat::default());
        chunk.mark_modified();
        chunk.mark_modified();
        assert!(chunk.dirty);
        assert_eq!(chunk.revision, 2);

        chunk.mark_clean();
        assert!(!chunk.dirty);
        assert_eq!(chunk.revision, 2);
    }

    #[test]
    fn uniform_chunk_uses_little_memory() {
        let mut chunk = Chunk::new(BlockPos::new(0, 0, 0), 0, VoxelFormat::default());
        let compact = chunk.memory_usage();
        chunk.voxels.set_voxel_f(IVec3::ZERO, -1.0, ChannelId::Sdf);
        assert!(chunk.memory_usage() >= compact + 4 * 4096);
    }
}
