//! Chunked voxel storage and procedural generation for the Voxsculpt voxel editor.
//!
//! Blocks of `BLOCK_SIZE`³ voxels are stored per level of detail behind
//! individual read/write locks. Multi-block edits go through a
//! [`VoxelDataGrid`], which always locks its blocks in the same order.

pub mod chunk;
pub mod data;
pub mod generation;
pub mod grid;

pub use chunk::{Chunk, ChunkState};
pub use data::{ChunkHandle, EditNotification, VoxelData, VoxelDataConfig};
pub use generation::{TerrainConfig, TerrainGenerator, VoxelGenerator};
pub use grid::{GridReadGuard, GridWriteGuard, VoxelDataGrid};

/// World seed for procedural generation.
pub type WorldSeed = u64;
