//! Core types and math for the Voxsculpt voxel editor.
//!
//! This crate provides the foundational types shared by every other crate:
//! - Integer voxel boxes with deterministic cell iteration
//! - Block (chunk) coordinate conversions
//! - Signed distance helpers and interpolation
//! - Common error types

pub mod box3i;
pub mod coords;
pub mod error;
pub mod math;

pub use box3i::{Box3i, Box3iCells};
pub use coords::{BlockPos, LocalPos};
pub use error::{Error, Result};
pub use math::Aabb;

/// Engine-wide constants
pub mod constants {
    /// Block edge length as a power of two
    pub const BLOCK_SIZE_PO2: u32 = 4;
    /// Size of a block in voxels per axis
    pub const BLOCK_SIZE: i32 = 1 << BLOCK_SIZE_PO2;
    /// Total voxels in a block (16^3)
    pub const BLOCK_VOLUME: usize = (BLOCK_SIZE * BLOCK_SIZE * BLOCK_SIZE) as usize;
    /// Maximum number of levels of detail a store can hold
    pub const MAX_LOD: usize = 24;

    /// Signed distance written when a voxel must be considered deep inside matter.
    ///
    /// Not a consistent distance. Quantized channels saturate it.
    pub const SDF_FAR_INSIDE: f32 = -999_999.0;
    /// Signed distance written when a voxel must be considered far from any matter.
    pub const SDF_FAR_OUTSIDE: f32 = 999_999.0;
}
