//! Coordinate systems for the chunked voxel volume.

use crate::constants::{BLOCK_SIZE, BLOCK_SIZE_PO2};
use bytemuck::{Pod, Zeroable};
use glam::IVec3;
use serde::{Deserialize, Serialize};

/// Position within a block (0 to BLOCK_SIZE-1 per axis).
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable, Serialize, Deserialize,
)]
#[repr(C)]
pub struct LocalPos {
    pub x: u8,
    pub y: u8,
    pub z: u8,
    pub _pad: u8,
}

impl LocalPos {
    /// Create a new local position
    #[inline]
    pub const fn new(x: u8, y: u8, z: u8) -> Self {
        debug_assert!((x as i32) < BLOCK_SIZE);
        debug_assert!((y as i32) < BLOCK_SIZE);
        debug_assert!((z as i32) < BLOCK_SIZE);
        Self { x, y, z, _pad: 0 }
    }

    /// Convert to glam IVec3
    #[inline]
    pub const fn to_ivec3(self) -> IVec3 {
        IVec3::new(self.x as i32, self.y as i32, self.z as i32)
    }
}

/// Block position in block coordinates, at a given level of detail.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable, Serialize, Deserialize,
)]
#[repr(C)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub _pad: i32,
}

impl BlockPos {
    /// Create a new block position
    #[inline]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z, _pad: 0 }
    }

    /// Block containing a voxel expressed in LOD-local voxel units.
    #[inline]
    pub const fn from_voxel(pos: IVec3) -> Self {
        Self::new(
            pos.x >> BLOCK_SIZE_PO2,
            pos.y >> BLOCK_SIZE_PO2,
            pos.z >> BLOCK_SIZE_PO2,
        )
    }

    /// Minimum voxel corner of the block, in LOD-local voxel units.
    #[inline]
    pub const fn origin(self) -> IVec3 {
        IVec3::new(
            self.x << BLOCK_SIZE_PO2,
            self.y << BLOCK_SIZE_PO2,
            self.z << BLOCK_SIZE_PO2,
        )
    }

    /// Convert to glam IVec3
    #[inline]
    pub const fn to_ivec3(self) -> IVec3 {
        IVec3::new(self.x, self.y, self.z)
    }
}

impl From<IVec3> for BlockPos {
    fn from(v: IVec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

/// Split a voxel position into its block and the position inside that block.
#[inline]
pub const fn split_voxel(pos: IVec3) -> (BlockPos, LocalPos) {
    let mask = BLOCK_SIZE - 1;
    (
        BlockPos::from_voxel(pos),
        LocalPos::new(
            (pos.x & mask) as u8,
            (pos.y & mask) as u8,
            (pos.z & mask) as u8,
        ),
    )
}
