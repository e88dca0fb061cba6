//! Out-of-band per-voxel data.

use serde::{Deserialize, Serialize};

/// Arbitrary value attached to a single voxel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum VoxelMetadata {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
}

impl From<bool> for VoxelMetadata {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for VoxelMetadata {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for VoxelMetadata {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<String> for VoxelMetadata {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<&str> for VoxelMetadata {
    fn from(v: &str) -> Self {
        Self::Text(v.to_owned())
    }
}
