//! Edit error types.

use thiserror::Error;
use voxsculpt_core::Box3i;
use voxsculpt_voxel::ChannelId;

/// Why an edit was not applied.
///
/// Every variant is produced before any voxel is written.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EditError {
    /// Target area is not loaded, locked by another edit or out of bounds
    #[error("Area not editable: {0:?}")]
    NotEditable(Box3i),

    /// Backend does not implement the operation
    #[error("Operation not supported by this backend: {0}")]
    Unsupported(&'static str),

    /// Operation only works on another channel
    #[error("Operation requires channel {expected:?}, tool is set to {actual:?}")]
    WrongChannel {
        expected: ChannelId,
        actual: ChannelId,
    },

    /// Invalid argument passed to an operation
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Mesh SDF must be baked before stamping
    #[error("Mesh SDF is not baked")]
    MeshNotBaked,

    /// Error from the storage layer
    #[error(transparent)]
    Storage(#[from] voxsculpt_core::Error),
}

/// Result type alias using [`EditError`].
pub type Result<T> = std::result::Result<T, EditError>;
