//! Voxel buffers for the Voxsculpt voxel editor.

pub mod buffer;
pub mod format;
pub mod metadata;
pub mod mixel4;

pub use buffer::{
    decode_sdf, default_value, encode_sdf, RawChannel, VoxelBuffer, QUANTIZED_SDF_16_BITS_SCALE,
    QUANTIZED_SDF_8_BITS_SCALE,
};
pub use format::{ChannelId, ChannelMask, Compression, Depth, VoxelFormat, MAX_CHANNELS};
pub use metadata::VoxelMetadata;
