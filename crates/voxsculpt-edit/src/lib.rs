//! Voxel editing for the Voxsculpt voxel editor.
//!
//! [`VoxelTool`] holds an [`EditConfig`] and applies edits (points, spheres,
//! boxes, paths, mesh stamps, smoothing, growth, copy/paste) through an
//! [`EditBackend`]. Two backends are provided:
//! - [`BufferBackend`] edits a single in-memory [`VoxelBuffer`](voxsculpt_voxel::VoxelBuffer)
//! - [`TerrainBackend`] edits a chunked [`VoxelData`](voxsculpt_world::VoxelData),
//!   locking every touched block once per edit

pub mod backend;
pub mod backends;
pub mod config;
pub mod encoding;
pub mod error;
pub mod mesh_sdf;
pub mod ops;
pub mod reference;
pub mod tool;

pub use backend::{Capabilities, EditBackend};
pub use backends::{BufferBackend, TerrainBackend};
pub use config::{EditConfig, Mode, TextureParams};
pub use error::{EditError, Result};
pub use mesh_sdf::MeshSdf;
pub use ops::{PasteMask, Shape};
pub use tool::VoxelTool;

/// Tool editing a single in-memory buffer.
pub type VoxelToolBuffer = VoxelTool<BufferBackend>;
/// Tool editing a chunked terrain.
pub type VoxelToolTerrain = VoxelTool<TerrainBackend>;
