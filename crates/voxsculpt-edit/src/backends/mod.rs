//! Backend variants.

mod buffer;
mod terrain;

pub use buffer::BufferBackend;
pub use terrain::TerrainBackend;
