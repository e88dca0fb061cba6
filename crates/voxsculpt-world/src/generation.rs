//! Procedural terrain generation.

use glam::IVec3;
use noise::{Fbm, MultiFractal, NoiseFn, Perlin};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use voxsculpt_core::constants::BLOCK_SIZE;
use voxsculpt_core::BlockPos;
use voxsculpt_voxel::{ChannelId, VoxelBuffer, VoxelFormat};

use crate::WorldSeed;

/// Fills blocks that do not exist yet.
pub trait VoxelGenerator: Send + Sync {
    /// Write the voxels of the block whose minimum corner is `origin`.
    ///
    /// `origin` is expressed in voxels of `lod`. The buffer is already sized and
    /// formatted.
    fn generate_block(&self, origin: IVec3, lod: u32, out: &mut VoxelBuffer);
}

/// Terrain generator configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// Seed for noise generation.
    pub seed: WorldSeed,
    /// Y coordinate of the surface where the noise is zero.
    pub base_height: f64,
    /// Horizontal scale of terrain features.
    pub terrain_scale: f64,
    /// Maximum terrain height variation. Zero produces a flat plane.
    pub terrain_height: f64,
    /// Number of noise octaves for detail.
    pub octaves: usize,
    /// Frequency multiplier between octaves.
    pub lacunarity: f64,
    /// Amplitude multiplier between octaves.
    pub persistence: f64,
    /// Value written to the `Type` channel below the surface.
    pub material: u64,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            base_height: 0.0,
            terrain_scale: 100.0,
            terrain_height: 32.0,
            octaves: 4,
            lacunarity: 2.0,
            persistence: 0.5,
            material: 1,
        }
    }
}

impl TerrainConfig {
    /// Flat ground at the given height.
    pub fn flat(height: f64) -> Self {
        Self {
            base_height: height,
            terrain_height: 0.0,
            ..Default::default()
        }
    }
}

/// Height-field terrain generator using fractal noise.
///
/// Writes the vertical distance to the surface into the SDF channel, which is
/// a good enough distance estimate for gentle slopes.
pub struct TerrainGenerator {
    config: TerrainConfig,
    height_noise: Fbm<Perlin>,
}

impl TerrainGenerator {
    /// Create a new terrain generator with the given configuration.
    pub fn new(config: TerrainConfig) -> Self {
        let height_noise = Fbm::<Perlin>::new(config.seed as u32)
            .set_octaves(config.octaves)
            .set_lacunarity(config.lacunarity)
            .set_persistence(config.persistence);

        Self {
            config,
            height_noise,
        }
    }

    /// Create a terrain generator with default configuration.
    pub fn with_seed(seed: WorldSeed) -> Self {
        Self::new(TerrainConfig {
            seed,
            ..Default::default()
        })
    }

    /// Get the terrain configuration.
    pub const fn config(&self) -> &TerrainConfig {
        &self.config
    }

    /// Surface height at LOD 0 world XZ coordinates.
    pub fn height_at(&self, world_x: f64, world_z: f64) -> f64 {
        if self.config.terrain_height == 0.0 {
            return self.config.base_height;
        }
        let nx = world_x / self.config.terrain_scale;
        let nz = world_z / self.config.terrain_scale;
        self.config.base_height + self.height_noise.get([nx, nz]) * self.config.terrain_height
    }

    /// Generate a full block at the given position.
    pub fn generate(&self, pos: BlockPos, lod: u32, format: VoxelFormat) -> VoxelBuffer {
        let mut buffer = VoxelBuffer::with_format(IVec3::splat(BLOCK_SIZE), format);
        self.generate_block(pos.origin(), lod, &mut buffer);
        buffer
    }

    /// Generate multiple blocks in parallel.
    pub fn generate_parallel(
        &self,
        positions: &[BlockPos],
        lod: u32,
        format: VoxelFormat,
    ) -> Vec<(BlockPos, VoxelBuffer)> {
        positions
            .par_iter()
            .map(|&pos| (pos, self.generate(pos, lod, format)))
            .collect()
    }
}

impl VoxelGenerator for TerrainGenerator {
    fn generate_block(&self, origin: IVec3, lod: u32, out: &mut VoxelBuffer) {
        let scale = f64::from(1u32 << lod);
        let size = out.size();

        for z in 0..size.z {
            for x in 0..size.x {
                let world_x = f64::from(origin.x + x) * scale;
                let world_z = f64::from(origin.z + z) * scale;
                let surface = self.height_at(world_x, world_z);

                for y in 0..size.y {
                    let world_y = f64::from(origin.y + y) * scale;
                    // Distances are kept in voxels of this LOD.
                    let sd = ((world_y - surface) / scale) as f32;
                    let pos = IVec3::new(x, y, z);
                    out.set_voxel_f(pos, sd, ChannelId::Sdf);
                    if sd < 0.0 {
                        out.set_voxel(pos, self.config.material, ChannelId::Type);
                    }
                }
            }
        }

        out.compress_uniform_channels();
    }
}
