//! Baked signed distance field of a mesh, ready to be stamped into a volume.

use glam::{Affine3A, IVec3, Quat, Vec3};
use voxsculpt_core::math::largest_basis_scale;
use voxsculpt_core::{Aabb, Box3i};
use voxsculpt_voxel::{ChannelId, Compression, Depth, RawChannel, VoxelBuffer};

use crate::error::{EditError, Result};
use crate::ops::SdfBufferShape;

/// Signed distance samples of a mesh over its local bounding box.
///
/// Voxel `p` of the buffer sits at `aabb.min + p * aabb.size() / buffer.size()`.
#[derive(Clone, Debug, Default)]
pub struct MeshSdf {
    buffer: VoxelBuffer,
    aabb: Aabb,
    baked: bool,
}

impl MeshSdf {
    /// Wrap an already baked buffer.
    pub fn from_baked(buffer: VoxelBuffer, aabb: Aabb) -> Self {
        Self {
            buffer,
            aabb,
            baked: true,
        }
    }

    /// Bake by sampling a distance function at every buffer voxel.
    pub fn bake_from_fn<F>(resolution: IVec3, aabb: Aabb, sdf: F) -> Self
    where
        F: Fn(Vec3) -> f32,
    {
        let mut buffer = VoxelBuffer::new(resolution);
        buffer.set_channel_depth(ChannelId::Sdf, Depth::Bits32);
        if buffer.volume() == 0 {
            return Self::from_baked(buffer, aabb);
        }
        buffer.decompress_channel(ChannelId::Sdf);

        let cell_size = aabb.size() / buffer.size().as_vec3();
        buffer.local_box().for_each_cell(|pos| {
            let local = aabb.min + pos.as_vec3() * cell_size;
            buffer.set_voxel_f(pos, sdf(local), ChannelId::Sdf);
        });

        Self::from_baked(buffer, aabb)
    }

    pub const fn is_baked(&self) -> bool {
        self.baked
    }

    pub const fn buffer(&self) -> &VoxelBuffer {
        &self.buffer
    }

    /// Bounding box in mesh space.
    pub const fn aabb(&self) -> Aabb {
        self.aabb
    }

    /// Voxels covered by the mesh once placed by `transform`.
    pub fn world_box(&self, transform: &Affine3A) -> Box3i {
        self.aabb.transformed(transform).to_box3i()
    }

    /// Mapping from buffer voxels to world positions.
    pub fn buffer_to_world(&self, transform: &Affine3A) -> Affine3A {
        let scale = self.aabb.size() / self.buffer.size().as_vec3();
        let buffer_to_box =
            Affine3A::from_scale_rotation_translation(scale, Quat::IDENTITY, self.aabb.min);
        *transform * buffer_to_box
    }

    /// Build the shape sampling this mesh placed by `transform`.
    ///
    /// Distances are multiplied by `sdf_scale` and by the largest scale of
    /// `transform`. Non-uniform scales are not well supported.
    pub fn shape(
        &self,
        transform: &Affine3A,
        isolevel: f32,
        sdf_scale: f32,
    ) -> Result<SdfBufferShape<'_>> {
        if !self.baked {
            return Err(EditError::MeshNotBaked);
        }
        if self.buffer.volume() == 0 {
            return Err(EditError::InvalidArgument(format!(
                "mesh SDF buffer is empty ({})",
                self.buffer.size()
            )));
        }
        let channel = ChannelId::Sdf;
        if self.buffer.channel_compression(channel) == Compression::Uniform {
            return Err(EditError::InvalidArgument(
                "mesh SDF buffer is uniform".to_owned(),
            ));
        }
        if self.buffer.channel_depth(channel) != Depth::Bits32 {
            return Err(EditError::InvalidArgument(
                "mesh SDF buffer must use 32-bit distances".to_owned(),
            ));
        }
        let buffer = self
            .buffer
            .channel_data_read_only(channel)
            .and_then(RawChannel::as_f32)
            .ok_or_else(|| EditError::InvalidArgument("mesh SDF data unavailable".to_owned()))?;

        Ok(SdfBufferShape {
            world_to_buffer: self.buffer_to_world(transform).inverse(),
            buffer_size: self.buffer.size(),
            buffer,
            isolevel,
            sdf_scale: sdf_scale * largest_basis_scale(transform),
        })
    }
}
