//! Stateful voxel editing façade.

use glam::{Affine3A, IVec3, Vec3};
use tracing::{trace_span, warn};
use voxsculpt_core::constants::{SDF_FAR_INSIDE, SDF_FAR_OUTSIDE};
use voxsculpt_core::math::{ceil_to_int, floor_to_int, get_sdf_interpolated};
use voxsculpt_core::{Aabb, Box3i};
use voxsculpt_voxel::{ChannelId, ChannelMask, VoxelBuffer, VoxelFormat, VoxelMetadata};
use voxsculpt_world::VoxelData;

use crate::backend::{Capabilities, EditBackend};
use crate::config::{EditConfig, Mode};
use crate::error::{EditError, Result};
use crate::mesh_sdf::MeshSdf;
use crate::ops::{box_blur, grow_sphere, sphere_box, DoShapeChunked, PasteMask};

const MIN_SPHERE_RADIUS: f32 = 0.01;
const MAX_BLUR_RADIUS: i32 = 64;

/// Applies edits described by an [`EditConfig`] to a backend.
///
/// Every edit either fails before touching any voxel or writes its whole
/// area and then reports it once through [`EditBackend::post_edit`].
#[derive(Clone, Debug, Default)]
pub struct VoxelTool<B> {
    config: EditConfig,
    backend: B,
}

impl<B: EditBackend> VoxelTool<B> {
    pub fn new(backend: B) -> Self {
        Self::with_config(backend, EditConfig::default())
    }

    pub const fn with_config(backend: B, config: EditConfig) -> Self {
        Self { config, backend }
    }

    pub const fn config(&self) -> &EditConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut EditConfig {
        &mut self.config
    }

    pub const fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }

    /// Whether the backend implements every optional operation in `caps`.
    pub fn supports(&self, caps: Capabilities) -> bool {
        self.backend.capabilities().contains(caps)
    }

    pub fn format(&self) -> VoxelFormat {
        self.backend.format()
    }

    pub fn is_area_editable(&self, area: Box3i) -> bool {
        self.backend.is_area_editable(area)
    }

    /// Editability of the voxels covered by a real-valued box.
    pub fn is_area_editable_aabb(&self, aabb: Aabb) -> bool {
        let area = aabb.to_box3i();
        if area.is_empty() {
            warn!(?aabb, "Empty area given for editability check");
            return false;
        }
        self.backend.is_area_editable(area)
    }

    /// Report `area` as modified without editing it.
    pub fn post_edit(&mut self, area: Box3i) {
        self.backend.post_edit(area);
    }

    fn check_editable(&self, area: Box3i) -> Result<()> {
        if self.backend.is_area_editable(area) {
            Ok(())
        } else {
            warn!(?area, "Area not editable");
            Err(EditError::NotEditable(area))
        }
    }

    fn check_shape_editable(&self, area: Box3i) -> Result<()> {
        if self.config.allow_out_of_bounds() {
            Ok(())
        } else {
            self.check_editable(area)
        }
    }

    fn require_sdf_channel(&self) -> Result<()> {
        let actual = self.config.channel();
        if actual == ChannelId::Sdf {
            Ok(())
        } else {
            Err(EditError::WrongChannel {
                expected: ChannelId::Sdf,
                actual,
            })
        }
    }

    // Single voxels

    pub fn get_voxel(&self, pos: IVec3) -> u64 {
        self.backend.get_voxel(pos, self.config.channel())
    }

    pub fn get_voxel_f(&self, pos: IVec3) -> f32 {
        self.backend.get_voxel_f(pos, self.config.channel())
    }

    /// Trilinear interpolation of the 8 voxels around `pos`.
    pub fn get_voxel_f_interpolated(&self, pos: Vec3) -> f32 {
        let channel = self.config.channel();
        get_sdf_interpolated(|p| self.backend.get_voxel_f(p, channel), pos)
    }

    pub fn set_voxel(&mut self, pos: IVec3, value: u64) -> Result<()> {
        let area = Box3i::unit(pos);
        self.check_editable(area)?;
        self.backend.set_voxel(pos, value, self.config.channel());
        self.backend.post_edit(area);
        Ok(())
    }

    pub fn set_voxel_f(&mut self, pos: IVec3, value: f32) -> Result<()> {
        let area = Box3i::unit(pos);
        self.check_editable(area)?;
        self.backend.set_voxel_f(pos, value, self.config.channel());
        self.backend.post_edit(area);
        Ok(())
    }

    /// Fill or clear one voxel according to the current mode.
    pub fn do_point(&mut self, pos: IVec3) -> Result<()> {
        if self.config.channel() == ChannelId::Sdf {
            let value = if self.config.mode() == Mode::Remove {
                SDF_FAR_OUTSIDE
            } else {
                SDF_FAR_INSIDE
            };
            self.set_voxel_f(pos, value)
        } else {
            self.set_voxel(pos, self.config.paint_value())
        }
    }

    pub fn get_voxel_metadata(&self, pos: IVec3) -> Option<VoxelMetadata> {
        self.backend.get_voxel_metadata(pos)
    }

    pub fn set_voxel_metadata(&mut self, pos: IVec3, meta: Option<VoxelMetadata>) -> Result<()> {
        let area = Box3i::unit(pos);
        self.check_editable(area)?;
        self.backend.set_voxel_metadata(pos, meta)?;
        self.backend.post_edit(area);
        Ok(())
    }

    // Shapes

    pub fn do_sphere(&mut self, center: Vec3, radius: f32) -> Result<()> {
        if radius.is_nan() || radius < 0.0 {
            return Err(EditError::InvalidArgument(format!(
                "sphere radius must be positive, got {radius}"
            )));
        }
        let area = sphere_box(center, radius);
        self.check_shape_editable(area)?;

        let _span = trace_span!("do_sphere", radius).entered();
        self.backend.do_sphere(&self.config, area, center, radius);
        self.backend.post_edit(area);
        Ok(())
    }

    /// Edit the box between two corners, both inclusive, given in any order.
    ///
    /// The SDF channel gets a far-inside distance rather than the distance to
    /// the box faces.
    pub fn do_box(&mut self, begin: IVec3, end: IVec3) -> Result<()> {
        let area = Box3i::from_min_max(begin.min(end), begin.max(end) + IVec3::ONE);
        self.check_shape_editable(area)?;

        let _span = trace_span!("do_box").entered();
        self.backend.do_box(&self.config, area);
        self.backend.post_edit(area);
        Ok(())
    }

    /// Sweep capsules through consecutive points, each with its own radius.
    pub fn do_path(&mut self, positions: &[Vec3], radii: &[f32]) -> Result<()> {
        let area = self.backend.do_path(&self.config, positions, radii)?;
        self.backend.post_edit(area);
        Ok(())
    }

    pub fn do_mesh(&mut self, mesh: &MeshSdf, transform: &Affine3A, isolevel: f32) -> Result<()> {
        let area = self.backend.do_mesh(&self.config, mesh, transform, isolevel)?;
        self.backend.post_edit(area);
        Ok(())
    }

    /// Stamp a baked mesh SDF into `data`, locking all touched blocks at once.
    ///
    /// The clipped area must be editable through the backend, whatever
    /// `allow_out_of_bounds` says. With `with_pre_generate`, missing blocks of
    /// `data` in the area are generated before writing.
    pub fn do_mesh_chunked(
        &mut self,
        mesh: &MeshSdf,
        data: &VoxelData,
        transform: &Affine3A,
        isolevel: f32,
        with_pre_generate: bool,
    ) -> Result<()> {
        let shape = mesh.shape(transform, isolevel, self.config.sdf_scale())?;
        let area = mesh.world_box(transform).clipped(&data.bounds());
        self.check_editable(area)?;

        let _span = trace_span!("do_mesh_chunked", cells = area.volume()).entered();
        if with_pre_generate {
            data.pre_generate_box(area);
        }
        DoShapeChunked::from_config(shape, area, &self.config).run_on_data(data);
        self.backend.post_edit(area);
        Ok(())
    }

    /// Clear every voxel where `stamp` is inside matter, ignoring the mode.
    pub fn sdf_stamp_erase(&mut self, stamp: &VoxelBuffer, pos: IVec3) -> Result<()> {
        self.require_sdf_channel()?;
        let area = Box3i::new(pos, stamp.size());
        self.check_editable(area)?;

        stamp.local_box().for_each_cell(|local| {
            if stamp.get_voxel_f(local, ChannelId::Sdf) <= 0.0 {
                self.backend
                    .set_voxel_f(pos + local, SDF_FAR_OUTSIDE, ChannelId::Sdf);
            }
        });
        self.backend.post_edit(area);
        Ok(())
    }

    // Buffers

    /// Copy the box starting at `pos` with the size of `dst` into `dst`.
    pub fn copy(&self, pos: IVec3, dst: &mut VoxelBuffer, channels: ChannelMask) -> Result<()> {
        if dst.volume() == 0 {
            warn!("Copy into an empty buffer");
            return Ok(());
        }
        self.backend.copy(pos, dst, channels)
    }

    pub fn paste(&mut self, pos: IVec3, src: &VoxelBuffer, channels: ChannelMask) -> Result<()> {
        let Some(area) = self.paste_area(pos, src)? else {
            return Ok(());
        };
        self.backend.paste(pos, src, channels)?;
        self.backend.post_edit(area);
        Ok(())
    }

    /// Paste skipping source voxels that hold `mask.value` in `mask.channel`.
    pub fn paste_masked(
        &mut self,
        pos: IVec3,
        src: &VoxelBuffer,
        channels: ChannelMask,
        mask: PasteMask,
    ) -> Result<()> {
        let Some(area) = self.paste_area(pos, src)? else {
            return Ok(());
        };
        self.backend.paste_masked(pos, src, channels, mask)?;
        self.backend.post_edit(area);
        Ok(())
    }

    /// Masked paste restricted to destination voxels whose value in
    /// `dst_channel` is one of `writable`.
    pub fn paste_masked_writable_list(
        &mut self,
        pos: IVec3,
        src: &VoxelBuffer,
        channels: ChannelMask,
        mask: PasteMask,
        dst_channel: ChannelId,
        writable: &[u64],
    ) -> Result<()> {
        let Some(area) = self.paste_area(pos, src)? else {
            return Ok(());
        };
        self.backend
            .paste_masked_writable_list(pos, src, channels, mask, dst_channel, writable)?;
        self.backend.post_edit(area);
        Ok(())
    }

    fn paste_area(&self, pos: IVec3, src: &VoxelBuffer) -> Result<Option<Box3i>> {
        if src.volume() == 0 {
            warn!("Paste of an empty buffer");
            return Ok(None);
        }
        let area = Box3i::new(pos, src.size());
        self.check_editable(area)?;
        Ok(Some(area))
    }

    // Filters

    /// Blur distances inside a sphere, fully at the center and not at all on
    /// its surface.
    pub fn smooth_sphere(&mut self, center: Vec3, radius: f32, blur_radius: i32) -> Result<()> {
        if !(1..=MAX_BLUR_RADIUS).contains(&blur_radius) {
            return Err(EditError::InvalidArgument(format!(
                "blur radius must be in 1..={MAX_BLUR_RADIUS}, got {blur_radius}"
            )));
        }
        Self::check_filter_radius(radius)?;
        self.require_sdf_channel()?;

        let area = Self::filter_box(center, radius);
        let padded = area.padded(blur_radius);
        self.check_shape_editable(padded)?;

        let _span = trace_span!("smooth_sphere", radius, blur_radius).entered();
        let channels = ChannelId::Sdf.mask();
        let mut src = VoxelBuffer::with_format(padded.size, self.backend.format());
        self.backend.copy(padded.position, &mut src, channels)?;

        let mut smoothed = VoxelBuffer::default();
        box_blur(
            &src,
            &mut smoothed,
            blur_radius,
            center - area.position.as_vec3(),
            radius,
        );

        self.backend.paste(area.position, &smoothed, channels)?;
        self.backend.post_edit(area);
        Ok(())
    }

    /// Offset distances in the box around a sphere so matter grows by
    /// `strength` voxels, or shrinks in [`Mode::Remove`].
    pub fn grow_sphere(&mut self, center: Vec3, radius: f32, strength: f32) -> Result<()> {
        Self::check_filter_radius(radius)?;
        self.require_sdf_channel()?;

        let area = Self::filter_box(center, radius);
        self.check_shape_editable(area)?;

        let _span = trace_span!("grow_sphere", radius, strength).entered();
        let channels = ChannelId::Sdf.mask();
        let mut buffer = VoxelBuffer::with_format(area.size, self.backend.format());
        self.backend.copy(area.position, &mut buffer, channels)?;

        let signed = if self.config.mode() == Mode::Remove {
            -strength
        } else {
            strength
        };
        grow_sphere(&mut buffer, self.config.sdf_scale() * signed);

        self.backend.paste(area.position, &buffer, channels)?;
        self.backend.post_edit(area);
        Ok(())
    }

    fn check_filter_radius(radius: f32) -> Result<()> {
        if radius >= MIN_SPHERE_RADIUS {
            Ok(())
        } else {
            Err(EditError::InvalidArgument(format!(
                "sphere radius must be at least {MIN_SPHERE_RADIUS}, got {radius}"
            )))
        }
    }

    fn filter_box(center: Vec3, radius: f32) -> Box3i {
        Box3i::from_min_max(
            floor_to_int(center - Vec3::splat(radius)),
            ceil_to_int(center + Vec3::splat(radius)),
        )
    }
}
