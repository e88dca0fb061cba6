//! Shapes evaluated cell by cell by the chunked executor.

use glam::{Affine3A, IVec3, Vec3};
use voxsculpt_core::math::{floor_to_int, get_sdf_interpolated, sdf_round_cone, sdf_sphere};
use voxsculpt_core::Box3i;

/// Something that can answer "how far from matter" at a voxel position.
pub trait Shape {
    /// Signed distance at `pos`, already scaled for writing. Negative inside.
    fn sdf(&self, pos: Vec3) -> f32;

    /// Whether a discrete channel edit covers `pos`.
    fn is_inside(&self, pos: Vec3) -> bool {
        self.sdf(pos) <= 0.0
    }

    /// Depth of `pos` inside the shape, 0 on the surface and 1 at the core.
    ///
    /// Drives texture painting.
    fn paint_depth(&self, pos: Vec3) -> f32;
}

/// Box edited by a sphere: `floor(center) - floor(radius)` with side `2 * ceil(radius)`.
pub fn sphere_box(center: Vec3, radius: f32) -> Box3i {
    Box3i::new(
        floor_to_int(center) - IVec3::splat(radius.floor() as i32),
        IVec3::splat(radius.ceil() as i32 * 2),
    )
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SphereShape {
    pub center: Vec3,
    pub radius: f32,
    pub sdf_scale: f32,
}

impl Shape for SphereShape {
    #[inline]
    fn sdf(&self, pos: Vec3) -> f32 {
        self.sdf_scale * sdf_sphere(pos, self.center, self.radius)
    }

    #[inline]
    fn is_inside(&self, pos: Vec3) -> bool {
        pos.distance(self.center) <= self.radius
    }

    fn paint_depth(&self, pos: Vec3) -> f32 {
        1.0 - pos.distance(self.center) / self.radius
    }
}

/// Constant distance over a whole box.
///
/// Used by box edits, which fill their box with a far-inside distance rather
/// than the true distance to the box faces.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoxFill {
    pub value: f32,
}

impl Shape for BoxFill {
    #[inline]
    fn sdf(&self, _pos: Vec3) -> f32 {
        self.value
    }

    #[inline]
    fn is_inside(&self, _pos: Vec3) -> bool {
        true
    }

    fn paint_depth(&self, _pos: Vec3) -> f32 {
        1.0
    }
}

/// Capsule between two points with linearly interpolated radii.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RoundConeShape {
    pub a: Vec3,
    pub b: Vec3,
    pub radius_a: f32,
    pub radius_b: f32,
    pub sdf_scale: f32,
}

impl RoundConeShape {
    /// Integer box enclosing the cone.
    pub fn bounding_box(&self) -> Box3i {
        let ra = Vec3::splat(self.radius_a);
        let rb = Vec3::splat(self.radius_b);
        let min = (self.a - ra).min(self.b - rb);
        let max = (self.a + ra).max(self.b + rb);
        voxsculpt_core::Aabb::new(min, max).to_box3i()
    }
}

impl Shape for RoundConeShape {
    #[inline]
    fn sdf(&self, pos: Vec3) -> f32 {
        self.sdf_scale * sdf_round_cone(pos, self.a, self.b, self.radius_a, self.radius_b)
    }

    fn paint_depth(&self, pos: Vec3) -> f32 {
        let sd = sdf_round_cone(pos, self.a, self.b, self.radius_a, self.radius_b);
        -sd / self.radius_a.max(self.radius_b)
    }
}

/// Samples a baked 32-bit SDF buffer placed in the world by a transform.
#[derive(Clone, Copy, Debug)]
pub struct SdfBufferShape<'a> {
    pub world_to_buffer: Affine3A,
    pub buffer_size: IVec3,
    /// Raw SDF values, indexed like a voxel buffer.
    pub buffer: &'a [f32],
    pub isolevel: f32,
    pub sdf_scale: f32,
}

impl SdfBufferShape<'_> {
    #[inline]
    fn sample(&self, pos: IVec3) -> f32 {
        let p = pos.clamp(IVec3::ZERO, self.buffer_size - IVec3::ONE);
        let s = self.buffer_size;
        self.buffer[(p.y + s.y * (p.x + s.x * p.z)) as usize]
    }
}

impl Shape for SdfBufferShape<'_> {
    fn sdf(&self, pos: Vec3) -> f32 {
        let local = self.world_to_buffer.transform_point3(pos);
        let sd = get_sdf_interpolated(|p| self.sample(p), local);
        self.sdf_scale * (sd - self.isolevel)
    }

    fn paint_depth(&self, pos: Vec3) -> f32 {
        (-self.sdf(pos)).clamp(0.0, 1.0)
    }
}
