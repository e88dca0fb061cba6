//! Math utilities and signed distance helpers.

use glam::{Affine3A, IVec3, Vec3};

use crate::box3i::Box3i;

/// Axis-Aligned Bounding Box in real-valued voxel space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Aabb {
    /// Minimum corner
    pub min: Vec3,
    /// Maximum corner
    pub max: Vec3,
}

impl Aabb {
    /// Create a new AABB from min and max corners
    #[inline]
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Create an AABB from a position and a size
    #[inline]
    pub fn from_position_size(position: Vec3, size: Vec3) -> Self {
        Self {
            min: position,
            max: position + size,
        }
    }

    /// Get the size of the AABB
    #[inline]
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Get the center of the AABB
    #[inline]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Expand AABB to include a point
    #[inline]
    pub fn expand_to_include(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    /// Bounding box of this box after an affine transform.
    ///
    /// Conservative for rotated transforms.
    pub fn transformed(&self, transform: &Affine3A) -> Self {
        let corners = [
            Vec3::new(self.min.x, self.min.y, self.min.z),
            Vec3::new(self.max.x, self.min.y, self.min.z),
            Vec3::new(self.min.x, self.max.y, self.min.z),
            Vec3::new(self.max.x, self.max.y, self.min.z),
            Vec3::new(self.min.x, self.min.y, self.max.z),
            Vec3::new(self.max.x, self.min.y, self.max.z),
            Vec3::new(self.min.x, self.max.y, self.max.z),
            Vec3::new(self.max.x, self.max.y, self.max.z),
        ];
        let first = transform.transform_point3(corners[0]);
        let mut result = Self::new(first, first);
        for corner in &corners[1..] {
            result.expand_to_include(transform.transform_point3(*corner));
        }
        result
    }

    /// Smallest integer box containing this AABB (floor of min, ceil of max).
    #[inline]
    pub fn to_box3i(&self) -> Box3i {
        Box3i::from_min_max(floor_to_int(self.min), ceil_to_int(self.max))
    }
}

/// Component-wise floor to integer coordinates.
#[inline]
pub fn floor_to_int(v: Vec3) -> IVec3 {
    v.floor().as_ivec3()
}

/// Component-wise ceil to integer coordinates.
#[inline]
pub fn ceil_to_int(v: Vec3) -> IVec3 {
    v.ceil().as_ivec3()
}

/// Linear interpolation, exact at `t == 0`.
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Largest scale factor among the basis vectors of a transform.
#[inline]
pub fn largest_basis_scale(transform: &Affine3A) -> f32 {
    let m = transform.matrix3;
    m.x_axis.length().max(m.y_axis.length()).max(m.z_axis.length())
}

/// Signed distance from `pos` to a sphere.
#[inline]
pub fn sdf_sphere(pos: Vec3, center: Vec3, radius: f32) -> f32 {
    pos.distance(center) - radius
}

/// Signed distance from `pos` to a capsule between `a` and `b` with linearly
/// interpolated radii.
#[inline]
pub fn sdf_round_cone(pos: Vec3, a: Vec3, b: Vec3, radius_a: f32, radius_b: f32) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    let t = if len_sq > f32::EPSILON {
        ((pos - a).dot(ab) / len_sq).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let closest = a + ab * t;
    pos.distance(closest) - lerp(radius_a, radius_b, t)
}

/// Signed distance from `pos` to an axis-aligned box given by its center and half extents.
#[inline]
pub fn sdf_box(pos: Vec3, center: Vec3, half_extents: Vec3) -> f32 {
    let q = (pos - center).abs() - half_extents;
    q.max(Vec3::ZERO).length() + q.x.max(q.y.max(q.z)).min(0.0)
}

/// Trilinear interpolation of an integer-lattice sampler at a real position.
///
/// Reduces to a single sample when `pos` has integer coordinates.
pub fn get_sdf_interpolated<F>(sample: F, pos: Vec3) -> f32
where
    F: Fn(IVec3) -> f32,
{
    let c = floor_to_int(pos);
    let f = pos - c.as_vec3();

    let s000 = sample(c);
    let s100 = sample(c + IVec3::new(1, 0, 0));
    let s010 = sample(c + IVec3::new(0, 1, 0));
    let s110 = sample(c + IVec3::new(1, 1, 0));
    let s001 = sample(c + IVec3::new(0, 0, 1));
    let s101 = sample(c + IVec3::new(1, 0, 1));
    let s011 = sample(c + IVec3::new(0, 1, 1));
    let s111 = sample(c + IVec3::new(1, 1, 1));

    let x00 = lerp(s000, s100, f.x);
    let x10 = lerp(s010, s110, f.x);
    let x01 = lerp(s001, s101, f.x);
    let x11 = lerp(s011, s111, f.x);
    let y0 = lerp(x00, x10, f.y);
    let y1 = lerp(x01, x11, f.y);
    lerp(y0, y1, f.z)
}
