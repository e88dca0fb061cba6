//! Axis-aligned integer boxes over voxel coordinates.

use glam::IVec3;
use serde::{Deserialize, Serialize};

/// Axis-aligned box of voxel cells.
///
/// `position` is the minimum corner (inclusive) and `size` the number of cells
/// per axis. A zero component in `size` makes the box empty.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Box3i {
    pub position: IVec3,
    pub size: IVec3,
}

impl Box3i {
    /// Create a box from its minimum corner and size.
    #[inline]
    pub const fn new(position: IVec3, size: IVec3) -> Self {
        Self { position, size }
    }

    /// Create a box from a minimum corner (inclusive) and maximum corner (exclusive).
    ///
    /// Inverted corners produce an empty box.
    #[inline]
    pub fn from_min_max(min: IVec3, max: IVec3) -> Self {
        Self {
            position: min,
            size: (max - min).max(IVec3::ZERO),
        }
    }

    /// Create a box spanning `center - extents` to `center + extents`, both inclusive.
    #[inline]
    pub fn from_center_extents(center: IVec3, extents: IVec3) -> Self {
        Self::from_min_max(center - extents, center + extents + IVec3::ONE)
    }

    /// Unit box covering a single voxel.
    #[inline]
    pub fn unit(pos: IVec3) -> Self {
        Self::new(pos, IVec3::ONE)
    }

    /// Minimum corner, inclusive.
    #[inline]
    pub const fn min_pos(&self) -> IVec3 {
        self.position
    }

    /// Maximum corner, exclusive.
    #[inline]
    pub fn max_pos(&self) -> IVec3 {
        self.position + self.size
    }

    /// Returns true when the box holds no cell.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.size.x <= 0 || self.size.y <= 0 || self.size.z <= 0
    }

    /// Number of cells in the box.
    #[inline]
    pub fn volume(&self) -> usize {
        if self.is_empty() {
            return 0;
        }
        self.size.x as usize * self.size.y as usize * self.size.z as usize
    }

    /// Check if a cell is inside the box.
    #[inline]
    pub fn contains_point(&self, p: IVec3) -> bool {
        let max = self.max_pos();
        p.x >= self.position.x
            && p.y >= self.position.y
            && p.z >= self.position.z
            && p.x < max.x
            && p.y < max.y
            && p.z < max.z
    }

    /// Check if another box is entirely inside this one.
    ///
    /// An empty box is contained as long as its position is inside the bounds.
    #[inline]
    pub fn contains(&self, other: &Self) -> bool {
        let min = other.position;
        let max = other.max_pos();
        min.cmpge(self.position).all() && max.cmple(self.max_pos()).all()
    }

    /// Check if this box shares at least one cell with another.
    #[inline]
    pub fn intersects(&self, other: &Self) -> bool {
        !self.clipped(other).is_empty()
    }

    /// Intersection of two boxes. Disjoint boxes produce an empty box.
    #[inline]
    pub fn clipped(&self, other: &Self) -> Self {
        let min = self.position.max(other.position);
        let max = self.max_pos().min(other.max_pos());
        Self::from_min_max(min, max.max(min))
    }

    /// Clip this box in place.
    #[inline]
    pub fn clip(&mut self, other: &Self) {
        *self = self.clipped(other);
    }

    /// Grow the box by `margin` cells on every side.
    #[inline]
    pub fn padded(&self, margin: i32) -> Self {
        Self::from_min_max(
            self.position - IVec3::splat(margin),
            self.max_pos() + IVec3::splat(margin),
        )
    }

    /// Smallest box enclosing both boxes.
    #[inline]
    pub fn merged(&self, other: &Self) -> Self {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        Self::from_min_max(
            self.position.min(other.position),
            self.max_pos().max(other.max_pos()),
        )
    }

    /// Range of blocks of size `1 << step_po2` covering this box.
    ///
    /// Uses arithmetic shifts, so negative coordinates round toward negative infinity.
    #[inline]
    pub fn downscaled(&self, step_po2: u32) -> Self {
        let min = self.position >> IVec3::splat(step_po2 as i32);
        let max_inclusive = (self.max_pos() - IVec3::ONE) >> IVec3::splat(step_po2 as i32);
        if self.is_empty() {
            return Self::new(min, IVec3::ZERO);
        }
        Self::from_min_max(min, max_inclusive + IVec3::ONE)
    }

    /// Iterate over every cell in canonical order (z outer, x middle, y inner).
    #[inline]
    pub fn cells(&self) -> Box3iCells {
        Box3iCells::new(*self)
    }

    /// Call `f` for every cell in canonical order (z outer, x middle, y inner).
    ///
    /// Every edit goes through this order so results are reproducible.
    #[inline]
    pub fn for_each_cell<F>(&self, mut f: F)
    where
        F: FnMut(IVec3),
    {
        if self.is_empty() {
            return;
        }
        let min = self.position;
        let max = self.max_pos();
        for z in min.z..max.z {
            for x in min.x..max.x {
                for y in min.y..max.y {
                    f(IVec3::new(x, y, z));
                }
            }
        }
    }
}

/// Iterator over the cells of a [`Box3i`] in canonical order.
#[derive(Clone, Debug)]
pub struct Box3iCells {
    min: IVec3,
    max: IVec3,
    next: Option<IVec3>,
}

impl Box3iCells {
    fn new(b: Box3i) -> Self {
        Self {
            min: b.position,
            max: b.max_pos(),
            next: (!b.is_empty()).then_some(b.position),
        }
    }
}

impl Iterator for Box3iCells {
    type Item = IVec3;

    fn next(&mut self) -> Option<IVec3> {
        let current = self.next?;
        let mut n = current;
        n.y += 1;
        if n.y >= self.max.y {
            n.y = self.min.y;
            n.x += 1;
            if n.x >= self.max.x {
                n.x = self.min.x;
                n.z += 1;
            }
        }
        self.next = (n.z < self.max.z).then_some(n);
        Some(current)
    }
}
