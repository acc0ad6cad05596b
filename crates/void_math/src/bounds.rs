//! Axis-aligned bounding boxes for spatial queries

use crate::vector::Vec3;

/// Axis-Aligned Bounding Box
///
/// A box derived from real geometry always has `min <= max` componentwise.
/// The only box that breaks this is [`AABB::EMPTY`], the sentinel for
/// "no content yet"; it is the identity of [`AABB::union`] and is detected
/// by [`AABB::is_empty`].
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AABB {
    pub min: Vec3,
    pub max: Vec3,
}

impl AABB {
    /// The empty sentinel box. Contains nothing, intersects nothing.
    pub const EMPTY: Self = Self {
        min: Vec3::splat(f32::MAX),
        max: Vec3::splat(f32::MIN),
    };

    /// Create from min and max points
    #[inline]
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Create from center and half-extents
    #[inline]
    pub fn from_center_half_extents(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    /// Smallest box containing every point; `EMPTY` for no points
    pub fn from_points(points: &[Vec3]) -> Self {
        points
            .iter()
            .fold(Self::EMPTY, |acc, &p| acc.expand_to_include(p))
    }

    /// Whether this is the empty sentinel (or any inverted box)
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    #[inline]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    #[inline]
    pub fn size(&self) -> Vec3 {
        if self.is_empty() {
            Vec3::ZERO
        } else {
            self.max - self.min
        }
    }

    #[inline]
    pub fn volume(&self) -> f32 {
        let size = self.size();
        size.x * size.y * size.z
    }

    /// Surface area; zero for the empty box
    #[inline]
    pub fn surface_area(&self) -> f32 {
        let size = self.size();
        2.0 * (size.x * size.y + size.y * size.z + size.z * size.x)
    }

    /// Componentwise min of mins and max of maxes
    #[inline]
    pub fn union(&self, other: &AABB) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// In-place [`union`](Self::union)
    #[inline]
    pub fn grow_to_include(&mut self, other: &AABB) {
        *self = self.union(other);
    }

    /// Expand to include a point
    #[inline]
    pub fn expand_to_include(self, point: Vec3) -> Self {
        Self {
            min: self.min.min(point),
            max: self.max.max(point),
        }
    }

    /// How much the surface area would grow if `other` were merged in
    #[inline]
    pub fn growth(&self, other: &AABB) -> f32 {
        self.union(other).surface_area() - self.surface_area()
    }

    #[inline]
    pub fn contains_point(&self, point: Vec3) -> bool {
        point.x >= self.min.x && point.x <= self.max.x &&
        point.y >= self.min.y && point.y <= self.max.y &&
        point.z >= self.min.z && point.z <= self.max.z
    }

    /// Whether `other` lies entirely inside. Every box contains `EMPTY`.
    #[inline]
    pub fn contains_aabb(&self, other: &AABB) -> bool {
        other.is_empty() || (self.contains_point(other.min) && self.contains_point(other.max))
    }

    #[inline]
    pub fn intersects(&self, other: &AABB) -> bool {
        self.min.x <= other.max.x && self.max.x >= other.min.x &&
        self.min.y <= other.max.y && self.max.y >= other.min.y &&
        self.min.z <= other.max.z && self.max.z >= other.min.z
    }

    /// Ray-slab test against the parametric range `[0, max_distance]`.
    ///
    /// `inv_direction` is the componentwise reciprocal of the ray direction
    /// (see [`crate::Ray::inverse_direction`]). Returns the distance at which
    /// the ray enters the box, clamped to zero when the origin is inside, or
    /// `None` when the ray cannot touch the box within range.
    pub fn ray_slab(&self, origin: Vec3, inv_direction: Vec3, max_distance: f32) -> Option<f32> {
        if self.is_empty() {
            return None;
        }

        let mut t_near = 0.0_f32;
        let mut t_far = max_distance;

        for axis in 0..3 {
            let o = origin[axis];
            let inv = inv_direction[axis];
            let (lo, hi) = (self.min[axis], self.max[axis]);

            if inv.is_infinite() {
                // Parallel to this slab: inside it or never.
                if o < lo || o > hi {
                    return None;
                }
                continue;
            }

            let t0 = (lo - o) * inv;
            let t1 = (hi - o) * inv;
            t_near = t_near.max(t0.min(t1));
            t_far = t_far.min(t0.max(t1));

            if t_near > t_far {
                return None;
            }
        }

        Some(t_near)
    }
}

impl Default for AABB {
    fn default() -> Self {
        Self::EMPTY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit() -> AABB {
        AABB::new(Vec3::ZERO, Vec3::ONE)
    }

    #[test]
    fn test_empty_is_union_identity() {
        let a = unit();
        assert!(AABB::EMPTY.is_empty());
        assert_eq!(AABB::EMPTY.union(&a), a);
        assert_eq!(a.union(&AABB::EMPTY), a);
        assert_eq!(AABB::EMPTY.surface_area(), 0.0);
        assert_eq!(AABB::from_points(&[]), AABB::EMPTY);
    }

    #[test]
    fn test_union_and_grow() {
        let mut a = unit();
        let b = AABB::new(Vec3::new(2.0, -1.0, 0.5), Vec3::new(3.0, 0.0, 4.0));
        let u = a.union(&b);
        assert_eq!(u.min, Vec3::new(0.0, -1.0, 0.0));
        assert_eq!(u.max, Vec3::new(3.0, 1.0, 4.0));

        a.grow_to_include(&b);
        assert_eq!(a, u);
        assert!(u.contains_aabb(&b));
        assert!(u.contains_aabb(&AABB::EMPTY));
    }

    #[test]
    fn test_growth_is_zero_for_contained_box() {
        let big = AABB::new(Vec3::splat(-5.0), Vec3::splat(5.0));
        assert_eq!(big.growth(&unit()), 0.0);
        assert!(unit().growth(&big) > 0.0);
    }

    #[test]
    fn test_ray_slab_hit_and_range() {
        let aabb = AABB::new(Vec3::new(-1.0, -1.0, 5.0), Vec3::new(1.0, 1.0, 7.0));
        let inv = Vec3::Z.recip();

        let t = aabb.ray_slab(Vec3::ZERO, inv, 100.0);
        assert!((t.unwrap() - 5.0).abs() < 1e-5);

        // Box starts beyond the allowed range
        assert!(aabb.ray_slab(Vec3::ZERO, inv, 4.0).is_none());
    }

    #[test]
    fn test_ray_slab_origin_inside() {
        let aabb = AABB::new(Vec3::splat(-1.0), Vec3::splat(1.0));
        assert_eq!(aabb.ray_slab(Vec3::ZERO, Vec3::X.recip(), 10.0), Some(0.0));
    }

    #[test]
    fn test_ray_slab_behind_and_parallel_miss() {
        let aabb = unit();
        let inv = Vec3::Z.recip();
        assert!(aabb.ray_slab(Vec3::new(0.5, 0.5, 10.0), inv, 100.0).is_none());
        assert!(aabb.ray_slab(Vec3::new(2.0, 0.5, -1.0), inv, 100.0).is_none());
    }

    #[test]
    fn test_ray_slab_on_face_plane_counts_as_inside() {
        let aabb = unit();
        let t = aabb.ray_slab(Vec3::new(-1.0, 0.0, 0.0), Vec3::X.recip(), 10.0);
        assert!((t.unwrap() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_ray_slab_rejects_empty() {
        assert!(AABB::EMPTY.ray_slab(Vec3::ZERO, Vec3::X.recip(), f32::MAX).is_none());
    }
}
