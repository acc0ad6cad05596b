//! Element contract for indexed geometry
//!
//! Anything placed in a [`RaycastIndex`](crate::RaycastIndex) implements
//! [`Element`]. The index stores whatever value it is handed, so callers
//! that keep ownership of their geometry add a handle (`&T`, `Arc<T>`,
//! `Rc<T>`) instead of the geometry itself.

use std::rc::Rc;
use std::sync::Arc;

use void_math::{Ray, Vec3, AABB};

/// Position of an element in the index's staging order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub(crate) usize);

impl ElementId {
    /// Zero-based position in the order elements were added
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Geometry that can be stored in a ray-query index.
///
/// Implementations must report bounds that contain every point
/// `ray_intersect` can return, and must not change shape after insertion.
pub trait Element {
    /// World-space bounds of the element
    fn bounds(&self) -> AABB;

    /// Distance along `ray` to the nearest intersection strictly closer than
    /// `max_distance`, or `None`. Degenerate cases are misses, not errors.
    fn ray_intersect(&self, ray: &Ray, max_distance: f32) -> Option<f32>;

    /// Unit surface normal at a point on the element
    fn normal_at(&self, point: Vec3) -> Vec3;

    /// Texture coordinates at a point on the element
    fn uv_at(&self, point: Vec3) -> [f32; 2];
}

macro_rules! forward_element {
    ($($ptr:ident),*) => {$(
        impl<T: Element + ?Sized> Element for $ptr<T> {
            #[inline]
            fn bounds(&self) -> AABB {
                (**self).bounds()
            }

            #[inline]
            fn ray_intersect(&self, ray: &Ray, max_distance: f32) -> Option<f32> {
                (**self).ray_intersect(ray, max_distance)
            }

            #[inline]
            fn normal_at(&self, point: Vec3) -> Vec3 {
                (**self).normal_at(point)
            }

            #[inline]
            fn uv_at(&self, point: Vec3) -> [f32; 2] {
                (**self).uv_at(point)
            }
        }
    )*};
}

forward_element!(Box, Arc, Rc);

impl<T: Element + ?Sized> Element for &T {
    #[inline]
    fn bounds(&self) -> AABB {
        (**self).bounds()
    }

    #[inline]
    fn ray_intersect(&self, ray: &Ray, max_distance: f32) -> Option<f32> {
        (**self).ray_intersect(ray, max_distance)
    }

    #[inline]
    fn normal_at(&self, point: Vec3) -> Vec3 {
        (**self).normal_at(point)
    }

    #[inline]
    fn uv_at(&self, point: Vec3) -> [f32; 2] {
        (**self).uv_at(point)
    }
}
