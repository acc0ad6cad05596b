//! # void_math - Spatial Math Primitives
//!
//! Small value types shared by the Void spatial crates: vectors,
//! axis-aligned bounding boxes, rays, and the leaf-level intersection
//! tests used by ray queries.

pub mod vector;
pub mod bounds;
pub mod ray;
pub mod intersect;

pub use vector::*;
pub use bounds::*;
pub use ray::*;
pub use intersect::*;

/// Common math constants
pub mod consts {
    /// Tolerance below which a determinant or length is treated as zero
    pub const EPSILON: f32 = 1e-7;
}

pub mod prelude {
    pub use crate::vector::Vec3;
    pub use crate::bounds::AABB;
    pub use crate::ray::Ray;
    pub use crate::intersect::{
        ray_aabb, ray_aabb_with_normal, aabb_face_normal, ray_triangle, barycentric,
        TriangleHit, interpolate_normal, interpolate_uv,
    };
}
