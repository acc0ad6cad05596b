//! Intersection tests for raycasting
//!
//! Leaf-level ray tests used by spatial queries:
//! - AABB (slab method, plus face normal lookup)
//! - Triangle (Möller-Trumbore algorithm)
//! - Barycentric weights and attribute interpolation

use crate::bounds::AABB;
use crate::consts::EPSILON;
use crate::ray::Ray;
use crate::vector::Vec3;

/// Result of a ray-triangle intersection
#[derive(Clone, Copy, Debug)]
pub struct TriangleHit {
    /// Distance along ray to hit point
    pub distance: f32,
    /// Barycentric coordinates [w, u, v] where w = 1 - u - v
    pub barycentric: [f32; 3],
}

/// Ray-AABB intersection using the slab method
///
/// Returns the distance to the first boundary crossing in front of the
/// origin. When the origin is inside the box that is the exit point.
/// Degenerate rays and the empty box never intersect.
pub fn ray_aabb(ray: &Ray, aabb: &AABB) -> Option<f32> {
    if aabb.is_empty() || !ray.is_valid() {
        return None;
    }

    let inv_dir = ray.inverse_direction();
    let mut t_min = f32::NEG_INFINITY;
    let mut t_max = f32::INFINITY;

    for axis in 0..3 {
        let o = ray.origin[axis];
        let inv = inv_dir[axis];
        if inv.is_infinite() {
            if o < aabb.min[axis] || o > aabb.max[axis] {
                return None;
            }
            continue;
        }
        let t0 = (aabb.min[axis] - o) * inv;
        let t1 = (aabb.max[axis] - o) * inv;
        t_min = t_min.max(t0.min(t1));
        t_max = t_max.min(t0.max(t1));
    }

    // Behind the origin, or the slabs never overlap
    if t_max < 0.0 || t_min > t_max {
        None
    } else {
        Some(if t_min < 0.0 { t_max } else { t_min })
    }
}

/// Outward normal of the box face closest to `point`
pub fn aabb_face_normal(aabb: &AABB, point: Vec3) -> Vec3 {
    let candidates = [
        ((point.x - aabb.min.x).abs(), Vec3::NEG_X),
        ((point.x - aabb.max.x).abs(), Vec3::X),
        ((point.y - aabb.min.y).abs(), Vec3::NEG_Y),
        ((point.y - aabb.max.y).abs(), Vec3::Y),
        ((point.z - aabb.min.z).abs(), Vec3::NEG_Z),
        ((point.z - aabb.max.z).abs(), Vec3::Z),
    ];

    let mut best = candidates[0];
    for candidate in &candidates[1..] {
        if candidate.0 < best.0 {
            best = *candidate;
        }
    }
    best.1
}

/// Ray-AABB intersection with normal
///
/// Returns (distance, outward normal of the face hit) or None.
pub fn ray_aabb_with_normal(ray: &Ray, aabb: &AABB) -> Option<(f32, Vec3)> {
    let t = ray_aabb(ray, aabb)?;
    Some((t, aabb_face_normal(aabb, ray.at(t))))
}

/// Ray-Triangle intersection using Möller-Trumbore algorithm
///
/// Returns the distance and barycentric coordinates, or None if the ray is
/// parallel to the triangle (near-zero determinant), misses it, or hits it
/// behind the origin.
///
/// # Arguments
/// * `ray` - The ray to test
/// * `v0`, `v1`, `v2` - Triangle vertices
/// * `cull_backface` - If true, only front-facing triangles are hit
pub fn ray_triangle(
    ray: &Ray,
    v0: Vec3,
    v1: Vec3,
    v2: Vec3,
    cull_backface: bool,
) -> Option<TriangleHit> {
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;
    let h = ray.direction.cross(edge2);
    let a = edge1.dot(h);

    if a.abs() < EPSILON {
        return None;
    }

    if cull_backface && a < 0.0 {
        return None;
    }

    let f = 1.0 / a;
    let s = ray.origin - v0;
    let u = f * s.dot(h);

    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = f * ray.direction.dot(q);

    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = f * edge2.dot(q);

    if t > EPSILON {
        Some(TriangleHit {
            distance: t,
            barycentric: [1.0 - u - v, u, v],
        })
    } else {
        None
    }
}

/// Barycentric weights [w, u, v] of `point` projected onto the triangle's plane
///
/// Degenerate triangles report all weight on `v0`.
pub fn barycentric(point: Vec3, v0: Vec3, v1: Vec3, v2: Vec3) -> [f32; 3] {
    let e0 = v1 - v0;
    let e1 = v2 - v0;
    let p = point - v0;

    let d00 = e0.dot(e0);
    let d01 = e0.dot(e1);
    let d11 = e1.dot(e1);
    let d20 = p.dot(e0);
    let d21 = p.dot(e1);

    let denom = d00 * d11 - d01 * d01;
    if denom.abs() < EPSILON {
        return [1.0, 0.0, 0.0];
    }

    let u = (d11 * d20 - d01 * d21) / denom;
    let v = (d00 * d21 - d01 * d20) / denom;
    [1.0 - u - v, u, v]
}

/// Calculate interpolated normal from barycentric coordinates
pub fn interpolate_normal(n0: Vec3, n1: Vec3, n2: Vec3, bary: [f32; 3]) -> Vec3 {
    (n0 * bary[0] + n1 * bary[1] + n2 * bary[2]).normalize()
}

/// Calculate interpolated UV from barycentric coordinates
pub fn interpolate_uv(uv0: [f32; 2], uv1: [f32; 2], uv2: [f32; 2], bary: [f32; 3]) -> [f32; 2] {
    [
        uv0[0] * bary[0] + uv1[0] * bary[1] + uv2[0] * bary[2],
        uv0[1] * bary[0] + uv1[1] * bary[1] + uv2[1] * bary[2],
    ]
}
