//! Built-in element shapes
//!
//! - [`Triangle`]: a single triangle with optional per-vertex normals and UVs
//! - [`Cuboid`]: an axis-aligned box, the stand-in for a whole renderable
//!   object when per-triangle precision is not needed

use void_math::{
    aabb_face_normal, barycentric, interpolate_normal, interpolate_uv, ray_aabb, ray_triangle,
    Ray, Vec3, AABB,
};

use crate::element::Element;

/// Triangle element
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Triangle {
    /// Vertex positions. Counter-clockwise winding faces `(v1 - v0) x (v2 - v0)`.
    pub vertices: [Vec3; 3],
    /// Per-vertex normals; the face normal is used when absent
    pub normals: Option<[Vec3; 3]>,
    /// Per-vertex texture coordinates; barycentric (u, v) is used when absent
    pub uvs: Option<[[f32; 2]; 3]>,
    /// Ignore hits on the back face
    pub cull_backface: bool,
}

impl Triangle {
    /// Create a double-sided triangle with no vertex attributes
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3) -> Self {
        Self {
            vertices: [v0, v1, v2],
            normals: None,
            uvs: None,
            cull_backface: false,
        }
    }

    /// Attach per-vertex normals
    pub fn with_normals(mut self, normals: [Vec3; 3]) -> Self {
        self.normals = Some(normals);
        self
    }

    /// Attach per-vertex texture coordinates
    pub fn with_uvs(mut self, uvs: [[f32; 2]; 3]) -> Self {
        self.uvs = Some(uvs);
        self
    }

    /// Only report hits on the front face
    pub fn with_backface_culling(mut self) -> Self {
        self.cull_backface = true;
        self
    }

    /// Geometric normal from the winding order
    pub fn face_normal(&self) -> Vec3 {
        let [v0, v1, v2] = self.vertices;
        (v1 - v0).cross(v2 - v0).normalize()
    }

    fn weights(&self, point: Vec3) -> [f32; 3] {
        let [v0, v1, v2] = self.vertices;
        barycentric(point, v0, v1, v2)
    }
}

impl Element for Triangle {
    fn bounds(&self) -> AABB {
        AABB::from_points(&self.vertices)
    }

    fn ray_intersect(&self, ray: &Ray, max_distance: f32) -> Option<f32> {
        let [v0, v1, v2] = self.vertices;
        ray_triangle(ray, v0, v1, v2, self.cull_backface)
            .map(|hit| hit.distance)
            .filter(|&t| t < max_distance)
    }

    fn normal_at(&self, point: Vec3) -> Vec3 {
        match self.normals {
            Some([n0, n1, n2]) => interpolate_normal(n0, n1, n2, self.weights(point)),
            None => self.face_normal(),
        }
    }

    fn uv_at(&self, point: Vec3) -> [f32; 2] {
        let bary = self.weights(point);
        match self.uvs {
            Some([uv0, uv1, uv2]) => interpolate_uv(uv0, uv1, uv2, bary),
            None => [bary[1], bary[2]],
        }
    }
}

/// Axis-aligned box element
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cuboid {
    pub bounds: AABB,
}

impl Cuboid {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self {
            bounds: AABB::new(min, max),
        }
    }

    /// Box of edge lengths `size` centered on `center`
    pub fn from_center_size(center: Vec3, size: Vec3) -> Self {
        Self {
            bounds: AABB::from_center_half_extents(center, size * 0.5),
        }
    }

    /// The twelve outward-facing triangles of the box surface
    pub fn to_triangles(&self) -> Vec<Triangle> {
        let lo = self.bounds.min.to_array();
        let hi = self.bounds.max.to_array();
        let mut triangles = Vec::with_capacity(12);

        for axis in 0..3 {
            // (b, c) chosen so that e_b x e_c = +e_axis
            let (b, c) = ((axis + 1) % 3, (axis + 2) % 3);
            for positive in [false, true] {
                let plane = if positive { hi[axis] } else { lo[axis] };
                let corner = |sb: f32, sc: f32| {
                    let mut p = [0.0; 3];
                    p[axis] = plane;
                    p[b] = sb;
                    p[c] = sc;
                    Vec3::from_array(p)
                };
                let p00 = corner(lo[b], lo[c]);
                let p10 = corner(hi[b], lo[c]);
                let p11 = corner(hi[b], hi[c]);
                let p01 = corner(lo[b], hi[c]);

                if positive {
                    triangles.push(Triangle::new(p00, p10, p11));
                    triangles.push(Triangle::new(p00, p11, p01));
                } else {
                    triangles.push(Triangle::new(p00, p01, p11));
                    triangles.push(Triangle::new(p00, p11, p10));
                }
            }
        }

        triangles
    }
}

impl Element for Cuboid {
    fn bounds(&self) -> AABB {
        self.bounds
    }

    fn ray_intersect(&self, ray: &Ray, max_distance: f32) -> Option<f32> {
        ray_aabb(ray, &self.bounds).filter(|&t| t < max_distance)
    }

    fn normal_at(&self, point: Vec3) -> Vec3 {
        aabb_face_normal(&self.bounds, point)
    }

    /// Face-local coordinates in `[0, 1]^2` on the face nearest `point`
    fn uv_at(&self, point: Vec3) -> [f32; 2] {
        let normal = self.normal_at(point).abs();
        let axis = if normal.x > 0.5 {
            0
        } else if normal.y > 0.5 {
            1
        } else {
            2
        };
        let (b, c) = ((axis + 1) % 3, (axis + 2) % 3);
        let size = self.bounds.size();
        let local = |i: usize| {
            if size[i] > 0.0 {
                ((point[i] - self.bounds.min[i]) / size[i]).clamp(0.0, 1.0)
            } else {
                0.0
            }
        };
        [local(b), local(c)]
    }
}
