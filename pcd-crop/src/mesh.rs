/// Rays closer than this to a triangle's plane, or hits closer than this to
/// the origin, are ignored.
pub const EPSILON: f64 = 1e-9;

const UP: [f64; 3] = [0.0, 0.0, 1.0];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshFace {
    Triangle([usize; 3]),
    Quad([usize; 4]),
}

/// A closed solid used to crop point clouds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CropMesh {
    vertices: Vec<[f64; 3]>,
    faces: Vec<MeshFace>,
}

impl CropMesh {
    pub fn new(vertices: Vec<[f64; 3]>, faces: Vec<MeshFace>) -> Self {
        Self { vertices, faces }
    }

    pub fn vertices(&self) -> &[[f64; 3]] {
        &self.vertices
    }

    pub fn faces(&self) -> &[MeshFace] {
        &self.faces
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Joins several meshes into one, re-indexing faces.
    pub fn merge(meshes: &[CropMesh]) -> CropMesh {
        let mut merged = CropMesh::default();
        for mesh in meshes {
            let offset = merged.vertices.len();
            merged.vertices.extend_from_slice(&mesh.vertices);
            merged.faces.extend(mesh.faces.iter().map(|face| match face {
                MeshFace::Triangle(v) => MeshFace::Triangle(v.map(|i| i + offset)),
                MeshFace::Quad(v) => MeshFace::Quad(v.map(|i| i + offset)),
            }));
        }
        merged
    }

    /// Triangles of every face. Quads are split along their shorter diagonal.
    ///
    /// Faces that reference missing vertices are skipped.
    pub fn triangulate(&self) -> Vec<Triangle> {
        let mut triangles = Vec::with_capacity(self.faces.len() * 2);
        for face in &self.faces {
            match *face {
                MeshFace::Triangle(indices) => match self.corners(&indices) {
                    Some([a, b, c]) => triangles.push(Triangle::new(a, b, c)),
                    None => log::warn!("skipping triangle {:?}: vertex out of range", indices),
                },
                MeshFace::Quad(indices) => match self.corners(&indices) {
                    Some([a, b, c, d]) => {
                        if distance_squared(a, c) <= distance_squared(b, d) {
                            triangles.push(Triangle::new(a, b, c));
                            triangles.push(Triangle::new(a, c, d));
                        } else {
                            triangles.push(Triangle::new(a, b, d));
                            triangles.push(Triangle::new(b, c, d));
                        }
                    }
                    None => log::warn!("skipping quad {:?}: vertex out of range", indices),
                },
            }
        }
        triangles
    }

    fn corners<const N: usize>(&self, indices: &[usize; N]) -> Option<[[f64; 3]; N]> {
        let mut corners = [[0.0; 3]; N];
        for (corner, index) in corners.iter_mut().zip(indices) {
            *corner = *self.vertices.get(*index)?;
        }
        Some(corners)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub a: [f64; 3],
    pub b: [f64; 3],
    pub c: [f64; 3],
}

impl Triangle {
    pub fn new(a: [f64; 3], b: [f64; 3], c: [f64; 3]) -> Self {
        Self { a, b, c }
    }

    pub fn min(&self) -> [f64; 3] {
        [0, 1, 2].map(|i| self.a[i].min(self.b[i]).min(self.c[i]))
    }

    pub fn max(&self) -> [f64; 3] {
        [0, 1, 2].map(|i| self.a[i].max(self.b[i]).max(self.c[i]))
    }

    pub fn centroid(&self) -> [f64; 3] {
        [0, 1, 2].map(|i| (self.a[i] + self.b[i] + self.c[i]) / 3.0)
    }

    /// Möller–Trumbore test of the ray from `origin` along +Z.
    pub fn hit_by_up_ray(&self, origin: [f64; 3]) -> bool {
        let edge1 = sub(self.b, self.a);
        let edge2 = sub(self.c, self.a);
        let h = cross(UP, edge2);
        let det = dot(edge1, h);
        // Vertical faces are parallel to the ray.
        if det.abs() < EPSILON {
            return false;
        }

        let f = 1.0 / det;
        let s = sub(origin, self.a);
        let u = f * dot(s, h);
        if !(0.0..=1.0).contains(&u) {
            return false;
        }

        let q = cross(s, edge1);
        let v = f * dot(UP, q);
        if v < 0.0 || u + v > 1.0 {
            return false;
        }

        f * dot(edge2, q) > EPSILON
    }
}

fn sub(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

fn cross(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

fn distance_squared(a: [f64; 3], b: [f64; 3]) -> f64 {
    let d = sub(a, b);
    dot(d, d)
}
