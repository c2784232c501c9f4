//! Triangle meshes
//!
//! Pure data: positions and normals in object space, triangles as index
//! triples into them. Rendering lives in `rasterizer::mesh`.

use serde::{Deserialize, Serialize};

use crate::cache::next_object_id;
use crate::rasterizer::Vec3;

/// A rendering triangle (indices into the mesh arrays)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Triangle {
    pub vertex: [usize; 3],
    pub normal: [usize; 3],
    /// Logical face this triangle belongs to (a quad yields two triangles)
    pub face: usize,
}

impl Triangle {
    pub fn new(vertex: [usize; 3], normal: [usize; 3], face: usize) -> Self {
        Self { vertex, normal, face }
    }
}

/// Indexed triangle mesh with an identity for derived-data caches
#[derive(Debug)]
pub struct TriMesh {
    vertices: Vec<Vec3>,
    normals: Vec<Vec3>,
    triangles: Vec<Triangle>,
    edges: Vec<[usize; 2]>,
    id: u64,
    generation: u64,
}

/// Clones get a fresh id
impl Clone for TriMesh {
    fn clone(&self) -> Self {
        Self {
            vertices: self.vertices.clone(),
            normals: self.normals.clone(),
            triangles: self.triangles.clone(),
            edges: self.edges.clone(),
            id: next_object_id(),
            generation: 0,
        }
    }
}

impl Default for TriMesh {
    fn default() -> Self {
        Self::new()
    }
}

impl TriMesh {
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            normals: Vec::new(),
            triangles: Vec::new(),
            edges: Vec::new(),
            id: next_object_id(),
            generation: 0,
        }
    }

    /// Assert every index is in range
    fn validate(&self) {
        for (t, tri) in self.triangles.iter().enumerate() {
            for &v in &tri.vertex {
                assert!(v < self.vertices.len(), "triangle {} vertex index {} out of range", t, v);
            }
            for &n in &tri.normal {
                assert!(n < self.normals.len(), "triangle {} normal index {} out of range", t, n);
            }
        }
        for &[a, b] in &self.edges {
            assert!(a < self.vertices.len() && b < self.vertices.len(), "edge ({}, {}) out of range", a, b);
        }
    }

    /// Add a vertex and return its index
    pub fn add_vertex(&mut self, p: Vec3) -> usize {
        self.vertices.push(p);
        self.generation += 1;
        self.vertices.len() - 1
    }

    /// Add a normal and return its index
    pub fn add_normal(&mut self, n: Vec3) -> usize {
        self.normals.push(n.normalize());
        self.generation += 1;
        self.normals.len() - 1
    }

    /// Add a triangle; panics on out-of-range indices
    pub fn add_triangle(&mut self, vertex: [usize; 3], normal: [usize; 3], face: usize) -> usize {
        let tri = Triangle::new(vertex, normal, face);
        for &v in &vertex {
            assert!(v < self.vertices.len(), "vertex index {} out of range", v);
        }
        for &n in &normal {
            assert!(n < self.normals.len(), "normal index {} out of range", n);
        }
        self.triangles.push(tri);
        self.generation += 1;
        self.triangles.len() - 1
    }

    /// Add a quad (v0, v1, v2, v3) as two triangles sharing `face` and one normal
    pub fn add_quad(&mut self, v: [usize; 4], normal: usize, face: usize) {
        self.add_triangle([v[0], v[1], v[2]], [normal; 3], face);
        self.add_triangle([v[0], v[2], v[3]], [normal; 3], face);
    }

    /// Move a vertex
    pub fn set_vertex(&mut self, index: usize, p: Vec3) {
        self.vertices[index] = p;
        self.generation += 1;
    }

    /// Replace the explicit wireframe edge list
    pub fn set_edges(&mut self, edges: Vec<[usize; 2]>) {
        self.edges = edges;
        self.generation += 1;
        self.validate();
    }

    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Bumped on every mutation
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Number of logical faces (highest face index + 1)
    pub fn face_count(&self) -> usize {
        self.triangles.iter().map(|t| t.face + 1).max().unwrap_or(0)
    }

    /// Explicit edges, or the unique triangle edges when none were set
    pub fn edges(&self) -> Vec<[usize; 2]> {
        if !self.edges.is_empty() {
            return self.edges.clone();
        }
        let mut seen = std::collections::HashSet::new();
        let mut out = Vec::new();
        for tri in &self.triangles {
            for i in 0..3 {
                let a = tri.vertex[i];
                let b = tri.vertex[(i + 1) % 3];
                let key = if a < b { (a, b) } else { (b, a) };
                if seen.insert(key) {
                    out.push([a, b]);
                }
            }
        }
        out
    }

    /// Unit geometric normal `(p1 - p0) x (p2 - p0)` in object space
    pub fn triangle_normal(&self, t: usize) -> Vec3 {
        let [a, b, c] = self.triangles[t].vertex;
        let (p0, p1, p2) = (self.vertices[a], self.vertices[b], self.vertices[c]);
        (p1 - p0).cross(p2 - p0).normalize()
    }
}

/// Closed unit cube (side 2, centered on the origin) with one face per side.
/// Faces wind clockwise when seen from outside with y up, which is the
/// front-facing order on screen.
pub fn create_test_cube() -> TriMesh {
    let mut mesh = TriMesh::new();

    let positions = [
        // Front face (+z)
        Vec3::new(-1.0, -1.0, 1.0),
        Vec3::new(1.0, -1.0, 1.0),
        Vec3::new(1.0, 1.0, 1.0),
        Vec3::new(-1.0, 1.0, 1.0),
        // Back face (-z)
        Vec3::new(-1.0, -1.0, -1.0),
        Vec3::new(-1.0, 1.0, -1.0),
        Vec3::new(1.0, 1.0, -1.0),
        Vec3::new(1.0, -1.0, -1.0),
        // Top face
        Vec3::new(-1.0, 1.0, -1.0),
        Vec3::new(-1.0, 1.0, 1.0),
        Vec3::new(1.0, 1.0, 1.0),
        Vec3::new(1.0, 1.0, -1.0),
        // Bottom face
        Vec3::new(-1.0, -1.0, -1.0),
        Vec3::new(1.0, -1.0, -1.0),
        Vec3::new(1.0, -1.0, 1.0),
        Vec3::new(-1.0, -1.0, 1.0),
        // Right face
        Vec3::new(1.0, -1.0, -1.0),
        Vec3::new(1.0, 1.0, -1.0),
        Vec3::new(1.0, 1.0, 1.0),
        Vec3::new(1.0, -1.0, 1.0),
        // Left face
        Vec3::new(-1.0, -1.0, -1.0),
        Vec3::new(-1.0, -1.0, 1.0),
        Vec3::new(-1.0, 1.0, 1.0),
        Vec3::new(-1.0, 1.0, -1.0),
    ];

    let normals = [
        Vec3::new(0.0, 0.0, 1.0),  // Front
        Vec3::new(0.0, 0.0, -1.0), // Back
        Vec3::new(0.0, 1.0, 0.0),  // Top
        Vec3::new(0.0, -1.0, 0.0), // Bottom
        Vec3::new(1.0, 0.0, 0.0),  // Right
        Vec3::new(-1.0, 0.0, 0.0), // Left
    ];

    for p in positions {
        mesh.add_vertex(p);
    }

    for (face, normal) in normals.iter().enumerate() {
        let n = mesh.add_normal(*normal);
        let base = face * 4;
        mesh.add_quad([base, base + 1, base + 2, base + 3], n, face);
    }

    mesh
}

/// Flat `cols` x `rows` grid in the XZ plane at y = 0, one face per cell
pub fn create_grid(cols: usize, rows: usize, spacing: f32) -> TriMesh {
    let mut mesh = TriMesh::new();
    let n = mesh.add_normal(Vec3::UP);
    let half_w = cols as f32 * spacing * 0.5;
    let half_d = rows as f32 * spacing * 0.5;

    for r in 0..=rows {
        for c in 0..=cols {
            mesh.add_vertex(Vec3::new(c as f32 * spacing - half_w, 0.0, r as f32 * spacing - half_d));
        }
    }

    let stride = cols + 1;
    for r in 0..rows {
        for c in 0..cols {
            let i = r * stride + c;
            // Clockwise seen from above (+y)
            mesh.add_quad([i, i + stride, i + stride + 1, i + 1], n, r * cols + c);
        }
    }

    mesh
}
