// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mesh data structures and transforms

use nalgebra::{Matrix4, Point3, Vector3};

/// Axis-aligned bounding box, derived from mesh positions.
///
/// Never stored on the mesh: recompute after every vertex-affecting
/// transform via [`Mesh::bounds`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Point3<f32>,
    pub max: Point3<f32>,
}

impl BoundingBox {
    /// Center of the box in the XY plane
    #[inline]
    pub fn center_xy(&self) -> (f32, f32) {
        (
            (self.max.x + self.min.x) / 2.0,
            (self.max.y + self.min.y) / 2.0,
        )
    }

    /// Extent along each axis
    #[inline]
    pub fn size(&self) -> Vector3<f32> {
        self.max - self.min
    }
}

/// Triangle mesh
///
/// Stored as flat f32 arrays with u32 indices. A triangle-soup mesh
/// (as produced by STL parsing or CSG re-import) simply has indices
/// `3t, 3t+1, 3t+2` for triangle `t`.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    /// Vertex positions (x, y, z)
    pub positions: Vec<f32>,
    /// Vertex normals (nx, ny, nz)
    pub normals: Vec<f32>,
    /// Triangle indices (i0, i1, i2)
    pub indices: Vec<u32>,
}

/// A mesh tagged with a display name and color.
///
/// Carries the attribution the assembly stage decides on (body color
/// for the carved shank, the symbol's color for each legend) through
/// to export.
#[derive(Debug, Clone)]
pub struct NamedMesh {
    /// Display name, used for object naming in exported packages
    pub name: String,
    /// Packed 0xRRGGBB color
    pub color: u32,
    /// The mesh data
    pub mesh: Mesh,
}

impl NamedMesh {
    pub fn new(name: impl Into<String>, color: u32, mesh: Mesh) -> Self {
        Self {
            name: name.into(),
            color,
            mesh,
        }
    }
}

/// An assembled keycap: one body mesh plus zero or more legend meshes,
/// in deterministic order (body first, legends in input-symbol order).
#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub meshes: Vec<NamedMesh>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, mesh: NamedMesh) {
        self.meshes.push(mesh);
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NamedMesh> {
        self.meshes.iter()
    }
}

impl Mesh {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mesh with capacity
    pub fn with_capacity(vertex_count: usize, index_count: usize) -> Self {
        Self {
            positions: Vec::with_capacity(vertex_count * 3),
            normals: Vec::with_capacity(vertex_count * 3),
            indices: Vec::with_capacity(index_count),
        }
    }

    /// Add a vertex with normal
    #[inline]
    pub fn add_vertex(&mut self, position: Point3<f64>, normal: Vector3<f64>) {
        self.positions.push(position.x as f32);
        self.positions.push(position.y as f32);
        self.positions.push(position.z as f32);

        self.normals.push(normal.x as f32);
        self.normals.push(normal.y as f32);
        self.normals.push(normal.z as f32);
    }

    /// Add a triangle
    #[inline]
    pub fn add_triangle(&mut self, i0: u32, i1: u32, i2: u32) {
        self.indices.push(i0);
        self.indices.push(i1);
        self.indices.push(i2);
    }

    /// Get vertex position as a Point3
    #[inline]
    pub fn position(&self, vertex: usize) -> Point3<f64> {
        Point3::new(
            self.positions[vertex * 3] as f64,
            self.positions[vertex * 3 + 1] as f64,
            self.positions[vertex * 3 + 2] as f64,
        )
    }

    /// Merge another mesh into this one
    #[inline]
    pub fn merge(&mut self, other: &Mesh) {
        if other.is_empty() {
            return;
        }

        let vertex_offset = (self.positions.len() / 3) as u32;

        self.positions.reserve(other.positions.len());
        self.normals.reserve(other.normals.len());
        self.indices.reserve(other.indices.len());

        self.positions.extend_from_slice(&other.positions);
        self.normals.extend_from_slice(&other.normals);
        self.indices
            .extend(other.indices.iter().map(|&i| i + vertex_offset));
    }

    /// Get vertex count
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    /// Get triangle count
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Check if mesh is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty() || self.indices.is_empty()
    }

    /// Calculate the bounding box
    ///
    /// Returns `None` for an empty mesh so callers cannot mistake a
    /// degenerate box at the origin for real geometry.
    #[inline]
    pub fn bounds(&self) -> Option<BoundingBox> {
        if self.positions.is_empty() {
            return None;
        }

        let mut min = Point3::new(f32::MAX, f32::MAX, f32::MAX);
        let mut max = Point3::new(f32::MIN, f32::MIN, f32::MIN);

        self.positions.chunks_exact(3).for_each(|chunk| {
            let (x, y, z) = (chunk[0], chunk[1], chunk[2]);
            min.x = min.x.min(x);
            min.y = min.y.min(y);
            min.z = min.z.min(z);
            max.x = max.x.max(x);
            max.y = max.y.max(y);
            max.z = max.z.max(z);
        });

        Some(BoundingBox { min, max })
    }

    /// Translate all vertices by (dx, dy, dz)
    #[inline]
    pub fn translate(&mut self, dx: f64, dy: f64, dz: f64) {
        self.positions.chunks_exact_mut(3).for_each(|chunk| {
            chunk[0] = (chunk[0] as f64 + dx) as f32;
            chunk[1] = (chunk[1] as f64 + dy) as f32;
            chunk[2] = (chunk[2] as f64 + dz) as f32;
        });
    }

    /// Apply a transformation matrix to positions and normals
    ///
    /// Positions go through the full matrix; normals through the
    /// inverse-transpose (and are re-normalized).
    pub fn apply_transform(&mut self, transform: &Matrix4<f64>) {
        self.positions.chunks_exact_mut(3).for_each(|chunk| {
            let point = Point3::new(chunk[0] as f64, chunk[1] as f64, chunk[2] as f64);
            let transformed = transform.transform_point(&point);
            chunk[0] = transformed.x as f32;
            chunk[1] = transformed.y as f32;
            chunk[2] = transformed.z as f32;
        });

        let normal_matrix = transform.try_inverse().unwrap_or(*transform).transpose();

        self.normals.chunks_exact_mut(3).for_each(|chunk| {
            let normal = Vector3::new(chunk[0] as f64, chunk[1] as f64, chunk[2] as f64);
            let transformed = (normal_matrix * normal.to_homogeneous()).xyz();
            if let Some(n) = transformed.try_normalize(1e-12) {
                chunk[0] = n.x as f32;
                chunk[1] = n.y as f32;
                chunk[2] = n.z as f32;
            }
        });
    }

    /// Rotate about the X axis (radians)
    #[inline]
    pub fn rotate_x(&mut self, angle: f64) {
        self.apply_transform(&Matrix4::from_axis_angle(&Vector3::x_axis(), angle));
    }

    /// Rotate about the Y axis (radians)
    #[inline]
    pub fn rotate_y(&mut self, angle: f64) {
        self.apply_transform(&Matrix4::from_axis_angle(&Vector3::y_axis(), angle));
    }

    /// Rotate about the Z axis (radians)
    #[inline]
    pub fn rotate_z(&mut self, angle: f64) {
        self.apply_transform(&Matrix4::from_axis_angle(&Vector3::z_axis(), angle));
    }

    /// Translate so the XY center of the bounding box sits at the origin.
    /// Z is untouched.
    pub fn center_xy(&mut self) {
        if let Some(bb) = self.bounds() {
            let (cx, cy) = bb.center_xy();
            self.translate(-(cx as f64), -(cy as f64), 0.0);
        }
    }

    /// Translate vertically so the minimum Z equals `target_z`
    pub fn align_bottom_to(&mut self, target_z: f64) {
        if let Some(bb) = self.bounds() {
            self.translate(0.0, 0.0, target_z - bb.min.z as f64);
        }
    }

    /// Signed volume via the divergence theorem
    ///
    /// Positive for a closed, outward-wound mesh. Used as a sanity
    /// check on boolean results.
    pub fn signed_volume(&self) -> f64 {
        let mut volume = 0.0;
        for tri in self.indices.chunks_exact(3) {
            let v0 = self.position(tri[0] as usize).coords;
            let v1 = self.position(tri[1] as usize).coords;
            let v2 = self.position(tri[2] as usize).coords;
            volume += v0.dot(&v1.cross(&v2));
        }
        volume / 6.0
    }

    /// Expand to triangle soup: 3 unique vertices per triangle with
    /// implicit indices `3t, 3t+1, 3t+2`.
    pub fn to_non_indexed(&self) -> Mesh {
        let mut out = Mesh::with_capacity(self.triangle_count() * 3, self.indices.len());
        for tri in self.indices.chunks_exact(3) {
            for &i in tri {
                let v = i as usize;
                out.positions.extend_from_slice(&self.positions[v * 3..v * 3 + 3]);
                if self.normals.len() >= (v + 1) * 3 {
                    out.normals.extend_from_slice(&self.normals[v * 3..v * 3 + 3]);
                }
            }
        }
        out.indices.extend(0..(out.positions.len() / 3) as u32);
        out
    }
}
