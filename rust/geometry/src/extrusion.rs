// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Extrusion operations - converting 2D outlines to 3D prism solids
//!
//! Legends are flat-capped prisms: bottom cap at z=0, top cap at the
//! extrusion depth, no bevels.

use crate::error::{Error, Result};
use crate::mesh::Mesh;
use crate::outline::{Outline2D, OutlineSet, Triangulation};
use nalgebra::{Point2, Point3, Vector3};

/// Extrude a single outline along +Z into a closed prism
pub fn extrude_outline(outline: &Outline2D, depth: f64) -> Result<Mesh> {
    if depth <= 0.0 {
        return Err(Error::InvalidExtrusion(
            "Depth must be positive".to_string(),
        ));
    }

    let triangulation = outline.triangulate()?;

    let cap_vertex_count = triangulation.points.len() * 2;
    let side_vertex_count =
        (outline.outer.len() + outline.holes.iter().map(|h| h.len()).sum::<usize>()) * 4;
    let mut mesh = Mesh::with_capacity(
        cap_vertex_count + side_vertex_count,
        triangulation.indices.len() * 2 + side_vertex_count / 4 * 6,
    );

    // Bottom and top caps
    create_cap_mesh(&triangulation, 0.0, Vector3::new(0.0, 0.0, -1.0), &mut mesh);
    create_cap_mesh(&triangulation, depth, Vector3::new(0.0, 0.0, 1.0), &mut mesh);

    // Side walls for the outer boundary and each hole. Hole contours
    // are clockwise, so the same construction yields inward normals.
    create_side_walls(&outline.outer, depth, &mut mesh);
    for hole in &outline.holes {
        create_side_walls(hole, depth, &mut mesh);
    }

    Ok(mesh)
}

/// Extrude every outline of a set and merge into one mesh.
///
/// An empty set yields an empty mesh (valid zero-geometry symbol).
pub fn extrude_outline_set(set: &OutlineSet, depth: f64) -> Result<Mesh> {
    let mut merged = Mesh::new();
    for outline in &set.outlines {
        let prism = extrude_outline(outline, depth)?;
        merged.merge(&prism);
    }
    Ok(merged)
}

/// Create a cap (top or bottom) from triangulation
#[inline]
fn create_cap_mesh(triangulation: &Triangulation, z: f64, normal: Vector3<f64>, mesh: &mut Mesh) {
    let base_index = mesh.vertex_count() as u32;

    for point in &triangulation.points {
        mesh.add_vertex(Point3::new(point.x, point.y, z), normal);
    }

    for i in (0..triangulation.indices.len()).step_by(3) {
        let i0 = base_index + triangulation.indices[i] as u32;
        let i1 = base_index + triangulation.indices[i + 1] as u32;
        let i2 = base_index + triangulation.indices[i + 2] as u32;

        // Reverse winding for the bottom cap so it faces -Z
        if z == 0.0 {
            mesh.add_triangle(i0, i2, i1);
        } else {
            mesh.add_triangle(i0, i1, i2);
        }
    }
}

/// Create side walls for a boundary contour
#[inline]
fn create_side_walls(boundary: &[Point2<f64>], depth: f64, mesh: &mut Mesh) {
    let base_index = mesh.vertex_count() as u32;
    let mut quad_count = 0u32;

    for i in 0..boundary.len() {
        let j = (i + 1) % boundary.len();

        let p0 = &boundary[i];
        let p1 = &boundary[j];

        // Outward for a counter-clockwise contour; hole contours are
        // clockwise so the same formula points into the hole.
        // try_normalize handles degenerate edges (duplicate points).
        let edge = Vector3::new(p1.x - p0.x, p1.y - p0.y, 0.0);
        let normal = match Vector3::new(edge.y, -edge.x, 0.0).try_normalize(1e-10) {
            Some(n) => n,
            None => continue, // Skip degenerate edge
        };

        let v0_bottom = Point3::new(p0.x, p0.y, 0.0);
        let v1_bottom = Point3::new(p1.x, p1.y, 0.0);
        let v0_top = Point3::new(p0.x, p0.y, depth);
        let v1_top = Point3::new(p1.x, p1.y, depth);

        let idx = base_index + (quad_count * 4);
        mesh.add_vertex(v0_bottom, normal);
        mesh.add_vertex(v1_bottom, normal);
        mesh.add_vertex(v1_top, normal);
        mesh.add_vertex(v0_top, normal);

        mesh.add_triangle(idx, idx + 1, idx + 2);
        mesh.add_triangle(idx, idx + 2, idx + 3);

        quad_count += 1;
    }
}
