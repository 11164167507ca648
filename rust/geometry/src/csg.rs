// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! CSG (Constructive Solid Geometry) operations
//!
//! Boolean mesh operations via csgrs, wrapped in the pipeline's mesh
//! type. Exactly the three operations the keycap pipeline needs:
//! n-ary union of legend extrusions, subtraction from the body,
//! per-legend intersection with the body.

use crate::error::{Error, Result};
use crate::mesh::Mesh;
use crate::triangulation::{calculate_polygon_normal, project_to_2d, triangulate_polygon};
use nalgebra::{Point3, Vector3};

/// Union a list of meshes, folding pairwise left to right.
///
/// Returns `None` for an empty list (no legends placed, nothing to
/// subtract). Fold order is the input order: boolean ops on touching
/// operands are order-sensitive, and reproducible output across runs
/// requires a stable fold.
pub fn union_all(meshes: &[Mesh]) -> Result<Option<Mesh>> {
    use csgrs::traits::CSG;

    let Some((first, rest)) = meshes.split_first() else {
        return Ok(None);
    };

    let mut acc = mesh_to_csgrs(first)?;
    for mesh in rest {
        let next = mesh_to_csgrs(mesh)?;
        acc = acc.union(&next);
    }

    let mut result = csgrs_to_mesh(&acc);
    compute_vertex_normals(&mut result);
    Ok(Some(result))
}

/// Subtract `b` from `a`. The result is `a`'s geometry with `b`'s
/// volume carved out; the caller keeps attributing `a`'s material.
pub fn subtract(a: &Mesh, b: &Mesh) -> Result<Mesh> {
    use csgrs::traits::CSG;

    // Fast path: nothing to carve
    if b.is_empty() {
        return Ok(a.clone());
    }

    let a_csg = mesh_to_csgrs(a)?;
    let b_csg = mesh_to_csgrs(b)?;

    let mut result = csgrs_to_mesh(&a_csg.difference(&b_csg));
    compute_vertex_normals(&mut result);
    Ok(result)
}

/// Intersect `a` with `b`. The visible legend surface is the region of
/// the extrusion also covered by the base, so callers attribute `b`'s
/// material to the result.
pub fn intersect(a: &Mesh, b: &Mesh) -> Result<Mesh> {
    use csgrs::traits::CSG;

    let a_csg = mesh_to_csgrs(a)?;
    let b_csg = mesh_to_csgrs(b)?;

    let mut result = csgrs_to_mesh(&a_csg.intersection(&b_csg));
    compute_vertex_normals(&mut result);
    Ok(result)
}

/// Convert our Mesh format to csgrs Mesh format
fn mesh_to_csgrs(mesh: &Mesh) -> Result<csgrs::mesh::Mesh<()>> {
    use csgrs::mesh::{polygon::Polygon, vertex::Vertex, Mesh as CsgMesh};

    if mesh.is_empty() {
        return Err(Error::DegenerateMesh(
            "boolean operand has no triangles".to_string(),
        ));
    }

    let mut polygons = Vec::with_capacity(mesh.triangle_count());

    for tri in mesh.indices.chunks_exact(3) {
        let v0 = mesh.position(tri[0] as usize);
        let v1 = mesh.position(tri[1] as usize);
        let v2 = mesh.position(tri[2] as usize);

        // Face normal from edges; skip degenerate (zero-area) triangles
        // to avoid NaN propagation inside csgrs
        let edge1 = v1 - v0;
        let edge2 = v2 - v0;
        let face_normal = match edge1.cross(&edge2).try_normalize(1e-10) {
            Some(n) => n,
            None => continue,
        };

        let vertices = vec![
            Vertex::new(v0, face_normal),
            Vertex::new(v1, face_normal),
            Vertex::new(v2, face_normal),
        ];

        polygons.push(Polygon::new(vertices, None));
    }

    if polygons.is_empty() {
        return Err(Error::DegenerateMesh(
            "boolean operand has only degenerate triangles".to_string(),
        ));
    }

    Ok(CsgMesh::from_polygons(&polygons, None))
}

/// Convert csgrs Mesh format back to our Mesh format
fn csgrs_to_mesh(csg_mesh: &csgrs::mesh::Mesh<()>) -> Mesh {
    let mut mesh = Mesh::new();

    for polygon in &csg_mesh.polygons {
        let vertices = &polygon.vertices;
        if vertices.len() < 3 {
            continue;
        }

        let points_3d: Vec<Point3<f64>> = vertices
            .iter()
            .map(|v| Point3::new(v.pos[0], v.pos[1], v.pos[2]))
            .collect();

        // Validate the polygon's intended normal; fall back to a
        // computed one so winding intent survives re-triangulation
        let raw_normal = Vector3::new(
            vertices[0].normal[0],
            vertices[0].normal[1],
            vertices[0].normal[2],
        );
        let csg_normal = match raw_normal.try_normalize(1e-10) {
            Some(n) if n.x.is_finite() && n.y.is_finite() && n.z.is_finite() => n,
            _ => match calculate_polygon_normal(&points_3d).try_normalize(1e-10) {
                Some(n) => n,
                None => continue, // Skip degenerate polygon
            },
        };

        // FAST PATH: Triangle - no triangulation needed
        if points_3d.len() == 3 {
            let base_idx = mesh.vertex_count() as u32;
            for v in vertices {
                mesh.add_vertex(v.pos, v.normal);
            }
            mesh.add_triangle(base_idx, base_idx + 1, base_idx + 2);
            continue;
        }

        // Project to 2D using the polygon normal (preserves winding),
        // then triangulate; handles convex and concave faces
        let (points_2d, _, _, _) = project_to_2d(&points_3d, &csg_normal);

        let indices = match triangulate_polygon(&points_2d) {
            Ok(idx) => idx,
            Err(_) => continue, // Skip degenerate polygons
        };

        let base_idx = mesh.vertex_count();
        for v in vertices {
            mesh.add_vertex(v.pos, v.normal);
        }

        for tri in indices.chunks(3) {
            if tri.len() == 3 {
                mesh.add_triangle(
                    (base_idx + tri[0]) as u32,
                    (base_idx + tri[1]) as u32,
                    (base_idx + tri[2]) as u32,
                );
            }
        }
    }

    mesh
}

/// Calculate smooth vertex normals by area-weighted face accumulation
pub fn compute_vertex_normals(mesh: &mut Mesh) {
    let vertex_count = mesh.vertex_count();
    if vertex_count == 0 {
        return;
    }

    let mut normals = vec![Vector3::zeros(); vertex_count];

    for tri in mesh.indices.chunks_exact(3) {
        let i0 = tri[0] as usize;
        let i1 = tri[1] as usize;
        let i2 = tri[2] as usize;

        let v0 = mesh.position(i0);
        let v1 = mesh.position(i1);
        let v2 = mesh.position(i2);

        // Unnormalized cross product: weights by triangle area
        let normal = (v1 - v0).cross(&(v2 - v0));

        normals[i0] += normal;
        normals[i1] += normal;
        normals[i2] += normal;
    }

    mesh.normals.clear();
    mesh.normals.reserve(vertex_count * 3);

    for normal in normals {
        let n = normal.try_normalize(1e-12).unwrap_or_else(Vector3::z);
        mesh.normals.push(n.x as f32);
        mesh.normals.push(n.y as f32);
        mesh.normals.push(n.z as f32);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extrusion::extrude_outline;
    use crate::outline::Outline2D;

    fn cube(size: f64) -> Mesh {
        extrude_outline(&Outline2D::rectangle(size, size), size).unwrap()
    }

    #[test]
    fn test_union_empty_list() {
        assert!(union_all(&[]).unwrap().is_none());
    }

    #[test]
    fn test_union_single() {
        let result = union_all(std::slice::from_ref(&cube(2.0))).unwrap().unwrap();
        assert!(result.triangle_count() > 0);
        assert!((result.signed_volume() - 8.0).abs() < 0.1);
    }

    #[test]
    fn test_union_disjoint_pair() {
        let a = cube(2.0);
        let mut b = cube(2.0);
        b.translate(10.0, 0.0, 0.0);

        let result = union_all(&[a, b]).unwrap().unwrap();
        assert!((result.signed_volume() - 16.0).abs() < 0.1);
    }

    #[test]
    fn test_subtract_carves_volume() {
        let base = cube(4.0);
        let mut tool = cube(2.0);
        // Penetrate through the top face
        tool.translate(0.0, 0.0, 3.0);

        let result = subtract(&base, &tool).unwrap();
        assert!(result.triangle_count() > 0);
        let volume = result.signed_volume();
        assert!(volume > 0.0);
        assert!(volume < base.signed_volume());
    }

    #[test]
    fn test_subtract_empty_tool_is_identity() {
        let base = cube(4.0);
        let result = subtract(&base, &Mesh::new()).unwrap();
        assert_eq!(result.triangle_count(), base.triangle_count());
    }

    #[test]
    fn test_subtract_empty_base_fails() {
        assert!(matches!(
            subtract(&Mesh::new(), &cube(1.0)),
            Err(Error::DegenerateMesh(_))
        ));
    }

    #[test]
    fn test_intersect_clips_to_overlap() {
        let base = cube(4.0); // z in [0, 4]
        let mut tool = cube(2.0);
        tool.translate(0.0, 0.0, 3.0); // z in [3, 5]

        let result = intersect(&base, &tool).unwrap();
        let bb = result.bounds().unwrap();
        assert!(bb.max.z <= 4.0 + 1e-4);
        assert!(bb.min.z >= 3.0 - 1e-4);
        // Overlap volume: 2 x 2 x 1
        assert!((result.signed_volume() - 4.0).abs() < 0.1);
    }

    #[test]
    fn test_intersect_empty_operand_fails() {
        assert!(intersect(&cube(1.0), &Mesh::new()).is_err());
        assert!(intersect(&Mesh::new(), &cube(1.0)).is_err());
    }

    #[test]
    fn test_results_have_normals() {
        let result = union_all(std::slice::from_ref(&cube(1.0))).unwrap().unwrap();
        assert_eq!(result.normals.len(), result.positions.len());
    }

    #[test]
    fn test_compute_vertex_normals_flat_quad() {
        let mut mesh = Mesh::new();
        mesh.add_vertex(Point3::new(0.0, 0.0, 0.0), Vector3::zeros());
        mesh.add_vertex(Point3::new(1.0, 0.0, 0.0), Vector3::zeros());
        mesh.add_vertex(Point3::new(0.0, 1.0, 0.0), Vector3::zeros());
        mesh.add_triangle(0, 1, 2);

        compute_vertex_normals(&mut mesh);
        assert!((mesh.normals[2] - 1.0).abs() < 1e-6); // +Z
    }
}
