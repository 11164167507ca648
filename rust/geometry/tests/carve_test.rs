// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! End-to-end geometry test: extrude a legend prism through a slab
//! base and carve it out, the way the keycap pipeline does.

use keyforge_geometry::{
    compute_vertex_normals, extrude_outline, intersect, subtract, union_all, Mesh, Outline2D,
};

/// Closed slab base: width x height x thickness, bottom at z=0,
/// centered in XY (the normalized-base frame).
fn slab(width: f64, height: f64, thickness: f64) -> Mesh {
    extrude_outline(&Outline2D::rectangle(width, height), thickness).unwrap()
}

/// A legend prism placed the way the pipeline places symbols: centered
/// at (x, y), aligned so it penetrates the base's bottom plane.
fn legend(size: f64, depth_above_base: f64, base_thickness: f64) -> Mesh {
    let mut prism = extrude_outline(
        &Outline2D::rectangle(size, size),
        base_thickness + depth_above_base,
    )
    .unwrap();
    compute_vertex_normals(&mut prism);
    prism.align_bottom_to(0.0);
    prism
}

#[test]
fn carving_reduces_volume_but_keeps_footprint() {
    let base = slab(18.0, 18.0, 4.0);
    let tool = legend(4.0, 0.8, 4.0);

    let union = union_all(std::slice::from_ref(&tool)).unwrap().unwrap();
    let body = subtract(&base, &union).unwrap();

    assert!(body.triangle_count() > 0);
    assert!(body.signed_volume() > 0.0);
    assert!(body.signed_volume() < base.signed_volume());

    let bb = body.bounds().unwrap();
    assert!((bb.min.z - 0.0).abs() < 1e-4);
    assert!((bb.max.z - 4.0).abs() < 1e-4);
}

#[test]
fn legend_surface_is_clipped_to_base_thickness() {
    let base = slab(18.0, 18.0, 4.0);
    let tool = legend(4.0, 0.8, 4.0);

    let surface = intersect(&base, &tool).unwrap();
    let bb = surface.bounds().unwrap();

    assert!(bb.min.z >= -1e-4);
    assert!(bb.max.z <= 4.0 + 1e-4);
    // The visible legend is the 4x4 prism clipped to the slab
    assert!((surface.signed_volume() - 4.0 * 4.0 * 4.0).abs() < 0.5);
}

#[test]
fn multiple_disjoint_legends_union_in_input_order() {
    let mut left = legend(3.0, 0.8, 4.0);
    left.translate(-5.0, 0.0, 0.0);
    let mut right = legend(3.0, 0.8, 4.0);
    right.translate(5.0, 0.0, 0.0);

    let a = union_all(&[left.clone(), right.clone()]).unwrap().unwrap();
    let b = union_all(&[left, right]).unwrap().unwrap();

    // Same input, same fold order, identical output
    assert_eq!(a.positions, b.positions);
    assert_eq!(a.indices, b.indices);
}

#[test]
fn subtracting_two_legends_carves_both() {
    let base = slab(18.0, 18.0, 4.0);

    let mut left = legend(3.0, 0.8, 4.0);
    left.translate(-5.0, 0.0, 0.0);
    let mut right = legend(3.0, 0.8, 4.0);
    right.translate(5.0, 0.0, 0.0);

    let union = union_all(&[left, right]).unwrap().unwrap();
    let body = subtract(&base, &union).unwrap();

    let carved = base.signed_volume() - body.signed_volume();
    // Each legend removes a 3x3 column through the 4mm slab
    assert!((carved - 2.0 * 3.0 * 3.0 * 4.0).abs() < 1.0);
}
