// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Base mesh normalization
//!
//! Puts a parsed keycap shank into the canonical frame every later
//! stage assumes: per-model rotation correction applied, XY bounding
//! box centered on the origin, lowest point resting on z=0.

use crate::error::Result;
use crate::mesh::Mesh;
use crate::stl::parse_stl;

/// Rotate about X, then Y, then Z, in degrees.
///
/// The order is fixed: rotations do not commute, and model authors
/// pick per-axis corrections expecting exactly this composition. Each
/// axis is applied only when nonzero.
pub fn apply_rotation_deg(mesh: &mut Mesh, rx_deg: f64, ry_deg: f64, rz_deg: f64) {
    if rx_deg != 0.0 {
        mesh.rotate_x(rx_deg.to_radians());
    }
    if ry_deg != 0.0 {
        mesh.rotate_y(ry_deg.to_radians());
    }
    if rz_deg != 0.0 {
        mesh.rotate_z(rz_deg.to_radians());
    }
}

/// Parse and normalize a base mesh: rotate, center in XY, rest on z=0.
///
/// Centering and alignment each recompute the bounding box before
/// acting, so the normalization is idempotent: running the result
/// through again with zero rotation changes nothing.
pub fn normalize_base_mesh(bytes: &[u8], rotation_deg: (f64, f64, f64)) -> Result<Mesh> {
    let mut mesh = parse_stl(bytes)?;
    let (rx, ry, rz) = rotation_deg;
    apply_rotation_deg(&mut mesh, rx, ry, rz);
    mesh.center_xy();
    mesh.align_bottom_to(0.0);
    Ok(mesh)
}
