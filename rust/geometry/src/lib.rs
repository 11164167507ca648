// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Keyforge geometry processing
//!
//! Mesh parsing, outline extrusion and CSG boolean operations for
//! carving legends into keycap bodies. Uses earcutr for triangulation,
//! csgrs for booleans and nalgebra for transformations.

pub mod csg;
pub mod error;
pub mod extrusion;
pub mod mesh;
pub mod normalize;
pub mod outline;
pub mod stl;
pub mod triangulation;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point2, Point3, Vector2, Vector3};

pub use csg::{compute_vertex_normals, intersect, subtract, union_all};
pub use error::{Error, Result};
pub use extrusion::{extrude_outline, extrude_outline_set};
pub use mesh::{BoundingBox, Mesh, NamedMesh, Scene};
pub use normalize::{apply_rotation_deg, normalize_base_mesh};
pub use outline::{Outline2D, OutlineSet};
pub use stl::{parse_stl, stl_dimensions};
pub use triangulation::triangulate_polygon;
