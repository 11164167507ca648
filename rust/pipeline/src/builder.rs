// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Keycap assembly
//!
//! Places each symbol's outline as an extruded prism over the
//! normalized base, then carves: the body is the base minus the union
//! of all prisms, and each visible legend is the intersection of the
//! base with that symbol's prism. The intersection, not the prism
//! itself, is the legend source of truth: it clips the legend to the
//! region the base actually covers.

use crate::batch::CancelToken;
use crate::error::{Error, Result};
use crate::resources::OutlineRegistry;
use crate::types::{
    parse_hex_color, KeyDef, KeycapModel, SymbolDef, Template, KEYCAP_BODY_COLOR,
};
use keyforge_geometry::{
    compute_vertex_normals, extrude_outline_set, intersect, subtract, union_all, Mesh, NamedMesh,
    OutlineSet, Scene,
};
use tracing::debug;

/// Name of the carved shank mesh in every scene
pub const BODY_MESH_NAME: &str = "body";

/// Extrude and position one symbol's outlines over the base.
///
/// Returns `None` for zero-geometry outlines (unknown icon, blank
/// glyph). The prism is centered on its own XY bounds before rotating,
/// so rotation happens about the symbol's centroid, then offset to the
/// slot position and dropped so its bottom sits on the base's bottom
/// plane. That guarantees full penetration regardless of the base's
/// local thickness.
pub fn place_symbol(
    outlines: &OutlineSet,
    sym: &SymbolDef,
    extrusion_depth_mm: f64,
    base_min_z: f64,
) -> Result<Option<Mesh>> {
    if outlines.is_empty() {
        return Ok(None);
    }

    let mut mesh = extrude_outline_set(outlines, extrusion_depth_mm)
        .map_err(|e| Error::geometry(&sym.slot_name, e))?;
    if mesh.is_empty() {
        return Ok(None);
    }

    compute_vertex_normals(&mut mesh);
    mesh.center_xy();
    if sym.rotation_deg != 0.0 {
        mesh.rotate_z(sym.rotation_deg.to_radians());
    }
    mesh.translate(sym.x_mm, sym.y_mm, 0.0);
    mesh.align_bottom_to(base_min_z);

    Ok(Some(mesh))
}

/// Build the full scene for one key: the carved body plus one legend
/// mesh per non-blank symbol, in template symbol order.
pub fn build_keycap(
    template: &Template,
    key: &KeyDef,
    model: &KeycapModel,
    base: &Mesh,
    outlines: &OutlineRegistry,
    cancel: &CancelToken,
) -> Result<Scene> {
    cancel.check()?;

    let base_bb = base.bounds().ok_or_else(|| {
        Error::geometry(
            &model.name,
            keyforge_geometry::Error::DegenerateMesh("base mesh has no vertices".to_string()),
        )
    })?;
    let base_min_z = base_bb.min.z as f64;

    // Prisms and their (color, name) attribution stay parallel; the
    // same prism feeds both the union and its legend intersection, so
    // it is never cloned.
    let mut prisms: Vec<Mesh> = Vec::new();
    let mut labels: Vec<(u32, String)> = Vec::new();
    for sym in &template.symbols {
        cancel.check()?;

        let Some(content) = key.content_by_symbol_id.get(&sym.id) else {
            continue;
        };
        if content.is_blank() {
            continue;
        }

        let provider = outlines.resolve(&sym.family)?;
        let set = provider.outline(content, sym.font_size_mm)?;

        let Some(mesh) = place_symbol(&set, sym, model.extrusion_depth_mm, base_min_z)? else {
            continue;
        };

        prisms.push(mesh);
        labels.push((
            parse_hex_color(&sym.color)?,
            content.display_name().trim().to_string(),
        ));
    }

    cancel.check()?;
    debug!(key = %key.name, symbols = prisms.len(), "carving keycap");

    let union = union_all(&prisms).map_err(|e| Error::geometry(&key.name, e))?;

    cancel.check()?;

    // No placed symbols leaves the base untouched
    let body = match union {
        Some(carve) => subtract(base, &carve).map_err(|e| Error::geometry(&key.name, e))?,
        None => base.clone(),
    };

    let mut scene = Scene::new();
    scene.push(NamedMesh::new(BODY_MESH_NAME, KEYCAP_BODY_COLOR, body));

    for (i, (prism, (color, name))) in prisms.iter().zip(labels).enumerate() {
        cancel.check()?;
        let legend = intersect(base, prism).map_err(|e| Error::geometry(&key.name, e))?;
        let name = if name.is_empty() {
            format!("symbol_{}", i)
        } else {
            name
        };
        scene.push(NamedMesh::new(name, color, legend));
    }

    Ok(scene)
}

/// Resolve a key's template and model, with errors that name the
/// broken reference
pub fn resolve<'a>(
    project: &'a crate::types::Project,
    key: &KeyDef,
) -> Result<(&'a Template, &'a KeycapModel)> {
    let template = project
        .template(&key.template_id)
        .ok_or_else(|| Error::UnknownTemplate {
            template_id: key.template_id.clone(),
            key_name: key.name.clone(),
        })?;
    let model = project
        .model(&template.keycap_model_id)
        .ok_or_else(|| Error::UnknownModel {
            model_id: template.keycap_model_id.clone(),
            template_name: template.name.clone(),
        })?;
    Ok((template, model))
}
