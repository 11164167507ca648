// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! 3MF package writing
//!
//! Serializes a scene into the three-part 3MF container: content types,
//! root relationships and the model part. The model part is written as
//! a single line with fixed 6-decimal vertex formatting, so identical
//! input always produces byte-identical output.
//!
//! Meshes are flattened to triangle soup before emission: each
//! triangle references the local, sequential vertex indices
//! `3t, 3t+1, 3t+2` of its own expanded vertices rather than a shared
//! index buffer.

use crate::error::{Error, Result};
use keyforge_geometry::{Mesh, Scene};
use std::io::{Cursor, Write};
use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Media type of the produced package
pub const MIME_3MF: &str = "model/3mf";

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="model" ContentType="application/vnd.ms-package.3dmanufacturing-3dmodel+xml"/></Types>"#;

const RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rel0" Type="http://schemas.microsoft.com/3dmanufacturing/2013/01/3dmodel" Target="/3D/3dmodel.model"/></Relationships>"#;

/// Escape the XML special characters allowed in metadata names
fn escape_name(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// Serialize one mesh as a `<mesh>` element with expanded vertices
fn mesh_xml(mesh: &Mesh) -> String {
    let soup = mesh.to_non_indexed();
    let vertex_count = soup.vertex_count();
    let triangle_count = vertex_count / 3;

    let mut xml = String::with_capacity(vertex_count * 48 + triangle_count * 32);
    xml.push_str("<mesh><vertices>");
    for v in 0..vertex_count {
        let x = soup.positions[v * 3];
        let y = soup.positions[v * 3 + 1];
        let z = soup.positions[v * 3 + 2];
        xml.push_str(&format!(
            r#"<vertex x="{:.6}" y="{:.6}" z="{:.6}"/>"#,
            x, y, z
        ));
    }
    xml.push_str("</vertices><triangles>");
    for t in 0..triangle_count {
        xml.push_str(&format!(
            r#"<triangle v1="{}" v2="{}" v3="{}"/>"#,
            3 * t,
            3 * t + 1,
            3 * t + 2
        ));
    }
    xml.push_str("</triangles></mesh>");
    xml
}

/// Build the model part: one `<object>` per mesh, one `<item>` per
/// object in the build list. Object ids are 1-based and follow scene
/// order, so the body object is always id 1.
pub fn model_xml(scene: &Scene) -> String {
    let mut resources = String::new();
    let mut build_items = String::new();

    for (i, named) in scene.iter().enumerate() {
        let object_id = i + 1;
        resources.push_str(&format!(
            r#"<object id="{}" type="model"><metadata name="name">{}</metadata>{}</object>"#,
            object_id,
            escape_name(&named.name),
            mesh_xml(&named.mesh)
        ));
        build_items.push_str(&format!(r#"<item objectid="{}"/>"#, object_id));
    }

    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8"?>"#,
            r#"<model unit="millimeter" xml:lang="en-US" xmlns="http://schemas.microsoft.com/3dmanufacturing/core/2015/02">"#,
            "<resources>{}</resources><build>{}</build></model>"
        ),
        resources, build_items
    )
}

/// Write a scene as a complete 3MF package.
///
/// Part order inside the archive is fixed (content types, rels, model)
/// so packages for identical scenes are byte-identical.
pub fn write_package(scene: &Scene) -> Result<Vec<u8>> {
    if scene.is_empty() {
        return Err(Error::EmptyScene);
    }

    let model = model_xml(scene);
    debug!(
        objects = scene.len(),
        model_bytes = model.len(),
        "writing 3MF package"
    );

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    writer.start_file("[Content_Types].xml", options)?;
    writer.write_all(CONTENT_TYPES_XML.as_bytes())?;

    writer.start_file("_rels/.rels", options)?;
    writer.write_all(RELS_XML.as_bytes())?;

    writer.start_file("3D/3dmodel.model", options)?;
    writer.write_all(model.as_bytes())?;

    Ok(writer.finish()?.into_inner())
}
