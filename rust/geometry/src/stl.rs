// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! STL parsing
//!
//! Parses binary and ASCII STL byte buffers into triangle-soup meshes.
//! A pure function of the input bytes: no I/O, no caching.

use crate::csg::compute_vertex_normals;
use crate::error::{Error, Result};
use crate::mesh::Mesh;

/// Size of one binary STL facet: normal + 3 vertices (12 floats) + attribute count
const FACET_SIZE: usize = 50;
/// Binary header (80 bytes) + u32 triangle count
const HEADER_SIZE: usize = 84;

/// Parse an STL buffer (binary or ASCII) into a mesh.
///
/// The returned mesh is non-indexed (3 vertices per triangle, indices
/// `3t, 3t+1, 3t+2`) with smooth vertex normals and a valid bounding
/// box. Facet normals stored in the file are discarded; normals are
/// recomputed from the geometry, which downstream CSG relies on.
pub fn parse_stl(bytes: &[u8]) -> Result<Mesh> {
    let mut mesh = if is_ascii_stl(bytes) {
        parse_ascii(bytes)?
    } else {
        parse_binary(bytes)?
    };

    if mesh.is_empty() {
        return Err(Error::Parse("STL contains no triangles".to_string()));
    }

    compute_vertex_normals(&mut mesh);
    Ok(mesh)
}

/// X/Y extent of the raw (untransformed) mesh in millimeters.
///
/// Used by model registries to report the footprint of an uploaded
/// shank without running the full normalization pipeline.
pub fn stl_dimensions(bytes: &[u8]) -> Result<(f64, f64)> {
    let mesh = parse_stl(bytes)?;
    // parse_stl rejects empty meshes, so bounds always exist here
    let bb = mesh
        .bounds()
        .ok_or_else(|| Error::Parse("STL contains no vertices".to_string()))?;
    let size = bb.size();
    Ok((size.x as f64, size.y as f64))
}

/// Detect the ASCII variant.
///
/// Binary files are allowed to start with "solid" too, so the prefix
/// alone is not enough: a buffer is only treated as ASCII when the
/// binary size equation does not hold exactly.
fn is_ascii_stl(bytes: &[u8]) -> bool {
    let starts_with_solid = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .map(|i| bytes[i..].starts_with(b"solid"))
        .unwrap_or(false);

    if !starts_with_solid {
        return false;
    }

    if bytes.len() >= HEADER_SIZE {
        let count = u32::from_le_bytes([bytes[80], bytes[81], bytes[82], bytes[83]]) as usize;
        if bytes.len() == HEADER_SIZE + count * FACET_SIZE {
            return false;
        }
    }

    true
}

fn parse_binary(bytes: &[u8]) -> Result<Mesh> {
    if bytes.len() < HEADER_SIZE {
        return Err(Error::Parse(format!(
            "binary STL too small: {} bytes (need at least {})",
            bytes.len(),
            HEADER_SIZE
        )));
    }

    let triangle_count =
        u32::from_le_bytes([bytes[80], bytes[81], bytes[82], bytes[83]]) as usize;

    let expected = HEADER_SIZE + triangle_count * FACET_SIZE;
    if bytes.len() < expected {
        return Err(Error::Parse(format!(
            "binary STL truncated: expected {} bytes for {} triangles, got {}",
            expected,
            triangle_count,
            bytes.len()
        )));
    }

    let mut mesh = Mesh::with_capacity(triangle_count * 3, triangle_count * 3);

    let mut offset = HEADER_SIZE;
    for _ in 0..triangle_count {
        // Skip the stored facet normal; recomputed later
        offset += 12;

        let base = mesh.vertex_count() as u32;
        for _ in 0..3 {
            let (x, y, z) = read_vec3(bytes, offset)?;
            mesh.positions.push(x);
            mesh.positions.push(y);
            mesh.positions.push(z);
            offset += 12;
        }
        mesh.add_triangle(base, base + 1, base + 2);

        offset += 2; // attribute byte count
    }

    Ok(mesh)
}

fn read_vec3(bytes: &[u8], offset: usize) -> Result<(f32, f32, f32)> {
    let x = read_f32(bytes, offset);
    let y = read_f32(bytes, offset + 4);
    let z = read_f32(bytes, offset + 8);
    if !x.is_finite() || !y.is_finite() || !z.is_finite() {
        return Err(Error::Parse(format!(
            "non-finite vertex coordinate at byte {}",
            offset
        )));
    }
    Ok((x, y, z))
}

#[inline]
fn read_f32(bytes: &[u8], offset: usize) -> f32 {
    f32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

fn parse_ascii(bytes: &[u8]) -> Result<Mesh> {
    let text = std::str::from_utf8(bytes)
        .map_err(|_| Error::Parse("ASCII STL is not valid UTF-8".to_string()))?;

    let mut mesh = Mesh::new();
    let mut facet_vertices: Vec<(f32, f32, f32)> = Vec::with_capacity(3);
    let mut in_loop = false;

    for (line_no, raw_line) in text.lines().enumerate() {
        let line = raw_line.trim();

        if line.starts_with("outer loop") {
            in_loop = true;
            facet_vertices.clear();
        } else if line.starts_with("endloop") {
            if facet_vertices.len() != 3 {
                return Err(Error::Parse(format!(
                    "facet with {} vertices at line {} (expected 3)",
                    facet_vertices.len(),
                    line_no + 1
                )));
            }
            let base = mesh.vertex_count() as u32;
            for &(x, y, z) in &facet_vertices {
                mesh.positions.push(x);
                mesh.positions.push(y);
                mesh.positions.push(z);
            }
            mesh.add_triangle(base, base + 1, base + 2);
            in_loop = false;
        } else if let Some(rest) = line.strip_prefix("vertex") {
            if !in_loop {
                return Err(Error::Parse(format!(
                    "vertex outside of outer loop at line {}",
                    line_no + 1
                )));
            }
            facet_vertices.push(parse_vertex_line(rest, line_no + 1)?);
        }
    }

    Ok(mesh)
}

fn parse_vertex_line(rest: &str, line_no: usize) -> Result<(f32, f32, f32)> {
    let mut parts = rest.split_whitespace();
    let mut coord = || -> Result<f32> {
        let token = parts
            .next()
            .ok_or_else(|| Error::Parse(format!("short vertex line at line {}", line_no)))?;
        let value: f32 = token
            .parse()
            .map_err(|_| Error::Parse(format!("bad coordinate {:?} at line {}", token, line_no)))?;
        if !value.is_finite() {
            return Err(Error::Parse(format!(
                "non-finite coordinate at line {}",
                line_no
            )));
        }
        Ok(value)
    };
    Ok((coord()?, coord()?, coord()?))
}
