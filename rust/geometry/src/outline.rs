// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! 2D symbol outlines
//!
//! The contract between glyph/icon producers and the extrusion stage.
//! Outlines are in millimeters, x increasing rightward and y increasing
//! toward the top edge of the keycap face (+Y of the mesh frame).
//! Producers that emit document-style y-down coordinates (e.g. SVG
//! paths) must call [`OutlineSet::flip_y`] before handing over.

use crate::error::{Error, Result};
use nalgebra::Point2;

/// A single closed 2D outline with optional holes
#[derive(Debug, Clone)]
pub struct Outline2D {
    /// Outer boundary (counter-clockwise)
    pub outer: Vec<Point2<f64>>,
    /// Holes (clockwise)
    pub holes: Vec<Vec<Point2<f64>>>,
}

impl Outline2D {
    /// Create a new outline without holes
    pub fn new(outer: Vec<Point2<f64>>) -> Self {
        Self {
            outer,
            holes: Vec::new(),
        }
    }

    /// Add a hole to the outline
    pub fn add_hole(&mut self, hole: Vec<Point2<f64>>) {
        self.holes.push(hole);
    }

    /// Axis-aligned rectangle centered at the origin
    pub fn rectangle(width: f64, height: f64) -> Self {
        let half_w = width / 2.0;
        let half_h = height / 2.0;

        Self::new(vec![
            Point2::new(-half_w, -half_h),
            Point2::new(half_w, -half_h),
            Point2::new(half_w, half_h),
            Point2::new(-half_w, half_h),
        ])
    }

    /// Circle centered at the origin.
    ///
    /// Segment count is kept low on purpose: legends are small and the
    /// boolean stage dominates runtime, so subdivision is bounded.
    pub fn circle(radius: f64) -> Self {
        let segments = circle_segments(radius);
        let mut outer = Vec::with_capacity(segments);

        for i in 0..segments {
            let angle = 2.0 * std::f64::consts::PI * (i as f64) / (segments as f64);
            outer.push(Point2::new(radius * angle.cos(), radius * angle.sin()));
        }

        Self::new(outer)
    }

    /// Triangulate via earcutr, flattening outer boundary and holes
    /// into one vertex array (hole start indices passed to earcut).
    pub fn triangulate(&self) -> Result<Triangulation> {
        if self.outer.len() < 3 {
            return Err(Error::InvalidOutline(
                "Outline must have at least 3 vertices".to_string(),
            ));
        }

        let total = self.outer.len() + self.holes.iter().map(|h| h.len()).sum::<usize>();
        let mut vertices = Vec::with_capacity(total * 2);

        for p in &self.outer {
            vertices.push(p.x);
            vertices.push(p.y);
        }

        let mut hole_indices = Vec::with_capacity(self.holes.len());
        for hole in &self.holes {
            hole_indices.push(vertices.len() / 2);
            for p in hole {
                vertices.push(p.x);
                vertices.push(p.y);
            }
        }

        let indices = earcutr::earcut(&vertices, &hole_indices, 2)
            .map_err(|e| Error::Triangulation(format!("{:?}", e)))?;

        let mut points = Vec::with_capacity(vertices.len() / 2);
        for i in (0..vertices.len()).step_by(2) {
            points.push(Point2::new(vertices[i], vertices[i + 1]));
        }

        Ok(Triangulation { points, indices })
    }
}

/// Triangulated outline result
#[derive(Debug, Clone)]
pub struct Triangulation {
    /// All vertices (outer + holes)
    pub points: Vec<Point2<f64>>,
    /// Triangle indices
    pub indices: Vec<usize>,
}

/// An ordered set of outlines making up one symbol
///
/// Empty is a valid zero-geometry result (unknown glyph, blank icon),
/// never an error.
#[derive(Debug, Clone, Default)]
pub struct OutlineSet {
    pub outlines: Vec<Outline2D>,
}

impl OutlineSet {
    pub fn new(outlines: Vec<Outline2D>) -> Self {
        Self { outlines }
    }

    pub fn is_empty(&self) -> bool {
        self.outlines.is_empty()
    }

    /// Uniform scale about the origin. Scale must be positive; use
    /// [`Self::flip_y`] for axis reflection.
    pub fn scale(&mut self, factor: f64) {
        for outline in &mut self.outlines {
            for p in &mut outline.outer {
                p.x *= factor;
                p.y *= factor;
            }
            for hole in &mut outline.holes {
                for p in hole {
                    p.x *= factor;
                    p.y *= factor;
                }
            }
        }
    }

    /// Reflect about the X axis, converting document-style y-down
    /// coordinates to the mesh frame. Point order is reversed so the
    /// outer/hole winding conventions survive the reflection.
    pub fn flip_y(&mut self) {
        for outline in &mut self.outlines {
            for p in &mut outline.outer {
                p.y = -p.y;
            }
            outline.outer.reverse();
            for hole in &mut outline.holes {
                for p in hole.iter_mut() {
                    p.y = -p.y;
                }
                hole.reverse();
            }
        }
    }

    /// Bounding box over all outlines: (min_x, min_y, max_x, max_y)
    pub fn bounds(&self) -> Option<(f64, f64, f64, f64)> {
        let mut bounds: Option<(f64, f64, f64, f64)> = None;
        for outline in &self.outlines {
            for p in outline.outer.iter().chain(outline.holes.iter().flatten()) {
                bounds = Some(match bounds {
                    None => (p.x, p.y, p.x, p.y),
                    Some((min_x, min_y, max_x, max_y)) => (
                        min_x.min(p.x),
                        min_y.min(p.y),
                        max_x.max(p.x),
                        max_y.max(p.y),
                    ),
                });
            }
        }
        bounds
    }
}

/// Adaptive segment count for circular arcs, clamped low
#[inline]
pub fn circle_segments(radius: f64) -> usize {
    let segments = (radius.sqrt() * 8.0).ceil() as usize;
    segments.clamp(8, 24)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rectangle() {
        let outline = Outline2D::rectangle(10.0, 5.0);
        assert_eq!(outline.outer.len(), 4);
        assert_eq!(outline.outer[0], Point2::new(-5.0, -2.5));
        assert_eq!(outline.outer[2], Point2::new(5.0, 2.5));
    }

    #[test]
    fn test_circle_on_radius() {
        let outline = Outline2D::circle(5.0);
        assert!(outline.outer.len() >= 8);
        let first = outline.outer[0];
        let dist = (first.x * first.x + first.y * first.y).sqrt();
        assert!((dist - 5.0).abs() < 0.001);
    }

    #[test]
    fn test_triangulate_rectangle() {
        let tri = Outline2D::rectangle(10.0, 5.0).triangulate().unwrap();
        assert_eq!(tri.points.len(), 4);
        assert_eq!(tri.indices.len(), 6);
    }

    #[test]
    fn test_triangulate_with_hole() {
        // Letter-"O" shape: outer square with inner square hole
        let mut outline = Outline2D::rectangle(10.0, 10.0);
        let mut hole = Outline2D::rectangle(4.0, 4.0).outer;
        hole.reverse(); // clockwise
        outline.add_hole(hole);

        let tri = outline.triangulate().unwrap();
        assert_eq!(tri.points.len(), 8);
        assert!(tri.indices.len() > 6);
        assert_eq!(tri.indices.len() % 3, 0);
    }

    #[test]
    fn test_degenerate_outline() {
        let outline = Outline2D::new(vec![Point2::new(0.0, 0.0), Point2::new(1.0, 0.0)]);
        assert!(outline.triangulate().is_err());
    }

    #[test]
    fn test_scale() {
        let mut set = OutlineSet::new(vec![Outline2D::rectangle(2.0, 2.0)]);
        set.scale(3.0);
        let (min_x, min_y, max_x, max_y) = set.bounds().unwrap();
        assert_eq!((min_x, min_y, max_x, max_y), (-3.0, -3.0, 3.0, 3.0));
    }

    #[test]
    fn test_flip_y_preserves_winding_area() {
        // Signed area of outer loop must stay positive after the flip
        fn signed_area(points: &[Point2<f64>]) -> f64 {
            let n = points.len();
            let mut area = 0.0;
            for i in 0..n {
                let a = &points[i];
                let b = &points[(i + 1) % n];
                area += a.x * b.y - b.x * a.y;
            }
            area / 2.0
        }

        let mut set = OutlineSet::new(vec![Outline2D::new(vec![
            Point2::new(0.0, 0.0),
            Point2::new(2.0, 0.0),
            Point2::new(2.0, 3.0),
        ])]);
        assert!(signed_area(&set.outlines[0].outer) > 0.0);
        set.flip_y();
        assert!(signed_area(&set.outlines[0].outer) > 0.0);
        // Asymmetric point actually moved
        let (_, min_y, _, max_y) = set.bounds().unwrap();
        assert_eq!((min_y, max_y), (-3.0, 0.0));
    }
}
