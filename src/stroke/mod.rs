//! Stroke geometry: outline construction and triangulation
//!
//! A live stroke travels through this module twice per frame while drawing:
//! the sampled path is expanded into a closed variable-width outline
//! (`outline`), then decomposed into a triangle mesh (`triangulate`) for the
//! mesh backend. When either step fails, the raster fallback path stamps the
//! same samples directly (see `crate::raster`).

pub mod outline;
pub mod triangulate;

pub use outline::{build_outline, PRESSURE_FLOOR};
pub use triangulate::{triangulate, triangulate_loop, TriangleMesh};

use crate::color::Rgba;
use crate::error::GeometryError;
use crate::geometry::Point;
use crate::input::StrokePath;

/// Builds the triangle mesh of a stroke, choosing the decomposition by path
/// topology.
///
/// Closed loops become a wrap-around quad strip between their two offset
/// bands; the loop outline's bridged ring is kept for area and dirty-region
/// purposes but is not ear-clippable. Everything else goes through outline
/// construction and ear clipping.
///
/// # Errors
///
/// The underlying `GeometryError`; the caller recovers through the raster
/// stamping path.
pub fn stroke_mesh(path: &StrokePath, base_width: f64) -> Result<TriangleMesh, GeometryError> {
  if path.is_closed_shape() {
    let (left, right) = outline::closed_bands(path, base_width)?;
    return triangulate_loop(&left, &right);
  }
  let outline = build_outline(path, base_width)?;
  triangulate(&outline)
}

/// Brush settings for one stroke: everything the undo collaborator needs to
/// replay the stroke exactly, besides the sampled path itself.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeStyle {
  /// Stroke diameter at full pressure, in canvas units.
  pub base_width: f64,
  /// Stroke color (ignored by the eraser).
  pub color: Rgba,
  /// Eraser strokes knock down alpha in the authoring layer instead of
  /// depositing color.
  pub is_eraser: bool,
}

impl StrokeStyle {
  pub fn brush(base_width: f64, color: Rgba) -> Self {
    Self {
      base_width,
      color,
      is_eraser: false,
    }
  }

  pub fn eraser(base_width: f64) -> Self {
    Self {
      base_width,
      color: Rgba::TRANSPARENT,
      is_eraser: true,
    }
  }
}

/// A simple closed polygon outline in sample space.
///
/// Invariants (enforced by `build_outline`, assumed by `triangulate`):
/// at least 3 vertices, consistent counter-clockwise winding, no crossing
/// edges. Closed-loop outlines additionally carry one zero-width bridge
/// (two coincident edges) joining their nested rings; such rings are
/// meshed via `triangulate_loop`, not ear clipping.
#[derive(Debug, Clone, Default)]
pub struct Polygon {
  vertices: Vec<Point>,
}

impl Polygon {
  /// Wraps a vertex list, normalizing winding to counter-clockwise
  /// (positive signed area) and dropping consecutive duplicates.
  pub fn new(mut vertices: Vec<Point>) -> Self {
    vertices.dedup_by(|a, b| a.distance_to(*b) < 1e-9);
    if vertices.len() > 1 {
      if let (Some(first), Some(last)) = (vertices.first().copied(), vertices.last().copied()) {
        if first.distance_to(last) < 1e-9 {
          vertices.pop();
        }
      }
    }
    let mut polygon = Self { vertices };
    if polygon.signed_area() < 0.0 {
      polygon.vertices.reverse();
    }
    polygon
  }

  pub fn vertices(&self) -> &[Point] {
    &self.vertices
  }

  pub fn len(&self) -> usize {
    self.vertices.len()
  }

  pub fn is_empty(&self) -> bool {
    self.vertices.is_empty()
  }

  /// Shoelace signed area: positive for counter-clockwise winding.
  pub fn signed_area(&self) -> f64 {
    let n = self.vertices.len();
    if n < 3 {
      return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
      let a = self.vertices[i];
      let b = self.vertices[(i + 1) % n];
      sum += a.x * b.y - b.x * a.y;
    }
    sum / 2.0
  }

  /// Absolute enclosed area.
  pub fn area(&self) -> f64 {
    self.signed_area().abs()
  }
}
