//! Simple-polygon triangulation by ear clipping
//!
//! Stroke outlines are simple polygons by construction, with vertex counts
//! in the tens to low hundreds, so the O(n²) ear-clipping loop is the right
//! trade: every branch is plain geometry that can be unit-tested against the
//! shoelace area, and there is no library failure mode to paper over.
//!
//! Collinear vertices are clipped without emitting their zero-area triangle.
//! If a full pass over the remaining ring finds no ear, the polygon was not
//! simple after all and `TriangulationFailed` is returned; the caller falls
//! back to raster stamping.
//!
//! Closed-loop outlines are two nested rings, which ear clipping cannot
//! digest; `triangulate_loop` decomposes them directly into a wrap-around
//! strip of quads between consecutive cross-sections instead.

use crate::error::GeometryError;
use crate::geometry::Point;
use crate::stroke::Polygon;

/// Tolerance (in squared-area units) below which a corner is treated as
/// collinear rather than convex or reflex.
const COLLINEAR_EPS: f64 = 1e-12;

/// A triangle list ready for GPU submission.
///
/// Vertices are f32 pairs (sample-space coordinates); indices come in
/// triples and always satisfy `index < vertices.len()`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriangleMesh {
  pub vertices: Vec<[f32; 2]>,
  pub indices: Vec<u32>,
}

impl TriangleMesh {
  /// Number of triangles.
  pub fn triangle_count(&self) -> usize {
    self.indices.len() / 3
  }

  /// Sum of unsigned triangle areas.
  ///
  /// For a valid triangulation of a simple polygon this equals the
  /// polygon's shoelace area (no gaps, no overlaps).
  pub fn area(&self) -> f64 {
    let mut total = 0.0;
    for tri in self.indices.chunks_exact(3) {
      let a = self.vertices[tri[0] as usize];
      let b = self.vertices[tri[1] as usize];
      let c = self.vertices[tri[2] as usize];
      let cross = (b[0] as f64 - a[0] as f64) * (c[1] as f64 - a[1] as f64)
        - (c[0] as f64 - a[0] as f64) * (b[1] as f64 - a[1] as f64);
      total += cross.abs() / 2.0;
    }
    total
  }
}

/// Twice the signed area of triangle `abc` (positive when counter-clockwise
/// in the polygon's normalized winding).
fn cross(a: Point, b: Point, c: Point) -> f64 {
  (b.x - a.x) * (c.y - a.y) - (c.x - a.x) * (b.y - a.y)
}

/// True when `p` lies strictly inside triangle `abc` (boundary excluded, so
/// shared ring vertices do not block ear candidacy).
fn point_in_triangle(p: Point, a: Point, b: Point, c: Point) -> bool {
  let d1 = cross(a, b, p);
  let d2 = cross(b, c, p);
  let d3 = cross(c, a, p);
  let has_neg = d1 < -COLLINEAR_EPS || d2 < -COLLINEAR_EPS || d3 < -COLLINEAR_EPS;
  let has_pos = d1 > COLLINEAR_EPS || d2 > COLLINEAR_EPS || d3 > COLLINEAR_EPS;
  !(has_neg && has_pos) && (has_neg || has_pos)
}

/// Triangulates a simple polygon into a `TriangleMesh`.
///
/// # Errors
///
/// `GeometryError::TriangulationFailed` for polygons with fewer than three
/// vertices, (near) zero area, or rings where no ear can be clipped. The
/// error is recoverable: render the same stroke through the raster fallback.
pub fn triangulate(polygon: &Polygon) -> Result<TriangleMesh, GeometryError> {
  let points = polygon.vertices();
  if points.len() < 3 {
    return Err(GeometryError::TriangulationFailed {
      reason: format!("polygon has {} vertices", points.len()),
    });
  }
  if polygon.area() < 1e-9 {
    return Err(GeometryError::TriangulationFailed {
      reason: "polygon area is zero".to_string(),
    });
  }

  let vertices: Vec<[f32; 2]> = points.iter().map(|p| [p.x as f32, p.y as f32]).collect();
  let mut indices = Vec::with_capacity((points.len() - 2) * 3);

  // Ring of original indices into `points`, shrunk one ear at a time.
  let mut ring: Vec<usize> = (0..points.len()).collect();

  while ring.len() > 3 {
    let mut clipped = false;

    for i in 0..ring.len() {
      let prev = ring[(i + ring.len() - 1) % ring.len()];
      let curr = ring[i];
      let next = ring[(i + 1) % ring.len()];
      let (a, b, c) = (points[prev], points[curr], points[next]);

      let corner = cross(a, b, c);
      if corner < -COLLINEAR_EPS {
        // Reflex corner, not an ear.
        continue;
      }

      if any_point_inside(points, &ring, prev, curr, next) {
        continue;
      }

      if corner > COLLINEAR_EPS {
        indices.extend_from_slice(&[prev as u32, curr as u32, next as u32]);
      }
      // Collinear corners are removed without a triangle.
      ring.remove(i);
      clipped = true;
      break;
    }

    if !clipped {
      return Err(GeometryError::TriangulationFailed {
        reason: format!("no ear found with {} vertices remaining", ring.len()),
      });
    }
  }

  let (a, b, c) = (points[ring[0]], points[ring[1]], points[ring[2]]);
  if cross(a, b, c).abs() > COLLINEAR_EPS {
    indices.extend_from_slice(&[ring[0] as u32, ring[1] as u32, ring[2] as u32]);
  }

  if indices.is_empty() {
    return Err(GeometryError::TriangulationFailed {
      reason: "all candidate triangles were degenerate".to_string(),
    });
  }

  Ok(TriangleMesh { vertices, indices })
}

/// Triangulates a closed ribbon directly from its two offset bands.
///
/// Each pair of consecutive cross-sections `(left[i], right[i])` /
/// `(left[i+1], right[i+1])` becomes one quad (two triangles), wrapping
/// around from the last cross-section back to the first. For smooth loops
/// the strip partitions the ribbon, so the triangle areas sum to the loop
/// outline's shoelace area (outer ring minus inner ring); a sharp corner at
/// the closing seam costs a small quad overlap instead of a gap.
///
/// # Errors
///
/// `GeometryError::TriangulationFailed` when the bands have mismatched
/// lengths or fewer than three cross-sections.
pub fn triangulate_loop(left: &[Point], right: &[Point]) -> Result<TriangleMesh, GeometryError> {
  let n = left.len();
  if n != right.len() || n < 3 {
    return Err(GeometryError::TriangulationFailed {
      reason: format!("ribbon bands with {} / {} cross-sections", n, right.len()),
    });
  }

  let mut vertices = Vec::with_capacity(2 * n);
  for i in 0..n {
    vertices.push([left[i].x as f32, left[i].y as f32]);
    vertices.push([right[i].x as f32, right[i].y as f32]);
  }

  let mut indices = Vec::with_capacity(6 * n);
  for i in 0..n {
    let j = (i + 1) % n;
    let (li, ri) = ((2 * i) as u32, (2 * i + 1) as u32);
    let (lj, rj) = ((2 * j) as u32, (2 * j + 1) as u32);
    indices.extend_from_slice(&[li, lj, rj, li, rj, ri]);
  }

  Ok(TriangleMesh { vertices, indices })
}

/// True when any remaining ring vertex (other than the ear's corners) lies
/// strictly inside the candidate ear triangle.
fn any_point_inside(points: &[Point], ring: &[usize], prev: usize, curr: usize, next: usize) -> bool {
  let (a, b, c) = (points[prev], points[curr], points[next]);
  ring
    .iter()
    .filter(|&&idx| idx != prev && idx != curr && idx != next)
    .any(|&idx| point_in_triangle(points[idx], a, b, c))
}
