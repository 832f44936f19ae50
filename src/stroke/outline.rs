//! Variable-width stroke outline construction
//!
//! Converts a sampled stroke path into a closed polygon: the path is offset
//! to both sides by half the local (pressure-scaled) width along per-sample
//! normals, the two offset edges are joined, and open ends receive round
//! caps. Closed loops are joined seamlessly without caps.
//!
//! Vertex order of an open result: left edge forward, end cap, right edge
//! reversed, start cap — a single consistent ring the ear clipper can
//! consume directly. A closed loop is two nested rings; its polygon joins
//! them with a zero-width bridge at sample 0 (duplicated bridge vertices,
//! coincident bridge edges), which keeps the ring weakly simple and its
//! shoelace area equal to the ribbon area. Meshing a loop does not go
//! through ear clipping at all: `stroke_mesh` decomposes the offset bands
//! directly (see `triangulate_loop`).

use crate::error::GeometryError;
use crate::geometry::{Point, Vec2};
use crate::input::{InputSample, StrokePath};
use crate::stroke::Polygon;

/// Lower bound applied to recorded pressure so a zero-pressure stroke still
/// renders at a visible minimum width.
pub const PRESSURE_FLOOR: f64 = 0.1;

/// Segments per semicircular end cap. Eight keeps caps visually round at
/// typical brush sizes without inflating triangulation input.
const CAP_SEGMENTS: usize = 8;

/// Segments for the full-circle polygon of a single-point stroke.
const DOT_SEGMENTS: usize = 16;

/// Half of the pressure-scaled stroke width at one sample.
fn half_width(base_width: f64, pressure: f64) -> f64 {
  base_width * pressure.max(PRESSURE_FLOOR) / 2.0
}

/// Builds the closed outline polygon of a stroke.
///
/// - A single-point path becomes a full circle of the sample's radius.
/// - A path whose endpoints nearly coincide is joined as a closed loop
///   without caps (no seam artifact).
/// - Otherwise a ribbon with semicircular caps at both ends.
///
/// # Errors
///
/// `GeometryError::InsufficientPoints` when the path is empty or all of its
/// samples collapse to one position with no usable direction; the caller
/// recovers by stamping through the raster fallback.
pub fn build_outline(path: &StrokePath, base_width: f64) -> Result<Polygon, GeometryError> {
  let samples = path.samples();
  if samples.is_empty() {
    return Err(GeometryError::InsufficientPoints { needed: 1, got: 0 });
  }

  if path.is_single_point() {
    let center = samples[0].position();
    let radius = half_width(base_width, samples[0].pressure);
    return Ok(circle_polygon(center, radius));
  }

  if path.is_closed_shape() {
    let (left, right) = closed_bands(path, base_width)?;
    // Outer ring, bridge out at sample 0, inner ring traversed the other
    // way, bridge back. The two bridge edges coincide, so they contribute
    // zero area and the ring stays weakly simple.
    let n = left.len();
    let mut vertices = Vec::with_capacity(2 * n + 2);
    vertices.extend_from_slice(&left);
    vertices.push(left[0]);
    vertices.push(right[0]);
    vertices.extend(right.iter().skip(1).rev());
    vertices.push(right[0]);
    let polygon = Polygon::new(vertices);
    if polygon.len() < 3 {
      return Err(GeometryError::InsufficientPoints { needed: 3, got: 1 });
    }
    return Ok(polygon);
  }

  let normals = sample_normals(samples, false)?;

  let n = samples.len();
  let mut left = Vec::with_capacity(n);
  let mut right = Vec::with_capacity(n);
  for i in 0..n {
    let center = samples[i].position();
    let r = half_width(base_width, samples[i].pressure);
    left.push(center.offset(normals[i].scaled(r)));
    right.push(center.offset(normals[i].scaled(-r)));
  }

  let mut vertices = Vec::with_capacity(2 * n + 2 * CAP_SEGMENTS);
  vertices.extend_from_slice(&left);

  // End cap: sweep from the left edge through the forward tangent to the
  // right edge.
  let end = samples[n - 1].position();
  let r = half_width(base_width, samples[n - 1].pressure);
  let tangent = forward_tangent(samples, n - 1);
  append_cap(&mut vertices, end, r, normals[n - 1], tangent);

  vertices.extend(right.iter().rev());

  // Start cap: sweep from the right edge through the backward tangent
  // back to the left edge.
  let start = samples[0].position();
  let r = half_width(base_width, samples[0].pressure);
  let tangent = forward_tangent(samples, 0).scaled(-1.0);
  append_cap(&mut vertices, start, r, normals[0].scaled(-1.0), tangent);

  let polygon = Polygon::new(vertices);
  if polygon.len() < 3 {
    return Err(GeometryError::InsufficientPoints {
      needed: 2,
      got: 1,
    });
  }
  Ok(polygon)
}

/// Left/right offset bands of a closed-loop path, one cross-section per
/// sample with wraparound normals.
///
/// Loops are meshed directly from these bands (`triangulate_loop`) rather
/// than through the single-ring ear clipper, which cannot digest the bridge
/// between the two nested rings of a loop outline.
///
/// # Errors
///
/// `GeometryError::InsufficientPoints` for paths with fewer than three
/// samples or no resolvable direction.
pub(crate) fn closed_bands(
  path: &StrokePath,
  base_width: f64,
) -> Result<(Vec<Point>, Vec<Point>), GeometryError> {
  let samples = path.samples();
  if samples.len() < 3 {
    return Err(GeometryError::InsufficientPoints {
      needed: 3,
      got: samples.len(),
    });
  }
  let normals = sample_normals(samples, true)?;
  let mut left = Vec::with_capacity(samples.len());
  let mut right = Vec::with_capacity(samples.len());
  for (sample, normal) in samples.iter().zip(&normals) {
    let r = half_width(base_width, sample.pressure);
    left.push(sample.position().offset(normal.scaled(r)));
    right.push(sample.position().offset(normal.scaled(-r)));
  }
  Ok((left, right))
}

/// Per-sample unit normals.
///
/// Interior samples use the central difference of their neighbors; the ends
/// use forward/backward differences, or wrap around for closed loops.
/// Samples with no resolvable direction (coincident neighbors) inherit the
/// nearest valid normal.
fn sample_normals(samples: &[InputSample], closed: bool) -> Result<Vec<Vec2>, GeometryError> {
  let n = samples.len();
  let mut normals = vec![None; n];

  for i in 0..n {
    let (prev, next) = if closed {
      ((i + n - 1) % n, (i + 1) % n)
    } else {
      (i.saturating_sub(1), (i + 1).min(n - 1))
    };
    let dir = samples[prev].position().vector_to(samples[next].position());
    normals[i] = dir.normalized().map(Vec2::perpendicular);
  }

  // Fill gaps from the nearest valid neighbor, scanning forward then back.
  let mut last_valid = None;
  for normal in normals.iter_mut() {
    match normal {
      Some(v) => last_valid = Some(*v),
      None => *normal = last_valid,
    }
  }
  let mut last_valid = None;
  for normal in normals.iter_mut().rev() {
    match normal {
      Some(v) => last_valid = Some(*v),
      None => *normal = last_valid,
    }
  }

  normals
    .into_iter()
    .collect::<Option<Vec<_>>>()
    .ok_or(GeometryError::InsufficientPoints { needed: 2, got: 1 })
}

/// Direction of travel at sample `i` (not normalized input, normalized
/// output; falls back to +X for fully degenerate data, which `sample_normals`
/// has already rejected).
fn forward_tangent(samples: &[InputSample], i: usize) -> Vec2 {
  let n = samples.len();
  let (from, to) = if i == 0 {
    (0, 1.min(n - 1))
  } else {
    (i - 1, i)
  };
  samples[from]
    .position()
    .vector_to(samples[to].position())
    .normalized()
    .unwrap_or(Vec2::new(1.0, 0.0))
}

/// Appends the interior points of a semicircular cap.
///
/// The sweep runs from `normal` (the edge the caller just emitted) through
/// `tangent` to `-normal` (the edge emitted next); the two endpoints
/// themselves are already present as edge offsets, so only the fan interior
/// is appended.
fn append_cap(vertices: &mut Vec<Point>, center: Point, radius: f64, normal: Vec2, tangent: Vec2) {
  for k in 1..CAP_SEGMENTS {
    let theta = std::f64::consts::PI * k as f64 / CAP_SEGMENTS as f64;
    let dir = normal.scaled(theta.cos()).add(tangent.scaled(theta.sin()));
    vertices.push(center.offset(dir.scaled(radius)));
  }
}

/// Full-circle polygon for a stationary stroke.
fn circle_polygon(center: Point, radius: f64) -> Polygon {
  let mut vertices = Vec::with_capacity(DOT_SEGMENTS);
  for k in 0..DOT_SEGMENTS {
    let theta = std::f64::consts::TAU * k as f64 / DOT_SEGMENTS as f64;
    vertices.push(Point::new(
      center.x + radius * theta.cos(),
      center.y + radius * theta.sin(),
    ));
  }
  Polygon::new(vertices)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::input::InputSample;

  fn line_path(points: &[(f64, f64, f64)]) -> StrokePath {
    StrokePath::from_samples(
      points
        .iter()
        .map(|&(x, y, p)| InputSample::new(x, y, p))
        .collect(),
    )
  }

  /// Max distance from `center` among outline vertices near x == `x`.
  fn half_width_near(polygon: &Polygon, x: f64, y: f64) -> f64 {
    polygon
      .vertices()
      .iter()
      .filter(|v| (v.x - x).abs() < 1.0)
      .map(|v| (v.y - y).abs())
      .fold(0.0, f64::max)
  }

  #[test]
  fn outline_is_closed_ring() {
    let path = line_path(&[(0.0, 0.0, 0.5), (10.0, 0.0, 0.5), (20.0, 0.0, 0.5)]);
    let polygon = build_outline(&path, 8.0).unwrap();
    assert!(polygon.len() >= 3);
    // Polygon::new treats the ring as implicitly closed; walking one step
    // past the end must land back at the start.
    let first = polygon.vertices()[0];
    let last = polygon.vertices()[polygon.len() - 1];
    assert!(first.distance_to(last) > 1e-9, "ring stores no duplicate seam vertex");
    assert!(polygon.area() > 0.0);
  }

  #[test]
  fn width_tracks_pressure_with_floor() {
    let path = line_path(&[(0.0, 0.0, 0.0), (10.0, 0.0, 0.0), (20.0, 0.0, 0.0)]);
    let polygon = build_outline(&path, 10.0).unwrap();
    // Pressure 0 must still give base_width * PRESSURE_FLOOR.
    let hw = half_width_near(&polygon, 10.0, 0.0);
    assert!((hw - 10.0 * PRESSURE_FLOOR / 2.0).abs() < 1e-6, "got {hw}");
  }

  #[test]
  fn three_point_pressure_scenario() {
    // Width must track pressure monotonically: wide at the heavy middle
    // sample, narrower at the light ends.
    let path = line_path(&[(0.0, 0.0, 0.2), (10.0, 0.0, 0.8), (20.0, 0.0, 0.2)]);
    let polygon = build_outline(&path, 10.0).unwrap();
    let end_hw = half_width_near(&polygon, 0.0, 0.0);
    let mid_hw = half_width_near(&polygon, 10.0, 0.0);
    assert!((mid_hw - 4.0).abs() < 1e-6, "middle half-width {mid_hw}");
    assert!(end_hw < mid_hw);
    assert!((end_hw - 1.0).abs() < 1e-6, "end half-width {end_hw}");
  }

  #[test]
  fn single_point_becomes_circle() {
    let path = line_path(&[(5.0, 5.0, 1.0)]);
    let polygon = build_outline(&path, 6.0).unwrap();
    // Every vertex sits on the radius-3 circle.
    for v in polygon.vertices() {
      let d = v.distance_to(Point::new(5.0, 5.0));
      assert!((d - 3.0).abs() < 1e-9);
    }
  }

  #[test]
  fn empty_path_is_insufficient() {
    let path = StrokePath::from_samples(vec![]);
    assert!(matches!(
      build_outline(&path, 4.0),
      Err(GeometryError::InsufficientPoints { .. })
    ));
  }

  #[test]
  fn closed_loop_emits_no_caps() {
    // A loop around a square, returning to the start.
    let mut pts = vec![];
    for &(x, y) in &[
      (0.0, 0.0),
      (30.0, 0.0),
      (30.0, 30.0),
      (0.0, 30.0),
      (0.5, 0.5),
    ] {
      pts.push((x, y, 1.0));
    }
    let path = line_path(&pts);
    assert!(path.is_closed_shape());
    let polygon = build_outline(&path, 4.0).unwrap();
    // No cap fans: the two offset rings plus the two bridge vertices.
    assert!(polygon.len() <= 2 * path.len() + 2);
    assert!(polygon.area() > 0.0);
  }

  #[test]
  fn closed_loop_outline_area_is_the_ribbon_area() {
    // A loop's outline ring bridges its two offset rings with coincident
    // zero-area edges, so the shoelace area must be outer minus inner.
    let mut pts = vec![];
    for k in 0..72 {
      let theta = std::f64::consts::TAU * k as f64 / 72.0;
      pts.push((50.0 + 20.0 * theta.cos(), 50.0 + 20.0 * theta.sin(), 1.0));
    }
    let path = line_path(&pts);
    assert!(path.is_closed_shape());
    let polygon = build_outline(&path, 4.0).unwrap();
    // Regular 72-gon rings with circumradii 22 and 18; ring area is
    // n/2 * sin(tau/n) * (R^2 - r^2).
    let expected = 36.0 * (std::f64::consts::TAU / 72.0).sin() * (22.0 * 22.0 - 18.0 * 18.0);
    assert!(
      (polygon.area() - expected).abs() < expected * 1e-2,
      "outline area {} vs ring area {expected}",
      polygon.area()
    );
  }

  #[test]
  fn open_stroke_round_caps_extend_past_endpoints() {
    let path = line_path(&[(0.0, 0.0, 1.0), (20.0, 0.0, 1.0)]);
    let polygon = build_outline(&path, 10.0).unwrap();
    let min_x = polygon.vertices().iter().map(|v| v.x).fold(f64::MAX, f64::min);
    let max_x = polygon.vertices().iter().map(|v| v.x).fold(f64::MIN, f64::max);
    // Round caps push the extremes out by up to the half-width.
    assert!(min_x < -3.0, "start cap reaches {min_x}");
    assert!(max_x > 23.0, "end cap reaches {max_x}");
  }
}
