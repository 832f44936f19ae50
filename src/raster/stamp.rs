//! Disc-stamping fallback renderer
//!
//! Draws a stroke by stamping overlapping anti-aliased discs along the
//! sampled path. This path exists for three reasons: single-point dots,
//! recovery when triangulation fails, and CPU-only backends with no mesh
//! pipeline. It has no failure mode of its own — out-of-bounds coordinates
//! are clipped, never propagated.

use crate::geometry::{DirtyRect, Point};
use crate::input::StrokePath;
use crate::raster::PixelBuffer;
use crate::stroke::{StrokeStyle, PRESSURE_FLOOR};

/// Hard cap on stamps per segment so one very long, very fast pointer jump
/// cannot stall the frame.
const MAX_STEPS_PER_SEGMENT: usize = 512;

/// Stamps a whole stroke into `buffer` and returns the touched region.
///
/// Consecutive samples are bridged with sub-stamps spaced at
/// `max(0.5, width / 8)` so discs overlap without visible gaps; pressure is
/// interpolated linearly across each segment. In eraser mode only alpha is
/// reduced, RGB bytes are never written.
pub fn stamp_stroke(buffer: &mut PixelBuffer, path: &StrokePath, style: &StrokeStyle) -> DirtyRect {
  let samples = path.samples();
  let mut dirty = DirtyRect::EMPTY;

  let Some(first) = samples.first() else {
    return dirty;
  };

  let radius0 = disc_radius(style.base_width, first.pressure);
  dirty = dirty.union(stamp_disc(buffer, first.position(), radius0, style));

  for pair in samples.windows(2) {
    let (from, to) = (pair[0], pair[1]);
    let dist = from.position().distance_to(to.position());
    if dist <= 0.0 {
      continue;
    }

    let width = style.base_width * from.pressure.max(to.pressure).max(PRESSURE_FLOOR);
    let spacing = (width / 8.0).max(0.5);
    let steps = ((dist / spacing).ceil() as usize).clamp(1, MAX_STEPS_PER_SEGMENT);

    for step in 1..=steps {
      let t = step as f64 / steps as f64;
      let center = from.position().lerp(to.position(), t);
      let pressure = from.pressure + (to.pressure - from.pressure) * t;
      let radius = disc_radius(style.base_width, pressure);
      dirty = dirty.union(stamp_disc(buffer, center, radius, style));
    }
  }

  dirty.clamped_to(buffer.width(), buffer.height())
}

fn disc_radius(base_width: f64, pressure: f64) -> f64 {
  base_width * pressure.max(PRESSURE_FLOOR) / 2.0
}

/// Stamps one anti-aliased disc and returns its (clamped) pixel footprint.
///
/// Edge anti-aliasing is distance-based: fully opaque inside `radius - 0.5`,
/// a linear fade across `radius ± 0.5`, untouched beyond.
pub fn stamp_disc(
  buffer: &mut PixelBuffer,
  center: Point,
  radius: f64,
  style: &StrokeStyle,
) -> DirtyRect {
  let rect = DirtyRect::around_circle(center, radius).clamped_to(buffer.width(), buffer.height());
  if rect.is_empty() {
    return DirtyRect::EMPTY;
  }

  for y in rect.min_y..rect.max_y {
    for x in rect.min_x..rect.max_x {
      // Distance from the pixel center to the disc center.
      let px = x as f64 + 0.5;
      let py = y as f64 + 0.5;
      let dist = Point::new(px, py).distance_to(center);

      let coverage = if dist <= radius - 0.5 {
        1.0
      } else if dist < radius + 0.5 {
        radius + 0.5 - dist
      } else {
        continue;
      };

      if style.is_eraser {
        buffer.knock_out_alpha(x as u32, y as u32, coverage as f32);
      } else {
        let src = style.color.with_alpha_scaled(coverage as f32);
        buffer.blend_pixel_over(x as u32, y as u32, src);
      }
    }
  }

  rect
}
