//! Layer compositing: straight-alpha Porter-Duff "over" with blend modes
//!
//! Composites the layer stack bottom-to-top into one output buffer. The
//! whole pass is per-pixel independent, which is what makes the dirty-rect
//! contract hold by construction: recompositing any sub-rectangle produces
//! exactly the pixels a full recompute would produce there.
//!
//! All math is straight-alpha:
//!
//! ```text
//! out_a = src_a + dst_a * (1 - src_a)
//! out_c = (src_c * src_a + dst_c * dst_a * (1 - src_a)) / out_a
//! ```
//!
//! with `src_a = pixel_alpha * layer_opacity` and a guard for `out_a == 0`.
//! Blend modes other than `Normal` rewrite the source color term against the
//! accumulated backdrop before the over step, weighted by backdrop alpha as
//! in the W3C compositing model.

use crate::error::{CompositeError, RasterError};
use crate::geometry::DirtyRect;
use crate::layer::{BlendMode, LayerId, LayerStack};
use crate::raster::PixelBuffer;

/// Composites an ordered layer stack into one owned output buffer.
///
/// The output buffer is overwritten (never accumulated across frames)
/// within the requested region; pixels outside the region keep their
/// previous composited contents, which is what makes partial recomposition
/// cheap and correct.
#[derive(Debug)]
pub struct Compositor {
  output: PixelBuffer,
}

impl Compositor {
  /// Creates a compositor for a canvas of the given size.
  pub fn new(width: u32, height: u32) -> Result<Self, RasterError> {
    Ok(Self {
      output: PixelBuffer::new(width, height)?,
    })
  }

  #[inline]
  pub fn width(&self) -> u32 {
    self.output.width()
  }

  #[inline]
  pub fn height(&self) -> u32 {
    self.output.height()
  }

  /// The most recently composited image.
  pub fn output(&self) -> &PixelBuffer {
    &self.output
  }

  /// Checks a dirty rect against the canvas without clamping.
  ///
  /// The compositing entry points recover from bad rects by clamping; this
  /// is the loud path for callers that want to surface contract violations
  /// during development.
  pub fn validate_bounds(&self, rect: DirtyRect) -> Result<(), CompositeError> {
    let full = self.output.bounds();
    let inverted = rect.min_x > rect.max_x || rect.min_y > rect.max_y;
    let outside = rect.min_x < full.min_x
      || rect.min_y < full.min_y
      || rect.max_x > full.max_x
      || rect.max_y > full.max_y;
    if inverted || outside {
      return Err(CompositeError::BoundsInvalid {
        min_x: rect.min_x,
        min_y: rect.min_y,
        max_x: rect.max_x,
        max_y: rect.max_y,
        width: self.width(),
        height: self.height(),
      });
    }
    Ok(())
  }

  /// Recomposites the stack into the output buffer.
  ///
  /// `dirty = None` recomputes the full canvas (e.g. after a resize);
  /// `Some(rect)` touches only the clamped rect. Invalid rects are clamped,
  /// and a rect that clamps to nothing is a no-op.
  ///
  /// # Errors
  ///
  /// `CompositeError::LayerSizeMismatch` when any visible layer's buffer
  /// does not match the canvas size.
  pub fn composite(
    &mut self,
    stack: &LayerStack,
    dirty: Option<DirtyRect>,
  ) -> Result<&PixelBuffer, CompositeError> {
    self.composite_with_override(stack, None, dirty)
  }

  /// Like [`composite`](Self::composite), but substitutes `buffer` for the
  /// contents of the layer identified by `id`.
  ///
  /// This is the incremental-preview seam: an in-progress stroke renders
  /// into a scratch copy of its owning layer, and the compositor reads the
  /// scratch instead of the (untouched) layer. Aborting the stroke is then
  /// a pure rollback: drop the scratch and recomposite.
  pub fn composite_with_override(
    &mut self,
    stack: &LayerStack,
    override_layer: Option<(LayerId, &PixelBuffer)>,
    dirty: Option<DirtyRect>,
  ) -> Result<&PixelBuffer, CompositeError> {
    let region = match dirty {
      Some(rect) => rect.clamped_to(self.width(), self.height()),
      None => self.output.bounds(),
    };
    if region.is_empty() {
      return Ok(&self.output);
    }

    for layer in stack.iter() {
      let buffer = match override_layer {
        Some((id, buffer)) if id == layer.id() => buffer,
        _ => &layer.buffer,
      };
      if buffer.width() != self.width() || buffer.height() != self.height() {
        return Err(CompositeError::LayerSizeMismatch {
          layer_width: buffer.width(),
          layer_height: buffer.height(),
          width: self.width(),
          height: self.height(),
        });
      }
    }

    for y in region.min_y..region.max_y {
      for x in region.min_x..region.max_x {
        let px = self.composite_pixel(stack, override_layer, x as u32, y as u32);
        self.output.set_pixel(x as u32, y as u32, px);
      }
    }

    Ok(&self.output)
  }

  /// Accumulates one pixel bottom-to-top.
  fn composite_pixel(
    &self,
    stack: &LayerStack,
    override_layer: Option<(LayerId, &PixelBuffer)>,
    x: u32,
    y: u32,
  ) -> [u8; 4] {
    // Accumulated backdrop: straight color channels (0..255) and alpha (0..1).
    let mut dst_rgb = [0.0f32; 3];
    let mut dst_a = 0.0f32;

    for layer in stack.iter() {
      if !layer.visible || layer.opacity <= 0.0 {
        continue;
      }
      let buffer = match override_layer {
        Some((id, buffer)) if id == layer.id() => buffer,
        _ => &layer.buffer,
      };
      let src = buffer.pixel(x, y);
      let src_a = (src[3] as f32 / 255.0) * layer.opacity;
      if src_a <= 0.0 {
        continue;
      }

      let src_rgb = [src[0] as f32, src[1] as f32, src[2] as f32];
      let blended = blend_color_term(layer.blend_mode, src_rgb, dst_rgb);
      // W3C compositing: the blend result only applies where backdrop
      // exists; transparent backdrop keeps the raw source color.
      let mixed = [
        src_rgb[0] + (blended[0] - src_rgb[0]) * dst_a,
        src_rgb[1] + (blended[1] - src_rgb[1]) * dst_a,
        src_rgb[2] + (blended[2] - src_rgb[2]) * dst_a,
      ];

      let out_a = src_a + dst_a * (1.0 - src_a);
      if out_a <= 0.0 {
        dst_rgb = [0.0; 3];
        dst_a = 0.0;
        continue;
      }
      for c in 0..3 {
        dst_rgb[c] = (mixed[c] * src_a + dst_rgb[c] * dst_a * (1.0 - src_a)) / out_a;
      }
      dst_a = out_a;
    }

    [
      (dst_rgb[0] + 0.5) as u8,
      (dst_rgb[1] + 0.5) as u8,
      (dst_rgb[2] + 0.5) as u8,
      (dst_a * 255.0 + 0.5) as u8,
    ]
  }

  /// Recomposites whatever regions the stack has accumulated as dirty,
  /// consuming them. Convenience wrapper for the per-event path.
  pub fn composite_dirty(&mut self, stack: &mut LayerStack) -> Result<&PixelBuffer, CompositeError> {
    let dirty = stack.take_dirty();
    if dirty.is_empty() {
      return Ok(&self.output);
    }
    self.composite(stack, Some(dirty))
  }
}

/// Computes the blend-mode color term `B(backdrop, source)` per channel.
///
/// `Normal` and `Erase` pass the source through (`Erase` is applied at
/// stroke commit inside the authoring layer, never between layers).
fn blend_color_term(mode: BlendMode, src: [f32; 3], dst: [f32; 3]) -> [f32; 3] {
  match mode {
    BlendMode::Normal | BlendMode::Erase => src,
    BlendMode::Multiply => [
      src[0] * dst[0] / 255.0,
      src[1] * dst[1] / 255.0,
      src[2] * dst[2] / 255.0,
    ],
    BlendMode::Add => [
      (src[0] + dst[0]).min(255.0),
      (src[1] + dst[1]).min(255.0),
      (src[2] + dst[2]).min(255.0),
    ],
    BlendMode::Screen => [
      255.0 - (255.0 - src[0]) * (255.0 - dst[0]) / 255.0,
      255.0 - (255.0 - src[1]) * (255.0 - dst[1]) / 255.0,
      255.0 - (255.0 - src[2]) * (255.0 - dst[2]) / 255.0,
    ],
    BlendMode::Overlay => {
      let channel = |b: f32, s: f32| {
        if b <= 127.5 {
          2.0 * b * s / 255.0
        } else {
          255.0 - 2.0 * (255.0 - b) * (255.0 - s) / 255.0
        }
      };
      [
        channel(dst[0], src[0]),
        channel(dst[1], src[1]),
        channel(dst[2], src[2]),
      ]
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::color::Rgba;

  fn two_layer_stack(bottom: Rgba, top: Rgba) -> (LayerStack, LayerId, LayerId) {
    let mut stack = LayerStack::new(4, 4);
    let b = stack.push_layer().unwrap();
    let t = stack.push_layer().unwrap();
    stack.layer_mut(b).unwrap().fill(bottom);
    stack.layer_mut(t).unwrap().fill(top);
    (stack, b, t)
  }

  #[test]
  fn opaque_single_layer_is_reproduced_exactly() {
    let mut stack = LayerStack::new(4, 4);
    let id = stack.push_layer().unwrap();
    stack.layer_mut(id).unwrap().fill(Rgba::new(13, 77, 200, 1.0));
    let mut compositor = Compositor::new(4, 4).unwrap();
    let out = compositor.composite(&stack, None).unwrap();
    for y in 0..4 {
      for x in 0..4 {
        assert_eq!(out.pixel(x, y), [13, 77, 200, 255]);
      }
    }
  }

  #[test]
  fn half_blue_over_red_regression_fixture() {
    // Bottom opaque red, top blue at alpha 128/255: straight-alpha over
    // yields RGB ≈ (128, 0, 128).
    let (stack, _, _) = two_layer_stack(Rgba::RED, Rgba::from_rgba8(0, 0, 255, 128));
    let mut compositor = Compositor::new(4, 4).unwrap();
    let out = compositor.composite(&stack, None).unwrap();
    let px = out.pixel(2, 2);
    assert_eq!(px[3], 255);
    assert!((px[0] as i32 - 128).abs() <= 1, "r = {}", px[0]);
    assert_eq!(px[1], 0);
    assert!((px[2] as i32 - 128).abs() <= 1, "b = {}", px[2]);
  }

  #[test]
  fn layer_opacity_multiplies_pixel_alpha() {
    let (mut stack, _, top) = two_layer_stack(Rgba::RED, Rgba::BLUE);
    stack.layer_mut(top).unwrap().opacity = 0.5;
    let mut compositor = Compositor::new(4, 4).unwrap();
    let out = compositor.composite(&stack, None).unwrap();
    let px = out.pixel(0, 0);
    // Opaque blue at 50% layer opacity behaves like 50%-alpha blue.
    assert!((px[0] as i32 - 128).abs() <= 1);
    assert!((px[2] as i32 - 128).abs() <= 1);
  }

  #[test]
  fn invisible_layers_are_skipped() {
    let (mut stack, _, top) = two_layer_stack(Rgba::RED, Rgba::BLUE);
    stack.layer_mut(top).unwrap().visible = false;
    let mut compositor = Compositor::new(4, 4).unwrap();
    let out = compositor.composite(&stack, None).unwrap();
    assert_eq!(out.pixel(1, 1), [255, 0, 0, 255]);
  }

  #[test]
  fn dirty_rect_updates_only_inside() {
    let (mut stack, _, top) = two_layer_stack(Rgba::RED, Rgba::TRANSPARENT);
    let mut compositor = Compositor::new(4, 4).unwrap();
    compositor.composite(&stack, None).unwrap();

    // Change the top layer, recomposite only a corner.
    stack.layer_mut(top).unwrap().fill(Rgba::BLUE);
    let out = compositor
      .composite(&stack, Some(DirtyRect::new(0, 0, 2, 2)))
      .unwrap();
    assert_eq!(out.pixel(0, 0), [0, 0, 255, 255]);
    // Outside the rect the previous composite survives.
    assert_eq!(out.pixel(3, 3), [255, 0, 0, 255]);
  }

  #[test]
  fn invalid_rects_are_clamped_not_fatal() {
    let (stack, _, _) = two_layer_stack(Rgba::RED, Rgba::TRANSPARENT);
    let mut compositor = Compositor::new(4, 4).unwrap();
    // Inverted rect: clamps to empty, no-op.
    compositor
      .composite(&stack, Some(DirtyRect::new(3, 3, 1, 1)))
      .unwrap();
    // Out-of-bounds rect: clamps to the canvas.
    let out = compositor
      .composite(&stack, Some(DirtyRect::new(-10, -10, 100, 100)))
      .unwrap();
    assert_eq!(out.pixel(0, 0), [255, 0, 0, 255]);

    assert!(compositor.validate_bounds(DirtyRect::new(3, 3, 1, 1)).is_err());
    assert!(compositor.validate_bounds(DirtyRect::new(0, 0, 100, 4)).is_err());
    assert!(compositor.validate_bounds(DirtyRect::new(0, 0, 4, 4)).is_ok());
  }

  #[test]
  fn multiply_darkens_against_backdrop() {
    let (mut stack, _, top) = two_layer_stack(Rgba::new(200, 200, 200, 1.0), Rgba::new(128, 128, 128, 1.0));
    stack.layer_mut(top).unwrap().blend_mode = BlendMode::Multiply;
    let mut compositor = Compositor::new(4, 4).unwrap();
    let out = compositor.composite(&stack, None).unwrap();
    let px = out.pixel(0, 0);
    // 200 * 128 / 255 ≈ 100.
    assert!((px[0] as i32 - 100).abs() <= 1, "r = {}", px[0]);
  }

  #[test]
  fn screen_lightens_against_backdrop() {
    let (mut stack, _, top) = two_layer_stack(Rgba::new(100, 100, 100, 1.0), Rgba::new(100, 100, 100, 1.0));
    stack.layer_mut(top).unwrap().blend_mode = BlendMode::Screen;
    let mut compositor = Compositor::new(4, 4).unwrap();
    let out = compositor.composite(&stack, None).unwrap();
    // 255 - (155 * 155) / 255 ≈ 161.
    let px = out.pixel(0, 0);
    assert!((px[0] as i32 - 161).abs() <= 1, "r = {}", px[0]);
  }

  #[test]
  fn blend_modes_ignore_transparent_backdrop() {
    // Multiply over nothing must not darken toward black.
    let mut stack = LayerStack::new(4, 4);
    let id = stack.push_layer().unwrap();
    stack.layer_mut(id).unwrap().fill(Rgba::new(200, 150, 100, 1.0));
    stack.layer_mut(id).unwrap().blend_mode = BlendMode::Multiply;
    let mut compositor = Compositor::new(4, 4).unwrap();
    let out = compositor.composite(&stack, None).unwrap();
    assert_eq!(out.pixel(0, 0), [200, 150, 100, 255]);
  }

  #[test]
  fn composite_dirty_drains_stack_regions() {
    let (mut stack, _, top) = two_layer_stack(Rgba::RED, Rgba::TRANSPARENT);
    let mut compositor = Compositor::new(4, 4).unwrap();
    compositor.composite(&stack, None).unwrap();

    stack.layer_mut(top).unwrap().fill(Rgba::GREEN);
    compositor.composite_dirty(&mut stack).unwrap();
    assert_eq!(compositor.output().pixel(3, 3), [0, 255, 0, 255]);
    assert!(stack.take_dirty().is_empty());
  }
}
