//! Straight-alpha RGBA8 pixel buffer
//!
//! Allocation is guarded up front: zero or overflowing dimensions and
//! over-limit byte sizes fail with `RasterError` before any memory is
//! reserved, and the reservation itself uses `try_reserve_exact` so an
//! allocator failure surfaces as an error instead of aborting the process.

use crate::color::Rgba;
use crate::error::RasterError;
use crate::geometry::DirtyRect;

const BYTES_PER_PIXEL: u64 = 4;

/// Upper bound on a single buffer allocation to avoid process aborts on OOM.
pub(crate) const MAX_BUFFER_BYTES: u64 = 512 * 1024 * 1024;

fn guard_dimensions(width: u32, height: u32, context: &str) -> Result<usize, RasterError> {
  if width == 0 || height == 0 {
    return Err(RasterError::InvalidDimensions {
      message: format!("{context}: buffer size is zero ({width}x{height})"),
    });
  }

  let pixels = (width as u64)
    .checked_mul(height as u64)
    .ok_or(RasterError::InvalidDimensions {
      message: format!("{context}: buffer dimensions overflow ({width}x{height})"),
    })?;
  let bytes = pixels
    .checked_mul(BYTES_PER_PIXEL)
    .ok_or(RasterError::InvalidDimensions {
      message: format!("{context}: buffer byte size overflow ({width}x{height})"),
    })?;
  if bytes > MAX_BUFFER_BYTES {
    return Err(RasterError::InvalidDimensions {
      message: format!(
        "{context}: buffer {width}x{height} would allocate {bytes} bytes (limit {MAX_BUFFER_BYTES})"
      ),
    });
  }

  Ok(bytes as usize)
}

/// A straight-alpha RGBA8 raster surface.
///
/// Four bytes per pixel in `[r, g, b, a]` order, rows top to bottom. Alpha
/// is straight: color channels are stored at full intensity regardless of
/// transparency, and premultiplication happens only at the presenter
/// boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelBuffer {
  width: u32,
  height: u32,
  data: Vec<u8>,
}

impl PixelBuffer {
  /// Creates a transparent buffer.
  ///
  /// # Errors
  ///
  /// `RasterError::InvalidDimensions` for zero, overflowing, or over-limit
  /// sizes; `RasterError::AllocationFailed` when the reservation itself
  /// fails.
  pub fn new(width: u32, height: u32) -> Result<Self, RasterError> {
    let bytes = guard_dimensions(width, height, "pixel buffer")?;
    let mut data = Vec::new();
    data
      .try_reserve_exact(bytes)
      .map_err(|err| RasterError::AllocationFailed {
        message: format!("{width}x{height} buffer needs {bytes} bytes: {err}"),
      })?;
    data.resize(bytes, 0);
    Ok(Self {
      width,
      height,
      data,
    })
  }

  #[inline]
  pub fn width(&self) -> u32 {
    self.width
  }

  #[inline]
  pub fn height(&self) -> u32 {
    self.height
  }

  /// The full buffer extent as a dirty rect.
  pub fn bounds(&self) -> DirtyRect {
    DirtyRect::full(self.width, self.height)
  }

  /// Raw bytes, `[r, g, b, a]` per pixel, row-major.
  pub fn as_bytes(&self) -> &[u8] {
    &self.data
  }

  #[inline]
  fn offset(&self, x: u32, y: u32) -> usize {
    (y as usize * self.width as usize + x as usize) * 4
  }

  /// Reads one pixel as `[r, g, b, a]`. Coordinates must be in bounds.
  #[inline]
  pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
    let i = self.offset(x, y);
    [self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]]
  }

  /// Writes one pixel. Coordinates must be in bounds.
  #[inline]
  pub fn set_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
    let i = self.offset(x, y);
    self.data[i..i + 4].copy_from_slice(&rgba);
  }

  /// Resets every pixel to transparent black.
  pub fn clear(&mut self) {
    self.data.fill(0);
  }

  /// Fills the whole buffer with one color.
  pub fn fill(&mut self, color: Rgba) {
    let px = [color.r, color.g, color.b, color.alpha_u8()];
    for chunk in self.data.chunks_exact_mut(4) {
      chunk.copy_from_slice(&px);
    }
  }

  /// Composites `src` over the destination pixel with straight-alpha
  /// Porter-Duff "over". `src.a` already carries any coverage or opacity
  /// scaling the caller applied.
  ///
  /// Coordinates must be in bounds; stamping clips before calling this.
  pub fn blend_pixel_over(&mut self, x: u32, y: u32, src: Rgba) {
    if src.a <= 0.0 {
      return;
    }
    let dst = self.pixel(x, y);
    let out = blend_over([src.r, src.g, src.b], src.a, dst);
    self.set_pixel(x, y, out);
  }

  /// Multiplies the pixel's alpha by `1 - strength`, leaving RGB untouched.
  /// This is the eraser primitive.
  pub fn knock_out_alpha(&mut self, x: u32, y: u32, strength: f32) {
    if strength <= 0.0 {
      return;
    }
    let i = self.offset(x, y);
    let a = self.data[i + 3] as f32 / 255.0;
    self.data[i + 3] = ((a * (1.0 - strength.min(1.0))) * 255.0 + 0.5) as u8;
  }

  /// Copies the pixels of `src` inside `rect` into this buffer. The rect
  /// is clamped to the overlap of both buffers, so mismatched sizes copy
  /// what fits rather than failing.
  pub fn copy_rect_from(&mut self, src: &PixelBuffer, rect: DirtyRect) {
    // Clamp against both buffers so mismatched sizes copy the overlap
    // instead of indexing out of bounds.
    let rect = rect.clamped_to(self.width.min(src.width), self.height.min(src.height));
    if rect.is_empty() {
      return;
    }
    let row = (rect.max_x - rect.min_x) as usize * 4;
    for y in rect.min_y..rect.max_y {
      let dst_start = self.offset(rect.min_x as u32, y as u32);
      let src_start = src.offset(rect.min_x as u32, y as u32);
      self.data[dst_start..dst_start + row]
        .copy_from_slice(&src.data[src_start..src_start + row]);
    }
  }

  /// Clears the pixels inside `rect` to transparent black.
  pub fn clear_rect(&mut self, rect: DirtyRect) {
    let rect = rect.clamped_to(self.width, self.height);
    if rect.is_empty() {
      return;
    }
    for y in rect.min_y..rect.max_y {
      let start = self.offset(rect.min_x as u32, y as u32);
      let end = self.offset(rect.max_x as u32 - 1, y as u32) + 4;
      self.data[start..end].fill(0);
    }
  }
}

/// Straight-alpha Porter-Duff "over" on one pixel.
///
/// `out_a = src_a + dst_a * (1 - src_a)`;
/// `out_c = (src_c * src_a + dst_c * dst_a * (1 - src_a)) / out_a`,
/// guarded for `out_a == 0`.
pub fn blend_over(src_rgb: [u8; 3], src_a: f32, dst: [u8; 4]) -> [u8; 4] {
  let da = dst[3] as f32 / 255.0;
  let sa = src_a.clamp(0.0, 1.0);
  let out_a = sa + da * (1.0 - sa);
  if out_a <= 0.0 {
    return [0, 0, 0, 0];
  }
  let blend = |s: u8, d: u8| -> u8 {
    let c = (s as f32 * sa + d as f32 * da * (1.0 - sa)) / out_a;
    (c + 0.5) as u8
  };
  [
    blend(src_rgb[0], dst[0]),
    blend(src_rgb[1], dst[1]),
    blend(src_rgb[2], dst[2]),
    (out_a * 255.0 + 0.5) as u8,
  ]
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn rejects_zero_dimensions() {
    assert!(matches!(
      PixelBuffer::new(0, 10),
      Err(RasterError::InvalidDimensions { .. })
    ));
    assert!(matches!(
      PixelBuffer::new(10, 0),
      Err(RasterError::InvalidDimensions { .. })
    ));
  }

  #[test]
  fn rejects_overflow_and_limit() {
    assert!(PixelBuffer::new(u32::MAX, u32::MAX).is_err());
    let too_wide = (MAX_BUFFER_BYTES / BYTES_PER_PIXEL + 1) as u32;
    assert!(PixelBuffer::new(too_wide, 1).is_err());
  }

  #[test]
  fn allocates_transparent() {
    let buf = PixelBuffer::new(4, 3).unwrap();
    assert_eq!(buf.as_bytes().len(), 48);
    assert!(buf.as_bytes().iter().all(|&b| b == 0));
  }

  #[test]
  fn over_on_transparent_destination_keeps_source_color() {
    // Straight alpha: a half-transparent source over nothing keeps its RGB
    // at full intensity, only alpha is reduced.
    let out = blend_over([200, 100, 50], 0.5, [0, 0, 0, 0]);
    assert_eq!(out, [200, 100, 50, 128]);
  }

  #[test]
  fn half_blue_over_opaque_red_is_purple() {
    // Regression fixture: 50%-alpha blue over opaque red.
    let out = blend_over([0, 0, 255], 128.0 / 255.0, [255, 0, 0, 255]);
    assert_eq!(out[3], 255);
    assert!((out[0] as i32 - 128).abs() <= 1, "r = {}", out[0]);
    assert_eq!(out[1], 0);
    assert!((out[2] as i32 - 128).abs() <= 1, "b = {}", out[2]);
  }

  #[test]
  fn knock_out_touches_only_alpha() {
    let mut buf = PixelBuffer::new(2, 2).unwrap();
    buf.set_pixel(1, 1, [10, 20, 30, 200]);
    buf.knock_out_alpha(1, 1, 0.5);
    let px = buf.pixel(1, 1);
    assert_eq!(&px[..3], &[10, 20, 30]);
    assert_eq!(px[3], 100);
  }

  #[test]
  fn copy_rect_is_clamped() {
    let mut dst = PixelBuffer::new(4, 4).unwrap();
    let mut src = PixelBuffer::new(4, 4).unwrap();
    src.fill(Rgba::RED);
    dst.copy_rect_from(&src, DirtyRect::new(2, 2, 100, 100));
    assert_eq!(dst.pixel(2, 2), [255, 0, 0, 255]);
    assert_eq!(dst.pixel(1, 1), [0, 0, 0, 0]);
  }

  #[test]
  fn copy_rect_between_mismatched_buffers_copies_the_overlap() {
    let mut small = PixelBuffer::new(4, 4).unwrap();
    small.fill(Rgba::GREEN);

    // Larger destination: only the source extent is written.
    let mut dst = PixelBuffer::new(8, 8).unwrap();
    dst.copy_rect_from(&small, DirtyRect::new(0, 0, 8, 8));
    assert_eq!(dst.pixel(3, 3), [0, 255, 0, 255]);
    assert_eq!(dst.pixel(4, 4), [0, 0, 0, 0]);
    assert_eq!(dst.pixel(4, 2), [0, 0, 0, 0]);

    // Smaller destination: only its own extent is written.
    let mut big = PixelBuffer::new(8, 8).unwrap();
    big.fill(Rgba::BLUE);
    let mut tiny = PixelBuffer::new(2, 2).unwrap();
    tiny.copy_rect_from(&big, DirtyRect::new(0, 0, 8, 8));
    assert_eq!(tiny.pixel(1, 1), [0, 0, 255, 255]);
  }
}
