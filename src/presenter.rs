//! Display presentation: straight-alpha output to a visible surface
//!
//! The engine composites in straight alpha; display surfaces (and
//! tiny-skia, which backs them here) want premultiplied pixels. This module
//! is the boundary where the conversion happens — nowhere else in the crate
//! touches premultiplied data.

use crate::error::BackendError;
use crate::raster::PixelBuffer;
use tiny_skia::{Pixmap, PremultipliedColorU8};

/// Receiver for finished frames. Implementations own the real surface
/// (window, texture); the presenter never manages surface lifecycle.
pub trait PresentTarget {
  fn present(&mut self, frame: &Pixmap) -> Result<(), BackendError>;
}

/// Converts composited images to premultiplied pixmaps and pushes them to a
/// present target. Owns one staging pixmap, reused across frames.
#[derive(Debug)]
pub struct DisplayPresenter {
  staging: Pixmap,
}

impl DisplayPresenter {
  /// Creates a presenter for a canvas of the given size.
  pub fn new(width: u32, height: u32) -> Result<Self, BackendError> {
    let staging = Pixmap::new(width, height).ok_or(BackendError::ResourceUnavailable {
      message: format!("staging pixmap {width}x{height} could not be created"),
    })?;
    Ok(Self { staging })
  }

  /// The staging pixmap holding the last converted frame.
  pub fn staging(&self) -> &Pixmap {
    &self.staging
  }

  /// Converts `image` (straight alpha) into the staging pixmap
  /// (premultiplied) and hands it to `target`.
  ///
  /// # Errors
  ///
  /// `BackendError::ResourceUnavailable` when the image size does not match
  /// the staging surface (the host must recreate the presenter on resize),
  /// or when the target rejects the frame. Either way the failure covers
  /// this frame only.
  pub fn present(
    &mut self,
    image: &PixelBuffer,
    target: &mut dyn PresentTarget,
  ) -> Result<(), BackendError> {
    if image.width() != self.staging.width() || image.height() != self.staging.height() {
      return Err(BackendError::ResourceUnavailable {
        message: format!(
          "frame {}x{} does not match staging {}x{}",
          image.width(),
          image.height(),
          self.staging.width(),
          self.staging.height()
        ),
      });
    }

    let src = image.as_bytes();
    for (i, px) in self.staging.pixels_mut().iter_mut().enumerate() {
      let r = src[i * 4];
      let g = src[i * 4 + 1];
      let b = src[i * 4 + 2];
      let a = src[i * 4 + 3];
      *px = premultiply(r, g, b, a);
    }

    target.present(&self.staging)
  }
}

/// Straight → premultiplied conversion for one pixel.
fn premultiply(r: u8, g: u8, b: u8, a: u8) -> PremultipliedColorU8 {
  let scale = |c: u8| ((c as u16 * a as u16 + 127) / 255) as u8;
  // Components never exceed alpha after scaling, so this cannot fail; the
  // transparent fallback only guards the arithmetic contract.
  PremultipliedColorU8::from_rgba(scale(r), scale(g), scale(b), a)
    .unwrap_or(PremultipliedColorU8::TRANSPARENT)
}
