//! Straight-alpha RGBA color
//!
//! One color type is used throughout: 8-bit channels with a float alpha,
//! always straight (non-premultiplied). Conversion to premultiplied form
//! happens only at the rendering-backend boundary (see `presenter`).

/// An RGBA color with straight alpha.
///
/// # Examples
///
/// ```
/// use inkboard::color::Rgba;
///
/// let red = Rgba::rgb(255, 0, 0);
/// assert_eq!(red.a, 1.0);
/// assert_eq!(red.alpha_u8(), 255);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
  /// Red component (0-255)
  pub r: u8,
  /// Green component (0-255)
  pub g: u8,
  /// Blue component (0-255)
  pub b: u8,
  /// Alpha component (0.0-1.0), straight
  pub a: f32,
}

impl Rgba {
  /// Fully transparent black
  pub const TRANSPARENT: Self = Self {
    r: 0,
    g: 0,
    b: 0,
    a: 0.0,
  };

  /// Opaque black
  pub const BLACK: Self = Self {
    r: 0,
    g: 0,
    b: 0,
    a: 1.0,
  };

  /// Opaque white
  pub const WHITE: Self = Self {
    r: 255,
    g: 255,
    b: 255,
    a: 1.0,
  };

  /// Opaque red
  pub const RED: Self = Self {
    r: 255,
    g: 0,
    b: 0,
    a: 1.0,
  };

  /// Opaque green
  pub const GREEN: Self = Self {
    r: 0,
    g: 255,
    b: 0,
    a: 1.0,
  };

  /// Opaque blue
  pub const BLUE: Self = Self {
    r: 0,
    g: 0,
    b: 255,
    a: 1.0,
  };

  /// Creates a color from components. Alpha is clamped to [0, 1].
  pub fn new(r: u8, g: u8, b: u8, a: f32) -> Self {
    Self {
      r,
      g,
      b,
      a: a.clamp(0.0, 1.0),
    }
  }

  /// Creates an opaque color.
  pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
    Self { r, g, b, a: 1.0 }
  }

  /// Creates a color from four 8-bit channels.
  pub fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
    Self::new(r, g, b, a as f32 / 255.0)
  }

  /// Alpha quantized to 8 bits.
  pub fn alpha_u8(&self) -> u8 {
    (self.a * 255.0 + 0.5) as u8
  }

  /// Returns the color with alpha scaled by `factor` (clamped).
  pub fn with_alpha_scaled(self, factor: f32) -> Self {
    Self::new(self.r, self.g, self.b, self.a * factor)
  }
}
