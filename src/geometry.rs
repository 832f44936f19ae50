//! Core geometry types for stroke construction and compositing
//!
//! This module provides the fundamental geometric primitives used throughout
//! the engine. Two coordinate spaces appear:
//!
//! - **Sample space** (`Point`, `Vec2`): f64 canvas coordinates carried by
//!   input samples and stroke outlines. f64 keeps the normal-vector math
//!   stable when consecutive samples are fractions of a pixel apart.
//! - **Buffer-pixel space** (`DirtyRect`): i32 integer pixels addressing a
//!   concrete raster buffer. Stored as inclusive min / exclusive max, so an
//!   empty rect is simply `min >= max` on either axis.
//!
//! The coordinate system has its origin at the top-left corner: positive X
//! extends right, positive Y extends downward.

use std::fmt;

/// A 2D point in sample space.
///
/// # Examples
///
/// ```
/// use inkboard::geometry::Point;
///
/// let p = Point::new(10.0, 20.0);
/// assert_eq!(p.x, 10.0);
/// assert_eq!(Point::ZERO, Point::new(0.0, 0.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
  /// X coordinate (increases to the right)
  pub x: f64,
  /// Y coordinate (increases downward)
  pub y: f64,
}

impl Point {
  /// The origin (0, 0).
  pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

  /// Creates a new point at the given coordinates.
  pub const fn new(x: f64, y: f64) -> Self {
    Self { x, y }
  }

  /// Computes the Euclidean distance to another point.
  ///
  /// # Examples
  ///
  /// ```
  /// use inkboard::geometry::Point;
  ///
  /// let a = Point::new(0.0, 0.0);
  /// let b = Point::new(3.0, 4.0);
  /// assert_eq!(a.distance_to(b), 5.0);
  /// ```
  pub fn distance_to(self, other: Point) -> f64 {
    let dx = other.x - self.x;
    let dy = other.y - self.y;
    (dx * dx + dy * dy).sqrt()
  }

  /// Returns the vector from this point to `other`.
  pub fn vector_to(self, other: Point) -> Vec2 {
    Vec2::new(other.x - self.x, other.y - self.y)
  }

  /// Returns this point offset by a vector.
  pub fn offset(self, v: Vec2) -> Self {
    Self::new(self.x + v.x, self.y + v.y)
  }

  /// Linear interpolation between two points (`t` in [0, 1]).
  pub fn lerp(self, other: Point, t: f64) -> Self {
    Self::new(self.x + (other.x - self.x) * t, self.y + (other.y - self.y) * t)
  }
}

impl fmt::Display for Point {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "({}, {})", self.x, self.y)
  }
}

/// A 2D direction or displacement in sample space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vec2 {
  pub x: f64,
  pub y: f64,
}

impl Vec2 {
  pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

  pub const fn new(x: f64, y: f64) -> Self {
    Self { x, y }
  }

  /// Vector length.
  pub fn length(self) -> f64 {
    (self.x * self.x + self.y * self.y).sqrt()
  }

  /// Returns a unit-length copy, or `None` for vectors too short to carry a
  /// direction. Degenerate directions must be handled explicitly by callers
  /// (repeated samples produce them routinely).
  pub fn normalized(self) -> Option<Self> {
    let len = self.length();
    if len < 1e-12 {
      return None;
    }
    Some(Self::new(self.x / len, self.y / len))
  }

  /// Rotates the vector 90°, yielding a normal of a direction vector. Which
  /// side the normal lands on is irrelevant to ribbon construction because
  /// both edges are offset symmetrically.
  pub fn perpendicular(self) -> Self {
    Self::new(-self.y, self.x)
  }

  /// Scales the vector by a scalar.
  pub fn scaled(self, factor: f64) -> Self {
    Self::new(self.x * factor, self.y * factor)
  }

  /// Sum of two vectors.
  pub fn add(self, other: Vec2) -> Self {
    Self::new(self.x + other.x, self.y + other.y)
  }
}

/// A rectangular region in buffer-pixel space.
///
/// Inclusive minimum, exclusive maximum. A rect with `min_x >= max_x` or
/// `min_y >= max_y` is empty: no pixels, no recomposition work.
///
/// # Examples
///
/// ```
/// use inkboard::geometry::DirtyRect;
///
/// let r = DirtyRect::new(0, 0, 10, 10);
/// assert_eq!(r.width(), 10);
/// assert!(!r.is_empty());
/// assert!(DirtyRect::EMPTY.is_empty());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirtyRect {
  pub min_x: i32,
  pub min_y: i32,
  pub max_x: i32,
  pub max_y: i32,
}

impl DirtyRect {
  /// The canonical empty rect. Unioning with it is the identity.
  pub const EMPTY: Self = Self {
    min_x: i32::MAX,
    min_y: i32::MAX,
    max_x: i32::MIN,
    max_y: i32::MIN,
  };

  /// Creates a rect from min/max bounds.
  pub const fn new(min_x: i32, min_y: i32, max_x: i32, max_y: i32) -> Self {
    Self {
      min_x,
      min_y,
      max_x,
      max_y,
    }
  }

  /// The full extent of a `width`x`height` buffer.
  pub fn full(width: u32, height: u32) -> Self {
    Self::new(0, 0, width as i32, height as i32)
  }

  /// Builds the smallest rect covering a circle in sample space.
  ///
  /// Conservatively outsets by one pixel for the anti-aliased edge.
  pub fn around_circle(center: Point, radius: f64) -> Self {
    Self::new(
      (center.x - radius).floor() as i32 - 1,
      (center.y - radius).floor() as i32 - 1,
      (center.x + radius).ceil() as i32 + 1,
      (center.y + radius).ceil() as i32 + 1,
    )
  }

  /// True when the rect contains no pixels.
  pub fn is_empty(&self) -> bool {
    self.min_x >= self.max_x || self.min_y >= self.max_y
  }

  /// Width in pixels (zero for empty rects).
  pub fn width(&self) -> u32 {
    (self.max_x - self.min_x).max(0) as u32
  }

  /// Height in pixels (zero for empty rects).
  pub fn height(&self) -> u32 {
    (self.max_y - self.min_y).max(0) as u32
  }

  /// Smallest rect covering both inputs.
  pub fn union(self, other: DirtyRect) -> Self {
    if self.is_empty() {
      return other;
    }
    if other.is_empty() {
      return self;
    }
    Self::new(
      self.min_x.min(other.min_x),
      self.min_y.min(other.min_y),
      self.max_x.max(other.max_x),
      self.max_y.max(other.max_y),
    )
  }

  /// Overlapping region of both inputs (possibly empty).
  pub fn intersection(self, other: DirtyRect) -> Self {
    Self::new(
      self.min_x.max(other.min_x),
      self.min_y.max(other.min_y),
      self.max_x.min(other.max_x),
      self.max_y.min(other.max_y),
    )
  }

  /// Clamps the rect to a `width`x`height` buffer.
  ///
  /// Inverted or fully out-of-bounds rects come back empty; partially
  /// out-of-bounds rects are trimmed. This is the recovery path for
  /// `CompositeError::BoundsInvalid`.
  pub fn clamped_to(self, width: u32, height: u32) -> Self {
    self.intersection(Self::full(width, height))
  }

  /// True when `(x, y)` lies inside the rect.
  pub fn contains(&self, x: i32, y: i32) -> bool {
    x >= self.min_x && x < self.max_x && y >= self.min_y && y < self.max_y
  }
}
