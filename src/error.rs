//! Error types for the stroke and compositing engine
//!
//! This module provides error types for all subsystems:
//! - Geometry errors (outline construction, triangulation)
//! - Raster errors (pixel buffer allocation)
//! - Compositing errors (dirty-rect validation)
//! - Backend errors (GPU submission, in-flight buffer contracts)
//!
//! All errors use the `thiserror` crate for minimal boilerplate and proper
//! error trait implementations. Geometry errors are recoverable by design:
//! every failure has a documented fallback (circle stamp, raster path) and
//! must never abort an in-progress stroke.

use thiserror::Error;

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for the engine.
///
/// Each variant wraps a more specific error type for that subsystem.
#[derive(Error, Debug)]
pub enum Error {
  /// Outline construction or triangulation error
  #[error("Geometry error: {0}")]
  Geometry(#[from] GeometryError),

  /// Pixel buffer allocation or access error
  #[error("Raster error: {0}")]
  Raster(#[from] RasterError),

  /// Layer compositing error
  #[error("Composite error: {0}")]
  Composite(#[from] CompositeError),

  /// Rendering backend error
  #[error("Backend error: {0}")]
  Backend(#[from] BackendError),
}

/// Errors from stroke outline construction and triangulation.
///
/// Both variants are recoverable: the caller falls back to the raster
/// stamping path rather than dropping the stroke.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GeometryError {
  /// Fewer samples than the operation requires.
  ///
  /// A single-point stroke is rendered as a stamped dot by the raster
  /// fallback; this error only signals that ribbon generation is not
  /// applicable.
  #[error("insufficient points: needed {needed}, got {got}")]
  InsufficientPoints { needed: usize, got: usize },

  /// The outline polygon could not be decomposed into triangles.
  ///
  /// Degenerate or (unexpectedly) self-intersecting outlines land here.
  /// Logged once per stroke; the stroke itself is recovered via the raster
  /// fallback renderer.
  #[error("triangulation failed: {reason}")]
  TriangulationFailed { reason: String },
}

/// Errors from pixel buffer creation.
///
/// These follow the allocation-guard pattern: dimension and byte-size checks
/// happen before any allocation, so an oversized request fails cleanly
/// instead of aborting the process on OOM.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RasterError {
  /// Zero, overflowing, or over-limit buffer dimensions.
  #[error("invalid buffer dimensions: {message}")]
  InvalidDimensions { message: String },

  /// The allocator could not reserve the requested bytes.
  #[error("buffer allocation failed: {message}")]
  AllocationFailed { message: String },
}

/// Errors from layer compositing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompositeError {
  /// A dirty rectangle with inverted min/max or entirely outside the
  /// canvas. The compositor recovers by clamping (or skipping); this error
  /// is returned only by the explicit validation API.
  #[error("invalid compositing bounds: {min_x},{min_y}..{max_x},{max_y} for {width}x{height} buffer")]
  BoundsInvalid {
    min_x: i32,
    min_y: i32,
    max_x: i32,
    max_y: i32,
    width: u32,
    height: u32,
  },

  /// A layer id that does not resolve in the stack (stale handle after
  /// removal, or a handle from another stack).
  #[error("unknown layer id")]
  UnknownLayer,

  /// Layer buffer dimensions do not match the canvas.
  #[error("layer size {layer_width}x{layer_height} does not match canvas {width}x{height}")]
  LayerSizeMismatch {
    layer_width: u32,
    layer_height: u32,
    width: u32,
    height: u32,
  },
}

/// Errors from the rendering backend boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
  /// GPU resource creation or submission failed. Hard failure for this
  /// frame only; the caller skips the composite and retries next frame.
  #[error("backend resource unavailable: {message}")]
  ResourceUnavailable { message: String },

  /// A buffer with an in-flight GPU operation was mutated or resubmitted.
  /// This is a programmer-contract violation, not a runtime condition to
  /// recover from.
  #[error("buffer has an in-flight GPU operation")]
  BufferInFlight,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn geometry_errors_convert_to_top_level() {
    let err: Error = GeometryError::InsufficientPoints { needed: 2, got: 1 }.into();
    assert!(matches!(err, Error::Geometry(_)));
    assert!(err.to_string().contains("insufficient points"));
  }

  #[test]
  fn bounds_error_reports_rect_and_buffer() {
    let err = CompositeError::BoundsInvalid {
      min_x: 10,
      min_y: 10,
      max_x: 5,
      max_y: 5,
      width: 64,
      height: 64,
    };
    let text = err.to_string();
    assert!(text.contains("10,10..5,5"));
    assert!(text.contains("64x64"));
  }
}
