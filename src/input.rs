//! Input sample buffering and resampling
//!
//! The `PointSampler` sits between the input collaborator (pointer events)
//! and the geometry pipeline. It performs no geometry: it buffers samples in
//! order, drops near-duplicates that would produce degenerate normals, and
//! interpolates intermediate samples when a fast pointer skips a large
//! distance in one event.
//!
//! The engine only relies on monotonic ordering within a stroke, never on
//! wall-clock timing, so samples carry a sequence number rather than a
//! timestamp.

use crate::geometry::Point;

/// Minimum distance between retained samples, in canvas units. Closer
/// samples are merged (pressure takes the maximum) instead of appended.
const MIN_SAMPLE_SPACING: f64 = 0.25;

/// Gap beyond which intermediate samples are synthesized so downstream
/// stamping and ribbon generation see an even point density.
const RESAMPLE_GAP: f64 = 8.0;

/// Distance under which the first and last samples of a finished stroke are
/// considered coincident and the stroke is treated as a closed loop.
/// Absolute, independent of zoom and pressure.
const CLOSED_SHAPE_THRESHOLD: f64 = 2.0;

/// One recorded input event: position plus pen pressure.
///
/// Immutable once recorded; the active stroke appends only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputSample {
  pub x: f64,
  pub y: f64,
  /// Pen pressure in [0, 1]. Clamped on construction; a mouse without
  /// pressure reporting should feed a constant 1.0.
  pub pressure: f64,
}

impl InputSample {
  pub fn new(x: f64, y: f64, pressure: f64) -> Self {
    Self {
      x,
      y,
      pressure: pressure.clamp(0.0, 1.0),
    }
  }

  /// Position as a geometry point.
  pub fn position(&self) -> Point {
    Point::new(self.x, self.y)
  }
}

/// The ordered samples of one stroke, plus derived shape metadata.
///
/// Created on stroke start, appended to on every move event, consumed on
/// commit. Undo replay re-derives geometry from this path (never from a
/// cached mesh) so a replayed stroke is pixel-identical.
#[derive(Debug, Clone, Default)]
pub struct StrokePath {
  samples: Vec<InputSample>,
}

impl StrokePath {
  pub fn new() -> Self {
    Self::default()
  }

  /// Builds a path directly from samples, applying no spacing filter.
  /// Intended for tests and undo replay of already-filtered paths.
  pub fn from_samples(samples: Vec<InputSample>) -> Self {
    Self { samples }
  }

  pub fn samples(&self) -> &[InputSample] {
    &self.samples
  }

  pub fn len(&self) -> usize {
    self.samples.len()
  }

  pub fn is_empty(&self) -> bool {
    self.samples.is_empty()
  }

  pub fn first(&self) -> Option<&InputSample> {
    self.samples.first()
  }

  pub fn last(&self) -> Option<&InputSample> {
    self.samples.last()
  }

  /// True when the stroke never moved: all samples merged into one.
  pub fn is_single_point(&self) -> bool {
    self.samples.len() == 1
  }

  /// True when the stroke returns to its starting point closely enough to
  /// be treated as a closed loop (joined without end caps).
  pub fn is_closed_shape(&self) -> bool {
    if self.samples.len() < 3 {
      return false;
    }
    let first = self.samples[0].position();
    let last = self.samples[self.samples.len() - 1].position();
    first.distance_to(last) < CLOSED_SHAPE_THRESHOLD
  }

  fn push_raw(&mut self, sample: InputSample) {
    self.samples.push(sample);
  }
}

/// Buffers and conditions raw input samples for one active stroke.
///
/// Owns the in-progress `StrokePath`; `finish` hands it off and resets the
/// sampler for the next stroke.
#[derive(Debug, Default)]
pub struct PointSampler {
  path: StrokePath,
}

impl PointSampler {
  pub fn new() -> Self {
    Self::default()
  }

  /// Records one pointer event.
  ///
  /// Near-duplicates (within `MIN_SAMPLE_SPACING` of the previous sample)
  /// are merged into the previous sample, keeping the higher pressure, so
  /// a stationary jittering pen does not flood the path with degenerate
  /// segments. Long jumps are filled with linearly interpolated
  /// intermediate samples.
  pub fn record(&mut self, x: f64, y: f64, pressure: f64) {
    let sample = InputSample::new(x, y, pressure);
    let Some(prev) = self.path.last().copied() else {
      self.path.push_raw(sample);
      return;
    };

    let dist = prev.position().distance_to(sample.position());
    if dist < MIN_SAMPLE_SPACING {
      if sample.pressure > prev.pressure {
        let n = self.path.samples.len();
        self.path.samples[n - 1].pressure = sample.pressure;
      }
      return;
    }

    if dist > RESAMPLE_GAP {
      // Evenly spaced synthetic samples with interpolated pressure.
      let steps = (dist / RESAMPLE_GAP).ceil() as usize;
      for i in 1..steps {
        let t = i as f64 / steps as f64;
        let p = prev.position().lerp(sample.position(), t);
        let pressure = prev.pressure + (sample.pressure - prev.pressure) * t;
        self.path.push_raw(InputSample::new(p.x, p.y, pressure));
      }
    }

    self.path.push_raw(sample);
  }

  /// The path accumulated so far (used for incremental previews).
  pub fn path(&self) -> &StrokePath {
    &self.path
  }

  /// Consumes the accumulated path and resets the sampler.
  pub fn finish(&mut self) -> StrokePath {
    std::mem::take(&mut self.path)
  }

  /// Discards the accumulated path (stroke aborted).
  pub fn reset(&mut self) {
    self.path = StrokePath::new();
  }
}
