//! Stroke engine: ties input sampling, geometry, rastering, and layers
//! together for one drawing surface
//!
//! One `StrokeEngine` drives the active stroke for a canvas. The flow per
//! stroke:
//!
//! 1. `begin_stroke` — snapshot the owning layer into a pooled preview
//!    buffer.
//! 2. `record_move` per pointer event — append the sample and re-render the
//!    in-progress stroke into the preview buffer. The owning layer is never
//!    mutated during the stroke, so aborting is a pure rollback.
//! 3. `commit_stroke` — render the final stroke (full simplified point set)
//!    into the layer itself, dirty the touched region, and hand the source
//!    path back for undo recording.
//!
//! The preview buffer is what the compositor reads in place of the owning
//! layer (see `Compositor::composite_with_override`), keeping incremental
//! and final rendering on the same code path and pixel-identical.
//!
//! No ambient state: the layer stack is passed into every call that needs
//! it, so the engine can be driven entirely from tests.

use crate::backend::{RendererCaps, RendererKind};
use crate::error::{CompositeError, Error, GeometryError};
use crate::geometry::DirtyRect;
use crate::input::{PointSampler, StrokePath};
use crate::layer::{LayerId, LayerStack};
use crate::pool::{Arena, Handle};
use crate::raster::{stamp_stroke, PixelBuffer};
use crate::stroke::{stroke_mesh, StrokeStyle, TriangleMesh};
use tracing::{debug, warn};

/// Everything the undo-history collaborator needs to record an invertible
/// action: the source path (replay re-derives geometry exactly) plus the
/// brush settings. The engine does not implement the undo stack itself.
#[derive(Debug, Clone)]
pub struct CommittedStroke {
  pub layer: LayerId,
  pub path: StrokePath,
  pub style: StrokeStyle,
}

#[derive(Debug)]
struct ActiveStroke {
  layer: LayerId,
  style: StrokeStyle,
  preview: Handle,
  /// Region the preview has touched since stroke start; also the region to
  /// restore on abort.
  preview_dirty: DirtyRect,
  /// The mesh path falls back to stamping silently after the first warn.
  warned_fallback: bool,
}

/// Drives the in-progress stroke for one canvas.
#[derive(Debug)]
pub struct StrokeEngine {
  width: u32,
  height: u32,
  renderer: RendererKind,
  sampler: PointSampler,
  session: Option<ActiveStroke>,
  preview_pool: Arena<PixelBuffer>,
}

impl StrokeEngine {
  /// Creates an engine for a canvas, choosing the rendering path once from
  /// platform capabilities.
  pub fn new(width: u32, height: u32, caps: RendererCaps) -> Self {
    Self {
      width,
      height,
      renderer: RendererKind::select(caps),
      sampler: PointSampler::new(),
      session: None,
      preview_pool: Arena::new(),
    }
  }

  pub fn renderer(&self) -> RendererKind {
    self.renderer
  }

  pub fn has_active_stroke(&self) -> bool {
    self.session.is_some()
  }

  /// Starts a stroke on `layer`, snapshotting its current contents for
  /// preview rendering.
  ///
  /// # Errors
  ///
  /// `CompositeError::UnknownLayer` when the id does not resolve;
  /// `RasterError` when the pooled preview buffer cannot be allocated.
  pub fn begin_stroke(
    &mut self,
    stack: &LayerStack,
    layer: LayerId,
    style: StrokeStyle,
  ) -> Result<(), Error> {
    // A stroke that was never committed or aborted (dropped pointer-up
    // event) must not leak its pooled preview slot.
    if let Some(stale) = self.session.take() {
      warn!(layer = ?stale.layer, "new stroke began while one was active; dropping its preview");
      self.preview_pool.release(stale.preview);
    }
    let source = stack
      .layer(layer)
      .ok_or(Error::Composite(CompositeError::UnknownLayer))?;

    let preview = match self.preview_pool.try_acquire() {
      Some(handle) => handle,
      None => {
        let buffer = PixelBuffer::new(self.width, self.height).map_err(Error::Raster)?;
        self.preview_pool.insert(buffer)
      }
    };

    if let Some(buffer) = self.preview_pool.get_mut(preview) {
      buffer.copy_rect_from(&source.buffer, source.buffer.bounds());
    }

    self.sampler.reset();
    self.session = Some(ActiveStroke {
      layer,
      style,
      preview,
      preview_dirty: DirtyRect::EMPTY,
      warned_fallback: false,
    });
    debug!(?layer, ?style, "stroke started");
    Ok(())
  }

  /// Records one pointer move and re-renders the preview.
  ///
  /// Returns the region to recomposite for this event (empty when the
  /// sample was merged away). The owning layer itself is untouched.
  pub fn record_move(&mut self, stack: &LayerStack, x: f64, y: f64, pressure: f64) -> DirtyRect {
    let Some(session) = self.session.as_mut() else {
      return DirtyRect::EMPTY;
    };
    self.sampler.record(x, y, pressure);

    let Some(layer) = stack.layer(session.layer) else {
      return DirtyRect::EMPTY;
    };
    let Some(preview) = self.preview_pool.get_mut(session.preview) else {
      return DirtyRect::EMPTY;
    };

    // Full re-render: restore the previously touched region from the layer
    // snapshot, then stamp the whole path. Incremental deltas would
    // double-blend translucent brushes.
    preview.copy_rect_from(&layer.buffer, session.preview_dirty);
    let stamped = stamp_stroke(preview, self.sampler.path(), &session.style);

    let to_recomposite = session.preview_dirty.union(stamped);
    session.preview_dirty = to_recomposite;
    to_recomposite
  }

  /// The preview override for compositing, while a stroke is active.
  ///
  /// Feed this to `Compositor::composite_with_override` so the display
  /// shows the in-progress stroke without mutating the owning layer.
  pub fn preview_override(&self) -> Option<(LayerId, &PixelBuffer)> {
    let session = self.session.as_ref()?;
    let buffer = self.preview_pool.get(session.preview)?;
    Some((session.layer, buffer))
  }

  /// Builds the triangle mesh of the in-progress stroke for the mesh
  /// backend, falling back with a single warning per stroke.
  ///
  /// # Errors
  ///
  /// The underlying `GeometryError`, after logging it once; the caller is
  /// expected to render via the raster preview instead (which this engine
  /// keeps current regardless of renderer kind).
  pub fn preview_mesh(&mut self) -> Result<TriangleMesh, GeometryError> {
    let path = self.sampler.path().clone();
    let Some(session) = self.session.as_mut() else {
      return Err(GeometryError::InsufficientPoints { needed: 1, got: 0 });
    };
    match stroke_mesh(&path, session.style.base_width) {
      Ok(mesh) => Ok(mesh),
      Err(err) => {
        if !session.warned_fallback {
          session.warned_fallback = true;
          warn!(error = %err, "mesh path failed, stroke falls back to raster stamping");
        }
        Err(err)
      }
    }
  }

  /// Commits the stroke: renders the final path into the owning layer,
  /// marks it dirty, recycles the preview, and returns the undo record.
  ///
  /// # Errors
  ///
  /// `CompositeError::UnknownLayer` when the owning layer disappeared
  /// mid-stroke (the stroke is dropped and the preview rolled back, same as
  /// an abort).
  pub fn commit_stroke(&mut self, stack: &mut LayerStack) -> Result<CommittedStroke, Error> {
    let Some(session) = self.session.take() else {
      return Err(Error::Composite(CompositeError::UnknownLayer));
    };
    let path = self.sampler.finish();

    let Some(layer) = stack.layer_mut(session.layer) else {
      self.preview_pool.release(session.preview);
      return Err(Error::Composite(CompositeError::UnknownLayer));
    };

    // Final render from the complete point set, straight into the layer.
    let stamped = stamp_stroke(&mut layer.buffer, &path, &session.style);
    layer.mark_dirty(stamped.union(session.preview_dirty));

    self.preview_pool.release(session.preview);
    debug!(layer = ?session.layer, samples = path.len(), "stroke committed");
    Ok(CommittedStroke {
      layer: session.layer,
      path,
      style: session.style,
    })
  }

  /// Aborts the stroke (pointer capture lost, tool switched mid-gesture).
  ///
  /// The owning layer was never mutated; the previously previewed region is
  /// marked dirty so the next composite redraws it from the clean layer,
  /// leaving no trace of the preview on screen or in the dirty bookkeeping.
  pub fn abort_stroke(&mut self, stack: &mut LayerStack) {
    let Some(session) = self.session.take() else {
      return;
    };
    self.sampler.reset();
    if let Some(layer) = stack.layer_mut(session.layer) {
      layer.mark_dirty(session.preview_dirty);
    }
    self.preview_pool.release(session.preview);
    debug!(layer = ?session.layer, "stroke aborted");
  }
}
