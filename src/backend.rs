//! Rendering-backend seam: mesh vs raster path, GPU handoff contract
//!
//! The engine supports two stroke-rendering paths, selected once per
//! platform capability check rather than per call:
//!
//! - **Mesh**: outline + triangulation, uploaded to a GPU backend through
//!   [`MeshSink`]. Used on backends with a mesh pipeline.
//! - **Raster**: CPU disc stamping straight into pixel buffers. Used on
//!   CPU-only backends, and as the runtime fallback whenever the mesh path
//!   fails for a particular stroke.
//!
//! The CPU→GPU handoff is one-way: a mesh with an in-flight submission must
//! not be mutated. [`TrackedMesh`] enforces that with a per-buffer flag;
//! violating it is a contract defect (`BackendError::BufferInFlight`), not
//! a recoverable condition.

use crate::color::Rgba;
use crate::error::BackendError;
use crate::stroke::TriangleMesh;

/// What the host platform's rendering backend can do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RendererCaps {
  /// Whether a triangle-mesh pipeline is available.
  pub supports_mesh: bool,
}

/// The stroke-rendering path in use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RendererKind {
  /// Outline + triangulation, GPU submission.
  Mesh,
  /// CPU disc stamping.
  Raster,
}

impl RendererKind {
  /// One-time selection from platform capabilities.
  pub fn select(caps: RendererCaps) -> Self {
    if caps.supports_mesh {
      RendererKind::Mesh
    } else {
      RendererKind::Raster
    }
  }
}

/// Receiver for triangle meshes on the GPU side of the handoff.
///
/// Implementations wrap pre-initialized device objects (vertex/index
/// buffers, pipelines); this crate never creates or destroys them. A failed
/// submission is a hard failure for the current frame only — the caller
/// skips this frame's composite and retries on the next event.
pub trait MeshSink {
  fn submit(&mut self, mesh: &TriangleMesh, color: Rgba) -> Result<(), BackendError>;
}

/// A pooled mesh with an in-flight guard for asynchronous GPU reads.
///
/// `submit` marks the mesh in flight; the host calls [`complete`]
/// (`TrackedMesh::complete`) once the GPU is done with it. Between the two,
/// mutation attempts fail loudly.
#[derive(Debug, Default)]
pub struct TrackedMesh {
  mesh: TriangleMesh,
  in_flight: bool,
}

impl TrackedMesh {
  pub fn new(mesh: TriangleMesh) -> Self {
    Self {
      mesh,
      in_flight: false,
    }
  }

  pub fn mesh(&self) -> &TriangleMesh {
    &self.mesh
  }

  pub fn is_in_flight(&self) -> bool {
    self.in_flight
  }

  /// Mutable access to the mesh, refused while a submission is in flight.
  pub fn mesh_mut(&mut self) -> Result<&mut TriangleMesh, BackendError> {
    if self.in_flight {
      return Err(BackendError::BufferInFlight);
    }
    Ok(&mut self.mesh)
  }

  /// Replaces the mesh contents, refused while in flight.
  pub fn replace(&mut self, mesh: TriangleMesh) -> Result<(), BackendError> {
    if self.in_flight {
      return Err(BackendError::BufferInFlight);
    }
    self.mesh = mesh;
    Ok(())
  }

  /// Submits to the sink and marks the buffer in flight.
  ///
  /// A mesh already in flight cannot be resubmitted. When the sink itself
  /// fails, the buffer is *not* marked in flight: the submission never
  /// reached the device, so the CPU may keep mutating and retry next frame.
  pub fn submit(&mut self, sink: &mut dyn MeshSink, color: Rgba) -> Result<(), BackendError> {
    if self.in_flight {
      return Err(BackendError::BufferInFlight);
    }
    sink.submit(&self.mesh, color)?;
    self.in_flight = true;
    Ok(())
  }

  /// Called by the host when the GPU has finished reading the buffer.
  pub fn complete(&mut self) {
    self.in_flight = false;
  }
}
