//! inkboard — stroke geometry and layer compositing engine
//!
//! Converts pressure-weighted pointer input into rendered strokes on an
//! ordered stack of raster layers:
//!
//! - [`input`] buffers and conditions pointer samples.
//! - [`stroke`] turns a sampled path into a closed variable-width outline
//!   and triangulates it for mesh backends.
//! - [`raster`] stamps anti-aliased discs directly into pixel buffers —
//!   the fallback path, and the only path on CPU-only backends.
//! - [`composite`] blends the layer stack into one image with straight-alpha
//!   Porter-Duff "over", supporting partial (dirty-rect) recomposition.
//! - [`engine`] drives the per-stroke lifecycle: preview, commit, abort.
//!
//! Everything is synchronous and single-threaded; the one asynchronous
//! boundary is the CPU→GPU handoff in [`backend`].

pub mod backend;
pub mod color;
pub mod composite;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod input;
pub mod layer;
pub mod pool;
pub mod presenter;
pub mod raster;
pub mod stroke;

pub use backend::{MeshSink, RendererCaps, RendererKind, TrackedMesh};
pub use color::Rgba;
pub use composite::Compositor;
pub use engine::{CommittedStroke, StrokeEngine};
pub use error::{
  BackendError, CompositeError, Error, GeometryError, RasterError, Result,
};
pub use geometry::{DirtyRect, Point, Vec2};
pub use input::{InputSample, PointSampler, StrokePath};
pub use layer::{BlendMode, Layer, LayerId, LayerStack};
pub use presenter::{DisplayPresenter, PresentTarget};
pub use raster::{stamp_stroke, PixelBuffer};
pub use stroke::{
  build_outline, stroke_mesh, triangulate, triangulate_loop, Polygon, StrokeStyle, TriangleMesh,
};
