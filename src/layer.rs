//! Layer stack: ordered raster layers with visibility, opacity, blend mode
//!
//! The engine reads and writes layer buffers and flags; creating, deleting,
//! and reordering layers is driven by the owning collaborator through this
//! container. Each layer accumulates its own dirty region, which the
//! compositor consumes and clears.

use crate::color::Rgba;
use crate::error::RasterError;
use crate::geometry::DirtyRect;
use crate::raster::PixelBuffer;
use rustc_hash::FxHashMap;

/// Stable handle to a layer, valid across reordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(u64);

/// How a layer's pixels combine with the accumulated backdrop.
///
/// `Erase` is not an inter-layer blend: eraser strokes knock alpha out of
/// their authoring layer at commit time, and a layer marked `Erase`
/// composites like `Normal`. The variant exists so tool state can round-trip
/// through layer flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlendMode {
  #[default]
  Normal,
  Multiply,
  Add,
  Screen,
  Overlay,
  Erase,
}

/// One raster layer: pixel buffer plus compositing flags.
#[derive(Debug, Clone)]
pub struct Layer {
  id: LayerId,
  /// Straight-alpha contents, owned exclusively by this layer.
  pub buffer: PixelBuffer,
  pub visible: bool,
  /// Scalar opacity in [0, 1], multiplied into every pixel's alpha during
  /// compositing.
  pub opacity: f32,
  pub blend_mode: BlendMode,
  dirty: DirtyRect,
}

impl Layer {
  fn new(id: LayerId, width: u32, height: u32) -> Result<Self, RasterError> {
    Ok(Self {
      id,
      buffer: PixelBuffer::new(width, height)?,
      visible: true,
      opacity: 1.0,
      blend_mode: BlendMode::Normal,
      dirty: DirtyRect::EMPTY,
    })
  }

  pub fn id(&self) -> LayerId {
    self.id
  }

  /// Marks a region as needing recomposition.
  pub fn mark_dirty(&mut self, rect: DirtyRect) {
    self.dirty = self.dirty.union(rect);
  }

  /// The accumulated dirty region (empty when clean).
  pub fn dirty(&self) -> DirtyRect {
    self.dirty
  }

  /// Consumes and clears the dirty region.
  pub fn take_dirty(&mut self) -> DirtyRect {
    std::mem::replace(&mut self.dirty, DirtyRect::EMPTY)
  }

  /// Fills the layer with a color and dirties the full extent.
  pub fn fill(&mut self, color: Rgba) {
    self.buffer.fill(color);
    self.dirty = self.buffer.bounds();
  }
}

/// An ordered stack of layers sharing one canvas size.
///
/// Index 0 is the bottom layer. Lookup by `LayerId` stays valid across
/// reordering; indices do not.
#[derive(Debug, Default)]
pub struct LayerStack {
  layers: Vec<Layer>,
  index: FxHashMap<LayerId, usize>,
  next_id: u64,
  width: u32,
  height: u32,
}

impl LayerStack {
  /// Creates an empty stack for a canvas of the given size.
  pub fn new(width: u32, height: u32) -> Self {
    Self {
      layers: Vec::new(),
      index: FxHashMap::default(),
      next_id: 0,
      width,
      height,
    }
  }

  pub fn width(&self) -> u32 {
    self.width
  }

  pub fn height(&self) -> u32 {
    self.height
  }

  pub fn len(&self) -> usize {
    self.layers.len()
  }

  pub fn is_empty(&self) -> bool {
    self.layers.is_empty()
  }

  /// Appends a new transparent layer on top and returns its id.
  pub fn push_layer(&mut self) -> Result<LayerId, RasterError> {
    let id = LayerId(self.next_id);
    self.next_id += 1;
    let layer = Layer::new(id, self.width, self.height)?;
    self.index.insert(id, self.layers.len());
    self.layers.push(layer);
    Ok(id)
  }

  /// Removes a layer. No-op when the id is unknown.
  pub fn remove_layer(&mut self, id: LayerId) {
    if let Some(pos) = self.index.remove(&id) {
      self.layers.remove(pos);
      self.reindex();
    }
  }

  /// Moves a layer to a new stack position (clamped to the stack size).
  pub fn move_layer(&mut self, id: LayerId, to: usize) {
    if let Some(pos) = self.index.get(&id).copied() {
      let layer = self.layers.remove(pos);
      let to = to.min(self.layers.len());
      self.layers.insert(to, layer);
      self.reindex();
    }
  }

  fn reindex(&mut self) {
    self.index.clear();
    for (i, layer) in self.layers.iter().enumerate() {
      self.index.insert(layer.id(), i);
    }
  }

  pub fn layer(&self, id: LayerId) -> Option<&Layer> {
    self.index.get(&id).map(|&i| &self.layers[i])
  }

  pub fn layer_mut(&mut self, id: LayerId) -> Option<&mut Layer> {
    if let Some(&i) = self.index.get(&id) {
      Some(&mut self.layers[i])
    } else {
      None
    }
  }

  /// Layers in compositing order, bottom first.
  pub fn iter(&self) -> impl Iterator<Item = &Layer> {
    self.layers.iter()
  }

  /// Union of all per-layer dirty regions, consuming and clearing them.
  pub fn take_dirty(&mut self) -> DirtyRect {
    let mut dirty = DirtyRect::EMPTY;
    for layer in &mut self.layers {
      dirty = dirty.union(layer.take_dirty());
    }
    dirty
  }
}
