//! Generation-checked arena for pooled transient buffers
//!
//! Stroke previews and meshes are allocated every stroke and discarded on
//! commit; pooling the allocations keeps the per-stroke cost flat. The
//! arena hands out handles carrying a generation counter: releasing a slot
//! bumps the generation, so any retained stale handle simply stops
//! resolving instead of silently aliasing the next stroke's buffer.
//!
//! Pooling is an optimization, not a correctness requirement — but a pooled
//! object is always `reset` before reuse so no stale contents leak between
//! strokes.

/// Objects that can be scrubbed for reuse.
pub trait Reset {
  /// Clears contents while keeping allocations.
  fn reset(&mut self);
}

impl Reset for crate::raster::PixelBuffer {
  fn reset(&mut self) {
    self.clear();
  }
}

impl Reset for crate::stroke::TriangleMesh {
  fn reset(&mut self) {
    self.vertices.clear();
    self.indices.clear();
  }
}

/// Handle to an arena slot. Stale handles (released slots) resolve to
/// `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Handle {
  index: usize,
  generation: u32,
}

#[derive(Debug)]
struct Slot<T> {
  generation: u32,
  value: Option<T>,
}

/// Index-based object pool with use-after-release detection.
#[derive(Debug)]
pub struct Arena<T> {
  slots: Vec<Slot<T>>,
  free: Vec<usize>,
}

impl<T: Reset> Arena<T> {
  pub fn new() -> Self {
    Self {
      slots: Vec::new(),
      free: Vec::new(),
    }
  }

  /// Reuses a released slot when one is available. The reused value has
  /// already been reset. Returns `None` when the pool has no free slot;
  /// the caller then constructs a value (fallibly, if need be) and hands
  /// it to [`insert`](Self::insert).
  pub fn try_acquire(&mut self) -> Option<Handle> {
    let index = self.free.pop()?;
    let slot = &self.slots[index];
    debug_assert!(slot.value.is_some());
    Some(Handle {
      index,
      generation: slot.generation,
    })
  }

  /// Adds a freshly constructed value to the arena.
  pub fn insert(&mut self, value: T) -> Handle {
    let index = self.slots.len();
    self.slots.push(Slot {
      generation: 0,
      value: Some(value),
    });
    Handle {
      index,
      generation: 0,
    }
  }

  /// Resolves a handle. `None` for stale handles.
  pub fn get(&self, handle: Handle) -> Option<&T> {
    let slot = self.slots.get(handle.index)?;
    if slot.generation != handle.generation {
      return None;
    }
    slot.value.as_ref()
  }

  /// Mutable resolution. `None` for stale handles.
  pub fn get_mut(&mut self, handle: Handle) -> Option<&mut T> {
    let slot = self.slots.get_mut(handle.index)?;
    if slot.generation != handle.generation {
      return None;
    }
    slot.value.as_mut()
  }

  /// Returns a slot to the pool, resetting its value and invalidating the
  /// handle (and any copies of it). Stale handles are ignored.
  pub fn release(&mut self, handle: Handle) {
    let Some(slot) = self.slots.get_mut(handle.index) else {
      return;
    };
    if slot.generation != handle.generation {
      return;
    }
    if let Some(value) = slot.value.as_mut() {
      value.reset();
    }
    slot.generation = slot.generation.wrapping_add(1);
    self.free.push(handle.index);
  }

  /// Number of live (acquired) slots.
  pub fn live(&self) -> usize {
    self.slots.len() - self.free.len()
  }
}

impl<T: Reset> Default for Arena<T> {
  fn default() -> Self {
    Self::new()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[derive(Default)]
  struct Scratch(Vec<u8>);

  impl Reset for Scratch {
    fn reset(&mut self) {
      self.0.clear();
    }
  }

  #[test]
  fn reuses_released_slots() {
    let mut arena: Arena<Scratch> = Arena::new();
    assert!(arena.try_acquire().is_none());
    let a = arena.insert(Scratch::default());
    arena.get_mut(a).unwrap().0.extend_from_slice(b"abc");
    arena.release(a);

    let b = arena.try_acquire().unwrap();
    assert_eq!(b.index, a.index, "slot is reused");
    assert!(arena.get(b).unwrap().0.is_empty(), "reused value was reset");
    assert_eq!(arena.live(), 1);
  }

  #[test]
  fn stale_handles_stop_resolving() {
    let mut arena: Arena<Scratch> = Arena::new();
    let a = arena.insert(Scratch::default());
    arena.release(a);
    assert!(arena.get(a).is_none());

    let b = arena.try_acquire().unwrap();
    // Same slot, new generation: the old handle still resolves to nothing.
    assert!(arena.get(a).is_none());
    assert!(arena.get(b).is_some());
  }

  #[test]
  fn double_release_is_ignored() {
    let mut arena: Arena<Scratch> = Arena::new();
    let a = arena.insert(Scratch::default());
    arena.release(a);
    arena.release(a);
    assert_eq!(arena.live(), 0);
    assert!(arena.try_acquire().is_some());
    assert_eq!(arena.live(), 1);
  }
}
