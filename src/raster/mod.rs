//! CPU raster surfaces and the disc-stamping fallback renderer
//!
//! `PixelBuffer` is the engine's only pixel currency: straight
//! (non-premultiplied) RGBA8, top-left origin. `stamp` draws strokes into a
//! buffer directly, without going through outline/triangulation — used when
//! triangulation fails, for single-point dots, and for CPU-only backends.

pub mod pixel_buffer;
pub mod stamp;

pub use pixel_buffer::PixelBuffer;
pub use stamp::stamp_stroke;
