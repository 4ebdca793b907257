//! Frame traversal, bitmap caches and the CPU drawing surface.

/// Decoded bitmaps owned by the caches.
pub mod bitmap;
/// Generational symbol and tile caches.
pub mod cache;
pub(crate) mod dispatch;
pub(crate) mod draw;
/// Layer/style/feature traversal.
pub mod iterate;
/// Off-screen surface and frame encoding.
pub mod surface;
/// Enable flag and resolution window gate.
pub mod visibility;
