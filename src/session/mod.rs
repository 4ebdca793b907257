//! Renderer instances owning the caches and the generation counter.

/// [`MapRenderer`](renderer::MapRenderer) and its options.
pub mod renderer;
