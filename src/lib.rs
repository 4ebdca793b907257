//! maprender draws map scenes onto a CPU raster surface.
//!
//! A frame walks an ordered stack of [`Layer`]s, resolves each feature's effective [`Style`]
//! (themes are evaluated per feature), and hands every visible `(style, feature)` pair to the
//! drawing routine for its geometry. Decoded bitmaps persist between frames in two caches owned
//! by the [`MapRenderer`]:
//!
//! - the symbol cache, keyed by symbol appearance, kept until released or the bitmap registry
//!   is replaced
//! - the tile cache, keyed by tile identity and evicted oldest-first at the end of a frame once
//!   it outgrows its retention budget
//!
//! ```no_run
//! use std::sync::Arc;
//! use maprender::{Feature, Geometry, Layer, MapRenderer, MemoryLayer, Point, Style, SymbolStyle, Viewport};
//!
//! let layer: Arc<dyn Layer> = Arc::new(
//!     MemoryLayer::new("pois")
//!         .with_style(Arc::new(Style::symbol(SymbolStyle::default())))
//!         .with_feature(Feature::new(Geometry::Point(Point::new(50.0, 50.0)))),
//! );
//! let viewport = Viewport::new(Point::new(50.0, 50.0), 1.0, 256.0, 256.0);
//! let mut renderer = MapRenderer::default();
//! let png = renderer.render_to_encoded_image(&viewport, &[layer], None);
//! assert!(png.is_some());
//! ```
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod foundation;

/// Frame traversal, caches and drawing.
pub mod render;
/// Scene model.
pub mod scene;
/// Renderer instances.
pub mod session;

pub use crate::foundation::core::{Affine, BezPath, Point, Rect, Rgba8, Vec2};
pub use crate::foundation::error::{MapRenderError, MapRenderResult};

pub use crate::render::bitmap::Bitmap;
pub use crate::render::cache::{
    BitmapCache, BitmapCacheStats, CachedBitmap, SymbolCache, SymbolKey, TileCache, TileKey,
};
pub use crate::render::iterate::iterate_visible_features;
pub use crate::render::surface::{FrameRGBA, ImageEncoding, MapSurface, encode_frame};
pub use crate::render::visibility::{VisibilityRange, is_active};
pub use crate::scene::bitmap::{BitmapId, BitmapRegistry};
pub use crate::scene::def::{Scene, SceneDef};
pub use crate::scene::feature::Feature;
pub use crate::scene::geometry::{
    Geometry, GeometryKind, Polygon, RasterTile, collection_bounds,
};
pub use crate::scene::layer::{Layer, MemoryLayer};
pub use crate::scene::style::{
    Pen, RasterStyle, Style, StyleKind, SymbolStyle, SymbolType, VectorStyle,
};
pub use crate::scene::theme::{AttributeTheme, FnTheme, Theme};
pub use crate::scene::viewport::Viewport;
pub use crate::session::renderer::{CacheStats, EncodeOpts, MapRenderer, RendererOpts};
