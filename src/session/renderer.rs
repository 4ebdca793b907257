use std::sync::Arc;

use crate::foundation::core::Rgba8;
use crate::foundation::error::{MapRenderError, MapRenderResult};
use crate::render::cache::{BitmapCacheStats, SymbolCache, TileCache};
use crate::render::dispatch::{DrawResources, dispatch_geometry};
use crate::render::iterate::iterate_visible_features;
use crate::render::surface::{FrameRGBA, ImageEncoding, MapSurface, encode_frame};
use crate::scene::bitmap::BitmapRegistry;
use crate::scene::layer::Layer;
use crate::scene::viewport::Viewport;

/// Environment variable overriding [`RendererOpts::retention_multiplier`].
pub const RETENTION_MULTIPLIER_ENV: &str = "MAPRENDER_TILE_RETENTION_MULTIPLIER";

const DEFAULT_RETENTION_MULTIPLIER: f64 = 3.0;

/// Options for a [`MapRenderer`].
#[derive(Clone, Debug, PartialEq)]
pub struct RendererOpts {
    /// Tile cache retention multiplier. At the end of a frame the tile cache removes up to
    /// `used - floor(entries * multiplier)` of its oldest entries, where `used` counts the tiles
    /// drawn that frame. With a multiplier of 1 or more nothing is ever evicted; only values
    /// below 1 bound the cache.
    pub retention_multiplier: f64,
    /// Background used when a frame does not supply one.
    pub default_background: Rgba8,
}

impl Default for RendererOpts {
    fn default() -> Self {
        Self {
            retention_multiplier: DEFAULT_RETENTION_MULTIPLIER,
            default_background: Rgba8::WHITE,
        }
    }
}

impl RendererOpts {
    /// Defaults, with the retention multiplier taken from
    /// `MAPRENDER_TILE_RETENTION_MULTIPLIER` when it holds a positive finite number.
    pub fn from_env() -> Self {
        let env = std::env::var(RETENTION_MULTIPLIER_ENV).ok();
        let retention_multiplier =
            parse_retention_multiplier(env.as_deref()).unwrap_or(DEFAULT_RETENTION_MULTIPLIER);
        Self {
            retention_multiplier,
            ..Self::default()
        }
    }

    /// Set the tile cache retention multiplier.
    pub fn with_retention_multiplier(mut self, multiplier: f64) -> Self {
        self.retention_multiplier = multiplier;
        self
    }

    /// Set the fallback background color.
    pub fn with_default_background(mut self, background: Rgba8) -> Self {
        self.default_background = background;
        self
    }

    /// Check option ranges.
    pub fn validate(&self) -> MapRenderResult<()> {
        if !self.retention_multiplier.is_finite() || self.retention_multiplier <= 0.0 {
            return Err(MapRenderError::validation(
                "retention_multiplier must be finite and > 0",
            ));
        }
        Ok(())
    }
}

fn parse_retention_multiplier(raw: Option<&str>) -> Option<f64> {
    raw.and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|m| m.is_finite() && *m > 0.0)
}

/// Options for the encoded-image entry points.
#[derive(Clone, Debug, PartialEq)]
pub struct EncodeOpts {
    /// Background; falls back to [`RendererOpts::default_background`].
    pub background: Option<Rgba8>,
    /// Device pixels per viewport pixel.
    pub pixel_density: f64,
    /// Output format.
    pub format: ImageEncoding,
}

impl Default for EncodeOpts {
    fn default() -> Self {
        Self {
            background: None,
            pixel_density: 1.0,
            format: ImageEncoding::Png,
        }
    }
}

impl EncodeOpts {
    /// Set the background color.
    pub fn with_background(mut self, background: Rgba8) -> Self {
        self.background = Some(background);
        self
    }

    /// Set the pixel density.
    pub fn with_pixel_density(mut self, density: f64) -> Self {
        self.pixel_density = density;
        self
    }

    /// Set the output format.
    pub fn with_format(mut self, format: ImageEncoding) -> Self {
        self.format = format;
        self
    }
}

/// Lifetime counters of both caches.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Symbol cache counters.
    pub symbols: BitmapCacheStats,
    /// Tile cache counters.
    pub tiles: BitmapCacheStats,
}

/// Draws map frames and owns the bitmap caches that persist between them.
///
/// A renderer is single-threaded: every entry point takes `&mut self`, so one frame completes
/// (through tile eviction and the generation increment) before the next starts. Use one renderer
/// per concurrently rendered view; renderers share no state.
///
/// Only the tile cache is evicted between frames. The symbol cache keeps every symbol it has
/// rasterized until [`MapRenderer::release_all_cached_resources`] or
/// [`MapRenderer::set_bitmaps`].
#[derive(Debug)]
pub struct MapRenderer {
    symbols: SymbolCache,
    tiles: TileCache,
    generation: u64,
    opts: RendererOpts,
    bitmaps: Arc<BitmapRegistry>,
}

impl Default for MapRenderer {
    fn default() -> Self {
        Self {
            symbols: SymbolCache::new(),
            tiles: TileCache::new(),
            generation: 1,
            opts: RendererOpts::default(),
            bitmaps: Arc::new(BitmapRegistry::new()),
        }
    }
}

impl MapRenderer {
    /// Renderer with empty caches and an empty bitmap registry.
    pub fn new(opts: RendererOpts) -> MapRenderResult<Self> {
        opts.validate()?;
        Ok(Self {
            opts,
            ..Self::default()
        })
    }

    /// Use `bitmaps` to resolve symbol bitmap ids.
    pub fn with_bitmaps(mut self, bitmaps: Arc<BitmapRegistry>) -> Self {
        self.set_bitmaps(bitmaps);
        self
    }

    /// Replace the bitmap registry.
    ///
    /// Cached symbols are disposed: bitmap symbols are keyed by id, and an id may now resolve to
    /// different bytes.
    pub fn set_bitmaps(&mut self, bitmaps: Arc<BitmapRegistry>) {
        if !Arc::ptr_eq(&self.bitmaps, &bitmaps) {
            let disposed = self.symbols.dispose_all();
            tracing::debug!(disposed, "bitmap registry replaced, symbol cache cleared");
        }
        self.bitmaps = bitmaps;
    }

    /// Registry used to resolve symbol bitmap ids.
    pub fn bitmaps(&self) -> &BitmapRegistry {
        &self.bitmaps
    }

    /// Active options.
    pub fn opts(&self) -> &RendererOpts {
        &self.opts
    }

    /// Generation the next frame will be stamped with. Starts at 1 and grows by one per
    /// completed frame.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Symbol cache (read-only).
    pub fn symbol_cache(&self) -> &SymbolCache {
        &self.symbols
    }

    /// Tile cache (read-only).
    pub fn tile_cache(&self) -> &TileCache {
        &self.tiles
    }

    /// Lifetime counters of both caches.
    pub fn cache_stats(&self) -> CacheStats {
        CacheStats {
            symbols: self.symbols.stats(),
            tiles: self.tiles.stats(),
        }
    }

    /// Draw one frame onto `surface`. Failures are logged and leave the frame undrawn.
    pub fn render(
        &mut self,
        surface: &mut MapSurface,
        viewport: &Viewport,
        layers: &[Arc<dyn Layer>],
        background: Option<Rgba8>,
    ) {
        if let Err(err) = self.try_render(surface, viewport, layers, background) {
            tracing::error!(error = %err, "map frame failed");
        }
    }

    /// Draw one frame onto `surface`, returning the first error.
    ///
    /// A failed frame skips tile eviction and does not advance the generation.
    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(generation = self.generation, layers = layers.len())
    )]
    pub fn try_render(
        &mut self,
        surface: &mut MapSurface,
        viewport: &Viewport,
        layers: &[Arc<dyn Layer>],
        background: Option<Rgba8>,
    ) -> MapRenderResult<()> {
        viewport.validate()?;
        surface.clear(background.unwrap_or(self.opts.default_background));

        // Snapshot: the frame iterates its own list of layer handles.
        let layers: Vec<Arc<dyn Layer>> = layers.to_vec();
        let generation = self.generation;
        self.tiles.mark_all_unused(generation);

        let mut visits = 0usize;
        {
            let mut res = DrawResources {
                symbols: &mut self.symbols,
                tiles: &mut self.tiles,
                bitmaps: self.bitmaps.as_ref(),
                generation,
            };
            iterate_visible_features(viewport, &layers, |vp, layer, style, feature| {
                visits += 1;
                dispatch_geometry(surface, vp, layer.opacity(), style, feature, &mut res)
            })?;
        }
        surface.flush();

        let evicted = self
            .tiles
            .evict_stale(generation, self.opts.retention_multiplier);
        self.generation += 1;
        tracing::debug!(
            visits,
            evicted,
            tiles = self.tiles.len(),
            symbols = self.symbols.len(),
            "map frame complete"
        );
        Ok(())
    }

    /// Render into a fresh surface sized to `viewport` and return its pixels.
    pub fn render_frame(
        &mut self,
        viewport: &Viewport,
        layers: &[Arc<dyn Layer>],
        opts: &EncodeOpts,
    ) -> MapRenderResult<FrameRGBA> {
        let mut surface = MapSurface::for_viewport(viewport, opts.pixel_density)?;
        self.try_render(&mut surface, viewport, layers, opts.background)?;
        Ok(surface.to_frame())
    }

    /// Render one frame to PNG bytes, or `None` (logged) on failure.
    pub fn render_to_encoded_image(
        &mut self,
        viewport: &Viewport,
        layers: &[Arc<dyn Layer>],
        background: Option<Rgba8>,
    ) -> Option<Vec<u8>> {
        let opts = EncodeOpts {
            background,
            ..EncodeOpts::default()
        };
        self.render_to_encoded_image_with(viewport, layers, &opts)
    }

    /// Render one frame and encode it per `opts`, or `None` (logged) on failure.
    pub fn render_to_encoded_image_with(
        &mut self,
        viewport: &Viewport,
        layers: &[Arc<dyn Layer>],
        opts: &EncodeOpts,
    ) -> Option<Vec<u8>> {
        match self.try_render_to_encoded_image(viewport, layers, opts) {
            Ok(bytes) => Some(bytes),
            Err(err) => {
                tracing::error!(error = %err, "rendering map image failed");
                None
            }
        }
    }

    /// Render one frame and encode it per `opts`, returning the error on failure.
    #[tracing::instrument(level = "debug", skip_all, fields(format = ?opts.format))]
    pub fn try_render_to_encoded_image(
        &mut self,
        viewport: &Viewport,
        layers: &[Arc<dyn Layer>],
        opts: &EncodeOpts,
    ) -> MapRenderResult<Vec<u8>> {
        let frame = self.render_frame(viewport, layers, opts)?;
        encode_frame(&frame, opts.format)
    }

    /// Release every cached symbol and tile bitmap.
    pub fn release_all_cached_resources(&mut self) {
        let symbols = self.symbols.dispose_all();
        let tiles = self.tiles.dispose_all();
        tracing::debug!(symbols, tiles, "released cached bitmaps");
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/renderer.rs"]
mod tests;
