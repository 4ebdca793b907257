use std::slice;

use crate::foundation::error::MapRenderResult;
use crate::render::cache::{SymbolCache, TileCache};
use crate::render::draw::{line, point, polygon, raster};
use crate::render::surface::MapSurface;
use crate::scene::bitmap::BitmapRegistry;
use crate::scene::feature::Feature;
use crate::scene::geometry::Geometry;
use crate::scene::style::{Style, StyleKind};
use crate::scene::viewport::Viewport;

/// Caches and lookup tables the drawing routines need for one frame.
pub(crate) struct DrawResources<'a> {
    pub(crate) symbols: &'a mut SymbolCache,
    pub(crate) tiles: &'a mut TileCache,
    pub(crate) bitmaps: &'a BitmapRegistry,
    pub(crate) generation: u64,
}

/// Route one `(style, feature)` pair to the drawing routine for its geometry kind.
///
/// Points get the symbol cache, rasters get the tile cache and the generation, lines and
/// polygons get neither. Geometry collections have no routine and are skipped without error.
pub(crate) fn dispatch_geometry(
    surface: &mut MapSurface,
    viewport: &Viewport,
    layer_opacity: f32,
    style: &Style,
    feature: &Feature,
    res: &mut DrawResources<'_>,
) -> MapRenderResult<()> {
    if matches!(style.kind, StyleKind::Theme(_) | StyleKind::Collection(_)) {
        // Only reachable through per-feature overrides, which are drawn as given.
        tracing::trace!("skipping unresolved theme/collection override style");
        return Ok(());
    }

    match &feature.geometry {
        Geometry::Point(p) => point::draw_points(
            surface,
            viewport,
            style,
            slice::from_ref(p),
            layer_opacity,
            res.symbols,
            res.bitmaps,
            res.generation,
        ),
        Geometry::MultiPoint(pts) => point::draw_points(
            surface,
            viewport,
            style,
            pts,
            layer_opacity,
            res.symbols,
            res.bitmaps,
            res.generation,
        ),
        Geometry::LineString(l) => {
            line::draw_lines(surface, viewport, style, slice::from_ref(l), layer_opacity);
            Ok(())
        }
        Geometry::MultiLineString(ls) => {
            line::draw_lines(surface, viewport, style, ls, layer_opacity);
            Ok(())
        }
        Geometry::Polygon(p) => {
            polygon::draw_polygons(surface, viewport, style, slice::from_ref(p), layer_opacity);
            Ok(())
        }
        Geometry::MultiPolygon(ps) => {
            polygon::draw_polygons(surface, viewport, style, ps, layer_opacity);
            Ok(())
        }
        Geometry::Raster(tile) => raster::draw_raster(
            surface,
            viewport,
            style,
            tile,
            layer_opacity,
            res.tiles,
            res.generation,
        ),
        Geometry::Collection(_) => {
            tracing::trace!(
                kind = feature.geometry.kind().name(),
                "no drawing routine for geometry kind, skipping"
            );
            Ok(())
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/dispatch.rs"]
mod tests;
