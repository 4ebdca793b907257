use std::sync::Arc;

use crate::foundation::core::{Affine, Vec2};
use crate::foundation::error::MapRenderResult;
use crate::render::bitmap::Bitmap;
use crate::render::cache::{TileCache, TileKey};
use crate::render::draw::{affine_to_cpu, with_opacity};
use crate::render::surface::MapSurface;
use crate::scene::geometry::RasterTile;
use crate::scene::style::{Style, StyleKind};
use crate::scene::viewport::Viewport;

/// Draw a raster tile stretched over its world extent.
///
/// The decoded tile lives in `tiles`, keyed by tile identity and stamped with `generation`.
/// Raster styles supply the opacity; any other style kind draws the tile opaque.
pub(crate) fn draw_raster(
    surface: &mut MapSurface,
    viewport: &Viewport,
    style: &Style,
    tile: &Arc<RasterTile>,
    layer_opacity: f32,
    tiles: &mut TileCache,
    generation: u64,
) -> MapRenderResult<()> {
    let style_opacity = match &style.kind {
        StyleKind::Raster(r) => r.opacity,
        _ => 1.0,
    };
    let screen = viewport.world_to_screen_rect(tile.extent);
    if screen.width() <= 0.0 || screen.height() <= 0.0 {
        return Ok(());
    }

    let bitmap = tiles.get_or_insert_with(TileKey::new(tile), generation, || {
        Bitmap::decode(&tile.data)
    })?;
    let (bw, bh) = (f64::from(bitmap.width()), f64::from(bitmap.height()));
    if bw == 0.0 || bh == 0.0 {
        return Ok(());
    }
    let tr = surface.base_transform()
        * Affine::translate(Vec2::new(screen.x0, screen.y0))
        * Affine::scale_non_uniform(screen.width() / bw, screen.height() / bh);
    let paint = bitmap.paint();

    with_opacity(surface.ctx_mut(), layer_opacity * style_opacity, |ctx| {
        ctx.set_transform(affine_to_cpu(tr));
        ctx.set_paint(paint);
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, bw, bh));
    });
    Ok(())
}
