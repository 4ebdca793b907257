use kurbo::Shape as _;
use xxhash_rust::xxh3::Xxh3;

use crate::foundation::core::{Affine, BezPath, Point, Rect, Rgba8, Vec2};
use crate::foundation::error::{MapRenderError, MapRenderResult};
use crate::render::bitmap::Bitmap;
use crate::render::cache::{SymbolCache, SymbolKey};
use crate::render::draw::{affine_to_cpu, bezpath_to_cpu, color_to_cpu, with_opacity};
use crate::render::surface::MapSurface;
use crate::scene::bitmap::BitmapRegistry;
use crate::scene::style::{Pen, Style, StyleKind, SymbolStyle, SymbolType};
use crate::scene::viewport::Viewport;

const XXH3_SEED: u64 = 0x51a7_c0de_9e37_79b9;

/// Largest rasterized symbol edge in device pixels.
const MAX_SYMBOL_PX: f64 = 2048.0;

/// Draw a symbol at each of `points`.
///
/// Symbol styles draw their own appearance; vector styles draw a default ellipse built from
/// their fill and outline. The symbol bitmap is looked up in (or added to) `symbols`.
#[allow(clippy::too_many_arguments)]
pub(crate) fn draw_points(
    surface: &mut MapSurface,
    viewport: &Viewport,
    style: &Style,
    points: &[Point],
    layer_opacity: f32,
    symbols: &mut SymbolCache,
    bitmaps: &BitmapRegistry,
    generation: u64,
) -> MapRenderResult<()> {
    let symbol = match &style.kind {
        StyleKind::Symbol(s) => *s,
        StyleKind::Vector(v) => SymbolStyle::from_vector(v),
        _ => return Ok(()),
    };
    if points.is_empty() || !(symbol.scale > 0.0) {
        return Ok(());
    }

    let density = surface.density();
    let key = symbol_key(&symbol, density);
    let bitmap = symbols.get_or_insert_with(key, generation, || match symbol.bitmap {
        Some(id) => {
            let bytes = bitmaps.get(id).ok_or_else(|| {
                MapRenderError::render(format!("symbol bitmap {} is not registered", id.0))
            })?;
            Bitmap::decode(bytes)
        }
        None => rasterize_symbol(&symbol, density),
    })?;

    let (bw, bh) = (f64::from(bitmap.width()), f64::from(bitmap.height()));
    // Vector symbols are rasterized at device resolution; bitmap symbols scale at draw time.
    let k = match symbol.bitmap {
        Some(_) => symbol.scale * density,
        None => 1.0,
    };
    let paint = bitmap.paint();

    with_opacity(surface.ctx_mut(), layer_opacity * symbol.opacity, |ctx| {
        for p in points {
            let center = viewport.world_to_screen(*p).to_vec2() * density;
            let tr = Affine::translate(center)
                * Affine::scale(k)
                * Affine::translate(Vec2::new(-bw * 0.5, -bh * 0.5));
            ctx.set_transform(affine_to_cpu(tr));
            ctx.set_paint(paint.clone());
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, bw, bh));
        }
    });
    Ok(())
}

/// Cache key for a symbol appearance at a pixel density.
///
/// Bitmap symbols key on the bitmap id alone; vector symbols key on every field that changes
/// their pixels. Opacity is applied at draw time and is not part of the key.
pub(crate) fn symbol_key(symbol: &SymbolStyle, density: f64) -> SymbolKey {
    let mut h = Xxh3::with_seed(XXH3_SEED);
    match symbol.bitmap {
        Some(id) => {
            h.update(&[1]);
            h.update(&id.0.to_le_bytes());
        }
        None => {
            h.update(&[0]);
            h.update(&[match symbol.symbol_type {
                SymbolType::Ellipse => 0,
                SymbolType::Rectangle => 1,
                SymbolType::Triangle => 2,
            }]);
            h.update(&symbol.scaled_size().to_bits().to_le_bytes());
            h.update(&density.to_bits().to_le_bytes());
            write_color(&mut h, symbol.fill);
            write_pen(&mut h, symbol.outline);
        }
    }
    SymbolKey(h.digest())
}

fn write_color(h: &mut Xxh3, c: Option<Rgba8>) {
    match c {
        Some(c) => h.update(&[1, c.r, c.g, c.b, c.a]),
        None => h.update(&[0]),
    }
}

fn write_pen(h: &mut Xxh3, pen: Option<Pen>) {
    match pen {
        Some(p) => {
            write_color(h, Some(p.color));
            h.update(&p.width.to_bits().to_le_bytes());
        }
        None => h.update(&[0]),
    }
}

/// Rasterize a vector symbol into a square bitmap at device resolution.
pub(crate) fn rasterize_symbol(symbol: &SymbolStyle, density: f64) -> MapRenderResult<Bitmap> {
    let edge = symbol.scaled_size() * density;
    if !edge.is_finite() || edge <= 0.0 {
        return Err(MapRenderError::render("symbol size must be finite and > 0"));
    }
    let outline = symbol.outline.filter(|p| p.width > 0.0);
    let stroke_w = outline.map(|p| p.width * density).unwrap_or(0.0);
    let side = (edge + stroke_w).ceil().clamp(1.0, MAX_SYMBOL_PX);
    let inset = ((side - edge) * 0.5).max(0.0);
    let shape = Rect::new(inset, inset, side - inset, side - inset);

    let path = symbol_path(symbol.symbol_type, shape);
    let cpu_path = bezpath_to_cpu(&path);

    let n = side as u16;
    let mut ctx = vello_cpu::RenderContext::new(n, n);
    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
    if let Some(fill) = symbol.fill {
        ctx.set_paint(color_to_cpu(fill));
        ctx.fill_path(&cpu_path);
    }
    if let Some(pen) = outline {
        ctx.set_stroke(vello_cpu::kurbo::Stroke::new(stroke_w));
        ctx.set_paint(color_to_cpu(pen.color));
        ctx.stroke_path(&cpu_path);
    }
    let mut pixmap = vello_cpu::Pixmap::new(n, n);
    ctx.flush();
    ctx.render_to_pixmap(&mut pixmap);
    Ok(Bitmap::from_pixmap(pixmap))
}

fn symbol_path(kind: SymbolType, r: Rect) -> BezPath {
    match kind {
        SymbolType::Ellipse => kurbo::Ellipse::from_rect(r).to_path(0.1),
        SymbolType::Rectangle => r.to_path(0.1),
        SymbolType::Triangle => {
            let mut p = BezPath::new();
            p.move_to(Point::new(r.center().x, r.y0));
            p.line_to(Point::new(r.x1, r.y1));
            p.line_to(Point::new(r.x0, r.y1));
            p.close_path();
            p
        }
    }
}

#[cfg(test)]
#[path = "../../../tests/unit/render/draw/point.rs"]
mod tests;
