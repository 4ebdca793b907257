//! Per-geometry drawing routines.
//!
//! Routines build paths in screen pixels and draw them through the surface's base transform.
//! Each routine only reads the style fields that apply to its geometry; other style kinds draw
//! nothing.

pub(crate) mod line;
pub(crate) mod point;
pub(crate) mod polygon;
pub(crate) mod raster;

use crate::foundation::core::{Affine, BezPath, Point, Rgba8};
use crate::scene::viewport::Viewport;

pub(crate) fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

pub(crate) fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::LineTo(p) => out.line_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::QuadTo(p1, p2) => out.quad_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
            ),
            PathEl::CurveTo(p1, p2, p3) => out.curve_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
                vello_cpu::kurbo::Point::new(p3.x, p3.y),
            ),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

pub(crate) fn color_to_cpu(c: Rgba8) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

/// Append `ring` (world coordinates) to `path` as one screen-space subpath.
pub(crate) fn push_screen_ring(path: &mut BezPath, viewport: &Viewport, ring: &[Point], close: bool) {
    let mut pts = ring.iter().map(|p| viewport.world_to_screen(*p));
    let Some(first) = pts.next() else {
        return;
    };
    path.move_to(first);
    for p in pts {
        path.line_to(p);
    }
    if close {
        path.close_path();
    }
}

/// Reset per-draw state and run `draw`, wrapped in an opacity layer when `opacity < 1`.
pub(crate) fn with_opacity(
    ctx: &mut vello_cpu::RenderContext,
    opacity: f32,
    draw: impl FnOnce(&mut vello_cpu::RenderContext),
) {
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity <= 0.0 {
        return;
    }
    ctx.set_blend_mode(vello_cpu::peniko::BlendMode::default());
    ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
    if opacity < 1.0 {
        ctx.push_opacity_layer(opacity);
    }
    draw(ctx);
    if opacity < 1.0 {
        ctx.pop_layer();
    }
}
