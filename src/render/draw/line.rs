use crate::foundation::core::{BezPath, Point};
use crate::render::draw::{affine_to_cpu, bezpath_to_cpu, color_to_cpu, push_screen_ring, with_opacity};
use crate::render::surface::MapSurface;
use crate::scene::style::{Style, StyleKind};
use crate::scene::viewport::Viewport;

/// Stroke every polyline in `lines` with the vector style's line pen.
pub(crate) fn draw_lines(
    surface: &mut MapSurface,
    viewport: &Viewport,
    style: &Style,
    lines: &[Vec<Point>],
    layer_opacity: f32,
) {
    let StyleKind::Vector(vector) = &style.kind else {
        return;
    };
    let Some(pen) = vector.line else {
        return;
    };
    if pen.width <= 0.0 {
        return;
    }

    let mut path = BezPath::new();
    for line in lines.iter().filter(|l| l.len() >= 2) {
        push_screen_ring(&mut path, viewport, line, false);
    }
    if path.elements().is_empty() {
        return;
    }

    let base = surface.base_transform();
    let cpu_path = bezpath_to_cpu(&path);
    with_opacity(surface.ctx_mut(), layer_opacity * vector.opacity, |ctx| {
        ctx.set_transform(affine_to_cpu(base));
        ctx.set_stroke(vello_cpu::kurbo::Stroke::new(pen.width));
        ctx.set_paint(color_to_cpu(pen.color));
        ctx.stroke_path(&cpu_path);
    });
}
