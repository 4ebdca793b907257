use crate::foundation::core::{BezPath, Point};
use crate::render::draw::{affine_to_cpu, bezpath_to_cpu, color_to_cpu, push_screen_ring, with_opacity};
use crate::render::surface::MapSurface;
use crate::scene::geometry::Polygon;
use crate::scene::style::{Style, StyleKind};
use crate::scene::viewport::Viewport;

/// Fill and outline every polygon in `polygons` with a vector style.
///
/// Holes are wound opposite to their exterior so the non-zero fill rule cuts them out.
pub(crate) fn draw_polygons(
    surface: &mut MapSurface,
    viewport: &Viewport,
    style: &Style,
    polygons: &[Polygon],
    layer_opacity: f32,
) {
    let StyleKind::Vector(vector) = &style.kind else {
        return;
    };

    let mut path = BezPath::new();
    for poly in polygons.iter().filter(|p| p.exterior.len() >= 3) {
        let outer_sign = signed_area(&poly.exterior).signum();
        push_screen_ring(&mut path, viewport, &poly.exterior, true);
        for hole in poly.holes.iter().filter(|h| h.len() >= 3) {
            if signed_area(hole).signum() == outer_sign {
                let reversed: Vec<Point> = hole.iter().rev().copied().collect();
                push_screen_ring(&mut path, viewport, &reversed, true);
            } else {
                push_screen_ring(&mut path, viewport, hole, true);
            }
        }
    }
    if path.elements().is_empty() {
        return;
    }

    let base = surface.base_transform();
    let cpu_path = bezpath_to_cpu(&path);
    with_opacity(surface.ctx_mut(), layer_opacity * vector.opacity, |ctx| {
        ctx.set_transform(affine_to_cpu(base));
        if let Some(fill) = vector.fill {
            ctx.set_paint(color_to_cpu(fill));
            ctx.fill_path(&cpu_path);
        }
        if let Some(pen) = vector.outline.filter(|p| p.width > 0.0) {
            ctx.set_stroke(vello_cpu::kurbo::Stroke::new(pen.width));
            ctx.set_paint(color_to_cpu(pen.color));
            ctx.stroke_path(&cpu_path);
        }
    });
}

/// Shoelace area; positive for counter-clockwise rings in world coordinates.
pub(crate) fn signed_area(ring: &[Point]) -> f64 {
    let n = ring.len();
    if n < 3 {
        return 0.0;
    }
    let mut acc = 0.0;
    for i in 0..n {
        let a = ring[i];
        let b = ring[(i + 1) % n];
        acc += a.x * b.y - b.x * a.y;
    }
    acc * 0.5
}
