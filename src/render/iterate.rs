use std::sync::Arc;

use smallvec::{SmallVec, smallvec};

use crate::foundation::error::MapRenderResult;
use crate::render::visibility::is_active;
use crate::scene::feature::Feature;
use crate::scene::layer::Layer;
use crate::scene::style::{Style, StyleKind};
use crate::scene::viewport::Viewport;

/// Walk `layers` in order and call `on_visit` for every `(viewport, layer, style, feature)` that
/// should be drawn this frame.
///
/// Order is layer order, then style order within the layer, then feature query order; after a
/// layer's style pass, its per-feature override styles are visited in a second pass over the
/// same feature list. Later calls paint on top of earlier ones.
///
/// The first error returned by `on_visit` aborts the traversal.
pub fn iterate_visible_features<F>(
    viewport: &Viewport,
    layers: &[Arc<dyn Layer>],
    mut on_visit: F,
) -> MapRenderResult<()>
where
    F: FnMut(&Viewport, &dyn Layer, &Arc<Style>, &Arc<Feature>) -> MapRenderResult<()>,
{
    let resolution = viewport.resolution;
    let extent = viewport.extent();

    for layer in layers {
        let layer = layer.as_ref();
        if !is_active(layer, resolution) {
            continue;
        }

        // Queried once; every style of the layer reuses this list.
        let features = layer.features(extent, resolution);

        if let Some(layer_style) = layer.style() {
            for style in member_styles(&layer_style) {
                for feature in &features {
                    visit_effective(viewport, layer, &style, feature, &mut on_visit)?;
                }
            }
        }

        for feature in &features {
            for style in &feature.styles {
                // Overrides are gated on the enable flag only.
                if style.enabled {
                    on_visit(viewport, layer, style, feature)?;
                }
            }
        }
    }
    Ok(())
}

fn member_styles(style: &Arc<Style>) -> SmallVec<[Arc<Style>; 4]> {
    match &style.kind {
        StyleKind::Collection(members) => members.iter().cloned().collect(),
        _ => smallvec![style.clone()],
    }
}

fn visit_effective<F>(
    viewport: &Viewport,
    layer: &dyn Layer,
    style: &Arc<Style>,
    feature: &Arc<Feature>,
    on_visit: &mut F,
) -> MapRenderResult<()>
where
    F: FnMut(&Viewport, &dyn Layer, &Arc<Style>, &Arc<Feature>) -> MapRenderResult<()>,
{
    let resolution = viewport.resolution;
    let effective = match &style.kind {
        StyleKind::Theme(theme) => match theme.style_for(feature, viewport) {
            Some(s) => s,
            None => return Ok(()),
        },
        _ => style.clone(),
    };
    if !is_active(effective.as_ref(), resolution) {
        return Ok(());
    }

    if let StyleKind::Collection(members) = &effective.kind {
        for member in members {
            if is_active(member.as_ref(), resolution) {
                on_visit(viewport, layer, member, feature)?;
            }
        }
        return Ok(());
    }
    on_visit(viewport, layer, &effective, feature)
}

#[cfg(test)]
#[path = "../../tests/unit/render/iterate.rs"]
mod tests;
