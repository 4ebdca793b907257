use std::sync::Arc;

use crate::foundation::core::Rect;
use crate::foundation::error::MapRenderResult;
use crate::render::visibility::VisibilityRange;
use crate::scene::feature::Feature;
use crate::scene::geometry::{Geometry, collection_bounds};
use crate::scene::style::Style;

/// A named, caller-owned source of styled features.
///
/// The renderer only reads layers. `features` is called at most once per layer per frame.
pub trait Layer: VisibilityRange + Send + Sync {
    /// Human-readable layer name.
    fn name(&self) -> &str;

    /// Layer style: a single style, a collection, or a theme. `None` draws nothing from the
    /// layer style pass; per-feature overrides still apply.
    fn style(&self) -> Option<Arc<Style>>;

    /// Opacity multiplier in `[0, 1]` applied to everything the layer draws.
    fn opacity(&self) -> f32 {
        1.0
    }

    /// Features intersecting `extent`, in paint order.
    fn features(&self, extent: Rect, resolution: f64) -> Vec<Arc<Feature>>;
}

/// In-memory layer holding its features directly.
#[derive(Clone, Debug)]
pub struct MemoryLayer {
    name: String,
    enabled: bool,
    min_visible: f64,
    max_visible: f64,
    opacity: f32,
    style: Option<Arc<Style>>,
    features: Vec<Arc<Feature>>,
}

impl MemoryLayer {
    /// Enabled, fully opaque layer visible at every resolution, without style or features.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            enabled: true,
            min_visible: 0.0,
            max_visible: f64::MAX,
            opacity: 1.0,
            style: None,
            features: Vec::new(),
        }
    }

    /// Set the layer style.
    pub fn with_style(mut self, style: Arc<Style>) -> Self {
        self.style = Some(style);
        self
    }

    /// Set the resolution window.
    pub fn with_visible_range(mut self, min_visible: f64, max_visible: f64) -> Self {
        self.min_visible = min_visible;
        self.max_visible = max_visible;
        self
    }

    /// Set the enable flag.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Set the opacity multiplier.
    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity.clamp(0.0, 1.0);
        self
    }

    /// Append a feature.
    pub fn with_feature(mut self, feature: Feature) -> Self {
        self.features.push(Arc::new(feature));
        self
    }

    /// Append features.
    pub fn with_features(mut self, features: impl IntoIterator<Item = Feature>) -> Self {
        self.features.extend(features.into_iter().map(Arc::new));
        self
    }

    /// Toggle the enable flag in place.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Append a feature in place.
    pub fn push(&mut self, feature: Feature) {
        self.features.push(Arc::new(feature));
    }

    /// Number of features held.
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Return `true` when the layer holds no features.
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// World extent of all features.
    pub fn extent(&self) -> MapRenderResult<Rect> {
        let geometries: Vec<Geometry> = self
            .features
            .iter()
            .map(|f| f.geometry.clone())
            .collect();
        collection_bounds(&geometries)
    }
}

impl VisibilityRange for MemoryLayer {
    fn enabled(&self) -> bool {
        self.enabled
    }

    fn min_visible(&self) -> f64 {
        self.min_visible
    }

    fn max_visible(&self) -> f64 {
        self.max_visible
    }
}

impl Layer for MemoryLayer {
    fn name(&self) -> &str {
        &self.name
    }

    fn style(&self) -> Option<Arc<Style>> {
        self.style.clone()
    }

    fn opacity(&self) -> f32 {
        self.opacity
    }

    fn features(&self, extent: Rect, _resolution: f64) -> Vec<Arc<Feature>> {
        self.features
            .iter()
            .filter(|f| {
                f.geometry
                    .bounds()
                    .is_some_and(|b| intersects_inclusive(b, extent))
            })
            .cloned()
            .collect()
    }
}

// Point geometry has zero-area bounds, so edge contact counts as intersecting.
fn intersects_inclusive(a: Rect, b: Rect) -> bool {
    a.x0 <= b.x1 && b.x0 <= a.x1 && a.y0 <= b.y1 && b.y0 <= a.y1
}

#[cfg(test)]
#[path = "../../tests/unit/scene/layer.rs"]
mod tests;
