use std::collections::BTreeMap;
use std::sync::Arc;

use crate::scene::geometry::Geometry;
use crate::scene::style::Style;

/// A geometry with optional per-feature style overrides and free-form attributes.
#[derive(Clone, Debug)]
pub struct Feature {
    /// World geometry.
    pub geometry: Geometry,
    /// Styles drawn for this feature in addition to the layer style, in order.
    pub styles: Vec<Arc<Style>>,
    /// Attribute values, read by themes.
    pub attributes: BTreeMap<String, serde_json::Value>,
}

impl Feature {
    /// Feature without overrides or attributes.
    pub fn new(geometry: Geometry) -> Self {
        Self {
            geometry,
            styles: Vec::new(),
            attributes: BTreeMap::new(),
        }
    }

    /// Append a per-feature style override.
    pub fn with_style(mut self, style: Arc<Style>) -> Self {
        self.styles.push(style);
        self
    }

    /// Set an attribute.
    pub fn with_attribute(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Attribute value by name.
    pub fn attribute(&self, key: &str) -> Option<&serde_json::Value> {
        self.attributes.get(key)
    }
}
