use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::scene::feature::Feature;
use crate::scene::style::Style;
use crate::scene::viewport::Viewport;

/// Computes the effective style of a single feature.
///
/// Returning `None` (or a disabled style) skips the feature for this theme.
pub trait Theme: Send + Sync + fmt::Debug {
    /// Effective style for `feature` in the current frame.
    fn style_for(&self, feature: &Feature, viewport: &Viewport) -> Option<Arc<Style>>;
}

/// Categorical theme: picks a style by the string form of one feature attribute.
#[derive(Clone, Debug)]
pub struct AttributeTheme {
    attribute: String,
    cases: BTreeMap<String, Arc<Style>>,
    fallback: Option<Arc<Style>>,
}

impl AttributeTheme {
    /// Theme keyed on `attribute`, with no cases yet.
    pub fn new(attribute: impl Into<String>) -> Self {
        Self {
            attribute: attribute.into(),
            cases: BTreeMap::new(),
            fallback: None,
        }
    }

    /// Use `style` for features whose attribute equals `value`.
    pub fn with_case(mut self, value: impl Into<String>, style: Arc<Style>) -> Self {
        self.cases.insert(value.into(), style);
        self
    }

    /// Use `style` for features with a missing or unmatched attribute.
    pub fn with_fallback(mut self, style: Arc<Style>) -> Self {
        self.fallback = Some(style);
        self
    }
}

impl Theme for AttributeTheme {
    fn style_for(&self, feature: &Feature, _viewport: &Viewport) -> Option<Arc<Style>> {
        let value = feature.attribute(&self.attribute).and_then(|v| match v {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            serde_json::Value::Bool(b) => Some(b.to_string()),
            _ => None,
        });
        value
            .and_then(|v| self.cases.get(&v).cloned())
            .or_else(|| self.fallback.clone())
    }
}

/// Adapter turning a closure into a [`Theme`].
pub struct FnTheme<F>(pub F);

impl<F> fmt::Debug for FnTheme<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnTheme(..)")
    }
}

impl<F> Theme for FnTheme<F>
where
    F: Fn(&Feature, &Viewport) -> Option<Arc<Style>> + Send + Sync,
{
    fn style_for(&self, feature: &Feature, viewport: &Viewport) -> Option<Arc<Style>> {
        (self.0)(feature, viewport)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/theme.rs"]
mod tests;
