/// Enable flag plus the resolution window in which an entity draws.
///
/// Implemented by layers and styles alike; [`is_active`] is the single gate applied to both.
pub trait VisibilityRange {
    /// Disabled entities are never active.
    fn enabled(&self) -> bool;
    /// Smallest resolution (world units per pixel) at which the entity is active.
    fn min_visible(&self) -> f64;
    /// Largest resolution at which the entity is active.
    fn max_visible(&self) -> f64;
}

/// `enabled && min_visible <= resolution <= max_visible`.
pub fn is_active<T: VisibilityRange + ?Sized>(entity: &T, resolution: f64) -> bool {
    entity.enabled() && entity.min_visible() <= resolution && resolution <= entity.max_visible()
}

#[cfg(test)]
#[path = "../../tests/unit/render/visibility.rs"]
mod tests;
