//! Caller-owned scene model: viewport, layers, styles and features.

/// Encoded images referenced by symbol styles.
pub mod bitmap;
/// Serde scene definitions for files.
pub mod def;
/// Styled geographic features.
pub mod feature;
/// Feature geometry.
pub mod geometry;
/// Layer trait and the in-memory layer.
pub mod layer;
/// Fixed styles.
pub mod style;
/// Per-feature style computation.
pub mod theme;
/// Per-frame view state.
pub mod viewport;
