use std::sync::Arc;

use crate::foundation::core::Rgba8;
use crate::render::visibility::VisibilityRange;
use crate::scene::bitmap::BitmapId;
use crate::scene::theme::Theme;

/// Stroke color and width in pixels.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Pen {
    /// Stroke color.
    pub color: Rgba8,
    /// Stroke width in pixels.
    #[serde(default = "default_pen_width")]
    pub width: f64,
}

fn default_pen_width() -> f64 {
    1.0
}

impl Pen {
    /// Create a pen.
    pub fn new(color: Rgba8, width: f64) -> Self {
        Self { color, width }
    }
}

/// Fill/outline/line appearance for vector geometry.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct VectorStyle {
    /// Polygon (and default point symbol) fill.
    pub fill: Option<Rgba8>,
    /// Polygon (and default point symbol) outline.
    pub outline: Option<Pen>,
    /// Line-string stroke.
    pub line: Option<Pen>,
    /// Opacity multiplier in `[0, 1]`.
    pub opacity: f32,
}

impl Default for VectorStyle {
    fn default() -> Self {
        Self {
            fill: Some(Rgba8::WHITE),
            outline: Some(Pen::new(Rgba8::rgb(128, 128, 128), 1.0)),
            line: Some(Pen::new(Rgba8::BLACK, 1.0)),
            opacity: 1.0,
        }
    }
}

/// Shape used when a symbol has no bitmap.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolType {
    /// Circle or ellipse.
    #[default]
    Ellipse,
    /// Axis-aligned square.
    Rectangle,
    /// Upward-pointing triangle.
    Triangle,
}

/// Point symbol appearance.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SymbolStyle {
    /// Vector shape, used when `bitmap` is `None`.
    pub symbol_type: SymbolType,
    /// Symbol edge length in pixels before `scale`.
    pub size: f64,
    /// Size multiplier.
    pub scale: f64,
    /// Shape fill.
    pub fill: Option<Rgba8>,
    /// Shape outline.
    pub outline: Option<Pen>,
    /// Registered bitmap drawn instead of the vector shape.
    pub bitmap: Option<BitmapId>,
    /// Opacity multiplier in `[0, 1]`.
    pub opacity: f32,
}

impl Default for SymbolStyle {
    fn default() -> Self {
        Self {
            symbol_type: SymbolType::Ellipse,
            size: 20.0,
            scale: 1.0,
            fill: Some(Rgba8::WHITE),
            outline: Some(Pen::new(Rgba8::BLACK, 1.0)),
            bitmap: None,
            opacity: 1.0,
        }
    }
}

impl SymbolStyle {
    /// Symbol built from a vector style's fill and outline, used for points drawn with a
    /// [`VectorStyle`].
    pub fn from_vector(vector: &VectorStyle) -> Self {
        Self {
            fill: vector.fill,
            outline: vector.outline,
            opacity: vector.opacity,
            ..Self::default()
        }
    }

    /// Edge length in pixels after scaling.
    pub fn scaled_size(&self) -> f64 {
        self.size * self.scale
    }
}

/// Raster tile appearance.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RasterStyle {
    /// Opacity multiplier in `[0, 1]`.
    pub opacity: f32,
}

impl Default for RasterStyle {
    fn default() -> Self {
        Self { opacity: 1.0 }
    }
}

/// What a [`Style`] does.
#[derive(Clone, Debug)]
pub enum StyleKind {
    /// Lines and polygons (and default point symbols).
    Vector(VectorStyle),
    /// Point symbols.
    Symbol(SymbolStyle),
    /// Raster tiles.
    Raster(RasterStyle),
    /// Effective style computed per feature.
    Theme(Arc<dyn Theme>),
    /// Ordered member styles, each gated on its own.
    Collection(Vec<Arc<Style>>),
}

/// A style with its own enable flag and resolution window.
#[derive(Clone, Debug)]
pub struct Style {
    /// Disabled styles never draw.
    pub enabled: bool,
    /// Smallest resolution (world units per pixel) at which the style is active.
    pub min_visible: f64,
    /// Largest resolution at which the style is active.
    pub max_visible: f64,
    /// Style payload.
    pub kind: StyleKind,
}

impl Style {
    /// Enabled style visible at every resolution.
    pub fn new(kind: StyleKind) -> Self {
        Self {
            enabled: true,
            min_visible: 0.0,
            max_visible: f64::MAX,
            kind,
        }
    }

    /// Vector style.
    pub fn vector(style: VectorStyle) -> Self {
        Self::new(StyleKind::Vector(style))
    }

    /// Symbol style.
    pub fn symbol(style: SymbolStyle) -> Self {
        Self::new(StyleKind::Symbol(style))
    }

    /// Raster style.
    pub fn raster(style: RasterStyle) -> Self {
        Self::new(StyleKind::Raster(style))
    }

    /// Theme style.
    pub fn theme(theme: impl Theme + 'static) -> Self {
        Self::new(StyleKind::Theme(Arc::new(theme)))
    }

    /// Collection of member styles.
    pub fn collection(members: Vec<Arc<Style>>) -> Self {
        Self::new(StyleKind::Collection(members))
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

    /// Return `true` for theme styles.
    pub fn is_theme(&self) -> bool {
        matches!(self.kind, StyleKind::Theme(_))
    }
}

impl VisibilityRange for Style {
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
