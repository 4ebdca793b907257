use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::assets::decode::normalize_rel_path;
use crate::foundation::core::{Point, Rect, Rgba8};
use crate::foundation::error::{MapRenderError, MapRenderResult};
use crate::scene::bitmap::{BitmapId, BitmapRegistry};
use crate::scene::feature::Feature;
use crate::scene::geometry::{Geometry, Polygon, RasterTile};
use crate::scene::layer::{Layer, MemoryLayer};
use crate::scene::style::{Pen, RasterStyle, Style, SymbolStyle, SymbolType, VectorStyle};
use crate::scene::theme::AttributeTheme;
use crate::scene::viewport::Viewport;

/// JSON scene file: an optional viewport, a bitmap table and an ordered layer stack.
///
/// Colors are hex strings (`RRGGBB` or `RRGGBBAA`, optional `#`). Image paths are relative to the
/// scene file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneDef {
    /// View to render. Required unless the caller fits the view to the data.
    #[serde(default)]
    pub viewport: Option<ViewportDef>,
    /// Background color.
    #[serde(default)]
    pub background: Option<String>,
    /// Symbol bitmaps by id.
    #[serde(default)]
    pub bitmaps: BTreeMap<u32, String>,
    /// Layers, bottom first.
    #[serde(default)]
    pub layers: Vec<LayerDef>,
}

/// Viewport section of a scene file.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ViewportDef {
    /// World center as `[x, y]`.
    pub center: [f64; 2],
    /// World units per pixel.
    pub resolution: f64,
    /// Width in pixels.
    pub width: f64,
    /// Height in pixels.
    pub height: f64,
}

/// One layer of a scene file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerDef {
    /// Layer name.
    pub name: String,
    /// Enable flag.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Smallest visible resolution.
    #[serde(default)]
    pub min_visible: f64,
    /// Largest visible resolution; unbounded when absent.
    #[serde(default)]
    pub max_visible: Option<f64>,
    /// Opacity multiplier.
    #[serde(default = "default_opacity")]
    pub opacity: f32,
    /// Layer style.
    #[serde(default)]
    pub style: Option<StyleDef>,
    /// Inline features.
    #[serde(default)]
    pub features: Vec<FeatureDef>,
}

/// Style with its visibility window; the payload is selected by `type`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StyleDef {
    /// Enable flag.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Smallest visible resolution.
    #[serde(default)]
    pub min_visible: f64,
    /// Largest visible resolution; unbounded when absent.
    #[serde(default)]
    pub max_visible: Option<f64>,
    /// Style payload.
    #[serde(flatten)]
    pub kind: StyleKindDef,
}

/// Style payloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StyleKindDef {
    /// Lines and polygons. Absent fields draw nothing.
    Vector {
        /// Fill color.
        #[serde(default)]
        fill: Option<String>,
        /// Outline pen.
        #[serde(default)]
        outline: Option<PenDef>,
        /// Line pen.
        #[serde(default)]
        line: Option<PenDef>,
        /// Opacity.
        #[serde(default = "default_opacity")]
        opacity: f32,
    },
    /// Point symbols.
    Symbol {
        /// Vector shape.
        #[serde(default)]
        symbol: SymbolType,
        /// Edge length in pixels.
        #[serde(default = "default_symbol_size")]
        size: f64,
        /// Size multiplier.
        #[serde(default = "default_scale")]
        scale: f64,
        /// Fill color.
        #[serde(default)]
        fill: Option<String>,
        /// Outline pen.
        #[serde(default)]
        outline: Option<PenDef>,
        /// Bitmap id from the scene's `bitmaps` table.
        #[serde(default)]
        bitmap: Option<u32>,
        /// Opacity.
        #[serde(default = "default_opacity")]
        opacity: f32,
    },
    /// Raster tiles.
    Raster {
        /// Opacity.
        #[serde(default = "default_opacity")]
        opacity: f32,
    },
    /// Ordered member styles.
    Collection {
        /// Members.
        styles: Vec<StyleDef>,
    },
    /// Categorical theme on one feature attribute.
    Theme {
        /// Attribute name.
        attribute: String,
        /// Style per attribute value.
        #[serde(default)]
        cases: BTreeMap<String, StyleDef>,
        /// Style for unmatched features.
        #[serde(default)]
        fallback: Option<Box<StyleDef>>,
    },
}

/// Stroke definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PenDef {
    /// Hex color.
    pub color: String,
    /// Width in pixels.
    #[serde(default = "default_scale")]
    pub width: f64,
}

/// One feature of a layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureDef {
    /// Geometry.
    pub geometry: GeometryDef,
    /// Per-feature override styles.
    #[serde(default)]
    pub styles: Vec<StyleDef>,
    /// Attributes read by themes.
    #[serde(default)]
    pub attributes: BTreeMap<String, serde_json::Value>,
}

/// GeoJSON-shaped geometry plus a raster variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GeometryDef {
    /// `[x, y]`
    Point {
        /// Position.
        coordinates: [f64; 2],
    },
    /// Positions.
    MultiPoint {
        /// Positions.
        coordinates: Vec<[f64; 2]>,
    },
    /// Polyline.
    LineString {
        /// Vertices.
        coordinates: Vec<[f64; 2]>,
    },
    /// Polylines.
    MultiLineString {
        /// Polylines.
        coordinates: Vec<Vec<[f64; 2]>>,
    },
    /// Exterior ring followed by holes.
    Polygon {
        /// Rings.
        coordinates: Vec<Vec<[f64; 2]>>,
    },
    /// Polygons.
    MultiPolygon {
        /// Polygons.
        coordinates: Vec<Vec<Vec<[f64; 2]>>>,
    },
    /// Georeferenced image.
    Raster {
        /// `[x0, y0, x1, y1]` in world units.
        extent: [f64; 4],
        /// Image path relative to the scene file.
        image: String,
    },
    /// Nested geometries.
    GeometryCollection {
        /// Members.
        geometries: Vec<GeometryDef>,
    },
}

fn default_true() -> bool {
    true
}

fn default_opacity() -> f32 {
    1.0
}

fn default_scale() -> f64 {
    1.0
}

fn default_symbol_size() -> f64 {
    20.0
}

/// A scene file turned into renderer inputs.
#[derive(Clone)]
pub struct Scene {
    /// Viewport from the file, if any.
    pub viewport: Option<Viewport>,
    /// Background from the file, if any.
    pub background: Option<Rgba8>,
    /// Symbol bitmaps.
    pub bitmaps: Arc<BitmapRegistry>,
    /// Layers, bottom first.
    pub layers: Vec<Arc<dyn Layer>>,
    /// Union of all feature bounds, if any feature has extent.
    pub extent: Option<Rect>,
}

impl SceneDef {
    /// Parse a scene from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> MapRenderResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| MapRenderError::serde(format!("parse scene JSON: {e}")))
    }

    /// Parse a scene from a JSON string.
    pub fn from_json_str(s: &str) -> MapRenderResult<Self> {
        serde_json::from_str(s).map_err(|e| MapRenderError::serde(format!("parse scene JSON: {e}")))
    }

    /// Parse a scene file from disk.
    pub fn from_path(path: impl AsRef<Path>) -> MapRenderResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            MapRenderError::validation(format!("open scene JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Resolve colors, styles and image files; image paths are read relative to `assets_root`.
    pub fn build(&self, assets_root: impl Into<PathBuf>) -> MapRenderResult<Scene> {
        let loader = Loader {
            root: assets_root.into(),
        };

        let viewport = match self.viewport {
            Some(v) => {
                let vp = Viewport::new(
                    Point::new(v.center[0], v.center[1]),
                    v.resolution,
                    v.width,
                    v.height,
                );
                vp.validate()?;
                Some(vp)
            }
            None => None,
        };
        let background = self.background.as_deref().map(Rgba8::from_hex).transpose()?;

        let mut bitmaps = BitmapRegistry::new();
        for (id, rel) in &self.bitmaps {
            bitmaps.register_with_id(BitmapId(*id), loader.read(rel)?);
        }

        let mut layers: Vec<Arc<dyn Layer>> = Vec::with_capacity(self.layers.len());
        let mut extent: Option<Rect> = None;
        for def in &self.layers {
            let layer = loader.layer(def)?;
            if let Ok(e) = layer.extent() {
                extent = Some(extent.map_or(e, |acc| acc.union(e)));
            }
            layers.push(Arc::new(layer));
        }

        Ok(Scene {
            viewport,
            background,
            bitmaps: Arc::new(bitmaps),
            layers,
            extent,
        })
    }
}

struct Loader {
    root: PathBuf,
}

impl Loader {
    fn read(&self, rel: &str) -> MapRenderResult<Vec<u8>> {
        let norm = normalize_rel_path(rel)?;
        let p = self.root.join(Path::new(&norm));
        std::fs::read(&p).map_err(|e| {
            MapRenderError::validation(format!("failed to read image '{}': {e}", p.display()))
        })
    }

    fn layer(&self, def: &LayerDef) -> MapRenderResult<MemoryLayer> {
        let mut layer = MemoryLayer::new(def.name.clone())
            .with_enabled(def.enabled)
            .with_visible_range(def.min_visible, def.max_visible.unwrap_or(f64::MAX))
            .with_opacity(def.opacity);
        if let Some(style) = &def.style {
            layer = layer.with_style(self.style(style)?);
        }
        for f in &def.features {
            layer.push(self.feature(f)?);
        }
        Ok(layer)
    }

    fn feature(&self, def: &FeatureDef) -> MapRenderResult<Feature> {
        let mut feature = Feature::new(self.geometry(&def.geometry)?);
        for s in &def.styles {
            feature = feature.with_style(self.style(s)?);
        }
        for (k, v) in &def.attributes {
            feature = feature.with_attribute(k.clone(), v.clone());
        }
        Ok(feature)
    }

    fn style(&self, def: &StyleDef) -> MapRenderResult<Arc<Style>> {
        let style = match &def.kind {
            StyleKindDef::Vector {
                fill,
                outline,
                line,
                opacity,
            } => Style::vector(VectorStyle {
                fill: color(fill.as_deref())?,
                outline: pen(outline.as_ref())?,
                line: pen(line.as_ref())?,
                opacity: *opacity,
            }),
            StyleKindDef::Symbol {
                symbol,
                size,
                scale,
                fill,
                outline,
                bitmap,
                opacity,
            } => Style::symbol(SymbolStyle {
                symbol_type: *symbol,
                size: *size,
                scale: *scale,
                fill: color(fill.as_deref())?,
                outline: pen(outline.as_ref())?,
                bitmap: bitmap.map(BitmapId),
                opacity: *opacity,
            }),
            StyleKindDef::Raster { opacity } => Style::raster(RasterStyle { opacity: *opacity }),
            StyleKindDef::Collection { styles } => Style::collection(
                styles
                    .iter()
                    .map(|s| self.style(s))
                    .collect::<MapRenderResult<Vec<_>>>()?,
            ),
            StyleKindDef::Theme {
                attribute,
                cases,
                fallback,
            } => {
                let mut theme = AttributeTheme::new(attribute.clone());
                for (value, s) in cases {
                    theme = theme.with_case(value.clone(), self.style(s)?);
                }
                if let Some(s) = fallback {
                    theme = theme.with_fallback(self.style(s)?);
                }
                Style::theme(theme)
            }
        };
        Ok(Arc::new(
            style
                .with_enabled(def.enabled)
                .with_visible_range(def.min_visible, def.max_visible.unwrap_or(f64::MAX)),
        ))
    }

    fn geometry(&self, def: &GeometryDef) -> MapRenderResult<Geometry> {
        Ok(match def {
            GeometryDef::Point { coordinates } => Geometry::Point(point(*coordinates)),
            GeometryDef::MultiPoint { coordinates } => Geometry::MultiPoint(ring(coordinates)),
            GeometryDef::LineString { coordinates } => Geometry::LineString(ring(coordinates)),
            GeometryDef::MultiLineString { coordinates } => {
                Geometry::MultiLineString(coordinates.iter().map(|l| ring(l)).collect())
            }
            GeometryDef::Polygon { coordinates } => Geometry::Polygon(polygon(coordinates)?),
            GeometryDef::MultiPolygon { coordinates } => Geometry::MultiPolygon(
                coordinates
                    .iter()
                    .map(|p| polygon(p))
                    .collect::<MapRenderResult<Vec<_>>>()?,
            ),
            GeometryDef::Raster { extent, image } => {
                let [x0, y0, x1, y1] = *extent;
                Geometry::Raster(Arc::new(RasterTile::new(
                    Rect::new(x0, y0, x1, y1),
                    self.read(image)?,
                )))
            }
            GeometryDef::GeometryCollection { geometries } => Geometry::Collection(
                geometries
                    .iter()
                    .map(|g| self.geometry(g))
                    .collect::<MapRenderResult<Vec<_>>>()?,
            ),
        })
    }
}

fn point(c: [f64; 2]) -> Point {
    Point::new(c[0], c[1])
}

fn ring(coords: &[[f64; 2]]) -> Vec<Point> {
    coords.iter().map(|c| point(*c)).collect()
}

fn polygon(rings: &[Vec<[f64; 2]>]) -> MapRenderResult<Polygon> {
    let (exterior, holes) = rings
        .split_first()
        .ok_or_else(|| MapRenderError::validation("polygon needs an exterior ring"))?;
    Ok(Polygon {
        exterior: ring(exterior),
        holes: holes.iter().map(|h| ring(h)).collect(),
    })
}

fn color(hex: Option<&str>) -> MapRenderResult<Option<Rgba8>> {
    hex.map(Rgba8::from_hex).transpose()
}

fn pen(def: Option<&PenDef>) -> MapRenderResult<Option<Pen>> {
    def.map(|p| Ok(Pen::new(Rgba8::from_hex(&p.color)?, p.width)))
        .transpose()
}

#[cfg(test)]
#[path = "../../tests/unit/scene/def.rs"]
mod tests;
