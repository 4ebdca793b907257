use std::sync::Arc;

use crate::foundation::core::{Point, Rect};
use crate::foundation::error::{MapRenderError, MapRenderResult};

/// A georeferenced, still-encoded raster image (typically one map tile).
///
/// Tiles are compared by identity when cached: two tiles with identical bytes and extent are
/// still distinct cache entries.
#[derive(Debug)]
pub struct RasterTile {
    /// World extent covered by the image.
    pub extent: Rect,
    /// Encoded image bytes (PNG, JPEG, ...), decoded lazily on first draw.
    pub data: Arc<[u8]>,
}

impl RasterTile {
    /// Create a tile from encoded bytes.
    pub fn new(extent: Rect, data: impl Into<Arc<[u8]>>) -> Self {
        Self {
            extent,
            data: data.into(),
        }
    }
}

/// Polygon with one exterior ring and zero or more holes.
#[derive(Clone, Debug, PartialEq)]
pub struct Polygon {
    /// Outer boundary.
    pub exterior: Vec<Point>,
    /// Interior rings cut out of the exterior.
    pub holes: Vec<Vec<Point>>,
}

impl Polygon {
    /// Polygon without holes.
    pub fn new(exterior: Vec<Point>) -> Self {
        Self {
            exterior,
            holes: Vec::new(),
        }
    }
}

/// Tag identifying a [`Geometry`] variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GeometryKind {
    /// [`Geometry::Point`]
    Point,
    /// [`Geometry::MultiPoint`]
    MultiPoint,
    /// [`Geometry::LineString`]
    LineString,
    /// [`Geometry::MultiLineString`]
    MultiLineString,
    /// [`Geometry::Polygon`]
    Polygon,
    /// [`Geometry::MultiPolygon`]
    MultiPolygon,
    /// [`Geometry::Raster`]
    Raster,
    /// [`Geometry::Collection`]
    Collection,
}

impl GeometryKind {
    /// Lowercase name used in diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            Self::Point => "point",
            Self::MultiPoint => "multi-point",
            Self::LineString => "line-string",
            Self::MultiLineString => "multi-line-string",
            Self::Polygon => "polygon",
            Self::MultiPolygon => "multi-polygon",
            Self::Raster => "raster",
            Self::Collection => "geometry-collection",
        }
    }
}

/// Feature geometry in world coordinates.
#[derive(Clone, Debug)]
pub enum Geometry {
    /// Single position.
    Point(Point),
    /// Unordered set of positions.
    MultiPoint(Vec<Point>),
    /// Open polyline.
    LineString(Vec<Point>),
    /// Set of polylines.
    MultiLineString(Vec<Vec<Point>>),
    /// Area with optional holes.
    Polygon(Polygon),
    /// Set of areas.
    MultiPolygon(Vec<Polygon>),
    /// Raster tile, shared so cache identity survives cloning the geometry.
    Raster(Arc<RasterTile>),
    /// Heterogeneous collection. No drawing routine handles this kind.
    Collection(Vec<Geometry>),
}

impl Geometry {
    /// Variant tag.
    pub fn kind(&self) -> GeometryKind {
        match self {
            Self::Point(_) => GeometryKind::Point,
            Self::MultiPoint(_) => GeometryKind::MultiPoint,
            Self::LineString(_) => GeometryKind::LineString,
            Self::MultiLineString(_) => GeometryKind::MultiLineString,
            Self::Polygon(_) => GeometryKind::Polygon,
            Self::MultiPolygon(_) => GeometryKind::MultiPolygon,
            Self::Raster(_) => GeometryKind::Raster,
            Self::Collection(_) => GeometryKind::Collection,
        }
    }

    /// All vertices in storage order.
    ///
    /// Raster geometry has no vertex representation and fails with
    /// [`MapRenderError::UnsupportedGeometry`]; collections fail if any member does.
    pub fn vertices(&self) -> MapRenderResult<Vec<Point>> {
        let mut out = Vec::new();
        self.collect_vertices(&mut out)?;
        Ok(out)
    }

    fn collect_vertices(&self, out: &mut Vec<Point>) -> MapRenderResult<()> {
        match self {
            Self::Point(p) => out.push(*p),
            Self::MultiPoint(pts) | Self::LineString(pts) => out.extend_from_slice(pts),
            Self::MultiLineString(lines) => {
                for line in lines {
                    out.extend_from_slice(line);
                }
            }
            Self::Polygon(poly) => push_polygon(poly, out),
            Self::MultiPolygon(polys) => {
                for poly in polys {
                    push_polygon(poly, out);
                }
            }
            Self::Raster(_) => {
                return Err(MapRenderError::unsupported_geometry(
                    GeometryKind::Raster.name(),
                ));
            }
            Self::Collection(members) => {
                for g in members {
                    g.collect_vertices(out)?;
                }
            }
        }
        Ok(())
    }

    /// Bounding box in world coordinates, or `None` for empty geometry.
    pub fn bounds(&self) -> Option<Rect> {
        match self {
            Self::Raster(tile) => Some(tile.extent),
            Self::Collection(members) => members
                .iter()
                .filter_map(Geometry::bounds)
                .reduce(|a, b| a.union(b)),
            _ => {
                let vertices = self.vertices().ok()?;
                let first = *vertices.first()?;
                Some(
                    vertices
                        .iter()
                        .fold(Rect::from_points(first, first), |r, p| r.union_pt(*p)),
                )
            }
        }
    }
}

fn push_polygon(poly: &Polygon, out: &mut Vec<Point>) {
    out.extend_from_slice(&poly.exterior);
    for hole in &poly.holes {
        out.extend_from_slice(hole);
    }
}

/// Union of the bounds of `geometries`.
///
/// Fails with [`MapRenderError::InvalidArgument`] when the input is empty or contains no
/// geometry with extent.
pub fn collection_bounds(geometries: &[Geometry]) -> MapRenderResult<Rect> {
    if geometries.is_empty() {
        return Err(MapRenderError::invalid_argument(
            "geometry collection must not be empty",
        ));
    }
    geometries
        .iter()
        .filter_map(Geometry::bounds)
        .reduce(|a, b| a.union(b))
        .ok_or_else(|| MapRenderError::invalid_argument("geometry collection has no extent"))
}

#[cfg(test)]
#[path = "../../tests/unit/scene/geometry.rs"]
mod tests;
