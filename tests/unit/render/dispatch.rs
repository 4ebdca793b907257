use std::io::Cursor;
use std::sync::Arc;

use super::*;
use crate::foundation::core::{Point, Rect, Rgba8};
use crate::scene::geometry::{Polygon, RasterTile};
use crate::scene::style::{RasterStyle, SymbolStyle, VectorStyle};
use crate::scene::theme::FnTheme;
use crate::{MapRenderError, TileKey};

fn viewport() -> Viewport {
    Viewport::new(Point::new(50.0, 50.0), 10.0, 10.0, 10.0)
}

fn png(w: u32, h: u32, rgba: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba(rgba));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

struct Fixture {
    surface: MapSurface,
    symbols: SymbolCache,
    tiles: TileCache,
    bitmaps: BitmapRegistry,
}

impl Fixture {
    fn new() -> Self {
        let mut surface = MapSurface::new(10, 10).unwrap();
        surface.clear(Rgba8::WHITE);
        Self {
            surface,
            symbols: SymbolCache::new(),
            tiles: TileCache::new(),
            bitmaps: BitmapRegistry::new(),
        }
    }

    fn draw(&mut self, style: &Style, feature: &Feature, generation: u64) -> MapRenderResult<()> {
        let mut res = DrawResources {
            symbols: &mut self.symbols,
            tiles: &mut self.tiles,
            bitmaps: &self.bitmaps,
            generation,
        };
        dispatch_geometry(&mut self.surface, &viewport(), 1.0, style, feature, &mut res)
    }
}

#[test]
fn points_use_the_symbol_cache_only() {
    let mut fx = Fixture::new();
    let style = Style::symbol(SymbolStyle::default());
    fx.draw(&style, &Feature::new(Geometry::Point(Point::new(50.0, 50.0))), 1)
        .unwrap();
    fx.draw(
        &style,
        &Feature::new(Geometry::MultiPoint(vec![
            Point::new(10.0, 10.0),
            Point::new(90.0, 90.0),
        ])),
        1,
    )
    .unwrap();
    assert_eq!(fx.symbols.len(), 1);
    assert!(fx.tiles.is_empty());
}

#[test]
fn rasters_use_the_tile_cache_with_the_generation() {
    let mut fx = Fixture::new();
    let tile = Arc::new(RasterTile::new(
        Rect::new(0.0, 0.0, 100.0, 100.0),
        png(4, 4, [0, 0, 255, 255]),
    ));
    let feature = Feature::new(Geometry::Raster(tile.clone()));
    let style = Style::raster(RasterStyle::default());

    fx.draw(&style, &feature, 7).unwrap();
    assert!(fx.symbols.is_empty());
    let entry = fx.tiles.lookup(&TileKey::new(&tile)).unwrap();
    assert_eq!(entry.generation(), 7);
    assert_eq!(entry.bitmap().width(), 4);

    fx.surface.flush();
    assert_eq!(fx.surface.to_frame().pixel(5, 5), Some(Rgba8::rgb(0, 0, 255)));
}

#[test]
fn undecodable_tiles_fail() {
    let mut fx = Fixture::new();
    let tile = Arc::new(RasterTile::new(
        Rect::new(0.0, 0.0, 100.0, 100.0),
        vec![0u8; 16],
    ));
    let err = fx
        .draw(
            &Style::raster(RasterStyle::default()),
            &Feature::new(Geometry::Raster(tile)),
            1,
        )
        .unwrap_err();
    assert!(matches!(err, MapRenderError::Other(_)));
    assert!(fx.tiles.is_empty());
}

#[test]
fn polygons_and_lines_touch_no_cache() {
    let mut fx = Fixture::new();
    let style = Style::vector(VectorStyle {
        fill: Some(Rgba8::rgb(255, 0, 0)),
        outline: None,
        ..VectorStyle::default()
    });
    let square = Polygon::new(vec![
        Point::new(0.0, 0.0),
        Point::new(100.0, 0.0),
        Point::new(100.0, 100.0),
        Point::new(0.0, 100.0),
    ]);
    fx.draw(&style, &Feature::new(Geometry::Polygon(square)), 1)
        .unwrap();
    fx.draw(
        &style,
        &Feature::new(Geometry::LineString(vec![
            Point::new(0.0, 50.0),
            Point::new(100.0, 50.0),
        ])),
        1,
    )
    .unwrap();
    assert!(fx.symbols.is_empty());
    assert!(fx.tiles.is_empty());

    fx.surface.flush();
    assert_eq!(fx.surface.to_frame().pixel(2, 2), Some(Rgba8::rgb(255, 0, 0)));
}

#[test]
fn collections_are_skipped_silently() {
    let mut fx = Fixture::new();
    let feature = Feature::new(Geometry::Collection(vec![Geometry::Point(Point::new(
        50.0, 50.0,
    ))]));
    fx.draw(&Style::symbol(SymbolStyle::default()), &feature, 1)
        .unwrap();
    assert!(fx.symbols.is_empty());
    assert!(fx.tiles.is_empty());
}

#[test]
fn unresolved_theme_styles_draw_nothing() {
    let mut fx = Fixture::new();
    let theme = Style::theme(FnTheme(|_: &Feature, _: &Viewport| {
        Some(Arc::new(Style::symbol(SymbolStyle::default())))
    }));
    fx.draw(&theme, &Feature::new(Geometry::Point(Point::new(50.0, 50.0))), 1)
        .unwrap();
    assert!(fx.symbols.is_empty());
}
