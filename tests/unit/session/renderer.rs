use std::io::Cursor;

use super::*;
use crate::foundation::core::{Point, Rect};
use crate::render::cache::TileKey;
use crate::scene::bitmap::BitmapId;
use crate::scene::feature::Feature;
use crate::scene::geometry::{Geometry, RasterTile};
use crate::scene::layer::MemoryLayer;
use crate::scene::style::{RasterStyle, Style, SymbolStyle};

fn viewport() -> Viewport {
    Viewport::new(Point::new(50.0, 50.0), 10.0, 10.0, 10.0)
}

fn png(rgba: [u8; 4]) -> Vec<u8> {
    png_sized(2, rgba)
}

fn png_sized(side: u32, rgba: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(side, side, image::Rgba(rgba));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

fn tile_layer(tiles: &[Arc<RasterTile>]) -> Arc<dyn Layer> {
    Arc::new(
        MemoryLayer::new("tiles")
            .with_style(Arc::new(Style::raster(RasterStyle::default())))
            .with_features(
                tiles
                    .iter()
                    .map(|t| Feature::new(Geometry::Raster(t.clone()))),
            ),
    )
}

fn tile(x0: f64) -> Arc<RasterTile> {
    Arc::new(RasterTile::new(
        Rect::new(x0, 0.0, x0 + 10.0, 10.0),
        png([0, 128, 0, 255]),
    ))
}

#[test]
fn retention_multiplier_parsing() {
    assert_eq!(parse_retention_multiplier(Some("0.5")), Some(0.5));
    assert_eq!(parse_retention_multiplier(Some(" 4 ")), Some(4.0));
    assert_eq!(parse_retention_multiplier(Some("0")), None);
    assert_eq!(parse_retention_multiplier(Some("-1")), None);
    assert_eq!(parse_retention_multiplier(Some("inf")), None);
    assert_eq!(parse_retention_multiplier(Some("many")), None);
    assert_eq!(parse_retention_multiplier(None), None);
}

#[test]
fn opts_validation() {
    assert!(RendererOpts::default().validate().is_ok());
    let r = MapRenderer::new(RendererOpts::default().with_retention_multiplier(0.5)).unwrap();
    assert_eq!(r.opts().retention_multiplier, 0.5);
    assert_eq!(r.opts().default_background, Rgba8::WHITE);
    assert!(MapRenderer::new(RendererOpts::default().with_retention_multiplier(0.0)).is_err());
    assert!(
        MapRenderer::new(RendererOpts::default().with_retention_multiplier(f64::NAN)).is_err()
    );
}

#[test]
fn generation_advances_once_per_completed_frame() {
    let mut r = MapRenderer::default();
    let mut surface = MapSurface::new(10, 10).unwrap();
    assert_eq!(r.generation(), 1);
    r.try_render(&mut surface, &viewport(), &[], None).unwrap();
    r.try_render(&mut surface, &viewport(), &[], None).unwrap();
    assert_eq!(r.generation(), 3);
}

#[test]
fn failed_frames_do_not_advance_the_generation() {
    let mut r = MapRenderer::default();
    let mut surface = MapSurface::new(10, 10).unwrap();
    let bad = Arc::new(RasterTile::new(Rect::new(0.0, 0.0, 10.0, 10.0), vec![1u8, 2, 3]));
    let layers = vec![tile_layer(&[bad])];

    assert!(r.try_render(&mut surface, &viewport(), &layers, None).is_err());
    assert_eq!(r.generation(), 1);

    // `render` swallows the error.
    r.render(&mut surface, &viewport(), &layers, None);
    assert_eq!(r.generation(), 1);
}

#[test]
fn invalid_viewport_is_rejected_before_drawing() {
    let mut r = MapRenderer::default();
    let mut surface = MapSurface::new(10, 10).unwrap();
    let vp = Viewport::new(Point::new(0.0, 0.0), 0.0, 10.0, 10.0);
    assert!(matches!(
        r.try_render(&mut surface, &vp, &[], None),
        Err(MapRenderError::Validation(_))
    ));
}

#[test]
fn low_multiplier_evicts_tiles_not_drawn_this_frame() {
    let mut r = MapRenderer::new(RendererOpts::default().with_retention_multiplier(0.25)).unwrap();
    let mut surface = MapSurface::new(10, 10).unwrap();
    let a = tile(0.0);
    let b = tile(20.0);
    let c = tile(40.0);
    let d = tile(60.0);

    let first = vec![tile_layer(&[a.clone(), b.clone(), c.clone()])];
    r.try_render(&mut surface, &viewport(), &first, None).unwrap();
    // 3 used of 3, keep floor(0.75) = 0: all three evicted right away.
    assert_eq!(r.tile_cache().len(), 0);
    assert_eq!(r.cache_stats().tiles.evicted, 3);

    let mut r = MapRenderer::new(RendererOpts::default().with_retention_multiplier(0.5)).unwrap();
    r.try_render(&mut surface, &viewport(), &first, None).unwrap();
    // 3 used of 3, keep floor(1.5) = 1: two oldest removed.
    assert_eq!(r.tile_cache().len(), 1);

    let second = vec![tile_layer(&[d.clone()])];
    r.try_render(&mut surface, &viewport(), &second, None).unwrap();
    // 1 used of 2, keep floor(1.0) = 1: nothing removed.
    assert_eq!(r.tile_cache().len(), 2);
    assert!(r.tile_cache().contains_key(&TileKey::new(&d)));
}

#[test]
fn default_multiplier_keeps_tiles_across_frames() {
    let mut r = MapRenderer::default();
    let mut surface = MapSurface::new(10, 10).unwrap();
    let t = tile(0.0);
    let layers = vec![tile_layer(&[t.clone()])];
    for _ in 0..4 {
        r.try_render(&mut surface, &viewport(), &layers, None).unwrap();
        assert!(r.tile_cache().contains_key(&TileKey::new(&t)));
    }
    assert_eq!(r.cache_stats().tiles.inserted, 1);
    assert_eq!(
        r.tile_cache().lookup(&TileKey::new(&t)).unwrap().generation(),
        4
    );
}

#[test]
fn release_disposes_both_caches() {
    let mut r = MapRenderer::default();
    let mut surface = MapSurface::new(10, 10).unwrap();
    let points: Arc<dyn Layer> = Arc::new(
        MemoryLayer::new("points")
            .with_style(Arc::new(Style::symbol(SymbolStyle::default())))
            .with_feature(Feature::new(Geometry::Point(Point::new(50.0, 50.0)))),
    );
    let layers = vec![points, tile_layer(&[tile(0.0)])];
    r.try_render(&mut surface, &viewport(), &layers, None).unwrap();
    assert_eq!(r.symbol_cache().len(), 1);
    assert_eq!(r.tile_cache().len(), 1);

    r.release_all_cached_resources();
    assert!(r.symbol_cache().is_empty());
    assert!(r.tile_cache().is_empty());
    let stats = r.cache_stats();
    assert_eq!(stats.symbols.disposed, 1);
    assert_eq!(stats.tiles.disposed, 1);
}

#[test]
fn background_falls_back_to_the_configured_default() {
    let mut r =
        MapRenderer::new(RendererOpts::default().with_default_background(Rgba8::rgb(1, 2, 3)))
            .unwrap();
    let frame = r
        .render_frame(&viewport(), &[], &EncodeOpts::default())
        .unwrap();
    assert_eq!(frame.pixel(0, 0), Some(Rgba8::rgb(1, 2, 3)));

    let frame = r
        .render_frame(
            &viewport(),
            &[],
            &EncodeOpts::default()
                .with_background(Rgba8::BLACK)
                .with_pixel_density(2.0),
        )
        .unwrap();
    assert_eq!((frame.width, frame.height), (20, 20));
    assert_eq!(frame.pixel(19, 19), Some(Rgba8::BLACK));
}

fn bitmap_symbol_layer(id: BitmapId) -> Arc<dyn Layer> {
    Arc::new(
        MemoryLayer::new("pins")
            .with_style(Arc::new(Style::symbol(SymbolStyle {
                bitmap: Some(id),
                ..SymbolStyle::default()
            })))
            .with_feature(Feature::new(Geometry::Point(Point::new(50.0, 50.0)))),
    )
}

fn registry(id: BitmapId, rgba: [u8; 4]) -> Arc<BitmapRegistry> {
    let mut reg = BitmapRegistry::new();
    reg.register_with_id(id, png_sized(4, rgba));
    Arc::new(reg)
}

#[test]
fn replacing_the_registry_redraws_bitmap_symbols_from_new_bytes() {
    let id = BitmapId(7);
    let layers = vec![bitmap_symbol_layer(id)];
    let red = Rgba8::rgb(255, 0, 0);
    let blue = Rgba8::rgb(0, 0, 255);

    let mut r = MapRenderer::default().with_bitmaps(registry(id, [255, 0, 0, 255]));
    let frame = r
        .render_frame(&viewport(), &layers, &EncodeOpts::default())
        .unwrap();
    assert_eq!(frame.pixel(5, 5), Some(red));
    assert_eq!(r.symbol_cache().len(), 1);

    r.set_bitmaps(registry(id, [0, 0, 255, 255]));
    assert!(r.symbol_cache().is_empty());
    assert_eq!(r.cache_stats().symbols.disposed, 1);

    let frame = r
        .render_frame(&viewport(), &layers, &EncodeOpts::default())
        .unwrap();
    assert_eq!(frame.pixel(5, 5), Some(blue));
}

#[test]
fn setting_the_same_registry_keeps_cached_symbols() {
    let id = BitmapId(1);
    let reg = registry(id, [0, 255, 0, 255]);
    let mut r = MapRenderer::default().with_bitmaps(reg.clone());
    r.render_frame(&viewport(), &[bitmap_symbol_layer(id)], &EncodeOpts::default())
        .unwrap();
    assert_eq!(r.symbol_cache().len(), 1);

    r.set_bitmaps(reg);
    assert_eq!(r.symbol_cache().len(), 1);
    assert_eq!(r.cache_stats().symbols.disposed, 0);
}
