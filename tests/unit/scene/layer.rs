use super::*;
use crate::foundation::core::Point;
use crate::foundation::error::MapRenderError;

fn point(x: f64, y: f64) -> Feature {
    Feature::new(Geometry::Point(Point::new(x, y)))
}

#[test]
fn query_keeps_intersecting_features_in_insertion_order() {
    let layer = MemoryLayer::new("pts")
        .with_feature(point(1.0, 1.0))
        .with_feature(point(50.0, 50.0))
        .with_feature(point(10.0, 10.0));

    let hits = layer.features(Rect::new(0.0, 0.0, 10.0, 10.0), 1.0);
    let xs: Vec<f64> = hits
        .iter()
        .map(|f| match f.geometry {
            Geometry::Point(p) => p.x,
            _ => unreachable!(),
        })
        .collect();
    assert_eq!(xs, vec![1.0, 10.0]);
}

#[test]
fn query_skips_geometry_without_extent() {
    let layer = MemoryLayer::new("empty").with_feature(Feature::new(Geometry::MultiPoint(vec![])));
    assert!(layer.features(Rect::new(-1e9, -1e9, 1e9, 1e9), 1.0).is_empty());
}

#[test]
fn extent_requires_features() {
    let err = MemoryLayer::new("none").extent().unwrap_err();
    assert!(matches!(err, MapRenderError::InvalidArgument(_)));

    let layer = MemoryLayer::new("pts")
        .with_feature(point(-5.0, 2.0))
        .with_feature(point(5.0, 8.0));
    assert_eq!(layer.extent().unwrap(), Rect::new(-5.0, 2.0, 5.0, 8.0));
}

#[test]
fn builder_clamps_opacity_and_sets_range() {
    let layer = MemoryLayer::new("l")
        .with_opacity(3.0)
        .with_visible_range(2.0, 4.0)
        .with_enabled(false);
    assert_eq!(layer.opacity(), 1.0);
    assert_eq!(layer.min_visible(), 2.0);
    assert_eq!(layer.max_visible(), 4.0);
    assert!(!layer.enabled());
    assert_eq!(layer.name(), "l");
}

#[test]
fn in_place_edits_affect_queries_and_gating() {
    let mut layer = MemoryLayer::new("edit");
    assert!(layer.is_empty());
    layer.push(point(3.0, 3.0));
    layer.push(point(30.0, 30.0));
    assert_eq!(layer.len(), 2);
    assert_eq!(layer.features(Rect::new(0.0, 0.0, 5.0, 5.0), 1.0).len(), 1);

    assert!(layer.enabled());
    layer.set_enabled(false);
    assert!(!layer.enabled());
    layer.set_enabled(true);
    assert!(layer.enabled());
}
