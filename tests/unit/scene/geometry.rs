use super::*;

fn square(x0: f64, y0: f64, size: f64) -> Vec<Point> {
    vec![
        Point::new(x0, y0),
        Point::new(x0 + size, y0),
        Point::new(x0 + size, y0 + size),
        Point::new(x0, y0 + size),
    ]
}

#[test]
fn vertices_flatten_polygon_rings_in_order() {
    let poly = Polygon {
        exterior: square(0.0, 0.0, 10.0),
        holes: vec![square(2.0, 2.0, 1.0)],
    };
    let v = Geometry::Polygon(poly).vertices().unwrap();
    assert_eq!(v.len(), 8);
    assert_eq!(v[0], Point::new(0.0, 0.0));
    assert_eq!(v[4], Point::new(2.0, 2.0));
}

#[test]
fn raster_vertices_are_unsupported() {
    let tile = Arc::new(RasterTile::new(Rect::new(0.0, 0.0, 1.0, 1.0), vec![0u8]));
    let err = Geometry::Raster(tile).vertices().unwrap_err();
    assert!(matches!(err, MapRenderError::UnsupportedGeometry(ref k) if k == "raster"));
}

#[test]
fn collection_containing_raster_fails_vertex_extraction() {
    let tile = Arc::new(RasterTile::new(Rect::new(0.0, 0.0, 1.0, 1.0), vec![0u8]));
    let g = Geometry::Collection(vec![
        Geometry::Point(Point::new(1.0, 1.0)),
        Geometry::Raster(tile),
    ]);
    assert!(g.vertices().is_err());
}

#[test]
fn bounds_cover_all_kinds() {
    assert_eq!(
        Geometry::Point(Point::new(3.0, 4.0)).bounds(),
        Some(Rect::new(3.0, 4.0, 3.0, 4.0))
    );
    assert_eq!(
        Geometry::LineString(vec![Point::new(-1.0, 5.0), Point::new(4.0, -2.0)]).bounds(),
        Some(Rect::new(-1.0, -2.0, 4.0, 5.0))
    );
    let tile = Arc::new(RasterTile::new(Rect::new(0.0, 0.0, 8.0, 8.0), vec![0u8]));
    assert_eq!(
        Geometry::Raster(tile).bounds(),
        Some(Rect::new(0.0, 0.0, 8.0, 8.0))
    );
    assert_eq!(Geometry::MultiPoint(vec![]).bounds(), None);
}

#[test]
fn collection_bounds_rejects_empty_input() {
    let err = collection_bounds(&[]).unwrap_err();
    assert!(matches!(err, MapRenderError::InvalidArgument(_)));

    let err = collection_bounds(&[Geometry::LineString(vec![])]).unwrap_err();
    assert!(matches!(err, MapRenderError::InvalidArgument(_)));
}

#[test]
fn collection_bounds_unions_members() {
    let r = collection_bounds(&[
        Geometry::Point(Point::new(0.0, 0.0)),
        Geometry::Polygon(Polygon::new(square(5.0, 5.0, 5.0))),
    ])
    .unwrap();
    assert_eq!(r, Rect::new(0.0, 0.0, 10.0, 10.0));
}
