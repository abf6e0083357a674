use strokeplot_core::{Point, Polyline, Region};
use strokeplot_geometry::{clip, Clipper, GeoPoint, Projection, METERS_PER_DEGREE};

fn region() -> Region {
    Region::new(Point::new(10.0, 10.0), 5.0).unwrap()
}

#[test]
fn test_inside_polylines_unchanged() {
    let input = vec![
        Polyline::from_coords(&[(6.0, 6.0), (14.0, 6.0), (14.0, 14.0), (6.0, 14.0)]).unwrap(),
        Polyline::from_coords(&[(10.0, 10.0), (5.0, 15.0)]).unwrap(),
        Polyline::from_coords(&[(7.3, 8.1), (7.4, 8.2), (12.9, 11.1)]).unwrap(),
        // Zero length
        Polyline::from_coords(&[(9.0, 9.0), (9.0, 9.0)]).unwrap(),
    ];
    assert_eq!(clip(input.clone(), &region()), input);
}

#[test]
fn test_outside_polylines_removed() {
    let input = vec![
        Polyline::from_coords(&[(0.0, 0.0), (4.0, 0.0), (4.0, 4.9)]).unwrap(),
        Polyline::from_coords(&[(16.0, 0.0), (30.0, 30.0)]).unwrap(),
        Polyline::from_coords(&[(-100.0, 20.0), (100.0, 20.0)]).unwrap(),
    ];
    let (out, report) = Clipper::new(region()).clip(input);
    assert!(out.is_empty());
    assert_eq!(report.input, 3);
    assert_eq!(report.output, 0);
}

#[test]
fn test_single_crossing_yields_one_piece_on_boundary() {
    let input = vec![Polyline::from_coords(&[(10.0, 10.0), (25.0, 13.0)]).unwrap()];
    let out = clip(input, &region());

    assert_eq!(out.len(), 1);
    let piece = &out[0];
    assert_eq!(piece.start(), Point::new(10.0, 10.0));
    assert!((piece.end().x - 15.0).abs() < 1e-9);
    assert!((piece.end().y - 11.0).abs() < 1e-9);
}

#[test]
fn test_line_through_region_keeps_both_boundary_points() {
    let input = vec![Polyline::from_coords(&[(0.0, 10.0), (20.0, 10.0)]).unwrap()];
    let out = clip(input, &region());
    assert_eq!(out.len(), 1);
    assert!((out[0].start().x - 5.0).abs() < 1e-9);
    assert!((out[0].end().x - 15.0).abs() < 1e-9);
}

#[test]
fn test_zigzag_across_edge() {
    // Crosses the top edge four times
    let input = vec![Polyline::from_coords(&[
        (6.0, 14.0),
        (7.0, 16.0),
        (8.0, 14.0),
        (9.0, 16.0),
        (10.0, 14.0),
    ])
    .unwrap()];
    let (out, report) = Clipper::new(region()).clip(input);

    assert_eq!(out.len(), 3);
    assert_eq!(report.split, 1);
    for piece in &out {
        assert!(piece.points().iter().all(|p| p.y <= 15.0 + 1e-9));
    }
}

#[test]
fn test_geographic_projection_before_clipping() {
    let origin = GeoPoint::new(0.0, 0.0);
    let clipper = Clipper::new(Region::centered(1000.0).unwrap())
        .with_projection(Projection::Geographic { origin });

    // 0.001 degrees is about 111 m; 0.01 degrees is well outside 500 m
    let road = Polyline::from_coords(&[(0.0, 0.0), (0.001, 0.0), (0.01, 0.0)]).unwrap();
    let (out, _) = clipper.clip(vec![road]);

    assert_eq!(out.len(), 1);
    assert_eq!(out[0].len(), 3);
    assert!((out[0].points()[1].x - 0.001 * METERS_PER_DEGREE).abs() < 1e-6);
    assert!((out[0].end().x - 500.0).abs() < 1e-6);
}
