use proptest::prelude::*;
use strokeplot_core::{AxisFlip, Channels, DeviceRange, Polyline, StrokePoint};
use strokeplot_geometry::{serialize, SerializerOptions, StrokeSerializer};

fn line(coords: &[(f64, f64)]) -> Polyline {
    Polyline::from_coords(coords).unwrap()
}

#[test]
fn test_single_polyline_stream() {
    let out = serialize(
        &[line(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)])],
        DeviceRange::identity(),
        1000.0,
    );
    let red = Channels {
        red: true,
        ..Channels::OFF
    };
    assert_eq!(
        out,
        vec![
            StrokePoint::travel(0, 0, 0),
            StrokePoint::draw(1, 0, 1000, red),
            StrokePoint::draw(1, 1, 1000, red),
        ]
    );
}

#[test]
fn test_dac8_stream() {
    let out = serialize(
        &[line(&[(-1.0, -1.0), (1.0, 1.0)])],
        DeviceRange::dac8(),
        5000.0,
    );
    assert_eq!((out[0].x, out[0].y), (0, 255));
    assert_eq!((out[1].x, out[1].y), (255, 0));
    assert_eq!(out[1].delay, 14142);
}

#[test]
fn test_every_pen_down_follows_its_start() {
    let polylines = vec![
        line(&[(0.0, 0.0), (0.5, 0.0)]),
        line(&[(0.5, 0.5), (0.0, 0.5)]),
        line(&[(0.0, 0.5), (0.0, 0.9)]),
        line(&[(-0.5, -0.5), (-0.9, -0.9)]),
    ];
    let range = DeviceRange::new(0, 1000, AxisFlip::None).unwrap();
    let (out, report) = StrokeSerializer::new(SerializerOptions::new(range, 10.0))
        .unwrap()
        .serialize(&polylines);

    assert!(!out[0].pen);
    assert_eq!(report.jumps, 2);
    for pair in out[1..].windows(2) {
        if !pair[0].pen && pair[1].pen {
            assert_eq!((pair[0].x, pair[0].y), (pair[1].x, pair[1].y));
            assert_eq!(pair[1].delay, 0);
        }
    }
}

proptest! {
    #[test]
    fn prop_coordinates_stay_in_range(
        coords in prop::collection::vec((-3.0f64..3.0, -3.0f64..3.0), 2..10),
        min in -500i32..500,
        span in 1i32..2000,
    ) {
        let range = DeviceRange::new(min, min + span, AxisFlip::Y).unwrap();
        let out = serialize(&[Polyline::from_coords(&coords).unwrap()], range, 5000.0);
        for p in out {
            prop_assert!(p.x >= min && p.x <= min + span);
            prop_assert!(p.y >= min && p.y <= min + span);
        }
    }
}
