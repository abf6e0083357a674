use proptest::prelude::*;
use strokeplot_core::Polyline;
use strokeplot_geometry::{merge, LineMerger};

fn line(coords: &[(f64, f64)]) -> Polyline {
    Polyline::from_coords(coords).unwrap()
}

#[test]
fn test_shared_endpoint_merges() {
    let a = line(&[(0.0, 0.0), (1.0, 0.0)]);
    let b = line(&[(1.0, 0.0), (2.0, 0.0)]);
    let out = merge(vec![a, b], 0.01);

    let expected = line(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)]);
    let mut reversed = expected.clone();
    reversed.reverse();
    assert_eq!(out.len(), 1);
    assert!(out[0] == expected || out[0] == reversed);
}

#[test]
fn test_disjoint_lines_pass_through() {
    let a = line(&[(0.0, 0.0), (1.0, 0.0)]);
    let c = line(&[(5.0, 5.0), (6.0, 5.0)]);
    let (out, report) = LineMerger::new(0.01).unwrap().merge(vec![a.clone(), c.clone()]);
    assert_eq!(out, vec![a, c]);
    assert_eq!(report.merges, 0);
}

#[test]
fn test_close_but_disjoint_interiors_not_fused() {
    // Parallel lines 0.001 apart with far-apart endpoints
    let a = line(&[(0.0, 0.0), (10.0, 0.0)]);
    let b = line(&[(20.0, 0.001), (30.0, 0.001)]);
    assert_eq!(merge(vec![a, b], 0.01).len(), 2);
}

#[test]
fn test_merge_preserves_drawn_length() {
    let input = vec![
        line(&[(0.0, 0.0), (1.0, 0.0)]),
        line(&[(2.0, 1.0), (1.0, 0.0)]),
        line(&[(2.0, 1.0), (2.0, 3.0), (4.0, 3.0)]),
    ];
    let before: f64 = input.iter().map(Polyline::length).sum();
    let out = merge(input, 1e-9);
    let after: f64 = out.iter().map(Polyline::length).sum();

    assert_eq!(out.len(), 1);
    assert!((before - after).abs() < 1e-9);
}

fn grid_polyline() -> impl Strategy<Value = Polyline> {
    prop::collection::vec((0i32..4, 0i32..4), 2..5).prop_map(|coords| {
        let coords: Vec<(f64, f64)> = coords
            .into_iter()
            .map(|(x, y)| (f64::from(x), f64::from(y)))
            .collect();
        Polyline::from_coords(&coords).unwrap()
    })
}

proptest! {
    #[test]
    fn prop_merge_is_idempotent(input in prop::collection::vec(grid_polyline(), 0..12)) {
        let once = merge(input, 0.1);
        let twice = merge(once.clone(), 0.1);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn prop_merge_keeps_every_vertex_count(input in prop::collection::vec(grid_polyline(), 0..12)) {
        let points_in: usize = input.iter().map(Polyline::len).sum();
        let (out, report) = LineMerger::new(0.1).unwrap().merge(input);
        let points_out: usize = out.iter().map(Polyline::len).sum();

        // Each join drops exactly one duplicate junction vertex
        prop_assert_eq!(points_out + report.merges, points_in);
        prop_assert_eq!(report.output + report.merges, report.input);
    }
}
