use proptest::prelude::*;
use strokeplot_core::Polyline;
use strokeplot_geometry::{order, pen_up_travel, PathOrderer};

fn line(coords: &[(f64, f64)]) -> Polyline {
    Polyline::from_coords(coords).unwrap()
}

/// Direction-independent identity of a polyline.
fn undirected_key(line: &Polyline) -> Vec<(u64, u64)> {
    let forward: Vec<(u64, u64)> = line
        .points()
        .iter()
        .map(|p| (p.x.to_bits(), p.y.to_bits()))
        .collect();
    let mut backward = forward.clone();
    backward.reverse();
    forward.min(backward)
}

fn multiset(lines: &[Polyline]) -> Vec<Vec<(u64, u64)>> {
    let mut keys: Vec<_> = lines.iter().map(undirected_key).collect();
    keys.sort();
    keys
}

#[test]
fn test_two_line_case_is_minimal() {
    let a = line(&[(0.0, 0.0), (1.0, 0.0)]);
    let b = line(&[(10.0, 0.0), (11.0, 0.0)]);
    let out = order(vec![a.clone(), b.clone()]);
    let travel = pen_up_travel(&out);

    let mut b_rev = b.clone();
    b_rev.reverse();
    let mut a_rev = a.clone();
    a_rev.reverse();
    let alternatives = [
        vec![a.clone(), b.clone()],
        vec![a.clone(), b_rev.clone()],
        vec![a_rev.clone(), b.clone()],
        vec![a_rev.clone(), b_rev.clone()],
        vec![b.clone(), a.clone()],
        vec![b_rev.clone(), a.clone()],
        vec![b.clone(), a_rev.clone()],
        vec![b_rev, a_rev],
    ];
    for alternative in &alternatives {
        assert!(travel <= pen_up_travel(alternative));
    }
    assert_eq!(travel, 9.0);
}

#[test]
fn test_travel_is_reported() {
    let (_, report) = PathOrderer::order(vec![
        line(&[(0.0, 0.0), (1.0, 0.0)]),
        line(&[(50.0, 0.0), (51.0, 0.0)]),
        line(&[(1.5, 0.0), (2.0, 0.0)]),
    ]);
    assert_eq!(report.count, 3);
    assert!(report.travel_after < report.travel_before);
}

fn any_polyline() -> impl Strategy<Value = Polyline> {
    prop::collection::vec((-100.0f64..100.0, -100.0f64..100.0), 2..6)
        .prop_map(|coords| Polyline::from_coords(&coords).unwrap())
}

proptest! {
    #[test]
    fn prop_order_is_permutation(input in prop::collection::vec(any_polyline(), 0..20)) {
        let expected = multiset(&input);
        let out = order(input);
        prop_assert_eq!(multiset(&out), expected);
    }

    #[test]
    fn prop_order_keeps_first_polyline(input in prop::collection::vec(any_polyline(), 1..20)) {
        let first = input[0].clone();
        let out = order(input);
        prop_assert_eq!(&out[0], &first);
    }
}
