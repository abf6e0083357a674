//! Line Merger
//!
//! Upstream extraction splits one logical feature (a road, a letter
//! stroke) into fragments that share junction vertices. The merger fuses
//! fragments whose endpoints lie within a tolerance of each other back
//! into continuous polylines. Only endpoints are compared, so lines that
//! are merely close along their length stay separate.
//!
//! Fragments live in an index arena; a fragment is taken out of its slot
//! when it is seeded or spliced, so every fragment is used exactly once.

use strokeplot_core::{GeometryError, Point, Polyline};
use tracing::{debug, info};

/// What the merger did to one batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Polylines received
    pub input: usize,
    /// Polylines emitted
    pub output: usize,
    /// Number of splices performed
    pub merges: usize,
}

/// How a candidate attaches to the current chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Join {
    /// chain end meets candidate start
    Append,
    /// chain end meets candidate end
    AppendReversed,
    /// chain start meets candidate end
    Prepend,
    /// chain start meets candidate start
    PrependReversed,
}

/// Arena of fragments not yet consumed
struct FragmentPool {
    slots: Vec<Option<Polyline>>,
}

impl FragmentPool {
    fn new(lines: Vec<Polyline>) -> Self {
        Self {
            slots: lines.into_iter().map(Some).collect(),
        }
    }

    fn len(&self) -> usize {
        self.slots.len()
    }

    fn take(&mut self, index: usize) -> Option<Polyline> {
        self.slots.get_mut(index).and_then(Option::take)
    }

    /// First active fragment, in index order, that joins `chain`.
    fn find_join(&self, chain: &Polyline, tolerance: f64) -> Option<(usize, Join)> {
        let near = |a: Point, b: Point| a.distance_to(&b) <= tolerance;
        let (start, end) = (chain.start(), chain.end());

        self.slots.iter().enumerate().find_map(|(index, slot)| {
            let other = slot.as_ref()?;
            if other.color() != chain.color() {
                return None;
            }

            let join = if near(end, other.start()) {
                Join::Append
            } else if near(end, other.end()) {
                Join::AppendReversed
            } else if near(start, other.end()) {
                Join::Prepend
            } else if near(start, other.start()) {
                Join::PrependReversed
            } else {
                return None;
            };
            Some((index, join))
        })
    }
}

/// Fuses fragments sharing near-coincident endpoints
#[derive(Debug, Clone, Copy)]
pub struct LineMerger {
    tolerance: f64,
}

impl LineMerger {
    /// Create a merger; `tolerance` must be finite and non-negative.
    pub fn new(tolerance: f64) -> Result<Self, GeometryError> {
        if !tolerance.is_finite() || tolerance < 0.0 {
            return Err(GeometryError::InvalidParameter {
                name: "merge_tolerance".to_string(),
                reason: format!("must be finite and >= 0, got {}", tolerance),
            });
        }
        Ok(Self { tolerance })
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Merge a batch.
    ///
    /// Seeds are taken in input order and grown until no remaining
    /// fragment touches either end. When several fragments qualify, the
    /// lowest index wins; end joins are tried before start joins. Fragments
    /// of different colors are never joined. Running the merger again on
    /// its own output changes nothing.
    pub fn merge(&self, polylines: Vec<Polyline>) -> (Vec<Polyline>, MergeReport) {
        let mut report = MergeReport {
            input: polylines.len(),
            ..MergeReport::default()
        };
        let mut pool = FragmentPool::new(polylines);
        let mut out = Vec::new();

        for seed in 0..pool.len() {
            let Some(mut chain) = pool.take(seed) else {
                continue;
            };

            while let Some((index, join)) = pool.find_join(&chain, self.tolerance) {
                let Some(mut other) = pool.take(index) else {
                    break;
                };
                debug!("Joining fragment {} onto chain {} ({:?})", index, seed, join);

                match join {
                    Join::Append => chain.append_joined(other.points()),
                    Join::AppendReversed => {
                        other.reverse();
                        chain.append_joined(other.points());
                    }
                    Join::Prepend => chain.prepend_joined(other.points()),
                    Join::PrependReversed => {
                        other.reverse();
                        chain.prepend_joined(other.points());
                    }
                }
                report.merges += 1;
            }

            out.push(chain);
        }

        report.output = out.len();
        info!(
            "Merged {} polylines into {} ({} joins, tolerance {})",
            report.input, report.output, report.merges, self.tolerance
        );
        (out, report)
    }
}

/// Merge fragments whose endpoints lie within `tolerance`.
///
/// A negative or NaN tolerance matches nothing, so the input passes
/// through unchanged.
pub fn merge(polylines: Vec<Polyline>, tolerance: f64) -> Vec<Polyline> {
    LineMerger { tolerance }.merge(polylines).0
}

#[cfg(test)]
mod tests {
    use super::*;
    use strokeplot_core::Color;

    fn line(coords: &[(f64, f64)]) -> Polyline {
        Polyline::from_coords(coords).unwrap()
    }

    #[test]
    fn test_each_join_kind() {
        let seed = || line(&[(1.0, 0.0), (2.0, 0.0)]);

        let out = merge(vec![seed(), line(&[(2.0, 0.0), (3.0, 0.0)])], 0.01);
        assert_eq!(out, vec![line(&[(1.0, 0.0), (2.0, 0.0), (3.0, 0.0)])]);

        let out = merge(vec![seed(), line(&[(3.0, 0.0), (2.0, 0.0)])], 0.01);
        assert_eq!(out, vec![line(&[(1.0, 0.0), (2.0, 0.0), (3.0, 0.0)])]);

        let out = merge(vec![seed(), line(&[(0.0, 0.0), (1.0, 0.0)])], 0.01);
        assert_eq!(out, vec![line(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)])]);

        let out = merge(vec![seed(), line(&[(1.0, 0.0), (0.0, 0.0)])], 0.01);
        assert_eq!(out, vec![line(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)])]);
    }

    #[test]
    fn test_chain_grows_through_pool() {
        // Fragments listed out of order; the seed picks up both neighbours
        let (out, report) = LineMerger::new(0.0).unwrap().merge(vec![
            line(&[(1.0, 0.0), (2.0, 0.0)]),
            line(&[(3.0, 0.0), (4.0, 0.0)]),
            line(&[(2.0, 0.0), (3.0, 0.0)]),
            line(&[(0.0, 0.0), (1.0, 0.0)]),
        ]);

        assert_eq!(
            out,
            vec![line(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (3.0, 0.0), (4.0, 0.0)])]
        );
        assert_eq!(report.merges, 3);
        assert_eq!(report.input, 4);
        assert_eq!(report.output, 1);
    }

    #[test]
    fn test_first_candidate_wins_tie() {
        let out = merge(
            vec![
                line(&[(0.0, 0.0), (1.0, 0.0)]),
                line(&[(1.0, 0.0), (1.0, 5.0)]),
                line(&[(1.0, 0.0), (5.0, 0.0)]),
            ],
            0.01,
        );
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].end(), Point::new(1.0, 5.0));
        assert_eq!(out[1], line(&[(1.0, 0.0), (5.0, 0.0)]));
    }

    #[test]
    fn test_colors_never_join() {
        let red = line(&[(0.0, 0.0), (1.0, 0.0)]).with_color(Some(Color::RED));
        let blue = line(&[(1.0, 0.0), (2.0, 0.0)]).with_color(Some(Color::new(0, 0, 255)));
        let out = merge(vec![red.clone(), blue.clone()], 0.5);
        assert_eq!(out, vec![red, blue]);
    }

    #[test]
    fn test_tolerance_keeps_chain_point() {
        let out = merge(
            vec![line(&[(0.0, 0.0), (1.0, 0.0)]), line(&[(1.005, 0.0), (2.0, 0.0)])],
            0.01,
        );
        assert_eq!(out, vec![line(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)])]);
    }

    #[test]
    fn test_invalid_tolerance() {
        assert!(LineMerger::new(-1.0).is_err());
        assert!(LineMerger::new(f64::NAN).is_err());

        let input = vec![line(&[(0.0, 0.0), (1.0, 0.0)]), line(&[(1.0, 0.0), (2.0, 0.0)])];
        assert_eq!(merge(input.clone(), -1.0), input);
    }
}
