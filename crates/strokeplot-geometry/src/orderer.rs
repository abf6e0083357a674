//! Path Orderer
//!
//! Greedy nearest-endpoint sequencing of strokes to cut pen-up travel.
//! This is a single-pass heuristic: each step takes the closest remaining
//! endpoint to the current pen position. It is not an optimal tour and
//! makes no attempt at 2-opt style improvement.

use strokeplot_core::Polyline;
use tracing::{debug, info};

/// What the orderer did to one batch
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OrderReport {
    /// Polylines ordered
    pub count: usize,
    /// Polylines emitted in reverse direction
    pub reversed: usize,
    /// Pen-up travel of the input sequence
    pub travel_before: f64,
    /// Pen-up travel of the output sequence
    pub travel_after: f64,
}

/// Greedy stroke sequencing
pub struct PathOrderer;

impl PathOrderer {
    /// Order a batch.
    ///
    /// Starts from the first polyline as given. Each step scans the
    /// remaining polylines in index order and takes the one whose start or
    /// end is strictly closest to the pen; a closer end reverses it. Exact
    /// ties go to the lower index, and to the start over the end. The
    /// output is a permutation of the input with per-polyline reversal.
    pub fn order(polylines: Vec<Polyline>) -> (Vec<Polyline>, OrderReport) {
        let mut report = OrderReport {
            count: polylines.len(),
            travel_before: pen_up_travel(&polylines),
            ..OrderReport::default()
        };

        // Some(_) marks a polyline still remaining
        let mut remaining: Vec<Option<Polyline>> = polylines.into_iter().map(Some).collect();
        let mut ordered = Vec::with_capacity(remaining.len());

        if let Some(first) = remaining.first_mut().and_then(Option::take) {
            ordered.push(first);
        }

        while ordered.len() < remaining.len() {
            let pen = match ordered.last() {
                Some(line) => line.end(),
                None => break,
            };

            let mut best: Option<(usize, bool, f64)> = None;
            for (index, slot) in remaining.iter().enumerate() {
                let Some(line) = slot else {
                    continue;
                };
                let to_start = pen.distance_to(&line.start());
                let to_end = pen.distance_to(&line.end());

                if best.is_none_or(|(_, _, d)| to_start < d) {
                    best = Some((index, false, to_start));
                }
                if best.is_some_and(|(_, _, d)| to_end < d) {
                    best = Some((index, true, to_end));
                }
            }

            let Some((index, reverse, distance)) = best else {
                break;
            };
            let Some(mut next) = remaining[index].take() else {
                break;
            };
            if reverse {
                next.reverse();
                report.reversed += 1;
            }
            debug!(
                "Next stroke {} (reversed: {}, travel {:.4})",
                index, reverse, distance
            );
            ordered.push(next);
        }

        report.travel_after = pen_up_travel(&ordered);
        info!(
            "Ordered {} polylines: {} reversed, pen-up travel {:.3} -> {:.3}",
            report.count, report.reversed, report.travel_before, report.travel_after
        );
        (ordered, report)
    }
}

/// Greedily order strokes to reduce pen-up travel.
pub fn order(polylines: Vec<Polyline>) -> Vec<Polyline> {
    PathOrderer::order(polylines).0
}

/// Total pen-up distance when drawing `polylines` in sequence.
pub fn pen_up_travel(polylines: &[Polyline]) -> f64 {
    polylines
        .windows(2)
        .map(|w| w[0].end().distance_to(&w[1].start()))
        .sum()
}
