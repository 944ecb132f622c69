//! Decoding a raw solve outcome into a placement result.
//!
//! A pure transformation: it pairs each circuit's raw dimensions with its
//! solved corner. Rotation is reported as a flag only; the dimension swap is
//! left to consumers of the serialized layout. It trusts the backend's model
//! and never re-validates geometric feasibility.

use std::time::Duration;

use serde::Serialize;

use crate::{
    instance::Instance,
    solver::driver::{SolveOutcome, SolveResult},
};

/// One circuit in a decoded layout. The dimensions are the raw instance
/// dimensions; a set `rotated` flag tells the consumer to swap them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlacedCircuit {
    pub width: i64,
    pub height: i64,
    pub x: i64,
    pub y: i64,
    pub rotated: bool,
}

/// A decoded layout ready for serialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlacementResult {
    pub plate_width: i64,
    pub height: i64,
    pub circuits: Vec<PlacedCircuit>,
    pub elapsed: Duration,
}

/// Decodes a Sat outcome; `None` for Unsat and TimedOut, whose reporting
/// stays with the [`SolveResult`] itself.
pub fn decode(instance: &Instance, outcome: &SolveOutcome) -> Option<PlacementResult> {
    let SolveResult::Sat { height, placements } = &outcome.result else {
        return None;
    };
    let circuits = placements
        .iter()
        .enumerate()
        .map(|(i, p)| PlacedCircuit {
            width: instance.width_of(i),
            height: instance.height_of(i),
            x: p.x,
            y: p.y,
            rotated: p.rotated,
        })
        .collect();
    Some(PlacementResult {
        plate_width: instance.plate_width(),
        height: *height,
        circuits,
        elapsed: outcome.elapsed,
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::solver::{driver::Placement, stats::SearchStats};

    fn sat_outcome() -> SolveOutcome {
        SolveOutcome {
            result: SolveResult::Sat {
                height: 3,
                placements: vec![
                    Placement {
                        x: 0,
                        y: 0,
                        rotated: false,
                    },
                    Placement {
                        x: 0,
                        y: 1,
                        rotated: true,
                    },
                ],
            },
            elapsed: Duration::from_millis(42),
            stats: SearchStats::default(),
            descriptors: Vec::new(),
        }
    }

    #[test]
    fn keeps_raw_dimensions_for_rotated_circuits() {
        let instance = Instance::new(4, vec![3, 1], vec![1, 3]).unwrap();
        let result = decode(&instance, &sat_outcome()).unwrap();
        assert_eq!(result.circuits[0].width, 3);
        assert_eq!(result.circuits[0].height, 1);
        // The second circuit stays 1x3 in the output; its flag tells the
        // consumer to swap.
        assert_eq!(result.circuits[1].width, 1);
        assert_eq!(result.circuits[1].height, 3);
        assert!(result.circuits[1].rotated);
        assert_eq!(result.height, 3);
        assert_eq!(result.plate_width, 4);
    }

    #[test]
    fn decoding_the_same_outcome_twice_is_identical() {
        let instance = Instance::new(4, vec![3, 1], vec![1, 3]).unwrap();
        let outcome = sat_outcome();
        assert_eq!(decode(&instance, &outcome), decode(&instance, &outcome));
    }

    #[test]
    fn non_sat_outcomes_decode_to_none() {
        let instance = Instance::new(4, vec![3], vec![1]).unwrap();
        for result in [SolveResult::Unsat, SolveResult::TimedOut] {
            let outcome = SolveOutcome {
                result,
                elapsed: Duration::ZERO,
                stats: SearchStats::default(),
                descriptors: Vec::new(),
            };
            assert_eq!(decode(&instance, &outcome), None);
        }
    }
}
