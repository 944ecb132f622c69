//! The objective and solve driver.
//!
//! Wires a built constraint set into a backend session, registers the
//! minimize-height objective, enforces the wall-clock deadline, and
//! classifies the outcome. Solve calls are stateless and independent: each
//! one builds its own model and owns its own session, which is released on
//! every exit path when it drops.

use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, info};

use crate::{
    error::{PackError, Result},
    instance::{Instance, Variant},
    model::{builder::PackingModel, expr::ConstraintDescriptor, symmetry::break_symmetry},
    solver::{
        backend::{CheckOutcome, SolverBackend, SolverSession},
        engine::BranchBoundBackend,
        stats::SearchStats,
    },
};

/// Configuration consumed by the driver.
#[derive(Debug, Clone, Copy)]
pub struct SolveConfig {
    pub variant: Variant,
    pub deadline: Duration,
}

impl SolveConfig {
    pub const DEFAULT_DEADLINE: Duration = Duration::from_millis(300_000);

    pub fn new(variant: Variant) -> Self {
        Self {
            variant,
            deadline: Self::DEFAULT_DEADLINE,
        }
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }
}

/// Bottom-left corner and orientation of one solved circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Placement {
    pub x: i64,
    pub y: i64,
    pub rotated: bool,
}

/// Verdict of one solve call. A timeout is an inconclusive outcome and is
/// never conflated with proven infeasibility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SolveResult {
    Sat {
        height: i64,
        placements: Vec<Placement>,
    },
    Unsat,
    TimedOut,
}

/// A classified verdict plus the wall-clock time and search counters behind it.
#[derive(Debug, Clone)]
pub struct SolveOutcome {
    pub result: SolveResult,
    pub elapsed: Duration,
    pub stats: SearchStats,
    /// Descriptors of the asserted constraints, index-aligned with the
    /// per-constraint statistics.
    pub descriptors: Vec<ConstraintDescriptor>,
}

/// Solves an instance against the given backend.
pub fn solve<B: SolverBackend>(
    instance: &Instance,
    config: &SolveConfig,
    backend: &B,
) -> Result<SolveOutcome> {
    let started = Instant::now();

    let mut model = PackingModel::build(instance, config.variant);
    break_symmetry(instance, &mut model);
    debug!(
        variables = model.vars.len(),
        constraints = model.constraints.len(),
        variant = %config.variant,
        "model constructed"
    );

    let descriptors: Vec<ConstraintDescriptor> = model
        .constraints
        .iter()
        .map(|c| c.descriptor.clone())
        .collect();

    // The session is scoped to this call: dropped on success, infeasibility,
    // timeout, and error alike.
    let mut session = backend.open_session(&model.vars)?;
    for constraint in model.constraints.iter().cloned() {
        session.assert(constraint)?;
    }
    session.minimize(model.height);

    let outcome = session.check_with_deadline(config.deadline)?;
    let elapsed = started.elapsed();

    let result = match outcome {
        CheckOutcome::Sat => {
            let height = session.value_int(model.height).ok_or_else(|| {
                PackError::Backend("sat model is missing the height assignment".to_string())
            })?;
            let mut placements = Vec::with_capacity(instance.circuit_count());
            for i in 0..instance.circuit_count() {
                let x = session.value_int(model.x[i]).ok_or_else(|| {
                    PackError::Backend(format!("sat model is missing x[{i}]"))
                })?;
                let y = session.value_int(model.y[i]).ok_or_else(|| {
                    PackError::Backend(format!("sat model is missing y[{i}]"))
                })?;
                // A structurally forced rotation flag may be left unbound by
                // the backend; it reads as not rotated.
                let rotated = model
                    .rot
                    .as_ref()
                    .map(|rot| session.value_bool(rot[i]).unwrap_or(false))
                    .unwrap_or(false);
                placements.push(Placement { x, y, rotated });
            }
            info!(height, elapsed_ms = elapsed.as_millis() as u64, "solution found");
            SolveResult::Sat { height, placements }
        }
        CheckOutcome::Unsat => {
            info!(elapsed_ms = elapsed.as_millis() as u64, "proven infeasible");
            SolveResult::Unsat
        }
        CheckOutcome::Unknown => {
            info!(elapsed_ms = elapsed.as_millis() as u64, "deadline elapsed without a verdict");
            SolveResult::TimedOut
        }
    };

    Ok(SolveOutcome {
        result,
        elapsed,
        stats: session.stats().clone(),
        descriptors,
    })
}

/// Solves with the embedded branch-and-bound backend.
pub fn solve_default(instance: &Instance, config: &SolveConfig) -> Result<SolveOutcome> {
    solve(instance, config, &BranchBoundBackend)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    use super::*;
    use crate::model::{
        expr::{Posted, VarId, VarTable},
        symmetry::anchor_circuit,
    };

    fn solve_variant(instance: &Instance, variant: Variant) -> SolveResult {
        solve_default(instance, &SolveConfig::new(variant))
            .unwrap()
            .result
    }

    fn sat_height(result: &SolveResult) -> i64 {
        match result {
            SolveResult::Sat { height, .. } => *height,
            other => panic!("expected Sat, got {other:?}"),
        }
    }

    /// Effective rectangle of circuit `i` in a solved layout.
    fn effective_rect(instance: &Instance, placement: &Placement, i: usize) -> (i64, i64, i64, i64) {
        let (mut w, mut h) = (instance.width_of(i), instance.height_of(i));
        if placement.rotated {
            std::mem::swap(&mut w, &mut h);
        }
        (placement.x, placement.y, w, h)
    }

    fn assert_layout_is_valid(instance: &Instance, height: i64, placements: &[Placement]) {
        for i in 0..placements.len() {
            let (x, y, w, h) = effective_rect(instance, &placements[i], i);
            assert!(x >= 0 && y >= 0, "circuit {i} has a negative corner");
            assert!(
                x + w <= instance.plate_width(),
                "circuit {i} sticks out of the plate"
            );
            assert!(y + h <= height, "circuit {i} sticks out of the strip");
            for j in (i + 1)..placements.len() {
                let (xj, yj, wj, hj) = effective_rect(instance, &placements[j], j);
                let disjoint = x + w <= xj || xj + wj <= x || y + h <= yj || yj + hj <= y;
                assert!(disjoint, "circuits {i} and {j} overlap");
            }
        }
    }

    #[test]
    fn two_squares_pack_side_by_side() {
        // Scenario: width 8, two 2x2 circuits; optimal height 2.
        let instance = Instance::new(8, vec![2, 2], vec![2, 2]).unwrap();
        let result = solve_variant(&instance, Variant::Fixed);
        let SolveResult::Sat { height, placements } = &result else {
            panic!("expected Sat");
        };
        assert_eq!(*height, 2);
        assert_layout_is_valid(&instance, *height, placements);
    }

    #[test]
    fn rotation_improves_the_optimum_when_it_helps() {
        // Width 4, circuits 3x1 and 1x3: fixed must stack to height 3,
        // rotating the second circuit packs both rows into height 2.
        let instance = Instance::new(4, vec![3, 1], vec![1, 3]).unwrap();
        let fixed = sat_height(&solve_variant(&instance, Variant::Fixed));
        let rotatable = sat_height(&solve_variant(&instance, Variant::Rotatable));
        assert_eq!(fixed, 3);
        assert_eq!(rotatable, 2);
        assert!(fixed >= rotatable, "rotation must never worsen the optimum");
    }

    #[test]
    fn oversized_circuit_is_infeasible_in_both_variants() {
        let instance = Instance::new(1, vec![2], vec![2]).unwrap();
        assert_eq!(solve_variant(&instance, Variant::Fixed), SolveResult::Unsat);
        assert_eq!(
            solve_variant(&instance, Variant::Rotatable),
            SolveResult::Unsat
        );
    }

    #[test]
    fn tight_deadline_times_out_instead_of_reporting_unsat() {
        // Feasible 50-circuit instance that cannot be concluded in 10 ms.
        let n = 50;
        let widths: Vec<i64> = (0..n).map(|i| (i % 9) + 1).collect();
        let heights: Vec<i64> = (0..n).map(|i| (i % 7) + 1).collect();
        let instance = Instance::new(30, widths, heights).unwrap();
        let config =
            SolveConfig::new(Variant::Fixed).with_deadline(Duration::from_millis(10));
        let outcome = solve_default(&instance, &config).unwrap();
        assert_eq!(outcome.result, SolveResult::TimedOut);
    }

    #[test]
    fn square_circuits_never_report_rotation() {
        let instance = Instance::new(6, vec![2, 3], vec![2, 2]).unwrap();
        let result = solve_variant(&instance, Variant::Rotatable);
        let SolveResult::Sat { placements, .. } = &result else {
            panic!("expected Sat");
        };
        assert!(!placements[0].rotated, "square circuit must not rotate");
    }

    #[test]
    fn largest_circuit_is_anchored_at_the_origin() {
        let instance = Instance::new(6, vec![1, 3, 2], vec![2, 3, 1]).unwrap();
        let anchor = anchor_circuit(&instance);
        for variant in [Variant::Fixed, Variant::Rotatable] {
            let result = solve_variant(&instance, variant);
            let SolveResult::Sat { placements, .. } = &result else {
                panic!("expected Sat");
            };
            assert_eq!((placements[anchor].x, placements[anchor].y), (0, 0));
        }
    }

    /// A backend that answers Sat but leaves every boolean variable unbound,
    /// the way an external solver may treat structurally forced flags.
    struct UnboundFlagBackend;

    struct UnboundFlagSession {
        stats: SearchStats,
    }

    impl SolverBackend for UnboundFlagBackend {
        type Session = UnboundFlagSession;

        fn open_session(&self, _vars: &VarTable) -> Result<Self::Session> {
            Ok(UnboundFlagSession {
                stats: SearchStats::default(),
            })
        }
    }

    impl SolverSession for UnboundFlagSession {
        fn assert(&mut self, _constraint: Posted) -> Result<()> {
            Ok(())
        }

        fn minimize(&mut self, _objective: VarId) {}

        fn check_with_deadline(&mut self, _budget: Duration) -> Result<CheckOutcome> {
            Ok(CheckOutcome::Sat)
        }

        fn value_int(&self, var: VarId) -> Option<i64> {
            Some(if var == 0 { 3 } else { 0 })
        }

        fn value_bool(&self, _var: VarId) -> Option<bool> {
            None
        }

        fn stats(&self) -> &SearchStats {
            &self.stats
        }
    }

    #[test]
    fn unbound_rotation_flags_read_as_unrotated() {
        let instance = Instance::new(4, vec![1], vec![3]).unwrap();
        let outcome = solve(
            &instance,
            &SolveConfig::new(Variant::Rotatable),
            &UnboundFlagBackend,
        )
        .unwrap();
        let SolveResult::Sat { placements, .. } = &outcome.result else {
            panic!("expected Sat");
        };
        assert!(!placements[0].rotated);
    }

    fn arbitrary_instance() -> impl Strategy<Value = Instance> {
        (2i64..=6, prop::collection::vec((1i64..=4, 1i64..=4), 1..=3)).prop_map(
            |(plate_width, dims)| {
                let (widths, heights): (Vec<i64>, Vec<i64>) = dims.into_iter().unzip();
                Instance::new(plate_width, widths, heights).unwrap()
            },
        )
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn solved_layouts_are_disjoint_and_in_bounds(
            instance in arbitrary_instance(),
            rotatable in any::<bool>(),
        ) {
            let variant = if rotatable { Variant::Rotatable } else { Variant::Fixed };
            let outcome = solve_default(&instance, &SolveConfig::new(variant)).unwrap();
            if let SolveResult::Sat { height, placements } = outcome.result {
                assert_layout_is_valid(&instance, height, &placements);
            }
        }

        #[test]
        fn fixed_optimum_is_never_below_rotatable(instance in arbitrary_instance()) {
            let fixed = solve_variant(&instance, Variant::Fixed);
            let rotatable = solve_variant(&instance, Variant::Rotatable);
            if let (SolveResult::Sat { height: fh, .. }, SolveResult::Sat { height: rh, .. }) =
                (&fixed, &rotatable)
            {
                prop_assert!(fh >= rh);
            }
        }
    }
}
