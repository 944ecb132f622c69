//! Symmetry breaking for the packing model.
//!
//! Any feasible layout can be reflected into one where the largest circuit
//! touches the plate's bottom-left corner, so pinning it there removes a
//! multiplicative factor of equivalent search states without excluding any
//! optimal solution.

use tracing::debug;

use crate::{
    instance::Instance,
    model::{
        builder::PackingModel,
        expr::{BoolExpr, IntExpr, Posted},
    },
};

/// Index of the anchor circuit: strictly maximum raw area, lowest index on
/// ties. Raw dimensions are used on purpose; the anchor may still rotate.
pub fn anchor_circuit(instance: &Instance) -> usize {
    (0..instance.circuit_count())
        .max_by_key(|&i| (instance.area_of(i), std::cmp::Reverse(i)))
        .unwrap_or(0)
}

/// Adds the bottom-left anchoring constraint to an already-built model.
///
/// Must run after the orientation constraints are in place so the constraint
/// set stays well-ordered for incremental backends; the anchor choice itself
/// only reads the instance.
pub fn break_symmetry(instance: &Instance, model: &mut PackingModel) {
    let anchor = anchor_circuit(instance);
    debug!(anchor, area = instance.area_of(anchor), "pinning largest circuit to the origin");
    model.constraints.push(Posted::new(
        BoolExpr::And(vec![
            BoolExpr::eq(IntExpr::Var(model.x[anchor]), IntExpr::Const(0)),
            BoolExpr::eq(IntExpr::Var(model.y[anchor]), IntExpr::Const(0)),
        ]),
        "symmetry-anchor",
        format!("largest circuit {anchor} sits at (0, 0)"),
    ));
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::instance::Variant;

    #[test]
    fn picks_the_strictly_largest_circuit() {
        let instance = Instance::new(10, vec![1, 3, 2], vec![1, 3, 2]).unwrap();
        assert_eq!(anchor_circuit(&instance), 1);
    }

    #[test]
    fn breaks_area_ties_by_lowest_index() {
        let instance = Instance::new(10, vec![2, 3, 1], vec![3, 2, 1]).unwrap();
        assert_eq!(anchor_circuit(&instance), 0);
    }

    #[test]
    fn appends_exactly_one_anchoring_constraint() {
        let instance = Instance::new(8, vec![2, 2], vec![2, 2]).unwrap();
        let mut model = PackingModel::build(&instance, Variant::Fixed);
        let before = model.constraints.len();
        break_symmetry(&instance, &mut model);
        assert_eq!(model.constraints.len(), before + 1);
        assert_eq!(
            model.constraints.last().unwrap().descriptor.name,
            "symmetry-anchor"
        );
    }
}
