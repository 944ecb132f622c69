//! The geometry constraint builder.
//!
//! Turns an [`Instance`] and a [`Variant`] into a full symbolic constraint
//! set: variable declarations, domain bounds, pairwise non-overlap,
//! orientation choices, redundant cumulative resource bounds, and boundary
//! tightening. Construction never fails on a validated instance.

use crate::{
    instance::{Instance, Variant},
    model::expr::{cumulative, max_of, BoolExpr, IntExpr, Posted, VarId, VarTable},
};

/// A constructed packing model: the constraint set plus the handles the
/// driver needs to extract a solution afterwards.
#[derive(Debug, Clone)]
pub struct PackingModel {
    pub vars: VarTable,
    pub constraints: Vec<Posted>,
    /// The objective variable. Declared first so that backends branching in
    /// declaration order enumerate candidate heights from the bottom up.
    pub height: VarId,
    pub x: Vec<VarId>,
    pub y: Vec<VarId>,
    /// Per-circuit rotation flags; `None` under [`Variant::Fixed`].
    pub rot: Option<Vec<VarId>>,
    /// Effective widths: constants when fixed, variables when rotatable.
    pub eff_w: Vec<IntExpr>,
    /// Effective heights, same representation as `eff_w`.
    pub eff_h: Vec<IntExpr>,
}

impl PackingModel {
    pub fn build(instance: &Instance, variant: Variant) -> Self {
        let n = instance.circuit_count();
        let plate_width = instance.plate_width();
        let height_hi = match variant {
            Variant::Fixed => instance.total_height(),
            Variant::Rotatable => instance.max_side_sum(),
        };
        let height_lo = height_lower_bound(instance, variant);

        let mut vars = VarTable::new();
        let height = vars.int("height", height_lo, height_hi);

        let mut x = Vec::with_capacity(n);
        let mut y = Vec::with_capacity(n);
        let mut rot_vars = Vec::new();
        let mut eff_w = Vec::with_capacity(n);
        let mut eff_h = Vec::with_capacity(n);

        for i in 0..n {
            let (w, h) = (instance.width_of(i), instance.height_of(i));
            match variant {
                Variant::Fixed => {
                    eff_w.push(IntExpr::Const(w));
                    eff_h.push(IntExpr::Const(h));
                }
                Variant::Rotatable => {
                    // Orientation is decided before the coordinates so that a
                    // branching backend pins the dimensions early.
                    let r = vars.bool(format!("rot[{i}]"));
                    let ew = vars.int(format!("eff_w[{i}]"), w.min(h), w.max(h));
                    let eh = vars.int(format!("eff_h[{i}]"), w.min(h), w.max(h));
                    rot_vars.push(r);
                    eff_w.push(IntExpr::Var(ew));
                    eff_h.push(IntExpr::Var(eh));
                }
            }
            x.push(vars.int(format!("x[{i}]"), 0, plate_width));
            y.push(vars.int(format!("y[{i}]"), 0, height_hi));
        }

        let mut constraints = Vec::new();

        // Orientation: squares are pinned unrotated; everything else must
        // take exactly one of the raw/swapped outcomes, tied to its flag.
        if variant == Variant::Rotatable {
            for i in 0..n {
                let (w, h) = (instance.width_of(i), instance.height_of(i));
                let r = rot_vars[i];
                let raw = BoolExpr::And(vec![
                    BoolExpr::Var(r).not(),
                    BoolExpr::eq(eff_w[i].clone(), IntExpr::Const(w)),
                    BoolExpr::eq(eff_h[i].clone(), IntExpr::Const(h)),
                ]);
                let expr = if instance.is_square(i) {
                    raw
                } else {
                    let swapped = BoolExpr::And(vec![
                        BoolExpr::Var(r),
                        BoolExpr::eq(eff_w[i].clone(), IntExpr::Const(h)),
                        BoolExpr::eq(eff_h[i].clone(), IntExpr::Const(w)),
                    ]);
                    BoolExpr::Or(vec![raw, swapped])
                };
                constraints.push(Posted::new(
                    expr,
                    "orientation",
                    format!("circuit {i} is {w}x{h} or {h}x{w}, tracked by ?rot[{i}]"),
                ));
            }
        }

        // Domain bounds. The y-axis bound against the objective variable is a
        // hard constraint, not something implied by minimization.
        for i in 0..n {
            constraints.push(Posted::new(
                BoolExpr::And(vec![
                    BoolExpr::ge(IntExpr::Var(x[i]), IntExpr::Const(0)),
                    BoolExpr::le(
                        IntExpr::Var(x[i]).add(eff_w[i].clone()),
                        IntExpr::Const(plate_width),
                    ),
                ]),
                "domain-x",
                format!("0 <= ?x[{i}] and ?x[{i}] + w_{i} <= {plate_width}"),
            ));
            constraints.push(Posted::new(
                BoolExpr::And(vec![
                    BoolExpr::ge(IntExpr::Var(y[i]), IntExpr::Const(0)),
                    BoolExpr::le(
                        IntExpr::Var(y[i]).add(eff_h[i].clone()),
                        IntExpr::Var(height),
                    ),
                ]),
                "domain-y",
                format!("0 <= ?y[{i}] and ?y[{i}] + h_{i} <= ?height"),
            ));
        }

        // Pairwise non-overlap: the single place overlap is forbidden, so the
        // disjunction is exhaustive and uses effective dimensions throughout.
        for i in 0..n {
            for j in (i + 1)..n {
                let expr = BoolExpr::Or(vec![
                    BoolExpr::le(
                        IntExpr::Var(x[i]).add(eff_w[i].clone()),
                        IntExpr::Var(x[j]),
                    ),
                    BoolExpr::le(
                        IntExpr::Var(x[j]).add(eff_w[j].clone()),
                        IntExpr::Var(x[i]),
                    ),
                    BoolExpr::le(
                        IntExpr::Var(y[i]).add(eff_h[i].clone()),
                        IntExpr::Var(y[j]),
                    ),
                    BoolExpr::le(
                        IntExpr::Var(y[j]).add(eff_h[j].clone()),
                        IntExpr::Var(y[i]),
                    ),
                ]);
                constraints.push(Posted::new(
                    expr,
                    "no-overlap",
                    format!("circuits {i} and {j} are separated on some axis"),
                ));
            }
        }

        // Redundant cumulative bounds, one sweep per axis, generated from the
        // same effective-dimension expressions as the pairwise constraints.
        let xs: Vec<IntExpr> = x.iter().map(|&v| IntExpr::Var(v)).collect();
        let ys: Vec<IntExpr> = y.iter().map(|&v| IntExpr::Var(v)).collect();
        let sum_eff_h = IntExpr::Sum(eff_h.clone());
        for (u, expr) in cumulative(&ys, &eff_h, &eff_w, IntExpr::Const(plate_width), height_hi)
            .into_iter()
            .enumerate()
        {
            constraints.push(Posted::new(
                expr,
                "cumulative-y",
                format!("widths of circuits spanning y={u} fit in the plate width"),
            ));
        }
        for (u, expr) in cumulative(&xs, &eff_w, &eff_h, sum_eff_h.clone(), plate_width)
            .into_iter()
            .enumerate()
        {
            constraints.push(Posted::new(
                expr,
                "cumulative-x",
                format!("heights of circuits spanning x={u} fit in the height bound"),
            ));
        }

        // Boundary tightening: redundant but solver-useful envelope bounds.
        let right_edges: Vec<IntExpr> = (0..n)
            .map(|i| IntExpr::Var(x[i]).add(eff_w[i].clone()))
            .collect();
        let top_edges: Vec<IntExpr> = (0..n)
            .map(|i| IntExpr::Var(y[i]).add(eff_h[i].clone()))
            .collect();
        constraints.push(Posted::new(
            BoolExpr::le(max_of(right_edges), IntExpr::Const(plate_width)),
            "boundary-width",
            "max right edge within the plate width".to_string(),
        ));
        constraints.push(Posted::new(
            BoolExpr::le(max_of(top_edges), sum_eff_h),
            "boundary-height",
            "max top edge within the stacked-height bound".to_string(),
        ));

        PackingModel {
            vars,
            constraints,
            height,
            x,
            y,
            rot: match variant {
                Variant::Fixed => None,
                Variant::Rotatable => Some(rot_vars),
            },
            eff_w,
            eff_h,
        }
    }
}

/// A valid lower bound on the optimal height: the area bound combined with
/// the tallest extent any single circuit is forced to occupy.
fn height_lower_bound(instance: &Instance, variant: Variant) -> i64 {
    let plate_width = instance.plate_width();
    let area_lb = (instance.total_area() + plate_width - 1) / plate_width;
    let extent_lb = (0..instance.circuit_count())
        .map(|i| {
            let (w, h) = (instance.width_of(i), instance.height_of(i));
            match variant {
                Variant::Fixed => h,
                Variant::Rotatable => {
                    let mut feasible = Vec::new();
                    if w <= plate_width {
                        feasible.push(h);
                    }
                    if h <= plate_width {
                        feasible.push(w);
                    }
                    // Neither orientation fits across: the instance is
                    // unsatisfiable and the bound is irrelevant.
                    feasible.into_iter().min().unwrap_or_else(|| w.min(h))
                }
            }
        })
        .max()
        .unwrap_or(0);
    area_lb.max(extent_lb)
}
