//! Symbolic integer and boolean expressions over decision variables.
//!
//! The constraint builder emits these expressions declaratively; they carry no
//! solving behaviour of their own. Any backend that understands linear
//! arithmetic over integers, boolean connectives, and if-then-else can
//! interpret them.

pub type VarId = u32;

/// The declared domain of a decision variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dom {
    /// An integer in the inclusive range `lo..=hi`. An inverted range is an
    /// empty domain, which a backend treats as trivially unsatisfiable.
    Int { lo: i64, hi: i64 },
    Bool,
}

#[derive(Debug, Clone)]
pub struct VarInfo {
    pub name: String,
    pub dom: Dom,
}

/// Declaration-ordered table of decision variables.
///
/// The declaration order is meaningful: backends that branch in a static
/// order follow it, so the builder declares the objective variable first.
#[derive(Debug, Clone, Default)]
pub struct VarTable {
    vars: Vec<VarInfo>,
}

impl VarTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn int(&mut self, name: impl Into<String>, lo: i64, hi: i64) -> VarId {
        self.vars.push(VarInfo {
            name: name.into(),
            dom: Dom::Int { lo, hi },
        });
        (self.vars.len() - 1) as VarId
    }

    pub fn bool(&mut self, name: impl Into<String>) -> VarId {
        self.vars.push(VarInfo {
            name: name.into(),
            dom: Dom::Bool,
        });
        (self.vars.len() - 1) as VarId
    }

    pub fn info(&self, var: VarId) -> &VarInfo {
        &self.vars[var as usize]
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (VarId, &VarInfo)> {
        self.vars
            .iter()
            .enumerate()
            .map(|(i, info)| (i as VarId, info))
    }
}

/// A concrete value assigned to a decision variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Value {
    Int(i64),
    Bool(bool),
}

impl Value {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            Value::Bool(_) => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            Value::Int(_) => None,
        }
    }
}

/// A symbolic integer expression.
#[derive(Debug, Clone, PartialEq)]
pub enum IntExpr {
    Const(i64),
    Var(VarId),
    Sum(Vec<IntExpr>),
    /// `if cond { then } else { otherwise }`.
    Ite(Box<BoolExpr>, Box<IntExpr>, Box<IntExpr>),
}

impl IntExpr {
    pub fn add(self, other: IntExpr) -> Self {
        IntExpr::Sum(vec![self, other])
    }

    pub fn ite(cond: BoolExpr, then: IntExpr, otherwise: IntExpr) -> Self {
        IntExpr::Ite(Box::new(cond), Box::new(then), Box::new(otherwise))
    }
}

/// A symbolic boolean expression: the unit the builder asserts.
#[derive(Debug, Clone, PartialEq)]
pub enum BoolExpr {
    Const(bool),
    Var(VarId),
    Not(Box<BoolExpr>),
    And(Vec<BoolExpr>),
    Or(Vec<BoolExpr>),
    Le(IntExpr, IntExpr),
    Eq(IntExpr, IntExpr),
}

impl BoolExpr {
    pub fn not(self) -> Self {
        BoolExpr::Not(Box::new(self))
    }

    pub fn le(lhs: IntExpr, rhs: IntExpr) -> Self {
        BoolExpr::Le(lhs, rhs)
    }

    pub fn ge(lhs: IntExpr, rhs: IntExpr) -> Self {
        BoolExpr::Le(rhs, lhs)
    }

    /// Strict `lhs < rhs`, encoded as `lhs + 1 <= rhs` over integers.
    pub fn lt(lhs: IntExpr, rhs: IntExpr) -> Self {
        BoolExpr::Le(lhs.add(IntExpr::Const(1)), rhs)
    }

    pub fn eq(lhs: IntExpr, rhs: IntExpr) -> Self {
        BoolExpr::Eq(lhs, rhs)
    }
}

/// A human-readable label for one asserted constraint, consumed by
/// diagnostics and the statistics table.
#[derive(Debug, Clone)]
pub struct ConstraintDescriptor {
    pub name: String,
    pub description: String,
}

/// A constraint ready to be asserted into a backend session: the expression
/// plus a human-readable descriptor for diagnostics and statistics.
#[derive(Debug, Clone)]
pub struct Posted {
    pub expr: BoolExpr,
    pub descriptor: ConstraintDescriptor,
}

impl Posted {
    pub fn new(expr: BoolExpr, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            expr,
            descriptor: ConstraintDescriptor {
                name: name.into(),
                description: description.into(),
            },
        }
    }
}

/// Symbolic maximum of a non-empty vector, as an if-then-else chain.
///
/// # Panics
///
/// Panics on an empty vector; callers always have at least one circuit.
pub fn max_of(mut exprs: Vec<IntExpr>) -> IntExpr {
    let mut maximum = exprs.remove(0);
    for expr in exprs {
        maximum = IntExpr::ite(
            BoolExpr::lt(maximum.clone(), expr.clone()),
            expr,
            maximum,
        );
    }
    maximum
}

/// Cumulative resource constraints, one per swept coordinate.
///
/// For every position `u` in `0..sweep_end`, the summed `uses` of all items
/// whose interval `[start, start + extent)` covers `u` must stay within
/// `capacity`. Redundant with pairwise non-overlap, but a strong pruner.
pub fn cumulative(
    starts: &[IntExpr],
    extents: &[IntExpr],
    uses: &[IntExpr],
    capacity: IntExpr,
    sweep_end: i64,
) -> Vec<BoolExpr> {
    let mut constraints = Vec::with_capacity(sweep_end.max(0) as usize);
    for u in 0..sweep_end {
        let terms = starts
            .iter()
            .zip(extents.iter())
            .zip(uses.iter())
            .map(|((start, extent), used)| {
                let covers = BoolExpr::And(vec![
                    BoolExpr::le(start.clone(), IntExpr::Const(u)),
                    BoolExpr::lt(IntExpr::Const(u), start.clone().add(extent.clone())),
                ]);
                IntExpr::ite(covers, used.clone(), IntExpr::Const(0))
            })
            .collect();
        constraints.push(BoolExpr::le(IntExpr::Sum(terms), capacity.clone()));
    }
    constraints
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn var_table_assigns_ids_in_declaration_order() {
        let mut vars = VarTable::new();
        let a = vars.int("a", 0, 5);
        let b = vars.bool("b");
        assert_eq!(a, 0);
        assert_eq!(b, 1);
        assert_eq!(vars.info(a).dom, Dom::Int { lo: 0, hi: 5 });
        assert_eq!(vars.info(b).dom, Dom::Bool);
        assert_eq!(vars.len(), 2);
    }

    #[test]
    fn max_of_single_expression_is_the_expression() {
        let expr = max_of(vec![IntExpr::Const(7)]);
        assert_eq!(expr, IntExpr::Const(7));
    }

    #[test]
    fn max_of_builds_an_ite_chain() {
        let expr = max_of(vec![IntExpr::Const(1), IntExpr::Const(2)]);
        assert!(matches!(expr, IntExpr::Ite(..)));
    }

    #[test]
    fn cumulative_emits_one_constraint_per_position() {
        let starts = vec![IntExpr::Var(0), IntExpr::Var(1)];
        let extents = vec![IntExpr::Const(2), IntExpr::Const(3)];
        let uses = vec![IntExpr::Const(1), IntExpr::Const(1)];
        let out = cumulative(&starts, &extents, &uses, IntExpr::Const(4), 5);
        assert_eq!(out.len(), 5);
        assert!(out.iter().all(|c| matches!(c, BoolExpr::Le(..))));
    }
}
