//! The embedded branch-and-bound solving backend.
//!
//! A chronological depth-first search over the declared variables, pruned by
//! three-valued interval evaluation of every asserted constraint. The
//! objective is minimized by branch-and-bound: each incumbent model tightens
//! a cap on the objective variable and the search continues until the space
//! is exhausted or the deadline elapses.
//!
//! States are persistent [`im::HashMap`] assignments, so backtracking is a
//! matter of dropping a child state rather than undoing mutations.

use std::time::{Duration, Instant};

use im::HashMap;
use tracing::debug;

use crate::{
    error::{PackError, Result},
    model::expr::{BoolExpr, Dom, IntExpr, Posted, Value, VarId, VarTable},
    solver::{
        backend::{CheckOutcome, SolverBackend, SolverSession},
        stats::SearchStats,
    },
};

type Assignment = HashMap<VarId, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Truth {
    True,
    False,
    Unknown,
}

enum SearchStep {
    Model(Assignment),
    Exhausted,
    DeadlineHit,
}

/// Factory for [`BranchBoundSession`]s. Stateless; every solve call gets an
/// independent session.
#[derive(Debug, Clone, Copy, Default)]
pub struct BranchBoundBackend;

impl SolverBackend for BranchBoundBackend {
    type Session = BranchBoundSession;

    fn open_session(&self, vars: &VarTable) -> Result<Self::Session> {
        Ok(BranchBoundSession {
            vars: vars.clone(),
            constraints: Vec::new(),
            objective: None,
            model: None,
            stats: SearchStats::default(),
        })
    }
}

pub struct BranchBoundSession {
    vars: VarTable,
    constraints: Vec<Posted>,
    objective: Option<VarId>,
    model: Option<Assignment>,
    stats: SearchStats,
}

impl SolverSession for BranchBoundSession {
    fn assert(&mut self, constraint: Posted) -> Result<()> {
        self.constraints.push(constraint);
        Ok(())
    }

    fn minimize(&mut self, objective: VarId) {
        self.objective = Some(objective);
    }

    fn check_with_deadline(&mut self, budget: Duration) -> Result<CheckOutcome> {
        let deadline = Instant::now() + budget;
        self.model = None;
        let mut incumbent: Option<Assignment> = None;
        let mut bound: Option<i64> = None;

        let outcome = loop {
            match self.search(deadline, 0, Assignment::new(), bound)? {
                SearchStep::Model(model) => {
                    self.stats.models_found += 1;
                    let Some(objective) = self.objective else {
                        incumbent = Some(model);
                        break CheckOutcome::Sat;
                    };
                    let value = model
                        .get(&objective)
                        .and_then(Value::as_int)
                        .ok_or_else(|| {
                            PackError::Backend(
                                "objective is not an assigned integer variable".to_string(),
                            )
                        })?;
                    debug!(objective = value, "incumbent model found");
                    incumbent = Some(model);
                    bound = Some(value - 1);
                }
                SearchStep::Exhausted => {
                    break if incumbent.is_some() {
                        CheckOutcome::Sat
                    } else {
                        CheckOutcome::Unsat
                    };
                }
                SearchStep::DeadlineHit => {
                    break if incumbent.is_some() {
                        // Best-effort: the deadline cut optimization short,
                        // but a model exists.
                        CheckOutcome::Sat
                    } else {
                        CheckOutcome::Unknown
                    };
                }
            }
        };

        self.model = incumbent;
        Ok(outcome)
    }

    fn value_int(&self, var: VarId) -> Option<i64> {
        self.model.as_ref()?.get(&var)?.as_int()
    }

    fn value_bool(&self, var: VarId) -> Option<bool> {
        self.model.as_ref()?.get(&var)?.as_bool()
    }

    fn stats(&self) -> &SearchStats {
        &self.stats
    }
}

impl BranchBoundSession {
    fn search(
        &mut self,
        deadline: Instant,
        next: usize,
        assignment: Assignment,
        bound: Option<i64>,
    ) -> Result<SearchStep> {
        self.stats.nodes_visited += 1;
        if Instant::now() >= deadline {
            return Ok(SearchStep::DeadlineHit);
        }

        // Branch-and-bound cap on the objective.
        if let (Some(objective), Some(cap)) = (self.objective, bound) {
            let (lo, _) = int_bounds(&IntExpr::Var(objective), &self.vars, &assignment);
            if lo > cap {
                return Ok(SearchStep::Exhausted);
            }
        }

        for id in 0..self.constraints.len() {
            let started = Instant::now();
            let verdict = truth(&self.constraints[id].expr, &self.vars, &assignment);
            let now = Instant::now();
            let entry = self.stats.constraint_stats.entry(id).or_default();
            entry.revisions += 1;
            entry.time_spent_micros += now.duration_since(started).as_micros() as u64;
            if verdict == Truth::False {
                entry.rejections += 1;
                return Ok(SearchStep::Exhausted);
            }
            // Large models can spend the whole budget inside one node.
            if now >= deadline {
                return Ok(SearchStep::DeadlineHit);
            }
        }

        if next >= self.vars.len() {
            // Complete assignment with every constraint definitely true.
            return Ok(SearchStep::Model(assignment));
        }

        let var = next as VarId;
        let dom = self.vars.info(var).dom;
        match dom {
            Dom::Int { lo, hi } => {
                let hi = if Some(var) == self.objective {
                    bound.map_or(hi, |cap| hi.min(cap))
                } else {
                    hi
                };
                for value in lo..=hi {
                    let child = assignment.update(var, Value::Int(value));
                    match self.search(deadline, next + 1, child, bound)? {
                        SearchStep::Exhausted => self.stats.backtracks += 1,
                        step => return Ok(step),
                    }
                }
            }
            Dom::Bool => {
                for value in [false, true] {
                    let child = assignment.update(var, Value::Bool(value));
                    match self.search(deadline, next + 1, child, bound)? {
                        SearchStep::Exhausted => self.stats.backtracks += 1,
                        step => return Ok(step),
                    }
                }
            }
        }

        Ok(SearchStep::Exhausted)
    }
}

/// Inclusive bounds of an integer expression under a partial assignment.
/// Unassigned variables contribute their declared domain.
fn int_bounds(expr: &IntExpr, vars: &VarTable, assignment: &Assignment) -> (i64, i64) {
    match expr {
        IntExpr::Const(c) => (*c, *c),
        IntExpr::Var(v) => match assignment.get(v).and_then(Value::as_int) {
            Some(value) => (value, value),
            None => match vars.info(*v).dom {
                Dom::Int { lo, hi } => (lo, hi),
                Dom::Bool => (0, 1),
            },
        },
        IntExpr::Sum(terms) => terms.iter().fold((0, 0), |(lo, hi), term| {
            let (term_lo, term_hi) = int_bounds(term, vars, assignment);
            (lo + term_lo, hi + term_hi)
        }),
        IntExpr::Ite(cond, then, otherwise) => match truth(cond, vars, assignment) {
            Truth::True => int_bounds(then, vars, assignment),
            Truth::False => int_bounds(otherwise, vars, assignment),
            Truth::Unknown => {
                let (then_lo, then_hi) = int_bounds(then, vars, assignment);
                let (else_lo, else_hi) = int_bounds(otherwise, vars, assignment);
                (then_lo.min(else_lo), then_hi.max(else_hi))
            }
        },
    }
}

/// Three-valued truth of a boolean expression under a partial assignment.
fn truth(expr: &BoolExpr, vars: &VarTable, assignment: &Assignment) -> Truth {
    match expr {
        BoolExpr::Const(true) => Truth::True,
        BoolExpr::Const(false) => Truth::False,
        BoolExpr::Var(v) => match assignment.get(v).and_then(Value::as_bool) {
            Some(true) => Truth::True,
            Some(false) => Truth::False,
            None => Truth::Unknown,
        },
        BoolExpr::Not(inner) => match truth(inner, vars, assignment) {
            Truth::True => Truth::False,
            Truth::False => Truth::True,
            Truth::Unknown => Truth::Unknown,
        },
        BoolExpr::And(parts) => {
            let mut all_true = true;
            for part in parts {
                match truth(part, vars, assignment) {
                    Truth::False => return Truth::False,
                    Truth::Unknown => all_true = false,
                    Truth::True => {}
                }
            }
            if all_true {
                Truth::True
            } else {
                Truth::Unknown
            }
        }
        BoolExpr::Or(parts) => {
            let mut all_false = true;
            for part in parts {
                match truth(part, vars, assignment) {
                    Truth::True => return Truth::True,
                    Truth::Unknown => all_false = false,
                    Truth::False => {}
                }
            }
            if all_false {
                Truth::False
            } else {
                Truth::Unknown
            }
        }
        BoolExpr::Le(lhs, rhs) => {
            let (lhs_lo, lhs_hi) = int_bounds(lhs, vars, assignment);
            let (rhs_lo, rhs_hi) = int_bounds(rhs, vars, assignment);
            if lhs_hi <= rhs_lo {
                Truth::True
            } else if lhs_lo > rhs_hi {
                Truth::False
            } else {
                Truth::Unknown
            }
        }
        BoolExpr::Eq(lhs, rhs) => {
            let (lhs_lo, lhs_hi) = int_bounds(lhs, vars, assignment);
            let (rhs_lo, rhs_hi) = int_bounds(rhs, vars, assignment);
            if lhs_lo == lhs_hi && rhs_lo == rhs_hi && lhs_lo == rhs_lo {
                Truth::True
            } else if lhs_hi < rhs_lo || rhs_hi < lhs_lo {
                Truth::False
            } else {
                Truth::Unknown
            }
        }
    }
}
