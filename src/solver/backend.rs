//! The solving-backend capability consumed by the driver.
//!
//! Any SMT or CP engine that supports incremental assertion of
//! boolean/arithmetic constraints, a minimize directive, and a bounded-time
//! satisfiability check can implement this pair of traits. The crate ships
//! one implementation, the branch-and-bound engine in
//! [`crate::solver::engine`].

use std::time::Duration;

use crate::{
    error::Result,
    model::expr::{Posted, VarId, VarTable},
    solver::stats::SearchStats,
};

/// Verdict of a bounded-time satisfiability check.
///
/// `Unknown` means the deadline elapsed without a conclusion; it is never a
/// proof of infeasibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckOutcome {
    Sat,
    Unsat,
    Unknown,
}

/// A factory for independent solving sessions.
///
/// Each solve call owns exactly one session; sessions share no state, so
/// concurrent solves over distinct sessions are safe.
pub trait SolverBackend {
    type Session: SolverSession;

    fn open_session(&self, vars: &VarTable) -> Result<Self::Session>;
}

/// One scoped solving session. Dropping the session releases every backend
/// resource, on success and failure paths alike.
pub trait SolverSession {
    fn assert(&mut self, constraint: Posted) -> Result<()>;

    /// Registers the objective: minimize the given integer variable.
    fn minimize(&mut self, objective: VarId);

    /// Searches for a model within the wall-clock budget.
    fn check_with_deadline(&mut self, budget: Duration) -> Result<CheckOutcome>;

    /// Concrete value of an integer variable in the found model, if any.
    fn value_int(&self, var: VarId) -> Option<i64>;

    /// Concrete value of a boolean variable in the found model. May be `None`
    /// for variables the backend left unbound (e.g. structurally forced
    /// rotation flags).
    fn value_bool(&self, var: VarId) -> Option<bool>;

    fn stats(&self) -> &SearchStats;
}
