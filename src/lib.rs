//! Stripack is an exact rectangle strip-packing solver for a VLSI
//! floorplanning workload: given a fixed plate width and a set of rectangular
//! circuits, it finds non-overlapping placements minimizing the plate height
//! needed to contain them, within a bounded solving time.
//!
//! The crate is split into a declarative modelling layer and a solving layer:
//!
//! - **[`instance::Instance`]**: the validated problem description, and
//!   [`instance::Variant`] selecting whether circuits may rotate by 90
//!   degrees.
//! - **[`model::builder::PackingModel`]**: turns an instance into a symbolic
//!   constraint set (domain bounds, pairwise non-overlap, orientation
//!   choices, redundant cumulative bounds) plus the minimize-height
//!   objective variable. [`model::symmetry::break_symmetry`] then pins the
//!   largest circuit to the origin.
//! - **[`solver::backend::SolverBackend`]**: the capability any SMT/CP engine
//!   can implement to run the model; [`solver::engine::BranchBoundBackend`]
//!   is the embedded implementation.
//! - **[`solver::driver::solve`]**: orchestrates one deadline-bounded solve
//!   call and classifies the outcome as Sat, Unsat, or TimedOut;
//!   [`solver::decode::decode`] turns a Sat outcome into a serializable
//!   layout.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//!
//! use stripack::instance::{Instance, Variant};
//! use stripack::solver::driver::{solve_default, SolveConfig, SolveResult};
//!
//! // An 8-wide plate with two 2x2 circuits packs at height 2.
//! let instance = Instance::new(8, vec![2, 2], vec![2, 2]).unwrap();
//! let config = SolveConfig::new(Variant::Fixed).with_deadline(Duration::from_secs(5));
//! let outcome = solve_default(&instance, &config).unwrap();
//!
//! match outcome.result {
//!     SolveResult::Sat { height, .. } => assert_eq!(height, 2),
//!     other => panic!("unexpected outcome {other:?}"),
//! }
//! ```
pub mod error;
pub mod instance;
pub mod io;
pub mod model;
pub mod solver;
