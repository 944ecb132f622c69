pub mod builder;
pub mod expr;
pub mod symmetry;
