//! The in-memory representation of a strip-packing problem.
//!
//! An [`Instance`] is a fixed-width plate and a set of rectangular circuits,
//! each with an integer width and height. It is an immutable value: all
//! validation happens in [`Instance::new`], and a constructed instance can be
//! handed to the constraint builder without further checks.

use std::str::FromStr;

use serde::Serialize;

use crate::error::{PackError, Result};

/// Whether circuit orientation is a free decision for the solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Variant {
    /// Every circuit keeps the orientation given in the instance.
    Fixed,
    /// Every circuit may be rotated by 90 degrees.
    Rotatable,
}

impl FromStr for Variant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fixed" => Ok(Variant::Fixed),
            "rotatable" => Ok(Variant::Rotatable),
            other => Err(format!(
                "unknown variant '{other}', expected 'fixed' or 'rotatable'"
            )),
        }
    }
}

impl std::fmt::Display for Variant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Variant::Fixed => write!(f, "fixed"),
            Variant::Rotatable => write!(f, "rotatable"),
        }
    }
}

/// A validated strip-packing instance.
///
/// The two dimension vectors are index-aligned: circuit `i` is
/// `widths[i] x heights[i]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Instance {
    plate_width: i64,
    widths: Vec<i64>,
    heights: Vec<i64>,
}

impl Instance {
    /// Builds an instance, rejecting malformed input at the boundary.
    ///
    /// Fails with a validation error when the plate width is not positive,
    /// when there are no circuits, when the dimension vectors disagree in
    /// length, or when any dimension is not positive.
    pub fn new(plate_width: i64, widths: Vec<i64>, heights: Vec<i64>) -> Result<Self> {
        if plate_width <= 0 {
            return Err(
                PackError::Validation(format!("plate width must be positive, got {plate_width}"))
                    .into(),
            );
        }
        if widths.is_empty() {
            return Err(PackError::Validation("instance has no circuits".to_string()).into());
        }
        if widths.len() != heights.len() {
            return Err(PackError::Validation(format!(
                "dimension vectors disagree: {} widths vs {} heights",
                widths.len(),
                heights.len()
            ))
            .into());
        }
        for (i, (&w, &h)) in widths.iter().zip(heights.iter()).enumerate() {
            if w <= 0 || h <= 0 {
                return Err(PackError::Validation(format!(
                    "circuit {i} has non-positive dimensions {w}x{h}"
                ))
                .into());
            }
        }
        Ok(Self {
            plate_width,
            widths,
            heights,
        })
    }

    pub fn plate_width(&self) -> i64 {
        self.plate_width
    }

    pub fn circuit_count(&self) -> usize {
        self.widths.len()
    }

    pub fn width_of(&self, i: usize) -> i64 {
        self.widths[i]
    }

    pub fn height_of(&self, i: usize) -> i64 {
        self.heights[i]
    }

    /// Raw area of circuit `i`, independent of orientation.
    pub fn area_of(&self, i: usize) -> i64 {
        self.widths[i] * self.heights[i]
    }

    pub fn is_square(&self, i: usize) -> bool {
        self.widths[i] == self.heights[i]
    }

    /// Sum of the raw circuit heights: the height of the stacked layout, a
    /// valid upper bound on the optimum when no circuit rotates.
    pub fn total_height(&self) -> i64 {
        self.heights.iter().sum()
    }

    /// Sum over circuits of the larger dimension: a height upper bound that
    /// stays valid under any combination of rotations.
    pub fn max_side_sum(&self) -> i64 {
        self.widths
            .iter()
            .zip(self.heights.iter())
            .map(|(&w, &h)| w.max(h))
            .sum()
    }

    pub fn total_area(&self) -> i64 {
        (0..self.circuit_count()).map(|i| self.area_of(i)).sum()
    }
}
