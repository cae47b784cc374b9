//! Discretized parameter grids with adaptive step selection.

use serde::{Deserialize, Serialize};

use crate::strategy::{FamilySpace, ParamRange};

use super::rng::XorShift64;

/// Axis span above which the coarser step is used.
const WIDE_SPAN: i64 = 20;

/// Grid step for an axis span.
///
/// Wide ranges get a coarser step so the worst-case combination count stays
/// bounded.
#[must_use]
pub const fn adaptive_step(span: i64) -> i64 {
    if span > WIDE_SPAN { 4 } else { 2 }
}

/// One discretized parameter axis: `min, min+step, …` up to `max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridAxis {
    /// Lowest grid value.
    pub min: i64,
    /// Inclusive upper bound; the last grid value may fall below it.
    pub max: i64,
    /// Distance between consecutive grid values.
    pub step: i64,
}

impl GridAxis {
    /// Discretize a search range with the adaptive step.
    #[must_use]
    pub const fn from_range(range: &ParamRange) -> Self {
        Self {
            min: range.min,
            max: range.max,
            step: adaptive_step(range.span()),
        }
    }

    /// Number of grid values on this axis; zero for an inverted range.
    #[must_use]
    #[allow(clippy::cast_sign_loss)]
    pub const fn value_count(&self) -> u64 {
        if self.max < self.min {
            0
        } else {
            ((self.max - self.min) / self.step) as u64 + 1
        }
    }

    /// The grid value at `index`.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub const fn value_at(&self, index: u64) -> i64 {
        self.min + self.step * index as i64
    }
}

/// The full discretized search space for one strategy family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchGrid {
    axes: Vec<GridAxis>,
}

impl SearchGrid {
    /// Discretize every axis of a family search space.
    #[must_use]
    pub fn for_space(space: &FamilySpace) -> Self {
        Self {
            axes: space.axes.iter().map(GridAxis::from_range).collect(),
        }
    }

    /// The discretized axes, in family declaration order.
    #[must_use]
    pub fn axes(&self) -> &[GridAxis] {
        &self.axes
    }

    /// Total number of value tuples, saturating on overflow.
    ///
    /// Zero when any axis has an inverted range.
    #[must_use]
    pub fn combinations(&self) -> u64 {
        self.axes
            .iter()
            .map(GridAxis::value_count)
            .fold(1, u64::saturating_mul)
    }

    /// Lazily enumerate every value tuple in odometer order (last axis
    /// varies fastest).
    #[must_use]
    pub fn candidates(&self) -> CandidateIter<'_> {
        CandidateIter {
            axes: &self.axes,
            cursor: vec![0; self.axes.len()],
            exhausted: self.combinations() == 0,
        }
    }

    /// Draw one uniformly random value tuple from the grid.
    ///
    /// # Panics
    ///
    /// Panics when the grid has an empty axis; check [`Self::combinations`]
    /// first.
    #[must_use]
    pub fn sample(&self, rng: &mut XorShift64) -> Vec<i64> {
        self.axes
            .iter()
            .map(|axis| axis.value_at(rng.next_index(axis.value_count())))
            .collect()
    }
}

/// Lazy odometer iterator over grid value tuples.
#[derive(Debug)]
pub struct CandidateIter<'a> {
    axes: &'a [GridAxis],
    cursor: Vec<u64>,
    exhausted: bool,
}

impl Iterator for CandidateIter<'_> {
    type Item = Vec<i64>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }

        let values = self
            .axes
            .iter()
            .zip(&self.cursor)
            .map(|(axis, &index)| axis.value_at(index))
            .collect();

        // Advance the rightmost axis, carrying leftward on wrap.
        self.exhausted = true;
        for pos in (0..self.cursor.len()).rev() {
            self.cursor[pos] += 1;
            if self.cursor[pos] < self.axes[pos].value_count() {
                self.exhausted = false;
                break;
            }
            self.cursor[pos] = 0;
        }

        Some(values)
    }
}
