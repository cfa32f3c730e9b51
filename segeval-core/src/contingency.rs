//! Contingency aggregation: joint and marginal label histograms.
//!
//! A single pass over two paired label sequences counts how often each label
//! pair `(a, b)` co-occurs, plus how often each label occurs on either side.
//! Positions whose `labels_a` value is the background label `0` are skipped
//! entirely; a `0` in `labels_b` is counted like any other label.
//!
//! Tables are sparse hash maps keyed by `u64`, so label values need not be
//! small or dense. Partial tables built over disjoint index ranges combine
//! with [`ContingencyTable::merge`], which is how the parallel path works.

use std::collections::HashMap;

use rayon::prelude::*;

use crate::error::Result;
use crate::label::{Label, validate_labels};

/// The background label. Positions where `labels_a` holds it are excluded.
pub const BACKGROUND: u64 = 0;

/// Joint and marginal co-occurrence counts for two labelings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContingencyTable {
    joint: HashMap<(u64, u64), u64>,
    marginal_a: HashMap<u64, u64>,
    marginal_b: HashMap<u64, u64>,
    total: u64,
}

/// Sums of squared raw counts, the ingredients of the Rand split/merge ratios.
///
/// Kept in `u128` so the squares are exact for any realistic volume size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SumsOfSquares {
    pub joint: u128,
    pub a: u128,
    pub b: u128,
}

impl ContingencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one position. Does nothing when `a` is background.
    #[inline]
    pub fn record(&mut self, a: u64, b: u64) {
        if a == BACKGROUND {
            return;
        }
        self.total += 1;
        *self.joint.entry((a, b)).or_insert(0) += 1;
        *self.marginal_a.entry(a).or_insert(0) += 1;
        *self.marginal_b.entry(b).or_insert(0) += 1;
    }

    /// Build the table in one sequential pass.
    ///
    /// Both slices must have the same length and every label must convert to
    /// a `u64` key; both are checked before counting starts.
    pub fn from_labels<A: Label, B: Label>(labels_a: &[A], labels_b: &[B]) -> Result<Self> {
        validate_labels(labels_a.len(), labels_a, labels_b)?;
        Ok(Self::count(labels_a, labels_b))
    }

    /// Build the table over disjoint chunks on the rayon pool, then reduce.
    ///
    /// Same checks and same table as [`ContingencyTable::from_labels`]. A
    /// `chunk_len` of zero is treated as one.
    pub fn from_labels_parallel<A: Label, B: Label>(
        labels_a: &[A],
        labels_b: &[B],
        chunk_len: usize,
    ) -> Result<Self> {
        validate_labels(labels_a.len(), labels_a, labels_b)?;
        Ok(Self::count_parallel(labels_a, labels_b, chunk_len))
    }

    /// Sequential counting pass over already validated labels.
    pub(crate) fn count<A: Label, B: Label>(labels_a: &[A], labels_b: &[B]) -> Self {
        let mut table = Self::new();
        for (a, b) in labels_a.iter().zip(labels_b) {
            if let (Some(a), Some(b)) = (a.to_label(), b.to_label()) {
                table.record(a, b);
            }
        }
        table
    }

    /// Chunked counting pass over already validated labels.
    pub(crate) fn count_parallel<A: Label, B: Label>(
        labels_a: &[A],
        labels_b: &[B],
        chunk_len: usize,
    ) -> Self {
        let chunk_len = chunk_len.max(1);
        labels_a
            .par_chunks(chunk_len)
            .zip(labels_b.par_chunks(chunk_len))
            .map(|(chunk_a, chunk_b)| Self::count(chunk_a, chunk_b))
            .reduce(Self::new, Self::merge)
    }

    /// Combine two partial tables by per-key summation.
    pub fn merge(mut self, mut other: Self) -> Self {
        // Fold the smaller table into the larger one.
        if self.joint.len() < other.joint.len() {
            std::mem::swap(&mut self, &mut other);
        }
        for (pair, count) in other.joint {
            *self.joint.entry(pair).or_insert(0) += count;
        }
        for (label, count) in other.marginal_a {
            *self.marginal_a.entry(label).or_insert(0) += count;
        }
        for (label, count) in other.marginal_b {
            *self.marginal_b.entry(label).or_insert(0) += count;
        }
        self.total += other.total;
        self
    }

    /// Number of non-background positions counted.
    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    pub fn joint_count(&self, a: u64, b: u64) -> u64 {
        self.joint.get(&(a, b)).copied().unwrap_or(0)
    }

    pub fn marginal_a_count(&self, a: u64) -> u64 {
        self.marginal_a.get(&a).copied().unwrap_or(0)
    }

    pub fn marginal_b_count(&self, b: u64) -> u64 {
        self.marginal_b.get(&b).copied().unwrap_or(0)
    }

    /// Distinct non-background labels seen in `labels_a`.
    pub fn num_labels_a(&self) -> usize {
        self.marginal_a.len()
    }

    /// Distinct labels seen in `labels_b` at non-background positions.
    pub fn num_labels_b(&self) -> usize {
        self.marginal_b.len()
    }

    /// Distinct co-occurring label pairs.
    pub fn num_pairs(&self) -> usize {
        self.joint.len()
    }

    pub fn joint(&self) -> &HashMap<(u64, u64), u64> {
        &self.joint
    }

    pub fn marginal_a(&self) -> &HashMap<u64, u64> {
        &self.marginal_a
    }

    pub fn marginal_b(&self) -> &HashMap<u64, u64> {
        &self.marginal_b
    }

    /// Sums of squared raw counts for the Rand ratios.
    pub fn sums_of_squares(&self) -> SumsOfSquares {
        fn squares<'a>(counts: impl Iterator<Item = &'a u64>) -> u128 {
            counts.map(|&c| u128::from(c) * u128::from(c)).sum()
        }
        SumsOfSquares {
            joint: squares(self.joint.values()),
            a: squares(self.marginal_a.values()),
            b: squares(self.marginal_b.values()),
        }
    }

    /// Verify the conservation invariants between the joint and marginal tables.
    ///
    /// Every table sums to `total`, and no joint count exceeds either of its
    /// marginals.
    pub fn check_invariants(&self) -> bool {
        fn sum<'a>(counts: impl Iterator<Item = &'a u64>) -> u128 {
            counts.map(|&c| u128::from(c)).sum()
        }
        let total = u128::from(self.total);
        if sum(self.joint.values()) != total
            || sum(self.marginal_a.values()) != total
            || sum(self.marginal_b.values()) != total
        {
            return false;
        }
        self.joint.iter().all(|(&(a, b), &count)| {
            count <= self.marginal_a_count(a) && count <= self.marginal_b_count(b)
        })
    }
}
