//! Count normalization and Shannon entropies.
//!
//! All entropies are in bits. A probability of exactly zero contributes exactly
//! zero to an entropy sum; `log2(0)` is never evaluated.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::contingency::ContingencyTable;
use crate::error::{EvalError, Result};

/// Normalized joint and marginal distributions, sorted by key.
///
/// Sorting makes every summation over the tables run in the same order from
/// one call to the next, independent of hash map iteration order.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbabilityTables {
    joint: Vec<((u64, u64), f64)>,
    marginal_a: Vec<(u64, f64)>,
    marginal_b: Vec<(u64, f64)>,
}

/// Joint and marginal entropies of the two labelings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Entropies {
    /// H(A, B)
    pub joint: f64,
    /// H(A)
    pub a: f64,
    /// H(B)
    pub b: f64,
}

impl Entropies {
    /// Mutual information I(A; B) = H(A) + H(B) - H(A, B).
    pub fn mutual_information(&self) -> f64 {
        self.a + self.b - self.joint
    }
}

/// Per-cluster decomposition of the VOI split and merge terms.
///
/// `split` is keyed by labels of `labels_a` and sums to `voi_split`; `merge`
/// is keyed by labels of `labels_b` and sums to `voi_merge`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusterScores {
    pub split: BTreeMap<u64, f64>,
    pub merge: BTreeMap<u64, f64>,
}

impl ClusterScores {
    pub fn split_total(&self) -> f64 {
        self.split.values().sum()
    }

    pub fn merge_total(&self) -> f64 {
        self.merge.values().sum()
    }
}

/// `-p * log2(p)`, with the convention that a zero probability contributes zero.
#[inline]
pub fn neg_plogp(p: f64) -> f64 {
    if p > 0.0 { -p * p.log2() } else { 0.0 }
}

/// Shannon entropy in bits of a sequence of probabilities.
pub fn entropy(probabilities: impl IntoIterator<Item = f64>) -> f64 {
    probabilities.into_iter().map(neg_plogp).sum()
}

fn sorted_by_key<K: Ord + Copy>(
    counts: impl Iterator<Item = (K, u64)>,
    total: f64,
) -> Vec<(K, f64)> {
    let mut entries: Vec<(K, f64)> = counts.map(|(k, c)| (k, c as f64 / total)).collect();
    entries.sort_unstable_by_key(|(k, _)| *k);
    entries
}

impl ProbabilityTables {
    /// Divide every count by the table total.
    ///
    /// Fails with [`EvalError::NoOverlap`] when nothing was counted.
    pub fn from_counts(table: &ContingencyTable) -> Result<Self> {
        if table.is_empty() {
            return Err(EvalError::NoOverlap);
        }
        let total = table.total() as f64;
        Ok(Self {
            joint: sorted_by_key(table.joint().iter().map(|(&k, &c)| (k, c)), total),
            marginal_a: sorted_by_key(table.marginal_a().iter().map(|(&k, &c)| (k, c)), total),
            marginal_b: sorted_by_key(table.marginal_b().iter().map(|(&k, &c)| (k, c)), total),
        })
    }

    pub fn joint(&self) -> &[((u64, u64), f64)] {
        &self.joint
    }

    pub fn marginal_a(&self) -> &[(u64, f64)] {
        &self.marginal_a
    }

    pub fn marginal_b(&self) -> &[(u64, f64)] {
        &self.marginal_b
    }

    /// Compute H(A, B), H(A) and H(B).
    ///
    /// With `decompose`, the per-cluster VOI terms are accumulated in the same
    /// pass over the joint entries: each cluster starts at `p * log2(p)` of its
    /// marginal and adds `-p * log2(p)` of every joint entry it takes part in.
    pub fn entropies(&self, decompose: bool) -> (Entropies, Option<ClusterScores>) {
        let mut scores = decompose.then(ClusterScores::default);
        let mut h = Entropies::default();

        for &(label, p) in &self.marginal_a {
            let term = neg_plogp(p);
            h.a += term;
            if let Some(scores) = scores.as_mut() {
                scores.split.insert(label, -term);
            }
        }

        for &(label, p) in &self.marginal_b {
            let term = neg_plogp(p);
            h.b += term;
            if let Some(scores) = scores.as_mut() {
                scores.merge.insert(label, -term);
            }
        }

        for &((a, b), p) in &self.joint {
            let term = neg_plogp(p);
            h.joint += term;
            if let Some(scores) = scores.as_mut() {
                *scores.split.entry(a).or_insert(0.0) += term;
                *scores.merge.entry(b).or_insert(0.0) += term;
            }
        }

        (h, scores)
    }
}
