//! Metric composition: Rand split/merge, VOI split/merge, NVI and NID.

use serde::{Deserialize, Serialize};

use crate::contingency::SumsOfSquares;
use crate::error::{EvalError, Result};
use crate::probability::{ClusterScores, Entropies};

/// Scores comparing `labels_a` against `labels_b`.
///
/// Split terms measure how much `labels_b` fragments clusters of `labels_a`,
/// merge terms how much it joins them. All values are computed over the
/// positions where `labels_a` is not background.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsResult {
    /// Σ n_ij² / Σ a_i²
    pub rand_split: f64,
    /// Σ n_ij² / Σ b_j²
    pub rand_merge: f64,
    /// H(B | A) = H(A, B) - H(A)
    pub voi_split: f64,
    /// H(A | B) = H(A, B) - H(B)
    pub voi_merge: f64,
    /// voi_split / H(A, B)
    pub nvi_split: f64,
    /// voi_merge / H(A, B)
    pub nvi_merge: f64,
    /// Normalized information distance, 1 - I(A; B) / max(H(A), H(B)).
    pub nid: f64,
    /// Per-cluster VOI contributions, only when requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_scores: Option<ClusterScores>,
}

impl MetricsResult {
    /// Total variation of information.
    pub fn voi(&self) -> f64 {
        self.voi_split + self.voi_merge
    }

    /// Harmonic mean of the Rand split and merge scores (adapted Rand F-score).
    pub fn rand_f_score(&self) -> f64 {
        2.0 * self.rand_split * self.rand_merge / (self.rand_split + self.rand_merge)
    }

    pub fn has_cluster_scores(&self) -> bool {
        self.cluster_scores.is_some()
    }
}

/// Derive all metrics from the squared-count sums and the entropies.
///
/// `labels_a`/`labels_b` are the number of distinct labels on either side,
/// used only to describe a degenerate input. Fails with
/// [`EvalError::DegenerateLabeling`] when H(A, B) is zero, which happens
/// exactly when both sides hold a single label and so also zeroes the NID
/// denominator.
pub fn compose(
    sums: &SumsOfSquares,
    entropies: &Entropies,
    cluster_scores: Option<ClusterScores>,
    labels_a: usize,
    labels_b: usize,
) -> Result<MetricsResult> {
    if sums.a == 0 || sums.b == 0 {
        return Err(EvalError::NoOverlap);
    }
    let max_marginal = entropies.a.max(entropies.b);
    if entropies.joint <= 0.0 || max_marginal <= 0.0 {
        return Err(EvalError::DegenerateLabeling { labels_a, labels_b });
    }

    let sum_joint = sums.joint as f64;
    let voi_split = entropies.joint - entropies.a;
    let voi_merge = entropies.joint - entropies.b;

    Ok(MetricsResult {
        rand_split: sum_joint / sums.a as f64,
        rand_merge: sum_joint / sums.b as f64,
        voi_split,
        voi_merge,
        nvi_split: voi_split / entropies.joint,
        nvi_merge: voi_merge / entropies.joint,
        nid: 1.0 - entropies.mutual_information() / max_marginal,
        cluster_scores,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const EPS: f64 = 1e-12;

    #[test]
    fn test_compose_identity() {
        let sums = SumsOfSquares {
            joint: 8,
            a: 8,
            b: 8,
        };
        let h = Entropies {
            joint: 1.0,
            a: 1.0,
            b: 1.0,
        };
        let m = compose(&sums, &h, None, 2, 2).unwrap();
        assert_eq!(
            m,
            MetricsResult {
                rand_split: 1.0,
                rand_merge: 1.0,
                voi_split: 0.0,
                voi_merge: 0.0,
                nvi_split: 0.0,
                nvi_merge: 0.0,
                nid: 0.0,
                cluster_scores: None,
            }
        );
        assert_eq!(m.rand_f_score(), 1.0);
    }

    #[test]
    fn test_compose_single_a_cluster() {
        // labels_a = [1, 1, 1, 1], labels_b = [1, 1, 2, 2]
        let sums = SumsOfSquares {
            joint: 8,
            a: 16,
            b: 8,
        };
        let h = Entropies {
            joint: 1.0,
            a: 0.0,
            b: 1.0,
        };
        let m = compose(&sums, &h, None, 1, 2).unwrap();
        assert!((m.rand_split - 0.5).abs() < EPS);
        assert!((m.rand_merge - 1.0).abs() < EPS);
        assert!((m.voi_split - 1.0).abs() < EPS);
        assert!(m.voi_merge.abs() < EPS);
        assert!((m.nvi_split - 1.0).abs() < EPS);
        assert!((m.nid - 1.0).abs() < EPS);
        assert!((m.voi() - 1.0).abs() < EPS);
    }

    #[test]
    fn test_compose_degenerate() {
        let sums = SumsOfSquares {
            joint: 16,
            a: 16,
            b: 16,
        };
        let err = compose(&sums, &Entropies::default(), None, 1, 1).unwrap_err();
        assert!(matches!(
            err,
            EvalError::DegenerateLabeling {
                labels_a: 1,
                labels_b: 1
            }
        ));
    }

    #[test]
    fn test_compose_empty_sums_is_no_overlap() {
        let err = compose(&SumsOfSquares::default(), &Entropies::default(), None, 0, 0)
            .unwrap_err();
        assert!(matches!(err, EvalError::NoOverlap));
    }

    #[test]
    fn test_cluster_scores_skipped_when_absent() {
        let m = MetricsResult {
            rand_split: 1.0,
            rand_merge: 1.0,
            voi_split: 0.0,
            voi_merge: 0.0,
            nvi_split: 0.0,
            nvi_merge: 0.0,
            nid: 0.0,
            cluster_scores: None,
        };
        let json = serde_json::to_value(&m).unwrap();
        assert!(json.get("cluster_scores").is_none());
        assert_eq!(json["rand_split"], 1.0);
        assert!(!m.has_cluster_scores());
    }
}
