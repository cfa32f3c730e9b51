//! Entry points: validate the inputs, aggregate, then derive the metrics.

use tracing::{debug, warn};

use crate::config::EvalConfig;
use crate::contingency::ContingencyTable;
use crate::error::Result;
use crate::label::{Label, validate_labels};
use crate::metrics::{MetricsResult, compose};
use crate::probability::ProbabilityTables;

/// Compare two labelings of `size` positions.
///
/// Positions where `labels_a` is `0` are ignored. With
/// `return_cluster_scores`, the result also carries the per-cluster VOI
/// decomposition.
///
/// When both labelings reduce to a single label over the compared positions,
/// the call fails with [`DegenerateLabeling`](crate::EvalError::DegenerateLabeling)
/// because NVI and NID divide by zero. The Rand and VOI scores are still
/// defined in that case (`rand_split = rand_merge = 1`,
/// `voi_split = voi_merge = 0`) but are not returned; callers that want them
/// can treat this error as a perfect match on those four scores.
pub fn compute_metrics<A: Label, B: Label>(
    size: usize,
    labels_a: &[A],
    labels_b: &[B],
    return_cluster_scores: bool,
) -> Result<MetricsResult> {
    let config = EvalConfig::default().with_cluster_scores(return_cluster_scores);
    Evaluator { config }.evaluate_sized(size, labels_a, labels_b)
}

/// Derive all metrics from an already aggregated table.
pub fn metrics_from_table(table: &ContingencyTable, decompose: bool) -> Result<MetricsResult> {
    let result = ProbabilityTables::from_counts(table).and_then(|probabilities| {
        let (entropies, cluster_scores) = probabilities.entropies(decompose);
        debug!(
            h_joint = entropies.joint,
            h_a = entropies.a,
            h_b = entropies.b,
            "Computed entropies"
        );
        compose(
            &table.sums_of_squares(),
            &entropies,
            cluster_scores,
            table.num_labels_a(),
            table.num_labels_b(),
        )
    });
    if let Err(e) = &result {
        warn!(error = %e, "Metrics undefined for input");
    }
    result
}

/// Configured metric evaluator.
#[derive(Debug, Clone, Default)]
pub struct Evaluator {
    config: EvalConfig,
}

impl Evaluator {
    pub fn new(config: EvalConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    /// Compare two labelings of equal length.
    pub fn evaluate<A: Label, B: Label>(
        &self,
        labels_a: &[A],
        labels_b: &[B],
    ) -> Result<MetricsResult> {
        self.evaluate_sized(labels_a.len(), labels_a, labels_b)
    }

    /// Compare two labelings that must both hold exactly `size` positions.
    pub fn evaluate_sized<A: Label, B: Label>(
        &self,
        size: usize,
        labels_a: &[A],
        labels_b: &[B],
    ) -> Result<MetricsResult> {
        let table = self.contingency_sized(size, labels_a, labels_b)?;
        metrics_from_table(&table, self.config.return_cluster_scores)
    }

    /// Validate the inputs and build their contingency table.
    pub fn contingency<A: Label, B: Label>(
        &self,
        labels_a: &[A],
        labels_b: &[B],
    ) -> Result<ContingencyTable> {
        self.contingency_sized(labels_a.len(), labels_a, labels_b)
    }

    fn contingency_sized<A: Label, B: Label>(
        &self,
        size: usize,
        labels_a: &[A],
        labels_b: &[B],
    ) -> Result<ContingencyTable> {
        validate_labels(size, labels_a, labels_b)?;

        let parallel = &self.config.parallel;
        let table = if parallel.should_parallelize(size) {
            debug!(size, chunk_len = parallel.chunk_len, "Aggregating in parallel");
            ContingencyTable::count_parallel(labels_a, labels_b, parallel.chunk_len)
        } else {
            ContingencyTable::count(labels_a, labels_b)
        };

        debug!(
            size,
            total = table.total(),
            pairs = table.num_pairs(),
            labels_a = table.num_labels_a(),
            labels_b = table.num_labels_b(),
            "Built contingency table"
        );
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParallelConfig;
    use crate::error::{EvalError, Side};

    const EPS: f64 = 1e-12;

    #[test]
    fn test_identity_scores() {
        let m = compute_metrics(4, &[1u64, 1, 2, 2], &[1u64, 1, 2, 2], false).unwrap();
        assert_eq!(m.voi_split, 0.0);
        assert_eq!(m.voi_merge, 0.0);
        assert_eq!(m.rand_split, 1.0);
        assert_eq!(m.rand_merge, 1.0);
        assert_eq!(m.nid, 0.0);
        assert!(m.cluster_scores.is_none());
    }

    #[test]
    fn test_split_merge_asymmetry() {
        let m = compute_metrics(4, &[1u32, 1, 1, 1], &[1u32, 1, 2, 2], false).unwrap();
        assert!((m.voi_split - 1.0).abs() < EPS);
        assert!(m.voi_merge.abs() < EPS);
        assert!((m.rand_split - 0.5).abs() < EPS);
        assert!((m.rand_merge - 1.0).abs() < EPS);

        let swapped = compute_metrics(4, &[1u32, 1, 2, 2], &[1u32, 1, 1, 1], false).unwrap();
        assert!(swapped.voi_split.abs() < EPS);
        assert!((swapped.voi_merge - 1.0).abs() < EPS);
        assert!((swapped.rand_split - 1.0).abs() < EPS);
        assert!((swapped.rand_merge - 0.5).abs() < EPS);
    }

    #[test]
    fn test_length_mismatch_reported_before_aggregation() {
        let err = compute_metrics(3, &[1u8, 2, 3], &[1u8, 2], false).unwrap_err();
        assert!(matches!(
            err,
            EvalError::LengthMismatch {
                side: Side::B,
                expected: 3,
                actual: 2
            }
        ));

        let err = compute_metrics(4, &[1u8, 2, 3], &[1u8, 2, 3], false).unwrap_err();
        assert!(matches!(
            err,
            EvalError::LengthMismatch { side: Side::A, .. }
        ));
    }

    #[test]
    fn test_negative_label_rejected() {
        let err = compute_metrics(3, &[1i32, 2, 3], &[4i64, -5, 6], false).unwrap_err();
        match err {
            EvalError::InvalidLabel { side, index, value } => {
                assert_eq!(side, Side::B);
                assert_eq!(index, 1);
                assert_eq!(value, "-5");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_all_background_is_no_overlap() {
        let err = compute_metrics(3, &[0u16; 3], &[1u16, 2, 3], true).unwrap_err();
        assert!(matches!(err, EvalError::NoOverlap));
    }

    #[test]
    fn test_single_label_both_sides_is_degenerate() {
        let err = compute_metrics(4, &[0u16, 3, 3, 3], &[9u16, 7, 7, 7], false).unwrap_err();
        assert!(matches!(
            err,
            EvalError::DegenerateLabeling {
                labels_a: 1,
                labels_b: 1
            }
        ));
    }

    #[test]
    fn test_cluster_scores_requested() {
        let m = compute_metrics(6, &[1u32, 1, 2, 2, 2, 3], &[5u32, 6, 6, 6, 7, 7], true).unwrap();
        let scores = m.cluster_scores.as_ref().unwrap();
        assert!((scores.split_total() - m.voi_split).abs() < 1e-9);
        assert!((scores.merge_total() - m.voi_merge).abs() < 1e-9);
        assert_eq!(scores.split.keys().copied().collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(scores.merge.keys().copied().collect::<Vec<_>>(), vec![5, 6, 7]);
    }

    #[test]
    fn test_parallel_path_matches_sequential() {
        let a: Vec<u32> = (0..5000u32).map(|i| i % 11).collect();
        let b: Vec<u64> = (0..5000u64).map(|i| (i * 7) % 13).collect();
        let sequential = Evaluator::new(
            EvalConfig::default()
                .with_cluster_scores(true)
                .with_parallel(ParallelConfig::disabled()),
        )
        .unwrap();
        let parallel = Evaluator::new(
            EvalConfig::default()
                .with_cluster_scores(true)
                .with_parallel(ParallelConfig {
                    enabled: true,
                    min_len: 0,
                    chunk_len: 333,
                }),
        )
        .unwrap();
        assert_eq!(
            sequential.contingency(&a, &b).unwrap(),
            parallel.contingency(&a, &b).unwrap()
        );
        // Tables are equal and summation runs over sorted keys, so the
        // results agree bit for bit.
        assert_eq!(
            sequential.evaluate(&a, &b).unwrap(),
            parallel.evaluate(&a, &b).unwrap()
        );
    }

    #[test]
    fn test_evaluator_rejects_invalid_config() {
        let config = EvalConfig::default().with_parallel(ParallelConfig {
            chunk_len: 0,
            ..ParallelConfig::default()
        });
        assert!(Evaluator::new(config).is_err());
    }
}
