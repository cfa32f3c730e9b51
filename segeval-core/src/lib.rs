//! # segeval-core
//!
//! Segmentation comparison metrics for two integer-labeled volumes.
//!
//! Both volumes are flat label sequences compared position by position. One
//! pass builds a sparse contingency table of label co-occurrences; the Rand
//! split/merge scores, the variation of information (VOI) split/merge terms,
//! their normalized variants (NVI, NID) and an optional per-cluster VOI
//! decomposition are all derived from it.
//!
//! Label `0` in the first volume marks background: those positions are left
//! out of every statistic. A `0` in the second volume is an ordinary label.
//!
//! ```
//! use segeval_core::compute_metrics;
//!
//! let truth = [1u32, 1, 2, 2];
//! let candidate = [1u64, 1, 1, 1];
//! let m = compute_metrics(truth.len(), &truth, &candidate, false).unwrap();
//! assert_eq!(m.voi_merge, 1.0);
//! assert_eq!(m.rand_merge, 0.5);
//! ```

pub mod config;
pub mod contingency;
pub mod error;
pub mod evaluator;
pub mod label;
pub mod metrics;
pub mod probability;

// Re-export commonly used types at the crate root.
pub use config::{EvalConfig, ParallelConfig, load_config};
pub use contingency::{BACKGROUND, ContingencyTable, SumsOfSquares};
pub use error::{EvalError, Result, Side};
pub use evaluator::{Evaluator, compute_metrics, metrics_from_table};
pub use label::Label;
pub use metrics::MetricsResult;
pub use probability::{ClusterScores, Entropies, ProbabilityTables};
