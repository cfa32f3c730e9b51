//! Label value types accepted at the API boundary.
//!
//! Both inputs may use any primitive integer width, independently of each other.
//! Everything past the boundary works on `u64` keys.

use std::fmt::Display;

use num_traits::{PrimInt, ToPrimitive};

use crate::error::{EvalError, Result, Side};

/// An integer type usable as a voxel label. `0` is the background label.
pub trait Label: PrimInt + ToPrimitive + Display + Send + Sync {
    /// The label widened to the common key type, or `None` for negative
    /// values and values beyond `u64::MAX`.
    #[inline]
    fn to_label(self) -> Option<u64> {
        self.to_u64()
    }
}

impl<T: PrimInt + ToPrimitive + Display + Send + Sync> Label for T {}

/// Index and value of the first label without a `u64` key.
pub(crate) fn first_invalid<L: Label>(labels: &[L]) -> Option<(usize, L)> {
    labels
        .iter()
        .position(|l| l.to_label().is_none())
        .map(|i| (i, labels[i]))
}

/// Check lengths and label values of both sequences before any counting.
pub(crate) fn validate_labels<A: Label, B: Label>(
    size: usize,
    labels_a: &[A],
    labels_b: &[B],
) -> Result<()> {
    for (side, actual) in [(Side::A, labels_a.len()), (Side::B, labels_b.len())] {
        if actual != size {
            return Err(EvalError::LengthMismatch {
                side,
                expected: size,
                actual,
            });
        }
    }
    if let Some((index, value)) = first_invalid(labels_a) {
        return Err(EvalError::InvalidLabel {
            side: Side::A,
            index,
            value: value.to_string(),
        });
    }
    if let Some((index, value)) = first_invalid(labels_b) {
        return Err(EvalError::InvalidLabel {
            side: Side::B,
            index,
            value: value.to_string(),
        });
    }
    Ok(())
}
