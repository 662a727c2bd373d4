//! Canonicalize the raw output tensor to an `(N, 4 + C)` detection table.
//!
//! Export pipelines emit either a feature-major `(1, F, N)` or a
//! detection-major `(1, N, F)` tensor (the batch axis is sometimes dropped),
//! and nothing in the tensor says which. Only those two orientations are
//! accepted; anything else is a hard error.

use crate::error::{AutolabelError, Result};
use ndarray::{Array2, ArrayViewD, Axis, Ix2};

/// `F = 4 + C`: box geometry plus one score per class.
#[inline]
pub fn feature_count(num_classes: usize) -> usize {
    4 + num_classes
}

/// Returns a standard-layout `(N, F)` table.
///
/// If both axes equal `F` the tensor is treated as feature-major.
pub fn canonicalize(raw: ArrayViewD<'_, f32>, num_classes: usize) -> Result<Array2<f32>> {
    let features = feature_count(num_classes);

    let table = match raw.ndim() {
        3 => {
            let batch = raw.shape()[0];
            if batch != 1 {
                return Err(AutolabelError::UnsupportedBatch(batch));
            }
            raw.index_axis_move(Axis(0), 0)
        }
        2 => raw,
        ndim => {
            return Err(AutolabelError::OutputRank {
                ndim,
                shape: raw.shape().to_vec(),
            });
        }
    };

    let shape = table.shape().to_vec();
    let table = table
        .into_dimensionality::<Ix2>()
        .map_err(|_| AutolabelError::OutputRank {
            ndim: shape.len(),
            shape: shape.clone(),
        })?;

    let (rows, cols) = table.dim();
    let canonical = if rows == features {
        tracing::debug!(rows, cols, "Feature-major output, transposing");
        table.t().as_standard_layout().into_owned()
    } else if cols == features {
        table.as_standard_layout().into_owned()
    } else {
        return Err(AutolabelError::OutputShape { shape, features });
    };

    Ok(canonical)
}
