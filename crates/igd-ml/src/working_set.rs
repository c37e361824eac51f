//! In-memory working set construction.

use crate::error::{MlError, MlResult};
use crate::row::{Row, BIAS_VALUE};

/// Returns the feature vector with the bias feature in front.
pub fn with_bias(features: &[f64]) -> Vec<f64> {
    let mut augmented = Vec::with_capacity(features.len() + 1);
    augmented.push(BIAS_VALUE);
    augmented.extend_from_slice(features);
    augmented
}

/// Builds the bias-augmented rows of a working set from a label column and
/// the raw feature rows, keeping the natural row order.
pub fn build_rows(labels: &[f64], features: &[Vec<f64>]) -> MlResult<Vec<Row>> {
    if labels.len() != features.len() {
        return Err(MlError::dimension(format!(
            "{} labels but {} feature rows",
            labels.len(),
            features.len()
        )));
    }
    let width = features.first().map(Vec::len).unwrap_or_default();
    labels
        .iter()
        .zip(features.iter())
        .enumerate()
        .map(|(i, (&label, x))| {
            if x.len() != width {
                return Err(MlError::dimension(format!(
                    "row {i} has {} features, expected {width}",
                    x.len()
                )));
            }
            let row = Row::new(label, with_bias(x));
            row.validate()?;
            Ok(row)
        })
        .collect()
}
