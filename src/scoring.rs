//! Scoring backends used by the fixed-function metrics.
//!
//! The multi-label backend is compiled in through the `multilabel` feature
//! (enabled by default). Metrics that depend on it check
//! [`multilabel_available`] at construction and refuse to build without it.

#[cfg(feature = "multilabel")]
use ndarray::ArrayD;

#[cfg(feature = "multilabel")]
use crate::error::MetricError;

/// Whether the multi-label scoring backend was compiled into this build.
pub const fn multilabel_available() -> bool {
    cfg!(feature = "multilabel")
}

/// Fraction of labels that disagree between `y_true` and `y_pred`, averaged
/// over samples and labels.
///
/// Both arrays must be rank 1 or 2 and describe the same number of samples
/// and labels per sample. A 1-D array is treated as a single label per
/// sample, so `(N,)` and `(N, 1)` are interchangeable. 1-D targets may hold
/// any class labels; 2-D targets with more than one column are multi-label
/// indicators and must only contain 0 and 1.
///
/// # Returns
///
/// A value in `[0, 1]`, or `MetricError::Shape` when the arrays disagree,
/// the targets are not binary indicators, or there are no labels at all.
#[cfg(feature = "multilabel")]
pub fn hamming_loss(y_true: &ArrayD<f32>, y_pred: &ArrayD<f32>) -> Result<f64, MetricError> {
    let true_shape = label_shape(y_true, "y_true")?;
    let pred_shape = label_shape(y_pred, "y_pred")?;
    if true_shape != pred_shape {
        return Err(MetricError::Shape(format!(
            "y_true has shape {:?} but y_pred has shape {:?}",
            y_true.shape(),
            y_pred.shape()
        )));
    }
    if y_true.is_empty() {
        return Err(MetricError::Shape(
            "hamming loss requires at least one label".to_string(),
        ));
    }
    if true_shape.1 > 1 && y_true.iter().any(|&v| v != 0.0 && v != 1.0) {
        return Err(MetricError::Shape(
            "multi-label targets should be binary (0 or 1)".to_string(),
        ));
    }

    let mismatches = y_true
        .iter()
        .zip(y_pred.iter())
        .filter(|(t, p)| t != p)
        .count();

    Ok(mismatches as f64 / y_true.len() as f64)
}

/// `(samples, labels)` of a rank 1 or 2 array.
#[cfg(feature = "multilabel")]
fn label_shape(x: &ArrayD<f32>, name: &str) -> Result<(usize, usize), MetricError> {
    match *x.shape() {
        [n] => Ok((n, 1)),
        [n, m] => Ok((n, m)),
        _ => Err(MetricError::Shape(format!(
            "{} should be of shape (n_samples, n_labels) or (n_samples, ), got {:?}",
            name,
            x.shape()
        ))),
    }
}
