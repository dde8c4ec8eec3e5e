//! Epoch metric wrapping an arbitrary scoring function.

use std::sync::Arc;

use anyhow::Result;
use ndarray::ArrayD;

use crate::activation::Activation;
use crate::metrics::{EpochMetric, Metric, StepOutput};

/// Apply the optional activation to the predictions, then score them against
/// the targets with `metric_fn`.
///
/// Errors from the activation or from `metric_fn` are returned unchanged.
pub fn lambda_compute<F>(
    y_preds: &ArrayD<f32>,
    y_targets: &ArrayD<f32>,
    metric_fn: &F,
    activation: Option<&Activation>,
) -> Result<f64>
where
    F: Fn(&ArrayD<f32>, &ArrayD<f32>) -> Result<f64> + ?Sized,
{
    match activation {
        Some(act) => {
            let y_preds = act.apply(y_preds.clone())?;
            metric_fn(&y_preds, y_targets)
        }
        None => metric_fn(y_preds, y_targets),
    }
}

/// Computes a user-defined metric over the predictions and targets gathered
/// during an epoch.
///
/// # Example
///
/// ```ignore
/// let metric = LambdaEpochMetric::with_activation(
///     |y_pred, y| Ok(my_auc(y_pred, y)),
///     Activation::Sigmoid,
/// );
/// ```
pub struct LambdaEpochMetric<O = StepOutput> {
    inner: EpochMetric<O>,
}

impl LambdaEpochMetric<StepOutput> {
    /// Create a metric scoring raw predictions with `metric_fn`.
    pub fn new<F>(metric_fn: F) -> Self
    where
        F: Fn(&ArrayD<f32>, &ArrayD<f32>) -> Result<f64> + Send + Sync + 'static,
    {
        Self::build(metric_fn, None)
    }

    /// Create a metric applying `activation` to predictions before `metric_fn`,
    /// e.g. `Activation::Sigmoid` when the model returns logits.
    pub fn with_activation<F>(metric_fn: F, activation: Activation) -> Self
    where
        F: Fn(&ArrayD<f32>, &ArrayD<f32>) -> Result<f64> + Send + Sync + 'static,
    {
        Self::build(metric_fn, Some(activation))
    }

    fn build<F>(metric_fn: F, activation: Option<Activation>) -> Self
    where
        F: Fn(&ArrayD<f32>, &ArrayD<f32>) -> Result<f64> + Send + Sync + 'static,
    {
        let compute_fn = Arc::new(move |y_preds: &ArrayD<f32>, y_targets: &ArrayD<f32>| {
            lambda_compute(y_preds, y_targets, &metric_fn, activation.as_ref())
        });
        Self {
            inner: EpochMetric::from_compute_fn(compute_fn),
        }
    }
}

impl<O> LambdaEpochMetric<O> {
    /// Map the engine output to `(y_pred, y)`, e.g. to pick one head of a
    /// multi-output model.
    pub fn output_transform<P, F>(self, transform: F) -> LambdaEpochMetric<P>
    where
        F: Fn(&P) -> StepOutput + Send + Sync + 'static,
    {
        LambdaEpochMetric {
            inner: self.inner.output_transform(transform),
        }
    }

    pub fn check_compute_fn(self, enabled: bool) -> Self {
        Self {
            inner: self.inner.check_compute_fn(enabled),
        }
    }

    pub fn num_samples(&self) -> usize {
        self.inner.num_samples()
    }
}

impl<O> Metric<O> for LambdaEpochMetric<O> {
    fn reset(&mut self) {
        self.inner.reset();
    }

    fn update(&mut self, output: &O) -> Result<()> {
        self.inner.update(output)
    }

    fn compute(&self) -> Result<f64> {
        self.inner.compute()
    }

    fn name(&self) -> &str {
        "epoch_lambda"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr1;

    fn max_pred(p: &ArrayD<f32>, _t: &ArrayD<f32>) -> Result<f64> {
        Ok(p.iter().copied().fold(f32::NEG_INFINITY, f32::max) as f64)
    }

    #[test]
    fn test_lambda_compute_without_activation_sees_raw_values() {
        let p = arr1(&[-2.0f32, 3.0]).into_dyn();
        let t = arr1(&[0.0f32, 1.0]).into_dyn();
        let value = lambda_compute(&p, &t, &max_pred, None).unwrap();
        assert_eq!(value, 3.0);
    }

    #[test]
    fn test_lambda_compute_with_activation_leaves_input_untouched() {
        let p = arr1(&[-2.0f32, 3.0]).into_dyn();
        let t = arr1(&[0.0f32, 1.0]).into_dyn();
        let value = lambda_compute(&p, &t, &max_pred, Some(&Activation::Sigmoid)).unwrap();
        assert!(value < 1.0 && value > 0.9);
        assert_eq!(p[[1]], 3.0);
    }
}
