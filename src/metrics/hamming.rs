//! Multi-label Hamming loss over an epoch.

use std::sync::Arc;

use anyhow::Result;
use ndarray::ArrayD;

use crate::activation::Activation;
use crate::error::MetricError;
use crate::metrics::{activate, EpochMetric, Metric, StepOutput};
use crate::scoring;

/// Threshold used when none is configured.
pub const DEFAULT_THRESHOLD: f32 = 0.5;

/// Binarize activated predictions with `value > threshold` and return the
/// Hamming loss against `y_targets`.
pub fn hamming_loss_compute(
    y_preds: &ArrayD<f32>,
    y_targets: &ArrayD<f32>,
    activation: Option<&Activation>,
    threshold: f32,
) -> Result<f64> {
    let y_preds = activate(y_preds, activation)?.mapv_into(|v| if v > threshold { 1.0 } else { 0.0 });
    score(y_targets, &y_preds)
}

#[cfg(feature = "multilabel")]
fn score(y_targets: &ArrayD<f32>, y_preds: &ArrayD<f32>) -> Result<f64> {
    Ok(scoring::hamming_loss(y_targets, y_preds)?)
}

#[cfg(not(feature = "multilabel"))]
fn score(_y_targets: &ArrayD<f32>, _y_preds: &ArrayD<f32>) -> Result<f64> {
    Err(missing_backend().into())
}

fn missing_backend() -> MetricError {
    MetricError::MissingDependency(
        "HammingLoss requires the multi-label scoring backend. Please compile with `--features multilabel`"
            .to_string(),
    )
}

/// Computes the Hamming loss over the predictions and labels gathered during
/// an epoch.
///
/// Predictions are passed through the optional activation, then a label is
/// predicted positive when its value is strictly greater than the threshold.
/// Targets are multi-label binary indicator arrays of the same shape.
pub struct HammingLoss<O = StepOutput> {
    inner: EpochMetric<O>,
    activation: Option<Activation>,
    threshold: f32,
}

impl HammingLoss<StepOutput> {
    /// Hamming loss on raw predictions with the default threshold of 0.5.
    pub fn new() -> Result<Self> {
        Self::with_params(None, DEFAULT_THRESHOLD)
    }

    /// Hamming loss with an optional activation (e.g. `Activation::Sigmoid`
    /// when the model returns logits) and a custom threshold.
    ///
    /// Fails with `MetricError::MissingDependency` when the multi-label
    /// backend is not compiled in, whatever the other arguments are.
    pub fn with_params(activation: Option<Activation>, threshold: f32) -> Result<Self> {
        if !scoring::multilabel_available() {
            return Err(missing_backend().into());
        }
        if !threshold.is_finite() {
            return Err(MetricError::Config(format!("threshold must be finite, got {}", threshold)).into());
        }

        let captured = activation.clone();
        let compute_fn = Arc::new(move |y_preds: &ArrayD<f32>, y_targets: &ArrayD<f32>| {
            hamming_loss_compute(y_preds, y_targets, captured.as_ref(), threshold)
        });

        log::debug!(
            "Created HammingLoss with activation {:?} and threshold {}",
            activation,
            threshold
        );

        Ok(Self {
            inner: EpochMetric::from_compute_fn(compute_fn),
            activation,
            threshold,
        })
    }
}

impl<O> HammingLoss<O> {
    /// Map the engine output to `(y_pred, y)`.
    pub fn output_transform<P, F>(self, transform: F) -> HammingLoss<P>
    where
        F: Fn(&P) -> StepOutput + Send + Sync + 'static,
    {
        HammingLoss {
            inner: self.inner.output_transform(transform),
            activation: self.activation,
            threshold: self.threshold,
        }
    }

    pub fn check_compute_fn(mut self, enabled: bool) -> Self {
        self.inner = self.inner.check_compute_fn(enabled);
        self
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn activation(&self) -> Option<&Activation> {
        self.activation.as_ref()
    }

    pub fn num_samples(&self) -> usize {
        self.inner.num_samples()
    }
}

impl<O> Metric<O> for HammingLoss<O> {
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
        "hamming_loss"
    }
}
