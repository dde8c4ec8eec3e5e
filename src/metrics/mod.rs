//! Epoch-level metrics.
//!
//! Every metric here is an [`EpochMetric`] underneath: per-batch outputs are
//! buffered for the whole epoch and a single compute function is evaluated
//! over the concatenated arrays when the epoch ends.
//!
//! - [`LambdaEpochMetric`]: any user-supplied `(y_pred, y) -> f64` function.
//! - [`HammingLoss`]: multi-label Hamming loss over thresholded predictions.
//!
//! Metrics consume the engine's per-step output through an output transform
//! that maps it to a [`StepOutput`] pair. The default transform is the
//! identity, so a metric attached to an engine producing `StepOutput` needs
//! no configuration.

pub mod epoch;
pub mod factory;
pub mod hamming;
pub mod lambda;

pub use epoch::{EpochBuffer, EpochMetric};
pub use hamming::{hamming_loss_compute, HammingLoss};
pub use lambda::{lambda_compute, LambdaEpochMetric};

use std::sync::Arc;

use anyhow::Result;
use ndarray::ArrayD;

use crate::activation::Activation;

/// `(y_pred, y)` for one batch.
pub type StepOutput = (ArrayD<f32>, ArrayD<f32>);

/// Maps an engine's per-step output to the `(y_pred, y)` pair a metric buffers.
pub type OutputTransform<O> = Box<dyn Fn(&O) -> StepOutput + Send + Sync>;

/// Function evaluated once per epoch over all buffered predictions and targets.
pub type ComputeFn = Arc<dyn Fn(&ArrayD<f32>, &ArrayD<f32>) -> Result<f64> + Send + Sync>;

/// A metric driven by a training or evaluation engine.
///
/// The engine calls `reset` at the start of an epoch, `update` once per batch
/// and `compute` once the epoch is over.
pub trait Metric<O> {
    fn reset(&mut self);

    /// Feed one engine step output into the metric.
    fn update(&mut self, output: &O) -> Result<()>;

    /// Evaluate the metric over everything seen since the last `reset`.
    fn compute(&self) -> Result<f64>;

    /// Optional human readable name for the metric
    fn name(&self) -> &str {
        "metric"
    }
}

pub(crate) fn identity(output: &StepOutput) -> StepOutput {
    output.clone()
}

/// Apply `activation` to a copy of the predictions, if one is configured.
pub(crate) fn activate(y_preds: &ArrayD<f32>, activation: Option<&Activation>) -> Result<ArrayD<f32>> {
    match activation {
        Some(act) => act.apply(y_preds.clone()),
        None => Ok(y_preds.clone()),
    }
}
