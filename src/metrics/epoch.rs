//! Epoch accumulator shared by all metrics in this crate.

use std::sync::Arc;

use anyhow::Result;
use ndarray::{concatenate, ArrayD, ArrayViewD, Axis};

use crate::error::MetricError;
use crate::metrics::{identity, ComputeFn, Metric, OutputTransform, StepOutput};

/// Predictions and targets buffered over one epoch.
///
/// The buffer owns copies of every batch. Each pushed pair has the same
/// number of samples for predictions and targets, and every batch shares the
/// trailing shape of the first one, so the two arrays produced by
/// [`EpochBuffer::concatenate`] always have equal leading dimension.
#[derive(Debug, Clone, Default)]
pub struct EpochBuffer {
    predictions: Vec<ArrayD<f32>>,
    targets: Vec<ArrayD<f32>>,
    num_samples: usize,
}

impl EpochBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and store one batch.
    pub fn push(&mut self, y_pred: ArrayD<f32>, y: ArrayD<f32>) -> Result<(), MetricError> {
        check_rank(&y_pred, "Predictions")?;
        check_rank(&y, "Targets")?;

        if y_pred.shape()[0] != y.shape()[0] {
            return Err(MetricError::Shape(format!(
                "Predictions and targets must have the same number of samples, got {} and {}",
                y_pred.shape()[0],
                y.shape()[0]
            )));
        }

        if let (Some(first_pred), Some(first_target)) = (self.predictions.first(), self.targets.first()) {
            check_coherent(&y_pred, first_pred, "y_pred", "predictions")?;
            check_coherent(&y, first_target, "y", "targets")?;
        }

        self.num_samples += y_pred.shape()[0];
        self.predictions.push(y_pred);
        self.targets.push(y);
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.num_samples == 0
    }

    pub fn num_samples(&self) -> usize {
        self.num_samples
    }

    pub fn num_batches(&self) -> usize {
        self.predictions.len()
    }

    pub fn clear(&mut self) {
        self.predictions.clear();
        self.targets.clear();
        self.num_samples = 0;
    }

    /// Concatenate all buffered batches along the sample axis.
    pub fn concatenate(&self) -> Result<(ArrayD<f32>, ArrayD<f32>), MetricError> {
        Ok((stack_batches(&self.predictions)?, stack_batches(&self.targets)?))
    }
}

fn check_rank(x: &ArrayD<f32>, what: &str) -> Result<(), MetricError> {
    match x.ndim() {
        1 | 2 => Ok(()),
        _ => Err(MetricError::Shape(format!(
            "{} should be of shape (batch_size, n_targets) or (batch_size, ), got {:?}",
            what,
            x.shape()
        ))),
    }
}

fn check_coherent(
    incoming: &ArrayD<f32>,
    stored: &ArrayD<f32>,
    input_name: &str,
    stored_name: &str,
) -> Result<(), MetricError> {
    if incoming.shape()[1..] != stored.shape()[1..] {
        return Err(MetricError::Shape(format!(
            "Incoherent shapes between input {} {:?} and stored {} {:?}",
            input_name,
            incoming.shape(),
            stored_name,
            stored.shape()
        )));
    }
    Ok(())
}

fn stack_batches(batches: &[ArrayD<f32>]) -> Result<ArrayD<f32>, MetricError> {
    let views: Vec<ArrayViewD<f32>> = batches.iter().map(|b| b.view()).collect();
    concatenate(Axis(0), &views).map_err(|e| MetricError::Shape(e.to_string()))
}

/// Metric that buffers `(y_pred, y)` for a whole epoch and evaluates
/// `compute_fn` over the concatenated arrays.
///
/// `O` is the engine output type; it is mapped to a [`StepOutput`] by the
/// output transform (identity by default).
pub struct EpochMetric<O = StepOutput> {
    compute_fn: ComputeFn,
    output_transform: OutputTransform<O>,
    check_compute_fn: bool,
    buffer: EpochBuffer,
}

impl EpochMetric<StepOutput> {
    pub fn new<F>(compute_fn: F) -> Self
    where
        F: Fn(&ArrayD<f32>, &ArrayD<f32>) -> Result<f64> + Send + Sync + 'static,
    {
        Self::from_compute_fn(Arc::new(compute_fn))
    }

    pub(crate) fn from_compute_fn(compute_fn: ComputeFn) -> Self {
        Self {
            compute_fn,
            output_transform: Box::new(identity),
            check_compute_fn: true,
            buffer: EpochBuffer::new(),
        }
    }
}

impl<O> EpochMetric<O> {
    /// Replace the output transform, changing the engine output type the
    /// metric accepts. Anything already buffered is kept.
    pub fn output_transform<P, F>(self, transform: F) -> EpochMetric<P>
    where
        F: Fn(&P) -> StepOutput + Send + Sync + 'static,
    {
        EpochMetric {
            compute_fn: self.compute_fn,
            output_transform: Box::new(transform),
            check_compute_fn: self.check_compute_fn,
            buffer: self.buffer,
        }
    }

    /// Try `compute_fn` on the first batch of every epoch and log a warning if
    /// it fails. Enabled by default.
    pub fn check_compute_fn(mut self, enabled: bool) -> Self {
        self.check_compute_fn = enabled;
        self
    }

    pub fn num_samples(&self) -> usize {
        self.buffer.num_samples()
    }

    pub fn buffer(&self) -> &EpochBuffer {
        &self.buffer
    }
}

impl<O> Metric<O> for EpochMetric<O> {
    fn reset(&mut self) {
        self.buffer.clear();
    }

    fn update(&mut self, output: &O) -> Result<()> {
        let (y_pred, y) = (self.output_transform)(output);
        log::trace!(
            "Buffering batch with y_pred shape {:?} and y shape {:?}",
            y_pred.shape(),
            y.shape()
        );
        self.buffer.push(y_pred, y)?;

        if self.check_compute_fn && self.buffer.num_batches() == 1 {
            let (y_pred, y) = self.buffer.concatenate()?;
            if let Err(e) = (self.compute_fn)(&y_pred, &y) {
                log::warn!("Probably, there can be a problem with `compute_fn`: {}", e);
            }
        }
        Ok(())
    }

    fn compute(&self) -> Result<f64> {
        if self.buffer.is_empty() {
            return Err(MetricError::NotComputable(
                "EpochMetric must have at least one example before it can be computed".to_string(),
            )
            .into());
        }

        let (y_preds, y_targets) = self.buffer.concatenate()?;
        let value = (self.compute_fn)(&y_preds, &y_targets)?;
        log::debug!(
            "Computed epoch metric over {} samples ({} batches): {}",
            self.buffer.num_samples(),
            self.buffer.num_batches(),
            value
        );
        Ok(value)
    }

    fn name(&self) -> &str {
        "epoch_metric"
    }
}
