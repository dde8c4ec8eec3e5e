//! Integration tests for the lambda epoch metric.

use std::fmt;

use anyhow::Result;
use ndarray::{arr1, arr2, ArrayD};
use redeem_metrics::{Activation, LambdaEpochMetric, Metric, MetricError};

fn batch(p: &[[f32; 2]], t: &[[f32; 2]]) -> (ArrayD<f32>, ArrayD<f32>) {
    (arr2(p).into_dyn(), arr2(t).into_dyn())
}

// ---------------------------------------------------------------------------
// Delegation
// ---------------------------------------------------------------------------

#[test]
fn constant_metric_fn_always_returns_its_value() {
    let mut metric = LambdaEpochMetric::new(|_, _| Ok(0.0));
    metric.update(&batch(&[[0.3, 9.0]], &[[1.0, 0.0]])).unwrap();
    metric.update(&batch(&[[-4.0, 2.5], [7.0, 1.0]], &[[0.0, 0.0], [1.0, 1.0]])).unwrap();
    assert_eq!(metric.compute().unwrap(), 0.0);
}

#[test]
fn metric_fn_sees_whole_epoch() {
    let mut metric = LambdaEpochMetric::new(|p, t| {
        assert_eq!(p.shape(), t.shape());
        Ok(p.shape()[0] as f64)
    });
    metric.update(&batch(&[[0.0, 0.0]], &[[0.0, 0.0]])).unwrap();
    metric.update(&batch(&[[0.0, 0.0], [1.0, 1.0]], &[[0.0, 0.0], [1.0, 1.0]])).unwrap();
    metric.update(&batch(&[[0.0, 0.0]], &[[0.0, 0.0]])).unwrap();

    assert_eq!(metric.num_samples(), 4);
    assert_eq!(metric.compute().unwrap(), 4.0);
}

#[test]
fn compute_returns_a_scalar_for_flat_arrays() {
    let mut metric = LambdaEpochMetric::new(|p, t| {
        let correct = p.iter().zip(t.iter()).filter(|(a, b)| a == b).count();
        Ok(correct as f64 / p.len() as f64)
    });
    metric
        .update(&(arr1(&[1.0f32, 0.0, 1.0]).into_dyn(), arr1(&[1.0f32, 1.0, 1.0]).into_dyn()))
        .unwrap();
    let value = metric.compute().unwrap();
    assert!((value - 2.0 / 3.0).abs() < 1e-12);
}

// ---------------------------------------------------------------------------
// Activation
// ---------------------------------------------------------------------------

#[test]
fn activation_is_applied_before_metric_fn() {
    let min_pred = |p: &ArrayD<f32>, _: &ArrayD<f32>| -> Result<f64> {
        Ok(p.iter().copied().fold(f32::INFINITY, f32::min) as f64)
    };

    let mut raw = LambdaEpochMetric::new(min_pred);
    let mut activated = LambdaEpochMetric::with_activation(min_pred, Activation::Sigmoid);

    let output = batch(&[[-3.0, 0.0]], &[[0.0, 1.0]]);
    raw.update(&output).unwrap();
    activated.update(&output).unwrap();

    assert_eq!(raw.compute().unwrap(), -3.0);
    let v = activated.compute().unwrap();
    assert!(v > 0.0 && v < 0.1, "sigmoid(-3) should be ~0.047, got {}", v);
}

#[test]
fn custom_activation_error_propagates() {
    let activation = Activation::custom(|_| Err(anyhow::anyhow!("activation exploded")));
    let mut metric = LambdaEpochMetric::with_activation(|_, _| Ok(1.0), activation).check_compute_fn(false);
    metric.update(&batch(&[[0.0, 0.0]], &[[0.0, 0.0]])).unwrap();
    let err = metric.compute().unwrap_err();
    assert_eq!(err.to_string(), "activation exploded");
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, PartialEq)]
struct ScoringFailure(usize);

impl fmt::Display for ScoringFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "scoring failed on {} samples", self.0)
    }
}

impl std::error::Error for ScoringFailure {}

#[test]
fn metric_fn_error_is_returned_untranslated() {
    let mut metric = LambdaEpochMetric::new(|p, _| Err(ScoringFailure(p.shape()[0]).into()));
    metric.update(&batch(&[[0.0, 1.0], [1.0, 0.0]], &[[0.0, 1.0], [1.0, 0.0]])).unwrap();

    let err = metric.compute().unwrap_err();
    assert_eq!(err.downcast_ref::<ScoringFailure>(), Some(&ScoringFailure(2)));
}

#[test]
fn compute_before_update_is_not_computable() {
    let metric = LambdaEpochMetric::new(|_, _| Ok(0.0));
    let err = metric.compute().unwrap_err();
    assert!(matches!(
        err.downcast_ref::<MetricError>(),
        Some(MetricError::NotComputable(_))
    ));
}

#[test]
fn mismatched_sample_counts_are_rejected() {
    let mut metric = LambdaEpochMetric::new(|_, _| Ok(0.0));
    let output = (arr1(&[0.0f32, 1.0]).into_dyn(), arr1(&[0.0f32, 1.0, 1.0]).into_dyn());
    let err = metric.update(&output).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<MetricError>(),
        Some(MetricError::Shape(_))
    ));
}

// ---------------------------------------------------------------------------
// Output transform
// ---------------------------------------------------------------------------

struct TwoHeadOutput {
    head_a: ArrayD<f32>,
    head_b: ArrayD<f32>,
    labels: ArrayD<f32>,
}

#[test]
fn output_transform_selects_one_head() {
    let mut metric = LambdaEpochMetric::new(|p, _| Ok(p.sum() as f64))
        .output_transform(|out: &TwoHeadOutput| (out.head_b.clone(), out.labels.clone()));

    let output = TwoHeadOutput {
        head_a: arr1(&[100.0f32, 100.0]).into_dyn(),
        head_b: arr1(&[1.0f32, 2.0]).into_dyn(),
        labels: arr1(&[0.0f32, 1.0]).into_dyn(),
    };
    metric.update(&output).unwrap();

    assert_eq!(output.head_a.len(), 2);
    assert_eq!(metric.compute().unwrap(), 3.0);
}

#[test]
fn reset_starts_a_new_epoch() {
    let mut metric = LambdaEpochMetric::new(|p, _| Ok(p.len() as f64));
    metric.update(&batch(&[[1.0, 1.0]], &[[1.0, 1.0]])).unwrap();
    assert_eq!(metric.compute().unwrap(), 2.0);

    metric.reset();
    metric.update(&batch(&[[1.0, 1.0], [0.0, 0.0]], &[[1.0, 1.0], [0.0, 0.0]])).unwrap();
    assert_eq!(metric.compute().unwrap(), 4.0);
}
