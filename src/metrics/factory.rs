use anyhow::Result;

use crate::config::{MetricConfig, MetricType};
use crate::metrics::{HammingLoss, Metric, StepOutput};

/// Build the metric described by `config`, ready to attach to an engine
/// producing `StepOutput`.
///
/// Fails when the metric cannot be constructed in this build (missing
/// scoring backend) or its parameters are invalid.
pub fn build_metric(config: &MetricConfig) -> Result<Box<dyn Metric<StepOutput>>> {
    match &config.metric_type {
        MetricType::HammingLoss {
            threshold,
            activation,
        } => {
            let metric = HammingLoss::with_params(activation.clone(), *threshold)?
                .check_compute_fn(config.check_compute_fn);
            Ok(Box::new(metric))
        }
    }
}

/// Build every configured metric, keyed by its configured name.
pub fn build_metrics(configs: &[MetricConfig]) -> Result<Vec<(String, Box<dyn Metric<StepOutput>>)>> {
    configs
        .iter()
        .map(|config| -> Result<(String, Box<dyn Metric<StepOutput>>)> {
            Ok((config.name.clone(), build_metric(config)?))
        })
        .collect()
}
