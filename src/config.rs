use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::activation::Activation;
use crate::error::MetricError;
use crate::metrics::hamming::DEFAULT_THRESHOLD;

/// Configuration for a metric built through [`crate::metrics::factory`].
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct MetricConfig {
    /// Name the metric is reported under by the engine.
    pub name: String,

    #[serde(default = "default_check_compute_fn")]
    pub check_compute_fn: bool,

    #[serde(flatten)]
    pub metric_type: MetricType,
}

/// Supported configurable metrics and their parameters.
///
/// `LambdaEpochMetric` is not listed: it needs a scoring function, which
/// cannot come from a configuration file.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub enum MetricType {
    HammingLoss {
        #[serde(default = "default_threshold")]
        threshold: f32,
        #[serde(default)]
        activation: Option<Activation>,
    },
}

fn default_check_compute_fn() -> bool {
    true
}

fn default_threshold() -> f32 {
    DEFAULT_THRESHOLD
}

impl Default for MetricType {
    fn default() -> Self {
        MetricType::HammingLoss {
            threshold: DEFAULT_THRESHOLD,
            activation: None,
        }
    }
}

impl FromStr for MetricType {
    type Err = MetricError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "hamming_loss" | "hamming" => Ok(MetricType::default()),
            _ => Err(MetricError::Config(format!(
                "Unknown metric type: {}. Expected hamming_loss",
                s
            ))),
        }
    }
}

impl MetricConfig {
    pub fn new(name: impl Into<String>, metric_type: MetricType) -> Self {
        Self {
            name: name.into(),
            check_compute_fn: true,
            metric_type,
        }
    }
}

impl Default for MetricConfig {
    fn default() -> Self {
        Self::new("hamming_loss", MetricType::default())
    }
}

/// Engine configuration.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct EngineConfig {
    pub max_epochs: usize,
    /// Log a progress line every `n` iterations; `0` disables it.
    pub log_every_n_steps: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_epochs: 1,
            log_every_n_steps: 50,
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_epochs(mut self, epochs: usize) -> Self {
        self.max_epochs = epochs;
        self
    }

    pub fn log_every_n_steps(mut self, n: usize) -> Self {
        self.log_every_n_steps = n;
        self
    }
}
