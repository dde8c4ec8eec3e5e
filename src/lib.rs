//! redeem-metrics: epoch-level evaluation metrics for training loops.
//!
//! Metrics buffer per-batch predictions and targets for a whole epoch and
//! evaluate a single scoring function over the concatenated arrays when the
//! epoch ends. The crate ships a generic lambda metric, a multi-label Hamming
//! loss, the epoch accumulator both are built on, and a small engine that
//! drives attached metrics across epochs.
//!
//! The multi-label scoring backend sits behind the `multilabel` feature
//! (enabled by default) so builds that do not need it can leave it out.
pub mod activation;
pub mod config;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod scoring;

pub use activation::Activation;
pub use config::{EngineConfig, MetricConfig, MetricType};
pub use engine::{Engine, State};
pub use error::MetricError;
pub use metrics::{EpochMetric, HammingLoss, LambdaEpochMetric, Metric, StepOutput};
