use std::error::Error;
use std::fmt;

/// Errors raised by the metric adapters and the epoch accumulator.
///
/// Errors produced by user-supplied scoring or activation functions are not
/// wrapped in this type; they are returned to the caller unchanged.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricError {
    /// A scoring backend required by the metric is not compiled in.
    MissingDependency(String),
    /// Prediction/target arrays have incompatible shapes or ranks.
    Shape(String),
    /// `compute` was called before any example was buffered.
    NotComputable(String),
    /// Invalid configuration value.
    Config(String),
}

impl fmt::Display for MetricError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MetricError::MissingDependency(msg) => write!(f, "Missing dependency: {}", msg),
            MetricError::Shape(msg) => write!(f, "Shape mismatch: {}", msg),
            MetricError::NotComputable(msg) => write!(f, "Not computable: {}", msg),
            MetricError::Config(msg) => write!(f, "Invalid configuration: {}", msg),
        }
    }
}

impl Error for MetricError {}
