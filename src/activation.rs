//! Activation functions applied to epoch predictions before scoring.
//!
//! Built-in activations are plain enum variants so they can be named in a
//! configuration file. Anything else can be supplied as a closure through
//! [`Activation::custom`].

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::Result;
use ndarray::{ArrayD, Axis};
use serde::{Deserialize, Serialize};

use crate::error::MetricError;

/// User-supplied activation. May fail, in which case the error is returned as-is.
pub type ActivationFn = Arc<dyn Fn(ArrayD<f32>) -> Result<ArrayD<f32>> + Send + Sync>;

#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    /// Elementwise logistic function, for models returning logits.
    Sigmoid,
    /// Softmax over the last axis (over the whole array for 1-D input).
    Softmax,
    Tanh,
    #[serde(skip)]
    Custom(ActivationFn),
}

impl Activation {
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(ArrayD<f32>) -> Result<ArrayD<f32>> + Send + Sync + 'static,
    {
        Activation::Custom(Arc::new(f))
    }

    /// Apply the activation, consuming the input array.
    pub fn apply(&self, x: ArrayD<f32>) -> Result<ArrayD<f32>> {
        match self {
            Activation::Sigmoid => Ok(x.mapv_into(sigmoid)),
            Activation::Tanh => Ok(x.mapv_into(f32::tanh)),
            Activation::Softmax => Ok(softmax(x)),
            Activation::Custom(f) => f(x),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Activation::Sigmoid => "sigmoid",
            Activation::Softmax => "softmax",
            Activation::Tanh => "tanh",
            Activation::Custom(_) => "custom",
        }
    }
}

#[inline]
fn sigmoid(v: f32) -> f32 {
    1.0 / (1.0 + (-v).exp())
}

fn softmax(mut x: ArrayD<f32>) -> ArrayD<f32> {
    if x.ndim() < 2 {
        normalize_exp(x.view_mut());
        return x;
    }
    let last = Axis(x.ndim() - 1);
    for lane in x.lanes_mut(last) {
        normalize_exp(lane);
    }
    x
}

fn normalize_exp<D: ndarray::Dimension>(mut values: ndarray::ArrayViewMut<f32, D>) {
    let max = values.fold(f32::NEG_INFINITY, |m, &v| m.max(v));
    values.mapv_inplace(|v| (v - max).exp());
    let sum = values.sum();
    if sum > 0.0 {
        values.mapv_inplace(|v| v / sum);
    }
}

impl fmt::Debug for Activation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Activation::Custom(_) => write!(f, "Custom(<fn>)"),
            other => write!(f, "{}", other.name()),
        }
    }
}

impl FromStr for Activation {
    type Err = MetricError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sigmoid" => Ok(Activation::Sigmoid),
            "softmax" => Ok(Activation::Softmax),
            "tanh" => Ok(Activation::Tanh),
            _ => Err(MetricError::Config(format!(
                "Unknown activation: {}. Expected one of sigmoid, softmax, tanh",
                s
            ))),
        }
    }
}
