//! Minimal epoch runner driving attached metrics.
//!
//! The engine runs a process function over every batch for a number of
//! epochs. Attached metrics are reset when an epoch starts, updated with each
//! process output, and computed when the epoch ends; their values are stored
//! in [`State`] under the name they were attached with.

use std::collections::HashMap;

use anyhow::{Context, Result};

use crate::config::EngineConfig;
use crate::metrics::Metric;

/// Run state exposed after (and between) epochs.
#[derive(Debug, Clone, Default)]
pub struct State {
    /// Last completed epoch, starting at 1.
    pub epoch: usize,
    /// Total number of processed batches across all epochs.
    pub iteration: usize,
    /// Metric values of the last completed epoch.
    pub metrics: HashMap<String, f64>,
    /// Metric values of every completed epoch, in order.
    pub history: Vec<HashMap<String, f64>>,
}

pub struct Engine<B, O> {
    process_fn: Box<dyn FnMut(&B) -> Result<O>>,
    metrics: Vec<(String, Box<dyn Metric<O>>)>,
    config: EngineConfig,
    state: State,
}

impl<B, O> Engine<B, O> {
    pub fn new<F>(process_fn: F, config: EngineConfig) -> Self
    where
        F: FnMut(&B) -> Result<O> + 'static,
    {
        Self {
            process_fn: Box::new(process_fn),
            metrics: Vec::new(),
            config,
            state: State::default(),
        }
    }

    /// Attach `metric`; its epoch value is reported under `name`.
    pub fn attach(self, name: impl Into<String>, metric: impl Metric<O> + 'static) -> Self {
        self.attach_boxed(name, Box::new(metric))
    }

    pub fn attach_boxed(mut self, name: impl Into<String>, metric: Box<dyn Metric<O>>) -> Self {
        self.metrics.push((name.into(), metric));
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    /// Run `config.max_epochs` epochs over `data`.
    ///
    /// The first error from the process function or from a metric aborts the
    /// run; metric values of epochs completed before it stay in the state.
    pub fn run(&mut self, data: &[B]) -> Result<&State> {
        self.state = State::default();

        for epoch in 1..=self.config.max_epochs {
            self.run_epoch(epoch, data)?;
        }

        Ok(&self.state)
    }

    fn run_epoch(&mut self, epoch: usize, data: &[B]) -> Result<()> {
        for (_, metric) in self.metrics.iter_mut() {
            metric.reset();
        }

        for (batch_idx, batch) in data.iter().enumerate() {
            self.state.iteration += 1;
            let output = (self.process_fn)(batch)
                .with_context(|| format!("process function failed at epoch {} batch {}", epoch, batch_idx))?;

            for (_, metric) in self.metrics.iter_mut() {
                metric.update(&output)?;
            }

            let n = self.config.log_every_n_steps;
            if n > 0 && self.state.iteration % n == 0 {
                log::debug!("Epoch {} iteration {}", epoch, self.state.iteration);
            }
        }

        let mut values = HashMap::with_capacity(self.metrics.len());
        for (name, metric) in self.metrics.iter() {
            values.insert(name.clone(), metric.compute()?);
        }

        let mut summary: Vec<String> = values.iter().map(|(k, v)| format!("{}: {:.4}", k, v)).collect();
        summary.sort();
        log::info!(
            "Epoch [{}/{}] {}",
            epoch,
            self.config.max_epochs,
            summary.join(", ")
        );

        self.state.epoch = epoch;
        self.state.history.push(values.clone());
        self.state.metrics = values;
        Ok(())
    }
}
