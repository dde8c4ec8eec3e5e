//! Tracks a multi-label Hamming loss and a custom mean-probability metric over
//! a few epochs of synthetic logits.
//!
//! Run with `REDEEM_LOG=info cargo run --example multilabel_epoch`.

use anyhow::Result;
use log::LevelFilter;
use ndarray::{Array2, ArrayD};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use redeem_metrics::config::{EngineConfig, MetricConfig};
use redeem_metrics::metrics::factory;
use redeem_metrics::{Activation, Engine, LambdaEpochMetric, StepOutput};

const N_LABELS: usize = 4;
const BATCH_SIZE: usize = 16;

fn synthetic_batches(n_batches: usize, rng: &mut StdRng) -> Vec<StepOutput> {
    (0..n_batches)
        .map(|_| {
            let labels = Array2::from_shape_fn((BATCH_SIZE, N_LABELS), |_| {
                if rng.gen_bool(0.3) { 1.0f32 } else { 0.0 }
            });
            // noisy logits leaning towards the true label
            let logits = labels.mapv(|y| (y * 2.0 - 1.0) * 1.5 + rng.gen_range(-2.0f32..2.0));
            (logits.into_dyn(), labels.into_dyn())
        })
        .collect()
}

fn mean_value(y_pred: &ArrayD<f32>, _y: &ArrayD<f32>) -> Result<f64> {
    Ok(y_pred.mean().unwrap_or(0.0) as f64)
}

fn main() -> Result<()> {
    env_logger::Builder::default()
        .filter_level(LevelFilter::Error)
        .parse_env(env_logger::Env::default().filter_or("REDEEM_LOG", "error,redeem_metrics=info"))
        .init();

    let mut rng = StdRng::seed_from_u64(2024);
    let data = synthetic_batches(8, &mut rng);

    let config: MetricConfig = serde_json::from_str(
        r#"{ "name": "hamming", "HammingLoss": { "threshold": 0.5, "activation": "sigmoid" } }"#,
    )?;

    let mut engine = Engine::new(|out: &StepOutput| Ok(out.clone()), EngineConfig::new().max_epochs(3))
        .attach_boxed(config.name.clone(), factory::build_metric(&config)?)
        .attach(
            "mean_probability",
            LambdaEpochMetric::with_activation(mean_value, Activation::Sigmoid),
        );

    let state = engine.run(&data)?;
    let mut names: Vec<&String> = state.metrics.keys().collect();
    names.sort();
    for name in names {
        println!("{}: {:.4}", name, state.metrics[name]);
    }

    Ok(())
}
