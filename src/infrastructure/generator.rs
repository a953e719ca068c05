//! Synthetic training curves for demos
//!
//! Produces loss/accuracy points shaped like a real training run. Purely a
//! producer: every point goes through `IngestionGateway::ingest`.

use crate::core::RawPoint;
use crate::hot_path::IngestionGateway;
use crate::infrastructure::config::{DemoConfig, DemoModel};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::Level;

/// Steps over which the curves flatten out
const CURVE_HORIZON: f64 = 15000.0;

pub const TRAIN_LOSS: &str = "trainLoss";
pub const VALID_LOSS: &str = "validLoss";
pub const VALID_ACCURACY: &str = "validAccuracy";

/// Noisy `-ln(progress)` loss curve
fn loss_at(step: u64, noise: f64) -> f64 {
    let fraction = (step + 1) as f64 / CURVE_HORIZON;
    -fraction.ln() + (noise - 0.5)
}

/// Noisy linear accuracy ramp
fn accuracy_at(step: u64, noise: f64) -> f64 {
    let fraction = (step + 1) as f64 / CURVE_HORIZON;
    fraction + (noise - 0.5) * 0.3
}

pub struct DemoGenerator {
    gateway: Arc<IngestionGateway>,
    config: DemoConfig,
}

impl DemoGenerator {
    pub fn new(gateway: Arc<IngestionGateway>, config: DemoConfig) -> Self {
        Self { gateway, config }
    }

    /// Ingest one step of `model` with noise offset `bias`
    ///
    /// Every step gets a train loss. Every `validation_interval`-th non-zero
    /// step also gets validation loss and accuracy. Returns the number of
    /// points accepted.
    pub fn emit_step<R: Rng>(
        &self,
        rng: &mut R,
        model: &DemoModel,
        bias: f64,
        step: u64,
    ) -> usize {
        let mut points = Vec::with_capacity(3);
        let train_noise = rng.gen::<f64>() + bias;
        points.push((TRAIN_LOSS, loss_at(step, train_noise)));

        let interval = self.config.validation_interval;
        if interval > 0 && step != 0 && step % interval == 0 {
            let valid_noise = rng.gen::<f64>() + bias + 0.2;
            let accuracy_noise = rng.gen::<f64>() + bias;
            points.push((VALID_LOSS, loss_at(step, valid_noise)));
            points.push((VALID_ACCURACY, accuracy_at(step, accuracy_noise)));
        }

        let mut accepted = 0;
        for (kind, value) in points {
            match self.gateway.ingest(RawPoint::new(&model.name, kind, value, step as i64)) {
                Ok(_) => accepted += 1,
                Err(e) => {
                    crate::log_ingest!(
                        Level::WARN,
                        model = %model.name,
                        "Demo point rejected: {}",
                        e
                    );
                }
            }
        }
        accepted
    }

    /// Generate `backfill_steps` steps for every model, interleaved by step
    pub fn backfill(&self) -> usize {
        let mut rng = StdRng::from_entropy();
        let mut accepted = 0;
        for step in 0..self.config.backfill_steps {
            for model in &self.config.models {
                accepted += self.emit_step(&mut rng, model, model.backfill_bias(), step);
            }
        }
        crate::log_ingest!(
            Level::INFO,
            "Backfilled {} demo points across {} models",
            accepted,
            self.config.models.len()
        );
        accepted
    }

    /// Start one ticker task per model, continuing after the backfill
    pub fn spawn(self: Arc<Self>) -> Vec<JoinHandle<()>> {
        (0..self.config.models.len())
            .map(|index| {
                let generator = self.clone();
                tokio::spawn(async move { generator.run_model(index).await })
            })
            .collect()
    }

    async fn run_model(&self, index: usize) {
        let model = &self.config.models[index];
        let mut rng = StdRng::from_entropy();
        let mut ticker = tokio::time::interval(Duration::from_millis(model.rate_ms.max(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        crate::log_ingest!(
            Level::INFO,
            model = %model.name,
            "Demo ticker every {}ms",
            model.rate_ms
        );

        let mut step = self.config.backfill_steps;
        loop {
            ticker.tick().await;
            self.emit_step(&mut rng, model, model.bias, step);
            step += 1;
        }
    }
}
