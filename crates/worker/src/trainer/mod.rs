//! Built-in training task: softmax regression on synthetic 10-class data.
//!
//! Reports `(epoch, mean loss)` after every epoch and returns the test
//! accuracy. CPU-bound work runs on the blocking pool so it never stalls
//! the request-handling threads.

pub mod dataset;
pub mod model;

use std::sync::Arc;
use std::time::Duration;

use hyperlab_core::experiment::ExperimentParams;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::progress::ProgressReporter;
use crate::task::{TaskError, TrainingOutcome, TrainingTask};

use dataset::{Dataset, NUM_CLASSES, NUM_FEATURES};
use model::SoftmaxRegression;

/// Default pause after each epoch, so progress is visible while polling.
const DEFAULT_EPOCH_DELAY_MS: u64 = 250;
const DEFAULT_TRAIN_SAMPLES: usize = 2000;
const DEFAULT_TEST_SAMPLES: usize = 500;
const DEFAULT_SEED: u64 = 42;

/// Salt separating the shuffling stream from the data-generation stream.
const SHUFFLE_SALT: u64 = 0x5eed_cafe;

/// Synthetic trainer configuration.
#[derive(Debug, Clone)]
pub struct TrainerConfig {
    /// Sleep inserted after each epoch.
    pub epoch_delay: Duration,
    pub train_samples: usize,
    pub test_samples: usize,
    /// Seed for data generation and shuffling; equal seeds give equal runs.
    pub seed: u64,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            epoch_delay: Duration::from_millis(DEFAULT_EPOCH_DELAY_MS),
            train_samples: DEFAULT_TRAIN_SAMPLES,
            test_samples: DEFAULT_TEST_SAMPLES,
            seed: DEFAULT_SEED,
        }
    }
}

impl TrainerConfig {
    /// Load configuration from environment variables, falling back to the
    /// defaults for anything missing or unparsable.
    ///
    /// | Env Var                  | Default |
    /// |--------------------------|---------|
    /// | `TRAINER_EPOCH_DELAY_MS` | `250`   |
    /// | `TRAINER_TRAIN_SAMPLES`  | `2000`  |
    /// | `TRAINER_TEST_SAMPLES`   | `500`   |
    /// | `TRAINER_SEED`           | `42`    |
    pub fn from_env() -> Self {
        let delay_ms = env_or("TRAINER_EPOCH_DELAY_MS", DEFAULT_EPOCH_DELAY_MS);
        Self {
            epoch_delay: Duration::from_millis(delay_ms),
            train_samples: env_or("TRAINER_TRAIN_SAMPLES", DEFAULT_TRAIN_SAMPLES),
            test_samples: env_or("TRAINER_TEST_SAMPLES", DEFAULT_TEST_SAMPLES),
            seed: env_or("TRAINER_SEED", DEFAULT_SEED),
        }
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Model plus the RNG driving its shuffles, moved in and out of the
/// blocking pool once per epoch.
struct TrainingState {
    model: SoftmaxRegression,
    rng: StdRng,
}

/// The default [`TrainingTask`].
#[derive(Debug, Clone, Default)]
pub struct SyntheticTrainer {
    config: TrainerConfig,
}

impl SyntheticTrainer {
    pub fn new(config: TrainerConfig) -> Self {
        Self { config }
    }
}

impl TrainingTask for SyntheticTrainer {
    async fn run(
        &self,
        params: ExperimentParams,
        mut progress: ProgressReporter,
    ) -> Result<TrainingOutcome, TaskError> {
        let batch_size = usize::try_from(params.batch_size)
            .map_err(|_| TaskError::Failed(format!("invalid batch size {}", params.batch_size)))?;
        let lr = params.lr;
        let seed = self.config.seed;
        let (train_samples, test_samples) = (self.config.train_samples, self.config.test_samples);
        if train_samples == 0 || test_samples == 0 {
            return Err(TaskError::Failed(format!(
                "empty dataset split (train {train_samples}, test {test_samples})"
            )));
        }

        let (train, test) = tokio::task::spawn_blocking(move || {
            let mut rng = StdRng::seed_from_u64(seed);
            Dataset::generate_split(&mut rng, train_samples, test_samples)
        })
        .await?;
        let train = Arc::new(train);

        let mut state = TrainingState {
            model: SoftmaxRegression::new(NUM_FEATURES, NUM_CLASSES),
            rng: StdRng::seed_from_u64(seed ^ SHUFFLE_SALT),
        };

        for epoch in 1..=params.epochs {
            let data = Arc::clone(&train);
            let (next, loss) = tokio::task::spawn_blocking(move || {
                let mut state = state;
                let loss = state
                    .model
                    .train_epoch(&data, batch_size, lr, &mut state.rng);
                (state, loss)
            })
            .await?;
            state = next;

            if !loss.is_finite() {
                return Err(TaskError::Failed(format!("loss diverged at epoch {epoch}")));
            }
            progress.report(epoch, round_to(loss, 4)).await?;
            tracing::debug!(epoch, loss, "Epoch finished");

            if !self.config.epoch_delay.is_zero() {
                tokio::time::sleep(self.config.epoch_delay).await;
            }
        }

        let model = state.model;
        let accuracy = tokio::task::spawn_blocking(move || model.accuracy(&test)).await?;
        Ok(TrainingOutcome {
            accuracy: round_to(accuracy, 4),
        })
    }
}

/// Round to `places` decimal places.
fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
