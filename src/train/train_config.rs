use serde::{Serialize, Deserialize};

use crate::error::{Error, Result};

/// Hyperparameters for a `Trainer` run.
///
/// # Fields
/// - `epochs`: fixed number of passes; there is no early stopping
/// - `training_split`: fraction of `load_data()` input kept for training,
///   the rest becomes the validation split
/// - `batch_size`: samples per mini-batch; use `1` for online SGD
/// - `learning_rate`: base rate, decayed per epoch
/// - `learning_rate_decay`: epoch `n` trains at `rate / (1 + decay · n)`
/// - `momentum`: velocity carry-over between batches
/// - `regularization`: L2 coefficient, applied as multiplicative decay
/// - `threads`: bounds per-sample parallelism; `None` uses the
///   global rayon pool
/// - `seed`: seeds weight init, splitting and shuffling
/// - `show_progress`: draw the line-overwriting progress indicator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    pub epochs: usize,
    pub training_split: f64,
    pub batch_size: usize,
    pub learning_rate: f64,
    pub learning_rate_decay: f64,
    pub momentum: f64,
    pub regularization: f64,
    pub threads: Option<usize>,
    pub seed: Option<u64>,
    pub show_progress: bool,
}

impl Default for TrainConfig {
    fn default() -> Self {
        TrainConfig {
            epochs: 50,
            training_split: 0.8,
            batch_size: 32,
            learning_rate: 0.05,
            learning_rate_decay: 0.075,
            momentum: 0.9,
            regularization: 0.1,
            threads: None,
            seed: None,
            show_progress: false,
        }
    }
}

impl TrainConfig {
    /// Creates a config with plain SGD (no momentum, decay or regularization).
    pub fn new(epochs: usize, batch_size: usize, learning_rate: f64) -> Self {
        TrainConfig {
            epochs,
            batch_size,
            learning_rate,
            learning_rate_decay: 0.0,
            momentum: 0.0,
            regularization: 0.0,
            ..TrainConfig::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.epochs == 0 {
            return Err(Error::Configuration("epochs must be at least 1".into()));
        }
        if self.batch_size == 0 {
            return Err(Error::Configuration("batch_size must be at least 1".into()));
        }
        if !(0.0..=1.0).contains(&self.training_split) {
            return Err(Error::Configuration(format!(
                "training_split must lie in [0, 1], got {}",
                self.training_split
            )));
        }
        if self.threads == Some(0) {
            return Err(Error::Configuration("threads must be at least 1".into()));
        }
        for (name, value) in [
            ("learning_rate", self.learning_rate),
            ("learning_rate_decay", self.learning_rate_decay),
            ("momentum", self.momentum),
            ("regularization", self.regularization),
        ] {
            if !value.is_finite() {
                return Err(Error::Configuration(format!("{name} must be finite, got {value}")));
            }
        }
        Ok(())
    }

    pub fn save_json(&self, path: &str) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Missing fields fall back to `TrainConfig::default()`.
    pub fn load_json(path: &str) -> Result<TrainConfig> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        let config: TrainConfig = serde_json::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }
}
