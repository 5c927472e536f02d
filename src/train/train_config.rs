use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{NnError, Result};

/// Configuration for a `train_loop` run.
///
/// # Fields
/// - `epochs`     — total number of full passes over the training data
/// - `batch_size` — examples whose deltas are accumulated before each
///                  `update_weights`; `1` updates after every example
/// - `shuffle`    — visit examples in a fresh random order each epoch
/// - `seed`       — seed for the shuffle order; random when absent
/// - `log_every`  — emit a progress line every this many epochs (`0` = never)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    pub epochs: usize,
    pub batch_size: usize,
    pub shuffle: bool,
    pub seed: Option<u64>,
    pub log_every: usize,
}

impl Default for TrainConfig {
    fn default() -> Self {
        TrainConfig {
            epochs: 5000,
            batch_size: 1,
            shuffle: false,
            seed: None,
            log_every: 250,
        }
    }
}

impl TrainConfig {
    pub fn new(epochs: usize, batch_size: usize) -> Self {
        TrainConfig {
            epochs,
            batch_size,
            ..TrainConfig::default()
        }
    }

    pub fn load_json(path: impl AsRef<Path>) -> Result<TrainConfig> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(NnError::Configuration("batch_size must be at least 1".into()));
        }
        Ok(())
    }
}
