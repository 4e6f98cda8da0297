//! Run settings loaded from a JSON document.
//!
//! Every key is optional. Missing keys fall back to the defaults of
//! [`Settings::default`], so `{}` is a valid (if not very useful) settings file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::data::SplitFractions;
use crate::errors::ModelError;

/// Flat settings record for a training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Path of the delimited CSV file.
    pub data_path: PathBuf,
    /// CSV field delimiter.
    pub delimiter: char,
    pub train_batch_size: usize,
    pub val_batch_size: usize,
    pub test_batch_size: usize,
    pub train_frac: f64,
    pub val_frac: f64,
    pub test_frac: f64,
    /// Initial learning rate.
    pub lr: f64,
    pub epochs: usize,
    /// Number of epochs between two validation passes.
    pub epochs_per_val: usize,
    /// Number of epochs between two learning-rate decays.
    pub scheduler_step_size: usize,
    /// Multiplicative learning-rate decay factor.
    pub scheduler_gamma: f64,
    /// Fraction of the CSV rows to keep before splitting.
    pub data_portion: f64,
    /// Whether feature columns are standardized before training.
    pub standardize: bool,
    /// Seed for sampling, splitting and shuffling. Non-deterministic when absent.
    pub seed: Option<u64>,
    /// Widths of the hidden layers.
    pub hidden_sizes: Vec<usize>,
    /// Dropout probability applied after each hidden layer during training.
    pub dropout: f64,
    /// Path stem for the persisted weights and standardizer.
    pub model_path: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_path: PathBuf::new(),
            delimiter: ';',
            train_batch_size: 32,
            val_batch_size: 32,
            test_batch_size: 32,
            train_frac: 0.8,
            val_frac: 0.1,
            test_frac: 0.1,
            lr: 0.001,
            epochs: 3,
            epochs_per_val: 3,
            scheduler_step_size: 10,
            scheduler_gamma: 0.1,
            data_portion: 1.0,
            standardize: true,
            seed: None,
            hidden_sizes: vec![10],
            dropout: 0.2,
            model_path: PathBuf::from("model"),
        }
    }
}

impl Settings {
    /// Parses settings from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, ModelError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a JSON settings file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Returns the train/validation/test fractions.
    pub fn fractions(&self) -> SplitFractions {
        SplitFractions::new(self.train_frac, self.val_frac, self.test_frac)
    }

    /// Path of the persisted weights, without the recorder's extension.
    pub fn weights_path(&self) -> PathBuf {
        self.model_path.clone()
    }

    /// Path of the persisted standardizer.
    pub fn standardizer_path(&self) -> PathBuf {
        self.model_path.with_extension("scaler.json")
    }

    /// Delimiter as the byte expected by the CSV reader.
    pub fn delimiter_byte(&self) -> Result<u8, ModelError> {
        if self.delimiter.is_ascii() {
            Ok(self.delimiter as u8)
        } else {
            Err(ModelError::InvalidDelimiter {
                delimiter: self.delimiter,
            })
        }
    }
}
