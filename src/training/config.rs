//! Training configuration.

use std::path::PathBuf;

use crate::settings::Settings;

/// Configuration for model training.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingConfig {
    /// Number of training epochs.
    pub epochs: usize,
    /// Initial learning rate for the optimizer.
    pub learning_rate: f64,
    /// Number of epochs between two learning-rate decays (0 disables decay).
    pub scheduler_step_size: usize,
    /// Learning-rate decay factor.
    pub scheduler_gamma: f64,
    /// Number of epochs between two validation passes.
    pub epochs_per_val: usize,
    /// Whether to log a summary after every epoch.
    pub verbose: bool,
    /// Where to write the loss/accuracy chart once training is done.
    pub plot_path: Option<PathBuf>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            epochs: 3,
            learning_rate: 0.001,
            scheduler_step_size: 10,
            scheduler_gamma: 0.1,
            epochs_per_val: 3,
            verbose: true,
            plot_path: None,
        }
    }
}

impl From<&Settings> for TrainingConfig {
    fn from(settings: &Settings) -> Self {
        Self {
            epochs: settings.epochs,
            learning_rate: settings.lr,
            scheduler_step_size: settings.scheduler_step_size,
            scheduler_gamma: settings.scheduler_gamma,
            epochs_per_val: settings.epochs_per_val,
            ..Self::default()
        }
    }
}

impl TrainingConfig {
    /// Creates a new TrainingConfig with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of epochs.
    pub fn epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs;
        self
    }

    /// Sets the initial learning rate.
    pub fn learning_rate(mut self, lr: f64) -> Self {
        self.learning_rate = lr;
        self
    }

    /// Sets the step-decay schedule.
    pub fn scheduler(mut self, step_size: usize, gamma: f64) -> Self {
        self.scheduler_step_size = step_size;
        self.scheduler_gamma = gamma;
        self
    }

    /// Sets the validation cadence.
    pub fn epochs_per_val(mut self, epochs: usize) -> Self {
        self.epochs_per_val = epochs;
        self
    }

    /// Sets whether to log progress.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Sets the chart written after training.
    pub fn plot_path(mut self, path: Option<PathBuf>) -> Self {
        self.plot_path = path;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TrainingConfig::default();
        assert_eq!(config.epochs, 3);
        assert!((config.learning_rate - 0.001).abs() < 1e-10);
        assert_eq!(config.scheduler_step_size, 10);
        assert_eq!(config.epochs_per_val, 3);
        assert!(config.plot_path.is_none());
    }

    #[test]
    fn test_config_builder() {
        let config = TrainingConfig::new()
            .epochs(50)
            .learning_rate(0.01)
            .scheduler(5, 0.5)
            .epochs_per_val(2)
            .verbose(false);

        assert_eq!(config.epochs, 50);
        assert!((config.learning_rate - 0.01).abs() < 1e-10);
        assert_eq!(config.scheduler_step_size, 5);
        assert!((config.scheduler_gamma - 0.5).abs() < 1e-10);
        assert_eq!(config.epochs_per_val, 2);
        assert!(!config.verbose);
    }

    #[test]
    fn test_from_settings() {
        let settings = Settings {
            epochs: 12,
            lr: 0.05,
            scheduler_step_size: 4,
            scheduler_gamma: 0.3,
            epochs_per_val: 1,
            ..Settings::default()
        };
        let config = TrainingConfig::from(&settings);

        assert_eq!(config.epochs, 12);
        assert!((config.learning_rate - 0.05).abs() < 1e-10);
        assert_eq!(config.scheduler_step_size, 4);
        assert!((config.scheduler_gamma - 0.3).abs() < 1e-10);
        assert_eq!(config.epochs_per_val, 1);
        assert!(config.verbose);
    }
}
