//! Per-epoch training metrics.

use std::path::Path;

use crate::errors::ModelError;

/// Mean loss and accuracy over the batches of one pass.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EvalMetrics {
    pub loss: f64,
    pub accuracy: f64,
}

impl EvalMetrics {
    /// Averages accumulated per-batch sums; zero batches give zeros.
    pub fn from_sums(loss_sum: f64, accuracy_sum: f64, batches: usize) -> Self {
        if batches == 0 {
            return Self::default();
        }
        Self {
            loss: loss_sum / batches as f64,
            accuracy: accuracy_sum / batches as f64,
        }
    }
}

/// Latest train/validation metrics and their history, one entry per epoch.
///
/// The four histories always have the same length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricsRecorder {
    pub train_loss: f64,
    pub train_acc: f64,
    pub val_loss: f64,
    pub val_acc: f64,

    train_loss_history: Vec<f64>,
    train_acc_history: Vec<f64>,
    val_loss_history: Vec<f64>,
    val_acc_history: Vec<f64>,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the metrics of one epoch.
    pub fn record(&mut self, train_loss: f64, train_acc: f64, val_loss: f64, val_acc: f64) {
        self.train_loss = train_loss;
        self.train_acc = train_acc;
        self.val_loss = val_loss;
        self.val_acc = val_acc;

        self.train_loss_history.push(train_loss);
        self.train_acc_history.push(train_acc);
        self.val_loss_history.push(val_loss);
        self.val_acc_history.push(val_acc);
    }

    /// Clears the latest values and every history.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Number of recorded epochs.
    pub fn epochs(&self) -> usize {
        self.train_loss_history.len()
    }

    pub fn train_loss_history(&self) -> &[f64] {
        &self.train_loss_history
    }

    pub fn train_acc_history(&self) -> &[f64] {
        &self.train_acc_history
    }

    pub fn val_loss_history(&self) -> &[f64] {
        &self.val_loss_history
    }

    pub fn val_acc_history(&self) -> &[f64] {
        &self.val_acc_history
    }

    /// Latest training metrics.
    pub fn train(&self) -> EvalMetrics {
        EvalMetrics {
            loss: self.train_loss,
            accuracy: self.train_acc,
        }
    }

    /// Latest validation metrics.
    pub fn validation(&self) -> EvalMetrics {
        EvalMetrics {
            loss: self.val_loss,
            accuracy: self.val_acc,
        }
    }

    /// Writes a two-panel SVG chart (loss on top, accuracy below) of train
    /// vs validation.
    pub fn plot(&self, path: impl AsRef<Path>, title: Option<&str>) -> Result<(), ModelError> {
        crate::plot::training_curves(self, path.as_ref(), title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_appends_to_every_series() {
        let mut recorder = MetricsRecorder::new();
        for epoch in 0..5 {
            let e = epoch as f64;
            recorder.record(1.0 / (e + 1.0), 0.5 + e / 10.0, 0.9, 0.6);
        }

        assert_eq!(recorder.epochs(), 5);
        assert_eq!(recorder.train_loss_history().len(), 5);
        assert_eq!(recorder.train_acc_history().len(), 5);
        assert_eq!(recorder.val_loss_history().len(), 5);
        assert_eq!(recorder.val_acc_history().len(), 5);
        assert!((recorder.train_loss - 0.2).abs() < 1e-12);
        assert!((recorder.train_acc_history()[2] - 0.7).abs() < 1e-12);
        assert_eq!(recorder.validation(), EvalMetrics { loss: 0.9, accuracy: 0.6 });
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut recorder = MetricsRecorder::new();
        recorder.record(0.4, 0.8, 0.5, 0.7);
        recorder.record(0.3, 0.9, 0.5, 0.7);

        recorder.reset();

        assert_eq!(recorder, MetricsRecorder::default());
        assert_eq!(recorder.epochs(), 0);
        assert_eq!(recorder.train_loss, 0.0);
        assert!(recorder.val_acc_history().is_empty());
    }

    #[test]
    fn test_eval_metrics_from_sums() {
        let metrics = EvalMetrics::from_sums(3.0, 1.5, 3);
        assert!((metrics.loss - 1.0).abs() < 1e-12);
        assert!((metrics.accuracy - 0.5).abs() < 1e-12);
        assert_eq!(EvalMetrics::from_sums(0.0, 0.0, 0), EvalMetrics::default());
    }
}
