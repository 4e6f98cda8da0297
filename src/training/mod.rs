//! Training utilities for the binary classifier.
//!
//! This module provides:
//! - Binary cross entropy and batch accuracy
//! - Training configuration and the step-decay schedule
//! - Per-epoch metrics recording
//! - The training loop with the Adam optimizer, plus validation and test passes

mod config;
mod loss;
mod metrics;
mod scheduler;
mod trainer;

pub use config::TrainingConfig;
pub use loss::{binary_accuracy, binary_cross_entropy};
pub use metrics::{EvalMetrics, MetricsRecorder};
pub use scheduler::StepDecay;
pub use trainer::{TrainingResult, test, train, validate};
