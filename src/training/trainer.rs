//! Training loop implementation.

use super::{
    EvalMetrics, MetricsRecorder, StepDecay, TrainingConfig,
    loss::{binary_accuracy, binary_cross_entropy},
};
use crate::data::BatchLoader;
use crate::errors::ModelError;
use crate::model::BinaryClassifier;
use burn::{
    module::AutodiffModule,
    optim::{AdamConfig, GradientsParams, Optimizer},
    tensor::{
        ElementConversion,
        backend::{AutodiffBackend, Backend},
    },
};

/// Training result containing the trained model and metrics.
#[derive(Debug)]
pub struct TrainingResult<B: AutodiffBackend> {
    /// The trained model.
    pub model: BinaryClassifier<B>,
    /// One entry per epoch.
    pub metrics: MetricsRecorder,
}

/// Trains a model using the Adam optimizer and a step-decay schedule.
///
/// Validation runs after the first epoch and then every `epochs_per_val`
/// epochs; in between the previous validation metrics are recorded again.
pub fn train<B: AutodiffBackend>(
    model: BinaryClassifier<B>,
    train_loader: &BatchLoader<B>,
    val_loader: Option<&BatchLoader<B::InnerBackend>>,
    config: &TrainingConfig,
) -> Result<TrainingResult<B>, ModelError> {
    let schedule = StepDecay::new(
        config.learning_rate,
        config.scheduler_step_size,
        config.scheduler_gamma,
    );
    let mut optimizer = AdamConfig::new().init();

    let mut current_model = model;
    let mut metrics = MetricsRecorder::new();
    let mut val_metrics = EvalMetrics::default();
    let mut val_counter = config.epochs_per_val;

    for epoch in 0..config.epochs {
        let learning_rate = schedule.learning_rate(epoch);
        let mut loss_sum = 0.0;
        let mut accuracy_sum = 0.0;
        let mut batches = 0;

        for batch in train_loader.iter() {
            let predictions = current_model.forward(batch.features);
            accuracy_sum += binary_accuracy(predictions.clone(), batch.targets.clone());

            let loss = binary_cross_entropy(predictions, batch.targets);
            let loss_value: f64 = loss.clone().into_scalar().elem();
            loss_sum += loss_value;
            batches += 1;

            let grads = GradientsParams::from_grads(loss.backward(), &current_model);
            current_model = optimizer.step(learning_rate, current_model, grads);
        }
        let train_metrics = EvalMetrics::from_sums(loss_sum, accuracy_sum, batches);

        val_counter += 1;
        if val_counter >= config.epochs_per_val {
            if let Some(loader) = val_loader {
                val_metrics = validate(&current_model.valid(), loader);
            }
            val_counter = 0;
        }

        metrics.record(
            train_metrics.loss,
            train_metrics.accuracy,
            val_metrics.loss,
            val_metrics.accuracy,
        );

        if config.verbose {
            log::info!(
                "Epoch {}/{}: lr={:.6}, loss={:.5}, acc={:.5}, val_loss={:.5}, val_acc={:.5}",
                epoch + 1,
                config.epochs,
                learning_rate,
                train_metrics.loss,
                train_metrics.accuracy,
                val_metrics.loss,
                val_metrics.accuracy
            );
        }
    }

    log::info!("Training done");

    if let Some(path) = &config.plot_path {
        metrics.plot(path, Some("Training"))?;
        log::info!("Saved training curves to {}", path.display());
    }

    Ok(TrainingResult {
        model: current_model,
        metrics,
    })
}

/// Mean loss and accuracy over every batch of `loader`, without gradients.
pub fn validate<B: Backend>(model: &BinaryClassifier<B>, loader: &BatchLoader<B>) -> EvalMetrics {
    let mut loss_sum = 0.0;
    let mut accuracy_sum = 0.0;
    let mut batches = 0;

    for batch in loader.iter() {
        let predictions = model.infer(batch.features);
        accuracy_sum += binary_accuracy(predictions.clone(), batch.targets.clone());
        let loss: f64 = binary_cross_entropy(predictions, batch.targets)
            .into_scalar()
            .elem();
        loss_sum += loss;
        batches += 1;
    }

    if batches == 0 {
        log::warn!("Evaluation loader is empty, reporting zero loss and accuracy");
    }
    EvalMetrics::from_sums(loss_sum, accuracy_sum, batches)
}

/// Evaluates `model` on the test loader.
pub fn test<B: Backend>(
    model: &BinaryClassifier<B>,
    loader: &BatchLoader<B>,
    log_results: bool,
) -> EvalMetrics {
    let metrics = validate(model, loader);
    if log_results {
        log::info!("TEST: loss={:.5}, acc={:.5}", metrics.loss, metrics.accuracy);
    }
    metrics
}
