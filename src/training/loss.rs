//! Loss and accuracy for binary targets.

use burn::tensor::{ElementConversion, Tensor, backend::Backend};

use crate::model::THRESHOLD;

/// Binary cross entropy between probabilities and 0/1 targets.
///
/// BCE = -mean(y * log(p) + (1-y) * log(1-p))
pub fn binary_cross_entropy<B: Backend>(
    predictions: Tensor<B, 2>,
    targets: Tensor<B, 2>,
) -> Tensor<B, 1> {
    // keeps log() finite for saturated outputs
    let epsilon = 1e-7;
    let ones = Tensor::ones_like(&predictions);
    let p_clipped = predictions.clamp(epsilon, 1.0 - epsilon);
    let log_p = p_clipped.clone().log();
    let log_1_minus_p = (ones.clone() - p_clipped).log();
    let bce = targets.clone() * log_p + (ones - targets) * log_1_minus_p;
    bce.neg().mean()
}

/// Fraction of rows whose thresholded prediction equals the target.
pub fn binary_accuracy<B: Backend>(predictions: Tensor<B, 2>, targets: Tensor<B, 2>) -> f64 {
    let [rows, cols] = predictions.dims();
    if rows * cols == 0 {
        return 0.0;
    }

    let predicted = predictions.greater_elem(THRESHOLD);
    let actual = targets.greater_elem(THRESHOLD);
    let correct: i64 = predicted.equal(actual).int().sum().into_scalar().elem();

    correct as f64 / (rows * cols) as f64
}
