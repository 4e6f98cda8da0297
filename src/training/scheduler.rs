//! Step-decay learning-rate schedule.

/// Multiplies the learning rate by `gamma` every `step_size` epochs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepDecay {
    initial: f64,
    step_size: usize,
    gamma: f64,
}

impl StepDecay {
    /// A `step_size` of 0 keeps the learning rate constant.
    pub fn new(initial: f64, step_size: usize, gamma: f64) -> Self {
        Self {
            initial,
            step_size,
            gamma,
        }
    }

    /// Learning rate used during `epoch` (0-based).
    pub fn learning_rate(&self, epoch: usize) -> f64 {
        if self.step_size == 0 {
            return self.initial;
        }
        let decays = (epoch / self.step_size).min(i32::MAX as usize) as i32;
        self.initial * self.gamma.powi(decays)
    }
}
