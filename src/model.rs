//! BinaryClassifier - the feed-forward network trained by this crate.
//!
//! The topology is fixed: every hidden layer is a dense layer with a leaky
//! rectifier followed by dropout, and the output is a single sigmoid unit.

use std::path::PathBuf;

use crate::data::Standardizer;
use crate::errors::ModelError;
use crate::export::{ExportBuilder, InstructionExport, InstructionModelExport, ValidationDataExport};
use crate::layers::{Activation, Dense, DenseConfig};
use crate::settings::Settings;
use burn::{
    module::Module,
    nn::{Dropout, DropoutConfig},
    record::{FullPrecisionSettings, NamedMpkFileRecorder},
    tensor::{Tensor, backend::Backend},
};

/// Decision threshold on the sigmoid output.
pub const THRESHOLD: f32 = 0.5;

/// Configuration for building a [`BinaryClassifier`].
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryClassifierConfig {
    /// Number of input features.
    pub feature_size: usize,
    /// Width of every hidden layer, in order.
    pub hidden_sizes: Vec<usize>,
    /// Dropout probability after each hidden layer.
    pub dropout: f64,
}

impl BinaryClassifierConfig {
    /// Creates a configuration with one hidden layer of 10 units and 0.2 dropout.
    pub fn new(feature_size: usize) -> Self {
        Self {
            feature_size,
            hidden_sizes: vec![10],
            dropout: 0.2,
        }
    }

    /// Creates a configuration using the model fields of `settings`.
    pub fn from_settings(feature_size: usize, settings: &Settings) -> Self {
        Self::new(feature_size)
            .with_hidden_sizes(settings.hidden_sizes.clone())
            .with_dropout(settings.dropout)
    }

    pub fn with_hidden_sizes(mut self, hidden_sizes: Vec<usize>) -> Self {
        self.hidden_sizes = hidden_sizes;
        self
    }

    pub fn with_dropout(mut self, dropout: f64) -> Self {
        self.dropout = dropout;
        self
    }

    /// Builds the classifier with freshly initialized weights.
    pub fn init<B: Backend>(&self, device: &B::Device) -> Result<BinaryClassifier<B>, ModelError> {
        if self.feature_size == 0 {
            return Err(ModelError::NoInputBuffer);
        }
        if self.hidden_sizes.contains(&0) {
            return Err(ModelError::InvalidLayerConfig {
                message: format!("hidden layer sizes must be positive: {:?}", self.hidden_sizes),
            });
        }
        if !(0.0..1.0).contains(&self.dropout) {
            return Err(ModelError::InvalidLayerConfig {
                message: format!("dropout must be within [0, 1), got {}", self.dropout),
            });
        }

        let mut input_size = self.feature_size;
        let mut hidden = Vec::with_capacity(self.hidden_sizes.len());
        for &size in &self.hidden_sizes {
            hidden.push(
                DenseConfig::new(input_size, size)
                    .with_activation(Activation::LeakyRelu)
                    .init(device),
            );
            input_size = size;
        }

        Ok(BinaryClassifier {
            hidden,
            dropout: DropoutConfig::new(self.dropout).init(),
            output: DenseConfig::new(input_size, 1)
                .with_activation(Activation::Sigmoid)
                .init(device),
            feature_size: self.feature_size,
        })
    }
}

/// Feed-forward binary classifier.
///
/// [`BinaryClassifier::forward`] is the training pass: dropout is applied
/// whenever the backend has autodiff. [`BinaryClassifier::infer`] never applies
/// dropout, so evaluation and prediction are deterministic on any backend.
#[derive(Module, Debug)]
pub struct BinaryClassifier<B: Backend> {
    hidden: Vec<Dense<B>>,
    dropout: Dropout,
    output: Dense<B>,
    feature_size: usize,
}

/// Outcome of classifying a single row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    /// Predicted class, 0 or 1.
    pub class: u8,
    /// Probability of the predicted class, always within [0.5, 1].
    pub confidence: f32,
    /// Raw sigmoid output.
    pub probability: f32,
}

impl Prediction {
    /// Thresholds a sigmoid output.
    pub fn from_probability(probability: f32) -> Self {
        if probability > THRESHOLD {
            Self {
                class: 1,
                confidence: probability,
                probability,
            }
        } else {
            Self {
                class: 0,
                confidence: 1.0 - probability,
                probability,
            }
        }
    }
}

fn recorder() -> NamedMpkFileRecorder<FullPrecisionSettings> {
    NamedMpkFileRecorder::<FullPrecisionSettings>::new()
}

impl<B: Backend> BinaryClassifier<B> {
    /// Training forward pass, returning probabilities of shape `[batch, 1]`.
    pub fn forward(&self, input: Tensor<B, 2>) -> Tensor<B, 2> {
        self.forward_with(input, true)
    }

    /// Forward pass without dropout, returning probabilities of shape `[batch, 1]`.
    pub fn infer(&self, input: Tensor<B, 2>) -> Tensor<B, 2> {
        self.forward_with(input, false)
    }

    fn forward_with(&self, input: Tensor<B, 2>, train: bool) -> Tensor<B, 2> {
        let mut x = input;
        for layer in &self.hidden {
            x = layer.forward(x);
            if train {
                x = self.dropout.forward(x);
            }
        }
        self.output.forward(x)
    }

    /// Classifies a single row of (already standardized) features.
    ///
    /// Dropout is never applied, whatever the backend.
    pub fn predict(&self, features: &[f32], device: &B::Device) -> Result<Prediction, ModelError> {
        if features.len() != self.feature_size {
            return Err(ModelError::ShapeMismatch {
                expected: self.feature_size,
                actual: features.len(),
            });
        }

        let input =
            Tensor::<B, 1>::from_floats(features, device).reshape([1, self.feature_size]);
        let output: Vec<f32> = self
            .infer(input)
            .detach()
            .into_data()
            .convert::<f32>()
            .to_vec()
            .map_err(|e| ModelError::TensorData {
                message: format!("{e:?}"),
            })?;
        let probability = output.first().copied().ok_or(ModelError::ShapeMismatch {
            expected: 1,
            actual: 0,
        })?;

        Ok(Prediction::from_probability(probability))
    }

    /// Returns the number of input features.
    pub fn feature_size(&self) -> usize {
        self.feature_size
    }

    /// Returns the number of dense layers, output layer included.
    pub fn num_layers(&self) -> usize {
        self.hidden.len() + 1
    }

    /// Writes the weights to `<path>.mpk`.
    pub fn save_weights(&self, path: impl Into<PathBuf>) -> Result<(), ModelError> {
        self.clone()
            .save_file(path, &recorder())
            .map_err(|e| ModelError::Recorder {
                message: format!("{e:?}"),
            })
    }

    /// Replaces the weights with the ones stored at `<path>.mpk`.
    pub fn load_weights(
        self,
        path: impl Into<PathBuf>,
        device: &B::Device,
    ) -> Result<Self, ModelError> {
        self.load_file(path, &recorder(), device)
            .map_err(|e| ModelError::Recorder {
                message: format!("{e:?}"),
            })
    }

    /// Exports the model to instruction model JSON format.
    pub fn export_to_instruction_model(
        &self,
        features: Option<&[String]>,
        standardizer: Option<&Standardizer>,
    ) -> Result<String, ModelError> {
        let export = self.to_instruction_model_info(features, standardizer)?;
        Ok(serde_json::to_string_pretty(&export)?)
    }

    /// Converts the model to an [`InstructionModelExport`].
    ///
    /// With a standardizer the exported graph takes raw feature values:
    /// buffer 0 is shifted by `-mean` and scaled by `1/std` before the first
    /// dense layer. Dropout has no exported counterpart.
    pub fn to_instruction_model_info(
        &self,
        features: Option<&[String]>,
        standardizer: Option<&Standardizer>,
    ) -> Result<InstructionModelExport, ModelError> {
        let features = match features {
            Some(names) if names.len() != self.feature_size => {
                return Err(ModelError::ShapeMismatch {
                    expected: self.feature_size,
                    actual: names.len(),
                });
            }
            Some(names) => names.to_vec(),
            None => (0..self.feature_size)
                .map(|i| format!("feature_{i}"))
                .collect(),
        };
        let mut builder = ExportBuilder::new(features);

        if let Some(standardizer) = standardizer {
            if standardizer.feature_size() != self.feature_size {
                return Err(ModelError::ShapeMismatch {
                    expected: self.feature_size,
                    actual: standardizer.feature_size(),
                });
            }
            let shift = builder.store_parameters(standardizer.means.iter().map(|m| -m).collect());
            let scale = builder.store_parameters(standardizer.stds.iter().map(|s| 1.0 / s).collect());
            builder.add_instruction(InstructionExport::AddElementwise {
                input: 0,
                parameters: shift,
            });
            builder.add_instruction(InstructionExport::MulElementwise {
                input: 0,
                parameters: scale,
            });
        }

        let mut input = 0;
        for layer in self.hidden.iter().chain(std::iter::once(&self.output)) {
            let output = builder.allocate_buffer(layer.output_size());
            let weights = builder.store_weights(layer.weight_rows()?, layer.bias_values()?);
            builder.add_instruction(InstructionExport::Dot {
                input,
                output,
                weights,
                activation: layer.activation().to_instruction_name().map(String::from),
            });
            input = output;
        }

        Ok(builder.into_export())
    }

    /// Runs inference on sample inputs for embedding in an export.
    ///
    /// `inputs` are raw rows; they are standardized with `standardizer` (if
    /// any) before the forward pass, mirroring the exported graph.
    pub fn generate_validation_data(
        &self,
        inputs: &[Vec<f32>],
        standardizer: Option<&Standardizer>,
        device: &B::Device,
    ) -> Result<ValidationDataExport, ModelError> {
        let mut expected_outputs = Vec::with_capacity(inputs.len());
        for input in inputs {
            let mut row = input.clone();
            if let Some(standardizer) = standardizer {
                standardizer.transform_row(&mut row)?;
            }
            expected_outputs.push(vec![self.predict(&row, device)?.probability]);
        }

        Ok(ValidationDataExport {
            inputs: inputs.to_vec(),
            expected_outputs,
        })
    }
}
