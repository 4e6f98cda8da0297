//! Framework-free evaluation of an exported instruction model.

use super::{InstructionExport, InstructionModelExport};
use crate::errors::ModelError;
use crate::layers::Activation;

/// A validated instruction model ready for inference.
#[derive(Debug, Clone)]
pub struct InstructionModel {
    info: InstructionModelExport,
    /// Resolved activation of every instruction (`None` for non-DOT ones).
    activations: Vec<Activation>,
}

impl InstructionModel {
    /// Validates the buffer, weight and parameter references of `info`.
    pub fn new(info: InstructionModelExport) -> Result<Self, ModelError> {
        let buffers = info.buffer_sizes.len();
        let input_size = *info
            .buffer_sizes
            .first()
            .ok_or_else(|| ModelError::InvalidGraph("model has no buffers".to_string()))?;

        if let Some(size) = info.feature_size {
            if size != input_size {
                return Err(ModelError::InvalidGraph(format!(
                    "feature_size {size} does not match input buffer size {input_size}"
                )));
            }
        }
        if let Some(features) = &info.features {
            if features.len() != input_size {
                return Err(ModelError::InvalidGraph(format!(
                    "{} feature names for an input buffer of size {input_size}",
                    features.len()
                )));
            }
        }
        if info.weights.len() != info.bias.len() {
            return Err(ModelError::InvalidGraph(
                "weights and bias counts differ".to_string(),
            ));
        }

        let check_buffer = |index: usize| {
            if index < buffers {
                Ok(info.buffer_sizes[index])
            } else {
                Err(ModelError::InvalidGraph(format!(
                    "buffer {index} out of range"
                )))
            }
        };

        let mut activations = Vec::with_capacity(info.instructions.len());
        for instruction in &info.instructions {
            match instruction {
                InstructionExport::Dot {
                    input,
                    output,
                    weights,
                    activation,
                } => {
                    let in_size = check_buffer(*input)?;
                    let out_size = check_buffer(*output)?;
                    let matrix = info.weights.get(*weights).ok_or_else(|| {
                        ModelError::InvalidGraph(format!("weights {weights} out of range"))
                    })?;
                    if matrix.len() != out_size
                        || matrix.iter().any(|row| row.len() != in_size)
                        || info.bias[*weights].len() != out_size
                    {
                        return Err(ModelError::InvalidGraph(format!(
                            "weights {weights} do not map buffer {input} ({in_size}) to buffer {output} ({out_size})"
                        )));
                    }
                    let activation = match activation {
                        None => Activation::None,
                        Some(name) => Activation::from_name(name).ok_or_else(|| {
                            ModelError::InvalidGraph(format!("unknown activation {name}"))
                        })?,
                    };
                    activations.push(activation);
                }
                InstructionExport::AddElementwise { input, parameters }
                | InstructionExport::MulElementwise { input, parameters } => {
                    let size = check_buffer(*input)?;
                    let vector = info.parameters.get(*parameters).ok_or_else(|| {
                        ModelError::InvalidGraph(format!("parameters {parameters} out of range"))
                    })?;
                    if vector.len() != size {
                        return Err(ModelError::InvalidGraph(format!(
                            "parameters {parameters} have {} values for buffer {input} ({size})",
                            vector.len()
                        )));
                    }
                    activations.push(Activation::None);
                }
            }
        }

        Ok(Self { info, activations })
    }

    /// Parses and validates a JSON export.
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        Self::new(serde_json::from_str(json)?)
    }

    /// Returns the expected input width.
    pub fn feature_size(&self) -> usize {
        self.info.buffer_sizes[0]
    }

    pub fn info(&self) -> &InstructionModelExport {
        &self.info
    }

    /// Runs the instructions on one input row and returns the output buffer.
    pub fn predict(&self, input: &[f32]) -> Result<Vec<f32>, ModelError> {
        if input.len() != self.feature_size() {
            return Err(ModelError::ShapeMismatch {
                expected: self.feature_size(),
                actual: input.len(),
            });
        }

        let mut buffers: Vec<Vec<f32>> = self
            .info
            .buffer_sizes
            .iter()
            .map(|&size| vec![0.0; size])
            .collect();
        buffers[0].copy_from_slice(input);

        for (instruction, activation) in self.info.instructions.iter().zip(&self.activations) {
            match instruction {
                InstructionExport::Dot {
                    input,
                    output,
                    weights,
                    ..
                } => {
                    let values: Vec<f32> = self.info.weights[*weights]
                        .iter()
                        .zip(&self.info.bias[*weights])
                        .map(|(row, bias)| {
                            let sum: f32 = row.iter().zip(&buffers[*input]).map(|(w, x)| w * x).sum();
                            activation.apply_value(sum + bias)
                        })
                        .collect();
                    buffers[*output] = values;
                }
                InstructionExport::AddElementwise { input, parameters } => {
                    for (value, p) in buffers[*input].iter_mut().zip(&self.info.parameters[*parameters]) {
                        *value += p;
                    }
                }
                InstructionExport::MulElementwise { input, parameters } => {
                    for (value, p) in buffers[*input].iter_mut().zip(&self.info.parameters[*parameters]) {
                        *value *= p;
                    }
                }
            }
        }

        Ok(buffers.pop().unwrap_or_default())
    }

    /// Runs [`InstructionModel::predict`] on every row.
    pub fn predict_batch(&self, rows: &[Vec<f32>]) -> Result<Vec<Vec<f32>>, ModelError> {
        rows.iter().map(|row| self.predict(row)).collect()
    }

    /// Checks the embedded validation data, if any, within `tolerance`.
    ///
    /// Returns the number of rows checked.
    pub fn check_validation_data(&self, tolerance: f32) -> Result<usize, ModelError> {
        let Some(data) = &self.info.validation_data else {
            return Ok(0);
        };

        for (row, (input, expected)) in data.inputs.iter().zip(&data.expected_outputs).enumerate() {
            let actual = self.predict(input)?;
            let matches = actual.len() == expected.len()
                && actual
                    .iter()
                    .zip(expected)
                    .all(|(a, e)| (a - e).abs() <= tolerance);
            if !matches {
                return Err(ModelError::InvalidGraph(format!(
                    "validation row {row}: expected {expected:?}, got {actual:?}"
                )));
            }
        }
        Ok(data.inputs.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::ValidationDataExport;

    /// 2 -> 2 (relu) -> 1 (sigmoid) with a standardization prelude.
    fn small_model() -> InstructionModelExport {
        InstructionModelExport {
            features: None,
            feature_size: Some(2),
            buffer_sizes: vec![2, 2, 1],
            instructions: vec![
                InstructionExport::AddElementwise {
                    input: 0,
                    parameters: 0,
                },
                InstructionExport::MulElementwise {
                    input: 0,
                    parameters: 1,
                },
                InstructionExport::Dot {
                    input: 0,
                    output: 1,
                    weights: 0,
                    activation: Some("RELU".to_string()),
                },
                InstructionExport::Dot {
                    input: 1,
                    output: 2,
                    weights: 1,
                    activation: Some("SIGMOID".to_string()),
                },
            ],
            weights: vec![vec![vec![1.0, 0.0], vec![0.0, -1.0]], vec![vec![1.0, 1.0]]],
            bias: vec![vec![0.0, 0.0], vec![0.0]],
            parameters: vec![vec![-1.0, -1.0], vec![0.5, 0.5]],
            validation_data: None,
        }
    }

    #[test]
    fn test_predict_by_hand() {
        let model = InstructionModel::new(small_model()).unwrap();

        // standardized: (3-1)*0.5 = 1, (-1-1)*0.5 = -1
        // hidden: relu(1) = 1, relu(1) = 1 -> sigmoid(2)
        let output = model.predict(&[3.0, -1.0]).unwrap();
        assert_eq!(output.len(), 1);
        assert!((output[0] - 1.0 / (1.0 + (-2.0f32).exp())).abs() < 1e-6);
    }

    #[test]
    fn test_predict_batch_rows_are_independent() {
        let model = InstructionModel::new(small_model()).unwrap();
        let rows = vec![vec![3.0, -1.0], vec![1.0, 1.0], vec![3.0, -1.0]];

        let outputs = model.predict_batch(&rows).unwrap();
        assert_eq!(outputs.len(), 3);
        assert_eq!(outputs[0], outputs[2]);
        // all-zero hidden layer gives sigmoid(0)
        assert!((outputs[1][0] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_relu_clamps_negative_hidden_values() {
        let model = InstructionModel::new(small_model()).unwrap();

        // standardized: (-1, 2); hidden pre-activation (-1, -2)
        let output = model.predict(&[-1.0, 5.0]).unwrap();
        assert!((output[0] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_wrong_input_width() {
        let model = InstructionModel::new(small_model()).unwrap();
        assert!(matches!(
            model.predict(&[1.0, 2.0, 3.0]),
            Err(ModelError::ShapeMismatch {
                expected: 2,
                actual: 3
            })
        ));
    }

    #[test]
    fn test_invalid_references_are_rejected() {
        let mut info = small_model();
        info.instructions.push(InstructionExport::Dot {
            input: 2,
            output: 5,
            weights: 1,
            activation: None,
        });
        assert!(matches!(
            InstructionModel::new(info),
            Err(ModelError::InvalidGraph(_))
        ));

        let mut info = small_model();
        info.parameters[1] = vec![1.0];
        assert!(matches!(
            InstructionModel::new(info),
            Err(ModelError::InvalidGraph(_))
        ));

        let mut info = small_model();
        info.weights[0][1] = vec![1.0, 2.0, 3.0];
        assert!(matches!(
            InstructionModel::new(info),
            Err(ModelError::InvalidGraph(_))
        ));
    }

    #[test]
    fn test_unknown_activation() {
        let mut info = small_model();
        info.instructions[2] = InstructionExport::Dot {
            input: 0,
            output: 1,
            weights: 0,
            activation: Some("SOFTPLUS".to_string()),
        };
        assert!(matches!(
            InstructionModel::new(info),
            Err(ModelError::InvalidGraph(message)) if message.contains("SOFTPLUS")
        ));
    }

    #[test]
    fn test_check_validation_data() {
        let mut info = small_model();
        info.validation_data = Some(ValidationDataExport {
            inputs: vec![vec![1.0, 1.0]],
            expected_outputs: vec![vec![0.5]],
        });
        let model = InstructionModel::new(info.clone()).unwrap();
        assert_eq!(model.check_validation_data(1e-6).unwrap(), 1);

        info.validation_data = Some(ValidationDataExport {
            inputs: vec![vec![1.0, 1.0]],
            expected_outputs: vec![vec![0.9]],
        });
        let model = InstructionModel::new(info).unwrap();
        assert!(model.check_validation_data(1e-6).is_err());
    }

    #[test]
    fn test_json_roundtrip() {
        let json = serde_json::to_string(&small_model()).unwrap();
        let model = InstructionModel::from_json(&json).unwrap();
        assert_eq!(model.info(), &small_model());
        assert_eq!(model.feature_size(), 2);
    }
}
