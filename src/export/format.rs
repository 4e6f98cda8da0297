//! Serialized instruction model format.

use serde::{Deserialize, Serialize};

/// A single instruction of the exported model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum InstructionExport {
    /// `output = activation(weights @ input + bias)`.
    #[serde(rename = "DOT")]
    Dot {
        input: usize,
        output: usize,
        weights: usize,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        activation: Option<String>,
    },
    /// Element-wise add of a parameter vector (in-place).
    #[serde(rename = "ADD_ELEMENTWISE")]
    AddElementwise { input: usize, parameters: usize },
    /// Element-wise multiply by a parameter vector (in-place).
    #[serde(rename = "MUL_ELEMENTWISE")]
    MulElementwise { input: usize, parameters: usize },
}

/// Export format for the complete instruction model.
///
/// Buffer 0 is the input, the last buffer is the output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstructionModelExport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_size: Option<usize>,
    pub buffer_sizes: Vec<usize>,
    pub instructions: Vec<InstructionExport>,
    /// Weight matrices, shape `[output][input]` per DOT instruction.
    pub weights: Vec<Vec<Vec<f32>>>,
    pub bias: Vec<Vec<f32>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Vec<f32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_data: Option<ValidationDataExport>,
}

/// Sample inputs with the outputs the trained model produced for them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationDataExport {
    pub inputs: Vec<Vec<f32>>,
    pub expected_outputs: Vec<Vec<f32>>,
}

/// Incrementally assembles an [`InstructionModelExport`].
#[derive(Debug, Default)]
pub struct ExportBuilder {
    buffer_sizes: Vec<usize>,
    instructions: Vec<InstructionExport>,
    weights: Vec<Vec<Vec<f32>>>,
    bias: Vec<Vec<f32>>,
    parameters: Vec<Vec<f32>>,
    features: Vec<String>,
}

impl ExportBuilder {
    /// Creates a builder whose buffer 0 holds `features`.
    pub fn new(features: Vec<String>) -> Self {
        Self {
            buffer_sizes: vec![features.len()],
            features,
            ..Self::default()
        }
    }

    /// Allocates a new buffer, returning its index.
    pub fn allocate_buffer(&mut self, size: usize) -> usize {
        self.buffer_sizes.push(size);
        self.buffer_sizes.len() - 1
    }

    /// Stores a weight matrix and bias, returning their index.
    pub fn store_weights(&mut self, weights: Vec<Vec<f32>>, bias: Vec<f32>) -> usize {
        self.weights.push(weights);
        self.bias.push(bias);
        self.weights.len() - 1
    }

    /// Stores a parameter vector, returning its index.
    pub fn store_parameters(&mut self, parameters: Vec<f32>) -> usize {
        self.parameters.push(parameters);
        self.parameters.len() - 1
    }

    pub fn add_instruction(&mut self, instruction: InstructionExport) {
        self.instructions.push(instruction);
    }

    /// Converts the builder into the export format.
    pub fn into_export(self) -> InstructionModelExport {
        InstructionModelExport {
            feature_size: self.buffer_sizes.first().copied(),
            features: if self.features.is_empty() {
                None
            } else {
                Some(self.features)
            },
            buffer_sizes: self.buffer_sizes,
            instructions: self.instructions,
            weights: self.weights,
            bias: self.bias,
            parameters: self.parameters,
            validation_data: None,
        }
    }
}
