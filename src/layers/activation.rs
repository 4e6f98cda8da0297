//! Activation functions for neural network layers.
//!
//! The classifier itself only uses [`Activation::LeakyRelu`] on hidden
//! layers and [`Activation::Sigmoid`] on the output. [`Activation::Relu`]
//! stays in the set because exported instruction models may name `RELU`,
//! and [`crate::export::InstructionModel`] evaluates it through
//! [`Activation::apply_value`].

use burn::tensor::{Tensor, backend::Backend};
use serde::{Deserialize, Serialize};

/// Negative slope of the leaky rectifier.
pub const LEAKY_RELU_SLOPE: f64 = 0.01;

/// Supported activation functions.
///
/// The same set is understood by the exported instruction model, so every
/// variant has a scalar counterpart in [`Activation::apply_value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Activation {
    /// No activation (identity function).
    #[default]
    None,
    /// Rectified Linear Unit: f(x) = max(0, x)
    Relu,
    /// Leaky rectifier: f(x) = x for x > 0, else 0.01 * x
    LeakyRelu,
    /// Sigmoid: f(x) = 1 / (1 + exp(-x))
    Sigmoid,
}

impl Activation {
    /// Applies the activation function to a tensor.
    pub fn apply<B: Backend, const D: usize>(&self, tensor: Tensor<B, D>) -> Tensor<B, D> {
        match self {
            Activation::None => tensor,
            Activation::Relu => burn::tensor::activation::relu(tensor),
            Activation::LeakyRelu => {
                burn::tensor::activation::leaky_relu(tensor, LEAKY_RELU_SLOPE)
            }
            Activation::Sigmoid => burn::tensor::activation::sigmoid(tensor),
        }
    }

    /// Applies the activation function to a single value.
    pub fn apply_value(&self, x: f32) -> f32 {
        match self {
            Activation::None => x,
            Activation::Relu => x.max(0.0),
            Activation::LeakyRelu => {
                if x > 0.0 {
                    x
                } else {
                    x * LEAKY_RELU_SLOPE as f32
                }
            }
            Activation::Sigmoid => 1.0 / (1.0 + (-x).exp()),
        }
    }

    /// Returns the string name for export to instruction model format.
    pub fn to_instruction_name(&self) -> Option<&'static str> {
        match self {
            Activation::None => None,
            Activation::Relu => Some("RELU"),
            Activation::LeakyRelu => Some("LEAKY_RELU"),
            Activation::Sigmoid => Some("SIGMOID"),
        }
    }

    /// Creates an Activation from a string name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_uppercase().as_str() {
            "NONE" => Some(Activation::None),
            "RELU" => Some(Activation::Relu),
            "LEAKY_RELU" | "LEAKYRELU" => Some(Activation::LeakyRelu),
            "SIGMOID" => Some(Activation::Sigmoid),
            _ => None,
        }
    }

    /// Converts activation to a numeric ID for storage in Module.
    pub fn to_id(&self) -> u8 {
        match self {
            Activation::None => 0,
            Activation::Relu => 1,
            Activation::LeakyRelu => 2,
            Activation::Sigmoid => 3,
        }
    }

    /// Creates an Activation from a numeric ID.
    pub fn from_id(id: u8) -> Self {
        match id {
            1 => Activation::Relu,
            2 => Activation::LeakyRelu,
            3 => Activation::Sigmoid,
            _ => Activation::None,
        }
    }
}
