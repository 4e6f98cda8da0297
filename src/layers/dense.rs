//! Fully connected layer with a fixed activation.

use crate::errors::ModelError;
use crate::layers::Activation;
use burn::{
    module::Module,
    nn::{Linear, LinearConfig},
    tensor::{Tensor, backend::Backend},
};

/// Configuration for a [`Dense`] layer.
#[derive(Debug, Clone)]
pub struct DenseConfig {
    pub input_size: usize,
    pub output_size: usize,
    /// Applied after the affine transform.
    pub activation: Activation,
}

impl DenseConfig {
    /// Creates a layer configuration without activation.
    pub fn new(input_size: usize, output_size: usize) -> Self {
        Self {
            input_size,
            output_size,
            activation: Activation::None,
        }
    }

    pub fn with_activation(mut self, activation: Activation) -> Self {
        self.activation = activation;
        self
    }

    /// Initializes the layer on `device`.
    pub fn init<B: Backend>(&self, device: &B::Device) -> Dense<B> {
        Dense {
            linear: LinearConfig::new(self.input_size, self.output_size).init(device),
            activation: self.activation.to_id(),
        }
    }
}

/// `output = activation(input @ weight + bias)`.
///
/// The activation is kept as its numeric id so it travels with the module
/// record; the sizes are read off the weight tensor.
#[derive(Module, Debug)]
pub struct Dense<B: Backend> {
    linear: Linear<B>,
    activation: u8,
}

fn tensor_values<B: Backend, const D: usize>(tensor: Tensor<B, D>) -> Result<Vec<f32>, ModelError> {
    tensor
        .into_data()
        .convert::<f32>()
        .to_vec()
        .map_err(|e| ModelError::TensorData {
            message: format!("{e:?}"),
        })
}

impl<B: Backend> Dense<B> {
    pub fn forward(&self, input: Tensor<B, 2>) -> Tensor<B, 2> {
        self.activation().apply(self.linear.forward(input))
    }

    pub fn input_size(&self) -> usize {
        self.linear.weight.val().dims()[0]
    }

    pub fn output_size(&self) -> usize {
        self.linear.weight.val().dims()[1]
    }

    pub fn activation(&self) -> Activation {
        Activation::from_id(self.activation)
    }

    /// Weight matrix with one row per output unit, shape `[output, input]`.
    pub fn weight_rows(&self) -> Result<Vec<Vec<f32>>, ModelError> {
        let input_size = self.input_size();
        // burn stores [input, output]; transposing yields row-major [output, input]
        let flat = tensor_values(self.linear.weight.val().transpose())?;
        Ok(flat
            .chunks(input_size.max(1))
            .map(|row| row.to_vec())
            .collect())
    }

    /// Bias per output unit, zeros when the layer has none.
    pub fn bias_values(&self) -> Result<Vec<f32>, ModelError> {
        match &self.linear.bias {
            Some(bias) => tensor_values(bias.val()),
            None => Ok(vec![0.0; self.output_size()]),
        }
    }
}
