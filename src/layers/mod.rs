//! Network building blocks: dense layers and their activations.

pub mod activation;
pub mod dense;

pub use activation::Activation;
pub use dense::{Dense, DenseConfig};
