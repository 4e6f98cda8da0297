//! Model-related error types.

use thiserror::Error;

/// Errors that can occur while loading data, training, persisting or
/// exporting a model.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Model has no input features")]
    NoInputBuffer,

    #[error("Invalid layer configuration: {message}")]
    InvalidLayerConfig { message: String },

    #[error("Shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("Split destinations are incorrect")]
    InvalidSplit,

    #[error("Data portion must be within [0, 1], got {portion}")]
    InvalidPortion { portion: f64 },

    #[error("CSV delimiter must be a single ASCII character, got {delimiter:?}")]
    InvalidDelimiter { delimiter: char },

    #[error("Dataset is empty")]
    EmptyDataset,

    #[error("Invalid value {value:?} at row {row}, column {column}")]
    InvalidValue {
        row: usize,
        column: String,
        value: String,
    },

    #[error("Invalid graph structure: {0}")]
    InvalidGraph(String),

    #[error("Invalid grid range {range:?}: {message}")]
    InvalidGridRange { range: String, message: String },

    #[error("Tensor data error: {message}")]
    TensorData { message: String },

    #[error("Recorder error: {message}")]
    Recorder { message: String },

    #[error("Plotting error: {message}")]
    Plot { message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}
