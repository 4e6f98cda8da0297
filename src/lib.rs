//! # binmlp
//!
//! A library for training, evaluating and exporting a small binary
//! classification network on tabular CSV data.
//!
//! ## Features
//!
//! - **Burn Backend**: Trains with the Burn framework on the NdArray backend,
//!   or on WGPU when built with the `wgpu` feature.
//! - **Data pipeline**: Delimited CSV loading, sub-sampling, standardization
//!   and a random train/validation/test split, driven by a JSON settings file.
//! - **Training**: Binary cross entropy, Adam with a step-decay learning rate,
//!   periodic validation, per-epoch metrics and SVG charts.
//! - **Export to Instruction Model**: Trained models can be exported to a JSON
//!   instruction graph and evaluated without Burn.
//!
//! ## Example
//!
//! ```
//! use binmlp::prelude::*;
//! use burn::backend::NdArray;
//!
//! type Backend = NdArray;
//!
//! let device = <Backend as burn::tensor::backend::Backend>::Device::default();
//!
//! let model: BinaryClassifier<Backend> = BinaryClassifierConfig::new(4)
//!     .with_hidden_sizes(vec![8])
//!     .init(&device)
//!     .expect("Failed to build model");
//!
//! let prediction = model.predict(&[0.1, 0.2, 0.3, 0.4], &device).unwrap();
//! assert!(prediction.class <= 1);
//!
//! // Export to instruction model format
//! let json = model.export_to_instruction_model(None, None).unwrap();
//! assert!(json.contains("DOT"));
//! ```

pub mod data;
pub mod errors;
pub mod export;
pub mod grid_search;
pub mod layers;
pub mod model;
pub mod plot;
pub mod settings;
pub mod training;

// Re-exports for convenience
pub use errors::ModelError;
pub use layers::activation::Activation;
pub use model::{BinaryClassifier, BinaryClassifierConfig, Prediction};
pub use settings::Settings;
pub use training::TrainingConfig;

/// Backend type for inference (no autodiff).
#[cfg(feature = "wgpu")]
pub type InferenceBackend = burn::backend::Wgpu;

/// Backend type for inference (no autodiff).
#[cfg(not(feature = "wgpu"))]
pub type InferenceBackend = burn::backend::NdArray;

/// Backend type with autodiff support, used for training.
pub type Backend = burn::backend::Autodiff<InferenceBackend>;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::data::{
        PreparedData, Standardizer, TabularData, build_eval_loader, build_loader,
        prepare,
    };
    pub use crate::errors::ModelError;
    pub use crate::export::InstructionModel;
    pub use crate::layers::activation::Activation;
    pub use crate::model::{BinaryClassifier, BinaryClassifierConfig, Prediction};
    pub use crate::settings::Settings;
    pub use crate::training::{TrainingConfig, test, train, validate};
    pub use crate::{Backend, InferenceBackend};
}
