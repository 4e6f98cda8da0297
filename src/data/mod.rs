//! Tabular data handling.
//!
//! This module provides everything between a CSV file on disk and the batches
//! consumed by the training loop:
//! - Loading a delimited CSV into [`TabularData`] (last column is the label)
//! - Random sub-sampling and per-column standardization
//! - Random train/validation/test partitioning
//! - Burn batching and data loaders
//! - [`prepare`], which runs the whole pipeline from [`Settings`](crate::settings::Settings)

mod batcher;
mod prepare;
mod split;
mod standardize;
mod table;

pub use batcher::{BatchLoader, TabularBatch, TabularBatcher, build_eval_loader, build_loader};
pub use prepare::{PreparedData, load_and_prepare, prepare};
pub use split::{Split, SplitFractions, split};
pub use standardize::Standardizer;
pub use table::{TabularData, TabularItem};
