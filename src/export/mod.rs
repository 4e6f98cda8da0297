//! Portable instruction-model export.
//!
//! A trained [`BinaryClassifier`](crate::model::BinaryClassifier) can be
//! written as a JSON list of buffer-to-buffer instructions together with its
//! weights. The format has a fixed input width and evaluates every row
//! independently, so any number of rows can be fed through it.
//! [`InstructionModel`] evaluates the format without burn.

mod format;
mod runtime;

pub use format::{ExportBuilder, InstructionExport, InstructionModelExport, ValidationDataExport};
pub use runtime::InstructionModel;
