//! CSV-backed tabular dataset.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, Trim};
use rand::Rng;
use rand::seq::index;

use super::Standardizer;
use crate::errors::ModelError;

/// A single dataset row: a feature vector and its binary label.
#[derive(Debug, Clone, PartialEq)]
pub struct TabularItem {
    pub features: Vec<f32>,
    pub label: f32,
}

/// Rows of numeric features with one label per row.
///
/// Every row has exactly `feature_size()` features.
#[derive(Debug, Clone, PartialEq)]
pub struct TabularData {
    feature_names: Vec<String>,
    features: Vec<Vec<f32>>,
    labels: Vec<f32>,
}

impl TabularData {
    /// Creates a dataset from already parsed rows.
    pub fn new(
        feature_names: Vec<String>,
        features: Vec<Vec<f32>>,
        labels: Vec<f32>,
    ) -> Result<Self, ModelError> {
        if features.len() != labels.len() {
            return Err(ModelError::ShapeMismatch {
                expected: features.len(),
                actual: labels.len(),
            });
        }
        if let Some(row) = features.iter().find(|row| row.len() != feature_names.len()) {
            return Err(ModelError::ShapeMismatch {
                expected: feature_names.len(),
                actual: row.len(),
            });
        }

        Ok(Self {
            feature_names,
            features,
            labels,
        })
    }

    /// Loads a delimited CSV file with a header row.
    ///
    /// All columns but the last are features, the last one is the label.
    pub fn from_csv(path: impl AsRef<Path>, delimiter: u8) -> Result<Self, ModelError> {
        let file = File::open(path.as_ref())?;
        let data = Self::from_reader(file, delimiter)?;
        log::debug!(
            "Loaded {} rows with {} features from {}",
            data.len(),
            data.feature_size(),
            path.as_ref().display()
        );
        Ok(data)
    }

    /// Parses delimited CSV content with a header row.
    pub fn from_reader<R: Read>(reader: R, delimiter: u8) -> Result<Self, ModelError> {
        let mut rdr = ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .trim(Trim::All)
            .from_reader(reader);

        let headers: Vec<String> = rdr.headers()?.iter().map(String::from).collect();
        if headers.len() < 2 {
            return Err(ModelError::InvalidLayerConfig {
                message: format!(
                    "expected at least one feature column and a label column, found {} column(s)",
                    headers.len()
                ),
            });
        }

        let mut features = Vec::new();
        let mut labels = Vec::new();
        for (row, record) in rdr.records().enumerate() {
            let record = record?;
            let mut values = Vec::with_capacity(record.len());
            for (column, field) in record.iter().enumerate() {
                let value = field.parse::<f32>().map_err(|_| ModelError::InvalidValue {
                    row: row + 1,
                    column: headers[column].clone(),
                    value: field.to_string(),
                })?;
                values.push(value);
            }
            // The reader rejects ragged rows, so there is always a last column.
            let label = values.pop().unwrap_or_default();
            features.push(values);
            labels.push(label);
        }

        if features.is_empty() {
            return Err(ModelError::EmptyDataset);
        }

        let mut feature_names = headers;
        feature_names.pop();

        Ok(Self {
            feature_names,
            features,
            labels,
        })
    }

    /// Returns the number of rows.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Returns true if the dataset has no rows.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Returns the number of feature columns.
    pub fn feature_size(&self) -> usize {
        self.feature_names.len()
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn features(&self) -> &[Vec<f32>] {
        &self.features
    }

    pub fn labels(&self) -> &[f32] {
        &self.labels
    }

    /// Returns a random subset of `round(portion * len)` rows.
    ///
    /// At least one row is kept when the dataset is not empty, even if the
    /// rounded size is zero.
    pub fn sample_fraction<R: Rng + ?Sized>(
        &self,
        portion: f64,
        rng: &mut R,
    ) -> Result<Self, ModelError> {
        if !(0.0..=1.0).contains(&portion) {
            return Err(ModelError::InvalidPortion { portion });
        }

        let len = self.len();
        let amount = ((portion * len as f64).round() as usize).clamp(len.min(1), len);

        let picked = index::sample(rng, len, amount);
        Ok(Self {
            feature_names: self.feature_names.clone(),
            features: picked.iter().map(|i| self.features[i].clone()).collect(),
            labels: picked.iter().map(|i| self.labels[i]).collect(),
        })
    }

    /// Standardizes the feature columns in place and returns the fitted
    /// statistics.
    ///
    /// The statistics are fitted on the very rows they transform.
    pub fn standardize(&mut self) -> Result<Standardizer, ModelError> {
        let standardizer = Standardizer::fit(&self.features)?;
        standardizer.transform(&mut self.features);
        Ok(standardizer)
    }

    /// Converts the rows into dataset items.
    pub fn into_items(self) -> Vec<TabularItem> {
        self.features
            .into_iter()
            .zip(self.labels)
            .map(|(features, label)| TabularItem { features, label })
            .collect()
    }
}
