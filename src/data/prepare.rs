//! Settings-driven loading: read, sample, standardize, split.

use rand::Rng;

use super::{Split, Standardizer, TabularData, TabularItem, split};
use crate::errors::ModelError;
use crate::settings::Settings;

/// Dataset ready to be turned into loaders.
#[derive(Debug, Clone)]
pub struct PreparedData {
    pub feature_names: Vec<String>,
    /// Statistics applied to every row, when standardization is enabled.
    pub standardizer: Option<Standardizer>,
    pub split: Split<TabularItem>,
}

impl PreparedData {
    pub fn feature_size(&self) -> usize {
        self.feature_names.len()
    }
}

/// Runs the data pipeline on an already loaded table.
pub fn prepare<R: Rng + ?Sized>(
    data: TabularData,
    settings: &Settings,
    rng: &mut R,
) -> Result<PreparedData, ModelError> {
    settings.fractions().validate()?;

    let mut data = data.sample_fraction(settings.data_portion, rng)?;
    let standardizer = if settings.standardize {
        Some(data.standardize()?)
    } else {
        None
    };
    let feature_names = data.feature_names().to_vec();
    let split = split(data.into_items(), settings.fractions(), rng)?;

    log::debug!(
        "Split into {} train, {} validation and {} test rows",
        split.train.len(),
        split.validation.len(),
        split.test.len()
    );

    Ok(PreparedData {
        feature_names,
        standardizer,
        split,
    })
}

/// Reads `settings.data_path` and runs [`prepare`] on it.
pub fn load_and_prepare<R: Rng + ?Sized>(
    settings: &Settings,
    rng: &mut R,
) -> Result<PreparedData, ModelError> {
    let data = TabularData::from_csv(&settings.data_path, settings.delimiter_byte()?)?;
    prepare(data, settings, rng)
}
