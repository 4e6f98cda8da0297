//! Per-column standardization.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

/// Per-column mean and standard deviation.
///
/// Uses the population standard deviation. Columns with zero deviation are
/// scaled by 1 so that constant features map to 0 instead of NaN.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Standardizer {
    pub means: Vec<f32>,
    pub stds: Vec<f32>,
}

impl Standardizer {
    /// Fits the statistics of every column of `rows`.
    pub fn fit(rows: &[Vec<f32>]) -> Result<Self, ModelError> {
        let width = rows.first().map(|r| r.len()).ok_or(ModelError::EmptyDataset)?;
        let count = rows.len() as f64;

        let mut sums = vec![0.0f64; width];
        for row in rows {
            if row.len() != width {
                return Err(ModelError::ShapeMismatch {
                    expected: width,
                    actual: row.len(),
                });
            }
            for (sum, &value) in sums.iter_mut().zip(row) {
                *sum += f64::from(value);
            }
        }
        let means: Vec<f64> = sums.into_iter().map(|s| s / count).collect();

        let mut squares = vec![0.0f64; width];
        for row in rows {
            for ((square, &value), mean) in squares.iter_mut().zip(row).zip(&means) {
                let diff = f64::from(value) - mean;
                *square += diff * diff;
            }
        }

        let stds = squares
            .into_iter()
            .map(|s| {
                let std = (s / count).sqrt();
                if std == 0.0 { 1.0 } else { std as f32 }
            })
            .collect();

        Ok(Self {
            means: means.into_iter().map(|m| m as f32).collect(),
            stds,
        })
    }

    /// Returns the number of columns the statistics were fitted on.
    pub fn feature_size(&self) -> usize {
        self.means.len()
    }

    /// Standardizes a single row in place.
    pub fn transform_row(&self, row: &mut [f32]) -> Result<(), ModelError> {
        if row.len() != self.feature_size() {
            return Err(ModelError::ShapeMismatch {
                expected: self.feature_size(),
                actual: row.len(),
            });
        }
        for ((value, mean), std) in row.iter_mut().zip(&self.means).zip(&self.stds) {
            *value = (*value - mean) / std;
        }
        Ok(())
    }

    /// Standardizes every row in place.
    ///
    /// Rows must have the fitted width; this holds for the rows passed to
    /// [`Standardizer::fit`].
    pub fn transform(&self, rows: &mut [Vec<f32>]) {
        for row in rows {
            for ((value, mean), std) in row.iter_mut().zip(&self.means).zip(&self.stds) {
                *value = (*value - mean) / std;
            }
        }
    }

    /// Writes the statistics as JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ModelError> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Reads statistics written by [`Standardizer::save`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let json = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_mean_and_population_std() {
        let rows = vec![vec![1.0, 10.0], vec![3.0, 10.0], vec![5.0, 10.0]];
        let standardizer = Standardizer::fit(&rows).unwrap();

        assert!((standardizer.means[0] - 3.0).abs() < 1e-6);
        assert!((standardizer.means[1] - 10.0).abs() < 1e-6);
        // sqrt(((1-3)^2 + 0 + (5-3)^2) / 3) = sqrt(8/3)
        assert!((standardizer.stds[0] - (8.0f32 / 3.0).sqrt()).abs() < 1e-6);
        // constant column
        assert!((standardizer.stds[1] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_transform_gives_zero_mean_unit_variance() {
        let mut rows: Vec<Vec<f32>> = (0..50)
            .map(|i| vec![i as f32 * 2.5 + 7.0, (i % 7) as f32])
            .collect();
        let standardizer = Standardizer::fit(&rows).unwrap();
        standardizer.transform(&mut rows);

        for column in 0..2 {
            let values: Vec<f32> = rows.iter().map(|r| r[column]).collect();
            let mean = values.iter().sum::<f32>() / values.len() as f32;
            let var = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f32>()
                / values.len() as f32;
            assert!(mean.abs() < 1e-4, "column {column} mean {mean}");
            assert!((var - 1.0).abs() < 1e-3, "column {column} variance {var}");
        }
    }

    #[test]
    fn test_transform_row_checks_width() {
        let standardizer = Standardizer {
            means: vec![1.0, 2.0],
            stds: vec![2.0, 4.0],
        };

        let mut row = [3.0, 2.0];
        standardizer.transform_row(&mut row).unwrap();
        assert_eq!(row, [1.0, 0.0]);

        let mut short = [1.0];
        assert!(matches!(
            standardizer.transform_row(&mut short),
            Err(ModelError::ShapeMismatch {
                expected: 2,
                actual: 1
            })
        ));
    }

    #[test]
    fn test_fit_empty_rows() {
        assert!(matches!(
            Standardizer::fit(&[]),
            Err(ModelError::EmptyDataset)
        ));
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join(format!(
            "binmlp-standardizer-{}.json",
            std::process::id()
        ));
        let standardizer = Standardizer {
            means: vec![0.5, -1.0],
            stds: vec![1.5, 3.0],
        };

        standardizer.save(&path).unwrap();
        let loaded = Standardizer::load(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(loaded, standardizer);
    }
}
