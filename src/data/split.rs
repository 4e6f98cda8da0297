//! Random train/validation/test partitioning.

use rand::Rng;
use rand::seq::SliceRandom;

use crate::errors::ModelError;

const SUM_TOLERANCE: f64 = 1e-9;

/// Fractions of the dataset assigned to each subset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitFractions {
    pub train: f64,
    pub validation: f64,
    pub test: f64,
}

impl SplitFractions {
    pub fn new(train: f64, validation: f64, test: f64) -> Self {
        Self {
            train,
            validation,
            test,
        }
    }

    /// Checks that no fraction is negative and that they sum to 1.
    ///
    /// The sum may differ from 1 by up to 1e-9, so decimal fractions such as
    /// 0.7/0.2/0.1 whose binary sum is 0.9999999999999999 are accepted.
    pub fn validate(&self) -> Result<(), ModelError> {
        let parts = [self.train, self.validation, self.test];
        if parts.iter().any(|p| p.is_nan() || *p < 0.0) {
            return Err(ModelError::InvalidSplit);
        }
        if (parts.iter().sum::<f64>() - 1.0).abs() > SUM_TOLERANCE {
            return Err(ModelError::InvalidSplit);
        }
        Ok(())
    }

    /// Returns the `(train, validation, test)` sizes for `len` items.
    ///
    /// Train and validation sizes are floored; test takes the remainder.
    pub fn sizes(&self, len: usize) -> Result<(usize, usize, usize), ModelError> {
        self.validate()?;
        let train = ((self.train * len as f64).floor() as usize).min(len);
        let validation = ((self.validation * len as f64).floor() as usize).min(len - train);
        Ok((train, validation, len - train - validation))
    }
}

/// Three disjoint subsets of a dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct Split<T> {
    pub train: Vec<T>,
    pub validation: Vec<T>,
    pub test: Vec<T>,
}

/// Randomly partitions `items` into train, validation and test subsets.
pub fn split<T, R: Rng + ?Sized>(
    mut items: Vec<T>,
    fractions: SplitFractions,
    rng: &mut R,
) -> Result<Split<T>, ModelError> {
    let (train_len, validation_len, _) = fractions.sizes(items.len())?;

    items.shuffle(rng);
    let test = items.split_off(train_len + validation_len);
    let validation = items.split_off(train_len);

    Ok(Split {
        train: items,
        validation,
        test,
    })
}
