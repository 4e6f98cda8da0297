//! Brute-force hyper-parameter sweep over (learning rate, gamma).
//!
//! Every grid point retrains a fresh model from scratch with the base
//! [`TrainingConfig`], overriding only the learning rate and the decay factor.

use std::str::FromStr;

use burn::{module::AutodiffModule, tensor::backend::AutodiffBackend};

use crate::data::BatchLoader;
use crate::errors::ModelError;
use crate::model::BinaryClassifier;
use crate::training::{self, EvalMetrics, TrainingConfig};

/// `steps` evenly spaced values from `start` to `end`, both included.
pub fn linspace(start: f64, end: f64, steps: usize) -> Vec<f64> {
    match steps {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (steps - 1) as f64;
            (0..steps).map(|i| start + step * i as f64).collect()
        }
    }
}

/// One swept axis, written `START:END:STEPS` on the command line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridAxis {
    pub start: f64,
    pub end: f64,
    pub steps: usize,
}

impl GridAxis {
    pub fn new(start: f64, end: f64, steps: usize) -> Self {
        Self { start, end, steps }
    }

    pub fn values(&self) -> Vec<f64> {
        linspace(self.start, self.end, self.steps)
    }
}

impl FromStr for GridAxis {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |message: &str| ModelError::InvalidGridRange {
            range: s.to_string(),
            message: message.to_string(),
        };

        let parts: Vec<&str> = s.split(':').map(str::trim).collect();
        let [start, end, steps] = parts.as_slice() else {
            return Err(invalid("expected START:END:STEPS"));
        };
        let start: f64 = start.parse().map_err(|_| invalid("START is not a number"))?;
        let end: f64 = end.parse().map_err(|_| invalid("END is not a number"))?;
        let steps: usize = steps
            .parse()
            .map_err(|_| invalid("STEPS is not a non-negative integer"))?;
        if steps == 0 {
            return Err(invalid("STEPS must be at least 1"));
        }
        if !start.is_finite() || !end.is_finite() {
            return Err(invalid("bounds must be finite"));
        }

        Ok(Self { start, end, steps })
    }
}

/// The two axes of the sweep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSearchConfig {
    pub learning_rate: GridAxis,
    pub gamma: GridAxis,
}

impl GridSearchConfig {
    pub fn new(learning_rate: GridAxis, gamma: GridAxis) -> Self {
        Self {
            learning_rate,
            gamma,
        }
    }

    /// Number of models trained by the sweep.
    pub fn len(&self) -> usize {
        self.learning_rate.steps * self.gamma.steps
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Final metrics of the model trained at one grid point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridPoint {
    pub learning_rate: f64,
    pub gamma: f64,
    /// Training metrics of the last epoch.
    pub train: EvalMetrics,
    pub test: EvalMetrics,
}

/// All grid points, learning rate major.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GridSearchReport {
    pub learning_rates: Vec<f64>,
    pub gammas: Vec<f64>,
    pub points: Vec<GridPoint>,
}

impl GridSearchReport {
    /// Point with the lowest final training loss.
    pub fn best_train(&self) -> Option<&GridPoint> {
        self.points
            .iter()
            .min_by(|a, b| a.train.loss.total_cmp(&b.train.loss))
    }

    /// Point with the lowest test loss.
    pub fn best_test(&self) -> Option<&GridPoint> {
        self.points
            .iter()
            .min_by(|a, b| a.test.loss.total_cmp(&b.test.loss))
    }

    /// Point trained with exactly this learning rate and gamma.
    pub fn point(&self, learning_rate: f64, gamma: f64) -> Option<&GridPoint> {
        let i = self.learning_rates.iter().position(|lr| *lr == learning_rate)?;
        let j = self.gammas.iter().position(|g| *g == gamma)?;
        self.points.get(i * self.gammas.len() + j)
    }

    /// Logs one line per grid point.
    pub fn log_table(&self) {
        log::info!(
            "{:>12} {:>8} {:>10} {:>10} {:>10} {:>10}",
            "lr",
            "gamma",
            "train_loss",
            "train_acc",
            "test_loss",
            "test_acc"
        );
        for point in &self.points {
            log::info!(
                "{:>12.6} {:>8.4} {:>10.5} {:>10.5} {:>10.5} {:>10.5}",
                point.learning_rate,
                point.gamma,
                point.train.loss,
                point.train.accuracy,
                point.test.loss,
                point.test.accuracy
            );
        }
    }
}

/// Trains one model per (learning rate, gamma) pair.
///
/// `make_model` is called once per grid point and must return a freshly
/// initialized model.
pub fn grid_search<B, F>(
    mut make_model: F,
    train_loader: &BatchLoader<B>,
    val_loader: Option<&BatchLoader<B::InnerBackend>>,
    test_loader: &BatchLoader<B::InnerBackend>,
    base: &TrainingConfig,
    grid: &GridSearchConfig,
) -> Result<GridSearchReport, ModelError>
where
    B: AutodiffBackend,
    F: FnMut() -> Result<BinaryClassifier<B>, ModelError>,
{
    let learning_rates = grid.learning_rate.values();
    let gammas = grid.gamma.values();
    let total = learning_rates.len() * gammas.len();
    let mut points = Vec::with_capacity(total);

    for &learning_rate in &learning_rates {
        for &gamma in &gammas {
            log::info!(
                "Grid point {}/{}: lr={:.6}, gamma={:.4}",
                points.len() + 1,
                total,
                learning_rate,
                gamma
            );

            let config = base
                .clone()
                .learning_rate(learning_rate)
                .scheduler(base.scheduler_step_size, gamma)
                .verbose(false)
                .plot_path(None);
            let result = training::train(make_model()?, train_loader, val_loader, &config)?;
            let test = training::test(&result.model.valid(), test_loader, false);

            points.push(GridPoint {
                learning_rate,
                gamma,
                train: result.metrics.train(),
                test,
            });
        }
    }

    let report = GridSearchReport {
        learning_rates,
        gammas,
        points,
    };
    report.log_table();
    if let Some(best) = report.best_train() {
        log::info!(
            "Lowest train loss {:.5} at lr={:.6}, gamma={:.4}",
            best.train.loss,
            best.learning_rate,
            best.gamma
        );
    }
    if let Some(best) = report.best_test() {
        log::info!(
            "Lowest test loss {:.5} at lr={:.6}, gamma={:.4}",
            best.test.loss,
            best.learning_rate,
            best.gamma
        );
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{TabularItem, build_eval_loader, build_loader};
    use crate::model::BinaryClassifierConfig;
    use burn::backend::{Autodiff, NdArray};
    use burn::tensor::backend::Backend;

    type InnerBackend = NdArray;
    type TestBackend = Autodiff<InnerBackend>;

    #[test]
    fn test_linspace() {
        assert_eq!(linspace(0.0, 1.0, 5), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        assert_eq!(linspace(0.3, 0.9, 1), vec![0.3]);
        assert!(linspace(0.0, 1.0, 0).is_empty());

        let descending = linspace(1.0, 0.0, 3);
        assert_eq!(descending, vec![1.0, 0.5, 0.0]);
    }

    #[test]
    fn test_parse_axis() {
        let axis: GridAxis = "0.001:0.01:4".parse().unwrap();
        assert_eq!(axis, GridAxis::new(0.001, 0.01, 4));
        assert_eq!(axis.values().len(), 4);

        let axis: GridAxis = " 0.5 : 0.5 : 1 ".parse().unwrap();
        assert_eq!(axis.values(), vec![0.5]);

        for bad in ["0.1:0.2", "a:0.2:3", "0.1:0.2:-1", "0.1:0.2:0", "0.1:0.2:3:4"] {
            assert!(
                matches!(
                    bad.parse::<GridAxis>(),
                    Err(ModelError::InvalidGridRange { .. })
                ),
                "{bad} should be rejected"
            );
        }
    }

    fn point(learning_rate: f64, gamma: f64, train_loss: f64, test_loss: f64) -> GridPoint {
        GridPoint {
            learning_rate,
            gamma,
            train: EvalMetrics {
                loss: train_loss,
                accuracy: 0.5,
            },
            test: EvalMetrics {
                loss: test_loss,
                accuracy: 0.5,
            },
        }
    }

    #[test]
    fn test_best_points() {
        let report = GridSearchReport {
            learning_rates: vec![0.1, 0.2],
            gammas: vec![0.5, 0.9],
            points: vec![
                point(0.1, 0.5, 0.40, 0.70),
                point(0.1, 0.9, 0.30, 0.60),
                point(0.2, 0.5, 0.20, 0.65),
                point(0.2, 0.9, 0.25, 0.55),
            ],
        };

        let best = report.best_train().unwrap();
        assert_eq!((best.learning_rate, best.gamma), (0.2, 0.5));
        let best = report.best_test().unwrap();
        assert_eq!((best.learning_rate, best.gamma), (0.2, 0.9));

        let found = report.point(0.1, 0.9).unwrap();
        assert!((found.train.loss - 0.30).abs() < 1e-12);
        assert!(report.point(0.3, 0.9).is_none());

        assert!(GridSearchReport::default().best_train().is_none());
    }

    #[test]
    fn test_grid_search_trains_every_pair() {
        let device = <TestBackend as Backend>::Device::default();
        let items: Vec<TabularItem> = (0..24)
            .map(|i| TabularItem {
                features: vec![i as f32 / 24.0, 1.0 - i as f32 / 24.0],
                label: (i % 2) as f32,
            })
            .collect();
        let train_loader = build_loader::<TestBackend>(items.clone(), 8, 1, &device);
        let test_loader = build_eval_loader::<InnerBackend>(items, 8, &device);

        let grid = GridSearchConfig::new(GridAxis::new(0.001, 0.01, 2), GridAxis::new(0.1, 0.9, 3));
        let base = TrainingConfig::new().epochs(1);

        let mut built = 0;
        let report = grid_search(
            || {
                built += 1;
                BinaryClassifierConfig::new(2).init::<TestBackend>(&device)
            },
            &train_loader,
            None,
            &test_loader,
            &base,
            &grid,
        )
        .unwrap();

        assert_eq!(built, 6);
        assert_eq!(grid.len(), 6);
        assert_eq!(report.points.len(), 6);
        assert_eq!(report.points[1].learning_rate, 0.001);
        assert!((report.points[1].gamma - 0.5).abs() < 1e-12);
        assert!(report.points.iter().all(|p| p.test.loss > 0.0));
        assert!(report.best_test().is_some());
    }
}
