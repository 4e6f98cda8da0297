//! SVG charts for training curves and grid-search results.

use std::fmt::Display;
use std::ops::Range;
use std::path::Path;

use plotters::coord::Shift;
use plotters::prelude::*;

use crate::errors::ModelError;
use crate::grid_search::{GridPoint, GridSearchReport};
use crate::training::MetricsRecorder;

const CURVES_SIZE: (u32, u32) = (900, 900);
const SURFACES_SIZE: (u32, u32) = (1200, 1000);

fn plot_error(e: impl Display) -> ModelError {
    ModelError::Plot {
        message: e.to_string(),
    }
}

/// Draws train vs validation loss (top) and accuracy (bottom) per epoch.
pub fn training_curves(
    recorder: &MetricsRecorder,
    path: &Path,
    title: Option<&str>,
) -> Result<(), ModelError> {
    let root = SVGBackend::new(path, CURVES_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(plot_error)?;
    let root = match title {
        Some(title) => root.titled(title, ("sans-serif", 28)).map_err(plot_error)?,
        None => root,
    };

    let areas = root.split_evenly((2, 1));
    let max_loss = recorder
        .train_loss_history()
        .iter()
        .chain(recorder.val_loss_history())
        .copied()
        .filter(|loss| loss.is_finite())
        .fold(0.0, f64::max);

    draw_curves(
        &areas[0],
        "Loss",
        recorder.train_loss_history(),
        recorder.val_loss_history(),
        0.0..(max_loss * 1.1).max(1e-3),
    )?;
    draw_curves(
        &areas[1],
        "Accuracy",
        recorder.train_acc_history(),
        recorder.val_acc_history(),
        0.0..1.0,
    )?;

    root.present().map_err(plot_error)
}

fn draw_curves<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    caption: &str,
    train: &[f64],
    validation: &[f64],
    y_range: Range<f64>,
) -> Result<(), ModelError> {
    let epochs = train.len().max(1) as f64;
    let mut chart = ChartBuilder::on(area)
        .caption(caption, ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(50)
        .build_cartesian_2d(0.0..epochs, y_range)
        .map_err(plot_error)?;

    chart
        .configure_mesh()
        .x_desc("epoch")
        .y_desc(caption)
        .draw()
        .map_err(plot_error)?;

    for (label, values, color) in [("train", train, BLUE), ("validation", validation, RED)] {
        chart
            .draw_series(LineSeries::new(
                values.iter().enumerate().map(|(i, v)| (i as f64 + 1.0, *v)),
                &color,
            ))
            .map_err(plot_error)?
            .label(label)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(plot_error)
}

/// Draws four 3-D surfaces (train loss, train accuracy, test loss, test
/// accuracy) over the (learning rate, gamma) grid.
pub fn grid_surfaces(report: &GridSearchReport, path: &Path) -> Result<(), ModelError> {
    let root = SVGBackend::new(path, SURFACES_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(plot_error)?;

    let panels: [(&str, fn(&GridPoint) -> f64); 4] = [
        ("Train loss", |p| p.train.loss),
        ("Train accuracy", |p| p.train.accuracy),
        ("Test loss", |p| p.test.loss),
        ("Test accuracy", |p| p.test.accuracy),
    ];

    let areas = root.split_evenly((2, 2));
    for (area, (caption, metric)) in areas.iter().zip(panels) {
        draw_surface(area, caption, report, metric)?;
    }

    root.present().map_err(plot_error)
}

fn draw_surface<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    caption: &str,
    report: &GridSearchReport,
    metric: fn(&GridPoint) -> f64,
) -> Result<(), ModelError> {
    let values: Vec<f64> = report.points.iter().map(metric).collect();

    let mut chart = ChartBuilder::on(area)
        .caption(caption, ("sans-serif", 20))
        .margin(10)
        .build_cartesian_3d(
            axis_range(&report.learning_rates),
            axis_range(&values),
            axis_range(&report.gammas),
        )
        .map_err(plot_error)?;

    chart.with_projection(|mut projection| {
        projection.yaw = 0.5;
        projection.scale = 0.9;
        projection.into_matrix()
    });

    chart
        .configure_axes()
        .light_grid_style(BLACK.mix(0.15))
        .max_light_lines(3)
        .draw()
        .map_err(plot_error)?;

    chart
        .draw_series(
            SurfaceSeries::xoz(
                report.learning_rates.iter().copied(),
                report.gammas.iter().copied(),
                |lr, gamma| report.point(lr, gamma).map(metric).unwrap_or(0.0),
            )
            .style(BLUE.mix(0.3).filled()),
        )
        .map_err(plot_error)?;

    Ok(())
}

/// Min..max of `values`, widened when every value is the same.
fn axis_range(values: &[f64]) -> Range<f64> {
    let (min, max) = values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });

    if min > max {
        0.0..1.0
    } else if max - min < 1e-12 {
        let pad = (min.abs() * 0.1).max(1e-3);
        (min - pad)..(max + pad)
    } else {
        min..max
    }
}
