use crate::training::TrainingHistory;
use crate::validation::FieldGrid;
use anyhow::Result;
use plotters::prelude::*;

/// Heatmap of the glucose concentration over the (z, r) evaluation grid.
pub fn draw_concentration_map(grid: &FieldGrid, output_path: &str) -> Result<()> {
    let (n_r, n_z) = (grid.n_r, grid.n_z);
    let root = BitMapBackend::new(output_path, (800, 700)).into_drawing_area();
    root.fill(&WHITE)?;

    let c_max = grid
        .concentration
        .iter()
        .cloned()
        .fold(f64::MIN, f64::max)
        .max(1e-12);

    let mut chart = ChartBuilder::on(&root)
        .title("Glucose Concentration", ("sans-serif", 30))
        .margin(20)
        .build_cartesian_2d(0..n_z, 0..n_r)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .draw()?;

    chart.draw_series(
        (0..n_z)
            .flat_map(|z| (0..n_r).map(move |r| (z, r, grid.concentration[[r, z]])))
            .map(|(z, r, c)| {
                let level = (c / c_max).clamp(0.0, 1.0);
                let color = HSLColor(240.0 * (1.0 - level) / 360.0, 0.7, 0.5);
                Rectangle::new([(z, r), (z + 1, r + 1)], color.filled())
            }),
    )?;

    root.present()?;
    println!("Visualization saved to {}", output_path);
    Ok(())
}

/// Total-loss curve over training epochs, log-scaled.
pub fn draw_loss_curve(history: &TrainingHistory, output_path: &str) -> Result<()> {
    let root = BitMapBackend::new(output_path, (800, 500)).into_drawing_area();
    root.fill(&WHITE)?;

    let points: Vec<(f64, f64)> = history
        .epochs
        .iter()
        .filter(|e| e.total.is_finite() && e.total > 0.0)
        .map(|e| (e.epoch as f64, e.total.log10()))
        .collect();
    if points.is_empty() {
        return Ok(());
    }

    let x_max = points.last().map(|p| p.0).unwrap_or(1.0).max(1.0);
    let y_min = points.iter().map(|p| p.1).fold(f64::MAX, f64::min);
    let y_max = points.iter().map(|p| p.1).fold(f64::MIN, f64::max);

    let mut chart = ChartBuilder::on(&root)
        .title("Training Loss (log10)", ("sans-serif", 30))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(0.0..x_max, (y_min - 0.5)..(y_max + 0.5))?;

    chart.configure_mesh().x_desc("Epoch").y_desc("log10 total loss").draw()?;
    chart.draw_series(LineSeries::new(points, &BLUE))?;

    root.present()?;
    println!("Visualization saved to {}", output_path);
    Ok(())
}
