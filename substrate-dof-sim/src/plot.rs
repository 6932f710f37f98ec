//! SVG figures.
//!
//! Each `plot_*` function writes one file into `out_dir` and returns its path.

use std::error::Error;
use std::f64::consts::FRAC_PI_2;
use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};

use plotters::coord::Shift;
use plotters::prelude::*;

use crate::causal_diamond::CausalDiamondThrottling;
use crate::config::ExperimentConfig;
use crate::error::{SubstrateError, SubstrateResult};
use crate::substrate::SubstrateNetwork;
use crate::sweep::{dilation_surface, GridField, ParameterGrid};
use crate::tension_bandgap::{DispersionCurve, SpectrumSplit, TensionInducedBandgaps};

type DrawResult<T> = Result<T, Box<dyn Error>>;
type Panel<'a> = DrawingArea<SVGBackend<'a>, Shift>;

pub const BANDGAP_PANELS: [(f64, f64, &str); 4] = [
    (0.0, 0.0, "No load"),
    (0.5, 0.0, "Pure motion"),
    (0.0, 0.5, "Pure curvature"),
    (0.3, 0.4, "Combined"),
];

pub const DISPERSION_PANELS: [(f64, f64, &str); 4] = [
    (0.0, 0.0, "No load"),
    (0.3, 0.0, "Motion only"),
    (0.0, 0.3, "Curvature only"),
    (0.2, 0.2, "Combined"),
];

const SERIES_COLORS: [RGBColor; 4] = [BLUE, RED, GREEN, MAGENTA];

/// Segments used for the quarter capacity circle; every other one is drawn.
const CIRCLE_SEGMENTS: usize = 60;

#[derive(Debug, Clone, Copy)]
enum Scale {
    Linear,
    Log,
}

fn svg_root(path: &Path, size: (u32, u32)) -> SVGBackend<'_> {
    log::info!("write {}", path.display());
    SVGBackend::new(path, size)
}

fn prepare(out_dir: &Path, file_name: &str) -> SubstrateResult<PathBuf> {
    fs::create_dir_all(out_dir)?;
    Ok(out_dir.join(file_name))
}

fn plot_err(err: Box<dyn Error>) -> SubstrateError {
    SubstrateError::Plot(err.to_string())
}

fn half_step(values: &[f64]) -> f64 {
    match values {
        [a, b, ..] => (b - a).abs() / 2.0,
        _ => 0.5,
    }
}

/// Axis range that puts every sample at the centre of its cell.
fn axis_range(values: &[f64]) -> Range<f64> {
    let h = half_step(values);
    let lo = values.first().copied().unwrap_or(0.0) - h;
    let hi = values.last().copied().unwrap_or(1.0) + h;
    lo..hi
}

/// Blue (low) to yellow (high).
fn heat_color(t: f64) -> HSLColor {
    HSLColor((240.0 - 180.0 * t) / 360.0, 0.85, 0.25 + 0.45 * t)
}

fn draw_heatmap(
    area: &Panel<'_>,
    title: &str,
    field: &GridField,
    scale: Scale,
    show_capacity: bool,
) -> DrawResult<()> {
    let (Some(lo), Some(hi)) = (field.min(), field.max()) else {
        area.titled(&format!("{} (no admissible cells)", title), ("sans-serif", 18))?;
        return Ok(());
    };
    let normalize = |v: f64| -> f64 {
        let t = match scale {
            Scale::Log if lo > 0.0 => (v / lo).ln() / (hi / lo).ln(),
            _ => (v - lo) / (hi - lo),
        };
        if t.is_finite() {
            t.clamp(0.0, 1.0)
        } else {
            0.0
        }
    };

    let x_range = axis_range(&field.s_values);
    let y_range = axis_range(&field.lambda_values);
    let mut chart = ChartBuilder::on(area)
        .caption(format!("{}  [{:.3}, {:.3}]", title, lo, hi), ("sans-serif", 18))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(x_range.clone(), y_range.clone())?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc("ŝ (kinematic smear)")
        .y_desc("λ̂ (gravitational load)")
        .draw()?;

    let hs = half_step(&field.s_values);
    let hl = half_step(&field.lambda_values);
    chart.draw_series(field.cells().map(|(s, l, v)| {
        Rectangle::new(
            [(s - hs, l - hl), (s + hs, l + hl)],
            heat_color(normalize(v)).filled(),
        )
    }))?;

    if show_capacity {
        let arc: Vec<(f64, f64)> = (0..=CIRCLE_SEGMENTS)
            .map(|i| {
                let theta = FRAC_PI_2 * i as f64 / CIRCLE_SEGMENTS as f64;
                (theta.cos(), theta.sin())
            })
            .collect();
        let inside = |&(x, y): &(f64, f64)| x_range.contains(&x) && y_range.contains(&y);
        chart
            .draw_series(
                arc.windows(2)
                    .step_by(2)
                    .filter(|w| inside(&w[0]) && inside(&w[1]))
                    .map(|w| PathElement::new(vec![w[0], w[1]], RED.stroke_width(2))),
            )?
            .label("ŝ² + λ̂² = 1")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED));
        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
    }
    Ok(())
}

/// Heatmap of Γ(ŝ, λ̂) with the capacity boundary dashed in red.
pub fn plot_dilation_surface(
    substrate: &SubstrateNetwork,
    grid: &ParameterGrid,
    p: f64,
    out_dir: &Path,
) -> SubstrateResult<PathBuf> {
    let path = prepare(out_dir, "dilation_surface.svg")?;
    let field = dilation_surface(substrate, grid, p);
    draw_dilation_surface(&path, &field, p).map_err(plot_err)?;
    Ok(path)
}

fn draw_dilation_surface(path: &Path, field: &GridField, p: f64) -> DrawResult<()> {
    let root = svg_root(path, (800, 700)).into_drawing_area();
    root.fill(&WHITE)?;
    draw_heatmap(&root, &format!("Γ(ŝ, λ̂), p = {}", p), field, Scale::Log, true)?;
    root.present()?;
    Ok(())
}

/// Diamond volume and DoF fraction side by side.
pub fn plot_diamond_evolution(
    mechanism: &CausalDiamondThrottling,
    grid: &ParameterGrid,
    out_dir: &Path,
) -> SubstrateResult<PathBuf> {
    let path = prepare(out_dir, "diamond_evolution.svg")?;
    let evolution = mechanism.diamond_evolution(grid);
    draw_diamond_evolution(&path, &evolution.volume, &evolution.dof).map_err(plot_err)?;
    Ok(path)
}

fn draw_diamond_evolution(path: &Path, volume: &GridField, dof: &GridField) -> DrawResult<()> {
    let root = svg_root(path, (1400, 650)).into_drawing_area();
    root.fill(&WHITE)?;
    let panels = root.split_evenly((1, 2));
    draw_heatmap(&panels[0], "Causal diamond volume", volume, Scale::Linear, false)?;
    draw_heatmap(&panels[1], "DoF fraction", dof, Scale::Linear, false)?;
    root.present()?;
    Ok(())
}

/// Accessible (green) and blocked (red) modes for the four load regimes.
pub fn plot_bandgap_evolution(
    mechanism: &TensionInducedBandgaps,
    out_dir: &Path,
) -> SubstrateResult<PathBuf> {
    let path = prepare(out_dir, "bandgap_evolution.svg")?;
    let splits = mechanism.bandgap_evolution(&BANDGAP_PANELS);
    draw_bandgap_evolution(&path, mechanism, &splits).map_err(plot_err)?;
    Ok(path)
}

fn draw_bandgap_evolution(
    path: &Path,
    mechanism: &TensionInducedBandgaps,
    splits: &[SpectrumSplit],
) -> DrawResult<()> {
    let root = svg_root(path, (1200, 900)).into_drawing_area();
    root.fill(&WHITE)?;
    let half_width = 0.4 * half_step(mechanism.base_frequencies()).max(1e-3) * 2.0;

    for (panel, split) in root.split_evenly((2, 2)).iter().zip(splits) {
        let total = split.accessible.len() + split.blocked.len();
        let dof = if total == 0 {
            0.0
        } else {
            split.accessible.len() as f64 / total as f64
        };
        let mut chart = ChartBuilder::on(panel)
            .caption(
                format!(
                    "{} (ŝ={:.1}, λ̂={:.1})  DoF = {:.2}",
                    split.label, split.s_hat, split.lambda_hat, dof
                ),
                ("sans-serif", 18),
            )
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(40)
            .build_cartesian_2d(mechanism.freq_min..mechanism.freq_max, 0.0..1.2)?;

        chart
            .configure_mesh()
            .disable_y_mesh()
            .x_desc("mode frequency")
            .y_labels(0)
            .draw()?;

        chart
            .draw_series(split.accessible.iter().map(|&f| {
                Rectangle::new([(f - half_width, 0.0), (f + half_width, 1.0)], GREEN.mix(0.7).filled())
            }))?
            .label("accessible")
            .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 15, y + 5)], GREEN.filled()));
        chart
            .draw_series(split.blocked.iter().map(|&f| {
                Rectangle::new([(f - half_width, 0.0), (f + half_width, 1.0)], RED.mix(0.7).filled())
            }))?
            .label("blocked")
            .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 15, y + 5)], RED.filled()));

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
    }
    root.present()?;
    Ok(())
}

/// Split a sampled curve wherever a bandgap removes modes, so lines do not
/// bridge the gap.
fn contiguous_runs(frequencies: &[f64], speeds: &[f64], step: f64) -> Vec<Vec<(f64, f64)>> {
    let mut runs: Vec<Vec<(f64, f64)>> = Vec::new();
    let mut prev: Option<f64> = None;
    for (&f, &c) in frequencies.iter().zip(speeds) {
        if prev.map_or(true, |p| f - p > 1.5 * step) {
            runs.push(Vec::new());
        }
        if let Some(run) = runs.last_mut() {
            run.push((f, c));
        }
        prev = Some(f);
    }
    runs
}

/// Effective propagation speed per accessible mode, plus a DoF bar chart.
pub fn plot_dispersion_curves(
    mechanism: &TensionInducedBandgaps,
    out_dir: &Path,
) -> SubstrateResult<PathBuf> {
    let path = prepare(out_dir, "dispersion_curves.svg")?;
    let curves = mechanism.dispersion_curves(&DISPERSION_PANELS);
    draw_dispersion_curves(&path, mechanism, &curves).map_err(plot_err)?;
    Ok(path)
}

fn draw_dispersion_curves(
    path: &Path,
    mechanism: &TensionInducedBandgaps,
    curves: &[DispersionCurve],
) -> DrawResult<()> {
    let root = svg_root(path, (1400, 600)).into_drawing_area();
    root.fill(&WHITE)?;
    let (left, right) = root.split_horizontally(840);
    let step = 2.0 * half_step(mechanism.base_frequencies());

    let mut lines = ChartBuilder::on(&left)
        .caption("Dispersion c_eff(f)", ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(mechanism.freq_min..mechanism.freq_max, 0.0..1.05)?;
    lines
        .configure_mesh()
        .x_desc("mode frequency")
        .y_desc("effective speed / c")
        .draw()?;

    for (i, curve) in curves.iter().enumerate() {
        let color = SERIES_COLORS[i % SERIES_COLORS.len()];
        let runs = contiguous_runs(&curve.frequencies, &curve.speeds, step);
        for (k, run) in runs.into_iter().enumerate() {
            let anno = lines.draw_series(LineSeries::new(run, color.stroke_width(2)))?;
            if k == 0 {
                anno.label(curve.label.as_str())
                    .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
            }
        }
    }
    lines
        .configure_series_labels()
        .position(SeriesLabelPosition::LowerLeft)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    let labels: Vec<&str> = curves.iter().map(|c| c.label.as_str()).collect();
    let n = curves.len().max(1);
    let mut bars = ChartBuilder::on(&right)
        .caption("Accessible DoF fraction", ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(-0.5..(n as f64 - 0.5), 0.0..1.05)?;
    bars.configure_mesh()
        .disable_x_mesh()
        .x_labels(n)
        .x_label_formatter(&|x| {
            let idx = x.round();
            if idx < 0.0 {
                return String::new();
            }
            labels.get(idx as usize).map(|l| l.to_string()).unwrap_or_default()
        })
        .y_desc("DoF fraction")
        .draw()?;
    bars.draw_series(curves.iter().enumerate().map(|(i, curve)| {
        let x = i as f64;
        Rectangle::new(
            [(x - 0.35, 0.0), (x + 0.35, curve.dof_fraction)],
            SERIES_COLORS[i % SERIES_COLORS.len()].mix(0.8).filled(),
        )
    }))?;

    root.present()?;
    Ok(())
}

/// Every figure for one configuration, in a fixed order.
pub fn render_all(config: &ExperimentConfig, out_dir: &Path) -> SubstrateResult<Vec<PathBuf>> {
    config.validate()?;
    let substrate = SubstrateNetwork::from_config(&config.substrate)?;
    let grid = ParameterGrid::from_config(&config.sweep);
    let diamond = CausalDiamondThrottling::from_config(&config.diamond);
    let bandgap = TensionInducedBandgaps::from_config(&config.bandgap);

    Ok(vec![
        plot_dilation_surface(&substrate, &grid, config.substrate.dilation_exponent, out_dir)?,
        plot_diamond_evolution(&diamond, &grid, out_dir)?,
        plot_bandgap_evolution(&bandgap, out_dir)?,
        plot_dispersion_curves(&bandgap, out_dir)?,
    ])
}
