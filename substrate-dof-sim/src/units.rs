//! Natural-unit constants for the substrate model.
//!
//! Everything is dimensionless: c = 1 and lengths are measured in
//! Planck lengths, so smear ŝ = |v|/c and load λ̂ are both pure ratios.

/// Speed of light (natural units)
pub const C: f64 = 1.0;

/// Pi
pub const PI: f64 = std::f64::consts::PI;

/// Default lattice spacing (Planck lengths)
pub const PLANCK_LENGTH: f64 = 1.0;

/// Ceiling applied to measured smear and load so Γ stays finite.
pub const PARAMETER_CEILING: f64 = 0.999;

/// Grids above this many voxels are outside the toy regime.
pub const TOY_VOXEL_LIMIT: usize = 1_000;

/// Clamp a measured smear/load ratio into [0, PARAMETER_CEILING].
/// NaN maps to 0.
pub fn clamp_ratio(x: f64) -> f64 {
    if x.is_nan() {
        return 0.0;
    }
    x.clamp(0.0, PARAMETER_CEILING)
}

/// `n` evenly spaced samples over [start, end], inclusive (numpy `linspace`).
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n).map(|i| start + step * i as f64).collect()
        }
    }
}
