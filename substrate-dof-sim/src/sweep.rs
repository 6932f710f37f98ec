//! Parameter sweeps over the (ŝ, λ̂) plane.
//!
//! Grids follow meshgrid layout: rows run over λ̂, columns over ŝ, so
//! `values[row][col]` is the field at (ŝ = s_values[col], λ̂ = lambda_values[row]).
//! Cells outside the capacity budget, or where the field is undefined, are
//! `None`.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::config::SweepConfig;
use crate::substrate::SubstrateNetwork;
use crate::units::linspace;

/// Sample axes for a sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterGrid {
    pub s_values: Vec<f64>,
    pub lambda_values: Vec<f64>,
}

/// A scalar field sampled on a [`ParameterGrid`].
#[derive(Debug, Clone, PartialEq)]
pub struct GridField {
    pub s_values: Vec<f64>,
    pub lambda_values: Vec<f64>,
    pub values: Vec<Vec<Option<f64>>>,
}

impl ParameterGrid {
    /// `resolution` evenly spaced samples along each axis.
    pub fn new(s_range: (f64, f64), lambda_range: (f64, f64), resolution: usize) -> Self {
        Self {
            s_values: linspace(s_range.0, s_range.1, resolution),
            lambda_values: linspace(lambda_range.0, lambda_range.1, resolution),
        }
    }

    pub fn from_config(config: &SweepConfig) -> Self {
        Self::new(
            (config.s_range[0], config.s_range[1]),
            (config.lambda_range[0], config.lambda_range[1]),
            config.resolution,
        )
    }

    /// (rows, cols) = (#λ̂ samples, #ŝ samples)
    pub fn shape(&self) -> (usize, usize) {
        (self.lambda_values.len(), self.s_values.len())
    }

    /// Evaluate `f(ŝ, λ̂)` at every grid point.
    pub fn sweep<F>(&self, f: F) -> GridField
    where
        F: Fn(f64, f64) -> Option<f64> + Sync,
    {
        let row = |lambda_hat: f64| -> Vec<Option<f64>> {
            self.s_values.iter().map(|&s_hat| f(s_hat, lambda_hat)).collect()
        };

        #[cfg(feature = "parallel")]
        let values: Vec<Vec<Option<f64>>> = self.lambda_values.par_iter().map(|&l| row(l)).collect();
        #[cfg(not(feature = "parallel"))]
        let values: Vec<Vec<Option<f64>>> = self.lambda_values.iter().map(|&l| row(l)).collect();

        GridField {
            s_values: self.s_values.clone(),
            lambda_values: self.lambda_values.clone(),
            values,
        }
    }

    /// Evaluate `f(ŝ, λ̂)` only where ŝ² + λ̂² ≤ 1.
    pub fn sweep_constrained<F>(&self, f: F) -> GridField
    where
        F: Fn(f64, f64) -> f64 + Sync,
    {
        self.sweep(|s, l| (s * s + l * l <= 1.0).then(|| f(s, l)))
    }
}

impl GridField {
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.values.get(row)?.get(col).copied().flatten()
    }

    /// Defined cells as (ŝ, λ̂, value).
    pub fn cells(&self) -> impl Iterator<Item = (f64, f64, f64)> + '_ {
        self.values.iter().enumerate().flat_map(move |(r, row)| {
            row.iter().enumerate().filter_map(move |(c, v)| {
                v.map(|v| (self.s_values[c], self.lambda_values[r], v))
            })
        })
    }

    pub fn defined_count(&self) -> usize {
        self.cells().count()
    }

    pub fn min(&self) -> Option<f64> {
        self.cells().map(|(_, _, v)| v).reduce(f64::min)
    }

    pub fn max(&self) -> Option<f64> {
        self.cells().map(|(_, _, v)| v).reduce(f64::max)
    }
}

/// Γ(ŝ, λ̂) over the grid; cells the substrate rejects are left undefined.
pub fn dilation_surface(substrate: &SubstrateNetwork, grid: &ParameterGrid, p: f64) -> GridField {
    let field = grid.sweep(|s, l| substrate.compute_gamma(s, l, p).ok());
    log::debug!(
        "dilation surface p={}: {}/{} admissible cells",
        p,
        field.defined_count(),
        grid.s_values.len() * grid.lambda_values.len()
    );
    field
}
