//! Tension-induced bandgaps.
//!
//! # Mechanism
//!
//! Load raises the effective tension of the string/voxel web. Tension opens
//! a bandgap in the vibrational spectrum, freezing out the modes inside it:
//!
//! - **Curvature** adds isotropic tension κ·λ̂ on every axis.
//! - **Motion** adds directional tension κ·ŝ² along the motion axis (z by
//!   convention), so gaps become anisotropic at high velocity.
//!
//! With τ = tr(T)/3 the gap sits at f_min + τ·Δf with width β·τ·Δf, and
//! once τ > 0.5 every mode above f_max·(1 − τ) is cut off as well.
//!
//! # Signature
//!
//! Frequency-dependent slowdowns (dispersion) in strong fields, spectral
//! holes, and anisotropy along the direction of motion.

use nalgebra::Matrix3;

use crate::config::BandgapConfig;
use crate::mechanism::{DofMechanism, MechanismSignature};
use crate::units::linspace;

/// Tension above which the high-frequency cutoff engages.
pub const CUTOFF_TENSION: f64 = 0.5;

/// Dispersion coupling α in c_eff = 1 − α·τ·(f/f_max)².
pub const DISPERSION_ALPHA: f64 = 0.5;

/// Slowest propagation speed the dispersion model allows (units of c).
pub const MIN_EFFECTIVE_SPEED: f64 = 0.1;

/// DoF reduction via tension-induced frequency bandgaps.
#[derive(Debug, Clone, PartialEq)]
pub struct TensionInducedBandgaps {
    pub freq_min: f64,
    pub freq_max: f64,
    /// κ: tension per unit load
    pub tension_coupling: f64,
    /// β: gap width relative to τ·Δf
    pub bandgap_factor: f64,
    base_frequencies: Vec<f64>,
}

/// Accessible and blocked frequencies for one (ŝ, λ̂) case.
#[derive(Debug, Clone)]
pub struct SpectrumSplit {
    pub label: String,
    pub s_hat: f64,
    pub lambda_hat: f64,
    pub accessible: Vec<f64>,
    pub blocked: Vec<f64>,
}

/// Dispersion relation and DoF fraction for one (ŝ, λ̂) case.
#[derive(Debug, Clone)]
pub struct DispersionCurve {
    pub label: String,
    pub s_hat: f64,
    pub lambda_hat: f64,
    pub frequencies: Vec<f64>,
    pub speeds: Vec<f64>,
    pub dof_fraction: f64,
}

impl DispersionCurve {
    /// max(c_eff) − min(c_eff); `None` when every mode is blocked.
    pub fn speed_variation(&self) -> Option<f64> {
        let max = self.speeds.iter().copied().reduce(f64::max)?;
        let min = self.speeds.iter().copied().reduce(f64::min)?;
        Some(max - min)
    }
}

impl Default for TensionInducedBandgaps {
    fn default() -> Self {
        Self::from_config(&BandgapConfig::default())
    }
}

impl TensionInducedBandgaps {
    pub fn new(
        frequency_range: (f64, f64),
        tension_coupling: f64,
        bandgap_factor: f64,
        n_modes: usize,
    ) -> Self {
        let (freq_min, freq_max) = frequency_range;
        Self {
            freq_min,
            freq_max,
            tension_coupling,
            bandgap_factor,
            base_frequencies: linspace(freq_min, freq_max, n_modes),
        }
    }

    pub fn from_config(config: &BandgapConfig) -> Self {
        Self::new(
            (config.freq_min, config.freq_max),
            config.tension_coupling,
            config.bandgap_width_factor,
            config.n_modes,
        )
    }

    pub fn n_modes(&self) -> usize {
        self.base_frequencies.len()
    }

    /// Evenly spaced mode frequencies over [f_min, f_max].
    pub fn base_frequencies(&self) -> &[f64] {
        &self.base_frequencies
    }

    /// Effective tension tensor: κ·λ̂·I plus κ·ŝ² on the zz component.
    pub fn compute_tension_tensor(&self, s_hat: f64, lambda_hat: f64) -> Matrix3<f64> {
        let isotropic = self.tension_coupling * lambda_hat;
        let anisotropic = self.tension_coupling * s_hat * s_hat;

        let mut tension = Matrix3::identity() * isotropic;
        tension[(2, 2)] += anisotropic;
        tension
    }

    /// τ = tr(T)/3
    pub fn tension_magnitude(&self, s_hat: f64, lambda_hat: f64) -> f64 {
        self.compute_tension_tensor(s_hat, lambda_hat).trace() / 3.0
    }

    /// Accessibility mask over the base spectrum (true = accessible).
    pub fn compute_bandgap_structure(&self, s_hat: f64, lambda_hat: f64) -> Vec<bool> {
        let tau = self.tension_magnitude(s_hat, lambda_hat);
        let span = self.freq_max - self.freq_min;

        let gap_center = self.freq_min + tau * span;
        let gap_width = self.bandgap_factor * tau * span;
        let cutoff = (tau > CUTOFF_TENSION).then(|| self.freq_max * (1.0 - tau));

        self.base_frequencies
            .iter()
            .map(|&f| {
                let in_gap = (f - gap_center).abs() < gap_width / 2.0;
                let above_cutoff = cutoff.is_some_and(|fc| f > fc);
                !(in_gap || above_cutoff)
            })
            .collect()
    }

    /// Modified dispersion over accessible modes only.
    ///
    /// c_eff = max(0.1, 1 − α·τ·(f/f_max)²). Returns (frequencies, speeds).
    pub fn compute_dispersion_relation(&self, s_hat: f64, lambda_hat: f64) -> (Vec<f64>, Vec<f64>) {
        let accessible = self.compute_bandgap_structure(s_hat, lambda_hat);
        let tau = self.tension_magnitude(s_hat, lambda_hat);

        self.base_frequencies
            .iter()
            .zip(accessible)
            .filter(|&(_, open)| open)
            .map(|(&f, _)| {
                let normalized = f / self.freq_max;
                let speed = 1.0 - DISPERSION_ALPHA * tau * normalized * normalized;
                (f, speed.max(MIN_EFFECTIVE_SPEED))
            })
            .unzip()
    }

    /// Split the spectrum into accessible/blocked frequencies per case.
    pub fn bandgap_evolution(&self, cases: &[(f64, f64, &str)]) -> Vec<SpectrumSplit> {
        cases
            .iter()
            .map(|&(s, l, label)| {
                let mask = self.compute_bandgap_structure(s, l);
                let (accessible, blocked): (Vec<(f64, bool)>, Vec<(f64, bool)>) = self
                    .base_frequencies
                    .iter()
                    .copied()
                    .zip(mask)
                    .partition(|&(_, open)| open);
                SpectrumSplit {
                    label: label.to_string(),
                    s_hat: s,
                    lambda_hat: l,
                    accessible: accessible.into_iter().map(|(f, _)| f).collect(),
                    blocked: blocked.into_iter().map(|(f, _)| f).collect(),
                }
            })
            .collect()
    }

    /// Dispersion relation and DoF fraction per case.
    pub fn dispersion_curves(&self, cases: &[(f64, f64, &str)]) -> Vec<DispersionCurve> {
        cases
            .iter()
            .map(|&(s, l, label)| {
                let (frequencies, speeds) = self.compute_dispersion_relation(s, l);
                DispersionCurve {
                    label: label.to_string(),
                    s_hat: s,
                    lambda_hat: l,
                    frequencies,
                    speeds,
                    dof_fraction: self.dof_fraction(s, l),
                }
            })
            .collect()
    }
}

impl DofMechanism for TensionInducedBandgaps {
    fn name(&self) -> &'static str {
        "Tension-induced bandgaps"
    }

    fn dof_fraction(&self, s_hat: f64, lambda_hat: f64) -> f64 {
        let mask = self.compute_bandgap_structure(s_hat, lambda_hat);
        if mask.is_empty() {
            return 0.0;
        }
        mask.iter().filter(|&&open| open).count() as f64 / mask.len() as f64
    }

    fn signature(&self) -> MechanismSignature {
        MechanismSignature::from([
            ("time_dilation", "Frequency-dependent due to selective mode blocking"),
            ("dispersion", "Strong - different frequencies experience different delays"),
            ("anisotropy", "Directional bandgaps along motion axis"),
            ("spectral_distortion", "Characteristic gaps in frequency spectrum"),
            ("field_dependence", "Bandgap width scales with field strength"),
            ("polarization_effects", "Different polarizations affected differently"),
        ])
    }
}
