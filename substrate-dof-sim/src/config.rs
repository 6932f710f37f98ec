//! Experiment configuration.
//!
//! Every constant the experiments use lives here with its default, so a
//! TOML file only needs to name the values it changes:
//!
//! ```toml
//! [substrate]
//! grid_size = [6, 6, 6]
//! dilation_exponent = 2.0
//!
//! [bandgap]
//! tension_coupling = 0.8
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{SubstrateError, SubstrateResult};

/// Voxel lattice parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubstrateConfig {
    /// Voxels along x, y, z.
    pub grid_size: [usize; 3],
    /// Capacity budget per voxel.
    pub voxel_capacity: f64,
    /// Lattice spacing in Planck units.
    pub planck_length: f64,
    /// Seed for voxel mode/phase initialisation.
    pub seed: u64,
    /// Exponent p on the lapse factor in Γ = γ_SR / N^p.
    pub dilation_exponent: f64,
}

impl Default for SubstrateConfig {
    fn default() -> Self {
        Self {
            grid_size: [10, 10, 10],
            voxel_capacity: 1.0,
            planck_length: 1.0,
            seed: 42,
            dilation_exponent: 1.0,
        }
    }
}

/// Causal diamond throttling parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiamondConfig {
    pub base_radius: f64,
    pub motion_compression_factor: f64,
    pub curvature_compression_factor: f64,
}

impl Default for DiamondConfig {
    fn default() -> Self {
        Self {
            base_radius: 1.0,
            motion_compression_factor: 1.0,
            curvature_compression_factor: 1.0,
        }
    }
}

/// Tension-induced bandgap parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BandgapConfig {
    pub freq_min: f64,
    pub freq_max: f64,
    pub tension_coupling: f64,
    pub bandgap_width_factor: f64,
    /// Points in the base frequency spectrum.
    pub n_modes: usize,
}

impl Default for BandgapConfig {
    fn default() -> Self {
        Self {
            freq_min: 0.1,
            freq_max: 10.0,
            tension_coupling: 1.0,
            bandgap_width_factor: 0.5,
            n_modes: 100,
        }
    }
}

/// ŝ×λ̂ sweep extent for surfaces and heatmaps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    pub s_range: [f64; 2],
    pub lambda_range: [f64; 2],
    pub resolution: usize,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            s_range: [0.0, 0.9],
            lambda_range: [0.0, 0.9],
            resolution: 50,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory receiving SVG figures.
    pub out_dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("figures"),
        }
    }
}

/// Top-level configuration for all experiments.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    pub substrate: SubstrateConfig,
    pub diamond: DiamondConfig,
    pub bandgap: BandgapConfig,
    pub sweep: SweepConfig,
    pub output: OutputConfig,
}

impl ExperimentConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> SubstrateResult<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| SubstrateError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: &Path) -> SubstrateResult<Self> {
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&text)?;
        log::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn to_toml_string(&self) -> SubstrateResult<String> {
        toml::to_string_pretty(self).map_err(|e| SubstrateError::Config(e.to_string()))
    }

    /// Reject values the formulas cannot use.
    pub fn validate(&self) -> SubstrateResult<()> {
        let sub = &self.substrate;
        if sub.grid_size.iter().any(|&n| n == 0) {
            return Err(config_err("substrate.grid_size entries must be >= 1"));
        }
        if sub.grid_size.iter().try_fold(1usize, |acc, &n| acc.checked_mul(n)).is_none() {
            return Err(config_err("substrate.grid_size voxel count overflows"));
        }
        if !(sub.voxel_capacity > 0.0 && sub.voxel_capacity.is_finite()) {
            return Err(config_err("substrate.voxel_capacity must be positive and finite"));
        }
        if !(sub.planck_length > 0.0 && sub.planck_length.is_finite()) {
            return Err(config_err("substrate.planck_length must be positive"));
        }
        if !(sub.dilation_exponent >= 0.0 && sub.dilation_exponent.is_finite()) {
            return Err(config_err("substrate.dilation_exponent must be >= 0"));
        }

        let dia = &self.diamond;
        if !(dia.base_radius > 0.0 && dia.base_radius.is_finite()) {
            return Err(config_err("diamond.base_radius must be positive and finite"));
        }
        if ![dia.motion_compression_factor, dia.curvature_compression_factor]
            .iter()
            .all(|f| *f >= 0.0 && f.is_finite())
        {
            return Err(config_err("diamond compression factors must be finite and >= 0"));
        }

        let gap = &self.bandgap;
        if !(gap.freq_min > 0.0 && gap.freq_max > gap.freq_min && gap.freq_max.is_finite()) {
            return Err(config_err("bandgap requires 0 < freq_min < freq_max"));
        }
        if ![gap.tension_coupling, gap.bandgap_width_factor]
            .iter()
            .all(|f| *f >= 0.0 && f.is_finite())
        {
            return Err(config_err("bandgap coupling and width factor must be finite and >= 0"));
        }
        if gap.n_modes < 2 {
            return Err(config_err("bandgap.n_modes must be >= 2"));
        }

        let sweep = &self.sweep;
        for (name, [lo, hi]) in [("s_range", sweep.s_range), ("lambda_range", sweep.lambda_range)] {
            if !(0.0 <= lo && lo < hi && hi < 1.0) {
                return Err(config_err(&format!(
                    "sweep.{} must satisfy 0 <= lo < hi < 1, got [{}, {}]",
                    name, lo, hi
                )));
            }
        }
        if sweep.resolution < 2 {
            return Err(config_err("sweep.resolution must be >= 2"));
        }
        Ok(())
    }
}

fn config_err(msg: &str) -> SubstrateError {
    SubstrateError::Config(msg.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        ExperimentConfig::default().validate().unwrap();
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = ExperimentConfig::from_toml_str(
            r#"
            [substrate]
            grid_size = [4, 5, 6]
            dilation_exponent = 2.0

            [bandgap]
            n_modes = 50
            "#,
        )
        .unwrap();
        assert_eq!(config.substrate.grid_size, [4, 5, 6]);
        assert_eq!(config.substrate.dilation_exponent, 2.0);
        assert_eq!(config.substrate.voxel_capacity, 1.0);
        assert_eq!(config.bandgap.n_modes, 50);
        assert_eq!(config.bandgap.freq_max, 10.0);
        assert_eq!(config.diamond, DiamondConfig::default());
    }

    #[test]
    fn toml_roundtrip_preserves_config() {
        let mut config = ExperimentConfig::default();
        config.sweep.resolution = 17;
        config.output.out_dir = PathBuf::from("out/figs");
        let text = config.to_toml_string().unwrap();
        let back = ExperimentConfig::from_toml_str(&text).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn rejects_inverted_frequency_range() {
        let err = ExperimentConfig::from_toml_str(
            "[bandgap]\nfreq_min = 5.0\nfreq_max = 1.0\n",
        )
        .unwrap_err();
        assert!(matches!(err, SubstrateError::Config(_)));
    }

    #[test]
    fn rejects_sweep_reaching_unity() {
        let err = ExperimentConfig::from_toml_str("[sweep]\ns_range = [0.0, 1.0]\n").unwrap_err();
        assert!(err.to_string().contains("s_range"), "got: {}", err);
    }

    #[test]
    fn rejects_zero_grid_dimension() {
        let mut config = ExperimentConfig::default();
        config.substrate.grid_size = [3, 0, 3];
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_infinite_values() {
        for text in [
            "[bandgap]\nfreq_max = inf\n",
            "[bandgap]\ntension_coupling = inf\n",
            "[substrate]\nvoxel_capacity = inf\n",
            "[substrate]\ndilation_exponent = nan\n",
            "[diamond]\nbase_radius = inf\n",
            "[diamond]\nmotion_compression_factor = inf\n",
        ] {
            let err = ExperimentConfig::from_toml_str(text).unwrap_err();
            assert!(matches!(err, SubstrateError::Config(_)), "{:?} accepted", text);
        }
    }

    #[test]
    fn rejects_overflowing_grid() {
        let mut config = ExperimentConfig::default();
        config.substrate.grid_size = [usize::MAX / 2, 4, 1];
        assert!(config.validate().is_err());
    }

    #[test]
    fn malformed_toml_is_config_error() {
        let err = ExperimentConfig::from_toml_str("[substrate\n").unwrap_err();
        assert!(matches!(err, SubstrateError::Config(_)));
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("exp.toml");
        std::fs::write(&path, "[sweep]\nresolution = 8\n").unwrap();
        let config = ExperimentConfig::load(&path).unwrap();
        assert_eq!(config.sweep.resolution, 8);
    }
}
