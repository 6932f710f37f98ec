//! Validation tables for the substrate and each mechanism.
//!
//! Every check returns typed rows so tests can inspect them, and implements
//! `Display` so the CLI and demos can print the table as-is.

use std::fmt;

use crate::causal_diamond::CausalDiamondThrottling;
use crate::error::SubstrateResult;
use crate::mechanism::DofMechanism;
use crate::substrate::SubstrateNetwork;
use crate::tension_bandgap::TensionInducedBandgaps;

/// Reference points for Γ, including a boundary point, a capacity
/// violation and a horizon.
pub const SUBSTRATE_POINTS: [(f64, f64); 7] = [
    (0.0, 0.0),
    (0.6, 0.0),
    (0.0, 0.5),
    (0.3, 0.4),
    (0.6, 0.8),
    (0.8, 0.8),
    (0.0, 1.0),
];

/// Single-parameter sweep values for the SR and GR limits.
pub const LIMIT_VALUES: [f64; 5] = [0.1, 0.3, 0.5, 0.7, 0.9];

pub const DIAMOND_COMBINED_CASES: [(f64, f64); 4] = [(0.3, 0.3), (0.5, 0.5), (0.7, 0.2), (0.2, 0.7)];

pub const BANDGAP_CASES: [(f64, f64); 4] = [(0.0, 0.0), (0.3, 0.0), (0.0, 0.3), (0.5, 0.5)];

pub const DISPERSION_CASES: [(f64, f64); 3] = [(0.0, 0.0), (0.5, 0.0), (0.0, 0.5)];

/// Admissible points at which mechanisms are set against Γ.
pub const COMPARISON_POINTS: [(f64, f64); 7] = [
    (0.1, 0.1),
    (0.3, 0.0),
    (0.0, 0.3),
    (0.3, 0.3),
    (0.5, 0.5),
    (0.7, 0.2),
    (0.2, 0.7),
];

// ─── Substrate ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct GammaRow {
    pub s_hat: f64,
    pub lambda_hat: f64,
    pub within_capacity: bool,
    /// Γ and dτ/dt, or the reason they were rejected.
    pub outcome: Result<(f64, f64), String>,
}

#[derive(Debug, Clone)]
pub struct SubstrateValidation {
    pub exponent: f64,
    pub rows: Vec<GammaRow>,
    pub phase_coherence: f64,
    pub total_voxels: usize,
}

pub fn validate_substrate(substrate: &SubstrateNetwork, p: f64) -> SubstrateValidation {
    let rows = SUBSTRATE_POINTS
        .iter()
        .map(|&(s, l)| GammaRow {
            s_hat: s,
            lambda_hat: l,
            within_capacity: substrate.capacity_constraint_satisfied(s, l),
            outcome: substrate
                .compute_gamma(s, l, p)
                .and_then(|g| Ok((g, substrate.proper_time_rate(s, l, p)?)))
                .map_err(|e| e.to_string()),
        })
        .collect();

    SubstrateValidation {
        exponent: p,
        rows,
        phase_coherence: substrate.phase_coherence(),
        total_voxels: substrate.total_voxels(),
    }
}

impl fmt::Display for SubstrateValidation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "━━━ Substrate Dilation Γ(ŝ, λ̂), p = {} ━━━", self.exponent)?;
        writeln!(f)?;
        writeln!(f, "  {:>6}  {:>6}  {:>8}  {:>10}  {:>10}", "ŝ", "λ̂", "Capacity", "Γ", "dτ/dt")?;
        writeln!(f, "  {:─>6}  {:─>6}  {:─>8}  {:─>10}  {:─>10}", "", "", "", "", "")?;
        for row in &self.rows {
            let capacity = if row.within_capacity { "OK" } else { "VIOLATED" };
            match &row.outcome {
                Ok((gamma, rate)) => writeln!(
                    f,
                    "  {:>6.2}  {:>6.2}  {:>8}  {:>10.4}  {:>10.4}",
                    row.s_hat, row.lambda_hat, capacity, gamma, rate
                )?,
                Err(reason) => writeln!(
                    f,
                    "  {:>6.2}  {:>6.2}  {:>8}  rejected: {}",
                    row.s_hat, row.lambda_hat, capacity, reason
                )?,
            }
        }
        writeln!(f)?;
        writeln!(
            f,
            "  {} voxels, mode phase coherence |⟨e^iφ⟩| = {:.4}",
            self.total_voxels, self.phase_coherence
        )
    }
}

// ─── Causal diamond ─────────────────────────────────────────────────────────

/// DoF fraction against its single-parameter expectation.
#[derive(Debug, Clone, Copy)]
pub struct LimitRow {
    pub value: f64,
    pub dof: f64,
    pub expected: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct CombinedRow {
    pub s_hat: f64,
    pub lambda_hat: f64,
    pub dof: f64,
    pub capacity_ok: bool,
}

#[derive(Debug, Clone)]
pub struct DiamondValidation {
    pub pure_motion: Vec<LimitRow>,
    pub pure_curvature: Vec<LimitRow>,
    pub combined: Vec<CombinedRow>,
}

/// Check the causal diamond against its SR (λ̂ = 0) and GR (ŝ = 0) limits,
/// where the DoF fraction should follow (1 − ŝ²)^(2/3) and (1 − λ̂)^(2/3).
pub fn validate_causal_diamond(mechanism: &CausalDiamondThrottling) -> DiamondValidation {
    let pure_motion = LIMIT_VALUES
        .iter()
        .map(|&s| LimitRow {
            value: s,
            dof: mechanism.dof_fraction(s, 0.0),
            expected: (1.0 - s * s).powf(2.0 / 3.0),
        })
        .collect();

    let pure_curvature = LIMIT_VALUES
        .iter()
        .map(|&l| LimitRow {
            value: l,
            dof: mechanism.dof_fraction(0.0, l),
            expected: (1.0 - l).powf(2.0 / 3.0),
        })
        .collect();

    let combined = DIAMOND_COMBINED_CASES
        .iter()
        .map(|&(s, l)| CombinedRow {
            s_hat: s,
            lambda_hat: l,
            dof: mechanism.dof_fraction(s, l),
            capacity_ok: s * s + l * l <= 1.0,
        })
        .collect();

    DiamondValidation {
        pure_motion,
        pure_curvature,
        combined,
    }
}

impl fmt::Display for DiamondValidation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "━━━ Causal Diamond Throttling Validation ━━━")?;
        writeln!(f)?;
        writeln!(f, "  Pure motion (λ̂ = 0):")?;
        writeln!(f, "  {:>6}  {:>12}  {:>14}", "ŝ", "DoF fraction", "(1-ŝ²)^(2/3)")?;
        writeln!(f, "  {:─>6}  {:─>12}  {:─>14}", "", "", "")?;
        for row in &self.pure_motion {
            writeln!(f, "  {:>6.1}  {:>12.3}  {:>14.3}", row.value, row.dof, row.expected)?;
        }
        writeln!(f)?;
        writeln!(f, "  Pure curvature (ŝ = 0):")?;
        writeln!(f, "  {:>6}  {:>12}  {:>14}", "λ̂", "DoF fraction", "(1-λ̂)^(2/3)")?;
        writeln!(f, "  {:─>6}  {:─>12}  {:─>14}", "", "", "")?;
        for row in &self.pure_curvature {
            writeln!(f, "  {:>6.1}  {:>12.3}  {:>14.3}", row.value, row.dof, row.expected)?;
        }
        writeln!(f)?;
        writeln!(f, "  Combined effects:")?;
        writeln!(f, "  {:>6}  {:>6}  {:>12}  {:>11}", "ŝ", "λ̂", "DoF fraction", "Capacity OK")?;
        writeln!(f, "  {:─>6}  {:─>6}  {:─>12}  {:─>11}", "", "", "", "")?;
        for row in &self.combined {
            writeln!(
                f,
                "  {:>6.1}  {:>6.1}  {:>12.3}  {:>11}",
                row.s_hat, row.lambda_hat, row.dof, row.capacity_ok
            )?;
        }
        Ok(())
    }
}

// ─── Tension bandgaps ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
pub struct BandgapRow {
    pub s_hat: f64,
    pub lambda_hat: f64,
    pub dof: f64,
    pub bandgap_present: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct DispersionRow {
    pub s_hat: f64,
    pub lambda_hat: f64,
    /// `None` when no mode survives.
    pub speed_variation: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct BandgapValidation {
    pub cases: Vec<BandgapRow>,
    pub dispersion: Vec<DispersionRow>,
}

pub fn validate_tension_bandgaps(mechanism: &TensionInducedBandgaps) -> BandgapValidation {
    let cases = BANDGAP_CASES
        .iter()
        .map(|&(s, l)| BandgapRow {
            s_hat: s,
            lambda_hat: l,
            dof: mechanism.dof_fraction(s, l),
            bandgap_present: mechanism.compute_bandgap_structure(s, l).iter().any(|&a| !a),
        })
        .collect();

    let dispersion_cases: Vec<(f64, f64, &str)> = DISPERSION_CASES.iter().map(|&(s, l)| (s, l, "")).collect();
    let dispersion = mechanism
        .dispersion_curves(&dispersion_cases)
        .iter()
        .map(|curve| DispersionRow {
            s_hat: curve.s_hat,
            lambda_hat: curve.lambda_hat,
            speed_variation: curve.speed_variation(),
        })
        .collect();

    BandgapValidation { cases, dispersion }
}

impl fmt::Display for BandgapValidation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "━━━ Tension-Induced Bandgaps Validation ━━━")?;
        writeln!(f)?;
        writeln!(f, "  Frequency-dependent DoF reduction:")?;
        writeln!(f, "  {:>6}  {:>6}  {:>12}  {:>15}", "ŝ", "λ̂", "DoF fraction", "Bandgap present")?;
        writeln!(f, "  {:─>6}  {:─>6}  {:─>12}  {:─>15}", "", "", "", "")?;
        for row in &self.cases {
            writeln!(
                f,
                "  {:>6.1}  {:>6.1}  {:>12.3}  {:>15}",
                row.s_hat, row.lambda_hat, row.dof, row.bandgap_present
            )?;
        }
        writeln!(f)?;
        writeln!(f, "  Dispersion relation analysis:")?;
        for row in &self.dispersion {
            match row.speed_variation {
                Some(v) => writeln!(
                    f,
                    "    ŝ={:.1}, λ̂={:.1}: speed variation = {:.3}",
                    row.s_hat, row.lambda_hat, v
                )?,
                None => writeln!(
                    f,
                    "    ŝ={:.1}, λ̂={:.1}: all modes blocked",
                    row.s_hat, row.lambda_hat
                )?,
            }
        }
        Ok(())
    }
}

// ─── Mechanism comparison ───────────────────────────────────────────────────

/// One mechanism's implied slowdown at a comparison point.
#[derive(Debug, Clone)]
pub struct MechanismPrediction {
    pub mechanism: &'static str,
    pub dof: f64,
    pub implied_dilation: f64,
    /// (implied − Γ)/Γ
    pub relative_deviation: f64,
}

#[derive(Debug, Clone)]
pub struct ComparisonRow {
    pub s_hat: f64,
    pub lambda_hat: f64,
    pub gamma: f64,
    pub predictions: Vec<MechanismPrediction>,
}

#[derive(Debug, Clone)]
pub struct MechanismComparison {
    pub exponent: f64,
    pub rows: Vec<ComparisonRow>,
}

impl MechanismComparison {
    /// Root-mean-square relative deviation per mechanism, in input order.
    pub fn rms_deviation(&self) -> Vec<(&'static str, f64)> {
        let Some(first) = self.rows.first() else {
            return Vec::new();
        };
        first
            .predictions
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let sum_sq: f64 = self
                    .rows
                    .iter()
                    .map(|r| r.predictions[i].relative_deviation.powi(2))
                    .sum();
                (p.mechanism, (sum_sq / self.rows.len() as f64).sqrt())
            })
            .collect()
    }
}

/// Set each mechanism's implied slowdown 1/DoF against Γ at every point.
///
/// Fails on the first point the substrate rejects.
pub fn compare_mechanisms(
    substrate: &SubstrateNetwork,
    mechanisms: &[&dyn DofMechanism],
    points: &[(f64, f64)],
    p: f64,
) -> SubstrateResult<MechanismComparison> {
    let mut rows = Vec::with_capacity(points.len());
    for &(s, l) in points {
        let gamma = substrate.compute_gamma(s, l, p)?;
        let mut predictions = Vec::with_capacity(mechanisms.len());
        for mechanism in mechanisms {
            let dof = mechanism.compute_dof_reduction(substrate, s, l)?;
            let implied = mechanism.implied_dilation(s, l);
            predictions.push(MechanismPrediction {
                mechanism: mechanism.name(),
                dof,
                implied_dilation: implied,
                relative_deviation: (implied - gamma) / gamma,
            });
        }
        rows.push(ComparisonRow {
            s_hat: s,
            lambda_hat: l,
            gamma,
            predictions,
        });
    }
    Ok(MechanismComparison { exponent: p, rows })
}

impl fmt::Display for MechanismComparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "━━━ Mechanisms vs Substrate Γ (p = {}) ━━━", self.exponent)?;
        writeln!(f)?;
        writeln!(
            f,
            "  {:>5}  {:>5}  {:>8}  {:>28}  {:>8}  {:>8}  {:>9}",
            "ŝ", "λ̂", "Γ", "Mechanism", "DoF", "1/DoF", "Deviation"
        )?;
        writeln!(
            f,
            "  {:─>5}  {:─>5}  {:─>8}  {:─>28}  {:─>8}  {:─>8}  {:─>9}",
            "", "", "", "", "", "", ""
        )?;
        for row in &self.rows {
            for (i, p) in row.predictions.iter().enumerate() {
                if i == 0 {
                    write!(f, "  {:>5.2}  {:>5.2}  {:>8.4}", row.s_hat, row.lambda_hat, row.gamma)?;
                } else {
                    write!(f, "  {:>5}  {:>5}  {:>8}", "", "", "")?;
                }
                writeln!(
                    f,
                    "  {:>28}  {:>8.4}  {:>8.4}  {:>+8.1}%",
                    p.mechanism,
                    p.dof,
                    p.implied_dilation,
                    p.relative_deviation * 100.0
                )?;
            }
        }
        writeln!(f)?;
        writeln!(f, "  RMS relative deviation from Γ:")?;
        for (name, rms) in self.rms_deviation() {
            writeln!(f, "    {:<28}  {:.1}%", name, rms * 100.0)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn net() -> SubstrateNetwork {
        SubstrateNetwork::with_seed((4, 4, 4), 1.0, 1.0, 42).unwrap()
    }

    #[test]
    fn substrate_rows_flag_rejections() {
        let v = validate_substrate(&net(), 1.0);
        assert_eq!(v.rows.len(), SUBSTRATE_POINTS.len());

        let origin = &v.rows[0];
        let (gamma, rate) = origin.outcome.clone().unwrap();
        assert!((gamma - 1.0).abs() < 1e-12 && (rate - 1.0).abs() < 1e-12);

        // (0.6, 0.8) sits exactly on the boundary
        assert!(v.rows[4].within_capacity);
        assert!(v.rows[4].outcome.is_ok());

        let violated = &v.rows[5];
        assert!(!violated.within_capacity);
        assert!(violated.outcome.as_ref().unwrap_err().contains("capacity"));

        let horizon = &v.rows[6];
        assert!(horizon.within_capacity);
        assert!(horizon.outcome.as_ref().unwrap_err().contains("horizon"));
    }

    #[test]
    fn substrate_table_renders() {
        let text = validate_substrate(&net(), 2.0).to_string();
        assert!(text.contains("p = 2"));
        assert!(text.contains("VIOLATED"));
        assert!(text.contains("64 voxels"));
    }

    #[test]
    fn diamond_limits_match_expectation() {
        let v = validate_causal_diamond(&CausalDiamondThrottling::default());
        for row in v.pure_motion.iter().chain(&v.pure_curvature) {
            assert!((row.dof - row.expected).abs() < 1e-12, "{:?}", row);
        }
        assert!(v.combined.iter().all(|r| r.capacity_ok));
        assert_eq!(v.combined.len(), 4);
    }

    #[test]
    fn diamond_limits_diverge_for_stiffer_motion() {
        let v = validate_causal_diamond(&CausalDiamondThrottling::new(1.0, 2.0, 1.0));
        let row = v.pure_motion.iter().find(|r| r.value == 0.5).unwrap();
        assert!(row.dof < row.expected);
        // curvature limit unaffected by the motion factor
        for row in &v.pure_curvature {
            assert!((row.dof - row.expected).abs() < 1e-12);
        }
    }

    #[test]
    fn bandgap_cases_report_gaps() {
        let v = validate_tension_bandgaps(&TensionInducedBandgaps::default());
        assert!(!v.cases[0].bandgap_present);
        assert_eq!(v.cases[0].dof, 1.0);
        assert!(v.cases[2].bandgap_present);
        assert!(v.cases[3].dof < v.cases[0].dof);

        assert_eq!(v.dispersion[0].speed_variation, Some(0.0));
        assert!(v.dispersion[2].speed_variation.unwrap() > 0.0);
    }

    #[test]
    fn dispersion_rows_agree_with_curves() {
        let m = TensionInducedBandgaps::default();
        let v = validate_tension_bandgaps(&m);
        assert_eq!(v.dispersion.len(), DISPERSION_CASES.len());
        for (row, &(s, l)) in v.dispersion.iter().zip(&DISPERSION_CASES) {
            let curve = &m.dispersion_curves(&[(s, l, "")])[0];
            assert_eq!((row.s_hat, row.lambda_hat), (s, l));
            assert_eq!(row.speed_variation, curve.speed_variation());
        }

        // fully blocked spectrum has no variation to report
        let blocked = validate_tension_bandgaps(&TensionInducedBandgaps::new((0.1, 10.0), 3.0, 0.5, 100));
        assert!(blocked.dispersion[2].speed_variation.is_none());
    }

    #[test]
    fn bandgap_table_renders() {
        let text = validate_tension_bandgaps(&TensionInducedBandgaps::default()).to_string();
        assert!(text.contains("Bandgap present"));
        assert!(text.contains("speed variation"));
    }

    #[test]
    fn comparison_deviation_relative_to_gamma() {
        let substrate = net();
        let diamond = CausalDiamondThrottling::default();
        let bandgap = TensionInducedBandgaps::default();
        let mechanisms: [&dyn DofMechanism; 2] = [&diamond, &bandgap];
        let cmp = compare_mechanisms(&substrate, &mechanisms, &COMPARISON_POINTS, 1.0).unwrap();

        assert_eq!(cmp.rows.len(), COMPARISON_POINTS.len());
        for row in &cmp.rows {
            assert_eq!(row.predictions.len(), 2);
            for p in &row.predictions {
                let expected = (p.implied_dilation - row.gamma) / row.gamma;
                assert!((p.relative_deviation - expected).abs() < 1e-12);
                assert!((p.implied_dilation * p.dof - 1.0).abs() < 1e-12);
            }
        }

        let rms = cmp.rms_deviation();
        assert_eq!(rms[0].0, "Causal diamond throttling");
        assert!(rms.iter().all(|(_, v)| v.is_finite() && *v >= 0.0));
    }

    #[test]
    fn comparison_rejects_inadmissible_point() {
        let substrate = net();
        let diamond = CausalDiamondThrottling::default();
        let mechanisms: [&dyn DofMechanism; 1] = [&diamond];
        assert!(compare_mechanisms(&substrate, &mechanisms, &[(0.9, 0.9)], 1.0).is_err());
    }

    #[test]
    fn empty_comparison_has_no_rms() {
        let cmp = MechanismComparison { exponent: 1.0, rows: Vec::new() };
        assert!(cmp.rms_deviation().is_empty());
    }
}
