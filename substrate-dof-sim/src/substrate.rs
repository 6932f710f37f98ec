//! Discrete voxel substrate with per-voxel capacity budgets.
//!
//! The substrate is an nx×ny×nz cubic lattice of voxels, 6-connected with
//! open boundaries. Each voxel has a capacity budget shared between two
//! demands:
//!
//! - **Kinematic smear** ŝ = |v|/c: capacity spent re-addressing the voxel
//!   as it moves through the lattice.
//! - **Gravitational load** λ̂: capacity spent carrying local curvature.
//!
//! The budget is the capacity constraint ŝ² + λ̂² ≤ 1. Whatever the two
//! demands leave over is available for the voxel's own evolution, giving the
//! dilation factor
//!
//! ```text
//! Γ(ŝ, λ̂) = 1/√(1 − ŝ²) · 1/(1 − λ̂)^p
//! ```
//!
//! where the first factor is the special-relativistic γ and the second is the
//! inverse lapse N = 1 − λ̂ raised to the exponent p.

use nalgebra::Vector3;
use num_complex::Complex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::SubstrateConfig;
use crate::error::{SubstrateError, SubstrateResult};
use crate::units::{clamp_ratio, C, PI, TOY_VOXEL_LIMIT};

/// Lattice directions: -x, +x, -y, +y, -z, +z.
const DIRECTIONS: [(isize, isize, isize); 6] = [
    (-1, 0, 0),
    (1, 0, 0),
    (0, -1, 0),
    (0, 1, 0),
    (0, 0, -1),
    (0, 0, 1),
];

/// One vibrational mode per lattice direction.
pub const MODES_PER_VOXEL: usize = DIRECTIONS.len();

/// State of a single voxel in the substrate network.
#[derive(Debug, Clone)]
pub struct VoxelState {
    /// Grid index scaled by the Planck length.
    pub position: [f64; 3],
    /// Total capacity budget.
    pub capacity: f64,
    /// Capacity currently in use.
    pub used_capacity: f64,
    /// Indices of connected voxels.
    pub connections: Vec<usize>,
    /// Mode magnitudes.
    pub modes: Vec<f64>,
    /// Phase of each mode (radians).
    pub phases: Vec<f64>,
}

impl VoxelState {
    pub fn available_capacity(&self) -> f64 {
        self.capacity - self.used_capacity
    }

    /// Number of accessible degrees of freedom.
    pub fn dof_count(&self) -> usize {
        self.modes.len()
    }

    /// Complex mode amplitudes a_k = m_k · e^{iφ_k}.
    pub fn mode_amplitudes(&self) -> Vec<Complex<f64>> {
        self.modes
            .iter()
            .zip(self.phases.iter())
            .map(|(&m, &phi)| Complex::from_polar(m, phi))
            .collect()
    }
}

/// The discrete substrate network.
#[derive(Debug, Clone)]
pub struct SubstrateNetwork {
    grid_size: (usize, usize, usize),
    total_voxels: usize,
    voxel_capacity: f64,
    planck_length: f64,
    voxels: Vec<VoxelState>,
    /// Speed of light (natural units).
    pub c: f64,
}

impl SubstrateNetwork {
    /// Build a network with entropy-seeded voxel modes.
    pub fn new(
        grid_size: (usize, usize, usize),
        voxel_capacity: f64,
        planck_length: f64,
    ) -> SubstrateResult<Self> {
        Self::with_seed(grid_size, voxel_capacity, planck_length, rand::random())
    }

    /// Build a network whose voxel modes and phases are reproducible.
    pub fn with_seed(
        grid_size: (usize, usize, usize),
        voxel_capacity: f64,
        planck_length: f64,
        seed: u64,
    ) -> SubstrateResult<Self> {
        let (nx, ny, nz) = grid_size;
        if nx == 0 || ny == 0 || nz == 0 {
            return Err(SubstrateError::InvalidParameter(format!(
                "grid dimensions must be non-zero, got {}×{}×{}",
                nx, ny, nz
            )));
        }
        if !(voxel_capacity > 0.0) || !voxel_capacity.is_finite() {
            return Err(SubstrateError::InvalidParameter(format!(
                "voxel capacity must be positive, got {}",
                voxel_capacity
            )));
        }
        if !(planck_length > 0.0) || !planck_length.is_finite() {
            return Err(SubstrateError::InvalidParameter(format!(
                "Planck length must be positive, got {}",
                planck_length
            )));
        }

        let total = nx
            .checked_mul(ny)
            .and_then(|n| n.checked_mul(nz))
            .ok_or_else(|| {
                SubstrateError::InvalidParameter(format!(
                    "grid {}×{}×{} has more voxels than fit in usize",
                    nx, ny, nz
                ))
            })?;
        if total > TOY_VOXEL_LIMIT {
            log::warn!(
                "{}×{}×{} substrate has {} voxels, beyond the {}-voxel toy regime",
                nx, ny, nz, total, TOY_VOXEL_LIMIT
            );
        }

        let mut network = Self {
            grid_size,
            total_voxels: total,
            voxel_capacity,
            planck_length,
            voxels: Vec::with_capacity(total),
            c: C,
        };

        let mut rng = StdRng::seed_from_u64(seed);
        for i in 0..nx {
            for j in 0..ny {
                for k in 0..nz {
                    let connections = network.neighbors(i, j, k);
                    let modes: Vec<f64> = (0..MODES_PER_VOXEL).map(|_| rng.gen::<f64>()).collect();
                    let phases: Vec<f64> = (0..MODES_PER_VOXEL)
                        .map(|_| rng.gen::<f64>() * 2.0 * PI)
                        .collect();
                    network.voxels.push(VoxelState {
                        position: [
                            i as f64 * planck_length,
                            j as f64 * planck_length,
                            k as f64 * planck_length,
                        ],
                        capacity: voxel_capacity,
                        used_capacity: 0.0,
                        connections,
                        modes,
                        phases,
                    });
                }
            }
        }

        log::debug!("built {}×{}×{} substrate (seed {})", nx, ny, nz, seed);
        Ok(network)
    }

    pub fn from_config(config: &SubstrateConfig) -> SubstrateResult<Self> {
        let [nx, ny, nz] = config.grid_size;
        Self::with_seed(
            (nx, ny, nz),
            config.voxel_capacity,
            config.planck_length,
            config.seed,
        )
    }

    pub fn grid_size(&self) -> (usize, usize, usize) {
        self.grid_size
    }

    pub fn voxel_capacity(&self) -> f64 {
        self.voxel_capacity
    }

    pub fn planck_length(&self) -> f64 {
        self.planck_length
    }

    pub fn total_voxels(&self) -> usize {
        self.total_voxels
    }

    pub fn voxels(&self) -> &[VoxelState] {
        &self.voxels
    }

    /// Linear index of voxel (i, j, k): i·ny·nz + j·nz + k.
    pub fn voxel_index(&self, i: usize, j: usize, k: usize) -> usize {
        let (_, ny, nz) = self.grid_size;
        i * ny * nz + j * nz + k
    }

    pub fn voxel(&self, i: usize, j: usize, k: usize) -> Option<&VoxelState> {
        let (nx, ny, nz) = self.grid_size;
        if i >= nx || j >= ny || k >= nz {
            return None;
        }
        self.voxels.get(self.voxel_index(i, j, k))
    }

    /// Indices of in-bounds neighbours in the 6-connected lattice.
    pub fn neighbors(&self, i: usize, j: usize, k: usize) -> Vec<usize> {
        let (nx, ny, nz) = self.grid_size;
        DIRECTIONS
            .iter()
            .filter_map(|&(di, dj, dk)| {
                let ni = i.checked_add_signed(di)?;
                let nj = j.checked_add_signed(dj)?;
                let nk = k.checked_add_signed(dk)?;
                (ni < nx && nj < ny && nk < nz).then(|| self.voxel_index(ni, nj, nk))
            })
            .collect()
    }

    /// Kinematic smear ŝ = |v|/c, capped below 1.
    pub fn compute_smear(&self, velocity: &Vector3<f64>) -> f64 {
        clamp_ratio(velocity.norm() / self.c)
    }

    /// Gravitational load λ̂: total mass-energy over total lattice capacity,
    /// capped below 1.
    ///
    /// Stands in for the curvature an Einstein-tensor source would produce.
    pub fn compute_load(&self, mass_density: &[f64]) -> f64 {
        let total_mass: f64 = mass_density.iter().sum();
        clamp_ratio(total_mass / (self.total_voxels() as f64 * self.voxel_capacity))
    }

    /// Check the capacity constraint ŝ² + λ̂² ≤ 1.
    pub fn capacity_constraint_satisfied(&self, s_hat: f64, lambda_hat: f64) -> bool {
        s_hat * s_hat + lambda_hat * lambda_hat <= 1.0
    }

    /// Validate a parameter pair against the capacity budget.
    pub fn check_capacity(&self, s_hat: f64, lambda_hat: f64) -> SubstrateResult<()> {
        if !s_hat.is_finite() || !lambda_hat.is_finite() || s_hat < 0.0 || lambda_hat < 0.0 {
            return Err(SubstrateError::InvalidParameter(format!(
                "ŝ and λ̂ must be finite and non-negative, got ŝ={}, λ̂={}",
                s_hat, lambda_hat
            )));
        }
        if !self.capacity_constraint_satisfied(s_hat, lambda_hat) {
            return Err(SubstrateError::CapacityViolated { s_hat, lambda_hat });
        }
        Ok(())
    }

    /// Dilation factor Γ(ŝ, λ̂) = [1/√(1−ŝ²)] · [1/(1−λ̂)^p].
    pub fn compute_gamma(&self, s_hat: f64, lambda_hat: f64, p: f64) -> SubstrateResult<f64> {
        self.check_capacity(s_hat, lambda_hat)?;
        if !p.is_finite() || p < 0.0 {
            return Err(SubstrateError::InvalidParameter(format!(
                "lapse exponent p must be finite and >= 0, got {}",
                p
            )));
        }
        if s_hat >= 1.0 || lambda_hat >= 1.0 {
            return Err(SubstrateError::Horizon { s_hat, lambda_hat });
        }

        let sr_factor = 1.0 / (1.0 - s_hat * s_hat).sqrt();
        let lapse = 1.0 - lambda_hat;
        let gr_factor = 1.0 / lapse.powf(p);

        Ok(sr_factor * gr_factor)
    }

    /// Proper time rate dτ/dt = Γ⁻¹.
    pub fn proper_time_rate(&self, s_hat: f64, lambda_hat: f64, p: f64) -> SubstrateResult<f64> {
        Ok(1.0 / self.compute_gamma(s_hat, lambda_hat, p)?)
    }

    /// Phase coherence of all voxel modes: |⟨e^{iφ}⟩| over every mode in
    /// the lattice. 0 for uniformly scattered phases, 1 when aligned.
    pub fn phase_coherence(&self) -> f64 {
        let (sum, count) = self
            .voxels
            .iter()
            .flat_map(|v| v.phases.iter())
            .fold((Complex::new(0.0, 0.0), 0usize), |(acc, n), &phi| {
                (acc + Complex::from_polar(1.0, phi), n + 1)
            });
        if count == 0 {
            return 0.0;
        }
        (sum / count as f64).norm()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_net() -> SubstrateNetwork {
        SubstrateNetwork::with_seed((4, 4, 4), 1.0, 1.0, 7).unwrap()
    }

    #[test]
    fn network_has_expected_voxel_count() {
        let net = SubstrateNetwork::with_seed((10, 10, 10), 1.0, 1.0, 1).unwrap();
        assert_eq!(net.total_voxels(), 1000);
        assert_eq!(net.voxels().len(), 1000);
        assert!(net.voxels().iter().all(|v| v.dof_count() == 6));
    }

    #[test]
    fn corner_edge_and_interior_neighbor_counts() {
        let net = small_net();
        assert_eq!(net.neighbors(0, 0, 0).len(), 3);
        assert_eq!(net.neighbors(3, 3, 3).len(), 3);
        assert_eq!(net.neighbors(1, 0, 0).len(), 4);
        assert_eq!(net.neighbors(1, 2, 0).len(), 5);
        assert_eq!(net.neighbors(1, 2, 2).len(), 6);
    }

    #[test]
    fn neighbor_relation_is_symmetric() {
        let net = SubstrateNetwork::with_seed((3, 4, 5), 1.0, 1.0, 3).unwrap();
        for (idx, voxel) in net.voxels().iter().enumerate() {
            for &nb in &voxel.connections {
                assert!(
                    net.voxels()[nb].connections.contains(&idx),
                    "voxel {} lists {} but not vice versa",
                    idx, nb
                );
            }
        }
    }

    #[test]
    fn voxel_index_is_row_major() {
        let net = SubstrateNetwork::with_seed((3, 4, 5), 1.0, 1.0, 3).unwrap();
        assert_eq!(net.voxel_index(0, 0, 1), 1);
        assert_eq!(net.voxel_index(0, 1, 0), 5);
        assert_eq!(net.voxel_index(1, 0, 0), 20);
        let v = net.voxel(1, 2, 3).unwrap();
        assert_eq!(v.position, [1.0, 2.0, 3.0]);
        assert!(net.voxel(3, 0, 0).is_none());
    }

    #[test]
    fn positions_scale_with_planck_length() {
        let net = SubstrateNetwork::with_seed((2, 2, 2), 1.0, 0.5, 3).unwrap();
        assert_eq!(net.voxel(1, 1, 1).unwrap().position, [0.5, 0.5, 0.5]);
    }

    #[test]
    fn same_seed_same_modes() {
        let a = SubstrateNetwork::with_seed((3, 3, 3), 1.0, 1.0, 99).unwrap();
        let b = SubstrateNetwork::with_seed((3, 3, 3), 1.0, 1.0, 99).unwrap();
        for (va, vb) in a.voxels().iter().zip(b.voxels()) {
            assert_eq!(va.modes, vb.modes);
            assert_eq!(va.phases, vb.phases);
        }
    }

    #[test]
    fn modes_and_phases_in_range() {
        let net = small_net();
        for v in net.voxels() {
            assert!(v.modes.iter().all(|&m| (0.0..1.0).contains(&m)));
            assert!(v.phases.iter().all(|&p| (0.0..2.0 * PI).contains(&p)));
            assert_eq!(v.available_capacity(), 1.0);
        }
    }

    #[test]
    fn mode_amplitudes_preserve_magnitude() {
        let net = small_net();
        let v = &net.voxels()[5];
        for (amp, &m) in v.mode_amplitudes().iter().zip(&v.modes) {
            assert!((amp.norm() - m).abs() < 1e-12);
        }
    }

    #[test]
    fn rejects_degenerate_construction() {
        assert!(SubstrateNetwork::with_seed((0, 2, 2), 1.0, 1.0, 0).is_err());
        assert!(SubstrateNetwork::with_seed((2, 2, 2), 0.0, 1.0, 0).is_err());
        assert!(SubstrateNetwork::with_seed((2, 2, 2), 1.0, -1.0, 0).is_err());
    }

    #[test]
    fn oversized_grid_is_rejected_not_overflowed() {
        let config = SubstrateConfig {
            grid_size: [usize::MAX / 2, 4, 1],
            ..SubstrateConfig::default()
        };
        assert!(matches!(
            SubstrateNetwork::from_config(&config),
            Err(SubstrateError::InvalidParameter(_))
        ));
        assert!(SubstrateNetwork::with_seed((usize::MAX, usize::MAX, 2), 1.0, 1.0, 0).is_err());
    }

    #[test]
    fn nan_measurements_map_to_zero() {
        let net = small_net();
        assert_eq!(net.compute_smear(&Vector3::new(f64::NAN, 0.0, 0.0)), 0.0);
        assert_eq!(net.compute_load(&[f64::NAN]), 0.0);
        assert_eq!(net.compute_load(&[-5.0]), 0.0);
        assert_eq!(net.compute_load(&[f64::INFINITY]), 0.999);
    }

    #[test]
    fn smear_is_speed_over_c_and_capped() {
        let net = small_net();
        let s = net.compute_smear(&Vector3::new(0.3, 0.4, 0.0));
        assert!((s - 0.5).abs() < 1e-12);
        assert_eq!(net.compute_smear(&Vector3::new(2.0, 0.0, 0.0)), 0.999);
    }

    #[test]
    fn load_normalises_by_total_capacity() {
        let net = small_net();
        let density = vec![0.25; 64];
        let l = net.compute_load(&density);
        assert!((l - 0.25).abs() < 1e-12, "load = {}", l);
        assert_eq!(net.compute_load(&vec![10.0; 64]), 0.999);
        assert_eq!(net.compute_load(&[]), 0.0);
    }

    #[test]
    fn capacity_constraint_boundary_inclusive() {
        let net = small_net();
        assert!(net.capacity_constraint_satisfied(0.6, 0.8));
        assert!(net.capacity_constraint_satisfied(0.0, 0.0));
        assert!(!net.capacity_constraint_satisfied(0.8, 0.8));
    }

    #[test]
    fn gamma_at_rest_is_one() {
        let net = small_net();
        let g = net.compute_gamma(0.0, 0.0, 1.0).unwrap();
        assert!((g - 1.0).abs() < 1e-12);
    }

    #[test]
    fn gamma_matches_closed_form() {
        let net = small_net();
        for &(s, l, p) in &[(0.5, 0.0, 1.0), (0.0, 0.5, 1.0), (0.3, 0.4, 2.0), (0.6, 0.7, 0.5)] {
            let g = net.compute_gamma(s, l, p).unwrap();
            let expected: f64 = 1.0 / (1.0 - s * s).sqrt() / (1.0 - l).powf(p);
            assert!((g - expected).abs() < 1e-12, "Γ({},{},{}) = {} vs {}", s, l, p, g, expected);
            assert!(g >= 1.0);
        }
    }

    #[test]
    fn pure_motion_is_lorentz_factor() {
        let net = small_net();
        let g = net.compute_gamma(0.6, 0.0, 3.0).unwrap();
        assert!((g - 1.25).abs() < 1e-12);
    }

    #[test]
    fn gamma_rejects_capacity_violation() {
        let net = small_net();
        let err = net.compute_gamma(0.8, 0.8, 1.0).unwrap_err();
        assert!(matches!(err, SubstrateError::CapacityViolated { .. }));
    }

    #[test]
    fn gamma_rejects_horizon_and_bad_input() {
        let net = small_net();
        assert!(matches!(
            net.compute_gamma(0.0, 1.0, 1.0),
            Err(SubstrateError::Horizon { .. })
        ));
        assert!(matches!(
            net.compute_gamma(1.0, 0.0, 1.0),
            Err(SubstrateError::Horizon { .. })
        ));
        assert!(matches!(
            net.compute_gamma(-0.1, 0.0, 1.0),
            Err(SubstrateError::InvalidParameter(_))
        ));
        assert!(matches!(
            net.compute_gamma(f64::NAN, 0.0, 1.0),
            Err(SubstrateError::InvalidParameter(_))
        ));
    }

    #[test]
    fn gamma_rejects_bad_lapse_exponent() {
        let net = small_net();
        for p in [f64::NAN, f64::INFINITY, -1.0] {
            assert!(
                matches!(net.compute_gamma(0.3, 0.3, p), Err(SubstrateError::InvalidParameter(_))),
                "p = {} accepted",
                p
            );
        }
        assert!(net.proper_time_rate(0.0, 0.5, -1.0).is_err());
        // p = 0 drops the lapse factor
        let g = net.compute_gamma(0.0, 0.5, 0.0).unwrap();
        assert!((g - 1.0).abs() < 1e-12);
    }

    #[test]
    fn proper_time_rate_inverts_gamma() {
        let net = small_net();
        let g = net.compute_gamma(0.4, 0.3, 1.5).unwrap();
        let rate = net.proper_time_rate(0.4, 0.3, 1.5).unwrap();
        assert!((g * rate - 1.0).abs() < 1e-12);
        assert!(rate <= 1.0);
    }

    #[test]
    fn gamma_grows_with_each_parameter() {
        let net = small_net();
        let base = net.compute_gamma(0.2, 0.2, 1.0).unwrap();
        assert!(net.compute_gamma(0.4, 0.2, 1.0).unwrap() > base);
        assert!(net.compute_gamma(0.2, 0.4, 1.0).unwrap() > base);
    }

    #[test]
    fn phase_coherence_bounded() {
        let net = SubstrateNetwork::with_seed((6, 6, 6), 1.0, 1.0, 11).unwrap();
        let r = net.phase_coherence();
        assert!((0.0..=1.0).contains(&r));
        // 1296 uniformly random phases: mean phasor is small
        assert!(r < 0.15, "random phases should be incoherent, r = {}", r);
    }

    #[test]
    fn aligned_phases_are_coherent() {
        let mut net = small_net();
        for v in net.voxels.iter_mut() {
            v.phases.iter_mut().for_each(|p| *p = 1.0);
        }
        assert!((net.phase_coherence() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn from_config_uses_grid_and_seed() {
        let config = SubstrateConfig {
            grid_size: [2, 3, 4],
            seed: 5,
            ..SubstrateConfig::default()
        };
        let a = SubstrateNetwork::from_config(&config).unwrap();
        let b = SubstrateNetwork::with_seed((2, 3, 4), 1.0, 1.0, 5).unwrap();
        assert_eq!(a.grid_size(), (2, 3, 4));
        assert_eq!(a.voxels()[7].modes, b.voxels()[7].modes);
    }
}
