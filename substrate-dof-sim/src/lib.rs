//! # substrate-dof-sim
//!
//! Toy model of spacetime as a capacity-constrained voxel substrate, used to
//! test candidate mechanisms that produce time dilation by removing degrees
//! of freedom (DoF).
//!
//! Two dimensionless parameters describe the local state:
//!
//! ```text
//! ŝ  kinematic smear     |v|/c, motion-induced
//! λ̂  gravitational load  Σρ / (N · capacity), curvature-induced
//!
//! capacity budget        ŝ² + λ̂² ≤ 1
//! dilation               Γ(ŝ, λ̂) = 1/√(1−ŝ²) · 1/(1−λ̂)^p
//! ```
//!
//! A mechanism supplies the accessible DoF fraction f(ŝ, λ̂); if the local
//! tick rate scales with f, its implied slowdown 1/f can be set against Γ.
//!
//! ## Mechanisms
//!
//! - **Causal diamond throttling**: motion and curvature shrink the causal
//!   diamond, and DoF ∝ V^(2/3).
//! - **Tension-induced bandgaps**: load builds a tension tensor that opens a
//!   frequency gap in the mode spectrum and cuts off high frequencies.
//!
//! ## Usage
//!
//! ```no_run
//! use substrate_dof_sim::prelude::*;
//!
//! let substrate = SubstrateNetwork::with_seed((10, 10, 10), 1.0, 1.0, 42)?;
//! let diamond = CausalDiamondThrottling::default();
//!
//! let gamma = substrate.compute_gamma(0.3, 0.4, 1.0)?;
//! let dof = diamond.compute_dof_reduction(&substrate, 0.3, 0.4)?;
//! println!("Γ = {:.4}, 1/DoF = {:.4}", gamma, 1.0 / dof);
//! # Ok::<(), SubstrateError>(())
//! ```

pub mod units;
pub mod error;
pub mod config;
pub mod substrate;
pub mod mechanism;
pub mod causal_diamond;
pub mod tension_bandgap;
pub mod sweep;
pub mod validation;
pub mod plot;

pub mod prelude {
    pub use crate::causal_diamond::{CausalDiamondThrottling, DiamondEvolution};
    pub use crate::config::ExperimentConfig;
    pub use crate::error::{SubstrateError, SubstrateResult};
    pub use crate::mechanism::{DofMechanism, MechanismSignature};
    pub use crate::substrate::{SubstrateNetwork, VoxelState};
    pub use crate::sweep::{dilation_surface, GridField, ParameterGrid};
    pub use crate::tension_bandgap::{DispersionCurve, SpectrumSplit, TensionInducedBandgaps};
}
