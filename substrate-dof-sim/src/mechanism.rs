//! Common interface for degrees-of-freedom reduction mechanisms.
//!
//! A mechanism explains *why* a loaded or moving voxel evolves slower: it
//! removes some of the voxel's addressable degrees of freedom. If the local
//! tick rate scales with the accessible DoF fraction f(ŝ, λ̂), the mechanism
//! predicts a slowdown 1/f that can be set against the substrate's Γ(ŝ, λ̂).

use std::collections::BTreeMap;

use crate::error::SubstrateResult;
use crate::substrate::SubstrateNetwork;

/// Observational signatures of a mechanism, keyed by observable.
pub type MechanismSignature = BTreeMap<&'static str, &'static str>;

pub trait DofMechanism: Send + Sync {
    /// Short human-readable name.
    fn name(&self) -> &'static str;

    /// Fraction of degrees of freedom remaining, in [0, 1].
    fn dof_fraction(&self, s_hat: f64, lambda_hat: f64) -> f64;

    /// Observable consequences that would distinguish this mechanism.
    fn signature(&self) -> MechanismSignature;

    /// DoF fraction for a parameter pair the substrate admits.
    ///
    /// Rejects pairs outside the capacity budget ŝ² + λ̂² ≤ 1.
    fn compute_dof_reduction(
        &self,
        substrate: &SubstrateNetwork,
        s_hat: f64,
        lambda_hat: f64,
    ) -> SubstrateResult<f64> {
        substrate.check_capacity(s_hat, lambda_hat)?;
        Ok(self.dof_fraction(s_hat, lambda_hat))
    }

    /// Slowdown implied by the mechanism: 1 / DoF fraction.
    fn implied_dilation(&self, s_hat: f64, lambda_hat: f64) -> f64 {
        let f = self.dof_fraction(s_hat, lambda_hat);
        if f <= 0.0 {
            f64::INFINITY
        } else {
            1.0 / f
        }
    }
}
