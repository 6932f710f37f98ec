use thiserror::Error;

/// Errors raised by substrate and mechanism computations.
#[derive(Error, Debug)]
pub enum SubstrateError {
    /// ŝ² + λ̂² exceeds the voxel capacity budget.
    #[error("capacity constraint violated: ŝ²+λ̂² = {:.4} > 1 (ŝ={s_hat}, λ̂={lambda_hat})", capacity_load(.s_hat, .lambda_hat))]
    CapacityViolated { s_hat: f64, lambda_hat: f64 },

    /// Γ diverges: ŝ = 1 (null motion) or λ̂ = 1 (zero lapse).
    #[error("dilation diverges at horizon (ŝ={s_hat}, λ̂={lambda_hat})")]
    Horizon { s_hat: f64, lambda_hat: f64 },

    /// Negative, non-finite or otherwise unusable input.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("config error: {0}")]
    Config(String),

    /// Figure rendering failed.
    #[error("plot error: {0}")]
    Plot(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type SubstrateResult<T> = Result<T, SubstrateError>;

fn capacity_load(s_hat: &f64, lambda_hat: &f64) -> f64 {
    s_hat * s_hat + lambda_hat * lambda_hat
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_message_reports_budget() {
        let err = SubstrateError::CapacityViolated { s_hat: 0.8, lambda_hat: 0.8 };
        let msg = err.to_string();
        assert!(msg.contains("1.2800"), "unexpected message: {}", msg);
    }
}
