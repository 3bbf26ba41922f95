//! # Mean Views
//!
//! $$
//! \tilde\mu_i = \tau\,\hat\mu_i + (1 - \tau)\,\bar\mu
//! $$
//!
//! Shrinks the annualized sample means toward their cross-sectional grand
//! mean before optimization. Sample means are the noisiest input to the
//! quadratic program; a small $ \tau $ keeps only a fraction of each
//! asset's own estimate and damps corner solutions driven by estimation
//! error.

use ndarray::Array1;

use crate::error::Result;
use crate::error::TailRiskError;

/// Default blending weight applied to the per-asset sample means.
pub const DEFAULT_TAU: f64 = 0.05;

/// Blends per-asset means with their grand mean.
///
/// `tau = 1` returns the sample means unchanged; `tau = 0` assigns every
/// asset the cross-sectional average, so only the covariance differentiates
/// them in the optimizer.
pub fn adjust_means(means: &Array1<f64>, tau: f64) -> Result<Array1<f64>> {
  if !(0.0..=1.0).contains(&tau) {
    return Err(TailRiskError::InvalidParameter {
      name: "tau",
      reason: format!("{} outside [0, 1]", tau),
    });
  }

  let grand = means.mean().ok_or_else(|| TailRiskError::InvalidParameter {
    name: "means",
    reason: "mean vector is empty".to_string(),
  })?;

  Ok(means.mapv(|mu| tau * mu + (1.0 - tau) * grand))
}
