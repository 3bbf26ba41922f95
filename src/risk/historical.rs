//! # Historical VaR
//!
//! $$
//! h = (n-1)\,q, \qquad
//! \mathrm{VaR}_q = x_{\lfloor h \rfloor}
//!   + (h - \lfloor h \rfloor)\,(x_{\lfloor h \rfloor + 1} - x_{\lfloor h \rfloor})
//! $$
//!
//! Empirical quantile of the loss distribution $ L = -r $ with linear
//! interpolation between adjacent order statistics, and the conditional
//! mean of the tail beyond it. Positive values are losses; a negative VaR
//! means the requested quantile still sits in the gain region.

use ndarray::Array1;

use crate::error::Result;
use crate::error::TailRiskError;

fn validate(returns: &Array1<f64>, confidence: f64) -> Result<()> {
  if returns.is_empty() {
    return Err(TailRiskError::InvalidParameter {
      name: "returns",
      reason: "empty return series".to_string(),
    });
  }
  if !(confidence > 0.0 && confidence < 1.0) {
    return Err(TailRiskError::InvalidParameter {
      name: "confidence",
      reason: format!("{} outside (0, 1)", confidence),
    });
  }
  Ok(())
}

/// Historical Value-at-Risk of a daily return series.
///
/// Losses are the negated returns; the quantile is interpolated linearly
/// between order statistics, so with 100 observations at `confidence = 0.95`
/// the estimate lies between the 95th and 96th sorted loss.
pub fn historical_var(returns: &Array1<f64>, confidence: f64) -> Result<f64> {
  validate(returns, confidence)?;

  let mut losses: Vec<f64> = returns.iter().map(|r| -r).collect();
  losses.sort_by(|a, b| a.total_cmp(b));

  let h = (losses.len() - 1) as f64 * confidence;
  let lo = h.floor() as usize;
  let frac = h - h.floor();

  if lo + 1 < losses.len() {
    Ok(losses[lo] + frac * (losses[lo + 1] - losses[lo]))
  } else {
    Ok(losses[lo])
  }
}

/// Expected Shortfall as the mean loss at or beyond the VaR threshold.
///
/// Tail membership uses a `1e-12` tolerance below VaR so an observation
/// equal to the threshold up to rounding is not excluded. An empty tail
/// degrades to the VaR itself.
pub fn expected_shortfall(returns: &Array1<f64>, confidence: f64) -> Result<f64> {
  let var = historical_var(returns, confidence)?;

  let mut tail_sum = 0.0;
  let mut tail_count = 0usize;
  for r in returns.iter() {
    let loss = -r;
    if loss >= var - 1e-12 {
      tail_sum += loss;
      tail_count += 1;
    }
  }

  if tail_count == 0 {
    return Ok(var);
  }
  Ok(tail_sum / tail_count as f64)
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;
  use ndarray::Array1;
  use ndarray::array;

  use super::*;

  /// 100 losses of 0.001, 0.002, ..., 0.100.
  fn ladder() -> Array1<f64> {
    (1..=100).map(|i| -(i as f64) / 1000.0).collect()
  }

  #[test]
  fn interpolates_between_order_statistics() {
    let returns = array![-0.01, -0.04, -0.02, -0.03];
    // sorted losses [0.01, 0.02, 0.03, 0.04], h = 3 * 0.5 = 1.5
    let var = historical_var(&returns, 0.5).unwrap();
    assert_abs_diff_eq!(var, 0.025, epsilon = 1e-12);
  }

  #[test]
  fn ladder_var_leaves_five_exceedances() {
    let returns = ladder();
    let var = historical_var(&returns, 0.95).unwrap();
    // h = 99 * 0.95 = 94.05 between losses 0.095 and 0.096
    assert_abs_diff_eq!(var, 0.09505, epsilon = 1e-12);
    let exceedances = returns.iter().filter(|r| -*r > var).count();
    assert_eq!(exceedances, 5);
  }

  #[test]
  fn ladder_shortfall_is_tail_mean() {
    let returns = ladder();
    let es = expected_shortfall(&returns, 0.95).unwrap();
    // tail beyond 0.09505 is {0.096, ..., 0.100}
    assert_abs_diff_eq!(es, 0.098, epsilon = 1e-12);
    assert!(es > historical_var(&returns, 0.95).unwrap());
  }

  #[test]
  fn all_gain_series_yields_negative_var() {
    let returns = array![0.02, 0.02, 0.02, 0.02];
    let var = historical_var(&returns, 0.95).unwrap();
    let es = expected_shortfall(&returns, 0.95).unwrap();
    assert_abs_diff_eq!(var, -0.02, epsilon = 1e-12);
    assert_abs_diff_eq!(es, -0.02, epsilon = 1e-12);
  }

  #[test]
  fn var_is_monotone_in_confidence() {
    let returns = ladder();
    let lo = historical_var(&returns, 0.90).unwrap();
    let hi = historical_var(&returns, 0.99).unwrap();
    assert!(hi > lo);
  }

  #[test]
  fn single_observation_is_the_quantile() {
    let returns = array![-0.015];
    let var = historical_var(&returns, 0.95).unwrap();
    assert_abs_diff_eq!(var, 0.015, epsilon = 1e-15);
  }

  #[test]
  fn confidence_bounds_are_exclusive() {
    let returns = ladder();
    for confidence in [0.0, 1.0, -0.5, 1.5] {
      assert!(matches!(
        historical_var(&returns, confidence).unwrap_err(),
        TailRiskError::InvalidParameter {
          name: "confidence",
          ..
        }
      ));
    }
  }

  #[test]
  fn extreme_confidences_approach_the_range_ends() {
    let returns = ladder();
    let near_max = historical_var(&returns, 0.9999).unwrap();
    let near_min = historical_var(&returns, 0.0001).unwrap();
    assert!(near_max > 0.0999 && near_max <= 0.100);
    assert!(near_min < 0.0011 && near_min >= 0.001);
  }

  #[test]
  fn empty_series_is_rejected() {
    let returns = Array1::<f64>::zeros(0);
    assert!(matches!(
      historical_var(&returns, 0.95).unwrap_err(),
      TailRiskError::InvalidParameter { name: "returns", .. }
    ));
  }
}
