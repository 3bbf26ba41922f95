//! # Moment Estimates
//!
//! $$
//! \hat\mu = 252\,\bar r, \qquad \hat\Sigma = 252\,\widehat{\operatorname{Cov}}(r)
//! $$
//!
//! Annualized sample mean and covariance of a returns panel. Estimates are
//! recomputed from scratch for every optimization call, full universe or
//! leave-one-out subset alike; nothing is cached.

use ndarray::Array1;
use ndarray::Array2;
use ndarray::Axis;
use ndarray_stats::CorrelationExt;

use crate::error::Result;
use crate::error::TailRiskError;
use crate::market::panel::ReturnsPanel;

/// Trading days per year used for annualization.
pub const TRADING_DAYS: f64 = 252.0;

/// Annualized first and second moments of a returns panel.
///
/// The covariance is the sample estimate (ddof = 1); it is symmetric and
/// positive-semidefinite up to floating-point error.
#[derive(Clone, Debug)]
pub struct MomentEstimates {
  /// Annualized mean return per asset, in panel column order.
  pub mean: Array1<f64>,
  /// Annualized sample covariance, shape `(assets, assets)`.
  pub covariance: Array2<f64>,
}

impl MomentEstimates {
  /// Estimate moments over the panel's full window.
  pub fn from_returns(panel: &ReturnsPanel) -> Result<Self> {
    if panel.n_obs() < 2 {
      return Err(TailRiskError::DataUnavailable {
        reason: format!(
          "{} return rows; need at least 2 for moment estimation",
          panel.n_obs()
        ),
      });
    }

    let mean = panel
      .values
      .mean_axis(Axis(0))
      .ok_or_else(|| TailRiskError::DataUnavailable {
        reason: "empty returns panel".to_string(),
      })?
      * TRADING_DAYS;

    // covariance convention: variables in rows, observations in columns
    let covariance = panel
      .values
      .t()
      .cov(1.0)
      .map_err(|_| TailRiskError::DataUnavailable {
        reason: "covariance estimation failed on empty panel".to_string(),
      })?
      * TRADING_DAYS;

    Ok(Self { mean, covariance })
  }
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;
  use chrono::NaiveDate;
  use ndarray::array;

  use super::*;

  fn panel() -> ReturnsPanel {
    let base = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    ReturnsPanel {
      dates: (0..3)
        .map(|i| base + chrono::Duration::days(i))
        .collect(),
      symbols: vec!["AAA".to_string(), "BBB".to_string()],
      values: array![[0.01, 0.00], [0.02, -0.01], [-0.01, 0.02]],
    }
  }

  #[test]
  fn mean_is_annualized_sample_mean() {
    let moments = MomentEstimates::from_returns(&panel()).unwrap();
    // (0.01 + 0.02 - 0.01) / 3 * 252 and (0.00 - 0.01 + 0.02) / 3 * 252
    assert_abs_diff_eq!(moments.mean[0], 1.68, epsilon = 1e-12);
    assert_abs_diff_eq!(moments.mean[1], 0.84, epsilon = 1e-12);
  }

  #[test]
  fn covariance_matches_hand_computation() {
    let moments = MomentEstimates::from_returns(&panel()).unwrap();
    // deviations of BBB are exactly the negated deviations of AAA here
    assert_abs_diff_eq!(moments.covariance[[0, 0]], 0.0588, epsilon = 1e-12);
    assert_abs_diff_eq!(moments.covariance[[1, 1]], 0.0588, epsilon = 1e-12);
    assert_abs_diff_eq!(moments.covariance[[0, 1]], -0.0588, epsilon = 1e-12);
    assert_abs_diff_eq!(
      moments.covariance[[0, 1]],
      moments.covariance[[1, 0]],
      epsilon = 1e-15
    );
  }

  #[test]
  fn single_row_panel_is_rejected() {
    let panel = ReturnsPanel {
      dates: vec![NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()],
      symbols: vec!["AAA".to_string()],
      values: array![[0.01]],
    };
    assert!(matches!(
      MomentEstimates::from_returns(&panel).unwrap_err(),
      TailRiskError::DataUnavailable { .. }
    ));
  }
}
