//! # Portfolio Summary
//!
//! $$
//! \mathrm{SR} = \frac{252\,\bar r_p}{\sqrt{252}\,s_p}
//! $$
//!
//! Annualized performance statistics of a realized daily portfolio return
//! series, reported alongside the attribution table.

use ndarray::Array1;

use crate::error::Result;
use crate::error::TailRiskError;
use crate::portfolio::moments::TRADING_DAYS;

/// Annualized statistics of a daily portfolio return series.
#[derive(Clone, Debug, Default)]
pub struct PortfolioSummary {
  /// Annualized mean return.
  pub annualized_return: f64,
  /// Annualized volatility from the sample standard deviation (ddof = 1).
  pub annualized_volatility: f64,
  /// Sharpe ratio at a zero risk-free rate.
  pub sharpe: f64,
}

impl PortfolioSummary {
  /// Summarize a daily return series.
  pub fn from_daily_returns(daily: &Array1<f64>) -> Result<Self> {
    if daily.len() < 2 {
      return Err(TailRiskError::InvalidParameter {
        name: "daily",
        reason: format!(
          "{} daily returns; need at least 2 for a summary",
          daily.len()
        ),
      });
    }

    let mean_daily = daily.sum() / daily.len() as f64;
    let annualized_return = mean_daily * TRADING_DAYS;
    let annualized_volatility = daily.std(1.0) * TRADING_DAYS.sqrt();
    let sharpe = if annualized_volatility > 1e-15 {
      annualized_return / annualized_volatility
    } else {
      0.0
    };

    Ok(Self {
      annualized_return,
      annualized_volatility,
      sharpe,
    })
  }
}
