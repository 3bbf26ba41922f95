//! # Price Panel
//!
//! $$
//! r_{t,j} = \frac{P_{t,j} - P_{t-1,j}}{P_{t-1,j}}
//! $$
//!
//! Date-aligned close-price and simple-return panels. Raw provider rows are
//! pivoted into a date-by-symbol grid, forward-filled per symbol, filtered
//! against a minimum-history threshold and stripped of any date that still
//! misses a value.

use std::collections::HashMap;

use chrono::NaiveDate;
use ndarray::Array1;
use ndarray::Array2;
use ndarray::Axis;

use crate::error::Result;
use crate::error::TailRiskError;
use crate::market::source::PriceObservation;

/// Aligned close prices: rows are trading dates, columns are symbols.
///
/// Invariants: no missing values, dates strictly increasing, every column
/// carries at least the history-threshold number of observations.
#[derive(Clone, Debug)]
pub struct PricePanel {
  /// Trading dates, ascending.
  pub dates: Vec<NaiveDate>,
  /// Symbols, in universe order.
  pub symbols: Vec<String>,
  /// Close prices, shape `(dates, symbols)`.
  pub values: Array2<f64>,
}

impl PricePanel {
  /// Pivot raw observations into an aligned panel.
  ///
  /// Column order follows `universe`; symbols without any observation get no
  /// column. Forward-fill bridges gaps after a symbol's first print, then a
  /// symbol is retained only when its filled observation count reaches
  /// `min_history`. Dates missing a value for any retained symbol (those
  /// before the latest first print) are dropped.
  pub fn from_observations(
    observations: &[PriceObservation],
    universe: &[String],
    min_history: usize,
  ) -> Result<Self> {
    if observations.is_empty() {
      return Err(TailRiskError::DataUnavailable {
        reason: "price query returned no rows".to_string(),
      });
    }

    let mut dates: Vec<NaiveDate> = observations.iter().map(|obs| obs.date).collect();
    dates.sort_unstable();
    dates.dedup();

    let row_of: HashMap<NaiveDate, usize> =
      dates.iter().enumerate().map(|(i, d)| (*d, i)).collect();

    let mut symbols: Vec<String> = Vec::new();
    for symbol in universe {
      if !symbols.contains(symbol) && observations.iter().any(|obs| &obs.symbol == symbol) {
        symbols.push(symbol.clone());
      }
    }

    let mut grid = Array2::<f64>::from_elem((dates.len(), symbols.len()), f64::NAN);
    for obs in observations {
      if let Some(col) = symbols.iter().position(|s| *s == obs.symbol) {
        grid[[row_of[&obs.date], col]] = obs.close;
      }
    }

    // forward-fill per column, counting filled observations as we go
    let mut filled = vec![0usize; symbols.len()];
    for col in 0..symbols.len() {
      let mut last = f64::NAN;
      for row in 0..dates.len() {
        if grid[[row, col]].is_nan() {
          grid[[row, col]] = last;
        } else {
          last = grid[[row, col]];
        }
        if !grid[[row, col]].is_nan() {
          filled[col] += 1;
        }
      }
    }

    let keep_cols: Vec<usize> = (0..symbols.len())
      .filter(|&col| filled[col] >= min_history)
      .collect();
    if keep_cols.is_empty() {
      return Err(TailRiskError::DataUnavailable {
        reason: format!("no symbol has at least {} observations", min_history),
      });
    }

    let symbols: Vec<String> = keep_cols.iter().map(|&col| symbols[col].clone()).collect();
    let grid = grid.select(Axis(1), &keep_cols);

    let keep_rows: Vec<usize> = (0..dates.len())
      .filter(|&row| grid.row(row).iter().all(|v| !v.is_nan()))
      .collect();
    if keep_rows.is_empty() {
      return Err(TailRiskError::DataUnavailable {
        reason: "alignment left an empty panel".to_string(),
      });
    }

    let dates: Vec<NaiveDate> = keep_rows.iter().map(|&row| dates[row]).collect();
    let values = grid.select(Axis(0), &keep_rows);

    Ok(Self {
      dates,
      symbols,
      values,
    })
  }

  /// Derive the simple-return panel, one row shorter than the price panel.
  pub fn returns(&self) -> Result<ReturnsPanel> {
    if self.dates.len() < 2 {
      return Err(TailRiskError::DataUnavailable {
        reason: "fewer than two aligned dates; cannot derive returns".to_string(),
      });
    }

    let rows = self.dates.len() - 1;
    let cols = self.symbols.len();
    let mut values = Array2::<f64>::zeros((rows, cols));
    for row in 0..rows {
      for col in 0..cols {
        let prev = self.values[[row, col]];
        values[[row, col]] = (self.values[[row + 1, col]] - prev) / prev;
      }
    }

    Ok(ReturnsPanel {
      dates: self.dates[1..].to_vec(),
      symbols: self.symbols.clone(),
      values,
    })
  }
}

/// Simple daily returns aligned with the price panel that produced them.
#[derive(Clone, Debug)]
pub struct ReturnsPanel {
  /// Trading dates, ascending; the price panel's first date is absent.
  pub dates: Vec<NaiveDate>,
  /// Symbols, identical to the source price panel.
  pub symbols: Vec<String>,
  /// Simple returns, shape `(dates, symbols)`.
  pub values: Array2<f64>,
}

impl ReturnsPanel {
  /// Number of symbols carried.
  pub fn n_assets(&self) -> usize {
    self.symbols.len()
  }

  /// Number of return observations per symbol.
  pub fn n_obs(&self) -> usize {
    self.dates.len()
  }

  /// Column position of `symbol`, if present.
  pub fn column_index(&self, symbol: &str) -> Option<usize> {
    self.symbols.iter().position(|s| s == symbol)
  }

  /// Panel with the column at `index` removed; the leave-one-out subset.
  pub fn without_column(&self, index: usize) -> ReturnsPanel {
    let keep: Vec<usize> = (0..self.symbols.len()).filter(|&col| col != index).collect();
    ReturnsPanel {
      dates: self.dates.clone(),
      symbols: keep.iter().map(|&col| self.symbols[col].clone()).collect(),
      values: self.values.select(Axis(1), &keep),
    }
  }

  /// Weighted row sums: the portfolio's daily return series.
  pub fn portfolio_returns(&self, weights: &Array1<f64>) -> Array1<f64> {
    self.values.dot(weights)
  }
}
