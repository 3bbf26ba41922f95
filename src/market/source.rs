//! # Price Source
//!
//! Abstract close-price provider queried by symbol set and date range, plus
//! an in-memory implementation for tests and embedding.

use chrono::NaiveDate;
use impl_new_derive::ImplNew;

use crate::error::Result;

/// One raw close-price observation from a provider.
#[derive(Clone, Debug, PartialEq, ImplNew)]
pub struct PriceObservation {
  /// Ticker symbol the observation belongs to.
  pub symbol: String,
  /// Trading date of the close.
  pub date: NaiveDate,
  /// Close price in the provider's quote currency.
  pub close: f64,
}

/// Historical close-price provider.
///
/// Implementations are treated as authoritative, append-only history: the
/// pipeline only reads, and touches the source once per run.
pub trait PriceSource {
  /// All observations for `symbols` with `date >= start` and, when an end
  /// bound is given, `date <= end`. Order of the result is not significant.
  fn close_prices(
    &self,
    symbols: &[String],
    start: NaiveDate,
    end: Option<NaiveDate>,
  ) -> Result<Vec<PriceObservation>>;
}

/// In-memory price source backed by a plain observation list.
#[derive(Clone, Debug, Default, ImplNew)]
pub struct MemoryPriceSource {
  /// Backing observations, in no particular order.
  pub observations: Vec<PriceObservation>,
}

impl PriceSource for MemoryPriceSource {
  fn close_prices(
    &self,
    symbols: &[String],
    start: NaiveDate,
    end: Option<NaiveDate>,
  ) -> Result<Vec<PriceObservation>> {
    Ok(
      self
        .observations
        .iter()
        .filter(|obs| {
          symbols.iter().any(|s| *s == obs.symbol)
            && obs.date >= start
            && end.map_or(true, |e| obs.date <= e)
        })
        .cloned()
        .collect(),
    )
  }
}
