//! # Synthetic Market
//!
//! $$
//! dS_t = \mu S_t \, dt + \sigma S_t \, dW_t
//! $$
//!
//! Seeded geometric-Brownian-motion close prices feeding an in-memory
//! source, for demos and tests that must not touch a real provider.

use chrono::Datelike;
use chrono::NaiveDate;
use impl_new_derive::ImplNew;
use ndarray::Array1;
use ndarray_rand::RandomExt;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::market::source::MemoryPriceSource;
use crate::market::source::PriceObservation;

/// Parameters of one simulated asset.
#[derive(Clone, Debug, ImplNew)]
pub struct SyntheticAsset {
  /// Ticker symbol to emit.
  pub symbol: String,
  /// Initial close price.
  pub spot: f64,
  /// Annualized drift.
  pub drift: f64,
  /// Annualized volatility.
  pub volatility: f64,
}

/// Seeded GBM generator producing an in-memory price source.
#[derive(Clone, Debug, ImplNew)]
pub struct SyntheticMarket {
  /// Assets to simulate.
  pub assets: Vec<SyntheticAsset>,
  /// First calendar date of the window (weekends are skipped).
  pub start: NaiveDate,
  /// Last calendar date of the window, inclusive.
  pub end: NaiveDate,
  /// RNG seed; identical seeds reproduce identical histories.
  pub seed: u64,
}

impl SyntheticMarket {
  /// Trading dates in `[start, end]`, weekdays only.
  pub fn trading_dates(&self) -> Vec<NaiveDate> {
    let mut dates = Vec::new();
    let mut day = self.start;
    while day <= self.end {
      if day.weekday().number_from_monday() <= 5 {
        dates.push(day);
      }
      match day.succ_opt() {
        Some(next) => day = next,
        None => break,
      }
    }
    dates
  }

  /// Simulate every asset over the window into a [`MemoryPriceSource`].
  pub fn build(&self) -> MemoryPriceSource {
    let dates = self.trading_dates();
    let mut rng = StdRng::seed_from_u64(self.seed);
    let dt: f64 = 1.0 / 252.0;
    let mut observations = Vec::with_capacity(dates.len() * self.assets.len());

    for asset in &self.assets {
      let gn = Array1::random_using(
        dates.len().saturating_sub(1),
        Normal::new(0.0, dt.sqrt()).unwrap(),
        &mut rng,
      );
      let mut price = asset.spot;

      for (i, date) in dates.iter().enumerate() {
        if i > 0 {
          price += asset.drift * price * dt + asset.volatility * price * gn[i - 1];
        }
        observations.push(PriceObservation::new(asset.symbol.clone(), *date, price));
      }
    }

    MemoryPriceSource::new(observations)
  }
}
