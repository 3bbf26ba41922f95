//! # Price Repository
//!
//! Aligned access to historical close prices behind a [`PriceSource`]. One
//! `fetch` performs the single provider query of a pipeline run and yields
//! the NaN-free price and return panels.

use chrono::Local;
use chrono::Months;
use chrono::NaiveDate;
use tracing::debug;
use tracing::info;

use crate::error::Result;
use crate::error::TailRiskError;
use crate::market::panel::PricePanel;
use crate::market::panel::ReturnsPanel;
use crate::market::source::PriceSource;

/// Date window and history requirements for price retrieval.
#[derive(Clone, Debug)]
pub struct RepositoryConfig {
  /// Inclusive start of the lookback window.
  pub start_date: NaiveDate,
  /// Optional inclusive end of the lookback window.
  pub end_date: Option<NaiveDate>,
  /// Minimum forward-filled observation count per retained symbol.
  pub min_history_days: usize,
}

impl Default for RepositoryConfig {
  fn default() -> Self {
    Self {
      start_date: Local::now().date_naive() - Months::new(24),
      end_date: None,
      min_history_days: 504,
    }
  }
}

/// Close-price retrieval and alignment over an injected [`PriceSource`].
///
/// Configuration is passed in explicitly; nothing is read from the process
/// environment, so tests can substitute an in-memory source.
#[derive(Clone, Debug)]
pub struct PriceRepository<S> {
  source: S,
  config: RepositoryConfig,
}

impl<S: PriceSource> PriceRepository<S> {
  /// Construct a repository over `source` with an explicit window.
  pub fn new(source: S, config: RepositoryConfig) -> Self {
    Self { source, config }
  }

  /// Borrow the retrieval configuration.
  pub fn config(&self) -> &RepositoryConfig {
    &self.config
  }

  /// Fetch, align and differentiate close prices for `universe`.
  pub fn fetch(&self, universe: &[String]) -> Result<(PricePanel, ReturnsPanel)> {
    if universe.is_empty() {
      return Err(TailRiskError::DataUnavailable {
        reason: "empty asset universe".to_string(),
      });
    }

    let observations =
      self
        .source
        .close_prices(universe, self.config.start_date, self.config.end_date)?;
    debug!(rows = observations.len(), "raw price observations fetched");

    let panel =
      PricePanel::from_observations(&observations, universe, self.config.min_history_days)?;
    let returns = panel.returns()?;
    info!(
      symbols = panel.symbols.len(),
      dates = panel.dates.len(),
      "price panel aligned"
    );

    Ok((panel, returns))
  }
}
