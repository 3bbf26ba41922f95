//! # Yahoo Price Source
//!
//! [`PriceSource`] implementation over the blocking `yahoo_finance_api`
//! client. Enabled with the `yahoo` feature; no credentials required.

use chrono::DateTime;
use chrono::Local;
use chrono::NaiveDate;
use chrono::NaiveTime;
use time::OffsetDateTime;
use tracing::debug;
use yahoo_finance_api::YahooConnector;

use crate::error::Result;
use crate::error::TailRiskError;
use crate::market::source::PriceObservation;
use crate::market::source::PriceSource;

/// Daily close-price provider backed by Yahoo Finance quote history.
#[derive(Debug, Default)]
pub struct YahooSource;

impl YahooSource {
  /// Construct a provider.
  pub fn new() -> Self {
    Self
  }
}

fn day_start(date: NaiveDate) -> Result<OffsetDateTime> {
  let secs = date.and_time(NaiveTime::MIN).and_utc().timestamp();
  OffsetDateTime::from_unix_timestamp(secs).map_err(|e| TailRiskError::DataUnavailable {
    reason: format!("date {} out of range: {}", date, e),
  })
}

fn unavailable(symbol: &str, err: impl std::fmt::Display) -> TailRiskError {
  TailRiskError::DataUnavailable {
    reason: format!("yahoo history for {}: {}", symbol, err),
  }
}

impl PriceSource for YahooSource {
  fn close_prices(
    &self,
    symbols: &[String],
    start: NaiveDate,
    end: Option<NaiveDate>,
  ) -> Result<Vec<PriceObservation>> {
    let provider = YahooConnector::new().map_err(|e| TailRiskError::DataUnavailable {
      reason: format!("yahoo connector: {}", e),
    })?;

    let until = end.unwrap_or_else(|| Local::now().date_naive());
    let period_start = day_start(start)?;
    let period_end = day_start(until.succ_opt().unwrap_or(until))?;

    let mut observations = Vec::new();
    for symbol in symbols {
      let response = provider
        .get_quote_history(symbol, period_start, period_end)
        .map_err(|e| unavailable(symbol, e))?;
      let quotes = response.quotes().map_err(|e| unavailable(symbol, e))?;
      debug!(symbol = %symbol, quotes = quotes.len(), "yahoo quote history fetched");

      for quote in quotes {
        let date = match DateTime::from_timestamp(quote.timestamp as i64, 0) {
          Some(ts) => ts.date_naive(),
          None => continue,
        };
        if date < start || date > until {
          continue;
        }
        // adjusted close, so splits and dividends do not fabricate jumps
        observations.push(PriceObservation::new(symbol.clone(), date, quote.adjclose));
      }
    }

    Ok(observations)
  }
}
