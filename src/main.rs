use anyhow::Context;
use chrono::NaiveDate;
use prettytable::Cell;
use prettytable::Row;
use prettytable::Table;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use tailrisk_rs::market::PriceRepository;
use tailrisk_rs::market::RepositoryConfig;
use tailrisk_rs::market::SyntheticAsset;
use tailrisk_rs::market::SyntheticMarket;
use tailrisk_rs::portfolio::PortfolioSummary;
use tailrisk_rs::risk::EngineConfig;
use tailrisk_rs::risk::IncrementalVarEngine;
use tailrisk_rs::risk::IncrementalVarReport;
use tailrisk_rs::risk::expected_shortfall;

fn main() -> anyhow::Result<()> {
  tracing_subscriber::registry()
    .with(tracing_subscriber::fmt::layer())
    .with(tracing_subscriber::EnvFilter::from_default_env())
    .init();

  // two calendar years of weekday closes, enough for the default history gate
  let start = NaiveDate::from_ymd_opt(2023, 1, 2).context("invalid demo start date")?;
  let end = NaiveDate::from_ymd_opt(2024, 12, 31).context("invalid demo end date")?;

  let market = SyntheticMarket::new(demo_assets(), start, end, 42);
  let universe: Vec<String> = market.assets.iter().map(|a| a.symbol.clone()).collect();
  info!(assets = universe.len(), "running demo attribution");

  let repository = PriceRepository::new(
    market.build(),
    RepositoryConfig {
      start_date: start,
      end_date: Some(end),
      min_history_days: 504,
    },
  );
  let engine = IncrementalVarEngine::new(repository, EngineConfig::default());
  let report = engine.run(&universe)?;

  let confidence = engine.config().confidence_level;
  let es = expected_shortfall(&report.portfolio_daily, confidence)?;
  let summary = PortfolioSummary::from_daily_returns(&report.portfolio_daily)?;

  println!(
    "Optimized portfolio, {} of {} assets active",
    report.active_assets,
    report.weights.len()
  );
  println!(
    "Daily VaR {:.0}%: {:.3}%   ES: {:.3}%",
    confidence * 100.0,
    report.var_full * 100.0,
    es * 100.0
  );
  println!(
    "Annualized return {:.2}%   volatility {:.2}%   Sharpe {:.2}",
    summary.annualized_return * 100.0,
    summary.annualized_volatility * 100.0,
    summary.sharpe
  );
  println!();

  attribution_table(&report).printstd();
  Ok(())
}

fn demo_assets() -> Vec<SyntheticAsset> {
  vec![
    SyntheticAsset::new("TECH".to_string(), 180.0, 0.16, 0.32),
    SyntheticAsset::new("ENRG".to_string(), 75.0, 0.07, 0.28),
    SyntheticAsset::new("FINL".to_string(), 110.0, 0.09, 0.22),
    SyntheticAsset::new("HLTH".to_string(), 140.0, 0.10, 0.18),
    SyntheticAsset::new("CONS".to_string(), 60.0, 0.06, 0.14),
    SyntheticAsset::new("UTIL".to_string(), 90.0, 0.05, 0.12),
  ]
}

fn attribution_table(report: &IncrementalVarReport) -> Table {
  let mut table = Table::new();
  table.add_row(Row::new(vec![
    Cell::new("Asset"),
    Cell::new("Weight %"),
    Cell::new("VaR full %"),
    Cell::new("VaR w/o %"),
    Cell::new("Incremental VaR %"),
  ]));

  for row in &report.rows {
    table.add_row(Row::new(vec![
      Cell::new(&row.symbol),
      Cell::new(&format!("{:.2}", row.weight * 100.0)),
      Cell::new(&format!("{:.3}", row.var_full * 100.0)),
      Cell::new(&format!("{:.3}", row.var_without * 100.0)),
      Cell::new(&format!("{:+.3}", row.incremental_var * 100.0)),
    ]));
  }
  table
}
