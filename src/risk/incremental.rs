//! # Incremental VaR
//!
//! $$
//! \Delta\mathrm{VaR}_i = \mathrm{VaR}_q(r_{\text{full}}) - \mathrm{VaR}_q(r_{-i})
//! $$
//!
//! Leave-one-out attribution of portfolio tail risk. Each active asset is
//! removed in turn, the remaining universe is re-optimized from scratch and
//! its VaR gap to the full portfolio is recorded. A positive increment
//! marks an asset whose presence deepens the tail; a negative one marks a
//! diversifier the portfolio would miss.

use std::cmp::Reverse;

use impl_new_derive::ImplNew;
use ndarray::Array1;
use ordered_float::OrderedFloat;
use rayon::prelude::*;
use tracing::info;
use tracing::warn;

use crate::error::Result;
use crate::error::TailRiskError;
use crate::market::panel::ReturnsPanel;
use crate::market::repository::PriceRepository;
use crate::market::source::PriceSource;
use crate::portfolio::moments::MomentEstimates;
use crate::portfolio::optimizer::MeanVarianceOptimizer;
use crate::portfolio::optimizer::WeightVector;
use crate::portfolio::views::DEFAULT_TAU;
use crate::portfolio::views::adjust_means;
use crate::risk::historical::historical_var;

/// Expected-return estimator fed to the optimizer.
#[derive(Clone, Copy, Debug)]
pub enum MeanEstimator {
  /// Annualized sample means straight from the panel.
  Sample,
  /// Sample means blended toward their grand mean with weight `tau`.
  Shrinkage {
    /// Blending weight in `[0, 1]`; `1` keeps the sample means.
    tau: f64,
  },
}

impl MeanEstimator {
  /// Parse a string into a [`MeanEstimator`].
  pub fn from_str(s: &str) -> Self {
    match s.to_lowercase().as_str() {
      "shrink" | "shrinkage" | "grand-mean" => Self::Shrinkage { tau: DEFAULT_TAU },
      _ => Self::Sample,
    }
  }
}

/// Tunables of one attribution run.
#[derive(Clone, Debug)]
pub struct EngineConfig {
  /// Confidence level for VaR and ES, strictly inside `(0, 1)`.
  pub confidence_level: f64,
  /// Risk-aversion coefficient of the mean-variance objective.
  pub risk_aversion: f64,
  /// Expected-return estimator used for every solve.
  pub mean_estimator: MeanEstimator,
  /// Weights at or below this threshold are treated as inactive and get no
  /// attribution row.
  pub active_weight_threshold: f64,
}

impl Default for EngineConfig {
  fn default() -> Self {
    Self {
      confidence_level: 0.95,
      risk_aversion: 5.0,
      mean_estimator: MeanEstimator::Sample,
      active_weight_threshold: 1e-6,
    }
  }
}

impl EngineConfig {
  fn validate(&self) -> Result<()> {
    if !(self.confidence_level > 0.0 && self.confidence_level < 1.0) {
      return Err(TailRiskError::InvalidParameter {
        name: "confidence_level",
        reason: format!("{} outside (0, 1)", self.confidence_level),
      });
    }
    if !self.risk_aversion.is_finite() || self.risk_aversion <= 0.0 {
      return Err(TailRiskError::InvalidParameter {
        name: "risk_aversion",
        reason: format!("{} is not a positive finite coefficient", self.risk_aversion),
      });
    }
    if !self.active_weight_threshold.is_finite() || self.active_weight_threshold < 0.0 {
      return Err(TailRiskError::InvalidParameter {
        name: "active_weight_threshold",
        reason: format!("{} is not a non-negative threshold", self.active_weight_threshold),
      });
    }
    if let MeanEstimator::Shrinkage { tau } = self.mean_estimator {
      if !(0.0..=1.0).contains(&tau) {
        return Err(TailRiskError::InvalidParameter {
          name: "tau",
          reason: format!("{} outside [0, 1]", tau),
        });
      }
    }
    Ok(())
  }
}

/// One line of the attribution table.
#[derive(Clone, Debug, ImplNew)]
pub struct IncrementalVarRow {
  /// Asset symbol.
  pub symbol: String,
  /// Weight the asset carries in the full-universe portfolio.
  pub weight: f64,
  /// Historical VaR of the full-universe portfolio, repeated per row so a
  /// table stands on its own.
  pub var_full: f64,
  /// Portfolio VaR with the asset removed and the remainder re-optimized.
  pub var_without: f64,
  /// `var_full - var_without`; positive marks a risk contributor, negative
  /// a diversifier.
  pub incremental_var: f64,
}

/// Output of one attribution run.
///
/// Rows are sorted by descending incremental VaR. Values are daily return
/// fractions; percent scaling is left to rendering.
#[derive(Clone, Debug, ImplNew)]
pub struct IncrementalVarReport {
  /// Attribution rows for the active assets whose subset solve succeeded.
  pub rows: Vec<IncrementalVarRow>,
  /// Realized daily returns of the full-universe portfolio.
  pub portfolio_daily: Array1<f64>,
  /// Full-universe weights.
  pub weights: WeightVector,
  /// Historical VaR of the full-universe portfolio.
  pub var_full: f64,
  /// Assets above the active-weight threshold.
  pub active_assets: usize,
}

fn optimize_panel(config: &EngineConfig, panel: &ReturnsPanel) -> Result<WeightVector> {
  let optimizer = MeanVarianceOptimizer::new(config.risk_aversion);
  match config.mean_estimator {
    MeanEstimator::Sample => optimizer.optimize(panel),
    MeanEstimator::Shrinkage { tau } => {
      let moments = MomentEstimates::from_returns(panel)?;
      let adjusted = adjust_means(&moments.mean, tau)?;
      optimizer.optimize_with_means(panel, &adjusted)
    }
  }
}

fn reoptimized_var(config: &EngineConfig, subset: &ReturnsPanel) -> Result<f64> {
  let weights = optimize_panel(config, subset)?;
  let daily = subset.portfolio_returns(&weights.weights);
  historical_var(&daily, config.confidence_level)
}

/// Orchestrates one attribution run over an injected price source.
///
/// `run` performs the single provider fetch, the full-universe solve and
/// the per-asset leave-one-out loop. Subset failures are logged and their
/// rows dropped so one pathological asset cannot poison the table; any
/// failure at full-universe scope propagates.
#[derive(Clone, Debug)]
pub struct IncrementalVarEngine<S> {
  repository: PriceRepository<S>,
  config: EngineConfig,
}

impl<S: PriceSource> IncrementalVarEngine<S> {
  /// Construct an engine over `repository` with explicit tunables.
  pub fn new(repository: PriceRepository<S>, config: EngineConfig) -> Self {
    Self { repository, config }
  }

  /// Borrow the engine tunables.
  pub fn config(&self) -> &EngineConfig {
    &self.config
  }

  /// Run the full attribution pipeline for `universe`.
  pub fn run(&self, universe: &[String]) -> Result<IncrementalVarReport> {
    self.config.validate()?;

    let (_prices, returns) = self.repository.fetch(universe)?;
    if returns.n_assets() < 2 {
      return Err(TailRiskError::DegenerateUniverse {
        found: returns.n_assets(),
      });
    }

    let weights_full = optimize_panel(&self.config, &returns)?;
    let portfolio_daily = returns.portfolio_returns(&weights_full.weights);
    let var_full = historical_var(&portfolio_daily, self.config.confidence_level)?;
    info!(var_full, n_assets = returns.n_assets(), "full universe optimized");

    let active: Vec<(usize, String, f64)> = weights_full
      .symbols
      .iter()
      .zip(weights_full.weights.iter())
      .filter(|(_, w)| **w > self.config.active_weight_threshold)
      .filter_map(|(symbol, w)| {
        returns
          .column_index(symbol)
          .map(|index| (index, symbol.clone(), *w))
      })
      .collect();
    let active_assets = active.len();

    let config = &self.config;
    let mut rows: Vec<IncrementalVarRow> = active
      .into_par_iter()
      .filter_map(|(index, symbol, weight)| {
        let subset = returns.without_column(index);
        match reoptimized_var(config, &subset) {
          Ok(var_without) => Some(IncrementalVarRow::new(
            symbol,
            weight,
            var_full,
            var_without,
            var_full - var_without,
          )),
          Err(err) => {
            warn!(symbol = %symbol, %err, "leave-one-out subset dropped");
            None
          }
        }
      })
      .collect();
    rows.sort_by_key(|row| Reverse(OrderedFloat(row.incremental_var)));

    info!(
      rows = rows.len(),
      active_assets, "incremental var table assembled"
    );
    Ok(IncrementalVarReport::new(
      rows,
      portfolio_daily,
      weights_full,
      var_full,
      active_assets,
    ))
  }
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;
  use chrono::NaiveDate;
  use tracing_test::traced_test;

  use super::*;
  use crate::market::repository::RepositoryConfig;
  use crate::market::source::MemoryPriceSource;
  use crate::market::source::PriceObservation;

  /// Price paths whose daily returns reproduce a fixed three-asset matrix.
  fn scenario_source() -> MemoryPriceSource {
    let returns = [
      [0.01, -0.02, 0.00],
      [0.02, 0.01, -0.01],
      [-0.01, 0.03, 0.02],
    ];
    let symbols = ["AAA", "BBB", "CCC"];
    let base = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    let mut prices = [100.0, 50.0, 200.0];

    let mut observations = Vec::new();
    for (j, symbol) in symbols.iter().enumerate() {
      observations.push(PriceObservation::new(symbol.to_string(), base, prices[j]));
    }
    for (t, row) in returns.iter().enumerate() {
      let day = base + chrono::Duration::days(t as i64 + 1);
      for (j, symbol) in symbols.iter().enumerate() {
        prices[j] *= 1.0 + row[j];
        observations.push(PriceObservation::new(symbol.to_string(), day, prices[j]));
      }
    }
    MemoryPriceSource::new(observations)
  }

  fn repository(source: MemoryPriceSource) -> PriceRepository<MemoryPriceSource> {
    PriceRepository::new(
      source,
      RepositoryConfig {
        start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        end_date: None,
        min_history_days: 1,
      },
    )
  }

  fn universe() -> Vec<String> {
    vec!["AAA".to_string(), "BBB".to_string(), "CCC".to_string()]
  }

  #[test]
  fn rows_match_independent_recomputation() {
    let engine = IncrementalVarEngine::new(repository(scenario_source()), EngineConfig::default());
    let report = engine.run(&universe()).unwrap();

    assert_abs_diff_eq!(report.weights.weights.sum(), 1.0, epsilon = 1e-9);
    assert_abs_diff_eq!(
      report.var_full,
      historical_var(&report.portfolio_daily, 0.95).unwrap(),
      epsilon = 1e-12
    );
    assert_eq!(report.rows.len(), report.active_assets);

    let (_, returns) = repository(scenario_source()).fetch(&universe()).unwrap();
    assert_eq!(report.weights.len(), returns.n_assets());
    assert_eq!(report.portfolio_daily.len(), returns.n_obs());

    let optimizer = MeanVarianceOptimizer::new(5.0);
    for row in &report.rows {
      assert!(row.weight > 1e-6);
      assert_abs_diff_eq!(row.var_full, report.var_full, epsilon = 1e-15);
      let index = returns.column_index(&row.symbol).unwrap();
      let subset = returns.without_column(index);
      let weights = optimizer.optimize(&subset).unwrap();
      let expected = historical_var(&subset.portfolio_returns(&weights.weights), 0.95).unwrap();
      assert_abs_diff_eq!(row.var_without, expected, epsilon = 1e-9);
      assert_abs_diff_eq!(
        row.incremental_var,
        report.var_full - row.var_without,
        epsilon = 1e-12
      );
    }
  }

  #[test]
  fn rows_are_sorted_descending() {
    let engine = IncrementalVarEngine::new(repository(scenario_source()), EngineConfig::default());
    let report = engine.run(&universe()).unwrap();
    for pair in report.rows.windows(2) {
      assert!(pair[0].incremental_var >= pair[1].incremental_var);
    }
  }

  #[test]
  fn unit_subsets_use_single_asset_var() {
    // with two assets each leave-one-out subset takes the whole budget
    let pair = vec!["AAA".to_string(), "BBB".to_string()];
    let engine = IncrementalVarEngine::new(repository(scenario_source()), EngineConfig::default());
    let report = engine.run(&pair).unwrap();
    assert_eq!(report.rows.len(), 2);

    let (_, returns) = repository(scenario_source()).fetch(&pair).unwrap();
    for row in &report.rows {
      let other = pair.iter().find(|s| **s != row.symbol).unwrap();
      let index = returns.column_index(other).unwrap();
      let column = returns.values.column(index).to_owned();
      let expected = historical_var(&column, 0.95).unwrap();
      assert_abs_diff_eq!(row.var_without, expected, epsilon = 1e-12);
    }
  }

  #[test]
  fn threshold_above_all_weights_empties_table() {
    let config = EngineConfig {
      active_weight_threshold: 1.1,
      ..EngineConfig::default()
    };
    let engine = IncrementalVarEngine::new(repository(scenario_source()), config);
    let report = engine.run(&universe()).unwrap();

    assert!(report.rows.is_empty());
    assert_eq!(report.active_assets, 0);
    assert!(report.var_full.is_finite());
    assert_eq!(report.weights.len(), 3);
  }

  #[test]
  fn shrinkage_estimator_runs_end_to_end() {
    let config = EngineConfig {
      mean_estimator: MeanEstimator::Shrinkage { tau: 0.05 },
      ..EngineConfig::default()
    };
    let engine = IncrementalVarEngine::new(repository(scenario_source()), config);
    let report = engine.run(&universe()).unwrap();

    assert_abs_diff_eq!(report.weights.weights.sum(), 1.0, epsilon = 1e-9);
    assert_eq!(report.rows.len(), report.active_assets);
  }

  #[test]
  fn single_symbol_universe_is_degenerate() {
    let engine = IncrementalVarEngine::new(repository(scenario_source()), EngineConfig::default());
    assert!(matches!(
      engine.run(&["AAA".to_string()]).unwrap_err(),
      TailRiskError::DegenerateUniverse { found: 1 }
    ));
  }

  #[test]
  fn empty_source_propagates_data_unavailable() {
    let engine = IncrementalVarEngine::new(
      repository(MemoryPriceSource::default()),
      EngineConfig::default(),
    );
    assert!(matches!(
      engine.run(&universe()).unwrap_err(),
      TailRiskError::DataUnavailable { .. }
    ));
  }

  #[test]
  fn config_is_validated_before_any_fetch() {
    // invalid confidence must win over the empty source behind it
    let engine = IncrementalVarEngine::new(
      repository(MemoryPriceSource::default()),
      EngineConfig {
        confidence_level: 1.0,
        ..EngineConfig::default()
      },
    );
    assert!(matches!(
      engine.run(&universe()).unwrap_err(),
      TailRiskError::InvalidParameter {
        name: "confidence_level",
        ..
      }
    ));
  }

  #[test]
  fn nonpositive_risk_aversion_is_rejected() {
    let engine = IncrementalVarEngine::new(
      repository(scenario_source()),
      EngineConfig {
        risk_aversion: 0.0,
        ..EngineConfig::default()
      },
    );
    assert!(matches!(
      engine.run(&universe()).unwrap_err(),
      TailRiskError::InvalidParameter {
        name: "risk_aversion",
        ..
      }
    ));
  }

  #[test]
  fn mean_estimator_parses_with_fallthrough() {
    assert!(matches!(
      MeanEstimator::from_str("shrinkage"),
      MeanEstimator::Shrinkage { tau } if (tau - DEFAULT_TAU).abs() < 1e-15
    ));
    assert!(matches!(
      MeanEstimator::from_str("sample"),
      MeanEstimator::Sample
    ));
    assert!(matches!(
      MeanEstimator::from_str("anything-else"),
      MeanEstimator::Sample
    ));
  }

  #[traced_test]
  #[test]
  fn run_logs_pipeline_milestones() {
    let engine = IncrementalVarEngine::new(repository(scenario_source()), EngineConfig::default());
    engine.run(&universe()).unwrap();
    assert!(logs_contain("full universe optimized"));
    assert!(logs_contain("incremental var table assembled"));
  }
}
