//! # Mean-Variance Optimizer
//!
//! $$
//! \max_{\mathbf{w}} \; \mu^\top \mathbf{w} - \gamma\, \mathbf{w}^\top \Sigma \mathbf{w}
//! \quad \text{s.t.} \quad \mathbf{1}^\top \mathbf{w} = 1,\; \mathbf{w} \ge \mathbf{0}
//! $$
//!
//! Long-only, fully-invested Markowitz weights via a convex quadratic
//! program: the objective above is solved as
//! `min 1/2 w' (2 gamma Sigma) w - mu' w` over a zero cone (budget row) and
//! a nonnegative cone (no-short rows).

use clarabel::algebra::*;
use clarabel::solver::*;
use ndarray::Array1;
use ndarray::Array2;
use tracing::debug;

use crate::error::Result;
use crate::error::TailRiskError;
use crate::market::panel::ReturnsPanel;
use crate::portfolio::moments::MomentEstimates;

/// Long-only portfolio weights over an ordered symbol set.
#[derive(Clone, Debug)]
pub struct WeightVector {
  /// Symbols, in panel column order.
  pub symbols: Vec<String>,
  /// Non-negative weights summing to one.
  pub weights: Array1<f64>,
}

impl WeightVector {
  /// Weight for `symbol`, if present.
  pub fn get(&self, symbol: &str) -> Option<f64> {
    self
      .symbols
      .iter()
      .position(|s| s == symbol)
      .map(|i| self.weights[i])
  }

  /// Number of assets carried.
  pub fn len(&self) -> usize {
    self.weights.len()
  }

  /// True when no assets are carried.
  pub fn is_empty(&self) -> bool {
    self.weights.is_empty()
  }
}

/// Convex mean-variance optimizer with budget and no-short constraints.
///
/// Pure function of its inputs: moments are re-estimated from the panel on
/// every call and nothing is cached between calls.
#[derive(Clone, Debug)]
pub struct MeanVarianceOptimizer {
  /// Risk-aversion scalar `gamma` weighting the variance penalty.
  pub risk_aversion: f64,
}

impl Default for MeanVarianceOptimizer {
  fn default() -> Self {
    Self { risk_aversion: 5.0 }
  }
}

impl MeanVarianceOptimizer {
  /// Construct with explicit risk aversion.
  pub fn new(risk_aversion: f64) -> Self {
    Self { risk_aversion }
  }

  /// Solve for long-only, fully-invested weights over `panel`.
  ///
  /// A single-column panel short-circuits to weight 1.0 without invoking
  /// the solver; a zero-column panel is a degenerate universe.
  pub fn optimize(&self, panel: &ReturnsPanel) -> Result<WeightVector> {
    self.validate()?;
    if let Some(trivial) = Self::degenerate(panel)? {
      return Ok(trivial);
    }

    let moments = MomentEstimates::from_returns(panel)?;
    self.solve(&moments.mean, &moments.covariance, &panel.symbols)
  }

  /// Solve with an externally adjusted mean vector in place of the sample
  /// mean; covariance and constraints are unchanged.
  ///
  /// This is the entry point for shrinkage-adjusted expected returns, see
  /// [`crate::portfolio::views::adjust_means`].
  pub fn optimize_with_means(&self, panel: &ReturnsPanel, mean: &Array1<f64>) -> Result<WeightVector> {
    self.validate()?;
    if mean.len() != panel.n_assets() {
      return Err(TailRiskError::InvalidParameter {
        name: "mean",
        reason: format!(
          "length {} does not match {} panel columns",
          mean.len(),
          panel.n_assets()
        ),
      });
    }
    if let Some(trivial) = Self::degenerate(panel)? {
      return Ok(trivial);
    }

    let moments = MomentEstimates::from_returns(panel)?;
    self.solve(mean, &moments.covariance, &panel.symbols)
  }

  fn validate(&self) -> Result<()> {
    if self.risk_aversion <= 0.0 {
      return Err(TailRiskError::InvalidParameter {
        name: "risk_aversion",
        reason: format!("{} is not positive", self.risk_aversion),
      });
    }
    Ok(())
  }

  /// Guarded branch for universes the quadratic program cannot handle:
  /// zero assets fail, one asset trivially takes the whole budget.
  fn degenerate(panel: &ReturnsPanel) -> Result<Option<WeightVector>> {
    match panel.n_assets() {
      0 => Err(TailRiskError::DegenerateUniverse { found: 0 }),
      1 => Ok(Some(WeightVector {
        symbols: panel.symbols.clone(),
        weights: Array1::ones(1),
      })),
      _ => Ok(None),
    }
  }

  fn solve(
    &self,
    mean: &Array1<f64>,
    covariance: &Array2<f64>,
    symbols: &[String],
  ) -> Result<WeightVector> {
    let n = mean.len();

    // P = 2 gamma Sigma in CSC format, column by column
    let mut p_data = Vec::new();
    let mut p_indices = Vec::new();
    let mut p_indptr = vec![0];
    for j in 0..n {
      for i in 0..n {
        let val = 2.0 * self.risk_aversion * covariance[[i, j]];
        if val.abs() > 1e-12 {
          p_data.push(val);
          p_indices.push(i);
        }
      }
      p_indptr.push(p_data.len());
    }
    let p = CscMatrix::new(n, n, p_indptr, p_indices, p_data);

    let q: Vec<f64> = mean.iter().map(|m| -m).collect();

    // constraint rows: the budget row, then a negated identity so that
    // -w <= 0 lands in the nonnegative cone
    let mut a_data = Vec::new();
    let mut a_indices = Vec::new();
    let mut a_indptr = vec![0];
    for j in 0..n {
      a_data.push(1.0);
      a_indices.push(0);
      a_data.push(-1.0);
      a_indices.push(1 + j);
      a_indptr.push(a_data.len());
    }
    let a = CscMatrix::new(1 + n, n, a_indptr, a_indices, a_data);

    let mut b = vec![1.0];
    b.extend(vec![0.0; n]);

    let cones = [ZeroConeT(1), NonnegativeConeT(n)];

    let settings = DefaultSettingsBuilder::default()
      .max_iter(200)
      .verbose(false)
      .build()
      .map_err(|e| TailRiskError::OptimizationFailure {
        status: format!("settings: {}", e),
      })?;

    let mut solver = DefaultSolver::new(&p, &q, &a, &b, &cones, settings).map_err(|e| {
      TailRiskError::OptimizationFailure {
        status: format!("{:?}", e),
      }
    })?;
    solver.solve();

    let status = solver.solution.status;
    if !matches!(status, SolverStatus::Solved | SolverStatus::AlmostSolved) {
      return Err(TailRiskError::OptimizationFailure {
        status: format!("{:?}", status),
      });
    }
    debug!(?status, n, "mean-variance program solved");

    // clip tiny negative artifacts, then renormalize to an exact budget
    let clipped: Vec<f64> = solver.solution.x.iter().map(|w| w.max(0.0)).collect();
    let total: f64 = clipped.iter().sum();
    if total <= 0.0 {
      return Err(TailRiskError::OptimizationFailure {
        status: "all weights clipped to zero".to_string(),
      });
    }

    let weights: Array1<f64> = clipped.into_iter().map(|w| w / total).collect();
    Ok(WeightVector {
      symbols: symbols.to_vec(),
      weights,
    })
  }
}
