//! Error taxonomy for the tail-risk pipeline.

use thiserror::Error;

/// Errors surfaced by the data, optimization and attribution stages.
///
/// At full-universe scope every variant is fatal and propagates to the
/// caller. Inside the leave-one-out loop, `OptimizationFailure` and
/// `DegenerateUniverse` are absorbed per subset and the affected row is
/// dropped from the attribution table.
#[derive(Debug, Error)]
pub enum TailRiskError {
  /// The price source returned no usable history.
  #[error("data unavailable: {reason}")]
  DataUnavailable {
    /// Cause: empty query, history filter, or an empty aligned panel.
    reason: String,
  },

  /// The convex solver stopped without an acceptable terminal status.
  #[error("optimization failed with solver status {status}")]
  OptimizationFailure {
    /// Terminal status reported by the solver.
    status: String,
  },

  /// Too few assets for the quadratic program to be meaningful.
  #[error("degenerate universe: {found} asset(s) after filtering")]
  DegenerateUniverse {
    /// Assets that survived filtering.
    found: usize,
  },

  /// A scalar input violated its contract.
  #[error("invalid parameter {name}: {reason}")]
  InvalidParameter {
    /// Parameter name as it appears in the public API.
    name: &'static str,
    /// Violated constraint.
    reason: String,
  },
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, TailRiskError>;
