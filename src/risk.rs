//! # Tail Risk
//!
//! $$
//! \mathrm{VaR}_q = Q_q(L), \qquad
//! \mathrm{ES}_q = \mathbb E\left[L \mid L \ge \mathrm{VaR}_q\right]
//! $$
//!
//! Historical Value-at-Risk and Expected Shortfall on realized loss
//! distributions, and the leave-one-out attribution engine that ranks each
//! active asset by its incremental contribution to portfolio VaR.

pub mod historical;
pub mod incremental;

pub use historical::expected_shortfall;
pub use historical::historical_var;
pub use incremental::EngineConfig;
pub use incremental::IncrementalVarEngine;
pub use incremental::IncrementalVarReport;
pub use incremental::IncrementalVarRow;
pub use incremental::MeanEstimator;
