//! # Portfolio
//!
//! $$
//! \max_{\mathbf{w}} \; \mu^\top \mathbf{w} - \gamma\, \mathbf{w}^\top \Sigma \mathbf{w}
//! \quad \text{s.t.} \quad \mathbf{1}^\top \mathbf{w} = 1,\; \mathbf{w} \ge \mathbf{0}
//! $$
//!
//! Moment estimation, convex mean-variance optimization and view shrinkage.

pub mod moments;
pub mod optimizer;
pub mod summary;
pub mod views;

pub use moments::MomentEstimates;
pub use moments::TRADING_DAYS;
pub use optimizer::MeanVarianceOptimizer;
pub use optimizer::WeightVector;
pub use summary::PortfolioSummary;
pub use views::DEFAULT_TAU;
pub use views::adjust_means;
