//! # Tail-Risk Attribution Modules
//!
//! `tailrisk-rs` turns a ticker universe into a long-only mean-variance
//! portfolio and explains its tail risk: historical Value-at-Risk, Expected
//! Shortfall and a leave-one-out Incremental VaR table that prices each
//! active asset's contribution to the portfolio tail.
//!
//! ## Modules
//!
//! | Module        | Description                                                           |
//! |---------------|-----------------------------------------------------------------------|
//! | [`error`]     | Error taxonomy shared by every stage of the pipeline.                 |
//! | [`market`]    | Price sources, panel alignment and daily simple returns.              |
//! | [`portfolio`] | Moment estimation, the convex Markowitz solve and summary statistics. |
//! | [`risk`]      | Historical VaR/ES and the leave-one-out attribution engine.           |
//!
//! ## Features
//!
//! - `yahoo`: Enables the Yahoo Finance price source backed by the blocking client
//!
//! ## Parallelism
//!
//! The leave-one-out loop re-optimizes every subset with `rayon`; the row
//! order is deterministic regardless of worker scheduling.
//!
//! ## Example Usage
//!
//! ```rust
//! use tailrisk_rs::market::PriceRepository;
//! use tailrisk_rs::market::RepositoryConfig;
//! use tailrisk_rs::risk::EngineConfig;
//! use tailrisk_rs::risk::IncrementalVarEngine;
//!
//! let repository = PriceRepository::new(source, RepositoryConfig::default());
//! let engine = IncrementalVarEngine::new(repository, EngineConfig::default());
//! let report = engine.run(&universe)?;
//! for row in &report.rows {
//!   println!("{}  {:+.4}", row.symbol, row.incremental_var);
//! }
//! ```

pub mod error;
pub mod market;
pub mod portfolio;
pub mod risk;

pub use crate::error::Result;
pub use crate::error::TailRiskError;
