//! # Market Data
//!
//! $$
//! r_t = \frac{P_t - P_{t-1}}{P_{t-1}}
//! $$
//!
//! Price-source boundary, panel alignment and derived daily returns.

pub mod panel;
pub mod repository;
pub mod source;
pub mod synthetic;
#[cfg(feature = "yahoo")]
pub mod yahoo;

pub use panel::PricePanel;
pub use panel::ReturnsPanel;
pub use repository::PriceRepository;
pub use repository::RepositoryConfig;
pub use source::MemoryPriceSource;
pub use source::PriceObservation;
pub use source::PriceSource;
pub use synthetic::SyntheticAsset;
pub use synthetic::SyntheticMarket;
#[cfg(feature = "yahoo")]
pub use yahoo::YahooSource;
