//! Domain models shared across the signal pipeline.

pub mod market;
pub mod plan;
pub mod signal;

pub use market::{PriceNote, PriceOrigin, ReconciledPrice, Sentiment};
pub use plan::RiskPlan;
pub use signal::{Direction, TradingSignal};
