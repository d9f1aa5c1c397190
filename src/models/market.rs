//! # models::market
//!
//! Values derived from the outside world for a single request: which price
//! the pipeline trusts (and why), and the news-sentiment reading.

use serde::Serialize;

/// Where the entry price came from, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PriceOrigin {
    /// Live exchange A
    #[serde(rename = "BINGX")]
    BingX,
    /// Live exchange B
    Binance,
    /// Live aggregator
    #[serde(rename = "COINGECKO")]
    CoinGecko,
    /// No live source answered — the alert's own price is used.
    Signal,
}

impl PriceOrigin {
    pub fn label(self) -> &'static str {
        match self {
            PriceOrigin::BingX => "BingX",
            PriceOrigin::Binance => "Binance",
            PriceOrigin::CoinGecko => "CoinGecko",
            PriceOrigin::Signal => "TradingView",
        }
    }
}

impl std::fmt::Display for PriceOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Why [`ReconciledPrice::value`] was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PriceNote {
    /// Live price within 0.5% of the reported price.
    Live,
    /// Live price deviates by more than 0.5%; it is still used.
    DeviationOverride { deviation: f64 },
    /// All live sources failed.
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconciledPrice {
    pub value:  f64,
    pub origin: PriceOrigin,
    pub note:   PriceNote,
}

impl ReconciledPrice {
    pub fn is_fallback(&self) -> bool {
        matches!(self.note, PriceNote::Fallback)
    }
}

/// News sentiment over the most recent headlines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Sentiment {
    Bearish,
    Bullish,
    Neutral,
}
