//! # clients::price — live price sources
//!
//! Three public endpoints, tried by `engine::reconciler` in this order:
//!
//! | Origin    | Endpoint                                               | Field        |
//! |-----------|--------------------------------------------------------|--------------|
//! | BingX     | `/api/v1/market/marketOrder?symbol={SYM}_USDT`         | `data.price` |
//! | Binance   | `/api/v3/ticker/price?symbol={SYM}USDT`                | `price`      |
//! | CoinGecko | `/api/v3/simple/price?ids={sym}&vs_currencies=usdt`    | `{sym}.usdt` |
//!
//! Exchanges disagree on whether prices are JSON numbers or strings, so every
//! source reads a `serde_json::Value` and coerces.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::config::PriceApiConfig;
use crate::engine::normalizer::coerce_f64;
use crate::error::UpstreamError;
use crate::models::PriceOrigin;

// ─── Capability ───────────────────────────────────────────────────────────────

/// One live price feed.  A single attempt per call; no retries.
#[async_trait]
pub trait PriceSource: Send + Sync {
    fn origin(&self) -> PriceOrigin;

    async fn fetch_price(&self, symbol: &str) -> Result<f64, UpstreamError>;
}

/// The default priority list: BingX → Binance → CoinGecko.
pub fn default_sources(
    client: &reqwest::Client,
    apis: &PriceApiConfig,
    timeout: Duration,
) -> Vec<Arc<dyn PriceSource>> {
    vec![
        Arc::new(BingxSource::new(client.clone(), &apis.bingx_url, timeout)),
        Arc::new(BinanceSource::new(client.clone(), &apis.binance_url, timeout)),
        Arc::new(CoinGeckoSource::new(client.clone(), &apis.coingecko_url, timeout)),
    ]
}

/// GET `url` and return the decoded JSON body; non-2xx is an error.
async fn get_json(
    client: &reqwest::Client,
    url: &str,
    timeout: Duration,
) -> Result<Value, UpstreamError> {
    let resp = client.get(url).timeout(timeout).send().await?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        return Err(UpstreamError::Status { status, body });
    }

    Ok(resp.json().await?)
}

/// Follow `path` into `body` and coerce the leaf to `f64`.
fn extract_price(body: &Value, path: &[&str]) -> Result<f64, UpstreamError> {
    let leaf = path
        .iter()
        .try_fold(body, |node, key| node.get(*key))
        .ok_or_else(|| UpstreamError::Payload(format!("missing '{}'", path.join("."))))?;

    coerce_f64(leaf)
        .ok_or_else(|| UpstreamError::Payload(format!("'{}' is not a number: {leaf}", path.join("."))))
}

// ─── BingX ────────────────────────────────────────────────────────────────────

pub struct BingxSource {
    client:   reqwest::Client,
    base_url: String,
    timeout:  Duration,
}

impl BingxSource {
    pub fn new(client: reqwest::Client, base_url: &str, timeout: Duration) -> Self {
        Self { client, base_url: base_url.to_string(), timeout }
    }
}

#[async_trait]
impl PriceSource for BingxSource {
    fn origin(&self) -> PriceOrigin {
        PriceOrigin::BingX
    }

    async fn fetch_price(&self, symbol: &str) -> Result<f64, UpstreamError> {
        let url = format!("{}/api/v1/market/marketOrder?symbol={symbol}_USDT", self.base_url);
        let body = get_json(&self.client, &url, self.timeout).await?;
        extract_price(&body, &["data", "price"])
    }
}

// ─── Binance ──────────────────────────────────────────────────────────────────

pub struct BinanceSource {
    client:   reqwest::Client,
    base_url: String,
    timeout:  Duration,
}

impl BinanceSource {
    pub fn new(client: reqwest::Client, base_url: &str, timeout: Duration) -> Self {
        Self { client, base_url: base_url.to_string(), timeout }
    }
}

#[async_trait]
impl PriceSource for BinanceSource {
    fn origin(&self) -> PriceOrigin {
        PriceOrigin::Binance
    }

    async fn fetch_price(&self, symbol: &str) -> Result<f64, UpstreamError> {
        let url = format!(
            "{}/api/v3/ticker/price?symbol={}USDT",
            self.base_url,
            symbol.to_uppercase()
        );
        let body = get_json(&self.client, &url, self.timeout).await?;
        extract_price(&body, &["price"])
    }
}

// ─── CoinGecko ────────────────────────────────────────────────────────────────

/// Keyed by CoinGecko coin id; the lowercased ticker is used as the id, which
/// holds for a handful of majors and fails (→ fallback) for the rest.
pub struct CoinGeckoSource {
    client:   reqwest::Client,
    base_url: String,
    timeout:  Duration,
}

impl CoinGeckoSource {
    pub fn new(client: reqwest::Client, base_url: &str, timeout: Duration) -> Self {
        Self { client, base_url: base_url.to_string(), timeout }
    }
}

#[async_trait]
impl PriceSource for CoinGeckoSource {
    fn origin(&self) -> PriceOrigin {
        PriceOrigin::CoinGecko
    }

    async fn fetch_price(&self, symbol: &str) -> Result<f64, UpstreamError> {
        let id = symbol.to_lowercase();
        let url = format!(
            "{}/api/v3/simple/price?ids={id}&vs_currencies=usdt",
            self.base_url
        );
        let body = get_json(&self.client, &url, self.timeout).await?;
        extract_price(&body, &[id.as_str(), "usdt"])
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
