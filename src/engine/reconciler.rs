//! # engine::reconciler
//!
//! **Price Reconciler** — decides which price the plan is built on.
//!
//! ```text
//! BingX ──fail──▶ Binance ──fail──▶ CoinGecko ──fail──▶ reported price (fallback)
//!   │ ok            │ ok              │ ok
//!   └───────────────┴─────────────────┴──▶ live price
//!                                            │
//!                     |live − reported| / reported > 0.5% ?
//!                          yes → DeviationOverride (live still used)
//!                          no  → Live
//! ```
//!
//! One attempt per source, strictly sequential, no retry.

use std::sync::Arc;

use tracing::{info, warn};

use crate::clients::PriceSource;
use crate::models::{PriceNote, PriceOrigin, ReconciledPrice};

/// Relative deviation above which the live price is flagged as an override.
pub const MAX_DEVIATION: f64 = 0.005;

pub struct PriceReconciler {
    sources: Vec<Arc<dyn PriceSource>>,
}

impl PriceReconciler {
    /// `sources` in priority order.
    pub fn new(sources: Vec<Arc<dyn PriceSource>>) -> Self {
        Self { sources }
    }

    /// First source that answers with a finite, positive price.
    pub async fn live_price(&self, symbol: &str) -> Option<(PriceOrigin, f64)> {
        for source in &self.sources {
            let origin = source.origin();
            match source.fetch_price(symbol).await {
                Ok(price) if price.is_finite() && price > 0.0 => {
                    info!(symbol, %origin, price, "📡 Live price fetched");
                    return Some((origin, price));
                }
                Ok(price) => {
                    warn!(symbol, %origin, price, "Price source returned a non-positive price — trying next");
                }
                Err(e) => {
                    warn!(symbol, %origin, error = %e, "Price source failed — trying next");
                }
            }
        }
        None
    }

    pub async fn reconcile(&self, symbol: &str, reported: f64) -> ReconciledPrice {
        let live = self.live_price(symbol).await;
        let reconciled = reconcile_with(live, reported);
        if reconciled.is_fallback() {
            warn!(symbol, reported, "❗ All price sources failed — using reported price");
        }
        reconciled
    }
}

/// Pure decision step: given the live quote (if any) and the alert's price,
/// pick the entry price and annotate why.  `reported` must be > 0.
pub fn reconcile_with(live: Option<(PriceOrigin, f64)>, reported: f64) -> ReconciledPrice {
    match live {
        None => ReconciledPrice {
            value:  reported,
            origin: PriceOrigin::Signal,
            note:   PriceNote::Fallback,
        },
        Some((origin, price)) => {
            let deviation = (price - reported).abs() / reported;
            let note = if deviation > MAX_DEVIATION {
                PriceNote::DeviationOverride { deviation }
            } else {
                PriceNote::Live
            };
            ReconciledPrice { value: price, origin, note }
        }
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use crate::error::UpstreamError;

    /// Scripted source that counts how often it was asked.
    struct FakeSource {
        origin: PriceOrigin,
        answer: Option<f64>,
        calls:  AtomicUsize,
    }

    impl FakeSource {
        fn new(origin: PriceOrigin, answer: Option<f64>) -> Arc<Self> {
            Arc::new(Self { origin, answer, calls: AtomicUsize::new(0) })
        }
    }

    #[async_trait]
    impl PriceSource for FakeSource {
        fn origin(&self) -> PriceOrigin {
            self.origin
        }

        async fn fetch_price(&self, _symbol: &str) -> Result<f64, UpstreamError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.answer
                .ok_or_else(|| UpstreamError::Payload("scripted failure".into()))
        }
    }

    fn reconciler(sources: &[Arc<FakeSource>]) -> PriceReconciler {
        PriceReconciler::new(
            sources.iter().map(|s| s.clone() as Arc<dyn PriceSource>).collect(),
        )
    }

    #[tokio::test]
    async fn test_first_success_wins() {
        let a = FakeSource::new(PriceOrigin::BingX, Some(100.2));
        let b = FakeSource::new(PriceOrigin::Binance, Some(999.0));
        let r = reconciler(&[a.clone(), b.clone()]).reconcile("BTC", 100.0).await;

        assert_eq!(r.value, 100.2);
        assert_eq!(r.origin, PriceOrigin::BingX);
        assert_eq!(r.note, PriceNote::Live);
        assert_eq!(b.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_falls_through_in_order() {
        let a = FakeSource::new(PriceOrigin::BingX, None);
        let b = FakeSource::new(PriceOrigin::Binance, Some(-1.0));
        let c = FakeSource::new(PriceOrigin::CoinGecko, Some(101.0));
        let r = reconciler(&[a.clone(), b.clone(), c.clone()]).reconcile("ETH", 100.0).await;

        assert_eq!(r.origin, PriceOrigin::CoinGecko);
        assert_eq!(r.value, 101.0);
        for s in [&a, &b, &c] {
            assert_eq!(s.calls.load(Ordering::SeqCst), 1);
        }
    }

    #[tokio::test]
    async fn test_all_fail_falls_back_to_reported() {
        let sources = [
            FakeSource::new(PriceOrigin::BingX, None),
            FakeSource::new(PriceOrigin::Binance, None),
            FakeSource::new(PriceOrigin::CoinGecko, Some(f64::NAN)),
        ];
        let r = reconciler(&sources).reconcile("SOL", 42.5).await;

        assert_eq!(r.value, 42.5);
        assert_eq!(r.origin, PriceOrigin::Signal);
        assert!(r.is_fallback());
    }

    #[tokio::test]
    async fn test_deviation_override_keeps_live_price() {
        let a = FakeSource::new(PriceOrigin::Binance, Some(101.0));
        let r = reconciler(&[a]).reconcile("BTC", 100.0).await;

        assert_eq!(r.value, 101.0);
        match r.note {
            PriceNote::DeviationOverride { deviation } => assert!((deviation - 0.01).abs() < 1e-12),
            other => panic!("expected DeviationOverride, got {other:?}"),
        }
    }

    #[test]
    fn test_threshold_is_strict() {
        // 0.4% — under the threshold
        let r = reconcile_with(Some((PriceOrigin::BingX, 100.4)), 100.0);
        assert_eq!(r.note, PriceNote::Live);

        // 0.6% — over, in either direction
        let r = reconcile_with(Some((PriceOrigin::BingX, 99.4)), 100.0);
        assert!(matches!(r.note, PriceNote::DeviationOverride { .. }));
        let r = reconcile_with(Some((PriceOrigin::BingX, 100.6)), 100.0);
        assert!(matches!(r.note, PriceNote::DeviationOverride { .. }));
    }

    #[tokio::test]
    async fn test_no_sources_is_fallback() {
        let r = PriceReconciler::new(Vec::new()).reconcile("BTC", 7.0).await;
        assert_eq!(r.value, 7.0);
        assert!(r.is_fallback());
    }
}
