//! # engine::pipeline
//!
//! One webhook request, start to finish:
//!
//! ```text
//! payload ─▶ normalize ─▶ slope gate ──fail──▶ Outcome::Filtered (200)
//!                              │ pass
//!                              ▼
//!                           R = 0 ? ──yes──▶ AppError::ZeroRisk (400)
//!                              ▼
//!                    reconcile price (BingX → Binance → CoinGecko → reported)
//!                              ▼
//!                    build plan (rounded)
//!                              ▼
//!                    sentiment? ─▶ format ─▶ broadcast? ─▶ sheet row? ─▶ Outcome::Broadcast
//! ```
//!
//! Optional collaborators are plain `Option`s; a missing one is skipped.
//! Collaborator failures are logged and absorbed, never returned.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::clients::{Broadcaster, RowLogger, SentimentSource};
use crate::config::Language;
use crate::engine::message::{format_message, price_note, sheet_row, MessageContext, TradingSession};
use crate::engine::normalizer::normalize;
use crate::engine::reconciler::PriceReconciler;
use crate::engine::risk::{build_plan, check_slopes, risk_unit, SlopeCheck};
use crate::error::AppError;
use crate::models::{ReconciledPrice, RiskPlan, Sentiment, TradingSignal};

// ─── Outcome ──────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub enum Outcome {
    /// Slope gate failed — not an error, nothing was fetched or sent.
    Filtered {
        signal: Box<TradingSignal>,
        check:  SlopeCheck,
    },
    /// Plan computed and handed to the broadcaster.
    Broadcast(Box<SignalReport>),
}

/// Everything produced for one actionable signal.
#[derive(Debug, Clone, Serialize)]
pub struct SignalReport {
    pub signal_id:  Uuid,
    pub signal:     TradingSignal,
    pub price:      ReconciledPrice,
    pub price_note: String,
    /// Rounded to 2 decimals.
    pub plan:       RiskPlan,
    pub sentiment:  Option<Sentiment>,
    pub session:    TradingSession,
    pub message:    String,
    /// `false` when no broadcaster is configured or the send failed.
    pub delivered:  bool,
    /// `false` when no row logger is configured or the append failed.
    pub logged:     bool,
}

// ─── Pipeline ─────────────────────────────────────────────────────────────────

pub struct SignalPipeline {
    reconciler:  PriceReconciler,
    sentiment:   Option<Arc<dyn SentimentSource>>,
    broadcaster: Option<Arc<dyn Broadcaster>>,
    row_logger:  Option<Arc<dyn RowLogger>>,
    language:    Language,
    tag:         String,
}

impl SignalPipeline {
    pub fn new(reconciler: PriceReconciler, language: Language, tag: impl Into<String>) -> Self {
        Self {
            reconciler,
            sentiment: None,
            broadcaster: None,
            row_logger: None,
            language,
            tag: tag.into(),
        }
    }

    pub fn with_sentiment(mut self, source: Arc<dyn SentimentSource>) -> Self {
        self.sentiment = Some(source);
        self
    }

    pub fn with_broadcaster(mut self, broadcaster: Arc<dyn Broadcaster>) -> Self {
        self.broadcaster = Some(broadcaster);
        self
    }

    pub fn with_row_logger(mut self, logger: Arc<dyn RowLogger>) -> Self {
        self.row_logger = Some(logger);
        self
    }

    /// Process one raw webhook payload.
    ///
    /// Only [`AppError::MalformedSignal`] and [`AppError::ZeroRisk`] escape;
    /// every outbound failure degrades to a fallback.
    pub async fn process(&self, payload: &Value, now: DateTime<Utc>) -> Result<Outcome, AppError> {
        // ── 1. Normalize ──────────────────────────────────────────────────────
        let signal = normalize(payload)?;

        // ── 2. Slope gate ─────────────────────────────────────────────────────
        let check = check_slopes(&signal);
        if !check.passed() {
            info!(
                symbol       = %signal.symbol,
                fast_slope   = signal.fast_slope,
                medium_slope = signal.medium_slope,
                reason       = check.reason(),
                "⛔ Signal filtered by slope gate"
            );
            return Ok(Outcome::Filtered { signal: Box::new(signal), check });
        }

        // R does not depend on the entry price; fail before any outbound call.
        if risk_unit(&signal) == 0.0 {
            warn!(symbol = %signal.symbol, "Risk unit is zero — rejecting signal");
            return Err(AppError::ZeroRisk);
        }

        // ── 3. Reconcile entry price ──────────────────────────────────────────
        let price = self
            .reconciler
            .reconcile(&signal.symbol, signal.reported_price)
            .await;

        // ── 4. Risk plan (rounded once, here) ─────────────────────────────────
        let plan = build_plan(&signal, price.value)?.rounded();

        // ── 5. Sentiment ──────────────────────────────────────────────────────
        let sentiment = match &self.sentiment {
            Some(source) => Some(source.fetch_sentiment().await),
            None => None,
        };

        // ── 6. Format ─────────────────────────────────────────────────────────
        let signal_id = Uuid::new_v4();
        let ctx = MessageContext {
            signal: &signal,
            price: &price,
            plan: &plan,
            sentiment,
            now,
            tag: &self.tag,
        };
        let message = format_message(&ctx, self.language);
        let session = ctx.session();
        let row = sheet_row(&ctx, &signal_id.to_string());

        // ── 7. Broadcast ──────────────────────────────────────────────────────
        let delivered = match &self.broadcaster {
            Some(broadcaster) => match broadcaster.send(&message).await {
                Ok(()) => true,
                Err(e) => {
                    error!(%signal_id, error = %e, "❌ Broadcast failed — response unaffected");
                    false
                }
            },
            None => {
                warn!(%signal_id, "No broadcaster configured — message not sent");
                false
            }
        };

        // ── 8. Sheet row ──────────────────────────────────────────────────────
        let logged = match &self.row_logger {
            Some(logger) => match logger.append_row(&row).await {
                Ok(()) => true,
                Err(e) => {
                    error!(%signal_id, error = %e, "❌ Sheet append failed — response unaffected");
                    false
                }
            },
            None => false,
        };

        info!(
            %signal_id,
            symbol    = %signal.symbol,
            direction = ?signal.direction,
            entry     = plan.entry,
            tp4       = plan.final_target(),
            origin    = %price.origin,
            delivered,
            logged,
            "🚀 Signal processed"
        );

        Ok(Outcome::Broadcast(Box::new(SignalReport {
            signal_id,
            price_note: price_note(&price, self.language),
            signal,
            price,
            plan,
            sentiment,
            session,
            message,
            delivered,
            logged,
        })))
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
