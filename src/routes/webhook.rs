//! # routes::webhook
//!
//! Entry point for alerts from the charting tool.
//!
//! ### Request body (JSON, canonical or localized keys)
//! ```json
//! {
//!   "symbol": "BTCUSDT", "side": "BUY", "price": 67000.5,
//!   "ob_high": 67100, "ob_low": 66900, "atr": 45.2,
//!   "m5_slope": 21.4, "ma12_slope": 3.1
//! }
//! ```
//!
//! ### Response
//! * `200` `{ "ok": true, "status": "BROADCAST", ... }` — plan computed and sent
//! * `200` `{ "ok": true, "status": "FILTERED", ... }` — slope gate rejected it
//! * `400` `{ "ok": false, "error": ... }` — bad JSON, malformed field, or R = 0

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::{
    engine::pipeline::Outcome,
    error::AppError,
    state::SharedState,
};

// ─── POST /webhook ────────────────────────────────────────────────────────────

pub async fn handle_webhook(
    State(state): State<SharedState>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    // Parsed by hand so a bad body is a 400 with our error shape, whatever the
    // Content-Type the alerting tool sends.
    let payload: Value = serde_json::from_slice(&body).map_err(|e| {
        AppError::BadRequest(format!("JSON decode error: {e}"))
    })?;

    info!(%payload, "✅ Webhook received");

    let outcome = state.pipeline.process(&payload, chrono::Utc::now()).await?;

    match outcome {
        Outcome::Filtered { signal, check } => Ok((
            StatusCode::OK,
            Json(json!({
                "ok":           true,
                "status":       "FILTERED",
                "reason":       check.reason(),
                "symbol":       signal.symbol,
                "fast_slope":   check.fast_slope,
                "medium_slope": check.medium_slope,
            })),
        )),

        Outcome::Broadcast(report) => {
            debug!(signal_id = %report.signal_id, "Responding with broadcast report");
            Ok((
                StatusCode::OK,
                Json(json!({
                    "ok":                true,
                    "status":            "BROADCAST",
                    "signal_id":         report.signal_id,
                    "symbol":            report.signal.symbol,
                    "display_symbol":    report.signal.display_symbol,
                    "direction":         report.signal.direction,
                    "entry_price":       report.plan.entry,
                    "price_origin":      report.price.origin,
                    "price_note":        report.price_note,
                    "risk_unit":         report.plan.risk_unit,
                    "stop_loss":         report.plan.stop_loss,
                    "take_profit":       report.plan.take_profit,
                    "risk_reward_ratio": report.plan.risk_reward_ratio,
                    "sentiment":         report.sentiment,
                    "session":           report.session,
                    "delivered":         report.delivered,
                    "logged":            report.logged,
                    "message":           report.message,
                })),
            ))
        }
    }
}

// ─── HEAD /webhook ────────────────────────────────────────────────────────────

pub async fn probe_webhook() -> StatusCode {
    StatusCode::OK
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{Method, Request},
        Router,
    };
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::engine::pipeline::tests::{pipeline_with_price, worked_example, Outbox};
    use crate::routes::router;
    use crate::state::AppState;

    fn app(live: Option<f64>, outbox: Arc<Outbox>) -> Router {
        let pipeline = pipeline_with_price(live).with_broadcaster(outbox);
        router(Arc::new(AppState::with_pipeline(Config::default(), pipeline)))
    }

    async fn post(app: Router, body: &str) -> (StatusCode, Value) {
        let req = Request::builder()
            .method(Method::POST)
            .uri("/webhook")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_broadcast_response() {
        let outbox = Arc::new(Outbox::default());
        let (status, body) = post(app(Some(100.0), outbox.clone()), &worked_example().to_string()).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "BROADCAST");
        assert_eq!(body["stop_loss"], 85.0);
        assert_eq!(body["take_profit"], json!([115.0, 130.0, 145.0, 160.0]));
        assert_eq!(body["risk_reward_ratio"], 4.0);
        assert_eq!(body["price_origin"], "BINGX");
        assert_eq!(body["direction"], "LONG");
        assert_eq!(body["delivered"], true);
        assert_eq!(outbox.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_filtered_is_200() {
        let mut payload = worked_example();
        payload["m5_slope"] = json!(10);
        let (status, body) = post(app(Some(100.0), Arc::default()), &payload.to_string()).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "FILTERED");
        assert_eq!(body["reason"], "fast slope below threshold");
    }

    #[tokio::test]
    async fn test_malformed_is_400() {
        let mut payload = worked_example();
        payload["atr"] = json!("n/a");
        let (status, body) = post(app(Some(100.0), Arc::default()), &payload.to_string()).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["ok"], false);
        assert_eq!(body["field"], "atr");
    }

    #[tokio::test]
    async fn test_non_finite_numbers_are_400() {
        let outbox = Arc::new(Outbox::default());

        let mut payload = worked_example();
        payload["atr"] = json!("NaN");
        let (status, body) = post(app(Some(100.0), outbox.clone()), &payload.to_string()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["field"], "atr");

        let mut payload = worked_example();
        payload["m5_slope"] = json!("inf");
        payload["ob_high"] = json!("inf");
        let (status, body) = post(app(Some(100.0), outbox.clone()), &payload.to_string()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["ok"], false);
        assert_eq!(body["field"], "ob_high");

        assert!(outbox.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_zero_risk_is_400() {
        let mut payload = worked_example();
        payload["ob_high"] = json!(95);
        payload["atr"] = json!(0);
        let (status, body) = post(app(Some(100.0), Arc::default()), &payload.to_string()).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "R=0");
    }

    #[tokio::test]
    async fn test_invalid_json_is_400() {
        let (status, body) = post(app(None, Arc::default()), "{not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("JSON decode error"));
    }

    #[tokio::test]
    async fn test_broadcast_failure_still_200() {
        let outbox = Arc::new(Outbox { fail: true, ..Default::default() });
        let (status, body) = post(app(None, outbox), &worked_example().to_string()).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["delivered"], false);
        assert_eq!(body["price_origin"], "SIGNAL");
    }

    #[tokio::test]
    async fn test_head_and_home() {
        let app = app(None, Arc::default());

        let req = Request::builder().method(Method::HEAD).uri("/webhook").body(Body::empty()).unwrap();
        assert_eq!(app.clone().oneshot(req).await.unwrap().status(), StatusCode::OK);

        let req = Request::builder().uri("/").body(Body::empty()).unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        assert!(String::from_utf8_lossy(&bytes).contains("Webhook server is running"));
    }
}
