//! HTTP surface.
//!
//! | Method | Path       | Description                                   |
//! |--------|------------|-----------------------------------------------|
//! | GET    | `/`        | Liveness banner                               |
//! | POST   | `/webhook` | Process one trading-signal alert              |
//! | HEAD   | `/webhook` | Reachability probe from the alerting tool     |

pub mod health;
pub mod webhook;

use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::state::SharedState;

pub fn router(state: SharedState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/",        get(health::home))
        .route("/webhook", post(webhook::handle_webhook).head(webhook::probe_webhook))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
