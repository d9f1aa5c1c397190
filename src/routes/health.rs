//! # routes::health

use axum::{extract::State, response::IntoResponse};

use crate::state::SharedState;

/// GET / — plain-text banner so uptime pingers have something to hit.
pub async fn home(State(state): State<SharedState>) -> impl IntoResponse {
    let broadcast = if state.broadcaster.is_some() { "broadcasting" } else { "broadcast disabled" };
    format!("✅ Webhook server is running ({broadcast}, lang={})", state.config.language)
}
