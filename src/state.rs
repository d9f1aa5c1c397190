//! # state
//!
//! Application state handed to every Axum handler.
//!
//! Nothing in here is mutable: the config, the shared `reqwest` connection
//! pool and the wired-up pipeline are all built once in `main`.  Requests do
//! not share any per-signal data.

use std::sync::Arc;

use tracing::info;

use crate::clients::{
    price::default_sources,
    sentiment::CryptoPanicSource,
    sheet::SheetLogger,
    telegram::TelegramBroadcaster,
    Broadcaster,
};
use crate::config::Config;
use crate::engine::pipeline::SignalPipeline;
use crate::engine::reconciler::PriceReconciler;

// ─── AppState ─────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,

    /// Normalize → gate → reconcile → plan → broadcast.
    pub pipeline: Arc<SignalPipeline>,

    /// Same broadcaster the pipeline uses; kept here for the startup notice.
    pub broadcaster: Option<Arc<dyn Broadcaster>>,
}

impl AppState {
    /// Wire every collaborator the config enables.
    pub fn from_config(config: Config) -> Self {
        // One pool for every outbound call
        let http = reqwest::Client::new();
        let timeout = config.http_timeout;

        let reconciler = PriceReconciler::new(default_sources(&http, &config.price_apis, timeout));
        let mut pipeline = SignalPipeline::new(reconciler, config.language, config.signal_tag.clone());

        let broadcaster: Option<Arc<dyn Broadcaster>> = config.telegram.clone().map(|tg| {
            Arc::new(TelegramBroadcaster::new(http.clone(), tg, timeout)) as Arc<dyn Broadcaster>
        });
        if let Some(b) = &broadcaster {
            pipeline = pipeline.with_broadcaster(b.clone());
        }

        if let Some(key) = &config.cryptopanic_api_key {
            pipeline = pipeline.with_sentiment(Arc::new(CryptoPanicSource::new(
                http.clone(),
                &config.cryptopanic_url,
                key,
                timeout,
            )));
        }

        if let Some(url) = &config.sheet_url {
            pipeline = pipeline.with_row_logger(Arc::new(SheetLogger::new(http.clone(), url, timeout)));
        }

        info!(
            telegram  = broadcaster.is_some(),
            sentiment = config.cryptopanic_api_key.is_some(),
            sheet     = config.sheet_url.is_some(),
            language  = %config.language,
            timeout   = ?timeout,
            "Collaborators wired"
        );

        Self {
            config: Arc::new(config),
            pipeline: Arc::new(pipeline),
            broadcaster,
        }
    }

    /// State around an already-built pipeline.
    #[cfg(test)]
    pub fn with_pipeline(config: Config, pipeline: SignalPipeline) -> Self {
        Self {
            config: Arc::new(config),
            pipeline: Arc::new(pipeline),
            broadcaster: None,
        }
    }
}

/// Convenience type alias
pub type SharedState = Arc<AppState>;

pub fn build_state(config: Config) -> SharedState {
    Arc::new(AppState::from_config(config))
}
