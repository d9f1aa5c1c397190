//! # Signalcast — Trading-Signal Webhook Relay
//!
//! ## Architecture Overview
//!
//! ```text
//!  ┌──────────────┐   POST /webhook   ┌───────────────────────────────┐
//!  │  Charting /  │ ─────────────────▶│ normalize → slope gate        │
//!  │  alert tool  │ ◀── 200 / 400 ─── │ → price reconcile → R plan    │
//!  └──────────────┘                   │ → format                      │
//!                                     └──────┬─────────┬──────────┬───┘
//!        BingX / Binance / CoinGecko  ◀──────┘         │          │
//!        CryptoPanic (sentiment)      ◀────────────────┘          │
//!        Telegram chat · Spreadsheet  ◀───────────────────────────┘
//! ```
//!
//! ## Environment Variables
//!
//! | Variable              | Default                 | Description                         |
//! |-----------------------|-------------------------|-------------------------------------|
//! | `BIND_ADDR`           | `0.0.0.0:$PORT`         | Address Axum listens on             |
//! | `PORT`                | `5000`                  | Used when `BIND_ADDR` is unset      |
//! | `TG_BOT_TOKEN`        | —                       | Telegram bot token                  |
//! | `TG_CHAT_ID`          | —                       | Telegram chat to broadcast to       |
//! | `CRYPTOPANIC_API_KEY` | —                       | Enables the news-sentiment line     |
//! | `SHEET_URL`           | —                       | Enables spreadsheet row logging     |
//! | `MESSAGE_LANG`        | `zh`                    | `zh`, `en` or `bilingual`           |
//! | `HTTP_TIMEOUT_SECS`   | `8`                     | Cap on every outbound call          |
//! | `ANNOUNCE_ON_STARTUP` | `false`                 | Send a test broadcast at boot       |
//! | `RUST_LOG`            | `signalcast=debug`      | Tracing filter                      |

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod clients;
mod config;
mod engine;
mod error;
mod models;
mod routes;
mod state;

use config::Config;
use state::build_state;

// ─── Entry Point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Load .env (optional — hosts can use real env vars) ────────────────
    dotenvy::dotenv().ok();

    // ── 2. Initialise structured logging ─────────────────────────────────────
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::from_default_env()
                .add_directive("signalcast=debug".parse()?)
                .add_directive("tower_http=info".parse()?),
        )
        .init();

    info!(
        r#"

  ╔═══════════════════════════════════════════════╗
  ║        SIGNALCAST — Webhook Signal Relay      ║
  ║   Price reconcile · R targets · Broadcast     ║
  ╚═══════════════════════════════════════════════╝"#
    );

    // ── 3. Configuration (read once) ─────────────────────────────────────────
    let config = Config::from_env().context("Failed to load config")?;
    let addr = config.bind_addr;
    let announce = config.announce_on_startup;

    if config.telegram.is_none() {
        warn!("TG_BOT_TOKEN / TG_CHAT_ID not set — signals will be processed but not broadcast");
    }

    // ── 4. Shared state + router ─────────────────────────────────────────────
    let state = build_state(config);

    if announce {
        if let Some(broadcaster) = &state.broadcaster {
            if let Err(e) = broadcaster.send("✅ Signalcast online — broadcast test OK").await {
                warn!(error = %e, "Startup announcement failed");
            }
        }
    }

    let app = routes::router(state);

    // ── 5. Serve ─────────────────────────────────────────────────────────────
    info!(?addr, "🚀 Signalcast server starting");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
