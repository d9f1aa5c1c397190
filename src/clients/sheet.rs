//! # clients::sheet — append-only spreadsheet log
//!
//! Posts each broadcast signal as one row to a spreadsheet append endpoint
//! (an Apps Script web app bound to the sheet, or any service accepting the
//! same body):
//!
//! ```json
//! { "values": ["2025-01-01 08:00:00", "Asia", "BTCUSDT", "BUY", "100.00", ...] }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

use crate::error::UpstreamError;

#[async_trait]
pub trait RowLogger: Send + Sync {
    async fn append_row(&self, columns: &[String]) -> Result<(), UpstreamError>;
}

#[derive(Debug, Serialize)]
struct AppendRow<'a> {
    values: &'a [String],
}

pub struct SheetLogger {
    client:  reqwest::Client,
    url:     String,
    timeout: Duration,
}

impl SheetLogger {
    pub fn new(client: reqwest::Client, url: &str, timeout: Duration) -> Self {
        Self { client, url: url.to_string(), timeout }
    }
}

#[async_trait]
impl RowLogger for SheetLogger {
    async fn append_row(&self, columns: &[String]) -> Result<(), UpstreamError> {
        let resp = self
            .client
            .post(&self.url)
            .json(&AppendRow { values: columns })
            .timeout(self.timeout)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(UpstreamError::Status { status, body });
        }

        debug!(columns = columns.len(), "Sheet row appended");
        Ok(())
    }
}
