//! # clients::telegram — broadcast formatted signals to a chat
//!
//! Uses the Bot API `sendMessage` method directly with HTML parse mode.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::info;

use crate::config::TelegramConfig;
use crate::error::UpstreamError;

/// Sends one formatted message somewhere people read it.
#[async_trait]
pub trait Broadcaster: Send + Sync {
    async fn send(&self, message: &str) -> Result<(), UpstreamError>;
}

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id:    &'a str,
    text:       &'a str,
    parse_mode: &'a str,
}

pub struct TelegramBroadcaster {
    client:  reqwest::Client,
    config:  TelegramConfig,
    timeout: Duration,
}

impl TelegramBroadcaster {
    pub fn new(client: reqwest::Client, config: TelegramConfig, timeout: Duration) -> Self {
        Self { client, config, timeout }
    }

    fn endpoint(&self) -> String {
        format!("{}/bot{}/sendMessage", self.config.api_url, self.config.bot_token)
    }
}

#[async_trait]
impl Broadcaster for TelegramBroadcaster {
    async fn send(&self, message: &str) -> Result<(), UpstreamError> {
        let body = SendMessage {
            chat_id:    &self.config.chat_id,
            text:       message,
            parse_mode: "HTML",
        };

        let resp = self
            .client
            .post(self.endpoint())
            .json(&body)
            .timeout(self.timeout)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(UpstreamError::Status { status, body });
        }

        info!(chat_id = %self.config.chat_id, "📣 Telegram message delivered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::post, Json, Router};
    use serde_json::{json, Value};

    use crate::clients::test_support::{client, closed_url, serve};

    fn broadcaster(api_url: String) -> TelegramBroadcaster {
        TelegramBroadcaster::new(
            client(),
            TelegramConfig {
                bot_token: "SECRET-TOKEN".into(),
                chat_id:   "-10042".into(),
                api_url,
            },
            Duration::from_secs(5),
        )
    }

    #[test]
    fn test_endpoint_and_payload() {
        let tg = TelegramBroadcaster::new(
            reqwest::Client::new(),
            TelegramConfig {
                bot_token: "123:abc".into(),
                chat_id:   "-10042".into(),
                api_url:   "https://api.telegram.org".into(),
            },
            Duration::from_secs(5),
        );
        assert_eq!(tg.endpoint(), "https://api.telegram.org/bot123:abc/sendMessage");

        let body = serde_json::to_value(SendMessage {
            chat_id:    "-10042",
            text:       "<b>hi</b>",
            parse_mode: "HTML",
        })
        .unwrap();
        assert_eq!(body["chat_id"], "-10042");
        assert_eq!(body["parse_mode"], "HTML");
    }

    #[tokio::test]
    async fn test_send_posts_html_message() {
        let app = Router::new().route(
            "/botSECRET-TOKEN/sendMessage",
            post(|Json(body): Json<Value>| async move {
                if body["chat_id"] == "-10042" && body["parse_mode"] == "HTML" && body["text"] == "<b>hi</b>" {
                    (StatusCode::OK, Json(json!({ "ok": true })))
                } else {
                    (StatusCode::UNPROCESSABLE_ENTITY, Json(json!({ "ok": false })))
                }
            }),
        );
        broadcaster(serve(app).await).send("<b>hi</b>").await.unwrap();
    }

    #[tokio::test]
    async fn test_non_2xx_is_error() {
        let app = Router::new().route(
            "/botSECRET-TOKEN/sendMessage",
            post(|| async { (StatusCode::BAD_REQUEST, r#"{"ok":false,"description":"chat not found"}"#) }),
        );
        match broadcaster(serve(app).await).send("hi").await {
            Err(UpstreamError::Status { status, body }) => {
                assert_eq!(status, StatusCode::BAD_REQUEST);
                assert!(body.contains("chat not found"));
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_transport_error_hides_token() {
        let err = broadcaster(closed_url().await).send("hi").await.unwrap_err();
        assert!(matches!(err, UpstreamError::Http(_)));
        assert!(!err.to_string().contains("SECRET-TOKEN"));
    }
}
