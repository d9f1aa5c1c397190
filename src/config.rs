//! # config — read service configuration from environment variables
//!
//! Built exactly once in `main` and shared behind an `Arc`.  Nothing else in
//! the crate calls `std::env::var`.

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context};

/// Output language of the broadcast message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    /// Traditional Chinese (the alerting tool's native wording)
    Zh,
    En,
    /// Chinese line followed by its English counterpart
    Bilingual,
}

impl FromStr for Language {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "zh" | "zh-tw" | "chinese" => Ok(Language::Zh),
            "en" | "english" => Ok(Language::En),
            "bilingual" | "both" => Ok(Language::Bilingual),
            other => bail!("Unknown MESSAGE_LANG: '{other}'. Use 'zh', 'en' or 'bilingual'"),
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Language::Zh => write!(f, "zh"),
            Language::En => write!(f, "en"),
            Language::Bilingual => write!(f, "bilingual"),
        }
    }
}

/// Telegram credentials; both halves are required for broadcasting.
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id:   String,
    pub api_url:   String,
}

/// Base URLs of the three live price sources, in priority order.
#[derive(Debug, Clone)]
pub struct PriceApiConfig {
    pub bingx_url:     String,
    pub binance_url:   String,
    pub coingecko_url: String,
}

/// Everything the service needs, resolved at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr:           SocketAddr,
    /// `None` → broadcaster disabled, signals are still processed
    pub telegram:            Option<TelegramConfig>,
    /// `None` → no sentiment line in the message
    pub cryptopanic_api_key: Option<String>,
    pub cryptopanic_url:     String,
    /// `None` → no spreadsheet logging
    pub sheet_url:           Option<String>,
    pub price_apis:          PriceApiConfig,
    /// Uniform cap applied to every outbound call
    pub http_timeout:        Duration,
    pub language:            Language,
    pub signal_tag:          String,
    pub announce_on_startup: bool,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let bind_addr = match non_empty("BIND_ADDR") {
            Some(addr) => addr,
            None => format!("0.0.0.0:{}", non_empty("PORT").unwrap_or_else(|| "5000".to_string())),
        };
        let bind_addr: SocketAddr = bind_addr
            .parse()
            .with_context(|| format!("BIND_ADDR/PORT is not a valid socket address: {bind_addr}"))?;

        let telegram = match (non_empty("TG_BOT_TOKEN"), non_empty("TG_CHAT_ID")) {
            (Some(bot_token), Some(chat_id)) => Some(TelegramConfig {
                bot_token,
                chat_id,
                api_url: url_or("TELEGRAM_API_URL", "https://api.telegram.org"),
            }),
            _ => None,
        };

        let timeout_secs: u64 = non_empty("HTTP_TIMEOUT_SECS")
            .unwrap_or_else(|| "8".to_string())
            .parse()
            .context("HTTP_TIMEOUT_SECS must be a number")?;

        let language = non_empty("MESSAGE_LANG")
            .unwrap_or_else(|| "zh".to_string())
            .parse()?;

        Ok(Self {
            bind_addr,
            telegram,
            cryptopanic_api_key: non_empty("CRYPTOPANIC_API_KEY"),
            cryptopanic_url:     url_or("CRYPTOPANIC_API_URL", "https://cryptopanic.com"),
            sheet_url:           non_empty("SHEET_URL"),
            price_apis: PriceApiConfig {
                bingx_url:     url_or("BINGX_API_URL", "https://api-swap.bingx.com"),
                binance_url:   url_or("BINANCE_API_URL", "https://api.binance.com"),
                coingecko_url: url_or("COINGECKO_API_URL", "https://api.coingecko.com"),
            },
            http_timeout:        Duration::from_secs(timeout_secs),
            language,
            signal_tag:          non_empty("SIGNAL_TAG").unwrap_or_else(|| "GPT-CORE (V23)".to_string()),
            announce_on_startup: non_empty("ANNOUNCE_ON_STARTUP")
                .map(|v| v != "false" && v != "0")
                .unwrap_or(false),
        })
    }
}

impl Default for Config {
    /// Offline configuration: no collaborators, public API defaults.
    fn default() -> Self {
        Self {
            bind_addr:           SocketAddr::from(([0, 0, 0, 0], 5000)),
            telegram:            None,
            cryptopanic_api_key: None,
            cryptopanic_url:     "https://cryptopanic.com".to_string(),
            sheet_url:           None,
            price_apis: PriceApiConfig {
                bingx_url:     "https://api-swap.bingx.com".to_string(),
                binance_url:   "https://api.binance.com".to_string(),
                coingecko_url: "https://api.coingecko.com".to_string(),
            },
            http_timeout:        Duration::from_secs(8),
            language:            Language::Zh,
            signal_tag:          "GPT-CORE (V23)".to_string(),
            announce_on_startup: false,
        }
    }
}

fn non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn url_or(key: &str, default: &str) -> String {
    non_empty(key)
        .unwrap_or_else(|| default.to_string())
        .trim_end_matches('/')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_parse() {
        assert_eq!("zh".parse::<Language>().unwrap(), Language::Zh);
        assert_eq!(" EN ".parse::<Language>().unwrap(), Language::En);
        assert_eq!("Bilingual".parse::<Language>().unwrap(), Language::Bilingual);
        assert!("klingon".parse::<Language>().is_err());
    }

    #[test]
    fn test_default_is_offline() {
        let config = Config::default();
        assert!(config.telegram.is_none());
        assert!(config.cryptopanic_api_key.is_none());
        assert!(config.sheet_url.is_none());
        assert_eq!(config.http_timeout, Duration::from_secs(8));
    }
}
