//! Yahoo Finance market data adapter
//!
//! Uses the public chart endpoint:
//! `GET {base_url}/v8/finance/chart/{symbol}?range=1d&interval=1m`
//! and returns the last non-null close of the latest session.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::adapters::errors::{MarketDataError, MarketDataResult};
use crate::adapters::traits::MarketDataFetcher;
use crate::config::MarketDataConfig;
use crate::core::alert::Symbol;

/// Browser-like UA; the chart endpoint rejects empty user agents
const USER_AGENT: &str = "Mozilla/5.0 (compatible; price-alert-bot/0.1)";

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    meta: Option<ChartMeta>,
    #[serde(default)]
    indicators: Option<Indicators>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    #[serde(default)]
    regular_market_price: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<Quote>,
}

#[derive(Debug, Deserialize)]
struct Quote {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

impl ChartResult {
    /// Last non-null close, falling back to the meta market price
    fn last_close(&self) -> Option<f64> {
        let from_quotes = self
            .indicators
            .as_ref()
            .and_then(|ind| ind.quote.first())
            .and_then(|q| q.close.iter().rev().find_map(|c| *c));

        from_quotes
            .or_else(|| self.meta.as_ref().and_then(|m| m.regular_market_price))
            .filter(|p| p.is_finite() && *p >= 0.0)
    }
}

// ============================================================================
// Adapter
// ============================================================================

/// HTTP fetcher for Yahoo Finance last-close prices
pub struct YahooFetcher {
    http_client: reqwest::Client,
    base_url: Url,
    range: String,
    interval: String,
}

impl YahooFetcher {
    pub fn new(config: &MarketDataConfig) -> MarketDataResult<Self> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| MarketDataError::InvalidBaseUrl(format!("{}: {}", config.base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(MarketDataError::InvalidBaseUrl(config.base_url.clone()));
        }

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            http_client,
            base_url,
            range: config.range.clone(),
            interval: config.interval.clone(),
        })
    }

    /// `{base}/v8/finance/chart/{symbol}` with the symbol as one encoded segment
    fn chart_url(&self, symbol: &Symbol) -> MarketDataResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| MarketDataError::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(["v8", "finance", "chart", symbol.as_str()]);
        Ok(url)
    }

    fn parse_chart(symbol: &Symbol, text: &str) -> MarketDataResult<Option<f64>> {
        let envelope: ChartEnvelope = serde_json::from_str(text)
            .map_err(|e| MarketDataError::InvalidResponse(format!("Invalid JSON: {}", e)))?;

        if let Some(err) = envelope.chart.error {
            debug!(
                symbol = %symbol,
                code = %err.code,
                description = err.description.as_deref().unwrap_or(""),
                "[FETCH] Provider reported no data"
            );
            return Ok(None);
        }

        let price = envelope
            .chart
            .result
            .as_ref()
            .and_then(|results| results.first())
            .and_then(ChartResult::last_close);

        Ok(price)
    }
}

#[async_trait]
impl MarketDataFetcher for YahooFetcher {
    async fn fetch_last_close(&self, symbol: &Symbol) -> MarketDataResult<Option<f64>> {
        let response = self
            .http_client
            .get(self.chart_url(symbol)?)
            .query(&[("range", self.range.as_str()), ("interval", self.interval.as_str())])
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            warn!(symbol = %symbol, "[FETCH] No data found, possibly delisted");
            return Ok(None);
        }
        if !status.is_success() {
            return Err(MarketDataError::Status {
                symbol: symbol.to_string(),
                status: status.as_u16(),
            });
        }

        let text = response
            .text()
            .await
            .map_err(|e| MarketDataError::InvalidResponse(format!("Failed to read response: {}", e)))?;

        Self::parse_chart(symbol, &text)
    }

    fn provider_name(&self) -> &'static str {
        "yahoo"
    }
}
