//! Quote gateway: the upstream market-data source behind a trait seam, so
//! handlers and tests never depend on a live feed.

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use crate::types::quote::{Candle, Quote};

#[derive(Debug, Error)]
pub enum QuoteError {
    #[error("quote upstream error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Candle lookback window, as the dashboard requests it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandlePeriod {
    Day,
    Week,
    Month,
    Year,
}

impl CandlePeriod {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "1D" | "D" => Some(Self::Day),
            "1W" | "W" => Some(Self::Week),
            "1M" | "M" => Some(Self::Month),
            "1Y" | "Y" => Some(Self::Year),
            _ => None,
        }
    }

    /// Upstream bar resolution matching this window.
    fn resolution(self) -> &'static str {
        match self {
            Self::Day => "5",
            Self::Week => "60",
            Self::Month => "D",
            Self::Year => "W",
        }
    }

    fn lookback_secs(self) -> i64 {
        const DAY: i64 = 24 * 60 * 60;
        match self {
            Self::Day => DAY,
            Self::Week => 7 * DAY,
            Self::Month => 30 * DAY,
            Self::Year => 365 * DAY,
        }
    }
}

#[async_trait]
pub trait QuoteGateway: Send + Sync {
    async fn quote(&self, symbol: &str) -> Result<Quote, QuoteError>;
    async fn candles(&self, symbol: &str, period: CandlePeriod) -> Result<Vec<Candle>, QuoteError>;
}

/// REST client for a Finnhub-style quote API (short field names on the wire).
pub struct FinnhubGateway {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl FinnhubGateway {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    /// Build from `QUOTE_API_URL` / `QUOTE_API_KEY`.
    pub fn from_env() -> Self {
        let base_url = std::env::var("QUOTE_API_URL")
            .unwrap_or_else(|_| "https://finnhub.io/api/v1".to_string());
        let api_key = std::env::var("QUOTE_API_KEY").unwrap_or_default();
        Self::new(base_url, api_key)
    }
}

#[derive(Debug, Deserialize)]
struct RawQuote {
    #[serde(default)]
    c: f64,
    #[serde(default)]
    d: Option<f64>,
    #[serde(default)]
    dp: Option<f64>,
    #[serde(default)]
    h: f64,
    #[serde(default)]
    l: f64,
    #[serde(default)]
    o: f64,
    #[serde(default)]
    pc: f64,
}

impl From<RawQuote> for Quote {
    fn from(raw: RawQuote) -> Self {
        Self {
            current: raw.c,
            change: raw.d.unwrap_or(0.0),
            percent_change: raw.dp.unwrap_or(0.0),
            high: raw.h,
            low: raw.l,
            open: raw.o,
            previous_close: raw.pc,
        }
    }
}

/// Column-oriented candle payload: parallel arrays plus a status flag.
#[derive(Debug, Deserialize)]
struct RawCandles {
    s: String,
    #[serde(default)]
    t: Vec<i64>,
    #[serde(default)]
    o: Vec<f64>,
    #[serde(default)]
    h: Vec<f64>,
    #[serde(default)]
    l: Vec<f64>,
    #[serde(default)]
    c: Vec<f64>,
}

fn candles_from_raw(raw: RawCandles) -> Vec<Candle> {
    if raw.s != "ok" {
        return Vec::new();
    }
    let n = raw
        .t
        .len()
        .min(raw.o.len())
        .min(raw.h.len())
        .min(raw.l.len())
        .min(raw.c.len());
    (0..n)
        .map(|i| Candle {
            timestamp: raw.t[i],
            open: raw.o[i],
            high: raw.h[i],
            low: raw.l[i],
            close: raw.c[i],
        })
        .collect()
}

#[async_trait]
impl QuoteGateway for FinnhubGateway {
    async fn quote(&self, symbol: &str) -> Result<Quote, QuoteError> {
        let url = format!("{}/quote", self.base_url);
        let raw: RawQuote = self
            .http
            .get(&url)
            .query(&[
                ("symbol", symbol.to_uppercase()),
                ("token", self.api_key.clone()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(raw.into())
    }

    async fn candles(&self, symbol: &str, period: CandlePeriod) -> Result<Vec<Candle>, QuoteError> {
        let to = chrono::Utc::now().timestamp();
        let from = to - period.lookback_secs();
        let url = format!("{}/stock/candle", self.base_url);
        let raw: RawCandles = self
            .http
            .get(&url)
            .query(&[
                ("symbol", symbol.to_uppercase()),
                ("resolution", period.resolution().to_string()),
                ("token", self.api_key.clone()),
            ])
            .query(&[("from", from), ("to", to)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(candles_from_raw(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_quote_maps_fields_and_defaults_missing_change() {
        let raw: RawQuote =
            serde_json::from_str(r#"{"c":150.5,"h":152.0,"l":149.0,"o":151.0,"pc":150.0}"#)
                .unwrap();
        let quote: Quote = raw.into();
        assert_eq!(quote.current, 150.5);
        assert_eq!(quote.change, 0.0);
        assert_eq!(quote.percent_change, 0.0);
        assert_eq!(quote.previous_close, 150.0);
    }

    #[test]
    fn unknown_symbol_quote_is_all_zero() {
        let raw: RawQuote = serde_json::from_str(r#"{"c":0,"d":null,"dp":null}"#).unwrap();
        let quote: Quote = raw.into();
        assert_eq!(quote.current, 0.0);
        assert_eq!(quote.high, 0.0);
    }

    #[test]
    fn candles_zip_parallel_arrays() {
        let raw: RawCandles = serde_json::from_str(
            r#"{"s":"ok","t":[1,2],"o":[10.0,11.0],"h":[12.0,13.0],"l":[9.0,10.0],"c":[11.0,12.0]}"#,
        )
        .unwrap();
        let candles = candles_from_raw(raw);
        assert_eq!(candles.len(), 2);
        assert_eq!(candles[1].timestamp, 2);
        assert_eq!(candles[1].close, 12.0);
    }

    #[test]
    fn no_data_status_yields_empty_series() {
        let raw: RawCandles = serde_json::from_str(r#"{"s":"no_data"}"#).unwrap();
        assert!(candles_from_raw(raw).is_empty());
    }

    #[test]
    fn period_parse_accepts_short_and_long_forms() {
        assert_eq!(CandlePeriod::parse("1D"), Some(CandlePeriod::Day));
        assert_eq!(CandlePeriod::parse("w"), Some(CandlePeriod::Week));
        assert_eq!(CandlePeriod::parse(" 1M "), Some(CandlePeriod::Month));
        assert_eq!(CandlePeriod::parse("2X"), None);
    }
}
