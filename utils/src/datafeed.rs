//! Client for the market datafeed that serves OHLCV candles per trading pair.

use std::future::Future;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::{pair::Pair, reqwest::parse_url, Reqwest};

pub const DEFAULT_DATAFEED_URL: &str = "https://marketdata.wavesplatform.com";

/// A numeric field as the datafeed sends it. The feed is loosely typed, so
/// coercion follows JavaScript's `Number(value)`.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(untagged)]
pub enum Numeric {
    Number(f64),
    Text(String),
    Bool(bool),
    Null,
    /// The field was absent from the record.
    #[default]
    #[serde(skip_deserializing)]
    Missing,
    /// Arrays and objects.
    Other(Value),
}

impl Numeric {
    /// Never fails: blank strings, `null` and `false` give `0.0`, absent
    /// fields and anything unparsable give `NaN`.
    pub fn to_f64(&self) -> f64 {
        match self {
            Numeric::Number(n) => *n,
            Numeric::Text(s) => parse_js_number(s),
            Numeric::Bool(b) => f64::from(u8::from(*b)),
            Numeric::Null => 0.0,
            Numeric::Missing => f64::NAN,
            Numeric::Other(value) => parse_js_number(&js_string(value)),
        }
    }
}

impl From<f64> for Numeric {
    fn from(value: f64) -> Self {
        Numeric::Number(value)
    }
}

impl From<&str> for Numeric {
    fn from(value: &str) -> Self {
        Numeric::Text(value.to_string())
    }
}

/// String to number the way JavaScript does it: decimal literals with an
/// optional sign, `Infinity`, and unsigned `0x`/`0o`/`0b` integers. Rust
/// spellings such as `inf` or `nan` are not numbers here.
fn parse_js_number(s: &str) -> f64 {
    let s = s.trim();
    if s.is_empty() {
        return 0.0;
    }

    for (prefix, radix) in [("0x", 16), ("0o", 8), ("0b", 2)] {
        let digits = s
            .strip_prefix(prefix)
            .or_else(|| s.strip_prefix(&prefix.to_uppercase()));
        if let Some(digits) = digits {
            return parse_radix(digits, radix);
        }
    }

    match s {
        "Infinity" | "+Infinity" => f64::INFINITY,
        "-Infinity" => f64::NEG_INFINITY,
        _ if s
            .bytes()
            .any(|b| b.is_ascii_alphabetic() && !matches!(b, b'e' | b'E')) =>
        {
            f64::NAN
        }
        _ => s.parse::<f64>().unwrap_or(f64::NAN),
    }
}

fn parse_radix(digits: &str, radix: u32) -> f64 {
    if digits.is_empty() {
        return f64::NAN;
    }
    digits
        .chars()
        .try_fold(0.0, |acc, c| {
            c.to_digit(radix)
                .map(|d| acc * f64::from(radix) + f64::from(d))
        })
        .unwrap_or(f64::NAN)
}

/// `String(value)` for JSON values, used for arrays: `[]` is `""`, `[5]` is
/// `"5"`, objects never parse.
fn js_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(js_string).collect::<Vec<_>>().join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

/// One candle exactly as returned by the datafeed, before any shaping. No
/// field is validated, so one odd record never fails the whole response.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct RawCandle {
    /// Epoch milliseconds at which the candle opens.
    #[serde(default)]
    pub timestamp: Numeric,
    #[serde(default)]
    pub open: Numeric,
    #[serde(default)]
    pub high: Numeric,
    #[serde(default)]
    pub low: Numeric,
    #[serde(default)]
    pub close: Numeric,
    #[serde(default)]
    pub volume: Numeric,
}

/// Source of historical candles.
pub trait DatafeedApi: Send + Sync + 'static {
    /// Fetches the latest `count` candles of `frame_minutes` width for `pair`.
    fn get_last_candles(
        &self,
        pair: &Pair,
        count: u32,
        frame_minutes: u32,
    ) -> impl Future<Output = crate::Result<Vec<RawCandle>>> + Send;
}

pub struct DatafeedClient {
    base_url: Url,
    client: reqwest::Client,
}

impl DatafeedClient {
    pub fn new<U: ToString>(base_url: U) -> crate::Result<Self> {
        Ok(Self {
            base_url: parse_url(base_url)?,
            client: reqwest::Client::new(),
        })
    }

    pub fn candles_url(&self, pair: &Pair, count: u32, frame_minutes: u32) -> crate::Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| crate::Error::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend([
                "api",
                "candles",
                pair.amount_asset.as_str(),
                pair.price_asset.as_str(),
                frame_minutes.to_string().as_str(),
                count.to_string().as_str(),
            ]);
        Ok(url)
    }
}

impl DatafeedApi for DatafeedClient {
    async fn get_last_candles(
        &self,
        pair: &Pair,
        count: u32,
        frame_minutes: u32,
    ) -> crate::Result<Vec<RawCandle>> {
        let url = self.candles_url(pair, count, frame_minutes)?;
        Reqwest::get_with(&self.client, url)?
            .receive_json::<Vec<RawCandle>>()
            .await
    }
}
