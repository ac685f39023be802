use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Body of `GET /assets/prices/{coin_id}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceResponse {
    pub data: AssetPrices,
}

/// Price windows for a single asset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetPrices {
    /// Base currency code, e.g. "BTC"
    pub base: String,
    pub prices: PriceWindows,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceWindows {
    pub hour: PriceWindow,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceWindow {
    /// Most recent sample first
    pub prices: Vec<PriceSample>,
}

/// `[unix_seconds, "decimal price"]` exactly as the API sends it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSample(pub i64, pub String);

impl PriceSample {
    pub fn timestamp(&self) -> i64 {
        self.0
    }

    pub fn price(&self) -> &str {
        &self.1
    }
}

impl PriceResponse {
    /// Hourly samples, most recent first
    pub fn hourly(&self) -> &[PriceSample] {
        &self.data.prices.hour.prices
    }

    pub fn symbol(&self) -> &str {
        &self.data.base
    }
}

/// Error type for price API operations
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// 404 Not Found
    #[error("Not Found: {0}")]
    NotFound(String),
    /// 5xx Server Error
    #[error("Server Error ({0}): {1}")]
    ServerError(u16, String),
    /// Other non-success statuses
    #[error("HTTP Error ({0}): {1}")]
    HttpError(u16, String),
    /// Network/request error
    #[error("Request Error: {0}")]
    RequestError(String),
    /// Body did not match the expected shape
    #[error("Deserialization Error: {0}")]
    DeserializationError(String),
}
