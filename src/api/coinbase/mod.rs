pub mod client;
pub mod models;

pub use client::{CoinbaseClient, PriceSource};
pub use models::{ApiError, PriceResponse};
