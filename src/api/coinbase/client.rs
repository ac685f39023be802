use std::future::Future;

use reqwest::Client as HttpClient;
use tracing::{debug, warn};

use super::models::{ApiError, PriceResponse};

/// Anything that can produce the price data for a coin.
///
/// The refresh driver only talks to this trait, so a cycle can be run
/// against [`CoinbaseClient`] or an in-memory source.
pub trait PriceSource: Send + Sync {
    fn fetch_prices(
        &self,
        coin_id: &str,
    ) -> impl Future<Output = Result<PriceResponse, ApiError>> + Send;
}

/// Client for the public Coinbase asset price endpoint
#[derive(Clone)]
pub struct CoinbaseClient {
    http_client: HttpClient,
    base_url: String,
}

impl CoinbaseClient {
    pub const DEFAULT_BASE_URL: &'static str = "https://coinbase.com/api/v2/assets/prices";

    /// Create a client bound to `base_url`; request paths are resolved against it
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            http_client: HttpClient::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL for a coin's price resource
    pub fn url_for(&self, coin_id: &str) -> String {
        format!("{}/{}", self.base_url, coin_id)
    }

    /// Map a non-success status to an error, keeping the body for diagnostics
    async fn handle_error_response(
        status: reqwest::StatusCode,
        response: reqwest::Response,
    ) -> ApiError {
        let status_code = status.as_u16();
        let body_text = response.text().await.unwrap_or_default();

        match status_code {
            404 => ApiError::NotFound(body_text),
            500..=599 => {
                warn!("Server error {}: {}", status_code, body_text);
                ApiError::ServerError(status_code, body_text)
            }
            _ => ApiError::HttpError(status_code, body_text),
        }
    }

    /// GET {base_url}/{coin_id}
    ///
    /// # Returns
    /// * `Ok(PriceResponse)` - decoded price windows for the asset
    /// * `Err(ApiError)` - transport failure, non-success status or unexpected body
    pub async fn get_prices(&self, coin_id: &str) -> Result<PriceResponse, ApiError> {
        let url = self.url_for(coin_id);
        debug!("GET {}", url);

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| ApiError::RequestError(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(Self::handle_error_response(status, response).await);
        }

        response
            .json::<PriceResponse>()
            .await
            .map_err(|e| ApiError::DeserializationError(format!("Failed to parse response: {}", e)))
    }
}

impl Default for CoinbaseClient {
    fn default() -> Self {
        Self::new(Self::DEFAULT_BASE_URL)
    }
}

impl PriceSource for CoinbaseClient {
    async fn fetch_prices(&self, coin_id: &str) -> Result<PriceResponse, ApiError> {
        self.get_prices(coin_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    /// Serve a single canned HTTP response and report the request line
    async fn serve_once(status: &'static str, body: &'static str) -> (String, oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 1024];
            while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);
            }
            let request = String::from_utf8_lossy(&buf);
            let request_line = request.lines().next().unwrap_or_default().to_string();
            let _ = tx.send(request_line);

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        });

        (format!("http://{}/api/v2/assets/prices", addr), rx)
    }

    #[test]
    fn test_url_resolution_tolerates_trailing_slash() {
        let client = CoinbaseClient::new("https://coinbase.com/api/v2/assets/prices/");
        assert_eq!(
            client.url_for("bitcoin"),
            "https://coinbase.com/api/v2/assets/prices/bitcoin"
        );
        assert_eq!(CoinbaseClient::default().base_url(), CoinbaseClient::DEFAULT_BASE_URL);
    }

    #[tokio::test]
    async fn test_get_prices_success() {
        let body = r#"{"data":{"base":"ETH","prices":{"hour":{"prices":[[1718000000,"3500.25"]]}}}}"#;
        let (base_url, request_line) = serve_once("200 OK", body).await;

        let client = CoinbaseClient::new(base_url);
        let resp = client.fetch_prices("ethereum").await.unwrap();

        assert_eq!(resp.symbol(), "ETH");
        assert_eq!(resp.hourly()[0].price(), "3500.25");
        assert_eq!(
            request_line.await.unwrap(),
            "GET /api/v2/assets/prices/ethereum HTTP/1.1"
        );
    }

    #[tokio::test]
    async fn test_get_prices_not_found() {
        let (base_url, _) = serve_once("404 Not Found", r#"{"errors":[]}"#).await;

        let err = CoinbaseClient::new(base_url).get_prices("dogecoin").await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_get_prices_server_error() {
        let (base_url, _) = serve_once("503 Service Unavailable", "{}").await;

        let err = CoinbaseClient::new(base_url).get_prices("bitcoin").await.unwrap_err();
        assert!(matches!(err, ApiError::ServerError(503, _)));
    }

    #[tokio::test]
    async fn test_get_prices_unexpected_shape() {
        let (base_url, _) = serve_once("200 OK", r#"{"data":{"base":"BTC"}}"#).await;

        let err = CoinbaseClient::new(base_url).get_prices("bitcoin").await.unwrap_err();
        assert!(matches!(err, ApiError::DeserializationError(_)));
    }
}
