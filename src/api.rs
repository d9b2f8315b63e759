//! CoinGecko API client for fetching cryptocurrency market snapshots.

use crate::models::Asset;
use anyhow::{Context, Result};
use reqwest::{Client, Url};
use serde::Deserialize;
use std::net::IpAddr;
use std::time::Duration;
use thiserror::Error;

/// Public CoinGecko v3 API.
pub const DEFAULT_BASE_URL: &str = "https://api.coingecko.com/api/v3";

/// CoinGecko rejects requests without a User-Agent.
const USER_AGENT: &str = concat!("coindeck/", env!("CARGO_PKG_VERSION"));

/// Fixed query for the markets endpoint: first 50 assets by market cap, in USD.
const MARKETS_QUERY: [(&str, &str); 5] = [
    ("vs_currency", "usd"),
    ("order", "market_cap_desc"),
    ("per_page", "50"),
    ("page", "1"),
    ("sparkline", "false"),
];

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("API returned {code} {reason}")]
    Status { code: u16, reason: String },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Anything that can produce the base list.
pub trait AssetSource {
    async fn fetch_assets(&self) -> Result<Vec<Asset>, FetchError>;
}

/// CoinGecko markets client.
pub struct CoinGeckoClient {
    client: Client,
    markets_url: Url,
}

impl CoinGeckoClient {
    /// Create a client for `base_url` (e.g. `https://api.coingecko.com/api/v3`).
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self> {
        let markets_url = Url::parse(&format!("{}/coins/markets", base_url.trim_end_matches('/')))
            .with_context(|| format!("Invalid API base URL: {}", base_url))?;

        let mut builder = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(timeout_secs));

        // A system proxy has no business seeing loopback traffic.
        if is_loopback(&markets_url) {
            builder = builder.no_proxy();
        }

        let client = builder.build().context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            markets_url,
        })
    }

    /// URL the client requests, including the fixed query.
    pub fn request_url(&self) -> Url {
        let mut url = self.markets_url.clone();
        url.query_pairs_mut().extend_pairs(MARKETS_QUERY);
        url
    }
}

impl AssetSource for CoinGeckoClient {
    async fn fetch_assets(&self) -> Result<Vec<Asset>, FetchError> {
        let response = self.client.get(self.request_url()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                code: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        let body = response.bytes().await?;
        let markets: Vec<CoinMarket> = serde_json::from_slice(&body)?;

        Ok(markets.into_iter().map(CoinMarket::into_asset).collect())
    }
}

fn is_loopback(url: &Url) -> bool {
    match url.host_str() {
        Some("localhost") => true,
        Some(host) => host
            .trim_start_matches('[')
            .trim_end_matches(']')
            .parse::<IpAddr>()
            .map(|ip| ip.is_loopback())
            .unwrap_or(false),
        None => false,
    }
}

// CoinGecko /coins/markets response item

#[derive(Debug, Deserialize)]
struct CoinMarket {
    id: String,
    symbol: String,
    name: String,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    current_price: Option<f64>,
    #[serde(default)]
    price_change_percentage_24h: Option<f64>,
}

impl CoinMarket {
    fn into_asset(self) -> Asset {
        Asset {
            id: self.id,
            symbol: self.symbol,
            name: self.name,
            image: self.image.unwrap_or_default(),
            current_price: self.current_price.unwrap_or(0.0),
            price_change_percentage_24h: self.price_change_percentage_24h.unwrap_or(0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    const MARKETS_BODY: &str = r#"[
        {"id":"bitcoin","symbol":"btc","name":"Bitcoin","image":"https://img/btc.png","current_price":64123.5,"price_change_percentage_24h":1.25,"market_cap":1},
        {"id":"tether","symbol":"usdt","name":"Tether","image":"https://img/usdt.png","current_price":1.0,"price_change_percentage_24h":null}
    ]"#;

    /// Serve exactly one HTTP response, reporting the request line back.
    async fn serve_once(status_line: &'static str, body: &'static str) -> (String, oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 8192];
            let mut read = 0;
            loop {
                let n = socket.read(&mut buf[read..]).await.unwrap();
                read += n;
                if n == 0 || buf[..read].windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
            }
            let request = String::from_utf8_lossy(&buf[..read]);
            let request_line = request.lines().next().unwrap_or_default().to_string();
            let _ = tx.send(request_line);

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
        });

        (format!("http://{}", addr), rx)
    }

    #[test]
    fn test_request_url_has_fixed_query() {
        let client = CoinGeckoClient::new(DEFAULT_BASE_URL, 10).unwrap();
        assert_eq!(
            client.request_url().as_str(),
            "https://api.coingecko.com/api/v3/coins/markets?vs_currency=usd&order=market_cap_desc&per_page=50&page=1&sparkline=false"
        );
    }

    #[test]
    fn test_trailing_slash_in_base_url() {
        let client = CoinGeckoClient::new("http://localhost:9000/api/", 10).unwrap();
        assert!(client
            .request_url()
            .as_str()
            .starts_with("http://localhost:9000/api/coins/markets?"));
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(CoinGeckoClient::new("not a url", 10).is_err());
    }

    #[test]
    fn test_loopback_detection() {
        assert!(is_loopback(&Url::parse("http://localhost:8080/").unwrap()));
        assert!(is_loopback(&Url::parse("http://127.0.0.1/").unwrap()));
        assert!(is_loopback(&Url::parse("http://[::1]:3000/").unwrap()));
        assert!(!is_loopback(&Url::parse(DEFAULT_BASE_URL).unwrap()));
    }

    #[tokio::test]
    async fn test_fetch_assets_success() {
        let (base, request) = serve_once("200 OK", MARKETS_BODY).await;
        let client = CoinGeckoClient::new(&base, 5).unwrap();

        let assets = client.fetch_assets().await.unwrap();
        assert_eq!(assets.len(), 2);
        assert_eq!(assets[0].id, "bitcoin");
        assert_eq!(assets[0].symbol, "btc");
        assert_eq!(assets[0].image, "https://img/btc.png");
        assert_eq!(assets[0].current_price, 64123.5);
        assert_eq!(assets[0].price_change_percentage_24h, 1.25);
        assert_eq!(assets[1].price_change_percentage_24h, 0.0);

        let request_line = request.await.unwrap();
        assert!(request_line.starts_with("GET /coins/markets?"));
        assert!(request_line.contains("vs_currency=usd"));
        assert!(request_line.contains("order=market_cap_desc"));
        assert!(request_line.contains("per_page=50"));
        assert!(request_line.contains("sparkline=false"));
    }

    #[tokio::test]
    async fn test_fetch_assets_http_error() {
        let (base, _request) = serve_once("500 Internal Server Error", "{}").await;
        let client = CoinGeckoClient::new(&base, 5).unwrap();

        match client.fetch_assets().await {
            Err(FetchError::Status { code, reason }) => {
                assert_eq!(code, 500);
                assert_eq!(reason, "Internal Server Error");
            }
            other => panic!("expected status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_assets_rate_limited_is_status_error() {
        let (base, _request) = serve_once("429 Too Many Requests", "").await;
        let client = CoinGeckoClient::new(&base, 5).unwrap();

        let err = client.fetch_assets().await.unwrap_err();
        assert!(matches!(err, FetchError::Status { code: 429, .. }));
        assert_eq!(err.to_string(), "API returned 429 Too Many Requests");
    }

    #[tokio::test]
    async fn test_fetch_assets_malformed_body() {
        let (base, _request) = serve_once("200 OK", "<html>not json</html>").await;
        let client = CoinGeckoClient::new(&base, 5).unwrap();

        let err = client.fetch_assets().await.unwrap_err();
        assert!(matches!(err, FetchError::Parse(_)));
    }

    #[tokio::test]
    async fn test_fetch_assets_missing_identity_fields() {
        let (base, _request) = serve_once("200 OK", r#"[{"id":"x","current_price":1.0}]"#).await;
        let client = CoinGeckoClient::new(&base, 5).unwrap();

        let err = client.fetch_assets().await.unwrap_err();
        assert!(matches!(err, FetchError::Parse(_)));
    }

    #[tokio::test]
    async fn test_fetch_assets_connection_refused() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = CoinGeckoClient::new(&format!("http://{}", addr), 5).unwrap();
        let err = client.fetch_assets().await.unwrap_err();
        assert!(matches!(err, FetchError::Transport(_)));
    }
}
