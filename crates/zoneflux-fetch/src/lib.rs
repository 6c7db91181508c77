//! zoneflux-fetch — client for the nginx stats endpoint.
//!
//! Issues exactly one GET per cycle against `/stats` and parses the
//! JSON body into a [`RawSnapshot`]. There is no retry: any transport
//! error, non-2xx status, or schema mismatch is logged and reported as
//! a miss, and the next scheduled cycle is the de facto retry.

use std::time::Duration;

use http_body_util::{BodyExt, Empty};
use hyper_util::rt::TokioIo;
use tracing::{debug, warn};

use zoneflux_core::{Config, RawSnapshot};

/// Why a poll produced no snapshot.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("connection failed: {0}")]
    Connect(#[from] std::io::Error),

    #[error("request build failed: {0}")]
    Request(#[from] http::Error),

    #[error("http exchange failed: {0}")]
    Http(#[from] hyper::Error),

    #[error("endpoint returned status {0}")]
    Status(http::StatusCode),

    #[error("body is not a stats payload: {0}")]
    Schema(#[from] serde_json::Error),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),
}

/// Polls the stats endpoint. One instance lives for the process; each
/// call opens a fresh connection.
pub struct StatsFetcher {
    host: String,
    port: u16,
    url: String,
    timeout: Duration,
}

impl StatsFetcher {
    pub fn new(config: &Config) -> Self {
        Self {
            host: config.server_host.clone(),
            port: config.server_port,
            url: config.stats_url(),
            timeout: config.timeout,
        }
    }

    /// The URL this fetcher polls.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Poll once. A miss is logged here and surfaces as `None`; the
    /// caller decides only whether to keep going.
    pub async fn fetch(&self) -> Option<RawSnapshot> {
        match self.try_fetch().await {
            Ok(snapshot) => {
                debug!(url = %self.url, zones = snapshot.zones.len(), "stats snapshot fetched");
                Some(snapshot)
            }
            Err(error) => {
                warn!(url = %self.url, %error, "stats fetch failed");
                None
            }
        }
    }

    async fn try_fetch(&self) -> Result<RawSnapshot, FetchError> {
        let address = format!("{}:{}", self.host, self.port);

        let exchange = async {
            let stream = tokio::net::TcpStream::connect(&address).await?;
            let io = TokioIo::new(stream);
            let (mut sender, conn) = hyper::client::conn::http1::handshake(io).await?;

            // Drive the connection in the background.
            tokio::spawn(async move {
                let _ = conn.await;
            });

            let request = http::Request::builder()
                .method("GET")
                .uri("/stats")
                .header("host", &address)
                .header("user-agent", "zoneflux/0.1")
                .body(Empty::<bytes::Bytes>::new())?;

            let response = sender.send_request(request).await?;
            let status = response.status();
            if !status.is_success() {
                return Err(FetchError::Status(status));
            }

            let body = response.into_body().collect().await?.to_bytes();
            let snapshot: RawSnapshot = serde_json::from_slice(&body)?;
            Ok(snapshot)
        };

        tokio::time::timeout(self.timeout, exchange)
            .await
            .map_err(|_| FetchError::Timeout(self.timeout))?
    }
}
