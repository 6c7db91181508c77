//! The metric sink — provisioning and batched writes.
//!
//! One sink lives for the process. Provisioning runs once at startup
//! (lookup-before-create, so restarts are safe); writes happen once
//! per cycle and propagate their failures to the caller.

use std::collections::BTreeMap;
use std::time::Duration;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper_util::rt::TokioIo;
use serde::Deserialize;
use tracing::{debug, info};
use url::Url;

use zoneflux_core::{MetricPoint, TimePrecision};

use crate::dsn::Dsn;
use crate::error::{SinkError, SinkResult};
use crate::line;

/// Identity and write behavior settings for a sink.
#[derive(Debug, Clone)]
pub struct SinkOptions {
    /// Value of the `service` tag stamped on every point.
    pub service: String,
    /// Value of the `node` tag stamped on every point.
    pub node: String,
    /// Timestamp precision for writes.
    pub precision: TimePrecision,
    /// Retention policy duration, e.g. `7d`.
    pub retention_duration: String,
    /// Retention policy replication factor.
    pub retention_replication: u16,
    /// Bound on each HTTP call.
    pub timeout: Duration,
}

/// Writes point batches to an InfluxDB 1.x endpoint.
pub struct MetricSink {
    dsn: Dsn,
    tags: BTreeMap<String, String>,
    precision: TimePrecision,
    retention_duration: String,
    retention_replication: u16,
    timeout: Duration,
}

impl MetricSink {
    pub fn new(dsn: Dsn, options: SinkOptions) -> Self {
        let tags = BTreeMap::from([
            ("service".to_string(), options.service),
            ("node".to_string(), options.node),
        ]);
        Self {
            dsn,
            tags,
            precision: options.precision,
            retention_duration: options.retention_duration,
            retention_replication: options.retention_replication,
            timeout: options.timeout,
        }
    }

    /// Destination identity for status lines, e.g. `host:8086/nginx`.
    pub fn identity(&self) -> String {
        self.dsn.identity()
    }

    /// Create the target database and its default retention policy if
    /// the DSN names one and it does not exist yet.
    pub async fn ensure_database(&self) -> SinkResult<()> {
        let Some(database) = self.dsn.database.clone() else {
            debug!("dsn names no database, skipping provisioning");
            return Ok(());
        };

        let body = self.query("SHOW DATABASES").await?;
        let existing = database_names(&body)?;
        if existing.iter().any(|name| *name == database) {
            debug!(%database, "database already present");
            return Ok(());
        }

        self.query(&format!("CREATE DATABASE \"{database}\"")).await?;
        self.query(&format!(
            "CREATE RETENTION POLICY \"{database}_policy\" ON \"{database}\" DURATION {} REPLICATION {} DEFAULT",
            self.retention_duration, self.retention_replication
        ))
        .await?;

        info!(
            %database,
            retention = %self.retention_duration,
            replication = self.retention_replication,
            "created database and default retention policy"
        );
        Ok(())
    }

    /// Write one batch. The process-wide `service`/`node` tags merge
    /// into every point; the point's own tags win on collision.
    pub async fn write_points(&self, points: &[MetricPoint]) -> SinkResult<()> {
        let body = line::encode(points, &self.tags, self.precision);
        if body.is_empty() {
            debug!("batch contained no writable lines");
            return Ok(());
        }

        let mut url = self.endpoint("write")?;
        {
            let mut pairs = url.query_pairs_mut();
            if let Some(database) = &self.dsn.database {
                pairs.append_pair("db", database);
            }
            pairs.append_pair("precision", self.precision.unit());
            self.append_credentials(&mut pairs);
        }

        self.request(url, body).await?;
        Ok(())
    }

    /// Run one InfluxQL statement through `/query`.
    async fn query(&self, statement: &str) -> SinkResult<Bytes> {
        let mut url = self.endpoint("query")?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("q", statement);
            self.append_credentials(&mut pairs);
        }
        self.request(url, String::new()).await
    }

    fn endpoint(&self, path: &str) -> SinkResult<Url> {
        Url::parse(&format!("{}/{path}", self.dsn.base_url()))
            .map_err(|e| SinkError::Dsn(e.to_string()))
    }

    fn append_credentials(&self, pairs: &mut url::form_urlencoded::Serializer<'_, url::UrlQuery<'_>>) {
        if !self.dsn.username.is_empty() {
            pairs.append_pair("u", &self.dsn.username);
            pairs.append_pair("p", &self.dsn.password);
        }
    }

    /// POST to the destination and return the response body, treating
    /// any non-2xx status as an error.
    async fn request(&self, url: Url, body: String) -> SinkResult<Bytes> {
        let address = format!("{}:{}", self.dsn.host, self.dsn.port);
        // Origin-form request target; the authority rides in `host`.
        let target = match url.query() {
            Some(query) => format!("{}?{query}", url.path()),
            None => url.path().to_string(),
        };

        let exchange = async {
            let stream = tokio::net::TcpStream::connect(&address).await?;
            let io = TokioIo::new(stream);
            let (mut sender, conn) = hyper::client::conn::http1::handshake(io).await?;

            // Drive the connection in the background.
            tokio::spawn(async move {
                let _ = conn.await;
            });

            let request = http::Request::builder()
                .method("POST")
                .uri(target)
                .header("host", &address)
                .header("user-agent", "zoneflux/0.1")
                .body(Full::new(Bytes::from(body)))?;

            let response = sender.send_request(request).await?;
            let status = response.status();
            let body = response.into_body().collect().await?.to_bytes();
            if !status.is_success() {
                return Err(SinkError::Status {
                    status: status.as_u16(),
                    body: String::from_utf8_lossy(&body).into_owned(),
                });
            }
            Ok(body)
        };

        tokio::time::timeout(self.timeout, exchange)
            .await
            .map_err(|_| SinkError::Timeout)?
    }
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    results: Vec<QueryResult>,
}

#[derive(Deserialize)]
struct QueryResult {
    #[serde(default)]
    series: Vec<Series>,
}

#[derive(Deserialize)]
struct Series {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

/// Extract database names from a `SHOW DATABASES` response body.
fn database_names(body: &[u8]) -> Result<Vec<String>, serde_json::Error> {
    let response: QueryResponse = serde_json::from_slice(body)?;
    Ok(response
        .results
        .iter()
        .flat_map(|result| &result.series)
        .flat_map(|series| &series.values)
        .filter_map(|row| row.first().and_then(|v| v.as_str()).map(String::from))
        .collect())
}
