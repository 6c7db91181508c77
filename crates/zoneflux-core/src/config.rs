//! Runtime configuration from environment variables.
//!
//! Every knob is optional and has a documented default. The
//! constructor takes the variable lookup as a closure so tests can
//! feed in a plain map instead of mutating process environment.

use std::time::Duration;

use anyhow::{Context, bail};

use crate::point::TimePrecision;

/// Immutable collector configuration, resolved once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Host of the stats endpoint (`SERVER_HOST`, default `localhost`).
    pub server_host: String,
    /// Port of the stats endpoint (`SERVER_PORT`, default `8001`).
    pub server_port: u16,
    /// URL scheme for the stats endpoint (`SERVER_SCHEMA`, default `http`).
    pub server_scheme: String,
    /// Node identity tagged onto every point (`SERVER_HOSTNAME`,
    /// falling back to `HOSTNAME`, then `localhost`).
    pub node: String,
    /// Service identity tagged onto every point (`SERVICE_NAME`, default `nginx`).
    pub service: String,
    /// Retention policy duration string (`INFLUXDB_RETENTION_DURATION`, default `7d`).
    pub retention_duration: String,
    /// Retention policy replication factor (`INFLUXDB_RETENTION_REPLICATION`, default `1`).
    pub retention_replication: u16,
    /// Timestamp precision for written points (`INFLUXDB_TIME_PRECISION`, default `m`).
    pub time_precision: TimePrecision,
    /// Measurement name prefix (`INFLUXDB_PREFIX`, default `nginx`).
    pub prefix: String,
    /// Comma-separated zone allow-list patterns (`NGINX_ZONE_WHITELIST`, default empty).
    pub zone_allow: String,
    /// Comma-separated zone deny-list patterns (`NGINX_ZONE_BLACKLIST`, default empty).
    pub zone_deny: String,
    /// Upper bound of the random schedule offset
    /// (`SCHEDULE_JITTER_SECONDS`, default `10`).
    pub jitter_secs: u64,
    /// Bound on outbound HTTP calls (`SERVER_TIMEOUT_SECONDS`, default `5`).
    pub timeout: Duration,
}

impl Config {
    /// Resolve configuration from process environment.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let server_port: u16 = var("SERVER_PORT", "8001")
            .parse()
            .context("SERVER_PORT must be a port number")?;

        let server_scheme = var("SERVER_SCHEMA", "http");
        if server_scheme != "http" {
            bail!("SERVER_SCHEMA `{server_scheme}` is not supported; only `http` endpoints can be polled");
        }

        let node = lookup("SERVER_HOSTNAME")
            .or_else(|| lookup("HOSTNAME"))
            .unwrap_or_else(|| "localhost".to_string());

        let retention_replication: u16 = var("INFLUXDB_RETENTION_REPLICATION", "1")
            .parse()
            .context("INFLUXDB_RETENTION_REPLICATION must be an integer")?;

        let precision_raw = var("INFLUXDB_TIME_PRECISION", "m");
        let time_precision = TimePrecision::parse(&precision_raw)
            .with_context(|| format!("INFLUXDB_TIME_PRECISION `{precision_raw}` is not one of n, u, ms, s, m, h"))?;

        let jitter_secs: u64 = var("SCHEDULE_JITTER_SECONDS", "10")
            .parse()
            .context("SCHEDULE_JITTER_SECONDS must be an integer")?;

        let timeout_secs: u64 = var("SERVER_TIMEOUT_SECONDS", "5")
            .parse()
            .context("SERVER_TIMEOUT_SECONDS must be an integer")?;

        Ok(Self {
            server_host: var("SERVER_HOST", "localhost"),
            server_port,
            server_scheme,
            node,
            service: var("SERVICE_NAME", "nginx"),
            retention_duration: var("INFLUXDB_RETENTION_DURATION", "7d"),
            retention_replication,
            time_precision,
            prefix: var("INFLUXDB_PREFIX", "nginx"),
            zone_allow: var("NGINX_ZONE_WHITELIST", ""),
            zone_deny: var("NGINX_ZONE_BLACKLIST", ""),
            jitter_secs,
            timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// URL of the stats endpoint this collector polls.
    pub fn stats_url(&self) -> String {
        format!(
            "{}://{}:{}/stats",
            self.server_scheme, self.server_host, self.server_port
        )
    }
}
