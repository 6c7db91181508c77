//! zoneflux-influx — the InfluxDB 1.x sink.
//!
//! Owns the destination connection details, provisions the target
//! database and its default retention policy on startup, and writes
//! each cycle's point batch as line protocol. Failures here are not
//! recovered locally: they surface as [`SinkError`] and the caller
//! decides the process's fate.

pub mod dsn;
pub mod error;
pub mod line;
pub mod sink;

pub use dsn::Dsn;
pub use error::SinkError;
pub use sink::{MetricSink, SinkOptions};
