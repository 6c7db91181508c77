//! zoneflux-core — shared vocabulary for the zoneflux collector.
//!
//! Holds everything the other crates agree on: the immutable runtime
//! configuration, the JSON schema of the upstream stats endpoint, the
//! zone allow/deny filter, and the shaping step that flattens a stats
//! snapshot into time-series points.
//!
//! # Architecture
//!
//! ```text
//! Config (env)
//!   ├── ZoneFilter ← NGINX_ZONE_WHITELIST / NGINX_ZONE_BLACKLIST
//!   └── MetricShaper
//!         └── shape(RawSnapshot, timestamp) → Vec<MetricPoint>
//! ```

pub mod config;
pub mod filter;
pub mod point;
pub mod shape;
pub mod snapshot;

pub use config::Config;
pub use filter::ZoneFilter;
pub use point::{MetricPoint, TimePrecision};
pub use shape::MetricShaper;
pub use snapshot::{MetricValue, RawSnapshot, ZoneStats};
