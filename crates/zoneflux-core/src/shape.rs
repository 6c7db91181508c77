//! Shaping — flattens a stats snapshot into time-series points.
//!
//! One point per counter: the snapshot-level `uptime` becomes an
//! untagged point, and every counter of every accepted zone becomes a
//! point tagged with the zone name. All points of one cycle share a
//! single timestamp.

use std::collections::BTreeMap;

use tracing::debug;

use crate::filter::ZoneFilter;
use crate::point::MetricPoint;
use crate::snapshot::{MetricValue, RawSnapshot};

/// Turns raw snapshots into named, tagged, timestamped points.
pub struct MetricShaper {
    prefix: String,
    filter: ZoneFilter,
}

impl MetricShaper {
    /// Create a shaper with the given measurement prefix and zone filter.
    pub fn new(prefix: impl Into<String>, filter: ZoneFilter) -> Self {
        Self {
            prefix: prefix.into(),
            filter,
        }
    }

    /// Flatten one snapshot. An empty snapshot yields an empty vec,
    /// which callers report as "metrics unavailable" rather than an
    /// error.
    pub fn shape(&self, snapshot: &RawSnapshot, timestamp: u64) -> Vec<MetricPoint> {
        let mut points = Vec::new();

        if let Some(uptime) = snapshot.uptime {
            points.push(self.point(
                "uptime",
                &MetricValue::Scalar(uptime),
                BTreeMap::new(),
                timestamp,
            ));
        }

        for (zone, stats) in &snapshot.zones {
            if !self.filter.accepts(zone) {
                debug!(%zone, "zone excluded by filter");
                continue;
            }

            let tags = BTreeMap::from([("zone".to_string(), zone.clone())]);

            points.push(self.point("latency", &stats.latency, tags.clone(), timestamp));
            points.push(self.point("rates", &stats.rates, tags.clone(), timestamp));
            for (name, counter) in [
                ("received", stats.received),
                ("sent", stats.sent),
                ("requests", stats.requests),
            ] {
                points.push(self.point(
                    name,
                    &MetricValue::Scalar(counter),
                    tags.clone(),
                    timestamp,
                ));
            }
            for (label, count) in &stats.responses {
                points.push(self.point(
                    &format!("responses_{label}"),
                    &MetricValue::Scalar(*count),
                    tags.clone(),
                    timestamp,
                ));
            }
        }

        points
    }

    fn point(
        &self,
        name: &str,
        value: &MetricValue,
        tags: BTreeMap<String, String>,
        timestamp: u64,
    ) -> MetricPoint {
        MetricPoint {
            measurement: format!("{}.{}", self.prefix, name),
            tags,
            time: timestamp,
            fields: value.fields(),
        }
    }
}
