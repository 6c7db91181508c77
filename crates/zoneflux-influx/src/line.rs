//! InfluxDB 1.x line-protocol encoding.
//!
//! One line per point: `measurement,tag=v field=1.0 timestamp`. Tag
//! order is deterministic (sorted), global tags merge under the
//! point's own tags, hollow (`None`) fields are omitted, and a point
//! with no writable fields produces no line at all.

use std::collections::BTreeMap;

use zoneflux_core::{MetricPoint, TimePrecision};

/// Encode a batch into a newline-joined line-protocol body.
pub fn encode(
    points: &[MetricPoint],
    global_tags: &BTreeMap<String, String>,
    precision: TimePrecision,
) -> String {
    points
        .iter()
        .filter_map(|point| encode_point(point, global_tags, precision))
        .collect::<Vec<_>>()
        .join("\n")
}

fn encode_point(
    point: &MetricPoint,
    global_tags: &BTreeMap<String, String>,
    precision: TimePrecision,
) -> Option<String> {
    let fields: Vec<String> = point
        .fields
        .iter()
        .filter_map(|(key, value)| {
            let value = (*value)?;
            value
                .is_finite()
                .then(|| format!("{}={}", escape_key(key), format_float(value)))
        })
        .collect();
    if fields.is_empty() {
        return None;
    }

    let mut tags = global_tags.clone();
    for (key, value) in &point.tags {
        tags.insert(key.clone(), value.clone());
    }

    let mut line = escape_measurement(&point.measurement);
    for (key, value) in &tags {
        line.push(',');
        line.push_str(&escape_key(key));
        line.push('=');
        line.push_str(&escape_key(value));
    }
    line.push(' ');
    line.push_str(&fields.join(","));
    line.push(' ');
    line.push_str(&precision.from_epoch_secs(point.time).to_string());

    Some(line)
}

/// Floats always carry a decimal point so the destination types the
/// field as float even for whole numbers.
fn format_float(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

fn escape_measurement(s: &str) -> String {
    s.replace(',', "\\,").replace(' ', "\\ ")
}

fn escape_key(s: &str) -> String {
    s.replace(',', "\\,").replace('=', "\\=").replace(' ', "\\ ")
}
