//! JSON schema of the upstream stats endpoint.
//!
//! The endpoint returns one top-level object with an `uptime` counter
//! and a `zones` map of per-zone traffic counters. Anything else in
//! the body is ignored. A malformed zone entry fails the whole parse,
//! which the fetcher reports as a miss.

use std::collections::BTreeMap;

use serde::Deserialize;

/// One polled stats payload. Transient: shaped into points and dropped.
///
/// Both top-level keys are tolerated as absent so an empty body still
/// parses (and shapes into zero points); per-zone counters are strict.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawSnapshot {
    #[serde(default)]
    pub uptime: Option<f64>,
    #[serde(default)]
    pub zones: BTreeMap<String, ZoneStats>,
}

/// Traffic counters for a single zone.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ZoneStats {
    pub latency: MetricValue,
    pub rates: MetricValue,
    pub received: f64,
    pub sent: f64,
    pub requests: f64,
    /// Response counts keyed by status label, e.g. `"200"` or `"5xx"`.
    pub responses: BTreeMap<String, f64>,
}

/// A reported value: either a plain number or an aggregate such as a
/// latency distribution (`{"mean": 4.2, "p99": 17.0}`).
///
/// JSON integers deserialize into equal-valued floats, so all numeric
/// normalization happens here at the schema boundary.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Scalar(f64),
    Aggregate(BTreeMap<String, f64>),
}

impl MetricValue {
    /// Flatten into point fields.
    ///
    /// Scalars become `{value: x}`. Aggregates synthesize `value` from
    /// their `mean` entry and carry the remaining entries verbatim; an
    /// aggregate without `mean` keeps a `value` key holding `None`, so
    /// the invariant "every field set has a `value` key" holds either
    /// way.
    pub fn fields(&self) -> BTreeMap<String, Option<f64>> {
        match self {
            MetricValue::Scalar(value) => BTreeMap::from([("value".to_string(), Some(*value))]),
            MetricValue::Aggregate(entries) => {
                let mut fields: BTreeMap<String, Option<f64>> = entries
                    .iter()
                    .filter(|(key, _)| key.as_str() != "mean")
                    .map(|(key, value)| (key.clone(), Some(*value)))
                    .collect();
                fields.insert("value".to_string(), entries.get("mean").copied());
                fields
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn full_payload_parses() {
        let body = json!({
            "uptime": 120,
            "zones": {
                "api": {
                    "latency": {"mean": 5.0, "p99": 17.5},
                    "rates": 1.2,
                    "received": 100,
                    "sent": 200,
                    "requests": 10,
                    "responses": {"200": 9, "404": 1}
                }
            }
        });
        let snapshot: RawSnapshot = serde_json::from_value(body).unwrap();
        assert_eq!(snapshot.uptime, Some(120.0));
        let zone = &snapshot.zones["api"];
        assert_eq!(zone.requests, 10.0);
        assert_eq!(zone.responses["404"], 1.0);
        assert_eq!(
            zone.latency,
            MetricValue::Aggregate(BTreeMap::from([
                ("mean".to_string(), 5.0),
                ("p99".to_string(), 17.5),
            ]))
        );
    }

    #[test]
    fn unknown_top_level_fields_are_ignored() {
        let snapshot: RawSnapshot =
            serde_json::from_value(json!({"uptime": 1, "zones": {}, "version": "1.4"})).unwrap();
        assert_eq!(snapshot.uptime, Some(1.0));
        assert!(snapshot.zones.is_empty());
    }

    #[test]
    fn empty_object_parses_to_empty_snapshot() {
        let snapshot: RawSnapshot = serde_json::from_value(json!({})).unwrap();
        assert_eq!(snapshot.uptime, None);
        assert!(snapshot.zones.is_empty());
    }

    #[test]
    fn missing_zone_counter_fails_the_parse() {
        let body = json!({
            "uptime": 1,
            "zones": {"api": {"latency": 1, "rates": 1, "received": 1, "sent": 1}}
        });
        assert!(serde_json::from_value::<RawSnapshot>(body).is_err());
    }

    #[test]
    fn integers_and_floats_deserialize_alike() {
        let from_int: MetricValue = serde_json::from_value(json!(5)).unwrap();
        let from_float: MetricValue = serde_json::from_value(json!(5.0)).unwrap();
        assert_eq!(from_int, from_float);
        assert_eq!(from_int.fields(), from_float.fields());
    }

    #[test]
    fn scalar_fields_hold_a_single_value_key() {
        let fields = MetricValue::Scalar(3.5).fields();
        assert_eq!(fields, BTreeMap::from([("value".to_string(), Some(3.5))]));
    }

    #[test]
    fn aggregate_mean_becomes_value() {
        let value = MetricValue::Aggregate(BTreeMap::from([
            ("mean".to_string(), 4.0),
            ("p95".to_string(), 9.0),
        ]));
        let fields = value.fields();
        assert_eq!(fields["value"], Some(4.0));
        assert_eq!(fields["p95"], Some(9.0));
        assert!(!fields.contains_key("mean"));
    }

    #[test]
    fn aggregate_without_mean_keeps_an_empty_value() {
        let value = MetricValue::Aggregate(BTreeMap::from([("p95".to_string(), 9.0)]));
        let fields = value.fields();
        assert_eq!(fields["value"], None);
        assert_eq!(fields["p95"], Some(9.0));
    }

    #[test]
    fn flattening_an_already_flat_value_is_stable() {
        let value = MetricValue::Scalar(2.0);
        let once = value.fields();
        let again = MetricValue::Scalar(once["value"].unwrap()).fields();
        assert_eq!(once, again);
    }
}
