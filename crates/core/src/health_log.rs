//! Read-only health log model consumed by the heatmap.
//!
//! Rows arrive from the hosted backend as loosely-typed JSON. Deserialization
//! is lenient: a field with an unexpected JSON type is treated as absent
//! rather than failing the whole collection.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::CoreError;
use crate::pain_type::{normalize_pain_type, PainType};
use crate::regions::{expand_to_detailed, DetailedRegion};
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// HealthLog
// ---------------------------------------------------------------------------

/// A single symptom log as stored by the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthLog {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub description: Option<String>,

    /// When the symptom occurred. Kept as the raw string; may be unparsable.
    #[serde(default, deserialize_with = "lenient_string")]
    pub date: Option<String>,

    /// Pain score on a 0–10 scale.
    #[serde(default, deserialize_with = "lenient_number")]
    pub severity: Option<f64>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub pain_type: Option<String>,

    /// Single region chosen in the logging form.
    #[serde(default, deserialize_with = "lenient_string")]
    pub body_region: Option<String>,

    /// Free-form tags; may mix region names with descriptive words.
    #[serde(default, deserialize_with = "lenient_string_list")]
    pub body_parts: Option<Vec<String>>,
}

impl HealthLog {
    /// Create a log dated `date` with every other field empty.
    pub fn new(date: impl Into<String>) -> Self {
        Self {
            date: Some(date.into()),
            ..Self::default()
        }
    }

    pub fn with_severity(mut self, severity: f64) -> Self {
        self.severity = Some(severity);
        self
    }

    pub fn with_pain_type(mut self, pain_type: impl Into<String>) -> Self {
        self.pain_type = Some(pain_type.into());
        self
    }

    pub fn with_body_region(mut self, region: impl Into<String>) -> Self {
        self.body_region = Some(region.into());
        self
    }

    pub fn with_body_parts<I, S>(mut self, parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.body_parts = Some(parts.into_iter().map(Into::into).collect());
        self
    }

    /// Resolve `date` to a UTC instant, interpreting offset-less timestamps in
    /// `tz`. Returns `None` when the date is missing or unparsable.
    pub fn timestamp_in<Tz: TimeZone>(&self, tz: &Tz) -> Option<Timestamp> {
        self.date.as_deref().and_then(|raw| parse_log_timestamp(raw, tz))
    }

    /// Classified pain type; a missing value is `Other`.
    pub fn pain_type(&self) -> PainType {
        self.pain_type
            .as_deref()
            .map(normalize_pain_type)
            .unwrap_or_default()
    }

    /// Every detailed region this log touches.
    ///
    /// The union of the expansion of `body_region` and of each `body_parts`
    /// entry. A region named by both sources appears once.
    pub fn detailed_regions(&self) -> BTreeSet<DetailedRegion> {
        let mut regions = BTreeSet::new();
        if let Some(region) = self.body_region.as_deref().filter(|r| !r.is_empty()) {
            regions.extend(expand_to_detailed(region));
        }
        for part in self.body_parts.iter().flatten() {
            regions.extend(expand_to_detailed(part));
        }
        regions
    }
}

// ---------------------------------------------------------------------------
// LogSource
// ---------------------------------------------------------------------------

/// Supplier of an already-authorized, fully materialized log collection.
///
/// Order is irrelevant to the heatmap. Failures are reported to the caller,
/// which must resolve them (for example to a cached collection) before
/// anything reaches the aggregator.
pub trait LogSource {
    fn fetch_logs(&self) -> Result<Vec<HealthLog>, CoreError>;
}

impl LogSource for Vec<HealthLog> {
    fn fetch_logs(&self) -> Result<Vec<HealthLog>, CoreError> {
        Ok(self.clone())
    }
}

// ---------------------------------------------------------------------------
// Date parsing
// ---------------------------------------------------------------------------

/// Offset-less date-time layouts, tried in order. Interpreted in local time.
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Date-time layouts carrying an offset, including Postgres' short `+00`.
const OFFSET_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%#z",
    "%Y-%m-%d %H:%M:%S%.f%#z",
    "%Y-%m-%dT%H:%M%#z",
    "%Y-%m-%d %H:%M%#z",
];

/// Parse a log date string into a UTC instant.
///
/// Accepted inputs:
/// - RFC 3339 / ISO 8601 with an offset, seconds optional
///   (`2024-03-01T08:30:00Z`, `2024-03-01T08:30+02:00`, `2024-03-01 08:30:00+00`)
/// - date-time without an offset, read as wall-clock time in `tz`
/// - a bare `YYYY-MM-DD`, read as midnight UTC
///
/// Anything else, including the empty string, yields `None`.
pub fn parse_log_timestamp<Tz: TimeZone>(raw: &str, tz: &Tz) -> Option<Timestamp> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }

    for format in OFFSET_DATETIME_FORMATS {
        if let Ok(parsed) = DateTime::parse_from_str(raw, format) {
            return Some(parsed.with_timezone(&Utc));
        }
    }

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return tz
                .from_local_datetime(&naive)
                .earliest()
                .map(|local| local.with_timezone(&Utc));
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

// ---------------------------------------------------------------------------
// Lenient field decoding
// ---------------------------------------------------------------------------

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        _ => None,
    })
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_f64(),
        _ => None,
    })
}

fn lenient_string_list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(items)) => Some(
            items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s),
                    _ => None,
                })
                .collect(),
        ),
        _ => None,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use chrono::{FixedOffset, TimeZone};

    use super::*;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> Timestamp {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    // -- parse_log_timestamp ----------------------------------------------------

    #[test]
    fn parses_rfc3339() {
        assert_eq!(
            parse_log_timestamp("2024-03-01T08:30:00Z", &Utc),
            Some(utc(2024, 3, 1, 8, 30))
        );
        assert_eq!(
            parse_log_timestamp("2024-03-01T10:30:00.250+02:00", &Utc).map(|t| t.timestamp()),
            Some(utc(2024, 3, 1, 8, 30).timestamp())
        );
    }

    #[test]
    fn parses_minute_precision_with_offset() {
        assert_eq!(
            parse_log_timestamp("2024-05-20T00:00Z", &Utc),
            Some(utc(2024, 5, 20, 0, 0))
        );
        assert_eq!(
            parse_log_timestamp("2024-03-01T10:30+02:00", &Utc),
            Some(utc(2024, 3, 1, 8, 30))
        );
        assert_eq!(
            parse_log_timestamp("2024-03-01 08:30+00", &Utc),
            Some(utc(2024, 3, 1, 8, 30))
        );
    }

    #[test]
    fn parses_postgres_short_offset() {
        assert_eq!(
            parse_log_timestamp("2024-03-01 08:30:00+00", &Utc),
            Some(utc(2024, 3, 1, 8, 30))
        );
    }

    #[test]
    fn naive_datetime_uses_given_zone() {
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        assert_eq!(
            parse_log_timestamp("2024-03-01T10:30:00", &plus_two),
            Some(utc(2024, 3, 1, 8, 30))
        );
        assert_eq!(
            parse_log_timestamp("2024-03-01T10:30", &plus_two),
            Some(utc(2024, 3, 1, 8, 30))
        );
    }

    #[test]
    fn bare_date_is_utc_midnight() {
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        assert_eq!(
            parse_log_timestamp("2024-03-01", &plus_two),
            Some(utc(2024, 3, 1, 0, 0))
        );
    }

    #[test]
    fn garbage_dates_are_none() {
        assert_eq!(parse_log_timestamp("", &Utc), None);
        assert_eq!(parse_log_timestamp("yesterday", &Utc), None);
        assert_eq!(parse_log_timestamp("2024-13-45", &Utc), None);
    }

    // -- deserialization ----------------------------------------------------------

    #[test]
    fn deserializes_backend_row() {
        let log: HealthLog = serde_json::from_value(serde_json::json!({
            "id": "abc",
            "user_id": "u1",
            "title": "Elbow pain",
            "date": "2024-03-01T08:30:00Z",
            "severity": 6,
            "pain_type": "Sharp",
            "body_region": "left_arm",
            "body_parts": ["left_forearm", "swollen"]
        }))
        .unwrap();

        assert_eq!(log.id.as_deref(), Some("abc"));
        assert_eq!(log.severity, Some(6.0));
        assert_eq!(log.pain_type(), PainType::Sharp);
        assert_eq!(log.body_parts.as_ref().map(Vec::len), Some(2));
    }

    #[test]
    fn wrong_types_are_treated_as_absent() {
        let log: HealthLog = serde_json::from_value(serde_json::json!({
            "date": 1709281800,
            "severity": "high",
            "pain_type": 3,
            "body_region": null,
            "body_parts": ["chest", 7, null, "neck"]
        }))
        .unwrap();

        assert_eq!(log.date, None);
        assert_eq!(log.severity, None);
        assert_eq!(log.pain_type, None);
        assert_eq!(log.body_region, None);
        assert_eq!(
            log.body_parts,
            Some(vec!["chest".to_string(), "neck".to_string()])
        );
    }

    #[test]
    fn missing_fields_default() {
        let log: HealthLog = serde_json::from_str("{}").unwrap();
        assert_eq!(log, HealthLog::default());
        assert_eq!(log.pain_type(), PainType::Other);
    }

    // -- detailed_regions -----------------------------------------------------------

    #[test]
    fn regions_union_of_both_sources() {
        let log = HealthLog::new("2024-03-01")
            .with_body_region("chest")
            .with_body_parts(["neck", "chest", "tight"]);
        let regions: Vec<_> = log.detailed_regions().into_iter().collect();
        assert_eq!(regions, vec![DetailedRegion::Neck, DetailedRegion::Chest]);
    }

    #[test]
    fn overlapping_broad_and_detailed_count_once() {
        let log = HealthLog::new("2024-03-01")
            .with_body_region("left_leg")
            .with_body_parts(["Left Foot"]);
        assert_eq!(log.detailed_regions().len(), 3);
    }

    #[test]
    fn no_regions_when_untagged() {
        assert!(HealthLog::new("2024-03-01").detailed_regions().is_empty());
        assert!(HealthLog::new("2024-03-01")
            .with_body_region("")
            .detailed_regions()
            .is_empty());
    }

    #[test]
    fn vec_is_a_log_source() {
        let logs = vec![HealthLog::new("2024-03-01")];
        assert_eq!(logs.fetch_logs().unwrap().len(), 1);
    }
}
