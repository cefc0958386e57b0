//! Body-region heatmap aggregation.
//!
//! Converts a log collection and a reference day into a per-region intensity
//! (time-decayed, severity-weighted sum) and a per-region color (pain type of
//! the most severe contributing log). [`aggregate`] is a pure function of its
//! inputs; callers re-run it whenever the logs or the reference day change.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Duration, Local, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::health_log::HealthLog;
use crate::pain_type::PainType;
use crate::regions::DetailedRegion;
use crate::types::{HexColor, Millis, Timestamp};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Half-width of the contribution window: 7 days in milliseconds. A log
/// contributes iff its distance to the reference instant is `<= WINDOW_MS`.
pub const WINDOW_MS: Millis = 7 * 24 * 60 * 60 * 1000;

/// Upper end of the severity scale.
pub const MAX_SEVERITY: f64 = 10.0;

/// Exponent applied to normalized severity. Values below 1 lift low and mid
/// severities so they still register visibly.
pub const SEVERITY_EXPONENT: f64 = 0.6;

/// Severity weight of a log without a score (intensity pass).
pub const UNSCORED_INTENSITY_WEIGHT: f64 = 1.0;

/// Severity a log without a score competes with (color pass).
pub const UNSCORED_COLOR_SEVERITY: f64 = 0.0;

/// Starting maximum for every region in the color pass. Compared with `>`,
/// so a log must beat it strictly to color a region.
pub const COLOR_BASELINE_SEVERITY: f64 = 0.0;

// ---------------------------------------------------------------------------
// Weights
// ---------------------------------------------------------------------------

/// Linear time decay: 1.0 at the reference instant, 0.0 at the window edge.
/// Clamped to `[0, 1]`.
pub fn time_weight(dt_ms: Millis) -> f64 {
    (1.0 - dt_ms.unsigned_abs() as f64 / WINDOW_MS as f64).clamp(0.0, 1.0)
}

/// Severity weight in `[0, 1]`: `clamp(s / 10, 0, 1) ^ 0.6`, or
/// [`UNSCORED_INTENSITY_WEIGHT`] when the log has no (finite) score.
pub fn severity_weight(severity: Option<f64>) -> f64 {
    match severity {
        Some(s) if !s.is_nan() => (s / MAX_SEVERITY).clamp(0.0, 1.0).powf(SEVERITY_EXPONENT),
        _ => UNSCORED_INTENSITY_WEIGHT,
    }
}

// ---------------------------------------------------------------------------
// Reference instant
// ---------------------------------------------------------------------------

/// The instant logs are measured against.
///
/// With a reference day this is 00:00:00 of that day in `tz`; without one it
/// is the current instant. When local midnight does not exist (a DST gap) the
/// first valid instant after it is used.
pub fn reference_instant<Tz: TimeZone>(reference_day: Option<NaiveDate>, tz: &Tz) -> Timestamp {
    let Some(day) = reference_day else {
        return Utc::now();
    };

    let midnight = day.and_time(NaiveTime::MIN);
    (0..=2)
        .find_map(|hours| {
            tz.from_local_datetime(&(midnight + Duration::hours(hours)))
                .earliest()
        })
        .map(|local| local.with_timezone(&Utc))
        .unwrap_or_else(|| midnight.and_utc())
}

// ---------------------------------------------------------------------------
// RegionIntensity
// ---------------------------------------------------------------------------

/// Accumulated weight per detailed region. Regions never touched are absent
/// and read as zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RegionIntensity(BTreeMap<DetailedRegion, f64>);

impl RegionIntensity {
    /// Intensity of `region`, zero if absent.
    pub fn get(&self, region: DetailedRegion) -> f64 {
        self.0.get(&region).copied().unwrap_or(0.0)
    }

    pub fn contains(&self, region: DetailedRegion) -> bool {
        self.0.contains_key(&region)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (DetailedRegion, f64)> + '_ {
        self.0.iter().map(|(region, value)| (*region, *value))
    }

    /// Largest intensity across all regions, zero when empty.
    pub fn peak(&self) -> f64 {
        self.0.values().copied().fold(0.0, f64::max)
    }

    /// Intensity of `region` relative to [`peak`](Self::peak), in `[0, 1]`.
    pub fn normalized(&self, region: DetailedRegion) -> f64 {
        let peak = self.peak();
        if peak > 0.0 {
            self.get(region) / peak
        } else {
            0.0
        }
    }

    /// [`normalized`](Self::normalized) value of every present region, for
    /// shading.
    pub fn brightness(&self) -> BTreeMap<DetailedRegion, f64> {
        let peak = self.peak();
        self.iter()
            .map(|(region, value)| (region, if peak > 0.0 { value / peak } else { 0.0 }))
            .collect()
    }

    /// Regions with strictly positive intensity.
    pub fn clickable(&self) -> BTreeSet<DetailedRegion> {
        self.iter()
            .filter(|(_, value)| *value > 0.0)
            .map(|(region, _)| region)
            .collect()
    }

    fn add(&mut self, region: DetailedRegion, weight: f64) {
        *self.0.entry(region).or_insert(0.0) += weight;
    }
}

// ---------------------------------------------------------------------------
// RegionColors
// ---------------------------------------------------------------------------

/// Dominant pain type per detailed region. Serializes as region → hex color.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegionColors(BTreeMap<DetailedRegion, PainType>);

impl RegionColors {
    /// Display color of `region`, if any log colored it.
    pub fn color(&self, region: DetailedRegion) -> Option<HexColor> {
        self.0.get(&region).map(PainType::color)
    }

    /// Pain type that set the color of `region`.
    pub fn pain_type(&self, region: DetailedRegion) -> Option<PainType> {
        self.0.get(&region).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (DetailedRegion, PainType)> + '_ {
        self.0.iter().map(|(region, pain_type)| (*region, *pain_type))
    }
}

impl Serialize for RegionColors {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (region, pain_type) in &self.0 {
            map.serialize_entry(region, pain_type.color())?;
        }
        map.end()
    }
}

// ---------------------------------------------------------------------------
// Heatmap
// ---------------------------------------------------------------------------

/// Counters shown in the heatmap legend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HeatmapSummary {
    /// Logs considered (the full input collection).
    pub total_logs: usize,
    /// Logs whose date parsed and fell inside the window.
    pub logs_in_window: usize,
    /// Logs skipped because their date was missing or unparsable.
    pub unparsable_dates: usize,
    /// Regions with strictly positive intensity.
    pub active_regions: usize,
}

/// Result of one aggregation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Heatmap {
    pub intensity: RegionIntensity,
    pub colors: RegionColors,
    pub summary: HeatmapSummary,
}

impl Heatmap {
    /// Regions that respond to interaction: intensity strictly above zero.
    pub fn clickable_regions(&self) -> BTreeSet<DetailedRegion> {
        self.intensity.clickable()
    }

    pub fn is_clickable(&self, region: DetailedRegion) -> bool {
        self.intensity.get(region) > 0.0
    }
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// A log that passed the window test, reduced to what both passes need.
struct Contribution {
    dt_ms: Millis,
    severity: Option<f64>,
    pain_type: PainType,
    regions: BTreeSet<DetailedRegion>,
}

/// Aggregate `logs` around `reference_day` in the local time zone.
///
/// `None` measures against the current instant.
pub fn aggregate(logs: &[HealthLog], reference_day: Option<NaiveDate>) -> Heatmap {
    aggregate_in(logs, reference_day, &Local)
}

/// Aggregate with an explicit time zone for the reference day and for log
/// timestamps that carry no offset.
pub fn aggregate_in<Tz: TimeZone>(
    logs: &[HealthLog],
    reference_day: Option<NaiveDate>,
    tz: &Tz,
) -> Heatmap {
    aggregate_at(logs, reference_instant(reference_day, tz), tz)
}

/// Aggregate against an already-resolved reference instant.
pub fn aggregate_at<Tz: TimeZone>(logs: &[HealthLog], reference: Timestamp, tz: &Tz) -> Heatmap {
    let mut unparsable_dates = 0;
    let mut contributions = Vec::new();

    for log in logs {
        let Some(at) = log.timestamp_in(tz) else {
            unparsable_dates += 1;
            continue;
        };
        let dt_ms = (at - reference).num_milliseconds().abs();
        if dt_ms > WINDOW_MS {
            continue;
        }
        contributions.push(Contribution {
            dt_ms,
            severity: log.severity,
            pain_type: log.pain_type(),
            regions: log.detailed_regions(),
        });
    }

    let intensity = accumulate_intensity(&contributions);
    let colors = dominant_colors(&contributions);
    let summary = HeatmapSummary {
        total_logs: logs.len(),
        logs_in_window: contributions.len(),
        unparsable_dates,
        active_regions: intensity.clickable().len(),
    };

    tracing::debug!(
        reference = %reference,
        total_logs = summary.total_logs,
        logs_in_window = summary.logs_in_window,
        unparsable_dates = summary.unparsable_dates,
        active_regions = summary.active_regions,
        "Heatmap aggregated",
    );

    Heatmap {
        intensity,
        colors,
        summary,
    }
}

/// Sum `time_weight * severity_weight` into every region of every log.
fn accumulate_intensity(contributions: &[Contribution]) -> RegionIntensity {
    let mut intensity = RegionIntensity::default();
    for c in contributions {
        let weight = time_weight(c.dt_ms) * severity_weight(c.severity);
        for region in &c.regions {
            intensity.add(*region, weight);
        }
    }
    intensity
}

/// Color each region with the pain type of its most severe log.
///
/// Unscored logs compete at [`UNSCORED_COLOR_SEVERITY`] against a
/// [`COLOR_BASELINE_SEVERITY`] start, and only a strictly greater severity
/// replaces the current color, so ties keep the earlier log. Time weight plays
/// no part: a log on the window edge can color a region it adds nothing to.
fn dominant_colors(contributions: &[Contribution]) -> RegionColors {
    let mut max_severity: BTreeMap<DetailedRegion, f64> = BTreeMap::new();
    let mut colors = RegionColors::default();

    for c in contributions {
        let severity = c.severity.unwrap_or(UNSCORED_COLOR_SEVERITY);
        for region in &c.regions {
            let current = max_severity
                .get(region)
                .copied()
                .unwrap_or(COLOR_BASELINE_SEVERITY);
            if severity > current {
                max_severity.insert(*region, severity);
                colors.0.insert(*region, c.pain_type);
            }
        }
    }

    colors
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
