//! Data contract between the heatmap and the 3D render surface.
//!
//! The surface receives a [`HeatmapFrame`] per update and reports clicks on
//! region proxies back through [`HeatmapBinding::region_clicked`]. Mesh,
//! camera and hit-testing live entirely on the surface side.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use chrono::{Local, NaiveDate, TimeZone};
use serde::Serialize;

use crate::health_log::HealthLog;
use crate::heatmap::{aggregate_in, Heatmap, HeatmapSummary, RegionColors, RegionIntensity};
use crate::regions::DetailedRegion;
use crate::selection::SelectionState;

// ---------------------------------------------------------------------------
// Frame and surface
// ---------------------------------------------------------------------------

/// Everything the render surface needs for one update.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HeatmapFrame {
    pub reference_day: Option<NaiveDate>,
    pub intensity: RegionIntensity,
    /// Largest intensity in the frame.
    pub peak: f64,
    /// Intensity divided by `peak`, per present region.
    pub brightness: BTreeMap<DetailedRegion, f64>,
    pub colors: RegionColors,
    pub clickable: BTreeSet<DetailedRegion>,
    pub selected: Option<DetailedRegion>,
    pub summary: HeatmapSummary,
}

/// A consumer of heatmap frames (the body viewer).
pub trait RenderSurface {
    fn render(&mut self, frame: &HeatmapFrame);
}

// ---------------------------------------------------------------------------
// HeatmapBinding
// ---------------------------------------------------------------------------

/// Owns the heatmap inputs, recomputes on change, and routes clicks into the
/// shared selection.
///
/// Results are cached only for a fixed reference day. Without one the
/// reference is "now", so every read recomputes.
pub struct HeatmapBinding<Tz: TimeZone = Local> {
    logs: Vec<HealthLog>,
    reference_day: Option<NaiveDate>,
    selection: Arc<SelectionState>,
    tz: Tz,
    cached: Option<Heatmap>,
}

impl HeatmapBinding<Local> {
    /// Binding in the local time zone with no logs and no reference day.
    pub fn new(selection: Arc<SelectionState>) -> Self {
        Self::with_time_zone(selection, Local)
    }
}

impl<Tz: TimeZone> HeatmapBinding<Tz> {
    pub fn with_time_zone(selection: Arc<SelectionState>, tz: Tz) -> Self {
        Self {
            logs: Vec::new(),
            reference_day: None,
            selection,
            tz,
            cached: None,
        }
    }

    /// Replace the log collection.
    pub fn set_logs(&mut self, logs: Vec<HealthLog>) {
        self.logs = logs;
        self.cached = None;
    }

    pub fn logs(&self) -> &[HealthLog] {
        &self.logs
    }

    /// Change the reference day. `None` follows the current instant.
    pub fn set_reference_day(&mut self, day: Option<NaiveDate>) {
        if self.reference_day != day {
            self.reference_day = day;
            self.cached = None;
        }
    }

    pub fn reference_day(&self) -> Option<NaiveDate> {
        self.reference_day
    }

    pub fn selection(&self) -> &Arc<SelectionState> {
        &self.selection
    }

    /// Current heatmap, recomputed if an input changed since the last call.
    pub fn heatmap(&mut self) -> Heatmap {
        if let Some(cached) = &self.cached {
            return cached.clone();
        }
        let heatmap = aggregate_in(&self.logs, self.reference_day, &self.tz);
        if self.reference_day.is_some() {
            self.cached = Some(heatmap.clone());
        }
        heatmap
    }

    /// Assemble the frame for the current inputs and selection.
    pub fn frame(&mut self) -> HeatmapFrame {
        let heatmap = self.heatmap();
        HeatmapFrame {
            reference_day: self.reference_day,
            clickable: heatmap.clickable_regions(),
            peak: heatmap.intensity.peak(),
            brightness: heatmap.intensity.brightness(),
            intensity: heatmap.intensity,
            colors: heatmap.colors,
            selected: self.selection.current(),
            summary: heatmap.summary,
        }
    }

    /// Build a frame and hand it to `surface`.
    pub fn push_frame<S: RenderSurface + ?Sized>(&mut self, surface: &mut S) {
        let frame = self.frame();
        surface.render(&frame);
    }

    /// Handle a click on a region proxy.
    ///
    /// Regions with zero intensity are inert: the click is ignored and `false`
    /// returned. Otherwise the region becomes the selection.
    pub fn region_clicked(&mut self, region: DetailedRegion) -> bool {
        if !self.heatmap().is_clickable(region) {
            tracing::debug!(region = %region, "Ignoring click on inert region");
            return false;
        }
        self.selection.select(region);
        true
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
