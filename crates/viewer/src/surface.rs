//! JSON-lines render surface.
//!
//! Each update is written as one JSON object tagged with `type`, so a
//! front end (or a test) can consume the stream line by line.

use std::io::{self, Write};

use serde::Serialize;

use bodymap_core::pain_type::{legend, LegendEntry};
use bodymap_core::regions::{region_list, RegionEntry};
use bodymap_core::render::{HeatmapFrame, RenderSurface};
use bodymap_core::selection::NewLogDraft;

/// Message envelope written to the output stream.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutputMessage<'a> {
    Legend { entries: Vec<LegendEntry> },
    Regions { entries: Vec<RegionEntry> },
    Frame { frame: &'a HeatmapFrame },
    Draft { draft: &'a NewLogDraft },
    Error { message: String },
}

pub struct JsonLinesSurface<W: Write> {
    writer: W,
    pretty: bool,
}

impl JsonLinesSurface<io::Stdout> {
    pub fn stdout(pretty: bool) -> Self {
        Self::new(io::stdout(), pretty)
    }
}

impl<W: Write> JsonLinesSurface<W> {
    pub fn new(writer: W, pretty: bool) -> Self {
        Self { writer, pretty }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Write the pain-type legend.
    pub fn emit_legend(&mut self) {
        self.emit(&OutputMessage::Legend { entries: legend() });
    }

    /// Write the labeled region list used for list selection.
    pub fn emit_regions(&mut self) {
        self.emit(&OutputMessage::Regions {
            entries: region_list(),
        });
    }

    /// Write a new-log draft produced from the selection.
    pub fn emit_draft(&mut self, draft: &NewLogDraft) {
        self.emit(&OutputMessage::Draft { draft });
    }

    /// Write a user-facing error (bad command, and so on).
    pub fn emit_error(&mut self, message: impl Into<String>) {
        self.emit(&OutputMessage::Error {
            message: message.into(),
        });
    }

    /// Serialize and write one message. Write failures are logged; the
    /// surface keeps going.
    pub fn emit(&mut self, message: &OutputMessage<'_>) {
        if let Err(e) = self.try_emit(message) {
            tracing::error!(error = %e, "Failed to write output message");
        }
    }

    fn try_emit(&mut self, message: &OutputMessage<'_>) -> io::Result<()> {
        if self.pretty {
            serde_json::to_writer_pretty(&mut self.writer, message)?;
        } else {
            serde_json::to_writer(&mut self.writer, message)?;
        }
        self.writer.write_all(b"\n")?;
        self.writer.flush()
    }
}

impl<W: Write> RenderSurface for JsonLinesSurface<W> {
    fn render(&mut self, frame: &HeatmapFrame) {
        self.emit(&OutputMessage::Frame { frame });
    }
}

#[cfg(test)]
mod tests {
    use bodymap_core::regions::{BroadRegion, DetailedRegion};

    use super::*;

    fn lines(surface: JsonLinesSurface<Vec<u8>>) -> Vec<serde_json::Value> {
        String::from_utf8(surface.into_inner())
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn frame_is_one_tagged_line() {
        let mut surface = JsonLinesSurface::new(Vec::new(), false);
        surface.render(&HeatmapFrame {
            selected: Some(DetailedRegion::Head),
            ..HeatmapFrame::default()
        });

        let out = lines(surface);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0]["type"], "frame");
        assert_eq!(out[0]["frame"]["selected"], "head");
        assert!(out[0]["frame"]["intensity"].as_object().unwrap().is_empty());
    }

    #[test]
    fn legend_lists_colors() {
        let mut surface = JsonLinesSurface::new(Vec::new(), false);
        surface.emit_legend();

        let out = lines(surface);
        let entries = out[0]["entries"].as_array().unwrap();
        assert_eq!(entries.len(), 9);
        assert_eq!(entries[0]["pain_type"], "sharp");
        assert_eq!(entries[0]["color"], "#e11d48");
    }

    #[test]
    fn region_list_is_labeled() {
        let mut surface = JsonLinesSurface::new(Vec::new(), false);
        surface.emit_regions();

        let out = lines(surface);
        assert_eq!(out[0]["type"], "regions");
        let entries = out[0]["entries"].as_array().unwrap();
        assert_eq!(entries.len(), DetailedRegion::ALL.len());
        assert_eq!(entries[0]["region"], "head");
        assert_eq!(entries[0]["label"], "Head");
        assert_eq!(entries[0]["broad_label"], "Head");
    }

    #[test]
    fn draft_and_error_messages() {
        let mut surface = JsonLinesSurface::new(Vec::new(), false);
        surface.emit_draft(&NewLogDraft::for_region(DetailedRegion::LeftFoot));
        surface.emit_error("unrecognized command");

        let out = lines(surface);
        assert_eq!(out[0]["type"], "draft");
        assert_eq!(out[0]["draft"]["body_region"], BroadRegion::LeftLeg.as_str());
        assert_eq!(out[0]["draft"]["body_parts"][0], "left_foot");
        assert_eq!(out[1]["type"], "error");
        assert_eq!(out[1]["message"], "unrecognized command");
    }
}
