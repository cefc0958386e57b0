//! Heatmap session: log source + render binding + command loop.
//!
//! The session resolves log-source failures before they reach the
//! aggregator: a failed fetch keeps the previously loaded collection (empty
//! on first load) and logs a warning.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, NaiveDate, TimeZone};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::{Interval, MissedTickBehavior};

use bodymap_core::health_log::LogSource;
use bodymap_core::render::{HeatmapBinding, HeatmapFrame, RenderSurface};
use bodymap_core::selection::{NewLogDraft, SelectionState};

use crate::command::Command;
use crate::surface::JsonLinesSurface;

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// What the caller should do after applying a command.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Inputs or selection changed; push a new frame.
    Render,
    /// The selection was consumed into a draft.
    Draft(NewLogDraft),
    /// Nothing changed.
    Unchanged,
    Quit,
}

// ---------------------------------------------------------------------------
// HeatmapSession
// ---------------------------------------------------------------------------

pub struct HeatmapSession<S: LogSource, Tz: TimeZone = Local> {
    source: S,
    binding: HeatmapBinding<Tz>,
}

impl<S: LogSource> HeatmapSession<S> {
    /// Session in the local time zone.
    pub fn new(source: S, selection: Arc<SelectionState>) -> Self {
        Self::with_binding(source, HeatmapBinding::new(selection))
    }
}

impl<S: LogSource, Tz: TimeZone> HeatmapSession<S, Tz> {
    pub fn with_binding(source: S, binding: HeatmapBinding<Tz>) -> Self {
        Self { source, binding }
    }

    pub fn binding(&self) -> &HeatmapBinding<Tz> {
        &self.binding
    }

    pub fn set_reference_day(&mut self, day: Option<NaiveDate>) {
        self.binding.set_reference_day(day);
    }

    /// Re-fetch logs. Returns `true` when the collection changed.
    ///
    /// On failure the current collection is kept.
    pub fn refresh(&mut self) -> bool {
        match self.source.fetch_logs() {
            Ok(logs) if logs.as_slice() == self.binding.logs() => false,
            Ok(logs) => {
                tracing::info!(count = logs.len(), "Log collection updated");
                self.binding.set_logs(logs);
                true
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    kept = self.binding.logs().len(),
                    "Log fetch failed, keeping previous collection",
                );
                false
            }
        }
    }

    pub fn frame(&mut self) -> HeatmapFrame {
        self.binding.frame()
    }

    pub fn push_frame<R: RenderSurface + ?Sized>(&mut self, surface: &mut R) {
        self.binding.push_frame(surface);
    }

    /// Apply one command.
    pub fn apply(&mut self, command: Command) -> Outcome {
        match command {
            Command::Click(region) => {
                if self.binding.region_clicked(region) {
                    Outcome::Render
                } else {
                    Outcome::Unchanged
                }
            }
            Command::Select(region) => {
                self.binding.selection().select(region);
                Outcome::Render
            }
            Command::Clear => {
                self.binding.selection().clear();
                Outcome::Render
            }
            Command::Day(day) => {
                self.binding.set_reference_day(day);
                Outcome::Render
            }
            Command::NewLog => Outcome::Draft(NewLogDraft::from_selection(self.binding.selection())),
            Command::Refresh => {
                if self.refresh() {
                    Outcome::Render
                } else {
                    Outcome::Unchanged
                }
            }
            Command::Quit => Outcome::Quit,
        }
    }

    /// Parse and apply one input line, writing any resulting output.
    /// Returns `false` once the session should stop.
    pub fn handle_line<W: Write>(&mut self, line: &str, surface: &mut JsonLinesSurface<W>) -> bool {
        if line.trim().is_empty() {
            return true;
        }

        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(e) => {
                tracing::debug!(error = %e, line, "Rejected command");
                surface.emit_error(e.to_string());
                return true;
            }
        };

        match self.apply(command) {
            Outcome::Render => self.push_frame(surface),
            Outcome::Draft(draft) => {
                surface.emit_draft(&draft);
                self.push_frame(surface);
            }
            Outcome::Unchanged => {}
            Outcome::Quit => return false,
        }
        true
    }
}

// ---------------------------------------------------------------------------
// Command loop
// ---------------------------------------------------------------------------

/// Drive the session from stdin until EOF or `quit`, re-reading the log source
/// every `refresh` period when set.
pub async fn run<S, Tz, W>(
    session: &mut HeatmapSession<S, Tz>,
    surface: &mut JsonLinesSurface<W>,
    refresh: Option<Duration>,
) where
    S: LogSource,
    Tz: TimeZone,
    W: Write,
{
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut ticker = refresh.map(|period| {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        interval
    });

    loop {
        tokio::select! {
            line = lines.next_line() => match line {
                Ok(Some(line)) => {
                    if !session.handle_line(&line, surface) {
                        tracing::info!("Quit requested");
                        break;
                    }
                }
                Ok(None) => {
                    tracing::info!("Input closed");
                    break;
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to read command");
                    break;
                }
            },
            _ = tick(&mut ticker) => {
                if session.refresh() {
                    session.push_frame(surface);
                }
            }
        }
    }
}

/// Resolve on the next tick, or never when polling is disabled.
async fn tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}
