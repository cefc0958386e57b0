//! Single-slot region selection shared between the body viewer and the
//! log-creation flow.
//!
//! Backed by a [`tokio::sync::watch`] channel: every write is one atomic
//! replace, readers observe the latest value, and subscribers are notified of
//! changes. All operations are synchronous.

use serde::Serialize;
use tokio::sync::watch;

use crate::regions::{BroadRegion, DetailedRegion};

// ---------------------------------------------------------------------------
// SelectionState
// ---------------------------------------------------------------------------

/// At most one selected detailed region. Last write wins; there is no history.
///
/// Share via `Arc<SelectionState>`.
#[derive(Debug)]
pub struct SelectionState {
    sender: watch::Sender<Option<DetailedRegion>>,
}

impl SelectionState {
    /// Create a cleared selection.
    pub fn new() -> Self {
        let (sender, _) = watch::channel(None);
        Self { sender }
    }

    /// Replace the selection with `region`.
    pub fn select(&self, region: DetailedRegion) {
        let previous = self.sender.send_replace(Some(region));
        tracing::debug!(region = %region, ?previous, "Region selected");
    }

    /// Clear the selection.
    pub fn clear(&self) {
        self.sender.send_replace(None);
    }

    /// The currently selected region, if any.
    pub fn current(&self) -> Option<DetailedRegion> {
        *self.sender.borrow()
    }

    /// Read and clear in one step. Used by the log-creation flow, which
    /// consumes the selection exactly once.
    pub fn take(&self) -> Option<DetailedRegion> {
        self.sender.send_replace(None)
    }

    /// Receiver that observes every subsequent change.
    pub fn subscribe(&self) -> watch::Receiver<Option<DetailedRegion>> {
        self.sender.subscribe()
    }
}

impl Default for SelectionState {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// NewLogDraft
// ---------------------------------------------------------------------------

/// Pre-filled region fields for a new log entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NewLogDraft {
    /// Broad region for the logging form's region picker.
    pub body_region: Option<BroadRegion>,
    /// The exact detailed region that was selected.
    pub body_parts: Vec<DetailedRegion>,
}

impl NewLogDraft {
    /// Build a draft from `region`.
    pub fn for_region(region: DetailedRegion) -> Self {
        Self {
            body_region: Some(region.broad()),
            body_parts: vec![region],
        }
    }

    /// Consume the current selection into a draft, clearing it.
    ///
    /// An empty selection yields an empty draft.
    pub fn from_selection(selection: &SelectionState) -> Self {
        selection
            .take()
            .map(Self::for_region)
            .unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
