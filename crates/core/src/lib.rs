//! Body-region symptom heatmap domain logic.
//!
//! Pure, synchronous building blocks: the region taxonomy and normalizer,
//! the pain-type classifier, the heatmap aggregator, the shared selection
//! slot, and the render-surface contract.

pub mod error;
pub mod health_log;
pub mod heatmap;
pub mod pain_type;
pub mod regions;
pub mod render;
pub mod selection;
pub mod types;
