//! `bodymap-viewer` library crate.
//!
//! Wires the heatmap core to a JSON log file and a JSON-lines render surface.
//! The binary entrypoint lives in `main.rs`; modules are public for
//! integration testing.

pub mod command;
pub mod config;
pub mod session;
pub mod source;
pub mod surface;
