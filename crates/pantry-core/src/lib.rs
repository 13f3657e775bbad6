//! Core domain types and computations for the pantry monitor.
//!
//! Holds the typed procurement record model, tolerant cell coercion, the
//! scalar KPI calculator, the error taxonomy, CLI settings, and display
//! formatting helpers. No I/O happens in this crate.

pub mod coercion;
pub mod error;
pub mod formatting;
pub mod kpis;
pub mod models;
pub mod settings;
