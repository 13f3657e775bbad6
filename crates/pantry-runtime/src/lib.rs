//! Raw-table acquisition for the pantry monitor.
//!
//! Owns the fetch boundary: the [`source::RawTableSource`] trait with its
//! file and HTTP implementations, and the TTL-cached [`manager::TableManager`]
//! that sits in front of whichever source is configured.

pub mod manager;
pub mod source;

pub use pantry_core as core;
