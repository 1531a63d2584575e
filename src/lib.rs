//! Association table between named logging sinks and the minimum severity
//! recorded for each.
//!
//! Sinks are supplied and owned by the caller; the table only tracks which
//! sink is registered under which name and at what threshold. Loggers and
//! levels may be passed singly or as collections, and a single level is
//! broadcast across many loggers.
//!
//! The crate is structured into a few small modules:

/// INI-style configuration used to source levels.
pub mod config;
/// Sink trait, severity levels and the leveled logging macros.
pub mod log;
/// The association table and its argument normalization.
pub mod table;

pub use table::{Arg, Entry, LoggerTable, SinkRef, TableError, ThresholdLevel, Value};
