//! Laporin Reporting & Query Resolution Engine
//!
//! This library turns a raw multi-branch transaction ledger into
//! presentation-ready Indonesian reports and answers free-text
//! questions about the figures, with an optional AI tier on top of a
//! deterministic fallback.

pub mod config;
pub mod core;
pub mod modules;

// Re-export commonly used types
pub use modules::aggregation;
pub use modules::calendar;
pub use modules::ledger;
pub use modules::query;
pub use modules::reports;
