//! Shared helpers for file access and simple numeric summaries.

pub mod io;
pub mod math;
