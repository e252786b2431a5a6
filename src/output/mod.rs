//! Report rendering

pub mod formatter;
pub mod report;
