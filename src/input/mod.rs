//! Input handling
//! Detects record file formats and loads resumes and jobs from disk

pub mod file_detector;
pub mod parser;
pub mod manager;

pub use manager::RecordLoader;
