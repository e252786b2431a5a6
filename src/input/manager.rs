//! Loading resume and job records from files

use crate::error::{MatcherError, Result};
use crate::input::file_detector::FileType;
use crate::input::parser::parse_records;
use crate::processing::records::{JobRecord, ResumeRecord};
use log::{debug, info};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Reads record files, keeping their raw text per path.
pub struct RecordLoader {
    cache: HashMap<PathBuf, String>,
    enable_cache: bool,
}

impl Default for RecordLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordLoader {
    pub fn new() -> Self {
        Self {
            cache: HashMap::new(),
            enable_cache: true,
        }
    }

    pub fn with_cache(mut self, enable: bool) -> Self {
        self.enable_cache = enable;
        self
    }

    pub async fn load_resumes(&mut self, path: &Path) -> Result<Vec<ResumeRecord>> {
        self.load_records(path).await
    }

    pub async fn load_jobs(&mut self, path: &Path) -> Result<Vec<JobRecord>> {
        self.load_records(path).await
    }

    pub async fn load_resume(&mut self, path: &Path) -> Result<ResumeRecord> {
        self.load_single(path, "resume").await
    }

    pub async fn load_job(&mut self, path: &Path) -> Result<JobRecord> {
        self.load_single(path, "job").await
    }

    pub async fn load_records<T: DeserializeOwned>(&mut self, path: &Path) -> Result<Vec<T>> {
        let file_type = FileType::from_path(path);
        if file_type == FileType::Unknown {
            return Err(MatcherError::UnsupportedFormat(format!(
                "Unsupported file type for: {}",
                path.display()
            )));
        }

        let content = self.read_text(path).await?;
        let records: Vec<T> = parse_records(&content, file_type)?;
        info!("Loaded {} records from {}", records.len(), path.display());
        Ok(records)
    }

    /// A file holding exactly one record, either bare or in a one-element array.
    async fn load_single<T: DeserializeOwned>(&mut self, path: &Path, kind: &str) -> Result<T> {
        let mut records: Vec<T> = self.load_records(path).await?;
        if records.len() != 1 {
            return Err(MatcherError::InvalidInput(format!(
                "Expected one {} in {}, found {}",
                kind,
                path.display(),
                records.len()
            )));
        }
        Ok(records.remove(0))
    }

    async fn read_text(&mut self, path: &Path) -> Result<String> {
        if self.enable_cache {
            if let Some(cached) = self.cache.get(path) {
                debug!("Using cached content for: {}", path.display());
                return Ok(cached.clone());
            }
        }

        if !path.exists() {
            return Err(MatcherError::InvalidInput(format!(
                "File does not exist: {}",
                path.display()
            )));
        }

        let content = tokio::fs::read_to_string(path).await?;
        if self.enable_cache {
            self.cache.insert(path.to_path_buf(), content.clone());
        }
        Ok(content)
    }

    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }
}
