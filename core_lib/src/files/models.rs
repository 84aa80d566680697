use bytes::Bytes;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const SIZE_UNITS: [&str; 5] = ["o", "Ko", "Mo", "Go", "To"];

/// A regular file currently present in the storage directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub name: String,
    pub size_bytes: u64,
    pub modified_at: DateTime<Local>,
}

impl StoredFile {
    pub fn size_human(&self) -> String {
        human_size(self.size_bytes)
    }

    pub fn modified_human(&self) -> String {
        self.modified_at.format("%Y-%m-%d %H:%M").to_string()
    }
}

/// Formats a byte count with base-1024 units.
///
/// The base unit is printed as an integer, every larger unit with two decimals.
pub fn human_size(bytes: u64) -> String {
    let mut value = bytes as f64;
    let mut unit = 0;

    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{} {}", bytes, SIZE_UNITS[0])
    } else {
        format!("{:.2} {}", value, SIZE_UNITS[unit])
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileListing {
    pub name: String,
    pub size: u64,
    pub size_human: String,
    pub modified: DateTime<Local>,
    pub modified_human: String,
}

impl From<StoredFile> for FileListing {
    fn from(file: StoredFile) -> Self {
        Self {
            size_human: file.size_human(),
            modified_human: file.modified_human(),
            name: file.name,
            size: file.size_bytes,
            modified: file.modified_at,
        }
    }
}

/// One part of a batch upload, before its name has been sanitized.
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub raw_name: Option<String>,
    pub data: Bytes,
}

impl FileUpload {
    pub fn new(raw_name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            raw_name: Some(raw_name.into()),
            data: data.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StoreReport {
    pub stored: Vec<String>,
    pub skipped: usize,
}

impl StoreReport {
    pub fn stored_count(&self) -> usize {
        self.stored.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted(String),
    NotFound,
}

#[derive(Debug, Clone, Serialize)]
pub struct StorageStats {
    pub total_size: u64,
    pub file_count: u64,
    pub storage_path: PathBuf,
}
