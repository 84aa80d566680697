//! Request and response models

use serde::{Deserialize, Serialize};

use crate::files::FileListing;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: Some(message.into()),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message),
        }
    }
}

/// Severity of a user-facing outcome message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Warning,
}

#[derive(Debug, Serialize)]
pub struct FileListResponse {
    pub files: Vec<FileListing>,
    pub count: usize,
    pub max_upload_mb: u64,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub level: NoticeLevel,
    pub stored: Vec<String>,
    pub skipped: usize,
}

#[derive(Debug, Deserialize)]
pub struct DeleteForm {
    #[serde(default)]
    pub filename: String,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub level: NoticeLevel,
    pub deleted: Option<String>,
}
