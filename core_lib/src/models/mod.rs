//! Data models

pub mod request;

pub use request::{ApiResponse, DeleteForm, DeleteResponse, FileListResponse, NoticeLevel, UploadResponse};
