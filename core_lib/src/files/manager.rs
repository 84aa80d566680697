use std::fs::Metadata;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use thiserror::Error;
use tokio::fs as async_fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::config::StorageConfig;
use super::models::{DeleteOutcome, FileUpload, StorageStats, StoreReport, StoredFile};
use super::validation::{is_sanitized, sanitize_filename, ValidationError};

pub const DEFAULT_STORAGE_PATH: &str = "fichiers";
pub const DEFAULT_MAX_CONTENT_LENGTH: u64 = 512 * 1024 * 1024;

pub type Result<T> = std::result::Result<T, StorageError>;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Invalid file name: {0}")]
    InvalidName(#[from] ValidationError),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Payload too large: {size} bytes (max: {limit} bytes)")]
    PayloadTooLarge { size: u64, limit: u64 },

    #[error("Storage unavailable: {0}")]
    Unavailable(#[from] std::io::Error),
}

#[derive(Debug, Clone)]
pub struct FileManagerConfig {
    pub storage_path: PathBuf,
    pub max_content_length: u64,
}

impl Default for FileManagerConfig {
    fn default() -> Self {
        Self {
            storage_path: PathBuf::from(DEFAULT_STORAGE_PATH),
            max_content_length: DEFAULT_MAX_CONTENT_LENGTH,
        }
    }
}

impl From<&StorageConfig> for FileManagerConfig {
    fn from(config: &StorageConfig) -> Self {
        Self {
            storage_path: config.upload_dir.clone(),
            max_content_length: config.max_content_length,
        }
    }
}

/// A file opened for download, checked to exist right before it is served.
#[derive(Debug)]
pub struct OpenedFile {
    pub name: String,
    pub path: PathBuf,
    pub file: async_fs::File,
    pub size: u64,
}

/// Flat-directory file store.
///
/// The directory itself is the only state: listings are rebuilt from a
/// directory scan on every call and writes land through a hidden temp file
/// plus rename, so readers never observe a partially written file.
#[derive(Debug, Clone)]
pub struct FileManager {
    config: FileManagerConfig,
}

impl FileManager {
    pub fn new(config: FileManagerConfig) -> Self {
        Self { config }
    }

    pub fn with_default_config() -> Self {
        Self::new(FileManagerConfig::default())
    }

    pub fn storage_path(&self) -> &Path {
        &self.config.storage_path
    }

    pub fn max_content_length(&self) -> u64 {
        self.config.max_content_length
    }

    pub async fn initialize(&self) -> Result<()> {
        if !self.config.storage_path.exists() {
            async_fs::create_dir_all(&self.config.storage_path).await?;
            tracing::info!(path = %self.config.storage_path.display(), "created storage directory");
        }

        Ok(())
    }

    /// Lists stored files, newest first. Files modified at the same instant
    /// are ordered by name.
    pub async fn list(&self) -> Result<Vec<StoredFile>> {
        let mut entries = async_fs::read_dir(&self.config.storage_path).await.map_err(|e| {
            tracing::error!("Failed to read storage directory {}: {}", self.config.storage_path.display(), e);
            StorageError::Unavailable(e)
        })?;

        let mut files = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let name = match entry.file_name().into_string() {
                Ok(name) if is_sanitized(&name) => name,
                other => {
                    let shown = match &other {
                        Ok(name) => name.clone(),
                        Err(raw) => raw.to_string_lossy().into_owned(),
                    };
                    tracing::debug!(entry = %shown, "skipping entry with unaddressable name");
                    continue;
                }
            };

            let metadata = match regular_file_metadata(&entry.path()).await? {
                Some(metadata) => metadata,
                None => continue,
            };

            files.push(StoredFile {
                name,
                size_bytes: metadata.len(),
                modified_at: DateTime::<Local>::from(metadata.modified()?),
            });
        }

        files.sort_by(|a, b| {
            b.modified_at
                .cmp(&a.modified_at)
                .then_with(|| a.name.cmp(&b.name))
        });

        Ok(files)
    }

    /// Writes every upload of a batch under its sanitized name.
    ///
    /// Entries without a usable name are skipped. The whole batch is refused
    /// before any write when its combined size exceeds the configured limit.
    pub async fn store(&self, uploads: Vec<FileUpload>) -> Result<StoreReport> {
        let total_size: u64 = uploads.iter().map(|upload| upload.data.len() as u64).sum();
        if total_size > self.config.max_content_length {
            return Err(StorageError::PayloadTooLarge {
                size: total_size,
                limit: self.config.max_content_length,
            });
        }

        let mut report = StoreReport::default();

        for upload in uploads {
            let raw_name = match upload.raw_name.as_deref() {
                Some(raw_name) if !raw_name.is_empty() => raw_name,
                _ => {
                    report.skipped += 1;
                    continue;
                }
            };

            let name = match sanitize_filename(raw_name) {
                Ok(name) => name,
                Err(e) => {
                    tracing::warn!(raw_name = %raw_name, error = %e, "skipping upload with unusable name");
                    report.skipped += 1;
                    continue;
                }
            };

            self.write_atomically(&name, &upload.data).await?;
            tracing::info!(file = %name, size = upload.data.len(), "stored file");
            report.stored.push(name);
        }

        Ok(report)
    }

    pub async fn delete(&self, raw_name: &str) -> Result<DeleteOutcome> {
        let name = sanitize_filename(raw_name)?;
        let path = self.config.storage_path.join(&name);

        if regular_file_metadata(&path).await?.is_none() {
            return Ok(DeleteOutcome::NotFound);
        }

        match async_fs::remove_file(&path).await {
            Ok(()) => {
                tracing::info!(file = %name, "deleted file");
                Ok(DeleteOutcome::Deleted(name))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(DeleteOutcome::NotFound),
            Err(e) => {
                tracing::error!("Failed to delete file {}: {}", path.display(), e);
                Err(StorageError::Unavailable(e))
            }
        }
    }

    /// Maps a client-supplied name to the absolute path of a stored file.
    ///
    /// The result always lies directly inside the storage directory.
    pub async fn resolve(&self, raw_name: &str) -> Result<Option<PathBuf>> {
        let name = match sanitize_filename(raw_name) {
            Ok(name) => name,
            Err(_) => return Ok(None),
        };

        let root = async_fs::canonicalize(&self.config.storage_path).await?;
        let candidate = root.join(&name);

        if regular_file_metadata(&candidate).await?.is_none() {
            return Ok(None);
        }

        let resolved = match async_fs::canonicalize(&candidate).await {
            Ok(path) => path,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        if resolved.parent() != Some(root.as_path()) {
            tracing::warn!(raw_name = %raw_name, "resolved path escapes storage directory");
            return Ok(None);
        }

        Ok(Some(resolved))
    }

    pub async fn open(&self, raw_name: &str) -> Result<OpenedFile> {
        let path = self
            .resolve(raw_name)
            .await?
            .ok_or_else(|| StorageError::NotFound(raw_name.to_string()))?;

        let file = match async_fs::File::open(&path).await {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StorageError::NotFound(raw_name.to_string()))
            }
            Err(e) => return Err(e.into()),
        };

        let size = file.metadata().await?.len();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(OpenedFile { name, path, file, size })
    }

    pub async fn storage_stats(&self) -> Result<StorageStats> {
        let files = self.list().await?;

        Ok(StorageStats {
            total_size: files.iter().map(|f| f.size_bytes).sum(),
            file_count: files.len() as u64,
            storage_path: self.config.storage_path.clone(),
        })
    }

    async fn write_atomically(&self, name: &str, data: &[u8]) -> Result<()> {
        let target = self.config.storage_path.join(name);
        let temp_path = self.config.storage_path.join(format!(".{}.part", Uuid::new_v4()));

        let written = async {
            let mut file = async_fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&temp_path)
                .await?;
            file.write_all(data).await?;
            file.sync_all().await?;
            drop(file);
            async_fs::rename(&temp_path, &target).await
        }
        .await;

        if let Err(e) = written {
            let _ = async_fs::remove_file(&temp_path).await;
            tracing::error!("Failed to write file {}: {}", target.display(), e);
            return Err(StorageError::Unavailable(e));
        }

        Ok(())
    }
}

/// Metadata of `path` when it is a regular file. Symlinks are not followed.
async fn regular_file_metadata(path: &Path) -> Result<Option<Metadata>> {
    match async_fs::symlink_metadata(path).await {
        Ok(metadata) if metadata.is_file() => Ok(Some(metadata)),
        Ok(_) => Ok(None),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}
