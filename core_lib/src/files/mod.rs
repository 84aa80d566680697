pub mod manager;
pub mod models;
pub mod validation;

pub use manager::{FileManager, FileManagerConfig, OpenedFile, StorageError};
pub use models::{human_size, DeleteOutcome, FileListing, FileUpload, StorageStats, StoreReport, StoredFile};
pub use validation::{sanitize_filename, ValidationError};
