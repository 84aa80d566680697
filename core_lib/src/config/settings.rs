use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::files::manager::{DEFAULT_MAX_CONTENT_LENGTH, DEFAULT_STORAGE_PATH};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub upload_dir: PathBuf,
    /// Largest accepted request body, in bytes.
    pub max_content_length: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from(DEFAULT_STORAGE_PATH),
            max_content_length: DEFAULT_MAX_CONTENT_LENGTH,
        }
    }
}

impl StorageConfig {
    pub fn max_upload_mb(&self) -> u64 {
        self.max_content_length / (1024 * 1024)
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Path::new("config.toml"), Environment::with_prefix("APP"))
    }

    /// Defaults, then `config_file` when it exists, then `environment`.
    pub fn load_from(config_file: &Path, environment: Environment) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .add_source(Config::try_from(&AppConfig::default())?);

        if config_file.exists() {
            builder = builder.add_source(File::from(config_file));
        }

        builder = builder.add_source(
            environment
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        let app_config: AppConfig = config.try_deserialize()?;

        app_config.validate()?;

        Ok(app_config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Message("Server port cannot be 0".to_string()));
        }

        if self.storage.upload_dir.as_os_str().is_empty() {
            return Err(ConfigError::Message(
                "Upload directory cannot be empty".to_string(),
            ));
        }

        if self.storage.max_content_length == 0 {
            return Err(ConfigError::Message(
                "Max content length must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
