pub mod config;
pub mod paths;

pub use config::{ApiConfig, Config, LoggingConfig, StorageConfig, DEFAULT_API_BASE_URL, DEFAULT_TIMEOUT_SECONDS};
pub use paths::{PathManager, container_base_path};
