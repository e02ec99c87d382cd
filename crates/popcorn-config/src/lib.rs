pub mod config;
pub mod paths;

pub use config::{ApiConfig, Config, StorageConfig, DEFAULT_API_BASE_URL, DEFAULT_SLOT};
pub use paths::PathManager;
