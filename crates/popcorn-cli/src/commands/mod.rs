pub mod config;
pub mod interactive;
pub mod lookup;
pub mod prompts;
pub mod watched;

use color_eyre::eyre::eyre;
use color_eyre::Result;
use popcorn_config::{Config, PathManager};
use popcorn_core::JsonFileStore;
use popcorn_sources::OmdbClient;

/// Paths and configuration shared by every command
pub struct Context {
    pub paths: PathManager,
    pub config: Config,
}

impl Context {
    pub fn load() -> Result<Self> {
        let mut paths = PathManager::new().map_err(|e| eyre!("{}", e))?;
        let config_file = paths.config_file();
        let config = Config::load_or_default(&config_file)
            .map_err(|e| eyre!("Failed to load config from {}: {}", config_file.display(), e))?;
        config
            .validate()
            .map_err(|e| eyre!("Invalid config in {}: {}", config_file.display(), e))?;

        if let Some(data_dir) = &config.storage.data_dir {
            paths = paths.with_data_dir(data_dir);
        }
        paths
            .ensure_directories()
            .map_err(|e| eyre!("Failed to create popcorn directories: {}", e))?;
        Ok(Self { paths, config })
    }

    pub fn store(&self) -> JsonFileStore {
        JsonFileStore::from_config(&self.paths, &self.config.storage)
    }

    pub fn lookup(&self) -> Result<OmdbClient> {
        OmdbClient::from_config(&self.config.api).map_err(|_| {
            eyre!("No OMDb API key configured. Run 'popcorn config set --api-key <KEY>' first.")
        })
    }
}
